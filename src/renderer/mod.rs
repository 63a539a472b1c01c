//! 渲染输出：宿主节点树与 HTML 序列化

pub mod html;
pub mod view;

pub use html::HtmlRenderer;
pub use view::{find_tag, text_content, ElementNode, ViewNode};
