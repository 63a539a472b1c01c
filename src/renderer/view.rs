//! 挂载后的宿主节点树

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// 宿主节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViewNode {
    Text { text: String },
    Element(ElementNode),
}

/// 元素节点
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementNode {
    pub tag: String,
    #[serde(default)]
    pub props: Map<String, JsonValue>,
    /// 函数类型的属性名（事件处理器）
    #[serde(default)]
    pub handlers: Vec<String>,
    /// 以元素作为值的属性，例如 `startIcon`
    #[serde(default)]
    pub slots: BTreeMap<String, Vec<ViewNode>>,
    #[serde(default)]
    pub children: Vec<ViewNode>,
}

impl ElementNode {
    pub fn new(tag: &str) -> Self {
        Self { tag: tag.to_string(), ..Default::default() }
    }

    pub fn with_prop(mut self, name: &str, value: impl Into<JsonValue>) -> Self {
        self.props.insert(name.to_string(), value.into());
        self
    }

    pub fn with_child(mut self, child: ViewNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn prop_str(&self, name: &str) -> Option<&str> {
        self.props.get(name).and_then(JsonValue::as_str)
    }
}

impl ViewNode {
    pub fn text(text: &str) -> Self {
        ViewNode::Text { text: text.to_string() }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            ViewNode::Element(e) => Some(e),
            ViewNode::Text { .. } => None,
        }
    }

    /// 子树中全部文本拼接
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            ViewNode::Text { text } => out.push_str(text),
            ViewNode::Element(e) => {
                for child in &e.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// 深度优先查找第一个指定标签的元素（包括插槽）
    pub fn find_tag(&self, tag: &str) -> Option<&ElementNode> {
        let element = self.as_element()?;
        if element.tag == tag {
            return Some(element);
        }
        element
            .slots
            .values()
            .flatten()
            .chain(element.children.iter())
            .find_map(|child| child.find_tag(tag))
    }

    /// 子树中元素节点数量
    pub fn element_count(&self) -> usize {
        match self {
            ViewNode::Text { .. } => 0,
            ViewNode::Element(e) => {
                1 + e.children.iter().map(ViewNode::element_count).sum::<usize>()
                    + e.slots.values().flatten().map(ViewNode::element_count).sum::<usize>()
            }
        }
    }
}

/// 在一组根节点中查找
pub fn find_tag<'a>(nodes: &'a [ViewNode], tag: &str) -> Option<&'a ElementNode> {
    nodes.iter().find_map(|n| n.find_tag(tag))
}

/// 一组根节点的文本
pub fn text_content(nodes: &[ViewNode]) -> String {
    nodes.iter().map(ViewNode::text_content).collect()
}
