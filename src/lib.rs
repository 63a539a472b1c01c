//! Live Preview - 组件源码实时预览引擎
//! 改写导入语句、在 QuickJS 沙箱中执行、识别组件并挂载到主题容器

mod color;
pub use color::Color;

pub mod error;
pub use error::{PreviewError, Result};

// 配置与主题
pub mod config;
pub mod theme;
pub use config::PreviewConfig;
pub use theme::{Palette, ThemeMode};

// 导入改写与声明扫描
pub mod parser;

// 模块注册表
pub mod registry;
pub use registry::ModuleRegistry;

// JS 引擎绑定
pub mod js;

// 组件识别
pub mod resolver;
pub use resolver::{Binding, ComponentResolver, Resolution, ResolutionRule, CONVENTION_NAME};

// 预览运行时
pub mod runtime;
pub use runtime::{FailureKind, HostState, MountedView, PreviewHost, RenderOutcome};

// 渲染输出
pub mod renderer;

// 片段存储与生成服务
pub mod storage;
pub mod generator;

// FFI 导出
mod ffi;
pub use ffi::*;

// 单元测试
#[cfg(test)]
mod tests;
