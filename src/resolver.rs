//! 组件识别
//!
//! 沙箱结束时返回所有顶层绑定，这里按固定顺序的规则链挑出唯一的组件函数。
//! 规则按顺序尝试，先命中者胜出。

use serde::Serialize;

/// 生成模板约定的组件名
pub const CONVENTION_NAME: &str = "AIGeneratedWidget";

/// 宿主运行时与 DOM 模块的保留名，不参与大写命名规则
pub const RESERVED_NAMES: &[&str] = &["React", "ReactDOM"];

/// 函数体中表明其构建 UI 的片段
pub const UI_MARKERS: &[&str] = &["React.createElement", "createElement(", "return (", "return <"];

/// 沙箱返回的一个顶层绑定
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    /// 函数值的源码；非函数为 None
    pub source: Option<String>,
}

impl Binding {
    pub fn function(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self { name: name.into(), source: Some(source.into()) }
    }

    pub fn value(name: impl Into<String>) -> Self {
        Self { name: name.into(), source: None }
    }

    pub fn is_function(&self) -> bool {
        self.source.is_some()
    }
}

/// 识别规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionRule {
    /// 与约定名同名的函数
    ConventionName,
    /// 首字母为 ASCII 大写、非保留名的函数
    UppercaseName,
    /// 函数体包含构建 UI 的片段
    RendersMarkup,
}

impl ResolutionRule {
    /// 规则链，按优先级排列
    pub const CHAIN: [ResolutionRule; 3] = [
        ResolutionRule::ConventionName,
        ResolutionRule::UppercaseName,
        ResolutionRule::RendersMarkup,
    ];

    /// 在绑定中查找第一个满足本规则的位置
    pub fn select(&self, bindings: &[Binding]) -> Option<usize> {
        match self {
            ResolutionRule::ConventionName => bindings
                .iter()
                .position(|b| b.name == CONVENTION_NAME && b.is_function()),
            ResolutionRule::UppercaseName => bindings.iter().position(|b| {
                b.is_function()
                    && b.name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
                    && !RESERVED_NAMES.contains(&b.name.as_str())
            }),
            ResolutionRule::RendersMarkup => bindings.iter().position(|b| {
                b.source
                    .as_deref()
                    .is_some_and(|src| UI_MARKERS.iter().any(|m| src.contains(m)))
            }),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ResolutionRule::ConventionName => "convention name",
            ResolutionRule::UppercaseName => "uppercase function name",
            ResolutionRule::RendersMarkup => "function body renders markup",
        }
    }
}

/// 识别结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// 在绑定列表中的位置
    pub index: usize,
    pub name: String,
    pub rule: ResolutionRule,
}

/// 组件识别器
pub struct ComponentResolver {
    rules: Vec<ResolutionRule>,
}

impl ComponentResolver {
    pub fn new() -> Self {
        Self { rules: ResolutionRule::CHAIN.to_vec() }
    }

    /// 使用自定义规则顺序
    pub fn with_rules(rules: Vec<ResolutionRule>) -> Self {
        Self { rules }
    }

    pub fn resolve(&self, bindings: &[Binding]) -> Result<Resolution, String> {
        for rule in &self.rules {
            if let Some(index) = rule.select(bindings) {
                let name = bindings[index].name.clone();
                tracing::debug!(component = %name, rule = rule.describe(), "component resolved");
                return Ok(Resolution { index, name, rule: *rule });
            }
        }
        Err(no_component_message())
    }
}

impl Default for ComponentResolver {
    fn default() -> Self {
        Self::new()
    }
}

pub fn no_component_message() -> String {
    format!(
        "No React component found in the code. Make sure your component is properly defined and exported as {}.",
        CONVENTION_NAME
    )
}
