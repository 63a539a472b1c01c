//! 渲染结果

use crate::js::ConsoleLine;
use crate::renderer::ViewNode;
use crate::resolver::ResolutionRule;
use serde::Serialize;

/// 失败时附带的固定提示
pub const FAILURE_HINT: &str = "Check for syntax errors, unsupported imports, or undefined variables. \
Make sure your component is exported as AIGeneratedWidget.";

pub const SUCCESS_MESSAGE: &str = "Component rendered successfully!";

/// 失败种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 执行期间抛出异常（含语法错误、未知模块的延迟报错）
    Evaluation,
    /// 没有找到组件
    Resolution,
    /// 前置依赖加载失败
    Unavailable,
}

/// 失败报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureReport {
    pub kind: FailureKind,
    /// 原始错误信息
    pub message: String,
    pub hint: &'static str,
    pub console: Vec<ConsoleLine>,
}

/// 挂载成功的组件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MountedView {
    pub component: String,
    pub rule: ResolutionRule,
    /// 主题容器及其下的宿主节点
    pub tree: Vec<ViewNode>,
    pub handlers: Vec<String>,
    pub console: Vec<ConsoleLine>,
    /// 挂载时的渲染次数
    pub passes: u32,
    /// 源码中引用的未知模块
    pub unknown_modules: Vec<String>,
}

/// 一次渲染尝试的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderOutcome {
    Success(MountedView),
    Failure(FailureReport),
}

impl RenderOutcome {
    pub fn failure(kind: FailureKind, message: impl Into<String>, console: Vec<ConsoleLine>) -> Self {
        RenderOutcome::Failure(FailureReport {
            kind,
            message: message.into(),
            hint: FAILURE_HINT,
            console,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RenderOutcome::Success(_))
    }

    pub fn view(&self) -> Option<&MountedView> {
        match self {
            RenderOutcome::Success(view) => Some(view),
            RenderOutcome::Failure(_) => None,
        }
    }

    pub fn failure_report(&self) -> Option<&FailureReport> {
        match self {
            RenderOutcome::Failure(report) => Some(report),
            RenderOutcome::Success(_) => None,
        }
    }

    /// 状态栏文字
    pub fn status_message(&self) -> &str {
        match self {
            RenderOutcome::Success(_) => SUCCESS_MESSAGE,
            RenderOutcome::Failure(report) => &report.message,
        }
    }
}
