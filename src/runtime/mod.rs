//! 预览运行时：渲染尝试的生命周期与结果

mod host;
mod outcome;

pub use host::{HostState, PreviewHost, PreviewPipeline};
pub use outcome::{FailureKind, FailureReport, MountedView, RenderOutcome, FAILURE_HINT, SUCCESS_MESSAGE};
