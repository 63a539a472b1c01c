//! QuickJS 引擎绑定

mod runtime;
mod sandbox;
pub mod bridge;
pub mod host;

pub use runtime::{caught, value_to_string, JsRuntime, RuntimeLimits};
pub use sandbox::{build_sandbox_source, EvaluatedBinding, MountPayload, Sandbox};
pub use bridge::{ConsoleBuffer, ConsoleLevel, ConsoleLine};
