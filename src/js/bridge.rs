//! JS 与 Native 桥接层：沙箱内的 console 输出

use rquickjs::{Ctx, Function};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    Log,
    Info,
    Warn,
    Error,
    Debug,
}

impl ConsoleLevel {
    fn parse(level: &str) -> Self {
        match level {
            "info" => ConsoleLevel::Info,
            "warn" => ConsoleLevel::Warn,
            "error" => ConsoleLevel::Error,
            "debug" => ConsoleLevel::Debug,
            _ => ConsoleLevel::Log,
        }
    }
}

/// 一行 console 输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsoleLine {
    pub level: ConsoleLevel,
    pub message: String,
}

/// 一次渲染期间收集到的 console 输出
#[derive(Debug, Clone, Default)]
pub struct ConsoleBuffer {
    lines: Rc<RefCell<Vec<ConsoleLine>>>,
}

impl ConsoleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建交给宿主脚本的 `nativeLog(level, message)`
    pub fn native_function<'js>(&self, ctx: &Ctx<'js>) -> rquickjs::Result<Function<'js>> {
        let lines = self.lines.clone();
        Function::new(ctx.clone(), move |level: String, message: String| {
            let level = ConsoleLevel::parse(&level);
            match level {
                ConsoleLevel::Error => tracing::warn!(target: "live_preview::console", "{}", message),
                ConsoleLevel::Warn => tracing::warn!(target: "live_preview::console", "{}", message),
                ConsoleLevel::Debug => tracing::debug!(target: "live_preview::console", "{}", message),
                _ => tracing::info!(target: "live_preview::console", "{}", message),
            }
            lines.borrow_mut().push(ConsoleLine { level, message });
        })
    }

    /// 取出并清空
    pub fn drain(&self) -> Vec<ConsoleLine> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }
}
