//! QuickJS 运行时

use crate::error::{PreviewError, Result};
use rquickjs::{CatchResultExt, CaughtError, Context, Ctx, Runtime, Value};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// 运行时限制
#[derive(Debug, Clone, Copy)]
pub struct RuntimeLimits {
    pub memory_limit_bytes: usize,
    pub max_stack_size: usize,
    /// 单次渲染允许的执行时间，超时由中断处理器终止脚本
    pub time_limit: Duration,
}

impl Default for RuntimeLimits {
    fn default() -> Self {
        Self {
            memory_limit_bytes: 64 * 1024 * 1024,
            max_stack_size: 1024 * 1024,
            time_limit: Duration::from_secs(5),
        }
    }
}

/// JS 运行时
///
/// 一个 `JsRuntime` 对应一个 QuickJS 堆；每次渲染通过 [`JsRuntime::with_fresh_context`]
/// 拿到全新的上下文，上一次渲染留下的任何绑定都不可见。
pub struct JsRuntime {
    runtime: Runtime,
    deadline: Rc<Cell<Option<Instant>>>,
    limits: RuntimeLimits,
}

impl JsRuntime {
    pub fn new(limits: RuntimeLimits) -> Result<Self> {
        let runtime = Runtime::new().map_err(|e| PreviewError::Engine(e.to_string()))?;
        runtime.set_memory_limit(limits.memory_limit_bytes);
        runtime.set_max_stack_size(limits.max_stack_size);

        let deadline: Rc<Cell<Option<Instant>>> = Rc::new(Cell::new(None));
        let watch = deadline.clone();
        runtime.set_interrupt_handler(Some(Box::new(move || {
            watch.get().map(|d| Instant::now() >= d).unwrap_or(false)
        })));

        Ok(Self { runtime, deadline, limits })
    }

    /// 在新建的上下文中执行，上下文随闭包结束而丢弃
    pub fn with_fresh_context<F, R>(&self, f: F) -> Result<R>
    where
        F: for<'js> FnOnce(Ctx<'js>) -> Result<R>,
    {
        let context = Context::full(&self.runtime).map_err(|e| PreviewError::Engine(e.to_string()))?;
        self.deadline.set(Some(Instant::now() + self.limits.time_limit));
        let result = context.with(f);
        self.deadline.set(None);
        self.runtime.run_gc();
        result
    }

    /// 执行 JS 代码，返回结果的字符串形式
    pub fn eval(&self, code: &str) -> Result<String> {
        self.with_fresh_context(|ctx| {
            let value: Value = caught(&ctx, ctx.eval(code))?;
            Ok(value_to_string(&value))
        })
    }
}

/// 取出 JS 异常：脚本抛出的异常归为执行错误，其余归为引擎错误
pub fn caught<'js, T>(ctx: &Ctx<'js>, result: rquickjs::Result<T>) -> Result<T> {
    result.catch(ctx).map_err(|err| match err {
        CaughtError::Error(e) => PreviewError::Engine(e.to_string()),
        other => PreviewError::Evaluation(other.to_string()),
    })
}

/// 将 JS Value 转换为字符串
pub fn value_to_string(val: &Value) -> String {
    if val.is_undefined() {
        "undefined".to_string()
    } else if val.is_null() {
        "null".to_string()
    } else if let Some(s) = val.as_string() {
        s.to_string().unwrap_or_default()
    } else if let Some(n) = val.as_int() {
        n.to_string()
    } else if let Some(n) = val.as_float() {
        n.to_string()
    } else if let Some(b) = val.as_bool() {
        b.to_string()
    } else if val.is_function() {
        "[function]".to_string()
    } else {
        "[object]".to_string()
    }
}
