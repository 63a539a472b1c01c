//! 执行沙箱
//!
//! 把改写后的源码包进一个函数：前导代码从宿主对象取出模块注册表、console 和定时器，
//! 用户代码放在独立的块中（允许 `const React = ...` 遮蔽参数），结尾显式返回顶层绑定表。
//! 宿主运行时与 DOM 模块作为参数传入，不经过全局变量。

use super::bridge::ConsoleBuffer;
use super::host::HOST_PRELUDE;
use super::runtime::caught;
use crate::error::{PreviewError, Result};
use crate::parser::REGISTRY_IDENT;
use crate::registry::ModuleRegistry;
use crate::resolver::{Binding, CONVENTION_NAME};
use crate::theme::Palette;
use rquickjs::{Array, Ctx, Function, Object, Value};
use serde::Deserialize;

/// 生成沙箱函数源码
pub fn build_sandbox_source(rewritten: &str, names: &[String]) -> String {
    let mut record: Vec<&str> = names.iter().map(String::as_str).collect();
    if !record.contains(&CONVENTION_NAME) {
        record.push(CONVENTION_NAME);
    }

    let entries = record
        .iter()
        .map(|name| {
            format!(
                "        {{ name: {:?}, value: typeof {} === 'undefined' ? undefined : {} }}",
                name, name, name
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "(function (React, ReactDOM, __host) {{\n\
         var {registry} = __host.createRegistry(React, ReactDOM);\n\
         var console = __host.console;\n\
         var setTimeout = __host.setTimeout, setInterval = __host.setInterval;\n\
         var clearTimeout = __host.clearTimeout, clearInterval = __host.clearInterval;\n\
         {{\n\
         {source}\n\
         ;\n\
         return [\n{entries}\n    ];\n\
         }}\n\
         }})",
        registry = REGISTRY_IDENT,
        source = rewritten,
        entries = entries,
    )
}

/// 沙箱求值得到的绑定
pub struct EvaluatedBinding<'js> {
    pub binding: Binding,
    pub value: Value<'js>,
}

/// 挂载结果中的宿主节点树
#[derive(Debug, Clone, Deserialize)]
pub struct MountPayload {
    pub tree: Vec<crate::renderer::ViewNode>,
    #[serde(default)]
    pub handlers: Vec<String>,
    #[serde(default)]
    pub passes: u32,
}

/// 一个上下文中的宿主对象
pub struct Sandbox<'js> {
    ctx: Ctx<'js>,
    host: Object<'js>,
}

impl<'js> Sandbox<'js> {
    /// 在上下文中求值宿主脚本
    pub fn load(
        ctx: Ctx<'js>,
        console: &ConsoleBuffer,
        palette: &Palette,
        registry: &ModuleRegistry,
        max_passes: u32,
    ) -> Result<Self> {
        let factory: Function = caught(&ctx, ctx.eval(HOST_PRELUDE))?;
        let native_log = console.native_function(&ctx)?;
        let host: Object = caught(
            &ctx,
            factory.call((
                native_log,
                palette.to_js_value().to_string(),
                registry.catalog_json(),
                max_passes,
            )),
        )?;
        Ok(Self { ctx, host })
    }

    /// 编译并调用沙箱函数，返回其中的顶层绑定
    pub fn execute(&self, sandbox_source: &str) -> Result<Vec<EvaluatedBinding<'js>>> {
        let execute: Function = self.host.get("execute")?;
        let result: Object = caught(&self.ctx, execute.call((sandbox_source.to_string(),)))?;
        let ok: bool = result.get("ok")?;
        if !ok {
            let message: String = result.get("error")?;
            return Err(PreviewError::Evaluation(message));
        }

        let source_of: Function = self.host.get("sourceOf")?;
        let list: Array = result.get("bindings")?;
        let mut bindings = Vec::with_capacity(list.len());
        for item in list.iter::<Object>() {
            let item = item?;
            let name: String = item.get("name")?;
            let value: Value = item.get("value")?;
            let binding = if value.is_function() {
                let source: String = caught(&self.ctx, source_of.call((value.clone(),)))?;
                Binding::function(name, source)
            } else {
                Binding::value(name)
            };
            bindings.push(EvaluatedBinding { binding, value });
        }
        Ok(bindings)
    }

    /// 在主题容器中渲染组件
    pub fn mount(&self, component: &Value<'js>) -> Result<MountPayload> {
        let mount: Function = self.host.get("mount")?;
        let result: Object = caught(&self.ctx, mount.call((component.clone(),)))?;
        let ok: bool = result.get("ok")?;
        if !ok {
            let message: String = result.get("error")?;
            return Err(PreviewError::Evaluation(message));
        }
        let json: String = result.get("json")?;
        Ok(serde_json::from_str(&json)?)
    }
}
