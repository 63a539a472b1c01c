//! 预览宿主：管理每次渲染尝试的生命周期

use super::outcome::{FailureKind, MountedView, RenderOutcome};
use crate::config::PreviewConfig;
use crate::error::{PreviewError, Result};
use crate::js::{build_sandbox_source, ConsoleBuffer, JsRuntime, RuntimeLimits, Sandbox};
use crate::parser::{top_level_declarations, ImportRewriter};
use crate::registry::ModuleRegistry;
use crate::resolver::{Binding, ComponentResolver};
use crate::theme::{Palette, ThemeMode};
use std::time::Duration;

/// 宿主状态
#[derive(Debug, Clone, PartialEq)]
pub enum HostState {
    /// 前置依赖加载失败，本次会话不再重试
    Unavailable(String),
    /// 尚未渲染，或源码已修改
    Idle,
    Loading,
    Rendered(RenderOutcome),
}

/// 渲染流水线：改写 -> 执行 -> 识别 -> 挂载
pub struct PreviewPipeline {
    pub palette: Palette,
    pub registry: ModuleRegistry,
    pub resolver: ComponentResolver,
    pub max_passes: u32,
}

impl PreviewPipeline {
    pub fn new(palette: Palette, max_passes: u32) -> Self {
        Self {
            palette,
            registry: ModuleRegistry::new(),
            resolver: ComponentResolver::new(),
            max_passes,
        }
    }

    /// 执行一次完整的渲染尝试，结果总是成功或失败之一
    pub fn run(&self, js: &JsRuntime, source: &str) -> RenderOutcome {
        let rewritten = {
            let _span = tracing::debug_span!("rewrite").entered();
            ImportRewriter::rewrite(source)
        };

        let mut unknown_modules: Vec<String> = Vec::new();
        for decl in &rewritten.imports {
            if !self.registry.is_known(&decl.module_id) && !unknown_modules.contains(&decl.module_id) {
                tracing::warn!(module = %decl.module_id, "import from unknown module, its members are undefined");
                unknown_modules.push(decl.module_id.clone());
            }
        }

        let names: Vec<String> = top_level_declarations(source).into_iter().map(|d| d.name).collect();
        let sandbox_source = build_sandbox_source(&rewritten.text, &names);
        tracing::debug!(imports = rewritten.imports.len(), declarations = names.len(), "sandbox prepared");

        let console = ConsoleBuffer::new();
        let result = js.with_fresh_context(|ctx| {
            let sandbox = Sandbox::load(ctx, &console, &self.palette, &self.registry, self.max_passes)?;

            let evaluated = {
                let _span = tracing::debug_span!("execute").entered();
                sandbox.execute(&sandbox_source)?
            };

            let bindings: Vec<Binding> = evaluated.iter().map(|e| e.binding.clone()).collect();
            let resolution = {
                let _span = tracing::debug_span!("resolve", bindings = bindings.len()).entered();
                self.resolver.resolve(&bindings).map_err(PreviewError::Resolution)?
            };

            let payload = {
                let _span = tracing::debug_span!("mount", component = %resolution.name).entered();
                sandbox.mount(&evaluated[resolution.index].value)?
            };
            Ok((resolution, payload))
        });

        match result {
            Ok((resolution, payload)) => {
                tracing::info!(
                    component = %resolution.name,
                    rule = resolution.rule.describe(),
                    passes = payload.passes,
                    "component rendered"
                );
                RenderOutcome::Success(MountedView {
                    component: resolution.name,
                    rule: resolution.rule,
                    tree: payload.tree,
                    handlers: payload.handlers,
                    console: console.drain(),
                    passes: payload.passes,
                    unknown_modules,
                })
            }
            Err(PreviewError::Resolution(message)) => {
                tracing::warn!(%message, "no component resolved");
                RenderOutcome::failure(FailureKind::Resolution, message, console.drain())
            }
            Err(PreviewError::Evaluation(message)) => {
                tracing::warn!(%message, "component evaluation failed");
                RenderOutcome::failure(FailureKind::Evaluation, message, console.drain())
            }
            Err(other) => {
                tracing::error!(error = %other, "render attempt aborted");
                RenderOutcome::failure(FailureKind::Evaluation, other.to_string(), console.drain())
            }
        }
    }
}

type StateListener = Box<dyn FnMut(&HostState)>;

/// 预览宿主
pub struct PreviewHost {
    js: Option<JsRuntime>,
    pipeline: PreviewPipeline,
    state: HostState,
    source: String,
    attempts: u64,
    listener: Option<StateListener>,
}

impl PreviewHost {
    /// 加载前置依赖（运行时与宿主脚本），只尝试一次
    pub fn boot(config: &PreviewConfig) -> Self {
        let pipeline = PreviewPipeline::new(Palette::for_mode(config.theme), config.max_render_passes);
        let limits = RuntimeLimits {
            memory_limit_bytes: config.memory_limit_bytes,
            max_stack_size: config.max_stack_size,
            time_limit: Duration::from_millis(config.time_limit_ms),
        };

        match Self::load_prerequisites(limits, &pipeline) {
            Ok(js) => {
                tracing::info!(theme = ?config.theme, "preview host ready");
                Self::with_runtime(Some(js), pipeline, HostState::Idle)
            }
            Err(err) => {
                tracing::error!(error = %err, "preview host unavailable");
                Self::with_runtime(None, pipeline, HostState::Unavailable(err.to_string()))
            }
        }
    }

    /// 前置依赖已失败的宿主
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let pipeline = PreviewPipeline::new(Palette::default(), 25);
        Self::with_runtime(None, pipeline, HostState::Unavailable(reason.into()))
    }

    fn with_runtime(js: Option<JsRuntime>, pipeline: PreviewPipeline, state: HostState) -> Self {
        Self {
            js,
            pipeline,
            state,
            source: String::new(),
            attempts: 0,
            listener: None,
        }
    }

    fn load_prerequisites(limits: RuntimeLimits, pipeline: &PreviewPipeline) -> Result<JsRuntime> {
        let js = JsRuntime::new(limits)?;
        // 在一次性上下文中确认宿主脚本可以加载
        js.with_fresh_context(|ctx| {
            Sandbox::load(ctx, &ConsoleBuffer::new(), &pipeline.palette, &pipeline.registry, pipeline.max_passes)
                .map(|_| ())
        })
        .map_err(|e| PreviewError::Unavailable(e.to_string()))?;
        Ok(js)
    }

    /// 状态变化回调
    pub fn set_listener(&mut self, listener: impl FnMut(&HostState) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn state(&self) -> &HostState {
        &self.state
    }

    pub fn is_available(&self) -> bool {
        self.js.is_some()
    }

    /// 最近一次渲染结果
    pub fn outcome(&self) -> Option<&RenderOutcome> {
        match &self.state {
            HostState::Rendered(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn palette(&self) -> &Palette {
        &self.pipeline.palette
    }

    /// 替换编辑区源码，之前保留的结果随之失效
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
        if matches!(self.state, HostState::Rendered(_)) {
            self.transition(HostState::Idle);
        }
    }

    pub fn set_theme(&mut self, mode: ThemeMode) {
        self.pipeline.palette = Palette::for_mode(mode);
    }

    /// 渲染当前源码，新结果完全替换旧结果
    pub fn render(&mut self) -> RenderOutcome {
        let js = match &self.js {
            Some(js) => js,
            None => {
                let reason = match &self.state {
                    HostState::Unavailable(reason) => reason.clone(),
                    _ => "preview runtime is not loaded".to_string(),
                };
                return RenderOutcome::failure(FailureKind::Unavailable, reason, Vec::new());
            }
        };

        self.attempts += 1;
        let attempt = self.attempts;
        let _span = tracing::info_span!("render_attempt", attempt).entered();

        Self::notify(&mut self.listener, &HostState::Loading);
        self.state = HostState::Loading;

        let outcome = self.pipeline.run(js, &self.source);
        self.transition(HostState::Rendered(outcome.clone()));
        outcome
    }

    /// 设置源码并立即渲染
    pub fn render_source(&mut self, source: impl Into<String>) -> RenderOutcome {
        self.set_source(source);
        self.render()
    }

    fn transition(&mut self, state: HostState) {
        Self::notify(&mut self.listener, &state);
        self.state = state;
    }

    fn notify(listener: &mut Option<StateListener>, state: &HostState) {
        if let Some(listener) = listener {
            listener(state);
        }
    }
}
