//! 渲染流程测试：改写 -> 沙箱执行 -> 识别 -> 挂载

use crate::config::PreviewConfig;
use crate::js::{build_sandbox_source, value_to_string, ConsoleBuffer, ConsoleLevel, JsRuntime, RuntimeLimits, Sandbox};
use crate::registry::ModuleRegistry;
use crate::renderer::{find_tag, text_content, ViewNode};
use crate::resolver::{no_component_message, ResolutionRule};
use crate::runtime::{FailureKind, HostState, MountedView, PreviewHost, RenderOutcome, FAILURE_HINT};
use crate::theme::Palette;
use std::cell::RefCell;
use std::rc::Rc;

/// 辅助函数：用默认配置渲染一段源码
fn render(source: &str) -> RenderOutcome {
    let mut host = PreviewHost::boot(&PreviewConfig::default());
    assert!(host.is_available(), "host failed to boot: {:?}", host.state());
    host.render_source(source)
}

fn expect_view(outcome: &RenderOutcome) -> &MountedView {
    match outcome {
        RenderOutcome::Success(view) => view,
        RenderOutcome::Failure(report) => panic!("expected success, got {:?}: {}", report.kind, report.message),
    }
}

fn expect_failure(outcome: &RenderOutcome, kind: FailureKind) -> String {
    match outcome {
        RenderOutcome::Failure(report) => {
            assert_eq!(report.kind, kind, "{}", report.message);
            assert_eq!(report.hint, FAILURE_HINT);
            report.message.clone()
        }
        RenderOutcome::Success(view) => panic!("expected failure, rendered {}", view.component),
    }
}

/// 主题容器下的内容
fn content(view: &MountedView) -> &[ViewNode] {
    let theme = find_tag(&view.tree, "lp-theme").expect("theme container");
    &theme.children
}

/// 测试返回 null 的大写函数组件
#[test]
fn test_uppercase_component_rendering_null() {
    let outcome = render("function Widget(){ return null; }");
    let view = expect_view(&outcome);

    assert_eq!(view.component, "Widget");
    assert_eq!(view.rule, ResolutionRule::UppercaseName);
    assert_eq!(view.tree.len(), 1);
    assert!(content(view).is_empty());
    assert_eq!(outcome.status_message(), "Component rendered successfully!");
}

/// 测试从宿主运行时导入状态 hook
#[test]
fn test_imported_state_hook() {
    let source = "import { useState } from 'react'; function Widget(){ const [x,setX]=useState(0); return null; }";
    let view = expect_view(&render(source)).clone();
    assert_eq!(view.component, "Widget");
    assert!(view.unknown_modules.is_empty());
}

/// 测试语法错误产生执行失败
#[test]
fn test_syntax_error_reports_evaluation_failure() {
    let message = expect_failure(&render("function Widget() { return null;"), FailureKind::Evaluation);
    assert!(message.contains("SyntaxError"), "{}", message);
}

/// 测试运行时异常的信息原样保留
#[test]
fn test_thrown_error_message_preserved() {
    let outcome = render("throw new Error('boom at load');\nfunction Widget() { return null; }");
    assert_eq!(expect_failure(&outcome, FailureKind::Evaluation), "boom at load");

    let outcome = render("function Widget() { return missingValue + 1; }");
    let message = expect_failure(&outcome, FailureKind::Evaluation);
    assert!(message.contains("missingValue"), "{}", message);
}

/// 测试约定名组件优先于其它大写函数
#[test]
fn test_convention_component_preferred() {
    let source = r#"
        function Header() { return React.createElement('h1', null, 'header'); }
        const AIGeneratedWidget = () => React.createElement('div', null, 'generated');
    "#;
    let outcome = render(source);
    let view = expect_view(&outcome);
    assert_eq!(view.component, "AIGeneratedWidget");
    assert_eq!(view.rule, ResolutionRule::ConventionName);
    assert_eq!(text_content(content(view)), "generated");
}

/// 测试小写函数通过函数体内容被识别
#[test]
fn test_lowercase_markup_component() {
    let source = "const helper = 3;\nconst widget = function () { return React.createElement('em', null, 'x' + helper); };";
    let outcome = render(source);
    let view = expect_view(&outcome);
    assert_eq!(view.component, "widget");
    assert_eq!(view.rule, ResolutionRule::RendersMarkup);
    assert_eq!(text_content(content(view)), "x3");
}

/// 测试找不到组件
#[test]
fn test_no_component_found() {
    let message = expect_failure(&render("const answer = 42;"), FailureKind::Resolution);
    assert_eq!(message, no_component_message());
}

/// 测试连续两次渲染只保留后一次的结果
#[test]
fn test_consecutive_renders_last_wins() {
    let mut host = PreviewHost::boot(&PreviewConfig::default());

    host.render_source("function First() { return React.createElement('p', null, 'first'); }");
    let second = host.render_source("function Second() { return React.createElement('p', null, 'second'); }");

    let view = expect_view(&second);
    assert_eq!(view.component, "Second");
    let shown = host.outcome().expect("outcome kept");
    assert_eq!(shown, &second);
    assert_eq!(text_content(content(expect_view(shown))), "second");
    assert_eq!(host.attempts(), 2);

    // 失败也会完全替换之前的成功结果
    host.render_source("function Broken( {");
    assert!(!host.outcome().expect("outcome kept").is_success());
}

/// 测试每次渲染使用全新的上下文
#[test]
fn test_no_state_leaks_between_attempts() {
    let mut host = PreviewHost::boot(&PreviewConfig::default());
    expect_view(&host.render_source("globalThis.leaked = 42; function Widget() { return null; }"));

    let outcome = host.render_source("function Widget() { return React.createElement('p', null, typeof leaked); }");
    assert_eq!(text_content(content(expect_view(&outcome))), "undefined");
}

/// 测试未知模块的成员为 undefined，并记录诊断
#[test]
fn test_unknown_module_members_undefined() {
    let source = "import { Chart } from 'recharts';\nfunction Widget() { return React.createElement('span', null, typeof Chart); }";
    let outcome = render(source);
    let view = expect_view(&outcome);
    assert_eq!(text_content(content(view)), "undefined");
    assert_eq!(view.unknown_modules, vec!["recharts".to_string()]);

    // Object.prototype 上的名字同样取不到
    let source = "import { toString, constructor } from 'recharts';\nfunction Widget() { return React.createElement('span', null, typeof toString + ',' + typeof constructor); }";
    let outcome = render(source);
    assert_eq!(text_content(content(expect_view(&outcome))), "undefined,undefined");

    // 把 undefined 当组件使用时在挂载阶段报错
    let source = "import { Chart } from 'recharts';\nfunction Widget() { return React.createElement(Chart); }";
    let message = expect_failure(&render(source), FailureKind::Evaluation);
    assert!(message.contains("Element type is invalid"), "{}", message);
}

/// 测试正则字面量中的引号和括号不影响组件识别
#[test]
fn test_regex_literals_before_component() {
    let cases = [
        "function clean(s){ return s.replace(/\"/g, ''); }\nfunction Widget(){ return null; }",
        "const re = /[{]/;\nfunction Widget(){ return null; }",
    ];
    for source in cases {
        let outcome = render(source);
        let view = expect_view(&outcome);
        assert_eq!(view.component, "Widget", "{}", source);
        assert_eq!(view.rule, ResolutionRule::UppercaseName);
    }
}

/// 测试同一条声明中后面的变量也能被识别为组件
#[test]
fn test_component_in_later_declarator() {
    let outcome = render("const a = 1, Widget = () => null;");
    let view = expect_view(&outcome);
    assert_eq!(view.component, "Widget");
}

/// 测试混合导入不被支持
#[test]
fn test_mixed_import_fails_at_evaluation() {
    let source = "import React, { useState } from 'react';\nfunction Widget() { return null; }";
    expect_failure(&render(source), FailureKind::Evaluation);
}

/// 测试默认导入与命名空间导入可以遮蔽传入的运行时
#[test]
fn test_default_and_namespace_imports() {
    let source = r#"
        import React from 'react';
        import * as Mui from '@mui/material';
        function Widget() {
            return React.createElement(Mui.Typography, { variant: 'h6' }, 'Title');
        }
    "#;
    let outcome = render(source);
    let view = expect_view(&outcome);
    let typography = find_tag(&view.tree, "MuiTypography").expect("typography");
    assert_eq!(typography.prop_str("variant"), Some("h6"));
    assert_eq!(text_content(&typography.children), "Title");
}

/// 测试 useState 与 useEffect 在挂载时生效
#[test]
fn test_effect_updates_state_before_commit() {
    let source = r#"
        function Counter() {
            const [n, setN] = React.useState(0);
            React.useEffect(() => { setN(5); }, []);
            return React.createElement('span', null, 'n=' + n);
        }
    "#;
    let outcome = render(source);
    let view = expect_view(&outcome);
    assert_eq!(text_content(content(view)), "n=5");
    assert_eq!(view.passes, 2);
}

/// 测试无限重复渲染被终止
#[test]
fn test_render_loop_is_bounded() {
    let source = "function Widget() { const [n, setN] = React.useState(0); setN(n + 1); return null; }";
    let message = expect_failure(&render(source), FailureKind::Evaluation);
    assert!(message.contains("Too many re-renders"), "{}", message);
}

/// 测试执行超时
#[test]
fn test_time_limit_interrupts_script() {
    let config = PreviewConfig { time_limit_ms: 200, ..PreviewConfig::default() };
    let mut host = PreviewHost::boot(&config);

    expect_failure(&host.render_source("while (true) {}\nfunction Widget() { return null; }"), FailureKind::Evaluation);

    // 超时之后宿主仍可继续使用
    expect_view(&host.render_source("function Widget() { return null; }"));
}

/// 测试组件库与图标渲染
#[test]
fn test_material_and_icon_components() {
    let source = r#"
        import { Box, Button } from '@mui/material';
        import { Clock } from 'lucide-react';
        import DeleteIcon from '@mui/icons-material/Delete';

        export function placeholder() {}
    "#;
    // `export` 不被支持
    expect_failure(&render(source), FailureKind::Evaluation);

    let source = r#"
        import { Box, Button } from '@mui/material';
        import { Clock } from 'lucide-react';
        import DeleteIcon from '@mui/icons-material/Delete';

        function AIGeneratedWidget() {
            return React.createElement(Box, { sx: { p: 2 } },
                React.createElement(Button, { variant: 'contained', onClick: () => {}, startIcon: React.createElement(Clock, { size: 16 }) }, 'Start'),
                React.createElement(DeleteIcon, { fontSize: 'small' }));
        }
    "#;
    let outcome = render(source);
    let view = expect_view(&outcome);

    let button = find_tag(&view.tree, "MuiButton").expect("button");
    assert_eq!(button.handlers, vec!["onClick".to_string()]);
    assert_eq!(text_content(&button.children), "Start");
    let icon = button.slots.get("startIcon").and_then(|nodes| nodes[0].as_element()).expect("start icon");
    assert_eq!(icon.tag, "svg");
    assert_eq!(icon.props.get("width"), Some(&serde_json::json!(16)));
    assert_eq!(icon.children.len(), 2);

    let boxed = find_tag(&view.tree, "MuiBox").expect("box");
    assert_eq!(boxed.children.len(), 2);
    let delete = boxed.children[1].as_element().expect("delete icon");
    assert_eq!(delete.prop_str("data-icon"), Some("Delete"));
    assert_eq!(delete.props.get("width"), Some(&serde_json::json!(20)));
    assert!(view.handlers.contains(&"MuiButton.onClick".to_string()));
}

/// 测试主题容器使用配置的主题
#[test]
fn test_theme_container_mode() {
    let config = PreviewConfig { theme: crate::ThemeMode::Light, ..PreviewConfig::default() };
    let mut host = PreviewHost::boot(&config);
    let outcome = host.render_source("function Widget() { return null; }");
    let theme = find_tag(&expect_view(&outcome).tree, "lp-theme").expect("theme container").clone();
    assert_eq!(theme.prop_str("data-mode"), Some("light"));
}

/// 测试 useTheme 读取容器提供的调色板
#[test]
fn test_use_theme_reads_palette() {
    let source = r#"
        import { useTheme } from '@mui/material/styles';
        function Widget() {
            const theme = useTheme();
            return React.createElement('span', null, theme.palette.mode);
        }
    "#;
    assert_eq!(text_content(content(expect_view(&render(source)))), "dark");
}

/// 测试 console 输出被收集
#[test]
fn test_console_output_collected() {
    let source = r#"
        console.log('loaded', 1, { a: true });
        function Widget() { console.warn('rendering'); return null; }
    "#;
    let outcome = render(source);
    let view = expect_view(&outcome);
    assert_eq!(view.console.len(), 2);
    assert_eq!(view.console[0].level, ConsoleLevel::Log);
    assert_eq!(view.console[0].message, "loaded 1 {\"a\":true}");
    assert_eq!(view.console[1].level, ConsoleLevel::Warn);
}

/// 测试类组件
#[test]
fn test_class_component() {
    let source = r#"
        class Panel extends React.Component {
            render() { return React.createElement('section', null, 'panel'); }
        }
    "#;
    let outcome = render(source);
    let view = expect_view(&outcome);
    assert_eq!(view.component, "Panel");
    assert!(find_tag(&view.tree, "section").is_some());
}

/// 测试前置依赖失败的宿主
#[test]
fn test_unavailable_host_never_renders() {
    let mut host = PreviewHost::unavailable("runtime failed to load");
    assert!(!host.is_available());

    let outcome = host.render_source("function Widget() { return null; }");
    assert_eq!(expect_failure(&outcome, FailureKind::Unavailable), "runtime failed to load");
    assert_eq!(host.attempts(), 0);
    assert!(matches!(host.state(), HostState::Unavailable(_)));
}

/// 测试修改源码会清除保留的结果
#[test]
fn test_set_source_clears_outcome() {
    let mut host = PreviewHost::boot(&PreviewConfig::default());
    assert_eq!(host.state(), &HostState::Idle);

    host.render_source("function Widget() { return null; }");
    assert!(host.outcome().is_some());

    host.set_source("function Other() { return null; }");
    assert_eq!(host.state(), &HostState::Idle);
    assert!(host.outcome().is_none());
    assert_eq!(host.source(), "function Other() { return null; }");
}

/// 测试状态回调按顺序收到 Loading 与 Rendered
#[test]
fn test_listener_sees_loading_then_rendered() {
    let seen: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();

    let mut host = PreviewHost::boot(&PreviewConfig::default());
    host.set_listener(move |state| {
        log.borrow_mut().push(match state {
            HostState::Unavailable(_) => "unavailable",
            HostState::Idle => "idle",
            HostState::Loading => "loading",
            HostState::Rendered(_) => "rendered",
        });
    });

    host.render_source("function Widget() { return null; }");
    host.set_source("");
    assert_eq!(*seen.borrow(), vec!["loading", "rendered", "idle"]);
}

/// 测试结果序列化
#[test]
fn test_outcome_serialization() {
    let json = serde_json::to_value(render("function Widget() { return React.createElement('b', null, 'hi'); }"))
        .expect("serialize");
    assert_eq!(json["status"], "success");
    assert_eq!(json["component"], "Widget");
    assert_eq!(json["rule"], "uppercase_name");

    let json = serde_json::to_value(render("const x = 1;")).expect("serialize");
    assert_eq!(json["status"], "failure");
    assert_eq!(json["kind"], "resolution");
}

/// 测试 JS 运行时本身
#[test]
fn test_runtime_eval() {
    let js = JsRuntime::new(RuntimeLimits::default()).expect("runtime");
    assert_eq!(js.eval("1 + 2").expect("eval"), "3");
    assert_eq!(js.eval("'a' + 'b'").expect("eval"), "ab");
    assert!(js.eval("throw new TypeError('bad')").is_err());
}

/// 测试宿主中各模块的导出与模块目录一致
#[test]
fn test_host_modules_match_registry() {
    let registry = ModuleRegistry::new();
    let ids: Vec<&str> = registry.entries().iter().map(|e| e.id.as_str()).collect();
    let source = format!(
        "const ids = {};\nconst catalog = JSON.stringify(ids.map(function (id) {{ var m = __modules[id]; return typeof m === 'function' ? null : Object.keys(m); }}));",
        serde_json::to_string(&ids).expect("ids")
    );

    let js = JsRuntime::new(RuntimeLimits::default()).expect("runtime");
    let json = js
        .with_fresh_context(|ctx| {
            let sandbox = Sandbox::load(ctx, &ConsoleBuffer::new(), &Palette::dark(), &registry, 25)?;
            let bindings = sandbox.execute(&build_sandbox_source(&source, &["ids".to_string(), "catalog".to_string()]))?;
            Ok(bindings
                .iter()
                .find(|b| b.binding.name == "catalog")
                .map(|b| value_to_string(&b.value))
                .unwrap_or_default())
        })
        .expect("catalog");
    let host: Vec<Option<Vec<String>>> = serde_json::from_str(&json).expect("catalog json");
    assert_eq!(host.len(), ids.len());

    for (id, keys) in ids.iter().zip(host) {
        let mut expected: Vec<&str> = registry.exports(id).to_vec();
        expected.sort_unstable();
        match keys {
            // 单个图标模块本身就是组件
            None => assert!(expected.is_empty(), "{}", id),
            Some(mut keys) => {
                keys.sort_unstable();
                assert_eq!(keys, expected, "{}", id);
            }
        }
    }
}
