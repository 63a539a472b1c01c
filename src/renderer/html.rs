//! HTML 序列化
//!
//! 把挂载得到的宿主节点树转成静态 HTML：`Mui*` 包装组件映射到语义标签，
//! `style` / `sx` 对象转成内联样式，调色板路径（如 `primary.main`）按当前主题取色。

use super::view::{ElementNode, ViewNode};
use crate::runtime::{FailureReport, MountedView, RenderOutcome, SUCCESS_MESSAGE};
use crate::theme::Palette;
use serde_json::{Map, Value as JsonValue};

/// 主题间距单位
const SPACING_PX: f64 = 8.0;

/// 无单位的 CSS 数值属性
const UNITLESS: &[&str] = &["opacity", "z-index", "font-weight", "line-height", "flex", "flex-grow", "flex-shrink", "order"];

/// 普通 HTML 元素直接输出的属性
const PASSTHROUGH_ATTRS: &[&str] = &[
    "id", "title", "type", "value", "placeholder", "disabled", "checked", "href", "name", "src", "alt", "role",
];

const VOID_TAGS: &[&str] = &["input", "hr", "img", "br"];

/// HTML 渲染器
pub struct HtmlRenderer<'a> {
    palette: &'a Palette,
}

impl<'a> HtmlRenderer<'a> {
    pub fn new(palette: &'a Palette) -> Self {
        Self { palette }
    }

    /// 渲染节点列表
    pub fn render_nodes(&self, nodes: &[ViewNode]) -> String {
        let mut out = String::new();
        for node in nodes {
            self.render_node(node, &mut out);
        }
        out
    }

    /// 状态栏加预览区
    pub fn render_outcome(&self, outcome: &RenderOutcome) -> String {
        match outcome {
            RenderOutcome::Success(view) => self.render_success(view),
            RenderOutcome::Failure(report) => self.render_failure(report),
        }
    }

    /// 完整页面
    pub fn render_document(&self, outcome: &RenderOutcome) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Live Preview</title>\n\
             <style>:root {{ {vars} }} body {{ margin: 0; padding: 16px; font-family: sans-serif; \
             background: var(--lp-paper); color: var(--lp-text); }} .lp-status {{ padding: 8px 12px; \
             border-radius: 4px; margin-bottom: 16px; }} .lp-success {{ background: var(--lp-success); }} \
             .lp-error {{ background: var(--lp-error); }} .lp-error pre {{ font-family: monospace; \
             white-space: pre-wrap; }}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
            vars = self.palette.css_variables(),
            body = self.render_outcome(outcome),
        )
    }

    fn render_success(&self, view: &MountedView) -> String {
        format!(
            "<div class=\"lp-status lp-success\">{}</div>\n<div class=\"lp-preview\" data-component=\"{}\">{}</div>",
            escape(SUCCESS_MESSAGE),
            escape(&view.component),
            self.render_nodes(&view.tree)
        )
    }

    fn render_failure(&self, report: &FailureReport) -> String {
        format!(
            "<div class=\"lp-status lp-error\"><strong>Error</strong><pre>{}</pre><p><strong>Tip:</strong> {}</p></div>",
            escape(&report.message),
            escape(report.hint)
        )
    }

    fn render_node(&self, node: &ViewNode, out: &mut String) {
        match node {
            ViewNode::Text { text } => out.push_str(&escape(text)),
            ViewNode::Element(element) => self.render_element(element, out),
        }
    }

    fn render_element(&self, element: &ElementNode, out: &mut String) {
        let (tag, component) = match element.tag.strip_prefix("Mui") {
            Some(name) => (semantic_tag(name, &element.props), Some(name)),
            None if element.tag == "lp-theme" => ("div", None),
            None if is_valid_name(&element.tag) => (element.tag.as_str(), None),
            None => ("div", None),
        };

        out.push('<');
        out.push_str(tag);
        // 非法标签名只保留在 data-tag 中
        if component.is_none() && element.tag != "lp-theme" && !is_valid_name(&element.tag) {
            push_attr(out, "data-tag", &element.tag);
        }

        let mut classes: Vec<String> = Vec::new();
        if let Some(name) = component {
            classes.push(format!("Mui{}-root", name));
        }
        if element.tag == "lp-theme" {
            classes.push("lp-theme".to_string());
        }
        if let Some(class) = element.prop_str("className") {
            classes.push(class.to_string());
        }
        if !classes.is_empty() {
            push_attr(out, "class", &classes.join(" "));
        }

        let mut style = String::new();
        for (key, value) in &element.props {
            match key.as_str() {
                "className" | "children" => {}
                "style" | "sx" => {
                    if let Some(map) = value.as_object() {
                        style.push_str(&self.style_to_css(map, key == "sx"));
                    }
                }
                _ => {
                    let name = attr_name(key, component.is_some());
                    if !is_valid_name(&name) || name.to_ascii_lowercase().starts_with("on") {
                        continue;
                    }
                    if let Some(text) = attr_value(value) {
                        push_attr(out, &name, &text);
                    }
                }
            }
        }
        if !style.is_empty() {
            push_attr(out, "style", style.trim_end());
        }
        if !element.handlers.is_empty() {
            push_attr(out, "data-handlers", &element.handlers.join(" "));
        }

        if VOID_TAGS.contains(&tag) {
            out.push_str(" />");
            return;
        }
        out.push('>');

        for slot in ["startIcon", "icon", "avatar", "action"] {
            if let Some(nodes) = element.slots.get(slot) {
                out.push_str(&self.render_nodes(nodes));
            }
        }
        if let Some(name) = component {
            self.render_label_props(name, &element.props, out);
        }
        for child in &element.children {
            self.render_node(child, out);
        }
        if let Some(nodes) = element.slots.get("endIcon") {
            out.push_str(&self.render_nodes(nodes));
        }

        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }

    /// 以属性传入、需要显示为文本的内容
    fn render_label_props(&self, component: &str, props: &Map<String, JsonValue>, out: &mut String) {
        let keys: &[&str] = match component {
            "Chip" | "Tab" | "FormControlLabel" | "TextField" => &["label"],
            "ListItemText" => &["primary", "secondary"],
            "CardHeader" => &["title", "subheader"],
            _ => &[],
        };
        for key in keys {
            if let Some(text) = props.get(*key).and_then(attr_value) {
                out.push_str(&format!("<span class=\"Mui{}-{}\">{}</span>", component, key, escape(&text)));
            }
        }
    }

    /// 样式对象转 CSS；`sx` 中的间距数值按主题间距单位换算
    fn style_to_css(&self, map: &Map<String, JsonValue>, spacing: bool) -> String {
        let mut css = String::new();
        for (key, value) in map {
            for property in css_properties(key) {
                if let Some(v) = self.css_value(&property, value, spacing) {
                    css.push_str(&format!("{}: {}; ", property, v));
                }
            }
        }
        css
    }

    fn css_value(&self, property: &str, value: &JsonValue, spacing: bool) -> Option<String> {
        match value {
            JsonValue::String(s) => Some(self.palette_color(s).unwrap_or_else(|| s.clone())),
            JsonValue::Number(n) => {
                let n = n.as_f64()?;
                if UNITLESS.contains(&property) {
                    Some(format_number(n))
                } else if spacing
                    && (property.starts_with("padding") || property.starts_with("margin") || property == "gap")
                {
                    Some(format!("{}px", format_number(n * SPACING_PX)))
                } else {
                    Some(format!("{}px", format_number(n)))
                }
            }
            JsonValue::Bool(_) | JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
        }
    }

    /// `primary.main`、`background.default`、`text.secondary` 等调色板路径
    fn palette_color(&self, path: &str) -> Option<String> {
        let p = self.palette;
        let color = match path {
            "primary.main" | "primary" => p.primary,
            "secondary.main" | "secondary" => p.secondary,
            "error.main" | "error" => p.error,
            "warning.main" | "warning" => p.warning,
            "info.main" | "info" => p.info,
            "success.main" | "success" => p.success,
            "background.default" => p.background,
            "background.paper" => p.paper,
            "text.primary" => p.text_primary,
            "text.secondary" => p.text_secondary,
            "divider" => p.border,
            _ => return None,
        };
        Some(color.to_css())
    }
}

/// Mui 组件对应的 HTML 标签
fn semantic_tag<'t>(component: &str, props: &Map<String, JsonValue>) -> &'t str {
    match component {
        "Button" | "IconButton" | "Fab" | "Tab" | "ListItemButton" => "button",
        "Typography" => match props.get("variant").and_then(JsonValue::as_str) {
            Some("h1") => "h1",
            Some("h2") => "h2",
            Some("h3") => "h3",
            Some("h4") => "h4",
            Some("h5") => "h5",
            Some("h6") => "h6",
            Some("caption") | Some("overline") | Some("subtitle2") => "span",
            _ => "p",
        },
        "Checkbox" | "Switch" => "input",
        "Divider" => "hr",
        "List" => "ul",
        "ListItem" => "li",
        "FormLabel" | "InputLabel" | "FormControlLabel" => "label",
        "Select" => "select",
        "MenuItem" => "option",
        "LinearProgress" | "CircularProgress" => "progress",
        "Dialog" => "dialog",
        _ => "div",
    }
}

/// 样式键展开为 CSS 属性名，支持 `p` / `mx` / `bgcolor` 等简写
fn css_properties(key: &str) -> Vec<String> {
    let expand = |base: &str, sides: &[&str]| -> Vec<String> {
        if sides.is_empty() {
            vec![base.to_string()]
        } else {
            sides.iter().map(|s| format!("{}-{}", base, s)).collect()
        }
    };
    match key {
        "p" => expand("padding", &[]),
        "pt" => expand("padding", &["top"]),
        "pb" => expand("padding", &["bottom"]),
        "pl" => expand("padding", &["left"]),
        "pr" => expand("padding", &["right"]),
        "px" => expand("padding", &["left", "right"]),
        "py" => expand("padding", &["top", "bottom"]),
        "m" => expand("margin", &[]),
        "mt" => expand("margin", &["top"]),
        "mb" => expand("margin", &["bottom"]),
        "ml" => expand("margin", &["left"]),
        "mr" => expand("margin", &["right"]),
        "mx" => expand("margin", &["left", "right"]),
        "my" => expand("margin", &["top", "bottom"]),
        "bgcolor" => vec!["background-color".to_string()],
        other => vec![kebab_case(other)],
    }
}

fn attr_name(key: &str, is_component: bool) -> String {
    match key {
        "htmlFor" => "for".to_string(),
        "viewBox" => "viewBox".to_string(),
        k if k.starts_with("data-") || k.starts_with("aria-") => k.to_string(),
        k if is_component && !PASSTHROUGH_ATTRS.contains(&k) => format!("data-{}", kebab_case(k)),
        k => kebab_case(k),
    }
}

/// 标签名与属性名：`[A-Za-z][A-Za-z0-9:-]*`
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == ':' || c == '-')
}

fn attr_value(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(true) => Some("true".to_string()),
        JsonValue::Bool(false) | JsonValue::Null => None,
        JsonValue::Array(_) | JsonValue::Object(_) => Some(value.to_string()),
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

/// `strokeWidth` -> `stroke-width`
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// HTML 转义
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
