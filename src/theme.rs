//! 预览容器使用的固定主题

use crate::Color;
use serde::{Deserialize, Serialize};

/// 主题模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl std::str::FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Ok(ThemeMode::Dark),
            "light" => Ok(ThemeMode::Light),
            other => Err(format!("unknown theme mode: {}", other)),
        }
    }
}

/// 调色板
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Palette {
    pub mode: ThemeMode,
    pub primary: Color,
    pub secondary: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    pub success: Color,
    pub background: Color,
    pub paper: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub border: Color,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            mode: ThemeMode::Dark,
            primary: Color::from_hex(0x1976d2),
            secondary: Color::from_hex(0x9c27b0),
            error: Color::from_hex(0xd32f2f),
            warning: Color::from_hex(0xed6c02),
            info: Color::from_hex(0x0288d1),
            success: Color::from_hex(0x2e7d32),
            background: Color::from_hex(0x121212),
            paper: Color::from_hex(0x1e1e1e),
            text_primary: Color::WHITE,
            text_secondary: Color::WHITE.with_alpha(0.7),
            border: Color::WHITE.with_alpha(0.12),
        }
    }

    pub fn light() -> Self {
        Self {
            mode: ThemeMode::Light,
            primary: Color::from_hex(0x7f56d9),
            secondary: Color::from_hex(0x9c27b0),
            error: Color::from_hex(0xd32f2f),
            warning: Color::from_hex(0xed6c02),
            info: Color::from_hex(0x0288d1),
            success: Color::from_hex(0x2e7d32),
            background: Color::WHITE,
            paper: Color::from_hex(0xf5f5f5),
            text_primary: Color::from_hex(0x344054),
            text_secondary: Color::from_hex(0x667085),
            border: Color::from_hex(0xd0d5dd),
        }
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    /// 传给 JS 端 `ThemeProvider` / `createTheme` 的调色板对象
    pub fn to_js_value(&self) -> serde_json::Value {
        serde_json::json!({
            "mode": self.mode,
            "primary": { "main": self.primary },
            "secondary": { "main": self.secondary },
            "error": { "main": self.error },
            "warning": { "main": self.warning },
            "info": { "main": self.info },
            "success": { "main": self.success },
            "background": { "default": self.background, "paper": self.paper },
            "text": { "primary": self.text_primary, "secondary": self.text_secondary },
            "divider": self.border,
        })
    }

    /// CSS 自定义属性
    pub fn css_variables(&self) -> String {
        [
            ("--lp-primary", self.primary),
            ("--lp-secondary", self.secondary),
            ("--lp-error", self.error),
            ("--lp-warning", self.warning),
            ("--lp-info", self.info),
            ("--lp-success", self.success),
            ("--lp-background", self.background),
            ("--lp-paper", self.paper),
            ("--lp-text", self.text_primary),
            ("--lp-text-secondary", self.text_secondary),
            ("--lp-border", self.border),
        ]
        .iter()
        .map(|(name, color)| format!("{}: {};", name, color))
        .collect::<Vec<_>>()
        .join(" ")
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}
