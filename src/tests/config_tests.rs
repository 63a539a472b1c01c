//! 配置与主题测试

use crate::config::PreviewConfig;
use crate::theme::{Palette, ThemeMode};
use crate::registry::{ModuleRegistry, MATERIAL, REACT};
use std::path::PathBuf;

/// 测试默认配置
#[test]
fn test_default_config() {
    let config = PreviewConfig::default();
    assert_eq!(config.theme, ThemeMode::Dark);
    assert_eq!(config.time_limit_ms, 5000);
    assert_eq!(config.max_render_passes, 25);
}

/// 测试部分字段的 TOML
#[test]
fn test_partial_toml() {
    let config = PreviewConfig::from_toml(
        r#"
        theme = "light"
        time_limit_ms = 1500
        storage_path = "/tmp/lp.json"
        "#,
    )
    .unwrap();
    assert_eq!(config.theme, ThemeMode::Light);
    assert_eq!(config.time_limit_ms, 1500);
    assert_eq!(config.storage_path, PathBuf::from("/tmp/lp.json"));
    assert_eq!(config.generator_url, PreviewConfig::default().generator_url);
}

/// 测试非法配置
#[test]
fn test_invalid_toml() {
    assert!(PreviewConfig::from_toml("theme = \"sepia\"").is_err());
    assert!(PreviewConfig::from_toml("time_limit_ms = \"soon\"").is_err());
}

/// 测试配置文件加载
#[test]
fn test_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = PreviewConfig::load(dir.path().join("absent.toml")).unwrap();
    assert_eq!(missing, PreviewConfig::default());

    let path = dir.path().join("live-preview.toml");
    std::fs::write(&path, "max_render_passes = 3\n").unwrap();
    assert_eq!(PreviewConfig::load(&path).unwrap().max_render_passes, 3);
}

/// 测试主题模式解析
#[test]
fn test_theme_mode_from_str() {
    assert_eq!("Dark".parse::<ThemeMode>(), Ok(ThemeMode::Dark));
    assert_eq!("light".parse::<ThemeMode>(), Ok(ThemeMode::Light));
    assert!("blue".parse::<ThemeMode>().is_err());
}

/// 测试传给宿主脚本的调色板结构
#[test]
fn test_palette_js_value() {
    let value = Palette::dark().to_js_value();
    assert_eq!(value["mode"], "dark");
    assert_eq!(value["primary"]["main"], "#1976d2");
    assert_eq!(value["background"]["default"], "#121212");
    assert_eq!(value["text"]["secondary"], "rgba(255, 255, 255, 0.7)");

    assert_eq!(Palette::for_mode(ThemeMode::Light).mode, ThemeMode::Light);
    assert!(Palette::light().css_variables().contains("--lp-text: #344054;"));
}

/// 测试模块目录
#[test]
fn test_module_registry_catalog() {
    let registry = ModuleRegistry::new();
    assert!(registry.is_known(REACT));
    assert!(registry.is_known("@mui/icons-material/Delete"));
    assert!(!registry.is_known("recharts"));
    assert!(registry.has_export(REACT, "useState"));
    assert!(registry.has_export(MATERIAL, "ThemeProvider"));
    assert!(!registry.has_export(MATERIAL, "DataGrid"));
    assert!(registry.exports("recharts").is_empty());

    let catalog: serde_json::Value = serde_json::from_str(&registry.catalog_json()).unwrap();
    assert!(catalog["material"].as_array().unwrap().iter().any(|v| v == "Button"));
    assert_eq!(catalog["lucideIcons"].as_array().unwrap().len(), 6);
}
