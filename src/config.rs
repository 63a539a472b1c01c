//! 预览配置

use crate::error::{PreviewError, Result};
use crate::theme::ThemeMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 预览配置，对应 TOML 文件，缺省字段使用默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub theme: ThemeMode,
    /// QuickJS 堆上限
    pub memory_limit_bytes: usize,
    pub max_stack_size: usize,
    /// 单次渲染的执行时间上限（毫秒）
    pub time_limit_ms: u64,
    /// 挂载时允许的最大重复渲染次数
    pub max_render_passes: u32,
    pub storage_path: PathBuf,
    pub generator_url: String,
    pub generator_timeout_secs: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Dark,
            memory_limit_bytes: 64 * 1024 * 1024,
            max_stack_size: 1024 * 1024,
            time_limit_ms: 5000,
            max_render_passes: 25,
            storage_path: PathBuf::from(".live-preview/snippets.json"),
            generator_url: "http://localhost:8000".to_string(),
            generator_timeout_secs: 60,
        }
    }
}

impl PreviewConfig {
    /// 从 TOML 文件加载；文件不存在时返回默认配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| PreviewError::Config(e.to_string()))
    }
}
