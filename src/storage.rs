//! 已保存片段的存储
//!
//! 片段列表以 JSON 字符串数组的形式保存在固定的键下。核心渲染流程不访问存储，
//! 只通过 [`SnippetRepository`] 读写整段源码。

use crate::error::{PreviewError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 片段列表使用的存储键
pub const SAVED_COMPONENTS_KEY: &str = "savedComponents";

/// 预览标签的最大长度
const PREVIEW_LEN: usize = 25;

/// 键值存储
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// 内存存储
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 文件存储：整个存储是磁盘上的一个 JSON 对象
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let text = std::fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&text)
            .map_err(|e| PreviewError::Storage(format!("{}: {}", self.path.display(), e)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&all)?)?;
        Ok(())
    }
}

/// 保存被拒绝的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SaveRejected {
    #[error("Cannot save empty component.")]
    Empty,
    #[error("This component is already saved.")]
    Duplicate,
}

/// 片段仓库
pub struct SnippetRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SnippetRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 全部片段；存储内容损坏时视为空列表
    pub fn list(&self) -> Result<Vec<String>> {
        let Some(raw) = self.store.get(SAVED_COMPONENTS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(list) => Ok(list),
            Err(e) => {
                tracing::warn!(error = %e, "saved component list is corrupt, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    pub fn get(&self, index: usize) -> Result<Option<String>> {
        Ok(self.list()?.into_iter().nth(index))
    }

    /// 追加片段；空白内容和完全相同的内容会被拒绝
    pub fn add(&mut self, source: &str) -> Result<std::result::Result<usize, SaveRejected>> {
        if source.trim().is_empty() {
            return Ok(Err(SaveRejected::Empty));
        }
        let mut list = self.list()?;
        if list.iter().any(|s| s == source) {
            return Ok(Err(SaveRejected::Duplicate));
        }
        list.push(source.to_string());
        self.write(&list)?;
        tracing::info!(count = list.len(), "component saved");
        Ok(Ok(list.len() - 1))
    }

    /// 删除并返回指定位置的片段
    pub fn remove_at(&mut self, index: usize) -> Result<String> {
        let mut list = self.list()?;
        if index >= list.len() {
            return Err(PreviewError::Storage(format!(
                "no saved component at index {} ({} saved)",
                index,
                list.len()
            )));
        }
        let removed = list.remove(index);
        self.write(&list)?;
        Ok(removed)
    }

    fn write(&mut self, list: &[String]) -> Result<()> {
        let raw = serde_json::to_string(list)?;
        self.store.set(SAVED_COMPONENTS_KEY, &raw)
    }
}

/// 列表中显示的标签：第一行非空内容，超长截断
pub fn preview_label(source: &str, index: usize) -> String {
    match source.lines().find(|line| !line.trim().is_empty()) {
        Some(line) => {
            let chars: Vec<char> = line.chars().collect();
            if chars.len() > PREVIEW_LEN {
                format!("{}...", chars[..PREVIEW_LEN].iter().collect::<String>())
            } else {
                line.to_string()
            }
        }
        None => format!("Component {}", index + 1),
    }
}
