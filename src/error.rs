//! 错误类型

/// 预览引擎错误
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// QuickJS 运行时创建或宿主脚本加载失败
    #[error("engine error: {0}")]
    Engine(String),

    /// 沙箱执行期间抛出的异常（语法错误、运行时错误等）
    #[error("{0}")]
    Evaluation(String),

    /// 没有找到可作为组件的函数
    #[error("{0}")]
    Resolution(String),

    /// 前置依赖加载失败，本次会话不可用
    #[error("preview unavailable: {0}")]
    Unavailable(String),

    /// 片段存储
    #[error("storage error: {0}")]
    Storage(String),

    /// 组件生成服务
    #[error("generator error: {0}")]
    Generator(String),

    /// 配置文件
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<rquickjs::Error> for PreviewError {
    fn from(err: rquickjs::Error) -> Self {
        PreviewError::Engine(err.to_string())
    }
}

pub type Result<T, E = PreviewError> = std::result::Result<T, E>;
