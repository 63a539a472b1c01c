//! 组件生成服务客户端
//!
//! 生成服务根据描述、功能列表和数据源返回组件源码。返回的源码与手写源码走完全相同的渲染流程。

use crate::error::{PreviewError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 数据源描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceDescriptor {
    pub id: String,
    #[serde(alias = "displayName", alias = "display_name")]
    pub name: String,
    #[serde(default, alias = "record_count")]
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// 组件模板
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub template: String,
}

/// 生成请求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub description: String,
    pub features: Vec<String>,
    pub complexity: String,
    pub style: String,
    pub data_sources: Vec<DataSourceDescriptor>,
}

impl GenerateRequest {
    pub fn new(description: impl Into<String>, data_sources: Vec<DataSourceDescriptor>) -> Self {
        Self {
            description: description.into(),
            features: Vec::new(),
            complexity: "medium".to_string(),
            style: "modern".to_string(),
            data_sources,
        }
    }

    pub fn with_features(mut self, features: &str) -> Self {
        self.features = parse_features(features);
        self
    }

    /// 发送前的检查
    pub fn validate(&self) -> Result<()> {
        if self.data_sources.is_empty() {
            return Err(PreviewError::Generator(
                "Please select at least one data source for your component".to_string(),
            ));
        }
        if self.description.trim().is_empty() {
            return Err(PreviewError::Generator("Please describe the component you want to generate".to_string()));
        }
        Ok(())
    }
}

/// 生成结果
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerateResponse {
    pub component_code: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// 组件生成服务
pub trait ComponentGenerator {
    fn data_sources(&self) -> Result<Vec<DataSourceDescriptor>>;
    fn templates(&self) -> Result<Vec<ComponentTemplate>>;
    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;
}

/// 基于 HTTP 的生成服务客户端
pub struct HttpGenerator {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpGenerator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let body = match self.agent.get(&url).call() {
            Ok(resp) => resp.into_string()?,
            Err(err) => return Err(request_error(err)),
        };
        Ok(serde_json::from_str(&body)?)
    }
}

/// 服务端的 `detail` 字段优先作为错误信息
fn request_error(err: ureq::Error) -> PreviewError {
    match err {
        ureq::Error::Status(code, resp) => {
            let detail = resp
                .into_string()
                .ok()
                .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
                .and_then(|body| body.detail);
            PreviewError::Generator(detail.unwrap_or_else(|| format!("server responded with status {}", code)))
        }
        ureq::Error::Transport(t) => PreviewError::Generator(t.to_string()),
    }
}

impl ComponentGenerator for HttpGenerator {
    fn data_sources(&self) -> Result<Vec<DataSourceDescriptor>> {
        self.get_json("/available-data-sources")
    }

    fn templates(&self) -> Result<Vec<ComponentTemplate>> {
        self.get_json("/component-templates")
    }

    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        request.validate()?;
        let url = self.url("/generate-component");
        tracing::info!(%url, sources = request.data_sources.len(), "requesting component");
        let payload = serde_json::to_string(request)?;
        let body = match self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&payload)
        {
            Ok(resp) => resp.into_string()?,
            Err(err) => return Err(request_error(err)),
        };
        Ok(serde_json::from_str(&body)?)
    }
}

/// 逗号分隔的功能列表
pub fn parse_features(features: &str) -> Vec<String> {
    features
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

/// `orderItems` -> `Order Items`
pub fn format_table_name(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 4);
    for (i, c) in table.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out.trim().to_string()
}

/// 按 id 从可用数据源中挑选
pub fn select_sources(available: &[DataSourceDescriptor], ids: &[String]) -> Vec<DataSourceDescriptor> {
    ids.iter()
        .filter_map(|id| available.iter().find(|ds| &ds.id == id).cloned())
        .collect()
}
