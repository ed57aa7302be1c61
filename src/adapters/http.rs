use crate::domain::model::{SuggestRequest, SuggestResponse};
use crate::utils::error::{DiagError, Result};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// 一次 HTTP 呼叫的狀態碼與原始回應
#[derive(Debug, Clone)]
pub struct HttpOutcome {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub body: String,
}

impl HttpOutcome {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// 非 2xx 時轉成錯誤
    pub fn require_success(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(DiagError::HttpStatusError {
            method: self.method.to_string(),
            url: self.url,
            status: self.status.as_u16(),
            body: self.body,
        })
    }

    /// 錯誤訊息只保留回應開頭
    pub fn body_excerpt(&self, max_chars: usize) -> String {
        let mut excerpt: String = self.body.chars().take(max_chars).collect();
        if self.body.chars().count() > max_chars {
            excerpt.push('…');
        }
        excerpt
    }
}

/// 已部署 API 的 HTTP 客戶端
#[derive(Debug, Clone)]
pub struct DeploymentClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl DeploymentClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        crate::utils::validation::validate_url("deployment.base_url", base_url)?;
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str) -> Result<HttpOutcome> {
        self.send(Method::GET, path, None, self.timeout).await
    }

    pub async fn get_with_timeout(&self, path: &str, timeout: Duration) -> Result<HttpOutcome> {
        self.send(Method::GET, path, None, timeout).await
    }

    pub async fn post(&self, path: &str) -> Result<HttpOutcome> {
        self.send(Method::POST, path, None, self.timeout).await
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpOutcome> {
        self.send(Method::POST, path, Some(body), timeout).await
    }

    /// 呼叫建議端點；`path` 可以是完整 URL
    pub async fn suggest(
        &self,
        path: &str,
        request: &SuggestRequest,
        timeout: Duration,
    ) -> Result<SuggestResponse> {
        let body = serde_json::to_value(request)?;
        let outcome = self
            .post_json(path, &body, timeout)
            .await?
            .require_success()?;
        outcome.json()
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        timeout: Duration,
    ) -> Result<HttpOutcome> {
        let url = self.url(path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), &url).timeout(timeout);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("{} {} -> {}", method, url, status);

        let body = response.text().await?;
        Ok(HttpOutcome {
            method,
            url,
            status,
            body,
        })
    }
}
