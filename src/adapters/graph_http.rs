use crate::config::toml_config::GraphConfig;
use crate::domain::model::{Record, ServerInfo};
use crate::domain::ports::GraphClient;
use crate::utils::error::{DiagError, Result};
use crate::utils::validation::{self, Validate};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

const DEFAULT_HTTP_PORT: u16 = 7474;

/// 驅動程式 URI 對應到的 HTTP 端點
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEndpoint {
    pub base_url: String,
    pub accept_invalid_certs: bool,
}

impl GraphEndpoint {
    pub fn parse(uri: &str) -> Result<Self> {
        validation::validate_graph_uri("graph.uri", uri)?;
        let parsed = Url::parse(uri)?;
        let host = parsed.host_str().unwrap_or_default();

        let endpoint = match parsed.scheme() {
            "neo4j+s" | "bolt+s" => Self {
                base_url: format!("https://{}", host),
                accept_invalid_certs: false,
            },
            "neo4j+ssc" | "bolt+ssc" => Self {
                base_url: format!("https://{}", host),
                accept_invalid_certs: true,
            },
            "neo4j" | "bolt" => Self {
                base_url: format!("http://{}:{}", host, DEFAULT_HTTP_PORT),
                accept_invalid_certs: false,
            },
            _ => Self {
                base_url: parsed.as_str().trim_end_matches('/').to_string(),
                accept_invalid_certs: false,
            },
        };

        Ok(endpoint)
    }

    pub fn query_url(&self, database: &str) -> String {
        format!("{}/db/{}/query/v2", self.base_url, database)
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: Option<QueryData>,
    #[serde(default)]
    errors: Vec<QueryErrorBody>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    fields: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct QueryErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl QueryData {
    fn into_records(self) -> Vec<Record> {
        let fields = self.fields;
        self.values
            .into_iter()
            .map(|row| {
                let data: HashMap<String, serde_json::Value> =
                    fields.iter().cloned().zip(row).collect();
                Record { data }
            })
            .collect()
    }
}

/// 透過 HTTP Query API 連線的圖資料庫客戶端
pub struct HttpGraphClient {
    client: Client,
    endpoint: GraphEndpoint,
    database: String,
    username: String,
    password: String,
}

impl HttpGraphClient {
    pub fn new(config: &GraphConfig) -> Result<Self> {
        config.validate()?;
        let endpoint = GraphEndpoint::parse(&config.uri)?;

        let client = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(endpoint.accept_invalid_certs)
            .build()?;

        tracing::debug!(
            "Graph client for {} -> {} (database: {})",
            config.uri,
            endpoint.base_url,
            config.database
        );

        Ok(Self {
            client,
            endpoint,
            database: config.database.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn endpoint(&self) -> &GraphEndpoint {
        &self.endpoint
    }
}

#[async_trait]
impl GraphClient for HttpGraphClient {
    async fn verify_connectivity(&self) -> Result<ServerInfo> {
        let url = format!("{}/", self.endpoint.base_url);
        tracing::debug!("Discovery request to: {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiagError::HttpStatusError {
                method: "GET".to_string(),
                url,
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let info: ServerInfo = response.json().await?;
        Ok(info)
    }

    async fn run(
        &self,
        statement: &str,
        parameters: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Vec<Record>> {
        let url = self.endpoint.query_url(&self.database);
        tracing::debug!("Running query: {}", statement);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&serde_json::json!({
                "statement": statement,
                "parameters": parameters,
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("Query response status: {}", status);

        // 錯誤回應通常也帶有 errors 陣列
        let parsed = serde_json::from_str::<QueryResponse>(&body);

        if let Ok(QueryResponse { errors, .. }) = &parsed {
            if let Some(first) = errors.first() {
                return Err(DiagError::GraphQueryError {
                    code: first.code.clone(),
                    message: first.message.clone(),
                });
            }
        }

        if !status.is_success() {
            return Err(DiagError::HttpStatusError {
                method: "POST".to_string(),
                url,
                status: status.as_u16(),
                body,
            });
        }

        let data = parsed?.data.ok_or_else(|| DiagError::UnexpectedResponse {
            message: "query response has no data section".to_string(),
        })?;

        Ok(data.into_records())
    }
}
