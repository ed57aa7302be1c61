use crate::domain::model::SuggestRequest;
use crate::utils::error::{DiagError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_GRAPH_URI: &str = "neo4j+s://383b0a61.databases.neo4j.io";
pub const DEFAULT_DEPLOYMENT_URL: &str =
    "https://english-knowledge-graph-bsfvthw7u-chao-wangs-projects-dfded257.vercel.app";
pub const DEFAULT_SUGGEST_ENDPOINT: &str = "http://localhost:8000/api/annotation/suggest";
pub const DEFAULT_QUESTION_TYPE: &str = "选择题";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub deployment: DeploymentConfig,
    #[serde(default)]
    pub suggest: SuggestConfig,
    #[serde(default)]
    pub knowledge_points: KnowledgePointsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_graph_uri")]
    pub uri: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default = "default_deployment_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_init_database_path")]
    pub init_database_path: String,
    #[serde(default = "default_sample_data_path")]
    pub sample_data_path: String,
    #[serde(default = "default_stats_path")]
    pub stats_path: String,
    #[serde(default = "default_health_path")]
    pub health_path: String,
    #[serde(default = "default_health_timeout_seconds")]
    pub health_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestConfig {
    /// 前端顯示診斷用的建議端點（通常是本機開發伺服器）
    #[serde(default = "default_suggest_endpoint")]
    pub endpoint: String,
    /// 準確度檢查時相對於 deployment.base_url 的路徑
    #[serde(default = "default_suggest_path")]
    pub path: String,
    #[serde(default = "default_question_type")]
    pub question_type: String,
    #[serde(default = "default_suggest_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_samples")]
    pub samples: Vec<String>,
    #[serde(default = "default_expectations")]
    pub expectations: Vec<SuggestionExpectation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionExpectation {
    pub name: String,
    pub content: String,
    pub expected: String,
    pub min_confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgePointsConfig {
    #[serde(default = "default_key_points")]
    pub key_points: Vec<String>,
    #[serde(default = "default_preview_limit")]
    pub preview_limit: u64,
}

fn default_graph_uri() -> String {
    DEFAULT_GRAPH_URI.to_string()
}

fn default_username() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    std::env::var("NEO4J_PASSWORD").unwrap_or_else(|_| "${NEO4J_PASSWORD}".to_string())
}

fn default_database() -> String {
    "neo4j".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_deployment_url() -> String {
    DEFAULT_DEPLOYMENT_URL.to_string()
}

fn default_init_database_path() -> String {
    "/api/init/database".to_string()
}

fn default_sample_data_path() -> String {
    "/api/init/sample-data".to_string()
}

fn default_stats_path() -> String {
    "/api/analytics/dashboard-stats".to_string()
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_health_timeout_seconds() -> u64 {
    10
}

fn default_suggest_endpoint() -> String {
    DEFAULT_SUGGEST_ENDPOINT.to_string()
}

fn default_suggest_path() -> String {
    "/api/annotation/suggest".to_string()
}

fn default_question_type() -> String {
    DEFAULT_QUESTION_TYPE.to_string()
}

fn default_suggest_timeout_seconds() -> u64 {
    15
}

fn default_request_delay_ms() -> u64 {
    2000
}

fn default_samples() -> Vec<String> {
    vec![
        "I have already finished my homework.".to_string(),
        "She goes to school every day.".to_string(),
        "The letter was written by Tom yesterday.".to_string(),
    ]
}

fn default_expectations() -> Vec<SuggestionExpectation> {
    let case = |name: &str, content: &str, expected: &str, min_confidence: f64| {
        SuggestionExpectation {
            name: name.to_string(),
            content: content.to_string(),
            expected: expected.to_string(),
            min_confidence,
        }
    };

    vec![
        case(
            "情态动词识别",
            "You must finish your homework before going out.",
            "情态动词",
            0.8,
        ),
        case(
            "倒装句识别",
            "Never have I seen such a beautiful sunset.",
            "倒装句",
            0.8,
        ),
        case(
            "现在进行时识别",
            "Look! The children are playing in the playground.",
            "现在进行时",
            0.5,
        ),
        case(
            "非谓语动词识别",
            "The manager, concerned about his company's performance, held a press conference.",
            "非谓语动词",
            0.4,
        ),
    ]
}

fn default_key_points() -> Vec<String> {
    vec!["情态动词".to_string(), "倒装句".to_string(), "虚拟语气".to_string()]
}

fn default_preview_limit() -> u64 {
    5
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: default_graph_uri(),
            username: default_username(),
            password: default_password(),
            database: default_database(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            base_url: default_deployment_url(),
            timeout_seconds: default_timeout_seconds(),
            init_database_path: default_init_database_path(),
            sample_data_path: default_sample_data_path(),
            stats_path: default_stats_path(),
            health_path: default_health_path(),
            health_timeout_seconds: default_health_timeout_seconds(),
        }
    }
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            endpoint: default_suggest_endpoint(),
            path: default_suggest_path(),
            question_type: default_question_type(),
            timeout_seconds: default_suggest_timeout_seconds(),
            request_delay_ms: default_request_delay_ms(),
            samples: default_samples(),
            expectations: default_expectations(),
        }
    }
}

impl Default for KnowledgePointsConfig {
    fn default() -> Self {
        Self {
            key_points: default_key_points(),
            preview_limit: default_preview_limit(),
        }
    }
}

impl DiagConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DiagError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DiagError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 沒有指定檔案時使用內建預設值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${NEO4J_PASSWORD})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DiagError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn suggest_requests(&self) -> Vec<SuggestRequest> {
        self.suggest
            .samples
            .iter()
            .map(|content| SuggestRequest {
                question_content: content.clone(),
                question_type: self.suggest.question_type.clone(),
            })
            .collect()
    }
}

impl GraphConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl DeploymentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Validate for GraphConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_graph_uri("graph.uri", &self.uri)?;
        validation::validate_non_empty_string("graph.username", &self.username)?;
        validation::validate_substituted("graph.password", &self.password)?;
        validation::validate_non_empty_string("graph.database", &self.database)?;
        validation::validate_positive_number("graph.timeout_seconds", self.timeout_seconds, 1)?;
        Ok(())
    }
}

impl Validate for DeploymentConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("deployment.base_url", &self.base_url)?;
        validation::validate_positive_number(
            "deployment.timeout_seconds",
            self.timeout_seconds,
            1,
        )?;
        validation::validate_positive_number(
            "deployment.health_timeout_seconds",
            self.health_timeout_seconds,
            1,
        )?;
        for (field, path) in [
            ("deployment.init_database_path", &self.init_database_path),
            ("deployment.sample_data_path", &self.sample_data_path),
            ("deployment.stats_path", &self.stats_path),
            ("deployment.health_path", &self.health_path),
        ] {
            validation::validate_path(field, path)?;
        }
        Ok(())
    }
}

impl Validate for SuggestConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("suggest.endpoint", &self.endpoint)?;
        validation::validate_path("suggest.path", &self.path)?;
        validation::validate_non_empty_string("suggest.question_type", &self.question_type)?;
        validation::validate_positive_number("suggest.timeout_seconds", self.timeout_seconds, 1)?;
        for (index, expectation) in self.expectations.iter().enumerate() {
            validation::validate_range(
                &format!("suggest.expectations[{}].min_confidence", index),
                expectation.min_confidence,
                0.0,
                1.0,
            )?;
        }
        Ok(())
    }
}

impl Validate for KnowledgePointsConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_positive_number(
            "knowledge_points.preview_limit",
            self.preview_limit,
            1,
        )?;
        for (index, name) in self.key_points.iter().enumerate() {
            validation::validate_non_empty_string(
                &format!("knowledge_points.key_points[{}]", index),
                name,
            )?;
        }
        Ok(())
    }
}

impl Validate for DiagConfig {
    fn validate(&self) -> Result<()> {
        self.graph.validate()?;
        self.deployment.validate()?;
        self.suggest.validate()?;
        self.knowledge_points.validate()?;
        Ok(())
    }
}
