use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiagError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("{method} {url} returned HTTP {status}")]
    HttpStatusError {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Graph query failed [{code}]: {message}")]
    GraphQueryError { code: String, message: String },

    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Database,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DiagError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DiagError::ApiError(_) | DiagError::HttpStatusError { .. } => ErrorCategory::Network,
            DiagError::GraphQueryError { .. } => ErrorCategory::Database,
            DiagError::SerializationError(_) | DiagError::UnexpectedResponse { .. } => {
                ErrorCategory::Data
            }
            DiagError::UrlError(_)
            | DiagError::ConfigError { .. }
            | DiagError::ConfigValidationError { .. }
            | DiagError::InvalidConfigValueError { .. }
            | DiagError::MissingConfigError { .. } => ErrorCategory::Configuration,
            DiagError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DiagError::ApiError(e) if e.is_timeout() => ErrorSeverity::Medium,
            DiagError::HttpStatusError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            DiagError::ApiError(_)
            | DiagError::HttpStatusError { .. }
            | DiagError::GraphQueryError { .. }
            | DiagError::SerializationError(_)
            | DiagError::UnexpectedResponse { .. } => ErrorSeverity::High,
            DiagError::UrlError(_)
            | DiagError::ConfigError { .. }
            | DiagError::ConfigValidationError { .. }
            | DiagError::InvalidConfigValueError { .. }
            | DiagError::MissingConfigError { .. } => ErrorSeverity::High,
            DiagError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// 錯誤型別名稱，供日誌輸出
    pub fn type_name(&self) -> &'static str {
        match self {
            DiagError::ApiError(e) if e.is_timeout() => "Timeout",
            DiagError::ApiError(e) if e.is_connect() => "ConnectionError",
            DiagError::ApiError(_) => "ApiError",
            DiagError::IoError(_) => "IoError",
            DiagError::SerializationError(_) => "SerializationError",
            DiagError::UrlError(_) => "UrlError",
            DiagError::HttpStatusError { .. } => "HttpStatusError",
            DiagError::GraphQueryError { .. } => "GraphQueryError",
            DiagError::UnexpectedResponse { .. } => "UnexpectedResponse",
            DiagError::ConfigError { .. } => "ConfigError",
            DiagError::ConfigValidationError { .. } => "ConfigValidationError",
            DiagError::InvalidConfigValueError { .. } => "InvalidConfigValueError",
            DiagError::MissingConfigError { .. } => "MissingConfigError",
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DiagError::ApiError(e) if e.is_timeout() => {
                "The service did not answer in time; check that the deployment is awake and retry".to_string()
            }
            DiagError::ApiError(_) => {
                "Check network connectivity and that the target host is reachable".to_string()
            }
            DiagError::HttpStatusError { status: 401, .. }
            | DiagError::HttpStatusError { status: 403, .. } => {
                "Check the configured credentials".to_string()
            }
            DiagError::HttpStatusError { status: 404, .. } => {
                "Check the endpoint path; the deployment may expose a different route".to_string()
            }
            DiagError::HttpStatusError { .. } => {
                "Inspect the response body and the server logs of the deployment".to_string()
            }
            DiagError::GraphQueryError { code, .. } if code.contains("Security") => {
                "Check graph.username and graph.password (NEO4J_PASSWORD)".to_string()
            }
            DiagError::GraphQueryError { .. } => {
                "Check the Cypher statement and that the database is running".to_string()
            }
            DiagError::SerializationError(_) | DiagError::UnexpectedResponse { .. } => {
                "The server answered with an unexpected payload; check the API version".to_string()
            }
            DiagError::MissingConfigError { field } => {
                format!("Set '{}' in the config file or the environment", field)
            }
            DiagError::UrlError(_)
            | DiagError::ConfigError { .. }
            | DiagError::ConfigValidationError { .. }
            | DiagError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line arguments".to_string()
            }
            DiagError::IoError(_) => "Check file permissions and available disk space".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Database => format!("Database problem: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Data problem: {}", self),
            ErrorCategory::System => format!("System problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, DiagError>;
