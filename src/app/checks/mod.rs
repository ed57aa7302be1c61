pub mod cloud_connection;
pub mod connect_db;
pub mod frontend_display;
pub mod init_cloud;
pub mod knowledge_points;
pub mod suggestion_accuracy;

use crate::adapters::graph_http::HttpGraphClient;
use crate::adapters::http::DeploymentClient;
use crate::config::toml_config::DiagConfig;
use crate::domain::ports::Diagnostic;
use crate::domain::report::CheckReport;
use crate::utils::error::{DiagError, Result};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use std::time::Duration;

pub use cloud_connection::CloudConnectionCheck;
pub use connect_db::ConnectDbCheck;
pub use frontend_display::FrontendDisplayCheck;
pub use init_cloud::InitCloudCheck;
pub use knowledge_points::KnowledgePointsCheck;
pub use suggestion_accuracy::SuggestionAccuracyCheck;

/// 建立客戶端失敗的檢查，執行時直接回報錯誤
pub struct SetupFailed {
    name: String,
    report: CheckReport,
}

impl SetupFailed {
    pub fn new(name: &str, error: &DiagError) -> Self {
        tracing::error!("❌ Cannot set up {}: {}", name, error);
        Self {
            name: name.to_string(),
            report: CheckReport::from_error(name, error),
        }
    }
}

#[async_trait]
impl Diagnostic for SetupFailed {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<CheckReport> {
        Ok(self.report.clone())
    }
}

/// 檢查用到的配置區段必須先通過驗證
fn validate_sections(sections: &[&dyn Validate]) -> Result<()> {
    sections.iter().try_for_each(|section| section.validate())
}

fn with_graph_client<F>(
    name: &str,
    config: &DiagConfig,
    sections: &[&dyn Validate],
    build: F,
) -> Box<dyn Diagnostic>
where
    F: FnOnce(HttpGraphClient) -> Box<dyn Diagnostic>,
{
    match validate_sections(sections).and_then(|_| HttpGraphClient::new(&config.graph)) {
        Ok(client) => build(client),
        Err(e) => Box::new(SetupFailed::new(name, &e)),
    }
}

fn with_deployment_client<F>(
    name: &str,
    base_url: &str,
    timeout: Duration,
    sections: &[&dyn Validate],
    build: F,
) -> Box<dyn Diagnostic>
where
    F: FnOnce(DeploymentClient) -> Box<dyn Diagnostic>,
{
    match validate_sections(sections).and_then(|_| DeploymentClient::new(base_url, timeout)) {
        Ok(client) => build(client),
        Err(e) => Box::new(SetupFailed::new(name, &e)),
    }
}

pub fn connect_db(config: &DiagConfig) -> Box<dyn Diagnostic> {
    with_graph_client(connect_db::CHECK_NAME, config, &[], |client| {
        Box::new(ConnectDbCheck::new(client, &config.graph.uri))
    })
}

pub fn cloud_connection(config: &DiagConfig) -> Box<dyn Diagnostic> {
    with_graph_client(cloud_connection::CHECK_NAME, config, &[], |client| {
        Box::new(CloudConnectionCheck::new(
            client,
            &config.graph.uri,
            &config.graph.username,
        ))
    })
}

pub fn knowledge_points(config: &DiagConfig) -> Box<dyn Diagnostic> {
    with_graph_client(
        knowledge_points::CHECK_NAME,
        config,
        &[&config.knowledge_points],
        |client| Box::new(KnowledgePointsCheck::new(client, &config.knowledge_points)),
    )
}

pub fn init_cloud(config: &DiagConfig) -> Box<dyn Diagnostic> {
    with_deployment_client(
        init_cloud::CHECK_NAME,
        &config.deployment.base_url,
        config.deployment.timeout(),
        &[&config.deployment],
        |client| Box::new(InitCloudCheck::new(client, &config.deployment)),
    )
}

pub fn frontend_display(config: &DiagConfig, replay_only: bool) -> Box<dyn Diagnostic> {
    if replay_only {
        return Box::new(FrontendDisplayCheck::replay_only());
    }
    with_deployment_client(
        frontend_display::CHECK_NAME,
        &config.suggest.endpoint,
        Duration::from_secs(config.suggest.timeout_seconds),
        &[&config.suggest],
        |client| Box::new(FrontendDisplayCheck::new(client, config)),
    )
}

pub fn suggestion_accuracy(config: &DiagConfig) -> Box<dyn Diagnostic> {
    with_deployment_client(
        suggestion_accuracy::CHECK_NAME,
        &config.deployment.base_url,
        config.deployment.timeout(),
        &[&config.deployment, &config.suggest],
        |client| Box::new(SuggestionAccuracyCheck::new(client, config)),
    )
}

/// `all` 指令的執行順序
pub fn all(config: &DiagConfig, replay_only: bool) -> Vec<Box<dyn Diagnostic>> {
    vec![
        connect_db(config),
        cloud_connection(config),
        knowledge_points(config),
        init_cloud(config),
        frontend_display(config, replay_only),
        suggestion_accuracy(config),
    ]
}
