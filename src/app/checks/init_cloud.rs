use crate::adapters::http::{DeploymentClient, HttpOutcome};
use crate::config::toml_config::DeploymentConfig;
use crate::domain::model::DashboardStats;
use crate::domain::ports::Diagnostic;
use crate::domain::report::{CheckReport, Step, StepReport};
use crate::utils::error::Result;
use async_trait::async_trait;

pub const CHECK_NAME: &str = "init-cloud";

const BODY_EXCERPT_CHARS: usize = 500;

/// 透過部署的 API 初始化雲端資料庫；三個步驟互不影響
pub struct InitCloudCheck {
    client: DeploymentClient,
    init_database_path: String,
    sample_data_path: String,
    stats_path: String,
}

impl InitCloudCheck {
    pub fn new(client: DeploymentClient, config: &DeploymentConfig) -> Self {
        Self {
            client,
            init_database_path: config.init_database_path.clone(),
            sample_data_path: config.sample_data_path.clone(),
            stats_path: config.stats_path.clone(),
        }
    }

    async fn trigger(&self, name: &str, path: &str, what: &str) -> StepReport {
        let step = Step::start(name);
        tracing::info!("📊 {}...", what);

        match self.client.post(path).await {
            Ok(outcome) if outcome.is_ok() => step.passed(format!("{} succeeded", what)),
            Ok(outcome) => step
                .failed(format!("{} failed: HTTP {}", what, outcome.status.as_u16()))
                .with_detail(outcome.body_excerpt(BODY_EXCERPT_CHARS)),
            Err(e) => step.failed_with(&format!("{} failed", what), &e),
        }
    }

    async fn verify(&self, report: &mut CheckReport) {
        let step = Step::start("verify data");
        tracing::info!("🔍 Verifying data...");

        let outcome: HttpOutcome = match self.client.get(&self.stats_path).await {
            Ok(outcome) => outcome,
            Err(e) => {
                report.push(step.failed_with("data verification failed", &e));
                return;
            }
        };

        if !outcome.is_ok() {
            report.push(step.failed(format!(
                "data verification failed: HTTP {}",
                outcome.status.as_u16()
            )));
            return;
        }

        match outcome.json::<serde_json::Value>() {
            Ok(body) => {
                let stats = DashboardStats::from_json(&body);
                report.insert_data("knowledge_points_count", stats.knowledge_points_count);
                report.insert_data("questions_count", stats.questions_count);
                report.push(
                    step.passed("data verified")
                        .with_detail(format!(
                            "knowledge points: {}",
                            stats.knowledge_points_count
                        ))
                        .with_detail(format!("questions: {}", stats.questions_count)),
                );
            }
            Err(e) => report.push(step.failed_with("stats response is not JSON", &e)),
        }
    }
}

#[async_trait]
impl Diagnostic for InitCloudCheck {
    fn name(&self) -> &str {
        CHECK_NAME
    }

    async fn run(&self) -> Result<CheckReport> {
        let mut report = CheckReport::new(CHECK_NAME);
        tracing::info!("🚀 Initializing cloud database via {}", self.client.base_url());

        report.push(
            self.trigger(
                "init database",
                &self.init_database_path,
                "database schema initialization",
            )
            .await,
        );
        report.push(
            self.trigger("sample data", &self.sample_data_path, "sample data loading")
                .await,
        );
        self.verify(&mut report).await;

        report.add_hint(format!("Deployment: {}", self.client.base_url()));
        Ok(report)
    }
}
