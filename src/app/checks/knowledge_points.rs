use crate::config::toml_config::KnowledgePointsConfig;
use crate::domain::ports::{Diagnostic, GraphClient};
use crate::domain::report::{skipped, CheckReport, Step};
use crate::utils::error::{DiagError, Result};
use async_trait::async_trait;

pub const CHECK_NAME: &str = "knowledge-points";

const COUNT_QUERY: &str = "MATCH (kp:KnowledgePoint) RETURN count(kp) as count";
const PREVIEW_QUERY: &str =
    "MATCH (kp:KnowledgePoint) RETURN kp.name as name, kp.id as id LIMIT $limit";
const LOOKUP_QUERY: &str = "MATCH (kp:KnowledgePoint {name: $name}) RETURN kp.id as id";

pub struct KnowledgePointsCheck<G: GraphClient> {
    client: G,
    key_points: Vec<String>,
    preview_limit: u64,
}

impl<G: GraphClient> KnowledgePointsCheck<G> {
    pub fn new(client: G, config: &KnowledgePointsConfig) -> Self {
        Self {
            client,
            key_points: config.key_points.clone(),
            preview_limit: config.preview_limit,
        }
    }

    async fn knowledge_point_count(&self) -> Result<i64> {
        let record = self
            .client
            .run_single(COUNT_QUERY, serde_json::Map::new())
            .await?;

        match record.get_i64("count") {
            Some(count) if count >= 0 => Ok(count),
            _ => Err(DiagError::UnexpectedResponse {
                message: format!(
                    "count is not a non-negative integer: {:?}",
                    record.get("count")
                ),
            }),
        }
    }

    async fn check_key_points(&self, report: &mut CheckReport) {
        if self.key_points.is_empty() {
            report.push(skipped("key knowledge points", "no key knowledge points configured"));
            return;
        }

        let step = Step::start("key knowledge points");
        let mut details = Vec::new();
        let mut missing = Vec::new();

        for name in &self.key_points {
            let mut params = serde_json::Map::new();
            params.insert("name".to_string(), serde_json::json!(name));

            match self.client.run(LOOKUP_QUERY, params).await {
                Ok(records) => match records.first() {
                    Some(record) => details.push(format!(
                        "✅ {} exists (ID: {})",
                        name,
                        record.get_str("id").unwrap_or("?")
                    )),
                    None => {
                        details.push(format!("❌ {} does not exist", name));
                        missing.push(name.clone());
                    }
                },
                Err(e) => {
                    report.push(
                        step.failed_with("key knowledge point lookup failed", &e)
                            .with_details(details),
                    );
                    return;
                }
            }
        }

        if missing.is_empty() {
            report.push(
                step.passed(format!("all {} key knowledge points exist", self.key_points.len()))
                    .with_details(details),
            );
        } else {
            report.insert_data("missing_key_points", missing.clone());
            report.push(
                step.warning(format!(
                    "{} of {} key knowledge points missing",
                    missing.len(),
                    self.key_points.len()
                ))
                .with_details(details),
            );
        }
    }
}

#[async_trait]
impl<G: GraphClient> Diagnostic for KnowledgePointsCheck<G> {
    fn name(&self) -> &str {
        CHECK_NAME
    }

    async fn run(&self) -> Result<CheckReport> {
        let mut report = CheckReport::new(CHECK_NAME);
        let remaining = [
            "simple query",
            "knowledge point count",
            "key knowledge points",
        ];

        let step = Step::start("basic connection");
        match self.client.verify_connectivity().await {
            Ok(info) => report.push(step.passed(format!("connected to {}", info.describe()))),
            Err(e) => {
                report.push(step.failed_with("basic connection failed", &e));
                for name in remaining {
                    report.push(skipped(name, "basic connection failed"));
                }
                return Ok(report);
            }
        }

        let step = Step::start("simple query");
        match self
            .client
            .run_single("RETURN 1 as test", serde_json::Map::new())
            .await
        {
            Ok(record) => report.push(step.passed(format!(
                "query returned {}",
                record.get("test").cloned().unwrap_or_default()
            ))),
            Err(e) => {
                report.push(step.failed_with("simple query failed", &e));
                for name in &remaining[1..] {
                    report.push(skipped(*name, "simple query failed"));
                }
                return Ok(report);
            }
        }

        let step = Step::start("knowledge point count");
        let count = match self.knowledge_point_count().await {
            Ok(count) => count,
            Err(e) => {
                report.push(step.failed_with("knowledge point query failed", &e));
                report.push(skipped("key knowledge points", "knowledge point query failed"));
                return Ok(report);
            }
        };

        let mut params = serde_json::Map::new();
        params.insert("limit".to_string(), serde_json::json!(self.preview_limit));
        match self.client.run(PREVIEW_QUERY, params).await {
            Ok(records) => {
                report.insert_data("knowledge_point_count", count);
                let preview = records.iter().map(|r| {
                    format!(
                        "- {} (ID: {})",
                        r.get_str("name").unwrap_or("?"),
                        r.get_str("id").unwrap_or("?")
                    )
                });
                report.push(
                    step.passed(format!("{} knowledge points", count))
                        .with_detail(format!("first {}:", self.preview_limit))
                        .with_details(preview),
                );
            }
            Err(e) => {
                report.push(step.failed_with("knowledge point query failed", &e));
                report.push(skipped("key knowledge points", "knowledge point query failed"));
                return Ok(report);
            }
        }

        self.check_key_points(&mut report).await;
        Ok(report)
    }
}
