use crate::domain::ports::{Diagnostic, GraphClient};
use crate::domain::report::{skipped, CheckReport, Step};
use crate::utils::error::{DiagError, Result};
use async_trait::async_trait;

pub const CHECK_NAME: &str = "cloud-connection";

const CONNECTIVITY_QUERY: &str = "RETURN 1 as test";
const NODE_COUNT_QUERY: &str = "MATCH (n) RETURN count(n) as node_count";

pub struct CloudConnectionCheck<G: GraphClient> {
    client: G,
    uri: String,
    username: String,
}

impl<G: GraphClient> CloudConnectionCheck<G> {
    pub fn new(client: G, uri: &str, username: &str) -> Self {
        Self {
            client,
            uri: uri.to_string(),
            username: username.to_string(),
        }
    }

    /// 只回傳連線是否成功
    pub async fn is_reachable(&self) -> bool {
        match self.run().await {
            Ok(report) => report.passed(),
            Err(_) => false,
        }
    }

    async fn node_count(&self) -> Result<i64> {
        let record = self
            .client
            .run_single(NODE_COUNT_QUERY, serde_json::Map::new())
            .await?;

        match record.get_i64("node_count") {
            Some(count) if count >= 0 => Ok(count),
            _ => Err(DiagError::UnexpectedResponse {
                message: format!(
                    "node_count is not a non-negative integer: {:?}",
                    record.get("node_count")
                ),
            }),
        }
    }
}

#[async_trait]
impl<G: GraphClient> Diagnostic for CloudConnectionCheck<G> {
    fn name(&self) -> &str {
        CHECK_NAME
    }

    async fn run(&self) -> Result<CheckReport> {
        let mut report = CheckReport::new(CHECK_NAME);

        tracing::info!("🔌 Connecting to cloud graph database...");
        tracing::info!("URI: {}", self.uri);
        tracing::info!("Username: {}", self.username);

        let step = Step::start("connectivity query");
        match self
            .client
            .run_single(CONNECTIVITY_QUERY, serde_json::Map::new())
            .await
        {
            Ok(record) => {
                let value = record.get("test").cloned().unwrap_or_default();
                tracing::info!("✅ Connected! test result: {}", value);
                report.push(step.passed(format!("connected, test result: {}", value)));
            }
            Err(e) => {
                tracing::error!("❌ Connection failed: {}", e);
                tracing::error!("Error type: {}", e.type_name());
                report.push(step.failed_with("connection failed", &e));
                report.push(skipped("node count", "connectivity query failed"));
                return Ok(report);
            }
        }

        let step = Step::start("node count");
        match self.node_count().await {
            Ok(count) => {
                tracing::info!("📊 Database currently holds {} nodes", count);
                report.insert_data("node_count", count);
                report.push(step.passed(format!("{} nodes in database", count)));
            }
            Err(e) => {
                tracing::error!("❌ Node count failed: {}", e);
                tracing::error!("Error type: {}", e.type_name());
                report.push(step.failed_with("node count failed", &e));
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Record, ServerInfo};
    use crate::domain::report::StepStatus;
    use std::collections::HashMap;

    struct CountingGraph {
        node_count: serde_json::Value,
    }

    #[async_trait]
    impl GraphClient for CountingGraph {
        async fn verify_connectivity(&self) -> Result<ServerInfo> {
            Ok(ServerInfo::default())
        }

        async fn run(
            &self,
            statement: &str,
            _parameters: serde_json::Map<String, serde_json::Value>,
        ) -> Result<Vec<Record>> {
            let mut data = HashMap::new();
            if statement.contains("count(n)") {
                data.insert("node_count".to_string(), self.node_count.clone());
            } else {
                data.insert("test".to_string(), serde_json::json!(1));
            }
            Ok(vec![Record { data }])
        }
    }

    #[tokio::test]
    async fn test_reports_node_count() {
        let check = CloudConnectionCheck::new(
            CountingGraph { node_count: serde_json::json!(42) },
            "neo4j+s://example",
            "neo4j",
        );
        let report = check.run().await.unwrap();

        assert!(report.passed());
        assert_eq!(report.data["node_count"], 42);
        assert!(check.is_reachable().await);
    }

    #[tokio::test]
    async fn test_rejects_non_integer_count() {
        let check = CloudConnectionCheck::new(
            CountingGraph { node_count: serde_json::json!("many") },
            "neo4j+s://example",
            "neo4j",
        );
        let report = check.run().await.unwrap();

        assert!(!report.passed());
        assert_eq!(report.step("node count").unwrap().status, StepStatus::Failed);
        assert!(!check.is_reachable().await);
    }
}
