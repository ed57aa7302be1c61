use crate::domain::ports::{Diagnostic, GraphClient};
use crate::domain::report::{skipped, CheckReport, Step};
use crate::utils::error::Result;
use async_trait::async_trait;

pub const CHECK_NAME: &str = "connect-db";

/// 連線測試：驗證連線後執行一個最簡單的查詢
pub struct ConnectDbCheck<G: GraphClient> {
    client: G,
    uri: String,
}

impl<G: GraphClient> ConnectDbCheck<G> {
    pub fn new(client: G, uri: &str) -> Self {
        Self {
            client,
            uri: uri.to_string(),
        }
    }
}

#[async_trait]
impl<G: GraphClient> Diagnostic for ConnectDbCheck<G> {
    fn name(&self) -> &str {
        CHECK_NAME
    }

    async fn run(&self) -> Result<CheckReport> {
        let mut report = CheckReport::new(CHECK_NAME);
        report.insert_data("uri", self.uri.as_str());

        let step = Step::start("verify connectivity");
        match self.client.verify_connectivity().await {
            Ok(info) => {
                report.insert_data("server", info.describe());
                report.push(step.passed(format!("connected to {}", info.describe())));
            }
            Err(e) => {
                report.push(step.failed_with("connection failed", &e));
                report.push(skipped("simple query", "connectivity check failed"));
                return Ok(report);
            }
        }

        let step = Step::start("simple query");
        match self
            .client
            .run_single("RETURN 1 as test", serde_json::Map::new())
            .await
        {
            Ok(record) => match record.get("test") {
                Some(value) => {
                    report.insert_data("test_value", value.clone());
                    report.push(step.passed(format!("query returned {}", value)));
                }
                None => report.push(step.failed("query returned no 'test' column")),
            },
            Err(e) => report.push(step.failed_with("query failed", &e)),
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Record, ServerInfo};
    use crate::domain::report::StepStatus;
    use crate::utils::error::DiagError;
    use std::collections::HashMap;

    struct FakeGraph {
        reachable: bool,
    }

    #[async_trait]
    impl GraphClient for FakeGraph {
        async fn verify_connectivity(&self) -> Result<ServerInfo> {
            if self.reachable {
                Ok(ServerInfo {
                    neo4j_version: Some("5.26.0".to_string()),
                    neo4j_edition: None,
                })
            } else {
                Err(DiagError::UnexpectedResponse {
                    message: "connection refused".to_string(),
                })
            }
        }

        async fn run(
            &self,
            _statement: &str,
            _parameters: serde_json::Map<String, serde_json::Value>,
        ) -> Result<Vec<Record>> {
            let mut data = HashMap::new();
            data.insert("test".to_string(), serde_json::json!(1));
            Ok(vec![Record { data }])
        }
    }

    #[tokio::test]
    async fn test_connect_and_query() {
        let check = ConnectDbCheck::new(FakeGraph { reachable: true }, "neo4j+s://example");
        let report = check.run().await.unwrap();

        assert!(report.passed());
        assert_eq!(report.data["test_value"], serde_json::json!(1));
        assert_eq!(report.data["server"], "Neo4j 5.26.0");
    }

    #[tokio::test]
    async fn test_unreachable_skips_query() {
        let check = ConnectDbCheck::new(FakeGraph { reachable: false }, "neo4j+s://example");
        let report = check.run().await.unwrap();

        assert!(!report.passed());
        assert_eq!(report.steps[0].status, StepStatus::Failed);
        assert!(report.steps[0]
            .details
            .iter()
            .any(|d| d.starts_with("detailed error:")));
        assert_eq!(report.step("simple query").unwrap().status, StepStatus::Skipped);
    }
}
