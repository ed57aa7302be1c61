use crate::domain::model::{Record, ServerInfo};
use crate::domain::report::CheckReport;
use crate::utils::error::{DiagError, Result};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait GraphClient: Send + Sync {
    async fn verify_connectivity(&self) -> Result<ServerInfo>;

    async fn run(
        &self,
        statement: &str,
        parameters: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Vec<Record>>;

    async fn run_single(
        &self,
        statement: &str,
        parameters: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Record> {
        let records = self.run(statement, parameters).await?;
        single(records)
    }
}

/// 每個診斷程序一個實作
#[async_trait]
pub trait Diagnostic: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self) -> Result<CheckReport>;
}

pub fn single(mut records: Vec<Record>) -> Result<Record> {
    if records.len() != 1 {
        return Err(DiagError::UnexpectedResponse {
            message: format!("expected exactly one record, got {}", records.len()),
        });
    }
    Ok(records.remove(0))
}
