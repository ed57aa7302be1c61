use crate::utils::error::DiagError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    Warning,
    Failed,
    Skipped,
}

impl StepStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            StepStatus::Passed => "✅",
            StepStatus::Warning => "⚠️",
            StepStatus::Failed => "❌",
            StepStatus::Skipped => "⏭️",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub name: String,
    pub status: StepStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    pub duration_ms: u64,
}

impl StepReport {
    pub fn with_detail(mut self, line: impl Into<String>) -> Self {
        self.details.push(line.into());
        self
    }

    pub fn with_details<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.details.extend(lines.into_iter().map(Into::into));
        self
    }
}

/// 計時中的步驟，結束時轉成 `StepReport`
pub struct Step {
    name: String,
    started: Instant,
}

impl Step {
    pub fn start(name: impl Into<String>) -> Self {
        let name = name.into();
        tracing::debug!("▶️ {}", name);
        Self {
            name,
            started: Instant::now(),
        }
    }

    fn finish(self, status: StepStatus, message: String) -> StepReport {
        StepReport {
            name: self.name,
            status,
            message,
            details: Vec::new(),
            duration_ms: duration_ms(self.started.elapsed()),
        }
    }

    pub fn passed(self, message: impl Into<String>) -> StepReport {
        self.finish(StepStatus::Passed, message.into())
    }

    pub fn warning(self, message: impl Into<String>) -> StepReport {
        self.finish(StepStatus::Warning, message.into())
    }

    pub fn failed(self, message: impl Into<String>) -> StepReport {
        self.finish(StepStatus::Failed, message.into())
    }

    /// 失敗步驟，附上完整錯誤鏈
    pub fn failed_with(self, context: &str, error: &DiagError) -> StepReport {
        tracing::error!("❌ {}: {} ({})", context, error, error.type_name());
        self.finish(StepStatus::Failed, format!("{}: {}", context, error))
            .with_detail(format!("error type: {}", error.type_name()))
            .with_detail(format!("detailed error: {:?}", error))
            .with_detail(format!("suggestion: {}", error.recovery_suggestion()))
    }
}

pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> StepReport {
    StepReport {
        name: name.into(),
        status: StepStatus::Skipped,
        message: reason.into(),
        details: Vec::new(),
        duration_ms: 0,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub check: String,
    pub started_at: DateTime<Utc>,
    pub steps: Vec<StepReport>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl CheckReport {
    pub fn new(check: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            started_at: Utc::now(),
            steps: Vec::new(),
            data: BTreeMap::new(),
            hints: Vec::new(),
        }
    }

    pub fn push(&mut self, step: StepReport) {
        match step.status {
            StepStatus::Passed => tracing::info!("✅ {}: {}", step.name, step.message),
            StepStatus::Warning => tracing::warn!("⚠️ {}: {}", step.name, step.message),
            StepStatus::Failed => tracing::debug!("❌ {}: {}", step.name, step.message),
            StepStatus::Skipped => tracing::info!("⏭️ {}: {}", step.name, step.message),
        }
        self.steps.push(step);
    }

    pub fn insert_data(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.data.insert(key.to_string(), value.into());
    }

    pub fn add_hint(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    /// 沒有失敗步驟即視為通過（警告不算失敗）
    pub fn passed(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.status != StepStatus::Failed)
    }

    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.duration_ms).sum()
    }

    /// 檢查本身拋出錯誤時的報告
    pub fn from_error(check: &str, error: &DiagError) -> Self {
        let mut report = Self::new(check);
        report.push(StepReport {
            name: "run".to_string(),
            status: StepStatus::Failed,
            message: error.user_friendly_message(),
            details: vec![
                format!("error type: {}", error.type_name()),
                format!("suggestion: {}", error.recovery_suggestion()),
            ],
            duration_ms: 0,
        });
        report
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_checks: usize,
    pub passed_checks: usize,
    pub failed_checks: usize,
    pub passed_steps: usize,
    pub warning_steps: usize,
    pub failed_steps: usize,
    pub skipped_steps: usize,
    pub total_duration_ms: u64,
    pub failed_check_names: Vec<String>,
}

impl RunSummary {
    pub fn from_reports(reports: &[CheckReport]) -> Self {
        let mut summary = Self {
            total_checks: reports.len(),
            ..Self::default()
        };

        for report in reports {
            if report.passed() {
                summary.passed_checks += 1;
            } else {
                summary.failed_checks += 1;
                summary.failed_check_names.push(report.check.clone());
            }
            summary.passed_steps += report.count(StepStatus::Passed);
            summary.warning_steps += report.count(StepStatus::Warning);
            summary.failed_steps += report.count(StepStatus::Failed);
            summary.skipped_steps += report.count(StepStatus::Skipped);
            summary.total_duration_ms += report.total_duration_ms();
        }

        summary
    }

    pub fn all_passed(&self) -> bool {
        self.total_checks > 0 && self.failed_checks == 0
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
