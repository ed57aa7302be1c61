use crate::domain::ports::{Diagnostic, Storage};
use crate::domain::report::{CheckReport, RunSummary, StepStatus};
use crate::utils::error::Result;
use serde::Serialize;

const SEPARATOR_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub reports: Vec<CheckReport>,
    pub summary: RunSummary,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        if self.summary.all_passed() {
            0
        } else {
            1
        }
    }
}

/// 依序執行診斷程序；單一程序失敗不影響後續程序
pub struct DiagnosticRunner {
    checks: Vec<Box<dyn Diagnostic>>,
    format: OutputFormat,
}

impl DiagnosticRunner {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            checks: Vec::new(),
            format,
        }
    }

    pub fn add_check(&mut self, check: Box<dyn Diagnostic>) {
        self.checks.push(check);
    }

    pub fn with_check(mut self, check: Box<dyn Diagnostic>) -> Self {
        self.add_check(check);
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub async fn run_all(&self) -> RunOutcome {
        let mut reports = Vec::with_capacity(self.checks.len());

        for check in &self.checks {
            tracing::info!("🧪 Running check: {}", check.name());

            let report = match check.run().await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(
                        "❌ Check {} aborted: {} (Category: {:?}, Severity: {:?})",
                        check.name(),
                        e,
                        e.category(),
                        e.severity()
                    );
                    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                    CheckReport::from_error(check.name(), &e)
                }
            };

            if self.format == OutputFormat::Human {
                for line in format_report(&report) {
                    println!("{}", line);
                }
            }

            reports.push(report);
        }

        let summary = RunSummary::from_reports(&reports);
        tracing::info!(
            "📊 {} checks, {} passed, {} failed",
            summary.total_checks,
            summary.passed_checks,
            summary.failed_checks
        );

        match self.format {
            OutputFormat::Human => {
                for line in format_summary(&summary) {
                    println!("{}", line);
                }
            }
            OutputFormat::Json => {
                let outcome = RunOutcome {
                    reports: reports.clone(),
                    summary: summary.clone(),
                };
                match serde_json::to_string_pretty(&outcome) {
                    Ok(json) => println!("{}", json),
                    Err(e) => tracing::error!("❌ Failed to serialize reports: {}", e),
                }
            }
        }

        RunOutcome { reports, summary }
    }
}

/// 每份報告寫成一個 JSON 檔，回傳檔名
pub async fn save_reports<S: Storage>(
    storage: &S,
    reports: &[CheckReport],
) -> Result<Vec<String>> {
    let mut written = Vec::with_capacity(reports.len());

    for report in reports {
        let filename = report_filename(report);
        let json = serde_json::to_vec_pretty(report)?;
        storage.write_file(&filename, &json).await?;
        tracing::debug!("💾 Report saved to: {}", filename);
        written.push(filename);
    }

    Ok(written)
}

pub fn report_filename(report: &CheckReport) -> String {
    format!(
        "{}-{}.json",
        report.check,
        report.started_at.format("%Y%m%dT%H%M%SZ")
    )
}

pub fn format_report(report: &CheckReport) -> Vec<String> {
    let rule = "=".repeat(SEPARATOR_WIDTH);
    let mut lines = vec![
        String::new(),
        rule.clone(),
        format!(
            "🧪 {} ({})",
            report.check,
            report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        rule.clone(),
    ];

    for step in &report.steps {
        lines.push(format!(
            "{} {}: {} ({} ms)",
            step.status.icon(),
            step.name,
            step.message,
            step.duration_ms
        ));
        lines.extend(step.details.iter().map(|d| format!("   {}", d)));
    }

    for (key, value) in &report.data {
        if !value.is_object() && !value.is_array() {
            lines.push(format!("📊 {}: {}", key, value));
        }
    }

    if !report.hints.is_empty() {
        lines.push(String::new());
        lines.push("💡 Hints:".to_string());
        lines.extend(
            report
                .hints
                .iter()
                .enumerate()
                .map(|(i, hint)| format!("   {}. {}", i + 1, hint)),
        );
    }

    let verdict = if report.passed() {
        if report.count(StepStatus::Warning) > 0 {
            "⚠️ passed with warnings"
        } else {
            "✅ passed"
        }
    } else {
        "❌ failed"
    };
    lines.push(format!("{} {}", report.check, verdict));
    lines
}

pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        "=".repeat(SEPARATOR_WIDTH),
        format!(
            "📈 {} checks: {} passed, {} failed",
            summary.total_checks, summary.passed_checks, summary.failed_checks
        ),
        format!(
            "   steps: {} passed, {} warnings, {} failed, {} skipped ({} ms)",
            summary.passed_steps,
            summary.warning_steps,
            summary.failed_steps,
            summary.skipped_steps,
            summary.total_duration_ms
        ),
    ];
    if !summary.failed_check_names.is_empty() {
        lines.push(format!(
            "   failed: {}",
            summary.failed_check_names.join(", ")
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::domain::report::Step;
    use crate::utils::error::DiagError;
    use tempfile::TempDir;

    struct FixedCheck {
        name: String,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Diagnostic for FixedCheck {
        fn name(&self) -> &str {
            &self.name
        }

        async fn run(&self) -> Result<CheckReport> {
            if self.fail {
                return Err(DiagError::MissingConfigError {
                    field: "graph.password".to_string(),
                });
            }
            let mut report = CheckReport::new(&self.name);
            report.push(Step::start("noop").passed("done"));
            Ok(report)
        }
    }

    fn check(name: &str, fail: bool) -> Box<dyn Diagnostic> {
        Box::new(FixedCheck {
            name: name.to_string(),
            fail,
        })
    }

    #[tokio::test]
    async fn test_error_does_not_stop_later_checks() {
        let runner = DiagnosticRunner::new(OutputFormat::Json)
            .with_check(check("first", true))
            .with_check(check("second", false));

        let outcome = runner.run_all().await;

        assert_eq!(outcome.reports.len(), 2);
        assert!(!outcome.reports[0].passed());
        assert!(outcome.reports[1].passed());
        assert_eq!(outcome.summary.failed_check_names, vec!["first".to_string()]);
        assert_eq!(outcome.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_all_passing_exit_code() {
        let runner = DiagnosticRunner::new(OutputFormat::Human).with_check(check("only", false));
        assert_eq!(runner.run_all().await.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_save_reports_writes_json() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        let mut report = CheckReport::new("connect-db");
        report.push(Step::start("simple query").passed("returned 1"));
        report.insert_data("test_value", 1);

        let files = save_reports(&storage, &[report]).await.unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("connect-db-"));

        let saved = std::fs::read_to_string(temp_dir.path().join(&files[0])).unwrap();
        let json: serde_json::Value = serde_json::from_str(&saved).unwrap();
        assert_eq!(json["check"], "connect-db");
        assert_eq!(json["steps"][0]["status"], "passed");
        assert_eq!(json["data"]["test_value"], 1);
    }

    #[test]
    fn test_format_report_lists_steps_and_hints() {
        let mut report = CheckReport::new("init-cloud");
        report.push(Step::start("init database").failed("HTTP 500"));
        report.add_hint("Deployment: https://example.com");

        let text = format_report(&report).join("\n");
        assert!(text.contains("❌ init database: HTTP 500"));
        assert!(text.contains("1. Deployment: https://example.com"));
        assert!(text.contains("init-cloud ❌ failed"));
    }
}
