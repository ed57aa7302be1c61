use crate::adapters::http::DeploymentClient;
use crate::config::toml_config::{DiagConfig, SuggestionExpectation};
use crate::domain::model::{HealthStatus, SuggestRequest, SuggestResponse};
use crate::domain::ports::Diagnostic;
use crate::domain::report::{skipped, CheckReport, Step, StepReport, StepStatus};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub const CHECK_NAME: &str = "suggestion-accuracy";

/// 通過率達到此比例視為大致正常
pub const MOSTLY_PASSING_RATIO: f64 = 0.8;
const SHOWN_SUGGESTIONS: usize = 3;
const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub enum CaseOutcome {
    Pass { confidence: f64 },
    LowConfidence { confidence: f64 },
    Wrong { top: String, confidence: f64 },
    NoSuggestions,
}

impl CaseOutcome {
    pub fn score(&self) -> f64 {
        match self {
            CaseOutcome::Pass { .. } => 1.0,
            CaseOutcome::LowConfidence { .. } => 0.5,
            CaseOutcome::Wrong { .. } | CaseOutcome::NoSuggestions => 0.0,
        }
    }
}

/// 比對第一個建議與預期知識點
pub fn evaluate(expectation: &SuggestionExpectation, response: &SuggestResponse) -> CaseOutcome {
    let Some(top) = response.suggestions.first() else {
        return CaseOutcome::NoSuggestions;
    };

    if top.knowledge_point_name != expectation.expected {
        CaseOutcome::Wrong {
            top: top.knowledge_point_name.clone(),
            confidence: top.confidence,
        }
    } else if top.confidence >= expectation.min_confidence {
        CaseOutcome::Pass {
            confidence: top.confidence,
        }
    } else {
        CaseOutcome::LowConfidence {
            confidence: top.confidence,
        }
    }
}

pub fn verdict(score: f64, total: usize) -> StepStatus {
    if total == 0 {
        StepStatus::Skipped
    } else if score >= total as f64 {
        StepStatus::Passed
    } else if score >= total as f64 * MOSTLY_PASSING_RATIO {
        StepStatus::Warning
    } else {
        StepStatus::Failed
    }
}

/// 以預期結果檢查已部署的建議 API
pub struct SuggestionAccuracyCheck {
    client: DeploymentClient,
    health_path: String,
    health_timeout: Duration,
    suggest_path: String,
    question_type: String,
    timeout: Duration,
    delay: Duration,
    expectations: Vec<SuggestionExpectation>,
}

impl SuggestionAccuracyCheck {
    pub fn new(client: DeploymentClient, config: &DiagConfig) -> Self {
        Self {
            client,
            health_path: config.deployment.health_path.clone(),
            health_timeout: Duration::from_secs(config.deployment.health_timeout_seconds),
            suggest_path: config.suggest.path.clone(),
            question_type: config.suggest.question_type.clone(),
            timeout: Duration::from_secs(config.suggest.timeout_seconds),
            delay: Duration::from_millis(config.suggest.request_delay_ms),
            expectations: config.suggest.expectations.clone(),
        }
    }

    async fn health(&self) -> StepReport {
        let step = Step::start("health check");

        match self
            .client
            .get_with_timeout(&self.health_path, self.health_timeout)
            .await
        {
            Ok(outcome) if outcome.is_ok() => {
                // 缺少 status 欄位時為 unknown；不是 JSON 則視為失敗
                let health: HealthStatus = match outcome.json() {
                    Ok(health) => health,
                    Err(e) => {
                        return step
                            .failed_with("health response is not JSON", &e)
                            .with_detail(outcome.body_excerpt(BODY_EXCERPT_CHARS))
                    }
                };
                let message = format!("system status: {}", health.status);
                let mut report = if health.status == "healthy" || health.status == "unknown" {
                    step.passed(message)
                } else {
                    step.warning(message)
                };
                if let Some(database) = &health.database {
                    report = report.with_detail(format!("database: {}", database));
                }
                if let Some(error) = &health.error {
                    report = report.with_detail(format!("error: {}", error));
                }
                report
            }
            Ok(outcome) => step
                .failed(format!("health check failed: HTTP {}", outcome.status.as_u16()))
                .with_detail(outcome.body_excerpt(BODY_EXCERPT_CHARS)),
            Err(e) => step.failed_with("health check failed", &e),
        }
    }

    async fn run_case(
        &self,
        index: usize,
        expectation: &SuggestionExpectation,
    ) -> (StepReport, f64) {
        let step = Step::start(format!("case {}: {}", index, expectation.name));
        let input: String = expectation.content.chars().take(50).collect();
        let request = SuggestRequest {
            question_content: expectation.content.clone(),
            question_type: self.question_type.clone(),
        };

        let response = match self
            .client
            .suggest(&self.suggest_path, &request, self.timeout)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let report = step
                    .failed_with("request failed", &e)
                    .with_detail(format!("input: {}", input));
                return (report, 0.0);
            }
        };

        let outcome = evaluate(expectation, &response);
        let score = outcome.score();
        let report = match &outcome {
            CaseOutcome::Pass { confidence } => step.passed(format!(
                "{} (confidence: {:.3})",
                expectation.expected, confidence
            )),
            CaseOutcome::LowConfidence { confidence } => step.warning(format!(
                "{} recognized but confidence {:.3} is below {:.1}",
                expectation.expected, confidence, expectation.min_confidence
            )),
            CaseOutcome::Wrong { top, confidence } => step
                .failed(format!(
                    "got {} ({:.3}), expected {}",
                    top, confidence, expectation.expected
                ))
                .with_details(
                    response
                        .suggestions
                        .iter()
                        .take(SHOWN_SUGGESTIONS)
                        .enumerate()
                        .map(|(i, s)| {
                            format!("{}. {} ({:.3})", i + 1, s.knowledge_point_name, s.confidence)
                        }),
                ),
            CaseOutcome::NoSuggestions => step.failed("no suggestions returned"),
        };

        (report.with_detail(format!("input: {}", input)), score)
    }
}

#[async_trait]
impl Diagnostic for SuggestionAccuracyCheck {
    fn name(&self) -> &str {
        CHECK_NAME
    }

    async fn run(&self) -> Result<CheckReport> {
        let mut report = CheckReport::new(CHECK_NAME);
        let total = self.expectations.len();
        report.insert_data("api_base", self.client.base_url());

        let health = self.health().await;
        let healthy = health.status != StepStatus::Failed;
        report.push(health);
        if !healthy {
            report.push(skipped("score", "health check failed"));
            return Ok(report);
        }

        let mut score = 0.0;
        for (index, expectation) in self.expectations.iter().enumerate() {
            let (step, case_score) = self.run_case(index + 1, expectation).await;
            score += case_score;
            report.push(step);

            if index + 1 < total && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        report.insert_data("score", score);
        report.insert_data("total", total);

        let step = Step::start("score");
        let message = format!("{}/{} passed", score, total);
        match verdict(score, total) {
            StepStatus::Passed => {
                report.push(step.passed(format!("{}; all cases passed", message)))
            }
            StepStatus::Warning => {
                report.push(step.warning(format!("{}; mostly passing", message)));
                add_sync_hints(&mut report);
            }
            StepStatus::Failed => {
                report.push(step.failed(format!("{}; pass rate too low", message)));
                add_sync_hints(&mut report);
            }
            StepStatus::Skipped => report.push(skipped("score", "no expectations configured")),
        }

        Ok(report)
    }
}

fn add_sync_hints(report: &mut CheckReport) {
    report.add_hint("Check that the knowledge points were created in the cloud database");
    report.add_hint("Check that the hierarchy relationships were created");
    report.add_hint("Check that the deployment runs the latest code, then wait a few minutes for caches");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Suggestion;

    fn expectation(expected: &str, min_confidence: f64) -> SuggestionExpectation {
        SuggestionExpectation {
            name: "case".to_string(),
            content: "Never have I seen such a beautiful sunset.".to_string(),
            expected: expected.to_string(),
            min_confidence,
        }
    }

    fn response(items: &[(&str, f64)]) -> SuggestResponse {
        SuggestResponse {
            suggestions: items
                .iter()
                .enumerate()
                .map(|(i, (name, confidence))| Suggestion {
                    knowledge_point_id: format!("kp_{}", i),
                    knowledge_point_name: name.to_string(),
                    confidence: *confidence,
                    reason: String::new(),
                    matched_keywords: Vec::new(),
                    grade_levels: Vec::new(),
                    learning_objectives: Vec::new(),
                    feature_analysis: None,
                    is_collaborative: false,
                })
                .collect(),
            count: Some(items.len()),
            message: None,
        }
    }

    #[test]
    fn test_evaluate_outcomes() {
        let exp = expectation("倒装句", 0.8);

        assert_eq!(
            evaluate(&exp, &response(&[("倒装句", 0.9)])),
            CaseOutcome::Pass { confidence: 0.9 }
        );
        assert_eq!(evaluate(&exp, &response(&[("倒装句", 0.6)])).score(), 0.5);
        assert!(matches!(
            evaluate(&exp, &response(&[("情态动词", 0.9), ("倒装句", 0.85)])),
            CaseOutcome::Wrong { ref top, .. } if top == "情态动词"
        ));
        assert_eq!(evaluate(&exp, &response(&[])), CaseOutcome::NoSuggestions);
    }

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(verdict(4.0, 4), StepStatus::Passed);
        assert_eq!(verdict(3.5, 4), StepStatus::Warning);
        assert_eq!(verdict(3.0, 4), StepStatus::Failed);
        assert_eq!(verdict(0.0, 0), StepStatus::Skipped);
    }
}
