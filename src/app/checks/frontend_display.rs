use crate::adapters::http::DeploymentClient;
use crate::config::toml_config::DiagConfig;
use crate::core::display::{self, SuggestionView, KEYWORDS_LABEL};
use crate::domain::model::{SuggestRequest, Suggestion};
use crate::domain::ports::Diagnostic;
use crate::domain::report::{CheckReport, Step, StepReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub const CHECK_NAME: &str = "frontend-display";

/// 呼叫建議 API，並用前端的顯示邏輯重播結果
pub struct FrontendDisplayCheck {
    live: Option<LiveTarget>,
    sample: Vec<Suggestion>,
}

struct LiveTarget {
    client: DeploymentClient,
    endpoint: String,
    requests: Vec<SuggestRequest>,
    timeout: Duration,
}

impl FrontendDisplayCheck {
    pub fn new(client: DeploymentClient, config: &DiagConfig) -> Self {
        Self {
            live: Some(LiveTarget {
                client,
                endpoint: config.suggest.endpoint.clone(),
                requests: config.suggest_requests(),
                timeout: Duration::from_secs(config.suggest.timeout_seconds),
            }),
            sample: display::sample_suggestions(),
        }
    }

    pub fn replay_only() -> Self {
        Self {
            live: None,
            sample: display::sample_suggestions(),
        }
    }

    pub fn with_sample(mut self, sample: Vec<Suggestion>) -> Self {
        self.sample = sample;
        self
    }

    async fn call_api(
        &self,
        live: &LiveTarget,
        index: usize,
        request: &SuggestRequest,
    ) -> StepReport {
        let step = Step::start(format!("sample {}: {}", index, request.question_content));

        let response = match live
            .client
            .suggest(&live.endpoint, request, live.timeout)
            .await
        {
            Ok(response) => response,
            Err(e) => return step.failed_with("API call failed", &e),
        };

        let suggestions = &response.suggestions;
        let inconsistent: Vec<&Suggestion> = suggestions
            .iter()
            .filter(|s| mentions_keywords_without_list(s))
            .collect();

        let mut details = Vec::new();
        for (position, suggestion) in suggestions.iter().enumerate() {
            details.extend(api_lines(position + 1, suggestion));
        }
        details.push("front-end rendering:".to_string());
        details.extend(
            display::render_text(suggestions)
                .into_iter()
                .map(|line| format!("  {}", line)),
        );

        let message = format!("API returned {} suggestions", suggestions.len());
        if inconsistent.is_empty() {
            step.passed(message).with_details(details)
        } else {
            let names: Vec<&str> = inconsistent
                .iter()
                .map(|s| s.knowledge_point_name.as_str())
                .collect();
            step.warning(format!(
                "{}; reason mentions keywords but matched_keywords is empty for: {}",
                message,
                names.join(", ")
            ))
            .with_details(details)
        }
    }

    fn replay(&self, report: &mut CheckReport) {
        let step = Step::start("display replay");
        let views = display::render_suggestions(&self.sample);

        // 關鍵詞行必須包含每個關鍵詞
        let missing: Vec<String> = self
            .sample
            .iter()
            .zip(&views)
            .flat_map(|(suggestion, view)| {
                suggestion
                    .matched_keywords
                    .iter()
                    .filter(move |kw| {
                        !view.keywords.as_deref().unwrap_or("").contains(kw.as_str())
                    })
                    .cloned()
            })
            .collect();

        let mut details = Vec::new();
        for (suggestion, view) in self.sample.iter().zip(&views) {
            details.extend(replay_lines(suggestion, view));
        }
        if self.sample.is_empty() {
            details.push(display::EMPTY_STATE.to_string());
        }

        if let Ok(json) = serde_json::to_value(&views) {
            report.insert_data("replay", json);
        }

        if missing.is_empty() {
            report.push(
                step.passed(format!("rendered {} sample suggestions", views.len()))
                    .with_details(details),
            );
        } else {
            report.push(
                step.failed(format!("keywords missing from display: {}", missing.join(", ")))
                    .with_details(details),
            );
        }
    }
}

/// 理由裡寫了匹配關鍵詞，但清單是空的，前端就不會顯示
fn mentions_keywords_without_list(suggestion: &Suggestion) -> bool {
    suggestion.matched_keywords.is_empty() && suggestion.reason.contains(KEYWORDS_LABEL)
}

fn api_lines(position: usize, suggestion: &Suggestion) -> Vec<String> {
    vec![
        format!("{}. {}", position, suggestion.knowledge_point_name),
        format!(
            "   置信度: {:.3} ({:.1}%)",
            suggestion.confidence,
            suggestion.confidence * 100.0
        ),
        format!("   {}: {:?}", KEYWORDS_LABEL, suggestion.matched_keywords),
        format!("   理由: {}", suggestion.reason),
    ]
}

fn replay_lines(suggestion: &Suggestion, view: &SuggestionView) -> Vec<String> {
    let mut lines = vec![
        format!("{}. {}", view.position, view.title),
        format!("   置信度: {}", view.confidence),
        format!("   {}: {:?}", KEYWORDS_LABEL, suggestion.matched_keywords),
        format!("   理由: {}", view.reason),
    ];
    if let Some(keywords) = &view.keywords {
        lines.push(format!("   HTML显示: {}", keywords));
    }
    lines
}

#[async_trait]
impl Diagnostic for FrontendDisplayCheck {
    fn name(&self) -> &str {
        CHECK_NAME
    }

    async fn run(&self) -> Result<CheckReport> {
        let mut report = CheckReport::new(CHECK_NAME);

        if let Some(live) = &self.live {
            tracing::info!("🔧 Calling suggestion endpoint: {}", live.endpoint);
            for (index, request) in live.requests.iter().enumerate() {
                let step = self.call_api(live, index + 1, request).await;
                report.push(step);
            }
        }

        self.replay(&mut report);

        report.add_hint(
            "If the API is right but the page is wrong, hard-refresh the browser cache (Ctrl+F5)",
        );
        report.add_hint("Check the browser console for JavaScript errors");
        report.add_hint("Check displayKnowledgeSuggestions in app.js");
        Ok(report)
    }
}
