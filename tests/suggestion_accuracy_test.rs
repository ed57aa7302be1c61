use httpmock::prelude::*;
use kg_diagnostics::app::checks::SuggestionAccuracyCheck;
use kg_diagnostics::config::toml_config::{DiagConfig, SuggestionExpectation};
use kg_diagnostics::core::{Diagnostic, StepStatus};
use kg_diagnostics::DeploymentClient;
use std::time::{Duration, Instant};

fn expectation(name: &str, content: &str, expected: &str) -> SuggestionExpectation {
    SuggestionExpectation {
        name: name.to_string(),
        content: content.to_string(),
        expected: expected.to_string(),
        min_confidence: 0.8,
    }
}

fn check_for(
    server: &MockServer,
    expectations: Vec<SuggestionExpectation>,
) -> SuggestionAccuracyCheck {
    check_with_delay(server, expectations, 0)
}

fn check_with_delay(
    server: &MockServer,
    expectations: Vec<SuggestionExpectation>,
    delay_ms: u64,
) -> SuggestionAccuracyCheck {
    let mut config = DiagConfig::default();
    config.deployment.base_url = server.base_url();
    config.suggest.request_delay_ms = delay_ms;
    config.suggest.expectations = expectations;

    let client = DeploymentClient::new(&server.base_url(), Duration::from_secs(5)).unwrap();
    SuggestionAccuracyCheck::new(client, &config)
}

fn mock_suggest(server: &MockServer, marker: &str, name: &str, confidence: f64) {
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/annotation/suggest")
            .body_contains(marker);
        then.status(200).json_body(serde_json::json!({
            "suggestions": [{
                "knowledge_point_id": "kp_x",
                "knowledge_point_name": name,
                "confidence": confidence
            }],
            "count": 1
        }));
    });
}

fn mock_healthy(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200)
            .json_body(serde_json::json!({"status": "healthy", "database": "connected"}));
    });
}

#[tokio::test]
async fn test_all_cases_pass() {
    let server = MockServer::start();
    mock_healthy(&server);
    mock_suggest(&server, "Never have", "倒装句", 0.92);
    mock_suggest(&server, "must finish", "情态动词", 0.88);

    let check = check_for(
        &server,
        vec![
            expectation("倒装句", "Never have I seen such a beautiful sunset.", "倒装句"),
            expectation("情态动词", "You must finish your homework.", "情态动词"),
        ],
    );
    let report = check.run().await.unwrap();

    assert!(report.passed());
    let health = report.step("health check").unwrap();
    assert_eq!(health.message, "system status: healthy");
    assert!(health.details.contains(&"database: connected".to_string()));

    let score = report.step("score").unwrap();
    assert_eq!(score.status, StepStatus::Passed);
    assert_eq!(report.data["score"], 2.0);
    assert_eq!(report.data["total"], 2);
    assert!(report.hints.is_empty());
}

#[tokio::test]
async fn test_mixed_results_fail_with_hints() {
    let server = MockServer::start();
    mock_healthy(&server);
    mock_suggest(&server, "Never have", "倒装句", 0.92);
    mock_suggest(&server, "must finish", "情态动词", 0.5);
    mock_suggest(&server, "If I were", "一般过去时", 0.7);

    let check = check_for(
        &server,
        vec![
            expectation("倒装句", "Never have I seen such a beautiful sunset.", "倒装句"),
            expectation("情态动词", "You must finish your homework.", "情态动词"),
            expectation("虚拟语气", "If I were you, I would study harder.", "虚拟语气"),
        ],
    );
    let report = check.run().await.unwrap();

    assert_eq!(report.step("case 1: 倒装句").unwrap().status, StepStatus::Passed);
    assert_eq!(
        report.step("case 2: 情态动词").unwrap().status,
        StepStatus::Warning
    );
    let wrong = report.step("case 3: 虚拟语气").unwrap();
    assert_eq!(wrong.status, StepStatus::Failed);
    assert!(wrong.message.contains("一般过去时"));
    assert!(wrong
        .details
        .iter()
        .any(|d| d == "input: If I were you, I would study harder."));

    let score = report.step("score").unwrap();
    assert_eq!(score.status, StepStatus::Failed);
    assert_eq!(score.message, "1.5/3 passed; pass rate too low");
    assert_eq!(report.hints.len(), 3);
}

#[tokio::test]
async fn test_unhealthy_deployment_skips_score() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(502).body("Bad Gateway");
    });
    let suggest = server.mock(|when, then| {
        when.method(POST).path("/api/annotation/suggest");
        then.status(200);
    });

    let check = check_for(
        &server,
        vec![expectation("倒装句", "Never have I seen it.", "倒装句")],
    );
    let report = check.run().await.unwrap();

    suggest.assert_hits(0);
    assert!(!report.passed());
    assert_eq!(report.steps.len(), 2);
    assert_eq!(report.steps[0].status, StepStatus::Failed);
    assert_eq!(report.step("score").unwrap().status, StepStatus::Skipped);
}

#[tokio::test]
async fn test_degraded_status_is_warning() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200).json_body(serde_json::json!({
            "status": "unhealthy",
            "error": "Neo4j connection refused"
        }));
    });

    let report = check_for(&server, Vec::new()).run().await.unwrap();

    let health = report.step("health check").unwrap();
    assert_eq!(health.status, StepStatus::Warning);
    assert!(health
        .details
        .contains(&"error: Neo4j connection refused".to_string()));
    assert_eq!(report.step("score").unwrap().status, StepStatus::Skipped);
}

#[tokio::test]
async fn test_non_json_health_body_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200)
            .header("content-type", "text/html")
            .body("<html>login</html>");
    });
    let suggest = server.mock(|when, then| {
        when.method(POST).path("/api/annotation/suggest");
        then.status(200);
    });

    let check = check_for(
        &server,
        vec![expectation("倒装句", "Never have I seen it.", "倒装句")],
    );
    let report = check.run().await.unwrap();

    suggest.assert_hits(0);
    let health = report.step("health check").unwrap();
    assert_eq!(health.status, StepStatus::Failed);
    assert!(health.message.starts_with("health response is not JSON"));
    assert!(health.details.iter().any(|d| d == "<html>login</html>"));
    assert_eq!(report.step("score").unwrap().status, StepStatus::Skipped);
}

#[tokio::test]
async fn test_health_without_status_field_is_unknown() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200).json_body(serde_json::json!({"database": "connected"}));
    });

    let report = check_for(&server, Vec::new()).run().await.unwrap();

    let health = report.step("health check").unwrap();
    assert_eq!(health.status, StepStatus::Passed);
    assert_eq!(health.message, "system status: unknown");
}

#[tokio::test]
async fn test_requests_are_spaced_by_delay() {
    let server = MockServer::start();
    mock_healthy(&server);
    mock_suggest(&server, "Never have", "倒装句", 0.92);
    mock_suggest(&server, "must finish", "情态动词", 0.88);

    let delay = Duration::from_millis(150);
    let check = check_with_delay(
        &server,
        vec![
            expectation("倒装句", "Never have I seen such a beautiful sunset.", "倒装句"),
            expectation("情态动词", "You must finish your homework.", "情态动词"),
        ],
        delay.as_millis() as u64,
    );

    let started = Instant::now();
    let report = check.run().await.unwrap();
    let elapsed = started.elapsed();

    assert!(report.passed());
    // 兩個案例之間睡一次，最後一個之後不睡
    assert!(elapsed >= delay, "elapsed {:?}", elapsed);
    assert!(elapsed < delay * 2, "elapsed {:?}", elapsed);
}
