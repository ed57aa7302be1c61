use httpmock::prelude::*;
use kg_diagnostics::app::checks::InitCloudCheck;
use kg_diagnostics::config::toml_config::DeploymentConfig;
use kg_diagnostics::core::{Diagnostic, StepStatus};
use kg_diagnostics::DeploymentClient;
use std::time::Duration;

fn check_for(server: &MockServer) -> InitCloudCheck {
    let config = DeploymentConfig {
        base_url: server.base_url(),
        ..DeploymentConfig::default()
    };
    let client = DeploymentClient::new(&config.base_url, Duration::from_secs(5)).unwrap();
    InitCloudCheck::new(client, &config)
}

#[tokio::test]
async fn test_all_steps_succeed() {
    let server = MockServer::start();
    let schema = server.mock(|when, then| {
        when.method(POST).path("/api/init/database");
        then.status(200).json_body(serde_json::json!({
            "success": true,
            "created_knowledge_points": 10
        }));
    });
    let sample = server.mock(|when, then| {
        when.method(POST).path("/api/init/sample-data");
        then.status(200).json_body(serde_json::json!({"success": true}));
    });
    let stats = server.mock(|when, then| {
        when.method(GET).path("/api/analytics/dashboard-stats");
        then.status(200).json_body(serde_json::json!({
            "knowledge_points_count": 10,
            "questions_count": 6
        }));
    });

    let report = check_for(&server).run().await.unwrap();

    schema.assert();
    sample.assert();
    stats.assert();
    assert!(report.passed());
    assert_eq!(report.steps.len(), 3);
    assert_eq!(report.data["knowledge_points_count"], 10);
    assert_eq!(report.data["questions_count"], 6);
    assert_eq!(report.hints, vec![format!("Deployment: {}", server.base_url())]);
}

#[tokio::test]
async fn test_failed_step_does_not_stop_later_steps() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/init/database");
        then.status(500)
            .json_body(serde_json::json!({"detail": "数据库初始化失败: timeout"}));
    });
    let sample = server.mock(|when, then| {
        when.method(POST).path("/api/init/sample-data");
        then.status(200);
    });
    let stats = server.mock(|when, then| {
        when.method(GET).path("/api/analytics/dashboard-stats");
        then.status(200).json_body(serde_json::json!({
            "total_knowledge_points": 4,
            "total_questions": 2,
            "annotated_questions": 1,
            "annotation_coverage": 50.0
        }));
    });

    let report = check_for(&server).run().await.unwrap();

    sample.assert();
    stats.assert();
    assert!(!report.passed());

    let schema_step = report.step("init database").unwrap();
    assert_eq!(schema_step.status, StepStatus::Failed);
    assert!(schema_step.message.contains("HTTP 500"));
    assert!(schema_step.details[0].contains("数据库初始化失败"));

    assert_eq!(report.step("sample data").unwrap().status, StepStatus::Passed);
    assert_eq!(report.step("verify data").unwrap().status, StepStatus::Passed);
    assert_eq!(report.data["knowledge_points_count"], 4);
}

#[tokio::test]
async fn test_stats_failure_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST);
        then.status(200);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/analytics/dashboard-stats");
        then.status(404);
    });

    let report = check_for(&server).run().await.unwrap();

    let verify = report.step("verify data").unwrap();
    assert_eq!(verify.status, StepStatus::Failed);
    assert!(verify.message.contains("HTTP 404"));
    assert_eq!(report.count(StepStatus::Passed), 2);
}

#[tokio::test]
async fn test_unreachable_deployment_fails_every_step() {
    // 沒有服務監聽的埠
    let config = DeploymentConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        ..DeploymentConfig::default()
    };
    let client = DeploymentClient::new(&config.base_url, Duration::from_secs(2)).unwrap();
    let report = InitCloudCheck::new(client, &config).run().await.unwrap();

    assert_eq!(report.count(StepStatus::Failed), 3);
}
