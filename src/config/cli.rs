use super::{CliConfig, Command, DeploymentArgs, GraphArgs};
use crate::config::toml_config::DiagConfig;
use crate::utils::error::Result;

impl CliConfig {
    /// 載入配置檔後套用命令列覆蓋設定
    pub fn resolve(&self) -> Result<DiagConfig> {
        let mut config = DiagConfig::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut DiagConfig) {
        match &self.command {
            Command::ConnectDb(graph)
            | Command::CloudConnection(graph)
            | Command::KnowledgePoints(graph) => apply_graph_args(graph, config),
            Command::InitCloud(deployment) => apply_deployment_args(deployment, config),
            Command::FrontendDisplay { endpoint, .. } => {
                if let Some(endpoint) = endpoint {
                    tracing::info!("🔧 Suggestion endpoint overridden to: {}", endpoint);
                    config.suggest.endpoint = endpoint.clone();
                }
            }
            Command::SuggestionAccuracy {
                deployment,
                delay_ms,
            } => {
                apply_deployment_args(deployment, config);
                if let Some(delay_ms) = delay_ms {
                    config.suggest.request_delay_ms = *delay_ms;
                }
            }
            Command::All { .. } => {}
        }
    }
}

fn apply_graph_args(args: &GraphArgs, config: &mut DiagConfig) {
    if let Some(uri) = &args.uri {
        tracing::info!("🔧 Graph URI overridden to: {}", uri);
        config.graph.uri = uri.clone();
    }
    if let Some(username) = &args.username {
        config.graph.username = username.clone();
    }
    if let Some(database) = &args.database {
        config.graph.database = database.clone();
    }
}

fn apply_deployment_args(args: &DeploymentArgs, config: &mut DiagConfig) {
    if let Some(base_url) = &args.base_url {
        tracing::info!("🔧 Deployment URL overridden to: {}", base_url);
        config.deployment.base_url = base_url.trim_end_matches('/').to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_graph_overrides() {
        let cli = CliConfig::try_parse_from([
            "kg-diag",
            "cloud-connection",
            "--uri",
            "bolt://localhost:7687",
            "--database",
            "grammar",
        ])
        .unwrap();

        let config = cli.resolve().unwrap();
        assert_eq!(config.graph.uri, "bolt://localhost:7687");
        assert_eq!(config.graph.database, "grammar");
        assert_eq!(config.graph.username, "neo4j");
    }

    #[test]
    fn test_suggestion_accuracy_overrides() {
        let cli = CliConfig::try_parse_from([
            "kg-diag",
            "--json",
            "suggestion-accuracy",
            "--base-url",
            "http://127.0.0.1:8000/",
            "--delay-ms",
            "0",
        ])
        .unwrap();

        assert!(cli.json);
        let config = cli.resolve().unwrap();
        assert_eq!(config.deployment.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.suggest.request_delay_ms, 0);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = CliConfig::try_parse_from(["kg-diag", "frontend-display", "--replay-only", "-v"])
            .unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Command::FrontendDisplay { replay_only: true, .. }
        ));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(CliConfig::try_parse_from(["kg-diag"]).is_err());
    }
}
