use clap::Parser;
use kg_diagnostics::app::checks;
use kg_diagnostics::config::Command;
use kg_diagnostics::core::runner::save_reports;
use kg_diagnostics::utils::logger;
use kg_diagnostics::utils::validation::validate_path;
use kg_diagnostics::{CliConfig, DiagnosticRunner, LocalStorage, OutputFormat};

const CONFIG_ERROR_EXIT_CODE: i32 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🔧 Starting kg-diag");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入配置
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(CONFIG_ERROR_EXIT_CODE);
        }
    };

    if let Some(output) = &cli.output {
        if let Err(e) = validate_path("output", output) {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(CONFIG_ERROR_EXIT_CODE);
        }
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let mut runner = DiagnosticRunner::new(format);
    match &cli.command {
        Command::ConnectDb(_) => runner.add_check(checks::connect_db(&config)),
        Command::CloudConnection(_) => runner.add_check(checks::cloud_connection(&config)),
        Command::InitCloud(_) => runner.add_check(checks::init_cloud(&config)),
        Command::FrontendDisplay { replay_only, .. } => {
            runner.add_check(checks::frontend_display(&config, *replay_only))
        }
        Command::KnowledgePoints(_) => runner.add_check(checks::knowledge_points(&config)),
        Command::SuggestionAccuracy { .. } => {
            runner.add_check(checks::suggestion_accuracy(&config))
        }
        Command::All { replay_only } => {
            for check in checks::all(&config, *replay_only) {
                runner.add_check(check);
            }
        }
    }

    let outcome = runner.run_all().await;

    if let Some(output) = &cli.output {
        let storage = LocalStorage::new(output.clone());
        match save_reports(&storage, &outcome.reports).await {
            Ok(files) => {
                tracing::info!("📁 {} reports saved to: {}", files.len(), storage.base_path())
            }
            Err(e) => {
                tracing::error!("❌ Failed to save reports: {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
            }
        }
    }

    let exit_code = outcome.exit_code();
    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
