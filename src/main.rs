use clap::Parser;
use credit_strategy::utils::{error::StrategyError, logger, validation::Validate};
use credit_strategy::{
    CliConfig, CreditPipeline, LocalStorage, RunSummary, StrategyConfig, StrategyEngine,
};

fn fail(e: &StrategyError) -> ! {
    tracing::error!(
        "❌ Credit strategy failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(e.exit_code());
}

fn load_settings(config: &CliConfig) -> credit_strategy::Result<StrategyConfig> {
    let settings = match &config.config {
        Some(path) => {
            tracing::info!("Loading settings from {}", path.display());
            StrategyConfig::from_file(path)?
        }
        None => StrategyConfig::default(),
    };
    settings.validate()?;
    Ok(settings)
}

fn print_summary(summary: &RunSummary) {
    println!("✅ Excel file generated: {}", summary.output_path);
    println!(
        "   Semester {} - {} modules",
        summary.semester, summary.module_count
    );
    println!(
        "   Credits: {} available, {} registered, {} bonus validated",
        summary.totals.available, summary.totals.registered, summary.totals.bonus
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting credit-strategy CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }
    let settings = match load_settings(&config) {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };

    let storage = LocalStorage::new(".".to_string());
    let pipeline = match CreditPipeline::new(storage, config, settings) {
        Ok(pipeline) => pipeline,
        Err(e) => fail(&e),
    };

    let engine = StrategyEngine::new(pipeline);
    match engine.run().await {
        Ok(summary) => print_summary(&summary),
        Err(e) => fail(&e),
    }
}
