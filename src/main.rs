use clap::Parser;
use pom2bom::utils::{logger, validation::Validate};
use pom2bom::{BomEngine, BomPipeline, CliConfig, LocalStorage};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.log_json);

    tracing::info!("Starting pom2bom");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let dry_run = config.dry_run;
    let storage = LocalStorage::new(config.base_dir.clone());
    let pipeline = BomPipeline::new(storage, config);
    let engine = BomEngine::new(pipeline);

    let result = if dry_run {
        tracing::info!("🔍 DRY RUN MODE - no files will be written");
        match engine.plan().await {
            Ok(plan) => {
                println!("{}", serde_json::to_string_pretty(&plan.report)?);
                return Ok(());
            }
            Err(e) => Err(e),
        }
    } else {
        engine.run().await
    };

    match result {
        Ok(output_path) => {
            tracing::info!("✅ BOM written to: {}", output_path);
            println!("✅ BOM written to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Conversion failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
