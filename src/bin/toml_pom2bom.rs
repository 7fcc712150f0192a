use anyhow::Context;
use clap::Parser;
use pom2bom::core::ConfigProvider;
use pom2bom::utils::{logger, validation::Validate};
use pom2bom::{BomEngine, BomPipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-pom2bom")]
#[command(about = "pom2bom driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "pom2bom.toml")]
    config: String,

    /// Override [project].base_dir
    #[arg(long)]
    base_dir: Option<String>,

    /// Override [harvest].enabled
    #[arg(long)]
    harvest: Option<bool>,

    /// Override [harvest].rewrite_modules
    #[arg(long)]
    rewrite_modules: Option<bool>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dry run - print the conversion report without writing files
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    logger::init_logger(args.verbose || config.verbose(), config.json_logs());
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(base_dir) = args.base_dir {
        tracing::info!("🔧 base_dir overridden to: {}", base_dir);
        config.project.base_dir = base_dir;
    }
    if let Some(harvest) = args.harvest {
        config.harvest.enabled = harvest;
    }
    if let Some(rewrite) = args.rewrite_modules {
        config.harvest.rewrite_modules = rewrite;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no files will be written");
    } else {
        display_config_summary(&config);
    }

    let storage = LocalStorage::new(config.base_dir().to_string());
    let engine = BomEngine::new(BomPipeline::new(storage, config));

    if args.dry_run {
        let plan = engine.plan().await.context("dry run failed")?;
        println!("{}", serde_json::to_string_pretty(&plan.report)?);
        return Ok(());
    }

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ BOM written to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Conversion failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}

fn display_config_summary(config: &TomlConfig) {
    println!("📋 Configuration Summary:");
    println!("  Project: {}", config.base_dir());
    println!("  Output file: {}", config.output_name());
    println!("  Harvest dependencies: {}", config.harvest_dependencies());
    println!("  Rewrite modules: {}", config.rewrite_modules());
    println!();
}
