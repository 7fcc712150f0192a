pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

/// Project directory used when none is given.
pub const DEFAULT_BASE_DIR: &str = ".";

/// Written next to every POM that gets regenerated.
pub const DEFAULT_OUTPUT_NAME: &str = "pom_new.xml";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "pom2bom")]
#[command(about = "Turn a Maven aggregator POM into a bill-of-materials POM")]
pub struct CliConfig {
    /// Directory holding the aggregator pom.xml
    #[arg(long, default_value = DEFAULT_BASE_DIR)]
    pub base_dir: String,

    /// File name of the generated POMs
    #[arg(long, default_value = DEFAULT_OUTPUT_NAME)]
    pub output_name: String,

    /// Also pin the third-party dependencies declared by the modules
    #[arg(long)]
    pub harvest_dependencies: bool,

    /// Write module POMs with their dependency versions removed
    #[arg(long, requires = "harvest_dependencies")]
    pub rewrite_modules: bool,

    /// Print the conversion report instead of writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn base_dir(&self) -> &str {
        &self.base_dir
    }

    fn output_name(&self) -> &str {
        &self.output_name
    }

    fn harvest_dependencies(&self) -> bool {
        self.harvest_dependencies
    }

    fn rewrite_modules(&self) -> bool {
        self.rewrite_modules
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

/// Checks shared by every configuration source.
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validation::validate_project_dir("base_dir", config.base_dir())?;
    validation::validate_output_name("output_name", config.output_name())?;
    validation::validate_rewrite_requires_harvest(
        config.harvest_dependencies(),
        config.rewrite_modules(),
    )
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["pom2bom"]);
        assert_eq!(config.base_dir, DEFAULT_BASE_DIR);
        assert_eq!(config.output_name, DEFAULT_OUTPUT_NAME);
        assert!(!config.harvest_dependencies);
        assert!(!config.rewrite_modules);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_rewrite_requires_harvest_flag() {
        assert!(CliConfig::try_parse_from(["pom2bom", "--rewrite-modules"]).is_err());
        let config = CliConfig::try_parse_from([
            "pom2bom",
            "--harvest-dependencies",
            "--rewrite-modules",
        ])
        .unwrap();
        assert!(config.rewrite_modules);
    }

    #[test]
    fn test_validate_checks_project_layout() {
        let dir = TempDir::new().unwrap();
        let base_dir = dir.path().to_string_lossy().into_owned();
        let config = CliConfig::parse_from(["pom2bom", "--base-dir", base_dir.as_str()]);
        assert!(config.validate().is_err());

        std::fs::write(dir.path().join("pom.xml"), "<project/>").unwrap();
        assert!(config.validate().is_ok());

        let config = CliConfig::parse_from([
            "pom2bom",
            "--base-dir",
            base_dir.as_str(),
            "--output-name",
            "pom.xml",
        ]);
        assert!(config.validate().is_err());
    }
}
