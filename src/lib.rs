pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{engine::BomEngine, pipeline::BomPipeline};
pub use domain::model::{ConversionReport, Coordinate};
pub use utils::error::{BomError, Result};
