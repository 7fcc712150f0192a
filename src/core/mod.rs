pub mod engine;
pub mod interpolate;
pub mod merge;
pub mod pipeline;
pub mod rewrite;
pub mod scanner;
pub mod version;
pub mod xml;

pub use crate::domain::model::{
    BomPlan, ConversionReport, Coordinate, ModuleDescriptor, OutputFile, PomFile, ScanResult,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
