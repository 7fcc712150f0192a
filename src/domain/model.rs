use crate::core::xml::XmlDocument;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Maven coordinates of a single artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Coordinate {
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
        }
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.group_id, &self.artifact_id)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// `groupId -> artifactId -> version`; a `None` version means the POM
/// declared the dependency without one.
pub type DependencyTable = BTreeMap<String, BTreeMap<String, Option<String>>>;

/// Properties of a POM split the way the BOM needs them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomProperties {
    pub version: BTreeMap<String, String>,
    pub plain: BTreeMap<String, String>,
}

/// A parsed POM file together with its document tree.
#[derive(Debug, Clone)]
pub struct PomFile {
    pub path: PathBuf,
    pub document: XmlDocument,
    pub properties: PomProperties,
}

/// One module discovered under the aggregator.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    /// The `<module>` text relative to the POM that declared it.
    pub name: String,
    pub pom: PomFile,
    pub coordinate: Coordinate,
    /// Declared dependencies, empty unless harvesting is enabled.
    pub dependencies: Vec<DeclaredDependency>,
}

/// A `<dependency>` as written in a module POM, placeholders unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
}

/// Output of the extract stage.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub parent: PomFile,
    pub parent_coordinate: PartialCoordinate,
    pub modules: Vec<ModuleDescriptor>,
}

/// Coordinates of the aggregator; either part may be inherited from further up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialCoordinate {
    pub group_id: Option<String>,
    pub version: Option<String>,
}

/// A document scheduled to be written by the load stage.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
    pub document: XmlDocument,
}

/// Summary of a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionReport {
    pub base_dir: PathBuf,
    pub bom_path: PathBuf,
    pub modules: Vec<Coordinate>,
    pub harvested_dependencies: usize,
    pub added_properties: Vec<String>,
    pub rewritten_modules: Vec<PathBuf>,
}

/// Output of the transform stage.
#[derive(Debug, Clone)]
pub struct BomPlan {
    pub bom: OutputFile,
    pub module_rewrites: Vec<OutputFile>,
    pub report: ConversionReport,
}
