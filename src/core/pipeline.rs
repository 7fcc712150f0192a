use crate::core::interpolate::{has_placeholder, PropertyScope};
use crate::core::merge::DependencyMerger;
use crate::core::rewrite::{self, BomEntry, PropertyChange};
use crate::core::scanner;
use crate::core::{
    BomPlan, ConfigProvider, ConversionReport, Coordinate, ModuleDescriptor, OutputFile, Pipeline,
    PomFile, ScanResult, Storage,
};
use crate::domain::model::DependencyTable;
use crate::utils::error::{BomError, Result};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Component, Path, PathBuf};

pub const POM_FILE_NAME: &str = "pom.xml";

/// Converts an aggregator POM into a BOM. Paths handed to the storage are
/// relative to the configured base directory.
pub struct BomPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> BomPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    async fn read_pom(&self, path: &Path) -> Result<PomFile> {
        if !self.storage.exists(path).await {
            return Err(BomError::MissingFileError {
                path: Path::new(self.config.base_dir()).join(path),
            });
        }
        let bytes = self.storage.read_file(path).await?;
        scanner::parse_pom(path, &bytes)
    }

    /// Depth-first module discovery; a module is listed before its own
    /// sub-modules and before its later siblings.
    async fn discover_modules(
        &self,
        aggregator: &PomFile,
        scope: &PropertyScope,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<Vec<ModuleDescriptor>> {
        let mut modules = Vec::new();
        let mut pending = pending_modules(aggregator, scope);

        while let Some((pom_path, name, scope)) = pending.pop() {
            if !visited.insert(pom_path.clone()) {
                tracing::debug!("Module {} already discovered, skipping", pom_path.display());
                continue;
            }

            let pom = self.read_pom(&pom_path).await?;
            let coordinate = scanner::resolve_coordinate(&pom, &scope)?;
            let dependencies = if self.config.harvest_dependencies() {
                scanner::declared_dependencies(&pom)?
            } else {
                Vec::new()
            };
            tracing::info!("Discovered module {} ({})", name, coordinate);

            let child_scope = scanner::pom_scope(&pom, &scope);
            pending.extend(pending_modules(&pom, &child_scope));

            let display_name = pom_path
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
                .filter(|p| !p.is_empty())
                .unwrap_or(name);
            modules.push(ModuleDescriptor {
                name: display_name,
                pom,
                coordinate,
                dependencies,
            });
        }
        Ok(modules)
    }

    /// Merges every module's declared dependencies, interpolating with the
    /// module's own properties first and the accumulated project properties
    /// second.
    fn harvest(&self, scan: &ScanResult, project_properties: &mut BTreeMap<String, String>) -> DependencyTable {
        let mut merger = DependencyMerger::new();
        let parent_scope = scanner::pom_scope(&scan.parent, &PropertyScope::new());

        for module in &scan.modules {
            let scope =
                scanner::pom_scope(&module.pom, &parent_scope.overlay(project_properties.clone()));

            for dependency in &module.dependencies {
                let group_id = scope.interpolate(&dependency.group_id);
                let artifact_id = scope.interpolate(&dependency.artifact_id);
                let version = dependency.version.as_deref().map(|v| scope.interpolate(v));
                if let Some(unresolved) = version.as_deref().filter(|v| has_placeholder(v)) {
                    tracing::warn!(
                        "{}: {}:{} has unresolved version {}",
                        module.name,
                        group_id,
                        artifact_id,
                        unresolved
                    );
                }
                merger.merge(&module.name, &group_id, &artifact_id, version.as_deref());
            }

            for (name, value) in &module.pom.properties.version {
                match project_properties.get(name) {
                    Some(existing) if existing != value => tracing::warn!(
                        "{}: property {} = {} conflicts with {} declared earlier, keeping the earlier value",
                        module.name,
                        name,
                        value,
                        existing
                    ),
                    Some(_) => {}
                    None => {
                        project_properties.insert(name.clone(), value.clone());
                    }
                }
            }
        }

        for module in &scan.modules {
            let (group_id, artifact_id) = module.coordinate.key();
            if merger.remove(group_id, artifact_id) {
                tracing::debug!("{}:{} is a module of this build, not harvesting", group_id, artifact_id);
            }
        }

        merger.into_table()
    }
}

/// Modules declared by `aggregator`, reversed so popping yields declaration order.
fn pending_modules(aggregator: &PomFile, scope: &PropertyScope) -> Vec<(PathBuf, String, PropertyScope)> {
    let aggregator_dir = aggregator.path.parent().unwrap_or(Path::new(""));
    scanner::module_names(&aggregator.document.root)
        .into_iter()
        .rev()
        .map(|name| {
            let pom_path = normalize(&module_pom_path(aggregator_dir, &name));
            (pom_path, name, scope.clone())
        })
        .collect()
}

/// `<module>` entries normally name a directory; some name the POM itself.
fn module_pom_path(aggregator_dir: &Path, module: &str) -> PathBuf {
    let path = aggregator_dir.join(module);
    if module.ends_with(".xml") {
        path
    } else {
        path.join(POM_FILE_NAME)
    }
}

/// Lexically resolves `.` and `..` so the same module reached through
/// different aggregators compares equal.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Names the `*.version` property for each harvested artifact. The first
/// group to use an artifactId gets `<artifactId>.version`; later groups get
/// `<groupId>.<artifactId>.version`.
fn version_property_names(table: &DependencyTable) -> BTreeMap<(String, String), String> {
    let mut names = BTreeMap::new();
    let mut taken: BTreeSet<String> = BTreeSet::new();
    for (group_id, artifacts) in table {
        for artifact_id in artifacts.keys() {
            let short = format!("{}.version", artifact_id);
            let name = if taken.insert(short.clone()) {
                short
            } else {
                format!("{}.{}.version", group_id, artifact_id)
            };
            names.insert((group_id.clone(), artifact_id.clone()), name);
        }
    }
    names
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BomPipeline<S, C> {
    async fn extract(&self) -> Result<ScanResult> {
        let parent_path = PathBuf::from(POM_FILE_NAME);
        tracing::debug!("Reading aggregator POM from {}", self.config.base_dir());
        let parent = self.read_pom(&parent_path).await?;
        let parent_coordinate = scanner::partial_coordinate(&parent.document.root);

        let scope = scanner::pom_scope(&parent, &PropertyScope::new());
        let mut visited = HashSet::new();
        visited.insert(parent_path);
        let modules = self.discover_modules(&parent, &scope, &mut visited).await?;

        if modules.is_empty() {
            tracing::warn!("Aggregator POM declares no modules; the BOM will manage nothing new");
        }

        Ok(ScanResult {
            parent,
            parent_coordinate,
            modules,
        })
    }

    async fn transform(&self, scan: ScanResult) -> Result<BomPlan> {
        let base_dir = PathBuf::from(self.config.base_dir());
        let output_name = self.config.output_name();
        tracing::info!(
            "Building BOM for {}:{}:{}",
            scan.parent_coordinate.group_id.as_deref().unwrap_or("?"),
            scan.parent.document.root.child_text("artifactId").unwrap_or_default(),
            scan.parent_coordinate.version.as_deref().unwrap_or("?")
        );
        let mut bom = scan.parent.document.clone();
        let mut report = ConversionReport {
            base_dir: base_dir.clone(),
            bom_path: base_dir.join(output_name),
            modules: scan.modules.iter().map(|m| m.coordinate.clone()).collect(),
            ..Default::default()
        };

        let mut entries: Vec<BomEntry> = scan
            .modules
            .iter()
            .map(|m| {
                let Coordinate {
                    group_id,
                    artifact_id,
                    version,
                } = &m.coordinate;
                BomEntry::new(group_id, artifact_id, version)
            })
            .collect();

        let mut module_rewrites = Vec::new();

        if self.config.harvest_dependencies() {
            let mut hoisted = BTreeMap::new();
            let table = self.harvest(&scan, &mut hoisted);
            let property_names = version_property_names(&table);

            let mut new_properties: BTreeMap<String, String> = BTreeMap::new();
            for (group_id, artifacts) in &table {
                for (artifact_id, version) in artifacts {
                    let Some(version) = version else {
                        tracing::warn!(
                            "{}:{} is never declared with a version, leaving it out of the BOM",
                            group_id,
                            artifact_id
                        );
                        continue;
                    };
                    let key = (group_id.clone(), artifact_id.clone());
                    let Some(property) = property_names.get(&key) else {
                        continue;
                    };
                    entries.push(BomEntry::new(group_id, artifact_id, &format!("${{{}}}", property)));
                    new_properties.insert(property.clone(), version.clone());
                    report.harvested_dependencies += 1;
                }
            }

            for (name, value) in &hoisted {
                if !new_properties.contains_key(name)
                    && rewrite::add_property_if_absent(&mut bom.root, name, value)
                {
                    report.added_properties.push(name.clone());
                }
            }
            for (name, value) in &new_properties {
                match rewrite::set_property(&mut bom.root, name, value) {
                    PropertyChange::Added => report.added_properties.push(name.clone()),
                    PropertyChange::Updated { previous } => tracing::warn!(
                        "Parent property {} updated from {} to {}",
                        name,
                        previous,
                        value
                    ),
                    PropertyChange::Unchanged => {}
                }
            }
            report.added_properties.sort();

            if self.config.rewrite_modules() {
                let parent_properties = &scan.parent.properties;
                for module in &scan.modules {
                    let mut strip: BTreeSet<String> =
                        module.pom.properties.version.keys().cloned().collect();
                    strip.extend(
                        module
                            .pom
                            .properties
                            .plain
                            .keys()
                            .filter(|name| parent_properties.plain.contains_key(*name))
                            .cloned(),
                    );

                    let path = module
                        .pom
                        .path
                        .parent()
                        .unwrap_or(Path::new(""))
                        .join(output_name);
                    report.rewritten_modules.push(base_dir.join(&path));
                    module_rewrites.push(OutputFile {
                        path,
                        document: rewrite::strip_module(&module.pom.document, &strip),
                    });
                }
            }
        }

        let parent_scope = scanner::pom_scope(&scan.parent, &PropertyScope::new());
        let written = rewrite::add_managed_dependencies(&mut bom.root, &entries, &parent_scope);
        tracing::info!(
            "BOM manages {} new dependencies ({} modules, {} harvested)",
            written,
            report.modules.len(),
            report.harvested_dependencies
        );

        Ok(BomPlan {
            bom: OutputFile {
                path: PathBuf::from(output_name),
                document: bom,
            },
            module_rewrites,
            report,
        })
    }

    async fn load(&self, plan: BomPlan) -> Result<String> {
        // Serialize everything before touching the disk.
        let mut rendered = Vec::with_capacity(plan.module_rewrites.len() + 1);
        rendered.push((plan.bom.path.clone(), plan.bom.document.to_xml_string()?));
        for rewrite in &plan.module_rewrites {
            rendered.push((rewrite.path.clone(), rewrite.document.to_xml_string()?));
        }

        for (path, xml) in &rendered {
            tracing::debug!("Writing {} ({} bytes)", path.display(), xml.len());
            self.storage.write_file(path, xml.as_bytes()).await?;
        }

        Ok(plan.report.bom_path.to_string_lossy().into_owned())
    }
}
