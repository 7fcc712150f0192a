use crate::core::version::is_newer;
use crate::domain::model::DependencyTable;

/// Accumulates dependency declarations across modules, keeping the newest
/// version seen for each `groupId:artifactId`.
#[derive(Debug, Default)]
pub struct DependencyMerger {
    table: DependencyTable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Added,
    Unchanged,
    VersionFilled,
    Upgraded { previous: String },
    Incomparable,
}

impl DependencyMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(
        &mut self,
        module: &str,
        group_id: &str,
        artifact_id: &str,
        version: Option<&str>,
    ) -> MergeOutcome {
        let artifacts = self.table.entry(group_id.to_string()).or_default();

        if !artifacts.contains_key(artifact_id) {
            tracing::info!(
                "{}: Found new dependency {}:{}:{}",
                module,
                group_id,
                artifact_id,
                version.unwrap_or("-")
            );
            artifacts.insert(artifact_id.to_string(), version.map(str::to_string));
            return MergeOutcome::Added;
        }

        let Some(version) = version else {
            return MergeOutcome::Unchanged;
        };
        let current = artifacts.entry(artifact_id.to_string()).or_default();

        let Some(existing) = current.clone() else {
            tracing::warn!(
                "{}: {}:{} BOM version overridden with {}",
                module,
                group_id,
                artifact_id,
                version
            );
            *current = Some(version.to_string());
            return MergeOutcome::VersionFilled;
        };

        match is_newer(version, &existing) {
            Some(true) => {
                tracing::info!(
                    "{}: {}:{} - replaced version {} with {}",
                    module,
                    group_id,
                    artifact_id,
                    existing,
                    version
                );
                *current = Some(version.to_string());
                MergeOutcome::Upgraded { previous: existing }
            }
            Some(false) => MergeOutcome::Unchanged,
            None => {
                if existing != version {
                    tracing::warn!(
                        "Not replacing incomparable version {} for {}:{} (keeping {})",
                        version,
                        group_id,
                        artifact_id,
                        existing
                    );
                }
                MergeOutcome::Incomparable
            }
        }
    }

    pub fn remove(&mut self, group_id: &str, artifact_id: &str) -> bool {
        let Some(artifacts) = self.table.get_mut(group_id) else {
            return false;
        };
        let removed = artifacts.remove(artifact_id).is_some();
        if artifacts.is_empty() {
            self.table.remove(group_id);
        }
        removed
    }

    pub fn into_table(self) -> DependencyTable {
        self.table
    }
}
