use crate::core::interpolate::PropertyScope;
use crate::core::scanner::pins_own_version;
use crate::core::xml::{XmlDocument, XmlElement};
use std::collections::BTreeSet;

/// One `<dependency>` line of the generated `<dependencyManagement>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomEntry {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl BomEntry {
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
        }
    }

    fn to_element(&self) -> XmlElement {
        let mut dependency = XmlElement::new("dependency");
        dependency.push(XmlElement::with_text("groupId", &self.group_id));
        dependency.push(XmlElement::with_text("artifactId", &self.artifact_id));
        dependency.push(XmlElement::with_text("version", &self.version));
        dependency
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyChange {
    Added,
    Updated { previous: String },
    Unchanged,
}

/// Appends `entries` to `<dependencyManagement><dependencies>`, creating the
/// block at the end of `<project>` when missing. Pairs already managed there,
/// compared after resolving placeholders in `scope`, are left alone. Returns
/// how many entries were written.
pub fn add_managed_dependencies(
    project: &mut XmlElement,
    entries: &[BomEntry],
    scope: &PropertyScope,
) -> usize {
    if entries.is_empty() && project.child("dependencyManagement").is_none() {
        return 0;
    }

    let dependencies = project
        .child_or_insert("dependencyManagement")
        .child_or_insert("dependencies");

    let mut managed: BTreeSet<(String, String)> = dependencies
        .children_named("dependency")
        .filter_map(|d| {
            let group_id = d.child_text("groupId")?;
            let artifact_id = d.child_text("artifactId")?;
            Some((scope.interpolate(&group_id), scope.interpolate(&artifact_id)))
        })
        .collect();

    let mut written = 0;
    for entry in entries {
        let key = (entry.group_id.clone(), entry.artifact_id.clone());
        if !managed.insert(key) {
            tracing::debug!(
                "{}:{} is already managed by the parent, skipping",
                entry.group_id,
                entry.artifact_id
            );
            continue;
        }
        dependencies.push(entry.to_element());
        written += 1;
    }
    written
}

/// Sets `<properties><name>`; creates `<properties>` on first use.
pub fn set_property(project: &mut XmlElement, name: &str, value: &str) -> PropertyChange {
    let properties = project.child_or_insert("properties");
    match properties.child_mut(name) {
        Some(existing) => {
            let previous = existing.text().unwrap_or_default();
            if previous == value {
                PropertyChange::Unchanged
            } else {
                *existing = XmlElement::with_text(&existing.name, value);
                PropertyChange::Updated { previous }
            }
        }
        None => {
            properties.push(XmlElement::with_text(name, value));
            PropertyChange::Added
        }
    }
}

/// Adds `<properties><name>` unless the project already declares it.
pub fn add_property_if_absent(project: &mut XmlElement, name: &str, value: &str) -> bool {
    let declared = project
        .child("properties")
        .is_some_and(|p| p.child(name).is_some());
    if declared {
        return false;
    }
    set_property(project, name, value) == PropertyChange::Added
}

/// A module POM with versions handed over to the BOM: dependency versions,
/// the module's own `<dependencyManagement>` and the given properties are
/// removed. `<parent>` and plugin declarations are untouched, as are
/// dependencies that pin their own version (see [`pins_own_version`]).
pub fn strip_module(document: &XmlDocument, properties_to_strip: &BTreeSet<String>) -> XmlDocument {
    let mut stripped = document.clone();
    let project = &mut stripped.root;

    let mut keep_management = false;
    if let Some(management) = project.child_mut("dependencyManagement") {
        if let Some(dependencies) = management.child_mut("dependencies") {
            dependencies.remove_elements(|e| e.is("dependency") && !pins_own_version(e));
            keep_management = dependencies.children_named("dependency").next().is_some();
        }
    }
    if !keep_management {
        project.remove_elements(|e| e.is("dependencyManagement"));
    }
    strip_dependency_versions(project);

    let mut now_empty = false;
    if let Some(properties) = project.child_mut("properties") {
        properties.remove_elements(|e| properties_to_strip.contains(e.local_name()));
        now_empty = properties.elements().next().is_none();
    }
    if now_empty {
        project.remove_elements(|e| e.is("properties"));
    }

    stripped
}

fn strip_dependency_versions(element: &mut XmlElement) {
    for child in element.elements_mut() {
        if child.is("plugin") || child.is("parent") {
            continue;
        }
        if child.is("dependency") {
            if !pins_own_version(child) {
                child.remove_elements(|e| e.is("version"));
            }
        } else {
            strip_dependency_versions(child);
        }
    }
}
