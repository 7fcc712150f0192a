use crate::core::interpolate::PropertyScope;
use crate::core::xml::{XmlDocument, XmlElement};
use crate::domain::model::{
    Coordinate, DeclaredDependency, PartialCoordinate, PomFile, PomProperties,
};
use crate::utils::error::{BomError, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Subtrees whose `<dependency>` elements are not project dependencies.
const NON_PROJECT_SUBTREES: [&str; 2] = ["plugin", "parent"];

pub fn parse_pom(path: &Path, bytes: &[u8]) -> Result<PomFile> {
    let content = std::str::from_utf8(bytes).map_err(|e| BomError::xml_parse(path, e))?;
    let document = XmlDocument::parse(path, content)?;

    if !document.root.is("project") {
        return Err(BomError::missing_element(path, "project"));
    }

    let properties = scan_properties(&document.root);
    tracing::debug!(
        "Parsed {} ({} version properties, {} other properties)",
        path.display(),
        properties.version.len(),
        properties.plain.len()
    );

    Ok(PomFile {
        path: path.to_path_buf(),
        document,
        properties,
    })
}

/// Splits `<properties>` into version-ish and other entries; empty values are skipped.
pub fn scan_properties(project: &XmlElement) -> PomProperties {
    let mut properties = PomProperties::default();
    let Some(section) = project.child("properties") else {
        return properties;
    };

    for property in section.elements() {
        let Some(value) = property.text() else {
            continue;
        };
        let name = property.local_name().to_string();
        if name.to_ascii_lowercase().contains("version") {
            properties.version.insert(name, value);
        } else {
            properties.plain.insert(name, value);
        }
    }
    properties
}

/// The project's own groupId/version, falling back to its `<parent>` block.
pub fn partial_coordinate(project: &XmlElement) -> PartialCoordinate {
    let parent = project.child("parent");
    let inherited = |name: &str| parent.and_then(|p| p.child_text(name));
    PartialCoordinate {
        group_id: project.child_text("groupId").or_else(|| inherited("groupId")),
        version: project.child_text("version").or_else(|| inherited("version")),
    }
}

/// `<module>` entries in declaration order, including those inside profiles.
pub fn module_names(project: &XmlElement) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let direct = project.path(&["modules", "module"]);
    let profiled = project.path(&["profiles", "profile", "modules", "module"]);

    for module in direct.into_iter().chain(profiled) {
        if let Some(name) = module.text() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// `project.*` properties Maven exposes for a POM.
pub fn project_properties(project: &XmlElement, partial: &PartialCoordinate) -> BTreeMap<String, String> {
    let mut layer = BTreeMap::new();
    if let Some(group_id) = &partial.group_id {
        layer.insert("project.groupId".to_string(), group_id.clone());
    }
    if let Some(version) = &partial.version {
        layer.insert("project.version".to_string(), version.clone());
    }
    if let Some(artifact_id) = project.child_text("artifactId") {
        layer.insert("project.artifactId".to_string(), artifact_id);
    }
    if let Some(parent) = project.child("parent") {
        if let Some(group_id) = parent.child_text("groupId") {
            layer.insert("project.parent.groupId".to_string(), group_id);
        }
        if let Some(version) = parent.child_text("version") {
            layer.insert("project.parent.version".to_string(), version);
        }
    }
    layer
}

/// Scope a POM's own values are interpolated in: its properties, then its
/// `project.*` values, then whatever `outer` provides.
pub fn pom_scope(pom: &PomFile, outer: &PropertyScope) -> PropertyScope {
    let project = &pom.document.root;
    let partial = partial_coordinate(project);
    let mut own = project_properties(project, &partial);
    own.extend(pom.properties.plain.clone());
    own.extend(pom.properties.version.clone());
    outer.overlay(own)
}

/// Full coordinates of a module POM; every part must be present after
/// inheritance from `<parent>`.
pub fn resolve_coordinate(pom: &PomFile, outer: &PropertyScope) -> Result<Coordinate> {
    let project = &pom.document.root;
    let partial = partial_coordinate(project);
    let scope = pom_scope(pom, outer);

    let require = |value: Option<String>, element: &str| -> Result<String> {
        let value = value.ok_or_else(|| BomError::missing_element(&pom.path, element))?;
        let resolved = scope.interpolate(&value);
        if resolved.trim().is_empty() {
            return Err(BomError::missing_element(&pom.path, element));
        }
        Ok(resolved)
    };

    let group_id = require(partial.group_id, "groupId")?;
    let artifact_id = require(project.child_text("artifactId"), "artifactId")?;
    let version = require(partial.version, "version")?;

    Ok(Coordinate {
        group_id,
        artifact_id,
        version,
    })
}

/// A dependency a BOM line keyed on `groupId:artifactId` cannot stand in
/// for: `import`-scoped BOMs, and artifacts with a non-jar `<type>` or a
/// `<classifier>`.
pub fn pins_own_version(dependency: &XmlElement) -> bool {
    if dependency.child_text("scope").as_deref() == Some("import") {
        return true;
    }
    if dependency.child_text("classifier").is_some() {
        return true;
    }
    dependency
        .child_text("type")
        .is_some_and(|kind| kind != "jar")
}

/// Every `<dependency>` of the project, in document order, outside plugin
/// and parent declarations. Dependencies that pin their own version are
/// left out.
pub fn declared_dependencies(pom: &PomFile) -> Result<Vec<DeclaredDependency>> {
    let mut elements = Vec::new();
    pom.document
        .root
        .descendants_except(&NON_PROJECT_SUBTREES, &mut elements);

    elements
        .into_iter()
        .filter(|e| e.is("dependency"))
        .filter(|e| {
            let skip = pins_own_version(e);
            if skip {
                tracing::debug!(
                    "{}: keeping {}:{} out of the BOM (import scope, type or classifier)",
                    pom.path.display(),
                    e.child_text("groupId").unwrap_or_default(),
                    e.child_text("artifactId").unwrap_or_default()
                );
            }
            !skip
        })
        .map(|dependency| {
            let group_id = dependency
                .child_text("groupId")
                .ok_or_else(|| BomError::missing_element(&pom.path, "dependency/groupId"))?;
            let artifact_id = dependency
                .child_text("artifactId")
                .ok_or_else(|| BomError::missing_element(&pom.path, "dependency/artifactId"))?;
            Ok(DeclaredDependency {
                group_id,
                artifact_id,
                version: dependency.child_text("version"),
            })
        })
        .collect()
}
