use crate::utils::error::{BomError, Result};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(BomError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(BomError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// The base directory must exist and hold the aggregator `pom.xml`.
pub fn validate_project_dir(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;

    let dir = Path::new(path);
    if !dir.is_dir() {
        return Err(BomError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Directory does not exist".to_string(),
        });
    }

    if !dir.join("pom.xml").is_file() {
        return Err(BomError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Directory does not contain a pom.xml".to_string(),
        });
    }

    Ok(())
}

/// Output names are bare `.xml` file names written next to each source POM.
pub fn validate_output_name(field_name: &str, name: &str) -> Result<()> {
    validate_non_empty_string(field_name, name)?;

    if name.contains('/') || name.contains('\\') {
        return Err(BomError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Must be a file name, not a path".to_string(),
        });
    }

    if name == "pom.xml" {
        return Err(BomError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Refusing to overwrite the source pom.xml".to_string(),
        });
    }

    validate_file_extensions(field_name, &[name.to_string()], &["xml"])
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    for file in files {
        match Path::new(file).extension().and_then(|ext| ext.to_str()) {
            Some(extension) if allowed_extensions.contains(&extension) => {}
            Some(extension) => {
                return Err(BomError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(BomError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BomError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Module rewriting relies on the harvested versions landing in the BOM.
pub fn validate_rewrite_requires_harvest(harvest: bool, rewrite_modules: bool) -> Result<()> {
    if rewrite_modules && !harvest {
        return Err(BomError::ConfigValidationError {
            field: "rewrite_modules".to_string(),
            message: "module rewriting requires dependency harvesting to be enabled".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("base_dir", "/tmp/project").is_ok());
        assert!(validate_path("base_dir", "").is_err());
        assert!(validate_path("base_dir", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_project_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_str().unwrap();
        assert!(validate_project_dir("base_dir", path).is_err());

        std::fs::write(dir.path().join("pom.xml"), "<project/>").unwrap();
        assert!(validate_project_dir("base_dir", path).is_ok());

        assert!(validate_project_dir("base_dir", "/definitely/not/here").is_err());
    }

    #[test]
    fn test_validate_output_name() {
        assert!(validate_output_name("output_name", "pom_new.xml").is_ok());
        assert!(validate_output_name("output_name", "bom.xml").is_ok());
        assert!(validate_output_name("output_name", "pom.xml").is_err());
        assert!(validate_output_name("output_name", "out/pom_new.xml").is_err());
        assert!(validate_output_name("output_name", "pom_new.txt").is_err());
        assert!(validate_output_name("output_name", "  ").is_err());
    }

    #[test]
    fn test_validate_rewrite_requires_harvest() {
        assert!(validate_rewrite_requires_harvest(true, true).is_ok());
        assert!(validate_rewrite_requires_harvest(false, false).is_ok());
        assert!(validate_rewrite_requires_harvest(false, true).is_err());
    }
}
