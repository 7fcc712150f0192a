use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let data = fs::read(self.resolve(path))?;
        Ok(data)
    }

    /// Writes to a sibling temp file and renames it over the target, so a
    /// failed write never leaves a truncated file behind.
    async fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = full_path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = full_path.with_file_name(tmp_name);

        if let Err(e) = fs::write(&tmp_path, data) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        fs::rename(&tmp_path, &full_path)?;
        Ok(())
    }

    async fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().into_owned());

        storage
            .write_file(Path::new("nested/pom_new.xml"), b"<project/>")
            .await
            .unwrap();

        assert!(storage.exists(Path::new("nested/pom_new.xml")).await);
        assert!(!dir.path().join("nested/pom_new.xml.tmp").exists());
        let data = storage.read_file(Path::new("nested/pom_new.xml")).await.unwrap();
        assert_eq!(data, b"<project/>");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().into_owned());

        assert!(!tokio_test::block_on(storage.exists(Path::new("pom.xml"))));
        assert!(tokio_test::block_on(storage.read_file(Path::new("pom.xml"))).is_err());
    }
}
