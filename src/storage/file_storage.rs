use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

use super::gateway::PersistenceGateway;
use super::Result;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Gateway storing one JSON file per key inside a data directory
pub struct FileGateway {
    base_path: PathBuf,
}

impl FileGateway {
    /// Create a gateway rooted at `base_path`, creating the directory if needed
    pub fn new(base_path: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("spaced"))
            .ok_or(StorageError::DataDirNotFound)
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl PersistenceGateway for FileGateway {
    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.key_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Atomic write (write to .tmp then rename)
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.key_path(key)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_gateway() -> (FileGateway, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let gateway = FileGateway::new(temp_dir.path().join("data")).unwrap();
        (gateway, temp_dir)
    }

    #[test]
    fn test_set_and_get() {
        let (gateway, _temp) = create_test_gateway();
        gateway.set("flashcards", b"[1,2,3]").unwrap();
        assert_eq!(gateway.get("flashcards").unwrap(), b"[1,2,3]".to_vec());
        assert!(gateway.base_path().join("flashcards.json").exists());
        assert!(!gateway.base_path().join("flashcards.json.tmp").exists());
    }

    #[test]
    fn test_overwrite() {
        let (gateway, _temp) = create_test_gateway();
        gateway.set("records", b"[]").unwrap();
        gateway.set("records", b"[{}]").unwrap();
        assert_eq!(gateway.get("records").unwrap(), b"[{}]".to_vec());
    }

    #[test]
    fn test_missing_and_removed_keys() {
        let (gateway, _temp) = create_test_gateway();
        assert!(matches!(
            gateway.get("currentSession"),
            Err(StorageError::NotFound(_))
        ));

        gateway.set("currentSession", b"{}").unwrap();
        gateway.remove("currentSession").unwrap();
        assert!(matches!(
            gateway.get("currentSession"),
            Err(StorageError::NotFound(_))
        ));
        gateway.remove("currentSession").unwrap();
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let (gateway, _temp) = create_test_gateway();
        assert!(matches!(
            gateway.set("../escape", b"x"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
