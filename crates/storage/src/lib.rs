use directories::ProjectDirs;
use pdf_annotate_ui::EditConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

mod store;

pub use store::JsonFileStore;

const CONFIG_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("unsupported config schema version {0}")]
    UnsupportedVersion(u32),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Local data directory holding the edit configuration and annotation sidecars
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigEnvelope {
    version: u32,
    config: EditConfig,
}

impl Storage {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "PdfAnnotate", "PdfAnnotate")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Annotation store writing one JSON file per document under this root
    pub fn annotation_store(&self) -> JsonFileStore {
        JsonFileStore::new(self.root.join("annotations"))
    }

    pub fn load_config(&self) -> Result<EditConfig, StorageError> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(EditConfig::default());
        }

        let bytes = fs::read(path)?;
        let envelope: ConfigEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.version > CONFIG_SCHEMA_VERSION {
            return Err(StorageError::UnsupportedVersion(envelope.version));
        }

        Ok(envelope.config)
    }

    pub fn save_config(&self, config: &EditConfig) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let envelope = ConfigEnvelope { version: CONFIG_SCHEMA_VERSION, config: config.clone() };

        let bytes = serde_json::to_vec_pretty(&envelope)?;
        fs::write(self.config_path(), bytes)?;
        log::debug!("saved edit config to {}", self.config_path().display());
        Ok(())
    }

    fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }
}
