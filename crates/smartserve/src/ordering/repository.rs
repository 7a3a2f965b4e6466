use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::catalog::Catalog;

/// Persistence seam for the catalog snapshot, so the service can be exercised
/// without touching disk.
pub trait CatalogStore: Send + Sync {
    fn load(&self) -> Result<Catalog, StoreError>;
    fn persist(&self, catalog: &Catalog) -> Result<(), StoreError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("catalog file {path} unreadable: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("catalog file {path} could not be written: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("catalog file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Keeps nothing beyond the live process.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryStore;

impl CatalogStore for MemoryStore {
    fn load(&self) -> Result<Catalog, StoreError> {
        Ok(Catalog::default())
    }

    fn persist(&self, _catalog: &Catalog) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Stores the whole catalog as one JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the target with `.tmp` appended to the full file name.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, source: io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl CatalogStore for JsonFileStore {
    /// A missing file is an empty catalog.
    fn load(&self) -> Result<Catalog, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Catalog::default()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes to a sibling temp file, then renames over the target.
    fn persist(&self, catalog: &Catalog) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(catalog)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.write_error(err))?;
        }

        let temp_path = self.temp_path();
        let result = fs::File::create(&temp_path)
            .and_then(|mut file| {
                file.write_all(&json)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp_path, &self.path));
        if let Err(err) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(self.write_error(err));
        }
        Ok(())
    }
}
