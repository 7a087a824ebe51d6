//! Loading the service catalog from disk.

use crate::domain::catalog::ServiceCatalog;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read service catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid service catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load the catalog, failing on a missing or malformed file.
pub fn load(path: impl AsRef<Path>) -> Result<ServiceCatalog, CatalogError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ServiceCatalog::from_json_str(&content).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the catalog for rendering. Any failure yields an empty catalog and a warning,
/// so the Services page shows its "no services" notice instead of an error.
pub fn load_or_empty(path: impl AsRef<Path>) -> ServiceCatalog {
    load(path).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "service catalog unavailable");
        ServiceCatalog::default()
    })
}
