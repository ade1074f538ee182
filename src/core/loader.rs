//! Entity loading utilities
//!
//! Generic helpers for reading and writing entity YAML files, used by the
//! filesystem store.

use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::store::StoreError;

fn is_entity_file(path: &Path) -> bool {
    path.extension().map_or(false, |e| e == "yaml")
}

/// Load all entities of type T from a directory
///
/// Scans the directory for .yaml files and deserializes them. Files that
/// fail to parse are skipped with a warning.
pub fn load_all<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, StoreError> {
    let mut entities = Vec::new();

    if !dir.exists() {
        return Ok(entities);
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_entity_file(path))
        .collect();
    paths.sort();

    for path in paths {
        match read_entity(&path) {
            Ok(entity) => entities.push(entity),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping entity file"),
        }
    }

    Ok(entities)
}

/// Deserialize a single entity file
pub fn read_entity<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let content = fs::read_to_string(path)?;
    serde_yml::from_str(&content).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Serialize an entity to YAML and write it to the given path
pub fn write_entity<T: Serialize>(path: &Path, entity: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let yaml = serde_yml::to_string(entity).map_err(|e| StoreError::Serialize(e.to_string()))?;
    fs::write(path, yaml)?;
    tracing::debug!(path = %path.display(), "wrote entity file");
    Ok(())
}
