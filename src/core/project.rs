//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};

/// Name of the marker directory at the project root
pub const KITQ_DIR: &str = ".kitq";

/// Represents a KITQ project directory
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .kitq/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Use an explicit root if given, otherwise walk up from the current directory
    pub fn open(explicit: Option<&Path>) -> Result<Self, ProjectError> {
        match explicit {
            Some(path) => Self::discover_from(path),
            None => Self::discover(),
        }
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(KITQ_DIR).is_dir() {
                tracing::debug!(root = %current.display(), "discovered project");
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(KITQ_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::init_force(&root)
    }

    /// Force initialization even if .kitq/ exists
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let kitq_dir = root.join(KITQ_DIR);

        std::fs::create_dir_all(&kitq_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(kitq_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        for prefix in EntityPrefix::all() {
            std::fs::create_dir_all(root.join(prefix.dir()))
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        tracing::info!(root = %root.display(), "initialized project");
        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# KITQ Project Configuration

# Default author for new entities (can be overridden by global config)
# author: ""

# Editor to use for `kitq ... edit` commands (default: $EDITOR)
# editor: ""

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto

# Assembly & fulfillment cost charged per kit when pricing
# assembly_cost_per_kit: 15.0

# Scrap/QA buffer applied to new BOM lines, in percent
# buffer_percent: 2.0
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .kitq configuration directory
    pub fn kitq_dir(&self) -> PathBuf {
        self.root.join(KITQ_DIR)
    }

    /// Directory holding entities of the given type
    pub fn entity_dir(&self, prefix: EntityPrefix) -> PathBuf {
        self.root.join(prefix.dir())
    }

    /// Get the path for an entity file
    pub fn entity_path(&self, id: &EntityId) -> PathBuf {
        self.entity_dir(id.prefix())
            .join(format!("{}.kitq.yaml", id))
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a KITQ project (no .kitq/ directory found searching from {searched_from})")]
    NotFound { searched_from: PathBuf },

    #[error("KITQ project already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("I/O error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_structure() {
        let dir = tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.kitq_dir().join("config.yaml").exists());
        assert!(project.root().join("catalog/components").is_dir());
        assert!(project.root().join("kits").is_dir());
        assert!(project.root().join("quotes").is_dir());
    }

    #[test]
    fn test_init_twice_fails() {
        let dir = tempdir().unwrap();
        Project::init(dir.path()).unwrap();
        let err = Project::init(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let dir = tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let nested = project.root().join("kits");

        let found = Project::discover_from(&nested).unwrap();
        assert_eq!(found.root(), project.root());
    }

    #[test]
    fn test_discover_outside_project() {
        let dir = tempdir().unwrap();
        let err = Project::discover_from(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_entity_path_uses_type_dir() {
        let dir = tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let id = EntityId::new(EntityPrefix::Kit);

        let path = project.entity_path(&id);
        assert!(path.starts_with(project.root().join("kits")));
        assert!(path.to_string_lossy().ends_with(".kitq.yaml"));
    }
}
