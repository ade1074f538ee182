//! Short ID system for easier entity selection
//!
//! Provides per-type numeric aliases like `CMP@1` or `KIT@2` that map to full
//! entity IDs. Aliases are assigned the first time an entity is listed and
//! stored in `.kitq/shortids.json`.

use std::collections::HashMap;
use std::fs;

use crate::core::identity::EntityId;
use crate::core::project::Project;

/// Index file location within the .kitq directory
const INDEX_FILE: &str = "shortids.json";

/// A mapping of short IDs (PREFIX@N) to full entity IDs
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ShortIdIndex {
    /// Maps "PREFIX@N" to full entity ID string
    entries: HashMap<String, String>,
    /// Maps full entity ID to its short form (reverse lookup)
    #[serde(skip)]
    reverse: HashMap<String, String>,
    /// Next available number per prefix
    next_ids: HashMap<String, u32>,
}

impl ShortIdIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index from a project, or create empty if not found
    pub fn load(project: &Project) -> Self {
        let path = project.kitq_dir().join(INDEX_FILE);
        if let Ok(content) = fs::read_to_string(&path) {
            if let Ok(mut index) = serde_json::from_str::<ShortIdIndex>(&content) {
                index.reverse = index
                    .entries
                    .iter()
                    .map(|(k, v)| (v.clone(), k.clone()))
                    .collect();
                return index;
            }
            tracing::warn!(path = %path.display(), "short ID index is corrupt, starting fresh");
        }
        Self::new()
    }

    /// Save the index to a project
    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let path = project.kitq_dir().join(INDEX_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }

    /// Add an entity ID and return its short ID
    pub fn add(&mut self, entity_id: &EntityId) -> String {
        let full = entity_id.to_string();
        if let Some(short) = self.reverse.get(&full) {
            return short.clone();
        }

        let prefix = entity_id.prefix().as_str().to_string();
        let next = self.next_ids.entry(prefix.clone()).or_insert(1);
        let short = format!("{}@{}", prefix, next);
        *next += 1;

        self.entries.insert(short.clone(), full.clone());
        self.reverse.insert(full, short.clone());
        short
    }

    /// Ensure every given ID has a short alias
    pub fn ensure_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a EntityId>) {
        for id in ids {
            self.add(id);
        }
    }

    /// Resolve a reference to a full (or partial) entity ID
    ///
    /// Accepts `PREFIX@N` (e.g. `KIT@2`, case-insensitive). Anything else is
    /// passed through unchanged for partial matching.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        match reference.split_once('@') {
            Some((prefix, num)) => {
                let key = format!("{}@{}", prefix.to_uppercase(), num.trim());
                self.entries.get(&key).cloned()
            }
            None => Some(reference.to_string()),
        }
    }

    /// Get the short ID for a full entity ID
    pub fn get_short_id(&self, entity_id: &str) -> Option<String> {
        self.reverse.get(entity_id).cloned()
    }

    /// Number of entries in the index
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;

    #[test]
    fn test_short_id_add_and_resolve() {
        let mut index = ShortIdIndex::new();
        let cmp1 = EntityId::new(EntityPrefix::Cmp);
        let cmp2 = EntityId::new(EntityPrefix::Cmp);
        let kit1 = EntityId::new(EntityPrefix::Kit);

        assert_eq!(index.add(&cmp1), "CMP@1");
        assert_eq!(index.add(&cmp2), "CMP@2");
        assert_eq!(index.add(&kit1), "KIT@1");

        assert_eq!(index.resolve("CMP@2"), Some(cmp2.to_string()));
        assert_eq!(index.resolve("kit@1"), Some(kit1.to_string()));
        assert_eq!(index.resolve("CMP@99"), None);
    }

    #[test]
    fn test_short_id_passthrough() {
        let index = ShortIdIndex::new();
        assert_eq!(index.resolve("CMP-01ABC"), Some("CMP-01ABC".to_string()));
    }

    #[test]
    fn test_short_id_no_duplicates() {
        let mut index = ShortIdIndex::new();
        let id = EntityId::new(EntityPrefix::Quot);

        let first = index.add(&id);
        let second = index.add(&id);

        assert_eq!(first, second);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get_short_id(&id.to_string()), Some(first));
    }

    #[test]
    fn test_short_id_persists() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let id = EntityId::new(EntityPrefix::Kit);

        let mut index = ShortIdIndex::load(&project);
        index.add(&id);
        index.save(&project).unwrap();

        let reloaded = ShortIdIndex::load(&project);
        assert_eq!(reloaded.resolve("KIT@1"), Some(id.to_string()));
        assert_eq!(reloaded.get_short_id(&id.to_string()).as_deref(), Some("KIT@1"));
    }
}
