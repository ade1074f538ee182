//! Entity repositories
//!
//! The pricing engine never looks anything up itself. Callers go through a
//! [`CatalogStore`] to load components, kits and quotes, and to resolve a kit's
//! BOM into priced line items before invoking the engine.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::loader;
use crate::core::project::Project;
use crate::core::shortid::ShortIdIndex;
use crate::entities::{Component, Kit, Quote};
use crate::pricing::BomLineItem;

/// Errors raised by entity stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to serialize entity: {0}")]
    Serialize(String),

    #[error("{kind} not found: {reference}")]
    NotFound { kind: &'static str, reference: String },

    #[error("'{reference}' matches {count} {kind}s; use a longer ID")]
    Ambiguous {
        kind: &'static str,
        reference: String,
        count: usize,
    },

    #[error("unknown short ID '{0}' (run a list command to refresh short IDs)")]
    UnknownShortId(String),
}

/// Storage-agnostic access to the component catalog, kits and quotes
pub trait CatalogStore {
    /// All catalog components
    fn components(&self) -> Result<Vec<Component>, StoreError>;

    /// All kits
    fn kits(&self) -> Result<Vec<Kit>, StoreError>;

    /// All quotes
    fn quotes(&self) -> Result<Vec<Quote>, StoreError>;

    /// Insert or replace a component
    fn save_component(&mut self, component: &Component) -> Result<(), StoreError>;

    /// Insert or replace a kit
    fn save_kit(&mut self, kit: &Kit) -> Result<(), StoreError>;

    /// Insert or replace a quote
    fn save_quote(&mut self, quote: &Quote) -> Result<(), StoreError>;

    /// Look up a component by full or partial ID
    fn component(&self, reference: &str) -> Result<Component, StoreError> {
        find_by_reference(self.components()?, reference)
    }

    /// Look up a kit by full or partial ID
    fn kit(&self, reference: &str) -> Result<Kit, StoreError> {
        find_by_reference(self.kits()?, reference)
    }

    /// Look up a quote by full or partial ID
    fn quote(&self, reference: &str) -> Result<Quote, StoreError> {
        find_by_reference(self.quotes()?, reference)
    }

    /// Resolve a kit's BOM against the catalog
    ///
    /// Lines whose component no longer exists are kept with no component
    /// attached so pricing reports them instead of failing.
    fn resolve_bom(&self, kit: &Kit) -> Result<Vec<BomLineItem>, StoreError> {
        let catalog = self.components()?;

        Ok(kit
            .bom
            .iter()
            .map(|entry| {
                let component = catalog.iter().find(|c| c.id == entry.component_id).cloned();
                if component.is_none() {
                    tracing::warn!(
                        kit = %kit.id,
                        component = %entry.component_id,
                        "BOM line references a missing component"
                    );
                }
                entry.line_item(component)
            })
            .collect())
    }
}

/// Find a single entity whose ID equals or contains the reference
///
/// Matching is case-insensitive. An exact ID match wins over partial matches.
pub fn find_by_reference<T: Entity>(entities: Vec<T>, reference: &str) -> Result<T, StoreError> {
    let needle = reference.trim().to_uppercase();
    let not_found = || StoreError::NotFound {
        kind: T::LABEL,
        reference: reference.to_string(),
    };
    if needle.is_empty() {
        return Err(not_found());
    }

    let mut matches: Vec<T> = entities
        .into_iter()
        .filter(|e| e.id().to_string().contains(&needle))
        .collect();

    if let Some(idx) = matches.iter().position(|e| e.id().to_string() == needle) {
        return Ok(matches.swap_remove(idx));
    }

    match matches.len() {
        0 => Err(not_found()),
        1 => Ok(matches.remove(0)),
        count => Err(StoreError::Ambiguous {
            kind: T::LABEL,
            reference: reference.to_string(),
            count,
        }),
    }
}

/// Store backed by YAML files in a project directory
pub struct FsStore {
    project: Project,
    short_ids: ShortIdIndex,
}

impl FsStore {
    /// Open the store for a project
    pub fn open(project: Project) -> Self {
        let short_ids = ShortIdIndex::load(&project);
        Self { project, short_ids }
    }

    /// The underlying project
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Short ID index (read-only)
    pub fn short_ids(&self) -> &ShortIdIndex {
        &self.short_ids
    }

    /// Assign short IDs to the given entities and persist the index
    pub fn register_short_ids<'a, T: Entity + 'a>(
        &mut self,
        entities: impl IntoIterator<Item = &'a T>,
    ) -> Result<(), StoreError> {
        self.short_ids.ensure_all(entities.into_iter().map(|e| e.id()));
        self.short_ids.save(&self.project)?;
        Ok(())
    }

    /// Short ID for an entity, if one has been assigned
    pub fn short_id_of<T: Entity>(&self, entity: &T) -> String {
        self.short_ids
            .get_short_id(&entity.id().to_string())
            .unwrap_or_default()
    }

    /// Expand a `PREFIX@N` reference into the full ID it aliases
    pub fn expand_reference(&self, reference: &str) -> Result<String, StoreError> {
        self.short_ids
            .resolve(reference)
            .ok_or_else(|| StoreError::UnknownShortId(reference.to_string()))
    }

    /// Path of the file backing the referenced entity
    pub fn path_of<T: Entity>(&self, reference: &str) -> Result<PathBuf, StoreError> {
        let entity: T = self.load_one(reference)?;
        Ok(self.project.entity_path(entity.id()))
    }

    fn load_one<T: Entity>(&self, reference: &str) -> Result<T, StoreError> {
        let expanded = self.expand_reference(reference)?;
        let entities = loader::load_all(&self.project.entity_dir(T::PREFIX))?;
        find_by_reference(entities, &expanded)
    }

    fn save_one<T: Entity>(&mut self, entity: &T) -> Result<(), StoreError> {
        let path = self.project.entity_path(entity.id());
        loader::write_entity(&path, entity)?;
        self.short_ids.add(entity.id());
        self.short_ids.save(&self.project)?;
        Ok(())
    }
}

impl CatalogStore for FsStore {
    fn components(&self) -> Result<Vec<Component>, StoreError> {
        loader::load_all(&self.project.entity_dir(Component::PREFIX))
    }

    fn kits(&self) -> Result<Vec<Kit>, StoreError> {
        loader::load_all(&self.project.entity_dir(Kit::PREFIX))
    }

    fn quotes(&self) -> Result<Vec<Quote>, StoreError> {
        loader::load_all(&self.project.entity_dir(Quote::PREFIX))
    }

    fn save_component(&mut self, component: &Component) -> Result<(), StoreError> {
        self.save_one(component)
    }

    fn save_kit(&mut self, kit: &Kit) -> Result<(), StoreError> {
        self.save_one(kit)
    }

    fn save_quote(&mut self, quote: &Quote) -> Result<(), StoreError> {
        self.save_one(quote)
    }

    fn component(&self, reference: &str) -> Result<Component, StoreError> {
        self.load_one(reference)
    }

    fn kit(&self, reference: &str) -> Result<Kit, StoreError> {
        self.load_one(reference)
    }

    fn quote(&self, reference: &str) -> Result<Quote, StoreError> {
        self.load_one(reference)
    }
}

/// In-memory store, used for library callers and tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    components: Vec<Component>,
    kits: Vec<Kit>,
    quotes: Vec<Quote>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn upsert<T: Entity + Clone>(items: &mut Vec<T>, entity: &T) {
    match items.iter_mut().find(|e| e.id() == entity.id()) {
        Some(existing) => *existing = entity.clone(),
        None => items.push(entity.clone()),
    }
}

impl CatalogStore for MemoryStore {
    fn components(&self) -> Result<Vec<Component>, StoreError> {
        Ok(self.components.clone())
    }

    fn kits(&self) -> Result<Vec<Kit>, StoreError> {
        Ok(self.kits.clone())
    }

    fn quotes(&self) -> Result<Vec<Quote>, StoreError> {
        Ok(self.quotes.clone())
    }

    fn save_component(&mut self, component: &Component) -> Result<(), StoreError> {
        upsert(&mut self.components, component);
        Ok(())
    }

    fn save_kit(&mut self, kit: &Kit) -> Result<(), StoreError> {
        upsert(&mut self.kits, kit);
        Ok(())
    }

    fn save_quote(&mut self, quote: &Quote) -> Result<(), StoreError> {
        upsert(&mut self.quotes, quote);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{BomEntry, SourcingType};

    fn tube() -> Component {
        Component::new("Blood Collection Tube", SourcingType::DotSourced, 2.5, "test")
    }

    #[test]
    fn test_memory_store_upserts() {
        let mut store = MemoryStore::new();
        let mut cmp = tube();
        store.save_component(&cmp).unwrap();
        cmp.unit_cost = 3.0;
        store.save_component(&cmp).unwrap();

        let all = store.components().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].unit_cost, 3.0);
    }

    #[test]
    fn test_find_by_reference_partial_and_exact() {
        let mut store = MemoryStore::new();
        let cmp = tube();
        store.save_component(&cmp).unwrap();

        let id = cmp.id.to_string();
        assert_eq!(store.component(&id).unwrap().id, cmp.id);
        assert_eq!(store.component(&id[..12].to_lowercase()).unwrap().id, cmp.id);
        assert!(matches!(
            store.component("CMP-NOPE"),
            Err(StoreError::NotFound { kind: "component", .. })
        ));
    }

    #[test]
    fn test_find_by_reference_ambiguous() {
        let mut store = MemoryStore::new();
        store.save_component(&tube()).unwrap();
        store.save_component(&tube()).unwrap();

        assert!(matches!(
            store.component("CMP-"),
            Err(StoreError::Ambiguous { count: 2, .. })
        ));
    }

    #[test]
    fn test_resolve_bom_keeps_missing_components_unresolved() {
        let mut store = MemoryStore::new();
        let present = tube();
        let missing = Component::new("Deleted Part", SourcingType::DotSourced, 1.0, "test");
        store.save_component(&present).unwrap();

        let mut kit = Kit::new("Bulk Fit Kit", "test");
        kit.bom.push(BomEntry::new(&present, 1.0));
        kit.bom.push(BomEntry::new(&missing, 1.0));

        let lines = store.resolve_bom(&kit).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].component.is_some());
        assert!(lines[1].component.is_none());
    }

    #[test]
    fn test_fs_store_save_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let mut store = FsStore::open(project);

        let cmp = tube();
        store.save_component(&cmp).unwrap();
        let mut kit = Kit::new("DTC Fit Kit", "test");
        kit.bom.push(BomEntry::new(&cmp, 2.0));
        store.save_kit(&kit).unwrap();

        assert_eq!(store.components().unwrap().len(), 1);
        assert_eq!(store.component("CMP@1").unwrap().name, "Blood Collection Tube");
        assert_eq!(store.kit("KIT@1").unwrap().bom.len(), 1);
        assert_eq!(store.short_id_of(&kit), "KIT@1");
        assert!(matches!(store.kit("KIT@9"), Err(StoreError::UnknownShortId(_))));
    }

    #[test]
    fn test_fs_store_rejects_ambiguous_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let mut fs_store = FsStore::open(project);
        let mut mem_store = MemoryStore::new();

        let bulk = Kit::new("Bulk Fit Kit", "test");
        let dtc = Kit::new("DTC Fit Kit", "test");
        for kit in [&bulk, &dtc] {
            fs_store.save_kit(kit).unwrap();
            mem_store.save_kit(kit).unwrap();
        }

        assert!(matches!(
            fs_store.kit("KIT-"),
            Err(StoreError::Ambiguous { kind: "kit", count: 2, .. })
        ));
        assert!(matches!(
            mem_store.kit("KIT-"),
            Err(StoreError::Ambiguous { kind: "kit", count: 2, .. })
        ));
        assert!(matches!(fs_store.path_of::<Kit>("KIT-"), Err(StoreError::Ambiguous { .. })));

        let full = dtc.id.to_string();
        assert_eq!(fs_store.kit(&full).unwrap().name, "DTC Fit Kit");
        assert_eq!(
            fs_store.path_of::<Kit>(&full).unwrap(),
            fs_store.project().entity_path(&dtc.id)
        );
    }

    #[test]
    fn test_fs_store_short_ids_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let mut store = FsStore::open(project.clone());
        let quote = Quote::new("Fitness Program", "test");
        store.save_quote(&quote).unwrap();

        let reopened = FsStore::open(project);
        assert_eq!(reopened.quote("quot@1").unwrap().id, quote.id);
    }
}
