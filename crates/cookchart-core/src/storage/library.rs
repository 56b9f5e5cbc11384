//! Recipe library: which chart is open, whether it has unsaved changes, and
//! the save / rename / delete / reorder / load flows on top of a store.

use super::{BoxFuture, RecipeStore, StorageError, StorageResult};
use crate::document::Document;
use std::sync::Arc;

/// Title used when a draft has none.
pub const UNTITLED: &str = "Untitled";

/// `desired`, or `desired (n)` with the smallest `n >= 2` not in `existing`.
pub fn unique_name(desired: &str, existing: &[String]) -> String {
    if !existing.iter().any(|n| n == desired) {
        return desired.to_string();
    }
    let mut i = 2;
    loop {
        let candidate = format!("{} ({})", desired, i);
        if !existing.contains(&candidate) {
            return candidate;
        }
        i += 1;
    }
}

/// Handle for an in-flight load. A response is applied only if no newer
/// load or draft started in the meantime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub name: String,
    generation: u64,
}

/// Coordinates persistence of the open chart.
pub struct RecipeLibrary<S: RecipeStore> {
    /// Storage backend.
    storage: Arc<S>,
    /// Name of the open recipe, `None` for an unsaved draft.
    current: Option<String>,
    /// Display order as last listed.
    names: Vec<String>,
    /// Document signature at the last save or load.
    saved_signature: String,
    /// Bumped by every load and new draft.
    generation: u64,
}

impl<S: RecipeStore> RecipeLibrary<S> {
    /// Create a library with an empty draft open.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            current: None,
            names: Vec::new(),
            saved_signature: Document::new().signature(),
            generation: 0,
        }
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Name of the open recipe.
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Names as of the last refresh.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether `document` differs from what was last saved or loaded.
    pub fn is_dirty(&self, document: &Document) -> bool {
        document.signature() != self.saved_signature
    }

    /// Record `document` as the saved state.
    pub fn mark_saved(&mut self, document: &Document) {
        self.saved_signature = document.signature();
    }

    /// Re-read the display order.
    pub async fn refresh(&mut self) -> StorageResult<&[String]> {
        self.names = self.storage.list().await?;
        Ok(&self.names)
    }

    /// Switch to an empty unsaved draft. Pending loads become stale.
    pub fn new_draft(&mut self) -> Document {
        self.generation += 1;
        self.current = None;
        let document = Document::new();
        self.mark_saved(&document);
        document
    }

    /// Save `document` under `title` (blank means [`UNTITLED`]).
    ///
    /// A draft gets a fresh `title (n)` name if `title` is taken. An open
    /// recipe whose title changed is renamed: saved under the new name, then
    /// the old entry is removed. Renaming onto an existing name fails with
    /// [`StorageError::NameCollision`] before anything is written.
    pub async fn save(&mut self, document: &Document, title: &str) -> StorageResult<String> {
        let desired = match title.trim() {
            "" => UNTITLED.to_string(),
            t => t.to_string(),
        };
        self.refresh().await?;

        let name = match &self.current {
            None => unique_name(&desired, &self.names),
            Some(current) if *current == desired => desired,
            Some(_) if self.names.contains(&desired) => {
                log::warn!("Rename rejected, {:?} already exists", desired);
                return Err(StorageError::NameCollision(desired));
            }
            Some(_) => desired,
        };

        self.storage.save(&name, document).await?;
        log::info!("Saved recipe {:?}", name);

        if let Some(old) = self.current.take().filter(|old| *old != name) {
            match self.storage.delete(&old).await {
                Ok(()) => log::info!("Renamed recipe {:?} to {:?}", old, name),
                Err(e) => log::warn!("Failed to remove {:?} after rename: {}", old, e),
            }
        }

        self.current = Some(name.clone());
        self.mark_saved(document);
        self.refresh().await?;
        Ok(name)
    }

    /// Delete a recipe by name.
    ///
    /// Returns the recipe that should be open afterwards: unchanged when
    /// another recipe was deleted, otherwise the first remaining one (`None`
    /// meaning an empty draft).
    pub async fn delete(&mut self, name: &str) -> StorageResult<Option<String>> {
        self.storage.delete(name).await?;
        log::info!("Deleted recipe {:?}", name);
        self.refresh().await?;
        if self.current.as_deref() != Some(name) {
            return Ok(self.current.clone());
        }
        self.current = None;
        Ok(self.names.first().cloned())
    }

    /// Move `names` to the front of the display order.
    pub async fn reorder(&mut self, names: &[String]) -> StorageResult<()> {
        self.storage.reorder(names).await?;
        log::info!("Reordered {} recipes", names.len());
        self.refresh().await?;
        Ok(())
    }

    /// Start loading `name`, invalidating any load already in flight.
    pub fn begin_load(&mut self, name: &str) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            name: name.to_string(),
            generation: self.generation,
        }
    }

    /// Fetch the document a ticket refers to.
    pub fn fetch(&self, ticket: &LoadTicket) -> BoxFuture<'_, StorageResult<Document>> {
        self.storage.load(&ticket.name)
    }

    /// Apply a fetched response. Stale responses are dropped with `Ok(None)`.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        response: StorageResult<Document>,
    ) -> StorageResult<Option<Document>> {
        if ticket.generation != self.generation {
            log::warn!("Discarding stale load of {:?}", ticket.name);
            return Ok(None);
        }
        let document = response?;
        log::info!("Loaded recipe {:?}", ticket.name);
        self.mark_saved(&document);
        self.current = Some(ticket.name);
        Ok(Some(document))
    }

    /// Begin, fetch and finish a load in one step.
    pub async fn load(&mut self, name: &str) -> StorageResult<Document> {
        let ticket = self.begin_load(name);
        let response = self.fetch(&ticket).await;
        self.finish_load(ticket, response)?
            .ok_or_else(|| StorageError::Other(format!("Load of {:?} was superseded", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::storage::{MemoryStorage, block_on};
    use kurbo::Point;

    fn chart() -> Document {
        let mut doc = Document::new();
        doc.add_node(Point::new(100.0, 100.0), &BoardConfig::default());
        doc
    }

    fn library() -> RecipeLibrary<MemoryStorage> {
        RecipeLibrary::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_unique_name() {
        let existing = vec!["Soup".to_string(), "Soup (2)".to_string()];
        assert_eq!(unique_name("Curry", &existing), "Curry");
        assert_eq!(unique_name("Soup", &existing), "Soup (3)");
    }

    #[test]
    fn test_dirty_tracking() {
        let mut lib = library();
        let mut doc = lib.new_draft();
        assert!(!lib.is_dirty(&doc));
        doc = chart();
        assert!(lib.is_dirty(&doc));
        block_on(lib.save(&doc, "Curry")).unwrap();
        assert!(!lib.is_dirty(&doc));
    }

    #[test]
    fn test_draft_save_gets_suffix() {
        let mut lib = library();
        let doc = chart();
        assert_eq!(block_on(lib.save(&doc, "Soup")).unwrap(), "Soup");
        lib.new_draft();
        assert_eq!(block_on(lib.save(&doc, "Soup")).unwrap(), "Soup (2)");
        lib.new_draft();
        assert_eq!(block_on(lib.save(&doc, "  ")).unwrap(), UNTITLED);
        assert_eq!(lib.names(), ["Soup", "Soup (2)", UNTITLED]);
    }

    #[test]
    fn test_rename_moves_entry() {
        let mut lib = library();
        let doc = chart();
        block_on(lib.save(&doc, "Soup")).unwrap();
        assert_eq!(block_on(lib.save(&doc, "Miso soup")).unwrap(), "Miso soup");
        assert_eq!(lib.current_name(), Some("Miso soup"));
        assert_eq!(lib.names(), ["Miso soup"]);
    }

    #[test]
    fn test_rename_collision_writes_nothing() {
        let mut lib = library();
        let doc = chart();
        block_on(lib.save(&doc, "Curry")).unwrap();
        lib.new_draft();
        block_on(lib.save(&Document::new(), "Soup")).unwrap();

        let result = block_on(lib.save(&doc, "Curry"));
        assert!(matches!(result, Err(StorageError::NameCollision(n)) if n == "Curry"));
        assert_eq!(lib.current_name(), Some("Soup"));
        assert!(block_on(lib.storage().load("Soup")).unwrap().nodes.is_empty());
        assert_eq!(block_on(lib.storage().load("Curry")).unwrap(), doc);
    }

    #[test]
    fn test_delete_current_suggests_next() {
        let mut lib = library();
        block_on(lib.save(&chart(), "a")).unwrap();
        lib.new_draft();
        block_on(lib.save(&chart(), "b")).unwrap();

        assert_eq!(block_on(lib.delete("b")).unwrap(), Some("a".to_string()));
        assert_eq!(lib.current_name(), None);
        assert_eq!(block_on(lib.delete("a")).unwrap(), None);
        assert!(matches!(block_on(lib.delete("a")), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_reorder_refreshes_names() {
        let mut lib = library();
        for name in ["a", "b", "c"] {
            lib.new_draft();
            block_on(lib.save(&Document::new(), name)).unwrap();
        }
        block_on(lib.reorder(&["c".to_string()])).unwrap();
        assert_eq!(lib.names(), ["c", "a", "b"]);
    }

    #[test]
    fn test_stale_load_discarded() {
        let mut lib = library();
        let doc = chart();
        block_on(lib.save(&doc, "a")).unwrap();
        lib.new_draft();
        block_on(lib.save(&Document::new(), "b")).unwrap();

        let first = lib.begin_load("a");
        let second = lib.begin_load("b");
        let first_response = block_on(lib.fetch(&first));
        let second_response = block_on(lib.fetch(&second));

        assert!(lib.finish_load(first, first_response).unwrap().is_none());
        let loaded = lib.finish_load(second, second_response).unwrap().unwrap();
        assert!(loaded.nodes.is_empty());
        assert_eq!(lib.current_name(), Some("b"));
    }

    #[test]
    fn test_load_sets_current() {
        let mut lib = library();
        let doc = chart();
        block_on(lib.save(&doc, "a")).unwrap();
        lib.new_draft();

        let loaded = block_on(lib.load("a")).unwrap();
        assert_eq!(loaded, doc);
        assert_eq!(lib.current_name(), Some("a"));
        assert!(!lib.is_dirty(&loaded));
        assert!(matches!(block_on(lib.load("zzz")), Err(StorageError::NotFound(_))));
    }
}
