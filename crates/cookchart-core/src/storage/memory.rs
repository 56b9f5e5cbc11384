//! In-memory storage implementation.

use super::{BoxFuture, RecipeStore, StorageError, StorageResult, merge_order, validate_name};
use crate::document::Document;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Shelf {
    documents: HashMap<String, Document>,
    order: Vec<String>,
}

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    shelf: RwLock<Shelf>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, Shelf>> {
        self.shelf
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, Shelf>> {
        self.shelf
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))
    }
}

impl RecipeStore for MemoryStorage {
    fn save(&self, name: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>> {
        let name = validate_name(name);
        let document = document.clone();
        Box::pin(async move {
            let name = name?;
            let mut shelf = self.write()?;
            if shelf.documents.insert(name.clone(), document).is_none() {
                shelf.order.push(name);
            }
            Ok(())
        })
    }

    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<Document>> {
        let name = name.to_string();
        Box::pin(async move {
            let shelf = self.read()?;
            shelf
                .documents
                .get(&name)
                .cloned()
                .ok_or(StorageError::NotFound(name))
        })
    }

    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>> {
        let name = name.to_string();
        Box::pin(async move {
            let mut shelf = self.write()?;
            if shelf.documents.remove(&name).is_none() {
                return Err(StorageError::NotFound(name));
            }
            shelf.order.retain(|n| *n != name);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move { Ok(self.read()?.order.clone()) })
    }

    fn reorder(&self, names: &[String]) -> BoxFuture<'_, StorageResult<()>> {
        let names: StorageResult<Vec<String>> = names.iter().map(|n| validate_name(n)).collect();
        Box::pin(async move {
            let names = names?;
            let mut shelf = self.write()?;
            let order = merge_order(&shelf.order, &names);
            shelf.order = order;
            Ok(())
        })
    }

    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let name = name.to_string();
        Box::pin(async move { Ok(self.read()?.documents.contains_key(&name)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::storage::block_on;
    use kurbo::Point;

    fn chart() -> Document {
        let mut doc = Document::new();
        doc.add_node(Point::new(100.0, 100.0), &BoardConfig::default());
        doc
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let doc = chart();

        block_on(storage.save("Curry", &doc)).unwrap();
        let loaded = block_on(storage.load("Curry")).unwrap();

        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        assert!(matches!(block_on(storage.load("nope")), Err(StorageError::NotFound(_))));
        assert!(matches!(block_on(storage.delete("nope")), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_blank_name_rejected() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.save("  ", &Document::new()));
        assert!(matches!(result, Err(StorageError::InvalidName(_))));
        assert!(block_on(storage.list()).unwrap().is_empty());
    }

    #[test]
    fn test_order_append_overwrite_delete() {
        let storage = MemoryStorage::new();
        let doc = Document::new();

        block_on(storage.save("a", &doc)).unwrap();
        block_on(storage.save("b", &doc)).unwrap();
        block_on(storage.save("a", &chart())).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["a", "b"]);
        assert_eq!(block_on(storage.load("a")).unwrap().nodes.len(), 1);

        block_on(storage.delete("a")).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["b"]);
        assert!(!block_on(storage.exists("a")).unwrap());
    }

    #[test]
    fn test_reorder() {
        let storage = MemoryStorage::new();
        let doc = Document::new();
        for name in ["a", "b", "c"] {
            block_on(storage.save(name, &doc)).unwrap();
        }

        block_on(storage.reorder(&["c".to_string(), "ghost".to_string()])).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["c", "a", "b"]);

        let result = block_on(storage.reorder(&["".to_string()]));
        assert!(matches!(result, Err(StorageError::InvalidName(_))));
    }
}
