//! File-based storage implementation for native platforms.

use super::{BoxFuture, RecipeStore, StorageError, StorageResult, merge_order, validate_name};
use crate::document::Document;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Name of the order index inside the storage directory.
const INDEX_FILE: &str = "index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    name: String,
    file: String,
}

/// Display order and name → file mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Index {
    recipes: Vec<IndexEntry>,
}

impl Index {
    fn position(&self, name: &str) -> Option<usize> {
        self.recipes.iter().position(|e| e.name == name)
    }

    fn names(&self) -> Vec<String> {
        self.recipes.iter().map(|e| e.name.clone()).collect()
    }
}

/// File-based storage for native platforms.
///
/// Each recipe is a JSON file named by a random id; `index.json` maps names
/// to files and holds the display order, so any name is allowed.
pub struct FileStorage {
    /// Base directory for recipe storage.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/cookchart/recipes/`
    /// On Windows: `%LOCALAPPDATA%\cookchart\recipes\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("cookchart").join("recipes"))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn index_path(&self) -> PathBuf {
        self.base_path.join(INDEX_FILE)
    }

    fn read_index(&self) -> StorageResult<Index> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(Index::default());
        }
        let json = fs::read_to_string(&path).map_err(|e| {
            StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    fn write_index(&self, index: &Index) -> StorageResult<()> {
        let path = self.index_path();
        let json = serde_json::to_string_pretty(index)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&path, json).map_err(|e| {
            StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    fn save_now(&self, name: &str, json: &str) -> StorageResult<()> {
        let name = validate_name(name)?;
        let mut index = self.read_index()?;
        let file = match index.position(&name) {
            Some(i) => index.recipes[i].file.clone(),
            None => {
                let file = format!("{}.json", Uuid::new_v4());
                index.recipes.push(IndexEntry {
                    name: name.clone(),
                    file: file.clone(),
                });
                file
            }
        };
        let path = self.base_path.join(&file);
        fs::write(&path, json).map_err(|e| {
            StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
        })?;
        self.write_index(&index)?;
        log::debug!("Saved recipe {:?} to {}", name, path.display());
        Ok(())
    }

    fn load_now(&self, name: &str) -> StorageResult<Document> {
        let index = self.read_index()?;
        let entry = index
            .position(name)
            .map(|i| &index.recipes[i])
            .ok_or_else(|| StorageError::NotFound(name.to_string()))?;
        let path = self.base_path.join(&entry.file);
        let json = fs::read_to_string(&path).map_err(|e| {
            StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    fn delete_now(&self, name: &str) -> StorageResult<()> {
        let mut index = self.read_index()?;
        let i = index
            .position(name)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))?;
        let entry = index.recipes.remove(i);
        self.write_index(&index)?;

        let path = self.base_path.join(&entry.file);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }

    fn reorder_now(&self, names: &[String]) -> StorageResult<()> {
        let mut index = self.read_index()?;
        let order = merge_order(&index.names(), names);
        index
            .recipes
            .sort_by_key(|e| order.iter().position(|n| *n == e.name));
        self.write_index(&index)
    }
}

impl RecipeStore for FileStorage {
    fn save(&self, name: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>> {
        let name = name.to_string();
        let json = match document.to_json() {
            Ok(j) => j,
            Err(e) => {
                return Box::pin(async move { Err(StorageError::Serialization(e.to_string())) });
            }
        };
        Box::pin(async move { self.save_now(&name, &json) })
    }

    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<Document>> {
        let name = name.to_string();
        Box::pin(async move { self.load_now(&name) })
    }

    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>> {
        let name = name.to_string();
        Box::pin(async move { self.delete_now(&name) })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move { Ok(self.read_index()?.names()) })
    }

    fn reorder(&self, names: &[String]) -> BoxFuture<'_, StorageResult<()>> {
        let names: StorageResult<Vec<String>> = names.iter().map(|n| validate_name(n)).collect();
        Box::pin(async move { self.reorder_now(&names?) })
    }

    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let name = name.to_string();
        Box::pin(async move { Ok(self.read_index()?.position(&name).is_some()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::storage::block_on;
    use kurbo::Point;
    use tempfile::tempdir;

    fn chart(title: &str) -> Document {
        let mut doc = Document::new();
        let id = doc.add_node(Point::new(100.0, 100.0), &BoardConfig::default());
        if let Some(node) = doc.node_mut(id) {
            node.title = title.to_string();
        }
        doc
    }

    #[test]
    fn test_file_storage_save_and_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let doc = chart("Dashi");

        block_on(storage.save("味噌汁 / miso", &doc)).unwrap();
        let loaded = block_on(storage.load("味噌汁 / miso")).unwrap();
        assert_eq!(loaded, doc);
        assert!(dir.path().join(INDEX_FILE).exists());
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempdir().unwrap();
        {
            let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
            block_on(storage.save("b", &chart("one"))).unwrap();
            block_on(storage.save("a", &chart("two"))).unwrap();
        }
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["b", "a"]);
        assert_eq!(block_on(storage.load("a")).unwrap().nodes[0].title, "two");
    }

    #[test]
    fn test_file_storage_overwrite_keeps_file() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("soup", &chart("v1"))).unwrap();
        block_on(storage.save("soup", &chart("v2"))).unwrap();

        let files = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 2);
        assert_eq!(block_on(storage.load("soup")).unwrap().nodes[0].title, "v2");
    }

    #[test]
    fn test_file_storage_delete_and_reorder() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        for name in ["a", "b", "c"] {
            block_on(storage.save(name, &Document::new())).unwrap();
        }

        block_on(storage.reorder(&["c".to_string(), "b".to_string()])).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["c", "b", "a"]);

        block_on(storage.delete("b")).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["c", "a"]);
        assert!(!block_on(storage.exists("b")).unwrap());
        assert!(matches!(block_on(storage.delete("b")), Err(StorageError::NotFound(_))));
        assert!(matches!(block_on(storage.load("b")), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("deep").join("recipes");
        let storage = FileStorage::new(nested.clone()).unwrap();
        assert!(nested.exists());
        assert!(block_on(storage.list()).unwrap().is_empty());
    }
}
