//! Recipe persistence.
//!
//! Charts are stored by name in a user-controlled display order. The
//! [`RecipeStore`] trait mirrors the remote recipe API; [`routes`] describes
//! that API's HTTP requests for hosts that talk to it directly.

mod library;
mod memory;
pub mod routes;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use library::{LoadTicket, RecipeLibrary, unique_name};
pub use memory::MemoryStorage;
pub use routes::{ApiRequest, Method, Routes};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::document::Document;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Recipe not found: {0}")]
    NotFound(String),
    #[error("A recipe named {0:?} already exists")]
    NameCollision(String),
    #[error("Invalid recipe name: {0:?}")]
    InvalidName(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trim a recipe name, rejecting blank ones.
pub fn validate_name(name: &str) -> StorageResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(trimmed.to_string())
}

/// New display order after moving `names` to the front.
///
/// Listed names that exist take positions in the given order; everything
/// else keeps its relative order behind them. Unknown names are ignored.
pub fn merge_order(current: &[String], names: &[String]) -> Vec<String> {
    let mut order: Vec<String> = Vec::with_capacity(current.len());
    for name in names {
        if current.contains(name) && !order.contains(name) {
            order.push(name.clone());
        }
    }
    for name in current {
        if !order.contains(name) {
            order.push(name.clone());
        }
    }
    order
}

/// Named recipe storage backend.
///
/// `list` returns names in display order. Saving a new name appends it to the
/// end of the order; overwriting keeps its position.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait RecipeStore: Send + Sync {
    /// Save or overwrite a recipe.
    fn save(&self, name: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a recipe.
    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<Document>>;

    /// Delete a recipe. Missing names are `NotFound`.
    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// All recipe names in display order.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Move `names` to the front of the display order.
    fn reorder(&self, names: &[String]) -> BoxFuture<'_, StorageResult<()>>;

    /// Check if a recipe exists.
    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Named recipe storage backend (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait RecipeStore {
    fn save(&self, name: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>>;
    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<Document>>;
    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>>;
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;
    fn reorder(&self, names: &[String]) -> BoxFuture<'_, StorageResult<()>>;
    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
