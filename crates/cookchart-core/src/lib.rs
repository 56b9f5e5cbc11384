//! CookChart Core Library
//!
//! Toolkit-independent core of the cooking chart editor: the board document,
//! geometry, selection, undo history, gesture state machines and recipe
//! persistence.

pub mod clipboard;
pub mod config;
pub mod document;
pub mod editor;
pub mod geometry;
pub mod history;
pub mod input;
pub mod interaction;
pub mod legacy;
pub mod model;
pub mod selection;
pub mod storage;
pub mod viewport;

pub use clipboard::Clipboard;
pub use config::BoardConfig;
pub use document::{Document, Removed};
pub use editor::{Editor, EditorError, Refresh};
pub use history::{History, Snapshot};
pub use input::{Modifiers, Shortcut};
pub use interaction::{FieldTarget, Gesture, PointerTarget};
pub use legacy::{LoadError, load_str};
pub use model::{Edge, EdgeArrow, EdgeKey, Node, NodeColor, NodeId, Side, StepLine, StepLineId, TextId, TextItem};
pub use selection::Selection;
pub use storage::{RecipeLibrary, RecipeStore, StorageError, StorageResult};
pub use viewport::Viewport;
