pub mod compose;
pub mod config;
pub mod engine;
pub mod query;
pub mod selection;
pub mod shortcuts;
pub mod storage;

pub use config::EditorConfig;
pub use engine::{EditCommand, EditError, EditOutcome, Editor};
pub use selection::Selection;
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use storage::{MemoryStorage, StorageError, TreeStorage};
