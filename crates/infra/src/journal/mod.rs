//! Append-only event journal boundary.
//!
//! Stores and suppliers persist as event streams keyed by aggregate type + id.
//! Only an in-memory backend exists.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryJournal;
pub use r#trait::{EventJournal, JournalError, StoredEvent, StreamKey, UncommittedEvent};
