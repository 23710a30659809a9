//! Infrastructure layer: event journal, command dispatch, cross-aggregate flows.

pub mod command_dispatcher;
pub mod journal;
pub mod procurement;

pub use command_dispatcher::{CommandDispatcher, DispatchError};
pub use journal::{EventJournal, InMemoryJournal, JournalError, StoredEvent, StreamKey};
pub use procurement::{Procurement, RestockOrder, RestockOutcome};
