use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use std::sync::Arc;
use stockroom_core::ExpectedVersion;
use stockroom_events::{Event, EventEnvelope};

/// Identifies one aggregate's event stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamKey {
    pub aggregate_type: String,
    pub aggregate_id: u64,
}

impl StreamKey {
    pub fn new(aggregate_type: impl Into<String>, aggregate_id: u64) -> Self {
        Self {
            aggregate_type: aggregate_type.into(),
            aggregate_id,
        }
    }
}

impl core::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{}", self.aggregate_type, self.aggregate_id)
    }
}

/// An event ready to be appended (no sequence number yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncommittedEvent {
    pub event_id: Uuid,
    pub stream: StreamKey,

    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,

    pub payload: JsonValue,
}

impl UncommittedEvent {
    /// Serialize a typed domain event, keeping its metadata alongside.
    pub fn from_typed<E>(stream: StreamKey, event_id: Uuid, event: &E) -> Result<Self, JournalError>
    where
        E: Event + Serialize,
    {
        let payload = serde_json::to_value(event)
            .map_err(|e| JournalError::InvalidAppend(format!("payload serialization failed: {e}")))?;

        Ok(Self {
            event_id,
            stream,
            event_type: event.event_type().to_string(),
            event_version: event.version(),
            occurred_at: event.occurred_at(),
            payload,
        })
    }
}

/// A journaled event with its 1-based position in the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event_id: Uuid,
    pub stream: StreamKey,

    /// Monotonically increasing position in the aggregate stream.
    pub sequence_number: u64,

    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,

    pub payload: JsonValue,
}

impl StoredEvent {
    /// Envelope for publication on an event bus.
    pub fn to_envelope(&self) -> EventEnvelope<JsonValue> {
        EventEnvelope::new(
            self.event_id,
            self.stream.aggregate_type.clone(),
            self.stream.aggregate_id,
            self.sequence_number,
            self.event_type.clone(),
            self.payload.clone(),
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JournalError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    #[error("journal unavailable: {0}")]
    Unavailable(String),
}

/// Append-only event journal: the load/save seam for stores and suppliers.
///
/// - `append` checks `expected_version` against the stream's current length and
///   assigns sequence numbers `current + 1..`. A batch is all-or-nothing and
///   must target a single stream.
/// - `load_stream` returns events in sequence order, empty for unknown streams.
pub trait EventJournal: Send + Sync {
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, JournalError>;

    fn load_stream(&self, stream: &StreamKey) -> Result<Vec<StoredEvent>, JournalError>;
}

impl<J> EventJournal for Arc<J>
where
    J: EventJournal + ?Sized,
{
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, JournalError> {
        (**self).append(events, expected_version)
    }

    fn load_stream(&self, stream: &StreamKey) -> Result<Vec<StoredEvent>, JournalError> {
        (**self).load_stream(stream)
    }
}
