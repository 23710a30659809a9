use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope for an event, carrying stream metadata.
///
/// `sequence_number` is the 1-based position of the event in its aggregate
/// stream; `aggregate_type` + `aggregate_id` identify the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    aggregate_type: String,
    aggregate_id: u64,
    sequence_number: u64,
    event_type: String,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        aggregate_type: impl Into<String>,
        aggregate_id: u64,
        sequence_number: u64,
        event_type: impl Into<String>,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            aggregate_type: aggregate_type.into(),
            aggregate_id,
            sequence_number,
            event_type: event_type.into(),
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn aggregate_id(&self) -> u64 {
        self.aggregate_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }
}
