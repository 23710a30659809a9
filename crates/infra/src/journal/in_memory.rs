use std::collections::HashMap;
use std::sync::RwLock;

use stockroom_core::ExpectedVersion;

use super::r#trait::{EventJournal, JournalError, StoredEvent, StreamKey, UncommittedEvent};

/// In-memory append-only journal. Lives for the process only.
#[derive(Debug, Default)]
pub struct InMemoryJournal {
    streams: RwLock<HashMap<StreamKey, Vec<StoredEvent>>>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    fn current_version(stream: &[StoredEvent]) -> u64 {
        stream.last().map(|e| e.sequence_number).unwrap_or(0)
    }
}

impl EventJournal for InMemoryJournal {
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, JournalError> {
        if events.is_empty() {
            return Ok(vec![]);
        }

        let key = events[0].stream.clone();
        if let Some(idx) = events.iter().position(|e| e.stream != key) {
            return Err(JournalError::InvalidAppend(format!(
                "batch contains multiple streams (index {idx})"
            )));
        }

        let mut streams = self
            .streams
            .write()
            .map_err(|_| JournalError::Unavailable("lock poisoned".to_string()))?;

        let stream = streams.entry(key).or_default();
        let current = Self::current_version(stream);

        if !expected_version.matches(current) {
            return Err(JournalError::Concurrency(format!(
                "expected {expected_version:?}, found {current}"
            )));
        }

        let mut committed = Vec::with_capacity(events.len());
        for (offset, e) in events.into_iter().enumerate() {
            let stored = StoredEvent {
                event_id: e.event_id,
                stream: e.stream,
                sequence_number: current + 1 + offset as u64,
                event_type: e.event_type,
                event_version: e.event_version,
                occurred_at: e.occurred_at,
                payload: e.payload,
            };
            stream.push(stored.clone());
            committed.push(stored);
        }

        Ok(committed)
    }

    fn load_stream(&self, stream: &StreamKey) -> Result<Vec<StoredEvent>, JournalError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| JournalError::Unavailable("lock poisoned".to_string()))?;

        Ok(streams.get(stream).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn uncommitted(stream: &StreamKey, n: u32) -> UncommittedEvent {
        UncommittedEvent {
            event_id: Uuid::now_v7(),
            stream: stream.clone(),
            event_type: "test.event".to_string(),
            event_version: 1,
            occurred_at: Utc::now(),
            payload: serde_json::json!({ "n": n }),
        }
    }

    #[test]
    fn append_assigns_consecutive_sequence_numbers() {
        let journal = InMemoryJournal::new();
        let key = StreamKey::new("store", 1);

        let first = journal
            .append(vec![uncommitted(&key, 1), uncommitted(&key, 2)], ExpectedVersion::Exact(0))
            .unwrap();
        let second = journal
            .append(vec![uncommitted(&key, 3)], ExpectedVersion::Exact(2))
            .unwrap();

        assert_eq!(
            first.iter().map(|e| e.sequence_number).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(second[0].sequence_number, 3);
        assert_eq!(journal.load_stream(&key).unwrap().len(), 3);
    }

    #[test]
    fn stale_expected_version_is_rejected() {
        let journal = InMemoryJournal::new();
        let key = StreamKey::new("store", 1);
        journal
            .append(vec![uncommitted(&key, 1)], ExpectedVersion::Exact(0))
            .unwrap();

        let err = journal
            .append(vec![uncommitted(&key, 2)], ExpectedVersion::Exact(0))
            .unwrap_err();
        assert!(matches!(err, JournalError::Concurrency(_)));
        assert_eq!(journal.load_stream(&key).unwrap().len(), 1);
    }

    #[test]
    fn mixed_stream_batches_are_rejected() {
        let journal = InMemoryJournal::new();
        let a = StreamKey::new("store", 1);
        let b = StreamKey::new("supplier", 1);

        let err = journal
            .append(vec![uncommitted(&a, 1), uncommitted(&b, 2)], ExpectedVersion::Any)
            .unwrap_err();
        assert!(matches!(err, JournalError::InvalidAppend(_)));
        assert!(journal.load_stream(&a).unwrap().is_empty());
    }

    #[test]
    fn streams_are_isolated_by_aggregate_type() {
        let journal = InMemoryJournal::new();
        let store = StreamKey::new("store", 7);
        let supplier = StreamKey::new("supplier", 7);
        journal
            .append(vec![uncommitted(&store, 1)], ExpectedVersion::Exact(0))
            .unwrap();

        assert!(journal.load_stream(&supplier).unwrap().is_empty());
        assert_eq!(store.to_string(), "store-7");
    }
}
