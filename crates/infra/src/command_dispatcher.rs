//! Command execution pipeline for journaled aggregates.
//!
//! ```text
//! Command
//!   -> load stream from journal
//!   -> rehydrate aggregate (apply history)
//!   -> handle (decide events, no mutation)
//!   -> append with ExpectedVersion::Exact(stream length)
//!   -> publish envelopes to the bus
//! ```
//!
//! Publication happens only after a successful append.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use stockroom_core::{Aggregate, DomainError, ExpectedVersion};
use stockroom_events::{Event, EventBus, EventEnvelope};

use crate::journal::{EventJournal, JournalError, StoredEvent, StreamKey, UncommittedEvent};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The aggregate rejected the command; nothing was appended.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Another writer appended to the stream first.
    #[error("concurrency conflict: {0}")]
    Concurrency(String),

    /// The journal failed or returned a malformed stream.
    #[error("journal error: {0}")]
    Journal(JournalError),

    /// A historical payload did not deserialize into the aggregate's event type.
    #[error("failed to deserialize stored event: {0}")]
    Deserialize(String),

    /// Publication failed after a successful append.
    #[error("event publication failed: {0}")]
    Publish(String),
}

impl From<JournalError> for DispatchError {
    fn from(value: JournalError) -> Self {
        match value {
            JournalError::Concurrency(msg) => DispatchError::Concurrency(msg),
            other => DispatchError::Journal(other),
        }
    }
}

impl DispatchError {
    /// The domain rejection, if that is what this is.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            DispatchError::Domain(err) => Some(err),
            _ => None,
        }
    }
}

/// Runs commands against aggregates persisted in an `EventJournal`.
#[derive(Debug)]
pub struct CommandDispatcher<J, B> {
    journal: J,
    bus: B,
}

impl<J, B> CommandDispatcher<J, B> {
    pub fn new(journal: J, bus: B) -> Self {
        Self { journal, bus }
    }

    pub fn journal(&self) -> &J {
        &self.journal
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }
}

impl<J, B> CommandDispatcher<J, B>
where
    J: EventJournal,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    /// Rehydrate an aggregate from its stream without running a command.
    ///
    /// An unknown id yields the aggregate produced by `make_aggregate` untouched.
    pub fn load<A>(
        &self,
        aggregate_id: A::Id,
        make_aggregate: impl FnOnce(A::Id) -> A,
    ) -> Result<A, DispatchError>
    where
        A: Aggregate<Error = DomainError>,
        A::Id: Copy + Into<u64>,
        A::Event: DeserializeOwned,
    {
        let key = StreamKey::new(A::AGGREGATE_TYPE, aggregate_id.into());
        let history = self.journal.load_stream(&key)?;
        validate_loaded_stream(&key, &history)?;

        let mut aggregate = make_aggregate(aggregate_id);
        apply_history(&mut aggregate, &history)?;
        tracing::debug!(stream = %key, events = history.len(), "aggregate loaded");
        Ok(aggregate)
    }

    /// Run `command` and persist the resulting events.
    ///
    /// Returns the aggregate with the new events applied, plus what was committed.
    pub fn dispatch<A>(
        &self,
        aggregate_id: A::Id,
        command: A::Command,
        make_aggregate: impl FnOnce(A::Id) -> A,
    ) -> Result<(A, Vec<StoredEvent>), DispatchError>
    where
        A: Aggregate<Error = DomainError>,
        A::Id: Copy + Into<u64>,
        A::Event: Event + Serialize + DeserializeOwned,
    {
        let key = StreamKey::new(A::AGGREGATE_TYPE, aggregate_id.into());

        // 1) Load + validate history
        let history = self.journal.load_stream(&key)?;
        validate_loaded_stream(&key, &history)?;
        let expected = ExpectedVersion::Exact(stream_version(&history));

        // 2) Rehydrate
        let mut aggregate = make_aggregate(aggregate_id);
        apply_history(&mut aggregate, &history)?;

        // 3) Decide
        let decided = match aggregate.handle(&command) {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!(stream = %key, error = %err, "command rejected");
                return Err(err.into());
            }
        };
        if decided.is_empty() {
            return Ok((aggregate, vec![]));
        }

        // 4) Persist
        let uncommitted = decided
            .iter()
            .map(|ev| UncommittedEvent::from_typed(key.clone(), Uuid::now_v7(), ev))
            .collect::<Result<Vec<_>, _>>()?;
        let committed = self.journal.append(uncommitted, expected)?;

        for ev in &decided {
            aggregate.apply(ev);
        }

        // 5) Publish
        for stored in &committed {
            self.bus
                .publish(stored.to_envelope())
                .map_err(|e| DispatchError::Publish(format!("{e:?}")))?;
        }

        tracing::info!(stream = %key, committed = committed.len(), "command committed");
        Ok((aggregate, committed))
    }
}

fn stream_version(stream: &[StoredEvent]) -> u64 {
    stream.last().map(|e| e.sequence_number).unwrap_or(0)
}

fn validate_loaded_stream(key: &StreamKey, stream: &[StoredEvent]) -> Result<(), DispatchError> {
    let mut last = 0u64;
    for (idx, e) in stream.iter().enumerate() {
        if &e.stream != key {
            return Err(DispatchError::Journal(JournalError::InvalidAppend(format!(
                "loaded stream contains foreign event at index {idx}"
            ))));
        }
        if e.sequence_number <= last {
            return Err(DispatchError::Journal(JournalError::InvalidAppend(format!(
                "non-monotonic sequence_number in loaded stream (last={last}, found={})",
                e.sequence_number
            ))));
        }
        last = e.sequence_number;
    }
    Ok(())
}

fn apply_history<A>(aggregate: &mut A, history: &[StoredEvent]) -> Result<(), DispatchError>
where
    A: Aggregate,
    A::Event: DeserializeOwned,
{
    for stored in history {
        let ev: A::Event = serde_json::from_value(stored.payload.clone())
            .map_err(|e| DispatchError::Deserialize(e.to_string()))?;
        aggregate.apply(&ev);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    use stockroom_catalog::CatalogItem;
    use stockroom_core::{AggregateRoot, ItemId, MarginRate, Money, StoreId};
    use stockroom_events::InMemoryEventBus;
    use stockroom_store::{OpenStore, PurchaseItem, SellItem, Store, StoreCommand, StoreEvent};

    use crate::journal::InMemoryJournal;

    type TestDispatcher =
        CommandDispatcher<Arc<InMemoryJournal>, Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>>;

    fn dispatcher() -> TestDispatcher {
        CommandDispatcher::new(Arc::new(InMemoryJournal::new()), Arc::new(InMemoryEventBus::new()))
    }

    fn store_id() -> StoreId {
        StoreId::new(1)
    }

    fn open_cmd(cash_units: u64) -> StoreCommand {
        StoreCommand::OpenStore(OpenStore {
            store_id: store_id(),
            name: "Corner Shop".to_string(),
            initial_cash: Money::from_units(cash_units),
            occurred_at: Utc::now(),
        })
    }

    fn purchase_cmd(price_units: u64, quantity: u32) -> StoreCommand {
        StoreCommand::PurchaseItem(PurchaseItem {
            store_id: store_id(),
            item: CatalogItem::new(ItemId::new(1), "Widget", Money::from_units(price_units), "")
                .unwrap(),
            quantity,
            margin_rate: MarginRate::from_percent(20),
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn dispatch_persists_and_rehydrates() {
        let dispatcher = dispatcher();
        dispatcher
            .dispatch(store_id(), open_cmd(1000), Store::empty)
            .unwrap();
        let (live, committed) = dispatcher
            .dispatch(store_id(), purchase_cmd(10, 50), Store::empty)
            .unwrap();

        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].sequence_number, 2);
        assert_eq!(committed[0].event_type, "store.item.stocked");

        let loaded: Store = dispatcher.load(store_id(), Store::empty).unwrap();
        assert_eq!(loaded, live);
        assert_eq!(loaded.cash_balance(), Money::from_units(500));
        assert_eq!(loaded.version(), 2);
    }

    #[test]
    fn rejected_command_appends_nothing() {
        let dispatcher = dispatcher();
        let sub = dispatcher.bus().subscribe();
        dispatcher
            .dispatch(store_id(), open_cmd(100), Store::empty)
            .unwrap();

        let err = dispatcher
            .dispatch(store_id(), purchase_cmd(100, 20), Store::empty)
            .unwrap_err();

        assert!(matches!(
            err.as_domain(),
            Some(DomainError::InsufficientFunds { .. })
        ));
        let key = StreamKey::new("store", 1);
        assert_eq!(dispatcher.journal().load_stream(&key).unwrap().len(), 1);
        assert_eq!(sub.drain().len(), 1);
    }

    #[test]
    fn committed_events_are_published_in_order() {
        let dispatcher = dispatcher();
        let sub = dispatcher.bus().subscribe();

        dispatcher
            .dispatch(store_id(), open_cmd(1000), Store::empty)
            .unwrap();
        dispatcher
            .dispatch(store_id(), purchase_cmd(10, 5), Store::empty)
            .unwrap();
        dispatcher
            .dispatch(
                store_id(),
                StoreCommand::SellItem(SellItem {
                    store_id: store_id(),
                    item_id: ItemId::new(1),
                    quantity: 2,
                    occurred_at: Utc::now(),
                }),
                Store::empty,
            )
            .unwrap();

        let published = sub.drain();
        assert_eq!(
            published.iter().map(|e| e.event_type()).collect::<Vec<_>>(),
            vec!["store.opened", "store.item.stocked", "store.item.sold"]
        );
        assert_eq!(
            published.iter().map(|e| e.sequence_number()).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(published.iter().all(|e| e.aggregate_type() == "store"));
        assert!(published.iter().all(|e| e.aggregate_id() == 1));
    }

    #[test]
    fn published_envelope_mirrors_the_committed_event() {
        let dispatcher = dispatcher();
        let sub = dispatcher.bus().subscribe();

        let (_, committed) = dispatcher
            .dispatch(store_id(), open_cmd(250), Store::empty)
            .unwrap();

        let published = sub.drain();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].event_id(), committed[0].event_id);
        assert_eq!(published[0].payload(), &committed[0].payload);

        let event: StoreEvent = serde_json::from_value(published[0].payload().clone()).unwrap();
        match event {
            StoreEvent::StoreOpened(e) => assert_eq!(e.initial_cash, Money::from_units(250)),
            other => panic!("Expected StoreOpened, got {other:?}"),
        }
    }

    #[test]
    fn loading_unknown_store_yields_empty_aggregate() {
        let dispatcher = dispatcher();
        let store: Store = dispatcher.load(StoreId::new(42), Store::empty).unwrap();
        assert!(!store.is_open());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn corrupt_payload_surfaces_as_deserialize_error() {
        let dispatcher = dispatcher();
        let key = StreamKey::new("store", 1);
        dispatcher
            .journal()
            .append(
                vec![UncommittedEvent {
                    event_id: Uuid::now_v7(),
                    stream: key,
                    event_type: "store.opened".to_string(),
                    event_version: 1,
                    occurred_at: Utc::now(),
                    payload: serde_json::json!({ "not": "a store event" }),
                }],
                ExpectedVersion::Exact(0),
            )
            .unwrap();

        let err = dispatcher.load(store_id(), Store::empty).unwrap_err();
        assert!(matches!(err, DispatchError::Deserialize(_)));
    }
}
