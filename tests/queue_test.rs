//! Integration tests for the queue.

use beacon_queue::error::Error;
use beacon_queue::model::{Entry, EntryId, Items};
use beacon_queue::queue::Queue;
use beacon_queue::storage::{MemoryStore, Store};
use serde_json::json;
use std::cell::Cell;
use std::io::ErrorKind;
use std::rc::Rc;

fn test_queue(store: &MemoryStore) -> Queue<MemoryStore> {
    Queue::new("requests", store.clone()).expect("failed to create queue")
}

fn ids<S: Store>(queue: &Queue<S>) -> Vec<EntryId> {
    queue.entries().iter().map(|e| e.id.clone()).collect()
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn construction_without_name_is_invalid() {
    let store = MemoryStore::new();
    match Queue::new("", store) {
        Err(Error::InvalidArgument(_)) => {}
        other => panic!("expected InvalidArgument, got {:?}", other),
    }
}

#[test]
fn construction_with_blank_name_is_invalid() {
    let store = MemoryStore::new();
    assert!(matches!(
        Queue::new("   ", store),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn construction_surfaces_malformed_storage() {
    let store = MemoryStore::new();
    store.insert_raw("requests", "not json at all").unwrap();

    assert!(matches!(
        Queue::new("requests", store),
        Err(Error::Serialization(_))
    ));
}

#[test]
fn hydrates_from_hand_written_state() {
    let store = MemoryStore::new();
    store
        .insert_raw(
            "requests",
            r#"[{"created_at":1432000000000,"id":"0.5.1432000000000","item":{"url":"/a"}}]"#,
        )
        .unwrap();

    let queue = test_queue(&store);
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.entries()[0].id.as_str(), "0.5.1432000000000");
    assert_eq!(queue.first(), Some(&json!({"url": "/a"})));
}

// ---------------------------------------------------------------------------
// Empty semantics
// ---------------------------------------------------------------------------

#[test]
fn fresh_queue_reports_absence() {
    let store = MemoryStore::new();
    let mut queue = test_queue(&store);

    assert!(queue.is_empty());
    assert!(queue.all().is_none());
    assert!(queue.first().is_none());
    assert!(queue.last().is_none());
    assert!(queue.shift().unwrap().is_none());
}

#[test]
fn shift_on_empty_queue_does_not_write() {
    let store = MemoryStore::new();
    let mut queue = test_queue(&store);

    queue.shift().unwrap();

    assert!(store.raw("requests").unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[test]
fn single_and_bulk_adds_interleave_in_order() {
    let store = MemoryStore::new();
    let mut queue = test_queue(&store);

    queue
        .add(json!(1))
        .add(json!([2, 3]))
        .add_one(json!(4))
        .add_many(vec![json!(5), json!(6)]);

    assert_eq!(
        queue.all(),
        Some(vec![json!(1), json!(2), json!(3), json!(4), json!(5), json!(6)])
    );
    assert_eq!(queue.first(), Some(&json!(1)));
    assert_eq!(queue.last(), Some(&json!(6)));
}

#[test]
fn add_one_keeps_array_as_single_item() {
    let store = MemoryStore::new();
    let mut queue = test_queue(&store);

    queue.add_one(json!([1, 2])).add(Items::One(json!(["x"])));

    assert_eq!(queue.len(), 2);
    assert_eq!(queue.first(), Some(&json!([1, 2])));
}

#[test]
fn structured_object_is_one_item() {
    let store = MemoryStore::new();
    let mut queue = test_queue(&store);

    queue.add(json!({"0": "a", "1": "b", "length": 2}));

    assert_eq!(queue.len(), 1);
}

#[test]
fn every_entry_gets_its_own_id() {
    let store = MemoryStore::new();
    let mut queue = test_queue(&store);

    queue.add(json!(["a", "b", "c"]));

    let mut ids = ids(&queue);
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn add_alone_does_not_persist() {
    let store = MemoryStore::new();
    let mut queue = test_queue(&store);

    queue.add(json!({"url": "/a"}));

    let reopened = test_queue(&store);
    assert!(reopened.all().is_none());
}

#[test]
fn saved_queue_round_trips_through_store() {
    let store = MemoryStore::new();
    let mut queue = test_queue(&store);

    queue.add(json!({"url": "/a"})).save().unwrap();

    let reopened = test_queue(&store);
    assert_eq!(reopened.all(), Some(vec![json!({"url": "/a"})]));
    assert_eq!(reopened.entries(), queue.entries());
}

#[test]
fn queues_with_different_names_are_isolated() {
    let store = MemoryStore::new();
    let mut requests = test_queue(&store);
    requests.add(json!("r")).save().unwrap();

    let other = Queue::new("events", store.clone()).unwrap();
    assert!(other.all().is_none());
}

#[test]
fn last_save_wins_between_instances() {
    let store = MemoryStore::new();
    let mut a = test_queue(&store);
    let mut b = test_queue(&store);

    a.add(json!("from a")).save().unwrap();
    b.add(json!("from b")).save().unwrap();

    let reopened = test_queue(&store);
    assert_eq!(reopened.all(), Some(vec![json!("from b")]));
}

// ---------------------------------------------------------------------------
// Replace
// ---------------------------------------------------------------------------

#[test]
fn replace_assigns_fresh_entries_in_order_and_persists() {
    let store = MemoryStore::new();
    let mut queue = test_queue(&store);
    queue.add(json!(["A", "B", "C"]));
    let before = ids(&queue);

    queue.replace(json!(["A", "B", "C"])).unwrap();

    assert_eq!(queue.all(), Some(vec![json!("A"), json!("B"), json!("C")]));
    let after = ids(&queue);
    for id in &after {
        assert!(!before.contains(id), "id {id} survived replace");
    }

    let reopened = test_queue(&store);
    assert_eq!(reopened.entries(), queue.entries());
}

#[test]
fn replace_with_non_sequence_is_invalid_and_changes_nothing() {
    let store = MemoryStore::new();
    let mut queue = test_queue(&store);
    queue.add(json!({"url": "/a"})).save().unwrap();
    let persisted = store.raw("requests").unwrap();
    let before = queue.entries().to_vec();

    match queue.replace(json!("not a list")) {
        Err(Error::InvalidArgument(_)) => {}
        other => panic!("expected InvalidArgument, got {:?}", other.map(|_| ())),
    }

    assert_eq!(queue.entries(), before.as_slice());
    assert_eq!(store.raw("requests").unwrap(), persisted);
}

#[test]
fn replace_with_empty_sequence_clears_queue() {
    let store = MemoryStore::new();
    let mut queue = test_queue(&store);
    queue.add(json!([1, 2])).save().unwrap();

    queue.replace(Vec::<serde_json::Value>::new()).unwrap();

    assert!(queue.all().is_none());
    assert!(test_queue(&store).all().is_none());
}

// ---------------------------------------------------------------------------
// Shift
// ---------------------------------------------------------------------------

#[test]
fn shift_removes_oldest_and_regenerates_remaining_ids() {
    let store = MemoryStore::new();
    let mut queue = test_queue(&store);
    queue.add(json!("A")).add(json!("B")).save().unwrap();
    let b_id = queue.entries()[1].id.clone();

    let shifted = queue.shift().unwrap();

    assert_eq!(shifted, Some(json!("A")));
    assert_eq!(queue.all(), Some(vec![json!("B")]));
    assert_ne!(queue.entries()[0].id, b_id);
}

#[test]
fn shift_persists_without_explicit_save() {
    let store = MemoryStore::new();
    let mut queue = test_queue(&store);
    queue.add(json!(["A", "B"])).save().unwrap();

    queue.shift().unwrap();

    let reopened = test_queue(&store);
    assert_eq!(reopened.all(), Some(vec![json!("B")]));
}

#[test]
fn shifting_last_item_leaves_empty_persisted_queue() {
    let store = MemoryStore::new();
    let mut queue = test_queue(&store);
    queue.add(json!("only")).save().unwrap();

    assert_eq!(queue.shift().unwrap(), Some(json!("only")));

    assert!(queue.is_empty());
    assert_eq!(store.raw("requests").unwrap().as_deref(), Some("[]"));
    assert!(test_queue(&store).all().is_none());
}

// ---------------------------------------------------------------------------
// Tracking request scenario
// ---------------------------------------------------------------------------

#[test]
fn buffered_requests_drain_in_order() {
    let store = MemoryStore::new();
    let mut queue = test_queue(&store);

    queue.add(json!({"url": "/a"}));
    queue.add(json!([{"url": "/b"}, {"url": "/c"}]));
    queue.save().unwrap();

    assert_eq!(
        queue.all(),
        Some(vec![
            json!({"url": "/a"}),
            json!({"url": "/b"}),
            json!({"url": "/c"}),
        ])
    );
    assert_eq!(queue.first(), Some(&json!({"url": "/a"})));
    assert_eq!(queue.last(), Some(&json!({"url": "/c"})));

    assert_eq!(queue.shift().unwrap(), Some(json!({"url": "/a"})));
    assert_eq!(
        queue.all(),
        Some(vec![json!({"url": "/b"}), json!({"url": "/c"})])
    );
}

// ---------------------------------------------------------------------------
// Failing writes
// ---------------------------------------------------------------------------

/// Memory-backed store whose writes fail while `failing` is set.
#[derive(Clone)]
struct FlakyStore {
    inner: MemoryStore,
    failing: Rc<Cell<bool>>,
}

impl Store for FlakyStore {
    fn read(&self, name: &str) -> beacon_queue::Result<Option<Vec<Entry>>> {
        self.inner.read(name)
    }

    fn write(&self, name: &str, entries: &[Entry]) -> beacon_queue::Result<()> {
        if self.failing.get() {
            return Err(Error::Io(std::io::Error::new(
                ErrorKind::StorageFull,
                "quota exceeded",
            )));
        }
        self.inner.write(name, entries)
    }
}

fn flaky_queue() -> (Queue<FlakyStore>, FlakyStore) {
    let store = FlakyStore {
        inner: MemoryStore::new(),
        failing: Rc::new(Cell::new(false)),
    };
    let mut queue = Queue::new("requests", store.clone()).unwrap();
    queue.add(json!(["A", "B"])).save().unwrap();
    (queue, store)
}

fn assert_quota_error(error: Error) {
    match error {
        Error::Io(e) => {
            assert_eq!(e.kind(), ErrorKind::StorageFull);
            assert_eq!(e.to_string(), "quota exceeded");
        }
        other => panic!("expected the store's Io error, got {:?}", other),
    }
}

#[test]
fn failed_save_propagates_store_error() {
    let (mut queue, store) = flaky_queue();
    let persisted = store.inner.raw("requests").unwrap();
    queue.add(json!("C"));

    store.failing.set(true);
    assert_quota_error(queue.save().map(|_| ()).unwrap_err());

    assert_eq!(queue.all(), Some(vec![json!("A"), json!("B"), json!("C")]));
    assert_eq!(store.inner.raw("requests").unwrap(), persisted);
}

#[test]
fn failed_replace_keeps_previous_entries() {
    let (mut queue, store) = flaky_queue();
    let before = queue.entries().to_vec();
    let persisted = store.inner.raw("requests").unwrap();

    store.failing.set(true);
    assert_quota_error(queue.replace(json!(["X"])).map(|_| ()).unwrap_err());

    assert_eq!(queue.entries(), before.as_slice());
    assert_eq!(store.inner.raw("requests").unwrap(), persisted);
}

#[test]
fn failed_shift_keeps_head_for_retry() {
    let (mut queue, store) = flaky_queue();
    let before = queue.entries().to_vec();
    let persisted = store.inner.raw("requests").unwrap();

    store.failing.set(true);
    assert_quota_error(queue.shift().unwrap_err());

    assert_eq!(queue.entries(), before.as_slice());
    assert_eq!(store.inner.raw("requests").unwrap(), persisted);

    store.failing.set(false);
    assert_eq!(queue.shift().unwrap(), Some(json!("A")));
    queue.save().unwrap();

    let reopened = Queue::new("requests", store.clone()).unwrap();
    assert_eq!(reopened.all(), Some(vec![json!("B")]));
}
