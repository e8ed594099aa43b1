use crate::domain::{NewRecord, Record};
use crate::storage::KeyValueStorage;
use anyhow::Context;
use uuid::Uuid;

/// Change notifications for whoever renders the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The whole record set was (re)loaded or replaced.
    Reset { count: usize },
    Added(Uuid),
    Cleared,
}

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// The full record set, kept in memory and mirrored to one storage blob per
/// namespace after every mutation. Records are never updated in place.
pub struct RecordStore<S> {
    storage: S,
    namespace: String,
    records: Vec<Record>,
    listeners: Vec<Listener>,
}

impl<S: KeyValueStorage> RecordStore<S> {
    pub fn open(storage: S, namespace: impl Into<String>) -> anyhow::Result<Self> {
        let mut store = Self {
            storage,
            namespace: namespace.into(),
            records: Vec::new(),
            listeners: Vec::new(),
        };
        store.records = store.load()?;
        tracing::debug!(namespace = %store.namespace, count = store.records.len(), "opened record store");
        Ok(store)
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Assigns an id, appends and persists. Nothing changes if persisting fails.
    pub fn create(&mut self, new: NewRecord) -> anyhow::Result<Record> {
        let record = new.into_record(Uuid::new_v4());
        self.records.push(record.clone());
        if let Err(err) = self.persist() {
            self.records.pop();
            return Err(err);
        }

        tracing::info!(
            id = %record.id,
            supplier = %record.supplier,
            part = %record.part,
            price = record.price,
            "created record"
        );
        self.notify(StoreEvent::Added(record.id));
        Ok(record)
    }

    /// Reloads the snapshot from storage and emits [`StoreEvent::Reset`].
    pub fn fetch_all(&mut self) -> anyhow::Result<&[Record]> {
        self.records = self.load()?;
        self.notify(StoreEvent::Reset {
            count: self.records.len(),
        });
        Ok(&self.records)
    }

    /// Removes every record and the stored blob. Returns how many were removed.
    pub fn destroy_all(&mut self) -> anyhow::Result<usize> {
        self.storage
            .remove(&self.namespace)
            .with_context(|| format!("failed to clear namespace {}", self.namespace))?;
        let removed = std::mem::take(&mut self.records).len();

        tracing::info!(namespace = %self.namespace, removed, "destroyed all records");
        self.notify(StoreEvent::Cleared);
        Ok(removed)
    }

    /// Full-replace import: the previous records are dropped and every incoming
    /// record gets a fresh id. Persisted as one write; on failure the old set stays.
    pub fn replace_all(&mut self, incoming: Vec<NewRecord>) -> anyhow::Result<usize> {
        let replacement: Vec<Record> = incoming
            .into_iter()
            .map(|r| r.into_record(Uuid::new_v4()))
            .collect();
        let previous = std::mem::replace(&mut self.records, replacement);
        if let Err(err) = self.persist() {
            self.records = previous;
            return Err(err);
        }

        let count = self.records.len();
        tracing::info!(
            namespace = %self.namespace,
            removed = previous.len(),
            imported = count,
            "replaced all records"
        );
        self.notify(StoreEvent::Reset { count });
        Ok(count)
    }

    fn load(&self) -> anyhow::Result<Vec<Record>> {
        let Some(blob) = self.storage.load(&self.namespace)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&blob)
            .with_context(|| format!("stored records are corrupt (namespace={})", self.namespace))
    }

    fn persist(&mut self) -> anyhow::Result<()> {
        let blob = serde_json::to_string(&self.records).context("serialize records failed")?;
        self.storage
            .save(&self.namespace, &blob)
            .with_context(|| format!("failed to persist namespace {}", self.namespace))
    }

    fn notify(&mut self, event: StoreEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStorage, MemoryStorage};
    use chrono::{TimeZone, Utc};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn new(supplier: &str, part: &str, price: f64) -> NewRecord {
        NewRecord {
            supplier: supplier.to_string(),
            part: part.to_string(),
            price,
            timestamp: Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap(),
        }
    }

    fn recorded_events<S: KeyValueStorage>(store: &mut RecordStore<S>) -> Rc<RefCell<Vec<StoreEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        store.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        events
    }

    /// Fails every write; reads see nothing.
    struct ReadOnlyStorage;

    impl KeyValueStorage for ReadOnlyStorage {
        fn load(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        fn save(&mut self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("storage is read-only")
        }

        fn remove(&mut self, _key: &str) -> anyhow::Result<()> {
            anyhow::bail!("storage is read-only")
        }
    }

    #[test]
    fn create_assigns_ids_and_persists() {
        let mut store = RecordStore::open(MemoryStorage::new(), "part-prices").unwrap();
        assert!(store.is_empty());

        let a = store.create(new("Maurice", "Langue", 40.0)).unwrap();
        let b = store.create(new("Samuel", "Langue", 41.0)).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0], a);

        let blob = store.storage().load("part-prices").unwrap().unwrap();
        let stored: Vec<Record> = serde_json::from_str(&blob).unwrap();
        assert_eq!(stored, vec![a, b]);
    }

    #[test]
    fn reopening_file_storage_restores_records() {
        let dir = tempfile::tempdir().unwrap();

        let created = {
            let mut store = RecordStore::open(JsonFileStorage::open(dir.path()).unwrap(), "ns").unwrap();
            store.create(new("Maurice", "Langue", 40.0)).unwrap()
        };

        let store = RecordStore::open(JsonFileStorage::open(dir.path()).unwrap(), "ns").unwrap();
        assert_eq!(store.records(), &[created]);

        let other = RecordStore::open(JsonFileStorage::open(dir.path()).unwrap(), "other").unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn fetch_all_reloads_and_notifies_reset() {
        let mut store = RecordStore::open(MemoryStorage::new(), "ns").unwrap();
        store.create(new("Maurice", "Langue", 40.0)).unwrap();
        let events = recorded_events(&mut store);

        let records = store.fetch_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(*events.borrow(), vec![StoreEvent::Reset { count: 1 }]);
    }

    #[test]
    fn destroy_all_clears_memory_and_storage() {
        let mut store = RecordStore::open(MemoryStorage::new(), "ns").unwrap();
        store.create(new("Maurice", "Langue", 40.0)).unwrap();
        store.create(new("Maurice", "Abats", 30.0)).unwrap();
        let events = recorded_events(&mut store);

        assert_eq!(store.destroy_all().unwrap(), 2);
        assert!(store.is_empty());
        assert_eq!(store.storage().load("ns").unwrap(), None);
        assert_eq!(*events.borrow(), vec![StoreEvent::Cleared]);
    }

    #[test]
    fn replace_all_drops_previous_records() {
        let mut store = RecordStore::open(MemoryStorage::new(), "ns").unwrap();
        let old = store.create(new("Maurice", "Langue", 40.0)).unwrap();
        let events = recorded_events(&mut store);

        let count = store
            .replace_all(vec![new("Samuel", "Abats", 30.0), new("Marrcel", "Langue", 42.0)])
            .unwrap();
        assert_eq!(count, 2);
        assert!(store.records().iter().all(|r| r.id != old.id));
        let suppliers: Vec<_> = store.records().iter().map(|r| r.supplier.as_str()).collect();
        assert_eq!(suppliers, ["Samuel", "Marrcel"]);
        assert_eq!(*events.borrow(), vec![StoreEvent::Reset { count: 2 }]);

        store.fetch_all().unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn create_notifies_added() {
        let mut store = RecordStore::open(MemoryStorage::new(), "ns").unwrap();
        let events = recorded_events(&mut store);
        let record = store.create(new("Maurice", "Langue", 40.0)).unwrap();
        assert_eq!(*events.borrow(), vec![StoreEvent::Added(record.id)]);
    }

    #[test]
    fn failed_writes_leave_the_snapshot_unchanged() {
        let mut store = RecordStore::open(ReadOnlyStorage, "ns").unwrap();
        let events = recorded_events(&mut store);

        assert!(store.create(new("Maurice", "Langue", 40.0)).is_err());
        assert!(store.replace_all(vec![new("Samuel", "Abats", 30.0)]).is_err());
        assert!(store.destroy_all().is_err());
        assert!(store.is_empty());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn corrupt_blob_is_an_error() {
        let mut storage = MemoryStorage::new();
        storage.save("ns", "{not json").unwrap();
        assert!(RecordStore::open(storage, "ns").is_err());

        let mut storage = MemoryStorage::new();
        storage
            .save(
                "ns",
                r#"[{"id":"00000000-0000-0000-0000-000000000000","supplier":"A","part":"P","price":1.0,"timestamp":"2026-01-05T10:00:00Z","colour":"red"}]"#,
            )
            .unwrap();
        assert!(RecordStore::open(storage, "ns").is_err());
    }
}
