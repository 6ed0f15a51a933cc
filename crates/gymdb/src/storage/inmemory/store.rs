//! In-memory store implementation.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use gymdb_core::storage::{
    Attributes, BatchWrite, CancellationReason, Condition, Consistency, Item, ItemKey, RangeQuery,
    Store, StoreError, StoreResult, TransactWrite, Update,
};

/// In-memory storage backend for testing.
///
/// Rows are ordered by `(PK, SK)`, every read is strongly consistent, and
/// conditions are evaluated under the write lock so they are atomic with
/// the write they guard. Data is lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Arc<RwLock<BTreeMap<ItemKey, Attributes>>>,
    fault: Arc<Mutex<Option<StoreError>>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next store call fail with `err` without touching any row.
    pub fn fail_next(&self, err: StoreError) {
        if let Ok(mut fault) = self.fault.lock() {
            *fault = Some(err);
        }
    }

    /// Number of rows across all partitions.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Whether the store holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Whether a row exists under `key`.
    pub async fn contains(&self, key: &ItemKey) -> bool {
        self.rows.read().await.contains_key(key)
    }

    fn take_fault(&self) -> StoreResult<()> {
        match self.fault.lock().ok().and_then(|mut fault| fault.take()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Whether `condition` holds given the current presence of the row.
fn condition_holds(condition: Condition, exists: bool) -> bool {
    match condition {
        Condition::None => true,
        Condition::NotExists => !exists,
        Condition::Exists => exists,
    }
}

fn invalid_path(path: &[String]) -> StoreError {
    StoreError::Other(format!(
        "The document path provided in the update expression is invalid for update: {}",
        path.join(".")
    ))
}

/// Resolves the object holding the last segment of `path`.
fn parent_of<'a, 'p>(
    attributes: &'a mut Attributes,
    path: &'p [String],
) -> StoreResult<(&'a mut Attributes, &'p str)> {
    let (last, parents) = path.split_last().ok_or_else(|| invalid_path(path))?;
    let mut current = attributes;

    for segment in parents {
        current = match current.get_mut(segment) {
            Some(Value::Object(map)) => map,
            _ => return Err(invalid_path(path)),
        };
    }

    Ok((current, last.as_str()))
}

/// First key that appears more than once.
fn first_duplicate<'k>(mut keys: impl Iterator<Item = &'k ItemKey>) -> Option<&'k ItemKey> {
    let mut seen = HashSet::new();
    keys.find(|key| !seen.insert(*key))
}

/// Applies an update to a copy of the row's attributes.
fn apply_update(mut attributes: Attributes, update: &Update) -> StoreResult<Attributes> {
    for (path, value) in &update.set {
        let (parent, name) = parent_of(&mut attributes, path)?;
        parent.insert(name.to_string(), value.clone());
    }

    for (path, values) in &update.append {
        let (parent, name) = parent_of(&mut attributes, path)?;
        match parent.get_mut(name) {
            Some(Value::Array(list)) => list.extend(values.iter().cloned()),
            _ => return Err(invalid_path(path)),
        }
    }

    Ok(attributes)
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_item(
        &self,
        key: &ItemKey,
        _consistency: Consistency,
    ) -> StoreResult<Option<Item>> {
        self.take_fault()?;
        let rows = self.rows.read().await;
        Ok(rows.get(key).map(|attributes| Item {
            key: key.clone(),
            attributes: attributes.clone(),
        }))
    }

    async fn put_item(&self, item: Item, condition: Condition) -> StoreResult<()> {
        self.take_fault()?;
        let mut rows = self.rows.write().await;
        if !condition_holds(condition, rows.contains_key(&item.key)) {
            return Err(StoreError::ConditionFailed);
        }
        rows.insert(item.key, item.attributes);
        Ok(())
    }

    async fn update_item(
        &self,
        key: &ItemKey,
        update: Update,
        condition: Condition,
    ) -> StoreResult<()> {
        self.take_fault()?;
        if update.is_empty() {
            return Err(StoreError::Other("Update has no changes".to_string()));
        }

        let mut rows = self.rows.write().await;
        let current = rows.get(key);
        if !condition_holds(condition, current.is_some()) {
            return Err(StoreError::ConditionFailed);
        }

        let updated = apply_update(current.cloned().unwrap_or_default(), &update)?;
        rows.insert(key.clone(), updated);
        Ok(())
    }

    async fn delete_item(&self, key: &ItemKey, condition: Condition) -> StoreResult<()> {
        self.take_fault()?;
        let mut rows = self.rows.write().await;
        if !condition_holds(condition, rows.contains_key(key)) {
            return Err(StoreError::ConditionFailed);
        }
        rows.remove(key);
        Ok(())
    }

    async fn batch_write(&self, writes: Vec<BatchWrite>) -> StoreResult<()> {
        self.take_fault()?;

        let keys = writes.iter().map(|write| match write {
            BatchWrite::Put(item) => &item.key,
            BatchWrite::Delete(key) => key,
        });
        if let Some(duplicate) = first_duplicate(keys) {
            return Err(StoreError::Other(format!(
                "Batch contains duplicate key {}",
                duplicate
            )));
        }

        let mut rows = self.rows.write().await;
        for write in writes {
            match write {
                BatchWrite::Put(item) => {
                    rows.insert(item.key, item.attributes);
                }
                BatchWrite::Delete(key) => {
                    rows.remove(&key);
                }
            }
        }
        Ok(())
    }

    async fn transact_write(&self, writes: Vec<TransactWrite>) -> StoreResult<()> {
        self.take_fault()?;

        if let Some(duplicate) = first_duplicate(writes.iter().map(TransactWrite::key)) {
            return Err(StoreError::Other(format!(
                "Transaction contains multiple operations on {}",
                duplicate
            )));
        }

        let mut rows = self.rows.write().await;
        let reasons: Vec<CancellationReason> = writes
            .iter()
            .map(|write| {
                if condition_holds(write.condition(), rows.contains_key(write.key())) {
                    CancellationReason::None
                } else {
                    CancellationReason::ConditionalCheckFailed
                }
            })
            .collect();

        if reasons.iter().any(|r| *r != CancellationReason::None) {
            return Err(StoreError::TransactionCanceled { reasons });
        }

        for write in writes {
            match write {
                TransactWrite::Put { item, .. } => {
                    rows.insert(item.key, item.attributes);
                }
                TransactWrite::Delete { key, .. } => {
                    rows.remove(&key);
                }
            }
        }
        Ok(())
    }

    async fn query(&self, query: &RangeQuery) -> StoreResult<Vec<Item>> {
        self.take_fault()?;
        let rows = self.rows.read().await;
        Ok(rows
            .range(ItemKey::new(query.pk.as_str(), "")..)
            .take_while(|(key, _)| key.pk == query.pk)
            .filter(|(key, _)| query.sk.matches(&key.sk))
            .map(|(key, attributes)| Item {
                key: key.clone(),
                attributes: attributes.clone(),
            })
            .collect())
    }
}
