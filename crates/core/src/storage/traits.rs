use async_trait::async_trait;

use super::{
    BatchWrite, Condition, Consistency, Item, ItemKey, RangeQuery, StoreResult, TransactWrite,
    Update,
};

/// The key/sort-key table every component writes to.
///
/// Implementations own durability and per-item atomicity; callers own the
/// consistency of related writes.
#[async_trait]
pub trait Store: Send + Sync {
    /// Gets the item at `key`, if any.
    async fn get_item(&self, key: &ItemKey, consistency: Consistency)
        -> StoreResult<Option<Item>>;

    /// Writes a whole item, replacing any existing one when the condition holds.
    async fn put_item(&self, item: Item, condition: Condition) -> StoreResult<()>;

    /// Applies attribute changes to the item at `key`.
    async fn update_item(&self, key: &ItemKey, update: Update, condition: Condition)
        -> StoreResult<()>;

    /// Deletes the item at `key`. Deleting a missing item with `Condition::None` succeeds.
    async fn delete_item(&self, key: &ItemKey, condition: Condition) -> StoreResult<()>;

    /// Submits writes together without cross-item atomicity.
    async fn batch_write(&self, writes: Vec<BatchWrite>) -> StoreResult<()>;

    /// Submits conditional writes as one all-or-nothing unit.
    async fn transact_write(&self, writes: Vec<TransactWrite>) -> StoreResult<()>;

    /// Returns every item of one partition matching the sort key condition,
    /// ascending by sort key.
    async fn query(&self, query: &RangeQuery) -> StoreResult<Vec<Item>>;
}
