mod error;
mod traits;
mod types;

pub use error::{CancellationReason, StoreError, StoreResult};
pub use traits::Store;
pub use types::{
    AttributePath, Attributes, BatchWrite, Condition, Consistency, Item, ItemKey, RangeQuery,
    SortKeyCondition, TransactWrite, Update,
};
