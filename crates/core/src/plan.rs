//! Write strategies for editing a workout.
//!
//! A workout's identity is its sort key, so editing is an attribute update
//! only when the name is unchanged. Renaming moves the row.

use crate::codec;
use crate::error::Result;
use crate::models::WorkoutPayload;
use crate::storage::{Item, ItemKey, Update};

/// How renames are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenameMode {
    /// Delete and put in one non-atomic batch. Overwrites an existing
    /// destination and cannot detect a missing source.
    #[default]
    Batched,
    /// Delete-if-exists and put-if-absent in one transaction. Costs twice the
    /// write capacity of the batch.
    Transactional,
}

/// The store writes that carry out one edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditPlan {
    /// Name unchanged: one conditional update of the existing row.
    InPlaceUpdate { key: ItemKey, update: Update },
    /// Renamed, batched: old row deleted and new row put without atomicity.
    /// A crash or cancellation mid-batch may leave only one of the two applied.
    DeleteThenPut { old_key: ItemKey, item: Item },
    /// Renamed, transactional: both writes commit or neither does.
    TransactionalRename { old_key: ItemKey, item: Item },
}

impl EditPlan {
    /// Chooses the strategy for editing `old_name` into `new_name`.
    pub fn new(
        username: &str,
        old_name: &str,
        new_name: &str,
        payload: &WorkoutPayload,
        mode: RenameMode,
    ) -> Result<Self> {
        if old_name == new_name {
            let update = Update::new().set(
                [codec::WORKOUT_ATTRIBUTE],
                codec::workout_value(payload)?,
            );
            return Ok(EditPlan::InPlaceUpdate {
                key: codec::workout_key(username, old_name),
                update,
            });
        }

        let old_key = codec::workout_key(username, old_name);
        let item = codec::workout_to_item(username, new_name, payload)?;

        Ok(match mode {
            RenameMode::Batched => EditPlan::DeleteThenPut { old_key, item },
            RenameMode::Transactional => EditPlan::TransactionalRename { old_key, item },
        })
    }

    /// Whether the plan changes the row's sort key.
    pub fn is_rename(&self) -> bool {
        !matches!(self, EditPlan::InPlaceUpdate { .. })
    }
}
