//! Write outcomes reported back to callers.

use bson::Bson;
use mongodb::results::{DeleteResult, InsertManyResult, InsertOneResult, UpdateResult};

/// What a write changed, as acknowledged by the server.
///
/// Counters not touched by the operation stay zero: an insert reports only
/// `inserted`, a delete only `deleted`, and so on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteOutcome {
    /// Documents inserted.
    pub inserted: u64,
    /// Documents matched by the selector.
    pub matched: u64,
    /// Documents actually modified.
    pub modified: u64,
    /// Documents deleted.
    pub deleted: u64,
    /// The id under which an upsert inserted, when it did.
    pub upserted_id: Option<Bson>,
}

impl From<InsertOneResult> for WriteOutcome {
    fn from(_: InsertOneResult) -> Self {
        WriteOutcome { inserted: 1, ..Default::default() }
    }
}

impl From<InsertManyResult> for WriteOutcome {
    fn from(result: InsertManyResult) -> Self {
        WriteOutcome {
            inserted: result.inserted_ids.len() as u64,
            ..Default::default()
        }
    }
}

impl From<UpdateResult> for WriteOutcome {
    fn from(result: UpdateResult) -> Self {
        WriteOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
            upserted_id: result.upserted_id,
            ..Default::default()
        }
    }
}

impl From<DeleteResult> for WriteOutcome {
    fn from(result: DeleteResult) -> Self {
        WriteOutcome {
            deleted: result.deleted_count,
            ..Default::default()
        }
    }
}
