use std::sync::Arc;

use recordgate_core::{AppError, AppResult};
use recordgate_domain::{CollectionDescriptor, FilterTree, RecordSelection, RecordsCounterParams};
use tracing::{debug, warn};

use crate::RecordCounter;

/// Message carried by scope violations.
pub const OUT_OF_SCOPE_MESSAGE: &str = "target records are out of scope";

/// Checks that explicitly selected records are visible under a scope filter.
#[derive(Clone)]
pub struct ScopeEnforcer {
    counter: Arc<dyn RecordCounter>,
}

impl ScopeEnforcer {
    /// Creates a scope enforcer over a record counter.
    #[must_use]
    pub fn new(counter: Arc<dyn RecordCounter>) -> Self {
        Self { counter }
    }

    /// Ensures every explicitly selected id matches `scope_filter`.
    ///
    /// Virtual collections and all-records selections always pass. Duplicate
    /// ids are counted once.
    pub async fn ensure_record_ids_in_scope(
        &self,
        params: &RecordsCounterParams,
        selection: &RecordSelection,
        collection: &CollectionDescriptor,
        scope_filter: Option<&FilterTree>,
    ) -> AppResult<()> {
        if collection.is_virtual() || selection.all_records {
            return Ok(());
        }

        let record_ids = selection.distinct_ids();
        if record_ids.is_empty() {
            return Ok(());
        }

        let filter = collection
            .record_ids_filter(&record_ids)?
            .intersect_optional(scope_filter);
        let count = self.counter.count(params, &filter).await?;

        let expected = u64::try_from(record_ids.len())
            .map_err(|error| AppError::Internal(format!("record id count overflow: {error}")))?;
        if count != expected {
            warn!(
                actor_id = %params.actor.id(),
                collection = %collection.name(),
                requested = expected,
                matching = count,
                "selected records fall outside the permitted scope"
            );
            return Err(AppError::ScopeViolation(OUT_OF_SCOPE_MESSAGE.to_owned()));
        }

        debug!(
            collection = %collection.name(),
            requested = expected,
            "selected records are in scope"
        );
        Ok(())
    }
}
