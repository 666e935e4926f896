use std::collections::HashSet;

use recordgate_core::AppResult;
use serde::{Deserialize, Serialize};

use crate::collection::CollectionDescriptor;
use crate::filter::FilterTree;

/// Records a caller targets: an explicit id list or every record.
///
/// Identifiers use the collection's primary-key order, joined with
/// [`crate::COMPOSITE_ID_SEPARATOR`] for composite keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSelection {
    /// Explicitly selected record identifiers.
    #[serde(default)]
    pub ids: Vec<String>,
    /// Whether every record is targeted instead of `ids`.
    #[serde(default)]
    pub all_records: bool,
    /// Identifiers removed from an all-records selection.
    #[serde(default)]
    pub all_records_ids_excluded: Vec<String>,
}

impl RecordSelection {
    /// Selects exactly the given identifiers.
    #[must_use]
    pub fn explicit(ids: Vec<String>) -> Self {
        Self {
            ids,
            ..Self::default()
        }
    }

    /// Selects every record except the given identifiers.
    #[must_use]
    pub fn all_except(excluded: Vec<String>) -> Self {
        Self {
            ids: Vec::new(),
            all_records: true,
            all_records_ids_excluded: excluded,
        }
    }

    /// Returns explicit identifiers without duplicates, in first-seen order.
    #[must_use]
    pub fn distinct_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.ids
            .iter()
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Builds the filter denoting the selected records.
    pub fn to_filter(&self, collection: &CollectionDescriptor) -> AppResult<FilterTree> {
        if !self.all_records {
            return collection.record_ids_filter(&self.distinct_ids());
        }

        if self.all_records_ids_excluded.is_empty() {
            return Ok(FilterTree::match_all());
        }

        collection.excluding_record_ids_filter(&self.all_records_ids_excluded)
    }

    /// Builds the selection filter restricted to an optional scope.
    pub fn to_scoped_filter(
        &self,
        collection: &CollectionDescriptor,
        scope_filter: Option<&FilterTree>,
    ) -> AppResult<FilterTree> {
        let selection_filter = self.to_filter(collection)?;
        Ok(match scope_filter {
            Some(scope_filter) if selection_filter.is_match_all() => scope_filter.clone(),
            _ => selection_filter.intersect_optional(scope_filter),
        })
    }
}
