use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use recordgate_core::AppResult;
use recordgate_domain::{ConditionGroup, FilterTree, RecordsCounterParams};
use tracing::debug;

use crate::RecordCounter;

const DEFAULT_MAX_CONCURRENT_COUNTS: usize = 8;

/// Capability resolved for an actor before record coverage is measured.
#[derive(Debug, Clone, PartialEq)]
pub enum Capability {
    /// No row condition applies.
    Unconditional,
    /// One condition every targeted record must satisfy.
    Conditional(FilterTree),
    /// Several role groups, each of which must cover every targeted record.
    ConditionalByRoles(Vec<ConditionGroup>),
}

impl From<Option<FilterTree>> for Capability {
    fn from(condition: Option<FilterTree>) -> Self {
        condition.map_or(Self::Unconditional, Self::Conditional)
    }
}

/// Decides record coverage by comparing exact counts.
///
/// A condition covers a request when the records matching the request filter
/// and the records matching `request AND condition` have the same count.
/// Partial coverage is a denial.
#[derive(Clone)]
pub struct CoverageEvaluator {
    counter: Arc<dyn RecordCounter>,
    max_concurrent_counts: usize,
}

impl CoverageEvaluator {
    /// Creates an evaluator over a record counter.
    #[must_use]
    pub fn new(counter: Arc<dyn RecordCounter>) -> Self {
        Self {
            counter,
            max_concurrent_counts: DEFAULT_MAX_CONCURRENT_COUNTS,
        }
    }

    /// Bounds how many count queries run at once; zero is treated as one.
    #[must_use]
    pub fn with_max_concurrent_counts(mut self, max_concurrent_counts: usize) -> Self {
        self.max_concurrent_counts = max_concurrent_counts.max(1);
        self
    }

    /// Returns whether every record matching `request_filter` satisfies `condition`.
    pub async fn satisfies_condition(
        &self,
        params: &RecordsCounterParams,
        request_filter: &FilterTree,
        condition: Option<&FilterTree>,
    ) -> AppResult<bool> {
        let Some(condition) = condition else {
            return Ok(true);
        };

        let (total, matching) = futures::try_join!(
            self.counter.count(params, request_filter),
            self.count_intersection(params, request_filter, condition),
        )?;

        debug!(
            collection = %params.collection_name,
            total,
            matching,
            "measured condition coverage"
        );

        Ok(matching == total)
    }

    /// Returns whether every group's condition covers every targeted record.
    ///
    /// The reference total is counted once. Groups without a condition pass
    /// without a count query, and an empty group list is a denial.
    pub async fn is_approval_authorized_across_groups(
        &self,
        params: &RecordsCounterParams,
        request_filter: &FilterTree,
        groups: &[ConditionGroup],
    ) -> AppResult<bool> {
        if groups.is_empty() {
            return Ok(false);
        }

        let conditions: Vec<&FilterTree> = groups
            .iter()
            .filter_map(|group| group.condition.as_ref())
            .collect();
        if conditions.is_empty() {
            return Ok(true);
        }

        let total = self.counter.count(params, request_filter).await?;

        let mut matching_counts = stream::iter(
            conditions
                .into_iter()
                .map(|condition| self.count_intersection(params, request_filter, condition)),
        )
        .buffered(self.max_concurrent_counts);

        while let Some(matching) = matching_counts.try_next().await? {
            if matching != total {
                debug!(
                    collection = %params.collection_name,
                    total,
                    matching,
                    "role group does not cover the requested records"
                );
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Runs the coverage stage for a resolved capability.
    pub async fn covers(
        &self,
        params: &RecordsCounterParams,
        request_filter: &FilterTree,
        capability: &Capability,
    ) -> AppResult<bool> {
        match capability {
            Capability::Unconditional => Ok(true),
            Capability::Conditional(condition) => {
                self.satisfies_condition(params, request_filter, Some(condition))
                    .await
            }
            Capability::ConditionalByRoles(groups) => {
                self.is_approval_authorized_across_groups(params, request_filter, groups)
                    .await
            }
        }
    }

    async fn count_intersection(
        &self,
        params: &RecordsCounterParams,
        request_filter: &FilterTree,
        condition: &FilterTree,
    ) -> AppResult<u64> {
        self.counter
            .count(params, &request_filter.intersect(condition))
            .await
    }
}
