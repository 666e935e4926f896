use std::collections::HashMap;

use async_trait::async_trait;
use recordgate_core::{Actor, ActorId, AppError, AppResult, NonEmptyString, RenderingId, RoleId};
use recordgate_domain::{
    ChartRequest, CollectionActionEvent, FilterTree, RecordsCounterParams, RoleConditions,
};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{ChartPermissionError, PermissionDirectory, RecordCounter, SignedParametersVerifier};

pub(crate) fn actor() -> Actor {
    Actor::new(ActorId::new(16), RenderingId::new(42), "user@email.com")
}

pub(crate) fn counter_params(collection_name: &str) -> RecordsCounterParams {
    let collection_name = NonEmptyString::new(collection_name)
        .unwrap_or_else(|_| panic!("collection name must not be empty"));
    RecordsCounterParams::new(actor(), collection_name, "Europe/Paris")
}

/// Counter answering from a filter → count table; unknown filters count 0.
#[derive(Default)]
pub(crate) struct FakeRecordCounter {
    pub counts: Vec<(FilterTree, u64)>,
    pub failure: Option<String>,
    pub calls: Mutex<Vec<FilterTree>>,
}

impl FakeRecordCounter {
    pub(crate) fn with_counts(counts: Vec<(FilterTree, u64)>) -> Self {
        Self {
            counts,
            ..Self::default()
        }
    }

    pub(crate) async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl RecordCounter for FakeRecordCounter {
    async fn count(&self, _params: &RecordsCounterParams, filter: &FilterTree) -> AppResult<u64> {
        self.calls.lock().await.push(filter.clone());
        if let Some(failure) = &self.failure {
            return Err(AppError::Internal(failure.clone()));
        }

        Ok(self
            .counts
            .iter()
            .find(|(candidate, _)| candidate == filter)
            .map(|(_, count)| *count)
            .unwrap_or(0))
    }
}

/// Scripted directory recording every method invocation by name.
#[derive(Default)]
pub(crate) struct FakePermissionDirectory {
    pub collection_events: Vec<CollectionActionEvent>,
    pub segment_query_allowed: bool,
    pub chart_outcome: Option<FakeChartOutcome>,
    pub can_trigger: bool,
    pub trigger_condition: Option<FilterTree>,
    pub requires_approval: bool,
    pub requires_approval_condition: Option<FilterTree>,
    pub can_approve: bool,
    pub approve_condition: Option<FilterTree>,
    pub approve_conditions: RoleConditions,
    pub unconditional_approvers: Vec<RoleId>,
    pub calls: Mutex<Vec<&'static str>>,
    pub approve_conditions_lookups: Mutex<Vec<(ActorId, ActorId)>>,
}

#[derive(Clone, Copy)]
pub(crate) enum FakeChartOutcome {
    Allowed,
    Denied,
    EmptyQuery,
    ChainedQueries,
    NonSelectQuery,
    Unavailable,
}

impl FakePermissionDirectory {
    pub(crate) async fn calls_to(&self, method: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| **call == method)
            .count()
    }

    async fn record(&self, method: &'static str) {
        self.calls.lock().await.push(method);
    }
}

#[async_trait]
impl PermissionDirectory for FakePermissionDirectory {
    async fn can_on_collection(
        &self,
        _actor_id: ActorId,
        _collection_name: &str,
        event: CollectionActionEvent,
    ) -> AppResult<bool> {
        self.record("can_on_collection").await;
        Ok(self.collection_events.contains(&event))
    }

    async fn can_execute_segment_query(
        &self,
        _actor_id: ActorId,
        _collection_name: &str,
        _rendering_id: RenderingId,
        _segment_query: &str,
    ) -> AppResult<bool> {
        self.record("can_execute_segment_query").await;
        Ok(self.segment_query_allowed)
    }

    async fn can_execute_chart(
        &self,
        _actor_id: ActorId,
        _rendering_id: RenderingId,
        _chart_request: &ChartRequest,
    ) -> Result<bool, ChartPermissionError> {
        self.record("can_execute_chart").await;
        match self.chart_outcome.unwrap_or(FakeChartOutcome::Denied) {
            FakeChartOutcome::Allowed => Ok(true),
            FakeChartOutcome::Denied => Ok(false),
            FakeChartOutcome::EmptyQuery => Err(ChartPermissionError::EmptyQuery),
            FakeChartOutcome::ChainedQueries => Err(ChartPermissionError::ChainedQueries),
            FakeChartOutcome::NonSelectQuery => Err(ChartPermissionError::NonSelectQuery),
            FakeChartOutcome::Unavailable => Err(ChartPermissionError::Other(
                AppError::Internal("directory unavailable".to_owned()),
            )),
        }
    }

    async fn can_trigger_custom_action(
        &self,
        _actor_id: ActorId,
        _collection_name: &str,
        _custom_action_name: &str,
    ) -> AppResult<bool> {
        self.record("can_trigger_custom_action").await;
        Ok(self.can_trigger)
    }

    async fn does_trigger_custom_action_require_approval(
        &self,
        _actor_id: ActorId,
        _collection_name: &str,
        _custom_action_name: &str,
    ) -> AppResult<bool> {
        self.record("does_trigger_custom_action_require_approval")
            .await;
        Ok(self.requires_approval)
    }

    async fn conditional_trigger_condition(
        &self,
        _actor_id: ActorId,
        _collection_name: &str,
        _custom_action_name: &str,
    ) -> AppResult<Option<FilterTree>> {
        self.record("conditional_trigger_condition").await;
        Ok(self.trigger_condition.clone())
    }

    async fn conditional_requires_approval_condition(
        &self,
        _actor_id: ActorId,
        _collection_name: &str,
        _custom_action_name: &str,
    ) -> AppResult<Option<FilterTree>> {
        self.record("conditional_requires_approval_condition").await;
        Ok(self.requires_approval_condition.clone())
    }

    async fn can_approve_custom_action(
        &self,
        _actor_id: ActorId,
        _collection_name: &str,
        _custom_action_name: &str,
        _requester_id: ActorId,
    ) -> AppResult<bool> {
        self.record("can_approve_custom_action").await;
        Ok(self.can_approve)
    }

    async fn conditional_approve_condition(
        &self,
        _actor_id: ActorId,
        _collection_name: &str,
        _custom_action_name: &str,
    ) -> AppResult<Option<FilterTree>> {
        self.record("conditional_approve_condition").await;
        Ok(self.approve_condition.clone())
    }

    async fn conditional_approve_conditions(
        &self,
        actor_id: ActorId,
        _collection_name: &str,
        _custom_action_name: &str,
        requester_id: ActorId,
    ) -> AppResult<RoleConditions> {
        self.record("conditional_approve_conditions").await;
        self.approve_conditions_lookups
            .lock()
            .await
            .push((actor_id, requester_id));
        Ok(self.approve_conditions.clone())
    }

    async fn role_ids_allowed_to_approve_without_conditions(
        &self,
        _collection_name: &str,
        _custom_action_name: &str,
    ) -> AppResult<Vec<RoleId>> {
        self.record("role_ids_allowed_to_approve_without_conditions")
            .await;
        Ok(self.unconditional_approvers.clone())
    }
}

/// Verifier returning fixed parameters for known signatures.
#[derive(Default)]
pub(crate) struct FakeSignedParametersVerifier {
    pub parameters: HashMap<String, Value>,
}

impl SignedParametersVerifier for FakeSignedParametersVerifier {
    fn verify_signed_action_parameters(&self, signed_parameters: &str) -> AppResult<Value> {
        self.parameters
            .get(signed_parameters)
            .cloned()
            .ok_or_else(|| AppError::InvalidSignature("unknown signature".to_owned()))
    }
}
