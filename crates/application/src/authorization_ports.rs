use async_trait::async_trait;
use recordgate_core::{ActorId, AppError, AppResult, RenderingId, RoleId};
use recordgate_domain::{
    ChartRequest, CollectionActionEvent, FilterTree, RecordsCounterParams, RoleConditions,
};
use serde_json::Value;
use thiserror::Error;

/// Failure of the chart execution permission check.
///
/// The three SQL shape failures are caller mistakes; anything else is a
/// directory failure carried as [`AppError`].
#[derive(Debug, Error)]
pub enum ChartPermissionError {
    /// Query chart with a blank SQL query.
    #[error("empty SQL query")]
    EmptyQuery,
    /// Query chart chaining several statements.
    #[error("chained SQL queries")]
    ChainedQueries,
    /// Query chart with a statement other than SELECT.
    #[error("non-SELECT SQL query")]
    NonSelectQuery,
    /// Any other directory failure.
    #[error(transparent)]
    Other(#[from] AppError),
}

/// Port for role-based permission lookups.
///
/// Answers coarse boolean questions and returns the row conditions
/// configured on conditional custom action permissions.
#[async_trait]
pub trait PermissionDirectory: Send + Sync {
    /// Returns whether the actor may perform `event` on the collection.
    async fn can_on_collection(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        event: CollectionActionEvent,
    ) -> AppResult<bool>;

    /// Returns whether the actor may run a segment query in a rendering.
    async fn can_execute_segment_query(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        rendering_id: RenderingId,
        segment_query: &str,
    ) -> AppResult<bool>;

    /// Returns whether the actor may render a chart in a rendering.
    async fn can_execute_chart(
        &self,
        actor_id: ActorId,
        rendering_id: RenderingId,
        chart_request: &ChartRequest,
    ) -> Result<bool, ChartPermissionError>;

    /// Returns whether the actor holds the trigger permission at all.
    async fn can_trigger_custom_action(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
    ) -> AppResult<bool>;

    /// Returns whether a trigger by this actor must be approved first.
    async fn does_trigger_custom_action_require_approval(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
    ) -> AppResult<bool>;

    /// Returns the condition restricting the actor's trigger permission.
    async fn conditional_trigger_condition(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
    ) -> AppResult<Option<FilterTree>>;

    /// Returns the condition under which the actor's trigger needs approval.
    async fn conditional_requires_approval_condition(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
    ) -> AppResult<Option<FilterTree>>;

    /// Returns whether the actor may approve a request made by `requester_id`.
    async fn can_approve_custom_action(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
        requester_id: ActorId,
    ) -> AppResult<bool>;

    /// Returns the condition restricting the actor's approve permission.
    async fn conditional_approve_condition(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
    ) -> AppResult<Option<FilterTree>>;

    /// Returns the approve conditions of the actor's own roles that may
    /// approve a request made by `requester_id`.
    ///
    /// Roles without the self-approval right are left out when the actor is
    /// the requester.
    async fn conditional_approve_conditions(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
        requester_id: ActorId,
    ) -> AppResult<RoleConditions>;

    /// Returns roles allowed to approve without any condition.
    async fn role_ids_allowed_to_approve_without_conditions(
        &self,
        collection_name: &str,
        custom_action_name: &str,
    ) -> AppResult<Vec<RoleId>>;
}

/// Port counting stored records that match a filter.
#[async_trait]
pub trait RecordCounter: Send + Sync {
    /// Returns the number of distinct records matching `filter`.
    async fn count(&self, params: &RecordsCounterParams, filter: &FilterTree) -> AppResult<u64>;
}

/// Port verifying signed custom action parameters.
pub trait SignedParametersVerifier: Send + Sync {
    /// Returns the decoded parameters, or fails for invalid or stale payloads.
    fn verify_signed_action_parameters(&self, signed_parameters: &str) -> AppResult<Value>;
}
