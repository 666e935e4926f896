use recordgate_core::{Actor, ActorId, AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::FilterTree;
use crate::selection::RecordSelection;

/// Context a record counter needs to scope one count query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordsCounterParams {
    /// Actor on whose behalf records are counted.
    pub actor: Actor,
    /// Collection being counted.
    pub collection_name: NonEmptyString,
    /// IANA timezone used for date comparisons.
    pub timezone: String,
}

impl RecordsCounterParams {
    /// Creates counter params.
    #[must_use]
    pub fn new(actor: Actor, collection_name: NonEmptyString, timezone: impl Into<String>) -> Self {
        Self {
            actor,
            collection_name,
            timezone: timezone.into(),
        }
    }
}

/// Custom action execution or approval request on a record set.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomActionRequest {
    /// Collection the action is attached to.
    pub collection_name: NonEmptyString,
    /// Action name.
    pub custom_action_name: NonEmptyString,
    /// Actor triggering or approving.
    pub actor: Actor,
    /// Original requester; only set for approvals.
    pub requester_id: Option<ActorId>,
    /// Records the action targets.
    pub request_filter: FilterTree,
}

/// Attributes of an inbound custom action call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomActionPayload {
    /// Collection the action is attached to.
    pub collection_name: String,
    /// Targeted records.
    #[serde(flatten)]
    pub selection: RecordSelection,
    /// Form values entered by the requester.
    #[serde(default)]
    pub values: Value,
    /// Client-side action identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smart_action_id: Option<String>,
    /// Original requester for approval calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_id: Option<ActorId>,
    /// Signed original request, present only on approval calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_approval_request: Option<String>,
}

impl CustomActionPayload {
    /// Parses verified parameters, accepting the `{data: {attributes}}` envelope.
    pub fn from_signed_parameters(parameters: Value) -> AppResult<Self> {
        let attributes = parameters
            .pointer("/data/attributes")
            .cloned()
            .unwrap_or(parameters);

        serde_json::from_value(attributes).map_err(|error| {
            AppError::Validation(format!("invalid signed action parameters: {error}"))
        })
    }

    /// Returns whether this call approves a previously requested execution.
    #[must_use]
    pub fn is_approval(&self) -> bool {
        self.signed_approval_request.is_some()
    }
}
