use recordgate_core::{Actor, ActorId, AppError, AppResult, NonEmptyString};
use recordgate_domain::{
    CollectionDescriptor, CustomActionPayload, CustomActionRequest, FilterTree,
    RecordsCounterParams,
};
use tracing::debug;

use crate::{AuthorizationService, ScopeEnforcer};

/// Context of one inbound custom action call.
#[derive(Debug, Clone)]
pub struct CustomActionCall {
    /// Authenticated caller.
    pub actor: Actor,
    /// Collection the action is attached to.
    pub collection: CollectionDescriptor,
    /// Action name.
    pub custom_action_name: NonEmptyString,
    /// Row scope of the caller on the collection.
    pub scope_filter: Option<FilterTree>,
    /// Timezone forwarded to count queries.
    pub timezone: String,
}

impl CustomActionCall {
    fn counter_params(&self) -> RecordsCounterParams {
        RecordsCounterParams::new(
            self.actor.clone(),
            self.collection.name().clone(),
            self.timezone.clone(),
        )
    }

    fn request(
        &self,
        payload: &CustomActionPayload,
        requester_id: Option<ActorId>,
    ) -> AppResult<CustomActionRequest> {
        Ok(CustomActionRequest {
            collection_name: self.collection.name().clone(),
            custom_action_name: self.custom_action_name.clone(),
            actor: self.actor.clone(),
            requester_id,
            request_filter: payload
                .selection
                .to_scoped_filter(&self.collection, self.scope_filter.as_ref())?,
        })
    }
}

/// Permission pipeline run before a custom action executes.
///
/// Approval calls are verified and authorized against the signed original
/// request; other calls are authorized as triggers. Both then require the
/// selected records to be in scope.
#[derive(Clone)]
pub struct CustomActionGate {
    authorization: AuthorizationService,
    scope: ScopeEnforcer,
}

impl CustomActionGate {
    /// Creates a gate from the authorization and scope services.
    #[must_use]
    pub fn new(authorization: AuthorizationService, scope: ScopeEnforcer) -> Self {
        Self {
            authorization,
            scope,
        }
    }

    /// Authorizes a call and returns the payload the action must execute with.
    ///
    /// For approvals this is the verified signed payload, replacing the
    /// inbound one.
    pub async fn authorize(
        &self,
        call: &CustomActionCall,
        payload: CustomActionPayload,
    ) -> AppResult<CustomActionPayload> {
        let params = call.counter_params();

        let effective_payload = match payload.signed_approval_request.as_deref() {
            Some(signed_approval_request) => {
                let verified = CustomActionPayload::from_signed_parameters(
                    self.authorization
                        .verify_signed_action_parameters(signed_approval_request)?,
                )?;
                if verified.collection_name != call.collection.name().as_str() {
                    return Err(AppError::Validation(format!(
                        "signed approval targets collection '{}' instead of '{}'",
                        verified.collection_name,
                        call.collection.name()
                    )));
                }

                let request = call.request(&verified, verified.requester_id)?;
                self.authorization
                    .assert_can_approve_custom_action(&request, &params)
                    .await?;
                debug!(
                    actor_id = %call.actor.id(),
                    custom_action = call.custom_action_name.as_str(),
                    "custom action approval authorized"
                );
                verified
            }
            None => {
                let request = call.request(&payload, None)?;
                self.authorization
                    .assert_can_trigger_custom_action(&request, &params)
                    .await?;
                payload
            }
        };

        self.scope
            .ensure_record_ids_in_scope(
                &params,
                &effective_payload.selection,
                &call.collection,
                call.scope_filter.as_ref(),
            )
            .await?;

        Ok(effective_payload)
    }
}
