use recordgate_core::ActorId;
use recordgate_domain::{CustomActionRequest, RecordsCounterParams};
use tracing::{debug, warn};

use crate::{Capability, group_roles_by_condition};

use super::*;

impl AuthorizationService {
    /// Ensures the actor may trigger the action on every targeted record.
    ///
    /// Fails with [`AppError::CustomActionRequiresApproval`] when the trigger
    /// is allowed but must first be approved.
    pub async fn assert_can_trigger_custom_action(
        &self,
        request: &CustomActionRequest,
        params: &RecordsCounterParams,
    ) -> AppResult<()> {
        let actor_id = request.actor.id();
        let collection_name = request.collection_name.as_str();
        let custom_action_name = request.custom_action_name.as_str();

        if !self
            .directory
            .can_trigger_custom_action(actor_id, collection_name, custom_action_name)
            .await?
        {
            warn!(
                actor_id = %actor_id,
                collection = collection_name,
                custom_action = custom_action_name,
                "custom action trigger denied"
            );
            return Err(trigger_forbidden(request));
        }

        let capability = Capability::from(
            self.directory
                .conditional_trigger_condition(actor_id, collection_name, custom_action_name)
                .await?,
        );
        if !self
            .coverage
            .covers(params, &request.request_filter, &capability)
            .await?
        {
            warn!(
                actor_id = %actor_id,
                collection = collection_name,
                custom_action = custom_action_name,
                "trigger condition does not cover the targeted records"
            );
            return Err(trigger_forbidden(request));
        }

        if self.trigger_requires_approval(request, params).await? {
            let role_ids = self
                .directory
                .role_ids_allowed_to_approve_without_conditions(collection_name, custom_action_name)
                .await?;
            debug!(
                actor_id = %actor_id,
                collection = collection_name,
                custom_action = custom_action_name,
                approvers = role_ids.len(),
                "custom action trigger requires approval"
            );
            return Err(AppError::CustomActionRequiresApproval { role_ids });
        }

        Ok(())
    }

    /// Ensures the actor may approve the action requested by `requester_id`.
    pub async fn assert_can_approve_custom_action(
        &self,
        request: &CustomActionRequest,
        params: &RecordsCounterParams,
    ) -> AppResult<()> {
        let requester_id = request.requester_id.ok_or_else(|| {
            AppError::Validation("approving a custom action requires the requester id".to_owned())
        })?;

        let capability = self.approve_capability(request, requester_id).await?;
        if !self
            .coverage
            .covers(params, &request.request_filter, &capability)
            .await?
        {
            warn!(
                actor_id = %request.actor.id(),
                requester_id = %requester_id,
                collection = request.collection_name.as_str(),
                custom_action = request.custom_action_name.as_str(),
                "custom action approval denied"
            );
            return Err(AppError::ApprovalNotAllowed(format!(
                "actor '{}' may not approve custom action '{}' on collection '{}'",
                request.actor.id(),
                request.custom_action_name,
                request.collection_name
            )));
        }

        Ok(())
    }

    async fn trigger_requires_approval(
        &self,
        request: &CustomActionRequest,
        params: &RecordsCounterParams,
    ) -> AppResult<bool> {
        let actor_id = request.actor.id();
        let collection_name = request.collection_name.as_str();
        let custom_action_name = request.custom_action_name.as_str();

        if !self
            .directory
            .does_trigger_custom_action_require_approval(
                actor_id,
                collection_name,
                custom_action_name,
            )
            .await?
        {
            return Ok(false);
        }

        let condition = self
            .directory
            .conditional_requires_approval_condition(actor_id, collection_name, custom_action_name)
            .await?;
        self.coverage
            .satisfies_condition(params, &request.request_filter, condition.as_ref())
            .await
    }

    async fn approve_capability(
        &self,
        request: &CustomActionRequest,
        requester_id: ActorId,
    ) -> AppResult<Capability> {
        let actor_id = request.actor.id();
        let collection_name = request.collection_name.as_str();
        let custom_action_name = request.custom_action_name.as_str();

        if self
            .directory
            .can_approve_custom_action(actor_id, collection_name, custom_action_name, requester_id)
            .await?
        {
            let condition = self
                .directory
                .conditional_approve_condition(actor_id, collection_name, custom_action_name)
                .await?;
            return Ok(Capability::from(condition));
        }

        let conditions_by_role_id = self
            .directory
            .conditional_approve_conditions(
                actor_id,
                collection_name,
                custom_action_name,
                requester_id,
            )
            .await?;
        let groups = group_roles_by_condition(&conditions_by_role_id);
        debug!(
            actor_id = %actor_id,
            collection = collection_name,
            custom_action = custom_action_name,
            roles = conditions_by_role_id.len(),
            groups = groups.len(),
            "falling back to role condition groups for approval"
        );

        Ok(Capability::ConditionalByRoles(groups))
    }
}

fn trigger_forbidden(request: &CustomActionRequest) -> AppError {
    AppError::CustomActionTriggerForbidden(format!(
        "actor '{}' may not trigger custom action '{}' on collection '{}'",
        request.actor.id(),
        request.custom_action_name,
        request.collection_name
    ))
}
