use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use recordgate_application::{ChartPermissionError, PermissionDirectory};
use recordgate_core::{ActorId, AppError, AppResult, RenderingId, RoleId};
use recordgate_domain::{ChartRequest, CollectionActionEvent, FilterTree, RoleConditions};
use tokio::sync::RwLock;
use tracing::debug;

mod snapshot;
mod sql;

pub use snapshot::{
    ActorRoleAssignment, CollectionGrants, ConditionalGrant, CustomActionGrants,
    DirectorySnapshot, RenderingGrants, RoleGrants,
};

use sql::{normalize_query, validate_chart_query};

/// Permission directory answering from an immutable snapshot.
///
/// Each lookup reads one consistent snapshot; [`Self::replace_snapshot`]
/// swaps it atomically.
#[derive(Debug)]
pub struct InMemoryPermissionDirectory {
    index: RwLock<Arc<DirectoryIndex>>,
}

#[derive(Debug)]
struct DirectoryIndex {
    actor_roles: HashMap<ActorId, RoleId>,
    roles: BTreeMap<RoleId, RoleGrants>,
}

impl InMemoryPermissionDirectory {
    /// Creates a directory from a validated snapshot.
    pub fn from_snapshot(snapshot: DirectorySnapshot) -> AppResult<Self> {
        Ok(Self {
            index: RwLock::new(Arc::new(DirectoryIndex::build(snapshot)?)),
        })
    }

    /// Replaces the served snapshot.
    pub async fn replace_snapshot(&self, snapshot: DirectorySnapshot) -> AppResult<()> {
        let index = Arc::new(DirectoryIndex::build(snapshot)?);
        *self.index.write().await = index;
        Ok(())
    }

    async fn snapshot(&self) -> Arc<DirectoryIndex> {
        Arc::clone(&*self.index.read().await)
    }
}

impl DirectoryIndex {
    fn build(snapshot: DirectorySnapshot) -> AppResult<Self> {
        let mut roles = BTreeMap::new();
        for role in snapshot.roles {
            let role_id = role.role_id;
            if roles.insert(role_id, role).is_some() {
                return Err(AppError::Validation(format!(
                    "role '{role_id}' is declared more than once"
                )));
            }
        }

        let mut actor_roles = HashMap::with_capacity(snapshot.actors.len());
        for assignment in snapshot.actors {
            if !roles.contains_key(&assignment.role_id) {
                return Err(AppError::Validation(format!(
                    "actor '{}' references unknown role '{}'",
                    assignment.actor_id, assignment.role_id
                )));
            }
            if actor_roles
                .insert(assignment.actor_id, assignment.role_id)
                .is_some()
            {
                return Err(AppError::Validation(format!(
                    "actor '{}' is assigned more than one role",
                    assignment.actor_id
                )));
            }
        }

        Ok(Self { actor_roles, roles })
    }

    fn role_of(&self, actor_id: ActorId) -> AppResult<&RoleGrants> {
        self.actor_roles
            .get(&actor_id)
            .and_then(|role_id| self.roles.get(role_id))
            .ok_or_else(|| AppError::NotFound(format!("actor '{actor_id}' has no role")))
    }

    fn collection_of(
        &self,
        actor_id: ActorId,
        collection_name: &str,
    ) -> AppResult<Option<&CollectionGrants>> {
        Ok(self.role_of(actor_id)?.collections.get(collection_name))
    }

    fn custom_action_of(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
    ) -> AppResult<Option<&CustomActionGrants>> {
        Ok(self
            .collection_of(actor_id, collection_name)?
            .and_then(|collection| collection.custom_actions.get(custom_action_name)))
    }

    fn rendering_of(
        &self,
        actor_id: ActorId,
        rendering_id: RenderingId,
    ) -> AppResult<Option<&RenderingGrants>> {
        Ok(self
            .role_of(actor_id)?
            .renderings
            .iter()
            .find(|rendering| rendering.rendering_id == rendering_id))
    }

    /// Approve grant of the actor's role, when it may approve `requester_id`.
    fn eligible_approve_grant(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
        requester_id: ActorId,
    ) -> AppResult<Option<(RoleId, &ConditionalGrant)>> {
        let role = self.role_of(actor_id)?;
        Ok(role
            .collections
            .get(collection_name)
            .and_then(|collection| collection.custom_actions.get(custom_action_name))
            .filter(|action| action.self_approve || requester_id != actor_id)
            .and_then(|action| action.approve.as_ref())
            .map(|grant| (role.role_id, grant)))
    }

    fn approve_grants<'a>(
        &'a self,
        collection_name: &'a str,
        custom_action_name: &'a str,
    ) -> impl Iterator<Item = (RoleId, &'a ConditionalGrant)> + 'a {
        self.roles.values().filter_map(move |role| {
            role.collections
                .get(collection_name)
                .and_then(|collection| collection.custom_actions.get(custom_action_name))
                .and_then(|action| action.approve.as_ref())
                .map(|grant| (role.role_id, grant))
        })
    }
}

fn chart_matches(granted: &ChartRequest, requested: &ChartRequest) -> bool {
    match (&granted.query, &requested.query) {
        (Some(granted_query), Some(requested_query)) => {
            granted.chart_type == requested.chart_type
                && normalize_query(granted_query) == normalize_query(requested_query)
        }
        _ => granted == requested,
    }
}

#[async_trait]
impl PermissionDirectory for InMemoryPermissionDirectory {
    async fn can_on_collection(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        event: CollectionActionEvent,
    ) -> AppResult<bool> {
        let index = self.snapshot().await;
        Ok(index
            .collection_of(actor_id, collection_name)?
            .is_some_and(|collection| collection.events.contains(&event)))
    }

    async fn can_execute_segment_query(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        rendering_id: RenderingId,
        segment_query: &str,
    ) -> AppResult<bool> {
        let index = self.snapshot().await;
        let requested = normalize_query(segment_query);
        Ok(index
            .rendering_of(actor_id, rendering_id)?
            .and_then(|rendering| rendering.segment_queries.get(collection_name))
            .is_some_and(|queries| {
                queries
                    .iter()
                    .any(|query| normalize_query(query) == requested)
            }))
    }

    async fn can_execute_chart(
        &self,
        actor_id: ActorId,
        rendering_id: RenderingId,
        chart_request: &ChartRequest,
    ) -> Result<bool, ChartPermissionError> {
        if let Some(query) = chart_request.query.as_deref() {
            validate_chart_query(query)?;
        }

        let index = self.snapshot().await;
        let allowed = index
            .rendering_of(actor_id, rendering_id)?
            .is_some_and(|rendering| {
                rendering
                    .charts
                    .iter()
                    .any(|granted| chart_matches(granted, chart_request))
            });
        debug!(
            actor_id = %actor_id,
            rendering_id = %rendering_id,
            allowed,
            "resolved chart permission"
        );

        Ok(allowed)
    }

    async fn can_trigger_custom_action(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
    ) -> AppResult<bool> {
        let index = self.snapshot().await;
        Ok(index
            .custom_action_of(actor_id, collection_name, custom_action_name)?
            .is_some_and(|action| action.trigger.is_some()))
    }

    async fn does_trigger_custom_action_require_approval(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
    ) -> AppResult<bool> {
        let index = self.snapshot().await;
        Ok(index
            .custom_action_of(actor_id, collection_name, custom_action_name)?
            .is_some_and(|action| action.requires_approval.is_some()))
    }

    async fn conditional_trigger_condition(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
    ) -> AppResult<Option<FilterTree>> {
        let index = self.snapshot().await;
        Ok(index
            .custom_action_of(actor_id, collection_name, custom_action_name)?
            .and_then(|action| action.trigger.as_ref())
            .and_then(|grant| grant.condition.clone()))
    }

    async fn conditional_requires_approval_condition(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
    ) -> AppResult<Option<FilterTree>> {
        let index = self.snapshot().await;
        Ok(index
            .custom_action_of(actor_id, collection_name, custom_action_name)?
            .and_then(|action| action.requires_approval.as_ref())
            .and_then(|grant| grant.condition.clone()))
    }

    async fn can_approve_custom_action(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
        requester_id: ActorId,
    ) -> AppResult<bool> {
        let index = self.snapshot().await;
        Ok(index
            .eligible_approve_grant(actor_id, collection_name, custom_action_name, requester_id)?
            .is_some())
    }

    async fn conditional_approve_condition(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
    ) -> AppResult<Option<FilterTree>> {
        let index = self.snapshot().await;
        Ok(index
            .custom_action_of(actor_id, collection_name, custom_action_name)?
            .and_then(|action| action.approve.as_ref())
            .and_then(|grant| grant.condition.clone()))
    }

    async fn conditional_approve_conditions(
        &self,
        actor_id: ActorId,
        collection_name: &str,
        custom_action_name: &str,
        requester_id: ActorId,
    ) -> AppResult<RoleConditions> {
        let index = self.snapshot().await;
        Ok(index
            .eligible_approve_grant(actor_id, collection_name, custom_action_name, requester_id)?
            .map(|(role_id, grant)| (role_id, grant.condition.clone()))
            .into_iter()
            .collect())
    }

    async fn role_ids_allowed_to_approve_without_conditions(
        &self,
        collection_name: &str,
        custom_action_name: &str,
    ) -> AppResult<Vec<RoleId>> {
        let index = self.snapshot().await;
        Ok(index
            .approve_grants(collection_name, custom_action_name)
            .filter(|(_, grant)| grant.condition.is_none())
            .map(|(role_id, _)| role_id)
            .collect())
    }
}

#[cfg(test)]
mod tests;
