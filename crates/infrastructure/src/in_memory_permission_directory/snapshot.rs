use std::collections::BTreeMap;

use recordgate_core::{ActorId, RenderingId, RoleId};
use recordgate_domain::{ChartRequest, CollectionActionEvent, FilterTree};
use serde::{Deserialize, Serialize};

/// Serialized permission directory contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    /// Role held by each actor.
    #[serde(default)]
    pub actors: Vec<ActorRoleAssignment>,
    /// Grants of each role, in precedence order.
    #[serde(default)]
    pub roles: Vec<RoleGrants>,
}

/// Role membership of one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRoleAssignment {
    /// Actor identifier.
    pub actor_id: ActorId,
    /// Role the actor holds.
    pub role_id: RoleId,
}

/// Everything one role may do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleGrants {
    /// Role identifier.
    pub role_id: RoleId,
    /// Collection grants keyed by collection name.
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionGrants>,
    /// Rendering-scoped grants.
    #[serde(default)]
    pub renderings: Vec<RenderingGrants>,
}

/// Grants on one collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionGrants {
    /// Allowed coarse events.
    #[serde(default)]
    pub events: Vec<CollectionActionEvent>,
    /// Custom action grants keyed by action name.
    #[serde(default)]
    pub custom_actions: BTreeMap<String, CustomActionGrants>,
}

/// Grants on one custom action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomActionGrants {
    /// Trigger permission.
    #[serde(default)]
    pub trigger: Option<ConditionalGrant>,
    /// Triggers matching this grant need an approval.
    #[serde(default)]
    pub requires_approval: Option<ConditionalGrant>,
    /// Approve permission.
    #[serde(default)]
    pub approve: Option<ConditionalGrant>,
    /// Whether the role may approve its own members' requests.
    #[serde(default)]
    pub self_approve: bool,
}

/// Permission restricted to the records matching `condition`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionalGrant {
    /// Row condition; `None` means unconditional.
    #[serde(default)]
    pub condition: Option<FilterTree>,
}

/// Grants of a role inside one rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderingGrants {
    /// Rendering identifier.
    pub rendering_id: RenderingId,
    /// Allowed segment queries keyed by collection name.
    #[serde(default)]
    pub segment_queries: BTreeMap<String, Vec<String>>,
    /// Charts the role may render.
    #[serde(default)]
    pub charts: Vec<ChartRequest>,
}
