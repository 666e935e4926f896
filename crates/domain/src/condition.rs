use recordgate_core::RoleId;
use serde::{Deserialize, Serialize};

use crate::filter::FilterTree;

/// Ordered role → condition mapping returned by a permission directory.
///
/// A `None` condition means the role's permission is unconditional. Each role
/// appears at most once; the first insertion wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(RoleId, Option<FilterTree>)>", into = "Vec<(RoleId, Option<FilterTree>)>")]
pub struct RoleConditions(Vec<(RoleId, Option<FilterTree>)>);

impl RoleConditions {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a role; ignored when the role is already present.
    pub fn insert(&mut self, role_id: RoleId, condition: Option<FilterTree>) {
        if self.0.iter().all(|(existing, _)| *existing != role_id) {
            self.0.push((role_id, condition));
        }
    }

    /// Iterates roles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (RoleId, Option<&FilterTree>)> {
        self.0
            .iter()
            .map(|(role_id, condition)| (*role_id, condition.as_ref()))
    }

    /// Returns the number of roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no role is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<(RoleId, Option<FilterTree>)>> for RoleConditions {
    fn from(entries: Vec<(RoleId, Option<FilterTree>)>) -> Self {
        let mut conditions = Self::new();
        for (role_id, condition) in entries {
            conditions.insert(role_id, condition);
        }
        conditions
    }
}

impl From<RoleConditions> for Vec<(RoleId, Option<FilterTree>)> {
    fn from(conditions: RoleConditions) -> Self {
        conditions.0
    }
}

impl FromIterator<(RoleId, Option<FilterTree>)> for RoleConditions {
    fn from_iter<T: IntoIterator<Item = (RoleId, Option<FilterTree>)>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Roles sharing one structurally identical condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup {
    /// Roles in the group; never empty.
    pub role_ids: Vec<RoleId>,
    /// Shared condition; `None` means unconditional.
    pub condition: Option<FilterTree>,
}
