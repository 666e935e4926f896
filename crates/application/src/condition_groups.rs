use recordgate_domain::{ConditionGroup, RoleConditions};

/// Partitions roles into groups sharing a structurally equal condition.
///
/// Groups follow the order in which each distinct condition first appears.
/// Roles without a condition share the unconditional group.
#[must_use]
pub fn group_roles_by_condition(conditions_by_role_id: &RoleConditions) -> Vec<ConditionGroup> {
    let mut groups: Vec<ConditionGroup> = Vec::new();

    for (role_id, condition) in conditions_by_role_id.iter() {
        match groups
            .iter_mut()
            .find(|group| group.condition.as_ref() == condition)
        {
            Some(group) => group.role_ids.push(role_id),
            None => groups.push(ConditionGroup {
                role_ids: vec![role_id],
                condition: condition.cloned(),
            }),
        }
    }

    groups
}
