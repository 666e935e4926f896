//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_ports;
mod authorization_service;
mod condition_groups;
mod coverage_evaluator;
mod custom_action_gate;
mod scope_enforcer;

#[cfg(test)]
mod test_support;

pub use authorization_ports::{
    ChartPermissionError, PermissionDirectory, RecordCounter, SignedParametersVerifier,
};
pub use authorization_service::{
    AuthorizationService, CHAINED_QUERIES_MESSAGE, EMPTY_QUERY_MESSAGE, NON_SELECT_QUERY_MESSAGE,
};
pub use condition_groups::group_roles_by_condition;
pub use coverage_evaluator::{Capability, CoverageEvaluator};
pub use custom_action_gate::{CustomActionCall, CustomActionGate};
pub use scope_enforcer::{OUT_OF_SCOPE_MESSAGE, ScopeEnforcer};
