use std::sync::Arc;

use recordgate_core::{Actor, AppError, AppResult};

use crate::{CoverageEvaluator, PermissionDirectory, SignedParametersVerifier};

mod charts;
mod collections;
mod custom_actions;

pub use charts::{CHAINED_QUERIES_MESSAGE, EMPTY_QUERY_MESSAGE, NON_SELECT_QUERY_MESSAGE};


/// Application service answering one authorization question per operation.
///
/// Every `assert_*` method resolves with `()` when the actor is authorized
/// and fails fast on the first denied check.
#[derive(Clone)]
pub struct AuthorizationService {
    directory: Arc<dyn PermissionDirectory>,
    coverage: CoverageEvaluator,
    verifier: Arc<dyn SignedParametersVerifier>,
}

impl AuthorizationService {
    /// Creates a new authorization service from its collaborators.
    #[must_use]
    pub fn new(
        directory: Arc<dyn PermissionDirectory>,
        coverage: CoverageEvaluator,
        verifier: Arc<dyn SignedParametersVerifier>,
    ) -> Self {
        Self {
            directory,
            coverage,
            verifier,
        }
    }

    /// Decodes signed custom action parameters through the verifier.
    pub fn verify_signed_action_parameters(
        &self,
        signed_parameters: &str,
    ) -> AppResult<serde_json::Value> {
        self.verifier
            .verify_signed_action_parameters(signed_parameters)
    }
}

fn forbidden(actor: &Actor, operation: &str, collection_name: &str) -> AppError {
    AppError::Forbidden(format!(
        "actor '{}' may not {operation} collection '{collection_name}'",
        actor.id()
    ))
}
