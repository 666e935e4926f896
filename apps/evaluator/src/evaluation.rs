use std::sync::Arc;

use recordgate_application::{
    AuthorizationService, CoverageEvaluator, CustomActionCall, CustomActionGate,
    ScopeEnforcer, SignedParametersVerifier,
};
use recordgate_core::{ActorId, AppError, AppResult, NonEmptyString};
use recordgate_domain::{
    ChartRequest, CustomActionPayload, RecordSelection, RecordsCounterParams,
};
use recordgate_infrastructure::{
    InMemoryPermissionDirectory, InMemoryRecordStore, JwtSignedParametersVerifier,
};
use serde::Deserialize;
use serde_json::Value;

use crate::evaluator_config::EvaluatorConfig;
use crate::fixture::Fixture;

/// One authorization question, tagged by `operation`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum EvaluationRequest {
    Browse {
        actor_id: ActorId,
        collection: String,
        #[serde(default)]
        segment_query: Option<String>,
    },
    Read {
        actor_id: ActorId,
        collection: String,
    },
    Add {
        actor_id: ActorId,
        collection: String,
    },
    Edit {
        actor_id: ActorId,
        collection: String,
    },
    Delete {
        actor_id: ActorId,
        collection: String,
    },
    Export {
        actor_id: ActorId,
        collection: String,
    },
    Chart {
        actor_id: ActorId,
        chart: ChartRequest,
    },
    CustomAction {
        actor_id: ActorId,
        custom_action: String,
        payload: CustomActionPayload,
    },
    Scope {
        actor_id: ActorId,
        collection: String,
        selection: RecordSelection,
    },
}

impl EvaluationRequest {
    pub fn parse(raw: &str) -> AppResult<Self> {
        serde_json::from_str(raw)
            .map_err(|error| AppError::Validation(format!("invalid evaluation request: {error}")))
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Self::Browse { .. } => "browse",
            Self::Read { .. } => "read",
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
            Self::Export { .. } => "export",
            Self::Chart { .. } => "chart",
            Self::CustomAction { .. } => "custom_action",
            Self::Scope { .. } => "scope",
        }
    }
}

/// Services wired over the in-memory adapters of one fixture.
pub struct Evaluator {
    fixture: Fixture,
    timezone: String,
    authorization: AuthorizationService,
    gate: CustomActionGate,
    scope: ScopeEnforcer,
}

impl Evaluator {
    pub fn new(fixture: Fixture, config: &EvaluatorConfig) -> AppResult<Self> {
        let directory = Arc::new(InMemoryPermissionDirectory::from_snapshot(
            fixture.directory.clone(),
        )?);
        let store = Arc::new(InMemoryRecordStore::from_collections(
            fixture.records.clone(),
        )?);
        let verifier: Arc<dyn SignedParametersVerifier> = match &config.signing_secret {
            Some(secret) => Arc::new(JwtSignedParametersVerifier::new(secret)?),
            None => Arc::new(SignedApprovalsDisabled),
        };

        let coverage = CoverageEvaluator::new(store.clone())
            .with_max_concurrent_counts(config.max_concurrent_counts);
        let authorization = AuthorizationService::new(directory, coverage, verifier);
        let scope = ScopeEnforcer::new(store);
        let gate = CustomActionGate::new(authorization.clone(), scope.clone());

        Ok(Self {
            fixture,
            timezone: config.timezone.clone(),
            authorization,
            gate,
            scope,
        })
    }

    /// Returns the payload to execute for custom actions, `None` otherwise.
    pub async fn evaluate(&self, request: EvaluationRequest) -> AppResult<Option<CustomActionPayload>> {
        match request {
            EvaluationRequest::Browse {
                actor_id,
                collection,
                segment_query,
            } => {
                let actor = self.fixture.actor(actor_id)?;
                self.authorization
                    .assert_can_browse(actor, &collection, segment_query.as_deref())
                    .await?;
            }
            EvaluationRequest::Read {
                actor_id,
                collection,
            } => {
                let actor = self.fixture.actor(actor_id)?;
                self.authorization.assert_can_read(actor, &collection).await?;
            }
            EvaluationRequest::Add {
                actor_id,
                collection,
            } => {
                let actor = self.fixture.actor(actor_id)?;
                self.authorization.assert_can_add(actor, &collection).await?;
            }
            EvaluationRequest::Edit {
                actor_id,
                collection,
            } => {
                let actor = self.fixture.actor(actor_id)?;
                self.authorization.assert_can_edit(actor, &collection).await?;
            }
            EvaluationRequest::Delete {
                actor_id,
                collection,
            } => {
                let actor = self.fixture.actor(actor_id)?;
                self.authorization
                    .assert_can_delete(actor, &collection)
                    .await?;
            }
            EvaluationRequest::Export {
                actor_id,
                collection,
            } => {
                let actor = self.fixture.actor(actor_id)?;
                self.authorization
                    .assert_can_export(actor, &collection)
                    .await?;
            }
            EvaluationRequest::Chart { actor_id, chart } => {
                let actor = self.fixture.actor(actor_id)?;
                self.authorization
                    .assert_can_retrieve_chart(actor, &chart)
                    .await?;
            }
            EvaluationRequest::CustomAction {
                actor_id,
                custom_action,
                payload,
            } => {
                let collection = self.fixture.collection(&payload.collection_name)?;
                let call = CustomActionCall {
                    actor: self.fixture.actor(actor_id)?.clone(),
                    collection: collection.clone(),
                    custom_action_name: NonEmptyString::new(custom_action)?,
                    scope_filter: self.fixture.scope(collection.name().as_str()).cloned(),
                    timezone: self.timezone.clone(),
                };
                return self.gate.authorize(&call, payload).await.map(Some);
            }
            EvaluationRequest::Scope {
                actor_id,
                collection,
                selection,
            } => {
                let descriptor = self.fixture.collection(&collection)?;
                let params = RecordsCounterParams::new(
                    self.fixture.actor(actor_id)?.clone(),
                    descriptor.name().clone(),
                    self.timezone.clone(),
                );
                self.scope
                    .ensure_record_ids_in_scope(
                        &params,
                        &selection,
                        descriptor,
                        self.fixture.scope(&collection),
                    )
                    .await?;
            }
        }

        Ok(None)
    }
}

struct SignedApprovalsDisabled;

impl SignedParametersVerifier for SignedApprovalsDisabled {
    fn verify_signed_action_parameters(&self, _signed_parameters: &str) -> AppResult<Value> {
        Err(AppError::InvalidSignature(
            "signed approvals are disabled: RECORDGATE_SIGNING_SECRET is not set".to_owned(),
        ))
    }
}
