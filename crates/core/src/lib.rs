//! Shared primitives for all Rust crates in recordgate.

#![forbid(unsafe_code)]

/// Authenticated actor primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{Actor, ActorId, RenderingId, RoleId};

/// Result type used across recordgate crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
///
/// The authorization family (`Forbidden`, `CustomActionTriggerForbidden`,
/// `CustomActionRequiresApproval`, `ApprovalNotAllowed`) never carries
/// condition or count detail in its message.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Actor is authenticated but blocked by a coarse permission.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Actor may not trigger the custom action on the targeted records.
    #[error("custom action trigger forbidden: {0}")]
    CustomActionTriggerForbidden(String),

    /// Triggering the custom action on the targeted records needs an approval.
    #[error("custom action requires approval")]
    CustomActionRequiresApproval {
        /// Roles allowed to approve the action without any condition.
        role_ids: Vec<RoleId>,
    },

    /// Actor may not approve the custom action on the targeted records.
    #[error("approval not allowed: {0}")]
    ApprovalNotAllowed(String),

    /// Malformed or disallowed caller input with a user-facing message.
    #[error("{0}")]
    BadRequest(String),

    /// Explicitly selected records fall outside the permitted scope.
    #[error("{0}")]
    ScopeViolation(String),

    /// Signed payload failed verification.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code a transport layer should surface.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_)
            | Self::BadRequest(_)
            | Self::ScopeViolation(_)
            | Self::InvalidSignature(_) => 400,
            Self::NotFound(_) => 404,
            Self::Forbidden(_)
            | Self::CustomActionTriggerForbidden(_)
            | Self::CustomActionRequiresApproval { .. }
            | Self::ApprovalNotAllowed(_) => 403,
            Self::Internal(_) => 500,
        }
    }

    /// Returns a stable, machine-readable name for the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::CustomActionTriggerForbidden(_) => "custom_action_trigger_forbidden",
            Self::CustomActionRequiresApproval { .. } => "custom_action_requires_approval",
            Self::ApprovalNotAllowed(_) => "approval_not_allowed",
            Self::BadRequest(_) => "bad_request",
            Self::ScopeViolation(_) => "scope_violation",
            Self::InvalidSignature(_) => "invalid_signature",
            Self::Internal(_) => "internal",
        }
    }
}
