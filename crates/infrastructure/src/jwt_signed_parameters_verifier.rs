use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use recordgate_application::SignedParametersVerifier;
use recordgate_core::{AppError, AppResult};
use serde_json::Value;

/// Minimum accepted length of the shared signing secret.
pub const MIN_SIGNING_SECRET_LENGTH: usize = 32;

/// Verifies HS256-signed custom action parameters with a shared secret.
///
/// Tokens must carry an `exp` claim in the future; the decoded claims are
/// returned as the parameter object.
pub struct JwtSignedParametersVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSignedParametersVerifier {
    /// Creates a verifier for the given shared secret.
    pub fn new(secret: &str) -> AppResult<Self> {
        if secret.len() < MIN_SIGNING_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "signing secret must be at least {MIN_SIGNING_SECRET_LENGTH} characters"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = 0;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

impl SignedParametersVerifier for JwtSignedParametersVerifier {
    fn verify_signed_action_parameters(&self, signed_parameters: &str) -> AppResult<Value> {
        decode::<Value>(signed_parameters, &self.decoding_key, &self.validation)
            .map(|token| token.claims)
            .map_err(|error| AppError::InvalidSignature(error.to_string()))
    }
}
