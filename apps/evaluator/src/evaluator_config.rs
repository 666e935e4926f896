use std::env;
use std::path::PathBuf;

use recordgate_core::AppError;
use recordgate_infrastructure::MIN_SIGNING_SECRET_LENGTH;
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_CONCURRENT_COUNTS: usize = 8;
const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorConfig {
    pub fixture_path: PathBuf,
    pub signing_secret: Option<String>,
    pub max_concurrent_counts: usize,
    pub timezone: String,
}

impl EvaluatorConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let fixture_path = required_non_empty(&lookup, "RECORDGATE_FIXTURE_PATH")?;

        let signing_secret = lookup("RECORDGATE_SIGNING_SECRET")
            .filter(|value| !value.trim().is_empty());
        if let Some(secret) = &signing_secret
            && secret.len() < MIN_SIGNING_SECRET_LENGTH
        {
            return Err(AppError::Validation(format!(
                "RECORDGATE_SIGNING_SECRET must be at least {MIN_SIGNING_SECRET_LENGTH} characters"
            )));
        }

        let max_concurrent_counts = lookup("RECORDGATE_MAX_CONCURRENT_COUNTS")
            .map(|value| {
                value
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|count| *count >= 1)
                    .ok_or_else(|| {
                        AppError::Validation(format!(
                            "RECORDGATE_MAX_CONCURRENT_COUNTS must be a positive integer, got '{value}'"
                        ))
                    })
            })
            .transpose()?
            .unwrap_or(DEFAULT_MAX_CONCURRENT_COUNTS);

        let timezone = lookup("RECORDGATE_TIMEZONE")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_owned());

        Ok(Self {
            fixture_path: PathBuf::from(fixture_path),
            signing_secret,
            max_concurrent_counts,
            timezone,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, AppError> {
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
