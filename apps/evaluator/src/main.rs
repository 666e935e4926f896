//! Recordgate evaluator composition root.

#![forbid(unsafe_code)]

mod evaluation;
mod evaluator_config;
mod fixture;

use std::env;

use recordgate_core::AppError;
use tracing::{info, warn};

use crate::evaluation::{EvaluationRequest, Evaluator};
use crate::evaluator_config::{EvaluatorConfig, init_tracing};
use crate::fixture::Fixture;

const USAGE: &str = "usage: recordgate-evaluator '<evaluation request json>'";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(error) = run().await {
        warn!(
            kind = error.kind(),
            status = error.status_code(),
            error = %error,
            "request denied"
        );
        return Err(error);
    }

    Ok(())
}

async fn run() -> Result<(), AppError> {
    let config = EvaluatorConfig::load()?;
    let raw_request = env::args()
        .nth(1)
        .ok_or_else(|| AppError::Validation(USAGE.to_owned()))?;
    let request = EvaluationRequest::parse(&raw_request)?;
    let operation = request.operation();

    let fixture = Fixture::load(&config.fixture_path)?;
    let evaluator = Evaluator::new(fixture, &config)?;
    info!(
        fixture = %config.fixture_path.display(),
        operation,
        "evaluating request"
    );

    if let Some(payload) = evaluator.evaluate(request).await? {
        let rendered = serde_json::to_string_pretty(&payload)
            .map_err(|error| AppError::Internal(format!("failed to render payload: {error}")))?;
        println!("{rendered}");
    }
    info!(operation, "request allowed");

    Ok(())
}
