use recordgate_domain::ChartRequest;
use tracing::warn;

use crate::ChartPermissionError;

use super::*;

/// Message returned for query charts without SQL.
pub const EMPTY_QUERY_MESSAGE: &str = "You cannot execute an empty SQL query.";
/// Message returned for query charts chaining statements.
pub const CHAINED_QUERIES_MESSAGE: &str = "You cannot chain SQL queries.";
/// Message returned for query charts running anything but SELECT.
pub const NON_SELECT_QUERY_MESSAGE: &str = "Only SELECT queries are allowed.";

impl AuthorizationService {
    /// Ensures the actor may render the chart in their rendering.
    pub async fn assert_can_retrieve_chart(
        &self,
        actor: &Actor,
        chart_request: &ChartRequest,
    ) -> AppResult<()> {
        let allowed = self
            .directory
            .can_execute_chart(actor.id(), actor.rendering_id(), chart_request)
            .await
            .map_err(chart_permission_error)?;

        if !allowed {
            warn!(
                actor_id = %actor.id(),
                rendering_id = %actor.rendering_id(),
                "chart denied"
            );
            return Err(AppError::Forbidden(format!(
                "actor '{}' may not retrieve this chart in rendering '{}'",
                actor.id(),
                actor.rendering_id()
            )));
        }

        Ok(())
    }
}

fn chart_permission_error(error: ChartPermissionError) -> AppError {
    match error {
        ChartPermissionError::EmptyQuery => AppError::BadRequest(EMPTY_QUERY_MESSAGE.to_owned()),
        ChartPermissionError::ChainedQueries => {
            AppError::BadRequest(CHAINED_QUERIES_MESSAGE.to_owned())
        }
        ChartPermissionError::NonSelectQuery => {
            AppError::BadRequest(NON_SELECT_QUERY_MESSAGE.to_owned())
        }
        ChartPermissionError::Other(error) => error,
    }
}
