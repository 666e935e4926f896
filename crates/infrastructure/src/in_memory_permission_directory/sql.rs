use recordgate_application::ChartPermissionError;

/// Rejects SQL that is blank, chains statements, or is not a SELECT.
pub(super) fn validate_chart_query(query: &str) -> Result<(), ChartPermissionError> {
    let statement = query.trim().trim_end_matches(';').trim_end();
    if statement.is_empty() {
        return Err(ChartPermissionError::EmptyQuery);
    }

    if statement.contains(';') {
        return Err(ChartPermissionError::ChainedQueries);
    }

    let is_select = statement
        .split_whitespace()
        .next()
        .is_some_and(|keyword| keyword.eq_ignore_ascii_case("select"));
    if !is_select {
        return Err(ChartPermissionError::NonSelectQuery);
    }

    Ok(())
}

/// Normalizes whitespace so equivalent queries compare equal.
pub(super) fn normalize_query(query: &str) -> String {
    query
        .trim()
        .trim_end_matches(';')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
