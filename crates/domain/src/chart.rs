use serde::{Deserialize, Serialize};

use crate::filter::FilterTree;

/// Chart rendering kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartType {
    /// Single aggregated value.
    Value,
    /// Value compared to an objective.
    Objective,
    /// Ratio of two values.
    Percentage,
    /// Distribution grouped by a field.
    Pie,
    /// Time series.
    Line,
    /// Ranked aggregation over a relation.
    Leaderboard,
}

/// Aggregation applied by a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartAggregator {
    /// Row count.
    Count,
    /// Field sum.
    Sum,
    /// Field average.
    Avg,
    /// Field maximum.
    Max,
    /// Field minimum.
    Min,
}

/// Chart the caller asks to render.
///
/// Either a collection-based chart (`source_collection_name` plus
/// aggregation) or a raw `query` chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    /// Chart kind.
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    /// Collection the chart aggregates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_collection_name: Option<String>,
    /// Field the aggregation applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_field_name: Option<String>,
    /// Aggregation function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregator: Option<ChartAggregator>,
    /// Field the chart groups by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by_field_name: Option<String>,
    /// Record filter applied before aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterTree>,
    /// Raw SQL for query charts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl ChartRequest {
    /// Creates a collection-based value chart.
    #[must_use]
    pub fn value(
        source_collection_name: impl Into<String>,
        aggregator: ChartAggregator,
        aggregate_field_name: Option<String>,
    ) -> Self {
        Self {
            chart_type: ChartType::Value,
            source_collection_name: Some(source_collection_name.into()),
            aggregate_field_name,
            aggregator: Some(aggregator),
            group_by_field_name: None,
            filter: None,
            query: None,
        }
    }

    /// Creates a raw query chart.
    #[must_use]
    pub fn query(chart_type: ChartType, query: impl Into<String>) -> Self {
        Self {
            chart_type,
            source_collection_name: None,
            aggregate_field_name: None,
            aggregator: None,
            group_by_field_name: None,
            filter: None,
            query: Some(query.into()),
        }
    }
}
