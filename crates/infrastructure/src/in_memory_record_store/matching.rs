use std::cmp::Ordering;

use chrono::DateTime;
use recordgate_domain::{FilterAggregator, FilterLeaf, FilterOperator, FilterTree};
use serde_json::Value;

use super::StoredRecord;

/// Relation fields are addressed as `relation:field`.
const RELATION_PATH_SEPARATOR: char = ':';

pub(super) fn record_matches_filter(record: &StoredRecord, filter: &FilterTree) -> bool {
    match filter {
        FilterTree::Leaf(leaf) => record_leaf_matches(record, leaf),
        FilterTree::Branch(branch) => {
            let evaluate = |node: &FilterTree| record_matches_filter(record, node);
            match branch.aggregator {
                FilterAggregator::And => branch.conditions.iter().all(evaluate),
                FilterAggregator::Or => branch.conditions.iter().any(evaluate),
            }
        }
    }
}

fn resolve_field_value<'a>(record: &'a StoredRecord, field: &str) -> Option<&'a Value> {
    let mut segments = field.split(RELATION_PATH_SEPARATOR);
    let first = record.get(segments.next()?)?;
    segments.try_fold(first, |value, segment| value.as_object()?.get(segment))
}

fn record_leaf_matches(record: &StoredRecord, leaf: &FilterLeaf) -> bool {
    let value = resolve_field_value(record, leaf.field.as_str());

    match leaf.operator {
        FilterOperator::Present => !is_blank(value),
        FilterOperator::Blank => is_blank(value),
        FilterOperator::NotEqual => !value.is_some_and(|value| values_equal(value, &leaf.value)),
        FilterOperator::NotIn => !value.is_some_and(|value| value_in_list(value, &leaf.value)),
        FilterOperator::NotContains => !value.is_some_and(|value| {
            string_pair(value, &leaf.value)
                .is_some_and(|(stored, expected)| stored.contains(expected))
        }),
        _ => value.is_some_and(|value| leaf_matches_value(value, leaf)),
    }
}

fn leaf_matches_value(value: &Value, leaf: &FilterLeaf) -> bool {
    match leaf.operator {
        FilterOperator::Equal => values_equal(value, &leaf.value),
        FilterOperator::In => value_in_list(value, &leaf.value),
        FilterOperator::GreaterThan => compare_filter_values(value, &leaf.value).is_gt(),
        FilterOperator::LessThan => compare_filter_values(value, &leaf.value).is_lt(),
        FilterOperator::Contains => string_pair(value, &leaf.value)
            .is_some_and(|(stored, expected)| stored.contains(expected)),
        FilterOperator::StartsWith => string_pair(value, &leaf.value)
            .is_some_and(|(stored, expected)| stored.starts_with(expected)),
        FilterOperator::EndsWith => string_pair(value, &leaf.value)
            .is_some_and(|(stored, expected)| stored.ends_with(expected)),
        FilterOperator::NotEqual
        | FilterOperator::NotIn
        | FilterOperator::NotContains
        | FilterOperator::Present
        | FilterOperator::Blank => false,
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

fn string_pair<'a>(stored: &'a Value, expected: &'a Value) -> Option<(&'a str, &'a str)> {
    stored.as_str().zip(expected.as_str())
}

fn value_in_list(value: &Value, list: &Value) -> bool {
    list.as_array()
        .is_some_and(|candidates| candidates.iter().any(|candidate| values_equal(value, candidate)))
}

/// JSON equality that also matches numbers against their string form,
/// since record ids reach filters as strings.
fn values_equal(stored: &Value, expected: &Value) -> bool {
    if stored == expected {
        return true;
    }

    match (stored, expected) {
        (Value::Number(number), Value::String(text))
        | (Value::String(text), Value::Number(number)) => number.to_string() == *text,
        _ => false,
    }
}

fn compare_filter_values(stored: &Value, expected: &Value) -> Ordering {
    if let (Some(left), Some(right)) = (stored.as_f64(), expected.as_f64()) {
        return left.partial_cmp(&right).unwrap_or(Ordering::Equal);
    }

    let Some((left, right)) = string_pair(stored, expected) else {
        return Ordering::Equal;
    };

    match (
        DateTime::parse_from_rfc3339(left),
        DateTime::parse_from_rfc3339(right),
    ) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        _ => left.cmp(right),
    }
}
