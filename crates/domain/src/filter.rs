use std::str::FromStr;

use recordgate_core::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator of a filter leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// JSON equality.
    Equal,
    /// JSON inequality.
    NotEqual,
    /// Strictly greater than.
    GreaterThan,
    /// Strictly less than.
    LessThan,
    /// Membership in a list of values.
    In,
    /// Absence from a list of values.
    NotIn,
    /// Substring match.
    Contains,
    /// Negated substring match.
    NotContains,
    /// String prefix match.
    StartsWith,
    /// String suffix match.
    EndsWith,
    /// Field holds a non-null value.
    Present,
    /// Field is null, missing, or an empty string.
    Blank,
}

impl FilterOperator {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "not_equal",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Present => "present",
            Self::Blank => "blank",
        }
    }
}

impl FromStr for FilterOperator {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "equal" => Ok(Self::Equal),
            "not_equal" => Ok(Self::NotEqual),
            "greater_than" => Ok(Self::GreaterThan),
            "less_than" => Ok(Self::LessThan),
            "in" => Ok(Self::In),
            "not_in" => Ok(Self::NotIn),
            "contains" => Ok(Self::Contains),
            "not_contains" => Ok(Self::NotContains),
            "starts_with" => Ok(Self::StartsWith),
            "ends_with" => Ok(Self::EndsWith),
            "present" => Ok(Self::Present),
            "blank" => Ok(Self::Blank),
            _ => Err(AppError::Validation(format!(
                "unknown filter operator '{value}'"
            ))),
        }
    }
}

/// Logical combination mode of a filter branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterAggregator {
    /// Every child must match.
    And,
    /// At least one child must match.
    Or,
}

/// One `{field, operator, value}` comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterLeaf {
    /// Field name on the target collection.
    pub field: String,
    /// Comparison operator.
    pub operator: FilterOperator,
    /// Operand; `null` for unary operators.
    #[serde(default)]
    pub value: Value,
}

/// One `{aggregator, conditions}` logical group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterBranch {
    /// Combination mode for `conditions`.
    pub aggregator: FilterAggregator,
    /// Ordered child trees.
    pub conditions: Vec<FilterTree>,
}

/// Recursive boolean expression over record fields.
///
/// Serialized as the plain tree shape used by permission directories:
/// leaves are `{field, operator, value}` and branches are
/// `{aggregator, conditions}`. Equality is structural and order-sensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterTree {
    /// Nested logical group.
    Branch(FilterBranch),
    /// Single comparison.
    Leaf(FilterLeaf),
}

impl FilterTree {
    /// Creates a comparison leaf.
    #[must_use]
    pub fn leaf(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self::Leaf(FilterLeaf {
            field: field.into(),
            operator,
            value,
        })
    }

    /// Creates an `and` branch.
    #[must_use]
    pub fn and(conditions: Vec<FilterTree>) -> Self {
        Self::Branch(FilterBranch {
            aggregator: FilterAggregator::And,
            conditions,
        })
    }

    /// Creates an `or` branch.
    #[must_use]
    pub fn or(conditions: Vec<FilterTree>) -> Self {
        Self::Branch(FilterBranch {
            aggregator: FilterAggregator::Or,
            conditions,
        })
    }

    /// Creates the empty `and` branch, which every record satisfies.
    #[must_use]
    pub fn match_all() -> Self {
        Self::and(Vec::new())
    }

    /// Returns whether this tree is the empty `and` branch.
    #[must_use]
    pub fn is_match_all(&self) -> bool {
        matches!(
            self,
            Self::Branch(FilterBranch {
                aggregator: FilterAggregator::And,
                conditions,
            }) if conditions.is_empty()
        )
    }

    /// Combines two trees with logical AND, keeping both operands intact.
    #[must_use]
    pub fn intersect(&self, other: &FilterTree) -> Self {
        Self::and(vec![self.clone(), other.clone()])
    }

    /// Combines this tree with an optional tree; `None` leaves it unchanged.
    #[must_use]
    pub fn intersect_optional(&self, other: Option<&FilterTree>) -> Self {
        match other {
            Some(other) => self.intersect(other),
            None => self.clone(),
        }
    }
}
