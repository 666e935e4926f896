use std::str::FromStr;

use recordgate_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::{FilterOperator, FilterTree};

/// Separator between key parts of a composite record identifier.
pub const COMPOSITE_ID_SEPARATOR: char = '|';

/// Coarse collection-level operations gated by the permission directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionActionEvent {
    /// List records.
    Browse,
    /// Read one record.
    Read,
    /// Create records.
    Add,
    /// Update records.
    Edit,
    /// Remove records.
    Delete,
    /// Export records.
    Export,
}

impl CollectionActionEvent {
    /// Returns a stable storage value for this event.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Browse => "browse",
            Self::Read => "read",
            Self::Add => "add",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Export => "export",
        }
    }

    /// Returns all known events.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[CollectionActionEvent] = &[
            CollectionActionEvent::Browse,
            CollectionActionEvent::Read,
            CollectionActionEvent::Add,
            CollectionActionEvent::Edit,
            CollectionActionEvent::Delete,
            CollectionActionEvent::Export,
        ];

        ALL
    }
}

impl FromStr for CollectionActionEvent {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "browse" => Ok(Self::Browse),
            "read" => Ok(Self::Read),
            "add" => Ok(Self::Add),
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            "export" => Ok(Self::Export),
            _ => Err(AppError::Validation(format!(
                "unknown collection action event '{value}'"
            ))),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionDescriptorInput {
    name: NonEmptyString,
    id_field: String,
    primary_keys: Vec<String>,
    #[serde(default)]
    is_virtual: bool,
}

/// Schema facts about a collection needed to address its records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CollectionDescriptorInput")]
pub struct CollectionDescriptor {
    name: NonEmptyString,
    id_field: String,
    primary_keys: Vec<String>,
    is_virtual: bool,
}

impl CollectionDescriptor {
    /// Creates a descriptor for a collection backed by storage.
    pub fn new(
        name: impl Into<String>,
        id_field: impl Into<String>,
        primary_keys: Vec<String>,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        if primary_keys.is_empty() {
            return Err(AppError::Validation(format!(
                "collection '{name}' must declare at least one primary key"
            )));
        }
        if primary_keys.iter().any(|key| key.trim().is_empty()) {
            return Err(AppError::Validation(format!(
                "collection '{name}' declares an empty primary key name"
            )));
        }

        Ok(Self {
            name,
            id_field: id_field.into(),
            primary_keys,
            is_virtual: false,
        })
    }

    /// Returns the descriptor flagged as virtual (no backing storage).
    #[must_use]
    pub fn into_virtual(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    /// Returns the collection name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the ordered primary-key field names.
    #[must_use]
    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    /// Returns whether records are addressed by more than one key field.
    #[must_use]
    pub fn is_composite_primary(&self) -> bool {
        self.primary_keys.len() > 1
    }

    /// Returns whether the collection has no underlying storage.
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    /// Splits a record identifier into `(key field, key value)` pairs.
    ///
    /// Single-key identifiers are never split, so they may contain the
    /// separator character.
    pub fn parse_record_id<'a>(&'a self, record_id: &str) -> AppResult<Vec<(&'a str, String)>> {
        if !self.is_composite_primary() {
            return Ok(self
                .primary_keys
                .iter()
                .map(|key| (key.as_str(), record_id.to_owned()))
                .collect());
        }

        let parts: Vec<&str> = record_id.split(COMPOSITE_ID_SEPARATOR).collect();
        if parts.len() != self.primary_keys.len() {
            return Err(AppError::Validation(format!(
                "record id '{record_id}' has {} key parts but collection '{}' expects {}",
                parts.len(),
                self.name,
                self.primary_keys.len()
            )));
        }

        Ok(self
            .primary_keys
            .iter()
            .map(String::as_str)
            .zip(parts.into_iter().map(str::to_owned))
            .collect())
    }

    /// Builds a filter matching exactly the records with one of `record_ids`.
    pub fn record_ids_filter<S: AsRef<str>>(&self, record_ids: &[S]) -> AppResult<FilterTree> {
        if let [primary_key] = self.primary_keys.as_slice() {
            let values = record_ids
                .iter()
                .map(|record_id| Value::String(record_id.as_ref().to_owned()))
                .collect();
            return Ok(FilterTree::leaf(
                primary_key.as_str(),
                FilterOperator::In,
                Value::Array(values),
            ));
        }

        let conditions = record_ids
            .iter()
            .map(|record_id| {
                let key_conditions = self
                    .parse_record_id(record_id.as_ref())?
                    .into_iter()
                    .map(|(field, value)| {
                        FilterTree::leaf(field, FilterOperator::Equal, Value::String(value))
                    })
                    .collect();
                Ok(FilterTree::and(key_conditions))
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(FilterTree::or(conditions))
    }

    /// Builds a filter matching every record except those in `record_ids`.
    pub fn excluding_record_ids_filter<S: AsRef<str>>(
        &self,
        record_ids: &[S],
    ) -> AppResult<FilterTree> {
        if let [primary_key] = self.primary_keys.as_slice() {
            let values = record_ids
                .iter()
                .map(|record_id| Value::String(record_id.as_ref().to_owned()))
                .collect();
            return Ok(FilterTree::leaf(
                primary_key.as_str(),
                FilterOperator::NotIn,
                Value::Array(values),
            ));
        }

        let conditions = record_ids
            .iter()
            .map(|record_id| {
                let key_conditions = self
                    .parse_record_id(record_id.as_ref())?
                    .into_iter()
                    .map(|(field, value)| {
                        FilterTree::leaf(field, FilterOperator::NotEqual, Value::String(value))
                    })
                    .collect();
                Ok(FilterTree::or(key_conditions))
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(FilterTree::and(conditions))
    }
}

impl TryFrom<CollectionDescriptorInput> for CollectionDescriptor {
    type Error = AppError;

    fn try_from(input: CollectionDescriptorInput) -> Result<Self, Self::Error> {
        let descriptor = Self::new(input.name, input.id_field, input.primary_keys)?;
        Ok(if input.is_virtual {
            descriptor.into_virtual()
        } else {
            descriptor
        })
    }
}
