use std::collections::HashMap;
use std::fs;
use std::path::Path;

use recordgate_core::{Actor, ActorId, AppError, AppResult};
use recordgate_domain::{CollectionDescriptor, FilterTree};
use recordgate_infrastructure::DirectorySnapshot;
use serde::Deserialize;
use serde_json::Value;

/// Collections, rows, scopes and permissions an evaluation runs against.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub collections: Vec<CollectionDescriptor>,
    #[serde(default)]
    pub records: HashMap<String, Vec<Value>>,
    #[serde(default)]
    pub scopes: HashMap<String, FilterTree>,
    pub actors: Vec<Actor>,
    pub directory: DirectorySnapshot,
}

impl Fixture {
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|error| {
            AppError::Internal(format!("failed to read fixture '{}': {error}", path.display()))
        })?;

        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> AppResult<Self> {
        serde_json::from_str(contents)
            .map_err(|error| AppError::Validation(format!("invalid fixture: {error}")))
    }

    pub fn actor(&self, actor_id: ActorId) -> AppResult<&Actor> {
        self.actors
            .iter()
            .find(|actor| actor.id() == actor_id)
            .ok_or_else(|| AppError::NotFound(format!("actor '{actor_id}' is not in the fixture")))
    }

    pub fn collection(&self, collection_name: &str) -> AppResult<&CollectionDescriptor> {
        self.collections
            .iter()
            .find(|collection| collection.name().as_str() == collection_name)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "collection '{collection_name}' is not in the fixture"
                ))
            })
    }

    pub fn scope(&self, collection_name: &str) -> Option<&FilterTree> {
        self.scopes.get(collection_name)
    }
}
