use std::collections::HashMap;

use async_trait::async_trait;
use recordgate_application::RecordCounter;
use recordgate_core::{AppError, AppResult};
use recordgate_domain::{FilterTree, RecordsCounterParams};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

mod matching;

use matching::record_matches_filter;

/// JSON object row stored by [`InMemoryRecordStore`].
pub type StoredRecord = Map<String, Value>;

/// In-memory record store counting rows that match a filter tree.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<String, Vec<StoredRecord>>>,
}

impl InMemoryRecordStore {
    /// Creates a store from rows grouped by collection name.
    ///
    /// Every row must be a JSON object.
    pub fn from_collections(collections: HashMap<String, Vec<Value>>) -> AppResult<Self> {
        let mut records = HashMap::with_capacity(collections.len());
        for (collection_name, rows) in collections {
            let rows = rows
                .into_iter()
                .map(|row| into_stored_record(&collection_name, row))
                .collect::<AppResult<Vec<_>>>()?;
            records.insert(collection_name, rows);
        }

        Ok(Self {
            records: RwLock::new(records),
        })
    }
}

#[async_trait]
impl RecordCounter for InMemoryRecordStore {
    async fn count(&self, params: &RecordsCounterParams, filter: &FilterTree) -> AppResult<u64> {
        let records = self.records.read().await;
        let collection_name = params.collection_name.as_str();
        let Some(rows) = records.get(collection_name) else {
            return Err(AppError::NotFound(format!(
                "collection '{collection_name}' has no records store"
            )));
        };

        let matching = rows
            .iter()
            .filter(|row| record_matches_filter(row, filter))
            .count();
        debug!(
            collection = collection_name,
            timezone = params.timezone.as_str(),
            matching,
            "counted in-memory records"
        );

        u64::try_from(matching)
            .map_err(|error| AppError::Internal(format!("record count overflow: {error}")))
    }
}

fn into_stored_record(collection_name: &str, row: Value) -> AppResult<StoredRecord> {
    match row {
        Value::Object(record) => Ok(record),
        other => Err(AppError::Validation(format!(
            "collection '{collection_name}' contains a non-object record: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use recordgate_application::RecordCounter;
    use recordgate_core::{Actor, ActorId, AppError, NonEmptyString, RenderingId};
    use recordgate_domain::{CollectionDescriptor, FilterOperator, FilterTree, RecordsCounterParams};
    use serde_json::json;

    use super::InMemoryRecordStore;

    fn params(collection_name: &str) -> RecordsCounterParams {
        RecordsCounterParams::new(
            Actor::new(ActorId::new(1), RenderingId::new(1), "owner@example.com"),
            NonEmptyString::new(collection_name).unwrap_or_else(|_| panic!("non-empty name")),
            "UTC",
        )
    }

    fn store() -> InMemoryRecordStore {
        InMemoryRecordStore::from_collections(HashMap::from([(
            "books".to_owned(),
            vec![
                json!({"id": 1, "authorId": 1, "title": "Dune", "publisher": "acme", "price": 12.5, "publishedAt": "1965-08-01T00:00:00Z"}),
                json!({"id": 2, "authorId": 1, "title": "Dune Messiah", "publisher": "acme", "price": 9, "publishedAt": "1969-10-15T00:00:00+02:00"}),
                json!({"id": 3, "authorId": 2, "title": "Hyperion", "publisher": "other", "price": 15, "publishedAt": null}),
            ],
        )]))
        .unwrap_or_else(|_| panic!("valid rows"))
    }

    async fn count(filter: FilterTree) -> Option<u64> {
        store().count(&params("books"), &filter).await.ok()
    }

    #[tokio::test]
    async fn match_all_counts_every_row() {
        assert_eq!(count(FilterTree::match_all()).await, Some(3));
    }

    #[tokio::test]
    async fn string_ids_match_numeric_keys() {
        let Some(books) = CollectionDescriptor::new("books", "id", vec!["id".to_owned()]).ok()
        else {
            panic!("valid descriptor");
        };
        let filter = books
            .record_ids_filter(&["1", "3", "99"])
            .unwrap_or_else(|_| panic!("valid ids"));

        assert_eq!(count(filter).await, Some(2));
    }

    #[tokio::test]
    async fn composite_ids_match_every_key_part() {
        let Some(books) = CollectionDescriptor::new(
            "books",
            "id",
            vec!["id".to_owned(), "authorId".to_owned()],
        )
        .ok() else {
            panic!("valid descriptor");
        };
        let filter = books
            .record_ids_filter(&["1|1", "2|2", "3|2"])
            .unwrap_or_else(|_| panic!("valid ids"));

        assert_eq!(count(filter).await, Some(2));
    }

    #[tokio::test]
    async fn scoped_filters_intersect() {
        let filter = FilterTree::leaf("id", FilterOperator::In, json!(["1", "2", "3"])).intersect(
            &FilterTree::leaf("publisher", FilterOperator::Equal, json!("acme")),
        );

        assert_eq!(count(filter).await, Some(2));
    }

    #[tokio::test]
    async fn string_and_numeric_operators_apply() {
        assert_eq!(
            count(FilterTree::leaf("title", FilterOperator::StartsWith, json!("Dune"))).await,
            Some(2)
        );
        assert_eq!(
            count(FilterTree::leaf("title", FilterOperator::EndsWith, json!("ion"))).await,
            Some(1)
        );
        assert_eq!(
            count(FilterTree::leaf("title", FilterOperator::NotContains, json!("Dune"))).await,
            Some(1)
        );
        assert_eq!(
            count(FilterTree::leaf("price", FilterOperator::GreaterThan, json!(10))).await,
            Some(2)
        );
        assert_eq!(
            count(FilterTree::or(vec![
                FilterTree::leaf("price", FilterOperator::LessThan, json!(10)),
                FilterTree::leaf("publisher", FilterOperator::NotIn, json!(["acme"])),
            ]))
            .await,
            Some(2)
        );
    }

    #[tokio::test]
    async fn datetimes_compare_chronologically() {
        assert_eq!(
            count(FilterTree::leaf(
                "publishedAt",
                FilterOperator::LessThan,
                json!("1969-10-15T00:00:00Z")
            ))
            .await,
            Some(2)
        );
    }

    #[tokio::test]
    async fn presence_operators_treat_null_as_blank() {
        assert_eq!(
            count(FilterTree::leaf("publishedAt", FilterOperator::Blank, json!(null))).await,
            Some(1)
        );
        assert_eq!(
            count(FilterTree::leaf("publishedAt", FilterOperator::Present, json!(null))).await,
            Some(2)
        );
    }

    #[tokio::test]
    async fn unknown_collection_is_not_found() {
        let result = store().count(&params("authors"), &FilterTree::match_all()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn default_store_holds_no_collection() {
        let result = InMemoryRecordStore::default()
            .count(&params("books"), &FilterTree::match_all())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn empty_collection_counts_zero() {
        let store = InMemoryRecordStore::from_collections(HashMap::from([(
            "books".to_owned(),
            Vec::new(),
        )]))
        .unwrap_or_else(|_| panic!("valid rows"));

        let result = store.count(&params("books"), &FilterTree::match_all()).await;
        assert!(matches!(result, Ok(0)));
    }

    #[tokio::test]
    async fn non_object_rows_are_rejected() {
        let result = InMemoryRecordStore::from_collections(HashMap::from([(
            "books".to_owned(),
            vec![json!([1, 2])],
        )]));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
