use recordgate_domain::CollectionActionEvent;
use tracing::{debug, warn};

use super::*;

impl AuthorizationService {
    /// Ensures the actor may list records, and run `segment_query` when given.
    pub async fn assert_can_browse(
        &self,
        actor: &Actor,
        collection_name: &str,
        segment_query: Option<&str>,
    ) -> AppResult<()> {
        self.assert_can_on_collection(actor, collection_name, CollectionActionEvent::Browse)
            .await?;

        let Some(segment_query) = segment_query else {
            return Ok(());
        };

        if !self
            .directory
            .can_execute_segment_query(
                actor.id(),
                collection_name,
                actor.rendering_id(),
                segment_query,
            )
            .await?
        {
            warn!(
                actor_id = %actor.id(),
                rendering_id = %actor.rendering_id(),
                collection = collection_name,
                "segment query denied"
            );
            return Err(forbidden(actor, "run this segment query on", collection_name));
        }

        Ok(())
    }

    /// Ensures the actor may read single records.
    pub async fn assert_can_read(&self, actor: &Actor, collection_name: &str) -> AppResult<()> {
        self.assert_can_on_collection(actor, collection_name, CollectionActionEvent::Read)
            .await
    }

    /// Ensures the actor may create records.
    pub async fn assert_can_add(&self, actor: &Actor, collection_name: &str) -> AppResult<()> {
        self.assert_can_on_collection(actor, collection_name, CollectionActionEvent::Add)
            .await
    }

    /// Ensures the actor may update records.
    pub async fn assert_can_edit(&self, actor: &Actor, collection_name: &str) -> AppResult<()> {
        self.assert_can_on_collection(actor, collection_name, CollectionActionEvent::Edit)
            .await
    }

    /// Ensures the actor may delete records.
    pub async fn assert_can_delete(&self, actor: &Actor, collection_name: &str) -> AppResult<()> {
        self.assert_can_on_collection(actor, collection_name, CollectionActionEvent::Delete)
            .await
    }

    /// Ensures the actor may export records.
    pub async fn assert_can_export(&self, actor: &Actor, collection_name: &str) -> AppResult<()> {
        self.assert_can_on_collection(actor, collection_name, CollectionActionEvent::Export)
            .await
    }

    /// Ensures the actor holds the coarse collection permission for `event`.
    pub async fn assert_can_on_collection(
        &self,
        actor: &Actor,
        collection_name: &str,
        event: CollectionActionEvent,
    ) -> AppResult<()> {
        let allowed = self
            .directory
            .can_on_collection(actor.id(), collection_name, event)
            .await?;

        if !allowed {
            warn!(
                actor_id = %actor.id(),
                collection = collection_name,
                event = event.as_str(),
                "collection permission denied"
            );
            return Err(forbidden(actor, event.as_str(), collection_name));
        }

        debug!(
            actor_id = %actor.id(),
            collection = collection_name,
            event = event.as_str(),
            "collection permission granted"
        );
        Ok(())
    }
}
