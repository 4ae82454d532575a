//! List service: list and item mutations that emit domain events.

use std::sync::Arc;

use crate::domain::{ItemId, List, ListId, ListItem, UserId};
use crate::error::AppError;
use crate::events::{EventBus, Payload, Topic};
use crate::persistence::{ListRepository, NewItem, RepositoryError};

/// Producing service for the list aggregate.
///
/// Every mutation follows the same pattern: validate, write through the
/// repository, then publish on the [`EventBus`]. Publishing never blocks,
/// so callers return before projections have caught up.
#[derive(Debug, Clone)]
pub struct ListService {
    repository: Arc<dyn ListRepository>,
    event_bus: EventBus,
}

impl ListService {
    /// Creates a new `ListService`.
    #[must_use]
    pub fn new(repository: Arc<dyn ListRepository>, event_bus: EventBus) -> Self {
        Self {
            repository,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Creates an empty list owned by `user_id`.
    ///
    /// # Errors
    ///
    /// [`AppError::BadRequest`] for a blank name, [`AppError::Unexpected`]
    /// if storage fails.
    pub async fn create_list(&self, user_id: UserId, name: &str) -> Result<List, AppError> {
        let name = required("name", name)?;
        let list = self
            .repository
            .create_list(user_id, name)
            .await
            .map_err(|e| AppError::unexpected("creating list", e))?;

        self.event_bus.publish(Topic::ListCreated, list.id);
        tracing::info!(list_id = %list.id, %user_id, "list created");
        Ok(list)
    }

    /// Returns a list with its items.
    ///
    /// # Errors
    ///
    /// [`AppError::NotFound`] if the caller owns no such list.
    pub async fn get_list(&self, list_id: ListId, user_id: UserId) -> Result<List, AppError> {
        self.owned_list(list_id, user_id).await
    }

    /// Renames a list. Only the name is written; items added or removed
    /// meanwhile are kept.
    ///
    /// Returns the list as stored after the rename.
    ///
    /// # Errors
    ///
    /// [`AppError::BadRequest`] for a blank name, [`AppError::NotFound`]
    /// if the caller owns no such list.
    pub async fn rename_list(
        &self,
        list_id: ListId,
        user_id: UserId,
        name: &str,
    ) -> Result<List, AppError> {
        let name = required("name", name)?;
        self.owned_list(list_id, user_id).await?;
        match self.repository.rename_list(list_id, name).await {
            Ok(()) => {}
            Err(RepositoryError::ListNotFound(_)) => {
                return Err(AppError::NotFound(format!("list {list_id}")));
            }
            Err(e) => return Err(AppError::unexpected(format!("renaming list {list_id}"), e)),
        }

        self.event_bus.publish(Topic::ListUpdated, list_id);
        tracing::info!(%list_id, "list renamed");
        self.owned_list(list_id, user_id).await
    }

    /// Deletes a list and its items.
    ///
    /// # Errors
    ///
    /// [`AppError::NotFound`] if the caller owns no such list.
    pub async fn delete_list(&self, list_id: ListId, user_id: UserId) -> Result<(), AppError> {
        let deleted = self
            .repository
            .delete_list(list_id, user_id)
            .await
            .map_err(|e| AppError::unexpected(format!("deleting list {list_id}"), e))?;
        if !deleted {
            return Err(AppError::NotFound(format!("list {list_id}")));
        }

        self.event_bus.publish(Topic::ListDeleted, list_id);
        tracing::info!(%list_id, %user_id, "list deleted");
        Ok(())
    }

    /// Appends a new item at the end of a list.
    ///
    /// # Errors
    ///
    /// [`AppError::BadRequest`] for a blank title, [`AppError::NotFound`]
    /// if the caller owns no such list.
    pub async fn add_item(
        &self,
        list_id: ListId,
        user_id: UserId,
        title: &str,
        description: &str,
    ) -> Result<ListItem, AppError> {
        let title = required("title", title)?;
        let list = self.owned_list(list_id, user_id).await?;
        let new_item = NewItem {
            title: title.to_string(),
            description: description.trim().to_string(),
        };
        let item = self
            .repository
            .insert_item(list_id, new_item, list.next_position())
            .await
            .map_err(|e| AppError::unexpected(format!("adding item to list {list_id}"), e))?;

        self.event_bus.publish(Topic::ListUpdated, list_id);
        tracing::info!(%list_id, item_id = %item.id, position = item.position, "item added");
        Ok(item)
    }

    /// Removes one item from a list.
    ///
    /// # Errors
    ///
    /// [`AppError::NotFound`] if the caller owns no such list or the item
    /// is not in it.
    pub async fn delete_item(
        &self,
        list_id: ListId,
        item_id: ItemId,
        user_id: UserId,
    ) -> Result<(), AppError> {
        self.owned_list(list_id, user_id).await?;
        let deleted = self
            .repository
            .delete_item(list_id, item_id)
            .await
            .map_err(|e| AppError::unexpected(format!("deleting item {item_id}"), e))?;
        if !deleted {
            return Err(AppError::NotFound(format!("item {item_id} in list {list_id}")));
        }

        self.event_bus.publish(Topic::ListUpdated, list_id);
        tracing::info!(%list_id, %item_id, "item deleted");
        Ok(())
    }

    /// Moves an item from `origin_id` to the end of `destination_id`.
    ///
    /// Both lists must belong to `user_id`. Only the moved item is written:
    /// first it is removed from the origin, then stored in the destination.
    /// If the second write fails the item is put back into the origin at its
    /// old position. Other items of either list, including ones added
    /// concurrently, are never rewritten. On success a `listUpdated` event
    /// is published for the origin, then for the destination.
    ///
    /// Returns the item as stored in the destination.
    ///
    /// # Errors
    ///
    /// - [`AppError::BadRequest`] if either list does not exist for the
    ///   caller, if both IDs name the same list, or if the item is not in
    ///   the origin list. Nothing is written.
    /// - [`AppError::Unexpected`] if loading or writing fails.
    pub async fn move_list_item(
        &self,
        origin_id: ListId,
        item_id: ItemId,
        destination_id: ListId,
        user_id: UserId,
    ) -> Result<ListItem, AppError> {
        if origin_id == destination_id {
            return Err(AppError::BadRequest(format!(
                "item {item_id} is already in list {origin_id}"
            )));
        }

        let (origin, destination) = tokio::try_join!(
            self.repository.find_list(origin_id, user_id),
            self.repository.find_list(destination_id, user_id),
        )
        .map_err(|e| {
            AppError::unexpected(format!("loading lists {origin_id} and {destination_id}"), e)
        })?;

        let mut destination = destination.ok_or_else(|| {
            AppError::BadRequest(format!("destination list {destination_id} does not exist"))
        })?;
        let mut origin = origin.ok_or_else(|| {
            AppError::BadRequest(format!("origin list {origin_id} does not exist"))
        })?;

        let missing_item =
            || AppError::BadRequest(format!("item {item_id} does not exist in list {origin_id}"));
        let original = origin.take_item(item_id).ok_or_else(missing_item)?;
        let mut moved = original.clone();
        moved.position = destination.append_item(original.clone());
        moved.list_id = destination_id;

        let removed = self
            .repository
            .delete_item(origin_id, item_id)
            .await
            .map_err(|e| {
                AppError::unexpected(format!("removing item {item_id} from list {origin_id}"), e)
            })?;
        if !removed {
            return Err(missing_item());
        }

        if let Err(e) = self.repository.put_item(&moved).await {
            self.restore(&original).await;
            return Err(AppError::unexpected(
                format!("storing item {item_id} in list {destination_id}"),
                e,
            ));
        }

        self.event_bus.publish(Topic::ListUpdated, origin_id);
        self.event_bus.publish(Topic::ListUpdated, destination_id);

        tracing::info!(
            %item_id,
            from = %origin_id,
            to = %destination_id,
            position = moved.position,
            "item moved"
        );
        Ok(moved)
    }

    /// Asks the pipeline to rebuild every search document.
    ///
    /// Returns the number of subscribers the request reached.
    pub fn request_full_reindex(&self) -> usize {
        let reached = self
            .event_bus
            .publish(Topic::IndexAllListsRequested, Payload::Empty);
        tracing::info!(subscribers = reached, "full reindex requested");
        reached
    }

    async fn owned_list(&self, list_id: ListId, user_id: UserId) -> Result<List, AppError> {
        self.repository
            .find_list(list_id, user_id)
            .await
            .map_err(|e| AppError::unexpected(format!("loading list {list_id}"), e))?
            .ok_or_else(|| AppError::NotFound(format!("list {list_id}")))
    }

    /// Compensating write after a failed move: puts `item` back where it
    /// was. Failure here is logged only; the caller already reports the
    /// original error.
    async fn restore(&self, item: &ListItem) {
        match self.repository.put_item(item).await {
            Ok(()) => tracing::warn!(item_id = %item.id, list_id = %item.list_id, "move rolled back"),
            Err(e) => tracing::error!(
                item_id = %item.id,
                list_id = %item.list_id,
                error = %e,
                "rollback of moved item failed; item is missing from both lists"
            ),
        }
    }
}

/// Trims `value`, rejecting it when nothing is left.
fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be blank")));
    }
    Ok(trimmed)
}
