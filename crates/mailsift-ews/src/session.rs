//! The Exchange Web Services connection the adapter drives.

use async_trait::async_trait;
use bytes::Bytes;

use crate::Result;
use crate::types::{Item, ItemId, ItemUpdate, SyncResult};

/// An authenticated EWS connection.
///
/// Folders are addressed by their display-name path below the message
/// folder root, e.g. `["Inbox", "Receipts"]`.
#[async_trait]
pub trait EwsSession: Send {
    /// Walks the folder tree and returns every mail folder path.
    async fn folders(&mut self) -> Result<Vec<Vec<String>>>;

    /// `SyncFolderItems` from `sync_state`, or from scratch when `None`.
    async fn sync_items(
        &mut self,
        folder: &[String],
        sync_state: Option<&str>,
    ) -> Result<SyncResult>;

    /// `FindItem` over the folder, shallow traversal, ids only.
    async fn find_items(&mut self, folder: &[String]) -> Result<Vec<ItemId>>;

    /// `GetItem` with the envelope properties, flags and categories.
    ///
    /// Items that no longer exist are left out of the result.
    async fn get_items(&mut self, ids: &[ItemId]) -> Result<Vec<Item>>;

    /// `GetItem` with `IncludeMimeContent`, `None` if the item is gone.
    async fn mime_content(&mut self, id: &ItemId) -> Result<Option<Bytes>>;

    /// `MoveItem`; returns the id of the moved item.
    async fn move_item(&mut self, id: &ItemId, folder: &[String]) -> Result<ItemId>;

    /// `UpdateItem` with `SetItemField` for the present fields.
    async fn update_item(&mut self, id: &ItemId, update: &ItemUpdate) -> Result<()>;
}
