//! Folder creation and deletion.

use tracing::info;

use crate::error::{BucketError, Result};
use crate::events::TransferEvent;
use crate::session::{DirectoryPrefix, Session};

impl Session {
    /// Create a folder named `name` under `prefix`.
    ///
    /// # Returns
    /// The new folder's key (with trailing slash)
    pub async fn create_folder(&self, prefix: &DirectoryPrefix, name: &str) -> Result<String> {
        let name = name.trim().trim_matches('/');
        if name.is_empty() {
            return Err(BucketError::Custom("Folder name must not be empty".to_string()));
        }

        let folder_name = prefix.join(name);
        self.api.create_folder(&folder_name).await?;
        info!(folder = %folder_name, "folder created");

        self.emit(TransferEvent::RefreshListing {
            prefix: prefix.to_string(),
        });
        Ok(format!("{}/", folder_name))
    }

    /// Delete one object.
    pub async fn delete_file(&self, key: &str) -> Result<()> {
        self.api.delete(key).await?;
        info!(key, "file deleted");
        self.emit(TransferEvent::RefreshListing {
            prefix: DirectoryPrefix::parent_of(key).to_string(),
        });
        Ok(())
    }

    /// Delete a folder and everything under it.
    pub async fn delete_folder(&self, key: &str) -> Result<()> {
        if key.trim_matches('/').is_empty() {
            return Err(BucketError::Custom("Refusing to delete the root folder".to_string()));
        }
        self.api.delete_folder(key).await?;
        info!(key, "folder deleted");
        self.emit(TransferEvent::RefreshListing {
            prefix: DirectoryPrefix::parent_of(key).to_string(),
        });
        Ok(())
    }
}
