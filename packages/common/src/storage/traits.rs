use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// An S3-compatible object store addressed by hierarchical string keys.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(key, reader, content_type).await
    }

    /// Stream data from an async reader into the object at `key`.
    async fn put_stream(
        &self,
        key: &str,
        reader: BoxReader,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Produce a time-limited URL granting read access to `key`.
    ///
    /// The URL stops working once `expiry_secs` have elapsed; expiry is
    /// enforced by the store, not by this service.
    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, StorageError>;

    /// Delete the object at `key`.
    ///
    /// Deleting a key that does not exist is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Check whether an object exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Name of the backing bucket.
    fn bucket(&self) -> &str;

    /// Region the backing bucket lives in.
    fn region(&self) -> &str;
}
