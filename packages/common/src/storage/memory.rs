use std::collections::HashMap;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;

use super::error::StorageError;
use super::traits::{BoxReader, ObjectStore};

/// In-memory object store for tests and local development.
///
/// Presigned URLs point at a reserved `.invalid` host and carry the expiry as
/// a query parameter; they are inspectable but never fetchable.
pub struct MemoryObjectStore {
    bucket: String,
    region: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

struct StoredObject {
    data: Vec<u8>,
    content_type: String,
}

impl MemoryObjectStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self {
            bucket: "pantry-dev".to_string(),
            region: "local".to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored objects.
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Raw bytes stored under `key`, if present.
    pub async fn object_bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).map(|o| o.data.clone())
    }

    /// Content type recorded for `key`, if present.
    pub async fn object_content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.content_type.clone())
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_stream(
        &self,
        key: &str,
        mut reader: BoxReader,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;

        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );

        Ok(())
    }

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, StorageError> {
        // Presigning is pure URL construction, like the real thing; whether
        // the key exists only matters when the URL is fetched.
        Ok(format!(
            "http://{}.object-store.invalid/{key}?expires_in={expiry_secs}",
            self.bucket
        ))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.objects.read().await.contains_key(key))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn region(&self) -> &str {
        &self.region
    }
}
