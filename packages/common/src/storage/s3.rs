use async_trait::async_trait;
use s3::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;

use super::config::StorageConfig;
use super::error::StorageError;
use super::traits::{BoxReader, ObjectStore};

/// Object store backed by any S3-compatible service via `rust-s3`.
///
/// Works against AWS S3 with ambient credentials, or against MinIO and other
/// self-hosted stores through a custom endpoint with path-style addressing.
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    bucket_name: String,
    region_name: String,
}

impl S3ObjectStore {
    /// Build a store from configuration. Fails when the region or the
    /// credentials cannot be resolved.
    pub fn from_config(cfg: &StorageConfig) -> Result<Self, StorageError> {
        let region = match &cfg.endpoint {
            Some(endpoint) => Region::Custom {
                region: cfg.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => cfg
                .region
                .parse()
                .map_err(|_| StorageError::Config(format!("invalid region '{}'", cfg.region)))?,
        };

        let credentials = match (&cfg.access_key, &cfg.secret_key) {
            (Some(access), Some(secret)) => {
                Credentials::new(Some(access), Some(secret), None, None, None)
            }
            // Fall back to the environment/profile/instance chain.
            _ => Credentials::default(),
        }
        .map_err(|e| StorageError::Config(format!("credentials: {e}")))?;

        let mut bucket = Bucket::new(&cfg.bucket, region, credentials)
            .map_err(|e| StorageError::Config(e.to_string()))?;
        if cfg.force_path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            bucket_name: cfg.bucket.clone(),
            region_name: cfg.region.clone(),
        })
    }
}

impl From<S3Error> for StorageError {
    fn from(err: S3Error) -> Self {
        StorageError::Unavailable(err.to_string())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_stream(
        &self,
        key: &str,
        mut reader: BoxReader,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let response = self
            .bucket
            .put_object_stream_with_content_type(&mut reader, key, content_type)
            .await?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Unavailable(format!(
                "put of '{key}' returned HTTP {status}"
            )));
        }

        Ok(())
    }

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, StorageError> {
        let url = self.bucket.presign_get(key, expiry_secs, None).await?;
        Ok(url)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let response = self.bucket.delete_object(key).await?;

        // S3 answers 204 for deletes, including of keys that never existed;
        // some compatible stores answer 404 instead. Both count as gone.
        match response.status_code() {
            200 | 204 | 404 => Ok(()),
            status => Err(StorageError::Unavailable(format!(
                "delete of '{key}' returned HTTP {status}"
            ))),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match self.bucket.head_object(key).await {
            Ok((_, 200)) => Ok(true),
            Ok((_, 404)) => Ok(false),
            Ok((_, status)) => Err(StorageError::Unavailable(format!(
                "head of '{key}' returned HTTP {status}"
            ))),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn bucket(&self) -> &str {
        &self.bucket_name
    }

    fn region(&self) -> &str {
        &self.region_name
    }
}
