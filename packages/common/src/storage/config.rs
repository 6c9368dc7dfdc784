use serde::Deserialize;

/// Which object store implementation to run against.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Any S3-compatible store (AWS S3, MinIO, Ceph RGW).
    S3,
    /// In-memory store for tests and local development.
    Memory,
}

/// Object storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Backend implementation. Default: "s3".
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Bucket all objects are written to. Default: "pantry-uploads".
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Bucket region. Default: "us-east-1".
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible stores (e.g. MinIO). When unset the
    /// region's AWS endpoint is used.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Static access key. When unset, credentials come from the environment.
    #[serde(default)]
    pub access_key: Option<String>,
    /// Static secret key. When unset, credentials come from the environment.
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Use path-style addressing (`endpoint/bucket/key`). Required by MinIO.
    /// Default: false.
    #[serde(default)]
    pub force_path_style: bool,
    /// Lifetime of presigned download URLs in seconds. Default: 300.
    #[serde(default = "default_presign_ttl_secs")]
    pub presign_ttl_secs: u32,
    /// Per-file upload size cap in bytes. Default: 128 MiB.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

fn default_backend() -> StorageBackend {
    StorageBackend::S3
}
fn default_bucket() -> String {
    "pantry-uploads".into()
}
fn default_region() -> String {
    "us-east-1".into()
}
fn default_presign_ttl_secs() -> u32 {
    300
}
fn default_max_upload_bytes() -> u64 {
    128 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            bucket: default_bucket(),
            region: default_region(),
            endpoint: None,
            access_key: None,
            secret_key: None,
            force_path_style: false,
            presign_ttl_secs: default_presign_ttl_secs(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}
