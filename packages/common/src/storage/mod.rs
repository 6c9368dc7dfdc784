mod category;
mod config;
mod error;
mod key;
mod traits;

pub mod memory;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use category::{FileCategory, ParseCategoryError};
pub use config::{StorageBackend, StorageConfig};
pub use error::StorageError;
pub use key::{derive_object_key, file_extension, tenant_slug};
pub use traits::{BoxReader, ObjectStore};
