pub mod storage;

pub use storage::{FileCategory, ObjectStore, StorageError};
