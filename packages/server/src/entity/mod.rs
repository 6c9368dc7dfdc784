pub mod account;
pub mod storage_quota;
pub mod storage_usage;
pub mod stored_file;
