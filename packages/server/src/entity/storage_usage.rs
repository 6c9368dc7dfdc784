use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-account storage counters.
///
/// Maintained by database triggers on `stored_file` (see
/// `database::ensure_usage_triggers`); this service only ever reads it.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "storage_usage")]
pub struct Model {
    /// One row per account.
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: Uuid,

    /// Total bytes stored. Always `photo_bytes + report_bytes`.
    pub total_bytes: i64,

    pub photo_bytes: i64,

    pub report_bytes: i64,

    pub file_count: i64,

    /// Last time the triggers touched the counters.
    pub calculated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
