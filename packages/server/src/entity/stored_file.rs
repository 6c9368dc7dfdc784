use common::storage::FileCategory;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `upload_status` value for rows whose blob write completed.
pub const STATUS_COMPLETED: &str = "completed";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stored_file")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Full object key in the bucket. Immutable; the handle clients use for
    /// download and delete.
    #[sea_orm(unique)]
    pub file_key: String,

    /// Original upload filename.
    pub file_name: String,

    pub category: FileCategory,

    /// Exact size counted during the upload spool.
    pub size_bytes: i64,

    /// MIME content type the object was stored with.
    pub mime_type: String,

    /// Inspection this file belongs to, when supplied at upload.
    pub inspection_id: Option<String>,

    /// Checklist item within the inspection, when supplied.
    pub inspection_item_id: Option<String>,

    /// Bucket the object was written to.
    pub bucket: String,

    /// Region of that bucket.
    pub region: String,

    /// Lifecycle marker ("pending", "completed", "failed"). This service
    /// only writes rows once the blob write succeeded.
    pub upload_status: String,

    pub account_id: Uuid,

    #[sea_orm(belongs_to, from = "account_id", to = "id")]
    pub account: BelongsTo<super::account::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
