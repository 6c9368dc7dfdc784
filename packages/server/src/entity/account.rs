use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Workspace display name; source of the object key slug.
    pub name: String,

    /// User that owns this account. One account per user.
    #[sea_orm(unique)]
    pub owner_user_id: Uuid,

    /// Billing tier; joins to `storage_quota.tier`.
    pub tier: String,

    #[sea_orm(has_many)]
    pub files: HasMany<super::stored_file::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
