use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Byte ceiling per billing tier. Seeded on startup, read-only per request.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "storage_quota")]
pub struct Model {
    /// Billing tier name.
    #[sea_orm(primary_key, auto_increment = false)]
    pub tier: String,

    /// Storage ceiling in bytes for this tier.
    pub quota_bytes: i64,
}

impl ActiveModelBehavior for ActiveModel {}
