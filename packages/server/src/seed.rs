use sea_orm::*;
use tracing::info;

use crate::entity::storage_quota;

const GIB: i64 = 1024 * 1024 * 1024;

/// Default tier ceilings seeded on startup.
const DEFAULT_QUOTAS: &[(&str, i64)] = &[
    ("starter", 5 * GIB),
    ("pro", 25 * GIB),
    ("business", 100 * GIB),
];

/// Seed the `storage_quota` table with default tier ceilings.
pub async fn seed_storage_quotas(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut inserted = 0u32;
    for &(tier, quota_bytes) in DEFAULT_QUOTAS {
        let model = storage_quota::ActiveModel {
            tier: Set(tier.to_string()),
            quota_bytes: Set(quota_bytes),
        };

        let result = storage_quota::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(storage_quota::Column::Tier)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("Seeded {} new storage quota tiers", inserted);
    }

    Ok(())
}
