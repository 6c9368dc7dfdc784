use chrono::Utc;
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::entity::{storage_quota, storage_usage};
use crate::error::AppError;

/// Zero counters for an account that has never stored a file. The usage row
/// is created by trigger on the first insert, so absence just means empty.
fn empty_usage(account_id: Uuid) -> storage_usage::Model {
    storage_usage::Model {
        account_id,
        total_bytes: 0,
        photo_bytes: 0,
        report_bytes: 0,
        file_count: 0,
        calculated_at: Utc::now(),
    }
}

/// Current usage counters for an account.
pub async fn usage_snapshot<C: sea_orm::ConnectionTrait>(
    db: &C,
    account_id: Uuid,
) -> Result<storage_usage::Model, AppError> {
    let usage = storage_usage::Entity::find_by_id(account_id)
        .one(db)
        .await
        .map_err(|e| AppError::QuotaLookupFailed(e.to_string()))?;

    Ok(usage.unwrap_or_else(|| empty_usage(account_id)))
}

/// Byte ceiling for a billing tier.
///
/// Unlike a missing usage row, a missing quota row is a configuration
/// problem: we cannot tell how much the tenant is allowed to store, and
/// admitting blind is not an option.
pub async fn tier_quota_bytes<C: sea_orm::ConnectionTrait>(
    db: &C,
    tier: &str,
) -> Result<i64, AppError> {
    let quota = storage_quota::Entity::find_by_id(tier)
        .one(db)
        .await
        .map_err(|e| AppError::QuotaLookupFailed(e.to_string()))?
        .ok_or_else(|| AppError::QuotaLookupFailed(format!("no quota row for tier '{tier}'")))?;

    Ok(quota.quota_bytes)
}

/// Check whether an upload of `additional_bytes` fits under the tenant's
/// ceiling.
///
/// This is a soft limit: the check reads a counter snapshot and admits or
/// rejects on it, without locking. Two concurrent uploads that each fit on
/// their own can together land past the ceiling; the next check sees the
/// updated counters and rejects. An upload that fails the check costs
/// nothing, since nothing has been written yet.
pub async fn check_admission<C: sea_orm::ConnectionTrait>(
    db: &C,
    account_id: Uuid,
    tier: &str,
    additional_bytes: i64,
) -> Result<(), AppError> {
    let usage = usage_snapshot(db, account_id).await?;
    let quota_bytes = tier_quota_bytes(db, tier).await?;

    if usage.total_bytes + additional_bytes > quota_bytes {
        return Err(AppError::QuotaExceeded);
    }

    Ok(())
}
