use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entity::account;
use crate::error::AppError;

/// The calling workspace, as seen by every handler after authentication.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub user_id: Uuid,
    pub account_id: Uuid,
    /// Workspace display name; feeds the object key slug.
    pub account_name: String,
    /// Billing tier; keys into `storage_quota`.
    pub tier: String,
}

/// Look up the workspace owned by the authenticated user.
///
/// A token without a workspace behind it is as useless as no token, so a
/// missing account row maps to 401 rather than 404.
pub async fn resolve_tenant<C: sea_orm::ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<TenantContext, AppError> {
    let account = account::Entity::find()
        .filter(account::Column::OwnerUserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(AppError::TenantNotFound)?;

    Ok(TenantContext {
        user_id,
        account_id: account.id,
        account_name: account.name,
        tier: account.tier,
    })
}
