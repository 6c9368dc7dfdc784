use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::storage::{BoxReader, FileCategory, derive_object_key};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entity::stored_file;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::storage::{
    DeleteResponse, DownloadResponse, UploadResponse, UsageResponse, validate_file_name,
    validate_segment_id,
};
use crate::state::AppState;
use crate::utils::quota::{check_admission, tier_quota_bytes, usage_snapshot};
use crate::utils::tenant::{TenantContext, resolve_tenant};

/// Slack on top of the per-file cap for multipart framing and the text
/// fields that ride along with the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn upload_body_limit(config: &AppConfig) -> DefaultBodyLimit {
    let cap = usize::try_from(config.storage.max_upload_bytes).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(cap.saturating_add(MULTIPART_OVERHEAD))
}

#[utoipa::path(
    post,
    path = "/upload/{category}",
    tag = "Storage",
    operation_id = "uploadFile",
    summary = "Upload a file",
    description = "Uploads a file for the caller's workspace. The `file` multipart field is \
        required; optional `inspectionId` and `inspectionItemId` fields place the object under \
        the matching inspection prefix. The upload is admitted only if it fits under the \
        workspace's storage quota.",
    params(("category" = String, Path, description = "Upload category: `photo` or `report`")),
    request_body(content_type = "multipart/form-data", description = "File upload with optional inspection IDs"),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Validation error or unsupported media type", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Storage quota exceeded", body = ErrorBody),
        (status = 500, description = "Store or metadata failure", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(category))]
pub async fn upload_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(category): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let category: FileCategory = category
        .parse()
        .map_err(|e: common::storage::ParseCategoryError| AppError::Validation(e.to_string()))?;

    let tenant = resolve_tenant(&state.db, auth_user.user_id).await?;

    let mut spooled: Option<SpooledUpload> = None;

    let result = async {
        let mut inspection_id: Option<String> = None;
        let mut inspection_item_id: Option<String> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            match field.name() {
                Some("file") => {
                    spooled = Some(spool_field(field, state.config.storage.max_upload_bytes).await?);
                }
                Some("inspectionId") => {
                    let text = field.text().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read inspectionId: {e}"))
                    })?;
                    if !text.trim().is_empty() {
                        let id = validate_segment_id(&text)
                            .map_err(|e| AppError::Validation(e.into()))?;
                        inspection_id = Some(id.to_string());
                    }
                }
                Some("inspectionItemId") => {
                    let text = field.text().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read inspectionItemId: {e}"))
                    })?;
                    if !text.trim().is_empty() {
                        let id = validate_segment_id(&text)
                            .map_err(|e| AppError::Validation(e.into()))?;
                        inspection_item_id = Some(id.to_string());
                    }
                }
                _ => {} // Ignore unknown fields.
            }
        }

        let upload = spooled
            .as_ref()
            .ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

        store_upload(
            &state,
            &tenant,
            category,
            upload,
            inspection_id.as_deref(),
            inspection_item_id.as_deref(),
        )
        .await
    }
    .await;

    if let Some(upload) = &spooled {
        // Best effort.
        let _ = tokio::fs::remove_file(&upload.temp_path).await;
    }

    let response = result?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/download/{key}",
    tag = "Storage",
    operation_id = "downloadFile",
    summary = "Get a download URL for a file",
    description = "Returns a short-lived presigned URL for the object. The caller fetches the \
        bytes directly from the object store; this service never proxies content.",
    params(("key" = String, Path, description = "Full object key (contains slashes)")),
    responses(
        (status = 200, description = "Presigned URL", body = DownloadResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "File belongs to another workspace", body = ErrorBody),
        (status = 404, description = "File not found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(key))]
pub async fn download_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DownloadResponse>, AppError> {
    let tenant = resolve_tenant(&state.db, auth_user.user_id).await?;
    let file = find_owned_file(&state.db, &tenant, &key).await?;

    let file_url = state
        .store
        .presign_get(&file.file_key, state.config.storage.presign_ttl_secs)
        .await?;

    Ok(Json(DownloadResponse { file_url }))
}

#[utoipa::path(
    delete,
    path = "/delete/{key}",
    tag = "Storage",
    operation_id = "deleteFile",
    summary = "Delete a file",
    description = "Removes the object from the store and its metadata row. The blob goes first: \
        if only the row delete fails, a retry finds the row again and the store treats the \
        already-gone blob as deleted.",
    params(("key" = String, Path, description = "Full object key (contains slashes)")),
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "File belongs to another workspace", body = ErrorBody),
        (status = 404, description = "File not found", body = ErrorBody),
        (status = 500, description = "Store or metadata failure", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(key))]
pub async fn delete_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let tenant = resolve_tenant(&state.db, auth_user.user_id).await?;
    let file = find_owned_file(&state.db, &tenant, &key).await?;

    state.store.delete(&file.file_key).await?;

    stored_file::Entity::delete_by_id(file.id)
        .exec(&state.db)
        .await
        .map_err(|e| AppError::PersistenceError(e.to_string()))?;

    Ok(Json(DeleteResponse {
        message: "File deleted successfully".into(),
    }))
}

#[utoipa::path(
    get,
    path = "/usage",
    tag = "Storage",
    operation_id = "getUsage",
    summary = "Get storage usage for the caller's workspace",
    responses(
        (status = 200, description = "Usage counters and quota", body = UsageResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 500, description = "Quota lookup failure", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn usage_report(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UsageResponse>, AppError> {
    let tenant = resolve_tenant(&state.db, auth_user.user_id).await?;

    let usage = usage_snapshot(&state.db, tenant.account_id).await?;
    let quota = tier_quota_bytes(&state.db, &tenant.tier).await?;

    Ok(Json(UsageResponse {
        current_usage: usage.total_bytes,
        photos_usage: usage.photo_bytes,
        reports_usage: usage.report_bytes,
        file_count: usage.file_count,
        quota,
        tier: tenant.tier,
    }))
}

/// Metadata row for `file_key`, if it exists and belongs to the tenant.
///
/// The key prefix happens to start with the tenant slug, but slugs are not
/// unique and can be forged in a request path. Ownership always comes from
/// the row's account column.
async fn find_owned_file<C: sea_orm::ConnectionTrait>(
    db: &C,
    tenant: &TenantContext,
    file_key: &str,
) -> Result<stored_file::Model, AppError> {
    let file = stored_file::Entity::find()
        .filter(stored_file::Column::FileKey.eq(file_key))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".into()))?;

    if file.account_id != tenant.account_id {
        return Err(AppError::Forbidden);
    }

    Ok(file)
}

/// Prefer the MIME type the client declared; fall back to a guess from the
/// filename extension.
fn resolve_mime_type(declared: Option<&str>, file_name: &str) -> String {
    match declared {
        Some(ct) if !ct.is_empty() => ct.to_string(),
        _ => mime_guess::from_path(file_name)
            .first()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string()),
    }
}

/// A multipart file field spooled to local disk, with the metadata captured
/// before the field was consumed. The caller removes `temp_path` when done.
struct SpooledUpload {
    temp_path: std::path::PathBuf,
    file_name: Option<String>,
    declared_type: Option<String>,
    size_bytes: i64,
}

/// Spool a multipart file field to a temp file, counting bytes against the
/// per-file cap as they arrive.
async fn spool_field(
    mut field: axum::extract::multipart::Field<'_>,
    max_size: u64,
) -> Result<SpooledUpload, AppError> {
    let file_name = field.file_name().map(|s| s.to_string());
    let declared_type = field.content_type().map(|s| s.to_string());
    let temp_path = std::env::temp_dir().join(format!("pantry-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::Validation(format!(
                    "File exceeds maximum size of {max_size} bytes"
                )));
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;

        Ok(i64::try_from(total_size).unwrap_or(i64::MAX))
    }
    .await;

    match result {
        Ok(size_bytes) => Ok(SpooledUpload {
            temp_path,
            file_name,
            declared_type,
            size_bytes,
        }),
        Err(e) => {
            // Best effort.
            let _ = tokio::fs::remove_file(&temp_path).await;
            Err(e)
        }
    }
}

/// Everything after the body has been spooled: validation, quota admission,
/// blob write, metadata row, presign.
async fn store_upload(
    state: &AppState,
    tenant: &TenantContext,
    category: FileCategory,
    upload: &SpooledUpload,
    inspection_id: Option<&str>,
    inspection_item_id: Option<&str>,
) -> Result<UploadResponse, AppError> {
    let file_name = upload
        .file_name
        .as_deref()
        .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
    let file_name = validate_file_name(file_name).map_err(|e| AppError::Validation(e.into()))?;

    let mime_type = resolve_mime_type(upload.declared_type.as_deref(), file_name);
    if !category.accepts(&mime_type) {
        return Err(AppError::UnsupportedMediaType(format!(
            "File type '{mime_type}' is not allowed for {category} uploads. Allowed types: {}",
            category.allowed_mime_types().join(", ")
        )));
    }

    check_admission(&state.db, tenant.account_id, &tenant.tier, upload.size_bytes).await?;

    let file_key = derive_object_key(
        &tenant.account_name,
        category,
        file_name,
        inspection_id,
        inspection_item_id,
    );

    let file = tokio::fs::File::open(&upload.temp_path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
    let reader: BoxReader = Box::new(file);
    state.store.put_stream(&file_key, reader, &mime_type).await?;

    let metadata_id = Uuid::now_v7();
    let row = stored_file::ActiveModel {
        id: Set(metadata_id),
        file_key: Set(file_key.clone()),
        file_name: Set(file_name.to_string()),
        category: Set(category),
        size_bytes: Set(upload.size_bytes),
        mime_type: Set(mime_type),
        inspection_id: Set(inspection_id.map(str::to_string)),
        inspection_item_id: Set(inspection_item_id.map(str::to_string)),
        bucket: Set(state.store.bucket().to_string()),
        region: Set(state.store.region().to_string()),
        upload_status: Set(stored_file::STATUS_COMPLETED.to_string()),
        account_id: Set(tenant.account_id),
        created_at: Set(Utc::now()),
    };

    if let Err(db_err) = stored_file::Entity::insert(row)
        .exec_without_returning(&state.db)
        .await
    {
        // The blob is already in the bucket. Without its metadata row it is
        // invisible to every later request, so take it back out. Either way
        // the caller sees the metadata failure, not the cleanup outcome.
        if let Err(del_err) = state.store.delete(&file_key).await {
            tracing::warn!("Compensating delete of '{file_key}' failed: {del_err}");
        }
        return Err(AppError::PersistenceError(db_err.to_string()));
    }

    let file_url = state
        .store
        .presign_get(&file_key, state.config.storage.presign_ttl_secs)
        .await?;

    Ok(UploadResponse {
        file_url,
        file_key,
        metadata_id: metadata_id.to_string(),
    })
}
