use serde::Serialize;

/// Response DTO for a successful upload.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Presigned URL for immediate display of the uploaded file.
    #[schema(example = "https://bucket.s3.amazonaws.com/acme/inspections/42/...")]
    pub file_url: String,
    /// Full object key within the bucket.
    #[schema(example = "acme/inspections/42/photos/kitchen/01936f0e-....jpg")]
    pub file_key: String,
    /// Metadata row ID (UUIDv7).
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub metadata_id: String,
}

/// Response DTO for a download request.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    /// Short-lived presigned URL the client fetches directly.
    pub file_url: String,
}

/// Response DTO for a delete request.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    #[schema(example = "File deleted successfully")]
    pub message: String,
}

/// Response DTO for the usage report.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    /// Total bytes currently stored.
    #[schema(example = 1_120_000)]
    pub current_usage: i64,
    /// Bytes stored under the `photo` category.
    pub photos_usage: i64,
    /// Bytes stored under the `report` category.
    pub reports_usage: i64,
    /// Number of stored objects.
    pub file_count: i64,
    /// Storage ceiling in bytes for the account's tier.
    #[schema(example = 5_368_709_120i64)]
    pub quota: i64,
    /// Billing tier name.
    #[schema(example = "starter")]
    pub tier: String,
}

const MAX_SEGMENT_ID_LEN: usize = 64;
const MAX_FILE_NAME_LEN: usize = 255;

/// Validates an inspection or inspection-item ID form field.
///
/// These become path segments of the object key, so anything that could
/// escape its segment is rejected.
pub fn validate_segment_id(value: &str) -> Result<&str, &'static str> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err("ID cannot be empty");
    }

    if trimmed.len() > MAX_SEGMENT_ID_LEN {
        return Err("ID exceeds maximum length of 64 characters");
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        return Err("ID contains invalid characters (allowed: a-zA-Z0-9, -, _)");
    }

    Ok(trimmed)
}

/// Validates an uploaded file's name.
///
/// Only the extension survives into the object key, but the name is stored
/// verbatim in metadata and echoed back in listings.
pub fn validate_file_name(value: &str) -> Result<&str, &'static str> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err("Filename cannot be empty");
    }

    if trimmed.len() > MAX_FILE_NAME_LEN {
        return Err("Filename exceeds maximum length of 255 characters");
    }

    if trimmed.contains('\0') {
        return Err("Filename must not contain null bytes");
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err("Filename must not contain path separators");
    }

    Ok(trimmed)
}
