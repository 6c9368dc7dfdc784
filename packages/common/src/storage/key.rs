use uuid::Uuid;

use super::category::FileCategory;

/// Lowercase a tenant display name and replace every character outside
/// `[a-z0-9]` with an underscore.
///
/// The slug is stable for a given name, so all of a tenant's objects share
/// one top-level prefix in the bucket.
pub fn tenant_slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// File extension of `file_name` including the leading dot, or the empty
/// string when there is none.
pub fn file_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[idx..],
        None => "",
    }
}

/// Derive the hierarchical object key for an upload.
///
/// Photos tied to an inspection group under the inspection and checklist
/// item (or `general` when no item is given); reports tied to an inspection
/// group under the inspection; everything else lands under the category
/// name. The random UUID component makes every derived key unique without
/// coordination, so re-running a failed upload never collides.
///
/// The prefix exists for bucket browsability only. Access control always
/// comes from the metadata row's account column, never from the key.
pub fn derive_object_key(
    tenant_name: &str,
    category: FileCategory,
    file_name: &str,
    inspection_id: Option<&str>,
    inspection_item_id: Option<&str>,
) -> String {
    let slug = tenant_slug(tenant_name);
    let ext = file_extension(file_name);
    let unique = Uuid::new_v4();

    match (category, inspection_id) {
        (FileCategory::Photo, Some(inspection)) => {
            let item = inspection_item_id.unwrap_or("general");
            format!("{slug}/inspections/{inspection}/photos/{item}/{unique}{ext}")
        }
        (FileCategory::Report, Some(inspection)) => {
            format!("{slug}/inspections/{inspection}/reports/{unique}{ext}")
        }
        (category, None) => {
            format!("{slug}/{}/{unique}{ext}", category.as_str())
        }
    }
}
