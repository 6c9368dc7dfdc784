#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of an uploaded file. Decides the object key prefix and the
/// accepted MIME types.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in
/// SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    /// Inspection photo (JPEG, PNG, or WebP).
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "photo"))]
    Photo,
    /// Generated report document (PDF).
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "report"))]
    Report,
}

impl FileCategory {
    /// All category values.
    pub const ALL: &'static [FileCategory] = &[Self::Photo, Self::Report];

    /// Returns the string representation (lowercase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Report => "report",
        }
    }

    /// MIME types accepted for this category.
    pub fn allowed_mime_types(&self) -> &'static [&'static str] {
        match self {
            Self::Photo => &["image/jpeg", "image/png", "image/webp"],
            Self::Report => &["application/pdf"],
        }
    }

    /// Returns true if `mime_type` is accepted for this category.
    pub fn accepts(&self, mime_type: &str) -> bool {
        self.allowed_mime_types().contains(&mime_type)
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid category string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError {
    invalid: String,
}

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid category '{}'. Valid values: {}",
            self.invalid,
            FileCategory::ALL
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for FileCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photo" => Ok(Self::Photo),
            "report" => Ok(Self::Report),
            _ => Err(ParseCategoryError {
                invalid: s.to_string(),
            }),
        }
    }
}
