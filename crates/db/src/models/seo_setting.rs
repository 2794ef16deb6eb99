//! Shared SEO setting models and DTOs.

use pageseo_core::record::SeoSetting;
use pageseo_core::setting::{ColumnValue, Setting};
use pageseo_core::types::Timestamp;
use serde::Deserialize;
use sqlx::FromRow;

/// A row from the `qor_seo_settings` table.
///
/// `setting` is the raw JSON column; decode it with [`SeoSettingRow::into_record`].
#[derive(Debug, Clone, FromRow)]
pub struct SeoSettingRow {
    pub name: String,
    pub setting: String,
    pub is_global_seo: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl SeoSettingRow {
    /// Decode the JSON column. Malformed JSON yields an empty setting.
    pub fn into_record(self) -> SeoSetting {
        let setting = Setting::scan(ColumnValue::Text(&self.setting));
        SeoSetting {
            name: self.name,
            setting,
            is_global_seo: self.is_global_seo,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
            deleted_at: self.deleted_at,
        }
    }
}

/// DTO for creating a new shared setting.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSeoSetting {
    pub name: String,
    #[serde(default)]
    pub setting: Setting,
    #[serde(default)]
    pub is_global_seo: bool,
}

/// DTO for updating an existing shared setting. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSeoSetting {
    pub setting: Option<Setting>,
    pub is_global_seo: Option<bool>,
}
