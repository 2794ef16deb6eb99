//! Repository for the `qor_seo_settings` table.

use pageseo_core::setting::Setting;
use sqlx::PgPool;

use crate::models::seo_setting::{CreateSeoSetting, SeoSettingRow, UpdateSeoSetting};

const COLUMNS: &str = "name, setting, is_global_seo, created_at, updated_at, deleted_at";

/// Provides CRUD operations for shared SEO settings.
pub struct SeoSettingRepo;

impl SeoSettingRepo {
    /// Insert a new setting, returning the created row.
    ///
    /// A soft-deleted row with the same name is revived and overwritten.
    /// Returns `None` when a live row with that name already exists.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSeoSetting,
    ) -> Result<Option<SeoSettingRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO qor_seo_settings (name, setting, is_global_seo) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (name) DO UPDATE SET \
                setting = EXCLUDED.setting, \
                is_global_seo = EXCLUDED.is_global_seo, \
                created_at = NOW(), \
                updated_at = NOW(), \
                deleted_at = NULL \
             WHERE qor_seo_settings.deleted_at IS NOT NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SeoSettingRow>(&query)
            .bind(&input.name)
            .bind(encode(&input.setting)?)
            .bind(input.is_global_seo)
            .fetch_optional(pool)
            .await
    }

    /// Find a live setting by name.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<SeoSettingRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM qor_seo_settings WHERE name = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, SeoSettingRow>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Find the live global setting.
    pub async fn find_global(pool: &PgPool) -> Result<Option<SeoSettingRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM qor_seo_settings \
             WHERE is_global_seo AND deleted_at IS NULL \
             LIMIT 1"
        );
        sqlx::query_as::<_, SeoSettingRow>(&query)
            .fetch_optional(pool)
            .await
    }

    /// List all live settings, ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<SeoSettingRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM qor_seo_settings WHERE deleted_at IS NULL ORDER BY name ASC"
        );
        sqlx::query_as::<_, SeoSettingRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a live setting. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        name: &str,
        input: &UpdateSeoSetting,
    ) -> Result<Option<SeoSettingRow>, sqlx::Error> {
        let setting = input.setting.as_ref().map(encode).transpose()?;
        let query = format!(
            "UPDATE qor_seo_settings SET \
                setting = COALESCE($2, setting), \
                is_global_seo = COALESCE($3, is_global_seo), \
                updated_at = NOW() \
             WHERE name = $1 AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SeoSettingRow>(&query)
            .bind(name)
            .bind(setting)
            .bind(input.is_global_seo)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a setting. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE qor_seo_settings SET deleted_at = NOW() WHERE name = $1 AND deleted_at IS NULL",
        )
        .bind(name)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted setting. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE qor_seo_settings SET deleted_at = NULL WHERE name = $1 AND deleted_at IS NOT NULL",
        )
        .bind(name)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn encode(setting: &Setting) -> Result<String, sqlx::Error> {
    setting.value().map_err(|e| sqlx::Error::Encode(Box::new(e)))
}
