//! [`SettingStore`] backed by PostgreSQL.

use async_trait::async_trait;
use pageseo_core::error::CoreError;
use pageseo_core::record::SeoSetting;
use pageseo_core::store::SettingStore;

use crate::models::seo_setting::{CreateSeoSetting, SeoSettingRow, UpdateSeoSetting};
use crate::repositories::SeoSettingRepo;
use crate::DbPool;

/// Shared setting records in the `qor_seo_settings` table.
#[derive(Debug, Clone)]
pub struct PgSettingStore {
    pool: DbPool,
}

impl PgSettingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl SettingStore for PgSettingStore {
    type Record = SeoSetting;

    async fn find_by_name(&self, name: &str) -> Result<Option<SeoSetting>, CoreError> {
        let row = SeoSettingRepo::find_by_name(&self.pool, name)
            .await
            .map_err(storage_error)?;
        Ok(row.map(SeoSettingRow::into_record))
    }

    async fn find_global(&self) -> Result<Option<SeoSetting>, CoreError> {
        let row = SeoSettingRepo::find_global(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(row.map(SeoSettingRow::into_record))
    }

    async fn insert(&self, record: &SeoSetting) -> Result<SeoSetting, CoreError> {
        let input = CreateSeoSetting {
            name: record.name.clone(),
            setting: record.setting.clone(),
            is_global_seo: record.is_global_seo,
        };
        match SeoSettingRepo::create(&self.pool, &input)
            .await
            .map_err(storage_error)?
        {
            Some(row) => Ok(row.into_record()),
            None => Err(CoreError::Conflict(format!(
                "Setting '{}' already exists",
                record.name
            ))),
        }
    }

    async fn update(&self, record: &SeoSetting) -> Result<Option<SeoSetting>, CoreError> {
        let input = UpdateSeoSetting {
            setting: Some(record.setting.clone()),
            is_global_seo: Some(record.is_global_seo),
        };
        let row = SeoSettingRepo::update(&self.pool, &record.name, &input)
            .await
            .map_err(storage_error)?;
        Ok(row.map(SeoSettingRow::into_record))
    }

    async fn list(&self) -> Result<Vec<SeoSetting>, CoreError> {
        let rows = SeoSettingRepo::list(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(rows.into_iter().map(SeoSettingRow::into_record).collect())
    }

    async fn soft_delete(&self, name: &str) -> Result<bool, CoreError> {
        SeoSettingRepo::soft_delete(&self.pool, name)
            .await
            .map_err(storage_error)
    }
}

/// Map a sqlx error onto the core taxonomy.
///
/// Unique violations (PostgreSQL 23505) become [`CoreError::Conflict`] so the
/// resolver can treat a concurrent provisioning as success.
fn storage_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return CoreError::Conflict(format!(
                "Duplicate value violates unique constraint: {constraint}"
            ));
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Storage(err.to_string())
}
