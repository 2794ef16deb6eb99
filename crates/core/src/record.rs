//! Persisted shared setting records.
//!
//! [`SettingRecord`] is the typed accessor surface the resolver needs from a
//! stored record. [`SeoSetting`] is the stock implementation; applications
//! with their own record type implement the trait for it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::setting::{MediaBox, OpenGraphMetadata, Setting};
use crate::types::Timestamp;

/// Typed accessors over a stored setting record.
pub trait SettingRecord: Clone + Default + Send + Sync + 'static {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: &str);

    fn setting(&self) -> &Setting;
    fn setting_mut(&mut self) -> &mut Setting;

    fn is_global_seo(&self) -> bool;
    fn set_is_global_seo(&mut self, is_global: bool);

    fn seo_type(&self) -> &str {
        &self.setting().seo_type
    }

    fn set_seo_type(&mut self, seo_type: &str) {
        self.setting_mut().seo_type = seo_type.to_string();
    }

    fn global_setting(&self) -> &HashMap<String, String> {
        &self.setting().global_setting
    }

    fn set_global_setting(&mut self, global_setting: HashMap<String, String>) {
        self.setting_mut().global_setting = global_setting;
    }

    fn title(&self) -> &str {
        &self.setting().title
    }

    fn description(&self) -> &str {
        &self.setting().description
    }

    fn keywords(&self) -> &str {
        &self.setting().keywords
    }

    fn open_graph_title(&self) -> &str {
        &self.setting().open_graph_title
    }

    fn open_graph_description(&self) -> &str {
        &self.setting().open_graph_description
    }

    fn open_graph_url(&self) -> &str {
        &self.setting().open_graph_url
    }

    fn open_graph_type(&self) -> &str {
        &self.setting().open_graph_type
    }

    fn open_graph_image_url(&self) -> &str {
        &self.setting().open_graph_image_url
    }

    fn open_graph_image_from_media_library(&self) -> &MediaBox {
        &self.setting().open_graph_image_from_media_library
    }

    fn open_graph_metadata(&self) -> &[OpenGraphMetadata] {
        &self.setting().open_graph_metadata
    }

    /// A fresh, unsaved record for `name`, typed after its own name.
    fn provision(name: &str, is_global: bool) -> Self {
        let mut record = Self::default();
        record.set_name(name);
        record.set_seo_type(name);
        record.set_is_global_seo(is_global);
        record
    }
}

/// The stock shared setting record (`qor_seo_settings` row).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeoSetting {
    pub name: String,
    pub setting: Setting,
    pub is_global_seo: bool,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
}

impl SettingRecord for SeoSetting {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn setting(&self) -> &Setting {
        &self.setting
    }

    fn setting_mut(&mut self) -> &mut Setting {
        &mut self.setting
    }

    fn is_global_seo(&self) -> bool {
        self.is_global_seo
    }

    fn set_is_global_seo(&mut self, is_global: bool) {
        self.is_global_seo = is_global;
    }
}
