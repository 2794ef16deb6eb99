//! The SEO setting value object.
//!
//! A [`Setting`] is stored as a single JSON text column. Field names on the
//! wire keep their historical PascalCase spelling so rows written by older
//! deployments keep decoding.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Value object
// ---------------------------------------------------------------------------

/// Title/description/keywords templates plus Open Graph overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Setting {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Keywords")]
    pub keywords: String,
    /// Page/category discriminator. Provisioned records carry their own name.
    #[serde(rename = "Type")]
    pub seo_type: String,
    #[serde(rename = "OpenGraphTitle")]
    pub open_graph_title: String,
    #[serde(rename = "OpenGraphDescription")]
    pub open_graph_description: String,
    #[serde(rename = "OpenGraphURL")]
    pub open_graph_url: String,
    #[serde(rename = "OpenGraphType")]
    pub open_graph_type: String,
    #[serde(rename = "OpenGraphImageURL")]
    pub open_graph_image_url: String,
    #[serde(rename = "OpenGraphImageFromMediaLibrary")]
    pub open_graph_image_from_media_library: MediaBox,
    #[serde(rename = "OpenGraphMetadata")]
    pub open_graph_metadata: Vec<OpenGraphMetadata>,
    /// When set on a resource-level setting, it replaces the shared record.
    #[serde(rename = "EnabledCustomize")]
    pub enabled_customize: bool,
    /// Site-wide substitution values. Only meaningful on the global record.
    #[serde(rename = "GlobalSetting")]
    pub global_setting: HashMap<String, String>,
}

/// A free-form `<meta property=.. content=..>` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenGraphMetadata {
    #[serde(rename = "Property")]
    pub property: String,
    #[serde(rename = "Content")]
    pub content: String,
}

/// Reference to images picked from a media library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaBox {
    #[serde(rename = "Files")]
    pub files: Vec<MediaFile>,
}

/// One file inside a [`MediaBox`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaFile {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Url")]
    pub url: String,
}

impl MediaBox {
    /// URL of the first file, if any.
    pub fn url(&self) -> Option<&str> {
        self.files
            .first()
            .map(|f| f.url.as_str())
            .filter(|u| !u.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Column encoding
// ---------------------------------------------------------------------------

/// Raw representations a setting column can arrive in.
#[derive(Debug, Clone)]
pub enum ColumnValue<'a> {
    Bytes(&'a [u8]),
    Text(&'a str),
    TextList(&'a [String]),
}

impl Setting {
    /// Decode a setting from a stored column.
    ///
    /// Malformed JSON yields the zero-value setting and is
    /// logged; it never fails. For a list, every element is decoded in turn
    /// and its fields overlay those of the elements before it.
    pub fn scan(value: ColumnValue<'_>) -> Self {
        match value {
            ColumnValue::Bytes(bytes) => decode_or_default(bytes),
            ColumnValue::Text(text) => decode_or_default(text.as_bytes()),
            ColumnValue::TextList(items) => {
                let mut merged = serde_json::Map::new();
                for item in items {
                    match serde_json::from_str::<serde_json::Value>(item) {
                        Ok(serde_json::Value::Object(fields)) => merged.extend(fields),
                        _ => tracing::warn!("Skipping malformed setting list element"),
                    }
                }
                decode_value_or_default(serde_json::Value::Object(merged))
            }
        }
    }

    /// Encode the setting for storage.
    pub fn value(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// True when title, description and keywords are all empty.
    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.description.is_empty() && self.keywords.is_empty()
    }
}

fn decode_or_default(bytes: &[u8]) -> Setting {
    if bytes.is_empty() {
        return Setting::default();
    }
    match serde_json::from_slice(bytes) {
        Ok(setting) => setting,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed setting column, using empty setting");
            Setting::default()
        }
    }
}

fn decode_value_or_default(value: serde_json::Value) -> Setting {
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Malformed setting column, using empty setting");
        Setting::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_text_column() {
        let setting = Setting::scan(ColumnValue::Text(
            r#"{"Title":"{{SiteName}}","Description":"d","EnabledCustomize":true}"#,
        ));
        assert_eq!(setting.title, "{{SiteName}}");
        assert_eq!(setting.description, "d");
        assert!(setting.enabled_customize);
        assert!(setting.keywords.is_empty());
    }

    #[test]
    fn scan_bytes_column() {
        let setting = Setting::scan(ColumnValue::Bytes(br#"{"Keywords":"k1,k2"}"#));
        assert_eq!(setting.keywords, "k1,k2");
    }

    #[test]
    fn scan_text_list_overlays_elements() {
        let items = vec![
            r#"{"Title":"first","Keywords":"k"}"#.to_string(),
            "not json".to_string(),
            r#"{"Title":"second"}"#.to_string(),
        ];
        let setting = Setting::scan(ColumnValue::TextList(&items));
        assert_eq!(setting.title, "second");
        assert_eq!(setting.keywords, "k");
    }

    #[test]
    fn scan_malformed_json_degrades_to_default() {
        let setting = Setting::scan(ColumnValue::Text("{\"Title\": "));
        assert_eq!(setting, Setting::default());
    }

    #[test]
    fn scan_empty_column_is_default() {
        assert_eq!(Setting::scan(ColumnValue::Bytes(b"")), Setting::default());
    }

    #[test]
    fn value_uses_pascal_case_names() {
        let setting = Setting {
            title: "T".into(),
            open_graph_url: "/x".into(),
            ..Default::default()
        };
        let json: serde_json::Value = serde_json::from_str(&setting.value().unwrap()).unwrap();
        assert_eq!(json["Title"], "T");
        assert_eq!(json["OpenGraphURL"], "/x");
        assert_eq!(json["EnabledCustomize"], false);
    }

    #[test]
    fn global_setting_map_decodes() {
        let setting =
            Setting::scan(ColumnValue::Text(r#"{"GlobalSetting":{"SiteName":"Qor"}}"#));
        assert_eq!(setting.global_setting.get("SiteName").map(String::as_str), Some("Qor"));
    }

    #[test]
    fn media_box_url_is_first_file() {
        let media = MediaBox {
            files: vec![
                MediaFile { id: "1".into(), url: "/a.jpg".into() },
                MediaFile { id: "2".into(), url: "/b.jpg".into() },
            ],
        };
        assert_eq!(media.url(), Some("/a.jpg"));
        assert_eq!(MediaBox::default().url(), None);
    }
}
