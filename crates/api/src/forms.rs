//! Decoding of the admin setting form.
//!
//! The admin UI posts flat `application/x-www-form-urlencoded` pairs:
//!
//! ```text
//! QorResource.Name                                  record name
//! QorResource.Setting.Title                         setting text field
//! QorResource.Setting.EnabledCustomize              checkbox
//! QorResource.Setting.OpenGraphMetadata[0].Property metadata pair
//! QorResource.Setting.OpenGraphImageFromMediaLibrary  media box JSON
//! QorResource.SiteName                              global value (global record only)
//! ```
//!
//! Anything outside the `QorResource.` namespace (`_method`, CSRF tokens)
//! is ignored.

use std::collections::{BTreeMap, HashMap};

use pageseo_core::setting::{MediaBox, OpenGraphMetadata, Setting};
use validator::Validate;

const RESOURCE_PREFIX: &str = "QorResource.";
const SETTING_PREFIX: &str = "Setting.";
const METADATA_PREFIX: &str = "OpenGraphMetadata[";

/// Text fields of a [`Setting`] addressable from the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Description,
    Keywords,
    Type,
    OpenGraphTitle,
    OpenGraphDescription,
    OpenGraphUrl,
    OpenGraphType,
    OpenGraphImageUrl,
}

impl TextField {
    fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "Title" => Self::Title,
            "Description" => Self::Description,
            "Keywords" => Self::Keywords,
            "Type" => Self::Type,
            "OpenGraphTitle" => Self::OpenGraphTitle,
            "OpenGraphDescription" => Self::OpenGraphDescription,
            "OpenGraphURL" => Self::OpenGraphUrl,
            "OpenGraphType" => Self::OpenGraphType,
            "OpenGraphImageURL" => Self::OpenGraphImageUrl,
            _ => return None,
        })
    }

    fn slot(self, setting: &mut Setting) -> &mut String {
        match self {
            Self::Title => &mut setting.title,
            Self::Description => &mut setting.description,
            Self::Keywords => &mut setting.keywords,
            Self::Type => &mut setting.seo_type,
            Self::OpenGraphTitle => &mut setting.open_graph_title,
            Self::OpenGraphDescription => &mut setting.open_graph_description,
            Self::OpenGraphUrl => &mut setting.open_graph_url,
            Self::OpenGraphType => &mut setting.open_graph_type,
            Self::OpenGraphImageUrl => &mut setting.open_graph_image_url,
        }
    }
}

/// A decoded setting form. Only submitted fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct SettingForm {
    #[validate(length(min = 1, max = 128, message = "Name must be between 1 and 128 characters"))]
    pub name: String,
    pub text_fields: Vec<(TextField, String)>,
    pub enabled_customize: Option<bool>,
    pub media_library: Option<MediaBox>,
    /// Replaces the whole list when present.
    pub open_graph_metadata: Option<Vec<OpenGraphMetadata>>,
    /// Only applied to the global record.
    pub global_values: HashMap<String, String>,
}

impl SettingForm {
    /// Decode form pairs, collecting one message per bad field.
    pub fn parse(pairs: &[(String, String)]) -> Result<Self, Vec<String>> {
        let mut form = Self::default();
        let mut errors = Vec::new();
        let mut metadata: BTreeMap<usize, OpenGraphMetadata> = BTreeMap::new();
        let mut saw_metadata = false;

        for (key, value) in pairs {
            let Some(key) = key.strip_prefix(RESOURCE_PREFIX) else {
                continue;
            };

            if key == "Name" {
                form.name = value.trim().to_string();
                continue;
            }

            let Some(field) = key.strip_prefix(SETTING_PREFIX) else {
                if key.contains('.') || key.is_empty() {
                    errors.push(format!("Unknown field '{RESOURCE_PREFIX}{key}'"));
                } else {
                    form.global_values.insert(key.to_string(), value.clone());
                }
                continue;
            };

            if let Some(text_field) = TextField::from_key(field) {
                form.text_fields.push((text_field, value.clone()));
            } else if field == "EnabledCustomize" {
                match parse_bool(value) {
                    Some(flag) => form.enabled_customize = Some(flag),
                    None => errors.push(format!("EnabledCustomize: invalid boolean '{value}'")),
                }
            } else if field == "OpenGraphImageFromMediaLibrary" {
                match parse_media_box(value) {
                    Ok(media) => form.media_library = Some(media),
                    Err(e) => errors.push(format!("OpenGraphImageFromMediaLibrary: {e}")),
                }
            } else if let Some(rest) = field.strip_prefix(METADATA_PREFIX) {
                saw_metadata = true;
                match parse_metadata_key(rest) {
                    Some((index, "Property")) => {
                        metadata.entry(index).or_default().property = value.clone();
                    }
                    Some((index, "Content")) => {
                        metadata.entry(index).or_default().content = value.clone();
                    }
                    _ => errors.push(format!("Unknown field '{RESOURCE_PREFIX}{key}'")),
                }
            } else {
                errors.push(format!("Unknown setting field '{field}'"));
            }
        }

        if saw_metadata {
            form.open_graph_metadata = Some(
                metadata
                    .into_values()
                    .filter(|m| !m.property.is_empty() || !m.content.is_empty())
                    .collect(),
            );
        }

        if let Err(validation) = form.validate() {
            errors.extend(validation_messages(&validation));
        }

        if errors.is_empty() {
            Ok(form)
        } else {
            Err(errors)
        }
    }

    /// Overlay the submitted fields onto `setting`.
    pub fn apply(&self, setting: &mut Setting, is_global: bool) {
        for (field, value) in &self.text_fields {
            *field.slot(setting) = value.clone();
        }
        if let Some(flag) = self.enabled_customize {
            setting.enabled_customize = flag;
        }
        if let Some(media) = &self.media_library {
            setting.open_graph_image_from_media_library = media.clone();
        }
        if let Some(metadata) = &self.open_graph_metadata {
            setting.open_graph_metadata = metadata.clone();
        }
        if is_global {
            setting
                .global_setting
                .extend(self.global_values.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
}

/// Checkbox values. A hidden `false` followed by a checked `true` decodes
/// to the last value seen.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Some(true),
        "false" | "off" | "0" | "" => Some(false),
        _ => None,
    }
}

fn parse_media_box(raw: &str) -> Result<MediaBox, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(MediaBox::default());
    }
    serde_json::from_str(raw)
}

/// `3].Property` -> `(3, "Property")`.
fn parse_metadata_key(rest: &str) -> Option<(usize, &str)> {
    let (index, field) = rest.split_once("].")?;
    Some((index.parse().ok()?, field))
}

fn validation_messages(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field}: {}", e.code),
            })
        })
        .collect();
    messages.sort();
    messages
}
