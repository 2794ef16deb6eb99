//! Final meta tag rendering.
//!
//! Turns a resolved [`Setting`] into `<title>`, description, keywords and
//! Open Graph `<meta>` tags.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use url::Url;

use crate::html::escape;
use crate::setting::Setting;

/// Scheme and host of the request a page is rendered for.
///
/// Used to turn relative Open Graph URLs into absolute ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub scheme: Option<String>,
    pub host: String,
}

impl RequestOrigin {
    pub fn new(scheme: Option<&str>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.filter(|s| !s.is_empty()).map(str::to_string),
            host: host.into(),
        }
    }

    fn base(&self) -> Option<Url> {
        let scheme = self.scheme.as_deref().unwrap_or("http");
        Url::parse(&format!("{scheme}://{}/", self.host)).ok()
    }
}

/// Make `raw` absolute against `origin`.
///
/// Absolute URLs are returned unchanged. Relative URLs without an origin are
/// returned as given; unparseable ones become empty.
pub fn to_absolute_url(raw: &str, origin: Option<&RequestOrigin>) -> String {
    match Url::parse(raw) {
        Ok(_) => raw.to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            match origin.and_then(RequestOrigin::base) {
                Some(base) => base
                    .join(raw)
                    .map(|u| u.to_string())
                    .unwrap_or_default(),
                None => raw.to_string(),
            }
        }
        Err(e) => {
            tracing::warn!(url = raw, error = %e, "Invalid Open Graph URL");
            String::new()
        }
    }
}

/// Pre-rendered metadata for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaTags {
    pub title: String,
    pub description: String,
    pub keywords: String,
    /// Keyed by property; iteration is sorted.
    pub open_graph: BTreeMap<String, String>,
}

impl MetaTags {
    /// Collect the tags for an already substituted setting.
    pub fn from_setting(setting: &Setting, origin: Option<&RequestOrigin>) -> Self {
        let mut og = BTreeMap::new();

        if !setting.open_graph_url.is_empty() {
            og.insert(
                "og:url".to_string(),
                to_absolute_url(&setting.open_graph_url, origin),
            );
        }

        if !setting.open_graph_type.is_empty() {
            og.insert("og:type".to_string(), setting.open_graph_type.clone());
        }

        let image = setting
            .open_graph_image_from_media_library
            .url()
            .or(Some(setting.open_graph_image_url.as_str()).filter(|u| !u.is_empty()));
        if let Some(image) = image {
            og.insert("og:image".to_string(), to_absolute_url(image, origin));
        }

        for metadata in &setting.open_graph_metadata {
            og.insert(metadata.property.clone(), metadata.content.clone());
        }

        og.entry("og:title".to_string()).or_insert_with(|| {
            first_non_empty(&setting.open_graph_title, &setting.title).to_string()
        });
        og.entry("og:description".to_string()).or_insert_with(|| {
            first_non_empty(&setting.open_graph_description, &setting.description).to_string()
        });

        Self {
            title: setting.title.clone(),
            description: setting.description.clone(),
            keywords: setting.keywords.clone(),
            open_graph: og,
        }
    }

    /// Render the tags, one per line. Empty Open Graph values are omitted.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "<title>{}</title>", escape(&self.title));
        let _ = writeln!(
            out,
            "<meta name=\"description\" content=\"{}\">",
            escape(&self.description)
        );
        let _ = writeln!(
            out,
            "<meta name=\"keywords\" content=\"{}\">",
            escape(&self.keywords)
        );
        for (property, content) in self.open_graph.iter().filter(|(_, v)| !v.is_empty()) {
            let property = escape(property);
            let _ = writeln!(
                out,
                "<meta property=\"{property}\" name=\"{property}\" content=\"{}\">",
                escape(content)
            );
        }
        out
    }
}

fn first_non_empty<'a>(preferred: &'a str, fallback: &'a str) -> &'a str {
    if preferred.is_empty() {
        fallback
    } else {
        preferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setting::{MediaBox, MediaFile, OpenGraphMetadata};

    #[test]
    fn empty_setting_renders_three_tags() {
        let html = MetaTags::from_setting(&Setting::default(), None).to_html();
        assert_eq!(
            html,
            "<title></title>\n<meta name=\"description\" content=\"\">\n<meta name=\"keywords\" content=\"\">\n"
        );
    }

    #[test]
    fn tags_are_escaped_and_sorted() {
        let tags = MetaTags {
            title: "<br>title".into(),
            description: r#"<script>alert("exec");</script>description"#.into(),
            keywords: r#"<meta name="keywords" content="keywords">keywords"#.into(),
            open_graph: [
                ("og:url", "http://example_test.test/  a/  b/"),
                ("og:title", "<span>title</span>"),
                ("og:type", "type<br>"),
                ("og:description", ""),
                ("og:image", "http://example_test.test/  a/  b.jpg"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        };

        let expected = "<title>&lt;br&gt;title</title>
<meta name=\"description\" content=\"&lt;script&gt;alert(&#34;exec&#34;);&lt;/script&gt;description\">
<meta name=\"keywords\" content=\"&lt;meta name=&#34;keywords&#34; content=&#34;keywords&#34;&gt;keywords\">
<meta property=\"og:image\" name=\"og:image\" content=\"http://example_test.test/  a/  b.jpg\">
<meta property=\"og:title\" name=\"og:title\" content=\"&lt;span&gt;title&lt;/span&gt;\">
<meta property=\"og:type\" name=\"og:type\" content=\"type&lt;br&gt;\">
<meta property=\"og:url\" name=\"og:url\" content=\"http://example_test.test/  a/  b/\">
";
        assert_eq!(tags.to_html(), expected);
    }

    #[test]
    fn og_title_and_description_fall_back_to_basic_fields() {
        let setting = Setting {
            title: "T".into(),
            description: "D".into(),
            ..Default::default()
        };
        let tags = MetaTags::from_setting(&setting, None);
        assert_eq!(tags.open_graph["og:title"], "T");
        assert_eq!(tags.open_graph["og:description"], "D");
    }

    #[test]
    fn explicit_og_fields_and_metadata_take_precedence() {
        let setting = Setting {
            title: "T".into(),
            open_graph_title: "OG T".into(),
            open_graph_metadata: vec![
                OpenGraphMetadata {
                    property: "og:description".into(),
                    content: "custom".into(),
                },
                OpenGraphMetadata {
                    property: "og:site_name".into(),
                    content: "Qor".into(),
                },
            ],
            description: "D".into(),
            ..Default::default()
        };
        let tags = MetaTags::from_setting(&setting, None);
        assert_eq!(tags.open_graph["og:title"], "OG T");
        assert_eq!(tags.open_graph["og:description"], "custom");
        assert_eq!(tags.open_graph["og:site_name"], "Qor");
    }

    #[test]
    fn media_library_image_beats_image_url() {
        let setting = Setting {
            open_graph_image_url: "http://cdn/a.jpg".into(),
            open_graph_image_from_media_library: MediaBox {
                files: vec![MediaFile {
                    id: "1".into(),
                    url: "/system/b.jpg".into(),
                }],
            },
            ..Default::default()
        };
        let origin = RequestOrigin::new(Some("https"), "shop.example.com");
        let tags = MetaTags::from_setting(&setting, Some(&origin));
        assert_eq!(tags.open_graph["og:image"], "https://shop.example.com/system/b.jpg");
    }

    #[test]
    fn relative_urls_made_absolute() {
        let origin = RequestOrigin::new(None, "example.com");
        assert_eq!(to_absolute_url("/clothing", Some(&origin)), "http://example.com/clothing");
        assert_eq!(
            to_absolute_url("https://other.test/x", Some(&origin)),
            "https://other.test/x"
        );
        assert_eq!(to_absolute_url("/clothing", None), "/clothing");
    }

    #[test]
    fn empty_og_values_are_not_rendered() {
        let setting = Setting {
            title: "Qor".into(),
            ..Default::default()
        };
        let html = MetaTags::from_setting(&setting, None).to_html();
        assert!(html.contains("<meta property=\"og:title\" name=\"og:title\" content=\"Qor\">"));
        assert!(!html.contains("og:description"));
    }
}
