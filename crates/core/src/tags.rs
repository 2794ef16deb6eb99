//! `{{Tag}}` substitution engine.
//!
//! Replaces placeholders in title/description/keywords templates with values
//! drawn from an ordered list of sources. The first source that has a text
//! value for a tag wins.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::definition::{FieldValue, PageObject};
use crate::error::CoreError;

/// Regex pattern matching `{{Tag}}` placeholders. Identifiers are alphanumeric.
pub const TAG_PATTERN: &str = r"\{\{([a-zA-Z0-9]*)\}\}";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(TAG_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// What happens to a placeholder no source can fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnmatchedTags {
    /// Replace with the empty string.
    #[default]
    Blank,
    /// Leave the `{{Tag}}` text in place.
    Keep,
}

impl FromStr for UnmatchedTags {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blank" => Ok(Self::Blank),
            "keep" => Ok(Self::Keep),
            other => Err(CoreError::Validation(format!(
                "Unknown unmatched tag policy '{other}' (expected 'blank' or 'keep')"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// One place a tag value can come from.
#[derive(Clone, Copy)]
pub enum TagSource<'a> {
    /// Looked up by key; not restricted to the allowed tag list.
    Map(&'a HashMap<String, String>),
    /// Looked up through the object's field table, for allowed tags only.
    Object(&'a dyn PageObject),
}

impl TagSource<'_> {
    fn lookup(&self, name: &str, allowed_tags: &[String]) -> Option<String> {
        match self {
            TagSource::Map(map) => map.get(name).cloned(),
            TagSource::Object(object) => {
                if !allowed_tags.iter().any(|t| t == name) {
                    return None;
                }
                match object.field(name)? {
                    FieldValue::Text(text) => Some(text.to_string()),
                    other => {
                        tracing::warn!(tag = name, value = ?other, "Tag field is not text, skipping");
                        None
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Substitution
// ---------------------------------------------------------------------------

/// Replace every `{{Tag}}` in `template`.
///
/// Sources are tried in order; unmatched tags follow `policy`. A template
/// without placeholders is returned unchanged.
pub fn substitute(
    template: &str,
    allowed_tags: &[String],
    sources: &[TagSource<'_>],
    policy: UnmatchedTags,
) -> String {
    if !template.contains("{{") {
        return template.to_string();
    }

    TAG_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            sources
                .iter()
                .find_map(|source| source.lookup(name, allowed_tags))
                .unwrap_or_else(|| match policy {
                    UnmatchedTags::Blank => String::new(),
                    UnmatchedTags::Keep => caps[0].to_string(),
                })
        })
        .into_owned()
}

/// List the tag names used in a template, sorted and de-duplicated.
pub fn extract_tags(template: &str) -> Vec<String> {
    let mut tags: Vec<String> = TAG_RE
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .filter(|name| !name.is_empty())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;

    fn ctx(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    struct Product {
        name: String,
        code: String,
        stock: i64,
    }

    impl PageObject for Product {
        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            match name {
                "Name" => Some(FieldValue::Text(&self.name)),
                "Code" => Some(FieldValue::Text(&self.code)),
                "Stock" => Some(FieldValue::Integer(self.stock)),
                _ => None,
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn polo() -> Product {
        Product {
            name: "Polo".into(),
            code: "P-1".into(),
            stock: 12,
        }
    }

    // -- identity --

    #[test]
    fn template_without_placeholders_is_identity() {
        let map = ctx(&[("SiteName", "Qor")]);
        for template in ["", "plain text", "{ single }", "{{not closed", "a } b {"] {
            for policy in [UnmatchedTags::Blank, UnmatchedTags::Keep] {
                assert_eq!(substitute(template, &[], &[TagSource::Map(&map)], policy), template);
            }
        }
    }

    // -- map sources --

    #[test]
    fn single_tag_from_map() {
        let map = ctx(&[("SiteName", "Qor")]);
        let out = substitute("{{SiteName}}", &[], &[TagSource::Map(&map)], UnmatchedTags::Blank);
        assert_eq!(out, "Qor");
    }

    #[test]
    fn repeated_tag_substitutes_every_occurrence() {
        let map = ctx(&[("Name", "X")]);
        let out = substitute("{{Name}} {{Name}}", &[], &[TagSource::Map(&map)], UnmatchedTags::Blank);
        assert_eq!(out, "X X");
    }

    #[test]
    fn map_lookup_ignores_allowed_tags() {
        let map = ctx(&[("Hidden", "shown")]);
        let out = substitute(
            "{{Hidden}}",
            &tags(&["Other"]),
            &[TagSource::Map(&map)],
            UnmatchedTags::Blank,
        );
        assert_eq!(out, "shown");
    }

    #[test]
    fn earlier_source_wins() {
        let dynamic = ctx(&[("Name", "dynamic")]);
        let global = ctx(&[("Name", "global"), ("SiteName", "Qor")]);
        let out = substitute(
            "{{SiteName}} {{Name}}",
            &[],
            &[TagSource::Map(&dynamic), TagSource::Map(&global)],
            UnmatchedTags::Blank,
        );
        assert_eq!(out, "Qor dynamic");
    }

    // -- unmatched policy --

    #[test]
    fn unknown_single_tag_blank() {
        let empty = HashMap::new();
        let out = substitute("{{SiteName}}", &[], &[TagSource::Map(&empty)], UnmatchedTags::Blank);
        assert_eq!(out, "");
    }

    #[test]
    fn unknown_single_tag_keep() {
        let empty = HashMap::new();
        let out = substitute("{{SiteName}}", &[], &[TagSource::Map(&empty)], UnmatchedTags::Keep);
        assert_eq!(out, "{{SiteName}}");
    }

    #[test]
    fn unknown_tag_mixed_with_known_blank() {
        let map = ctx(&[("SiteName", "Qor")]);
        let out = substitute(
            "{{SiteName}} {{Name1}}",
            &[],
            &[TagSource::Map(&map)],
            UnmatchedTags::Blank,
        );
        assert_eq!(out, "Qor ");
    }

    #[test]
    fn unknown_tag_mixed_with_known_keep() {
        let map = ctx(&[("SiteName", "Qor")]);
        let out = substitute(
            "{{SiteName}} {{Name1}}",
            &[],
            &[TagSource::Map(&map)],
            UnmatchedTags::Keep,
        );
        assert_eq!(out, "Qor {{Name1}}");
    }

    #[test]
    fn non_alphanumeric_placeholder_is_left_alone() {
        let map = ctx(&[("Site Name", "x"), ("site_name", "y")]);
        let out = substitute(
            "{{Site Name}} {{site_name}}",
            &[],
            &[TagSource::Map(&map)],
            UnmatchedTags::Blank,
        );
        assert_eq!(out, "{{Site Name}} {{site_name}}");
    }

    // -- object sources --

    #[test]
    fn object_field_substitutes_when_allowed() {
        let product = polo();
        let out = substitute(
            "{{Name}} ({{Code}})",
            &tags(&["Name", "Code"]),
            &[TagSource::Object(&product)],
            UnmatchedTags::Blank,
        );
        assert_eq!(out, "Polo (P-1)");
    }

    #[test]
    fn object_field_not_in_allowed_tags_is_unmatched() {
        let product = polo();
        let out = substitute(
            "{{Name}} {{Code}}",
            &tags(&["Name"]),
            &[TagSource::Object(&product)],
            UnmatchedTags::Keep,
        );
        assert_eq!(out, "Polo {{Code}}");
    }

    #[test]
    fn non_text_field_falls_through_to_later_source() {
        let product = polo();
        let fallback = ctx(&[("Stock", "plenty")]);
        let out = substitute(
            "{{Stock}}",
            &tags(&["Stock"]),
            &[TagSource::Object(&product), TagSource::Map(&fallback)],
            UnmatchedTags::Blank,
        );
        assert_eq!(out, "plenty");
    }

    #[test]
    fn non_text_field_without_fallback_is_unmatched() {
        let product = polo();
        let out = substitute(
            "[{{Stock}}]",
            &tags(&["Stock"]),
            &[TagSource::Object(&product)],
            UnmatchedTags::Blank,
        );
        assert_eq!(out, "[]");
    }

    #[test]
    fn map_source_beats_object_source() {
        let product = polo();
        let map = ctx(&[("Name", "from map")]);
        let out = substitute(
            "{{Name}}",
            &tags(&["Name"]),
            &[TagSource::Map(&map), TagSource::Object(&product)],
            UnmatchedTags::Blank,
        );
        assert_eq!(out, "from map");
    }

    // -- policy parsing --

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Blank".parse::<UnmatchedTags>().unwrap(), UnmatchedTags::Blank);
        assert_eq!(" keep ".parse::<UnmatchedTags>().unwrap(), UnmatchedTags::Keep);
        let err = "drop".parse::<UnmatchedTags>().unwrap_err();
        assert!(err.to_string().contains("Unknown unmatched tag policy"));
    }

    // -- extract_tags --

    #[test]
    fn extract_tags_sorted_and_deduplicated() {
        assert_eq!(
            extract_tags("{{SiteName}} {{Name}} {{SiteName}} {{}}"),
            vec!["Name".to_string(), "SiteName".to_string()]
        );
        assert!(extract_tags("no tags").is_empty());
    }
}
