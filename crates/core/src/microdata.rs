//! schema.org structured data snippets.
//!
//! Product data is rendered as hidden HTML microdata; search and contact
//! data as JSON-LD `<script>` blocks.

use std::fmt::Write as _;

use serde_json::{json, Value};

use crate::html::escape;

/// Currency used when a product does not name one.
pub const DEFAULT_PRICE_CURRENCY: &str = "USD";

/// `query-input` used when a search box does not name one.
pub const DEFAULT_QUERY_INPUT: &str = "required name=keyword";

/// A structured data snippet that renders to an HTML fragment.
pub trait Microdata {
    fn render(&self) -> String;
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MicroProduct {
    pub name: String,
    pub image: String,
    pub description: String,
    pub brand_name: String,
    pub sku: String,
    pub rating_value: f32,
    pub review_count: u32,
    /// Empty means [`DEFAULT_PRICE_CURRENCY`].
    pub price_currency: String,
    pub price: f64,
    pub price_valid_until: String,
    pub seller_name: String,
}

impl Microdata for MicroProduct {
    fn render(&self) -> String {
        let currency = if self.price_currency.is_empty() {
            DEFAULT_PRICE_CURRENCY
        } else {
            &self.price_currency
        };

        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            r#"<div itemscope itemtype="http://schema.org/Product" style="display:none;">"#
        );
        let _ = writeln!(out, r#"  <span itemprop="brand">{}</span>"#, escape(&self.brand_name));
        let _ = writeln!(out, r#"  <span itemprop="name">{}</span>"#, escape(&self.name));
        let _ = writeln!(out, r#"  <img itemprop="image" src="{}" />"#, escape(&self.image));
        let _ = writeln!(
            out,
            r#"  <span itemprop="description">{}</span>"#,
            escape(&self.description)
        );
        let _ = writeln!(out, r#"  <span itemprop="sku">{}</span>"#, escape(&self.sku));
        let _ = writeln!(
            out,
            r#"  <span itemprop="aggregateRating" itemscope itemtype="http://schema.org/AggregateRating">"#
        );
        let _ = writeln!(
            out,
            r#"    <span itemprop="ratingValue">{}</span> <span itemprop="reviewCount">{}</span>"#,
            self.rating_value, self.review_count
        );
        let _ = writeln!(out, "  </span>");
        let _ = writeln!(
            out,
            r#"  <span itemprop="offers" itemscope itemtype="http://schema.org/Offer">"#
        );
        let _ = writeln!(
            out,
            r#"    <meta itemprop="priceCurrency" content="{}" />"#,
            escape(currency)
        );
        let _ = writeln!(out, r#"    <span itemprop="price">{}</span>"#, self.price);
        let _ = writeln!(
            out,
            r#"    <time itemprop="priceValidUntil" datetime="{}"></time>"#,
            escape(&self.price_valid_until)
        );
        let _ = writeln!(
            out,
            r#"    <span itemprop="seller">{}</span>"#,
            escape(&self.seller_name)
        );
        let _ = writeln!(
            out,
            r#"    <link itemprop="itemCondition" href="http://schema.org/UsedCondition"/>"#
        );
        let _ = writeln!(
            out,
            r#"    <link itemprop="availability" href="http://schema.org/InStock"/>"#
        );
        let _ = writeln!(out, "  </span>");
        let _ = writeln!(out, "</div>");
        out
    }
}

// ---------------------------------------------------------------------------
// Search box
// ---------------------------------------------------------------------------

/// Sitelinks search box, e.g. `target = "https://example.com/search?q={keyword}"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MicroSearch {
    pub url: String,
    pub target: String,
    /// Empty means [`DEFAULT_QUERY_INPUT`].
    pub query_input: String,
}

impl MicroSearch {
    pub fn formatted_query_input(&self) -> &str {
        if self.query_input.is_empty() {
            DEFAULT_QUERY_INPUT
        } else {
            &self.query_input
        }
    }
}

impl Microdata for MicroSearch {
    fn render(&self) -> String {
        json_ld(&json!({
            "@context": "http://schema.org",
            "@type": "WebSite",
            "url": self.url,
            "potentialAction": {
                "@type": "SearchAction",
                "target": self.target,
                "query-input": self.formatted_query_input(),
            },
        }))
    }
}

// ---------------------------------------------------------------------------
// Contact point
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MicroContact {
    pub url: String,
    pub telephone: String,
    pub contact_type: String,
}

impl Microdata for MicroContact {
    fn render(&self) -> String {
        json_ld(&json!({
            "@context": "http://schema.org",
            "@type": "Organization",
            "url": self.url,
            "contactPoint": [{
                "@type": "ContactPoint",
                "telephone": self.telephone,
                "contactType": self.contact_type,
            }],
        }))
    }
}

/// Wrap a JSON value in a JSON-LD script block.
fn json_ld(value: &Value) -> String {
    let body = match serde_json::to_string_pretty(value) {
        Ok(body) => body.replace("</", "<\\/"),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode JSON-LD");
            return String::new();
        }
    };
    format!("<script type=\"application/ld+json\">\n{body}\n</script>\n")
}
