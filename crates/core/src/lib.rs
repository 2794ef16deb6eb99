//! Page SEO metadata core.
//!
//! Holds the setting value object, the `{{tag}}` substitution engine, the
//! collection of registered SEO definitions with its resolver, the
//! structured-data renderers and the storage trait the resolver reads
//! records through. Nothing here touches a database or HTTP directly.

pub mod collection;
pub mod definition;
pub mod error;
pub mod html;
pub mod microdata;
pub mod open_graph;
pub mod record;
pub mod setting;
pub mod store;
pub mod tags;
pub mod types;
