//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod seo_setting_repo;

pub use seo_setting_repo::SeoSettingRepo;
