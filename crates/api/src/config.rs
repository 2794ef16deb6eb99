use pageseo_core::collection::{validate_setting_name, Collection, DEFAULT_ADMIN_PREFIX};
use pageseo_core::definition::{GlobalVariables, SeoDefinition};
use pageseo_core::error::CoreError;
use pageseo_core::tags::UnmatchedTags;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for closing the database pool after shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// SEO collection setup.
    pub seo: SeoConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    ///
    /// See [`SeoConfig::from_env`] for the SEO variables.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let seo = SeoConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            seo,
        }
    }
}

// ---------------------------------------------------------------------------
// SEO collection configuration
// ---------------------------------------------------------------------------

/// A page definition declared through configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    pub name: String,
    pub variables: Vec<String>,
}

/// Settings for the SEO collection served by this process.
#[derive(Debug, Clone, PartialEq)]
pub struct SeoConfig {
    /// Mount point of the admin routes (default: `/admin`).
    pub admin_prefix: String,
    /// Collection name, also the name of the global record.
    pub collection_name: String,
    pub global_variables: GlobalVariables,
    pub pages: Vec<PageConfig>,
    pub unmatched_tags: UnmatchedTags,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            admin_prefix: DEFAULT_ADMIN_PREFIX.to_string(),
            collection_name: "QorSeoGlobalSettings".to_string(),
            global_variables: GlobalVariables::new(),
            pages: Vec::new(),
            unmatched_tags: UnmatchedTags::default(),
        }
    }
}

impl SeoConfig {
    /// Load the SEO configuration from environment variables.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `ADMIN_PREFIX`         | `/admin`                   |
    /// | `SEO_COLLECTION_NAME`  | `QorSeoGlobalSettings`     |
    /// | `SEO_GLOBAL_VARIABLES` | (none)                     |
    /// | `SEO_PAGES`            | (none)                     |
    /// | `SEO_UNMATCHED_TAGS`   | `blank`                    |
    ///
    /// `SEO_GLOBAL_VARIABLES` is a comma-separated list of `Name=Default`
    /// (or bare `Name`). `SEO_PAGES` is a `;`-separated list of
    /// `Page:Var1|Var2`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let admin_prefix = std::env::var("ADMIN_PREFIX").unwrap_or(defaults.admin_prefix);
        let collection_name =
            std::env::var("SEO_COLLECTION_NAME").unwrap_or(defaults.collection_name);

        let global_variables = std::env::var("SEO_GLOBAL_VARIABLES")
            .map(|raw| parse_global_variables(&raw))
            .unwrap_or(defaults.global_variables);

        let pages = match std::env::var("SEO_PAGES") {
            Ok(raw) => parse_pages(&raw).expect("SEO_PAGES must be a valid page list"),
            Err(_) => defaults.pages,
        };

        let unmatched_tags = match std::env::var("SEO_UNMATCHED_TAGS") {
            Ok(raw) => raw
                .parse()
                .expect("SEO_UNMATCHED_TAGS must be 'blank' or 'keep'"),
            Err(_) => defaults.unmatched_tags,
        };

        Self {
            admin_prefix,
            collection_name,
            global_variables,
            pages,
            unmatched_tags,
        }
    }

    /// Build the [`Collection`] this configuration describes.
    pub fn build_collection(&self) -> Result<Collection, CoreError> {
        let mut collection = Collection::new(self.collection_name.clone())
            .with_admin_prefix(self.admin_prefix.clone())
            .with_unmatched_tags(self.unmatched_tags);
        collection.register_global_variables(self.global_variables.clone());
        for page in &self.pages {
            collection.register_seo(
                SeoDefinition::new(page.name.clone()).with_variables(page.variables.clone()),
            )?;
        }
        Ok(collection)
    }
}

/// Parse `SiteName=Default,BrandName` into declared global variables.
pub fn parse_global_variables(raw: &str) -> GlobalVariables {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .fold(GlobalVariables::new(), |vars, entry| match entry.split_once('=') {
            Some((name, default)) => vars.with(name.trim(), default.trim()),
            None => vars.with(entry, ""),
        })
}

/// Parse `CategoryPage:Name|URLTitle;ProductPage` into page definitions.
pub fn parse_pages(raw: &str) -> Result<Vec<PageConfig>, CoreError> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, variables) = entry.split_once(':').unwrap_or((entry, ""));
            let name = name.trim();
            validate_setting_name(name)?;
            Ok(PageConfig {
                name: name.to_string(),
                variables: variables
                    .split('|')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect(),
            })
        })
        .collect()
}
