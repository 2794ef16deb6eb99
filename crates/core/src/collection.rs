//! SEO collection: the registry of page definitions and the resolver.
//!
//! A [`Collection`] is built once at startup by the composing application.
//! Render calls resolve the effective setting for a page in this order:
//!
//! 1. a resource-level setting passed in with `enabled_customize = true`
//! 2. the shared record named after the page (created on first access)
//!
//! Tag values come from the definition's context function first, then the
//! global record's values over the declared defaults, then the fields of
//! the page objects.

use std::collections::HashMap;

use crate::definition::{GlobalVariables, PageObject, SeoDefinition};
use crate::error::CoreError;
use crate::open_graph::{MetaTags, RequestOrigin};
use crate::record::SettingRecord;
use crate::setting::Setting;
use crate::store::SettingStore;
use crate::tags::{substitute, TagSource, UnmatchedTags};
use crate::types::MAX_SETTING_NAME_LENGTH;

/// Default mount point of the admin interface.
pub const DEFAULT_ADMIN_PREFIX: &str = "/admin";

/// Registered SEO definitions plus the global variable table.
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    definitions: Vec<SeoDefinition>,
    global_variables: GlobalVariables,
    unmatched_tags: UnmatchedTags,
    admin_prefix: String,
}

impl Collection {
    /// Create a collection. `name` is also the key of its global record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definitions: Vec::new(),
            global_variables: GlobalVariables::default(),
            unmatched_tags: UnmatchedTags::default(),
            admin_prefix: DEFAULT_ADMIN_PREFIX.to_string(),
        }
    }

    pub fn with_admin_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.admin_prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    pub fn with_unmatched_tags(mut self, policy: UnmatchedTags) -> Self {
        self.unmatched_tags = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unmatched_tags(&self) -> UnmatchedTags {
        self.unmatched_tags
    }

    pub fn admin_prefix(&self) -> &str {
        &self.admin_prefix
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    pub fn register_global_variables(&mut self, variables: GlobalVariables) {
        self.global_variables = variables;
    }

    pub fn global_variables(&self) -> &GlobalVariables {
        &self.global_variables
    }

    /// Register a page definition. Names must be unique within the
    /// collection and must not collide with the global record's name.
    pub fn register_seo(&mut self, definition: SeoDefinition) -> Result<(), CoreError> {
        validate_setting_name(&definition.name)?;
        if definition.name == self.name {
            return Err(CoreError::Conflict(format!(
                "SEO definition '{}' collides with the global setting name",
                definition.name
            )));
        }
        if self.get_seo(&definition.name).is_some() {
            return Err(CoreError::Conflict(format!(
                "SEO definition '{}' is already registered",
                definition.name
            )));
        }

        tracing::debug!(
            collection = %self.name,
            seo = %definition.name,
            variables = ?definition.variables,
            "Registered SEO definition",
        );
        self.definitions.push(definition);
        Ok(())
    }

    pub fn get_seo(&self, name: &str) -> Option<&SeoDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn definitions(&self) -> &[SeoDefinition] {
        &self.definitions
    }

    // -----------------------------------------------------------------------
    // URLs
    // -----------------------------------------------------------------------

    /// URL segment of the admin resource, e.g. `"Common SEO"` -> `common-seo`.
    pub fn resource_param(&self) -> String {
        to_param(&self.name)
    }

    /// Admin index URL of this collection.
    pub fn index_url(&self) -> String {
        format!("{}/{}", self.admin_prefix, self.resource_param())
    }

    /// Inline-edit URL for one named setting.
    pub fn setting_url(&self, name: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
        format!("{}/!seo_setting?name={encoded}", self.index_url())
    }

    // -----------------------------------------------------------------------
    // Records (auto-provisioned)
    // -----------------------------------------------------------------------

    /// The shared record for `name`, created with defaults if absent.
    pub async fn setting<S>(&self, store: &S, name: &str) -> Result<S::Record, CoreError>
    where
        S: SettingStore + ?Sized,
    {
        if let Some(record) = store.find_by_name(name).await? {
            return Ok(record);
        }
        provision(store, name, false).await
    }

    /// The global record, created with defaults if absent.
    ///
    /// Looked up by its global flag; a provisioned one is named after the
    /// collection.
    pub async fn global_setting<S>(&self, store: &S) -> Result<S::Record, CoreError>
    where
        S: SettingStore + ?Sized,
    {
        if let Some(record) = store.find_global().await? {
            return Ok(record);
        }
        provision(store, &self.name, true).await
    }

    /// Every registered definition paired with its (provisioned) record, in
    /// registration order.
    pub async fn seo_sections<S>(
        &self,
        store: &S,
    ) -> Result<Vec<(&SeoDefinition, S::Record)>, CoreError>
    where
        S: SettingStore + ?Sized,
    {
        let mut sections = Vec::with_capacity(self.definitions.len());
        for definition in &self.definitions {
            let record = self.setting(store, &definition.name).await?;
            sections.push((definition, record));
        }
        Ok(sections)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Tags usable in templates of definition `name`: global variables, then
    /// the definition's own variables. Empty for an unknown name.
    pub fn tags_by_type(&self, name: &str) -> Vec<String> {
        let Some(definition) = self.get_seo(name) else {
            return Vec::new();
        };
        self.global_variables
            .names()
            .map(str::to_string)
            .chain(definition.variables.iter().cloned())
            .collect()
    }

    /// Declared global variables with stored values applied over defaults.
    pub fn global_setting_value(
        &self,
        stored: &HashMap<String, String>,
    ) -> Vec<(String, String)> {
        self.global_variables.apply(stored)
    }

    /// Fill an empty, non-customized resource setting from the shared record.
    ///
    /// A resource setting that is customized or has any of title,
    /// description or keywords set is returned unchanged, as is one whose
    /// shared record does not exist yet.
    pub async fn append_default_value<S>(
        &self,
        store: &S,
        seo_name: &str,
        mut resource_setting: Setting,
    ) -> Result<Setting, CoreError>
    where
        S: SettingStore + ?Sized,
    {
        if resource_setting.enabled_customize || !resource_setting.is_blank() {
            return Ok(resource_setting);
        }
        if let Some(shared) = store.find_by_name(seo_name).await? {
            resource_setting.title = shared.title().to_string();
            resource_setting.description = shared.description().to_string();
            resource_setting.keywords = shared.keywords().to_string();
        }
        Ok(resource_setting)
    }

    // -----------------------------------------------------------------------
    // Resolve / render
    // -----------------------------------------------------------------------

    /// Resolve and substitute the effective setting for page `name`.
    pub async fn resolve<S>(
        &self,
        store: &S,
        name: &str,
        objects: &[&dyn PageObject],
    ) -> Result<Setting, CoreError>
    where
        S: SettingStore + ?Sized,
    {
        let definition = self.get_seo(name).ok_or_else(|| {
            tracing::error!(collection = %self.name, seo = name, "SEO definition not registered");
            CoreError::NotFound {
                entity: "SeoDefinition",
                key: name.to_string(),
            }
        })?;

        let customized = objects
            .iter()
            .find_map(|o| o.seo_setting().filter(|s| s.enabled_customize))
            .cloned();
        let mut setting = match customized {
            Some(setting) => setting,
            None => self.setting(store, name).await?.setting().clone(),
        };

        let dynamic = definition.context(objects);
        let global_record = self.global_setting(store).await?;
        let globals = self.global_values(global_record.global_setting());
        let allowed = self.tags_by_type(name);

        let mut sources = vec![TagSource::Map(&dynamic), TagSource::Map(&globals)];
        sources.extend(objects.iter().map(|o| TagSource::Object(*o)));

        let policy = self.unmatched_tags;
        let apply = |template: &str| substitute(template, &allowed, &sources, policy);

        setting.title = apply(&setting.title);
        setting.description = apply(&setting.description);
        setting.keywords = apply(&setting.keywords);
        setting.open_graph_title = apply(&setting.open_graph_title);
        setting.open_graph_description = apply(&setting.open_graph_description);
        setting.open_graph_url = apply(&setting.open_graph_url);
        setting.open_graph_image_url = apply(&setting.open_graph_image_url);
        for metadata in &mut setting.open_graph_metadata {
            metadata.content = apply(&metadata.content);
        }

        Ok(setting)
    }

    /// Resolve page `name` into its meta tags.
    pub async fn meta_tags<S>(
        &self,
        store: &S,
        name: &str,
        objects: &[&dyn PageObject],
        origin: Option<&RequestOrigin>,
    ) -> Result<MetaTags, CoreError>
    where
        S: SettingStore + ?Sized,
    {
        let setting = self.resolve(store, name, objects).await?;
        Ok(MetaTags::from_setting(&setting, origin))
    }

    /// Resolve page `name` and render its HTML meta tags.
    pub async fn render<S>(
        &self,
        store: &S,
        name: &str,
        objects: &[&dyn PageObject],
        origin: Option<&RequestOrigin>,
    ) -> Result<String, CoreError>
    where
        S: SettingStore + ?Sized,
    {
        Ok(self.meta_tags(store, name, objects, origin).await?.to_html())
    }

    /// Global substitution values: stored values over declared defaults,
    /// plus any stored keys that were never declared.
    fn global_values(&self, stored: &HashMap<String, String>) -> HashMap<String, String> {
        let mut values: HashMap<String, String> =
            self.global_variables.apply(stored).into_iter().collect();
        for (key, value) in stored {
            if !value.is_empty() {
                values.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        values
    }
}

/// Validate a setting record name.
pub fn validate_setting_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Name can't be blank".to_string()));
    }
    let length = name.chars().count();
    if length > MAX_SETTING_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Name exceeds maximum length of {MAX_SETTING_NAME_LENGTH} characters (got {length})"
        )));
    }
    Ok(())
}

/// Create a record, treating a concurrent creation as success.
async fn provision<S>(store: &S, name: &str, is_global: bool) -> Result<S::Record, CoreError>
where
    S: SettingStore + ?Sized,
{
    let record = <S::Record as SettingRecord>::provision(name, is_global);
    match store.insert(&record).await {
        Ok(created) => {
            tracing::info!(name, is_global, "Provisioned SEO setting");
            Ok(created)
        }
        Err(CoreError::Conflict(_)) => {
            tracing::debug!(name, "SEO setting created concurrently, re-reading");
            store
                .find_by_name(name)
                .await?
                .ok_or_else(|| CoreError::Storage(format!("Setting '{name}' vanished after conflict")))
        }
        Err(e) => Err(e),
    }
}

/// Kebab-case URL parameter for a display name.
fn to_param(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase()
                && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
            {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
        prev = Some(c);
    }
    out.trim_end_matches('-').to_string()
}
