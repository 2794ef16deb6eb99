//! SEO definitions, page objects and global variables.
//!
//! A [`SeoDefinition`] names a page type, the variables its templates may
//! use and an optional context function producing their values. Page
//! objects expose their substitutable fields through a static lookup table
//! ([`PageObject::field`]) instead of runtime introspection.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::setting::Setting;

// ---------------------------------------------------------------------------
// Page objects
// ---------------------------------------------------------------------------

/// A field value exposed to tag substitution.
///
/// Only [`FieldValue::Text`] is substitutable; the other variants exist so a
/// field table can report a match that is then rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

/// A runtime object passed to a render call.
pub trait PageObject: Send + Sync {
    /// Resource-level setting embedded in this object.
    fn seo_setting(&self) -> Option<&Setting> {
        None
    }

    /// Look up a field by its exact name.
    fn field(&self, _name: &str) -> Option<FieldValue<'_>> {
        None
    }

    /// Downcast hook for context functions.
    fn as_any(&self) -> &dyn Any;
}

impl PageObject for String {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PageObject for &'static str {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PageObject for Setting {
    fn seo_setting(&self) -> Option<&Setting> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Downcast the object at `index` to a concrete type.
pub fn object_as<'a, T: 'static>(objects: &[&'a dyn PageObject], index: usize) -> Option<&'a T> {
    objects.get(index).and_then(|o| o.as_any().downcast_ref::<T>())
}

// ---------------------------------------------------------------------------
// SEO definition
// ---------------------------------------------------------------------------

/// Produces dynamic substitution values from the objects of a render call.
pub type ContextFn =
    Arc<dyn Fn(&[&dyn PageObject]) -> HashMap<String, String> + Send + Sync + 'static>;

/// A named page type with its permitted variables.
#[derive(Clone)]
pub struct SeoDefinition {
    pub name: String,
    pub variables: Vec<String>,
    context: Option<ContextFn>,
}

impl SeoDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            context: None,
        }
    }

    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context<F>(mut self, context: F) -> Self
    where
        F: Fn(&[&dyn PageObject]) -> HashMap<String, String> + Send + Sync + 'static,
    {
        self.context = Some(Arc::new(context));
        self
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// Run the context function, or return an empty map when none is set.
    pub fn context(&self, objects: &[&dyn PageObject]) -> HashMap<String, String> {
        match &self.context {
            Some(f) => f(objects),
            None => HashMap::new(),
        }
    }
}

impl fmt::Debug for SeoDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeoDefinition")
            .field("name", &self.name)
            .field("variables", &self.variables)
            .field("has_context", &self.context.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Global variables
// ---------------------------------------------------------------------------

/// Site-wide variables with their default values, in declaration order.
///
/// Values stored on the global record override the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalVariables {
    entries: Vec<(String, String)>,
}

impl GlobalVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable. Re-declaring a name replaces its default.
    pub fn with(mut self, name: impl Into<String>, default: impl Into<String>) -> Self {
        let name = name.into();
        let default = default.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = default,
            None => self.entries.push((name, default)),
        }
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn default_value(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared variables with non-empty stored values applied over defaults.
    pub fn apply(&self, stored: &HashMap<String, String>) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(name, default)| {
                let value = stored
                    .get(name)
                    .filter(|v| !v.is_empty())
                    .unwrap_or(default);
                (name.clone(), value.clone())
            })
            .collect()
    }
}
