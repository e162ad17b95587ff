//! Template identity and the environment that instantiates templates

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::poolable::Poolable;

/// Identity of the template a pool's instances are copied from.
///
/// Cloning is cheap; two ids are the same template when their names match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(Arc<str>);

impl TemplateId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TemplateId {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

/// The host environment's view of templates.
///
/// Pools never create instances directly. They ask the library for a raw
/// copy of the template, then ask it to attach the poolable capability.
/// A copy that cannot be attached is handed back and destroyed.
pub trait TemplateLibrary {
    /// Raw copy of a template, before the poolable capability is checked.
    type Object;

    /// Pooled instance type.
    type Instance: Poolable;

    /// Whether `template` refers to an existing template.
    fn resolve(&self, template: &TemplateId) -> bool;

    /// Creates a raw copy of `template`.
    fn instantiate(&mut self, template: &TemplateId) -> Self::Object;

    /// Converts a raw copy into a pooled instance, or returns it untouched
    /// when the copy lacks the poolable capability.
    fn attach(&mut self, object: Self::Object) -> Result<Self::Instance, Self::Object>;

    /// Destroys a raw copy that could not be attached.
    fn destroy(&mut self, object: Self::Object) {
        drop(object);
    }
}

type Factory<T> = Arc<dyn Fn() -> T + Send + Sync>;

enum CatalogEntry<T> {
    Poolable(Factory<T>),
    Inert,
}

/// Raw copy produced by a [`TemplateCatalog`].
pub enum CatalogObject<T> {
    Poolable(T),
    /// Copy of a template registered with [`TemplateCatalog::register_inert`].
    Inert(TemplateId),
}

/// A [`TemplateLibrary`] backed by factory closures keyed by template name.
///
/// # Examples
///
/// ```
/// use prefab_pool::{Poolable, TemplateCatalog, TemplateId, TemplateLibrary};
///
/// #[derive(Default)]
/// struct Rock;
/// impl Poolable for Rock {
///     fn on_pool_init(&mut self, _template: &TemplateId) {}
/// }
///
/// let mut catalog = TemplateCatalog::new();
/// catalog.register("Rock", Rock::default);
///
/// assert!(catalog.resolve(&"Rock".into()));
/// assert!(!catalog.resolve(&"Tree".into()));
/// ```
pub struct TemplateCatalog<T> {
    entries: HashMap<TemplateId, CatalogEntry<T>>,
    destroyed: usize,
}

impl<T> TemplateCatalog<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            destroyed: 0,
        }
    }

    /// Registers a template whose copies are built by `factory`.
    pub fn register<F>(&mut self, template: impl Into<TemplateId>, factory: F) -> &mut Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.entries
            .insert(template.into(), CatalogEntry::Poolable(Arc::new(factory)));
        self
    }

    /// Registers a template whose copies never carry the poolable capability.
    pub fn register_inert(&mut self, template: impl Into<TemplateId>) -> &mut Self {
        self.entries.insert(template.into(), CatalogEntry::Inert);
        self
    }

    /// Number of raw copies destroyed because they could not be pooled.
    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }
}

impl<T> Default for TemplateCatalog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Poolable> TemplateLibrary for TemplateCatalog<T> {
    type Object = CatalogObject<T>;
    type Instance = T;

    fn resolve(&self, template: &TemplateId) -> bool {
        self.entries.contains_key(template)
    }

    fn instantiate(&mut self, template: &TemplateId) -> CatalogObject<T> {
        match self.entries.get(template) {
            Some(CatalogEntry::Poolable(factory)) => CatalogObject::Poolable(factory()),
            Some(CatalogEntry::Inert) | None => CatalogObject::Inert(template.clone()),
        }
    }

    fn attach(&mut self, object: CatalogObject<T>) -> Result<T, CatalogObject<T>> {
        match object {
            CatalogObject::Poolable(instance) => Ok(instance),
            inert => Err(inert),
        }
    }

    fn destroy(&mut self, object: CatalogObject<T>) {
        self.destroyed += 1;
        drop(object);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Beacon;

    impl Poolable for Beacon {
        fn on_pool_init(&mut self, _template: &TemplateId) {}
    }

    #[test]
    fn test_template_id_equality_by_name() {
        let a = TemplateId::new("Rock");
        let b: TemplateId = String::from("Rock").into();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "Rock");
    }

    #[test]
    fn test_catalog_attach_and_destroy() {
        let mut catalog = TemplateCatalog::new();
        catalog.register("Beacon", || Beacon).register_inert("Prop");

        let beacon = catalog.instantiate(&"Beacon".into());
        assert!(catalog.attach(beacon).is_ok());

        let prop = catalog.instantiate(&"Prop".into());
        let stray = catalog.attach(prop).err().unwrap();
        catalog.destroy(stray);
        assert_eq!(catalog.destroyed_count(), 1);
    }
}
