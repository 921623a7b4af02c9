//! Animation targets
//!
//! A target is any object exposing named numeric properties through
//! [`Animatable`]. Targets are shared between the caller and the scheduler as
//! [`SharedTarget`] handles; the scheduler writes interpolated values through
//! the handle every tick while the caller keeps reading its own clone.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// An object with named numeric properties
pub trait Animatable {
    /// Current value of `property`, or `None` if the object has no such property
    fn get(&self, property: &str) -> Option<f32>;

    /// Overwrite an existing property. Returns `false` if the property does not
    /// exist, in which case nothing changes.
    fn set(&mut self, property: &str, value: f32) -> bool;

    fn has(&self, property: &str) -> bool {
        self.get(property).is_some()
    }
}

/// A target shared between the caller and the scheduler
pub type SharedTarget = Arc<Mutex<dyn Animatable + Send>>;

/// Wrap a value so it can be handed to an animation block.
///
/// Keep the returned handle to read the animated values; pass a clone
/// (coerced to [`SharedTarget`]) to the block.
pub fn shared<T: Animatable + Send + 'static>(target: T) -> Arc<Mutex<T>> {
    Arc::new(Mutex::new(target))
}

/// A string-keyed bag of numeric properties.
///
/// Properties are declared up front; writes to undeclared names are rejected,
/// so a typo in a block cannot create a new property.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBag {
    values: FxHashMap<String, f32>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: declare a property with its initial value
    pub fn with(mut self, property: impl Into<String>, value: f32) -> Self {
        self.values.insert(property.into(), value);
        self
    }

    /// Declare a property, or overwrite it if already declared
    pub fn insert(&mut self, property: impl Into<String>, value: f32) {
        self.values.insert(property.into(), value);
    }

    /// Declared property names, sorted
    pub fn properties(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Declared properties with their current values, sorted by name.
    ///
    /// Single reads go through [`Animatable::get`], which returns `None` for an
    /// undeclared name rather than a default.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        let mut pairs: Vec<(&str, f32)> = self
            .values
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();
        pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));
        pairs.into_iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Animatable for PropertyBag {
    fn get(&self, property: &str) -> Option<f32> {
        self.values.get(property).copied()
    }

    fn set(&mut self, property: &str, value: f32) -> bool {
        match self.values.get_mut(property) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl<K: Into<String>> FromIterator<(K, f32)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, f32)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
