//! Resource overlays: per-widget storage for virtual configuration options.
//!
//! A composite widget exposes options its wrapped primitive does not
//! understand (a "show scrollbar" flag, a per-state background color).
//! Those options live in a [`ResourceOverlay`], which the widget consults
//! before falling back to the primitive's own option table.
//!
//! Each widget declares its closed set of virtual keys with
//! [`resource_keys!`](crate::resource_keys), so an option name either
//! resolves to a declared key or belongs to the native widget.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::error::ResourceError;
use crate::logging::targets;
use crate::value::Value;

/// A declared virtual option key.
///
/// Implemented by enums generated with [`resource_keys!`](crate::resource_keys).
pub trait ResourceKey: Copy + Eq + Hash + fmt::Debug + 'static {
    /// Every declared key.
    const ALL: &'static [Self];

    /// The option name used in `configure`/`cget` calls.
    fn name(self) -> &'static str;

    /// Map an option name to a declared key.
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.name() == name)
    }
}

/// Declare an enum of virtual option keys and implement [`ResourceKey`] for it.
///
/// ```
/// vidgrab_core::resource_keys! {
///     /// Options of a captioned entry.
///     pub enum EntryOption {
///         /// Show a horizontal scrollbar.
///         ScrollX => "scrollx",
///         /// Caption text.
///         Text => "text",
///     }
/// }
///
/// use vidgrab_core::ResourceKey;
/// assert_eq!(EntryOption::from_name("text"), Some(EntryOption::Text));
/// assert_eq!(EntryOption::ScrollX.name(), "scrollx");
/// ```
#[macro_export]
macro_rules! resource_keys {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $key:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $crate::resource::ResourceKey for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)+
                }
            }
        }
    };
}

/// Typed key/value store shadowing part of a widget's configuration.
pub struct ResourceOverlay<K: ResourceKey> {
    values: HashMap<K, Value>,
}

impl<K: ResourceKey> ResourceOverlay<K> {
    /// Create an overlay holding `defaults`.
    pub fn new(defaults: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self {
            values: defaults.into_iter().collect(),
        }
    }

    /// The value stored for `key`.
    pub fn get(&self, key: K) -> Result<&Value, ResourceError> {
        self.values
            .get(&key)
            .ok_or_else(|| ResourceError::MissingKey(key.name().to_string()))
    }

    /// Overwrite the value for `key`, returning the previous one.
    pub fn set(&mut self, key: K, value: impl Into<Value>) -> Option<Value> {
        let value = value.into();
        tracing::trace!(target: targets::RESOURCE, key = key.name(), %value, "set resource");
        self.values.insert(key, value)
    }

    /// Whether `key` currently holds a value.
    pub fn has(&self, key: K) -> bool {
        self.values.contains_key(&key)
    }

    /// Map an option name onto this overlay's declared keys.
    pub fn resolve(&self, name: &str) -> Option<K> {
        K::from_name(name)
    }

    /// Look up a value by option name, if the name is a declared key with a value.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.resolve(name).and_then(|key| self.values.get(&key))
    }
}

impl<K: ResourceKey> fmt::Debug for ResourceOverlay<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for key in K::ALL {
            if let Some(value) = self.values.get(key) {
                map.entry(&key.name(), value);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::resource_keys! {
        enum TestOption {
            ScrollY => "scrolly",
            NormalBackground => "normalbackground",
        }
    }

    #[test]
    fn test_overlay_get_set_has() {
        let mut overlay = ResourceOverlay::new([(TestOption::ScrollY, Value::Bool(false))]);

        assert!(overlay.has(TestOption::ScrollY));
        assert!(!overlay.has(TestOption::NormalBackground));
        assert_eq!(overlay.get(TestOption::ScrollY).unwrap(), &Value::Bool(false));

        let previous = overlay.set(TestOption::ScrollY, true);
        assert_eq!(previous, Some(Value::Bool(false)));
        assert_eq!(overlay.get(TestOption::ScrollY).unwrap(), &Value::Bool(true));
    }

    #[test]
    fn test_overlay_missing_key() {
        let overlay = ResourceOverlay::new([(TestOption::ScrollY, Value::Bool(false))]);
        assert_eq!(
            overlay.get(TestOption::NormalBackground).unwrap_err(),
            ResourceError::MissingKey("normalbackground".into())
        );
    }

    #[test]
    fn test_overlay_resolves_declared_names_only() {
        let overlay = ResourceOverlay::new([(TestOption::NormalBackground, Value::from("#ffffff"))]);
        assert_eq!(overlay.resolve("scrolly"), Some(TestOption::ScrollY));
        assert_eq!(overlay.resolve("background"), None);
        assert_eq!(overlay.get_by_name("normalbackground"), Some(&Value::from("#ffffff")));
        assert_eq!(overlay.get_by_name("scrolly"), None);
    }

    #[test]
    fn test_overlay_debug_lists_names() {
        let overlay = ResourceOverlay::new([(TestOption::ScrollY, Value::Bool(true))]);
        assert_eq!(format!("{overlay:?}"), r#"{"scrolly": Bool(true)}"#);
    }
}
