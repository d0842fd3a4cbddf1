//! Dynamic values carried by configuration calls and signal emissions.
//!
//! Widgets are configured through string-keyed options whose values are
//! [`Value`]s, and signals deliver their arguments as [`Args`]: an ordered
//! list of positional values plus a keyword map.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{OptionError, SignalError};

/// A dynamically typed option or argument value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating point number.
    Float(f64),
    /// A string value.
    Str(String),
    /// A list of values.
    List(Vec<Value>),
}

impl Value {
    /// Short name of the contained type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns this value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns this value as a float. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns this value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Returns this value as a list, if it is one.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    /// Extract a boolean for `option`, or report a type mismatch.
    pub fn expect_bool(&self, option: &str) -> Result<bool, OptionError> {
        self.as_bool().ok_or_else(|| self.mismatch(option, "bool"))
    }

    /// Extract an integer for `option`, or report a type mismatch.
    pub fn expect_int(&self, option: &str) -> Result<i64, OptionError> {
        self.as_int().ok_or_else(|| self.mismatch(option, "int"))
    }

    /// Extract a string for `option`, or report a type mismatch.
    pub fn expect_str(&self, option: &str) -> Result<&str, OptionError> {
        self.as_str().ok_or_else(|| self.mismatch(option, "string"))
    }

    fn mismatch(&self, option: &str, expected: &'static str) -> OptionError {
        OptionError::TypeMismatch {
            option: option.to_string(),
            expected,
            got: self.type_name(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Str(v.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Arguments delivered with a signal emission.
///
/// Positional values keep their order; keywords are unique by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Args {
    positional: Vec<Value>,
    keywords: BTreeMap<String, Value>,
}

impl Args {
    /// Create an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument, replacing any previous value.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    /// The positional arguments, in order.
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// The keyword arguments.
    pub fn keywords(&self) -> &BTreeMap<String, Value> {
        &self.keywords
    }

    /// Positional argument at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Keyword argument called `name`.
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords.get(name)
    }

    /// Positional argument at `index`, or a [`SignalError::MissingArgument`]
    /// naming `signal`.
    pub fn require(&self, signal: &str, index: usize) -> Result<&Value, SignalError> {
        self.get(index).ok_or_else(|| SignalError::MissingArgument {
            signal: signal.to_string(),
            index,
        })
    }

    /// Number of positional arguments.
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    /// True when there are neither positional nor keyword arguments.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }

    /// Combine emission arguments with arguments bound at connect time.
    ///
    /// Bound positionals are appended after the emission's own; bound
    /// keywords overwrite emission keywords of the same name.
    pub fn combined(&self, bound: &Args) -> Args {
        let mut positional = Vec::with_capacity(self.positional.len() + bound.positional.len());
        positional.extend(self.positional.iter().cloned());
        positional.extend(bound.positional.iter().cloned());

        let mut keywords = self.keywords.clone();
        for (name, value) in &bound.keywords {
            keywords.insert(name.clone(), value.clone());
        }

        Args {
            positional,
            keywords,
        }
    }
}

/// An ordered list of `name = value` configuration options.
///
/// Later entries for the same name win, matching how a keyword call with
/// repeated options would behave.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Options {
    entries: Vec<(String, Value)>,
}

impl Options {
    /// Create an empty option list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    /// Append an option.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((name.into(), value.into()));
    }

    /// The last value given for `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Whether any entry is called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }

    /// Remove every entry called `name`, returning the last value.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        let mut taken = None;
        self.entries.retain(|(key, value)| {
            if key == name {
                taken = Some(value.clone());
                false
            } else {
                true
            }
        });
        taken
    }

    /// Split entries into those accepted by `predicate` and the rest,
    /// preserving order in both halves.
    pub fn partition<F>(self, mut predicate: F) -> (Options, Options)
    where
        F: FnMut(&str) -> bool,
    {
        let (matched, rest): (Vec<_>, Vec<_>) = self
            .entries
            .into_iter()
            .partition(|(name, _)| predicate(name));
        (Options { entries: matched }, Options { entries: rest })
    }

    /// Iterate over the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Options {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(7).as_int(), Some(7));
        assert_eq!(Value::from(7).as_float(), Some(7.0));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert!(Value::from(None::<String>).is_null());
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "a b");
    }

    #[test]
    fn test_value_type_mismatch() {
        let err = Value::from("yes").expect_bool("scrolly").unwrap_err();
        assert_eq!(
            err,
            OptionError::TypeMismatch {
                option: "scrolly".into(),
                expected: "bool",
                got: "string",
            }
        );
    }

    #[test]
    fn test_args_combined_order() {
        let emitted = Args::new().arg(1).arg(2).kwarg("mode", "emit").kwarg("keep", 1);
        let bound = Args::new().arg(3).kwarg("mode", "bound");

        let combined = emitted.combined(&bound);
        assert_eq!(
            combined.positional(),
            &[Value::Int(1), Value::Int(2), Value::Int(3)]
        );
        assert_eq!(combined.keyword("mode"), Some(&Value::from("bound")));
        assert_eq!(combined.keyword("keep"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_args_require() {
        let args = Args::new().arg(true);
        assert_eq!(args.require("sig", 0).unwrap(), &Value::Bool(true));
        assert_eq!(
            args.require("sig", 1).unwrap_err(),
            SignalError::MissingArgument {
                signal: "sig".into(),
                index: 1
            }
        );
    }

    #[test]
    fn test_options_last_wins_and_partition() {
        let mut options = Options::new()
            .with("width", 10)
            .with("scrolly", true)
            .with("width", 20);
        assert_eq!(options.get("width"), Some(&Value::Int(20)));

        let (virtual_opts, native) = options.clone().partition(|name| name == "scrolly");
        assert_eq!(virtual_opts.len(), 1);
        assert_eq!(native.len(), 2);

        assert_eq!(options.take("width"), Some(Value::Int(20)));
        assert!(!options.contains("width"));
        assert_eq!(options.len(), 1);
    }
}
