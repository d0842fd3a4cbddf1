//! Widget interaction states.
//!
//! Classic widgets (the text widget) have a single `normal`/`disabled`
//! state option. Themed widgets carry a set of independent flags that are
//! changed with state specifications such as `"disabled !readonly"`.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use vidgrab_core::{OptionError, Value};

/// Binary state of a classic widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    /// Accepts input.
    #[default]
    Normal,
    /// Ignores input and edits.
    Disabled,
}

impl InteractionState {
    /// The option value naming this state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Disabled => "disabled",
        }
    }

    /// Parse `normal` or `disabled`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "normal" => Some(Self::Normal),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }

    /// Parse the value of a `state` option.
    pub fn from_value(value: &Value) -> Result<Self, OptionError> {
        let text = value.expect_str("state")?;
        Self::parse(text).ok_or_else(|| OptionError::invalid_value("state", text))
    }
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<InteractionState> for Value {
    fn from(state: InteractionState) -> Self {
        Value::Str(state.as_str().to_string())
    }
}

/// Set of themed-widget state flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateFlags(u16);

impl StateFlags {
    /// No flags set.
    pub const NONE: StateFlags = StateFlags(0);
    /// The pointer is over the widget.
    pub const ACTIVE: StateFlags = StateFlags(1 << 0);
    /// The widget ignores user input.
    pub const DISABLED: StateFlags = StateFlags(1 << 1);
    /// The widget has keyboard focus.
    pub const FOCUS: StateFlags = StateFlags(1 << 2);
    /// The widget is being pressed.
    pub const PRESSED: StateFlags = StateFlags(1 << 3);
    /// The widget is selected.
    pub const SELECTED: StateFlags = StateFlags(1 << 4);
    /// The widget's window is in the background.
    pub const BACKGROUND: StateFlags = StateFlags(1 << 5);
    /// The widget does not allow edits.
    pub const READONLY: StateFlags = StateFlags(1 << 6);
    /// Widget-specific alternate display.
    pub const ALTERNATE: StateFlags = StateFlags(1 << 7);
    /// The widget's value is invalid.
    pub const INVALID: StateFlags = StateFlags(1 << 8);
    /// The pointer hovers the widget.
    pub const HOVER: StateFlags = StateFlags(1 << 9);

    const NAMES: [(&'static str, StateFlags); 10] = [
        ("active", Self::ACTIVE),
        ("disabled", Self::DISABLED),
        ("focus", Self::FOCUS),
        ("pressed", Self::PRESSED),
        ("selected", Self::SELECTED),
        ("background", Self::BACKGROUND),
        ("readonly", Self::READONLY),
        ("alternate", Self::ALTERNATE),
        ("invalid", Self::INVALID),
        ("hover", Self::HOVER),
    ];

    /// Look up a single flag by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(flag_name, _)| *flag_name == name)
            .map(|(_, flag)| *flag)
    }

    /// Check if all flags in `other` are set.
    pub fn contains(&self, other: StateFlags) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if no flag is set.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Set the flags in `other`.
    pub fn insert(&mut self, other: StateFlags) {
        self.0 |= other.0;
    }

    /// Clear the flags in `other`.
    pub fn remove(&mut self, other: StateFlags) {
        self.0 &= !other.0;
    }

    /// Names of the set flags, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        Self::NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
    }

    /// Apply a state specification such as `"disabled !readonly"`.
    ///
    /// Each word sets the named flag; a leading `!` clears it. The whole
    /// specification is validated before any flag changes.
    pub fn apply_spec(&mut self, spec: &str) -> Result<(), OptionError> {
        let mut set = StateFlags::NONE;
        let mut clear = StateFlags::NONE;
        for word in spec.split_whitespace() {
            let (negated, name) = match word.strip_prefix('!') {
                Some(name) => (true, name),
                None => (false, word),
            };
            let flag =
                Self::from_name(name).ok_or_else(|| OptionError::invalid_value("state", word))?;
            if negated {
                clear.insert(flag);
            } else {
                set.insert(flag);
            }
        }
        self.remove(clear);
        self.insert(set);
        Ok(())
    }

    /// Test a state specification: every plain flag set and every `!flag` clear.
    pub fn matches_spec(&self, spec: &str) -> Result<bool, OptionError> {
        for word in spec.split_whitespace() {
            let (negated, name) = match word.strip_prefix('!') {
                Some(name) => (true, name),
                None => (false, word),
            };
            let flag =
                Self::from_name(name).ok_or_else(|| OptionError::invalid_value("state", word))?;
            if self.contains(flag) == negated {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl BitOr for StateFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        StateFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for StateFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for StateFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.names().collect();
        f.write_str(&names.join(" "))
    }
}

impl From<StateFlags> for Value {
    fn from(flags: StateFlags) -> Self {
        Value::List(flags.names().map(Value::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_state_parse() {
        assert_eq!(InteractionState::parse("disabled"), Some(InteractionState::Disabled));
        assert_eq!(InteractionState::parse("readonly"), None);
        assert!(InteractionState::from_value(&Value::from("bogus")).is_err());
        assert!(matches!(
            InteractionState::from_value(&Value::Int(1)),
            Err(OptionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_apply_spec() {
        let mut flags = StateFlags::READONLY;
        flags.apply_spec("disabled !readonly").unwrap();
        assert_eq!(flags, StateFlags::DISABLED);
        assert_eq!(flags.to_string(), "disabled");
    }

    #[test]
    fn test_apply_spec_is_all_or_nothing() {
        let mut flags = StateFlags::FOCUS;
        assert!(flags.apply_spec("disabled !bogus").is_err());
        assert_eq!(flags, StateFlags::FOCUS);
    }

    #[test]
    fn test_matches_spec() {
        let flags = StateFlags::DISABLED | StateFlags::FOCUS;
        assert!(flags.matches_spec("disabled").unwrap());
        assert!(flags.matches_spec("focus !readonly").unwrap());
        assert!(!flags.matches_spec("!disabled").unwrap());
        assert!(flags.matches_spec("").unwrap());
    }

    #[test]
    fn test_flags_to_value() {
        let value = Value::from(StateFlags::ACTIVE | StateFlags::HOVER);
        assert_eq!(value, Value::List(vec!["active".into(), "hover".into()]));
    }
}
