//! Error types for vidgrab.

/// The main error type for vidgrab widget and signal operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Signal-related error.
    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    /// Resource-overlay error.
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Configuration-option error.
    #[error("Option error: {0}")]
    Option(#[from] OptionError),

    /// Timer-related error.
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// The color specification is neither a known name nor `#rrggbb`.
    #[error("Unknown color name \"{0}\"")]
    InvalidColor(String),

    /// The toolkit rejected an operation.
    #[error("Toolkit error: {0}")]
    Toolkit(String),
}

impl Error {
    /// Create a toolkit error.
    pub fn toolkit(message: impl Into<String>) -> Self {
        Self::Toolkit(message.into())
    }
}

/// Signal-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// An observer was notified of a signal it does not handle.
    #[error("Invalid signal \"{0}\"")]
    InvalidSignal(String),

    /// No subscriber matched the disconnect request.
    #[error("Subscriber is not connected to signal \"{signal}\"")]
    NotConnected {
        /// Name of the signal.
        signal: String,
    },

    /// The object owning the signal has been dropped.
    #[error("Owner of signal \"{signal}\" has been dropped")]
    OwnerDropped {
        /// Name of the signal.
        signal: String,
    },

    /// An observer is already handling a notification further up the stack.
    #[error("Observer re-entered while handling signal \"{signal}\"")]
    Reentrant {
        /// Name of the signal.
        signal: String,
    },

    /// The emission did not carry an argument the subscriber requires.
    #[error("Signal \"{signal}\" is missing argument {index}")]
    MissingArgument {
        /// Name of the signal.
        signal: String,
        /// Index of the missing positional argument.
        index: usize,
    },
}

/// Resource-overlay errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    /// The overlay does not hold the requested key.
    #[error("Missing resource key \"{0}\"")]
    MissingKey(String),
}

/// Errors raised while reading or writing configuration options.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    /// The widget class does not know this option.
    #[error("Unknown option \"{option}\" for {class}")]
    UnknownOption {
        /// Widget class name.
        class: &'static str,
        /// The rejected option name.
        option: String,
    },

    /// The value has the wrong type for this option.
    #[error("Option \"{option}\" expects {expected}, got {got}")]
    TypeMismatch {
        /// Option name.
        option: String,
        /// Expected value type.
        expected: &'static str,
        /// Actual value type.
        got: &'static str,
    },

    /// The value has the right type but is not accepted.
    #[error("Invalid value \"{value}\" for option \"{option}\"")]
    InvalidValue {
        /// Option name.
        option: String,
        /// Rendered value.
        value: String,
    },
}

impl OptionError {
    /// Create an invalid-value error.
    pub fn invalid_value(option: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidValue {
            option: option.into(),
            value: value.to_string(),
        }
    }
}

/// Timer-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// The timer ID is invalid or has already been removed.
    #[error("Invalid or expired timer ID")]
    InvalidTimerId,
}

/// A specialized Result type for vidgrab core operations.
pub type Result<T> = std::result::Result<T, Error>;
