//! Logging facilities for vidgrab.
//!
//! vidgrab uses the `tracing` crate for instrumentation. Libraries only emit
//! events; the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("vidgrab_widgets=debug")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "vidgrab_core";
    /// Signal dispatch target.
    pub const SIGNAL: &str = "vidgrab_core::signal";
    /// Resource overlay target.
    pub const RESOURCE: &str = "vidgrab_core::resource";
    /// Timer system target.
    pub const TIMER: &str = "vidgrab_core::timer";
    /// Headless toolkit target.
    pub const TOOLKIT: &str = "vidgrab_widgets::toolkit";
    /// Composite widget target.
    pub const WIDGET: &str = "vidgrab_widgets::widget";
    /// Tree/list widget target.
    pub const TREE: &str = "vidgrab_widgets::tree";
    /// Temporary-state and busy guards target.
    pub const GUARD: &str = "vidgrab_widgets::guard";
}
