//! Composite widgets for vidgrab.
//!
//! The crate has three layers:
//!
//! - **Toolkit**: [`Toolkit`] and [`Widget`], a headless widget toolkit with
//!   paths, option tables, packer/grid geometry, state flags, bindings,
//!   busy windows and timers
//! - **Traits**: [`Configurable`], [`Stateful`] and [`GeometryManaged`], the
//!   seam between application code and any widget
//! - **Composites**: [`TextArea`], [`Entry`] and [`TreeList`], which group a
//!   primitive with its decorations and expose virtual options backed by a
//!   [`ResourceOverlay`](vidgrab_core::ResourceOverlay)
//!
//! # Example
//!
//! ```
//! use vidgrab_core::{Options, Value};
//! use vidgrab_widgets::{Configurable, Entry, GeometryManaged, PackOptions, Toolkit};
//!
//! let tk = Toolkit::new();
//! let url = Entry::new(&tk.root(), Options::new().with("text", "URL")).unwrap();
//! url.pack(PackOptions::new()).unwrap();
//!
//! url.configure(Options::new().with("scrollx", true)).unwrap();
//! assert_eq!(url.cget("scrollx").unwrap(), Value::Bool(true));
//! assert_eq!(url.cget("text").unwrap(), Value::from("URL"));
//! ```

pub mod color;
pub mod toolkit;
mod traits;
pub mod widget;

pub use color::Color;
pub use toolkit::{
    ColumnInfo, Event, Fill, GridOptions, InsertIndex, InteractionState, Item, Orient,
    PackOptions, Placement, Side, StateFlags, Toolkit, TreeFormatOptions, TreeStyle, Widget,
    WidgetClass, WidgetId,
};
pub use traits::{Configurable, GeometryManaged, Stateful};
pub use widget::{
    BusyGuard, Column, Entry, EntryOption, EntrySignal, ItemClick, StateGuard, TextArea,
    TextAreaSignal, TextOption, TreeList, TreeListSignal, TreeOption, with_state,
};
