//! Composite widgets.
//!
//! A composite wraps one primitive widget in a container frame together
//! with decorations (scrollbars, a caption label) and presents the group
//! as a single configurable unit:
//!
//! - [`TextArea`]: text widget, optional vertical scrollbar, per-state
//!   background colors
//! - [`Entry`]: single-line entry, optional caption label and horizontal
//!   scrollbar
//! - [`TreeList`]: tree/list view with optional scrollbars, columns given
//!   at construction and a structured double-click signal
//!
//! # Structure
//!
//! Every composite follows the same pattern. Its virtual options live in
//! a [`ResourceOverlay`](vidgrab_core::ResourceOverlay) keyed by a
//! per-variant enum. A configure call stores each virtual option and emits
//! the matching signal; the composite's private observer reacts by
//! changing the decorations. Only then are native options forwarded to the
//! primitive widget. Reads go to the overlay first and to the primitive
//! widget otherwise.
//!
//! Geometry calls ([`GeometryManaged`](crate::GeometryManaged)) apply to
//! the container frame. `Display` prints the frame's path.
//!
//! # Guards
//!
//! [`StateGuard`] forces a widget into a state for a scope and restores
//! the exact previous state afterwards. [`BusyGuard`] holds a window busy
//! for a scope.

mod entry;
mod guard;
mod text_area;
mod tree_list;

use vidgrab_core::{Options, ResourceKey, Value};

use crate::toolkit::Widget;

pub use entry::{Entry, EntryOption, EntryParts, EntrySignal};
pub use guard::{BusyGuard, StateGuard, with_state};
pub use text_area::{
    DEFAULT_DISABLED_BACKGROUND, DEFAULT_NORMAL_BACKGROUND, TextArea, TextAreaParts,
    TextAreaSignal, TextOption,
};
pub use tree_list::{Column, ItemClick, TreeList, TreeListParts, TreeListSignal, TreeOption};

/// Split `options` into declared virtual options and native ones.
///
/// Both halves keep their original order.
fn split_virtual<K: ResourceKey>(options: Options) -> (Vec<(K, Value)>, Options) {
    let (virtual_options, native) = options.partition(|name| K::from_name(name).is_some());
    let virtual_options = virtual_options
        .into_iter()
        .filter_map(|(name, value)| K::from_name(&name).map(|key| (key, value)))
        .collect();
    (virtual_options, native)
}

/// Scroll command that reports a widget's view to `bar`.
fn scroll_command(bar: &Widget) -> String {
    format!("{} set", bar.path())
}

/// Scrollbar command that moves `target`'s view.
fn view_command(target: &Widget, axis: char) -> String {
    format!("{} {axis}view", target.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    vidgrab_core::resource_keys! {
        enum Probe {
            ScrollX => "scrollx",
        }
    }

    #[test]
    fn test_split_virtual_keeps_order() {
        let options = Options::new()
            .with("width", 10)
            .with("scrollx", true)
            .with("state", "disabled")
            .with("scrollx", false);
        let (virtual_options, native) = split_virtual::<Probe>(options);
        assert_eq!(
            virtual_options,
            vec![(Probe::ScrollX, Value::Bool(true)), (Probe::ScrollX, Value::Bool(false))]
        );
        let names: Vec<&str> = native.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["width", "state"]);
    }
}
