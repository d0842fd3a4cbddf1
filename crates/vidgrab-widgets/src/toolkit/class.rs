//! Primitive widget classes and their option tables.

use vidgrab_core::Value;

/// Primitive widget class provided by the toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetClass {
    /// Top-level window.
    Toplevel,
    /// Themed container frame.
    Frame,
    /// Themed static label.
    Label,
    /// Themed push button.
    Button,
    /// Themed single-line entry.
    Entry,
    /// Classic multi-line text widget.
    Text,
    /// Themed scrollbar.
    Scrollbar,
    /// Themed tree/list view.
    Treeview,
}

const TOPLEVEL_OPTIONS: &[&str] = &["title", "width", "height", "background", "padx", "pady"];

const FRAME_OPTIONS: &[&str] = &[
    "padding",
    "width",
    "height",
    "relief",
    "borderwidth",
    "style",
    "class",
    "cursor",
    "takefocus",
];

const LABEL_OPTIONS: &[&str] = &[
    "text",
    "anchor",
    "justify",
    "padding",
    "width",
    "wraplength",
    "relief",
    "borderwidth",
    "foreground",
    "background",
    "font",
    "image",
    "compound",
    "underline",
    "textvariable",
    "state",
    "style",
    "class",
    "cursor",
    "takefocus",
];

const BUTTON_OPTIONS: &[&str] = &[
    "text",
    "width",
    "padding",
    "default",
    "image",
    "compound",
    "underline",
    "textvariable",
    "state",
    "style",
    "class",
    "cursor",
    "takefocus",
];

const ENTRY_OPTIONS: &[&str] = &[
    "width",
    "show",
    "justify",
    "font",
    "foreground",
    "background",
    "exportselection",
    "validate",
    "textvariable",
    "xscrollcommand",
    "state",
    "style",
    "class",
    "cursor",
    "takefocus",
];

const TEXT_OPTIONS: &[&str] = &[
    "state",
    "background",
    "foreground",
    "insertbackground",
    "selectbackground",
    "width",
    "height",
    "wrap",
    "font",
    "padx",
    "pady",
    "relief",
    "borderwidth",
    "highlightthickness",
    "spacing1",
    "tabs",
    "undo",
    "xscrollcommand",
    "yscrollcommand",
    "cursor",
    "takefocus",
];

const SCROLLBAR_OPTIONS: &[&str] = &["orient", "command", "style", "class", "cursor", "takefocus"];

const TREEVIEW_OPTIONS: &[&str] = &[
    "columns",
    "displaycolumns",
    "show",
    "height",
    "selectmode",
    "padding",
    "xscrollcommand",
    "yscrollcommand",
    "style",
    "class",
    "cursor",
    "takefocus",
];

impl WidgetClass {
    /// The toolkit's class name, as reported by `winfo class`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Toplevel => "Toplevel",
            Self::Frame => "TFrame",
            Self::Label => "TLabel",
            Self::Button => "TButton",
            Self::Entry => "TEntry",
            Self::Text => "Text",
            Self::Scrollbar => "TScrollbar",
            Self::Treeview => "Treeview",
        }
    }

    /// Prefix of generated path components (`!frame`, `!frame2`, ...).
    pub(crate) fn path_prefix(self) -> &'static str {
        match self {
            Self::Toplevel => "!toplevel",
            Self::Frame => "!frame",
            Self::Label => "!label",
            Self::Button => "!button",
            Self::Entry => "!entry",
            Self::Text => "!text",
            Self::Scrollbar => "!scrollbar",
            Self::Treeview => "!treeview",
        }
    }

    /// Whether the class uses themed multi-flag state.
    pub fn is_themed(self) -> bool {
        !matches!(self, Self::Toplevel | Self::Text)
    }

    /// Options this class understands.
    pub fn known_options(self) -> &'static [&'static str] {
        match self {
            Self::Toplevel => TOPLEVEL_OPTIONS,
            Self::Frame => FRAME_OPTIONS,
            Self::Label => LABEL_OPTIONS,
            Self::Button => BUTTON_OPTIONS,
            Self::Entry => ENTRY_OPTIONS,
            Self::Text => TEXT_OPTIONS,
            Self::Scrollbar => SCROLLBAR_OPTIONS,
            Self::Treeview => TREEVIEW_OPTIONS,
        }
    }

    /// Check whether `option` is a native option of this class.
    pub fn knows(self, option: &str) -> bool {
        self.known_options().contains(&option)
    }

    /// Default value of an option that was never configured.
    pub(crate) fn default_option(self, option: &str) -> Value {
        match (self, option) {
            (Self::Text, "state") => Value::from("normal"),
            (Self::Text, "background") => Value::from("#ffffff"),
            (Self::Text, "foreground") => Value::from("#000000"),
            (Self::Text, "width") => Value::Int(80),
            (Self::Text, "height") => Value::Int(24),
            (Self::Text, "wrap") => Value::from("char"),
            (Self::Entry, "width") => Value::Int(20),
            (Self::Treeview, "show") => Value::List(vec!["tree".into(), "headings".into()]),
            (Self::Treeview, "height") => Value::Int(10),
            (Self::Treeview, "selectmode") => Value::from("extended"),
            (Self::Scrollbar, "orient") => Value::from("vertical"),
            (_, "text") => Value::from(""),
            _ => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_options() {
        assert!(WidgetClass::Text.knows("yscrollcommand"));
        assert!(!WidgetClass::Text.knows("scrolly"));
        assert!(WidgetClass::Treeview.knows("columns"));
        assert!(!WidgetClass::Entry.knows("text"));
    }

    #[test]
    fn test_themed_classes() {
        assert!(WidgetClass::Entry.is_themed());
        assert!(!WidgetClass::Text.is_themed());
    }
}
