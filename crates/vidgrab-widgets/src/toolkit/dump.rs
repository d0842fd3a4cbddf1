//! Widget tree visualization.
//!
//! Headless runs have no screen; the widget tree, printed in geometry
//! order with each widget's class and visible content, stands in for one.
//!
//! ```ignore
//! let tk = Toolkit::new();
//! // ... build widgets ...
//! println!("{}", tk.format_tree(tk.root().id(), &TreeFormatOptions::default())?);
//! ```

use std::fmt::{self, Write as FmtWrite};

use vidgrab_core::{Error, Result};

use super::{Content, NativeWidget, Toolkit, ToolkitState, WidgetClass, WidgetId};

/// Style options for widget tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for widget tree output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show class names.
    pub show_classes: bool,
    /// Whether to include widgets no geometry manager placed.
    pub show_unmapped: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_classes: true,
            show_unmapped: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_unmapped: true,
            ..Default::default()
        }
    }

    /// Options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_classes: false,
            style: TreeStyle::Ascii,
            ..Default::default()
        }
    }
}

impl Toolkit {
    /// Format the subtree rooted at `root`.
    pub fn format_tree(&self, root: WidgetId, options: &TreeFormatOptions) -> Result<String> {
        let state = self.state.borrow();
        state.widget(root)?;
        let mut output = String::new();
        TreeWriter {
            state: &state,
            options,
        }
        .write_subtree(root, &[], &mut output)
        .map_err(|_| Error::toolkit("Failed to format widget tree"))?;
        Ok(output)
    }
}

struct TreeWriter<'a> {
    state: &'a ToolkitState,
    options: &'a TreeFormatOptions,
}

impl TreeWriter<'_> {
    /// `ancestors_last[i]` tells whether the ancestor at depth `i + 1` was
    /// the last of its siblings; its length is the current depth.
    fn write_subtree(&self, id: WidgetId, ancestors_last: &[bool], out: &mut String) -> fmt::Result {
        let depth = ancestors_last.len();
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }
        let Some(widget) = self.state.widgets.get(id) else {
            return Ok(());
        };

        out.push_str(&self.prefix(ancestors_last));
        self.write_line(id, widget, out)?;
        out.push('\n');

        let children = self.visible_children(widget);
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            let mut path = ancestors_last.to_vec();
            path.push(i + 1 == count);
            self.write_subtree(child, &path, out)?;
        }
        Ok(())
    }

    /// Managed children in geometry order, then (optionally) the rest.
    fn visible_children(&self, widget: &NativeWidget) -> Vec<WidgetId> {
        let mut children: Vec<WidgetId> = widget.slaves.clone();
        for child in &widget.children {
            let Some(native) = self.state.widgets.get(*child) else {
                continue;
            };
            let listed = children.contains(child);
            let toplevel = native.class == WidgetClass::Toplevel;
            if !listed && (toplevel || self.options.show_unmapped) {
                children.push(*child);
            }
        }
        children
    }

    fn prefix(&self, ancestors_last: &[bool]) -> String {
        let Some((is_last, parents)) = ancestors_last.split_last() else {
            return String::new();
        };
        let (branch, corner, last_corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for parent_last in parents {
            prefix.push_str(if *parent_last { " " } else { branch });
            for _ in 0..self.options.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if *is_last { last_corner } else { corner });
        prefix.push(' ');
        prefix
    }

    fn write_line(&self, id: WidgetId, widget: &NativeWidget, out: &mut String) -> fmt::Result {
        out.push_str(&widget.path);
        if self.options.show_classes {
            write!(out, " ({})", widget.class.name())?;
        }

        match &widget.content {
            Content::Text(text) => {
                let lines = if text.is_empty() { 0 } else { text.lines().count() };
                write!(out, " [{lines} lines]")?;
            }
            Content::Entry(text) => write!(out, " = {text:?}")?,
            Content::Tree(data) => {
                let headings: Vec<String> = data
                    .columns()
                    .iter()
                    .map(|c| format!("{}:{}", c.heading, c.width))
                    .collect();
                write!(
                    out,
                    " [{}] {} rows",
                    headings.join(", "),
                    data.displayed_rows().len()
                )?;
            }
            Content::Scrollbar { first, last } => write!(out, " [{first:.2}-{last:.2}]")?,
            Content::None => {}
        }

        match widget.class {
            WidgetClass::Toplevel => {
                if let Some(title) = widget.options.get("title") {
                    write!(out, " {:?}", title.to_string())?;
                }
            }
            WidgetClass::Label | WidgetClass::Button => {
                let text = widget.option("text");
                write!(out, " {:?}", text.to_string())?;
            }
            WidgetClass::Text => {
                if let Some(background) = widget.options.get("background") {
                    write!(out, " bg={background}")?;
                }
                if widget.option("state").as_str() == Some("disabled") {
                    out.push_str(" {disabled}");
                }
            }
            _ => {}
        }

        if !widget.flags.is_empty() {
            write!(out, " {{{}}}", widget.flags)?;
        }
        if widget.busy {
            out.push_str(" busy");
        }
        if !self.state.is_mapped(id) {
            out.push_str(" (unmapped)");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use vidgrab_core::Options;

    use super::*;
    use crate::toolkit::PackOptions;

    #[test]
    fn test_format_tree_in_pack_order() {
        let tk = Toolkit::new();
        let root = tk.root();
        let frame = root.create(WidgetClass::Frame, Options::new()).unwrap();
        let label = frame
            .create(WidgetClass::Label, Options::new().with("text", "Title"))
            .unwrap();
        let button = frame
            .create(WidgetClass::Button, Options::new().with("text", "Go"))
            .unwrap();
        tk.pack(frame.id(), PackOptions::new()).unwrap();
        tk.pack(button.id(), PackOptions::new()).unwrap();
        tk.pack(label.id(), PackOptions::new().before(button.id())).unwrap();

        let options = TreeFormatOptions::minimal();
        let tree = tk.format_tree(root.id(), &options).unwrap();
        assert_eq!(
            tree,
            ".\n\
             `-- .!frame\n   \
             +-- .!frame.!label \"Title\"\n   \
             `-- .!frame.!button \"Go\"\n"
        );
    }

    #[test]
    fn test_unmapped_widgets_hidden_by_default() {
        let tk = Toolkit::new();
        let root = tk.root();
        root.create(WidgetClass::Entry, Options::new()).unwrap();

        let tree = tk.format_tree(root.id(), &TreeFormatOptions::default()).unwrap();
        assert!(!tree.contains(".!entry"));

        let tree = tk.format_tree(root.id(), &TreeFormatOptions::detailed()).unwrap();
        assert!(tree.contains(".!entry (TEntry) = \"\" (unmapped)"));
    }
}
