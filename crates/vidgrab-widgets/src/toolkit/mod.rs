//! The headless toolkit.
//!
//! [`Toolkit`] is an in-memory widget toolkit with the same surface the
//! composite widgets need from a real windowing toolkit: a widget tree
//! addressed by paths such as `.!frame.!text`, per-class option tables,
//! packer and grid geometry, themed state flags, scroll reporting to
//! scrollbars, event bindings, busy windows and timers.
//!
//! Nothing is rendered. [`Toolkit::format_tree`] prints the widget tree,
//! which is what the application shows in headless runs and what tests
//! assert on.
//!
//! The toolkit is single-threaded. It is a cheap `Clone` handle to shared
//! state; callbacks (button commands, bindings, timers) run with no
//! internal borrow held, so they may call back into the toolkit.

mod class;
mod dump;
mod geometry;
mod state;
mod treeview;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use slotmap::{SlotMap, new_key_type};
use vidgrab_core::logging::targets;
use vidgrab_core::{Error, OptionError, Options, Result, TimerId, TimerManager, Value};

use crate::color::Color;

pub use class::WidgetClass;
pub use dump::{TreeFormatOptions, TreeStyle};
pub use geometry::{Fill, GridOptions, PackOptions, Placement, Side};
pub use state::{InteractionState, StateFlags};
pub use treeview::{ColumnInfo, HEADING_HEIGHT, InsertIndex, Item, ROW_HEIGHT};

use treeview::{ShowParts, TreeviewData};

new_key_type! {
    /// A unique identifier for a native widget.
    pub struct WidgetId;
}

/// Callback run when a button is invoked.
pub type Command = Rc<dyn Fn() -> Result<()>>;

/// Callback bound to an event sequence such as `<Double-1>`.
pub type EventHandler = Rc<dyn Fn(&Event) -> Result<()>>;

type TimerCallback = Box<dyn FnOnce() -> Result<()>>;

/// Pointer event delivered to bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Event {
    /// X coordinate relative to the widget.
    pub x: i32,
    /// Y coordinate relative to the widget.
    pub y: i32,
}

impl Event {
    /// Event at widget-relative coordinates.
    pub fn at(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Scroll direction of a scrollable widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orient {
    /// Horizontal scrolling (`xscrollcommand`).
    Horizontal,
    /// Vertical scrolling (`yscrollcommand`).
    Vertical,
}

impl Orient {
    /// The option value naming this orientation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }

    fn scroll_option(self) -> &'static str {
        match self {
            Self::Horizontal => "xscrollcommand",
            Self::Vertical => "yscrollcommand",
        }
    }
}

#[derive(Debug)]
enum Content {
    None,
    Text(String),
    Entry(String),
    Tree(TreeviewData),
    Scrollbar { first: f64, last: f64 },
}

impl Content {
    fn for_class(class: WidgetClass) -> Self {
        match class {
            WidgetClass::Text => Self::Text(String::new()),
            WidgetClass::Entry => Self::Entry(String::new()),
            WidgetClass::Treeview => Self::Tree(TreeviewData::new()),
            WidgetClass::Scrollbar => Self::Scrollbar {
                first: 0.0,
                last: 1.0,
            },
            _ => Self::None,
        }
    }
}

struct NativeWidget {
    class: WidgetClass,
    path: String,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    /// Managed children, in packing order.
    slaves: Vec<WidgetId>,
    placement: Option<Placement>,
    options: BTreeMap<String, Value>,
    flags: StateFlags,
    content: Content,
    command: Option<Command>,
    bindings: HashMap<String, EventHandler>,
    busy: bool,
    withdrawn: bool,
    name_counts: HashMap<WidgetClass, u32>,
}

impl NativeWidget {
    fn new(class: WidgetClass, path: String, parent: Option<WidgetId>) -> Self {
        Self {
            class,
            path,
            parent,
            children: Vec::new(),
            slaves: Vec::new(),
            placement: None,
            options: BTreeMap::new(),
            flags: StateFlags::NONE,
            content: Content::for_class(class),
            command: None,
            bindings: HashMap::new(),
            busy: false,
            withdrawn: false,
            name_counts: HashMap::new(),
        }
    }

    fn option(&self, name: &str) -> Value {
        self.options
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.class.default_option(name))
    }

    fn int_option(&self, name: &str) -> i64 {
        self.option(name).as_int().unwrap_or(0)
    }
}

struct ToolkitState {
    widgets: SlotMap<WidgetId, NativeWidget>,
    root: WidgetId,
    timers: TimerManager,
    timer_callbacks: HashMap<TimerId, TimerCallback>,
}

impl ToolkitState {
    fn widget(&self, id: WidgetId) -> Result<&NativeWidget> {
        self.widgets
            .get(id)
            .ok_or_else(|| Error::toolkit("Widget has been destroyed"))
    }

    fn widget_mut(&mut self, id: WidgetId) -> Result<&mut NativeWidget> {
        self.widgets
            .get_mut(id)
            .ok_or_else(|| Error::toolkit("Widget has been destroyed"))
    }

    fn find_path(&self, path: &str) -> Option<WidgetId> {
        self.widgets
            .iter()
            .find(|(_, w)| w.path == path)
            .map(|(id, _)| id)
    }

    fn is_mapped(&self, id: WidgetId) -> bool {
        let Some(widget) = self.widgets.get(id) else {
            return false;
        };
        if widget.class == WidgetClass::Toplevel {
            return !widget.withdrawn;
        }
        match (widget.placement, widget.parent) {
            (Some(_), Some(parent)) => self.is_mapped(parent),
            _ => false,
        }
    }

    fn is_blocked(&self, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            match self.widgets.get(id) {
                Some(widget) if widget.busy => return true,
                Some(widget) => current = widget.parent,
                None => return false,
            }
        }
        false
    }

    fn unmanage(&mut self, id: WidgetId) {
        let parent = self.widgets.get_mut(id).and_then(|w| {
            w.placement = None;
            w.parent
        });
        if let Some(parent) = parent.and_then(|p| self.widgets.get_mut(p)) {
            parent.slaves.retain(|slave| *slave != id);
        }
    }

    /// Visible fraction of a widget's content along `orient`.
    fn scroll_fraction(&self, id: WidgetId, orient: Orient) -> Option<(f64, f64)> {
        let widget = self.widgets.get(id)?;
        let (visible, total) = match (&widget.content, orient) {
            (Content::Text(text), Orient::Vertical) => {
                (widget.int_option("height"), line_count(text) as i64)
            }
            (Content::Text(text), Orient::Horizontal) => (
                widget.int_option("width"),
                text.lines().map(|l| l.chars().count()).max().unwrap_or(0) as i64,
            ),
            (Content::Entry(text), Orient::Horizontal) => {
                (widget.int_option("width"), text.chars().count() as i64)
            }
            (Content::Tree(data), Orient::Vertical) => {
                (widget.int_option("height"), data.displayed_rows().len() as i64)
            }
            (Content::Tree(data), Orient::Horizontal) => {
                let total: i64 = data.columns().iter().map(|c| i64::from(c.width)).sum();
                (total, total)
            }
            _ => return None,
        };
        let last = if total <= visible || total == 0 {
            1.0
        } else {
            visible as f64 / total as f64
        };
        Some((0.0, last))
    }
}

fn line_count(text: &str) -> usize {
    if text.is_empty() {
        0
    } else {
        text.lines().count()
    }
}

/// Handle to a headless toolkit instance.
#[derive(Clone)]
pub struct Toolkit {
    state: Rc<RefCell<ToolkitState>>,
}

impl Toolkit {
    /// Create a toolkit with its root window `.`.
    pub fn new() -> Self {
        let mut widgets = SlotMap::with_key();
        let root = widgets.insert(NativeWidget::new(WidgetClass::Toplevel, ".".into(), None));
        tracing::debug!(target: targets::TOOLKIT, "headless toolkit created");
        Self {
            state: Rc::new(RefCell::new(ToolkitState {
                widgets,
                root,
                timers: TimerManager::new(),
                timer_callbacks: HashMap::new(),
            })),
        }
    }

    /// The root window.
    pub fn root(&self) -> Widget {
        let root = self.state.borrow().root;
        self.handle(root)
    }

    fn handle(&self, id: WidgetId) -> Widget {
        Widget {
            toolkit: self.clone(),
            id,
        }
    }

    /// Wrap an existing widget id in a handle.
    pub fn widget(&self, id: WidgetId) -> Result<Widget> {
        self.state.borrow().widget(id)?;
        Ok(self.handle(id))
    }

    /// Look up a widget by path.
    pub fn lookup(&self, path: &str) -> Option<Widget> {
        let id = self.state.borrow().find_path(path)?;
        Some(self.handle(id))
    }

    /// Create a widget of `class` inside `parent` and apply `options`.
    pub fn create(&self, parent: &Widget, class: WidgetClass, options: Options) -> Result<Widget> {
        let id = {
            let mut state = self.state.borrow_mut();
            let parent_widget = state.widget_mut(parent.id)?;
            let count = parent_widget.name_counts.entry(class).or_insert(0);
            *count += 1;
            let suffix = if *count == 1 {
                String::new()
            } else {
                count.to_string()
            };
            let path = if parent_widget.path == "." {
                format!(".{}{}", class.path_prefix(), suffix)
            } else {
                format!("{}.{}{}", parent_widget.path, class.path_prefix(), suffix)
            };
            let id = state
                .widgets
                .insert(NativeWidget::new(class, path.clone(), Some(parent.id)));
            state.widget_mut(parent.id)?.children.push(id);
            tracing::trace!(target: targets::TOOLKIT, %path, class = class.name(), "widget created");
            id
        };

        if let Err(err) = self.configure(id, options) {
            self.destroy(id);
            return Err(err);
        }
        Ok(self.handle(id))
    }

    /// Create a top-level window.
    pub fn toplevel(&self, title: &str) -> Result<Widget> {
        let root = self.root();
        self.create(&root, WidgetClass::Toplevel, Options::new().with("title", title))
    }

    /// Destroy a widget and all of its descendants.
    pub fn destroy(&self, id: WidgetId) {
        let mut state = self.state.borrow_mut();
        if id == state.root {
            return;
        }
        state.unmanage(id);
        let parent = state.widgets.get(id).and_then(|w| w.parent);
        if let Some(parent) = parent.and_then(|p| state.widgets.get_mut(p)) {
            parent.children.retain(|child| *child != id);
        }
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if let Some(widget) = state.widgets.remove(id) {
                tracing::trace!(target: targets::TOOLKIT, path = %widget.path, "widget destroyed");
                pending.extend(widget.children);
            }
        }
    }

    /// Whether `id` still refers to a live widget.
    pub fn exists(&self, id: WidgetId) -> bool {
        self.state.borrow().widgets.contains_key(id)
    }

    /// Path of a widget.
    pub fn path(&self, id: WidgetId) -> Result<String> {
        Ok(self.state.borrow().widget(id)?.path.clone())
    }

    /// Class of a widget.
    pub fn class(&self, id: WidgetId) -> Result<WidgetClass> {
        Ok(self.state.borrow().widget(id)?.class)
    }

    /// Direct children of a widget, in creation order.
    pub fn children(&self, id: WidgetId) -> Result<Vec<WidgetId>> {
        Ok(self.state.borrow().widget(id)?.children.clone())
    }

    // -------------------------------------------------------------------------
    // Options

    /// Apply native options to a widget.
    ///
    /// Every option name is checked against the widget class before any
    /// option is applied.
    pub fn configure(&self, id: WidgetId, options: Options) -> Result<()> {
        let report = {
            let mut state = self.state.borrow_mut();
            let widget = state.widget_mut(id)?;
            let class = widget.class;
            if let Some((name, _)) = options.iter().find(|(name, _)| !class.knows(name)) {
                return Err(OptionError::UnknownOption {
                    class: class.name(),
                    option: name.to_string(),
                }
                .into());
            }

            let mut report = false;
            for (name, value) in options {
                apply_option(widget, &name, value)?;
                report |= matches!(name.as_str(), "columns" | "height" | "width");
            }
            report
        };
        if report {
            self.report_all_scrolls(id)?;
        }
        Ok(())
    }

    /// Read a native option.
    pub fn cget(&self, id: WidgetId, option: &str) -> Result<Value> {
        let state = self.state.borrow();
        let widget = state.widget(id)?;
        if !widget.class.knows(option) {
            return Err(OptionError::UnknownOption {
                class: widget.class.name(),
                option: option.to_string(),
            }
            .into());
        }
        let value = match (option, &widget.content) {
            ("state", _) if widget.class.is_themed() => Value::from(compat_state(widget.flags)),
            ("columns", Content::Tree(data)) => Value::List(
                data.column_ids().into_iter().map(Value::from).collect(),
            ),
            _ => widget.option(option),
        };
        Ok(value)
    }

    // -------------------------------------------------------------------------
    // Themed state

    /// Current state flags of a themed widget.
    pub fn state_flags(&self, id: WidgetId) -> Result<StateFlags> {
        Ok(self.state.borrow().widget(id)?.flags)
    }

    /// Replace all state flags of a themed widget.
    pub fn set_state_flags(&self, id: WidgetId, flags: StateFlags) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let widget = state.widget_mut(id)?;
        if !widget.class.is_themed() {
            return Err(Error::toolkit(format!("{} has no state flags", widget.path)));
        }
        tracing::trace!(target: targets::TOOLKIT, path = %widget.path, %flags, "state flags set");
        widget.flags = flags;
        Ok(())
    }

    /// Apply a state specification such as `"disabled !readonly"`.
    pub fn apply_state_spec(&self, id: WidgetId, spec: &str) -> Result<()> {
        let mut flags = self.state_flags(id)?;
        flags.apply_spec(spec)?;
        self.set_state_flags(id, flags)
    }

    /// Test a state specification.
    pub fn instate(&self, id: WidgetId, spec: &str) -> Result<bool> {
        Ok(self.state_flags(id)?.matches_spec(spec)?)
    }

    // -------------------------------------------------------------------------
    // Geometry

    /// Pack a widget into its parent.
    ///
    /// A widget that is already packed keeps its position unless `before`
    /// is given.
    pub fn pack(&self, id: WidgetId, options: PackOptions) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let parent = managed_parent(&state, id)?;

        let already_packed = matches!(state.widget(id)?.placement, Some(Placement::Pack(_)));
        let position = match options.before {
            Some(sibling) if sibling == id => {
                return Err(Error::toolkit("Cannot pack a widget before itself"));
            }
            Some(sibling) => {
                if !state.widget(parent)?.slaves.contains(&sibling) {
                    return Err(Error::toolkit(
                        "Widget given as \"before\" isn't managed by the same parent",
                    ));
                }
                state.unmanage(id);
                state.widget(parent)?.slaves.iter().position(|s| *s == sibling)
            }
            None if already_packed => None,
            None => {
                state.unmanage(id);
                Some(state.widget(parent)?.slaves.len())
            }
        };

        if let Some(position) = position {
            state.widget_mut(parent)?.slaves.insert(position, id);
        }
        let widget = state.widget_mut(id)?;
        widget.placement = Some(Placement::Pack(PackOptions {
            before: None,
            ..options
        }));
        tracing::trace!(target: targets::TOOLKIT, path = %widget.path, side = options.side.as_str(), "packed");
        Ok(())
    }

    /// Place a widget in its parent's grid.
    pub fn grid(&self, id: WidgetId, options: GridOptions) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let parent = managed_parent(&state, id)?;
        state.unmanage(id);
        state.widget_mut(parent)?.slaves.push(id);
        state.widget_mut(id)?.placement = Some(Placement::Grid(options));
        Ok(())
    }

    /// Remove a widget from its geometry manager, unmapping it.
    pub fn forget(&self, id: WidgetId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.widget(id)?;
        state.unmanage(id);
        Ok(())
    }

    /// Current placement of a widget.
    pub fn placement(&self, id: WidgetId) -> Result<Option<Placement>> {
        Ok(self.state.borrow().widget(id)?.placement)
    }

    /// Managed children of a widget, in packing order.
    pub fn slaves(&self, id: WidgetId) -> Result<Vec<WidgetId>> {
        Ok(self.state.borrow().widget(id)?.slaves.clone())
    }

    /// Whether a widget is managed and all of its ancestors are mapped.
    pub fn is_mapped(&self, id: WidgetId) -> bool {
        self.state.borrow().is_mapped(id)
    }

    /// Hide a top-level window.
    pub fn withdraw(&self, id: WidgetId) -> Result<()> {
        self.state.borrow_mut().widget_mut(id)?.withdrawn = true;
        Ok(())
    }

    /// Show a withdrawn top-level window.
    pub fn deiconify(&self, id: WidgetId) -> Result<()> {
        self.state.borrow_mut().widget_mut(id)?.withdrawn = false;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Scrolling

    /// Report the visible fraction of a widget to the scrollbar named by its
    /// scroll command option.
    pub fn report_scroll(&self, id: WidgetId, orient: Orient) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let Some((first, last)) = state.scroll_fraction(id, orient) else {
            return Ok(());
        };
        let command = state.widget(id)?.option(orient.scroll_option());
        let Some(command) = command.as_str() else {
            return Ok(());
        };
        let Some(bar_path) = command.strip_suffix(" set") else {
            return Err(Error::toolkit(format!("Unsupported scroll command \"{command}\"")));
        };
        let bar = state
            .find_path(bar_path)
            .ok_or_else(|| Error::toolkit(format!("Bad window path name \"{bar_path}\"")))?;
        if let Content::Scrollbar {
            first: bar_first,
            last: bar_last,
        } = &mut state.widget_mut(bar)?.content
        {
            *bar_first = first;
            *bar_last = last;
        }
        Ok(())
    }

    fn report_all_scrolls(&self, id: WidgetId) -> Result<()> {
        self.report_scroll(id, Orient::Horizontal)?;
        self.report_scroll(id, Orient::Vertical)
    }

    /// Visible fraction last reported to a scrollbar.
    pub fn scrollbar_get(&self, id: WidgetId) -> Result<(f64, f64)> {
        match self.state.borrow().widget(id)?.content {
            Content::Scrollbar { first, last } => Ok((first, last)),
            _ => Err(Error::toolkit("Not a scrollbar")),
        }
    }

    // -------------------------------------------------------------------------
    // Text content

    /// Append text at the end of a text widget.
    ///
    /// Like a real text widget, a disabled one silently ignores edits.
    pub fn text_insert_end(&self, id: WidgetId, text: &str) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            let widget = state.widget_mut(id)?;
            if widget.option("state").as_str() == Some("disabled") {
                tracing::trace!(target: targets::TOOLKIT, path = %widget.path, "insert ignored, widget disabled");
                return Ok(());
            }
            match &mut widget.content {
                Content::Text(content) => content.push_str(text),
                _ => return Err(Error::toolkit("Not a text widget")),
            }
        }
        self.report_all_scrolls(id)
    }

    /// Whole content of a text widget.
    pub fn text_contents(&self, id: WidgetId) -> Result<String> {
        match &self.state.borrow().widget(id)?.content {
            Content::Text(content) => Ok(content.clone()),
            _ => Err(Error::toolkit("Not a text widget")),
        }
    }

    /// Number of lines in a text widget.
    pub fn text_line_count(&self, id: WidgetId) -> Result<usize> {
        self.text_contents(id).map(|content| line_count(&content))
    }

    /// Delete lines `first..last` (zero-based, end exclusive) of a text widget.
    pub fn text_delete_lines(&self, id: WidgetId, first: usize, last: usize) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            let widget = state.widget_mut(id)?;
            if widget.option("state").as_str() == Some("disabled") {
                return Ok(());
            }
            let Content::Text(content) = &mut widget.content else {
                return Err(Error::toolkit("Not a text widget"));
            };
            let kept: String = content
                .split_inclusive('\n')
                .enumerate()
                .filter(|(i, _)| *i < first || *i >= last)
                .map(|(_, line)| line)
                .collect();
            *content = kept;
        }
        self.report_all_scrolls(id)
    }

    // -------------------------------------------------------------------------
    // Entry content

    /// Content of an entry.
    pub fn entry_get(&self, id: WidgetId) -> Result<String> {
        match &self.state.borrow().widget(id)?.content {
            Content::Entry(content) => Ok(content.clone()),
            _ => Err(Error::toolkit("Not an entry widget")),
        }
    }

    /// Replace the content of an entry.
    ///
    /// Disabled and read-only entries ignore edits.
    pub fn entry_set(&self, id: WidgetId, text: &str) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            let widget = state.widget_mut(id)?;
            if widget.flags.contains(StateFlags::DISABLED) || widget.flags.contains(StateFlags::READONLY) {
                return Ok(());
            }
            match &mut widget.content {
                Content::Entry(content) => *content = text.to_string(),
                _ => return Err(Error::toolkit("Not an entry widget")),
            }
        }
        self.report_all_scrolls(id)
    }

    // -------------------------------------------------------------------------
    // Tree view

    fn with_tree<R>(&self, id: WidgetId, f: impl FnOnce(&mut TreeviewData) -> Result<R>) -> Result<R> {
        let mut state = self.state.borrow_mut();
        match &mut state.widget_mut(id)?.content {
            Content::Tree(data) => f(data),
            _ => Err(Error::toolkit("Not a treeview widget")),
        }
    }

    fn tree_show(&self, id: WidgetId) -> Result<ShowParts> {
        Ok(ShowParts::from_value(&self.state.borrow().widget(id)?.option("show")))
    }

    /// Insert an item and return its id.
    pub fn tree_insert(
        &self,
        id: WidgetId,
        parent: &str,
        index: InsertIndex,
        iid: Option<&str>,
        text: &str,
        values: Vec<Value>,
    ) -> Result<String> {
        let iid = self.with_tree(id, |data| data.insert(parent, index, iid, text, values))?;
        self.report_all_scrolls(id)?;
        Ok(iid)
    }

    /// Delete items and their descendants.
    pub fn tree_delete(&self, id: WidgetId, items: &[String]) -> Result<()> {
        self.with_tree(id, |data| items.iter().try_for_each(|iid| data.delete(iid)))?;
        self.report_all_scrolls(id)
    }

    /// Children of `parent` (`""` for top-level items).
    pub fn tree_children(&self, id: WidgetId, parent: &str) -> Result<Vec<String>> {
        self.with_tree(id, |data| data.children(parent))
    }

    /// A copy of an item.
    pub fn tree_item(&self, id: WidgetId, iid: &str) -> Result<Item> {
        self.with_tree(id, |data| {
            data.item(iid)
                .cloned()
                .ok_or_else(|| Error::toolkit(format!("Item {iid} not found")))
        })
    }

    /// Expand or collapse an item.
    pub fn tree_set_open(&self, id: WidgetId, iid: &str, open: bool) -> Result<()> {
        self.with_tree(id, |data| data.set_open(iid, open))?;
        self.report_all_scrolls(id)
    }

    /// Set a column's width.
    pub fn tree_column_width(&self, id: WidgetId, column: &str, width: u32) -> Result<()> {
        self.with_tree(id, |data| {
            data.column_mut(column)?.width = width;
            Ok(())
        })
    }

    /// Set a column's heading text.
    pub fn tree_heading(&self, id: WidgetId, column: &str, text: &str) -> Result<()> {
        self.with_tree(id, |data| {
            data.column_mut(column)?.heading = text.to_string();
            Ok(())
        })
    }

    /// Settings of a column (`#0` for the tree column).
    pub fn tree_column(&self, id: WidgetId, column: &str) -> Result<ColumnInfo> {
        self.with_tree(id, |data| {
            data.column(column)
                .cloned()
                .ok_or_else(|| Error::toolkit(format!("Invalid column index {column}")))
        })
    }

    /// Settings of all data columns, in order.
    pub fn tree_columns(&self, id: WidgetId) -> Result<Vec<ColumnInfo>> {
        self.with_tree(id, |data| Ok(data.columns().to_vec()))
    }

    /// Region at a point: `heading`, `separator`, `tree`, `cell` or `nothing`.
    pub fn tree_identify_region(&self, id: WidgetId, x: i32, y: i32) -> Result<&'static str> {
        let show = self.tree_show(id)?;
        self.with_tree(id, |data| Ok(data.identify_region(show, x, y)))
    }

    /// Display column at `x` as `#n`, or `""`.
    pub fn tree_identify_column(&self, id: WidgetId, x: i32) -> Result<String> {
        let show = self.tree_show(id)?;
        self.with_tree(id, |data| Ok(data.identify_column(show, x)))
    }

    /// Item at `y`, or `""`.
    pub fn tree_identify_row(&self, id: WidgetId, y: i32) -> Result<String> {
        let show = self.tree_show(id)?;
        self.with_tree(id, |data| Ok(data.identify_row(show, y)))
    }

    /// Element at a point, or `""`.
    pub fn tree_identify_element(&self, id: WidgetId, x: i32, y: i32) -> Result<&'static str> {
        let show = self.tree_show(id)?;
        self.with_tree(id, |data| Ok(data.identify_element(show, x, y)))
    }

    // -------------------------------------------------------------------------
    // Commands and bindings

    /// Set the command run when a button is invoked.
    pub fn set_command(&self, id: WidgetId, command: Command) -> Result<()> {
        self.state.borrow_mut().widget_mut(id)?.command = Some(command);
        Ok(())
    }

    /// Invoke a button as if it was clicked.
    ///
    /// Returns `false` without running the command when the button is
    /// disabled, inside a busy window, or has no command.
    pub fn invoke(&self, id: WidgetId) -> Result<bool> {
        let command = {
            let state = self.state.borrow();
            let widget = state.widget(id)?;
            if widget.flags.contains(StateFlags::DISABLED) || state.is_blocked(id) {
                tracing::debug!(target: targets::TOOLKIT, path = %widget.path, "invoke ignored");
                return Ok(false);
            }
            widget.command.clone()
        };
        match command {
            Some(command) => {
                command()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Bind a handler to an event sequence, replacing any previous one.
    pub fn bind(&self, id: WidgetId, sequence: &str, handler: EventHandler) -> Result<()> {
        self.state
            .borrow_mut()
            .widget_mut(id)?
            .bindings
            .insert(sequence.to_string(), handler);
        Ok(())
    }

    /// Deliver a synthetic event to the handler bound to `sequence`.
    ///
    /// Events aimed at widgets inside a busy window are dropped.
    pub fn event_generate(&self, id: WidgetId, sequence: &str, event: Event) -> Result<bool> {
        let handler = {
            let state = self.state.borrow();
            let widget = state.widget(id)?;
            if state.is_blocked(id) {
                return Ok(false);
            }
            widget.bindings.get(sequence).cloned()
        };
        match handler {
            Some(handler) => {
                handler(&event)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // -------------------------------------------------------------------------
    // Busy windows

    /// Mark a window and its descendants busy; they stop receiving input.
    pub fn busy_hold(&self, id: WidgetId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let widget = state.widget_mut(id)?;
        widget.busy = true;
        tracing::debug!(target: targets::TOOLKIT, path = %widget.path, "busy hold");
        Ok(())
    }

    /// Release a busy window.
    pub fn busy_forget(&self, id: WidgetId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let widget = state.widget_mut(id)?;
        widget.busy = false;
        tracing::debug!(target: targets::TOOLKIT, path = %widget.path, "busy forget");
        Ok(())
    }

    /// Whether a window is held busy.
    pub fn busy_status(&self, id: WidgetId) -> Result<bool> {
        Ok(self.state.borrow().widget(id)?.busy)
    }

    // -------------------------------------------------------------------------
    // Timers

    /// Run `callback` once after `delay` of event-loop time.
    pub fn after(&self, delay: Duration, callback: impl FnOnce() -> Result<()> + 'static) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = state.timers.start_one_shot(delay);
        state.timer_callbacks.insert(id, Box::new(callback));
        id
    }

    /// Cancel the timer in `slot`, if any, leaving the slot empty.
    pub fn after_cancel(&self, slot: &mut Option<TimerId>) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = *slot {
            state.timer_callbacks.remove(&id);
        }
        state.timers.cancel(slot);
    }

    /// Advance the event-loop clock, running due timer callbacks in order.
    ///
    /// Returns the number of callbacks run. A failing callback is logged
    /// and does not stop later ones.
    pub fn advance(&self, by: Duration) -> usize {
        let fired = self.state.borrow_mut().timers.advance(by);
        let mut ran = 0;
        for id in fired {
            let callback = self.state.borrow_mut().timer_callbacks.remove(&id);
            if let Some(callback) = callback {
                ran += 1;
                if let Err(err) = callback() {
                    tracing::error!(target: targets::TOOLKIT, ?id, %err, "timer callback failed");
                }
            }
        }
        ran
    }

    /// Current event-loop time.
    pub fn now(&self) -> Duration {
        self.state.borrow().timers.now()
    }

    // -------------------------------------------------------------------------
    // Colors

    /// Resolve a color specification to 16-bit RGB components.
    pub fn winfo_rgb(&self, spec: &str) -> Result<(u16, u16, u16)> {
        Color::parse(spec).map(Color::to_rgb16)
    }
}

impl Default for Toolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Toolkit")
            .field("widgets", &state.widgets.len())
            .field("timers", &state.timers.active_count())
            .finish()
    }
}

/// Parent of a widget that may be placed by a geometry manager.
fn managed_parent(state: &ToolkitState, id: WidgetId) -> Result<WidgetId> {
    let widget = state.widget(id)?;
    match (widget.class, widget.parent) {
        (WidgetClass::Toplevel, _) | (_, None) => Err(Error::toolkit(format!(
            "Cannot manage top-level window {}",
            widget.path
        ))),
        (_, Some(parent)) => Ok(parent),
    }
}

/// Themed `state` option value derived from the flags.
fn compat_state(flags: StateFlags) -> &'static str {
    if flags.contains(StateFlags::DISABLED) {
        "disabled"
    } else if flags.contains(StateFlags::READONLY) {
        "readonly"
    } else {
        "normal"
    }
}

fn apply_option(widget: &mut NativeWidget, name: &str, value: Value) -> Result<()> {
    match name {
        "state" if widget.class.is_themed() => {
            let text = value.expect_str(name)?;
            let (set, clear) = match text {
                "normal" => (StateFlags::NONE, StateFlags::DISABLED | StateFlags::READONLY),
                "disabled" => (StateFlags::DISABLED, StateFlags::READONLY),
                "readonly" => (StateFlags::READONLY, StateFlags::DISABLED),
                other => return Err(OptionError::invalid_value(name, other).into()),
            };
            widget.flags.remove(clear);
            widget.flags.insert(set);
            return Ok(());
        }
        "state" => {
            InteractionState::from_value(&value)?;
        }
        "background" | "foreground" | "insertbackground" | "selectbackground" => {
            Color::parse(value.expect_str(name)?)?;
        }
        "width" | "height" | "padx" | "pady" | "borderwidth" | "wraplength" => {
            value.expect_int(name)?;
        }
        "columns" => {
            let ids = column_ids(&value);
            if let Content::Tree(data) = &mut widget.content {
                data.set_columns(ids);
            }
            return Ok(());
        }
        "xscrollcommand" | "yscrollcommand" | "command" => {
            value.expect_str(name)?;
        }
        _ => {}
    }
    tracing::trace!(target: targets::TOOLKIT, path = %widget.path, option = name, %value, "option set");
    widget.options.insert(name.to_string(), value);
    Ok(())
}

fn column_ids(value: &Value) -> Vec<String> {
    match value {
        Value::List(items) => items.iter().map(ToString::to_string).collect(),
        Value::Null => Vec::new(),
        other => other
            .to_string()
            .split_whitespace()
            .map(str::to_string)
            .collect(),
    }
}

/// Handle to one native widget.
///
/// Cheap to clone; all clones refer to the same widget.
#[derive(Clone)]
pub struct Widget {
    toolkit: Toolkit,
    id: WidgetId,
}

impl Widget {
    /// The widget's id.
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// The toolkit owning this widget.
    pub fn toolkit(&self) -> &Toolkit {
        &self.toolkit
    }

    /// Create a child widget.
    pub fn create(&self, class: WidgetClass, options: Options) -> Result<Widget> {
        self.toolkit.create(self, class, options)
    }

    /// The widget's path, or `""` when it was destroyed.
    pub fn path(&self) -> String {
        self.toolkit.path(self.id).unwrap_or_default()
    }

    /// The widget's class.
    pub fn class(&self) -> Result<WidgetClass> {
        self.toolkit.class(self.id)
    }

    /// Destroy this widget and its descendants.
    pub fn destroy(&self) {
        self.toolkit.destroy(self.id);
    }

    /// Themed state flags.
    pub fn state_flags(&self) -> Result<StateFlags> {
        self.toolkit.state_flags(self.id)
    }

    /// Replace all themed state flags.
    pub fn set_state_flags(&self, flags: StateFlags) -> Result<()> {
        self.toolkit.set_state_flags(self.id, flags)
    }

    /// Apply a state specification such as `"disabled"` or `"!disabled"`.
    pub fn apply_state_spec(&self, spec: &str) -> Result<()> {
        self.toolkit.apply_state_spec(self.id, spec)
    }

    /// Test a state specification.
    pub fn instate(&self, spec: &str) -> Result<bool> {
        self.toolkit.instate(self.id, spec)
    }

    /// Set the command run by [`invoke`](Self::invoke).
    pub fn set_command(&self, command: impl Fn() -> Result<()> + 'static) -> Result<()> {
        self.toolkit.set_command(self.id, Rc::new(command))
    }

    /// Invoke the widget's command as if it was clicked.
    pub fn invoke(&self) -> Result<bool> {
        self.toolkit.invoke(self.id)
    }

    /// Bind a handler to an event sequence.
    pub fn bind(&self, sequence: &str, handler: impl Fn(&Event) -> Result<()> + 'static) -> Result<()> {
        self.toolkit.bind(self.id, sequence, Rc::new(handler))
    }

    /// Deliver a synthetic event.
    pub fn event_generate(&self, sequence: &str, event: Event) -> Result<bool> {
        self.toolkit.event_generate(self.id, sequence, event)
    }

    /// Whether the widget is currently mapped.
    pub fn is_mapped(&self) -> bool {
        self.toolkit.is_mapped(self.id)
    }
}

impl PartialEq for Widget {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Rc::ptr_eq(&self.toolkit.state, &other.toolkit.state)
    }
}

impl Eq for Widget {}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Widget").field(&self.path()).finish()
    }
}
