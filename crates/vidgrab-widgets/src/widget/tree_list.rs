//! Tree/list view with optional scrollbars and a structured
//! double-click signal.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use vidgrab_core::logging::targets;
use vidgrab_core::{
    Args, Observer, Options, ResourceKey, ResourceOverlay, Result, Signal, SignalError, Value,
};

use super::{scroll_command, split_virtual, view_command};
use crate::toolkit::{Event, Fill, InsertIndex, PackOptions, Side, StateFlags, Widget, WidgetClass};
use crate::traits::{Configurable, GeometryManaged, Stateful};

/// Event sequence that reports a double click.
const DOUBLE_CLICK: &str = "<Double-1>";

vidgrab_core::resource_keys! {
    /// Virtual options of a [`TreeList`].
    pub enum TreeOption {
        /// Show the horizontal scrollbar.
        ScrollX => "scrollx",
        /// Show the vertical scrollbar.
        ScrollY => "scrolly",
    }
}

/// Signals emitted by a [`TreeList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeListSignal {
    /// `x_scrollbar_changed(shown)`
    XScrollbarChanged,
    /// `y_scrollbar_changed(shown)`
    YScrollbarChanged,
    /// `item_doubleclicked(region=, column=, row=, element=)`, see [`ItemClick`].
    ItemDoubleClicked,
}

impl TreeListSignal {
    /// Every signal, in declaration order.
    pub const ALL: [Self; 3] = [
        Self::XScrollbarChanged,
        Self::YScrollbarChanged,
        Self::ItemDoubleClicked,
    ];

    /// The signal's name.
    pub fn name(self) -> &'static str {
        match self {
            Self::XScrollbarChanged => "x_scrollbar_changed",
            Self::YScrollbarChanged => "y_scrollbar_changed",
            Self::ItemDoubleClicked => "item_doubleclicked",
        }
    }

    /// Look up a signal by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|signal| signal.name() == name)
    }
}

/// A data column given at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column identifier.
    pub id: String,
    /// Heading text.
    pub heading: String,
    /// Width in pixels.
    pub width: u32,
}

impl Column {
    /// Create a column description.
    pub fn new(id: impl Into<String>, heading: impl Into<String>, width: u32) -> Self {
        Self {
            id: id.into(),
            heading: heading.into(),
            width,
        }
    }
}

impl From<(&str, &str, u32)> for Column {
    fn from((id, heading, width): (&str, &str, u32)) -> Self {
        Self::new(id, heading, width)
    }
}

/// Hit-test result carried by `item_doubleclicked`.
///
/// Each field is `""` when nothing was hit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemClick {
    /// `heading`, `separator`, `tree`, `cell` or `nothing`.
    pub region: String,
    /// Display column as `#n`; `#0` is the tree column.
    pub column: String,
    /// Item id of the row.
    pub row: String,
    /// Element under the pointer.
    pub element: String,
}

impl ItemClick {
    /// Read the keyword arguments of an `item_doubleclicked` emission.
    pub fn from_args(args: &Args) -> Self {
        let keyword = |name: &str| args.keyword(name).map(ToString::to_string).unwrap_or_default();
        Self {
            region: keyword("region"),
            column: keyword("column"),
            row: keyword("row"),
            element: keyword("element"),
        }
    }

    /// Whether a data cell (not the tree column) was hit.
    pub fn is_cell(&self) -> bool {
        self.region == "cell"
    }

    /// Index of the hit column, `0` being the tree column.
    pub fn column_index(&self) -> Option<usize> {
        self.column.strip_prefix('#')?.parse().ok()
    }

    fn to_args(&self) -> Args {
        Args::new()
            .kwarg("region", self.region.as_str())
            .kwarg("column", self.column.as_str())
            .kwarg("row", self.row.as_str())
            .kwarg("element", self.element.as_str())
    }
}

/// The widgets and overlay making up a [`TreeList`].
pub struct TreeListParts {
    frame: Widget,
    tree: Widget,
    xbar: Widget,
    ybar: Widget,
    overlay: ResourceOverlay<TreeOption>,
    root: String,
}

impl TreeListParts {
    /// The container frame.
    pub fn frame(&self) -> &Widget {
        &self.frame
    }

    /// The wrapped tree view.
    pub fn tree(&self) -> &Widget {
        &self.tree
    }

    /// The horizontal scrollbar.
    pub fn x_scrollbar(&self) -> &Widget {
        &self.xbar
    }

    /// The vertical scrollbar.
    pub fn y_scrollbar(&self) -> &Widget {
        &self.ybar
    }

    fn toggle(bar: &Widget, shown: bool, options: PackOptions) -> Result<()> {
        if shown { bar.pack(options) } else { bar.forget() }
    }
}

impl Observer<RefCell<TreeListParts>> for TreeListParts {
    fn on_notify(&mut self, signal: &str, _owner: &Rc<RefCell<TreeListParts>>, args: &Args) -> Result<()> {
        match TreeListSignal::from_name(signal) {
            Some(TreeListSignal::XScrollbarChanged) => Self::toggle(
                &self.xbar,
                args.require(signal, 0)?.expect_bool(signal)?,
                PackOptions::new().side(Side::Bottom).fill(Fill::X),
            ),
            Some(TreeListSignal::YScrollbarChanged) => Self::toggle(
                &self.ybar,
                args.require(signal, 0)?.expect_bool(signal)?,
                PackOptions::new().side(Side::Right).fill(Fill::Y),
            ),
            Some(TreeListSignal::ItemDoubleClicked) => Ok(()),
            None => Err(SignalError::InvalidSignal(signal.to_string()).into()),
        }
    }
}

/// Signals shared with the double-click binding.
struct TreeListSignals {
    x_scrollbar_changed: Signal<RefCell<TreeListParts>>,
    y_scrollbar_changed: Signal<RefCell<TreeListParts>>,
    item_doubleclicked: Signal<RefCell<TreeListParts>>,
}

impl TreeListSignals {
    fn get(&self, signal: TreeListSignal) -> &Signal<RefCell<TreeListParts>> {
        match signal {
            TreeListSignal::XScrollbarChanged => &self.x_scrollbar_changed,
            TreeListSignal::YScrollbarChanged => &self.y_scrollbar_changed,
            TreeListSignal::ItemDoubleClicked => &self.item_doubleclicked,
        }
    }
}

/// Tree view wrapped in a frame with optional scrollbars.
///
/// Columns are fixed at construction: identifiers, headings and widths
/// are applied once and afterwards `cget("columns")` reports identifiers
/// only.
pub struct TreeList {
    parts: Rc<RefCell<TreeListParts>>,
    frame: Widget,
    tree: Widget,
    signals: Rc<TreeListSignals>,
}

impl TreeList {
    /// Build a tree list with `columns` inside `parent`.
    pub fn new(parent: &Widget, columns: Vec<Column>, options: Options) -> Result<Self> {
        let frame = parent.create(WidgetClass::Frame, Options::new())?;
        Self::build(frame.clone(), columns, options).inspect_err(|err| {
            tracing::debug!(target: targets::WIDGET, error = %err, "tree list construction failed");
            frame.destroy();
        })
    }

    fn build(frame: Widget, columns: Vec<Column>, options: Options) -> Result<Self> {
        let (virtual_options, mut native) = split_virtual::<TreeOption>(options);

        let xbar = frame.create(
            WidgetClass::Scrollbar,
            Options::new().with("orient", "horizontal"),
        )?;
        let ybar = frame.create(
            WidgetClass::Scrollbar,
            Options::new().with("orient", "vertical"),
        )?;
        if !columns.is_empty() {
            let ids = columns.iter().map(|c| Value::from(&c.id)).collect();
            native.push("columns", Value::List(ids));
        }
        native.push("xscrollcommand", scroll_command(&xbar));
        native.push("yscrollcommand", scroll_command(&ybar));
        let tree = frame.create(WidgetClass::Treeview, native)?;
        xbar.configure(Options::new().with("command", view_command(&tree, 'x')))?;
        ybar.configure(Options::new().with("command", view_command(&tree, 'y')))?;

        let toolkit = tree.toolkit();
        for column in &columns {
            tracing::debug!(
                target: targets::TREE,
                column = %column.id,
                heading = %column.heading,
                width = column.width,
                "configuring column"
            );
            toolkit.tree_column_width(tree.id(), &column.id, column.width)?;
            toolkit.tree_heading(tree.id(), &column.id, &column.heading)?;
        }

        let parts = Rc::new(RefCell::new(TreeListParts {
            frame: frame.clone(),
            tree: tree.clone(),
            xbar,
            ybar,
            overlay: ResourceOverlay::new([
                (TreeOption::ScrollX, Value::Bool(false)),
                (TreeOption::ScrollY, Value::Bool(false)),
            ]),
            root: String::new(),
        }));
        let signals = Rc::new(TreeListSignals {
            x_scrollbar_changed: Signal::new(TreeListSignal::XScrollbarChanged.name(), &parts),
            y_scrollbar_changed: Signal::new(TreeListSignal::YScrollbarChanged.name(), &parts),
            item_doubleclicked: Signal::new(TreeListSignal::ItemDoubleClicked.name(), &parts),
        });
        for signal in TreeListSignal::ALL {
            signals.get(signal).connect_observer(parts.clone());
        }
        let list = Self {
            parts,
            frame,
            tree,
            signals,
        };

        for (key, value) in virtual_options {
            list.store(key, &value)?;
        }
        list.signals
            .x_scrollbar_changed
            .emit(Args::new().arg(list.cget(TreeOption::ScrollX.name())?))?;
        list.signals
            .y_scrollbar_changed
            .emit(Args::new().arg(list.cget(TreeOption::ScrollY.name())?))?;

        list.tree.pack(PackOptions::new())?;
        list.bind_double_click()?;
        tracing::debug!(target: targets::WIDGET, path = %list.frame, columns = columns.len(), "tree list created");
        Ok(list)
    }

    fn bind_double_click(&self) -> Result<()> {
        let signals: Weak<TreeListSignals> = Rc::downgrade(&self.signals);
        let parts: Weak<RefCell<TreeListParts>> = Rc::downgrade(&self.parts);
        self.tree.bind(DOUBLE_CLICK, move |event: &Event| {
            let (Some(signals), Some(parts)) = (signals.upgrade(), parts.upgrade()) else {
                return Ok(());
            };
            let tree = parts.borrow().tree.clone();
            let toolkit = tree.toolkit();
            let click = ItemClick {
                region: toolkit.tree_identify_region(tree.id(), event.x, event.y)?.to_string(),
                column: toolkit.tree_identify_column(tree.id(), event.x)?,
                row: toolkit.tree_identify_row(tree.id(), event.y)?,
                element: toolkit.tree_identify_element(tree.id(), event.x, event.y)?.to_string(),
            };
            tracing::trace!(target: targets::TREE, ?click, "double click");
            signals.item_doubleclicked.emit(click.to_args())
        })
    }

    /// One of the tree list's signals.
    pub fn signal(&self, signal: TreeListSignal) -> &Signal<RefCell<TreeListParts>> {
        self.signals.get(signal)
    }

    /// The component widgets.
    pub fn parts(&self) -> &Rc<RefCell<TreeListParts>> {
        &self.parts
    }

    /// The wrapped tree view.
    pub fn tree_widget(&self) -> &Widget {
        &self.tree
    }

    /// Simulate a double click at widget-relative coordinates.
    ///
    /// Returns `false` when the click was not delivered (busy window).
    pub fn double_click(&self, x: i32, y: i32) -> Result<bool> {
        self.tree.event_generate(DOUBLE_CLICK, Event::at(x, y))
    }

    // -------------------------------------------------------------------------
    // Items

    /// Insert an item under `parent` (`""` for top level) and return its id.
    pub fn insert(
        &self,
        parent: &str,
        index: InsertIndex,
        iid: Option<&str>,
        text: &str,
        values: Vec<Value>,
    ) -> Result<String> {
        self.tree
            .toolkit()
            .tree_insert(self.tree.id(), parent, index, iid, text, values)
    }

    /// Insert the first top-level item and remember it as the root.
    pub fn add_root(&self, iid: Option<&str>, text: &str, values: Vec<Value>) -> Result<String> {
        let root = self.insert("", InsertIndex::At(0), iid, text, values)?;
        self.parts.borrow_mut().root.clone_from(&root);
        Ok(root)
    }

    /// The item added by [`add_root`](Self::add_root), or `""`.
    pub fn root(&self) -> String {
        self.parts.borrow().root.clone()
    }

    /// Expand or collapse an item; children of collapsed items are not displayed.
    pub fn set_open(&self, iid: &str, open: bool) -> Result<()> {
        self.tree.toolkit().tree_set_open(self.tree.id(), iid, open)
    }

    /// Children of `parent` (`""` for top level).
    pub fn children(&self, parent: &str) -> Result<Vec<String>> {
        self.tree.toolkit().tree_children(self.tree.id(), parent)
    }

    /// Column values of an item.
    pub fn item_values(&self, iid: &str) -> Result<Vec<Value>> {
        Ok(self.tree.toolkit().tree_item(self.tree.id(), iid)?.values)
    }

    /// Delete every item.
    pub fn clear(&self) -> Result<()> {
        let items = self.children("")?;
        self.tree.toolkit().tree_delete(self.tree.id(), &items)?;
        self.parts.borrow_mut().root.clear();
        Ok(())
    }

    /// Settings of a column (`#0` for the tree column).
    pub fn column(&self, column: &str) -> Result<Column> {
        let info = self.tree.toolkit().tree_column(self.tree.id(), column)?;
        Ok(Column::new(info.id, info.heading, info.width))
    }

    /// Settings of all data columns, in order.
    pub fn columns(&self) -> Result<Vec<Column>> {
        Ok(self
            .tree
            .toolkit()
            .tree_columns(self.tree.id())?
            .into_iter()
            .map(|info| Column::new(info.id, info.heading, info.width))
            .collect())
    }

    /// Apply a state specification.
    pub fn apply_state_spec(&self, spec: &str) -> Result<()> {
        self.tree.apply_state_spec(spec)
    }

    /// Test a state specification.
    pub fn instate(&self, spec: &str) -> Result<bool> {
        self.tree.instate(spec)
    }

    /// Destroy the container and everything in it.
    pub fn destroy(&self) {
        for signal in TreeListSignal::ALL {
            self.signals.get(signal).disconnect_all();
        }
        self.frame.destroy();
    }

    fn store(&self, key: TreeOption, value: &Value) -> Result<bool> {
        let shown = value.expect_bool(key.name())?;
        self.parts.borrow_mut().overlay.set(key, shown);
        Ok(shown)
    }
}

impl Configurable for TreeList {
    fn configure(&self, options: Options) -> Result<()> {
        let (virtual_options, native) = split_virtual::<TreeOption>(options);
        for (key, value) in virtual_options {
            let shown = self.store(key, &value)?;
            let signal = match key {
                TreeOption::ScrollX => &self.signals.x_scrollbar_changed,
                TreeOption::ScrollY => &self.signals.y_scrollbar_changed,
            };
            signal.emit(Args::new().arg(shown))?;
        }
        if native.is_empty() {
            return Ok(());
        }
        self.tree.configure(native)
    }

    fn cget(&self, option: &str) -> Result<Value> {
        if let Some(value) = self.parts.borrow().overlay.get_by_name(option) {
            return Ok(value.clone());
        }
        self.tree.cget(option)
    }
}

impl Stateful for TreeList {
    type State = StateFlags;

    fn state(&self) -> Result<StateFlags> {
        self.tree.state_flags()
    }

    fn set_state(&mut self, state: StateFlags) -> Result<()> {
        self.tree.set_state_flags(state)
    }
}

impl GeometryManaged for TreeList {
    fn geometry_widget(&self) -> &Widget {
        &self.frame
    }
}

impl fmt::Display for TreeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.frame, f)
    }
}

impl fmt::Debug for TreeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeList")
            .field("path", &self.frame.path())
            .field("root", &self.parts.borrow().root)
            .finish()
    }
}
