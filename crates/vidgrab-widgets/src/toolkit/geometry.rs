//! Geometry management options.
//!
//! Widgets are placed inside their parent by one of two managers: the
//! packer, which stacks slaves along a side in order, and the grid, which
//! places them in rows and columns.

use std::fmt;

use super::WidgetId;

/// Side of the cavity a packed widget is placed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    /// Stack from the top (the default).
    #[default]
    Top,
    /// Stack from the bottom.
    Bottom,
    /// Stack from the left.
    Left,
    /// Stack from the right.
    Right,
}

impl Side {
    /// The option value naming this side.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Direction(s) in which a packed widget stretches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fill {
    /// Keep the requested size.
    #[default]
    None,
    /// Stretch horizontally.
    X,
    /// Stretch vertically.
    Y,
    /// Stretch in both directions.
    Both,
}

/// Options for the packer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackOptions {
    /// Side to pack against.
    pub side: Side,
    /// Stretch direction.
    pub fill: Fill,
    /// Claim extra space in the parent.
    pub expand: bool,
    /// Internal horizontal padding.
    pub ipadx: u32,
    /// Insert before this sibling in the packing order.
    pub before: Option<WidgetId>,
}

impl PackOptions {
    /// Default packing options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the side (builder pattern).
    pub fn side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// Set the fill (builder pattern).
    pub fn fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }

    /// Set expansion (builder pattern).
    pub fn expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    /// Set internal horizontal padding (builder pattern).
    pub fn ipadx(mut self, ipadx: u32) -> Self {
        self.ipadx = ipadx;
        self
    }

    /// Insert before a sibling (builder pattern).
    pub fn before(mut self, sibling: WidgetId) -> Self {
        self.before = Some(sibling);
        self
    }
}

/// Options for the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridOptions {
    /// Row index.
    pub row: u32,
    /// Column index.
    pub column: u32,
}

impl GridOptions {
    /// Place at `row`, `column`.
    pub fn at(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// How a widget is currently managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Managed by the packer.
    Pack(PackOptions),
    /// Managed by the grid.
    Grid(GridOptions),
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pack(options) => write!(f, "pack -side {}", options.side.as_str()),
            Self::Grid(options) => write!(f, "grid -row {} -column {}", options.row, options.column),
        }
    }
}
