//! Item storage and hit-testing for the tree/list view.
//!
//! Layout is fixed-metric: a heading row of [`HEADING_HEIGHT`] pixels (when
//! headings are shown) followed by rows of [`ROW_HEIGHT`] pixels, with
//! columns laid out left to right at their configured widths.

use std::collections::HashMap;

use vidgrab_core::{Error, Result, Value};

/// Height of the heading row in pixels.
pub const HEADING_HEIGHT: i32 = 20;
/// Height of an item row in pixels.
pub const ROW_HEIGHT: i32 = 20;
/// Width given to new columns.
pub const DEFAULT_COLUMN_WIDTH: u32 = 200;
/// Distance from a column edge that counts as the separator.
const SEPARATOR_SLOP: i32 = 3;
/// Width of the expand/collapse indicator in the tree column.
const INDICATOR_WIDTH: i32 = 20;

/// A column of the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column identifier.
    pub id: String,
    /// Heading text.
    pub heading: String,
    /// Width in pixels.
    pub width: u32,
}

impl ColumnInfo {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            heading: String::new(),
            width: DEFAULT_COLUMN_WIDTH,
        }
    }
}

/// An item of the view.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Parent item, `""` for top-level items.
    pub parent: String,
    /// Child item ids, in order.
    pub children: Vec<String>,
    /// Text shown in the tree column.
    pub text: String,
    /// One value per data column.
    pub values: Vec<Value>,
    /// Whether children are displayed.
    pub open: bool,
}

/// Position at which a new item is inserted among its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertIndex {
    /// Insert at this position (clamped to the sibling count).
    At(usize),
    /// Append after the last sibling.
    End,
}

/// Which parts of the view are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ShowParts {
    pub tree: bool,
    pub headings: bool,
}

impl ShowParts {
    pub(crate) fn from_value(value: &Value) -> Self {
        let words: Vec<String> = match value {
            Value::List(items) => items.iter().map(ToString::to_string).collect(),
            other => other
                .to_string()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        };
        Self {
            tree: words.iter().any(|w| w == "tree"),
            headings: words.iter().any(|w| w == "headings"),
        }
    }
}

/// Columns and items of one tree/list view.
#[derive(Debug)]
pub(crate) struct TreeviewData {
    tree_column: ColumnInfo,
    columns: Vec<ColumnInfo>,
    items: HashMap<String, Item>,
    roots: Vec<String>,
    next_auto_id: u32,
}

impl TreeviewData {
    pub(crate) fn new() -> Self {
        Self {
            tree_column: ColumnInfo::new("#0"),
            columns: Vec::new(),
            items: HashMap::new(),
            roots: Vec::new(),
            next_auto_id: 1,
        }
    }

    /// Replace the data columns, keeping settings of columns that survive.
    pub(crate) fn set_columns(&mut self, ids: Vec<String>) {
        let mut previous: HashMap<String, ColumnInfo> = self
            .columns
            .drain(..)
            .map(|column| (column.id.clone(), column))
            .collect();
        self.columns = ids
            .into_iter()
            .map(|id| previous.remove(&id).unwrap_or_else(|| ColumnInfo::new(id)))
            .collect();
    }

    pub(crate) fn column_ids(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }

    pub(crate) fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub(crate) fn column_mut(&mut self, id: &str) -> Result<&mut ColumnInfo> {
        if id == "#0" {
            return Ok(&mut self.tree_column);
        }
        let index = match id.strip_prefix('#').and_then(|n| n.parse::<usize>().ok()) {
            Some(n) if n >= 1 => n - 1,
            _ => self
                .columns
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| Error::toolkit(format!("Invalid column index {id}")))?,
        };
        self.columns
            .get_mut(index)
            .ok_or_else(|| Error::toolkit(format!("Column index {id} out of bounds")))
    }

    pub(crate) fn column(&self, id: &str) -> Option<&ColumnInfo> {
        if id == "#0" {
            return Some(&self.tree_column);
        }
        self.columns.iter().find(|c| c.id == id)
    }

    pub(crate) fn insert(
        &mut self,
        parent: &str,
        index: InsertIndex,
        iid: Option<&str>,
        text: &str,
        values: Vec<Value>,
    ) -> Result<String> {
        if !parent.is_empty() && !self.items.contains_key(parent) {
            return Err(Error::toolkit(format!("Item {parent} not found")));
        }
        let iid = match iid {
            Some(iid) if self.items.contains_key(iid) => {
                return Err(Error::toolkit(format!("Item {iid} already exists")));
            }
            Some(iid) => iid.to_string(),
            None => self.next_id(),
        };

        let siblings = if parent.is_empty() {
            &mut self.roots
        } else {
            match self.items.get_mut(parent) {
                Some(item) => &mut item.children,
                None => return Err(Error::toolkit(format!("Item {parent} not found"))),
            }
        };
        let position = match index {
            InsertIndex::At(n) => n.min(siblings.len()),
            InsertIndex::End => siblings.len(),
        };
        siblings.insert(position, iid.clone());

        self.items.insert(
            iid.clone(),
            Item {
                parent: parent.to_string(),
                children: Vec::new(),
                text: text.to_string(),
                values,
                open: false,
            },
        );
        Ok(iid)
    }

    fn next_id(&mut self) -> String {
        loop {
            let candidate = format!("I{:03X}", self.next_auto_id);
            self.next_auto_id += 1;
            if !self.items.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    pub(crate) fn delete(&mut self, iid: &str) -> Result<()> {
        let item = self
            .items
            .get(iid)
            .ok_or_else(|| Error::toolkit(format!("Item {iid} not found")))?;
        let parent = item.parent.clone();
        let siblings = if parent.is_empty() {
            &mut self.roots
        } else {
            match self.items.get_mut(&parent) {
                Some(item) => &mut item.children,
                None => return Err(Error::toolkit(format!("Item {parent} not found"))),
            }
        };
        siblings.retain(|id| id != iid);

        let mut pending = vec![iid.to_string()];
        while let Some(id) = pending.pop() {
            if let Some(removed) = self.items.remove(&id) {
                pending.extend(removed.children);
            }
        }
        Ok(())
    }

    pub(crate) fn children(&self, parent: &str) -> Result<Vec<String>> {
        if parent.is_empty() {
            return Ok(self.roots.clone());
        }
        self.items
            .get(parent)
            .map(|item| item.children.clone())
            .ok_or_else(|| Error::toolkit(format!("Item {parent} not found")))
    }

    pub(crate) fn item(&self, iid: &str) -> Option<&Item> {
        self.items.get(iid)
    }

    pub(crate) fn set_open(&mut self, iid: &str, open: bool) -> Result<()> {
        let item = self
            .items
            .get_mut(iid)
            .ok_or_else(|| Error::toolkit(format!("Item {iid} not found")))?;
        item.open = open;
        Ok(())
    }

    pub(crate) fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Items in display order: top-level items, with children of open items.
    pub(crate) fn displayed_rows(&self) -> Vec<&str> {
        let mut rows = Vec::new();
        let mut stack: Vec<&str> = self.roots.iter().rev().map(String::as_str).collect();
        while let Some(id) = stack.pop() {
            rows.push(id);
            if let Some(item) = self.items.get(id)
                && item.open
            {
                stack.extend(item.children.iter().rev().map(String::as_str));
            }
        }
        rows
    }

    /// Displayed columns as `(identifier, left edge, width)`, `#0` first when shown.
    fn column_spans(&self, show: ShowParts) -> Vec<(String, i32, i32)> {
        let mut spans = Vec::new();
        let mut left = 0;
        if show.tree {
            let width = self.tree_column.width as i32;
            spans.push(("#0".to_string(), left, width));
            left += width;
        }
        for (i, column) in self.columns.iter().enumerate() {
            let width = column.width as i32;
            spans.push((format!("#{}", i + 1), left, width));
            left += width;
        }
        spans
    }

    pub(crate) fn identify_column(&self, show: ShowParts, x: i32) -> String {
        self.column_spans(show)
            .into_iter()
            .find(|(_, left, width)| x >= *left && x < left + width)
            .map(|(id, _, _)| id)
            .unwrap_or_default()
    }

    pub(crate) fn identify_row(&self, show: ShowParts, y: i32) -> String {
        let top = if show.headings { HEADING_HEIGHT } else { 0 };
        if y < top {
            return String::new();
        }
        let index = ((y - top) / ROW_HEIGHT) as usize;
        self.displayed_rows()
            .get(index)
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    pub(crate) fn identify_region(&self, show: ShowParts, x: i32, y: i32) -> &'static str {
        if show.headings && (0..HEADING_HEIGHT).contains(&y) {
            let spans = self.column_spans(show);
            let on_edge = spans
                .iter()
                .any(|(_, left, width)| (x - (left + width)).abs() <= SEPARATOR_SLOP);
            if on_edge {
                return "separator";
            }
            return if self.identify_column(show, x).is_empty() {
                "nothing"
            } else {
                "heading"
            };
        }
        let column = self.identify_column(show, x);
        if column.is_empty() || self.identify_row(show, y).is_empty() {
            return "nothing";
        }
        if column == "#0" { "tree" } else { "cell" }
    }

    pub(crate) fn identify_element(&self, show: ShowParts, x: i32, y: i32) -> &'static str {
        match self.identify_region(show, x, y) {
            "tree" => {
                let row = self.identify_row(show, y);
                let has_children = self
                    .items
                    .get(&row)
                    .is_some_and(|item| !item.children.is_empty());
                if has_children && x < INDICATOR_WIDTH {
                    "Treeitem.indicator"
                } else {
                    "text"
                }
            }
            "cell" | "heading" => "text",
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADINGS_ONLY: ShowParts = ShowParts {
        tree: false,
        headings: true,
    };

    fn sample() -> TreeviewData {
        let mut data = TreeviewData::new();
        data.set_columns(vec!["id".into(), "name".into()]);
        data.column_mut("id").unwrap().width = 50;
        data
    }

    #[test]
    fn test_insert_generates_ids() {
        let mut data = sample();
        let first = data.insert("", InsertIndex::End, None, "", vec![]).unwrap();
        let second = data.insert("", InsertIndex::At(0), None, "", vec![]).unwrap();
        assert_eq!(first, "I001");
        assert_eq!(second, "I002");
        assert_eq!(data.children("").unwrap(), vec!["I002", "I001"]);
    }

    #[test]
    fn test_insert_duplicate_id_fails() {
        let mut data = sample();
        data.insert("", InsertIndex::End, Some("row"), "", vec![]).unwrap();
        assert!(data.insert("", InsertIndex::End, Some("row"), "", vec![]).is_err());
        assert!(data.insert("missing", InsertIndex::End, None, "", vec![]).is_err());
    }

    #[test]
    fn test_delete_removes_descendants() {
        let mut data = sample();
        let root = data.insert("", InsertIndex::End, None, "root", vec![]).unwrap();
        data.insert(&root, InsertIndex::End, Some("child"), "", vec![]).unwrap();
        data.delete(&root).unwrap();
        assert_eq!(data.item_count(), 0);
        assert!(data.children("").unwrap().is_empty());
    }

    #[test]
    fn test_displayed_rows_follow_open_state() {
        let mut data = sample();
        let root = data.insert("", InsertIndex::End, Some("root"), "", vec![]).unwrap();
        data.insert(&root, InsertIndex::End, Some("child"), "", vec![]).unwrap();
        data.insert("", InsertIndex::End, Some("next"), "", vec![]).unwrap();
        assert_eq!(data.displayed_rows(), vec!["root", "next"]);
        data.set_open("root", true).unwrap();
        assert_eq!(data.displayed_rows(), vec!["root", "child", "next"]);
    }

    #[test]
    fn test_hit_testing_headings_only() {
        let mut data = sample();
        data.insert("", InsertIndex::End, Some("row0"), "", vec![]).unwrap();

        assert_eq!(data.identify_region(HEADINGS_ONLY, 10, 5), "heading");
        assert_eq!(data.identify_region(HEADINGS_ONLY, 50, 5), "separator");
        assert_eq!(data.identify_region(HEADINGS_ONLY, 100, 25), "cell");
        assert_eq!(data.identify_column(HEADINGS_ONLY, 100), "#2");
        assert_eq!(data.identify_row(HEADINGS_ONLY, 25), "row0");
        assert_eq!(data.identify_element(HEADINGS_ONLY, 100, 25), "text");
        assert_eq!(data.identify_region(HEADINGS_ONLY, 100, 45), "nothing");
        assert_eq!(data.identify_region(HEADINGS_ONLY, 400, 25), "nothing");
    }

    #[test]
    fn test_hit_testing_tree_column() {
        let show = ShowParts {
            tree: true,
            headings: true,
        };
        let mut data = sample();
        data.insert("", InsertIndex::End, Some("row0"), "", vec![]).unwrap();
        data.insert("row0", InsertIndex::End, None, "", vec![]).unwrap();

        assert_eq!(data.identify_region(show, 100, 25), "tree");
        assert_eq!(data.identify_column(show, 100), "#0");
        assert_eq!(data.identify_column(show, 210), "#1");
        assert_eq!(data.identify_element(show, 5, 25), "Treeitem.indicator");
    }

    #[test]
    fn test_show_parts_from_value() {
        let show = ShowParts::from_value(&Value::from("headings"));
        assert!(show.headings);
        assert!(!show.tree);
    }
}
