//! The main window.
//!
//! The view only builds widgets and reflects state; every action is wired
//! to the presenter through button commands and the formats tree's
//! `item_doubleclicked` signal.

use vidgrab_core::{Options, Result, Value};
use vidgrab_widgets::{
    Column, Configurable, Entry, Fill, GeometryManaged, GridOptions, InsertIndex, PackOptions,
    Side, Toolkit, TreeFormatOptions, TreeList, Widget, WidgetClass,
};

use crate::config::Config;
use crate::status::StatusBar;
use crate::video::VideoInfo;

/// Columns of the formats tree: id, heading, width.
pub const FORMAT_COLUMNS: [(&str, &str, u32); 6] = [
    ("Cformat", "Format", 200),
    ("Cextension", "Extension", 200),
    ("Cresolution", "Resolution", 200),
    ("Crate", "Sample Rate/Fps", 200),
    ("Csize", "File Size", 200),
    ("Cbitrate", "Average Bitrate", 200),
];

/// Rows visible in the formats tree.
const TREE_HEIGHT: i64 = 20;

/// Text of an info field before anything was fetched.
const PLACEHOLDER_LEN: usize = 75;

/// Fields filled from fetched video info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoField {
    /// Video title.
    Title,
    /// Video length.
    Length,
    /// Whether the video is age restricted.
    AgeRestricted,
}

impl InfoField {
    /// All fields, in display order.
    pub const ALL: [Self; 3] = [Self::Title, Self::Length, Self::AgeRestricted];

    /// Caption shown left of the value.
    pub fn caption(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Length => "Length",
            Self::AgeRestricted => "Age Restricted",
        }
    }

    fn value(self, info: &VideoInfo) -> String {
        match self {
            Self::Title => info.title.clone(),
            Self::Length => info.duration.to_string(),
            Self::AgeRestricted => info.is_age_restricted().to_string(),
        }
    }
}

/// Widgets of the main window.
pub struct MainWindow {
    root: Widget,
    url: Entry,
    fetch_button: Widget,
    fields: [Widget; 3],
    formats: TreeList,
    selector: Entry,
    download_button: Widget,
    console_button: Widget,
    status: StatusBar,
}

impl MainWindow {
    /// Build the window in the toolkit's root.
    pub fn new(toolkit: &Toolkit, config: &Config) -> Result<Self> {
        let root = toolkit.root();
        root.configure(Options::new().with("title", "vidgrab"))?;

        let status = StatusBar::new(&root, config.status_timeout())?;
        status.pack(PackOptions::new().side(Side::Bottom).fill(Fill::X))?;

        let frame = root.create(WidgetClass::Frame, Options::new().with("padding", "8"))?;
        frame.pack(PackOptions::new().fill(Fill::Both).expand(true))?;

        let url = Entry::new(
            &frame,
            Options::new()
                .with("scrollx", true)
                .with("text", "URL")
                .with("width", 100),
        )?;
        url.pack(PackOptions::new())?;

        let fetch_button = frame.create(
            WidgetClass::Button,
            Options::new().with("text", "Get Video Info"),
        )?;
        fetch_button.pack(PackOptions::new())?;

        let grid = frame.create(WidgetClass::Frame, Options::new())?;
        grid.pack(PackOptions::new())?;
        let fields = [
            info_field(&grid, 0, InfoField::Title)?,
            info_field(&grid, 1, InfoField::Length)?,
            info_field(&grid, 2, InfoField::AgeRestricted)?,
        ];

        let columns = FORMAT_COLUMNS.into_iter().map(Column::from).collect();
        let formats = TreeList::new(
            &frame,
            columns,
            Options::new()
                .with("show", "headings")
                .with("scrolly", true)
                .with("height", TREE_HEIGHT),
        )?;
        formats.pack(PackOptions::new().fill(Fill::Both).expand(true))?;

        let actions = frame.create(WidgetClass::Frame, Options::new())?;
        actions.pack(PackOptions::new().fill(Fill::X))?;
        let selector = Entry::new(&actions, Options::new().with("text", "Format").with("width", 30))?;
        selector.pack(PackOptions::new().side(Side::Left))?;
        let download_button = actions.create(
            WidgetClass::Button,
            Options::new().with("text", "Download").with("state", "disabled"),
        )?;
        download_button.pack(PackOptions::new().side(Side::Left))?;
        let console_button = actions.create(WidgetClass::Button, Options::new().with("text", "Console"))?;
        console_button.pack(PackOptions::new().side(Side::Right))?;

        Ok(Self {
            root,
            url,
            fetch_button,
            fields,
            formats,
            selector,
            download_button,
            console_button,
            status,
        })
    }

    /// The URL typed by the user, trimmed.
    pub fn url(&self) -> Result<String> {
        Ok(self.url.get()?.trim().to_string())
    }

    /// Replace the URL.
    pub fn set_url(&self, url: &str) -> Result<()> {
        self.url.set(url)
    }

    /// The format selector typed or picked by the user, trimmed.
    pub fn format_selector(&self) -> Result<String> {
        Ok(self.selector.get()?.trim().to_string())
    }

    /// Replace the format selector.
    pub fn set_format_selector(&self, selector: &str) -> Result<()> {
        self.selector.set(selector)
    }

    /// Show `info` in the fields and the formats tree.
    pub fn update_video_info(&self, info: &VideoInfo) -> Result<()> {
        for (field, label) in InfoField::ALL.into_iter().zip(&self.fields) {
            label.configure(Options::new().with("text", field.value(info)))?;
        }
        self.formats.clear()?;
        for row in &info.formats {
            let values = row.cells().into_iter().map(Value::from).collect();
            self.formats.insert("", InsertIndex::End, None, "", values)?;
        }
        Ok(())
    }

    /// Reset the fields and empty the formats tree.
    pub fn clear_video_info(&self) -> Result<()> {
        for label in &self.fields {
            label.configure(Options::new().with("text", ".".repeat(PLACEHOLDER_LEN)))?;
        }
        self.formats.clear()
    }

    /// Text of an info field.
    pub fn field(&self, field: InfoField) -> Result<String> {
        Ok(self.fields[field as usize].cget("text")?.to_string())
    }

    /// Enable or disable the "Get Video Info" button.
    pub fn set_fetch_enabled(&self, enabled: bool) -> Result<()> {
        set_enabled(&self.fetch_button, enabled)
    }

    /// Enable or disable the "Download" button.
    pub fn set_download_enabled(&self, enabled: bool) -> Result<()> {
        set_enabled(&self.download_button, enabled)
    }

    /// The root window.
    pub fn root(&self) -> &Widget {
        &self.root
    }

    /// The URL entry.
    pub fn url_entry(&self) -> &Entry {
        &self.url
    }

    /// The format selector entry.
    pub fn selector_entry(&self) -> &Entry {
        &self.selector
    }

    /// "Get Video Info".
    pub fn fetch_button(&self) -> &Widget {
        &self.fetch_button
    }

    /// "Download".
    pub fn download_button(&self) -> &Widget {
        &self.download_button
    }

    /// "Console".
    pub fn console_button(&self) -> &Widget {
        &self.console_button
    }

    /// The formats tree.
    pub fn formats(&self) -> &TreeList {
        &self.formats
    }

    /// The status bar.
    pub fn status(&self) -> &StatusBar {
        &self.status
    }

    /// Widget tree of the whole application, top-level windows included.
    pub fn render(&self) -> Result<String> {
        self.root
            .toolkit()
            .format_tree(self.root.id(), &TreeFormatOptions::default())
    }
}

fn info_field(grid: &Widget, row: u32, field: InfoField) -> Result<Widget> {
    let caption = grid.create(
        WidgetClass::Label,
        Options::new()
            .with("text", field.caption())
            .with("anchor", "e")
            .with("padding", "0 0 8"),
    )?;
    caption.grid(GridOptions::at(row, 0))?;

    let value = grid.create(
        WidgetClass::Label,
        Options::new()
            .with("text", ".".repeat(PLACEHOLDER_LEN))
            .with("anchor", "center")
            .with("width", 100)
            .with("relief", "sunken"),
    )?;
    value.grid(GridOptions::at(row, 1))?;
    Ok(value)
}

fn set_enabled(button: &Widget, enabled: bool) -> Result<()> {
    button.apply_state_spec(if enabled { "!disabled" } else { "disabled" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample_video_info;

    fn window(tk: &Toolkit) -> MainWindow {
        MainWindow::new(tk, &Config::default()).unwrap()
    }

    #[test]
    fn test_initial_layout() {
        let tk = Toolkit::new();
        let view = window(&tk);

        assert_eq!(view.url_entry().cget("text").unwrap(), Value::from("URL"));
        assert_eq!(view.url_entry().cget("scrollx").unwrap(), Value::Bool(true));
        assert!(view.download_button().instate("disabled").unwrap());
        assert!(view.fetch_button().instate("!disabled").unwrap());
        assert_eq!(view.field(InfoField::Title).unwrap(), ".".repeat(PLACEHOLDER_LEN));

        let columns = view.formats().columns().unwrap();
        let headings: Vec<&str> = columns.iter().map(|c| c.heading.as_str()).collect();
        assert_eq!(
            headings,
            ["Format", "Extension", "Resolution", "Sample Rate/Fps", "File Size", "Average Bitrate"]
        );
        assert!(columns.iter().all(|c| c.width == 200));
        assert_eq!(view.formats().cget("scrolly").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_update_and_clear_video_info() {
        let tk = Toolkit::new();
        let view = window(&tk);
        let info = sample_video_info().unwrap();

        view.update_video_info(&info).unwrap();
        assert_eq!(view.field(InfoField::Title).unwrap(), info.title);
        assert_eq!(view.field(InfoField::Length).unwrap(), "3:33");
        assert_eq!(view.field(InfoField::AgeRestricted).unwrap(), "false");

        let rows = view.formats().children("").unwrap();
        assert_eq!(rows.len(), info.formats.len());
        let first = view.formats().item_values(&rows[1]).unwrap();
        assert_eq!(first[0], Value::from("139"));
        assert_eq!(first[3], Value::from("22050 Hz"));

        view.clear_video_info().unwrap();
        assert!(view.formats().children("").unwrap().is_empty());
        assert_eq!(view.field(InfoField::Length).unwrap(), ".".repeat(PLACEHOLDER_LEN));
    }

    #[test]
    fn test_buttons_toggle() {
        let tk = Toolkit::new();
        let view = window(&tk);
        view.set_download_enabled(true).unwrap();
        assert!(view.download_button().instate("!disabled").unwrap());
        view.set_fetch_enabled(false).unwrap();
        assert!(!view.fetch_button().invoke().unwrap());
    }

    #[test]
    fn test_render_lists_widgets() {
        let tk = Toolkit::new();
        let view = window(&tk);
        view.set_url("zipped").unwrap();

        let rendered = view.render().unwrap();
        assert!(rendered.contains("\"Get Video Info\""));
        assert!(rendered.contains("= \"zipped\""));
        assert!(rendered.contains("Format:200"));
    }
}
