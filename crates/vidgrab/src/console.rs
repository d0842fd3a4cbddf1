//! Log console window.

use vidgrab_core::{Options, Result};
use vidgrab_widgets::{
    Fill, GeometryManaged, InteractionState, PackOptions, TextArea, Toolkit, Widget, WidgetClass,
    with_state,
};

use crate::config::TextColors;
use crate::logging::{LogBuffer, targets};

/// Lines kept in the console; older lines are dropped.
pub const LINE_LIMIT: usize = 200;

/// A top-level window showing log output in a read-only text area.
///
/// The text area stays disabled so the user cannot edit it; writes switch
/// it to `normal` for their duration.
pub struct ConsoleWindow {
    window: Widget,
    output: TextArea,
    close_button: Widget,
}

impl ConsoleWindow {
    /// Create the window, visible.
    pub fn new(toolkit: &Toolkit, colors: &TextColors) -> Result<Self> {
        let window = toolkit.toplevel("Console")?;
        let output = TextArea::new(
            &window,
            Options::new()
                .with("state", "disabled")
                .with("scrolly", true)
                .with("normalbackground", colors.normal_background.as_str())
                .with("disabledbackground", colors.disabled_background.as_str())
                .with("wrap", "none"),
        )?;
        output.pack(PackOptions::new().fill(Fill::Both).expand(true))?;

        let close_button = window.create(WidgetClass::Button, Options::new().with("text", "Close"))?;
        close_button.pack(PackOptions::new())?;
        let handle = window.clone();
        close_button.set_command(move || handle.toolkit().withdraw(handle.id()))?;

        tracing::debug!(target: targets::CONSOLE, window = %window, "console created");
        Ok(Self {
            window,
            output,
            close_button,
        })
    }

    /// Bring the window back after [`close`](Self::close).
    pub fn show(&self) -> Result<()> {
        self.window.toolkit().deiconify(self.window.id())
    }

    /// Hide the window; its content is kept.
    pub fn close(&self) -> Result<()> {
        self.window.toolkit().withdraw(self.window.id())
    }

    /// Whether the window is shown.
    pub fn is_visible(&self) -> bool {
        self.window.is_mapped()
    }

    /// Append `text`, then drop the oldest lines beyond [`LINE_LIMIT`].
    pub fn write(&mut self, text: &str) -> Result<()> {
        with_state(&mut self.output, InteractionState::Normal, |output| {
            output.insert_end(text)?;
            let lines = output.line_count()?;
            if lines > LINE_LIMIT {
                output.delete_lines(0, lines - LINE_LIMIT)?;
            }
            Ok(())
        })
    }

    /// Append each line followed by a newline.
    pub fn write_lines<I, S>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for line in lines {
            text.push_str(line.as_ref());
            text.push('\n');
        }
        if text.is_empty() {
            return Ok(());
        }
        self.write(&text)
    }

    /// Move everything buffered in `buffer` into the window.
    pub fn sync(&mut self, buffer: &LogBuffer) -> Result<usize> {
        let lines = buffer.drain();
        let count = lines.len();
        self.write_lines(lines)?;
        Ok(count)
    }

    /// Current content.
    pub fn contents(&self) -> Result<String> {
        self.output.contents()
    }

    /// The text area holding the log.
    pub fn output(&self) -> &TextArea {
        &self.output
    }

    /// The button hiding the window.
    pub fn close_button(&self) -> &Widget {
        &self.close_button
    }

    /// The top-level window.
    pub fn window(&self) -> &Widget {
        &self.window
    }
}

#[cfg(test)]
mod tests {
    use vidgrab_core::Value;
    use vidgrab_widgets::{Configurable, Stateful};

    use super::*;

    fn console(tk: &Toolkit) -> ConsoleWindow {
        ConsoleWindow::new(tk, &TextColors::default()).unwrap()
    }

    #[test]
    fn test_write_keeps_text_area_disabled() {
        let tk = Toolkit::new();
        let mut console = console(&tk);
        console.write("first line\n").unwrap();

        assert_eq!(console.contents().unwrap(), "first line\n");
        assert_eq!(console.output().state().unwrap(), InteractionState::Disabled);
        assert_eq!(console.output().cget("background").unwrap(), Value::from("#262626"));
    }

    #[test]
    fn test_line_limit() {
        let tk = Toolkit::new();
        let mut console = console(&tk);
        console
            .write_lines((0..LINE_LIMIT + 25).map(|i| format!("line {i}")))
            .unwrap();

        assert_eq!(console.output().line_count().unwrap(), LINE_LIMIT);
        let contents = console.contents().unwrap();
        assert!(contents.starts_with("line 25\n"));
        assert!(contents.ends_with(&format!("line {}\n", LINE_LIMIT + 24)));
    }

    #[test]
    fn test_sync_drains_buffer() {
        let tk = Toolkit::new();
        let mut console = console(&tk);
        let buffer = LogBuffer::new(8);
        buffer.push_line(" INFO vidgrab::model: video info extracted");
        buffer.push_line(" WARN vidgrab::presenter: fetch failed");

        assert_eq!(console.sync(&buffer).unwrap(), 2);
        assert!(buffer.is_empty());
        assert_eq!(console.output().line_count().unwrap(), 2);
        assert_eq!(console.sync(&buffer).unwrap(), 0);
    }

    #[test]
    fn test_close_button_withdraws_and_show_restores() {
        let tk = Toolkit::new();
        let console = console(&tk);
        assert!(console.is_visible());

        assert!(console.close_button().invoke().unwrap());
        assert!(!console.is_visible());

        console.show().unwrap();
        assert!(console.is_visible());
        console.close().unwrap();
        assert!(!console.is_visible());
    }
}
