//! Status bar with self-clearing messages.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use vidgrab_core::{Options, Result, TimerId};
use vidgrab_widgets::{Configurable, GeometryManaged, Widget, WidgetClass};

/// A label showing the outcome of the last action.
///
/// [`flash`](Self::flash) messages are cleared by a one-shot timer after
/// the configured timeout; any new message cancels a pending clear.
pub struct StatusBar {
    label: Widget,
    timeout: Duration,
    pending: Rc<Cell<Option<TimerId>>>,
}

impl StatusBar {
    /// Create the bar inside `parent`; the caller places it.
    pub fn new(parent: &Widget, timeout: Duration) -> Result<Self> {
        let label = parent.create(
            WidgetClass::Label,
            Options::new()
                .with("text", "")
                .with("anchor", "w")
                .with("relief", "sunken"),
        )?;
        Ok(Self {
            label,
            timeout,
            pending: Rc::new(Cell::new(None)),
        })
    }

    /// Show `message` until the next one.
    pub fn show(&self, message: &str) -> Result<()> {
        self.cancel_pending();
        self.set_text(message)
    }

    /// Show `message` for the timeout, then clear the bar.
    pub fn flash(&self, message: &str) -> Result<()> {
        self.cancel_pending();
        self.set_text(message)?;

        let label = self.label.clone();
        let pending = Rc::clone(&self.pending);
        let id = self.label.toolkit().after(self.timeout, move || {
            pending.set(None);
            label.configure(Options::new().with("text", ""))
        });
        self.pending.set(Some(id));
        Ok(())
    }

    /// Clear the bar now.
    pub fn clear(&self) -> Result<()> {
        self.show("")
    }

    /// The message currently shown.
    pub fn text(&self) -> Result<String> {
        Ok(self.label.cget("text")?.to_string())
    }

    /// Whether a clear is scheduled.
    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }

    fn cancel_pending(&self) {
        let mut slot = self.pending.take();
        self.label.toolkit().after_cancel(&mut slot);
    }

    fn set_text(&self, message: &str) -> Result<()> {
        self.label.configure(Options::new().with("text", message))
    }
}

impl GeometryManaged for StatusBar {
    fn geometry_widget(&self) -> &Widget {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidgrab_widgets::Toolkit;

    fn status_bar(tk: &Toolkit) -> StatusBar {
        StatusBar::new(&tk.root(), Duration::from_millis(100)).unwrap()
    }

    #[test]
    fn test_flash_clears_after_timeout() {
        let tk = Toolkit::new();
        let bar = status_bar(&tk);
        bar.flash("Error: unsupported URL").unwrap();
        assert!(bar.is_pending());

        assert_eq!(tk.advance(Duration::from_millis(99)), 0);
        assert_eq!(bar.text().unwrap(), "Error: unsupported URL");

        assert_eq!(tk.advance(Duration::from_millis(1)), 1);
        assert_eq!(bar.text().unwrap(), "");
        assert!(!bar.is_pending());
    }

    #[test]
    fn test_new_flash_restarts_timer() {
        let tk = Toolkit::new();
        let bar = status_bar(&tk);
        bar.flash("first").unwrap();
        tk.advance(Duration::from_millis(60));
        bar.flash("second").unwrap();

        assert_eq!(tk.advance(Duration::from_millis(60)), 0);
        assert_eq!(bar.text().unwrap(), "second");
        assert_eq!(tk.advance(Duration::from_millis(40)), 1);
        assert_eq!(bar.text().unwrap(), "");
    }

    #[test]
    fn test_show_cancels_pending_clear() {
        let tk = Toolkit::new();
        let bar = status_bar(&tk);
        bar.flash("transient").unwrap();
        bar.show("Fetched \"video\"").unwrap();
        assert!(!bar.is_pending());

        assert_eq!(tk.advance(Duration::from_secs(1)), 0);
        assert_eq!(bar.text().unwrap(), "Fetched \"video\"");
    }
}
