//! Single-line entry with an optional caption and horizontal scrollbar.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use vidgrab_core::logging::targets;
use vidgrab_core::{
    Args, Observer, Options, ResourceKey, ResourceOverlay, Result, Signal, SignalError, Value,
};

use super::{scroll_command, split_virtual, view_command};
use crate::toolkit::{Fill, PackOptions, Side, StateFlags, Widget, WidgetClass};
use crate::traits::{Configurable, GeometryManaged, Stateful};

vidgrab_core::resource_keys! {
    /// Virtual options of an [`Entry`].
    pub enum EntryOption {
        /// Show the horizontal scrollbar.
        ScrollX => "scrollx",
        /// Caption shown above the entry; empty hides it.
        Text => "text",
    }
}

/// Signals emitted by an [`Entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySignal {
    /// `x_scrollbar_changed(shown)`
    XScrollbarChanged,
    /// `text_changed(caption)`
    TextChanged,
}

impl EntrySignal {
    /// Every signal, in declaration order.
    pub const ALL: [Self; 2] = [Self::XScrollbarChanged, Self::TextChanged];

    /// The signal's name.
    pub fn name(self) -> &'static str {
        match self {
            Self::XScrollbarChanged => "x_scrollbar_changed",
            Self::TextChanged => "text_changed",
        }
    }

    /// Look up a signal by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|signal| signal.name() == name)
    }
}

/// The widgets and overlay making up an [`Entry`].
pub struct EntryParts {
    frame: Widget,
    label: Widget,
    xbar: Widget,
    entry: Widget,
    overlay: ResourceOverlay<EntryOption>,
}

impl EntryParts {
    /// The container frame.
    pub fn frame(&self) -> &Widget {
        &self.frame
    }

    /// The caption label.
    pub fn label(&self) -> &Widget {
        &self.label
    }

    /// The horizontal scrollbar.
    pub fn scrollbar(&self) -> &Widget {
        &self.xbar
    }

    /// The wrapped entry widget.
    pub fn entry(&self) -> &Widget {
        &self.entry
    }

    fn show_caption(&self, caption: &str) -> Result<()> {
        if caption.is_empty() {
            if self.label.placement()?.is_some() {
                self.label.forget()?;
            }
            return Ok(());
        }

        if self.label.placement()?.is_none() {
            let mut options = PackOptions::new();
            if self.entry.placement()?.is_some() {
                options = options.before(self.entry.id());
            }
            self.label.pack(options)?;
        }
        self.label.configure(Options::new().with("text", caption))
    }
}

impl Observer<RefCell<EntryParts>> for EntryParts {
    fn on_notify(&mut self, signal: &str, _owner: &Rc<RefCell<EntryParts>>, args: &Args) -> Result<()> {
        match EntrySignal::from_name(signal) {
            Some(EntrySignal::XScrollbarChanged) => {
                if args.require(signal, 0)?.expect_bool(signal)? {
                    self.xbar.pack(PackOptions::new().side(Side::Bottom).fill(Fill::X))
                } else {
                    self.xbar.forget()
                }
            }
            Some(EntrySignal::TextChanged) => {
                let caption = args.require(signal, 0)?.expect_str(signal)?;
                self.show_caption(caption)
            }
            None => Err(SignalError::InvalidSignal(signal.to_string()).into()),
        }
    }
}

/// Entry wrapped in a frame with a caption label and an optional
/// horizontal scrollbar.
///
/// Setting `text` to a non-empty caption shows the label right before the
/// entry; setting it to `""` hides the label.
pub struct Entry {
    parts: Rc<RefCell<EntryParts>>,
    frame: Widget,
    entry: Widget,
    x_scrollbar_changed: Signal<RefCell<EntryParts>>,
    text_changed: Signal<RefCell<EntryParts>>,
}

impl Entry {
    /// Build an entry inside `parent`.
    pub fn new(parent: &Widget, options: Options) -> Result<Self> {
        let frame = parent.create(
            WidgetClass::Frame,
            Options::new().with("padding", "0 0 0 16"),
        )?;
        Self::build(frame.clone(), options).inspect_err(|err| {
            tracing::debug!(target: targets::WIDGET, error = %err, "entry construction failed");
            frame.destroy();
        })
    }

    fn build(frame: Widget, options: Options) -> Result<Self> {
        let (virtual_options, mut native) = split_virtual::<EntryOption>(options);

        let label = frame.create(WidgetClass::Label, Options::new())?;
        let xbar = frame.create(
            WidgetClass::Scrollbar,
            Options::new().with("orient", "horizontal"),
        )?;
        native.push("xscrollcommand", scroll_command(&xbar));
        let entry = frame.create(WidgetClass::Entry, native)?;
        xbar.configure(Options::new().with("command", view_command(&entry, 'x')))?;

        let parts = Rc::new(RefCell::new(EntryParts {
            frame: frame.clone(),
            label,
            xbar,
            entry: entry.clone(),
            overlay: ResourceOverlay::new([
                (EntryOption::ScrollX, Value::Bool(false)),
                (EntryOption::Text, Value::from("")),
            ]),
        }));
        let composite = Self {
            x_scrollbar_changed: Signal::new(EntrySignal::XScrollbarChanged.name(), &parts),
            text_changed: Signal::new(EntrySignal::TextChanged.name(), &parts),
            parts,
            frame,
            entry,
        };
        for signal in EntrySignal::ALL {
            composite.signal(signal).connect_observer(composite.parts.clone());
        }

        // Overlay only; the signals below report the final values once.
        for (key, value) in virtual_options {
            composite.store(key, &value)?;
        }
        composite
            .x_scrollbar_changed
            .emit(Args::new().arg(composite.cget(EntryOption::ScrollX.name())?))?;
        composite
            .text_changed
            .emit(Args::new().arg(composite.cget(EntryOption::Text.name())?))?;

        composite.entry.pack(PackOptions::new())?;
        tracing::debug!(target: targets::WIDGET, path = %composite.frame, "entry created");
        Ok(composite)
    }

    /// One of the entry's signals.
    pub fn signal(&self, signal: EntrySignal) -> &Signal<RefCell<EntryParts>> {
        match signal {
            EntrySignal::XScrollbarChanged => &self.x_scrollbar_changed,
            EntrySignal::TextChanged => &self.text_changed,
        }
    }

    /// The component widgets.
    pub fn parts(&self) -> &Rc<RefCell<EntryParts>> {
        &self.parts
    }

    /// The wrapped entry widget.
    pub fn entry_widget(&self) -> &Widget {
        &self.entry
    }

    /// Current content.
    pub fn get(&self) -> Result<String> {
        self.entry.toolkit().entry_get(self.entry.id())
    }

    /// Replace the content. Disabled and read-only entries ignore this.
    pub fn set(&self, text: &str) -> Result<()> {
        self.entry.toolkit().entry_set(self.entry.id(), text)
    }

    /// Apply a state specification such as `"disabled"` or `"!readonly"`.
    pub fn apply_state_spec(&self, spec: &str) -> Result<()> {
        self.entry.apply_state_spec(spec)
    }

    /// Test a state specification.
    pub fn instate(&self, spec: &str) -> Result<bool> {
        self.entry.instate(spec)
    }

    /// Destroy the container and everything in it.
    pub fn destroy(&self) {
        for signal in EntrySignal::ALL {
            self.signal(signal).disconnect_all();
        }
        self.frame.destroy();
    }

    /// Validate and store a virtual option.
    fn store(&self, key: EntryOption, value: &Value) -> Result<Value> {
        let value = match key {
            EntryOption::ScrollX => Value::Bool(value.expect_bool(key.name())?),
            EntryOption::Text => Value::from(value.expect_str(key.name())?),
        };
        self.parts.borrow_mut().overlay.set(key, value.clone());
        Ok(value)
    }
}

impl Configurable for Entry {
    fn configure(&self, options: Options) -> Result<()> {
        let (virtual_options, native) = split_virtual::<EntryOption>(options);
        for (key, value) in virtual_options {
            let value = self.store(key, &value)?;
            let signal = match key {
                EntryOption::ScrollX => &self.x_scrollbar_changed,
                EntryOption::Text => &self.text_changed,
            };
            signal.emit(Args::new().arg(value))?;
        }
        if native.is_empty() {
            return Ok(());
        }
        self.entry.configure(native)
    }

    fn cget(&self, option: &str) -> Result<Value> {
        if let Some(value) = self.parts.borrow().overlay.get_by_name(option) {
            return Ok(value.clone());
        }
        self.entry.cget(option)
    }
}

impl Stateful for Entry {
    type State = StateFlags;

    fn state(&self) -> Result<StateFlags> {
        self.entry.state_flags()
    }

    fn set_state(&mut self, state: StateFlags) -> Result<()> {
        self.entry.set_state_flags(state)
    }
}

impl GeometryManaged for Entry {
    fn geometry_widget(&self) -> &Widget {
        &self.frame
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.frame, f)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("path", &self.frame.path())
            .field("overlay", &self.parts.borrow().overlay)
            .finish()
    }
}
