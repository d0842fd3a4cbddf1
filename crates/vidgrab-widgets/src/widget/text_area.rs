//! Multi-line text area with an optional vertical scrollbar and
//! per-state background colors.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use vidgrab_core::logging::targets;
use vidgrab_core::{
    Args, Observer, Options, ResourceKey, ResourceOverlay, Result, Signal, SignalError, Value,
};

use super::{scroll_command, split_virtual, view_command};
use crate::color::Color;
use crate::toolkit::{Fill, InteractionState, PackOptions, Side, Widget, WidgetClass};
use crate::traits::{Configurable, GeometryManaged, Stateful};

vidgrab_core::resource_keys! {
    /// Virtual options of a [`TextArea`].
    pub enum TextOption {
        /// Show the vertical scrollbar.
        ScrollY => "scrolly",
        /// Background while the state is `normal`.
        NormalBackground => "normalbackground",
        /// Background while the state is `disabled`.
        DisabledBackground => "disabledbackground",
    }
}

impl TextOption {
    fn background_for(state: InteractionState) -> Self {
        match state {
            InteractionState::Normal => Self::NormalBackground,
            InteractionState::Disabled => Self::DisabledBackground,
        }
    }
}

/// Background used in the `normal` state unless configured.
pub const DEFAULT_NORMAL_BACKGROUND: &str = "#ffffff";

/// Background used in the `disabled` state unless configured.
pub const DEFAULT_DISABLED_BACKGROUND: &str = "#262626";

/// Signals emitted by a [`TextArea`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAreaSignal {
    /// `state_changed(state)`: the state option was set.
    StateChanged,
    /// `y_scrollbar_changed(shown)`: the `scrolly` option was set.
    YScrollbarChanged,
    /// `background_changed(state, color)`: a per-state background was set.
    /// The color is reported as `#rrggbb`.
    BackgroundChanged,
}

impl TextAreaSignal {
    /// Every signal, in declaration order.
    pub const ALL: [Self; 3] = [
        Self::StateChanged,
        Self::YScrollbarChanged,
        Self::BackgroundChanged,
    ];

    /// The signal's name.
    pub fn name(self) -> &'static str {
        match self {
            Self::StateChanged => "state_changed",
            Self::YScrollbarChanged => "y_scrollbar_changed",
            Self::BackgroundChanged => "background_changed",
        }
    }

    /// Look up a signal by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|signal| signal.name() == name)
    }
}

/// The widgets and overlay making up a [`TextArea`].
///
/// This is the owner of the text area's signals and the observer that
/// turns them into visual changes.
pub struct TextAreaParts {
    frame: Widget,
    text: Widget,
    ybar: Widget,
    overlay: ResourceOverlay<TextOption>,
}

impl TextAreaParts {
    /// The container frame.
    pub fn frame(&self) -> &Widget {
        &self.frame
    }

    /// The wrapped text widget.
    pub fn text(&self) -> &Widget {
        &self.text
    }

    /// The vertical scrollbar.
    pub fn scrollbar(&self) -> &Widget {
        &self.ybar
    }

    /// Virtual option values.
    pub fn overlay(&self) -> &ResourceOverlay<TextOption> {
        &self.overlay
    }

    fn current_state(&self) -> Result<InteractionState> {
        Ok(InteractionState::from_value(&self.text.cget("state")?)?)
    }

    fn show_background(&self, color: Value) -> Result<()> {
        self.text.configure(Options::new().with("background", color))
    }
}

impl Observer<RefCell<TextAreaParts>> for TextAreaParts {
    fn on_notify(&mut self, signal: &str, _owner: &Rc<RefCell<TextAreaParts>>, args: &Args) -> Result<()> {
        match TextAreaSignal::from_name(signal) {
            Some(TextAreaSignal::StateChanged) => {
                let state = InteractionState::from_value(args.require(signal, 0)?)?;
                let color = self.overlay.get(TextOption::background_for(state))?.clone();
                self.show_background(color)
            }
            Some(TextAreaSignal::YScrollbarChanged) => {
                if args.require(signal, 0)?.expect_bool(signal)? {
                    self.ybar.pack(PackOptions::new().side(Side::Right).fill(Fill::Y))
                } else {
                    self.ybar.forget()
                }
            }
            Some(TextAreaSignal::BackgroundChanged) => {
                let state = InteractionState::from_value(args.require(signal, 0)?)?;
                if self.current_state()? == state {
                    self.show_background(args.require(signal, 1)?.clone())?;
                }
                Ok(())
            }
            None => Err(SignalError::InvalidSignal(signal.to_string()).into()),
        }
    }
}

/// Text widget wrapped in a frame with an optional vertical scrollbar.
///
/// The displayed background always follows the state: the
/// `normalbackground` color while `normal`, the `disabledbackground`
/// color while `disabled`. A native `background` sets the color of the
/// state the area is in once the same `configure` call has been applied.
///
/// Virtual options:
///
/// | Option | Type | Default |
/// |---|---|---|
/// | `scrolly` | bool | `false` |
/// | `normalbackground` | color | `#ffffff` |
/// | `disabledbackground` | color | `#262626` |
///
/// Everything else is a native text widget option.
pub struct TextArea {
    parts: Rc<RefCell<TextAreaParts>>,
    frame: Widget,
    text: Widget,
    state_changed: Signal<RefCell<TextAreaParts>>,
    y_scrollbar_changed: Signal<RefCell<TextAreaParts>>,
    background_changed: Signal<RefCell<TextAreaParts>>,
}

impl TextArea {
    /// Build a text area inside `parent`.
    ///
    /// `options` may mix virtual and native options. On error nothing is
    /// left behind in `parent`.
    pub fn new(parent: &Widget, options: Options) -> Result<Self> {
        let frame = parent.create(WidgetClass::Frame, Options::new())?;
        Self::build(frame.clone(), options).inspect_err(|err| {
            tracing::debug!(target: targets::WIDGET, error = %err, "text area construction failed");
            frame.destroy();
        })
    }

    fn build(frame: Widget, options: Options) -> Result<Self> {
        let (virtual_options, mut native) = split_virtual::<TextOption>(options);
        let background = native.take("background");

        let ybar = frame.create(
            WidgetClass::Scrollbar,
            Options::new().with("orient", "vertical"),
        )?;
        native.push("yscrollcommand", scroll_command(&ybar));
        let text = frame.create(WidgetClass::Text, native)?;
        ybar.configure(Options::new().with("command", view_command(&text, 'y')))?;

        let overlay = ResourceOverlay::new([
            (TextOption::ScrollY, Value::Bool(false)),
            (TextOption::NormalBackground, Value::from(DEFAULT_NORMAL_BACKGROUND)),
            (TextOption::DisabledBackground, Value::from(DEFAULT_DISABLED_BACKGROUND)),
        ]);
        let parts = Rc::new(RefCell::new(TextAreaParts {
            frame: frame.clone(),
            text: text.clone(),
            ybar,
            overlay,
        }));

        let area = Self {
            state_changed: Signal::new(TextAreaSignal::StateChanged.name(), &parts),
            y_scrollbar_changed: Signal::new(TextAreaSignal::YScrollbarChanged.name(), &parts),
            background_changed: Signal::new(TextAreaSignal::BackgroundChanged.name(), &parts),
            parts,
            frame,
            text,
        };
        for signal in TextAreaSignal::ALL {
            area.signal(signal).connect_observer(area.parts.clone());
        }

        for (key, value) in virtual_options {
            area.set_virtual(key, value)?;
        }
        if let Some(color) = background {
            area.set_virtual(TextOption::background_for(area.state()?), color)?;
        }
        area.state_changed.emit(Args::new().arg(area.state()?))?;
        area.y_scrollbar_changed.emit(Args::new().arg(area.cget(TextOption::ScrollY.name())?))?;

        area.text
            .pack(PackOptions::new().side(Side::Left).ipadx(16))?;
        tracing::debug!(target: targets::WIDGET, path = %area.frame, "text area created");
        Ok(area)
    }

    /// One of the text area's signals.
    pub fn signal(&self, signal: TextAreaSignal) -> &Signal<RefCell<TextAreaParts>> {
        match signal {
            TextAreaSignal::StateChanged => &self.state_changed,
            TextAreaSignal::YScrollbarChanged => &self.y_scrollbar_changed,
            TextAreaSignal::BackgroundChanged => &self.background_changed,
        }
    }

    /// The component widgets.
    pub fn parts(&self) -> &Rc<RefCell<TextAreaParts>> {
        &self.parts
    }

    /// The wrapped text widget.
    pub fn text_widget(&self) -> &Widget {
        &self.text
    }

    /// Whether the state is `state`.
    pub fn instate(&self, state: InteractionState) -> Result<bool> {
        Ok(self.state()? == state)
    }

    /// Destroy the container and everything in it.
    pub fn destroy(&self) {
        for signal in TextAreaSignal::ALL {
            self.signal(signal).disconnect_all();
        }
        self.frame.destroy();
    }

    fn set_virtual(&self, key: TextOption, value: Value) -> Result<()> {
        match key {
            TextOption::ScrollY => {
                let shown = value.expect_bool(key.name())?;
                self.parts.borrow_mut().overlay.set(key, shown);
                self.y_scrollbar_changed.emit(Args::new().arg(shown))
            }
            TextOption::NormalBackground | TextOption::DisabledBackground => {
                let (r, g, b) = self.frame.toolkit().winfo_rgb(value.expect_str(key.name())?)?;
                let color = Color::from_rgb16(r, g, b).to_hex();
                self.parts.borrow_mut().overlay.set(key, color.as_str());
                let state = match key {
                    TextOption::DisabledBackground => InteractionState::Disabled,
                    _ => InteractionState::Normal,
                };
                self.background_changed
                    .emit(Args::new().arg(state).arg(color))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Content

    /// Append text at the end. Ignored while the state is `disabled`.
    pub fn insert_end(&self, text: &str) -> Result<()> {
        self.text.toolkit().text_insert_end(self.text.id(), text)
    }

    /// The whole content.
    pub fn contents(&self) -> Result<String> {
        self.text.toolkit().text_contents(self.text.id())
    }

    /// Number of lines of content.
    pub fn line_count(&self) -> Result<usize> {
        self.text.toolkit().text_line_count(self.text.id())
    }

    /// Delete lines `first..last`, counted from 0.
    pub fn delete_lines(&self, first: usize, last: usize) -> Result<()> {
        self.text.toolkit().text_delete_lines(self.text.id(), first, last)
    }
}

impl Configurable for TextArea {
    fn configure(&self, options: Options) -> Result<()> {
        let (virtual_options, mut native) = split_virtual::<TextOption>(options);
        for (key, value) in virtual_options {
            self.set_virtual(key, value)?;
        }

        let state = native
            .get("state")
            .map(InteractionState::from_value)
            .transpose()?;
        // A plain background is the color of the state the area ends up in.
        if let Some(color) = native.take("background") {
            let target = match state {
                Some(state) => state,
                None => self.state()?,
            };
            self.set_virtual(TextOption::background_for(target), color)?;
        }
        if !native.is_empty() {
            self.text.configure(native)?;
        }
        if let Some(state) = state {
            self.state_changed.emit(Args::new().arg(state))?;
        }
        Ok(())
    }

    fn cget(&self, option: &str) -> Result<Value> {
        if let Some(value) = self.parts.borrow().overlay.get_by_name(option) {
            return Ok(value.clone());
        }
        self.text.cget(option)
    }
}

impl Stateful for TextArea {
    type State = InteractionState;

    fn state(&self) -> Result<InteractionState> {
        Ok(InteractionState::from_value(&self.text.cget("state")?)?)
    }

    fn set_state(&mut self, state: InteractionState) -> Result<()> {
        self.configure(Options::new().with("state", state))
    }
}

impl GeometryManaged for TextArea {
    fn geometry_widget(&self) -> &Widget {
        &self.frame
    }
}

impl fmt::Display for TextArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.frame, f)
    }
}

impl fmt::Debug for TextArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextArea")
            .field("path", &self.frame.path())
            .field("overlay", &self.parts.borrow().overlay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use vidgrab_core::{Error, OptionError, Slot};

    use super::*;
    use crate::toolkit::Toolkit;

    fn text_area(options: Options) -> (Toolkit, TextArea) {
        let tk = Toolkit::new();
        let area = TextArea::new(&tk.root(), options).unwrap();
        (tk, area)
    }

    #[test]
    fn test_construction_defaults() {
        let (_tk, area) = text_area(Options::new());
        assert_eq!(area.to_string(), ".!frame");
        assert_eq!(area.text_widget().path(), ".!frame.!text");
        assert_eq!(area.cget("scrolly").unwrap(), Value::Bool(false));
        assert_eq!(area.cget("normalbackground").unwrap(), Value::from("#ffffff"));
        assert_eq!(area.cget("background").unwrap(), Value::from("#ffffff"));
        assert_eq!(area.state().unwrap(), InteractionState::Normal);
        assert_eq!(
            area.text_widget().cget("yscrollcommand").unwrap(),
            Value::from(".!frame.!scrollbar set")
        );
        assert!(area.parts().borrow().scrollbar().placement().unwrap().is_none());
    }

    #[test]
    fn test_virtual_option_round_trip() {
        let (_tk, area) = text_area(Options::new());
        area.configure(Options::new().with("scrolly", true)).unwrap();
        assert_eq!(area.cget("scrolly").unwrap(), Value::Bool(true));

        area.configure(Options::new().with("normalbackground", "#102030")).unwrap();
        assert_eq!(area.cget("normalbackground").unwrap(), Value::from("#102030"));
    }

    #[test]
    fn test_scrollbar_follows_scrolly() {
        let (_tk, area) = text_area(Options::new().with("scrolly", true));
        let ybar = area.parts().borrow().scrollbar().clone();
        assert!(ybar.placement().unwrap().is_some());

        area.configure(Options::new().with("scrolly", false)).unwrap();
        assert!(ybar.placement().unwrap().is_none());
        area.configure(Options::new().with("scrolly", true)).unwrap();
        assert!(ybar.placement().unwrap().is_some());
    }

    #[test]
    fn test_background_follows_state() {
        let (_tk, mut area) = text_area(Options::new().with("disabledbackground", "gray15"));
        assert_eq!(area.cget("disabledbackground").unwrap(), Value::from("#262626"));

        area.set_state(InteractionState::Disabled).unwrap();
        assert_eq!(area.cget("background").unwrap(), Value::from("#262626"));
        assert!(area.instate(InteractionState::Disabled).unwrap());

        area.set_state(InteractionState::Normal).unwrap();
        assert_eq!(area.cget("background").unwrap(), Value::from("#ffffff"));
    }

    #[test]
    fn test_background_change_for_other_state_is_deferred() {
        let (_tk, area) = text_area(Options::new());
        area.configure(Options::new().with("disabledbackground", "navy")).unwrap();
        assert_eq!(area.cget("background").unwrap(), Value::from("#ffffff"));

        area.configure(Options::new().with("normalbackground", "white").with("state", "disabled"))
            .unwrap();
        assert_eq!(area.cget("background").unwrap(), Value::from("#000080"));
    }

    #[test]
    fn test_plain_background_sets_current_state_color() {
        let (_tk, mut area) = text_area(Options::new());
        area.configure(Options::new().with("background", "#123456")).unwrap();
        assert_eq!(area.cget("background").unwrap(), Value::from("#123456"));
        assert_eq!(area.cget("normalbackground").unwrap(), Value::from("#123456"));

        area.set_state(InteractionState::Disabled).unwrap();
        assert_eq!(area.cget("background").unwrap(), Value::from("#262626"));
        area.set_state(InteractionState::Normal).unwrap();
        assert_eq!(area.cget("background").unwrap(), Value::from("#123456"));

        area.configure(Options::new().with("state", "disabled").with("background", "navy"))
            .unwrap();
        assert_eq!(area.cget("background").unwrap(), Value::from("#000080"));
        assert_eq!(area.cget("disabledbackground").unwrap(), Value::from("#000080"));
        assert_eq!(area.cget("normalbackground").unwrap(), Value::from("#123456"));
    }

    #[test]
    fn test_plain_background_at_construction() {
        let (_tk, area) = text_area(Options::new().with("state", "disabled").with("background", "white"));
        assert_eq!(area.cget("background").unwrap(), Value::from("#ffffff"));
        assert_eq!(area.cget("disabledbackground").unwrap(), Value::from("#ffffff"));
    }

    #[test]
    fn test_initial_state_from_options() {
        let (_tk, area) = text_area(Options::new().with("state", "disabled"));
        assert_eq!(area.state().unwrap(), InteractionState::Disabled);
        assert_eq!(area.cget("background").unwrap(), Value::from(DEFAULT_DISABLED_BACKGROUND));
    }

    #[test]
    fn test_malformed_color_fails_construction() {
        let tk = Toolkit::new();
        let result = TextArea::new(&tk.root(), Options::new().with("normalbackground", "nocolor"));
        assert!(matches!(result, Err(Error::InvalidColor(spec)) if spec == "nocolor"));
        assert!(tk.children(tk.root().id()).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_state_rejected() {
        let (_tk, area) = text_area(Options::new());
        let err = area.configure(Options::new().with("state", "readonly")).unwrap_err();
        assert!(matches!(err, Error::Option(OptionError::InvalidValue { .. })));
        assert_eq!(area.state().unwrap(), InteractionState::Normal);
    }

    #[test]
    fn test_slot_sees_state_changes() {
        let (_tk, area) = text_area(Options::new());
        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        let slot: Slot<RefCell<TextAreaParts>> =
            Rc::new(move |_owner: &Rc<RefCell<TextAreaParts>>, args: &Args| {
                assert_eq!(args.get(0), Some(&Value::from("disabled")));
                assert_eq!(args.get(1), Some(&Value::from("bound")));
                counter.set(counter.get() + 1);
                Ok(())
            });
        area.signal(TextAreaSignal::StateChanged)
            .connect(slot.clone(), Args::new().arg("bound"));

        area.configure(Options::new().with("state", "disabled")).unwrap();
        assert_eq!(seen.get(), 1);

        area.signal(TextAreaSignal::StateChanged)
            .disconnect(&slot, &Args::new().arg("bound"))
            .unwrap();
        area.configure(Options::new().with("state", "disabled")).unwrap();
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_unknown_signal_rejected() {
        let (_tk, area) = text_area(Options::new());
        let parts = area.parts().clone();
        let err = parts.borrow_mut().on_notify("resized", &parts, &Args::new()).unwrap_err();
        assert!(matches!(err, Error::Signal(SignalError::InvalidSignal(name)) if name == "resized"));
    }

    #[test]
    fn test_content_ignored_while_disabled() {
        let (_tk, mut area) = text_area(Options::new());
        area.insert_end("one\ntwo\n").unwrap();
        assert_eq!(area.line_count().unwrap(), 2);

        area.set_state(InteractionState::Disabled).unwrap();
        area.insert_end("three\n").unwrap();
        assert_eq!(area.contents().unwrap(), "one\ntwo\n");

        area.set_state(InteractionState::Normal).unwrap();
        area.delete_lines(0, 1).unwrap();
        assert_eq!(area.contents().unwrap(), "two\n");
    }

    #[test]
    fn test_geometry_applies_to_frame() {
        let (tk, area) = text_area(Options::new());
        area.pack(PackOptions::new().fill(Fill::Both).expand(true)).unwrap();
        assert_eq!(tk.slaves(tk.root().id()).unwrap(), vec![area.geometry_widget().id()]);
        assert!(area.is_mapped());
        assert!(area.text_widget().is_mapped());
    }
}
