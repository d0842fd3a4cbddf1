//! Scope guards for widget state.

use std::ops::{Deref, DerefMut};

use vidgrab_core::Result;
use vidgrab_core::logging::targets;

use crate::toolkit::Widget;
use crate::traits::Stateful;

/// Forces a widget into a state for the guard's lifetime.
///
/// The state at creation is snapshotted; it is re-applied when the guard
/// is dropped or [finished](Self::finish), whatever the widget's state is
/// at that point. The guard dereferences to the widget.
///
/// ```
/// # use vidgrab_core::Options;
/// # use vidgrab_widgets::{InteractionState, StateGuard, Stateful, TextArea, Toolkit};
/// let tk = Toolkit::new();
/// let mut log = TextArea::new(&tk.root(), Options::new().with("state", "disabled")).unwrap();
/// {
///     let guard = StateGuard::new(&mut log, InteractionState::Normal).unwrap();
///     guard.insert_end("appended\n").unwrap();
/// }
/// assert_eq!(log.state().unwrap(), InteractionState::Disabled);
/// assert_eq!(log.contents().unwrap(), "appended\n");
/// ```
pub struct StateGuard<'a, W: Stateful> {
    widget: &'a mut W,
    saved: W::State,
    restored: bool,
}

impl<'a, W: Stateful> StateGuard<'a, W> {
    /// Snapshot the widget's state and switch it to `target`.
    pub fn new(widget: &'a mut W, target: W::State) -> Result<Self> {
        let saved = widget.state()?;
        tracing::trace!(target: targets::GUARD, ?saved, ?target, "entering state guard");
        if let Err(err) = widget.set_state(target) {
            if let Err(restore_err) = widget.set_state(saved) {
                tracing::warn!(target: targets::GUARD, error = %restore_err, "failed to restore state");
            }
            return Err(err);
        }
        Ok(Self {
            widget,
            saved,
            restored: false,
        })
    }

    /// The state that will be restored.
    pub fn saved(&self) -> &W::State {
        &self.saved
    }

    /// Restore the snapshot now, reporting failure.
    pub fn finish(mut self) -> Result<()> {
        self.restore()
    }

    fn restore(&mut self) -> Result<()> {
        self.restored = true;
        tracing::trace!(target: targets::GUARD, saved = ?self.saved, "restoring state");
        self.widget.set_state(self.saved.clone())
    }
}

impl<W: Stateful> Deref for StateGuard<'_, W> {
    type Target = W;

    fn deref(&self) -> &W {
        self.widget
    }
}

impl<W: Stateful> DerefMut for StateGuard<'_, W> {
    fn deref_mut(&mut self) -> &mut W {
        self.widget
    }
}

impl<W: Stateful> Drop for StateGuard<'_, W> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(err) = self.restore() {
            tracing::warn!(target: targets::GUARD, error = %err, "failed to restore state");
        }
    }
}

/// Run `f` with `widget` switched to `target`, then restore its state.
///
/// The state is restored even when `f` fails; `f`'s error takes
/// precedence over a restore error.
pub fn with_state<W, R>(
    widget: &mut W,
    target: W::State,
    f: impl FnOnce(&mut W) -> Result<R>,
) -> Result<R>
where
    W: Stateful,
{
    let mut guard = StateGuard::new(widget, target)?;
    let result = f(&mut guard);
    let restored = guard.finish();
    let value = result?;
    restored?;
    Ok(value)
}

/// Holds a window busy for the guard's lifetime.
///
/// While busy, the window and its descendants ignore button invocations
/// and events. A guard created on an already busy window leaves that
/// hold in place when it goes away.
#[derive(Debug)]
pub struct BusyGuard {
    window: Widget,
    held: bool,
}

impl BusyGuard {
    /// Mark `window` busy.
    pub fn hold(window: &Widget) -> Result<Self> {
        let toolkit = window.toolkit();
        let held = !toolkit.busy_status(window.id())?;
        if held {
            toolkit.busy_hold(window.id())?;
            tracing::debug!(target: targets::GUARD, window = %window, "busy hold");
        }
        Ok(Self {
            window: window.clone(),
            held,
        })
    }

    /// Whether the window is currently busy.
    pub fn is_busy(&self) -> Result<bool> {
        self.window.toolkit().busy_status(self.window.id())
    }

    /// Release the hold now, reporting failure.
    pub fn forget(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        if !std::mem::take(&mut self.held) {
            return Ok(());
        }
        tracing::debug!(target: targets::GUARD, window = %self.window, "busy forget");
        self.window.toolkit().busy_forget(self.window.id())
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            tracing::warn!(target: targets::GUARD, error = %err, "failed to release busy hold");
        }
    }
}
