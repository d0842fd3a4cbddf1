//! Capability traits shared by primitive and composite widgets.
//!
//! Application code talks to widgets through these traits so that a
//! composite can stand in wherever a primitive widget is expected:
//!
//! - [`Configurable`] - unified option get/set
//! - [`Stateful`] - reading and replacing the interaction state
//! - [`GeometryManaged`] - placement inside a parent

use std::fmt::Debug;

use vidgrab_core::{Options, Result, Value};

use crate::toolkit::{GridOptions, PackOptions, Placement, StateFlags, Widget};

/// A widget whose options can be read and written by name.
pub trait Configurable {
    /// Apply options. Effects are visible when the call returns.
    fn configure(&self, options: Options) -> Result<()>;

    /// Read one option.
    fn cget(&self, option: &str) -> Result<Value>;
}

/// A widget with an interaction state that can be snapshotted and restored.
///
/// For native widgets the state is the set of themed state flags.
pub trait Stateful {
    /// Complete state snapshot.
    type State: Clone + PartialEq + Debug;

    /// Current state.
    fn state(&self) -> Result<Self::State>;

    /// Replace the state.
    fn set_state(&mut self, state: Self::State) -> Result<()>;
}

/// A widget that can be placed in its parent by a geometry manager.
///
/// Implementors name the native widget that is actually placed; every
/// geometry call is forwarded to it. For composites this is the container
/// frame, so the composite is placed as one unit.
pub trait GeometryManaged {
    /// The native widget geometry calls apply to.
    fn geometry_widget(&self) -> &Widget;

    /// Pack into the parent.
    fn pack(&self, options: PackOptions) -> Result<()> {
        let widget = self.geometry_widget();
        widget.toolkit().pack(widget.id(), options)
    }

    /// Place in the parent's grid.
    fn grid(&self, options: GridOptions) -> Result<()> {
        let widget = self.geometry_widget();
        widget.toolkit().grid(widget.id(), options)
    }

    /// Remove from the packer.
    fn pack_forget(&self) -> Result<()> {
        self.forget()
    }

    /// Remove from the grid.
    fn grid_forget(&self) -> Result<()> {
        self.forget()
    }

    /// Remove from whichever manager placed the widget.
    fn forget(&self) -> Result<()> {
        let widget = self.geometry_widget();
        widget.toolkit().forget(widget.id())
    }

    /// Current placement.
    fn placement(&self) -> Result<Option<Placement>> {
        let widget = self.geometry_widget();
        widget.toolkit().placement(widget.id())
    }

    /// Whether the widget and all of its ancestors are mapped.
    fn is_mapped(&self) -> bool {
        self.geometry_widget().is_mapped()
    }
}

impl Configurable for Widget {
    fn configure(&self, options: Options) -> Result<()> {
        self.toolkit().configure(self.id(), options)
    }

    fn cget(&self, option: &str) -> Result<Value> {
        self.toolkit().cget(self.id(), option)
    }
}

impl GeometryManaged for Widget {
    fn geometry_widget(&self) -> &Widget {
        self
    }
}

impl Stateful for Widget {
    type State = StateFlags;

    fn state(&self) -> Result<StateFlags> {
        self.state_flags()
    }

    fn set_state(&mut self, state: StateFlags) -> Result<()> {
        self.set_state_flags(state)
    }
}
