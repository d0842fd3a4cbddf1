//! Core systems for vidgrab.
//!
//! This crate provides the foundational pieces the widget layer is built on:
//!
//! - **Values**: [`Value`], [`Args`] and [`Options`], the dynamic currency of
//!   widget configuration and signal emission
//! - **Signals**: [`Signal`], a named synchronous dispatcher with callback
//!   and multiplexed-observer subscribers
//! - **Resource overlays**: [`ResourceOverlay`], typed per-widget storage for
//!   virtual configuration options
//! - **Timers**: [`TimerManager`], one-shot timers driven by
//!   the toolkit's event loop
//!
//! # Signal Example
//!
//! ```
//! use std::rc::Rc;
//! use vidgrab_core::{Args, Signal, Slot};
//!
//! struct Download;
//!
//! let owner = Rc::new(Download);
//! let finished = Signal::new("finished", &owner);
//!
//! let slot: Slot<Download> = Rc::new(|_owner: &Rc<Download>, args: &Args| {
//!     println!("finished with {} argument(s)", args.len());
//!     Ok(())
//! });
//! finished.connect(slot.clone(), Args::new().arg("bound"));
//!
//! finished.emit(Args::new().arg(1)).unwrap();
//! finished.disconnect(&slot, &Args::new().arg("bound")).unwrap();
//! assert_eq!(finished.connection_count(), 0);
//! ```
//!
//! # Resource Overlay Example
//!
//! ```
//! use vidgrab_core::{resource_keys, ResourceOverlay, Value};
//!
//! resource_keys! {
//!     /// Virtual options of a scrolled widget.
//!     pub enum ScrollOption {
//!         ScrollX => "scrollx",
//!         ScrollY => "scrolly",
//!     }
//! }
//!
//! let mut overlay = ResourceOverlay::new([
//!     (ScrollOption::ScrollX, Value::Bool(false)),
//!     (ScrollOption::ScrollY, Value::Bool(false)),
//! ]);
//! overlay.set(ScrollOption::ScrollY, true);
//! assert_eq!(overlay.get(ScrollOption::ScrollY).unwrap(), &Value::Bool(true));
//! assert_eq!(overlay.resolve("scrollx"), Some(ScrollOption::ScrollX));
//! assert_eq!(overlay.resolve("width"), None);
//! ```

mod error;
pub mod logging;
pub mod resource;
pub mod signal;
pub mod timer;
pub mod value;

pub use error::{Error, OptionError, ResourceError, Result, SignalError, TimerError};
pub use resource::{ResourceKey, ResourceOverlay};
pub use signal::{Observer, SharedObserver, Signal, Slot};
pub use timer::{TimerId, TimerManager};
pub use value::{Args, Options, Value};
