//! Signal dispatcher for vidgrab.
//!
//! A [`Signal`] is a named, synchronous, one-to-many notification channel
//! owned by an emitting object. Subscribers come in two shapes:
//!
//! - **Slots**: a callback plus arguments bound at connect time. On every
//!   emission the slot receives the emission's arguments followed by its
//!   bound arguments (bound keywords win over emitted ones).
//! - **Observers**: objects implementing [`Observer`], whose single
//!   multiplexed [`on_notify`](Observer::on_notify) method receives the
//!   signal name and branches on it.
//!
//! # Delivery
//!
//! Emission is synchronous and happens on the caller's thread in insertion
//! order. A subscriber returning an error stops the emission: later
//! subscribers are not notified, and the error is returned to the emitter.
//!
//! # Ownership
//!
//! A signal holds only a weak reference to its owner. The owner is passed
//! explicitly at creation and handed to every subscriber on emission.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use vidgrab_core::{Args, Observer, Result, Signal, SignalError};
//!
//! struct Car;
//!
//! #[derive(Default)]
//! struct Witness {
//!     destroyed: usize,
//! }
//!
//! impl Observer<Car> for Witness {
//!     fn on_notify(&mut self, signal: &str, _owner: &Rc<Car>, _args: &Args) -> Result<()> {
//!         match signal {
//!             "destroyed" => self.destroyed += 1,
//!             other => return Err(SignalError::InvalidSignal(other.to_string()).into()),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let car = Rc::new(Car);
//! let on_destroyed = Signal::new("destroyed", &car);
//! let witness = Rc::new(RefCell::new(Witness::default()));
//! on_destroyed.connect_observer(witness.clone());
//!
//! on_destroyed.emit(Args::new()).unwrap();
//! assert_eq!(witness.borrow().destroyed, 1);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{Result, SignalError};
use crate::logging::targets;
use crate::value::Args;

/// A callback subscriber.
///
/// Slots are compared by identity on disconnect, so keep a clone of the
/// `Rc` you connected.
pub type Slot<O> = Rc<dyn Fn(&Rc<O>, &Args) -> Result<()>>;

/// A subscriber that receives every signal it is connected to through one
/// multiplexed method.
pub trait Observer<O: ?Sized> {
    /// Called when `owner` emitted the signal called `signal`.
    ///
    /// Implementations must return [`SignalError::InvalidSignal`] for names
    /// they do not handle.
    fn on_notify(&mut self, signal: &str, owner: &Rc<O>, args: &Args) -> Result<()>;
}

/// Shared handle to an observer, as stored by [`Signal`].
pub type SharedObserver<O> = Rc<RefCell<dyn Observer<O>>>;

enum Subscriber<O: ?Sized> {
    Observer(SharedObserver<O>),
    Slot { slot: Slot<O>, bound: Args },
}

impl<O: ?Sized> Clone for Subscriber<O> {
    fn clone(&self) -> Self {
        match self {
            Self::Observer(observer) => Self::Observer(observer.clone()),
            Self::Slot { slot, bound } => Self::Slot {
                slot: slot.clone(),
                bound: bound.clone(),
            },
        }
    }
}

/// Compare two `Rc`s by the address of their data, ignoring vtables.
fn same_rc<T: ?Sized>(a: &Rc<T>, b: &Rc<T>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// A named signal owned by an object of type `O`.
pub struct Signal<O: ?Sized> {
    name: String,
    owner: Weak<O>,
    subscribers: RefCell<Vec<Subscriber<O>>>,
    blocked: Cell<bool>,
}

impl<O: ?Sized> Signal<O> {
    /// Create a signal called `name`, owned by `owner`.
    ///
    /// The name is free-form; it is what observers match on.
    pub fn new(name: impl Into<String>, owner: &Rc<O>) -> Self {
        Self {
            name: name.into(),
            owner: Rc::downgrade(owner),
            subscribers: RefCell::new(Vec::new()),
            blocked: Cell::new(false),
        }
    }

    /// The signal's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connect a slot with arguments bound now and appended on every emission.
    ///
    /// Connecting the same slot twice results in two deliveries.
    pub fn connect(&self, slot: Slot<O>, bound: Args) {
        self.subscribers
            .borrow_mut()
            .push(Subscriber::Slot { slot, bound });
    }

    /// Connect a multiplexed observer.
    pub fn connect_observer(&self, observer: SharedObserver<O>) {
        self.subscribers
            .borrow_mut()
            .push(Subscriber::Observer(observer));
    }

    /// Remove the first subscriber that is `slot` with exactly `bound`.
    ///
    /// Returns [`SignalError::NotConnected`] when nothing matches.
    pub fn disconnect(&self, slot: &Slot<O>, bound: &Args) -> Result<()> {
        let mut subscribers = self.subscribers.borrow_mut();
        let position = subscribers.iter().position(|sub| match sub {
            Subscriber::Slot { slot: s, bound: b } => same_rc(s, slot) && b == bound,
            Subscriber::Observer(_) => false,
        });
        self.remove_at(&mut subscribers, position)
    }

    /// Remove the first subscription of `observer`.
    ///
    /// Returns [`SignalError::NotConnected`] when it is not subscribed.
    pub fn disconnect_observer(&self, observer: &SharedObserver<O>) -> Result<()> {
        let mut subscribers = self.subscribers.borrow_mut();
        let position = subscribers.iter().position(|sub| match sub {
            Subscriber::Observer(o) => same_rc(o, observer),
            Subscriber::Slot { .. } => false,
        });
        self.remove_at(&mut subscribers, position)
    }

    fn remove_at(&self, subscribers: &mut Vec<Subscriber<O>>, position: Option<usize>) -> Result<()> {
        match position {
            Some(index) => {
                subscribers.remove(index);
                Ok(())
            }
            None => Err(SignalError::NotConnected {
                signal: self.name.clone(),
            }
            .into()),
        }
    }

    /// Disconnect every subscriber.
    pub fn disconnect_all(&self) {
        self.subscribers.borrow_mut().clear();
    }

    /// Number of subscribers.
    pub fn connection_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to [`emit`](Self::emit) deliver nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.set(blocked);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.get()
    }

    /// Emit the signal, notifying every subscriber in connection order.
    ///
    /// Subscribers connected or disconnected while the emission is running
    /// take effect from the next emission on.
    pub fn emit(&self, args: Args) -> Result<()> {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, signal = %self.name, "signal blocked, skipping emit");
            return Ok(());
        }

        let owner = self.owner.upgrade().ok_or_else(|| SignalError::OwnerDropped {
            signal: self.name.clone(),
        })?;

        // Snapshot so subscribers may reconnect without a live borrow.
        let subscribers: Vec<Subscriber<O>> = self.subscribers.borrow().clone();
        tracing::trace!(
            target: targets::SIGNAL,
            signal = %self.name,
            subscriber_count = subscribers.len(),
            "emitting signal"
        );

        for subscriber in &subscribers {
            match subscriber {
                Subscriber::Slot { slot, bound } => {
                    slot(&owner, &args.combined(bound))?;
                }
                Subscriber::Observer(observer) => {
                    let mut observer =
                        observer
                            .try_borrow_mut()
                            .map_err(|_| SignalError::Reentrant {
                                signal: self.name.clone(),
                            })?;
                    observer.on_notify(&self.name, &owner, &args)?;
                }
            }
        }

        Ok(())
    }
}

impl<O: ?Sized> fmt::Display for Signal<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<O: ?Sized> fmt::Debug for Signal<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("connections", &self.connection_count())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::Error;
    use crate::value::Value;

    struct Car {
        make: &'static str,
    }

    fn car() -> Rc<Car> {
        Rc::new(Car { make: "Honda" })
    }

    fn recorder() -> (Rc<RefCell<Vec<Args>>>, Slot<Car>) {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = received.clone();
        let slot: Slot<Car> = Rc::new(move |_owner: &Rc<Car>, args: &Args| {
            sink.borrow_mut().push(args.clone());
            Ok(())
        });
        (received, slot)
    }

    #[derive(Default)]
    struct Witness {
        seen: Vec<String>,
    }

    impl Observer<Car> for Witness {
        fn on_notify(&mut self, signal: &str, owner: &Rc<Car>, _args: &Args) -> Result<()> {
            match signal {
                "destroyed" => {
                    self.seen.push(format!("{} destroyed", owner.make));
                    Ok(())
                }
                other => Err(SignalError::InvalidSignal(other.to_string()).into()),
            }
        }
    }

    #[test]
    fn test_signal_connect_emit() {
        let owner = car();
        let signal = Signal::new("destroyed", &owner);
        let (received, slot) = recorder();

        signal.connect(slot, Args::new());
        signal.emit(Args::new().arg(42)).unwrap();
        signal.emit(Args::new().arg(100)).unwrap();

        let values: Vec<_> = received.borrow().iter().map(|a| a.get(0).cloned()).collect();
        assert_eq!(values, vec![Some(Value::Int(42)), Some(Value::Int(100))]);
    }

    #[test]
    fn test_bound_args_are_appended() {
        let owner = car();
        let signal = Signal::new("moved", &owner);
        let (received, slot) = recorder();

        signal.connect(slot, Args::new().arg("bound").kwarg("unit", "km"));
        signal
            .emit(Args::new().arg(1).arg(2).kwarg("unit", "mi"))
            .unwrap();

        let args = received.borrow()[0].clone();
        assert_eq!(args.len(), 3);
        assert_eq!(
            args.positional(),
            &[Value::Int(1), Value::Int(2), Value::from("bound")]
        );
        assert_eq!(args.keyword("unit"), Some(&Value::from("km")));
    }

    #[test]
    fn test_bound_args_do_not_leak_between_subscribers() {
        let owner = car();
        let signal = Signal::new("moved", &owner);
        let (first, first_slot) = recorder();
        let (second, second_slot) = recorder();

        signal.connect(first_slot, Args::new().arg("a"));
        signal.connect(second_slot, Args::new());
        signal.emit(Args::new().arg(1)).unwrap();

        assert_eq!(first.borrow()[0].len(), 2);
        assert_eq!(second.borrow()[0].len(), 1);
    }

    #[test]
    fn test_disconnect_restores_count() {
        let owner = car();
        let signal = Signal::new("destroyed", &owner);
        let (_, slot) = recorder();
        let bound = Args::new().arg(1);

        let before = signal.connection_count();
        signal.connect(slot.clone(), bound.clone());
        assert_eq!(signal.connection_count(), before + 1);

        signal.disconnect(&slot, &bound).unwrap();
        assert_eq!(signal.connection_count(), before);
    }

    #[test]
    fn test_disconnect_requires_exact_match() {
        let owner = car();
        let signal = Signal::new("destroyed", &owner);
        let (_, slot) = recorder();
        let (_, other) = recorder();

        signal.connect(slot.clone(), Args::new().arg(1));

        let err = signal.disconnect(&slot, &Args::new().arg(2)).unwrap_err();
        assert!(matches!(
            err,
            Error::Signal(SignalError::NotConnected { ref signal }) if signal == "destroyed"
        ));
        assert!(signal.disconnect(&other, &Args::new().arg(1)).is_err());
        assert_eq!(signal.connection_count(), 1);
    }

    #[test]
    fn test_connect_twice_delivers_twice() {
        let owner = car();
        let signal = Signal::new("destroyed", &owner);
        let (received, slot) = recorder();

        signal.connect(slot.clone(), Args::new());
        signal.connect(slot.clone(), Args::new());
        signal.emit(Args::new()).unwrap();
        assert_eq!(received.borrow().len(), 2);

        signal.disconnect(&slot, &Args::new()).unwrap();
        signal.emit(Args::new()).unwrap();
        assert_eq!(received.borrow().len(), 3);
    }

    #[test]
    fn test_observer_receives_name_and_owner() {
        let owner = car();
        let signal = Signal::new("destroyed", &owner);
        let witness = Rc::new(RefCell::new(Witness::default()));
        let shared: SharedObserver<Car> = witness.clone();

        signal.connect_observer(shared.clone());
        signal.emit(Args::new()).unwrap();
        assert_eq!(witness.borrow().seen, vec!["Honda destroyed".to_string()]);

        signal.disconnect_observer(&shared).unwrap();
        assert!(signal.disconnect_observer(&shared).is_err());
    }

    #[test]
    fn test_observer_rejects_unknown_signal() {
        let owner = car();
        let signal = Signal::new("exploded", &owner);
        signal.connect_observer(Rc::new(RefCell::new(Witness::default())));

        let err = signal.emit(Args::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Signal(SignalError::InvalidSignal(ref name)) if name == "exploded"
        ));
    }

    #[test]
    fn test_error_stops_emission() {
        let owner = car();
        let signal = Signal::new("destroyed", &owner);
        let failing: Slot<Car> = Rc::new(|_: &Rc<Car>, _: &Args| Err(Error::toolkit("boom")));
        let (received, slot) = recorder();

        signal.connect(failing, Args::new());
        signal.connect(slot, Args::new());

        assert!(signal.emit(Args::new()).is_err());
        assert!(received.borrow().is_empty());
    }

    #[test]
    fn test_signal_blocked() {
        let owner = car();
        let signal = Signal::new("destroyed", &owner);
        let (received, slot) = recorder();
        signal.connect(slot, Args::new());

        signal.emit(Args::new().arg(1)).unwrap();
        signal.set_blocked(true);
        signal.emit(Args::new().arg(2)).unwrap();
        signal.set_blocked(false);
        signal.emit(Args::new().arg(3)).unwrap();

        assert_eq!(received.borrow().len(), 2);
    }

    #[test]
    fn test_owner_dropped() {
        let owner = car();
        let signal = Signal::new("destroyed", &owner);
        drop(owner);

        let err = signal.emit(Args::new()).unwrap_err();
        assert!(matches!(err, Error::Signal(SignalError::OwnerDropped { .. })));
    }

    #[test]
    fn test_reconnect_during_emission() {
        let owner = car();
        let signal = Rc::new(Signal::new("destroyed", &owner));
        let (received, slot) = recorder();

        let target = signal.clone();
        let late = slot.clone();
        let connector: Slot<Car> = Rc::new(move |_: &Rc<Car>, _: &Args| {
            target.connect(late.clone(), Args::new());
            Ok(())
        });
        signal.connect(connector, Args::new());

        signal.emit(Args::new()).unwrap();
        assert!(received.borrow().is_empty());
        signal.emit(Args::new()).unwrap();
        assert_eq!(received.borrow().len(), 1);
    }

    /// Re-emits every notification on the signal it observes.
    struct Echo {
        signal: Weak<Signal<Car>>,
    }

    impl Observer<Car> for Echo {
        fn on_notify(&mut self, _signal: &str, _owner: &Rc<Car>, args: &Args) -> Result<()> {
            match self.signal.upgrade() {
                Some(signal) => signal.emit(args.clone()),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn test_observer_reentry_is_reported() {
        let owner = car();
        let signal = Rc::new(Signal::new("destroyed", &owner));
        signal.connect_observer(Rc::new(RefCell::new(Echo {
            signal: Rc::downgrade(&signal),
        })));

        let err = signal.emit(Args::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Signal(SignalError::Reentrant { ref signal }) if signal == "destroyed"
        ));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_blocked_emit_is_traced() {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let owner = car();
            let signal = Signal::new("destroyed", &owner);
            signal.set_blocked(true);
            signal.emit(Args::new()).unwrap();
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("vidgrab_core::signal"));
        assert!(logs.contains("signal blocked, skipping emit"));
        assert!(!logs.contains("emitting signal"));
    }

    #[test]
    fn test_display_is_name() {
        let owner = car();
        let signal = Signal::new("destroyed", &owner);
        assert_eq!(signal.to_string(), "destroyed");
    }
}
