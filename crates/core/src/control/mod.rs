//! Per-control event dispatch.
//!
//! A [`Control`] filters raw input through its [`ControlSet`], keeps the last
//! value seen per key and turns each raw value into derived events. Events
//! fire in a fixed order: `raw`, then `press` or `release`, then `change`,
//! then `up` or `down`. Within one kind, subscribers run by ascending
//! priority and then by registration order.
//!
//! Variant behavior (momentary, toggle, radio, ...) plugs in through the
//! [`Behavior`] trait. A behavior sees every event before any subscriber, as
//! if it had subscribed at [`PRIORITY_FIRST`] during construction.
//!
//! Subscribers run synchronously with no borrow of the control held, so a
//! subscriber may dispatch into any control, its own included. The nested
//! dispatch completes before the next subscriber runs. Cyclic subscription
//! graphs recurse without bound.

mod event;
mod subscriptions;

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    control_set::ControlSet,
    surface::{Address, Surface},
    Result,
};

pub use event::{ControlEvent, Emission, EventKind};
pub use subscriptions::{
    Callback, DiagnosticSink, SubscriptionHandle, TracingSink, PRIORITY_DEFAULT, PRIORITY_FIRST,
    PRIORITY_LAST,
};

use subscriptions::Subscriptions;

/// Control shared between views and subscribers.
pub type SharedControl = Rc<Control>;

/// Process-wide unique control identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(u64);

impl ControlId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Variant-specific reactions of a [`Control`].
pub trait Behavior {
    /// Whether the control keeps one value for all of its addresses instead
    /// of one per address. Read once, when the control is built.
    fn keyed_by_identity(&self) -> bool {
        false
    }

    /// Maps the raw value before events are derived from it.
    fn process_value(
        &mut self,
        _ctx: &mut ControlContext<'_>,
        _address: &Address,
        value: u8,
    ) -> Result<u8> {
        Ok(value)
    }

    /// Called for every derived event before the subscribers. Errors are
    /// reported like subscriber failures.
    fn on_event(
        &mut self,
        _ctx: &mut ControlContext<'_>,
        _address: &Address,
        _event: &ControlEvent,
    ) -> Result<()> {
        Ok(())
    }

    /// Paints the matched addresses.
    fn render(&mut self, _ctx: &mut ControlContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Behavior of a bare control: events only, no painting.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passive;

impl Behavior for Passive {}

/// Everything a [`Behavior`] may touch while handling a call.
pub struct ControlContext<'a> {
    surface: &'a mut dyn Surface,
    id: ControlId,
    name: &'a str,
    controls: &'a ControlSet,
    emitted: Vec<(Address, ControlEvent)>,
}

impl<'a> ControlContext<'a> {
    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn surface(&mut self) -> &mut dyn Surface {
        &mut *self.surface
    }

    /// Concrete addresses of the control, expanded against the catalog.
    pub fn addresses(&self) -> Vec<Address> {
        self.controls.all(self.surface.catalog()).collect()
    }

    pub fn first_address(&self) -> Option<Address> {
        self.controls.all(self.surface.catalog()).next()
    }

    pub fn paint(&mut self, address: &Address, spec: &str) -> Result<()> {
        self.surface.set_color(address, spec)
    }

    /// Sends an event to the subscribers of this control. Delivery happens
    /// in emission order as soon as the current hook returns, ahead of the
    /// subscribers of the event being handled.
    pub fn emit(&mut self, address: &Address, event: ControlEvent) {
        self.emitted.push((address.clone(), event));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum StateKey {
    Identity,
    Address(Address),
}

/// Stateful dispatch engine bound to a set of addresses.
///
/// All methods take `&self`; state lives in cells that are only borrowed
/// for the span of one step, never across a subscriber call.
pub struct Control {
    id: ControlId,
    name: String,
    controls: ControlSet,
    by_identity: bool,
    behavior: RefCell<Box<dyn Behavior>>,
    subscriptions: RefCell<Subscriptions>,
    last_values: RefCell<HashMap<StateKey, u8>>,
    diagnostics: Rc<dyn DiagnosticSink>,
}

impl Control {
    pub fn new(
        name: impl Into<String>,
        controls: ControlSet,
        behavior: impl Behavior + 'static,
    ) -> Self {
        Self {
            id: ControlId::next(),
            name: name.into(),
            controls,
            by_identity: behavior.keyed_by_identity(),
            behavior: RefCell::new(Box::new(behavior)),
            subscriptions: RefCell::default(),
            last_values: RefCell::default(),
            diagnostics: Rc::new(TracingSink),
        }
    }

    /// A control without variant behavior.
    pub fn passive(name: impl Into<String>, controls: ControlSet) -> Self {
        Self::new(name, controls, Passive)
    }

    /// Replaces the sink that receives subscriber failures.
    pub fn with_diagnostics(mut self, diagnostics: Rc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn shared(self) -> SharedControl {
        Rc::new(self)
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn controls(&self) -> &ControlSet {
        &self.controls
    }

    /// Registers a callback for one event kind.
    pub fn subscribe<F>(&self, kind: EventKind, priority: i32, callback: F) -> SubscriptionHandle
    where
        F: Fn(&mut dyn Surface, &Emission<'_>) -> Result<()> + 'static,
    {
        self.subscriptions
            .borrow_mut()
            .insert(kind, priority, Rc::new(callback))
    }

    /// Registers a callback at [`PRIORITY_DEFAULT`].
    pub fn on<F>(&self, kind: EventKind, callback: F) -> SubscriptionHandle
    where
        F: Fn(&mut dyn Surface, &Emission<'_>) -> Result<()> + 'static,
    {
        self.subscribe(kind, PRIORITY_DEFAULT, callback)
    }

    /// Returns whether the subscription was still registered.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.subscriptions.borrow_mut().remove(handle)
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscriptions.borrow().len(kind)
    }

    /// Last processed value stored for `address`, or for the whole control
    /// when the behavior is keyed by identity.
    pub fn last_value(&self, address: &Address) -> Option<u8> {
        self.last_values.borrow().get(&self.key(address)).copied()
    }

    /// Feeds one raw value into the control.
    pub fn dispatch(&self, surface: &mut dyn Surface, address: &Address, raw: u8) -> Result<()> {
        if !self.controls.test(address) {
            return Ok(());
        }
        let key = self.key(address);

        let value =
            self.with_behavior(surface, |behavior, ctx| behavior.process_value(ctx, address, raw))?;
        let previous = self.last_values.borrow().get(&key).copied();
        tracing::debug!(control = %self.name, %address, raw, value, ?previous, "dispatch");

        self.fire(surface, address, ControlEvent::Raw { value });

        let was_on = previous.map_or(false, |previous| previous != 0);
        if value != 0 && !was_on {
            self.fire(surface, address, ControlEvent::Press);
        } else if value == 0 && was_on {
            self.fire(surface, address, ControlEvent::Release);
        }

        if previous != Some(value) {
            self.fire(surface, address, ControlEvent::Change { previous, value });
        }

        if let Some(previous) = previous {
            if value > previous {
                self.fire(surface, address, ControlEvent::Up { previous, value });
            } else if value < previous {
                self.fire(surface, address, ControlEvent::Down { previous, value });
            }
        }

        self.last_values.borrow_mut().insert(key, value);
        Ok(())
    }

    /// Paints the control's addresses according to its current state.
    pub fn render(&self, surface: &mut dyn Surface) -> Result<()> {
        tracing::debug!(control = %self.name, "render");
        self.with_behavior(surface, |behavior, ctx| behavior.render(ctx))
    }

    fn key(&self, address: &Address) -> StateKey {
        if self.by_identity {
            StateKey::Identity
        } else {
            StateKey::Address(address.clone())
        }
    }

    /// Runs one behavior hook, then delivers whatever it emitted.
    fn with_behavior<T>(
        &self,
        surface: &mut dyn Surface,
        hook: impl FnOnce(&mut dyn Behavior, &mut ControlContext<'_>) -> T,
    ) -> T {
        let (result, emitted) = {
            let mut behavior = self.behavior.borrow_mut();
            let mut ctx = ControlContext {
                surface: &mut *surface,
                id: self.id,
                name: &self.name,
                controls: &self.controls,
                emitted: Vec::new(),
            };
            let result = hook(&mut **behavior, &mut ctx);
            (result, ctx.emitted)
        };
        for (address, event) in emitted {
            self.notify(surface, &address, &event);
        }
        result
    }

    fn fire(&self, surface: &mut dyn Surface, address: &Address, event: ControlEvent) {
        let reacted =
            self.with_behavior(surface, |behavior, ctx| behavior.on_event(ctx, address, &event));
        if let Err(err) = reacted {
            self.diagnostics
                .subscriber_failed(&self.emission(address, &event), &err);
        }
        self.notify(surface, address, &event);
    }

    fn notify(&self, surface: &mut dyn Surface, address: &Address, event: &ControlEvent) {
        let emission = self.emission(address, event);
        tracing::trace!(control = %self.name, %address, ?event, "emit");
        let callbacks = self.subscriptions.borrow().callbacks(event.kind());
        for callback in callbacks {
            if let Err(err) = callback(&mut *surface, &emission) {
                self.diagnostics.subscriber_failed(&emission, &err);
            }
        }
    }

    fn emission<'a>(&'a self, address: &'a Address, event: &'a ControlEvent) -> Emission<'a> {
        Emission {
            id: self.id,
            control: &self.name,
            address,
            event,
        }
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("controls", &self.controls)
            .field("subscriptions", &self.subscriptions)
            .field("last_values", &self.last_values.borrow().len())
            .finish()
    }
}
