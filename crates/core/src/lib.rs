//! Core library for driving MIDI control surfaces.
//!
//! The crate is hardware agnostic. A model-specific adapter implements
//! [`Surface`] to report raw `(address, value)` input and to paint colors,
//! and everything above it lives here: address predicates
//! ([`ControlSet`]), per-control event dispatch ([`Control`] plus the stock
//! [`variants`]), views and the view stack ([`View`], [`ViewSet`]) and the
//! color specification language ([`Color`]).
//!
//! Everything runs on one thread. Input is pulled with [`ViewSet::dispatch`]
//! and every reaction, including painting, happens synchronously inside it.

pub mod color;
pub mod config;
pub mod control;
pub mod control_set;
pub mod error;
pub mod surface;
pub mod variants;
pub mod view;

pub use color::{Color, ColorSupport, Flash, Rgb};
pub use config::{GroupLayout, SurfaceLayout};
pub use control::{
    Behavior, Control, ControlContext, ControlEvent, ControlId, DiagnosticSink, Emission,
    EventKind, SharedControl, SubscriptionHandle, TracingSink,
};
pub use control_set::{ControlSet, GridRange, Rule};
pub use error::{Result, SurfaceError};
pub use surface::{Address, Catalog, ControlKey, GridSize, MemorySurface, RawEvent, Surface};
pub use variants::{Fader, Momentary, Radio, Toggle, VirtualFader};
pub use view::{Navigator, View, ViewSet};
