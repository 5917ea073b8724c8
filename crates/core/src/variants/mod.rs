//! The stock [`Behavior`](crate::control::Behavior) implementations.
//!
//! Each variant validates its color specifications when it is built, so a
//! misconfigured control fails before it is ever rendered.

mod fader;
mod momentary;
mod radio;
mod toggle;
mod virtual_fader;

pub use fader::Fader;
pub use momentary::Momentary;
pub use radio::Radio;
pub use toggle::Toggle;
pub use virtual_fader::VirtualFader;

use crate::{color::Color, Result};

/// Color painted on the "active" state when nothing else is configured.
pub const ON: &str = "on";
pub use crate::surface::OFF;

fn checked_spec(spec: impl Into<String>) -> Result<String> {
    let spec = spec.into();
    Color::parse(&spec)?;
    Ok(spec)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{cell::RefCell, rc::Rc};

    use crate::{
        control::{Control, ControlEvent, EventKind},
        surface::Address,
    };

    pub(crate) type Events = Rc<RefCell<Vec<(Address, ControlEvent)>>>;

    /// Records every emission of the given kinds.
    pub(crate) fn record(control: &Control, kinds: &[EventKind]) -> Events {
        let events = Events::default();
        for kind in kinds {
            let events = Rc::clone(&events);
            control.on(*kind, move |_, emission| {
                events
                    .borrow_mut()
                    .push((emission.address.clone(), emission.event.clone()));
                Ok(())
            });
        }
        events
    }
}
