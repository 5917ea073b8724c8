use crate::{
    control::{Behavior, ControlContext, ControlEvent},
    surface::Address,
    Result,
};

/// Physical fader or knob. Adds `min` and `max` events at the ends of the
/// travel and never paints.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fader;

pub(crate) const RAW_MIN: u8 = 0;
pub(crate) const RAW_MAX: u8 = 127;

/// `min`/`max` event for a value at either end of the range.
pub(crate) fn limit_event(value: u8) -> Option<ControlEvent> {
    match value {
        RAW_MIN => Some(ControlEvent::Min),
        RAW_MAX => Some(ControlEvent::Max),
        _ => None,
    }
}

impl Behavior for Fader {
    fn on_event(
        &mut self,
        ctx: &mut ControlContext<'_>,
        address: &Address,
        event: &ControlEvent,
    ) -> Result<()> {
        if let ControlEvent::Raw { value } = event {
            if let Some(limit) = limit_event(*value) {
                ctx.emit(address, limit);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        control::{Control, EventKind},
        control_set::ControlSet,
        surface::{Catalog, MemorySurface},
        variants::testing::record,
    };

    #[test]
    fn reports_both_ends_of_travel() {
        let mut surface = MemorySurface::new(Catalog::new().with_group("FADER", ["1"]));
        let control = Control::new("fader", ControlSet::group("FADER"), Fader);
        let events = record(&control, &[EventKind::Min, EventKind::Max]);
        let fader = Address::new("FADER", "1");

        for value in [0, 64, 127, 127, 12, 0] {
            control.dispatch(&mut surface, &fader, value).unwrap();
        }

        let kinds: Vec<_> = events.borrow().iter().map(|(_, event)| event.kind()).collect();
        assert_eq!(
            kinds,
            [EventKind::Min, EventKind::Max, EventKind::Max, EventKind::Min]
        );
        assert!(surface.writes().is_empty());
    }
}
