use super::{checked_spec, fader::limit_event, fader::RAW_MAX, OFF, ON};
use crate::{
    control::{Behavior, ControlContext, ControlEvent},
    surface::Address,
    Result, SurfaceError,
};

/// Position count the output scale is calibrated for.
pub const DEFAULT_POSITIONS: usize = 8;

/// A strip of buttons acting as one fader.
///
/// The strip holds a single value shared by all of its buttons. Pressing a
/// button moves the value to that button's position; every position up to
/// the value is lit. Positions are the control set's addresses in reverse, so
/// position 0 is the last address listed (the bottom of a grid column).
///
/// The value reported to subscribers is the position scaled onto `0..=127`
/// as `round(position / divisor * 127)`. The divisor is
/// `DEFAULT_POSITIONS - 1` unless changed with [`VirtualFader::with_divisor`];
/// outputs beyond 127 are clamped.
#[derive(Debug, Clone)]
pub struct VirtualFader {
    palette: Vec<String>,
    per_position: bool,
    divisor: u32,
    layout: Option<Layout>,
    value: usize,
    changed: bool,
}

#[derive(Debug, Clone)]
struct Layout {
    positions: Vec<Address>,
    colors: Vec<String>,
}

impl Layout {
    fn build(positions: Vec<Address>, palette: &[String]) -> Self {
        let per_color = positions.len().div_ceil(palette.len());
        let colors = palette
            .iter()
            .flat_map(|color| std::iter::repeat(color.clone()).take(per_color))
            .collect();
        Self { positions, colors }
    }
}

impl VirtualFader {
    /// Builds a fader whose lit positions all share one color, picked from
    /// `palette` by the current value.
    pub fn new<I, S>(palette: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let palette = palette
            .into_iter()
            .map(checked_spec)
            .collect::<Result<Vec<_>>>()?;
        if palette.is_empty() {
            return Err(SurfaceError::Config(
                "virtual fader needs at least one color".to_string(),
            ));
        }
        Ok(Self {
            palette,
            per_position: false,
            divisor: (DEFAULT_POSITIONS - 1) as u32,
            layout: None,
            value: 0,
            changed: false,
        })
    }

    /// Paint each lit position with its own palette entry instead of the
    /// color of the current value.
    pub fn per_position_colors(mut self, per_position: bool) -> Self {
        self.per_position = per_position;
        self
    }

    pub fn with_divisor(mut self, divisor: u32) -> Result<Self> {
        if divisor == 0 {
            return Err(SurfaceError::Config(
                "virtual fader divisor must be positive".to_string(),
            ));
        }
        self.divisor = divisor;
        Ok(self)
    }

    /// Current position.
    pub fn position(&self) -> usize {
        self.value
    }

    /// Current position scaled onto `0..=127`.
    pub fn output(&self) -> u8 {
        let scaled = (self.value as f64 / f64::from(self.divisor) * f64::from(RAW_MAX)).round();
        scaled.min(f64::from(RAW_MAX)) as u8
    }

    fn layout(&mut self, ctx: &ControlContext<'_>) -> &Layout {
        self.layout.get_or_insert_with(|| {
            let mut positions = ctx.addresses();
            positions.reverse();
            Layout::build(positions, &self.palette)
        })
    }
}

impl Default for VirtualFader {
    fn default() -> Self {
        Self {
            palette: vec![ON.to_string()],
            per_position: false,
            divisor: (DEFAULT_POSITIONS - 1) as u32,
            layout: None,
            value: 0,
            changed: false,
        }
    }
}

impl Behavior for VirtualFader {
    fn keyed_by_identity(&self) -> bool {
        true
    }

    fn process_value(
        &mut self,
        ctx: &mut ControlContext<'_>,
        address: &Address,
        value: u8,
    ) -> Result<u8> {
        if value != 0 {
            let position = self
                .layout(ctx)
                .positions
                .iter()
                .position(|candidate| candidate == address)
                .ok_or_else(|| SurfaceError::UnknownPosition {
                    control: ctx.name().to_string(),
                    address: address.to_string(),
                })?;
            // The new position only sticks once it is painted.
            let previous = std::mem::replace(&mut self.value, position);
            if let Err(err) = self.render(ctx) {
                self.value = previous;
                return Err(err);
            }
            self.changed = previous != position;
        }
        Ok(self.output())
    }

    fn on_event(
        &mut self,
        ctx: &mut ControlContext<'_>,
        address: &Address,
        event: &ControlEvent,
    ) -> Result<()> {
        if let ControlEvent::Raw { value } = event {
            if std::mem::take(&mut self.changed) {
                if let Some(limit) = limit_event(*value) {
                    ctx.emit(address, limit);
                }
            }
        }
        Ok(())
    }

    fn render(&mut self, ctx: &mut ControlContext<'_>) -> Result<()> {
        let value = self.value;
        let per_position = self.per_position;
        let layout = self.layout(ctx);

        for (index, address) in layout.positions.iter().enumerate() {
            let color = if index > value {
                OFF
            } else if per_position {
                layout.colors[index].as_str()
            } else {
                layout.colors[value].as_str()
            };
            ctx.paint(address, color)?;
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

    fn strip(fader: VirtualFader) -> (MemorySurface, Control) {
        let surface = MemorySurface::new(Catalog::new().with_grid(8, 8));
        (
            surface,
            Control::new("strip", ControlSet::grid(0, 0, 0, 7), fader),
        )
    }

    /// Grid cell holding strip position `index` (position 0 is the bottom).
    fn position(index: u16) -> Address {
        Address::cell(0, 7 - index)
    }

    #[test]
    fn top_and_bottom_positions_hit_the_limits() {
        let (mut surface, control) = strip(VirtualFader::default());
        let events = record(&control, &[EventKind::Raw, EventKind::Min, EventKind::Max]);
        control.render(&mut surface).unwrap();
        assert_eq!(surface.color(&position(0)), Some(ON));
        assert_eq!(surface.color(&position(1)), Some(OFF));

        control.dispatch(&mut surface, &position(7), 127).unwrap();
        control.dispatch(&mut surface, &position(0), 127).unwrap();
        control.dispatch(&mut surface, &position(0), 127).unwrap();

        // The limit is emitted while the fader reacts to `raw`, ahead of the
        // raw subscribers.
        let seen: Vec<_> = events.borrow().iter().map(|(_, event)| event.clone()).collect();
        assert_eq!(
            seen,
            vec![
                ControlEvent::Max,
                ControlEvent::Raw { value: 127 },
                ControlEvent::Min,
                ControlEvent::Raw { value: 0 },
                ControlEvent::Raw { value: 0 },
            ]
        );
    }

    #[test]
    fn scales_positions_and_shares_one_value() {
        let (mut surface, control) = strip(VirtualFader::default());
        let events = record(&control, &[EventKind::Change]);

        control.dispatch(&mut surface, &position(3), 127).unwrap();
        // Releasing reports the held value again rather than zero.
        control.dispatch(&mut surface, &position(3), 0).unwrap();

        assert_eq!(
            *events.borrow(),
            vec![(
                position(3),
                ControlEvent::Change {
                    previous: None,
                    value: 54
                }
            )]
        );
        assert_eq!(control.last_value(&position(6)), Some(54));
    }

    #[test]
    fn lights_positions_up_to_the_value() {
        let fader = VirtualFader::new(["green", "yellow"])
            .unwrap()
            .per_position_colors(true);
        let (mut surface, control) = strip(fader);

        control.dispatch(&mut surface, &position(5), 127).unwrap();

        for index in 0..=3 {
            assert_eq!(surface.color(&position(index)), Some("green"));
        }
        for index in 4..=5 {
            assert_eq!(surface.color(&position(index)), Some("yellow"));
        }
        for index in 6..=7 {
            assert_eq!(surface.color(&position(index)), Some(OFF));
        }
    }

    #[test]
    fn uniform_color_follows_the_value() {
        let fader = VirtualFader::new(["green", "red"]).unwrap();
        let (mut surface, control) = strip(fader);

        control.dispatch(&mut surface, &position(6), 127).unwrap();

        assert_eq!(surface.color(&position(0)), Some("red"));
        assert_eq!(surface.color(&position(6)), Some("red"));
        assert_eq!(surface.color(&position(7)), Some(OFF));
    }

    #[test]
    fn divisor_is_configurable_and_output_clamped() {
        let fader = VirtualFader::default().with_divisor(3).unwrap();
        let (mut surface, control) = strip(fader);
        let events = record(&control, &[EventKind::Max]);

        control.dispatch(&mut surface, &position(3), 127).unwrap();
        assert_eq!(control.last_value(&position(3)), Some(127));
        control.dispatch(&mut surface, &position(5), 127).unwrap();
        assert_eq!(control.last_value(&position(5)), Some(127));
        assert_eq!(events.borrow().len(), 2);

        assert!(VirtualFader::default().with_divisor(0).is_err());
        assert!(VirtualFader::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn failed_repaint_keeps_the_previous_position() {
        let (mut surface, control) = strip(VirtualFader::default());
        let events = record(&control, &[EventKind::Min, EventKind::Max]);
        control.render(&mut surface).unwrap();
        surface.reject(position(4));

        let err = control.dispatch(&mut surface, &position(7), 127).unwrap_err();
        assert!(matches!(err, SurfaceError::Message(_)));
        assert_eq!(control.last_value(&position(7)), None);

        // Releasing afterwards is an ordinary zero, not a jump to the top.
        control.dispatch(&mut surface, &position(7), 0).unwrap();
        assert!(events.borrow().is_empty());
        assert_eq!(control.last_value(&position(7)), Some(0));
    }

    #[test]
    fn unknown_address_is_an_error() {
        let mut surface = MemorySurface::new(Catalog::new().with_grid(8, 8));
        // Wildcard grid rules match cells but never enumerate them.
        let control = Control::new("strip", ControlSet::group("GRID"), VirtualFader::default());

        let err = control
            .dispatch(&mut surface, &Address::cell(0, 0), 127)
            .unwrap_err();
        assert!(matches!(err, SurfaceError::UnknownPosition { .. }));
    }
}
