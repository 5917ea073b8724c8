use std::collections::HashMap;

use super::checked_spec;
use crate::{
    control::{Behavior, ControlContext, ControlEvent},
    surface::Address,
    Result, SurfaceError,
};

/// Cycles each address through a fixed number of states, one color each.
#[derive(Debug, Clone)]
pub struct Toggle {
    colors: Vec<String>,
    states: HashMap<Address, usize>,
}

impl Toggle {
    /// Builds a toggle with `states` states; `colors` must hold exactly one
    /// color per state.
    pub fn new<I, S>(states: usize, colors: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let colors = colors
            .into_iter()
            .map(checked_spec)
            .collect::<Result<Vec<_>>>()?;
        if states == 0 || colors.len() != states {
            return Err(SurfaceError::Config(format!(
                "toggle with {states} states needs {states} colors, got {}",
                colors.len()
            )));
        }
        Ok(Self {
            colors,
            states: HashMap::new(),
        })
    }

    /// Two-state on/off toggle.
    pub fn on_off() -> Self {
        Self {
            colors: vec![super::OFF.to_string(), super::ON.to_string()],
            states: HashMap::new(),
        }
    }

    pub fn state(&self, address: &Address) -> usize {
        self.states.get(address).copied().unwrap_or_default()
    }
}

impl Behavior for Toggle {
    fn on_event(
        &mut self,
        ctx: &mut ControlContext<'_>,
        address: &Address,
        event: &ControlEvent,
    ) -> Result<()> {
        if *event != ControlEvent::Press {
            return Ok(());
        }

        let state = self.states.entry(address.clone()).or_default();
        *state = (*state + 1) % self.colors.len();
        let state = *state;

        ctx.paint(address, &self.colors[state])?;
        ctx.emit(address, ControlEvent::Toggle { state });
        Ok(())
    }

    fn render(&mut self, ctx: &mut ControlContext<'_>) -> Result<()> {
        for address in ctx.addresses() {
            let state = self.state(&address);
            ctx.paint(&address, &self.colors[state])?;
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
    fn state_count_must_match_colors() {
        let err = Toggle::new(3, ["off", "on"]).unwrap_err();
        assert!(matches!(err, SurfaceError::Config(_)));
        assert!(Toggle::new(0, Vec::<String>::new()).is_err());
    }

    #[test]
    fn cycles_through_states_per_address() {
        let mut surface = MemorySurface::new(Catalog::new().with_grid(2, 1));
        let control = Control::new(
            "toggle",
            ControlSet::grid(0, 0, 1, 0),
            Toggle::new(3, ["off", "green", "red"]).unwrap(),
        );
        let events = record(&control, &[EventKind::Toggle]);
        let a = Address::cell(0, 0);
        let b = Address::cell(1, 0);

        control.render(&mut surface).unwrap();
        assert_eq!(surface.color(&a), Some("off"));

        for _ in 0..4 {
            control.dispatch(&mut surface, &a, 127).unwrap();
            control.dispatch(&mut surface, &a, 0).unwrap();
        }
        control.dispatch(&mut surface, &b, 127).unwrap();

        assert_eq!(
            *events.borrow(),
            vec![
                (a.clone(), ControlEvent::Toggle { state: 1 }),
                (a.clone(), ControlEvent::Toggle { state: 2 }),
                (a.clone(), ControlEvent::Toggle { state: 0 }),
                (a.clone(), ControlEvent::Toggle { state: 1 }),
                (b.clone(), ControlEvent::Toggle { state: 1 }),
            ]
        );
        assert_eq!(surface.color(&a), Some("green"));
        assert_eq!(surface.color(&b), Some("green"));
    }
}
