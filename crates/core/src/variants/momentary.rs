use super::{checked_spec, OFF, ON};
use crate::{
    control::{Behavior, ControlContext, ControlEvent},
    surface::Address,
    Result,
};

/// Lit while held, dark otherwise.
#[derive(Debug, Clone)]
pub struct Momentary {
    on_color: String,
    off_color: String,
}

impl Momentary {
    pub fn new(on_color: impl Into<String>, off_color: impl Into<String>) -> Result<Self> {
        Ok(Self {
            on_color: checked_spec(on_color)?,
            off_color: checked_spec(off_color)?,
        })
    }
}

impl Default for Momentary {
    fn default() -> Self {
        Self {
            on_color: ON.to_string(),
            off_color: OFF.to_string(),
        }
    }
}

impl Behavior for Momentary {
    fn on_event(
        &mut self,
        ctx: &mut ControlContext<'_>,
        address: &Address,
        event: &ControlEvent,
    ) -> Result<()> {
        match event {
            ControlEvent::Press => ctx.paint(address, &self.on_color),
            ControlEvent::Release => ctx.paint(address, &self.off_color),
            _ => Ok(()),
        }
    }

    fn render(&mut self, ctx: &mut ControlContext<'_>) -> Result<()> {
        for address in ctx.addresses() {
            ctx.paint(&address, &self.off_color)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        control::Control,
        control_set::ControlSet,
        surface::{Catalog, MemorySurface},
        SurfaceError,
    };

    #[test]
    fn paints_on_while_held() {
        let mut surface = MemorySurface::new(Catalog::new().with_group("SIDE", ["A", "B"]));
        let control = Control::new(
            "side",
            ControlSet::group("SIDE"),
            Momentary::new("red flash", "off").unwrap(),
        );
        let a = Address::new("SIDE", "A");

        control.render(&mut surface).unwrap();
        assert_eq!(surface.color(&a), Some("off"));
        assert_eq!(surface.color(&Address::new("SIDE", "B")), Some("off"));

        control.dispatch(&mut surface, &a, 127).unwrap();
        assert_eq!(surface.color(&a), Some("red flash"));

        control.dispatch(&mut surface, &a, 0).unwrap();
        assert_eq!(surface.color(&a), Some("off"));
    }

    #[test]
    fn rejects_malformed_colors() {
        let err = Momentary::new("#12", "off").unwrap_err();
        assert!(matches!(err, SurfaceError::ColorParse { .. }));
    }
}
