use super::{checked_spec, OFF, ON};
use crate::{
    control::{Behavior, ControlContext, ControlEvent},
    surface::Address,
    Result,
};

/// Single selection across all matched addresses.
#[derive(Debug, Clone)]
pub struct Radio {
    on_color: String,
    off_color: String,
    select_first: bool,
    allow_deselect: bool,
    first_selected: bool,
    selected: Option<Address>,
}

impl Radio {
    pub fn new() -> Self {
        Self {
            on_color: ON.to_string(),
            off_color: OFF.to_string(),
            select_first: true,
            allow_deselect: false,
            first_selected: false,
            selected: None,
        }
    }

    pub fn with_colors(
        mut self,
        on_color: impl Into<String>,
        off_color: impl Into<String>,
    ) -> Result<Self> {
        self.on_color = checked_spec(on_color)?;
        self.off_color = checked_spec(off_color)?;
        Ok(self)
    }

    /// Select the first address on the first render. Defaults to `true`.
    pub fn select_first(mut self, select_first: bool) -> Self {
        self.select_first = select_first;
        self
    }

    /// Let a press on the selected address clear the selection. Defaults to
    /// `false`.
    pub fn allow_deselect(mut self, allow_deselect: bool) -> Self {
        self.allow_deselect = allow_deselect;
        self
    }

    pub fn selected(&self) -> Option<&Address> {
        self.selected.as_ref()
    }
}

impl Default for Radio {
    fn default() -> Self {
        Self::new()
    }
}

impl Behavior for Radio {
    fn on_event(
        &mut self,
        ctx: &mut ControlContext<'_>,
        address: &Address,
        event: &ControlEvent,
    ) -> Result<()> {
        if *event != ControlEvent::Press {
            return Ok(());
        }

        if self.selected.as_ref() == Some(address) {
            if !self.allow_deselect {
                return Ok(());
            }
            let previous = self.selected.take();
            self.render(ctx)?;
            ctx.emit(
                address,
                ControlEvent::Radio {
                    previous,
                    selected: None,
                },
            );
        } else {
            let previous = self.selected.replace(address.clone());
            self.render(ctx)?;
            ctx.emit(
                address,
                ControlEvent::Radio {
                    previous,
                    selected: Some(address.clone()),
                },
            );
        }
        Ok(())
    }

    fn render(&mut self, ctx: &mut ControlContext<'_>) -> Result<()> {
        // Retried on every render until something is selected once.
        if self.select_first && !self.first_selected {
            if self.selected.is_none() {
                self.selected = ctx.first_address();
            }
            self.first_selected = self.selected.is_some();
        }

        for address in ctx.addresses() {
            let color = if self.selected.as_ref() == Some(&address) {
                &self.on_color
            } else {
                &self.off_color
            };
            ctx.paint(&address, color)?;
        }
        Ok(())
    }
}
