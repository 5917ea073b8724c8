use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Color;
use crate::{Result, SurfaceError};

/// Describes which parsed colors a particular surface can display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSupport {
    /// Palette names the device understands. Empty accepts any name.
    #[serde(default)]
    pub names: BTreeSet<String>,
    /// Whether the device takes arbitrary RGB values.
    #[serde(default)]
    pub rgb: bool,
    /// Whether RGB values may flash or fade.
    #[serde(default)]
    pub rgb_effects: bool,
}

impl ColorSupport {
    /// Accepts every color the grammar can produce.
    pub fn any() -> Self {
        Self {
            names: BTreeSet::new(),
            rgb: true,
            rgb_effects: true,
        }
    }

    /// Accepts the given palette names and nothing else.
    pub fn palette<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            rgb: false,
            rgb_effects: false,
        }
    }

    /// Parses `spec` and checks it against the device capabilities.
    pub fn validate(&self, spec: &str) -> Result<Color> {
        let color = Color::parse(spec)?;
        self.check(&color)?;
        Ok(color)
    }

    pub fn check(&self, color: &Color) -> Result<()> {
        if color.rgb.is_some() {
            if !self.rgb {
                return Err(SurfaceError::unsupported(color, "RGB colors are not supported"));
            }
            if (color.is_flashing() || color.fade) && !self.rgb_effects {
                return Err(SurfaceError::unsupported(color, "RGB colors cannot flash or fade"));
            }
        }
        self.check_name(color, color.name.as_deref())?;

        if let Some(alternate) = color.flash_color() {
            if alternate.rgb.is_some() {
                return Err(SurfaceError::unsupported(color, "cannot flash with an RGB color"));
            }
            self.check_name(color, alternate.name.as_deref())?;
        }
        Ok(())
    }

    fn check_name(&self, color: &Color, name: Option<&str>) -> Result<()> {
        match name {
            Some(name) if !self.names.is_empty() && !self.names.contains(name) => Err(
                SurfaceError::unsupported(color, format!("`{name}` is not in the palette")),
            ),
            _ => Ok(()),
        }
    }
}
