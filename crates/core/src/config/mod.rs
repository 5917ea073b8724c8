use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    color::ColorSupport,
    surface::{Catalog, GridSize, MemorySurface},
    Result,
};

/// Physical layout of a control surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceLayout {
    pub name: String,
    #[serde(default)]
    pub groups: Vec<GroupLayout>,
    #[serde(default)]
    pub grid: Option<GridSize>,
    #[serde(default = "ColorSupport::any")]
    pub colors: ColorSupport,
}

/// Labelled controls sharing a role, in surface order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLayout {
    pub name: String,
    pub controls: Vec<String>,
}

impl GroupLayout {
    fn new(name: &str, controls: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            controls: controls.iter().map(|control| control.to_string()).collect(),
        }
    }
}

impl Default for SurfaceLayout {
    fn default() -> Self {
        Self {
            name: "Generic 8x8 pad".to_string(),
            groups: vec![
                GroupLayout::new("NAV", &["UP", "DOWN", "LEFT", "RIGHT"]),
                GroupLayout::new("MODE", &["SESSION", "USER1", "USER2", "MIXER"]),
                GroupLayout::new(
                    "SIDE",
                    &["VOLUME", "PAN", "SENDA", "SENDB", "STOP", "MUTE", "SOLO", "ARM"],
                ),
            ],
            grid: Some(GridSize {
                width: 8,
                height: 8,
            }),
            colors: ColorSupport {
                rgb: true,
                ..ColorSupport::palette([
                    "off", "on", "white", "red", "orange", "yellow", "green", "lime", "cyan",
                    "blue", "purple", "pink",
                ])
            },
        }
    }
}

impl SurfaceLayout {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(?path, "loading surface layout");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn catalog(&self) -> Catalog {
        let mut catalog = self.groups.iter().fold(Catalog::new(), |catalog, group| {
            catalog.with_group(&group.name, group.controls.iter().map(String::as_str))
        });
        if let Some(GridSize { width, height }) = self.grid {
            catalog = catalog.with_grid(width, height);
        }
        catalog
    }

    pub fn color_support(&self) -> ColorSupport {
        self.colors.clone()
    }

    /// In-memory surface with this layout.
    pub fn memory_surface(&self) -> MemorySurface {
        MemorySurface::with_support(self.catalog(), self.color_support())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Address, Surface, GRID};

    #[test]
    fn default_layout_builds_catalog() {
        let catalog = SurfaceLayout::default().catalog();
        let groups: Vec<_> = catalog.groups().map(|(name, _)| name).collect();
        assert_eq!(groups, ["NAV", "MODE", "SIDE"]);
        assert_eq!(catalog.controls("SIDE").map(<[_]>::len), Some(8));
        assert_eq!(catalog.grid(), Some(GridSize { width: 8, height: 8 }));
        assert!(catalog.controls(GRID).is_none());
    }

    #[test]
    fn parses_minimal_json_layout() {
        let layout = SurfaceLayout::from_json_str(
            r#"{"name": "strip", "groups": [{"name": "KNOB", "controls": ["1", "2"]}]}"#,
        )
        .unwrap();

        assert_eq!(layout.grid, None);
        assert_eq!(layout.colors, ColorSupport::any());
        let mut surface = layout.memory_surface();
        assert!(surface
            .set_color(&Address::new("KNOB", "1"), "#ff8000 flash")
            .is_ok());
    }

    #[test]
    fn default_palette_is_enforced() {
        let mut surface = SurfaceLayout::default().memory_surface();
        let pad = Address::cell(0, 0);
        assert!(surface.set_color(&pad, "green@3").is_ok());
        assert!(surface.set_color(&pad, "12,40,100").is_ok());
        assert!(surface.set_color(&pad, "12,40,100 flash").is_err());
        assert!(surface.set_color(&pad, "magenta").is_err());
    }

    #[test]
    fn reports_malformed_json() {
        let err = SurfaceLayout::from_json_str("{").unwrap_err();
        assert!(matches!(err, crate::SurfaceError::Json(_)));
    }
}
