//! Hardware collaborator contract.
//!
//! Everything model specific (note tables, sysex, port handling) lives behind
//! [`Surface`]. The engine only sees symbolic [`Address`]es, raw values in
//! `0..=127` and color specification strings.

mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;

pub use memory::MemorySurface;

/// Group name used for the button matrix of surfaces that have one.
pub const GRID: &str = "GRID";

/// Color painted by [`Surface::reset`].
pub const OFF: &str = "off";

/// Identifies a control inside its group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlKey {
    Label(String),
    Cell(u16, u16),
}

impl From<&str> for ControlKey {
    fn from(value: &str) -> Self {
        Self::Label(value.to_string())
    }
}

impl From<String> for ControlKey {
    fn from(value: String) -> Self {
        Self::Label(value)
    }
}

impl From<(u16, u16)> for ControlKey {
    fn from((x, y): (u16, u16)) -> Self {
        Self::Cell(x, y)
    }
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => f.write_str(label),
            Self::Cell(x, y) => write!(f, "({x},{y})"),
        }
    }
}

/// One physical element of a surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address {
    pub group: String,
    pub control: ControlKey,
}

impl Address {
    pub fn new(group: impl Into<String>, control: impl Into<ControlKey>) -> Self {
        Self {
            group: group.into(),
            control: control.into(),
        }
    }

    /// Address of a grid cell.
    pub fn cell(x: u16, y: u16) -> Self {
        Self::new(GRID, ControlKey::Cell(x, y))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.control)
    }
}

/// Raw input reported by a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(flatten)]
    pub address: Address,
    pub value: u8,
}

impl RawEvent {
    pub fn new(address: Address, value: u8) -> Self {
        Self { address, value }
    }
}

/// Dimensions of a button matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

/// Ordered inventory of the labelled controls of a surface, plus the size of
/// its grid when it has one. Grid cells are never listed per group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    groups: Vec<(String, Vec<ControlKey>)>,
    grid: Option<GridSize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a control, creating its group on first use.
    pub fn with_control(mut self, group: &str, control: impl Into<ControlKey>) -> Self {
        self.push(group, control.into());
        self
    }

    pub fn with_group<I, C>(mut self, group: &str, controls: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ControlKey>,
    {
        for control in controls {
            self.push(group, control.into());
        }
        self
    }

    pub fn with_grid(mut self, width: u16, height: u16) -> Self {
        self.grid = Some(GridSize { width, height });
        self
    }

    pub fn push(&mut self, group: &str, control: ControlKey) {
        match self.groups.iter_mut().find(|(name, _)| name == group) {
            Some((_, controls)) => controls.push(control),
            None => self.groups.push((group.to_string(), vec![control])),
        }
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[ControlKey])> + '_ {
        self.groups
            .iter()
            .map(|(name, controls)| (name.as_str(), controls.as_slice()))
    }

    pub fn controls(&self, group: &str) -> Option<&[ControlKey]> {
        self.groups
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, controls)| controls.as_slice())
    }

    pub fn grid(&self) -> Option<GridSize> {
        self.grid
    }

    /// Every address in the selected groups, or in all groups when `groups`
    /// is empty. Grid cells come last, row by row.
    pub fn addresses(&self, groups: &[&str]) -> Vec<Address> {
        let selected = |group: &str| groups.is_empty() || groups.iter().any(|g| *g == group);

        let mut out: Vec<Address> = self
            .groups()
            .filter(|&(group, _)| selected(group))
            .flat_map(|(group, controls)| {
                controls
                    .iter()
                    .map(move |control| Address::new(group, control.clone()))
            })
            .collect();

        if let Some(GridSize { width, height }) = self.grid.filter(|_| selected(GRID)) {
            for y in 0..height {
                for x in 0..width {
                    out.push(Address::cell(x, y));
                }
            }
        }
        out
    }
}

/// Adapter between the engine and one model of control surface.
pub trait Surface {
    /// Layout used to expand wildcard control sets.
    fn catalog(&self) -> &Catalog;

    /// Drains the input queued since the previous call without blocking.
    fn pending_events(&mut self) -> Vec<RawEvent>;

    /// Paints one address with a color specification.
    fn set_color(&mut self, address: &Address, spec: &str) -> Result<()>;

    /// Turns off the selected groups, or everything when `groups` is empty.
    fn reset(&mut self, groups: &[&str]) {
        reset_best_effort(self, groups);
    }
}

/// Paints [`OFF`] on every selected address, skipping the ones that refuse.
pub fn reset_best_effort<S: Surface + ?Sized>(surface: &mut S, groups: &[&str]) {
    for address in surface.catalog().addresses(groups) {
        if let Err(err) = surface.set_color(&address, OFF) {
            tracing::debug!(%address, error = %err, "ignoring failed reset");
        }
    }
}
