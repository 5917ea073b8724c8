//! Address predicates.
//!
//! A [`ControlSet`] decides which addresses a control reacts to (`test`) and
//! lists the concrete addresses it paints (`all`). Two shapes exist: an
//! ordered list of match rules with optional wildcards, and a rectangle on
//! the grid.

use std::iter;

use crate::surface::{Address, Catalog, ControlKey, GRID};

/// Lazy, restartable sequence of addresses produced by [`ControlSet::all`].
pub type Addresses<'a> = Box<dyn Iterator<Item = Address> + 'a>;

/// One entry of a rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// `None` matches anything.
    Match {
        group: Option<String>,
        control: Option<ControlKey>,
    },
    Nested(ControlSet),
}

impl Rule {
    /// Matches every address.
    pub fn any() -> Self {
        Self::Match {
            group: None,
            control: None,
        }
    }

    /// Matches every control of a group.
    pub fn group(group: impl Into<String>) -> Self {
        Self::Match {
            group: Some(group.into()),
            control: None,
        }
    }

    /// Matches a control key in any group.
    pub fn control(control: impl Into<ControlKey>) -> Self {
        Self::Match {
            group: None,
            control: Some(control.into()),
        }
    }

    pub fn exact(group: impl Into<String>, control: impl Into<ControlKey>) -> Self {
        Self::Match {
            group: Some(group.into()),
            control: Some(control.into()),
        }
    }

    fn matches(&self, address: &Address) -> bool {
        match self {
            Self::Match { group, control } => {
                group.as_ref().map_or(true, |group| *group == address.group)
                    && control
                        .as_ref()
                        .map_or(true, |control| *control == address.control)
            }
            Self::Nested(set) => set.test(address),
        }
    }

    // Grid cells are not part of the catalog groups, so wildcard rules never
    // expand to them. Only `ControlSet::Grid` enumerates the grid.
    fn expand<'a>(&'a self, catalog: &'a Catalog) -> Addresses<'a> {
        match self {
            Self::Match {
                group: None,
                control: None,
            } => Box::new(catalog.groups().flat_map(|(group, controls)| {
                controls
                    .iter()
                    .map(move |control| Address::new(group, control.clone()))
            })),
            Self::Match {
                group: None,
                control: Some(control),
            } => Box::new(
                catalog
                    .groups()
                    .filter(move |(_, controls)| controls.contains(control))
                    .map(move |(group, _)| Address::new(group, control.clone())),
            ),
            Self::Match {
                group: Some(group),
                control: None,
            } => Box::new(
                catalog
                    .controls(group)
                    .into_iter()
                    .flatten()
                    .map(move |control| Address::new(group.as_str(), control.clone())),
            ),
            Self::Match {
                group: Some(group),
                control: Some(control),
            } => Box::new(iter::once(Address::new(group.as_str(), control.clone()))),
            Self::Nested(set) => set.all(catalog),
        }
    }
}

impl From<Address> for Rule {
    fn from(address: Address) -> Self {
        Self::Match {
            group: Some(address.group),
            control: Some(address.control),
        }
    }
}

impl From<ControlSet> for Rule {
    fn from(set: ControlSet) -> Self {
        Self::Nested(set)
    }
}

/// Inclusive rectangle of grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRange {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl GridRange {
    fn contains(&self, address: &Address) -> bool {
        match address.control {
            ControlKey::Cell(x, y) if address.group == GRID => {
                (self.x1..=self.x2).contains(&x) && (self.y1..=self.y2).contains(&y)
            }
            _ => false,
        }
    }

    fn cells(self) -> impl Iterator<Item = Address> {
        (self.y1..=self.y2).flat_map(move |y| (self.x1..=self.x2).map(move |x| Address::cell(x, y)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlSet {
    Rules(Vec<Rule>),
    Grid(GridRange),
}

impl ControlSet {
    pub fn rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self::Rules(rules.into_iter().collect())
    }

    /// Every labelled address of the surface.
    pub fn any() -> Self {
        Self::Rules(vec![Rule::any()])
    }

    pub fn group(group: impl Into<String>) -> Self {
        Self::Rules(vec![Rule::group(group)])
    }

    pub fn addresses(addresses: impl IntoIterator<Item = Address>) -> Self {
        Self::rules(addresses.into_iter().map(Rule::from))
    }

    pub fn grid(x1: u16, y1: u16, x2: u16, y2: u16) -> Self {
        Self::Grid(GridRange { x1, y1, x2, y2 })
    }

    /// Whether the address belongs to the set.
    pub fn test(&self, address: &Address) -> bool {
        match self {
            Self::Rules(rules) => rules.iter().any(|rule| rule.matches(address)),
            Self::Grid(range) => range.contains(address),
        }
    }

    /// Concrete addresses of the set, with wildcards expanded against the
    /// catalog. Grid ranges are listed row by row, `x` ascending.
    pub fn all<'a>(&'a self, catalog: &'a Catalog) -> Addresses<'a> {
        match self {
            Self::Rules(rules) => Box::new(rules.iter().flat_map(move |rule| rule.expand(catalog))),
            Self::Grid(range) => Box::new(range.cells()),
        }
    }
}
