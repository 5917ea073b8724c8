use std::fmt;

use super::ControlId;
use crate::surface::Address;

/// Name of an event category, used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Raw,
    Press,
    Release,
    Change,
    Up,
    Down,
    Toggle,
    Radio,
    Min,
    Max,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Press => "press",
            Self::Release => "release",
            Self::Change => "change",
            Self::Up => "up",
            Self::Down => "down",
            Self::Toggle => "toggle",
            Self::Radio => "radio",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event derived by a control from raw input, with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    /// Every processed value, before anything else.
    Raw { value: u8 },
    Press,
    Release,
    /// `previous` is `None` the first time an address is seen.
    Change { previous: Option<u8>, value: u8 },
    Up { previous: u8, value: u8 },
    Down { previous: u8, value: u8 },
    /// A toggle moved to a new state index.
    Toggle { state: usize },
    /// A radio group changed its selection.
    Radio {
        previous: Option<Address>,
        selected: Option<Address>,
    },
    Min,
    Max,
}

impl ControlEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Raw { .. } => EventKind::Raw,
            Self::Press => EventKind::Press,
            Self::Release => EventKind::Release,
            Self::Change { .. } => EventKind::Change,
            Self::Up { .. } => EventKind::Up,
            Self::Down { .. } => EventKind::Down,
            Self::Toggle { .. } => EventKind::Toggle,
            Self::Radio { .. } => EventKind::Radio,
            Self::Min => EventKind::Min,
            Self::Max => EventKind::Max,
        }
    }
}

/// What a subscriber receives.
#[derive(Debug, Clone, Copy)]
pub struct Emission<'a> {
    pub id: ControlId,
    pub control: &'a str,
    pub address: &'a Address,
    pub event: &'a ControlEvent,
}

impl Emission<'_> {
    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }
}
