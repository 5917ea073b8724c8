use std::collections::{HashMap, HashSet, VecDeque};

use super::{reset_best_effort, Address, Catalog, RawEvent, Surface};
use crate::{color::ColorSupport, Result, SurfaceError};

/// Surface that lives entirely in memory. Input is queued by hand and every
/// accepted write is recorded, which makes it the collaborator of choice for
/// tests and offline demos.
#[derive(Debug, Default)]
pub struct MemorySurface {
    catalog: Catalog,
    support: ColorSupport,
    pending: VecDeque<RawEvent>,
    colors: HashMap<Address, String>,
    writes: Vec<(Address, String)>,
    rejected: HashSet<Address>,
    resets: usize,
}

impl MemorySurface {
    /// Creates a surface that accepts any color.
    pub fn new(catalog: Catalog) -> Self {
        Self::with_support(catalog, ColorSupport::any())
    }

    pub fn with_support(catalog: Catalog, support: ColorSupport) -> Self {
        Self {
            catalog,
            support,
            ..Self::default()
        }
    }

    pub fn queue(&mut self, address: Address, value: u8) {
        self.pending.push_back(RawEvent::new(address, value));
    }

    pub fn queue_all(&mut self, events: impl IntoIterator<Item = RawEvent>) {
        self.pending.extend(events);
    }

    /// Makes every future write to `address` fail.
    pub fn reject(&mut self, address: Address) {
        self.rejected.insert(address);
    }

    /// Current color specification of `address`, if it was ever painted.
    pub fn color(&self, address: &Address) -> Option<&str> {
        self.colors.get(address).map(String::as_str)
    }

    /// Every accepted write in order.
    pub fn writes(&self) -> &[(Address, String)] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Number of times [`Surface::reset`] was called.
    pub fn resets(&self) -> usize {
        self.resets
    }
}

impl Surface for MemorySurface {
    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn pending_events(&mut self) -> Vec<RawEvent> {
        self.pending.drain(..).collect()
    }

    fn set_color(&mut self, address: &Address, spec: &str) -> Result<()> {
        if self.rejected.contains(address) {
            return Err(SurfaceError::msg(format!("{address} rejected the write")));
        }
        self.support.validate(spec)?;

        tracing::trace!(%address, spec, "paint");
        self.colors.insert(address.clone(), spec.to_string());
        self.writes.push((address.clone(), spec.to_string()));
        Ok(())
    }

    fn reset(&mut self, groups: &[&str]) {
        self.resets += 1;
        reset_best_effort(self, groups);
    }
}
