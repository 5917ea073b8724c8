use std::{collections::HashMap, fmt, rc::Rc};

use super::{Emission, EventKind};
use crate::{surface::Surface, Result, SurfaceError};

/// Runs before every other subscriber. Behaviors react at this priority.
pub const PRIORITY_FIRST: i32 = i32::MIN;
pub const PRIORITY_DEFAULT: i32 = 0;
pub const PRIORITY_LAST: i32 = i32::MAX;

/// Event callback. An `Err` is reported to the control's [`DiagnosticSink`]
/// and never interrupts the remaining subscribers.
///
/// Callbacks take `&self` because they may run nested inside themselves: a
/// subscriber that dispatches back into its own control sees its own event.
pub type Callback = Rc<dyn Fn(&mut dyn Surface, &Emission<'_>) -> Result<()>>;

/// Returned by `Control::subscribe`, needed to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    kind: EventKind,
    id: u64,
}

impl SubscriptionHandle {
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

/// Receives subscriber failures swallowed during dispatch.
pub trait DiagnosticSink {
    fn subscriber_failed(&self, emission: &Emission<'_>, error: &SurfaceError);
}

/// Default sink, logs a warning through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn subscriber_failed(&self, emission: &Emission<'_>, error: &SurfaceError) {
        tracing::warn!(
            control = emission.control,
            event = %emission.kind(),
            address = %emission.address,
            %error,
            "subscriber failed"
        );
    }
}

struct Subscriber {
    id: u64,
    priority: i32,
    callback: Callback,
}

/// Subscribers per event kind, kept sorted by priority then registration.
#[derive(Default)]
pub(crate) struct Subscriptions {
    next_id: u64,
    by_kind: HashMap<EventKind, Vec<Subscriber>>,
}

impl Subscriptions {
    pub(crate) fn insert(
        &mut self,
        kind: EventKind,
        priority: i32,
        callback: Callback,
    ) -> SubscriptionHandle {
        let id = self.next_id;
        self.next_id += 1;

        let list = self.by_kind.entry(kind).or_default();
        let at = list.partition_point(|subscriber| subscriber.priority <= priority);
        list.insert(
            at,
            Subscriber {
                id,
                priority,
                callback,
            },
        );
        SubscriptionHandle { kind, id }
    }

    pub(crate) fn remove(&mut self, handle: SubscriptionHandle) -> bool {
        let Some(list) = self.by_kind.get_mut(&handle.kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|subscriber| subscriber.id != handle.id);
        list.len() != before
    }

    pub(crate) fn len(&self, kind: EventKind) -> usize {
        self.by_kind.get(&kind).map_or(0, Vec::len)
    }

    /// Callbacks for one kind, in call order. Changes made while they run
    /// apply from the next emission on.
    pub(crate) fn callbacks(&self, kind: EventKind) -> Vec<Callback> {
        self.by_kind
            .get(&kind)
            .map(|list| list.iter().map(|subscriber| Rc::clone(&subscriber.callback)).collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<_> = self
            .by_kind
            .iter()
            .map(|(kind, list)| (*kind, list.len()))
            .collect();
        counts.sort();
        f.debug_struct("Subscriptions")
            .field("counts", &counts)
            .finish()
    }
}
