//! Typed, synchronous event bus owned by each critter.
//!
//! Listeners subscribe to one [`EventKind`] or to every kind, and are
//! invoked in subscription order with the source critter and a mutable
//! payload. The reproducing payload owns the offspring until a listener
//! takes it; listeners that run later still see the offspring's name and
//! strategy.

use generations_types::EventKind;

use crate::critter::Critter;

/// Boxed listener callback.
pub type Listener = Box<dyn FnMut(&Critter, &mut EventPayload)>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerHandle(u64);

/// Which events a listener receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFilter {
    /// Only events of this kind.
    Only(EventKind),
    /// Every event.
    Any,
}

impl EventFilter {
    /// Whether an event of `kind` passes this filter.
    pub fn matches(self, kind: EventKind) -> bool {
        match self {
            Self::Only(wanted) => wanted == kind,
            Self::Any => true,
        }
    }
}

/// Data carried by a lifecycle event.
#[derive(Debug)]
pub enum EventPayload {
    /// The source critter's food fell to zero or below.
    Dying {
        /// Food balance at the moment of the event.
        food: i64,
    },
    /// The source critter produced an offspring.
    Reproducing {
        /// Name of the offspring.
        offspring_name: String,
        /// Short name of the offspring's strategy.
        offspring_strategy: String,
        /// Whether the offspring's strategy was drawn from the mutation catalog.
        mutant: bool,
        /// The offspring itself, until a listener takes it.
        offspring: Option<Box<Critter>>,
    },
}

impl EventPayload {
    /// The kind of this event.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Dying { .. } => EventKind::Dying,
            Self::Reproducing { .. } => EventKind::Reproducing,
        }
    }

    /// Take ownership of the offspring carried by a reproducing event.
    ///
    /// Returns `None` for dying events or if another listener already
    /// took the offspring.
    pub fn take_offspring(&mut self) -> Option<Critter> {
        match self {
            Self::Reproducing { offspring, .. } => offspring.take().map(|boxed| *boxed),
            Self::Dying { .. } => None,
        }
    }
}

struct Subscription {
    handle: ListenerHandle,
    filter: EventFilter,
    listener: Listener,
}

/// Ordered set of listeners for one critter.
#[derive(Default)]
pub struct EventBus {
    next_handle: u64,
    subscriptions: Vec<Subscription>,
}

impl EventBus {
    /// Create an empty bus.
    pub const fn new() -> Self {
        Self {
            next_handle: 0,
            subscriptions: Vec::new(),
        }
    }

    /// Register a listener. Listeners run in registration order.
    pub fn subscribe<F>(&mut self, filter: EventFilter, listener: F) -> ListenerHandle
    where
        F: FnMut(&Critter, &mut EventPayload) + 'static,
    {
        let handle = ListenerHandle(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        self.subscriptions.push(Subscription {
            handle,
            filter,
            listener: Box::new(listener),
        });
        handle
    }

    /// Remove a listener. Returns `true` if the handle was registered.
    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.handle != handle);
        self.subscriptions.len() != before
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Deliver an event to every matching listener, synchronously.
    pub fn dispatch(&mut self, source: &Critter, payload: &mut EventPayload) {
        let kind = payload.kind();
        for subscription in &mut self.subscriptions {
            if subscription.filter.matches(kind) {
                (subscription.listener)(source, &mut *payload);
            }
        }
    }
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.subscriptions.len())
            .finish()
    }
}
