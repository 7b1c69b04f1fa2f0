//! Mailbox-based event delivery for external observers.
//!
//! Each subscriber owns an inbox the kernel publishes into; subscribers
//! drain on their own schedule. Delivery runs no subscriber code, so one
//! observer can never prevent another from seeing an event. Internal
//! sinks (tracker, zones) are dispatched directly by the kernel.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use contracts::{Event, EventType};

/// Handle for one subscription. Passing it back to [`EventBus::unsubscribe`]
/// consumes the handle and drops the mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subscription(u64);

impl Subscription {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Mailbox {
    filter: Option<BTreeSet<EventType>>,
    inbox: VecDeque<Event>,
}

impl Mailbox {
    fn accepts(&self, event_type: EventType) -> bool {
        match &self.filter {
            Some(types) => types.contains(&event_type),
            None => true,
        }
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    mailboxes: BTreeMap<u64, Mailbox>,
    next_subscriber_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every event type.
    pub fn subscribe(&mut self) -> Subscription {
        self.insert_mailbox(None)
    }

    /// Subscribe to a fixed set of event types.
    pub fn subscribe_filtered(
        &mut self,
        types: impl IntoIterator<Item = EventType>,
    ) -> Subscription {
        self.insert_mailbox(Some(types.into_iter().collect()))
    }

    fn insert_mailbox(&mut self, filter: Option<BTreeSet<EventType>>) -> Subscription {
        self.next_subscriber_id += 1;
        let id = self.next_subscriber_id;
        self.mailboxes.insert(
            id,
            Mailbox {
                filter,
                inbox: VecDeque::new(),
            },
        );
        Subscription(id)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.mailboxes.remove(&subscription.0).is_some()
    }

    /// Clones the event into every matching inbox, in subscription order.
    pub fn publish(&mut self, event: &Event) {
        for mailbox in self.mailboxes.values_mut() {
            if mailbox.accepts(event.kind.event_type()) {
                mailbox.inbox.push_back(event.clone());
            }
        }
    }

    pub fn drain(&mut self, subscription: &Subscription) -> Vec<Event> {
        match self.mailboxes.get_mut(&subscription.0) {
            Some(mailbox) => mailbox.inbox.drain(..).collect(),
            None => Vec::new(),
        }
    }

    pub fn pending_count(&self, subscription: &Subscription) -> usize {
        self.mailboxes
            .get(&subscription.0)
            .map(|mailbox| mailbox.inbox.len())
            .unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.mailboxes.len()
    }
}
