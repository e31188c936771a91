// Typed event bus for dashboard state changes
// Author: Gabriel Demetrios Lafis

use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use log::error;
use serde::{Deserialize, Serialize};

use crate::processing::{ChartKind, FilterState};
use super::DashboardState;

/// Category of a state change, used to filter subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Dataset,
    Filters,
    Charts,
    Ui,
    Connectivity,
    Reset,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            EventKind::Dataset => "dataset",
            EventKind::Filters => "filters",
            EventKind::Charts => "charts",
            EventKind::Ui => "ui",
            EventKind::Connectivity => "connectivity",
            EventKind::Reset => "reset",
        };
        write!(f, "{}", name)
    }
}

/// A state change delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    DatasetLoaded {
        total_rows: usize,
    },
    FiltersChanged {
        filters: FilterState,
        filtered_rows: usize,
    },
    ChartsUpdated {
        prepared: Vec<ChartKind>,
        failed: Vec<ChartKind>,
    },
    UiChanged,
    ConnectivityChanged {
        online: bool,
    },
    Reset,
}

impl StateEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            StateEvent::DatasetLoaded { .. } => EventKind::Dataset,
            StateEvent::FiltersChanged { .. } => EventKind::Filters,
            StateEvent::ChartsUpdated { .. } => EventKind::Charts,
            StateEvent::UiChanged => EventKind::Ui,
            StateEvent::ConnectivityChanged { .. } => EventKind::Connectivity,
            StateEvent::Reset => EventKind::Reset,
        }
    }
}

/// Failure reported by a subscriber
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverError {
    message: String,
}

impl ObserverError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        ObserverError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Observer error: {}", self.message)
    }
}

impl Error for ObserverError {}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Subscriber callback
pub type Observer = Box<dyn FnMut(&StateEvent, &DashboardState) -> Result<(), ObserverError>>;

struct Subscription {
    id: SubscriptionId,
    filter: Option<EventKind>,
    observer: Observer,
}

/// Synchronous publish/subscribe hub.
///
/// Events are delivered in subscription order. A subscriber that fails or
/// panics is logged and skipped; delivery continues with the next one.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus {
            next_id: 0,
            subscriptions: Vec::new(),
        }
    }

    /// Register an observer, optionally only for one kind of event
    pub fn subscribe(&mut self, filter: Option<EventKind>, observer: Observer) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription { id, filter, observer });
        id
    }

    /// Remove an observer; false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Deliver an event; returns how many observers handled it successfully
    pub fn publish(&mut self, event: &StateEvent, state: &DashboardState) -> usize {
        let kind = event.kind();
        let mut delivered = 0;

        for subscription in self.subscriptions.iter_mut() {
            if subscription.filter.map_or(false, |filter| filter != kind) {
                continue;
            }

            let observer = &mut subscription.observer;
            match panic::catch_unwind(AssertUnwindSafe(|| observer(event, state))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(err)) => {
                    error!("Observer {:?} failed on '{}' event: {}", subscription.id, kind, err);
                },
                Err(_) => {
                    error!("Observer {:?} panicked on '{}' event", subscription.id, kind);
                },
            }
        }

        delivered
    }
}
