// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, RwLock};

use crate::events::ProcessorEvent;
use crate::traits::Observer;

/// Synchronous fan-out of events to every registered observer.
#[derive(Default)]
pub struct EventBus {
    observers: RwLock<Vec<Arc<dyn Observer>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&self, observer: Arc<dyn Observer>) {
        if let Ok(mut observers) = self.observers.write() {
            observers.push(observer);
        }
    }

    /// Removes a previously added observer (pointer identity).
    pub fn remove_observer(&self, observer: &Arc<dyn Observer>) -> bool {
        let Ok(mut observers) = self.observers.write() else {
            return false;
        };
        let before = observers.len();
        observers.retain(|o| !Arc::ptr_eq(o, observer));
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn notify(&self, event: &ProcessorEvent) {
        // Snapshot so an observer can register others without deadlocking.
        let observers: Vec<Arc<dyn Observer>> = match self.observers.read() {
            Ok(observers) => observers.clone(),
            Err(_) => return,
        };
        for observer in observers {
            observer.notify(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observer_count", &self.observer_count())
            .finish()
    }
}
