//! Host lifecycle transitions.
//!
//! Hosts report screen transitions through a [`LifecycleNotifier`]. The
//! logger only cares about two consequences: paused, stopped and destroyed
//! screens ask for a flush, and every transition can be logged.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// A discrete state change of a host-managed screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Created,
    Started,
    Resumed,
    Paused,
    Stopped,
    Destroyed,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 6] = [
        LifecycleEvent::Created,
        LifecycleEvent::Started,
        LifecycleEvent::Resumed,
        LifecycleEvent::Paused,
        LifecycleEvent::Stopped,
        LifecycleEvent::Destroyed,
    ];

    /// Whether this transition should push buffered log bytes to storage.
    pub fn triggers_flush(&self) -> bool {
        matches!(
            self,
            LifecycleEvent::Paused | LifecycleEvent::Stopped | LifecycleEvent::Destroyed
        )
    }

    /// Callback-style name used in lifecycle log lines, e.g. `onPaused`.
    pub fn callback_name(&self) -> &'static str {
        match self {
            LifecycleEvent::Created => "onCreated",
            LifecycleEvent::Started => "onStarted",
            LifecycleEvent::Resumed => "onResumed",
            LifecycleEvent::Paused => "onPaused",
            LifecycleEvent::Stopped => "onStopped",
            LifecycleEvent::Destroyed => "onDestroyed",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.callback_name())
    }
}

/// Receives transitions for any tracked screen.
pub trait LifecycleObserver: Send + Sync + 'static {
    fn on_transition(&self, screen: &str, event: LifecycleEvent);
}

/// Source of lifecycle transitions provided by the host.
pub trait LifecycleNotifier {
    fn subscribe(&self, observer: Arc<dyn LifecycleObserver>);
}

/// Fan-out notifier for hosts without their own lifecycle plumbing.
#[derive(Clone, Default)]
pub struct LifecycleHub {
    observers: Arc<RwLock<Vec<Arc<dyn LifecycleObserver>>>>,
}

impl LifecycleHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` for `screen` to every subscriber, in subscription
    /// order.
    pub fn publish(&self, screen: &str, event: LifecycleEvent) {
        // Snapshot so observers may subscribe from inside a callback
        let observers = self.observers.read().clone();
        for observer in observers {
            observer.on_transition(screen, event);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }
}

impl LifecycleNotifier for LifecycleHub {
    fn subscribe(&self, observer: Arc<dyn LifecycleObserver>) {
        self.observers.write().push(observer);
    }
}
