//! Ambient light/dark flag with scoped observers.
//!
//! Observers are held until their `Subscription` is dropped, so a mounted pad
//! re-evaluates its pen colour on every toggle and stops listening the moment
//! it goes away.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

type Observer = Arc<dyn Fn(Theme) + Send + Sync>;

struct SignalState {
    current: Theme,
    next_id: u64,
    observers: BTreeMap<u64, Observer>,
}

/// Cloneable handle to one shared theme flag.
#[derive(Clone)]
pub struct ThemeSignal {
    state: Arc<Mutex<SignalState>>,
}

impl ThemeSignal {
    pub fn new(initial: Theme) -> Self {
        Self {
            state: Arc::new(Mutex::new(SignalState {
                current: initial,
                next_id: 0,
                observers: BTreeMap::new(),
            })),
        }
    }

    pub fn current(&self) -> Theme {
        match self.state.lock() {
            Ok(state) => state.current,
            Err(poisoned) => poisoned.into_inner().current,
        }
    }

    /// Updates the flag and notifies observers if it actually changed.
    /// Observers run after the lock is released.
    pub fn set(&self, theme: Theme) {
        let observers: Vec<Observer> = {
            let mut state = match self.state.lock() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            if state.current == theme {
                return;
            }
            state.current = theme;
            state.observers.values().cloned().collect()
        };
        for observer in observers {
            observer(theme);
        }
    }

    pub fn toggle(&self) {
        let next = if self.current().is_dark() {
            Theme::Light
        } else {
            Theme::Dark
        };
        self.set(next);
    }

    /// Registers `observer`; it stays registered until the returned guard drops.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(Theme) + Send + Sync + 'static,
    {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = state.next_id;
        state.next_id += 1;
        state.observers.insert(id, Arc::new(observer));
        Subscription {
            state: Arc::downgrade(&self.state),
            id,
        }
    }

    pub fn observer_count(&self) -> usize {
        match self.state.lock() {
            Ok(state) => state.observers.len(),
            Err(poisoned) => poisoned.into_inner().observers.len(),
        }
    }
}

impl Default for ThemeSignal {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

/// Deregisters its observer on drop.
pub struct Subscription {
    state: Weak<Mutex<SignalState>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            let mut state = match state.lock() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            state.observers.remove(&self.id);
        }
    }
}
