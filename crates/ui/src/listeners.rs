//! Scoped registration of document-wide listeners
//!
//! Registering a listener returns a guard; dropping the guard unregisters it.
//! Whoever holds the guard owns the listener's lifetime, so tearing down the
//! owner always removes exactly what it installed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Document-wide listeners the editing core installs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalListener {
    Click,
    KeyUp,
    PointerDown,
    PointerMove,
    PointerUp,
}

/// Shared registry of active listeners
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    active: Rc<RefCell<HashMap<GlobalListener, usize>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a listener; it stays active until the guard is dropped
    #[must_use = "dropping the guard unregisters the listener immediately"]
    pub fn register(&self, kind: GlobalListener) -> ListenerGuard {
        *self.active.borrow_mut().entry(kind).or_insert(0) += 1;
        ListenerGuard { kind, active: Rc::clone(&self.active) }
    }

    pub fn is_active(&self, kind: GlobalListener) -> bool {
        self.active.borrow().get(&kind).is_some_and(|count| *count > 0)
    }

    /// Total number of live registrations
    pub fn active_count(&self) -> usize {
        self.active.borrow().values().sum()
    }
}

/// Disposer for one listener registration
#[derive(Debug)]
pub struct ListenerGuard {
    kind: GlobalListener,
    active: Rc<RefCell<HashMap<GlobalListener, usize>>>,
}

impl ListenerGuard {
    pub fn kind(&self) -> GlobalListener {
        self.kind
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let mut active = self.active.borrow_mut();
        if let Some(count) = active.get_mut(&self.kind) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                active.remove(&self.kind);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_drop_unregisters() {
        let registry = ListenerRegistry::new();
        let guard = registry.register(GlobalListener::Click);
        assert!(registry.is_active(GlobalListener::Click));
        assert_eq!(guard.kind(), GlobalListener::Click);

        drop(guard);
        assert!(!registry.is_active(GlobalListener::Click));
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_registrations_are_counted() {
        let registry = ListenerRegistry::new();
        let first = registry.register(GlobalListener::PointerMove);
        let second = registry.register(GlobalListener::PointerMove);
        assert_eq!(registry.active_count(), 2);

        drop(first);
        assert!(registry.is_active(GlobalListener::PointerMove));
        drop(second);
        assert!(!registry.is_active(GlobalListener::PointerMove));
    }
}
