//! Annotation signal bus
//!
//! A small topic-based pub/sub used to tell the editing core that an
//! annotation was activated, and to tell host code that one was moved.
//! Subscribers receive events through a channel they drain on their own turn.

use crate::annotation::{Annotation, AnnotationId};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Identifier of a rendered visual element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Event topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    AnnotationActivated,
    PositionUpdated,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::AnnotationActivated => "annotation:activated",
            Topic::PositionUpdated => "annotation:positionUpdated",
        }
    }
}

/// Events carried on the bus
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationEvent {
    /// A rendered annotation element was clicked
    Activated {
        annotation_id: AnnotationId,
        element: ElementId,
    },
    /// A drag finished and the annotation record was updated
    PositionUpdated { annotation: Annotation },
}

impl AnnotationEvent {
    pub fn topic(&self) -> Topic {
        match self {
            AnnotationEvent::Activated { .. } => Topic::AnnotationActivated,
            AnnotationEvent::PositionUpdated { .. } => Topic::PositionUpdated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receiving end of one subscription
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    receiver: Receiver<AnnotationEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Next pending event, if any
    pub fn try_next(&self) -> Option<AnnotationEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// All pending events
    pub fn drain(&self) -> Vec<AnnotationEvent> {
        self.receiver.try_iter().collect()
    }
}

#[derive(Debug, Default)]
struct BusInner {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Topic, Sender<AnnotationEvent>)>,
}

/// Shared, cloneable event bus
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BusInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self, topic: Topic) -> Subscription {
        let (sender, receiver) = unbounded();
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.subscribers.push((id, topic, sender));
        log::debug!("subscribed {:?} to {}", id, topic.as_str());
        Subscription { id, topic, receiver }
    }

    /// Remove a subscription; returns `false` if it was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sid, _, _)| *sid != id);
        inner.subscribers.len() != before
    }

    /// Deliver an event to every subscriber of its topic
    ///
    /// Subscribers whose receiving end was dropped are pruned.
    /// Returns the number of deliveries.
    pub fn emit(&self, event: AnnotationEvent) -> usize {
        let topic = event.topic();
        let mut inner = self.lock();
        let mut delivered = 0;
        inner.subscribers.retain(|(_, t, sender)| {
            if *t != topic {
                return true;
            }
            match sender.send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        delivered
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.lock()
            .subscribers
            .iter()
            .filter(|(_, t, _)| *t == topic)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activated(id: &str) -> AnnotationEvent {
        AnnotationEvent::Activated { annotation_id: AnnotationId::new(id), element: ElementId(7) }
    }

    #[test]
    fn test_emit_reaches_matching_topic_only() {
        let bus = EventBus::new();
        let activated_sub = bus.subscribe(Topic::AnnotationActivated);
        let moved_sub = bus.subscribe(Topic::PositionUpdated);

        assert_eq!(bus.emit(activated("a1")), 1);

        assert_eq!(activated_sub.drain(), vec![activated("a1")]);
        assert!(moved_sub.try_next().is_none());
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let sub = bus.subscribe(Topic::AnnotationActivated);

        assert!(bus.unsubscribe(sub.id()));
        assert!(!bus.unsubscribe(sub.id()));
        assert_eq!(bus.emit(activated("a1")), 0);
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let bus = EventBus::new();
        let sub = bus.subscribe(Topic::AnnotationActivated);
        drop(sub);

        assert_eq!(bus.emit(activated("a1")), 0);
        assert_eq!(bus.subscriber_count(Topic::AnnotationActivated), 0);
    }

    #[test]
    fn test_clones_share_subscribers() {
        let bus = EventBus::new();
        let sub = bus.subscribe(Topic::AnnotationActivated);
        let handle = bus.clone();

        handle.emit(activated("a2"));
        assert_eq!(sub.try_next(), Some(activated("a2")));
    }
}
