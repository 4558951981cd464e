//! In-process publish/subscribe channel for [`BookingEvent`]s.

use std::sync::{
    mpsc::{self, Receiver, Sender},
    Arc, Mutex, PoisonError,
};

use tracing::debug;
use tripflow_domain::BookingEvent;

/// Cloneable handle; every clone publishes to the same subscriber set.
///
/// Each subscriber owns a channel receiver and sees events in publish order.
/// Subscribers whose receiver was dropped are pruned on the next publish.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Sender<BookingEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<BookingEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Delivers `event` to every live subscriber and returns how many received it.
    pub fn publish(&self, event: BookingEvent) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        debug!(?event, delivered = subscribers.len(), "booking event published");
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripflow_domain::BookingId;

    #[test]
    fn subscribers_receive_events_in_order() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let booking_id = BookingId::from("b-1");

        bus.publish(BookingEvent::ProgressCleared {
            booking_id: booking_id.clone(),
        });
        bus.publish(BookingEvent::SessionExpired);

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            received,
            vec![
                BookingEvent::ProgressCleared { booking_id },
                BookingEvent::SessionExpired
            ]
        );
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = EventBus::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.publish(BookingEvent::SessionExpired), 1);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.try_recv().ok(), Some(BookingEvent::SessionExpired));
    }
}
