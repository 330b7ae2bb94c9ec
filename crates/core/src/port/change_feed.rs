// Change Feed Port
// Row-change notifications for page_maintenance, used as refresh hints

use crate::domain::{ChangeEvent, PageKey};
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Buffer size for a single subscription
pub const SUBSCRIPTION_BUFFER: usize = 16;

/// Live subscription to change events for one page key.
///
/// Dropping it tears the subscription down: producers observe the closed
/// channel and stop forwarding.
#[derive(Debug)]
pub struct ChangeSubscription {
    key: PageKey,
    events: mpsc::Receiver<ChangeEvent>,
}

impl ChangeSubscription {
    pub fn new(key: PageKey, events: mpsc::Receiver<ChangeEvent>) -> Self {
        Self { key, events }
    }

    /// Create a subscription together with the sender that feeds it
    pub fn channel(key: PageKey) -> (mpsc::Sender<ChangeEvent>, Self) {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        (tx, Self::new(key, rx))
    }

    pub fn key(&self) -> &PageKey {
        &self.key
    }

    /// Next event, or `None` once the producer has gone away
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }
}

/// Publish/subscribe channel on maintenance row changes
///
/// Implementations:
/// - BroadcastChangeFeed (cgsg-infra-sqlite): in-process broadcast
/// - SseChangeFeed (cgsg-sdk): Server-Sent Events over HTTP
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Subscribe to insert/update/delete events for `key`
    async fn subscribe(&self, key: &PageKey) -> Result<ChangeSubscription>;
}

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory feed: tests push events with `emit`
    #[derive(Clone, Default)]
    pub struct MockChangeFeed {
        subscribers: Arc<Mutex<Vec<(PageKey, mpsc::Sender<ChangeEvent>)>>>,
        fail_subscribe: Arc<AtomicBool>,
        subscribe_calls: Arc<AtomicUsize>,
    }

    impl MockChangeFeed {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make subsequent `subscribe` calls fail
        pub fn set_unavailable(&self, unavailable: bool) {
            self.fail_subscribe.store(unavailable, Ordering::SeqCst);
        }

        /// Deliver an event to live subscribers of its key.
        /// Returns how many subscribers received it.
        pub fn emit(&self, event: ChangeEvent) -> usize {
            let subscribers = self.subscribers.lock().unwrap();
            subscribers
                .iter()
                .filter(|(key, tx)| key == &event.page_path && !tx.is_closed())
                .filter(|(_, tx)| tx.try_send(event.clone()).is_ok())
                .count()
        }

        /// Drop every sender, ending all subscriptions from the producer side
        pub fn disconnect_all(&self) {
            self.subscribers.lock().unwrap().clear();
        }

        /// Subscriptions whose receiver is still alive
        pub fn active_subscriptions(&self) -> Vec<PageKey> {
            self.subscribers
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, tx)| !tx.is_closed())
                .map(|(key, _)| key.clone())
                .collect()
        }

        /// Total subscribe calls that succeeded
        pub fn subscribe_count(&self) -> usize {
            self.subscribe_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChangeFeed for MockChangeFeed {
        async fn subscribe(&self, key: &PageKey) -> Result<ChangeSubscription> {
            if self.fail_subscribe.load(Ordering::SeqCst) {
                return Err(AppError::Internal("change feed unavailable".to_string()));
            }
            let (tx, subscription) = ChangeSubscription::channel(key.clone());
            self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
            self.subscribers.lock().unwrap().push((key.clone(), tx));
            Ok(subscription)
        }
    }
}
