// In-process Change Feed
// Broadcasts page_maintenance row changes to per-key subscriptions

use async_trait::async_trait;
use cgsg_core::domain::{ChangeEvent, ChangeKind, PageKey};
use cgsg_core::error::Result;
use cgsg_core::port::{ChangeFeed, ChangeSubscription};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

/// Default broadcast capacity
pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// Fan-out of row changes. Cloning shares the channel.
#[derive(Clone)]
pub struct BroadcastChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Default for BroadcastChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl BroadcastChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a change. Having no subscribers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        let receivers = self.tx.send(event.clone()).unwrap_or(0);
        debug!(
            page_key = %event.page_path,
            kind = %event.kind,
            receivers,
            "Change event published"
        );
    }

    /// Number of live forwarding subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl ChangeFeed for BroadcastChangeFeed {
    async fn subscribe(&self, key: &PageKey) -> Result<ChangeSubscription> {
        let mut rx = self.tx.subscribe();
        let (tx, subscription) = ChangeSubscription::channel(key.clone());
        let key = key.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    received = rx.recv() => match received {
                        Ok(event) if event.page_path == key => {
                            if tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(missed)) => {
                            // Some events were lost; one of them may have been ours
                            warn!(page_key = %key, missed, "Change subscription lagged");
                            let hint = ChangeEvent::new(ChangeKind::Update, key.clone());
                            if tx.send(hint).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            debug!(page_key = %key, "Change subscription closed");
        });

        Ok(subscription)
    }
}
