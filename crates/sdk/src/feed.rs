//! SSE Change Feed
//!
//! Subscribes to `GET /api/maintenance/events` and forwards each `change`
//! event into a `ChangeSubscription`.

use crate::client::normalize_base_url;
use crate::error::{Result, SdkError};
use async_trait::async_trait;
use cgsg_core::domain::{ChangeEvent, PageKey};
use cgsg_core::error::AppError;
use cgsg_core::port::{ChangeFeed, ChangeSubscription};
use eventsource_stream::{Event, Eventsource};
use futures::StreamExt;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const CHANGE_EVENT: &str = "change";
/// Event name given to frames without an `event:` line
const UNNAMED_EVENT: &str = "message";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// `ChangeFeed` backed by the server's SSE stream
#[derive(Clone)]
pub struct SseChangeFeed {
    http: reqwest::Client,
    base_url: String,
}

impl SseChangeFeed {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.as_ref())?;

        // No overall timeout: the stream stays open until dropped
        let http = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl ChangeFeed for SseChangeFeed {
    async fn subscribe(&self, key: &PageKey) -> cgsg_core::error::Result<ChangeSubscription> {
        let url = format!(
            "{}/api/maintenance/events?page_path={}",
            self.base_url,
            urlencoding::encode(key.as_str())
        );

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Change stream unavailable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "Change stream rejected with status {}",
                response.status()
            )));
        }

        let (tx, subscription) = ChangeSubscription::channel(key.clone());
        let key = key.clone();
        debug!(page_key = %key, "Change stream connected");

        tokio::spawn(async move {
            let events = response.bytes_stream().eventsource();
            tokio::pin!(events);

            loop {
                let next = tokio::select! {
                    _ = tx.closed() => break,
                    next = events.next() => next,
                };

                match next {
                    Some(Ok(event)) => {
                        if !forward(&tx, &key, event).await {
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(page_key = %key, error = %e, "Change stream failed");
                        break;
                    }
                    None => {
                        warn!(page_key = %key, "Change stream closed by server");
                        break;
                    }
                }
            }
        });

        Ok(subscription)
    }
}

/// Send one decoded event. Returns false once the subscriber is gone.
async fn forward(tx: &mpsc::Sender<ChangeEvent>, key: &PageKey, event: Event) -> bool {
    if event.event != CHANGE_EVENT && event.event != UNNAMED_EVENT {
        return true;
    }

    match serde_json::from_str::<ChangeEvent>(&event.data) {
        Ok(change) => tx.send(change).await.is_ok(),
        Err(e) => {
            warn!(page_key = %key, error = %e, "Ignoring malformed change event");
            true
        }
    }
}
