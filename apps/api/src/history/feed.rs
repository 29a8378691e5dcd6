//! Per-user change notifications for history records and profiles.
//!
//! Two implementations share the `ChangeFeed` trait: Redis pub/sub for multi-instance
//! deployments, and an in-process broadcast channel when no Redis is configured.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::history::HistoryRecord;
use crate::models::user::UserProfile;

const LOCAL_FEED_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("could not encode change event: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChangeEvent {
    Snapshot { records: Vec<HistoryRecord> },
    RecordAdded { record: HistoryRecord },
    RecordRemoved { id: Uuid },
    ProfileUpdated { profile: UserProfile },
}

impl ChangeEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            ChangeEvent::Snapshot { .. } => "snapshot",
            ChangeEvent::RecordAdded { .. } => "recordAdded",
            ChangeEvent::RecordRemoved { .. } => "recordRemoved",
            ChangeEvent::ProfileUpdated { .. } => "profileUpdated",
        }
    }
}

pub type ChangeStream = BoxStream<'static, ChangeEvent>;

#[async_trait]
pub trait ChangeFeed: Send + Sync {
    async fn publish(&self, user_id: Uuid, event: &ChangeEvent) -> Result<(), FeedError>;

    /// Events for one user, from the moment of subscription on. The stream ends when
    /// the feed closes or the subscriber falls behind.
    async fn subscribe(&self, user_id: Uuid) -> Result<ChangeStream, FeedError>;
}

pub fn channel_name(user_id: Uuid) -> String {
    format!("history:{user_id}")
}

pub struct LocalChangeFeed {
    sender: broadcast::Sender<(Uuid, ChangeEvent)>,
}

impl LocalChangeFeed {
    pub fn new() -> Self {
        let (sender, _rx) = broadcast::channel(LOCAL_FEED_CAPACITY);
        Self { sender }
    }
}

impl Default for LocalChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChangeFeed for LocalChangeFeed {
    async fn publish(&self, user_id: Uuid, event: &ChangeEvent) -> Result<(), FeedError> {
        // No subscribers is not an error.
        let _ = self.sender.send((user_id, event.clone()));
        Ok(())
    }

    async fn subscribe(&self, user_id: Uuid) -> Result<ChangeStream, FeedError> {
        let mut receiver = self.sender.subscribe();
        let stream = async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok((owner, event)) if owner == user_id => yield event,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Change feed for user {user_id} lagged by {skipped} events; closing stream");
                        break;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        };
        Ok(stream.boxed())
    }
}

pub struct RedisChangeFeed {
    client: redis::Client,
    publisher: MultiplexedConnection,
}

impl RedisChangeFeed {
    pub async fn connect(redis_url: &str) -> Result<Self, FeedError> {
        let client = redis::Client::open(redis_url)?;
        let publisher = client.get_multiplexed_tokio_connection().await?;
        info!("Redis change feed connected");
        Ok(Self { client, publisher })
    }
}

#[async_trait]
impl ChangeFeed for RedisChangeFeed {
    async fn publish(&self, user_id: Uuid, event: &ChangeEvent) -> Result<(), FeedError> {
        let payload = serde_json::to_string(event)?;
        let mut conn = self.publisher.clone();
        conn.publish::<_, _, ()>(channel_name(user_id), payload).await?;
        Ok(())
    }

    async fn subscribe(&self, user_id: Uuid) -> Result<ChangeStream, FeedError> {
        let channel = channel_name(user_id);
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&channel).await?;

        let stream = pubsub.into_on_message().filter_map(move |msg| {
            let channel = channel.clone();
            async move {
                let payload: String = match msg.get_payload() {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!("Unreadable message on {channel}: {e}");
                        return None;
                    }
                };
                match serde_json::from_str::<ChangeEvent>(&payload) {
                    Ok(event) => Some(event),
                    Err(e) => {
                        warn!("Dropping undecodable change event on {channel}: {e}");
                        None
                    }
                }
            }
        });
        Ok(stream.boxed())
    }
}
