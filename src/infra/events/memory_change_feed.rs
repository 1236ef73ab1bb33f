//! Change feed backed by one tokio broadcast channel per watched table.
//!
//! Events only reach subscribers in the same process.

use std::collections::HashMap;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::domain::models::change::{ChangeEvent, WATCHED_TABLES};
use crate::domain::ports::{ChangeFeed, ChangeStream};
use crate::error::AppError;

const CHANNEL_CAPACITY: usize = 100;

pub struct MemoryChangeFeed {
    channels: HashMap<&'static str, broadcast::Sender<ChangeEvent>>,
}

impl MemoryChangeFeed {
    pub fn new() -> Self {
        let channels = WATCHED_TABLES
            .iter()
            .map(|table| (*table, broadcast::channel(CHANNEL_CAPACITY).0))
            .collect();
        Self { channels }
    }

    fn channel(&self, table: &str) -> Result<&broadcast::Sender<ChangeEvent>, AppError> {
        self.channels
            .get(table)
            .ok_or_else(|| AppError::Validation(format!("Unknown table '{}'", table)))
    }
}

impl Default for MemoryChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChangeFeed for MemoryChangeFeed {
    async fn publish(&self, event: ChangeEvent) -> Result<(), AppError> {
        let tx = self.channel(&event.table)?;
        // No subscribers is fine.
        let _ = tx.send(event);
        Ok(())
    }

    async fn subscribe(&self, table: &str) -> Result<ChangeStream, AppError> {
        let rx = self.channel(table)?.subscribe();
        // Lagged receivers skip ahead; the dashboard reloads on its own.
        let stream = BroadcastStream::new(rx).filter_map(|result| result.ok());
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::change::{ChangeKind, TABLE_GROUP_LOCKS, TABLE_RSVPS};
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn subscribers_only_see_their_table() {
        let feed = MemoryChangeFeed::new();
        let mut rsvps = feed.subscribe(TABLE_RSVPS).await.unwrap();

        feed.publish(ChangeEvent::new(TABLE_GROUP_LOCKS, ChangeKind::Insert, &json!({"group_id": "g7"}))).await.unwrap();
        feed.publish(ChangeEvent::new(TABLE_RSVPS, ChangeKind::Update, &json!({"id": "r1"}))).await.unwrap();

        let received = tokio::time::timeout(Duration::from_millis(100), rsvps.next())
            .await
            .expect("timeout")
            .expect("stream ended");

        assert_eq!(received.table, TABLE_RSVPS);
        assert_eq!(received.kind, ChangeKind::Update);
        assert_eq!(received.row["id"], "r1");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_fine() {
        let feed = MemoryChangeFeed::default();
        assert!(feed.publish(ChangeEvent::new(TABLE_RSVPS, ChangeKind::Delete, &json!({}))).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_table_is_rejected() {
        let feed = MemoryChangeFeed::new();
        assert!(matches!(feed.subscribe("admins").await, Err(AppError::Validation(_))));
    }
}
