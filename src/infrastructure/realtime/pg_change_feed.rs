// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::realtime::RealtimeEvent;
use crate::workers::task_listener::{ChangeFeed, ChangeFeedConnector, ListenerError};
use async_trait::async_trait;
use sqlx::postgres::PgListener;
use tracing::debug;

/// 基于 Postgres LISTEN/NOTIFY 的行变更流
///
/// 负载由迁移安装的触发器以 JSON 形式发布
pub struct PgChangeFeed {
    listener: PgListener,
}

#[async_trait]
impl ChangeFeed for PgChangeFeed {
    async fn next_event(&mut self) -> Result<RealtimeEvent, ListenerError> {
        let notification = self
            .listener
            .recv()
            .await
            .map_err(|e| ListenerError::Connection(e.to_string()))?;

        debug!(channel = notification.channel(), "Change notification received");
        decode_payload(notification.payload())
    }
}

/// 解析通知负载
pub fn decode_payload(payload: &str) -> Result<RealtimeEvent, ListenerError> {
    serde_json::from_str(payload).map_err(|e| ListenerError::Decode(e.to_string()))
}

/// Postgres 变更流连接器
pub struct PgChangeFeedConnector {
    database_url: String,
    channel: String,
}

impl PgChangeFeedConnector {
    pub fn new(database_url: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl ChangeFeedConnector for PgChangeFeedConnector {
    async fn connect(&self) -> Result<Box<dyn ChangeFeed>, ListenerError> {
        let mut listener = PgListener::connect(&self.database_url)
            .await
            .map_err(|e| ListenerError::Connection(e.to_string()))?;
        listener
            .listen(&self.channel)
            .await
            .map_err(|e| ListenerError::Connection(e.to_string()))?;

        Ok(Box::new(PgChangeFeed { listener }))
    }
}
