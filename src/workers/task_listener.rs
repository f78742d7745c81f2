// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::realtime::RealtimeEvent;
use crate::domain::models::task::QueueEntry;
use crate::domain::services::session_service::SessionBridge;
use crate::utils::errors::WorkerError;
use crate::utils::retry_policy::{Backoff, RetryPolicy};
use crate::workers::enrichment_worker::WorkerEvent;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// 订阅错误类型
#[derive(Error, Debug)]
pub enum ListenerError {
    /// 连接失败或中断
    #[error("Connection error: {0}")]
    Connection(String),

    /// 事件负载无法解析
    #[error("Decode error: {0}")]
    Decode(String),

    /// 变更流已结束
    #[error("Change feed closed")]
    Closed,
}

/// 行变更流
#[async_trait]
pub trait ChangeFeed: Send {
    /// 等待下一条变更事件
    async fn next_event(&mut self) -> Result<RealtimeEvent, ListenerError>;
}

/// 变更流连接器，断线后用于重新建立订阅
#[async_trait]
pub trait ChangeFeedConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn ChangeFeed>, ListenerError>;
}

/// 实时任务监听器
///
/// 订阅补全任务表的插入事件，把属于当前会话用户的 `pending` 任务转发给工作器。
/// 不修改任何任务状态，也不做背压控制。
pub struct TaskListener {
    connector: Arc<dyn ChangeFeedConnector>,
    session: SessionBridge,
    events: mpsc::UnboundedSender<WorkerEvent>,
    retry: RetryPolicy,
}

impl TaskListener {
    pub fn new(
        connector: Arc<dyn ChangeFeedConnector>,
        session: SessionBridge,
        events: mpsc::UnboundedSender<WorkerEvent>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            connector,
            session,
            events,
            retry,
        }
    }

    /// 处理单条事件
    ///
    /// # 返回值
    ///
    /// 事件是否被转发
    pub fn handle_event(&self, event: &RealtimeEvent) -> Result<bool, WorkerError> {
        let Some(user_id) = self.session.current_user() else {
            debug!("No session, dropping change event");
            return Ok(false);
        };

        let Some(task) = event.qualifying_task(user_id) else {
            return Ok(false);
        };

        debug!(task_id = %task.id, company = %task.company_name, "Pending task inserted");
        self.events
            .send(WorkerEvent::TaskInserted(QueueEntry::from(task)))
            .map_err(|_| WorkerError::ChannelClosed("worker event channel".to_string()))?;
        Ok(true)
    }

    async fn consume(&self, feed: &mut dyn ChangeFeed, backoff: &mut Backoff) -> Result<(), WorkerError> {
        loop {
            match feed.next_event().await {
                Ok(event) => {
                    backoff.reset();
                    self.handle_event(&event)?;
                }
                Err(ListenerError::Decode(e)) => {
                    warn!(error = %e, "Skipping undecodable change event");
                }
                Err(e) => return Err(WorkerError::ListenerError(e.to_string())),
            }
        }
    }
}

#[async_trait]
impl Worker for TaskListener {
    /// 运行监听循环
    ///
    /// 订阅中断后按退避策略无限重连；工作器通道关闭时退出
    async fn run(&self) -> Result<(), WorkerError> {
        info!("Task listener started");
        let mut backoff = Backoff::new(self.retry.clone());

        loop {
            match self.connector.connect().await {
                Ok(mut feed) => {
                    info!("Subscribed to task changes");
                    match self.consume(feed.as_mut(), &mut backoff).await {
                        Err(WorkerError::ChannelClosed(e)) => {
                            info!("Task listener stopping: {} closed", e);
                            return Ok(());
                        }
                        Err(e) => error!(error = %e, "Change feed interrupted"),
                        Ok(()) => {}
                    }
                }
                Err(e) => error!(error = %e, "Failed to subscribe to task changes"),
            }

            let delay = backoff.next_delay();
            warn!(
                attempt = backoff.attempt(),
                delay_ms = delay.as_millis() as u64,
                "Re-subscribing to task changes"
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn name(&self) -> &str {
        "task_listener"
    }
}

#[cfg(test)]
#[path = "task_listener_test.rs"]
mod tests;
