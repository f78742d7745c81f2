// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::message::InboundMessage;
use crate::domain::services::session_service::SessionBridge;
use crate::domain::services::status_indicator::StatusIndicator;
use crate::queue::queue_manager::QueueSnapshot;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;

/// HTTP 桥接层共享状态
///
/// 通过 `Extension` 注入到各处理器
#[derive(Clone)]
pub struct BridgeState {
    /// 投递到工作器的消息发送端
    pub inbound: mpsc::UnboundedSender<InboundMessage>,
    pub session: SessionBridge,
    pub indicator: Arc<dyn StatusIndicator>,
    /// 工作器维护的队列快照
    pub snapshot: Arc<RwLock<QueueSnapshot>>,
}
