// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::presentation::state::BridgeState;
use crate::queue::queue_manager::QueuePhase;
use axum::{extract::Extension, Json};
use serde::Serialize;
use uuid::Uuid;

/// 状态响应
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// 徽标文本：空、`RUN` 或 `ERR`
    pub badge: &'static str,
    pub phase: QueuePhase,
    pub active_task: Option<Uuid>,
    /// 排队中的任务，按先进先出顺序
    pub backlog: Vec<Uuid>,
    /// 当前会话用户
    pub user_id: Option<Uuid>,
}

/// 查询徽标、队列和会话状态
pub async fn get_status(Extension(state): Extension<BridgeState>) -> Json<StatusResponse> {
    let snapshot = state.snapshot.read().clone();
    Json(StatusResponse {
        badge: state.indicator.current().text(),
        phase: snapshot.phase,
        active_task: snapshot.active_task,
        backlog: snapshot.backlog,
        user_id: state.session.current_user(),
    })
}
