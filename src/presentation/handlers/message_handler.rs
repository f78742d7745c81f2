// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::message::{HostMessage, InboundMessage};
use crate::presentation::errors::{AppError, BridgeError};
use crate::presentation::state::BridgeState;
use axum::{extract::Extension, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// 接收宿主应用或内容脚本的消息
///
/// `SET_TOKEN` 在这里先行校验，被拒绝的令牌直接返回 401；其余消息原样投递给工作器
///
/// # 参数
///
/// * `state` - 桥接层共享状态
/// * `message` - 消息体
///
/// # 返回值
///
/// * `Ok((202, Json))` - 消息已投递
/// * `Err(AppError)` - 令牌被拒绝或工作器已停止
#[instrument(skip_all)]
pub async fn post_message(
    Extension(state): Extension<BridgeState>,
    Json(message): Json<InboundMessage>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if let InboundMessage::Host(HostMessage::SetToken { token, user_id }) = &message {
        state.session.set_token(token.clone(), *user_id)?;
    }

    debug!(message = ?message, "Forwarding message to worker");
    state
        .inbound
        .send(message)
        .map_err(|_| BridgeError::WorkerUnavailable)?;

    Ok((StatusCode::ACCEPTED, Json(json!({ "accepted": true }))))
}
