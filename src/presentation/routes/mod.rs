// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::presentation::handlers::{message_handler, status_handler};
use crate::presentation::state::BridgeState;
use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// # 参数
///
/// * `state` - 桥接层共享状态
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(state: BridgeState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let bridge_routes = Router::new()
        .route("/v1/messages", post(message_handler::post_message))
        .route("/v1/status", get(status_handler::get_status))
        .layer(Extension(state));

    Router::new()
        .merge(public_routes)
        .merge(bridge_routes)
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
