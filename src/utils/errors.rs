// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("仓库错误: {0}")]
    RepositoryError(String),

    #[error("浏览器错误: {0}")]
    EngineError(String),

    #[error("订阅错误: {0}")]
    ListenerError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error("通道已关闭: {0}")]
    ChannelClosed(String),
}
