// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP请求处理器模块
///
/// 宿主应用和内容脚本通过这些端点与工作器通信
pub mod message_handler;
pub mod status_handler;
