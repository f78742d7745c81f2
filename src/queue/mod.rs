// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供单飞 FIFO 任务队列和任务间冷却
pub mod cooldown;
pub mod queue_manager;
