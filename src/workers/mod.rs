// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供实时任务监听、单线程补全事件循环和工作器生命周期管理
pub mod enrichment_worker;
pub mod manager;
pub mod task_listener;
pub mod worker;

pub use worker::Worker;
