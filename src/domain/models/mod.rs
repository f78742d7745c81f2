// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 补全任务（task）：任务实体、状态机和队列条目
/// - 联系人（contact）：抓取到的联系人
/// - 机会（opportunity）：公司主页补全的目标
/// - 错误日志（error_log）：结构化失败记录
/// - 会话（session）：用户会话和标签页抓取会话
/// - 消息（message）：跨上下文传递的消息联合类型
/// - 实时事件（realtime）：任务表的行变更事件
/// - 徽标（badge）：对外展示的运行状态
pub mod badge;
pub mod contact;
pub mod error_log;
pub mod message;
pub mod opportunity;
pub mod realtime;
pub mod session;
pub mod task;
