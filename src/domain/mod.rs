// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：补全任务、联系人、会话和消息
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 服务（services）：抓取编排、结果上报和公司主页补全
///
/// 领域层不依赖于任何具体的数据库或浏览器实现。
pub mod models;
pub mod repositories;
pub mod services;
