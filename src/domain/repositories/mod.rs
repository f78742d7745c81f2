// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 任务仓库（task_repository）：补全任务的读取和状态更新
/// - 联系人仓库（contact_repository）：抓取结果的批量写入
/// - 错误日志仓库（error_log_repository）：结构化失败记录
/// - 机会仓库（opportunity_repository）：公司主页数据的读写
pub mod contact_repository;
pub mod error_log_repository;
pub mod opportunity_repository;
pub mod task_repository;
