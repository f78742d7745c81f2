// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含补全任务、联系人等实体，仓库接口以及派发、上报、公司主页补全等服务
pub mod domain;

/// 引擎模块
///
/// 驱动浏览器标签页并注入内容脚本
pub mod engines;

/// 基础设施模块
///
/// 提供数据库、实时变更流、徽标存储和监控指标等外部集成
pub mod infrastructure;

/// 表示层模块
///
/// 宿主应用和内容脚本使用的 HTTP 桥接端点
pub mod presentation;

/// 队列模块
///
/// 单飞 FIFO 队列与冷却控制
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实时监听器、补全工作器及其管理
pub mod workers;
