// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含会话桥接、目标URL解析、抓取编排、结果上报、公司主页补全和状态指示
pub mod company_page_service;
pub mod result_reporter;
pub mod scrape_orchestrator;
pub mod session_service;
pub mod status_indicator;
pub mod target_resolver;
