// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use uuid::Uuid;

/// 招聘机会
///
/// 本系统只在公司主页补全流程中读取并回写公司信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    /// 已知的公司标识
    pub linkedin_url_slug: Option<String>,
    /// 公司主页抓取结果
    pub company_data: Option<serde_json::Value>,
    pub company_enriched_at: Option<DateTime<FixedOffset>>,
}
