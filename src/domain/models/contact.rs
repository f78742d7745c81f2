// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 内容脚本返回的原始联系人
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// 已持久化的联系人
///
/// 由结果上报器在抓取成功后创建，创建后不可修改
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contact {
    pub id: Uuid,
    /// 所属任务ID
    pub task_id: Uuid,
    /// 所属机会ID
    pub opportunity_id: Option<Uuid>,
    /// 所属用户ID
    pub user_id: Uuid,
    pub name: String,
    pub job_title: Option<String>,
    pub profile_url: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl Contact {
    /// 从原始联系人构造
    ///
    /// 空白字符串字段归一化为 `None`
    pub fn from_raw(
        raw: RawContact,
        task_id: Uuid,
        opportunity_id: Option<Uuid>,
        user_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            opportunity_id,
            user_id,
            name: raw.name.trim().to_string(),
            job_title: non_blank(raw.title),
            profile_url: non_blank(raw.profile_url),
            email: non_blank(raw.email),
            created_at: Utc::now().into(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
