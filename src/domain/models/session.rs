// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// 浏览器标签页句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// 抓取会话
///
/// 一次任务的标签页执行过程，是唯一持有系统资源（标签页）的实体，任何退出路径都必须关闭标签页
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeSession {
    /// 会话ID，用于关联超时事件
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub opportunity_id: Option<Uuid>,
    pub tab: TabId,
    pub target_url: String,
    /// 注入的脚本标识
    pub script_id: &'static str,
    pub started_at: DateTime<Utc>,
}

/// 已认证的用户会话
#[derive(Clone, PartialEq)]
pub struct UserSession {
    pub user_id: Uuid,
    pub token: String,
    /// 令牌过期时间（仅在校验 JWT 时可知）
    pub expires_at: Option<DateTime<Utc>>,
}

impl UserSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

// Keep bearer tokens out of logs.
impl fmt::Debug for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSession")
            .field("user_id", &self.user_id)
            .field("token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
