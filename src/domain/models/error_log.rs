// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use uuid::Uuid;

/// 结构化错误日志条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorLogEntry {
    pub id: Uuid,
    /// 关联任务
    pub task_id: Option<Uuid>,
    /// 关联机会（公司主页流程）
    pub opportunity_id: Option<Uuid>,
    pub message: String,
    /// 出错时的结果页码
    pub page_number: Option<i32>,
    pub created_at: DateTime<FixedOffset>,
}

impl ErrorLogEntry {
    pub fn for_task(task_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id: Some(task_id),
            opportunity_id: None,
            message: message.into(),
            page_number: None,
            created_at: Utc::now().into(),
        }
    }

    pub fn for_opportunity(opportunity_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id: None,
            opportunity_id: Some(opportunity_id),
            message: message.into(),
            page_number: None,
            created_at: Utc::now().into(),
        }
    }

    pub fn with_page(mut self, page_number: Option<i32>) -> Self {
        self.page_number = page_number;
        self
    }
}
