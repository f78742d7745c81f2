// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{EnrichmentTask, TaskStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 任务表名，监听器只关注该表的插入
pub const TASK_TABLE: &str = "enrichment_tasks";

/// 行变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// 实时行变更事件
///
/// 对应数据库触发器通过 `pg_notify` 发布的负载：
/// `{"type": "INSERT", "table": "enrichment_tasks", "new": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeEvent {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub table: String,
    /// 变更后的行，DELETE 事件没有该字段
    #[serde(default)]
    pub new: Option<EnrichmentTask>,
}

impl RealtimeEvent {
    /// 判断事件是否应进入队列
    ///
    /// 只接受任务表中属于当前会话用户的 `pending` 任务插入事件
    pub fn qualifying_task(&self, current_user: Uuid) -> Option<&EnrichmentTask> {
        if self.kind != ChangeKind::Insert || self.table != TASK_TABLE {
            return None;
        }
        self.new
            .as_ref()
            .filter(|task| task.status == TaskStatus::Pending && task.user_id == current_user)
    }
}
