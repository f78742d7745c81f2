// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::QueueEntry;
use serde::Serialize;
use std::collections::VecDeque;
use thiserror::Error;
use uuid::Uuid;

/// 队列错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueueError {
    /// 任务已在队列中或正在处理
    #[error("Task {0} is already queued or active")]
    Duplicate(Uuid),
}

/// 队列阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueuePhase {
    /// 空闲，可以立即派发
    Idle,
    /// 有任务正在处理
    Dispatching,
    /// 冷却中
    CoolingDown,
}

/// 队列快照
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueSnapshot {
    pub phase: QueuePhase,
    pub active_task: Option<Uuid>,
    pub backlog: Vec<Uuid>,
}

/// 单飞 FIFO 任务队列
///
/// 同一时间至多一个任务处于活动状态；冷却期间不出队。
/// 只由工作器事件循环持有，状态变更全部同步完成。
#[derive(Debug, Default)]
pub struct QueueManager {
    backlog: VecDeque<QueueEntry>,
    active_task: Option<Uuid>,
    cooldown_active: bool,
}

impl QueueManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加到队尾
    ///
    /// 不触发派发，调用方随后调用 `process_next`
    ///
    /// # 参数
    ///
    /// * `entry` - 新任务
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 已排队
    /// * `Err(QueueError::Duplicate)` - 任务已在队列中或正在处理
    pub fn enqueue(&mut self, entry: QueueEntry) -> Result<(), QueueError> {
        if self.contains(entry.task_id) {
            return Err(QueueError::Duplicate(entry.task_id));
        }
        self.backlog.push_back(entry);
        Ok(())
    }

    /// 取出下一个任务
    ///
    /// 仅当没有活动任务、不在冷却且队列非空时出队队首，并标记为活动任务。
    /// 活动任务存在时重复调用不产生效果。
    pub fn process_next(&mut self) -> Option<QueueEntry> {
        if self.active_task.is_some() || self.cooldown_active {
            return None;
        }
        let entry = self.backlog.pop_front()?;
        self.active_task = Some(entry.task_id);
        Some(entry)
    }

    /// 结束活动任务
    ///
    /// 只有与活动任务ID匹配时才清除，返回是否清除
    pub fn finish_active(&mut self, task_id: Uuid) -> bool {
        if self.active_task == Some(task_id) {
            self.active_task = None;
            true
        } else {
            false
        }
    }

    /// 丢弃不属于 `user_id` 的排队任务，返回丢弃数量
    ///
    /// 活动任务不受影响
    pub fn retain_user(&mut self, user_id: Uuid) -> usize {
        let before = self.backlog.len();
        self.backlog.retain(|e| e.user_id == user_id);
        before - self.backlog.len()
    }

    /// 进入冷却
    pub fn begin_cooldown(&mut self) {
        self.cooldown_active = true;
    }

    /// 冷却结束
    pub fn cooldown_elapsed(&mut self) {
        self.cooldown_active = false;
    }

    pub fn contains(&self, task_id: Uuid) -> bool {
        self.active_task == Some(task_id) || self.backlog.iter().any(|e| e.task_id == task_id)
    }

    pub fn active_task(&self) -> Option<Uuid> {
        self.active_task
    }

    pub fn is_cooling_down(&self) -> bool {
        self.cooldown_active
    }

    pub fn len(&self) -> usize {
        self.backlog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backlog.is_empty()
    }

    pub fn phase(&self) -> QueuePhase {
        if self.active_task.is_some() {
            QueuePhase::Dispatching
        } else if self.cooldown_active {
            QueuePhase::CoolingDown
        } else {
            QueuePhase::Idle
        }
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            phase: self.phase(),
            active_task: self.active_task,
            backlog: self.backlog.iter().map(|e| e.task_id).collect(),
        }
    }
}
