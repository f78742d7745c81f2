// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 联系人补全任务实体
///
/// 表示“为机会 Y 查找公司 X 的联系人”这一工作单元。任务由外部（界面或其他服务）
/// 以 `pending` 状态插入，本系统只持有处理期间的工作副本，从不删除任务。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentTask {
    /// 任务唯一标识符，由外部分配
    pub id: Uuid,
    /// 所属用户ID
    pub user_id: Uuid,
    /// 关联的机会ID
    #[serde(default)]
    pub opportunity_id: Option<Uuid>,
    /// 公司名称
    #[serde(default)]
    pub company_name: String,
    /// 已知的公司标识（slug 或完整公司主页URL）
    #[serde(default)]
    pub linkedin_url_slug: Option<String>,
    /// 任务状态
    pub status: TaskStatus,
    /// 失败原因
    #[serde(default)]
    pub error_message: Option<String>,
    /// 创建时间
    #[serde(default = "now")]
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    #[serde(default = "now")]
    pub updated_at: DateTime<FixedOffset>,
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().into()
}

/// 任务状态枚举
///
/// 状态转换遵循以下流程：
/// Pending → Processing → Complete / Error / ErrorNoLinkedinUrl
///
/// 三个终态对本系统而言是汇点，重试由外部重新插入 `pending` 任务完成。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// 等待处理
    #[default]
    Pending,
    /// 处理中
    Processing,
    /// 已完成（包括未找到任何联系人的情况）
    Complete,
    /// 抓取或派发失败
    Error,
    /// 无法构造搜索目标
    ErrorNoLinkedinUrl,
}

impl TaskStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Complete | TaskStatus::Error | TaskStatus::ErrorNoLinkedinUrl
        )
    }

    /// 允许转换到本状态的前驱状态
    ///
    /// 派发阶段的失败可能发生在 `processing` 写入之前，因此失败状态也允许从 Pending 转换。
    /// Pending 只由外部插入，本系统从不写回。
    pub fn allowed_from(&self) -> &'static [TaskStatus] {
        match self {
            TaskStatus::Pending => &[],
            TaskStatus::Processing => &[TaskStatus::Pending],
            TaskStatus::Complete => &[TaskStatus::Processing],
            TaskStatus::Error | TaskStatus::ErrorNoLinkedinUrl => {
                &[TaskStatus::Pending, TaskStatus::Processing]
            }
        }
    }

    /// 校验状态转换
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 允许转换
    /// * `Err(DomainError::InvalidStateTransition)` - 终态或跳过了中间状态
    pub fn transition_to(&self, to: TaskStatus) -> Result<(), DomainError> {
        if to.allowed_from().contains(self) {
            Ok(())
        } else {
            Err(DomainError::InvalidStateTransition { from: *self, to })
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Processing => write!(f, "processing"),
            TaskStatus::Complete => write!(f, "complete"),
            TaskStatus::Error => write!(f, "error"),
            TaskStatus::ErrorNoLinkedinUrl => write!(f, "error_no_linkedin_url"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "processing" => Ok(TaskStatus::Processing),
            "complete" => Ok(TaskStatus::Complete),
            "error" => Ok(TaskStatus::Error),
            "error_no_linkedin_url" => Ok(TaskStatus::ErrorNoLinkedinUrl),
            other => Err(DomainError::ValidationError(format!(
                "unknown task status '{}'",
                other
            ))),
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 无效的状态转换
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: TaskStatus, to: TaskStatus },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl EnrichmentTask {
    /// 创建一个新的待处理任务
    pub fn new(user_id: Uuid, company_name: impl Into<String>, opportunity_id: Option<Uuid>) -> Self {
        let now = now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            opportunity_id,
            company_name: company_name.into(),
            linkedin_url_slug: None,
            status: TaskStatus::Pending,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.linkedin_url_slug = Some(slug.into());
        self
    }
}

/// 队列条目
///
/// 驱动一次抓取所需的最少信息，避免出队后再次查询任务
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueEntry {
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub opportunity_id: Option<Uuid>,
    pub linkedin_url_slug: Option<String>,
}

impl From<&EnrichmentTask> for QueueEntry {
    fn from(task: &EnrichmentTask) -> Self {
        Self {
            task_id: task.id,
            user_id: task.user_id,
            company_name: task.company_name.clone(),
            opportunity_id: task.opportunity_id,
            linkedin_url_slug: task.linkedin_url_slug.clone(),
        }
    }
}

impl From<EnrichmentTask> for QueueEntry {
    fn from(task: EnrichmentTask) -> Self {
        Self {
            task_id: task.id,
            user_id: task.user_id,
            company_name: task.company_name,
            opportunity_id: task.opportunity_id,
            linkedin_url_slug: task.linkedin_url_slug,
        }
    }
}
