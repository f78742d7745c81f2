// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::badge::Badge;
use crate::domain::models::message::ScrapeCommand;
use crate::domain::models::session::{ScrapeSession, TabId};
use crate::domain::models::task::{QueueEntry, TaskStatus};
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use crate::domain::services::status_indicator::StatusIndicator;
use crate::domain::services::target_resolver::TargetResolver;
use crate::engines::traits::{BrowserDriver, ContentScript, EngineError};
use crate::utils::timing::{Clock, DelayRange, DelaySampler};
use metrics::counter;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// 派发错误类型
#[derive(Error, Debug)]
pub enum DispatchError {
    /// 既没有公司标识也没有公司名
    #[error("no LinkedIn URL or company name to search for")]
    NoTarget,

    #[error("failed to persist task status: {0}")]
    Repository(#[from] RepositoryError),

    #[error("browser error: {0}")]
    Engine(#[from] EngineError),
}

impl DispatchError {
    /// 失败时写入任务的状态
    pub fn status(&self) -> TaskStatus {
        match self {
            DispatchError::NoTarget => TaskStatus::ErrorNoLinkedinUrl,
            _ => TaskStatus::Error,
        }
    }
}

/// 派发结果
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// 指令已发出，等待内容脚本应答
    Started(ScrapeSession),
    /// 派发失败，任务已写入终态
    Failed { status: TaskStatus, message: String },
}

/// 抓取编排服务
///
/// 把出队的任务变成一个打开的标签页和一条已发出的抓取指令
pub struct ScrapeOrchestrator {
    tasks: Arc<dyn TaskRepository>,
    browser: Arc<dyn BrowserDriver>,
    indicator: Arc<dyn StatusIndicator>,
    resolver: TargetResolver,
    clock: Arc<dyn Clock>,
    sampler: Arc<dyn DelaySampler>,
    pre_inject_delay: DelayRange,
}

impl ScrapeOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        browser: Arc<dyn BrowserDriver>,
        indicator: Arc<dyn StatusIndicator>,
        resolver: TargetResolver,
        clock: Arc<dyn Clock>,
        sampler: Arc<dyn DelaySampler>,
        pre_inject_delay: DelayRange,
    ) -> Self {
        Self {
            tasks,
            browser,
            indicator,
            resolver,
            clock,
            sampler,
            pre_inject_delay,
        }
    }

    /// 派发一个已出队的任务
    ///
    /// 依次：徽标置为 RUN、任务置为 processing、构造目标URL、打开后台标签页、随机等待、
    /// 注入联系人脚本、发送抓取指令。任何一步失败都会关闭已打开的标签页并把任务写入失败状态，
    /// 调用方仍需启动冷却。
    ///
    /// # 参数
    ///
    /// * `entry` - 出队的任务
    ///
    /// # 返回值
    ///
    /// 派发结果，不会返回错误
    #[instrument(skip(self, entry), fields(task_id = %entry.task_id))]
    pub async fn dispatch(&self, entry: &QueueEntry) -> DispatchOutcome {
        let mut opened: Option<TabId> = None;

        match self.try_dispatch(entry, &mut opened).await {
            Ok(session) => {
                info!(tab = %session.tab, url = %session.target_url, "Scrape command sent");
                DispatchOutcome::Started(session)
            }
            Err(e) => {
                error!(error = %e, "Dispatch failed");
                if let Some(tab) = opened {
                    if let Err(close_err) = self.browser.close_tab(tab).await {
                        warn!(tab = %tab, error = %close_err, "Failed to close tab after dispatch error");
                    }
                }
                let status = e.status();
                let message = e.to_string();
                if let Err(db_err) = self
                    .tasks
                    .update_status(entry.task_id, status, Some(message.clone()))
                    .await
                {
                    error!(error = %db_err, "Failed to record dispatch failure");
                }
                self.indicator.set(Badge::Error);
                counter!("enrichment_tasks_failed_total").increment(1);
                DispatchOutcome::Failed { status, message }
            }
        }
    }

    async fn try_dispatch(
        &self,
        entry: &QueueEntry,
        opened: &mut Option<TabId>,
    ) -> Result<ScrapeSession, DispatchError> {
        self.indicator.set(Badge::Running);

        self.tasks
            .update_status(entry.task_id, TaskStatus::Processing, None)
            .await?;

        let target = self
            .resolver
            .contacts_target(&entry.company_name, entry.linkedin_url_slug.as_deref())
            .ok_or(DispatchError::NoTarget)?;

        let tab = self.browser.open_tab(target.url()).await?;
        *opened = Some(tab);

        let delay = self.sampler.sample(self.pre_inject_delay);
        self.clock.sleep(delay).await;

        self.browser
            .inject_script(tab, ContentScript::Contacts)
            .await?;
        self.browser
            .send_command(
                tab,
                ScrapeCommand::ScrapeContacts {
                    task_id: entry.task_id,
                    company_name: entry.company_name.clone(),
                    opportunity_id: entry.opportunity_id,
                },
            )
            .await?;

        Ok(ScrapeSession {
            id: Uuid::new_v4(),
            task_id: entry.task_id,
            user_id: entry.user_id,
            opportunity_id: entry.opportunity_id,
            tab,
            target_url: target.url().to_string(),
            script_id: ContentScript::Contacts.id(),
            started_at: self.clock.now(),
        })
    }
}
