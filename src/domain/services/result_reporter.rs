// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::badge::Badge;
use crate::domain::models::contact::{Contact, RawContact};
use crate::domain::models::error_log::ErrorLogEntry;
use crate::domain::models::session::ScrapeSession;
use crate::domain::models::task::TaskStatus;
use crate::domain::repositories::contact_repository::ContactRepository;
use crate::domain::repositories::error_log_repository::ErrorLogRepository;
use crate::domain::repositories::task_repository::TaskRepository;
use crate::domain::services::status_indicator::StatusIndicator;
use crate::engines::traits::BrowserDriver;
use crate::utils::timing::Clock;
use metrics::{counter, histogram};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// 抓取超时时写入任务的错误信息
pub const SCRAPE_TIMEOUT_MESSAGE: &str = "scrape timed out";

/// 内容脚本返回的抓取结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrapeReport {
    pub contacts: Option<Vec<RawContact>>,
    pub error: Option<String>,
    pub page_number: Option<i32>,
}

/// 上报结果
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// 任务完成，附带保存的联系人数量
    Completed { contacts: usize },
    /// 任务失败
    Failed { message: String },
}

/// 结果上报服务
///
/// 唯一写入联系人表的组件。无论成功失败都会关闭会话的标签页
pub struct ResultReporter {
    tasks: Arc<dyn TaskRepository>,
    contacts: Arc<dyn ContactRepository>,
    error_logs: Arc<dyn ErrorLogRepository>,
    browser: Arc<dyn BrowserDriver>,
    indicator: Arc<dyn StatusIndicator>,
    clock: Arc<dyn Clock>,
}

impl ResultReporter {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        contacts: Arc<dyn ContactRepository>,
        error_logs: Arc<dyn ErrorLogRepository>,
        browser: Arc<dyn BrowserDriver>,
        indicator: Arc<dyn StatusIndicator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tasks,
            contacts,
            error_logs,
            browser,
            indicator,
            clock,
        }
    }

    /// 处理一次抓取结果
    ///
    /// # 参数
    ///
    /// * `session` - 产生该结果的抓取会话
    /// * `report` - 内容脚本的应答
    ///
    /// # 返回值
    ///
    /// 上报结果，失败已写入任务状态和错误日志
    #[instrument(skip(self, session, report), fields(task_id = %session.task_id, tab = %session.tab))]
    pub async fn report(&self, session: &ScrapeSession, report: ScrapeReport) -> ReportOutcome {
        let outcome = match report.error {
            Some(message) => {
                self.record_failure(session, message, report.page_number)
                    .await
            }
            None => {
                self.save_contacts(session, report.contacts.unwrap_or_default())
                    .await
            }
        };

        self.finish(session, &outcome).await;
        outcome
    }

    /// 抓取超时：任务置为失败并关闭标签页
    #[instrument(skip(self, session), fields(task_id = %session.task_id, tab = %session.tab))]
    pub async fn report_timeout(&self, session: &ScrapeSession) -> ReportOutcome {
        warn!("No result received before the scrape timeout");
        let outcome = self
            .record_failure(session, SCRAPE_TIMEOUT_MESSAGE.to_string(), None)
            .await;
        self.finish(session, &outcome).await;
        outcome
    }

    /// 会话失效：不写入任何记录，只关闭标签页并清除徽标
    ///
    /// 任务保持 `processing`，由外部重新插入后再处理
    #[instrument(skip(self, session), fields(task_id = %session.task_id, tab = %session.tab))]
    pub async fn discard(&self, session: &ScrapeSession) {
        warn!("No valid session for this task, result discarded");
        if let Err(e) = self.browser.close_tab(session.tab).await {
            warn!(error = %e, "Failed to close tab");
        }
        self.indicator.set(Badge::Clear);
        counter!("enrichment_results_discarded_total").increment(1);
    }

    async fn save_contacts(&self, session: &ScrapeSession, raw: Vec<RawContact>) -> ReportOutcome {
        let contacts: Vec<Contact> = raw
            .into_iter()
            .map(|c| Contact::from_raw(c, session.task_id, session.opportunity_id, session.user_id))
            .collect();
        let count = contacts.len();

        if count > 0 {
            if let Err(e) = self.contacts.insert_many(contacts).await {
                let message = format!("failed to save contacts: {}", e);
                error!(error = %e, "Contact insert failed");
                self.mark(session, TaskStatus::Error, Some(message.clone()))
                    .await;
                return ReportOutcome::Failed { message };
            }
        }

        self.mark(session, TaskStatus::Complete, None).await;
        info!(contacts = count, "Task complete");
        ReportOutcome::Completed { contacts: count }
    }

    async fn record_failure(
        &self,
        session: &ScrapeSession,
        message: String,
        page_number: Option<i32>,
    ) -> ReportOutcome {
        warn!(error = %message, "Scrape reported an error");
        self.mark(session, TaskStatus::Error, Some(message.clone()))
            .await;

        let mut entry = ErrorLogEntry::for_task(session.task_id, message.clone()).with_page(page_number);
        entry.opportunity_id = session.opportunity_id;
        if let Err(e) = self.error_logs.create(&entry).await {
            error!(error = %e, "Failed to write error log");
        }

        ReportOutcome::Failed { message }
    }

    async fn mark(&self, session: &ScrapeSession, status: TaskStatus, message: Option<String>) {
        if let Err(e) = self
            .tasks
            .update_status(session.task_id, status, message)
            .await
        {
            error!(error = %e, status = %status, "Failed to update task status");
        }
    }

    async fn finish(&self, session: &ScrapeSession, outcome: &ReportOutcome) {
        if let Err(e) = self.browser.close_tab(session.tab).await {
            warn!(error = %e, "Failed to close tab");
        }

        let elapsed = (self.clock.now() - session.started_at)
            .to_std()
            .unwrap_or_default();
        histogram!("enrichment_scrape_duration_seconds").record(elapsed.as_secs_f64());

        match outcome {
            ReportOutcome::Completed { contacts } => {
                self.indicator.set(Badge::Clear);
                counter!("enrichment_tasks_completed_total").increment(1);
                counter!("enrichment_contacts_saved_total").increment(*contacts as u64);
            }
            ReportOutcome::Failed { .. } => {
                self.indicator.set(Badge::Error);
                counter!("enrichment_tasks_failed_total").increment(1);
            }
        }
    }
}
