// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::message::{HostMessage, InboundMessage, PageMessage};
use crate::domain::models::session::ScrapeSession;
use crate::domain::models::task::QueueEntry;
use crate::domain::repositories::task_repository::TaskRepository;
use crate::domain::services::company_page_service::CompanyPageService;
use crate::domain::services::result_reporter::{ResultReporter, ScrapeReport};
use crate::domain::services::scrape_orchestrator::{DispatchOutcome, ScrapeOrchestrator};
use crate::domain::services::session_service::SessionBridge;
use crate::queue::cooldown::CooldownController;
use crate::queue::queue_manager::{QueueError, QueueManager, QueueSnapshot};
use crate::utils::timing::Clock;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 工作器内部事件
#[derive(Debug)]
pub enum WorkerEvent {
    /// 监听器转发的新任务
    TaskInserted(QueueEntry),
    /// 会话建立后加载的待处理任务
    PendingLoaded(Vec<QueueEntry>),
    /// 派发完成
    DispatchFinished {
        task_id: Uuid,
        outcome: DispatchOutcome,
    },
    /// 抓取会话超时
    ScrapeTimedOut { session_id: Uuid },
    /// 结果上报完成
    ReportFinished { task_id: Uuid },
    /// 冷却结束
    CooldownElapsed,
}

/// 当前活动任务所处的阶段
#[derive(Debug)]
enum ActiveScrape {
    /// 派发中；派发完成前到达的结果暂存于此
    Dispatching {
        task_id: Uuid,
        early_result: Option<ScrapeReport>,
    },
    /// 等待内容脚本应答
    Scraping(ScrapeSession),
    /// 正在写入结果
    Reporting { task_id: Uuid },
}

impl ActiveScrape {
    fn task_id(&self) -> Uuid {
        match self {
            ActiveScrape::Dispatching { task_id, .. } => *task_id,
            ActiveScrape::Scraping(session) => session.task_id,
            ActiveScrape::Reporting { task_id } => *task_id,
        }
    }
}

/// 工作器依赖
pub struct WorkerDeps {
    pub session: SessionBridge,
    pub tasks: Arc<dyn TaskRepository>,
    pub orchestrator: Arc<ScrapeOrchestrator>,
    pub reporter: Arc<ResultReporter>,
    pub company: Arc<CompanyPageService>,
    pub cooldown: CooldownController,
    pub clock: Arc<dyn Clock>,
    /// 等待抓取结果的超时，`None` 表示不限制
    pub scrape_timeout: Option<Duration>,
    /// 会话建立时是否加载已有的待处理任务
    pub reconcile_on_session: bool,
}

/// 补全工作器
///
/// 单线程事件循环，独占任务队列。所有状态变更都在循环内同步完成；
/// 派发、上报、冷却和超时等耗时操作在独立任务中执行，完成后以事件形式回到循环。
pub struct EnrichmentWorker {
    deps: WorkerDeps,
    queue: QueueManager,
    active: Option<ActiveScrape>,
    snapshot: Arc<RwLock<QueueSnapshot>>,
    events_tx: mpsc::UnboundedSender<WorkerEvent>,
    events_rx: mpsc::UnboundedReceiver<WorkerEvent>,
    inbound: mpsc::UnboundedReceiver<InboundMessage>,
}

impl EnrichmentWorker {
    /// 创建工作器
    ///
    /// # 参数
    ///
    /// * `deps` - 依赖的服务
    /// * `inbound` - 宿主应用和内容脚本消息的接收端
    pub fn new(deps: WorkerDeps, inbound: mpsc::UnboundedReceiver<InboundMessage>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let queue = QueueManager::new();
        let snapshot = Arc::new(RwLock::new(queue.snapshot()));
        Self {
            deps,
            queue,
            active: None,
            snapshot,
            events_tx,
            events_rx,
            inbound,
        }
    }

    /// 内部事件发送端，供监听器转发新任务
    pub fn event_sender(&self) -> mpsc::UnboundedSender<WorkerEvent> {
        self.events_tx.clone()
    }

    /// 队列快照的只读视图
    pub fn snapshot_handle(&self) -> Arc<RwLock<QueueSnapshot>> {
        self.snapshot.clone()
    }

    /// 运行事件循环，直到收到关闭信号或消息通道关闭
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!("Enrichment worker started");
        loop {
            tokio::select! {
                Some(event) = self.events_rx.recv() => self.handle_event(event),
                message = self.inbound.recv() => match message {
                    Some(message) => self.handle_message(message),
                    None => {
                        info!("Inbound message channel closed");
                        break;
                    }
                },
                _ = shutdown.recv() => {
                    info!("Enrichment worker shutting down");
                    break;
                }
            }
            *self.snapshot.write() = self.queue.snapshot();
        }

        if let Some(active) = &self.active {
            warn!(task_id = %active.task_id(), "Stopped with a task in flight");
        }
    }

    fn handle_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::TaskInserted(entry) => self.enqueue(entry),
            WorkerEvent::PendingLoaded(entries) => {
                info!(count = entries.len(), "Loaded pending tasks");
                for entry in entries {
                    self.enqueue(entry);
                }
            }
            WorkerEvent::DispatchFinished { task_id, outcome } => {
                self.on_dispatch_finished(task_id, outcome)
            }
            WorkerEvent::ScrapeTimedOut { session_id } => self.on_timeout(session_id),
            WorkerEvent::ReportFinished { task_id } => self.on_report_finished(task_id),
            WorkerEvent::CooldownElapsed => {
                self.queue.cooldown_elapsed();
                debug!("Cooldown elapsed");
                self.process_next();
            }
        }
    }

    fn handle_message(&mut self, message: InboundMessage) {
        match message {
            InboundMessage::Host(HostMessage::SetToken { token, user_id }) => {
                self.on_set_token(token, user_id)
            }
            InboundMessage::Host(HostMessage::ScrapeCompanyPage { opportunity_id }) => {
                let Some(user) = self.deps.session.current() else {
                    warn!(opportunity_id = %opportunity_id, "Company page request without a session");
                    return;
                };
                let company = self.deps.company.clone();
                tokio::spawn(async move {
                    if let Err(e) = company.start(&user, opportunity_id).await {
                        warn!(opportunity_id = %opportunity_id, error = %e, "Company page request failed");
                    }
                });
            }
            InboundMessage::Page(PageMessage::ScrapedData {
                task_id,
                contacts,
                error,
                page_number,
                ..
            }) => self.on_scraped_data(
                task_id,
                ScrapeReport {
                    contacts,
                    error,
                    page_number,
                },
            ),
            InboundMessage::Page(PageMessage::ScrapedCompanyData {
                opportunity_id,
                data,
                error,
            }) => {
                let company = self.deps.company.clone();
                tokio::spawn(async move {
                    if let Err(e) = company.handle_company_data(opportunity_id, data, error).await {
                        warn!(opportunity_id = %opportunity_id, error = %e, "Company data not saved");
                    }
                });
            }
            InboundMessage::Page(PageMessage::ScrapedCompanySearchResults { results }) => {
                let company = self.deps.company.clone();
                tokio::spawn(async move {
                    if let Err(e) = company.handle_search_results(results).await {
                        warn!(error = %e, "Company search did not resolve");
                    }
                });
            }
        }
    }

    fn on_set_token(&mut self, token: String, user_id: Uuid) {
        if self.deps.session.set_token(token, user_id).is_err() {
            return;
        }
        self.process_next();
        if !self.deps.reconcile_on_session {
            return;
        }

        let tasks = self.deps.tasks.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            match tasks.find_pending_by_user(user_id).await {
                Ok(pending) => {
                    let entries = pending.into_iter().map(QueueEntry::from).collect();
                    let _ = events.send(WorkerEvent::PendingLoaded(entries));
                }
                Err(e) => error!(error = %e, "Failed to load pending tasks"),
            }
        });
    }

    fn enqueue(&mut self, entry: QueueEntry) {
        let task_id = entry.task_id;
        match self.queue.enqueue(entry) {
            Ok(()) => {
                debug!(task_id = %task_id, queued = self.queue.len(), "Task queued");
                self.process_next();
            }
            Err(QueueError::Duplicate(id)) => debug!(task_id = %id, "Task already queued"),
        }
    }

    /// 会话有效时派发队首任务
    ///
    /// 没有会话时任务留在队列中，等下一次被接受的 `SET_TOKEN` 恢复派发；
    /// 会话用户变化时丢弃其他用户的排队任务。
    fn process_next(&mut self) {
        let Some(user_id) = self.deps.session.current_user() else {
            if !self.queue.is_empty() {
                warn!(queued = self.queue.len(), "No valid session, queued tasks are held");
            }
            return;
        };

        let dropped = self.queue.retain_user(user_id);
        if dropped > 0 {
            warn!(user_id = %user_id, dropped, "Dropped queued tasks of another user");
        }

        if let Some(entry) = self.queue.process_next() {
            self.dispatch(entry);
        }
    }

    /// 当前会话是否可以为该抓取会话写入结果
    fn owns(&self, session: &ScrapeSession) -> bool {
        self.deps.session.current_user() == Some(session.user_id)
    }

    fn dispatch(&mut self, entry: QueueEntry) {
        let task_id = entry.task_id;
        self.active = Some(ActiveScrape::Dispatching {
            task_id,
            early_result: None,
        });

        let orchestrator = self.deps.orchestrator.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = orchestrator.dispatch(&entry).await;
            let _ = events.send(WorkerEvent::DispatchFinished { task_id, outcome });
        });
    }

    fn on_dispatch_finished(&mut self, task_id: Uuid, outcome: DispatchOutcome) {
        let early_result = match self.active.take() {
            Some(ActiveScrape::Dispatching {
                task_id: active_id,
                early_result,
            }) if active_id == task_id => early_result,
            other => {
                warn!(task_id = %task_id, "Dispatch finished for a task that is not active");
                self.active = other;
                return;
            }
        };

        match outcome {
            DispatchOutcome::Started(session) => match early_result {
                Some(report) => self.start_report(session, report),
                None => {
                    self.arm_timeout(&session);
                    self.active = Some(ActiveScrape::Scraping(session));
                }
            },
            DispatchOutcome::Failed { .. } => self.finish_task(task_id),
        }
    }

    fn on_scraped_data(&mut self, task_id: Uuid, report: ScrapeReport) {
        match self.active.take() {
            Some(ActiveScrape::Scraping(session)) if session.task_id == task_id => {
                self.start_report(session, report)
            }
            Some(ActiveScrape::Dispatching {
                task_id: active_id,
                early_result: None,
            }) if active_id == task_id => {
                debug!(task_id = %task_id, "Result arrived before dispatch finished");
                self.active = Some(ActiveScrape::Dispatching {
                    task_id,
                    early_result: Some(report),
                });
            }
            other => {
                warn!(task_id = %task_id, "Ignoring result for a task that is not active");
                self.active = other;
            }
        }
    }

    fn on_timeout(&mut self, session_id: Uuid) {
        match self.active.take() {
            Some(ActiveScrape::Scraping(session)) if session.id == session_id => {
                let task_id = session.task_id;
                self.active = Some(ActiveScrape::Reporting { task_id });
                let owned = self.owns(&session);
                let reporter = self.deps.reporter.clone();
                let events = self.events_tx.clone();
                tokio::spawn(async move {
                    if owned {
                        reporter.report_timeout(&session).await;
                    } else {
                        reporter.discard(&session).await;
                    }
                    let _ = events.send(WorkerEvent::ReportFinished { task_id });
                });
            }
            other => self.active = other,
        }
    }

    fn on_report_finished(&mut self, task_id: Uuid) {
        match &self.active {
            Some(ActiveScrape::Reporting { task_id: active_id }) if *active_id == task_id => {
                self.finish_task(task_id)
            }
            _ => warn!(task_id = %task_id, "Report finished for a task that is not active"),
        }
    }

    fn start_report(&mut self, session: ScrapeSession, report: ScrapeReport) {
        let task_id = session.task_id;
        self.active = Some(ActiveScrape::Reporting { task_id });

        let owned = self.owns(&session);
        let reporter = self.deps.reporter.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            if owned {
                reporter.report(&session, report).await;
            } else {
                reporter.discard(&session).await;
            }
            let _ = events.send(WorkerEvent::ReportFinished { task_id });
        });
    }

    fn arm_timeout(&self, session: &ScrapeSession) {
        let Some(timeout) = self.deps.scrape_timeout else {
            return;
        };
        let clock = self.deps.clock.clone();
        let events = self.events_tx.clone();
        let session_id = session.id;
        tokio::spawn(async move {
            clock.sleep(timeout).await;
            let _ = events.send(WorkerEvent::ScrapeTimedOut { session_id });
        });
    }

    fn finish_task(&mut self, task_id: Uuid) {
        self.active = None;
        if !self.queue.finish_active(task_id) {
            warn!(task_id = %task_id, "Finished task was not the active task");
        }

        let events = self.events_tx.clone();
        self.deps.cooldown.start(&mut self.queue, move || {
            let _ = events.send(WorkerEvent::CooldownElapsed);
        });
    }
}
