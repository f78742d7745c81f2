// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{wait_until, Harness, COOLDOWN, PRE_INJECT_DELAY};
use enrichrs::domain::models::badge::Badge;
use enrichrs::domain::services::status_indicator::StatusIndicator;
use enrichrs::domain::models::contact::RawContact;
use enrichrs::domain::models::message::{HostMessage, InboundMessage, PageMessage};
use enrichrs::domain::models::task::{QueueEntry, TaskStatus};
use enrichrs::domain::services::result_reporter::SCRAPE_TIMEOUT_MESSAGE;
use enrichrs::queue::queue_manager::{QueuePhase, QueueSnapshot};
use enrichrs::workers::enrichment_worker::{EnrichmentWorker, WorkerEvent};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

const LIMIT: Duration = Duration::from_secs(120);

struct RunningWorker {
    events: mpsc::UnboundedSender<WorkerEvent>,
    inbound: mpsc::UnboundedSender<InboundMessage>,
    snapshot: Arc<RwLock<QueueSnapshot>>,
    shutdown: broadcast::Sender<()>,
    handle: JoinHandle<()>,
}

impl RunningWorker {
    fn spawn(harness: &Harness, scrape_timeout: Option<Duration>, reconcile: bool) -> Self {
        let (inbound, inbound_rx) = mpsc::unbounded_channel();
        let worker = EnrichmentWorker::new(harness.worker_deps(scrape_timeout, reconcile), inbound_rx);
        let events = worker.event_sender();
        let snapshot = worker.snapshot_handle();
        let (shutdown, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(worker.run(shutdown_rx));
        Self {
            events,
            inbound,
            snapshot,
            shutdown,
            handle,
        }
    }

    fn insert(&self, entry: &QueueEntry) {
        self.events
            .send(WorkerEvent::TaskInserted(entry.clone()))
            .unwrap();
    }

    fn set_token(&self, token: &str, user_id: Uuid) {
        self.inbound
            .send(InboundMessage::Host(HostMessage::SetToken {
                token: token.to_string(),
                user_id,
            }))
            .unwrap();
    }

    fn report(&self, task_id: Uuid, contacts: Vec<RawContact>) {
        self.inbound
            .send(InboundMessage::Page(PageMessage::ScrapedData {
                task_id,
                contacts: Some(contacts),
                error: None,
                opportunity_id: None,
                page_number: None,
            }))
            .unwrap();
    }

    fn phase(&self) -> QueuePhase {
        self.snapshot.read().phase
    }

    async fn stop(self) {
        self.shutdown.send(()).unwrap();
        self.handle.await.unwrap();
    }
}

fn contact(name: &str) -> RawContact {
    RawContact {
        name: name.to_string(),
        title: Some("Engineer".to_string()),
        profile_url: None,
        email: None,
    }
}

/// 测试两个任务依次处理，第二个任务等待冷却结束
#[tokio::test(start_paused = true)]
async fn test_tasks_run_one_at_a_time_with_cooldown() {
    let harness = Harness::new();
    harness.sign_in();
    let first = harness.pending_task("Acme");
    let second = harness.pending_task("Globex");
    let worker = RunningWorker::spawn(&harness, Some(Duration::from_secs(300)), false);

    worker.insert(&first);
    worker.insert(&second);

    wait_until(LIMIT, || harness.browser.commanded(first.task_id)).await;
    assert_eq!(harness.browser.opened_urls().len(), 1);
    assert_eq!(worker.snapshot.read().backlog, vec![second.task_id]);

    worker.report(first.task_id, vec![contact("Jane"), contact("John")]);
    wait_until(LIMIT, || {
        harness.tasks.status(first.task_id) == Some(TaskStatus::Complete)
    })
    .await;
    let finished_at = Instant::now();

    wait_until(LIMIT, || worker.phase() == QueuePhase::CoolingDown).await;
    assert_eq!(harness.browser.opened_urls().len(), 1);
    assert_eq!(
        harness.tasks.status(second.task_id),
        Some(TaskStatus::Pending)
    );

    wait_until(LIMIT, || harness.browser.commanded(second.task_id)).await;
    assert!(finished_at.elapsed() >= COOLDOWN + PRE_INJECT_DELAY);
    assert_eq!(harness.contacts.all().len(), 2);
    assert_eq!(
        harness.tasks.status(second.task_id),
        Some(TaskStatus::Processing)
    );
    assert_eq!(harness.browser.open_tab_count(), 1);

    worker.stop().await;
}

/// 测试派发失败后仍然冷却
#[tokio::test(start_paused = true)]
async fn test_dispatch_failure_still_cools_down() {
    let harness = Harness::new();
    harness.sign_in();
    let broken = harness.pending_task("");
    let next = harness.pending_task("Acme");
    let worker = RunningWorker::spawn(&harness, None, false);

    worker.insert(&broken);
    worker.insert(&next);

    wait_until(LIMIT, || {
        harness.tasks.status(broken.task_id) == Some(TaskStatus::ErrorNoLinkedinUrl)
    })
    .await;
    let failed_at = Instant::now();
    assert_eq!(harness.indicator.current(), Badge::Error);

    wait_until(LIMIT, || harness.browser.commanded(next.task_id)).await;
    assert!(failed_at.elapsed() >= COOLDOWN);
    assert_eq!(harness.indicator.current(), Badge::Running);

    worker.stop().await;
}

/// 测试重复的插入事件只处理一次
#[tokio::test(start_paused = true)]
async fn test_duplicate_insert_is_ignored() {
    let harness = Harness::new();
    harness.sign_in();
    let entry = harness.pending_task("Acme");
    let worker = RunningWorker::spawn(&harness, None, false);

    worker.insert(&entry);
    worker.insert(&entry);

    wait_until(LIMIT, || harness.browser.commanded(entry.task_id)).await;
    assert!(worker.snapshot.read().backlog.is_empty());

    worker.report(entry.task_id, vec![]);
    wait_until(LIMIT, || worker.phase() == QueuePhase::CoolingDown).await;
    wait_until(LIMIT, || worker.phase() == QueuePhase::Idle).await;

    assert_eq!(harness.browser.opened_urls().len(), 1);
    assert_eq!(
        harness.tasks.history(entry.task_id),
        vec![TaskStatus::Processing, TaskStatus::Complete]
    );

    worker.stop().await;
}

/// 测试不属于活动任务的结果被忽略
#[tokio::test(start_paused = true)]
async fn test_result_for_other_task_is_ignored() {
    let harness = Harness::new();
    harness.sign_in();
    let entry = harness.pending_task("Acme");
    let worker = RunningWorker::spawn(&harness, None, false);

    worker.insert(&entry);
    wait_until(LIMIT, || harness.browser.commanded(entry.task_id)).await;

    worker.report(Uuid::new_v4(), vec![contact("Mallory")]);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(harness.contacts.all().is_empty());
    assert_eq!(
        harness.tasks.status(entry.task_id),
        Some(TaskStatus::Processing)
    );
    assert_eq!(worker.snapshot.read().active_task, Some(entry.task_id));

    worker.report(entry.task_id, vec![contact("Jane")]);
    wait_until(LIMIT, || {
        harness.tasks.status(entry.task_id) == Some(TaskStatus::Complete)
    })
    .await;
    assert_eq!(harness.contacts.all().len(), 1);

    worker.stop().await;
}

/// 测试抓取超时后任务失败并进入冷却
#[tokio::test(start_paused = true)]
async fn test_scrape_timeout_fails_task() {
    let harness = Harness::new();
    harness.sign_in();
    let entry = harness.pending_task("Acme");
    let worker = RunningWorker::spawn(&harness, Some(Duration::from_secs(60)), false);

    worker.insert(&entry);
    wait_until(LIMIT, || harness.browser.commanded(entry.task_id)).await;

    wait_until(LIMIT, || {
        harness.tasks.status(entry.task_id) == Some(TaskStatus::Error)
    })
    .await;
    let task = harness.tasks.get(entry.task_id).unwrap();
    assert_eq!(task.error_message.as_deref(), Some(SCRAPE_TIMEOUT_MESSAGE));
    assert_eq!(harness.browser.open_tab_count(), 0);

    wait_until(LIMIT, || worker.phase() == QueuePhase::CoolingDown).await;

    // A result that arrives after the timeout changes nothing.
    worker.report(entry.task_id, vec![contact("Jane")]);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(harness.contacts.all().is_empty());
    assert_eq!(harness.tasks.status(entry.task_id), Some(TaskStatus::Error));

    worker.stop().await;
}

/// 测试建立会话时加载已有的待处理任务
#[tokio::test(start_paused = true)]
async fn test_session_loads_pending_tasks() {
    let harness = Harness::new();
    let entry = harness.pending_task("Acme");
    let worker = RunningWorker::spawn(&harness, None, true);

    worker.set_token("opaque-token", harness.user_id);

    wait_until(LIMIT, || harness.browser.commanded(entry.task_id)).await;
    assert_eq!(harness.session.current_user(), Some(harness.user_id));

    worker.stop().await;
}

/// 测试没有会话时任务留在队列中，会话建立后再派发
#[tokio::test(start_paused = true)]
async fn test_tasks_wait_for_session() {
    let harness = Harness::new();
    let entry = harness.pending_task("Acme");
    let worker = RunningWorker::spawn(&harness, None, false);

    worker.insert(&entry);
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(harness.browser.calls().is_empty());
    assert_eq!(harness.tasks.status(entry.task_id), Some(TaskStatus::Pending));
    assert!(harness.indicator.history().is_empty());
    assert_eq!(worker.snapshot.read().backlog, vec![entry.task_id]);
    assert_eq!(worker.phase(), QueuePhase::Idle);

    worker.set_token("opaque-token", harness.user_id);
    wait_until(LIMIT, || harness.browser.commanded(entry.task_id)).await;
    assert_eq!(
        harness.tasks.status(entry.task_id),
        Some(TaskStatus::Processing)
    );

    worker.stop().await;
}

/// 测试令牌被拒绝后不再写入结果，也不再派发排队任务
#[tokio::test(start_paused = true)]
async fn test_rejected_token_stops_persistence() {
    let harness = Harness::new();
    harness.sign_in();
    let first = harness.pending_task("Acme");
    let second = harness.pending_task("Globex");
    let worker = RunningWorker::spawn(&harness, None, false);

    worker.insert(&first);
    worker.insert(&second);
    wait_until(LIMIT, || harness.browser.commanded(first.task_id)).await;

    worker.set_token("", harness.user_id);
    worker.report(first.task_id, vec![contact("Jane")]);

    wait_until(LIMIT, || harness.browser.open_tab_count() == 0).await;
    assert!(harness.session.current().is_none());
    assert!(harness.contacts.all().is_empty());
    assert_eq!(
        harness.tasks.history(first.task_id),
        vec![TaskStatus::Processing]
    );

    wait_until(LIMIT, || worker.phase() == QueuePhase::CoolingDown).await;
    wait_until(LIMIT, || worker.phase() == QueuePhase::Idle).await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(harness.browser.opened_urls().len(), 1);
    assert_eq!(harness.tasks.status(second.task_id), Some(TaskStatus::Pending));
    assert_eq!(worker.snapshot.read().backlog, vec![second.task_id]);

    worker.stop().await;
}

/// 测试切换用户时丢弃上一个用户的排队任务
#[tokio::test(start_paused = true)]
async fn test_user_change_drops_previous_backlog() {
    let harness = Harness::new();
    harness.sign_in();
    let first = harness.pending_task("Acme");
    let second = harness.pending_task("Globex");
    let worker = RunningWorker::spawn(&harness, None, false);

    worker.insert(&first);
    worker.insert(&second);
    wait_until(LIMIT, || harness.browser.commanded(first.task_id)).await;

    let other_user = Uuid::new_v4();
    worker.set_token("other-token", other_user);
    wait_until(LIMIT, || worker.snapshot.read().backlog.is_empty()).await;
    assert_eq!(harness.session.current_user(), Some(other_user));

    // The in-flight task belongs to the previous user, so its result is not saved.
    worker.report(first.task_id, vec![contact("Jane")]);
    wait_until(LIMIT, || worker.phase() == QueuePhase::CoolingDown).await;
    wait_until(LIMIT, || worker.phase() == QueuePhase::Idle).await;

    assert!(harness.contacts.all().is_empty());
    assert_eq!(harness.browser.open_tab_count(), 0);
    assert_eq!(harness.browser.opened_urls().len(), 1);
    assert_eq!(harness.tasks.status(second.task_id), Some(TaskStatus::Pending));

    worker.stop().await;
}

/// 测试公司主页请求不占用任务队列
#[tokio::test(start_paused = true)]
async fn test_company_page_request_bypasses_queue() {
    let harness = Harness::new();
    harness.sign_in();
    let opportunity_id = Uuid::new_v4();
    harness
        .opportunities
        .insert(enrichrs::domain::models::opportunity::Opportunity {
            id: opportunity_id,
            user_id: harness.user_id,
            company_name: "Acme".to_string(),
            linkedin_url_slug: Some("acme".to_string()),
            company_data: None,
            company_enriched_at: None,
        });
    let worker = RunningWorker::spawn(&harness, None, false);

    worker
        .inbound
        .send(InboundMessage::Host(HostMessage::ScrapeCompanyPage { opportunity_id }))
        .unwrap();
    wait_until(LIMIT, || !harness.browser.commands().is_empty()).await;
    assert_eq!(worker.phase(), QueuePhase::Idle);

    worker
        .inbound
        .send(InboundMessage::Page(PageMessage::ScrapedCompanyData {
            opportunity_id,
            data: Some(serde_json::json!({"industry": "Software"})),
            error: None,
        }))
        .unwrap();
    wait_until(LIMIT, || {
        harness
            .opportunities
            .get(opportunity_id)
            .is_some_and(|o| o.company_data.is_some())
    })
    .await;
    assert_eq!(harness.browser.open_tab_count(), 0);

    worker.stop().await;
}
