// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::fakes::BrowserCall;
use super::helpers::{Harness, PRE_INJECT_DELAY};
use enrichrs::domain::models::badge::Badge;
use enrichrs::domain::services::status_indicator::StatusIndicator;
use enrichrs::domain::models::message::ScrapeCommand;
use enrichrs::domain::models::task::{EnrichmentTask, QueueEntry, TaskStatus};
use enrichrs::domain::services::scrape_orchestrator::DispatchOutcome;
use enrichrs::engines::traits::ContentScript;
use tokio::time::Instant;
use uuid::Uuid;

/// 测试正常派发
///
/// 任务置为 processing，打开人员搜索页，等待后注入脚本并发送指令
#[tokio::test(start_paused = true)]
async fn test_dispatch_opens_tab_and_sends_command() {
    let harness = Harness::new();
    let entry = harness.pending_task("Acme Corp");
    let orchestrator = harness.orchestrator();

    let started = Instant::now();
    let outcome = orchestrator.dispatch(&entry).await;

    let session = match outcome {
        DispatchOutcome::Started(session) => session,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert!(started.elapsed() >= PRE_INJECT_DELAY);
    assert_eq!(session.task_id, entry.task_id);
    assert_eq!(session.user_id, harness.user_id);
    assert_eq!(session.script_id, "contacts");
    assert_eq!(
        session.target_url,
        "https://people.test/search?keywords=Acme%20Corp"
    );

    assert_eq!(
        harness.tasks.status(entry.task_id),
        Some(TaskStatus::Processing)
    );
    assert_eq!(harness.indicator.history(), vec![Badge::Running]);

    let calls = harness.browser.calls();
    assert_eq!(
        calls,
        vec![
            BrowserCall::Open(session.target_url.clone()),
            BrowserCall::Inject(session.tab, ContentScript::Contacts),
            BrowserCall::Command(
                session.tab,
                ScrapeCommand::ScrapeContacts {
                    task_id: entry.task_id,
                    company_name: "Acme Corp".to_string(),
                    opportunity_id: entry.opportunity_id,
                }
            ),
        ]
    );
}

/// 测试已知公司标识时使用公司人员页
#[tokio::test(start_paused = true)]
async fn test_dispatch_prefers_company_slug() {
    let harness = Harness::new();
    let task = EnrichmentTask::new(harness.user_id, "Acme", None)
        .with_slug("https://www.linkedin.com/company/acme-corp/about/");
    let entry = QueueEntry::from(&task);
    harness.tasks.insert(task);

    let outcome = harness.orchestrator().dispatch(&entry).await;

    assert!(matches!(outcome, DispatchOutcome::Started(_)));
    assert_eq!(
        harness.browser.opened_urls(),
        vec!["https://people.test/company/acme-corp/people/".to_string()]
    );
}

/// 测试无法构造目标时写入 error_no_linkedin_url，且不打开标签页
#[tokio::test(start_paused = true)]
async fn test_dispatch_without_target() {
    let harness = Harness::new();
    let entry = harness.pending_task("   ");

    let outcome = harness.orchestrator().dispatch(&entry).await;

    match outcome {
        DispatchOutcome::Failed { status, .. } => {
            assert_eq!(status, TaskStatus::ErrorNoLinkedinUrl)
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    let task = harness.tasks.get(entry.task_id).unwrap();
    assert_eq!(task.status, TaskStatus::ErrorNoLinkedinUrl);
    assert!(task.error_message.is_some());
    assert!(harness.browser.calls().is_empty());
    assert_eq!(
        harness.indicator.history(),
        vec![Badge::Running, Badge::Error]
    );
}

/// 测试注入失败时关闭已打开的标签页
#[tokio::test(start_paused = true)]
async fn test_inject_failure_closes_tab() {
    let harness = Harness::new();
    let entry = harness.pending_task("Acme");
    harness.browser.fail_inject(true);

    let outcome = harness.orchestrator().dispatch(&entry).await;

    assert!(matches!(
        outcome,
        DispatchOutcome::Failed {
            status: TaskStatus::Error,
            ..
        }
    ));
    assert_eq!(harness.browser.open_tab_count(), 0);
    assert_eq!(harness.browser.closed_tabs().len(), 1);
    assert_eq!(harness.tasks.status(entry.task_id), Some(TaskStatus::Error));
    assert_eq!(harness.indicator.current(), Badge::Error);
}

/// 测试浏览器不可用
#[tokio::test(start_paused = true)]
async fn test_open_failure_marks_task_failed() {
    let harness = Harness::new();
    let entry = harness.pending_task("Acme");
    harness.browser.fail_open(true);

    let outcome = harness.orchestrator().dispatch(&entry).await;

    match outcome {
        DispatchOutcome::Failed { status, message } => {
            assert_eq!(status, TaskStatus::Error);
            assert!(message.contains("browser is gone"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(harness.browser.closed_tabs().is_empty());
}

/// 测试任务记录不存在时派发失败
#[tokio::test(start_paused = true)]
async fn test_missing_task_row_fails_dispatch() {
    let harness = Harness::new();
    let entry = QueueEntry {
        task_id: Uuid::new_v4(),
        user_id: harness.user_id,
        company_name: "Acme".to_string(),
        opportunity_id: None,
        linkedin_url_slug: None,
    };

    let outcome = harness.orchestrator().dispatch(&entry).await;

    assert!(matches!(outcome, DispatchOutcome::Failed { .. }));
    assert!(harness.browser.calls().is_empty());
}
