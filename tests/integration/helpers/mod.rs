// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.


use enrichrs::config::settings::DatabaseSettings;
use enrichrs::domain::models::task::{EnrichmentTask, QueueEntry};
use enrichrs::domain::services::company_page_service::CompanyPageService;
use enrichrs::domain::services::result_reporter::ResultReporter;
use enrichrs::domain::services::scrape_orchestrator::ScrapeOrchestrator;
use enrichrs::domain::services::session_service::SessionBridge;
use enrichrs::domain::services::target_resolver::{TargetResolver, UrlTemplates};
use enrichrs::infrastructure::database::connection;
use enrichrs::queue::cooldown::CooldownController;
use enrichrs::utils::timing::{Clock, DelayRange, EdgeDelay, TokioClock};
use enrichrs::workers::enrichment_worker::WorkerDeps;
use fakes::{
    FakeBrowser, InMemoryContactRepo, InMemoryErrorLogRepo, InMemoryOpportunityRepo,
    InMemoryTaskRepo, RecordingIndicator,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const PRE_INJECT_DELAY: Duration = Duration::from_secs(5);
pub const COOLDOWN: Duration = Duration::from_secs(30);

/// 迁移后的内存 sqlite 数据库
pub async fn create_test_db() -> Arc<DatabaseConnection> {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
        min_connections: Some(1),
        connect_timeout: Some(5),
        idle_timeout: None,
    };
    connection::connect_and_migrate(&settings)
        .await
        .expect("Failed to set up sqlite database")
}

pub fn templates() -> UrlTemplates {
    UrlTemplates {
        people_search: "https://people.test/search?keywords={company}".to_string(),
        company_people: "https://people.test/company/{slug}/people/".to_string(),
        company_about: "https://people.test/company/{slug}/about/".to_string(),
        company_search: "https://people.test/companies?keywords={company}".to_string(),
    }
}

/// 以内存替身组装的全部服务
pub struct Harness {
    pub user_id: Uuid,
    pub tasks: Arc<InMemoryTaskRepo>,
    pub contacts: Arc<InMemoryContactRepo>,
    pub error_logs: Arc<InMemoryErrorLogRepo>,
    pub opportunities: Arc<InMemoryOpportunityRepo>,
    pub browser: Arc<FakeBrowser>,
    pub indicator: Arc<RecordingIndicator>,
    pub session: SessionBridge,
    pub clock: Arc<dyn Clock>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            user_id: Uuid::new_v4(),
            tasks: Arc::new(InMemoryTaskRepo::default()),
            contacts: Arc::new(InMemoryContactRepo::default()),
            error_logs: Arc::new(InMemoryErrorLogRepo::default()),
            opportunities: Arc::new(InMemoryOpportunityRepo::default()),
            browser: Arc::new(FakeBrowser::default()),
            indicator: Arc::new(RecordingIndicator::default()),
            session: SessionBridge::new(None),
            clock: Arc::new(TokioClock),
        }
    }

    /// 以测试用户建立会话
    pub fn sign_in(&self) {
        self.session
            .set_token("opaque-token".to_string(), self.user_id)
            .unwrap();
    }

    /// 插入一个属于当前用户的待处理任务
    pub fn pending_task(&self, company_name: &str) -> QueueEntry {
        let task = EnrichmentTask::new(self.user_id, company_name, Some(Uuid::new_v4()));
        let entry = QueueEntry::from(&task);
        self.tasks.insert(task);
        entry
    }

    pub fn resolver(&self) -> TargetResolver {
        TargetResolver::new(templates())
    }

    pub fn orchestrator(&self) -> ScrapeOrchestrator {
        ScrapeOrchestrator::new(
            self.tasks.clone(),
            self.browser.clone(),
            self.indicator.clone(),
            self.resolver(),
            self.clock.clone(),
            Arc::new(EdgeDelay::Min),
            DelayRange::fixed(PRE_INJECT_DELAY),
        )
    }

    pub fn reporter(&self) -> ResultReporter {
        ResultReporter::new(
            self.tasks.clone(),
            self.contacts.clone(),
            self.error_logs.clone(),
            self.browser.clone(),
            self.indicator.clone(),
            self.clock.clone(),
        )
    }

    pub fn company_service(&self) -> CompanyPageService {
        CompanyPageService::new(
            self.opportunities.clone(),
            self.error_logs.clone(),
            self.browser.clone(),
            self.resolver(),
            Duration::from_secs(30),
            0.85,
        )
    }

    pub fn worker_deps(&self, scrape_timeout: Option<Duration>, reconcile: bool) -> WorkerDeps {
        WorkerDeps {
            session: self.session.clone(),
            tasks: self.tasks.clone(),
            orchestrator: Arc::new(self.orchestrator()),
            reporter: Arc::new(self.reporter()),
            company: Arc::new(self.company_service()),
            cooldown: CooldownController::new(
                DelayRange::fixed(COOLDOWN),
                self.clock.clone(),
                Arc::new(EdgeDelay::Min),
            ),
            clock: self.clock.clone(),
            scrape_timeout,
            reconcile_on_session: reconcile,
        }
    }
}

/// 在暂停的时钟下以 10ms 步长推进，直到条件成立
///
/// 超过 `limit` 的虚拟时间仍未成立时 panic
pub async fn wait_until<F>(limit: Duration, mut condition: F)
where
    F: FnMut() -> bool,
{
    let step = Duration::from_millis(10);
    let mut waited = Duration::ZERO;
    while !condition() {
        assert!(waited < limit, "condition not met within {:?}", limit);
        tokio::time::sleep(step).await;
        waited += step;
    }
}
