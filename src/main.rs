// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use enrichrs::config::settings::Settings;
use enrichrs::domain::repositories::contact_repository::ContactRepository;
use enrichrs::domain::repositories::error_log_repository::ErrorLogRepository;
use enrichrs::domain::repositories::opportunity_repository::OpportunityRepository;
use enrichrs::domain::repositories::task_repository::TaskRepository;
use enrichrs::domain::services::company_page_service::CompanyPageService;
use enrichrs::domain::services::result_reporter::ResultReporter;
use enrichrs::domain::services::scrape_orchestrator::ScrapeOrchestrator;
use enrichrs::domain::services::session_service::SessionBridge;
use enrichrs::domain::services::status_indicator::StatusIndicator;
use enrichrs::domain::services::target_resolver::{TargetResolver, UrlTemplates};
use enrichrs::engines::chromium_engine::ChromiumEngine;
use enrichrs::engines::traits::BrowserDriver;
use enrichrs::infrastructure::database::connection;
use enrichrs::infrastructure::realtime::pg_change_feed::PgChangeFeedConnector;
use enrichrs::infrastructure::repositories::contact_repo_impl::ContactRepositoryImpl;
use enrichrs::infrastructure::repositories::error_log_repo_impl::ErrorLogRepositoryImpl;
use enrichrs::infrastructure::repositories::opportunity_repo_impl::OpportunityRepositoryImpl;
use enrichrs::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use enrichrs::infrastructure::status::badge_store::BadgeStore;
use enrichrs::presentation::routes;
use enrichrs::presentation::state::BridgeState;
use enrichrs::queue::cooldown::CooldownController;
use enrichrs::utils::retry_policy::RetryPolicy;
use enrichrs::utils::telemetry;
use enrichrs::utils::timing::{Clock, DelaySampler, TokioClock, UniformDelay};
use enrichrs::workers::enrichment_worker::{EnrichmentWorker, WorkerDeps};
use enrichrs::workers::manager::WorkerManager;
use enrichrs::workers::task_listener::TaskListener;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Arc::new(Settings::new()?);

    // 2. Initialize logging
    telemetry::init_telemetry(settings.telemetry.json);
    info!("Starting enrichrs...");
    info!("Configuration loaded");

    // Initialize Prometheus Metrics
    enrichrs::infrastructure::metrics::init_metrics(&settings.metrics);

    // 3. Connect to database and run migrations
    let db = connection::connect_and_migrate(&settings.database).await?;
    info!("Database connection established");

    // 4. Shared components
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let clock: Arc<dyn Clock> = Arc::new(TokioClock);
    let sampler: Arc<dyn DelaySampler> = Arc::new(UniformDelay);
    let badge: Arc<dyn StatusIndicator> = Arc::new(BadgeStore::new());
    let session = SessionBridge::new(settings.auth.jwt_secret.clone());
    let browser: Arc<dyn BrowserDriver> =
        Arc::new(ChromiumEngine::new(settings.browser.clone(), inbound_tx.clone()));
    let resolver = TargetResolver::new(UrlTemplates::from(&settings.scraping));

    let tasks: Arc<dyn TaskRepository> = Arc::new(TaskRepositoryImpl::new(db.clone()));
    let contacts: Arc<dyn ContactRepository> = Arc::new(ContactRepositoryImpl::new(db.clone()));
    let error_logs: Arc<dyn ErrorLogRepository> =
        Arc::new(ErrorLogRepositoryImpl::new(db.clone()));
    let opportunities: Arc<dyn OpportunityRepository> =
        Arc::new(OpportunityRepositoryImpl::new(db.clone()));

    // 5. Services
    let orchestrator = Arc::new(ScrapeOrchestrator::new(
        tasks.clone(),
        browser.clone(),
        badge.clone(),
        resolver.clone(),
        clock.clone(),
        sampler.clone(),
        settings
            .scraping
            .pre_inject_delay()
            .map_err(anyhow::Error::msg)?,
    ));
    let reporter = Arc::new(ResultReporter::new(
        tasks.clone(),
        contacts,
        error_logs.clone(),
        browser.clone(),
        badge.clone(),
        clock.clone(),
    ));
    let company = Arc::new(CompanyPageService::new(
        opportunities,
        error_logs,
        browser,
        resolver,
        settings.scraping.page_load_timeout(),
        settings.scraping.company_match_threshold,
    ));
    let cooldown = CooldownController::new(
        settings.scraping.cooldown().map_err(anyhow::Error::msg)?,
        clock.clone(),
        sampler,
    );

    // 6. Start Workers
    let worker = EnrichmentWorker::new(
        WorkerDeps {
            session: session.clone(),
            tasks,
            orchestrator,
            reporter,
            company,
            cooldown,
            clock,
            scrape_timeout: settings.scraping.scrape_timeout(),
            reconcile_on_session: settings.queue.reconcile_pending_on_session,
        },
        inbound_rx,
    );
    let snapshot = worker.snapshot_handle();
    let listener = TaskListener::new(
        Arc::new(PgChangeFeedConnector::new(
            settings.database.url.clone(),
            settings.realtime.channel.clone(),
        )),
        session.clone(),
        worker.event_sender(),
        RetryPolicy::reconnect(),
    );

    let mut worker_manager = WorkerManager::new(worker, listener);
    worker_manager.start_workers();

    // 7. Start HTTP bridge
    let state = BridgeState {
        inbound: inbound_tx,
        session,
        indicator: badge,
        snapshot,
    };
    let app = routes::routes(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let tcp_listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(tcp_listener, app).await {
            error!("HTTP server error: {}", e);
        }
    });

    worker_manager.wait_for_shutdown().await;
    server.abort();

    info!("enrichrs stopped");
    Ok(())
}
