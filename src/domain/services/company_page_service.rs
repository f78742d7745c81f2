// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::error_log::ErrorLogEntry;
use crate::domain::models::message::{CompanySearchResult, ScrapeCommand};
use crate::domain::models::session::{TabId, UserSession};
use crate::domain::repositories::error_log_repository::ErrorLogRepository;
use crate::domain::repositories::opportunity_repository::OpportunityRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::domain::services::target_resolver::{normalize_slug, TargetResolver};
use crate::engines::traits::{BrowserDriver, ContentScript, EngineError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

static NON_ALNUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid punctuation regex"));
static LEGAL_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(inc|incorporated|llc|ltd|limited|corp|corporation|co|company|gmbh|plc|sa|ag|bv)\b")
        .expect("valid suffix regex")
});

/// 公司主页补全错误类型
#[derive(Error, Debug)]
pub enum CompanyPageError {
    #[error("opportunity {0} not found")]
    OpportunityNotFound(Uuid),

    #[error("opportunity {0} belongs to another user")]
    NotOwner(Uuid),

    #[error("no company search result matched '{0}'")]
    NoMatch(String),

    #[error("company page returned no data")]
    EmptyData,

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("browser error: {0}")]
    Engine(#[from] EngineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Searching,
    Scraping,
}

#[derive(Debug, Clone)]
struct CompanySession {
    opportunity_id: Uuid,
    company_name: String,
    tab: TabId,
    stage: Stage,
}

/// 公司主页补全服务
///
/// 不经过任务队列。同一时间只保留一个会话，新的请求会关闭并替换旧会话
pub struct CompanyPageService {
    opportunities: Arc<dyn OpportunityRepository>,
    error_logs: Arc<dyn ErrorLogRepository>,
    browser: Arc<dyn BrowserDriver>,
    resolver: TargetResolver,
    page_load_timeout: Duration,
    match_threshold: f64,
    session: Mutex<Option<CompanySession>>,
}

impl CompanyPageService {
    pub fn new(
        opportunities: Arc<dyn OpportunityRepository>,
        error_logs: Arc<dyn ErrorLogRepository>,
        browser: Arc<dyn BrowserDriver>,
        resolver: TargetResolver,
        page_load_timeout: Duration,
        match_threshold: f64,
    ) -> Self {
        Self {
            opportunities,
            error_logs,
            browser,
            resolver,
            page_load_timeout,
            match_threshold,
            session: Mutex::new(None),
        }
    }

    /// 开始一次公司主页补全
    ///
    /// 已知公司标识时直接打开简介页，否则先打开公司搜索页
    ///
    /// # 参数
    ///
    /// * `user` - 当前会话
    /// * `opportunity_id` - 目标机会
    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub async fn start(&self, user: &UserSession, opportunity_id: Uuid) -> Result<(), CompanyPageError> {
        let mut slot = self.session.lock().await;
        if let Some(previous) = slot.take() {
            info!(previous = %previous.opportunity_id, "Superseding company page session");
            self.close(previous.tab).await;
        }

        let opportunity = self
            .opportunities
            .find_by_id(opportunity_id)
            .await?
            .ok_or(CompanyPageError::OpportunityNotFound(opportunity_id))?;
        if opportunity.user_id != user.user_id {
            return Err(CompanyPageError::NotOwner(opportunity_id));
        }

        let slug = opportunity.linkedin_url_slug.as_deref().and_then(normalize_slug);
        let (url, stage) = match slug {
            Some(ref slug) => (self.resolver.company_about_url(slug), Stage::Scraping),
            None => (
                self.resolver.company_search_url(&opportunity.company_name),
                Stage::Searching,
            ),
        };

        let tab = self.browser.open_tab(&url).await?;
        let session = CompanySession {
            opportunity_id,
            company_name: opportunity.company_name.clone(),
            tab,
            stage,
        };

        if let Err(e) = self.drive(&session).await {
            self.fail(&session, &e).await;
            return Err(e);
        }

        info!(tab = %tab, url = %url, "Company page flow started");
        *slot = Some(session);
        Ok(())
    }

    /// 处理公司搜索结果
    ///
    /// 选出名称最接近的结果，保存其标识后在同一标签页打开简介页
    #[instrument(skip(self, results), fields(results = results.len()))]
    pub async fn handle_search_results(
        &self,
        results: Vec<CompanySearchResult>,
    ) -> Result<(), CompanyPageError> {
        let mut slot = self.session.lock().await;
        let Some(mut session) = slot.take() else {
            warn!("Company search results without an active company session");
            return Ok(());
        };
        if session.stage != Stage::Searching {
            warn!(opportunity_id = %session.opportunity_id, "Unexpected company search results");
            *slot = Some(session);
            return Ok(());
        }

        let result = self.follow_best_match(&mut session, &results).await;
        match result {
            Ok(()) => {
                *slot = Some(session);
                Ok(())
            }
            Err(e) => {
                self.fail(&session, &e).await;
                Err(e)
            }
        }
    }

    async fn follow_best_match(
        &self,
        session: &mut CompanySession,
        results: &[CompanySearchResult],
    ) -> Result<(), CompanyPageError> {
        let slug = best_match(&session.company_name, results, self.match_threshold)
            .and_then(|result| normalize_slug(&result.url))
            .ok_or_else(|| CompanyPageError::NoMatch(session.company_name.clone()))?;

        self.opportunities
            .update_slug(session.opportunity_id, &slug)
            .await?;
        self.browser
            .navigate(session.tab, &self.resolver.company_about_url(&slug))
            .await?;

        session.stage = Stage::Scraping;
        self.drive(session).await
    }

    /// 处理公司主页数据
    #[instrument(skip(self, data, error))]
    pub async fn handle_company_data(
        &self,
        opportunity_id: Uuid,
        data: Option<serde_json::Value>,
        error: Option<String>,
    ) -> Result<(), CompanyPageError> {
        let mut slot = self.session.lock().await;
        let session = match slot.take() {
            Some(session) if session.opportunity_id == opportunity_id => session,
            other => {
                warn!("Company data for an inactive company session");
                *slot = other;
                return Ok(());
            }
        };

        let result = match (data, error) {
            (_, Some(message)) => {
                self.log_error(opportunity_id, message).await;
                Ok(())
            }
            (Some(data), None) => self
                .opportunities
                .update_company_data(opportunity_id, data)
                .await
                .map_err(CompanyPageError::from),
            (None, None) => Err(CompanyPageError::EmptyData),
        };

        match result {
            Ok(()) => {
                self.close(session.tab).await;
                info!("Company page flow finished");
                Ok(())
            }
            Err(e) => {
                self.fail(&session, &e).await;
                Err(e)
            }
        }
    }

    async fn drive(&self, session: &CompanySession) -> Result<(), CompanyPageError> {
        self.browser
            .wait_for_load(session.tab, self.page_load_timeout)
            .await?;

        let (script, command) = match session.stage {
            Stage::Searching => (
                ContentScript::CompanySearch,
                ScrapeCommand::SearchCompanies {
                    company_name: session.company_name.clone(),
                },
            ),
            Stage::Scraping => (
                ContentScript::CompanyPage,
                ScrapeCommand::ScrapeCompany {
                    opportunity_id: session.opportunity_id,
                },
            ),
        };

        self.browser.inject_script(session.tab, script).await?;
        self.browser.send_command(session.tab, command).await?;
        Ok(())
    }

    async fn fail(&self, session: &CompanySession, err: &CompanyPageError) {
        error!(opportunity_id = %session.opportunity_id, error = %err, "Company page flow failed");
        self.log_error(session.opportunity_id, err.to_string()).await;
        self.close(session.tab).await;
    }

    async fn log_error(&self, opportunity_id: Uuid, message: String) {
        let entry = ErrorLogEntry::for_opportunity(opportunity_id, message);
        if let Err(e) = self.error_logs.create(&entry).await {
            error!(error = %e, "Failed to write error log");
        }
    }

    async fn close(&self, tab: TabId) {
        if let Err(e) = self.browser.close_tab(tab).await {
            warn!(tab = %tab, error = %e, "Failed to close tab");
        }
    }
}

/// 归一化公司名称：小写、去标点、去常见公司后缀
pub fn normalize_company_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let spaced = NON_ALNUM.replace_all(&lowered, " ");
    let stripped = LEGAL_SUFFIX.replace_all(&spaced, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 选出与公司名最相似的搜索结果
///
/// 使用 Jaro-Winkler 相似度，低于阈值时返回 `None`
pub fn best_match<'a>(
    company_name: &str,
    results: &'a [CompanySearchResult],
    threshold: f64,
) -> Option<&'a CompanySearchResult> {
    let wanted = normalize_company_name(company_name);
    if wanted.is_empty() {
        return None;
    }

    results
        .iter()
        .map(|result| {
            let score = strsim::jaro_winkler(&wanted, &normalize_company_name(&result.name));
            (result, score)
        })
        .filter(|(_, score)| *score >= threshold)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(result, _)| result)
}
