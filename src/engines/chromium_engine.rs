// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::BrowserSettings;
use crate::domain::models::message::{InboundMessage, PageMessage, ScrapeCommand};
use crate::domain::models::session::TabId;
use crate::engines::traits::{BrowserDriver, ContentScript, EngineError};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::target::CreateTargetParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

// Global browser instance so every tab shares one Chrome process.
static BROWSER_INSTANCE: OnceCell<Browser> = OnceCell::const_new();

// Asynchronously gets or initializes the shared browser instance.
pub async fn get_browser(settings: &BrowserSettings) -> Result<&'static Browser, EngineError> {
    BROWSER_INSTANCE
        .get_or_try_init(|| async {
            let (browser, mut handler) = if let Some(ref url) = settings.remote_debugging_url {
                info!("Connecting to remote Chrome instance at: {}", url);
                Browser::connect(url).await.map_err(|e| {
                    EngineError::Unavailable(format!("Failed to connect to remote Chrome: {}", e))
                })?
            } else {
                let mut builder = BrowserConfig::builder()
                    .request_timeout(Duration::from_secs(settings.request_timeout_secs))
                    .arg("--disable-gpu")
                    .arg("--disable-dev-shm-usage");
                if !settings.headless {
                    builder = builder.with_head();
                }

                Browser::launch(builder.build().map_err(EngineError::Unavailable)?)
                    .await
                    .map_err(|e| EngineError::Unavailable(e.to_string()))?
            };

            // Spawn a handler to process browser events
            tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            Ok(browser)
        })
        .await
}

/// 基于 chromiumoxide 的浏览器驱动
///
/// 通过 Chrome DevTools Protocol 打开后台标签页并注入内容脚本。内容脚本的应答被转换为
/// `PageMessage` 投递到工作器的消息通道。
pub struct ChromiumEngine {
    settings: BrowserSettings,
    pages: Mutex<HashMap<TabId, Page>>,
    next_tab: AtomicU64,
    sink: mpsc::UnboundedSender<InboundMessage>,
}

impl ChromiumEngine {
    /// 创建浏览器驱动
    ///
    /// # 参数
    ///
    /// * `settings` - 浏览器配置
    /// * `sink` - 内容脚本应答的投递通道
    pub fn new(settings: BrowserSettings, sink: mpsc::UnboundedSender<InboundMessage>) -> Self {
        Self {
            settings,
            pages: Mutex::new(HashMap::new()),
            next_tab: AtomicU64::new(0),
            sink,
        }
    }

    fn page(&self, tab: TabId) -> Result<Page, EngineError> {
        self.pages
            .lock()
            .get(&tab)
            .cloned()
            .ok_or(EngineError::TabNotFound(tab))
    }

    /// 当前打开的标签页数量
    pub fn open_tabs(&self) -> usize {
        self.pages.lock().len()
    }
}

#[async_trait]
impl BrowserDriver for ChromiumEngine {
    async fn open_tab(&self, url: &str) -> Result<TabId, EngineError> {
        let browser = get_browser(&self.settings).await?;
        let params = CreateTargetParams::builder()
            .url(url)
            .background(true)
            .build()
            .map_err(EngineError::Other)?;

        let page = browser
            .new_page(params)
            .await
            .map_err(|e| EngineError::Navigation(e.to_string()))?;

        let tab = TabId(self.next_tab.fetch_add(1, Ordering::Relaxed) + 1);
        self.pages.lock().insert(tab, page);
        debug!(tab = %tab, url = %url, "Opened background tab");
        Ok(tab)
    }

    async fn navigate(&self, tab: TabId, url: &str) -> Result<(), EngineError> {
        let page = self.page(tab)?;
        page.goto(url)
            .await
            .map_err(|e| EngineError::Navigation(e.to_string()))?;
        debug!(tab = %tab, url = %url, "Navigated tab");
        Ok(())
    }

    async fn wait_for_load(&self, tab: TabId, timeout: Duration) -> Result<(), EngineError> {
        let page = self.page(tab)?;
        tokio::time::timeout(timeout, page.wait_for_navigation())
            .await
            .map_err(|_| EngineError::Timeout)?
            .map_err(|e| EngineError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn inject_script(&self, tab: TabId, script: ContentScript) -> Result<(), EngineError> {
        let page = self.page(tab)?;
        let params = EvaluateParams::builder()
            .expression(script.source())
            .build()
            .map_err(EngineError::Script)?;

        page.evaluate_expression(params)
            .await
            .map_err(|e| EngineError::Script(format!("{}: {}", script.id(), e)))?;
        debug!(tab = %tab, script = script.id(), "Injected content script");
        Ok(())
    }

    async fn send_command(&self, tab: TabId, command: ScrapeCommand) -> Result<(), EngineError> {
        let page = self.page(tab)?;
        let payload =
            serde_json::to_string(&command).map_err(|e| EngineError::Other(e.to_string()))?;
        let params = EvaluateParams::builder()
            .expression(format!("window.__enrichrs.handle({})", payload))
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(EngineError::Script)?;

        let sink = self.sink.clone();
        tokio::spawn(async move {
            let message = match page.evaluate_expression(params).await {
                Ok(result) => result.into_value::<PageMessage>().unwrap_or_else(|e| {
                    command.failure(format!("invalid content script reply: {}", e))
                }),
                Err(e) => command.failure(e.to_string()),
            };

            if sink.send(InboundMessage::Page(message)).is_err() {
                warn!(tab = %tab, "Message channel closed, dropping content script reply");
            }
        });

        Ok(())
    }

    async fn close_tab(&self, tab: TabId) -> Result<(), EngineError> {
        let page = self.pages.lock().remove(&tab);
        if let Some(page) = page {
            page.close()
                .await
                .map_err(|e| EngineError::Other(e.to_string()))?;
            debug!(tab = %tab, "Closed tab");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}
