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

use crate::domain::models::message::ScrapeCommand;
use crate::domain::models::session::TabId;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 浏览器启动或连接失败
    #[error("Browser unavailable: {0}")]
    Unavailable(String),
    /// 标签页不存在或已关闭
    #[error("Tab {0} not found")]
    TabNotFound(TabId),
    /// 导航失败
    #[error("Navigation failed: {0}")]
    Navigation(String),
    /// 脚本注入或执行失败
    #[error("Script error: {0}")]
    Script(String),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

/// 注入标签页的内容脚本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentScript {
    /// 联系人抓取
    Contacts,
    /// 公司主页抓取
    CompanyPage,
    /// 公司搜索结果抓取
    CompanySearch,
}

impl ContentScript {
    /// 脚本标识
    pub fn id(&self) -> &'static str {
        match self {
            ContentScript::Contacts => "contacts",
            ContentScript::CompanyPage => "company_page",
            ContentScript::CompanySearch => "company_search",
        }
    }

    /// 脚本源码
    pub fn source(&self) -> &'static str {
        match self {
            ContentScript::Contacts => include_str!("../../scripts/contacts.js"),
            ContentScript::CompanyPage => include_str!("../../scripts/company_page.js"),
            ContentScript::CompanySearch => include_str!("../../scripts/company_search.js"),
        }
    }
}

/// 浏览器驱动特质
///
/// 抽象标签页的打开、导航、脚本注入和关闭。内容脚本对指令的应答不经由返回值，
/// 而是作为 `PageMessage` 投递到工作器的消息通道。
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// 在后台打开新标签页
    async fn open_tab(&self, url: &str) -> Result<TabId, EngineError>;

    /// 将已有标签页导航到新地址
    async fn navigate(&self, tab: TabId, url: &str) -> Result<(), EngineError>;

    /// 等待页面加载完成
    async fn wait_for_load(&self, tab: TabId, timeout: Duration) -> Result<(), EngineError>;

    /// 注入内容脚本
    async fn inject_script(&self, tab: TabId, script: ContentScript) -> Result<(), EngineError>;

    /// 向内容脚本发送指令
    ///
    /// 指令被受理后立即返回，结果异步回传
    async fn send_command(&self, tab: TabId, command: ScrapeCommand) -> Result<(), EngineError>;

    /// 关闭标签页，标签页不存在时视为成功
    async fn close_tab(&self, tab: TabId) -> Result<(), EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
