// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::contact::RawContact;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 宿主应用发来的消息
///
/// 以 `type` 字段区分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum HostMessage {
    /// 建立或刷新认证会话
    SetToken { token: String, user_id: Uuid },
    /// 触发一次公司主页补全（不经过队列）
    ScrapeCompanyPage { opportunity_id: Uuid },
}

/// 内容脚本回传的消息
///
/// 以 `action` 字段区分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PageMessage {
    /// 联系人抓取结果
    ScrapedData {
        task_id: Uuid,
        #[serde(default)]
        contacts: Option<Vec<RawContact>>,
        #[serde(default)]
        error: Option<String>,
        #[serde(default)]
        opportunity_id: Option<Uuid>,
        /// 出错时所在的结果页码
        #[serde(default)]
        page_number: Option<i32>,
    },
    /// 公司主页抓取结果
    ScrapedCompanyData {
        opportunity_id: Uuid,
        #[serde(default)]
        data: Option<serde_json::Value>,
        #[serde(default)]
        error: Option<String>,
    },
    /// 公司搜索结果，用于在没有 slug 时消歧
    ScrapedCompanySearchResults {
        #[serde(default)]
        results: Vec<CompanySearchResult>,
    },
}

/// 公司搜索结果条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySearchResult {
    pub name: String,
    /// 公司主页URL
    pub url: String,
    #[serde(default)]
    pub subtitle: Option<String>,
}

/// 进入工作器的外部消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InboundMessage {
    Host(HostMessage),
    Page(PageMessage),
}

impl From<HostMessage> for InboundMessage {
    fn from(message: HostMessage) -> Self {
        InboundMessage::Host(message)
    }
}

impl From<PageMessage> for InboundMessage {
    fn from(message: PageMessage) -> Self {
        InboundMessage::Page(message)
    }
}

/// 发往标签页内容脚本的指令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ScrapeCommand {
    /// 抓取联系人
    ScrapeContacts {
        task_id: Uuid,
        company_name: String,
        opportunity_id: Option<Uuid>,
    },
    /// 抓取公司主页
    ScrapeCompany { opportunity_id: Uuid },
    /// 抓取公司搜索结果
    SearchCompanies { company_name: String },
}

impl ScrapeCommand {
    /// 当内容脚本无法应答时，构造与该指令对应的失败消息
    ///
    /// 保证每条指令最终都有一条回传消息，避免队列永久等待
    pub fn failure(&self, error: impl Into<String>) -> PageMessage {
        let error = error.into();
        match self {
            ScrapeCommand::ScrapeContacts {
                task_id,
                opportunity_id,
                ..
            } => PageMessage::ScrapedData {
                task_id: *task_id,
                contacts: None,
                error: Some(error),
                opportunity_id: *opportunity_id,
                page_number: None,
            },
            ScrapeCommand::ScrapeCompany { opportunity_id } => PageMessage::ScrapedCompanyData {
                opportunity_id: *opportunity_id,
                data: None,
                error: Some(error),
            },
            ScrapeCommand::SearchCompanies { .. } => {
                PageMessage::ScrapedCompanySearchResults { results: vec![] }
            }
        }
    }
}
