// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScrapingSettings;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.%\-]*$").expect("valid slug regex"));

/// 抓取目标URL模板
#[derive(Debug, Clone)]
pub struct UrlTemplates {
    pub people_search: String,
    pub company_people: String,
    pub company_about: String,
    pub company_search: String,
}

impl From<&ScrapingSettings> for UrlTemplates {
    fn from(settings: &ScrapingSettings) -> Self {
        Self {
            people_search: settings.people_search_url.clone(),
            company_people: settings.company_people_url.clone(),
            company_about: settings.company_about_url.clone(),
            company_search: settings.company_search_url.clone(),
        }
    }
}

/// 联系人抓取目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactsTarget {
    /// 已知公司标识，直接打开公司人员页
    CompanyPeople { slug: String, url: String },
    /// 按公司名搜索人员
    PeopleSearch { url: String },
}

impl ContactsTarget {
    pub fn url(&self) -> &str {
        match self {
            ContactsTarget::CompanyPeople { url, .. } => url,
            ContactsTarget::PeopleSearch { url } => url,
        }
    }
}

/// 目标URL解析器
#[derive(Debug, Clone)]
pub struct TargetResolver {
    templates: UrlTemplates,
}

impl TargetResolver {
    pub fn new(templates: UrlTemplates) -> Self {
        Self { templates }
    }

    /// 为联系人抓取构造目标URL
    ///
    /// 优先使用公司标识；否则使用公司名搜索；两者都没有时返回 `None`
    pub fn contacts_target(
        &self,
        company_name: &str,
        linkedin_url_slug: Option<&str>,
    ) -> Option<ContactsTarget> {
        if let Some(slug) = linkedin_url_slug.and_then(normalize_slug) {
            let url = self.templates.company_people.replace("{slug}", &slug);
            return Some(ContactsTarget::CompanyPeople { slug, url });
        }

        let company_name = company_name.trim();
        if company_name.is_empty() {
            return None;
        }

        Some(ContactsTarget::PeopleSearch {
            url: fill_company(&self.templates.people_search, company_name),
        })
    }

    /// 公司简介页URL
    pub fn company_about_url(&self, slug: &str) -> String {
        self.templates.company_about.replace("{slug}", slug)
    }

    /// 公司搜索页URL
    pub fn company_search_url(&self, company_name: &str) -> String {
        fill_company(&self.templates.company_search, company_name.trim())
    }
}

fn fill_company(template: &str, company_name: &str) -> String {
    template.replace("{company}", &urlencoding::encode(company_name))
}

/// 归一化公司标识
///
/// 接受裸标识（`acme-corp`）或完整公司主页URL
/// （`https://www.linkedin.com/company/acme-corp/about/`），返回裸标识
pub fn normalize_slug(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(raw) {
        let mut segments = url.path_segments()?;
        while let Some(segment) = segments.next() {
            if segment == "company" || segment == "school" || segment == "showcase" {
                return segments
                    .next()
                    .filter(|slug| SLUG_PATTERN.is_match(slug))
                    .map(str::to_string);
            }
        }
        return None;
    }

    let rest = match raw.find("company/") {
        Some(idx) => &raw[idx + "company/".len()..],
        None => raw,
    };
    let slug = rest.split('/').find(|s| !s.is_empty())?;
    SLUG_PATTERN.is_match(slug).then(|| slug.to_string())
}
