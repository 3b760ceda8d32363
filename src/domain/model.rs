use crate::utils::doi::doi_key;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

pub type Doi = String;

/// 由新到舊排列的版本 DOI
pub type VersionChain = Vec<Doi>;

/// 目錄中的一筆資料資源，載入後不再修改
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub doi: Doi,
    #[serde(default)]
    pub doi_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub creators_str: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub publication_year: Option<String>,
    #[serde(default)]
    pub citation: Option<String>,
    #[serde(default)]
    pub previous_version: Option<Doi>,
    /// 有更新版本取代時為 true；目錄 API 可能回傳布林值或新版本的 DOI
    #[serde(default, deserialize_with = "truthy")]
    pub new_version: bool,
}

impl Resource {
    pub fn new(doi: impl Into<Doi>) -> Self {
        Self {
            doi: doi.into(),
            ..Default::default()
        }
    }

    pub fn previous_version(&self) -> Option<&str> {
        self.previous_version
            .as_deref()
            .map(str::trim)
            .filter(|doi| !doi.is_empty())
    }

    pub fn is_superseded(&self) -> bool {
        self.new_version
    }
}

/// 目錄 API 的一頁
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub results: Vec<Resource>,
    #[serde(default)]
    pub next: Option<String>,
}

/// 引用作品解析後的書目資料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRecord {
    pub doi: Doi,
    pub doi_url: String,
    pub creators_str: String,
    pub title: Option<String>,
    pub publication_date: Option<String>,
    pub publication_year: Option<String>,
    pub publisher: Option<String>,
    pub citation: String,
}

impl CitationRecord {
    /// Builds the record and its `"{creators} ({year}): {title}. {publisher}. {doi_url}"` citation.
    pub fn new(
        doi: &str,
        creators_str: String,
        title: Option<String>,
        publisher: Option<String>,
        created: Option<NaiveDate>,
    ) -> Self {
        let doi_url = crate::utils::doi::doi_url(doi);
        let publication_date = created.map(|date| date.format("%Y-%m-%d").to_string());
        let publication_year = created.map(|date| date.year().to_string());

        let citation = format!(
            "{} ({}): {}. {}. {}",
            creators_str,
            publication_year.as_deref().unwrap_or_default(),
            title.as_deref().unwrap_or_default(),
            publisher.as_deref().unwrap_or_default(),
            doi_url
        );

        Self {
            doi: doi.to_string(),
            doi_url,
            creators_str,
            title,
            publication_date,
            publication_year,
            publisher,
            citation,
        }
    }
}

/// 每個目錄資源一筆的彙整結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub doi: Doi,
    pub doi_url: Option<String>,
    pub creators_str: Option<String>,
    pub title: Option<String>,
    pub publication_date: Option<String>,
    pub publication_year: Option<String>,
    pub publisher: Option<String>,
    pub citation: Option<String>,
    #[serde(default)]
    pub citations_count: usize,
    #[serde(default)]
    pub citations: Vec<CitationRecord>,
}

impl OutputRecord {
    pub fn new(resource: &Resource, citations: Vec<CitationRecord>) -> Self {
        Self {
            doi: resource.doi.clone(),
            doi_url: resource.doi_url.clone(),
            creators_str: resource.creators_str.clone(),
            title: resource.title.clone(),
            publication_date: resource.publication_date.clone(),
            publication_year: resource.publication_year.clone(),
            publisher: resource.publisher.clone(),
            citation: resource.citation.clone(),
            citations_count: citations.len(),
            citations,
        }
    }
}

/// 彙整階段的結果
#[derive(Debug, Clone, Default)]
pub struct AggregateResult {
    pub records: Vec<OutputRecord>,
    /// 因引用查詢失敗而略過的資源
    pub skipped_resources: Vec<Doi>,
}

/// 要處理哪些目錄資源
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub include_all_versions: bool,
    pub skip_dois: BTreeSet<Doi>,
}

impl Selection {
    pub fn includes(&self, resource: &Resource) -> bool {
        // DOI 不分大小寫
        let doi = doi_key(&resource.doi);
        if self.skip_dois.iter().any(|skip| doi_key(skip) == doi) {
            return false;
        }
        self.include_all_versions || !resource.is_superseded()
    }
}

/// 引用查詢失敗時的處理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum CitationFailurePolicy {
    #[default]
    Abort,
    SkipResource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Markdown,
    Pdf,
}

impl OutputFormat {
    pub const EXTENSIONS: [&'static str; 4] = ["json", "csv", "md", "pdf"];

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "md" => Some(Self::Markdown),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout: Duration,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            retry_attempts: 2,
            retry_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub title: String,
    pub pdf_engine: String,
    pub pandoc: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: "Citations".to_string(),
            pdf_engine: "xelatex".to_string(),
            pandoc: "pandoc".to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn truthy<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(serde_json::Value::Array(items)) => !items.is_empty(),
        Some(serde_json::Value::Object(map)) => !map.is_empty(),
    })
}
