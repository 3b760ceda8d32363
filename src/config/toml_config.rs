use crate::config::{
    DEFAULT_CATALOG_URL, DEFAULT_CROSSREF_URL, DEFAULT_DATACITE_URL, DEFAULT_OUTPUT_PATH,
};
use crate::core::ConfigProvider;
use crate::domain::model::{CitationFailurePolicy, HttpSettings, ReportSettings, Selection};
use crate::utils::doi::parse_doi;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern")
});

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub sources: SourcesConfig,
    pub aggregate: AggregateConfig,
    pub report: ReportConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub catalog_url: String,
    pub datacite_url: String,
    pub crossref_url: String,
    pub user_agent: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_seconds: Option<u64>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            datacite_url: DEFAULT_DATACITE_URL.to_string(),
            crossref_url: DEFAULT_CROSSREF_URL.to_string(),
            user_agent: None,
            timeout_seconds: None,
            retry_attempts: None,
            retry_delay_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    pub include_all_versions: bool,
    pub skip_dois: Vec<String>,
    pub on_citation_error: CitationFailurePolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: Option<String>,
    pub pdf_engine: Option<String>,
    pub pandoc: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CROSSREF_MAILTO})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.sources.timeout_seconds == Some(0) {
            return Err(EtlError::InvalidConfigValueError {
                field: "sources.timeout_seconds".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least 1 second".to_string(),
            });
        }
        crate::config::validate_provider(self)
    }
}

impl ConfigProvider for TomlConfig {
    fn catalog_url(&self) -> &str {
        &self.sources.catalog_url
    }

    fn datacite_url(&self) -> &str {
        &self.sources.datacite_url
    }

    fn crossref_url(&self) -> &str {
        &self.sources.crossref_url
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn http_settings(&self) -> HttpSettings {
        let defaults = HttpSettings::default();
        let sources = &self.sources;
        HttpSettings {
            user_agent: sources.user_agent.clone().unwrap_or(defaults.user_agent),
            timeout: sources
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            retry_attempts: sources.retry_attempts.unwrap_or(defaults.retry_attempts),
            retry_delay: sources
                .retry_delay_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.retry_delay),
        }
    }

    fn selection(&self) -> Selection {
        // 無法辨識的 DOI 保留原字串，交給 validate 回報
        let skip_dois = self
            .aggregate
            .skip_dois
            .iter()
            .map(|doi| parse_doi(doi).unwrap_or_else(|| doi.clone()))
            .collect();
        Selection {
            include_all_versions: self.aggregate.include_all_versions,
            skip_dois,
        }
    }

    fn citation_failure_policy(&self) -> CitationFailurePolicy {
        self.aggregate.on_citation_error
    }

    fn report_settings(&self) -> ReportSettings {
        let defaults = ReportSettings::default();
        let report = &self.report;
        ReportSettings {
            title: report.title.clone().unwrap_or(defaults.title),
            pdf_engine: report.pdf_engine.clone().unwrap_or(defaults.pdf_engine),
            pandoc: report.pandoc.clone().unwrap_or(defaults.pandoc),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
