pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_base_url, validate_doi, validate_non_empty_string, validate_output_format,
    validate_url,
};

pub use cli::LocalStorage;
pub use toml_config::TomlConfig;

pub const DEFAULT_CATALOG_URL: &str = "https://data.isimip.org/api/v1/resources/?page_size=1000";
pub const DEFAULT_DATACITE_URL: &str = "https://api.datacite.org/dois/";
pub const DEFAULT_CROSSREF_URL: &str = "https://api.crossref.org/works/";
pub const DEFAULT_OUTPUT_PATH: &str = "resources.json";

/// 檢查合併後的有效設定
pub fn validate_provider(config: &impl ConfigProvider) -> Result<()> {
    validate_url("catalog_url", config.catalog_url())?;
    validate_base_url("datacite_url", config.datacite_url())?;
    validate_base_url("crossref_url", config.crossref_url())?;
    validate_output_format("output_path", config.output_path())?;

    for doi in &config.selection().skip_dois {
        validate_doi("skip_dois", doi)?;
    }

    let report = config.report_settings();
    validate_non_empty_string("report.pandoc", &report.pandoc)?;
    validate_non_empty_string("report.pdf_engine", &report.pdf_engine)?;
    Ok(())
}

#[cfg(feature = "cli")]
mod args {
    use super::toml_config::TomlConfig;
    use crate::core::ConfigProvider;
    use crate::domain::model::{CitationFailurePolicy, HttpSettings, ReportSettings, Selection};
    use crate::utils::doi::parse_doi;
    use crate::utils::error::Result;
    use crate::utils::validation::Validate;
    use clap::Parser;
    use std::path::PathBuf;

    fn doi_arg(value: &str) -> std::result::Result<String, String> {
        parse_doi(value).ok_or_else(|| format!("'{}' is not a DOI", value))
    }

    /// 命令列參數優先於 TOML 設定，TOML 設定優先於預設值
    #[derive(Debug, Clone, Parser)]
    #[command(name = "citation-etl", version)]
    #[command(about = "Collect citations of catalog resources from DataCite and Crossref")]
    pub struct CliConfig {
        /// DOIs (or https://doi.org/ URLs) of resources to leave out
        #[arg(value_name = "DOI", value_parser = doi_arg)]
        pub dois: Vec<String>,

        /// Include superseded versions as their own entries
        #[arg(short, long)]
        pub all: bool,

        /// Output file; the extension selects json, csv, md or pdf
        #[arg(short, long = "output")]
        pub output_path: Option<String>,

        /// TOML configuration file
        #[arg(short, long)]
        pub config: Option<PathBuf>,

        #[arg(long)]
        pub catalog_url: Option<String>,

        #[arg(long)]
        pub datacite_url: Option<String>,

        #[arg(long)]
        pub crossref_url: Option<String>,

        #[arg(long, value_enum)]
        pub on_citation_error: Option<CitationFailurePolicy>,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub log_json: bool,

        #[arg(skip)]
        pub file: TomlConfig,
    }

    impl CliConfig {
        /// 讀取 `--config` 指定的 TOML 檔
        pub fn load_config_file(mut self) -> Result<Self> {
            if let Some(path) = &self.config {
                tracing::debug!("Loading configuration from {}", path.display());
                self.file = TomlConfig::from_file(path)?;
            }
            Ok(self)
        }
    }

    impl ConfigProvider for CliConfig {
        fn catalog_url(&self) -> &str {
            self.catalog_url
                .as_deref()
                .unwrap_or_else(|| self.file.catalog_url())
        }

        fn datacite_url(&self) -> &str {
            self.datacite_url
                .as_deref()
                .unwrap_or_else(|| self.file.datacite_url())
        }

        fn crossref_url(&self) -> &str {
            self.crossref_url
                .as_deref()
                .unwrap_or_else(|| self.file.crossref_url())
        }

        fn output_path(&self) -> &str {
            self.output_path
                .as_deref()
                .unwrap_or_else(|| self.file.output_path())
        }

        fn http_settings(&self) -> HttpSettings {
            self.file.http_settings()
        }

        fn selection(&self) -> Selection {
            let mut selection = self.file.selection();
            selection.include_all_versions |= self.all;
            selection.skip_dois.extend(self.dois.iter().cloned());
            selection
        }

        fn citation_failure_policy(&self) -> CitationFailurePolicy {
            self.on_citation_error
                .unwrap_or_else(|| self.file.citation_failure_policy())
        }

        fn report_settings(&self) -> ReportSettings {
            self.file.report_settings()
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            super::validate_provider(self)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::domain::model::OutputFormat;
        use std::io::Write;
        use tempfile::NamedTempFile;

        #[test]
        fn test_defaults() {
            let config = CliConfig::try_parse_from(["citation-etl"]).unwrap();

            assert_eq!(config.catalog_url(), crate::config::DEFAULT_CATALOG_URL);
            assert_eq!(config.datacite_url(), crate::config::DEFAULT_DATACITE_URL);
            assert_eq!(config.output_path(), "resources.json");
            assert_eq!(config.citation_failure_policy(), CitationFailurePolicy::Abort);
            assert_eq!(config.selection(), Selection::default());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_positional_dois_are_normalised() {
            let config = CliConfig::try_parse_from([
                "citation-etl",
                "https://doi.org/10.48364/ISIMIP.1",
                "10.48364/ISIMIP.2",
                "--all",
                "-o",
                "out/report.md",
            ])
            .unwrap();

            let selection = config.selection();
            assert!(selection.include_all_versions);
            assert!(selection.skip_dois.contains("10.48364/ISIMIP.1"));
            assert!(selection.skip_dois.contains("10.48364/ISIMIP.2"));
            assert_eq!(
                OutputFormat::from_path(config.output_path()),
                Some(OutputFormat::Markdown)
            );
        }

        #[test]
        fn test_invalid_doi_is_rejected() {
            assert!(CliConfig::try_parse_from(["citation-etl", "not-a-doi"]).is_err());
        }

        #[test]
        fn test_policy_flag() {
            let config =
                CliConfig::try_parse_from(["citation-etl", "--on-citation-error", "skip-resource"])
                    .unwrap();
            assert_eq!(config.citation_failure_policy(), CitationFailurePolicy::SkipResource);
        }

        #[test]
        fn test_unsupported_output_fails_validation() {
            let config = CliConfig::try_parse_from(["citation-etl", "-o", "report.docx"]).unwrap();
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_cli_overrides_config_file() {
            let mut temp_file = NamedTempFile::new().unwrap();
            temp_file
                .write_all(
                    br#"
[sources]
catalog_url = "https://catalog.example.com/resources/"
datacite_url = "https://datacite.example.com/dois/"

[aggregate]
include_all_versions = false
skip_dois = ["10.48364/ISIMIP.9"]
on_citation_error = "skip-resource"

[load]
output_path = "from-file.csv"
"#,
                )
                .unwrap();

            let path = temp_file.path().to_string_lossy().to_string();
            let config = CliConfig::try_parse_from([
                "citation-etl",
                "-c",
                path.as_str(),
                "--datacite-url",
                "https://override.example.com/dois/",
                "10.48364/ISIMIP.1",
            ])
            .unwrap()
            .load_config_file()
            .unwrap();

            assert_eq!(config.catalog_url(), "https://catalog.example.com/resources/");
            assert_eq!(config.datacite_url(), "https://override.example.com/dois/");
            assert_eq!(config.output_path(), "from-file.csv");
            assert_eq!(config.citation_failure_policy(), CitationFailurePolicy::SkipResource);
            assert_eq!(config.selection().skip_dois.len(), 2);
        }
    }
}

#[cfg(feature = "cli")]
pub use args::CliConfig;
