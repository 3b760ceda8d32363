use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Catalog fetch failed for {url}: {message}")]
    CatalogFetchError { url: String, message: String },

    #[error("Citation fetch failed for {doi}: {message}")]
    CitationFetchError { doi: String, message: String },

    #[error("Metadata resolution failed for {doi}: {message}")]
    MetadataResolutionError { doi: String, message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Report conversion failed: {message}")]
    ReportConversionError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    DataProcessing,
    Storage,
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::CatalogFetchError { .. }
            | EtlError::CitationFetchError { .. }
            | EtlError::MetadataResolutionError { .. }
            | EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::ConfigValidationError { .. } | EtlError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            EtlError::CsvError(_) | EtlError::SerializationError(_) => ErrorCategory::DataProcessing,
            EtlError::IoError(_) => ErrorCategory::Storage,
            EtlError::ReportConversionError { .. } => ErrorCategory::Report,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 目錄讀不到就沒有任何東西可以處理
            EtlError::CatalogFetchError { .. } => ErrorSeverity::Critical,
            EtlError::MetadataResolutionError { .. } => ErrorSeverity::Low,
            EtlError::ApiError(_) => ErrorSeverity::Medium,
            _ => ErrorSeverity::High,
        }
    }

    /// 依嚴重程度決定程序退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::CatalogFetchError { .. } => {
                "Check that the catalog URL is reachable and returns a paginated resource list"
            }
            EtlError::CitationFetchError { .. } => {
                "Retry later, or run with --on-citation-error skip-resource to continue past failing DOIs"
            }
            EtlError::MetadataResolutionError { .. } => {
                "The citing DOI is omitted from the output; no action required"
            }
            EtlError::ApiError(_) => "Check your network connection and the configured endpoints",
            EtlError::CsvError(_) | EtlError::SerializationError(_) => {
                "Check that the input dataset was produced by this tool"
            }
            EtlError::IoError(_) => "Check that the output directory exists and is writable",
            EtlError::ConfigValidationError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Review the command line arguments and the TOML configuration file"
            }
            EtlError::ReportConversionError { .. } => {
                "Make sure pandoc and the configured PDF engine are installed"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::CatalogFetchError { url, .. } => {
                format!("Could not read the resource catalog at {}", url)
            }
            EtlError::CitationFetchError { doi, .. } => {
                format!("Could not fetch citations for {}", doi)
            }
            EtlError::MetadataResolutionError { doi, .. } => {
                format!("Could not resolve metadata for {}", doi)
            }
            EtlError::ApiError(_) => "A network request failed".to_string(),
            EtlError::IoError(e) => format!("File operation failed: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
