pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{LocalStorage, TomlConfig};

pub use app::pipelines::CitationPipeline;
pub use core::{aggregator::Aggregator, etl::EtlEngine};
pub use utils::error::{EtlError, Result};
