pub mod aggregator;
pub mod cache;
pub mod citations;
pub mod etl;
pub mod metadata;
pub mod versions;

pub use crate::domain::model::{AggregateResult, CitationRecord, OutputRecord, Resource};
pub use crate::domain::ports::{
    CatalogSource, CitationSource, ConfigProvider, MetadataSource, Pipeline, Storage,
};
pub use crate::utils::error::Result;
