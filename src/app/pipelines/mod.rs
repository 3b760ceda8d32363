pub mod citation_pipeline;

pub use citation_pipeline::CitationPipeline;
