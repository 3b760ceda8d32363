// Adapters layer: concrete implementations for external systems (http sources, storage).

pub mod catalog;
pub mod crossref;
pub mod datacite;
pub mod http;

pub use catalog::HttpCatalog;
pub use crossref::CrossRefSource;
pub use datacite::DataCiteSource;
pub use http::{FetchOutcome, HttpClient};
