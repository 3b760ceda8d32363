pub mod doi;
pub mod error;
pub mod logger;
pub mod validation;
