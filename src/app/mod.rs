// Application layer: pipelines wiring adapters, core services and storage together.

pub mod pipelines;
