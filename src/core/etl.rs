use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("🚀 Starting citation ETL process");

        // Extract
        let resources = self.pipeline.extract().await?;
        tracing::info!("📊 Extracted {} catalog resources", resources.len());

        // Transform
        let aggregate = self.pipeline.transform(resources).await?;
        tracing::info!(
            "🔧 Aggregated {} resources, {} skipped",
            aggregate.records.len(),
            aggregate.skipped_resources.len()
        );
        for doi in &aggregate.skipped_resources {
            tracing::warn!(doi = %doi, "resource missing from output");
        }

        // Load
        let output_path = self.pipeline.load(aggregate).await?;
        tracing::info!(
            "💾 Output saved to: {} (took {:?})",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }
}
