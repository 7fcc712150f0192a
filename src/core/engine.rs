use crate::core::{BomPlan, Pipeline};
use crate::utils::error::Result;

pub struct BomEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> BomEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Extract and transform only; nothing is written.
    pub async fn plan(&self) -> Result<BomPlan> {
        tracing::info!("Scanning module POMs...");
        let scan = self.pipeline.extract().await?;
        tracing::info!("Found {} modules", scan.modules.len());

        tracing::info!("Building BOM...");
        let plan = self.pipeline.transform(scan).await?;
        tracing::info!(
            "BOM will manage {} modules and {} harvested dependencies",
            plan.report.modules.len(),
            plan.report.harvested_dependencies
        );
        Ok(plan)
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting POM to BOM conversion...");
        let plan = self.plan().await?;

        tracing::info!("Writing output...");
        let output_path = self.pipeline.load(plan).await?;
        tracing::info!("BOM saved to: {}", output_path);

        Ok(output_path)
    }
}
