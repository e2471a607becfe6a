use crate::core::Pipeline;
use crate::domain::model::Totals;
use crate::utils::error::Result;

/// Outcome of one successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: String,
    pub semester: u32,
    pub module_count: usize,
    pub totals: Totals,
}

pub struct StrategyEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> StrategyEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Fetching modules...");
        let data = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} modules for semester {}",
            data.records.len(),
            data.semester
        );

        tracing::info!("Building timeline...");
        let result = self.pipeline.transform(data).await?;
        let semester = result.semester;
        let module_count = result.module_count;
        let totals = result.totals;
        tracing::info!(
            "Semester {}: {} credits available, {} registered, {} bonus",
            semester,
            totals.available,
            totals.registered,
            totals.bonus
        );

        tracing::info!("Writing workbook...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(RunSummary {
            output_path,
            semester,
            module_count,
            totals,
        })
    }
}
