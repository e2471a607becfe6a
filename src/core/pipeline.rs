use crate::adapters::session::SessionClient;
use crate::adapters::sheet::XlsxSheetWriter;
use crate::config::toml_config::StrategyConfig;
use crate::core::aggregator::Aggregator;
use crate::core::layout::LayoutEngine;
use crate::core::palette::CategoryPalette;
use crate::core::semester::Semester;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{Module, SemesterRecords, TransformResult};
use crate::utils::error::Result;

pub fn default_output_path(semester: u32) -> String {
    format!("output/credit_strategy_S{}.xlsx", semester)
}

pub struct CreditPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    settings: StrategyConfig,
    palette: CategoryPalette,
    client: SessionClient,
    writer: XlsxSheetWriter,
}

impl<S: Storage, C: ConfigProvider> CreditPipeline<S, C> {
    pub fn new(storage: S, config: C, settings: StrategyConfig) -> Result<Self> {
        let client = SessionClient::new(config.cookie(), &settings.portal)?;
        let palette = settings.palette();
        Ok(Self {
            storage,
            config,
            settings,
            palette,
            client,
            writer: XlsxSheetWriter::new(),
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CreditPipeline<S, C> {
    async fn extract(&self) -> Result<SemesterRecords> {
        self.client.fetch(self.config.semester()).await
    }

    async fn transform(&self, data: SemesterRecords) -> Result<TransformResult> {
        let semester = Semester::from_records(
            data.semester,
            &data.records,
            self.config.week_count(),
            self.settings.layout.default_week_count,
        );

        let modules: Vec<Module> = data
            .records
            .iter()
            .map(|record| semester.module_from(record, &self.palette))
            .collect();
        for module in &modules {
            tracing::debug!(
                "{} [{}] weeks {}-{}, {} credits{}",
                module.name,
                module.category,
                module.start_week,
                module.end_week,
                module.credits,
                match (module.registered, module.validated) {
                    (true, true) => " (validated)",
                    (true, false) => " (pending)",
                    _ => "",
                }
            );
        }

        let aggregate = Aggregator::new(self.settings.layout.bonus_category.as_str()).aggregate(&modules);
        let plan = LayoutEngine::new(&self.palette)
            .with_unregistered_lighten(self.settings.layout.unregistered_lighten)
            .layout(&aggregate, &semester);

        Ok(TransformResult {
            semester: semester.number,
            module_count: modules.len(),
            totals: aggregate.totals,
            plan,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let path = match self.config.output_path() {
            Some(path) => path.to_string_lossy().into_owned(),
            None => default_output_path(result.semester),
        };

        tracing::debug!("Rendering {} plan rows", result.plan.rows.len());
        self.writer.write(&self.storage, &result.plan, &path).await
    }
}
