use crate::domain::model::{SemesterRecords, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub trait Storage: Send + Sync {
    /// Returns the location the bytes were written to.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn cookie(&self) -> &str;
    fn semester(&self) -> Option<u32>;
    fn output_path(&self) -> Option<&Path>;
    fn week_count(&self) -> Option<u32>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SemesterRecords>;
    async fn transform(&self, data: SemesterRecords) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
