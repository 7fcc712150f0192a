use crate::domain::model::{BomPlan, ScanResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &Path) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &Path) -> impl std::future::Future<Output = bool> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_dir(&self) -> &str;
    fn output_name(&self) -> &str;
    fn harvest_dependencies(&self) -> bool;
    fn rewrite_modules(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ScanResult>;
    async fn transform(&self, scan: ScanResult) -> Result<BomPlan>;
    async fn load(&self, plan: BomPlan) -> Result<String>;
}
