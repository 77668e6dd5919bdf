use crate::domain::model::{RawDocument, RenderableDocument};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 外部生成式語言服務：送出 prompt，取回純文字
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RawDocument>;
    async fn transform(&self, raw: RawDocument) -> Result<RenderableDocument>;
    /// 回傳寫出的檔案路徑
    async fn load(&self, document: RenderableDocument) -> Result<Vec<String>>;
}
