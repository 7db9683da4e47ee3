use anyhow::Result;
use async_trait::async_trait;

/// A language-model backend that can both generate text and embed it.
///
/// Credentials are not validated at construction; an invalid key surfaces
/// on the first `complete` or `embed` call.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn model_info(&self) -> &str;
}
