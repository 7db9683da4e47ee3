use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::EMBEDDING_MODEL;
use crate::providers::traits::ModelProvider;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini client covering both generation (`generateContent`) and
/// embeddings (`embedContent`) over the REST API.
#[derive(Clone)]
pub struct GeminiProvider {
    api_key: String,
    model: String,
    client: Client,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different API host. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }]
            }))
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;

        body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("unexpected generateContent response shape"))
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!(
            "{}/v1beta/{}:embedContent",
            self.base_url, EMBEDDING_MODEL
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "model": EMBEDDING_MODEL,
                "content": { "parts": [{ "text": text }] }
            }))
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;

        let values = body["embedding"]["values"]
            .as_array()
            .ok_or_else(|| anyhow!("unexpected embedContent response shape"))?;

        let embedding: Vec<f32> = values
            .iter()
            .filter_map(|v| v.as_f64().map(|f| f as f32))
            .collect();

        if embedding.is_empty() {
            return Err(anyhow!("embedContent returned an empty vector"));
        }

        Ok(embedding)
    }

    fn model_info(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new("test-key".to_string(), "gemini-pro".to_string())
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn complete_extracts_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-pro:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "Paris is the capital of France." }]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let answer = provider(&server)
            .complete("What is the capital of France?")
            .await
            .unwrap();
        assert_eq!(answer, "Paris is the capital of France.");
    }

    #[tokio::test]
    async fn complete_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let err = provider(&server).complete("hello").await.unwrap_err();
        assert!(err.to_string().contains("response shape"));
    }

    #[tokio::test]
    async fn complete_propagates_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-pro:generateContent"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        assert!(provider(&server).complete("hello").await.is_err());
    }

    #[tokio::test]
    async fn embed_extracts_values() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/embedding-001:embedContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "embedding": { "values": [0.1, 0.2, 0.3] }
            })))
            .mount(&server)
            .await;

        let embedding = provider(&server).embed("some text").await.unwrap();
        assert_eq!(embedding.len(), 3);
        assert!((embedding[1] - 0.2).abs() < 1e-6);
    }

    #[tokio::test]
    async fn embed_rejects_empty_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/embedding-001:embedContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "embedding": { "values": [] }
            })))
            .mount(&server)
            .await;

        assert!(provider(&server).embed("some text").await.is_err());
    }
}
