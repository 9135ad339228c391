use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Turns text into a fixed-length vector comparable with the stored title embeddings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Embedder backed by an OpenAI-compatible `/v1/embeddings` endpoint
/// (text-embeddings-inference, vLLM, ...) serving the configured model.
#[derive(Clone)]
pub struct HttpEmbedder {
    http_client: HttpClient,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}/v1/embeddings", self.base_url);

        tracing::debug!(model = %self.model, chars = text.len(), "Requesting embedding");

        let response = self
            .http_client
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                "Embedding request failed"
            );
            return Err(AppError::Embedding(format!(
                "embedding server returned status {}: {}",
                status, body
            )));
        }

        let response: EmbeddingResponse = response.json().await?;
        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| AppError::Embedding("embedding server returned no data".to_string()))?;

        check_embedding(embedding)
    }
}

/// Rejects vectors that cannot be compared meaningfully
pub fn check_embedding(embedding: Vec<f32>) -> AppResult<Vec<f32>> {
    if embedding.is_empty() {
        return Err(AppError::Embedding("embedding is empty".to_string()));
    }
    if embedding.iter().any(|v| !v.is_finite()) {
        return Err(AppError::Embedding(
            "embedding contains non-finite values".to_string(),
        ));
    }
    Ok(embedding)
}
