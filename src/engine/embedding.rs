// txintent — Embedding Client
//
// Calls an OpenAI-compatible or Ollama embedding API to turn a query into a
// vector. Corpus vectors are precomputed out of band; this client is only
// used for the query side of token and protocol search.
//
// No retries and no implicit timeout: a failed call surfaces immediately and
// callers wrap evaluation in their own deadline.

use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::traits::Embedder;
use crate::engine::config::EngineConfig;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde_json::{json, Value};

/// Embedding client — OpenAI-compatible API first, Ollama as fallback.
pub struct EmbeddingClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl EmbeddingClient {
    pub fn new(config: &EngineConfig) -> Self {
        EmbeddingClient {
            client: Client::new(),
            base_url: config.embedding_base_url.clone(),
            api_key: config.embedding_api_key.clone(),
        }
    }

    /// OpenAI-compatible format: POST /v1/embeddings { model, input }
    async fn embed_openai(&self, text: &str, model: &str) -> EngineResult<Vec<f32>> {
        let url = format!("{}/v1/embeddings", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": model,
            "input": text,
        });

        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(EngineError::Embedding(format!("OpenAI embed {} — {}", status, text)));
        }

        let v: Value = resp.json().await?;
        let embedding = v["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| EngineError::Embedding("No 'data[0].embedding' array in OpenAI response".into()))?;

        parse_vector(embedding, "OpenAI")
    }

    /// Ollama API: POST /api/embed { model, input } → { embeddings: [[f32...]] }
    async fn embed_ollama(&self, text: &str, model: &str) -> EngineResult<Vec<f32>> {
        let url = format!("{}/api/embed", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": model,
            "input": text,
        });

        let resp = self.client.post(&url).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(EngineError::Embedding(format!("Ollama embed {} — {}", status, text)));
        }

        let v: Value = resp.json().await?;
        if let Some(first) = v["embeddings"].as_array().and_then(|e| e.first()).and_then(|e| e.as_array()) {
            return parse_vector(first, "Ollama");
        }
        // Some Ollama versions return singular "embedding"
        if let Some(embedding) = v["embedding"].as_array() {
            return parse_vector(embedding, "Ollama");
        }
        Err(EngineError::Embedding("No 'embeddings' array in Ollama response".into()))
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str, model: &str) -> EngineResult<Vec<f32>> {
        debug!("[embedding] Embedding {} chars with '{}'", text.len(), model);
        let openai_err = match self.embed_openai(text, model).await {
            Ok(vec) => return Ok(vec),
            Err(e) => e,
        };
        info!("[embedding] OpenAI format failed ({}) — trying Ollama", openai_err);

        match self.embed_ollama(text, model).await {
            Ok(vec) => Ok(vec),
            Err(ollama_err) => Err(EngineError::Embedding(format!(
                "Embedding failed. OpenAI: {} | Ollama: {}",
                openai_err, ollama_err
            ))),
        }
    }
}

fn parse_vector(values: &[Value], source: &str) -> EngineResult<Vec<f32>> {
    let vec: Vec<f32> = values.iter().filter_map(|v| v.as_f64().map(|f| f as f32)).collect();
    if vec.is_empty() {
        return Err(EngineError::Embedding(format!("Empty embedding vector from {}", source)));
    }
    if vec.len() != values.len() {
        return Err(EngineError::Embedding(format!("Non-numeric component in {} embedding", source)));
    }
    Ok(vec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_vector_rejects_empty_and_non_numeric() {
        assert!(parse_vector(&[], "test").is_err());
        assert!(parse_vector(&[json!(0.5), json!("x")], "test").is_err());
        assert_eq!(parse_vector(&[json!(0.5), json!(1)], "test").unwrap(), vec![0.5, 1.0]);
    }
}
