//! Text-generation inference endpoint serving a protein language model
//! (ZymCTRL by default). One request per candidate, issued concurrently.

use crate::adapters::http::ResolverClient;
use crate::domain::ports::SequenceGenerator;
use crate::utils::error::{Result, ZymeError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::task::JoinSet;

const STEP_GENERATE: &str = "Sequence generator";

#[derive(Debug, Deserialize)]
struct Completion {
    generated_text: String,
}

pub struct HttpSequenceGenerator {
    client: ResolverClient,
    endpoint: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl HttpSequenceGenerator {
    pub fn new(client: ResolverClient, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_token: None,
            timeout,
        }
    }

    /// Blank tokens (e.g. an unset `${HF_TOKEN}`) are ignored.
    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.trim().is_empty() && !t.starts_with("${"));
        self
    }

    fn request_body(seed: &str, max_length: usize) -> serde_json::Value {
        serde_json::json!({
            "inputs": seed,
            "parameters": {
                "max_length": max_length,
                "num_return_sequences": 1,
                "do_sample": true
            }
        })
    }
}

async fn complete_once(
    client: ResolverClient,
    endpoint: String,
    token: Option<String>,
    body: serde_json::Value,
    timeout: Duration,
) -> Result<String> {
    let response = client
        .post_json(&endpoint, &body, token.as_deref(), timeout)
        .await
        .map_err(|e| e.at_step(STEP_GENERATE))?;

    let completions: Vec<Completion> = response.json(STEP_GENERATE)?;
    completions
        .into_iter()
        .next()
        .map(|c| c.generated_text)
        .ok_or_else(|| ZymeError::malformed(STEP_GENERATE, "empty completion list"))
}

#[async_trait]
impl SequenceGenerator for HttpSequenceGenerator {
    async fn generate(&self, seed: &str, max_length: usize, count: usize) -> Result<Vec<String>> {
        tracing::info!(
            "🤖 Requesting {} completions (max_length={}) from generator",
            count,
            max_length
        );

        let mut tasks = JoinSet::new();
        for slot in 0..count {
            let client = self.client.clone();
            let endpoint = self.endpoint.clone();
            let token = self.api_token.clone();
            let body = Self::request_body(seed, max_length);
            let timeout = self.timeout;
            tasks.spawn(async move {
                (slot, complete_once(client, endpoint, token, body, timeout).await)
            });
        }

        let mut outputs: Vec<Option<String>> = vec![None; count];
        while let Some(joined) = tasks.join_next().await {
            let (slot, result) = joined.map_err(|e| ZymeError::Generation {
                message: format!("generation task aborted: {}", e),
            })?;
            match result {
                Ok(text) => outputs[slot] = Some(text),
                Err(e) => {
                    tasks.abort_all();
                    return Err(ZymeError::Generation {
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(outputs.into_iter().flatten().collect())
    }
}
