//! HTTP client for an Ollama-style `/api/generate` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};

use super::{FlowError, FlowRequest, LlmBackend};
use crate::Config;

// ---

/// Longest slice of an error body kept in a [`FlowError::Service`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Clone)]
pub struct HttpLlmBackend {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    format: &'static str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateReply {
    response: String,
}

impl HttpLlmBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        // ---
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("codemetal-sitetwin/0.1"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            client,
        })
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Self::new(
            cfg.llm_api_url.clone(),
            cfg.llm_model.clone(),
            cfg.llm_api_key.clone(),
            cfg.llm_timeout,
        )
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmBackend for HttpLlmBackend {
    async fn generate(&self, request: &FlowRequest) -> Result<String, FlowError> {
        // ---
        let body = GenerateBody {
            model: &self.model,
            system: request.system,
            prompt: &request.prompt,
            format: "json",
            stream: false,
        };

        tracing::debug!(flow = request.flow, model = %self.model, "POST {}", self.generate_url());

        let mut call = self.client.post(self.generate_url()).json(&body);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }

        let resp = call.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let mut text = resp.text().await.unwrap_or_default();
            if text.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
            }
            tracing::warn!(flow = request.flow, status = status.as_u16(), "Model backend rejected request");
            return Err(FlowError::Service {
                status: status.as_u16(),
                body: text,
            });
        }

        let reply: GenerateReply = resp
            .json()
            .await
            .map_err(|e| FlowError::MalformedOutput(format!("unexpected backend reply: {}", e)))?;

        Ok(reply.response)
    }
}
