//! HTTP inference backend
//!
//! Speaks the Hugging Face Inference API request/response shapes, which
//! self-hosted servers (text-generation-inference, local pipeline servers)
//! also accept:
//!
//! ```text
//! POST {endpoint}/models/{model}
//! {"inputs": "...", "parameters": {...}}
//! ```
//!
//! Token classification answers with `[{"entity_group", "word", "score", "start", "end"}]`,
//! summarization with `[{"summary_text": "..."}]`.

use super::{CollaboratorError, NerBackend, SummarizationBackend, SummaryRequest};
use crate::annotation::Annotation;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Connection settings for the inference server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of the inference server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Bearer token, if the server requires one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Token-classification model
    #[serde(default = "default_ner_model")]
    pub ner_model: String,
    /// Summarization model
    #[serde(default = "default_summary_model")]
    pub summary_model: String,
    /// Per-call deadline in seconds; 0 disables the deadline
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_ner_model() -> String {
    "dbmdz/bert-large-cased-finetuned-conll03-english".to_string()
}

fn default_summary_model() -> String {
    "facebook/bart-large-cnn".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_token: None,
            ner_model: default_ner_model(),
            summary_model: default_summary_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl InferenceConfig {
    /// The per-call deadline, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.endpoint.trim_end_matches('/'), model)
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a, P: Serialize> {
    inputs: &'a str,
    parameters: P,
}

/// Sub-word pieces are merged into whole entities server-side.
#[derive(Debug, Serialize)]
struct NerParameters {
    aggregation_strategy: &'static str,
}

impl Default for NerParameters {
    fn default() -> Self {
        Self {
            aggregation_strategy: "simple",
        }
    }
}

#[derive(Debug, Serialize)]
struct SummaryParameters {
    max_length: usize,
    min_length: usize,
    do_sample: bool,
}

impl From<&SummaryRequest> for SummaryParameters {
    fn from(request: &SummaryRequest) -> Self {
        Self {
            max_length: request.max_length,
            min_length: request.min_length,
            do_sample: !request.deterministic,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SummaryItem {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Both inference capabilities served from one HTTP endpoint.
pub struct HttpInferenceBackend {
    config: InferenceConfig,
    client: Client,
}

impl HttpInferenceBackend {
    pub fn new(config: InferenceConfig) -> Result<Self, CollaboratorError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CollaboratorError::Unavailable(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    async fn post<P: Serialize + Send + Sync>(
        &self,
        model: &str,
        text: &str,
        parameters: P,
    ) -> Result<String, CollaboratorError> {
        let url = self.config.model_url(model);
        debug!(url = %url, chars = text.len(), "posting inference request");

        let mut request = self.client.post(&url).json(&InferenceRequest {
            inputs: text,
            parameters,
        });
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| CollaboratorError::Unavailable(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CollaboratorError::InvocationFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        Ok(body)
    }
}

/// Map a non-2xx response to an error, preferring the server's own message.
fn status_error(status: StatusCode, body: &str) -> CollaboratorError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.chars().take(200).collect());
    let msg = format!("HTTP {}: {}", status, detail);
    if status == StatusCode::SERVICE_UNAVAILABLE {
        CollaboratorError::Unavailable(msg)
    } else {
        CollaboratorError::InvocationFailed(msg)
    }
}

fn parse_ner_response(body: &str) -> Result<Vec<Annotation>, CollaboratorError> {
    serde_json::from_str(body).map_err(|e| CollaboratorError::Parse(e.to_string()))
}

fn parse_summary_response(body: &str) -> Result<String, CollaboratorError> {
    let items: Vec<SummaryItem> =
        serde_json::from_str(body).map_err(|e| CollaboratorError::Parse(e.to_string()))?;
    items
        .into_iter()
        .next()
        .map(|item| item.summary_text)
        .ok_or_else(|| CollaboratorError::Parse("empty summarization response".to_string()))
}

#[async_trait]
impl NerBackend for HttpInferenceBackend {
    fn id(&self) -> &str {
        &self.config.ner_model
    }

    async fn annotate(&self, text: &str) -> Result<Vec<Annotation>, CollaboratorError> {
        let body = self
            .post(&self.config.ner_model, text, NerParameters::default())
            .await?;
        parse_ner_response(&body)
    }
}

#[async_trait]
impl SummarizationBackend for HttpInferenceBackend {
    fn id(&self) -> &str {
        &self.config.summary_model
    }

    async fn summarize(
        &self,
        text: &str,
        request: &SummaryRequest,
    ) -> Result<String, CollaboratorError> {
        let body = self
            .post(
                &self.config.summary_model,
                text,
                SummaryParameters::from(request),
            )
            .await?;
        parse_summary_response(&body)
    }
}
