//! HTTP-backed effort estimator
//!
//! One batched completion request per planning run. The response must be a
//! JSON array of `{id, hours, reasoning}` objects; hours are snapped to the
//! fixed estimate choices. Responses wrapped in markdown fences or prose are
//! salvaged by extracting the outermost JSON array.

use super::{snap_to_choice, EffortEstimate, EffortEstimator, TaskDescriptor};
use crate::config::{EstimatorConfig, EstimatorProvider};
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::json;
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are an engineering effort estimator. For each task in the input array, return a JSON array with one object per task: {\"id\": string, \"hours\": number, \"reasoning\": string}. hours must be one of 0.5, 1, 2, 4, 8. reasoning is one short sentence. Return only JSON.";

/// Create the default HTTP-backed estimator from configuration.
pub fn create_estimator(config: &EstimatorConfig) -> Result<Box<dyn EffortEstimator>> {
    Ok(Box::new(HttpEstimatorClient::new(config)?))
}

/// Effort estimator backed by an LLM completion endpoint.
pub struct HttpEstimatorClient {
    model: String,
    provider: EstimatorProvider,
    endpoint: String,
    api_key: Option<String>,
    runtime: tokio::runtime::Runtime,
    http: reqwest::Client,
}

impl HttpEstimatorClient {
    pub fn new(config: &EstimatorConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| config.provider.default_endpoint().to_string());
        let api_key = match config.provider {
            EstimatorProvider::Ollama => None,
            EstimatorProvider::Claude => config
                .api_key
                .clone()
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok()),
            EstimatorProvider::OpenAI => config
                .api_key
                .clone()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok()),
        };

        if matches!(
            config.provider,
            EstimatorProvider::Claude | EstimatorProvider::OpenAI
        ) && api_key.is_none()
        {
            return Err(Error::Config(
                "estimator.api_key (or provider env var) is required".to_string(),
            ));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Estimator(format!("failed to build tokio runtime: {e}")))?;
        let timeout_secs = config.timeout_secs.max(1);
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Estimator(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            model: config.model.clone(),
            provider: config.provider,
            endpoint,
            api_key,
            runtime,
            http,
        })
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        self.runtime.block_on(async {
            match self.provider {
                EstimatorProvider::Ollama => {
                    let url = format!("{}/api/generate", self.endpoint.trim_end_matches('/'));
                    let resp = self
                        .http
                        .post(url)
                        .json(&json!({
                            "model": self.model,
                            "prompt": prompt,
                            "stream": false,
                        }))
                        .send()
                        .await
                        .map_err(|e| Error::Estimator(format!("ollama request failed: {e}")))?;
                    let status = resp.status();
                    let body = resp
                        .text()
                        .await
                        .map_err(|e| Error::Estimator(format!("ollama read body failed: {e}")))?;
                    if !status.is_success() {
                        return Err(Error::Estimator(format!(
                            "ollama returned {}: {}",
                            status.as_u16(),
                            body
                        )));
                    }
                    let json: serde_json::Value = serde_json::from_str(&body)?;
                    json.get("response")
                        .and_then(|v| v.as_str())
                        .map(ToString::to_string)
                        .ok_or_else(|| {
                            Error::Estimator(
                                "ollama response missing string field `response`".to_string(),
                            )
                        })
                }
                EstimatorProvider::Claude => {
                    let url = format!("{}/v1/messages", self.endpoint.trim_end_matches('/'));
                    let mut headers = HeaderMap::new();
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                    headers.insert(
                        "x-api-key",
                        HeaderValue::from_str(self.api_key.as_deref().unwrap_or_default())
                            .map_err(|e| {
                                Error::Estimator(format!("invalid claude api key header: {e}"))
                            })?,
                    );
                    headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));

                    let resp = self
                        .http
                        .post(url)
                        .headers(headers)
                        .json(&json!({
                            "model": self.model,
                            "max_tokens": 1024,
                            "temperature": 0,
                            "system": SYSTEM_PROMPT,
                            "messages": [{ "role": "user", "content": prompt }],
                        }))
                        .send()
                        .await
                        .map_err(|e| Error::Estimator(format!("claude request failed: {e}")))?;
                    let status = resp.status();
                    let body = resp
                        .text()
                        .await
                        .map_err(|e| Error::Estimator(format!("claude read body failed: {e}")))?;
                    if !status.is_success() {
                        return Err(Error::Estimator(format!(
                            "claude returned {}: {}",
                            status.as_u16(),
                            body
                        )));
                    }
                    let json: serde_json::Value = serde_json::from_str(&body)?;
                    json.get("content")
                        .and_then(|v| v.as_array())
                        .and_then(|arr| arr.first())
                        .and_then(|v| v.get("text"))
                        .and_then(|v| v.as_str())
                        .map(ToString::to_string)
                        .ok_or_else(|| {
                            Error::Estimator("claude response missing content[0].text".to_string())
                        })
                }
                EstimatorProvider::OpenAI => {
                    let url = format!(
                        "{}/v1/chat/completions",
                        self.endpoint.trim_end_matches('/')
                    );
                    let mut headers = HeaderMap::new();
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                    headers.insert(
                        AUTHORIZATION,
                        HeaderValue::from_str(&format!(
                            "Bearer {}",
                            self.api_key.as_deref().unwrap_or_default()
                        ))
                        .map_err(|e| Error::Estimator(format!("invalid auth header: {e}")))?,
                    );

                    let resp = self
                        .http
                        .post(url)
                        .headers(headers)
                        .json(&json!({
                            "model": self.model,
                            "temperature": 0,
                            "messages": [
                                { "role": "system", "content": SYSTEM_PROMPT },
                                { "role": "user", "content": prompt }
                            ]
                        }))
                        .send()
                        .await
                        .map_err(|e| Error::Estimator(format!("openai request failed: {e}")))?;
                    let status = resp.status();
                    let body = resp
                        .text()
                        .await
                        .map_err(|e| Error::Estimator(format!("openai read body failed: {e}")))?;
                    if !status.is_success() {
                        return Err(Error::Estimator(format!(
                            "openai returned {}: {}",
                            status.as_u16(),
                            body
                        )));
                    }
                    let json: serde_json::Value = serde_json::from_str(&body)?;
                    json.get("choices")
                        .and_then(|v| v.as_array())
                        .and_then(|arr| arr.first())
                        .and_then(|v| v.get("message"))
                        .and_then(|v| v.get("content"))
                        .and_then(|v| v.as_str())
                        .map(ToString::to_string)
                        .ok_or_else(|| {
                            Error::Estimator(
                                "openai response missing choices[0].message.content".to_string(),
                            )
                        })
                }
            }
        })
    }
}

impl EffortEstimator for HttpEstimatorClient {
    fn name(&self) -> &'static str {
        "llm"
    }

    fn estimate_batch(&self, tasks: &[TaskDescriptor]) -> Result<Vec<EffortEstimate>> {
        if tasks.is_empty() {
            return Ok(vec![]);
        }

        let prompt = build_prompt(tasks)?;
        tracing::debug!(tasks = tasks.len(), "Requesting effort estimates");
        let raw = self.complete(&prompt)?;
        parse_estimates(&raw)
    }
}

fn build_prompt(tasks: &[TaskDescriptor]) -> Result<String> {
    let payload = serde_json::to_string_pretty(tasks)?;
    Ok(format!(
        "{SYSTEM_PROMPT}\n\nTasks:\n{payload}\n\nReturn only the JSON array."
    ))
}

/// Parse the oracle response into estimates, snapping hours to the fixed
/// choices and skipping entries without a usable id or hours value.
pub(crate) fn parse_estimates(raw: &str) -> Result<Vec<EffortEstimate>> {
    let parsed = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => value,
        Err(_) => {
            let extracted = extract_json_array(raw)?;
            serde_json::from_str::<serde_json::Value>(&extracted)?
        }
    };

    // Accept either a bare array or an object wrapping one
    let entries = match &parsed {
        serde_json::Value::Array(entries) => entries.clone(),
        serde_json::Value::Object(obj) => obj
            .get("estimates")
            .and_then(|v| v.as_array())
            .cloned()
            .ok_or_else(|| {
                Error::Estimator("estimator response missing `estimates` array".to_string())
            })?,
        _ => {
            return Err(Error::Estimator(
                "estimator response must be a JSON array".to_string(),
            ))
        }
    };

    let mut estimates = Vec::with_capacity(entries.len());
    for entry in entries {
        let id = entry.get("id").and_then(|v| v.as_str());
        let hours = entry.get("hours").and_then(|v| v.as_f64());
        let (id, hours) = match (id, hours) {
            (Some(id), Some(hours)) if hours.is_finite() && hours > 0.0 => (id, hours),
            _ => {
                tracing::warn!(entry = %entry, "Skipping malformed estimate entry");
                continue;
            }
        };
        let reasoning = entry
            .get("reasoning")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        estimates.push(EffortEstimate {
            id: id.to_string(),
            hours: snap_to_choice(hours),
            reasoning,
        });
    }

    Ok(estimates)
}

fn extract_json_array(raw: &str) -> Result<String> {
    let start = raw.find('[').ok_or_else(|| {
        Error::Estimator("estimator response did not contain a JSON array".to_string())
    })?;
    let end = raw.rfind(']').ok_or_else(|| {
        Error::Estimator("estimator response did not contain a JSON array".to_string())
    })?;
    if end <= start {
        return Err(Error::Estimator(
            "estimator response JSON bounds are invalid".to_string(),
        ));
    }
    Ok(raw[start..=end].to_string())
}
