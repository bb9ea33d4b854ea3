//! Client for a hosted inference endpoint serving both oracles.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Sentiment, SentimentClassifier, SentimentLabel, Summarizer};
use crate::config::PipelineConfig;
use crate::error::{Error, OracleError, Result};

/// HTTP client for a Hugging Face style inference endpoint.
///
/// Requests go to `POST {endpoint}/models/{model}`. One client serves both
/// the summarization and the sentiment model.
pub struct InferenceClient {
    endpoint: String,
    summary_model: String,
    sentiment_model: String,
    api_token: Option<String>,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl InferenceClient {
    /// Create a client with the given endpoint, models and per-call timeout.
    pub fn new(
        endpoint: &str,
        summary_model: &str,
        sentiment_model: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            summary_model: summary_model.to_string(),
            sentiment_model: sentiment_model.to_string(),
            api_token: None,
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Build a client from pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let mut client = Self::new(
            &config.endpoint,
            &config.summary_model,
            &config.sentiment_model,
            config.oracle_timeout,
        )?;
        client.api_token = config.api_token.clone();
        Ok(client)
    }

    fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        model: &str,
        body: &B,
    ) -> std::result::Result<R, OracleError> {
        let url = format!("{}/models/{}", self.endpoint, model);
        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                OracleError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                OracleError::Connection(self.endpoint.clone())
            } else {
                OracleError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(OracleError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| {
            let snippet: String = body.chars().take(200).collect();
            OracleError::Response(format!("{e}: {snippet}"))
        })
    }
}

/// Request body shared by both models.
#[derive(Serialize)]
struct InferenceRequest<'a, P: Serialize> {
    inputs: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<P>,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Serialize)]
struct SummaryParameters {
    min_length: usize,
    max_length: usize,
    do_sample: bool,
}

#[derive(Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

/// Text classification comes back nested per input or flat, depending on the
/// server.
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationResponse {
    fn best(self) -> Option<LabelScore> {
        let candidates = match self {
            ClassificationResponse::Nested(outer) => outer.into_iter().next().unwrap_or_default(),
            ClassificationResponse::Flat(flat) => flat,
        };
        candidates
            .into_iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
    }
}

impl Summarizer for InferenceClient {
    fn summarize(
        &self,
        text: &str,
        min_words: usize,
        max_words: usize,
    ) -> std::result::Result<String, OracleError> {
        if text.trim().is_empty() {
            return Err(OracleError::EmptyInput);
        }

        let body = InferenceRequest {
            inputs: text,
            parameters: Some(SummaryParameters {
                min_length: min_words,
                max_length: max_words.max(min_words),
                do_sample: false,
            }),
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let output: Vec<SummaryOutput> = self.post(&self.summary_model, &body)?;
        output
            .into_iter()
            .next()
            .map(|o| o.summary_text.trim().to_string())
            .ok_or_else(|| OracleError::Response("empty summarization result".to_string()))
    }
}

impl SentimentClassifier for InferenceClient {
    fn classify(&self, text: &str) -> std::result::Result<Sentiment, OracleError> {
        if text.trim().is_empty() {
            return Err(OracleError::EmptyInput);
        }

        let body: InferenceRequest<'_, ()> = InferenceRequest {
            inputs: text,
            parameters: None,
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let response: ClassificationResponse = self.post(&self.sentiment_model, &body)?;
        let best = response
            .best()
            .ok_or_else(|| OracleError::Response("empty classification result".to_string()))?;

        Ok(Sentiment::new(SentimentLabel::parse(&best.label), best.score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_nested_response() {
        let json = r#"[[{"label":"NEGATIVE","score":0.1},{"label":"POSITIVE","score":0.9}]]"#;
        let response: ClassificationResponse = serde_json::from_str(json).unwrap();
        let best = response.best().unwrap();
        assert_eq!(best.label, "POSITIVE");
        assert!((best.score - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_classification_flat_response() {
        let json = r#"[{"label":"NEGATIVE","score":0.8},{"label":"POSITIVE","score":0.2}]"#;
        let response: ClassificationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.best().unwrap().label, "NEGATIVE");
    }

    #[test]
    fn test_summary_request_shape() {
        let body = InferenceRequest {
            inputs: "some text",
            parameters: Some(SummaryParameters {
                min_length: 15,
                max_length: 20,
                do_sample: false,
            }),
            options: InferenceOptions {
                wait_for_model: true,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["inputs"], "some text");
        assert_eq!(value["parameters"]["min_length"], 15);
        assert_eq!(value["parameters"]["max_length"], 20);
        assert_eq!(value["parameters"]["do_sample"], false);
        assert_eq!(value["options"]["wait_for_model"], true);
    }

    #[test]
    fn test_empty_input_rejected_without_request() {
        let client = InferenceClient::new(
            "http://127.0.0.1:9",
            "summary-model",
            "sentiment-model",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.summarize("   ", 15, 20), Err(OracleError::EmptyInput));
        assert_eq!(client.classify(""), Err(OracleError::EmptyInput));
    }

    #[test]
    fn test_unreachable_endpoint_is_oracle_error() {
        let client = InferenceClient::new(
            "http://127.0.0.1:9/",
            "summary-model",
            "sentiment-model",
            Duration::from_secs(2),
        )
        .unwrap();
        assert!(client.classify("good idea").is_err());
    }
}
