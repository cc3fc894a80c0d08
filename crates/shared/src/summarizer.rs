use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Input is split into windows of this many characters. The cut is not
/// sentence- or token-aware and can land mid-word; downstream tooling
/// depends on these exact boundaries.
pub const CHUNK_SIZE: usize = 1000;

/// Output bounds passed to the summarization model for every chunk.
pub const MAX_SUMMARY_LENGTH: u32 = 150;
pub const MIN_SUMMARY_LENGTH: u32 = 30;

/// Abstractive summarization capability. The model behind it is a
/// configuration detail; implementations must be deterministic (no
/// sampling).
#[async_trait]
pub trait Summarize {
    async fn summarize(&self, text: &str, max_length: u32, min_length: u32) -> Result<String>;
}

/// Split text into fixed-size character windows. The final window holds
/// whatever remains.
pub fn split_into_chunks(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(CHUNK_SIZE)
        .map(|window| window.iter().collect())
        .collect()
}

/// Summarize arbitrary-length text chunk by chunk.
///
/// Blank chunks are skipped. A chunk whose summarization fails is kept
/// verbatim in the output sequence rather than dropped; no chunk failure
/// is fatal. Per-chunk results are joined with a single space in the
/// original order.
pub async fn summarize_text<S: Summarize + ?Sized>(provider: &S, text: &str) -> String {
    let mut summaries = Vec::new();

    for chunk in split_into_chunks(text) {
        if chunk.trim().is_empty() {
            continue;
        }

        match provider
            .summarize(&chunk, MAX_SUMMARY_LENGTH, MIN_SUMMARY_LENGTH)
            .await
        {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                warn!("Failed to summarize chunk, keeping original text: {}", e);
                summaries.push(chunk);
            }
        }
    }

    summaries.join(" ")
}

#[derive(Serialize)]
struct HfRequest {
    inputs: String,
    parameters: HfParameters,
}

#[derive(Serialize)]
struct HfParameters {
    max_length: u32,
    min_length: u32,
    do_sample: bool,
}

#[derive(Deserialize)]
struct HfSummary {
    summary_text: String,
}

/// Hugging Face Inference API client for abstractive summarization.
pub struct HfSummarizer {
    client: Client,
    api_token: String,
    model: String,
}

impl HfSummarizer {
    pub fn new(api_token: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_token,
            model,
        })
    }
}

#[async_trait]
impl Summarize for HfSummarizer {
    async fn summarize(&self, text: &str, max_length: u32, min_length: u32) -> Result<String> {
        let request = HfRequest {
            inputs: text.to_string(),
            parameters: HfParameters {
                max_length,
                min_length,
                do_sample: false,
            },
        };

        let url = format!(
            "https://api-inference.huggingface.co/models/{}",
            self.model
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Hugging Face API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Hugging Face API error: {} - {}", status, error_text);
        }

        let summaries = response
            .json::<Vec<HfSummary>>()
            .await
            .context("Failed to parse Hugging Face API response")?;

        let summary = summaries
            .into_iter()
            .next()
            .context("Hugging Face API returned an empty response")?;

        Ok(summary.summary_text)
    }
}
