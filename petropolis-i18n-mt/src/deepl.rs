//! DeepL API provider
//!
//! Talks to the DeepL v2 `/translate` endpoint.
//!
//! # Authentication
//!
//! The provider loads the API key from the `DEEPL_API_KEY` environment
//! variable. Keys ending in `:fx` belong to the free plan and are sent to
//! `api-free.deepl.com`; all others go to `api.deepl.com`. `DEEPL_API_URL`
//! overrides the base URL (useful for proxies and test servers).
//!
//! # Example
//!
//! ```ignore
//! use petropolis_i18n_mt::{DeeplProvider, TagHandling, Translator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = DeeplProvider::from_env()?;
//!     let texts = vec!["Coal mine".to_string(), "Gas field".to_string()];
//!     let results = provider
//!         .translate_batch(&texts, None, "es", TagHandling::None)
//!         .await?;
//!     println!("{:?}", results);
//!     Ok(())
//! }
//! ```

use crate::error::{MtError, MtResult};
use crate::translator::{TagHandling, Translator};
use async_trait::async_trait;
use petropolis_i18n::{base_language, validate_language};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const FREE_API_URL: &str = "https://api-free.deepl.com/v2";
const PRO_API_URL: &str = "https://api.deepl.com/v2";

/// DeepL API v2 provider
#[derive(Clone)]
pub struct DeeplProvider {
    /// API key for authentication
    api_key: String,
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Base URL, without the `/translate` suffix
    base_url: String,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a [String],
    target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag_handling: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<TranslationItem>,
}

#[derive(Debug, Deserialize)]
struct TranslationItem {
    text: String,
}

impl DeeplProvider {
    /// Maximum number of texts per API request
    const MAX_BATCH_SIZE: usize = 50;

    /// Maximum total request body size accepted by DeepL
    const MAX_REQUEST_BYTES: usize = 128 * 1024;

    /// Room left in each request for everything but the texts
    const BODY_OVERHEAD: usize = 1024;

    /// Create a provider with an explicit API key
    ///
    /// The endpoint is picked from the key's plan.
    pub fn new(api_key: String) -> MtResult<Self> {
        let base_url = if api_key.trim_end().ends_with(":fx") {
            FREE_API_URL
        } else {
            PRO_API_URL
        };
        Self::with_base_url(api_key, base_url.to_string())
    }

    /// Create a provider that sends requests to `base_url`
    pub fn with_base_url(api_key: String, base_url: String) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.trim().to_string(),
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a provider from `DEEPL_API_KEY` (and optionally `DEEPL_API_URL`)
    pub fn from_env() -> MtResult<Self> {
        let api_key = std::env::var("DEEPL_API_KEY").map_err(|_| {
            MtError::ConfigError("DEEPL_API_KEY environment variable not set".to_string())
        })?;

        match std::env::var("DEEPL_API_URL") {
            Ok(url) if !url.trim().is_empty() => Self::with_base_url(api_key, url),
            _ => Self::new(api_key),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Split texts into request-sized chunks
    ///
    /// A chunk closes at [`Self::MAX_BATCH_SIZE`] texts or once its JSON body
    /// would exceed [`Self::MAX_REQUEST_BYTES`]. A single oversized text still
    /// gets its own chunk and is left for the API to reject.
    fn chunk_batch(texts: &[String]) -> Vec<&[String]> {
        let budget = Self::MAX_REQUEST_BYTES - Self::BODY_OVERHEAD;
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut bytes = 0;

        for (i, text) in texts.iter().enumerate() {
            let size = encoded_len(text);
            let full = i - start >= Self::MAX_BATCH_SIZE;
            let too_big = i > start && bytes + size > budget;
            if full || too_big {
                chunks.push(&texts[start..i]);
                start = i;
                bytes = 0;
            }
            bytes += size;
        }

        if start < texts.len() {
            chunks.push(&texts[start..]);
        }
        chunks
    }

    fn request_body<'a>(
        texts: &'a [String],
        source: Option<&str>,
        target: &str,
        tag_handling: TagHandling,
    ) -> TranslateRequest<'a> {
        TranslateRequest {
            text: texts,
            target_lang: target.replace('_', "-").to_uppercase(),
            source_lang: source.map(|s| base_language(s).to_uppercase()),
            tag_handling: tag_handling.as_param(),
        }
    }

    /// Translate a single chunk via the API
    async fn translate_chunk(
        &self,
        texts: &[String],
        source: Option<&str>,
        target: &str,
        tag_handling: TagHandling,
    ) -> MtResult<Vec<String>> {
        let url = format!("{}/translate", self.base_url);
        let body = Self::request_body(texts, source, target, tag_handling);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_status(status, error_text));
        }

        let parsed: TranslateResponse = response.json().await.map_err(|e| {
            MtError::TranslationError(format!("Failed to parse API response: {}", e))
        })?;

        if parsed.translations.len() != texts.len() {
            return Err(MtError::TranslationError(format!(
                "API returned {} translations for {} texts",
                parsed.translations.len(),
                texts.len()
            )));
        }

        Ok(parsed.translations.into_iter().map(|t| t.text).collect())
    }
}

/// Bytes a text takes in the `text` array: quoted, escaped, plus a separator
fn encoded_len(text: &str) -> usize {
    let escaped: usize = text
        .chars()
        .map(|c| match c {
            '"' | '\\' | '\n' | '\r' | '\t' | '\u{08}' | '\u{0c}' => 2,
            c if (c as u32) < 0x20 => 6,
            c => c.len_utf8(),
        })
        .sum();
    escaped + 3
}

fn classify_status(status: StatusCode, body: String) -> MtError {
    match status.as_u16() {
        429 => MtError::RateLimited(body),
        456 => MtError::QuotaExceeded(body),
        400..=499 => MtError::ConfigError(format!("API client error ({}): {}", status, body)),
        _ => MtError::TranslationError(format!("API server error ({}): {}", status, body)),
    }
}

impl std::fmt::Debug for DeeplProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeeplProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl Translator for DeeplProvider {
    async fn translate_batch(
        &self,
        texts: &[String],
        source: Option<&str>,
        target: &str,
        tag_handling: TagHandling,
    ) -> MtResult<Vec<String>> {
        if let Some(source) = source {
            validate_language(source)?;
        }
        validate_language(target)?;

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_results = Vec::with_capacity(texts.len());
        for chunk in Self::chunk_batch(texts) {
            let chunk_results = self
                .translate_chunk(chunk, source, target, tag_handling)
                .await?;
            all_results.extend(chunk_results);
        }

        Ok(all_results)
    }

    fn provider_name(&self) -> &str {
        "DeepL"
    }
}
