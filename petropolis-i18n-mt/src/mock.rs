//! Mock translator for testing
//!
//! Deterministic, API-free provider. It understands the `<e>` markup used by
//! the bulk pipeline: with tag handling on, transformations apply to element
//! text and leave tags and attributes alone, which is what a real provider does.
//!
//! # Example
//!
//! ```ignore
//! use petropolis_i18n_mt::{MockMode, MockTranslator, TagHandling, Translator};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", None, "es", TagHandling::None).await.unwrap();
//!     assert_eq!(result, "hello_es");
//! }
//! ```

use crate::error::{MtError, MtResult};
use crate::translator::{TagHandling, Translator};
use async_trait::async_trait;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicUsize, Ordering};

static ELEMENT_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(<[^/>][^>]*>)([^<]+)(</)").expect("valid element text regex"));

static ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<e\b[^>]*?/>|<e\b[^>/]*>.*?</e>").expect("valid element regex")
});

/// Mock translation modes
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append the target: "hello" → "hello_es"
    Suffix,

    /// Predefined (text, target) → translation, falling back to `Suffix`
    Mappings(HashMap<(String, String), String>),

    /// Reverse word order, or element order for markup
    Reorder,

    /// Fail every call with this message
    Error(String),

    /// Return input unchanged
    NoOp,
}

/// Mock translator that simulates various provider behaviours
#[derive(Debug)]
pub struct MockTranslator {
    mode: MockMode,
    calls: AtomicUsize,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `translate_batch` calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn translate_plain(&self, text: &str, target: &str) -> String {
        match &self.mode {
            MockMode::Suffix => format!("{}_{}", text, target),
            MockMode::Mappings(map) => map
                .get(&(text.to_string(), target.to_string()))
                .cloned()
                .unwrap_or_else(|| format!("{}_{}", text, target)),
            MockMode::Reorder => text.split_whitespace().rev().collect::<Vec<_>>().join(" "),
            MockMode::Error(_) | MockMode::NoOp => text.to_string(),
        }
    }

    fn translate_markup(&self, text: &str, target: &str) -> String {
        match &self.mode {
            MockMode::Reorder => {
                let elements: Vec<&str> = ELEMENT.find_iter(text).map(|m| m.as_str()).collect();
                elements.into_iter().rev().collect()
            }
            MockMode::NoOp => text.to_string(),
            _ => ELEMENT_TEXT
                .replace_all(text, |caps: &Captures<'_>| {
                    format!(
                        "{}{}{}",
                        &caps[1],
                        self.translate_plain(&caps[2], target),
                        &caps[3]
                    )
                })
                .into_owned(),
        }
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate_batch(
        &self,
        texts: &[String],
        _source: Option<&str>,
        target: &str,
        tag_handling: TagHandling,
    ) -> MtResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let MockMode::Error(msg) = &self.mode {
            return Err(MtError::TranslationError(msg.clone()));
        }

        Ok(texts
            .iter()
            .map(|text| {
                if tag_handling.is_markup() {
                    self.translate_markup(text, target)
                } else {
                    self.translate_plain(text, target)
                }
            })
            .collect())
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
