//! Translation provider trait
//!
//! The bulk pipeline and the single-content endpoint only see a
//! [`Translator`]; which provider sits behind it (DeepL, a mock) is decided
//! where the service is wired up.
//!
//! # Example
//!
//! ```ignore
//! use petropolis_i18n_mt::{DeeplProvider, TagHandling, Translator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = DeeplProvider::from_env()?;
//!
//!     let result = provider
//!         .translate("Oil refinery", None, "es", TagHandling::None)
//!         .await?;
//!     println!("{}", result); // "Refinería de petróleo"
//!
//!     let texts = vec![r#"<e k="name">Oil refinery</e>"#.to_string()];
//!     let results = provider
//!         .translate_batch(&texts, Some("en"), "pt-BR", TagHandling::Xml)
//!         .await?;
//!     println!("{:?}", results);
//!
//!     Ok(())
//! }
//! ```

use crate::error::MtResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// How the provider treats tags in the submitted text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagHandling {
    /// Plain text
    None,
    /// Tags are kept verbatim and their content translated
    Xml,
    /// Like `Xml`, with HTML parsing rules
    #[default]
    Html,
}

impl TagHandling {
    pub fn is_markup(self) -> bool {
        !matches!(self, TagHandling::None)
    }

    /// Value for the provider's `tag_handling` parameter
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            TagHandling::None => None,
            TagHandling::Xml => Some("xml"),
            TagHandling::Html => Some("html"),
        }
    }
}

/// Generic trait for translation providers
///
/// Implementations handle the actual translation work, whether through an API
/// (DeepL) or deterministic logic (Mock). They hold no per-call state, so one
/// instance can be shared across requests.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate multiple strings in a single batch operation
    ///
    /// # Arguments
    ///
    /// * `texts` - Strings to translate
    /// * `source` - Source language code, or `None` to let the provider detect it
    /// * `target` - Target language code as the provider expects it (e.g. "pt-BR")
    /// * `tag_handling` - Whether `texts` carry markup
    ///
    /// # Guarantees
    ///
    /// - Output order matches input order
    /// - Output length equals input length
    async fn translate_batch(
        &self,
        texts: &[String],
        source: Option<&str>,
        target: &str,
        tag_handling: TagHandling,
    ) -> MtResult<Vec<String>>;

    /// Translate a single string
    async fn translate(
        &self,
        text: &str,
        source: Option<&str>,
        target: &str,
        tag_handling: TagHandling,
    ) -> MtResult<String> {
        let results = self
            .translate_batch(&[text.to_string()], source, target, tag_handling)
            .await?;
        Ok(results.into_iter().next().unwrap_or_default())
    }

    /// Name used in logs
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_handling_params() {
        assert_eq!(TagHandling::None.as_param(), None);
        assert_eq!(TagHandling::Xml.as_param(), Some("xml"));
        assert_eq!(TagHandling::Html.as_param(), Some("html"));
        assert!(!TagHandling::None.is_markup());
        assert!(TagHandling::Xml.is_markup());
    }

    #[test]
    fn test_tag_handling_serde() {
        assert_eq!(TagHandling::default(), TagHandling::Html);
        let parsed: TagHandling = serde_json::from_str("\"xml\"").unwrap();
        assert_eq!(parsed, TagHandling::Xml);
        assert_eq!(serde_json::to_string(&TagHandling::None).unwrap(), "\"none\"");
    }
}
