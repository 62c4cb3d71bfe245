//! Single-content translation
//!
//! Used by the page editor to translate a block of HTML (or a few of them) on
//! demand. A string comes back as a string and a list as a list of the same
//! length and order.

use crate::error::{MtError, MtResult};
use crate::translator::{TagHandling, Translator};
use petropolis_i18n::provider_variant;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    pub content: Content,
    #[serde(default)]
    pub source_language: Option<String>,
    pub target_language: String,
    #[serde(default)]
    pub tag_handling: TagHandling,
}

pub async fn translate_content(
    translator: &dyn Translator,
    request: &ContentRequest,
) -> MtResult<Content> {
    let source = request
        .source_language
        .as_deref()
        .filter(|s| !s.trim().is_empty());
    let target = provider_variant(request.target_language.trim());

    match &request.content {
        Content::Text(text) => {
            let translated = translator
                .translate(text, source, target, request.tag_handling)
                .await?;
            Ok(Content::Text(translated))
        }
        Content::List(texts) => {
            let translated = translator
                .translate_batch(texts, source, target, request.tag_handling)
                .await?;
            if translated.len() != texts.len() {
                return Err(MtError::TranslationError(format!(
                    "provider returned {} texts for {}",
                    translated.len(),
                    texts.len()
                )));
            }
            Ok(Content::List(translated))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockMode, MockTranslator};
    use serde_json::json;

    fn request(value: serde_json::Value) -> ContentRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_defaults() {
        let req = request(json!({"content": "hi", "targetLanguage": "es"}));
        assert_eq!(req.content, Content::Text("hi".to_string()));
        assert_eq!(req.source_language, None);
        assert_eq!(req.tag_handling, TagHandling::Html);
    }

    #[tokio::test]
    async fn test_string_in_string_out() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let req = request(json!({
            "content": "Oil",
            "targetLanguage": "pt",
            "tagHandling": "none"
        }));
        let result = translate_content(&mock, &req).await.unwrap();
        // Target goes through the variant table
        assert_eq!(result, Content::Text("Oil_pt-BR".to_string()));
    }

    #[tokio::test]
    async fn test_list_in_list_out() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let req = request(json!({
            "content": ["<p>Coal</p>", "<p>Gas</p>"],
            "sourceLanguage": "en",
            "targetLanguage": "es"
        }));
        let result = translate_content(&mock, &req).await.unwrap();
        assert_eq!(
            result,
            Content::List(vec!["<p>Coal_es</p>".to_string(), "<p>Gas_es</p>".to_string()])
        );
        assert_eq!(serde_json::to_value(&result).unwrap(), json!(["<p>Coal_es</p>", "<p>Gas_es</p>"]));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let mock = MockTranslator::new(MockMode::Error("down".to_string()));
        let req = request(json!({"content": "x", "targetLanguage": "es"}));
        assert!(translate_content(&mock, &req).await.is_err());
    }
}
