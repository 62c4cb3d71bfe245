//! Language codes used by the Petropolis site
//!
//! The site is published in a fixed set of languages. Each short code maps to
//! the variant the translation provider expects as a *target* (DeepL rejects a
//! bare `en` or `pt` target and wants the regional form).
//!
//! # Example
//!
//! ```
//! use petropolis_i18n::language::{provider_variant, target_languages};
//!
//! assert_eq!(provider_variant("pt"), "pt-BR");
//! assert_eq!(target_languages(Some("en")), vec!["es", "pt"]);
//! ```

use icu_locale::Locale;
use thiserror::Error;

/// Short code → provider target variant, in publication order
pub const LANGUAGE_VARIANTS: &[(&str, &str)] = &[("en", "en-US"), ("es", "es"), ("pt", "pt-BR")];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LanguageError {
    #[error("language code is empty")]
    Empty,
    #[error("invalid language code '{0}'")]
    Invalid(String),
}

/// Map a short code to the provider variant
///
/// Codes outside [`LANGUAGE_VARIANTS`] (including already-expanded variants
/// such as `en-GB`) pass through unchanged.
pub fn provider_variant(code: &str) -> &str {
    LANGUAGE_VARIANTS
        .iter()
        .find(|(short, _)| *short == code)
        .map(|(_, variant)| *variant)
        .unwrap_or(code)
}

/// Short codes a bulk run translates into
///
/// With a source language, every code containing it is skipped, so
/// `Some("en")` drops `en` and `Some("p")` would drop `pt`.
pub fn target_languages(source: Option<&str>) -> Vec<&'static str> {
    LANGUAGE_VARIANTS
        .iter()
        .map(|(short, _)| *short)
        .filter(|short| match source {
            Some(source) if !source.is_empty() => !short.contains(source),
            _ => true,
        })
        .collect()
}

/// Strip region and script information
///
/// - `en-US` → `en`
/// - `pt_BR` → `pt`
/// - `ES` → `es`
pub fn base_language(code: &str) -> String {
    code.split(['-', '_'])
        .next()
        .unwrap_or(code)
        .to_lowercase()
}

/// Check that a code is a well-formed BCP 47 language identifier
pub fn validate_language(code: &str) -> Result<(), LanguageError> {
    if code.trim().is_empty() {
        return Err(LanguageError::Empty);
    }

    code.replace('_', "-")
        .parse::<Locale>()
        .map(|_| ())
        .map_err(|_| LanguageError::Invalid(code.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_variant_known_codes() {
        assert_eq!(provider_variant("en"), "en-US");
        assert_eq!(provider_variant("es"), "es");
        assert_eq!(provider_variant("pt"), "pt-BR");
    }

    #[test]
    fn test_provider_variant_passthrough() {
        assert_eq!(provider_variant("fr"), "fr");
        assert_eq!(provider_variant("en-GB"), "en-GB");
    }

    #[test]
    fn test_target_languages_without_source() {
        assert_eq!(target_languages(None), vec!["en", "es", "pt"]);
        assert_eq!(target_languages(Some("")), vec!["en", "es", "pt"]);
    }

    #[test]
    fn test_target_languages_excludes_source() {
        assert_eq!(target_languages(Some("en")), vec!["es", "pt"]);
        assert_eq!(target_languages(Some("pt")), vec!["en", "es"]);
        assert_eq!(target_languages(Some("de")), vec!["en", "es", "pt"]);
    }

    #[test]
    fn test_base_language() {
        assert_eq!(base_language("en-US"), "en");
        assert_eq!(base_language("pt_BR"), "pt");
        assert_eq!(base_language("ES"), "es");
    }

    #[test]
    fn test_validate_language() {
        assert!(validate_language("en").is_ok());
        assert!(validate_language("pt-BR").is_ok());
        assert!(validate_language("pt_BR").is_ok());
        assert_eq!(validate_language(""), Err(LanguageError::Empty));
        assert!(matches!(
            validate_language("en@US"),
            Err(LanguageError::Invalid(_))
        ));
    }
}
