use petropolis_i18n::LanguageError;

/// Error types for translation providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MtError {
    /// Language code rejected before any request was made
    InvalidLanguage(String),
    /// Missing or rejected credentials, bad request parameters
    ConfigError(String),
    /// Transport failure talking to the provider
    NetworkError(String),
    /// Provider asked us to slow down
    RateLimited(String),
    /// Character quota for the billing period is used up
    QuotaExceeded(String),
    /// Provider failed or answered with something unusable
    TranslationError(String),
}

impl std::fmt::Display for MtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MtError::InvalidLanguage(msg) => write!(f, "Invalid language: {}", msg),
            MtError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            MtError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            MtError::RateLimited(msg) => write!(f, "Rate limited: {}", msg),
            MtError::QuotaExceeded(msg) => write!(f, "Quota exceeded: {}", msg),
            MtError::TranslationError(msg) => write!(f, "Translation error: {}", msg),
        }
    }
}

impl std::error::Error for MtError {}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        MtError::NetworkError(err.to_string())
    }
}

impl From<LanguageError> for MtError {
    fn from(err: LanguageError) -> Self {
        MtError::InvalidLanguage(err.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
