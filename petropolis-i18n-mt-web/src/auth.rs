//! Bearer-token capability checks
//!
//! Tokens are configured as `token=cap|cap,other=cap`. A request is allowed
//! when its `Authorization: Bearer <token>` header names a known token that
//! carries the capability the route needs.

use axum::http::{HeaderMap, StatusCode, header};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Translate page content from the editor
    EditHtml,
    /// Run bulk translations of layer tables
    EditLayers,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::EditHtml => "edit_html",
            Capability::EditLayers => "edit_layers",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = TokenSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "edit_html" => Ok(Capability::EditHtml),
            "edit_layers" => Ok(Capability::EditLayers),
            other => Err(TokenSpecError(format!("unknown capability '{}'", other))),
        }
    }
}

/// Malformed token configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpecError(pub String);

impl fmt::Display for TokenSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid API token configuration: {}", self.0)
    }
}

impl std::error::Error for TokenSpecError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    UnknownToken,
    Forbidden(Capability),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::UnknownToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing bearer token"),
            AuthError::UnknownToken => write!(f, "Unknown token"),
            AuthError::Forbidden(cap) => write!(f, "Token lacks the '{}' capability", cap),
        }
    }
}

impl std::error::Error for AuthError {}

#[derive(Debug, Clone, Default)]
pub struct PermissionChecker {
    tokens: HashMap<String, HashSet<Capability>>,
}

impl PermissionChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant<I>(mut self, token: impl Into<String>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = Capability>,
    {
        self.tokens
            .entry(token.into())
            .or_default()
            .extend(capabilities);
        self
    }

    /// Parse `token=cap|cap,other=cap`; blank entries are skipped
    pub fn from_spec(spec: &str) -> Result<Self, TokenSpecError> {
        let mut checker = Self::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (token, caps) = entry
                .split_once('=')
                .ok_or_else(|| TokenSpecError(format!("expected token=capabilities in '{}'", entry)))?;
            let token = token.trim();
            if token.is_empty() {
                return Err(TokenSpecError("empty token".to_string()));
            }
            let caps = caps
                .split('|')
                .filter(|c| !c.trim().is_empty())
                .map(Capability::from_str)
                .collect::<Result<Vec<_>, _>>()?;
            checker = checker.grant(token, caps);
        }
        Ok(checker)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn check(&self, headers: &HeaderMap, capability: Capability) -> Result<(), AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
        let granted = self.tokens.get(token).ok_or(AuthError::UnknownToken)?;
        if granted.contains(&capability) {
            Ok(())
        } else {
            Err(AuthError::Forbidden(capability))
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
