// src/target.rs
// =============================================================================
// The URL being analyzed.
//
// Users type things like "example.com" or "https://example.com/page". We
// normalize that into an absolute URL (defaulting the scheme to https) and
// remember the host so the sitemap crawler can stay on the same site.
// =============================================================================

use std::fmt;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("invalid URL '{input}': {reason}")]
    Invalid { input: String, reason: String },

    #[error("URL has no host: {0}")]
    MissingHost(String),
}

// Adds "https://" unless the input already has an http(s) scheme.
//
// Normalizing twice is a no-op:
//   "example.com"          -> "https://example.com"
//   "https://example.com"  -> "https://example.com"
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

// A normalized, parsed target. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTarget {
    normalized: String,
    url: Url,
    host: String,
}

impl AnalysisTarget {
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let normalized = normalize_url(input);

        let url = Url::parse(&normalized).map_err(|e| TargetError::Invalid {
            input: input.to_string(),
            reason: e.to_string(),
        })?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| TargetError::MissingHost(normalized.clone()))?
            .to_string();

        Ok(Self {
            normalized,
            url,
            host,
        })
    }

    /// The normalized text form, exactly as the user typed it plus any added scheme.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    // Host plus explicit port, e.g. "example.com" or "127.0.0.1:8080".
    // Two URLs belong to the same site when their authorities match.
    pub fn authority(&self) -> String {
        authority_of(&self.url).unwrap_or_else(|| self.host.clone())
    }
}

impl fmt::Display for AnalysisTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

// Returns "host" or "host:port" for URLs that have a host.
// Default ports are omitted by the url crate, so "https://a.com:443" and
// "https://a.com" compare equal.
pub fn authority_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
