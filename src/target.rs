//! Target site resolution
//!
//! Exactly one target is active per run. It is classified as `local` when it
//! is the local development URL and as `production` otherwise; checklists key
//! environment-dependent expectations on that classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::common::config::TargetSettings;
use crate::common::{Error, Result};

/// Environment variable holding the base URL of the site under test
pub const URL_ENV: &str = "URL";

/// Which kind of deployment the target is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Local development server; must not be indexed
    Local,
    /// Anything that is not the local development server
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Local => write!(f, "local"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// The site under test
#[derive(Debug, Clone)]
pub struct Target {
    url: Url,
    environment: Environment,
}

impl Target {
    /// Resolve the target from an explicit URL, falling back to the `URL`
    /// environment variable and then to the configured default
    pub fn resolve(explicit: Option<&str>, settings: &TargetSettings) -> Result<Self> {
        let from_env = std::env::var(URL_ENV).ok();
        let raw = explicit
            .filter(|s| !s.trim().is_empty())
            .or(from_env.as_deref().filter(|s| !s.trim().is_empty()))
            .unwrap_or(&settings.default_url);

        Self::parse(raw, &settings.local_url)
    }

    /// Parse a target URL and classify it against the local development URL
    pub fn parse(raw: &str, local_url: &str) -> Result<Self> {
        let url = parse_base_url(raw)?;
        let local = parse_base_url(local_url)?;

        let environment = if same_site(&url, &local) {
            Environment::Local
        } else {
            Environment::Production
        };

        tracing::debug!(url = %url, %environment, "Resolved target");

        Ok(Self { url, environment })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Resolve a path relative to the target
    pub fn join(&self, path: &str) -> Result<Url> {
        self.url.join(path).map_err(|e| Error::InvalidUrl {
            url: format!("{}{}", self.url, path),
            reason: e.to_string(),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| Error::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Compare two base URLs, ignoring a trailing slash
fn same_site(a: &Url, b: &Url) -> bool {
    a.as_str().trim_end_matches('/') == b.as_str().trim_end_matches('/')
}
