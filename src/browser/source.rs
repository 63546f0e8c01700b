//! Page sources: where page bytes come from

use async_trait::async_trait;
use url::Url;

use super::Page;
use crate::common::config::Timeouts;
use crate::common::{Error, Result};

/// Loads and parses a page
///
/// `Page` wraps a DOM that is not `Send`, so implementations return
/// non-`Send` futures.
#[async_trait(?Send)]
pub trait PageSource {
    /// Fetch `url` and parse the response body
    async fn fetch(&self, url: &Url) -> Result<Page>;
}

/// Loads pages over HTTP(S)
pub struct HttpSource {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpSource {
    pub fn new(timeouts: &Timeouts) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("site-checks/", env!("CARGO_PKG_VERSION")))
            .timeout(timeouts.page_load())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout_secs: timeouts.page_load_secs,
        })
    }

    fn map_request_error(&self, url: &Url, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::NavigationTimeout {
                url: url.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            Error::navigation(url.as_str(), e)
        }
    }
}

#[async_trait(?Send)]
impl PageSource for HttpSource {
    async fn fetch(&self, url: &Url) -> Result<Page> {
        tracing::debug!(url = %url, "GET");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::navigation(url.as_str(), format!("HTTP {}", status)));
        }

        // Redirects are followed; relative links resolve against the final URL
        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_request_error(url, e))?;

        tracing::debug!(url = %final_url, bytes = body.len(), "Loaded page");

        Ok(Page::parse(final_url, &body))
    }
}

/// Serves pages from memory, keyed by absolute URL
///
/// A URL may have several versions: the n-th fetch of it gets the n-th
/// version, and the last version repeats.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemorySource {
    pages: std::collections::HashMap<String, Vec<String>>,
    served: std::cell::RefCell<std::collections::HashMap<String, usize>>,
    fetches: std::cell::Cell<usize>,
}

#[cfg(test)]
impl MemorySource {
    pub(crate) fn with_page(self, url: &str, html: &str) -> Self {
        self.with_versions(url, &[html])
    }

    pub(crate) fn with_versions(mut self, url: &str, versions: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            versions.iter().map(|html| html.to_string()).collect(),
        );
        self
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetches.get()
    }
}

#[cfg(test)]
#[async_trait(?Send)]
impl PageSource for MemorySource {
    async fn fetch(&self, url: &Url) -> Result<Page> {
        self.fetches.set(self.fetches.get() + 1);
        let versions = self
            .pages
            .get(url.as_str())
            .filter(|versions| !versions.is_empty())
            .ok_or_else(|| Error::navigation(url.as_str(), "HTTP 404 Not Found"))?;

        let mut served = self.served.borrow_mut();
        let count = served.entry(url.to_string()).or_insert(0);
        let html = &versions[(*count).min(versions.len() - 1)];
        *count += 1;

        Ok(Page::parse(url.clone(), html))
    }
}
