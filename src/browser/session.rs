//! Browser session: navigation, clicks and wait-until-found polling

use std::time::Instant;

use url::Url;

use super::{Page, PageSource};
use crate::common::config::Timeouts;
use crate::common::{Error, Result};

/// A single browser session holding the currently loaded page
pub struct Browser<S> {
    source: S,
    timeouts: Timeouts,
    current: Option<Page>,
}

impl<S: PageSource> Browser<S> {
    pub fn new(source: S, timeouts: Timeouts) -> Self {
        Self {
            source,
            timeouts,
            current: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    /// Navigate to `url`, replacing the current page
    ///
    /// Blocks until the page is loaded or the page-load timeout elapses.
    pub async fn visit(&mut self, url: &Url) -> Result<&Page> {
        let secs = self.timeouts.page_load_secs;
        let page = tokio::time::timeout(self.timeouts.page_load(), self.source.fetch(url))
            .await
            .map_err(|_| Error::NavigationTimeout {
                url: url.to_string(),
                secs,
            })??;

        tracing::info!(url = %page.url(), "Visited");
        let page: &Page = self.current.insert(page);
        Ok(page)
    }

    /// Load the current page again
    pub async fn reload(&mut self) -> Result<&Page> {
        let url = self.page()?.url().clone();
        self.visit(&url).await
    }

    /// The currently loaded page
    pub fn page(&self) -> Result<&Page> {
        self.current
            .as_ref()
            .ok_or_else(|| Error::navigation("about:blank", "no page has been loaded"))
    }

    /// Poll the page until `lookup` yields a value or the element timeout
    /// elapses
    ///
    /// The page is reloaded between attempts. `what` names the element in the
    /// timeout error.
    pub async fn wait_for<T, F>(&mut self, what: &str, lookup: F) -> Result<T>
    where
        F: Fn(&Page) -> Result<Option<T>>,
    {
        let start = Instant::now();
        let deadline = self.timeouts.element();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            if let Some(found) = lookup(self.page()?)? {
                if attempts > 1 {
                    tracing::debug!(selector = what, attempts, "Element appeared");
                }
                return Ok(found);
            }

            let elapsed = start.elapsed();
            if elapsed >= deadline {
                tracing::debug!(selector = what, attempts, "Gave up waiting");
                return Err(Error::ElementNotFound {
                    selector: what.to_string(),
                    waited_ms: elapsed.as_millis() as u64,
                });
            }

            tokio::time::sleep(self.timeouts.poll_interval().min(deadline - elapsed)).await;
            self.reload().await?;
        }
    }

    /// Click the first element matching `selector` (and containing `text`,
    /// if given) by following its `href`
    pub async fn click(&mut self, selector: &str, text: Option<&str>) -> Result<&Page> {
        let href = self
            .wait_for(selector, |page| {
                let element = match text {
                    Some(text) => page.find_containing(selector, text)?,
                    None => page.find(selector)?,
                };
                Ok(element.map(|el| el.value().attr("href").map(str::to_string)))
            })
            .await?
            .ok_or_else(|| Error::not_clickable(selector, "element has no href"))?;

        let destination = self.page()?.url().join(&href).map_err(|e| Error::InvalidUrl {
            url: href.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!(selector, href = %destination, "Click");
        self.visit(&destination).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::MemorySource;

    const HOME: &str = r#"<html><head><title>Home</title></head><body>
        <a href="/articles/" title="Articles page">Articles</a>
        <span id="plain">No link</span>
    </body></html>"#;

    const ARTICLES: &str = r#"<html><body><h1>Articles</h1></body></html>"#;

    fn fast_timeouts() -> Timeouts {
        Timeouts {
            page_load_secs: 5,
            element_secs: 0,
            poll_interval_ms: 1,
        }
    }

    fn browser() -> Browser<MemorySource> {
        let source = MemorySource::default()
            .with_page("https://example.org/", HOME)
            .with_page("https://example.org/articles/", ARTICLES);
        Browser::new(source, fast_timeouts())
    }

    fn home_url() -> Url {
        Url::parse("https://example.org/").unwrap()
    }

    #[tokio::test]
    async fn test_visit_and_page() {
        let mut browser = browser();
        assert!(browser.page().is_err());

        let page = browser.visit(&home_url()).await.unwrap();
        assert_eq!(page.title().as_deref(), Some("Home"));
        assert_eq!(browser.page().unwrap().url().as_str(), "https://example.org/");
    }

    #[tokio::test]
    async fn test_visit_missing_page_is_navigation_error() {
        let mut browser = browser();
        let url = Url::parse("https://example.org/missing/").unwrap();
        let err = browser.visit(&url).await.unwrap_err();
        assert!(matches!(err, Error::Navigation { .. }));
    }

    #[tokio::test]
    async fn test_click_follows_href() {
        let mut browser = browser();
        browser.visit(&home_url()).await.unwrap();

        let page = browser
            .click(r#"[title="Articles page"]"#, None)
            .await
            .unwrap();
        assert_eq!(page.url().as_str(), "https://example.org/articles/");
        assert!(page.find_containing("h1", "Articles").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_click_without_href() {
        let mut browser = browser();
        browser.visit(&home_url()).await.unwrap();

        let err = browser.click("#plain", None).await.unwrap_err();
        assert!(matches!(err, Error::NotClickable { .. }));
    }

    #[tokio::test]
    async fn test_wait_for_times_out() {
        let mut browser = browser();
        browser.visit(&home_url()).await.unwrap();

        let err = browser
            .wait_for("#nope", |page| Ok(page.find("#nope")?.map(|_| ())))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ElementNotFound { ref selector, .. } if selector == "#nope"));
    }

    #[tokio::test]
    async fn test_wait_for_finds_element_after_reload() {
        let late = r#"<html><body><div id="late">Here</div></body></html>"#;
        let source = MemorySource::default().with_versions("https://example.org/", &[HOME, late]);
        let mut browser = Browser::new(
            source,
            Timeouts {
                page_load_secs: 5,
                element_secs: 2,
                poll_interval_ms: 5,
            },
        );
        browser.visit(&home_url()).await.unwrap();
        assert!(browser.page().unwrap().find("#late").unwrap().is_none());

        let text = browser
            .wait_for("#late", |page| Ok(page.find("#late")?.map(Page::text_of)))
            .await
            .unwrap();
        assert_eq!(text, "Here");
        assert_eq!(browser.source().fetches(), 2);
    }

    #[tokio::test]
    async fn test_wait_for_polls_by_reloading() {
        let source = MemorySource::default().with_page("https://example.org/", HOME);
        let mut browser = Browser::new(
            source,
            Timeouts {
                page_load_secs: 5,
                element_secs: 1,
                poll_interval_ms: 50,
            },
        );
        browser.visit(&home_url()).await.unwrap();

        let result = browser
            .wait_for("#never", |page| Ok(page.find("#never")?.map(|_| ())))
            .await;
        assert!(result.is_err());
        // initial visit plus at least one reload
        assert!(browser.source().fetches() >= 2);
    }
}
