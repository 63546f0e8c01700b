//! A loaded, parsed page

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::common::{Error, Result};

/// A page as the browser sees it after loading: its final URL and DOM
pub struct Page {
    url: Url,
    document: Html,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page").field("url", &self.url.as_str()).finish_non_exhaustive()
    }
}

impl Page {
    /// Parse an HTML document loaded from `url`
    pub fn parse(url: Url, body: &str) -> Self {
        Self {
            url,
            document: Html::parse_document(body),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The document title, whitespace-normalized like `document.title`
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.document
            .select(&selector)
            .next()
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
    }

    /// First element matching a CSS selector
    pub fn find(&self, selector: &str) -> Result<Option<ElementRef<'_>>> {
        self.find_nth(selector, 0)
    }

    /// The `index`-th element matching a CSS selector
    pub fn find_nth(&self, selector: &str, index: usize) -> Result<Option<ElementRef<'_>>> {
        let parsed = parse_selector(selector)?;
        Ok(self.document.select(&parsed).nth(index))
    }

    /// First element matching `selector` whose text contains `text`
    ///
    /// Both sides are whitespace-normalized before comparing.
    pub fn find_containing(&self, selector: &str, text: &str) -> Result<Option<ElementRef<'_>>> {
        let needle = normalize_whitespace(text);
        let parsed = parse_selector(selector)?;
        Ok(self
            .document
            .select(&parsed)
            .find(|el| Self::text_of(*el).contains(&needle)))
    }

    /// Text content of an element, whitespace-normalized
    pub fn text_of(element: ElementRef<'_>) -> String {
        normalize_whitespace(&element.text().collect::<String>())
    }

    /// Number of element children (text and comment nodes excluded)
    pub fn child_count(element: ElementRef<'_>) -> usize {
        element
            .children()
            .filter(|child| child.value().is_element())
            .count()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
