//! Browser collaborator
//!
//! A "browser" here is an HTTP client plus an HTML5 parser: pages are
//! fetched through a [`PageSource`], parsed into a [`Page`], and queried with
//! CSS selectors. Clicking a link navigates to its `href`; no JavaScript
//! runs.

mod page;
mod session;
mod source;

pub use page::Page;
pub use session::Browser;
pub use source::{HttpSource, PageSource};

#[cfg(test)]
pub(crate) use source::MemorySource;
