//! site-checks - end-to-end checks for the Time-to-Geek blog
//!
//! This library loads a target site, parses it into a DOM and evaluates
//! checklists of independent cases against it.

pub mod browser;
pub mod cli;
pub mod commands;
pub mod common;
pub mod target;
pub mod testing;

// Re-export commonly used types for tests
pub use browser::{Browser, HttpSource, Page, PageSource};
pub use common::{Error, Result};
pub use target::{Environment, Target};
pub use testing::{run_checklist, Checklist, RunOptions, RunReport};
