//! Checklist runner
//!
//! Reads YAML checklists (or one of the built-in ones) and evaluates them
//! case by case against the target site through a [`Browser`] session.
//!
//! [`Browser`]: crate::browser::Browser

mod config;
mod runner;

pub use config::*;
pub use runner::{run_checklist, CaseResult, RunOptions, RunReport, StepResult};
