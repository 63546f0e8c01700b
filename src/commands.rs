//! CLI command definitions
//!
//! Defines the clap commands for the site-checks CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::testing::DEFAULT_CHECKLIST;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a checklist against the target site
    Run {
        /// Base URL of the site under test
        #[arg(long, env = "URL")]
        url: Option<String>,

        #[command(flatten)]
        source: ChecklistSource,

        /// Only run the named case (can be given multiple times)
        #[arg(long = "case")]
        cases: Vec<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the cases of a checklist
    List {
        #[command(flatten)]
        source: ChecklistSource,
    },

    /// Show the resolved target and its environment
    Target {
        /// Base URL of the site under test
        #[arg(long, env = "URL")]
        url: Option<String>,
    },
}

/// Where to take the checklist from
#[derive(Args, Debug)]
pub struct ChecklistSource {
    /// Path to a YAML checklist file
    #[arg(long, conflicts_with = "builtin")]
    pub checklist: Option<PathBuf>,

    /// Name of a built-in checklist
    #[arg(long, default_value = DEFAULT_CHECKLIST)]
    pub builtin: String,
}
