//! CLI command handling
//!
//! Dispatches CLI commands and formats output.

use colored::Colorize;

use crate::browser::{Browser, HttpSource};
use crate::commands::{ChecklistSource, Commands};
use crate::common::config::Config;
use crate::common::Result;
use crate::target::Target;
use crate::testing::{run_checklist, Checklist, RunOptions};

/// Dispatch a CLI command
///
/// Returns whether everything that was checked passed.
pub async fn dispatch(command: Commands, verbose: bool) -> Result<bool> {
    let config = Config::load()?;

    match command {
        Commands::Run {
            url,
            source,
            cases,
            json,
        } => {
            let target = Target::resolve(url.as_deref(), &config.target)?;
            let checklist = load_checklist(&source)?.retain_cases(&cases)?;

            let http = HttpSource::new(&config.timeouts)?;
            let mut browser = Browser::new(http, config.timeouts.clone());

            let options = RunOptions {
                print: !json,
                verbose,
            };
            let report = run_checklist(&mut browser, &target, &checklist, options).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }

            Ok(report.passed)
        }

        Commands::List { source } => {
            let checklist = load_checklist(&source)?;

            println!("{}", checklist.name.bold());
            if let Some(desc) = &checklist.description {
                println!("  {}", desc.dimmed());
            }
            for case in &checklist.cases {
                println!("  - {} ({} steps)", case.name, case.steps.len());
            }

            if source.checklist.is_none() {
                let names: Vec<&str> = Checklist::builtin_names().collect();
                println!("\n{} {}", "Built-in checklists:".cyan(), names.join(", "));
            }

            Ok(true)
        }

        Commands::Target { url } => {
            let target = Target::resolve(url.as_deref(), &config.target)?;

            println!("Target:      {}", target.url());
            println!("Environment: {}", target.environment());

            Ok(true)
        }
    }
}

fn load_checklist(source: &ChecklistSource) -> Result<Checklist> {
    match &source.checklist {
        Some(path) => Checklist::load(path),
        None => Checklist::builtin(&source.builtin),
    }
}
