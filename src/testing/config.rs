//! Checklist configuration types
//!
//! Defines the data structures for deserializing YAML checklists and the
//! built-in checklists shipped with the binary.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use crate::common::{Error, Result};
use crate::target::Environment;

/// Built-in checklists, embedded at compile time
const BUILTIN: &[(&str, &str)] = &[
    ("site", include_str!("../../checklists/site.yaml")),
    (
        "production-mode",
        include_str!("../../checklists/production-mode.yaml"),
    ),
];

/// Name of the checklist run when none is specified
pub const DEFAULT_CHECKLIST: &str = "site";

/// A complete checklist loaded from YAML
#[derive(Deserialize, Debug, Clone)]
pub struct Checklist {
    /// Name of the checklist
    pub name: String,
    /// Optional description of what the checklist verifies
    pub description: Option<String>,
    /// Independent cases, run in order
    pub cases: Vec<TestCase>,
}

/// One independent case: a fresh visit of the target followed by steps
#[derive(Deserialize, Debug, Clone)]
pub struct TestCase {
    /// Name shown in reports
    pub name: String,
    /// The sequence of steps to execute
    pub steps: Vec<TestStep>,
}

/// A single step in a case
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Navigate to a path relative to the target
    Visit { path: String },
    /// Click an element, following its link
    Click {
        selector: String,
        /// Only click an element whose text contains this
        contains: Option<String>,
    },
    /// An element matching the selector exists
    AssertExists { selector: String },
    /// Some element matching the selector contains the text
    AssertContains { selector: String, text: String },
    /// An element's attribute has the expected value
    AssertAttribute {
        selector: String,
        attribute: String,
        /// Which match to check (0 = first)
        #[serde(default)]
        index: usize,
        expect: Expectation,
    },
    /// The first matching element has exactly `count` element children
    AssertChildCount { selector: String, count: usize },
    /// The document title equals the value exactly
    AssertTitle { equals: String },
}

/// Expected value: a literal, or a lookup keyed by target environment
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Expectation {
    /// Same value for every environment
    pub equals: Option<String>,
    /// Value per environment
    pub by_environment: Option<BTreeMap<Environment, String>>,
}

impl Expectation {
    /// The expected value for the given environment
    pub fn resolve(&self, environment: Environment) -> Result<&str> {
        if let Some(value) = &self.equals {
            return Ok(value.as_str());
        }
        self.by_environment
            .as_ref()
            .and_then(|map| map.get(&environment))
            .map(String::as_str)
            .ok_or_else(|| {
                Error::ChecklistParse(format!(
                    "no expected value for environment '{}'",
                    environment
                ))
            })
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match (&self.equals, &self.by_environment) {
            (Some(_), None) => Ok(()),
            (None, Some(map)) if !map.is_empty() => Ok(()),
            (None, Some(_)) => Err("'by_environment' must not be empty".to_string()),
            (Some(_), Some(_)) => Err("use either 'equals' or 'by_environment', not both".to_string()),
            (None, None) => Err("missing 'equals' or 'by_environment'".to_string()),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(value) = &self.equals {
            return write!(f, "'{}'", value);
        }
        let entries: Vec<String> = self
            .by_environment
            .iter()
            .flatten()
            .map(|(env, value)| format!("{}: '{}'", env, value))
            .collect();
        write!(f, "{{{}}}", entries.join(", "))
    }
}

impl TestStep {
    /// One-line description for reports
    pub fn describe(&self, environment: Environment) -> String {
        match self {
            TestStep::Visit { path } => format!("visit {}", path),
            TestStep::Click { selector, contains } => match contains {
                Some(text) => format!("click {} containing '{}'", selector, text),
                None => format!("click {}", selector),
            },
            TestStep::AssertExists { selector } => format!("{} exists", selector),
            TestStep::AssertContains { selector, text } => {
                format!("{} contains '{}'", selector, text)
            }
            TestStep::AssertAttribute {
                selector,
                attribute,
                index,
                expect,
            } => {
                let expected = expect
                    .resolve(environment)
                    .map(|v| format!("'{}'", v))
                    .unwrap_or_else(|_| expect.to_string());
                if *index == 0 {
                    format!("{} [{}] == {}", selector, attribute, expected)
                } else {
                    format!("{} #{} [{}] == {}", selector, index, attribute, expected)
                }
            }
            TestStep::AssertChildCount { selector, count } => {
                format!("{} has {} children", selector, count)
            }
            TestStep::AssertTitle { equals } => format!("title == '{}'", equals),
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            TestStep::AssertAttribute { expect, .. } => expect.validate(),
            TestStep::Click { selector, .. }
            | TestStep::AssertExists { selector }
            | TestStep::AssertContains { selector, .. }
            | TestStep::AssertChildCount { selector, .. }
                if selector.trim().is_empty() =>
            {
                Err("selector must not be empty".to_string())
            }
            _ => Ok(()),
        }
    }
}

impl Checklist {
    /// Parse a checklist from YAML text
    pub fn parse(content: &str) -> Result<Self> {
        let checklist: Checklist = serde_yaml::from_str(content)
            .map_err(|e| Error::ChecklistParse(format!("Failed to parse checklist: {}", e)))?;
        checklist.validate()?;
        Ok(checklist)
    }

    /// Load a checklist from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Load a built-in checklist by name
    pub fn builtin(name: &str) -> Result<Self> {
        BUILTIN
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .ok_or_else(|| Error::UnknownChecklist(name.to_string()))
            .and_then(|(_, content)| Self::parse(content))
    }

    /// Names of the built-in checklists
    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|(name, _)| *name)
    }

    /// Keep only the named cases, preserving checklist order
    pub fn retain_cases(mut self, names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self);
        }
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.cases.iter().any(|case| &case.name == *name))
        {
            return Err(Error::UnknownCase(unknown.clone()));
        }
        self.cases.retain(|case| names.contains(&case.name));
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.cases.is_empty() {
            return Err(Error::ChecklistParse(format!(
                "checklist '{}' has no cases",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for case in &self.cases {
            if !seen.insert(case.name.as_str()) {
                return Err(Error::ChecklistParse(format!(
                    "duplicate case name '{}'",
                    case.name
                )));
            }
            for (i, step) in case.steps.iter().enumerate() {
                step.validate().map_err(|reason| {
                    Error::ChecklistParse(format!(
                        "case '{}', step {}: {}",
                        case.name,
                        i + 1,
                        reason
                    ))
                })?;
            }
        }
        Ok(())
    }
}
