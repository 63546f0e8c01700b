//! Checklist runner implementation
//!
//! Cases are independent: each starts with a fresh visit of the target, a
//! failing step aborts the rest of its case, and the next case runs anyway.

use std::time::Instant;

use colored::Colorize;
use serde::Serialize;

use crate::browser::{Browser, Page, PageSource};
use crate::common::{Error, Result};
use crate::target::{Environment, Target};

use super::config::{Checklist, TestCase, TestStep};

/// Output options for a run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Print the human-readable report while running
    pub print: bool,
    /// Include step details for passing cases
    pub verbose: bool,
}

/// Result of one step
#[derive(Debug, Serialize)]
pub struct StepResult {
    pub description: String,
    pub passed: bool,
}

/// Result of one case
#[derive(Debug, Serialize)]
pub struct CaseResult {
    pub name: String,
    pub passed: bool,
    pub steps_run: usize,
    pub steps_total: usize,
    pub steps: Vec<StepResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    pub duration_ms: u64,
}

/// Aggregate result of a checklist run
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub checklist: String,
    pub target: String,
    pub environment: Environment,
    pub passed: bool,
    pub cases: Vec<CaseResult>,
}

impl RunReport {
    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.cases.len() - self.passed_count()
    }

    pub fn case(&self, name: &str) -> Option<&CaseResult> {
        self.cases.iter().find(|c| c.name == name)
    }
}

/// Run every case of a checklist against the target
pub async fn run_checklist<S: PageSource>(
    browser: &mut Browser<S>,
    target: &Target,
    checklist: &Checklist,
    options: RunOptions,
) -> RunReport {
    tracing::info!(
        checklist = %checklist.name,
        target = %target.url(),
        environment = %target.environment(),
        cases = checklist.cases.len(),
        "Running checklist"
    );

    if options.print {
        println!(
            "\n{} {}",
            "Running Checklist:".blue().bold(),
            checklist.name.white().bold()
        );
        if let Some(desc) = &checklist.description {
            println!("  {}", desc.dimmed());
        }
        println!(
            "  {} {} ({})",
            "Target:".cyan(),
            target.url(),
            target.environment().to_string().dimmed()
        );
    }

    let mut cases = Vec::with_capacity(checklist.cases.len());
    for case in &checklist.cases {
        let result = run_case(browser, target, case).await;
        if options.print {
            print_case(&result, options.verbose);
        }
        cases.push(result);
    }

    let report = RunReport {
        checklist: checklist.name.clone(),
        target: target.url().to_string(),
        environment: target.environment(),
        passed: cases.iter().all(|c| c.passed),
        cases,
    };

    tracing::info!(
        passed = report.passed_count(),
        failed = report.failed_count(),
        "Checklist finished"
    );

    if options.print {
        print_summary(&report);
    }

    report
}

/// Run one case: fresh visit of the target, then steps until one fails
async fn run_case<S: PageSource>(
    browser: &mut Browser<S>,
    target: &Target,
    case: &TestCase,
) -> CaseResult {
    let start = Instant::now();
    let steps_total = case.steps.len();
    let mut steps = Vec::with_capacity(steps_total);

    let outcome = run_steps(browser, target, case, &mut steps).await;

    let steps_run = steps.len();
    let (error, error_kind) = match &outcome {
        Ok(()) => (None, None),
        Err(e) => (Some(e.to_string()), Some(e.kind())),
    };

    CaseResult {
        name: case.name.clone(),
        passed: outcome.is_ok(),
        steps_run,
        steps_total,
        steps,
        error,
        error_kind,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

async fn run_steps<S: PageSource>(
    browser: &mut Browser<S>,
    target: &Target,
    case: &TestCase,
    results: &mut Vec<StepResult>,
) -> Result<()> {
    browser.visit(target.url()).await?;

    let environment = target.environment();
    for step in &case.steps {
        let description = step.describe(environment);
        let outcome = execute_step(browser, target, step).await;

        match &outcome {
            Ok(()) => tracing::debug!(case = %case.name, step = %description, "Step passed"),
            Err(e) => {
                tracing::warn!(case = %case.name, step = %description, error = %e, "Step failed")
            }
        }
        results.push(StepResult {
            description,
            passed: outcome.is_ok(),
        });
        outcome?;
    }
    Ok(())
}

/// Execute a single step against the current page
async fn execute_step<S: PageSource>(
    browser: &mut Browser<S>,
    target: &Target,
    step: &TestStep,
) -> Result<()> {
    match step {
        TestStep::Visit { path } => {
            let url = target.join(path)?;
            browser.visit(&url).await?;
            Ok(())
        }

        TestStep::Click { selector, contains } => {
            browser.click(selector, contains.as_deref()).await?;
            Ok(())
        }

        TestStep::AssertExists { selector } => {
            browser
                .wait_for(selector, |page| Ok(page.find(selector)?.map(|_| ())))
                .await
        }

        TestStep::AssertContains { selector, text } => browser
            .wait_for(selector, |page| {
                Ok(page.find_containing(selector, text)?.map(|_| ()))
            })
            .await
            .map_err(|e| match e {
                Error::ElementNotFound { .. } => Error::TextNotFound {
                    selector: selector.clone(),
                    text: text.clone(),
                },
                other => other,
            }),

        TestStep::AssertAttribute {
            selector,
            attribute,
            index,
            expect,
        } => {
            let expected = expect.resolve(target.environment())?;
            let actual = browser
                .wait_for(selector, |page| {
                    Ok(page
                        .find_nth(selector, *index)?
                        .map(|el| el.value().attr(attribute).map(str::to_string)))
                })
                .await?;

            match actual {
                Some(actual) if actual == expected => Ok(()),
                Some(actual) => Err(Error::mismatch(
                    selector,
                    &format!("attribute '{}'", attribute),
                    expected,
                    &actual,
                )),
                None => Err(Error::mismatch(
                    selector,
                    &format!("attribute '{}'", attribute),
                    expected,
                    "<absent>",
                )),
            }
        }

        TestStep::AssertChildCount { selector, count } => {
            let actual = browser
                .wait_for(selector, |page| Ok(page.find(selector)?.map(Page::child_count)))
                .await?;

            if actual == *count {
                Ok(())
            } else {
                Err(Error::CountMismatch {
                    selector: selector.clone(),
                    expected: *count,
                    actual,
                })
            }
        }

        TestStep::AssertTitle { equals } => {
            let actual = browser.page()?.title().unwrap_or_default();
            if &actual == equals {
                Ok(())
            } else {
                Err(Error::mismatch("title", "text", equals, &actual))
            }
        }
    }
}

fn print_case(result: &CaseResult, verbose: bool) {
    if result.passed {
        println!("  {} {}", "✓".green(), result.name);
        if verbose {
            for step in &result.steps {
                println!("      {}", step.description.dimmed());
            }
        }
        return;
    }

    println!("  {} {}", "✗".red(), result.name.red());
    for (i, step) in result.steps.iter().enumerate() {
        let mark = if step.passed { "✓".green() } else { "✗".red() };
        println!("      {} Step {}: {}", mark, i + 1, step.description.dimmed());
    }
    if let Some(error) = &result.error {
        println!("      {}", error.red());
    }
}

fn print_summary(report: &RunReport) {
    let summary = format!(
        "{} passed, {} failed",
        report.passed_count(),
        report.failed_count()
    );
    if report.passed {
        println!("\n{} {}\n", "✓".green().bold(), summary.green().bold());
    } else {
        println!("\n{} {}\n", "✗".red().bold(), summary.red().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::MemorySource;
    use crate::common::config::Timeouts;

    const HOME: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Time to Geek | Time-to-Geek</title>
  <meta name="robots" content="index, follow">
  <link rel="stylesheet" href="/ananke/css/main.min.css">
</head>
<body>
  <nav>
    <a href="/">Time-to-Geek</a>
    <ul class="pl0 mr3">
      <li><a href="/about/" title="About page">About</a></li>
      <li><a href="/articles/" title="Articles page">Articles</a></li>
      <li><a href="/projects/" title="Projects page">Projects</a></li>
    </ul>
  </nav>
  <div class="ananke-socials">
    <a href="https://github.com/yvesDenis">GitHub</a>
  </div>
</body>
</html>"#;

    const ARTICLES: &str = r#"<html><body>
  <h1 class="f1">Articles</h1>
  <aside>
    <div>One</div>
    <div>Two</div>
    <div>Three</div>
  </aside>
</body></html>"#;

    fn timeouts() -> Timeouts {
        Timeouts {
            page_load_secs: 5,
            element_secs: 0,
            poll_interval_ms: 1,
        }
    }

    fn browser(home: &str, articles: &str) -> Browser<MemorySource> {
        let source = MemorySource::default()
            .with_page("https://time-to-geek.example/", home)
            .with_page("https://time-to-geek.example/articles/", articles);
        Browser::new(source, timeouts())
    }

    fn production() -> Target {
        Target::parse("https://time-to-geek.example/", "http://localhost:1313/").unwrap()
    }

    fn quiet() -> RunOptions {
        RunOptions::default()
    }

    #[tokio::test]
    async fn test_site_checklist_passes_on_production() {
        let checklist = Checklist::builtin("site").unwrap();
        let mut browser = browser(HOME, ARTICLES);

        let report = run_checklist(&mut browser, &production(), &checklist, quiet()).await;

        for case in &report.cases {
            assert!(case.passed, "case '{}' failed: {:?}", case.name, case.error);
        }
        assert!(report.passed);
        assert_eq!(report.failed_count(), 0);
        assert_eq!(report.environment, Environment::Production);
    }

    #[tokio::test]
    async fn test_local_target_expects_noindex() {
        let checklist = Checklist::builtin("site").unwrap();
        let target =
            Target::parse("https://time-to-geek.example/", "https://time-to-geek.example/").unwrap();
        let mut browser = browser(HOME, ARTICLES);

        let report = run_checklist(&mut browser, &target, &checklist, quiet()).await;

        let robots = report.case("robots meta tag matches the environment").unwrap();
        assert!(!robots.passed);
        assert_eq!(robots.error_kind, Some("value_mismatch"));
        let error = robots.error.as_deref().unwrap();
        assert!(error.contains("'noindex, nofollow'"), "{}", error);
        assert!(error.contains("'index, follow'"), "{}", error);

        // Only the robots case depends on the environment
        assert_eq!(report.failed_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_step_aborts_only_its_case() {
        let checklist = Checklist::builtin("site").unwrap();
        let short_aside = ARTICLES.replace("<div>Three</div>", "");
        let mut browser = browser(HOME, &short_aside);

        let report = run_checklist(&mut browser, &production(), &checklist, quiet()).await;

        let articles = report.case("articles page lists three articles").unwrap();
        assert!(!articles.passed);
        assert_eq!(articles.error_kind, Some("count_mismatch"));
        assert_eq!(articles.steps_run, 3);
        assert_eq!(report.failed_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_element_stops_case_early() {
        let checklist = Checklist::parse(
            r##"
name: early stop
cases:
  - name: missing then present
    steps:
      - action: assert_exists
        selector: "#missing"
      - action: assert_title
        equals: Time to Geek | Time-to-Geek
  - name: title
    steps:
      - action: assert_title
        equals: Time to Geek | Time-to-Geek
"##,
        )
        .unwrap();
        let mut browser = browser(HOME, ARTICLES);

        let report = run_checklist(&mut browser, &production(), &checklist, quiet()).await;

        let first = &report.cases[0];
        assert!(!first.passed);
        assert_eq!(first.steps_run, 1);
        assert_eq!(first.steps_total, 2);
        assert_eq!(first.error_kind, Some("element_not_found"));
        assert!(report.cases[1].passed);
    }

    #[tokio::test]
    async fn test_assert_exists_waits_for_reload() {
        let checklist = Checklist::parse(
            r##"
name: late content
cases:
  - name: banner appears
    steps:
      - action: assert_exists
        selector: "#banner"
"##,
        )
        .unwrap();
        let with_banner = HOME.replace("<body>", r#"<body><div id="banner">New</div>"#);
        let source = MemorySource::default()
            .with_versions("https://time-to-geek.example/", &[HOME, with_banner.as_str()]);
        let mut browser = Browser::new(
            source,
            Timeouts {
                page_load_secs: 5,
                element_secs: 2,
                poll_interval_ms: 5,
            },
        );

        let report = run_checklist(&mut browser, &production(), &checklist, quiet()).await;

        assert!(report.passed, "{:?}", report.cases[0].error);
        assert_eq!(browser.source().fetches(), 2);
    }

    #[tokio::test]
    async fn test_visit_step_navigates_relative_to_target() {
        let checklist = Checklist::parse(
            r#"
name: visit
cases:
  - name: articles by path
    steps:
      - action: visit
        path: articles/
      - action: assert_child_count
        selector: aside
        count: 3
  - name: missing path
    steps:
      - action: visit
        path: /nowhere/
      - action: assert_title
        equals: unreachable
"#,
        )
        .unwrap();
        let mut browser = browser(HOME, ARTICLES);

        let report = run_checklist(&mut browser, &production(), &checklist, quiet()).await;

        let articles = &report.cases[0];
        assert!(articles.passed, "{:?}", articles.error);
        assert_eq!(articles.steps_run, 2);

        let missing = &report.cases[1];
        assert!(!missing.passed);
        assert_eq!(missing.steps_run, 1);
        assert_eq!(missing.error_kind, Some("navigation"));
    }

    #[tokio::test]
    async fn test_contains_failure_names_text() {
        let checklist = Checklist::parse(
            r#"
name: contains
cases:
  - name: heading
    steps:
      - action: assert_contains
        selector: a
        text: Nowhere
"#,
        )
        .unwrap();
        let mut browser = browser(HOME, ARTICLES);

        let report = run_checklist(&mut browser, &production(), &checklist, quiet()).await;
        let error = report.cases[0].error.as_deref().unwrap();
        assert!(error.contains("Nowhere"), "{}", error);
    }

    #[tokio::test]
    async fn test_absent_attribute_is_mismatch() {
        let page = HOME.replace(r#" href="https://github.com/yvesDenis""#, "");
        let checklist = Checklist::builtin("site")
            .unwrap()
            .retain_cases(&["first social link points to GitHub".to_string()])
            .unwrap();
        let mut browser = browser(&page, ARTICLES);

        let report = run_checklist(&mut browser, &production(), &checklist, quiet()).await;
        let error = report.cases[0].error.as_deref().unwrap();
        assert!(error.contains("<absent>"), "{}", error);
    }

    #[tokio::test]
    async fn test_unreachable_target_fails_every_case() {
        let checklist = Checklist::builtin("production-mode").unwrap();
        let target =
            Target::parse("https://elsewhere.example/", "http://localhost:1313/").unwrap();
        let mut browser = browser(HOME, ARTICLES);

        let report = run_checklist(&mut browser, &target, &checklist, quiet()).await;

        assert!(!report.passed);
        for case in &report.cases {
            assert_eq!(case.error_kind, Some("navigation"));
            assert_eq!(case.steps_run, 0);
        }
    }

    #[tokio::test]
    async fn test_each_case_starts_with_fresh_visit() {
        let checklist = Checklist::builtin("production-mode").unwrap();
        let mut browser = browser(HOME, ARTICLES);

        run_checklist(&mut browser, &production(), &checklist, quiet()).await;

        assert_eq!(browser.source().fetches(), checklist.cases.len());
    }

    #[test]
    fn test_report_serializes() {
        let report = RunReport {
            checklist: "site".into(),
            target: "http://localhost:1313/".into(),
            environment: Environment::Local,
            passed: true,
            cases: vec![],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["environment"], "local");
        assert_eq!(json["passed"], true);
    }
}
