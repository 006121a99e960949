//! `homebase check` command implementation.

use clap::Args;
use hb_site::{DOCS_DIR, DocsError, WEEKS_DIR};
use rayon::prelude::*;

use crate::error::CliError;
use crate::output::Output;
use crate::site::{CommonArgs, Site};

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub(crate) common: CommonArgs,
}

/// Compile outcome of one document.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Compiled { warnings: Vec<String> },
    Failed(String),
}

/// Per-document results, in route order then post order.
#[derive(Debug, Default)]
pub(crate) struct CheckReport {
    pub(crate) results: Vec<(String, Outcome)>,
}

impl CheckReport {
    pub(crate) fn failures(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, outcome)| matches!(outcome, Outcome::Failed(_)))
            .count()
    }
}

impl CheckArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(None)?;
        let site = Site::open(&config)?;

        let report = check_site(&site)?;

        for (name, outcome) in &report.results {
            match outcome {
                Outcome::Compiled { warnings } => {
                    for warning in warnings {
                        output.warning(&format!("{name}: {warning}"));
                    }
                }
                Outcome::Failed(message) => output.error(&format!("{name}: {message}")),
            }
        }

        let failures = report.failures();
        if failures > 0 {
            return Err(CliError::Validation(format!(
                "{failures} of {} documents failed to compile",
                report.results.len()
            )));
        }
        output.success(&format!("Checked {} documents", report.results.len()));
        Ok(())
    }
}

/// Compile every routed page and weekly post.
///
/// Missing content and compile errors are reported per document; storage
/// faults abort the check.
pub(crate) fn check_site(site: &Site) -> Result<CheckReport, CliError> {
    let slugs = site.docs.static_slugs();
    let docs = slugs
        .par_iter()
        .map(|slug| -> Result<(String, Outcome), DocsError> {
            let outcome = classify(site.docs.compile(slug).map(|c| c.warnings))?;
            Ok((format!("{DOCS_DIR}/{slug}"), outcome))
        })
        .collect::<Result<Vec<_>, DocsError>>()?;

    let entries = site.weeks.all_frontmatter()?;
    let posts = entries
        .par_iter()
        .map(|entry| -> Result<(String, Outcome), DocsError> {
            let outcome = classify(site.weeks.compile(&entry.slug).map(|c| c.warnings))?;
            Ok((format!("{WEEKS_DIR}/{}", entry.slug), outcome))
        })
        .collect::<Result<Vec<_>, DocsError>>()?;

    Ok(CheckReport {
        results: docs.into_iter().chain(posts).collect(),
    })
}

fn classify(result: Result<Vec<String>, DocsError>) -> Result<Outcome, DocsError> {
    match result {
        Ok(warnings) => Ok(Outcome::Compiled { warnings }),
        Err(e @ DocsError::Io { .. }) => Err(e),
        Err(e) => Ok(Outcome::Failed(e.to_string())),
    }
}
