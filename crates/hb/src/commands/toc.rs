//! `homebase toc` command implementation.

use clap::Args;
use hb_site::TocEntry;

use crate::error::CliError;
use crate::output::Output;
use crate::site::{CommonArgs, Site};

/// Arguments for the toc command.
#[derive(Args)]
pub(crate) struct TocArgs {
    #[command(flatten)]
    pub(crate) common: CommonArgs,

    /// Page slug, e.g. `getting-started/installation`.
    slug: String,
}

impl TocArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(None)?;
        let site = Site::open(&config)?;

        let toc = page_toc(&site, &self.slug)?;
        output.data(&serde_json::to_string_pretty(&toc)?)?;
        Ok(())
    }
}

/// Table of contents of the page at `slug`; surrounding slashes are ignored.
pub(crate) fn page_toc(site: &Site, slug: &str) -> Result<Vec<TocEntry>, CliError> {
    Ok(site.docs.tocs(slug.trim_matches('/'))?)
}
