//! `homebase build` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use hb_site::{DOCS_DIR, DocsError, WEEKS_DIR, WeekFrontmatter};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::CliError;
use crate::output::Output;
use crate::site::{CommonArgs, Site};

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub(crate) common: CommonArgs,

    /// Output directory for rendered pages (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

/// A rendered weekly post as written to disk.
#[derive(Serialize)]
struct RenderedPost<'a> {
    slug: &'a str,
    #[serde(flatten)]
    frontmatter: &'a WeekFrontmatter,
    html: String,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    warnings: &'a [String],
}

/// What a build produced.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct BuildSummary {
    pub(crate) pages: usize,
    pub(crate) posts: usize,
    /// `docs/<slug>` or `week/<slug>` of content that was not written.
    pub(crate) skipped: Vec<String>,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(self.output_dir)?;
        let site = Site::open(&config)?;
        let output_dir = &config.build_resolved.output_dir;

        output.info(&format!(
            "Content: {}",
            config.content_resolved.root.display()
        ));
        output.info(&format!("Output: {}", output_dir.display()));

        let summary = build_site(&site, output_dir)?;

        for skipped in &summary.skipped {
            output.warning(&format!("Skipped {skipped}"));
        }
        output.success(&format!(
            "Built {} pages and {} posts to {}",
            summary.pages,
            summary.posts,
            output_dir.display()
        ));
        Ok(())
    }
}

/// Render every routed page and every weekly post into `output_dir`.
///
/// Layout: `routes.json`, `docs/<slug>.json`, `weeks.json` (listing) and
/// `week/<slug>.json`. Pages that are missing or fail to compile are
/// skipped; storage faults abort the build.
pub(crate) fn build_site(site: &Site, output_dir: &Path) -> Result<BuildSummary, CliError> {
    let mut summary = BuildSummary::default();

    write_json(&output_dir.join("routes.json"), site.docs.routes().roots())?;

    let slugs = site.docs.static_slugs();
    let pages = slugs
        .par_iter()
        .map(|slug| site.docs.page(slug).map(|page| (slug, page)))
        .collect::<Result<Vec<_>, DocsError>>()?;

    for (slug, page) in pages {
        match page {
            Some(page) => {
                write_json(&output_dir.join(DOCS_DIR).join(format!("{slug}.json")), &page)?;
                summary.pages += 1;
            }
            None => summary.skipped.push(format!("{DOCS_DIR}/{slug}")),
        }
    }

    let entries = site.weeks.all_frontmatter()?;
    write_json(&output_dir.join("weeks.json"), &entries)?;

    let posts = entries
        .par_iter()
        .map(|entry| match site.weeks.compile(&entry.slug) {
            Ok(compiled) => Ok((entry.slug.as_str(), Some(compiled))),
            Err(e @ DocsError::Compilation { .. }) => {
                tracing::warn!(slug = %entry.slug, error = %e, "Skipping weekly post");
                Ok((entry.slug.as_str(), None))
            }
            Err(e) => Err(e),
        })
        .collect::<Result<Vec<_>, DocsError>>()?;

    for (slug, compiled) in posts {
        let Some(compiled) = compiled else {
            summary.skipped.push(format!("{WEEKS_DIR}/{slug}"));
            continue;
        };
        let post = RenderedPost {
            slug,
            frontmatter: &compiled.frontmatter,
            html: compiled.to_html(),
            warnings: &compiled.warnings,
        };
        write_json(&output_dir.join(WEEKS_DIR).join(format!("{slug}.json")), &post)?;
        summary.posts += 1;
    }

    Ok(summary)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hb_config::Config;
    use pretty_assertions::assert_eq;

    const CONFIG: &str = r#"
[[routes]]
href = "/guide"
title = "Guide"

[[routes.items]]
href = "/setup"
title = "Setup"

[[routes]]
href = "/missing"
title = "Missing"
"#;

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }

    fn fixture() -> (tempfile::TempDir, Site, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("content");
        write(
            &content,
            "docs/guide/index.mdx",
            "---\ntitle: Guide\n---\n\n## Overview\n\n<Outlet path=\"guide\" />\n",
        );
        write(
            &content,
            "docs/guide/setup/index.mdx",
            "---\ntitle: Setup\ndescription: Install it\n---\n\nRun it.\n",
        );
        write(
            &content,
            "week/2024-01.mdx",
            "---\ntitle: First week\n---\n\nHello.\n",
        );
        write(&content, "week/2024-02.mdx", "<Accordion>\n\nBroken\n\n</Accordion>\n");

        let config = Config::from_toml(CONFIG, dir.path()).unwrap();
        let site = Site::open(&config).unwrap();
        let output_dir = dir.path().join("dist");
        (dir, site, output_dir)
    }

    #[test]
    fn test_build_site_writes_pages_and_posts() {
        let (_dir, site, output_dir) = fixture();

        let summary = build_site(&site, &output_dir).unwrap();

        assert_eq!(
            summary,
            BuildSummary {
                pages: 2,
                posts: 1,
                skipped: vec!["docs/missing".to_owned(), "week/2024-02".to_owned()],
            }
        );
        assert!(output_dir.join("routes.json").is_file());
        assert!(output_dir.join("docs/guide/setup.json").is_file());
        assert!(output_dir.join("week/2024-01.json").is_file());
        assert!(!output_dir.join("week/2024-02.json").exists());
    }

    #[test]
    fn test_build_site_page_json_contents() {
        let (_dir, site, output_dir) = fixture();

        build_site(&site, &output_dir).unwrap();

        let json = std::fs::read_to_string(output_dir.join("docs/guide.json")).unwrap();
        let page: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(page["title"], "Guide");
        assert_eq!(page["toc"][0]["href"], "#overview");
        assert_eq!(page["navigation"]["next"]["href"], "/guide/setup");
        assert!(page["html"].as_str().unwrap().contains("Install it"));
    }

    #[test]
    fn test_build_site_weeks_listing_sorted() {
        let (_dir, site, output_dir) = fixture();

        build_site(&site, &output_dir).unwrap();

        let json = std::fs::read_to_string(output_dir.join("weeks.json")).unwrap();
        let listing: serde_json::Value = serde_json::from_str(&json).unwrap();
        let slugs: Vec<&str> = listing
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, vec!["2024-01", "2024-02"]);
    }
}
