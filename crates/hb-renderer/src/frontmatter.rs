//! Frontmatter splitting and parsing.
//!
//! A content file may start with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Installation
//! description: How to install
//! ---
//! ## Body starts here
//! ```
//!
//! Parsing is generic over the record type so docs pages and week entries
//! share the same code path.

use serde::de::DeserializeOwned;

/// Error type for frontmatter parsing.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    /// YAML parsing or shape error.
    #[error("Invalid frontmatter: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Split raw text into the frontmatter YAML and the markdown body.
///
/// Returns `(None, raw)` when the text does not open with a `---` line or the
/// block is never closed.
///
/// # Examples
///
/// ```
/// use hb_renderer::split_frontmatter;
///
/// let (yaml, body) = split_frontmatter("---\ntitle: A\n---\n# Body\n");
/// assert_eq!(yaml, Some("title: A\n"));
/// assert_eq!(body, "# Body\n");
/// ```
#[must_use]
pub fn split_frontmatter(raw: &str) -> (Option<&str>, &str) {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let start = text.trim_start_matches(['\n', '\r']);

    let Some(rest) = strip_delimiter_line(start) else {
        return (None, text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, text)
}

/// If `s` starts with a `---` line, return what follows it.
fn strip_delimiter_line(s: &str) -> Option<&str> {
    let newline = s.find('\n')?;
    (s[..newline].trim_end() == "---").then(|| &s[newline + 1..])
}

/// Parse the frontmatter of a raw document into `T`.
///
/// A missing or empty block yields `T::default()`.
///
/// # Errors
///
/// Returns [`FrontmatterError`] when the YAML is malformed or does not fit `T`.
pub fn parse_frontmatter<T>(raw: &str) -> Result<T, FrontmatterError>
where
    T: DeserializeOwned + Default,
{
    let (yaml, _) = split_frontmatter(raw);
    let Some(yaml) = yaml else {
        return Ok(T::default());
    };

    let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_yaml::from_value(value)?)
}

/// Parse frontmatter without failing.
///
/// Malformed metadata is logged and replaced by `T::default()`, leaving
/// fallback values to the caller. The body is never compiled.
#[must_use]
pub fn extract_frontmatter<T>(raw: &str) -> T
where
    T: DeserializeOwned + Default,
{
    parse_frontmatter(raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Malformed frontmatter, using empty record");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, PartialEq, Eq, Deserialize)]
    struct Meta {
        title: Option<String>,
        description: Option<String>,
    }

    #[test]
    fn test_split_frontmatter_basic() {
        let (yaml, body) = split_frontmatter("---\ntitle: A\n---\nbody\n");

        assert_eq!(yaml, Some("title: A\n"));
        assert_eq!(body, "body\n");
    }

    #[test]
    fn test_split_frontmatter_crlf() {
        let (yaml, body) = split_frontmatter("---\r\ntitle: A\r\n---\r\nbody");

        assert_eq!(yaml, Some("title: A\r\n"));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_split_frontmatter_bom_and_leading_newlines() {
        let (yaml, body) = split_frontmatter("\u{feff}\n---\ntitle: A\n---\nbody");

        assert_eq!(yaml, Some("title: A\n"));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_split_frontmatter_empty_block() {
        let (yaml, body) = split_frontmatter("---\n---\nbody");

        assert_eq!(yaml, Some(""));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_split_frontmatter_absent() {
        assert_eq!(split_frontmatter("# Title\n---\n"), (None, "# Title\n---\n"));
    }

    #[test]
    fn test_split_frontmatter_unclosed() {
        let raw = "---\ntitle: A\nbody";

        assert_eq!(split_frontmatter(raw), (None, raw));
    }

    #[test]
    fn test_parse_frontmatter_fields() {
        let meta: Meta =
            parse_frontmatter("---\ntitle: \"Intro\"\ndescription: First page\n---\n").unwrap();

        assert_eq!(
            meta,
            Meta {
                title: Some("Intro".to_owned()),
                description: Some("First page".to_owned()),
            }
        );
    }

    #[test]
    fn test_parse_frontmatter_missing_and_comment_only() {
        let missing: Meta = parse_frontmatter("# Just a body").unwrap();
        let comments: Meta = parse_frontmatter("---\n# nothing here\n---\n").unwrap();

        assert_eq!(missing, Meta::default());
        assert_eq!(comments, Meta::default());
    }

    #[test]
    fn test_parse_frontmatter_malformed() {
        let result = parse_frontmatter::<Meta>("---\ntitle: [unclosed\n---\n");

        assert!(result.is_err());
    }

    #[test]
    fn test_extract_frontmatter_malformed_yields_default() {
        let meta: Meta = extract_frontmatter("---\ntitle: [unclosed\n---\n");

        assert_eq!(meta, Meta::default());
    }

    #[test]
    fn test_extract_frontmatter_wrong_shape_yields_default() {
        let meta: Meta = extract_frontmatter("---\n- a\n- b\n---\n");

        assert_eq!(meta, Meta::default());
    }
}
