//! Typed frontmatter records.
//!
//! Every field is optional so that a document with missing or malformed
//! metadata still renders; display fallbacks are applied by the accessors.

use serde::{Deserialize, Deserializer, Serialize};

/// Title shown when a page has none.
pub const UNTITLED: &str = "Untitled Page";
/// Description shown when a page has none.
pub const NO_DESCRIPTION: &str = "No description available";

/// Frontmatter of a documentation page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocFrontmatter {
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
}

impl DocFrontmatter {
    /// Title, or [`UNTITLED`] when absent or blank.
    pub fn display_title(&self) -> &str {
        non_blank(self.title.as_deref()).unwrap_or(UNTITLED)
    }

    /// Description, or [`NO_DESCRIPTION`] when absent or blank.
    pub fn display_description(&self) -> &str {
        non_blank(self.description.as_deref()).unwrap_or(NO_DESCRIPTION)
    }
}

/// Author of a weekly post.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub handle: String,
    #[serde(default, deserialize_with = "text")]
    pub username: String,
    #[serde(default, deserialize_with = "text")]
    pub handle_url: String,
}

/// Frontmatter of a weekly post.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekFrontmatter {
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    /// Publication date as written (e.g. `2024-03-01`).
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    /// Cover image path.
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub cover: Option<String>,
    /// YouTube video id.
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub youtube: Option<String>,
}

impl WeekFrontmatter {
    pub fn display_title(&self) -> &str {
        non_blank(self.title.as_deref()).unwrap_or(UNTITLED)
    }

    pub fn display_description(&self) -> &str {
        non_blank(self.description.as_deref()).unwrap_or(NO_DESCRIPTION)
    }
}

/// A YAML scalar read as text, so `title: 2024` or `draft: true` keep
/// their written value instead of failing the whole record.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(s) => s,
            Scalar::Int(n) => n.to_string(),
            Scalar::UInt(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Scalar> = Option::deserialize(deserializer)?;
    Ok(value.map(String::from))
}

fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
