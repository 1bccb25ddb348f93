//! What a highlighted run of text is.

use serde::{Deserialize, Serialize};

/// The syntactic role of a run of text.
///
/// Variants are listed in the order a node's parts are painted: the whole
/// tag first, then its name and attributes on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// The `xml` keyword of the declaration.
    #[serde(rename = "declaration")]
    Declaration,
    /// Everything inside `<` .. `>` not covered by something more specific.
    #[serde(rename = "tag_delimiter")]
    TagDelimiter,
    #[serde(rename = "tag_name")]
    TagName,
    #[serde(rename = "attribute_name")]
    AttributeName,
    /// An attribute or declaration value, including its quotes.
    #[serde(rename = "attribute_value")]
    AttributeValue,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "comment")]
    Comment,
    #[serde(rename = "cdata")]
    CData,
    #[serde(rename = "pi_target")]
    PITarget,
    #[serde(rename = "pi_data")]
    PIData,
    /// A mismatched end tag.
    #[serde(rename = "error")]
    Error,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Declaration,
        Category::TagDelimiter,
        Category::TagName,
        Category::AttributeName,
        Category::AttributeValue,
        Category::Text,
        Category::Comment,
        Category::CData,
        Category::PITarget,
        Category::PIData,
        Category::Error,
    ];

    /// The key used for this category in a scheme file.
    pub fn key(self) -> &'static str {
        match self {
            Category::Declaration => "declaration",
            Category::TagDelimiter => "tag_delimiter",
            Category::TagName => "tag_name",
            Category::AttributeName => "attribute_name",
            Category::AttributeValue => "attribute_value",
            Category::Text => "text",
            Category::Comment => "comment",
            Category::CData => "cdata",
            Category::PITarget => "pi_target",
            Category::PIData => "pi_data",
            Category::Error => "error",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
