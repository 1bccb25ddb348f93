//! Color schemes and their YAML persistence.
//!
//! A scheme file keeps its colors under a single top-level key so it can sit
//! alongside other editor settings:
//!
//! ```yaml
//! xml_highlighter_colors:
//!   tag_name:
//!     foreground: mediumblue
//!     background: "#ffffff"
//!   comment:
//!     foreground: "#228b22"
//! ```
//!
//! Categories missing from the file keep their default colors.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::category::Category;
use crate::color::{Color, ColorPair};
use crate::error::{Result, SchemeError};

/// Top-level key of a scheme file.
pub const SCHEME_KEY: &str = "xml_highlighter_colors";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SchemeFile {
    #[serde(default)]
    xml_highlighter_colors: IndexMap<Category, ColorPair>,
}

/// Colors for every [`Category`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    colors: IndexMap<Category, ColorPair>,
}

impl Default for ColorScheme {
    fn default() -> Self {
        let white = Some(Color::rgb(0xff, 0xff, 0xff));
        let on_white = |r, g, b| ColorPair::new(Color::rgb(r, g, b), white);

        let colors = IndexMap::from([
            (
                Category::Declaration,
                ColorPair::foreground(Color::rgb(0x5f, 0x9e, 0xa0)),
            ),
            (Category::TagDelimiter, on_white(0x00, 0x00, 0x00)),
            (Category::TagName, on_white(0x00, 0x00, 0xcd)),
            (Category::AttributeName, on_white(0x80, 0x80, 0x00)),
            (Category::AttributeValue, on_white(0x19, 0x19, 0x70)),
            (Category::Text, on_white(0x00, 0x00, 0x00)),
            (Category::Comment, on_white(0x22, 0x8b, 0x22)),
            (Category::CData, on_white(0xff, 0xc0, 0xcb)),
            (Category::PITarget, on_white(0x5f, 0x9e, 0xa0)),
            (Category::PIData, on_white(0x00, 0x00, 0x8b)),
            (
                Category::Error,
                ColorPair::foreground(Color::rgb(0xff, 0x45, 0x00)),
            ),
        ]);
        Self { colors }
    }
}

impl ColorScheme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> ColorPair {
        self.colors
            .get(&category)
            .copied()
            .unwrap_or_else(|| ColorPair::foreground(Color::rgb(0, 0, 0)))
    }

    pub fn set(&mut self, category: Category, pair: ColorPair) {
        self.colors.insert(category, pair);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, ColorPair)> + '_ {
        self.colors.iter().map(|(&c, &p)| (c, p))
    }

    /// Parse a scheme, filling categories it does not mention from the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let mut scheme = Self::default();
        if text.trim().is_empty() {
            return Ok(scheme);
        }
        let file: SchemeFile = serde_yaml::from_str(text)?;
        debug!(
            overridden = file.xml_highlighter_colors.len(),
            "loaded color scheme"
        );
        for (category, pair) in file.xml_highlighter_colors {
            scheme.set(category, pair);
        }
        Ok(scheme)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        let file = SchemeFile {
            xml_highlighter_colors: self.colors.clone(),
        };
        Ok(serde_yaml::to_string(&file)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SchemeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_yaml_string()?;
        std::fs::write(path, text).map_err(|source| SchemeError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_category() {
        let scheme = ColorScheme::default();
        for category in Category::ALL {
            assert!(scheme.colors.contains_key(&category), "{category}");
        }
        assert_eq!(
            scheme.get(Category::TagName).foreground,
            Color::named("mediumblue").unwrap()
        );
        assert_eq!(scheme.get(Category::Error).background, None);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let yaml = "xml_highlighter_colors:\n  comment:\n    foreground: red\n";
        let scheme = ColorScheme::from_yaml_str(yaml).unwrap();
        assert_eq!(
            scheme.get(Category::Comment),
            ColorPair::foreground(Color::rgb(255, 0, 0))
        );
        assert_eq!(
            scheme.get(Category::TagName),
            ColorScheme::default().get(Category::TagName)
        );
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(ColorScheme::from_yaml_str("").unwrap(), ColorScheme::default());
        assert_eq!(
            ColorScheme::from_yaml_str("other_setting: 1\n").unwrap(),
            ColorScheme::default()
        );
    }

    #[test]
    fn test_bad_color_is_an_error() {
        let yaml = "xml_highlighter_colors:\n  text:\n    foreground: \"#12\"\n";
        let err = ColorScheme::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, SchemeError::Yaml(_)));
        assert!(err.to_string().contains("#12"), "{err}");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colors.yaml");

        let mut scheme = ColorScheme::default();
        scheme.set(
            Category::CData,
            ColorPair::new(Color::rgb(1, 2, 3), Some(Color::rgb(4, 5, 6))),
        );
        scheme.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("xml_highlighter_colors:"));
        assert!(text.contains("#010203"));
        assert_eq!(ColorScheme::load(&path).unwrap(), scheme);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ColorScheme::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, SchemeError::Read { .. }));
    }
}
