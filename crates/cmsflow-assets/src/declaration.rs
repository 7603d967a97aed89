//! Reading of asset declaration files.
//!
//! A declaration file is a JSON object with a `title`, a `name` and an
//! `assets` array:
//!
//! ```json
//! {
//!   "title": "Media Manager",
//!   "name": "com_media",
//!   "assets": [
//!     {
//!       "name": "com_media.app",
//!       "version": "4.0.0",
//!       "scripts": ["media/com_media/js/app.js"],
//!       "styles": ["media/com_media/css/app.css"],
//!       "dependency": ["core"],
//!       "attribute": { "media/com_media/js/app.js": { "defer": true } }
//!     }
//!   ]
//! }
//! ```
//!
//! `js`, `css`, `dependencies` and `attributes` are accepted as aliases.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::asset::{Asset, Attributes};
use crate::error::AssetError;

#[derive(Debug, Deserialize)]
pub struct DeclarationDocument {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub assets: Vec<AssetEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AssetEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, alias = "js")]
    pub scripts: Vec<String>,
    #[serde(default, alias = "css")]
    pub styles: Vec<String>,
    #[serde(default, alias = "dependencies")]
    pub dependency: Vec<String>,
    #[serde(default, alias = "attributes")]
    pub attribute: BTreeMap<String, Attributes>,
}

/// Reads and decodes the declaration file at `path`.
///
/// # Errors
/// Unreadable, empty or undecodable content yields
/// [`AssetError::MalformedDeclaration`]; an entry without a name rejects the
/// whole file with [`AssetError::MissingName`].
pub fn read_declaration(path: &Path) -> Result<Vec<Asset>, AssetError> {
    let text = std::fs::read_to_string(path).map_err(|e| AssetError::MalformedDeclaration {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_declaration(&text, path)
}

/// Decodes declaration `text`, tagging every asset with `source` as provenance.
pub fn parse_declaration(text: &str, source: &Path) -> Result<Vec<Asset>, AssetError> {
    let malformed = |reason: String| AssetError::MalformedDeclaration {
        path: source.to_path_buf(),
        reason,
    };

    if text.trim().is_empty() {
        return Err(malformed("file is empty".to_string()));
    }

    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(malformed("top-level value is not an object".to_string()));
    }
    let document: DeclarationDocument =
        serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;

    debug!(
        "declaration '{}' ({}) lists {} asset(s)",
        document.name.as_deref().unwrap_or("<unnamed>"),
        source.display(),
        document.assets.len()
    );

    document
        .assets
        .into_iter()
        .enumerate()
        .map(|(index, entry)| -> Result<Asset, AssetError> {
            let name = entry
                .name
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| AssetError::MissingName {
                    path: source.to_path_buf(),
                    index,
                })?;
            Ok(Asset {
                name,
                version: entry.version,
                scripts: entry.scripts,
                styles: entry.styles,
                dependencies: entry.dependency,
                attributes: entry.attribute,
                provenance: Some(source.to_path_buf()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> &'static Path {
        Path::new("media/system/joomla.asset.json")
    }

    #[test]
    fn decodes_entries_with_provenance() {
        let text = r#"{
            "title": "System",
            "name": "system",
            "assets": [
                {"name": "core", "version": "4.0", "scripts": ["core.js"]},
                {"name": "ui", "js": ["ui.js"], "css": ["ui.css"],
                 "dependencies": ["core"], "attributes": {"ui.js": {"defer": true}}}
            ]
        }"#;
        let assets = parse_declaration(text, source()).expect("declaration should decode");
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].version.as_deref(), Some("4.0"));
        assert_eq!(assets[1].styles, vec!["ui.css"]);
        assert_eq!(assets[1].dependencies, vec!["core"]);
        assert_eq!(assets[1].attributes["ui.js"]["defer"], serde_json::json!(true));
        assert_eq!(assets[1].provenance.as_deref(), Some(source()));
    }

    #[test]
    fn empty_asset_list_is_accepted() {
        let assets = parse_declaration(r#"{"title": "t", "name": "n", "assets": []}"#, source())
            .expect("empty list is fine");
        assert!(assets.is_empty());
    }

    #[test]
    fn blank_or_broken_content_is_malformed() {
        for text in ["", "   \n", "{not json", "[1, 2]", "[]", "{}", r#"{"name": "n"}"#] {
            let err = parse_declaration(text, source()).expect_err("must fail");
            assert!(matches!(err, AssetError::MalformedDeclaration { .. }), "{text:?}");
        }
    }

    #[test]
    fn nameless_entry_rejects_file() {
        let text = r#"{"assets": [{"name": "ok"}, {"scripts": ["x.js"]}]}"#;
        let err = parse_declaration(text, source()).expect_err("must fail");
        assert!(matches!(err, AssetError::MissingName { index: 1, .. }));
    }

    #[test]
    fn missing_file_is_malformed() {
        let err = read_declaration(Path::new("/nonexistent/joomla.asset.json"))
            .expect_err("must fail");
        assert!(matches!(err, AssetError::MalformedDeclaration { .. }));
    }
}
