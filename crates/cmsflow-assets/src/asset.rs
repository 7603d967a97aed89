use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Markup attributes for a single file, e.g. `{"defer": true}`.
pub type Attributes = BTreeMap<String, Value>;

/// A named bundle of script and style files with declared dependencies.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub scripts: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    /// Names of assets that must be loaded before this one, in order.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Attributes keyed by file reference.
    #[serde(default)]
    pub attributes: BTreeMap<String, Attributes>,
    /// Declaration file this asset was read from; `None` when added in code.
    #[serde(skip)]
    pub provenance: Option<PathBuf>,
}

impl Asset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_script(mut self, path: impl Into<String>) -> Self {
        self.scripts.push(path.into());
        self
    }

    pub fn with_style(mut self, path: impl Into<String>) -> Self {
        self.styles.push(path.into());
        self
    }

    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    pub fn with_attribute(
        mut self,
        file: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.attributes
            .entry(file.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// This asset's own files: scripts first, then styles.
    pub fn files(&self) -> impl Iterator<Item = AssetFile> + '_ {
        let scripts = self.scripts.iter().map(|p| (FileKind::Script, p));
        let styles = self.styles.iter().map(|p| (FileKind::Style, p));
        scripts.chain(styles).map(move |(kind, path)| AssetFile {
            path: path.clone(),
            kind,
            asset: self.name.clone(),
            version: self.version.clone(),
            attributes: self.attributes.get(path).cloned().unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Script,
    Style,
}

impl FileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Style => "style",
        }
    }
}

/// A concrete file produced by dependency resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetFile {
    pub path: String,
    pub kind: FileKind,
    /// Name of the asset that contributed the file.
    pub asset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl Display for AssetFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind.as_str(), self.path)?;
        if let Some(version) = &self.version {
            write!(f, "?{version}")?;
        }
        for (key, value) in &self.attributes {
            match value {
                Value::Bool(true) => write!(f, " {key}")?,
                Value::String(text) => write!(f, " {key}=\"{text}\"")?,
                other => write!(f, " {key}={other}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_list_scripts_before_styles_with_attributes() {
        let asset = Asset::new("ui")
            .with_version("1.2")
            .with_style("ui.css")
            .with_script("ui.js")
            .with_attribute("ui.js", "defer", true);

        let files: Vec<AssetFile> = asset.files().collect();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].kind, FileKind::Script);
        assert_eq!(files[0].to_string(), "script ui.js?1.2 defer");
        assert_eq!(files[1].path, "ui.css");
        assert!(files[1].attributes.is_empty());
    }
}
