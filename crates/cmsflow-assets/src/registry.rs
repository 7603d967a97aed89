use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::asset::{Asset, AssetFile};
use crate::declaration::read_declaration;
use crate::error::AssetError;
use crate::resolve::{dependency_order, flatten_files};
use crate::DECLARATION_FILE;

#[derive(Debug)]
struct Entry {
    seq: u64,
    asset: Asset,
}

/// Name-keyed catalog of assets fed by declaration files.
///
/// Declaration files are queued by [`Self::add_declaration_file`] and only
/// read when a lookup needs current data. Each file is read at most once.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    assets: HashMap<String, Entry>,
    next_seq: u64,
    pending: VecDeque<PathBuf>,
    parsed: HashSet<PathBuf>,
    failed: HashSet<PathBuf>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a declaration file for parsing.
    ///
    /// The path is compared after lexical normalization, so `a/./b.json` and
    /// `a/b.json` are the same file. Returns `false` when the path is already
    /// known or is not a regular file.
    pub fn add_declaration_file(&mut self, path: impl AsRef<Path>) -> bool {
        let path = normalize(path.as_ref());
        if self.is_known(&path) {
            return false;
        }
        if !path.is_file() {
            debug!("ignoring missing declaration file {}", path.display());
            return false;
        }
        debug!("queued declaration file {}", path.display());
        self.pending.push_back(path);
        true
    }

    /// Queues the conventional declaration file of `extension`, i.e.
    /// `<media_root>/<extension>/joomla.asset.json`.
    pub fn add_extension_declaration(&mut self, media_root: &Path, extension: &str) -> bool {
        self.add_declaration_file(media_root.join(extension).join(DECLARATION_FILE))
    }

    fn is_known(&self, path: &Path) -> bool {
        self.parsed.contains(path)
            || self.failed.contains(path)
            || self.pending.iter().any(|p| p == path)
    }

    pub fn pending_files(&self) -> impl Iterator<Item = &Path> {
        self.pending.iter().map(PathBuf::as_path)
    }

    pub fn parsed_files(&self) -> impl Iterator<Item = &Path> {
        self.parsed.iter().map(PathBuf::as_path)
    }

    /// Parses every queued declaration file in registration order.
    ///
    /// Stops at the first file that fails: assets merged from earlier files
    /// stay, the failing file is set aside and never retried, and later files
    /// stay queued for the next call.
    ///
    /// # Errors
    /// Propagates [`AssetError::MalformedDeclaration`] or
    /// [`AssetError::MissingName`] from the failing file.
    #[instrument(skip(self))]
    pub fn parse_pending(&mut self) -> Result<usize, AssetError> {
        let mut count = 0;
        while let Some(path) = self.pending.pop_front() {
            let assets = match read_declaration(&path) {
                Ok(assets) => assets,
                Err(e) => {
                    warn!("skipping declaration file {}: {}", path.display(), e);
                    self.failed.insert(path);
                    return Err(e);
                }
            };

            debug!("merging {} asset(s) from {}", assets.len(), path.display());
            for asset in assets {
                self.add(asset);
            }
            self.parsed.insert(path);
            count += 1;
        }
        Ok(count)
    }

    /// Inserts `asset`, replacing any asset with the same name.
    pub fn add(&mut self, asset: Asset) -> Option<Asset> {
        let seq = self.next_seq;
        self.next_seq += 1;
        let previous = self.assets.insert(asset.name.clone(), Entry { seq, asset })?;
        debug!(
            "asset '{}' overrides earlier definition",
            previous.asset.name
        );
        Some(previous.asset)
    }

    /// Removes an asset. Queued declaration files are not consulted, so a
    /// queued file may bring the asset back on the next lookup.
    pub fn remove(&mut self, name: &str) -> Option<Asset> {
        self.assets.remove(name).map(|entry| entry.asset)
    }

    pub fn exists(&mut self, name: &str) -> Result<bool, AssetError> {
        self.parse_pending()?;
        Ok(self.assets.contains_key(name))
    }

    pub fn get(&mut self, name: &str) -> Result<&Asset, AssetError> {
        self.parse_pending()?;
        self.assets
            .get(name)
            .map(|entry| &entry.asset)
            .ok_or_else(|| AssetError::UnknownAsset {
                name: name.to_string(),
                required_by: None,
            })
    }

    /// All assets, in the order they were inserted.
    pub fn assets(&mut self) -> Result<Vec<&Asset>, AssetError> {
        self.parse_pending()?;
        let mut entries: Vec<&Entry> = self.assets.values().collect();
        entries.sort_by_key(|entry| entry.seq);
        Ok(entries.into_iter().map(|entry| &entry.asset).collect())
    }

    /// `name` and its transitive dependencies, each after its dependencies.
    pub fn resolve_assets(&mut self, name: &str) -> Result<Vec<&Asset>, AssetError> {
        self.resolve_many_assets(&[name])
    }

    /// Combined dependency order for several roots, walked in the given order.
    pub fn resolve_many_assets(&mut self, roots: &[&str]) -> Result<Vec<&Asset>, AssetError> {
        self.parse_pending()?;
        let assets = &self.assets;
        dependency_order(|n| assets.get(n).map(|entry| &entry.asset), roots)
    }

    /// Concrete files for `name`: every dependency's files come before the
    /// files of the asset that needs them. No asset and no file appears twice.
    ///
    /// # Errors
    /// [`AssetError::UnknownAsset`] for a missing asset anywhere in the
    /// graph, [`AssetError::CyclicDependency`] when the graph loops.
    #[instrument(skip(self))]
    pub fn resolve(&mut self, name: &str) -> Result<Vec<AssetFile>, AssetError> {
        self.resolve_many(&[name])
    }

    pub fn resolve_many(&mut self, roots: &[&str]) -> Result<Vec<AssetFile>, AssetError> {
        let order = self.resolve_many_assets(roots)?;
        let files = flatten_files(&order);
        debug!("resolved {} file(s) for {:?}", files.len(), roots);
        Ok(files)
    }
}

/// Collapses `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
