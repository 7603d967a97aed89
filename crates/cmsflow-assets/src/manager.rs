use tracing::debug;

use crate::asset::AssetFile;
use crate::error::AssetError;
use crate::registry::AssetRegistry;

/// The set of assets a single page render asked for.
///
/// Create one per request; the registry it reads from can be shared.
#[derive(Debug, Default, Clone)]
pub struct AssetManager {
    active: Vec<String>,
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables `name`. Enabling twice keeps the first position.
    pub fn use_asset(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if !self.is_active(&name) {
            debug!("enabling asset '{}'", name);
            self.active.push(name);
        }
        self
    }

    pub fn disable_asset(&mut self, name: &str) -> &mut Self {
        self.active.retain(|n| n != name);
        self
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.iter().any(|n| n == name)
    }

    pub fn active(&self) -> &[String] {
        &self.active
    }

    /// Files for every enabled asset and their dependencies, in enable order.
    pub fn files(&self, registry: &mut AssetRegistry) -> Result<Vec<AssetFile>, AssetError> {
        let roots: Vec<&str> = self.active.iter().map(String::as_str).collect();
        registry.resolve_many(&roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;

    #[test]
    fn combines_enabled_assets_without_duplicates() {
        let mut registry = AssetRegistry::new();
        registry.add(Asset::new("core").with_script("core.js"));
        registry.add(Asset::new("form").with_dependency("core").with_script("form.js"));
        registry.add(Asset::new("modal").with_dependency("core").with_style("modal.css"));

        let mut manager = AssetManager::new();
        manager.use_asset("modal").use_asset("form").use_asset("modal");
        assert_eq!(manager.active(), ["modal", "form"]);

        let paths: Vec<String> = manager
            .files(&mut registry)
            .unwrap()
            .into_iter()
            .map(|f| f.path)
            .collect();
        assert_eq!(paths, vec!["core.js", "modal.css", "form.js"]);

        manager.disable_asset("modal");
        assert!(!manager.is_active("modal"));
        assert_eq!(manager.files(&mut registry).unwrap().len(), 2);
    }

    #[test]
    fn unknown_enabled_asset_fails() {
        let mut registry = AssetRegistry::new();
        let mut manager = AssetManager::new();
        manager.use_asset("ghost");
        assert!(matches!(
            manager.files(&mut registry),
            Err(AssetError::UnknownAsset { .. })
        ));
    }
}
