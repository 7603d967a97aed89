use std::collections::HashMap;

use anyhow::{bail, Result};
use tracing::{debug, instrument, warn};

use cmsflow_workflow::{ItemType, PlainItemType, StageCondition, WorkflowError, WorkflowItem};

use crate::config::{CmsflowConfig, ExtensionSource};

/// Item type whose "any stage" capability was overridden in configuration.
#[derive(Debug)]
struct AnyStageOverride {
    inner: Box<dyn ItemType>,
    any_stage: bool,
}

impl ItemType for AnyStageOverride {
    fn extension(&self) -> &str {
        self.inner.extension()
    }

    fn supports_any_stage(&self) -> bool {
        self.any_stage
    }

    fn apply_condition(&self, item: &mut WorkflowItem, condition: StageCondition) {
        self.inner.apply_condition(item, condition)
    }
}

/// Maps extension identifiers to the item types that implement them.
///
/// Built once at startup; lookups never construct types from names.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    item_types: HashMap<String, Box<dyn ItemType>>,
}

impl ExtensionRegistry {
    /// Creates a registry holding the item types configuration can build on
    /// its own (`source = "generic"`).
    ///
    /// Builtin item types are registered by the host afterwards.
    pub fn discover(config: &CmsflowConfig) -> Result<Self> {
        debug!("discovering item types for site: {}", config.site.name);
        let mut registry = Self::default();
        for (name, ext) in &config.extensions {
            if ext.source == ExtensionSource::Generic {
                registry.register(Box::new(PlainItemType::new(name.clone())));
            }
        }
        Ok(registry)
    }

    /// Registers an item type, replacing any previous one for its extension.
    pub fn register(&mut self, item_type: Box<dyn ItemType>) {
        self.item_types
            .insert(item_type.extension().to_string(), item_type);
    }

    pub fn get(&self, extension: &str) -> Option<&dyn ItemType> {
        self.item_types.get(extension).map(|t| t.as_ref())
    }

    /// Like [`Self::get`], failing with [`WorkflowError::UnsupportedExtension`].
    pub fn require(&self, extension: &str) -> Result<&dyn ItemType, WorkflowError> {
        self.get(extension)
            .ok_or_else(|| WorkflowError::UnsupportedExtension(extension.to_string()))
    }

    pub fn extensions(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.item_types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Applies `any_stage` overrides from configuration to registered types.
    pub fn apply_overrides(&mut self, config: &CmsflowConfig) {
        for (name, ext) in &config.extensions {
            let Some(any_stage) = ext.any_stage else {
                continue;
            };
            match self.item_types.remove(name) {
                Some(inner) => {
                    debug!("extension {} any_stage={}", name, any_stage);
                    self.item_types.insert(
                        name.clone(),
                        Box::new(AnyStageOverride { inner, any_stage }),
                    );
                }
                None => warn!("any_stage override for unregistered extension '{}'", name),
            }
        }
    }

    /// Verifies every extension referenced by configuration has an item type.
    ///
    /// # Errors
    /// Returns an error naming the first unsupported extension.
    #[instrument(skip(self, cfg))]
    pub fn validate_workflow_support(&self, cfg: &CmsflowConfig) -> Result<()> {
        for (name, ext) in &cfg.extensions {
            if ext.required && self.get(name).is_none() {
                bail!("required extension '{}' has no registered item type", name);
            }
        }

        for workflow in &cfg.workflows {
            if self.get(&workflow.extension).is_none() {
                bail!(
                    "workflow {} uses extension '{}' which has no registered item type",
                    workflow.id,
                    workflow.extension
                );
            }
        }

        for item in &cfg.items {
            if self.get(&item.extension).is_none() {
                bail!(
                    "item {} uses extension '{}' which has no registered item type",
                    item.id,
                    item.extension
                );
            }
        }

        Ok(())
    }
}
