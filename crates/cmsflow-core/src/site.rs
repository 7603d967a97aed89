use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use cmsflow_assets::AssetRegistry;
use cmsflow_workflow::{
    ConditionCounts, InMemoryStore, ItemId, Transition, TransitionId, WorkflowEngine, WorkflowError,
    WorkflowItem, WorkflowStore,
};

use crate::config::CmsflowConfig;
use crate::extension::ExtensionRegistry;

/// Everything a request needs, wired from configuration at startup.
#[derive(Debug)]
pub struct Site {
    pub config: CmsflowConfig,
    pub extensions: ExtensionRegistry,
    pub engine: WorkflowEngine<InMemoryStore>,
    pub assets: AssetRegistry,
}

impl Site {
    /// Validates configuration against the registered item types, loads the
    /// configured workflows and items, and queues asset declaration files.
    ///
    /// Items without a stage are placed in their workflow's default stage.
    #[instrument(skip_all, fields(site = %config.site.name))]
    pub fn bootstrap(config: CmsflowConfig, mut extensions: ExtensionRegistry) -> Result<Self> {
        extensions.apply_overrides(&config);
        extensions.validate_workflow_support(&config)?;

        let mut store = InMemoryStore::new();
        for workflow in &config.workflows {
            let definition = workflow.to_definition();
            definition.validate().with_context(|| {
                format!("workflow {} '{}' is invalid", workflow.id, workflow.title)
            })?;
            store.insert_definition(definition);
        }

        let mut engine = WorkflowEngine::new(store);
        for item in &config.items {
            let mut item = item.clone();
            engine
                .associate(&mut item)
                .with_context(|| format!("failed to associate item {}", item.id))?;
            engine.store_mut().save_item(&item)?;
        }

        let mut assets = AssetRegistry::new();
        for path in &config.assets.files {
            if !assets.add_declaration_file(path) {
                debug!("declaration file {} not queued", path.display());
            }
        }
        for extension in &config.assets.extensions {
            assets.add_extension_declaration(&config.site.media_root, extension);
        }

        info!(
            "site ready: {} workflow(s), {} item(s), {} declaration file(s) queued",
            config.workflows.len(),
            config.items.len(),
            assets.pending_files().count()
        );

        Ok(Self {
            config,
            extensions,
            engine,
            assets,
        })
    }

    pub fn item(&self, id: ItemId) -> Result<WorkflowItem> {
        Ok(self.load_item(id)?)
    }

    fn load_item(&self, id: ItemId) -> Result<WorkflowItem, WorkflowError> {
        self.engine
            .store()
            .item(id)?
            .ok_or(WorkflowError::UnknownItem(id))
    }

    pub fn items(&self) -> Result<Vec<WorkflowItem>> {
        Ok(self.engine.store().items()?)
    }

    /// Transitions currently available to item `id`.
    pub fn transitions_for(&self, id: ItemId) -> Result<Vec<Transition>> {
        let item = self.item(id)?;
        let item_type = self.extensions.require(&item.extension)?;
        Ok(self.engine.transitions_for_item(&item, item_type)?)
    }

    pub fn classify(&self, id: ItemId) -> Result<ConditionCounts> {
        let item = self.item(id)?;
        let item_type = self.extensions.require(&item.extension)?;
        Ok(self.engine.classify_item(&item, item_type)?)
    }

    /// Fires `transition` on item `id` and returns the updated item.
    pub fn apply_transition(
        &mut self,
        id: ItemId,
        transition: TransitionId,
    ) -> Result<WorkflowItem, WorkflowError> {
        let mut item = self.load_item(id)?;
        let item_type = self.extensions.require(&item.extension)?;
        self.engine.apply_transition(&mut item, transition, item_type)?;
        Ok(item)
    }
}
