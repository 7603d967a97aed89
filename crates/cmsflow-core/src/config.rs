use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use cmsflow_workflow::{
    FromStage, Stage, StageCondition, StageId, Transition, TransitionId, Workflow,
    WorkflowDefinition, WorkflowId, WorkflowItem,
};

use crate::constants::DEFAULT_MEDIA_ROOT;

#[derive(Debug, Deserialize)]
pub struct CmsflowConfig {
    pub site: SiteConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub extensions: HashMap<String, ExtensionConfig>,
    #[serde(default)]
    pub workflows: Vec<WorkflowConfig>,
    #[serde(default)]
    pub items: Vec<WorkflowItem>,
}

impl CmsflowConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {path}"))?;
        let cfg = toml::from_str::<Self>(&text)
            .with_context(|| format!("failed to parse TOML config: {path}"))?;
        Ok(cfg)
    }
}

#[derive(Debug, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,
}

fn default_media_root() -> PathBuf {
    PathBuf::from(DEFAULT_MEDIA_ROOT)
}

#[derive(Debug, Deserialize, Default)]
pub struct AssetsConfig {
    /// Declaration files registered explicitly.
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// Extensions whose conventional declaration file is registered.
    #[serde(default)]
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionConfig {
    pub source: ExtensionSource,
    /// Overrides the item type's own "any stage" transition capability.
    pub any_stage: Option<bool>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionSource {
    /// Item type compiled into the host and registered in code.
    Builtin,
    /// Item type with no secondary flags, created from configuration alone.
    Generic,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    pub id: u64,
    pub extension: String,
    pub title: String,
    #[serde(default)]
    pub core: bool,
    #[serde(default)]
    pub default: bool,
    #[serde(default = "enabled")]
    pub published: bool,
    #[serde(default)]
    pub stages: Vec<StageConfig>,
    #[serde(default)]
    pub transitions: Vec<TransitionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StageConfig {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub ordering: i32,
    #[serde(default)]
    pub default: bool,
    #[serde(default = "enabled")]
    pub published: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionConfig {
    pub id: u64,
    pub title: String,
    /// A stage id, or `-1` for "any stage".
    pub from_stage_id: FromStage,
    pub to_stage_id: u64,
    pub stage_condition: StageCondition,
    #[serde(default = "enabled")]
    pub published: bool,
    #[serde(default)]
    pub ordering: i32,
}

fn enabled() -> bool {
    true
}

impl WorkflowConfig {
    /// Expands the nested table form into workflow rows.
    pub fn to_definition(&self) -> WorkflowDefinition {
        let workflow_id = WorkflowId(self.id);
        WorkflowDefinition {
            workflow: Workflow {
                id: workflow_id,
                extension: self.extension.clone(),
                title: self.title.clone(),
                core: self.core,
                default: self.default,
                published: self.published,
            },
            stages: self
                .stages
                .iter()
                .map(|s| Stage {
                    id: StageId(s.id),
                    workflow_id,
                    title: s.title.clone(),
                    ordering: s.ordering,
                    default: s.default,
                    published: s.published,
                })
                .collect(),
            transitions: self
                .transitions
                .iter()
                .map(|t| Transition {
                    id: TransitionId(t.id),
                    workflow_id,
                    from_stage: t.from_stage_id,
                    to_stage_id: StageId(t.to_stage_id),
                    title: t.title.clone(),
                    stage_condition: t.stage_condition,
                    published: t.published,
                    ordering: t.ordering,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmsflow_workflow::PublicationState;

    const FIXTURE: &str = r#"
        [site]
        name = "demo"

        [assets]
        files = ["media/system/joomla.asset.json"]
        extensions = ["com_content"]

        [extensions."com_content.article"]
        source = "builtin"
        any_stage = false
        required = true

        [[workflows]]
        id = 1
        extension = "com_content.article"
        title = "Basic Workflow"
        core = true
        default = true

        [[workflows.stages]]
        id = 1
        title = "Basic Stage"
        default = true

        [[workflows.transitions]]
        id = 1
        title = "Publish"
        from_stage_id = -1
        to_stage_id = 1
        stage_condition = "published"
        ordering = 1

        [[items]]
        id = 7
        extension = "com_content.article"
        workflow_id = 1
        state = "trashed"
    "#;

    #[test]
    fn parses_full_fixture() {
        let cfg: CmsflowConfig = toml::from_str(FIXTURE).expect("fixture config should parse");
        assert_eq!(cfg.site.media_root, PathBuf::from("media"));
        assert_eq!(cfg.assets.extensions, vec!["com_content"]);

        let ext = &cfg.extensions["com_content.article"];
        assert_eq!(ext.source, ExtensionSource::Builtin);
        assert_eq!(ext.any_stage, Some(false));

        let definition = cfg.workflows[0].to_definition();
        definition.validate().expect("fixture workflow is valid");
        assert!(definition.workflow.core);
        assert_eq!(definition.transitions[0].from_stage, FromStage::Any);
        assert_eq!(definition.stages[0].workflow_id, WorkflowId(1));

        assert_eq!(cfg.items[0].state, PublicationState::Trashed);
        assert_eq!(cfg.items[0].stage_id, None);
    }

    #[test]
    fn rejects_unknown_condition() {
        let text = FIXTURE.replace("\"published\"", "\"featured\"");
        assert!(toml::from_str::<CmsflowConfig>(&text).is_err());
    }

    #[test]
    fn load_from_missing_file_has_context() {
        let err = CmsflowConfig::load_from_file("/nonexistent/cmsflow.toml").expect_err("must fail");
        assert!(err.to_string().contains("failed to read config file"));
    }
}
