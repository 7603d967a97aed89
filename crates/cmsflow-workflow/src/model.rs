use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// Identifier of a workflow row.
    WorkflowId
);
id_type!(
    /// Identifier of a stage row.
    StageId
);
id_type!(
    /// Identifier of a transition row.
    TransitionId
);
id_type!(
    /// Identifier of a workflow-governed item (an article, a contact, ...).
    ItemId
);

/// Publication-state side effect carried by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageCondition {
    Published,
    Unpublished,
    Archived,
    Trashed,
}

impl StageCondition {
    pub const ALL: [StageCondition; 4] = [
        Self::Published,
        Self::Unpublished,
        Self::Archived,
        Self::Trashed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Unpublished => "unpublished",
            Self::Archived => "archived",
            Self::Trashed => "trashed",
        }
    }

    /// The numeric code used by item `state` columns.
    pub fn code(self) -> i8 {
        match self {
            Self::Published => 1,
            Self::Unpublished => 0,
            Self::Archived => 2,
            Self::Trashed => -2,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl Display for StageCondition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The publication state stored on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationState {
    Published,
    #[default]
    Unpublished,
    Archived,
    Trashed,
}

impl PublicationState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Unpublished => "unpublished",
            Self::Archived => "archived",
            Self::Trashed => "trashed",
        }
    }
}

impl Display for PublicationState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<StageCondition> for PublicationState {
    fn from(condition: StageCondition) -> Self {
        match condition {
            StageCondition::Published => Self::Published,
            StageCondition::Unpublished => Self::Unpublished,
            StageCondition::Archived => Self::Archived,
            StageCondition::Trashed => Self::Trashed,
        }
    }
}

/// Source endpoint of a transition.
///
/// Serialized as a plain integer where `-1` stands for [`FromStage::Any`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum FromStage {
    Any,
    Stage(StageId),
}

impl FromStage {
    pub const ANY_CODE: i64 = -1;

    pub fn matches(self, stage: StageId, allow_any: bool) -> bool {
        match self {
            Self::Any => allow_any,
            Self::Stage(id) => id == stage,
        }
    }
}

impl TryFrom<i64> for FromStage {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            Self::ANY_CODE => Ok(Self::Any),
            v if v > 0 => Ok(Self::Stage(StageId(v as u64))),
            v => Err(format!("invalid from_stage_id {v}: expected a stage id or -1")),
        }
    }
}

impl From<FromStage> for i64 {
    fn from(value: FromStage) -> Self {
        match value {
            FromStage::Any => FromStage::ANY_CODE,
            FromStage::Stage(id) => id.0 as i64,
        }
    }
}

impl Display for FromStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Stage(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    /// Owning extension, for example `com_content.article`.
    pub extension: String,
    pub title: String,
    /// System-provided workflows cannot be structurally modified.
    #[serde(default)]
    pub core: bool,
    #[serde(default)]
    pub default: bool,
    #[serde(default = "published_default")]
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub workflow_id: WorkflowId,
    pub title: String,
    #[serde(default)]
    pub ordering: i32,
    #[serde(default)]
    pub default: bool,
    #[serde(default = "published_default")]
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: TransitionId,
    pub workflow_id: WorkflowId,
    #[serde(rename = "from_stage_id")]
    pub from_stage: FromStage,
    pub to_stage_id: StageId,
    pub title: String,
    pub stage_condition: StageCondition,
    #[serde(default = "published_default")]
    pub published: bool,
    #[serde(default)]
    pub ordering: i32,
}

/// An item governed by a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowItem {
    pub id: ItemId,
    /// Item type identifier, matched against the extension registry.
    pub extension: String,
    pub workflow_id: WorkflowId,
    /// Current stage; `None` until the item is associated with its workflow.
    #[serde(default)]
    pub stage_id: Option<StageId>,
    #[serde(default)]
    pub state: PublicationState,
    #[serde(default)]
    pub featured: bool,
}

/// Input for creating a stage; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDraft {
    pub title: String,
    #[serde(default)]
    pub ordering: i32,
    #[serde(default)]
    pub default: bool,
    #[serde(default = "published_default")]
    pub published: bool,
}

/// Input for creating a transition; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDraft {
    #[serde(rename = "from_stage_id")]
    pub from_stage: FromStage,
    pub to_stage_id: StageId,
    pub title: String,
    pub stage_condition: StageCondition,
    #[serde(default = "published_default")]
    pub published: bool,
    #[serde(default)]
    pub ordering: i32,
}

fn published_default() -> bool {
    true
}

/// A workflow together with its stages and transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub workflow: Workflow,
    pub stages: Vec<Stage>,
    pub transitions: Vec<Transition>,
}

impl WorkflowDefinition {
    /// Checks the structural invariants of a loaded workflow.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        let workflow_id = self.workflow.id;
        let mut stage_ids = HashSet::new();

        for stage in &self.stages {
            if stage.workflow_id != workflow_id {
                return Err(WorkflowError::ForeignStage {
                    workflow_id,
                    stage_id: stage.id,
                });
            }
            if !stage_ids.insert(stage.id) {
                return Err(WorkflowError::Invalid(format!(
                    "stage {} is declared twice in workflow {workflow_id}",
                    stage.id
                )));
            }
        }

        match self.stages.iter().filter(|s| s.default).count() {
            1 => {}
            0 => return Err(WorkflowError::NoDefaultStage { workflow_id }),
            n => {
                return Err(WorkflowError::Invalid(format!(
                    "workflow {workflow_id} has {n} default stages"
                )))
            }
        }

        for transition in &self.transitions {
            if transition.workflow_id != workflow_id {
                return Err(WorkflowError::Invalid(format!(
                    "transition {} belongs to workflow {}, not {workflow_id}",
                    transition.id, transition.workflow_id
                )));
            }
            let endpoints = [
                match transition.from_stage {
                    FromStage::Any => None,
                    FromStage::Stage(id) => Some(id),
                },
                Some(transition.to_stage_id),
            ];
            for stage_id in endpoints.into_iter().flatten() {
                if !stage_ids.contains(&stage_id) {
                    return Err(WorkflowError::ForeignStage {
                        workflow_id,
                        stage_id,
                    });
                }
            }
        }

        Ok(())
    }
}
