use thiserror::Error;

use crate::model::{ItemId, StageId, TransitionId, WorkflowId};

/// Failure reported by a [`crate::WorkflowStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },
    #[error("storage backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("workflow {0} not found")]
    UnknownWorkflow(WorkflowId),
    #[error("workflow {0} is unpublished")]
    WorkflowUnavailable(WorkflowId),
    #[error("stage {0} not found")]
    UnknownStage(StageId),
    #[error("workflow {workflow_id} has no default stage")]
    NoDefaultStage { workflow_id: WorkflowId },
    #[error("stage {stage_id} does not belong to workflow {workflow_id}")]
    ForeignStage {
        workflow_id: WorkflowId,
        stage_id: StageId,
    },
    #[error("transition {transition_id} cannot be applied to item {item_id}: {reason}")]
    InvalidTransition {
        item_id: ItemId,
        transition_id: TransitionId,
        reason: String,
    },
    #[error("not authorised to {action} on {asset}")]
    Authorization { action: String, asset: String },
    #[error("stage {stage_id} is still used by {items} item(s)")]
    StageInUse { stage_id: StageId, items: usize },
    #[error("stage {0} is the default stage and cannot be removed or unpublished")]
    DefaultStage(StageId),
    #[error("item {0} not found")]
    UnknownItem(ItemId),
    #[error("transition {0} not found")]
    UnknownTransition(TransitionId),
    #[error("no item type registered for extension '{0}'")]
    UnsupportedExtension(String),
    #[error("invalid workflow definition: {0}")]
    Invalid(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    pub(crate) fn invalid_transition(
        item_id: ItemId,
        transition_id: TransitionId,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidTransition {
            item_id,
            transition_id,
            reason: reason.into(),
        }
    }
}
