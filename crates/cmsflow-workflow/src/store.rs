use std::collections::BTreeMap;

use tracing::debug;

use crate::error::StoreError;
use crate::model::{
    FromStage, ItemId, Stage, StageDraft, StageId, Transition, TransitionDraft, TransitionId, Workflow,
    WorkflowDefinition, WorkflowId, WorkflowItem,
};

/// Persistence collaborator for workflows, stages, transitions and items.
///
/// Each method is one logical unit of work. Implementations backed by a
/// transactional database must run every mutating method inside a single
/// transaction.
pub trait WorkflowStore: std::fmt::Debug {
    fn workflow(&self, id: WorkflowId) -> Result<Option<Workflow>, StoreError>;
    fn workflows(&self) -> Result<Vec<Workflow>, StoreError>;
    fn stage(&self, id: StageId) -> Result<Option<Stage>, StoreError>;
    /// Stages of a workflow, sorted by `ordering`.
    fn stages(&self, workflow_id: WorkflowId) -> Result<Vec<Stage>, StoreError>;
    fn transition(&self, id: TransitionId) -> Result<Option<Transition>, StoreError>;
    fn transitions(&self, workflow_id: WorkflowId) -> Result<Vec<Transition>, StoreError>;
    fn item(&self, id: ItemId) -> Result<Option<WorkflowItem>, StoreError>;
    fn items(&self) -> Result<Vec<WorkflowItem>, StoreError>;
    /// Number of items currently sitting in `stage_id`.
    fn items_in_stage(&self, stage_id: StageId) -> Result<usize, StoreError>;

    /// Inserts a stage. A default draft becomes the workflow's only default
    /// stage within the same unit of work.
    fn insert_stage(&mut self, workflow_id: WorkflowId, draft: StageDraft)
        -> Result<Stage, StoreError>;
    fn insert_transition(
        &mut self,
        workflow_id: WorkflowId,
        draft: TransitionDraft,
    ) -> Result<Transition, StoreError>;
    /// Removes a stage along with every transition leading to or from it.
    fn delete_stage(&mut self, stage_id: StageId) -> Result<(), StoreError>;
    fn delete_transition(&mut self, transition_id: TransitionId) -> Result<(), StoreError>;
    /// Marks `stage_id` as the only default stage of `workflow_id`.
    fn set_default_stage(
        &mut self,
        workflow_id: WorkflowId,
        stage_id: StageId,
    ) -> Result<(), StoreError>;
    fn set_stage_published(&mut self, stage_id: StageId, published: bool)
        -> Result<(), StoreError>;
    fn set_transition_published(
        &mut self,
        transition_id: TransitionId,
        published: bool,
    ) -> Result<(), StoreError>;
    /// Writes the item's stage and publication state together.
    fn save_item(&mut self, item: &WorkflowItem) -> Result<(), StoreError>;
}

/// A [`WorkflowStore`] kept entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    workflows: BTreeMap<WorkflowId, Workflow>,
    stages: BTreeMap<StageId, Stage>,
    transitions: BTreeMap<TransitionId, Transition>,
    items: BTreeMap<ItemId, WorkflowItem>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a workflow definition, replacing rows with the same ids.
    pub fn insert_definition(&mut self, definition: WorkflowDefinition) {
        debug!(
            "loading workflow {} ({} stages, {} transitions)",
            definition.workflow.id,
            definition.stages.len(),
            definition.transitions.len()
        );
        for stage in definition.stages {
            self.stages.insert(stage.id, stage);
        }
        for transition in definition.transitions {
            self.transitions.insert(transition.id, transition);
        }
        self.workflows
            .insert(definition.workflow.id, definition.workflow);
    }

    pub fn insert_item(&mut self, item: WorkflowItem) {
        self.items.insert(item.id, item);
    }

    fn next_stage_id(&self) -> StageId {
        StageId(self.stages.keys().next_back().map_or(1, |id| id.0 + 1))
    }

    fn next_transition_id(&self) -> TransitionId {
        TransitionId(self.transitions.keys().next_back().map_or(1, |id| id.0 + 1))
    }
}

impl WorkflowStore for InMemoryStore {
    fn workflow(&self, id: WorkflowId) -> Result<Option<Workflow>, StoreError> {
        Ok(self.workflows.get(&id).cloned())
    }

    fn workflows(&self) -> Result<Vec<Workflow>, StoreError> {
        Ok(self.workflows.values().cloned().collect())
    }

    fn stage(&self, id: StageId) -> Result<Option<Stage>, StoreError> {
        Ok(self.stages.get(&id).cloned())
    }

    fn stages(&self, workflow_id: WorkflowId) -> Result<Vec<Stage>, StoreError> {
        let mut stages: Vec<Stage> = self
            .stages
            .values()
            .filter(|s| s.workflow_id == workflow_id)
            .cloned()
            .collect();
        stages.sort_by_key(|s| (s.ordering, s.id));
        Ok(stages)
    }

    fn transitions(&self, workflow_id: WorkflowId) -> Result<Vec<Transition>, StoreError> {
        Ok(self
            .transitions
            .values()
            .filter(|t| t.workflow_id == workflow_id)
            .cloned()
            .collect())
    }

    fn transition(&self, id: TransitionId) -> Result<Option<Transition>, StoreError> {
        Ok(self.transitions.get(&id).cloned())
    }

    fn item(&self, id: ItemId) -> Result<Option<WorkflowItem>, StoreError> {
        Ok(self.items.get(&id).cloned())
    }

    fn items(&self) -> Result<Vec<WorkflowItem>, StoreError> {
        Ok(self.items.values().cloned().collect())
    }

    fn items_in_stage(&self, stage_id: StageId) -> Result<usize, StoreError> {
        Ok(self
            .items
            .values()
            .filter(|item| item.stage_id == Some(stage_id))
            .count())
    }

    fn insert_stage(
        &mut self,
        workflow_id: WorkflowId,
        draft: StageDraft,
    ) -> Result<Stage, StoreError> {
        if !self.workflows.contains_key(&workflow_id) {
            return Err(StoreError::NotFound {
                kind: "workflow",
                id: workflow_id.0,
            });
        }
        let stage = Stage {
            id: self.next_stage_id(),
            workflow_id,
            title: draft.title,
            ordering: draft.ordering,
            default: draft.default,
            published: draft.published,
        };
        if stage.default {
            for other in self
                .stages
                .values_mut()
                .filter(|s| s.workflow_id == workflow_id)
            {
                other.default = false;
            }
        }
        self.stages.insert(stage.id, stage.clone());
        Ok(stage)
    }

    fn insert_transition(
        &mut self,
        workflow_id: WorkflowId,
        draft: TransitionDraft,
    ) -> Result<Transition, StoreError> {
        if !self.workflows.contains_key(&workflow_id) {
            return Err(StoreError::NotFound {
                kind: "workflow",
                id: workflow_id.0,
            });
        }
        let transition = Transition {
            id: self.next_transition_id(),
            workflow_id,
            from_stage: draft.from_stage,
            to_stage_id: draft.to_stage_id,
            title: draft.title,
            stage_condition: draft.stage_condition,
            published: draft.published,
            ordering: draft.ordering,
        };
        self.transitions.insert(transition.id, transition.clone());
        Ok(transition)
    }

    fn delete_stage(&mut self, stage_id: StageId) -> Result<(), StoreError> {
        if self.stages.remove(&stage_id).is_none() {
            return Err(StoreError::NotFound {
                kind: "stage",
                id: stage_id.0,
            });
        }
        self.transitions.retain(|_, t| {
            t.to_stage_id != stage_id && t.from_stage != FromStage::Stage(stage_id)
        });
        Ok(())
    }

    fn delete_transition(&mut self, transition_id: TransitionId) -> Result<(), StoreError> {
        self.transitions
            .remove(&transition_id)
            .map(|_| ())
            .ok_or(StoreError::NotFound {
                kind: "transition",
                id: transition_id.0,
            })
    }

    fn set_default_stage(
        &mut self,
        workflow_id: WorkflowId,
        stage_id: StageId,
    ) -> Result<(), StoreError> {
        if !self.stages.contains_key(&stage_id) {
            return Err(StoreError::NotFound {
                kind: "stage",
                id: stage_id.0,
            });
        }
        for stage in self
            .stages
            .values_mut()
            .filter(|s| s.workflow_id == workflow_id)
        {
            stage.default = stage.id == stage_id;
        }
        Ok(())
    }

    fn set_stage_published(&mut self, stage_id: StageId, published: bool) -> Result<(), StoreError> {
        let stage = self.stages.get_mut(&stage_id).ok_or(StoreError::NotFound {
            kind: "stage",
            id: stage_id.0,
        })?;
        stage.published = published;
        Ok(())
    }

    fn set_transition_published(
        &mut self,
        transition_id: TransitionId,
        published: bool,
    ) -> Result<(), StoreError> {
        let transition = self
            .transitions
            .get_mut(&transition_id)
            .ok_or(StoreError::NotFound {
                kind: "transition",
                id: transition_id.0,
            })?;
        transition.published = published;
        Ok(())
    }

    fn save_item(&mut self, item: &WorkflowItem) -> Result<(), StoreError> {
        self.items.insert(item.id, item.clone());
        Ok(())
    }
}
