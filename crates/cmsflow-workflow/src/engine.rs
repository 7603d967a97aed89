use tracing::{debug, info, instrument};

use crate::auth::{self, AllowAll, Authorizer};
use crate::classify::{classify_transitions, ConditionCounts};
use crate::error::WorkflowError;
use crate::item::ItemType;
use crate::model::{
    FromStage, Stage, StageDraft, StageId, Transition, TransitionDraft, TransitionId, Workflow,
    WorkflowId, WorkflowItem,
};
use crate::store::WorkflowStore;

/// Drives items through the stages of their workflow.
#[derive(Debug)]
pub struct WorkflowEngine<S> {
    store: S,
    authorizer: Box<dyn Authorizer>,
}

impl<S: WorkflowStore> WorkflowEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            authorizer: Box::new(AllowAll),
        }
    }

    pub fn with_authorizer(mut self, authorizer: Box<dyn Authorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn workflow(&self, workflow_id: WorkflowId) -> Result<Workflow, WorkflowError> {
        self.store
            .workflow(workflow_id)?
            .ok_or(WorkflowError::UnknownWorkflow(workflow_id))
    }

    /// Returns the stage new items of `workflow_id` start in.
    pub fn default_stage(&self, workflow_id: WorkflowId) -> Result<Stage, WorkflowError> {
        self.store
            .stages(workflow_id)?
            .into_iter()
            .find(|s| s.default)
            .ok_or(WorkflowError::NoDefaultStage { workflow_id })
    }

    /// Lists the published transitions leaving `stage_id`, ordered by `ordering`.
    ///
    /// Transitions declared from "any stage" are included only when
    /// `allow_any` is set.
    ///
    /// # Errors
    /// Fails when the workflow is unknown or unpublished.
    #[instrument(skip(self))]
    pub fn applicable_transitions(
        &self,
        workflow_id: WorkflowId,
        stage_id: StageId,
        allow_any: bool,
    ) -> Result<Vec<Transition>, WorkflowError> {
        let workflow = self.workflow(workflow_id)?;
        if !workflow.published {
            return Err(WorkflowError::WorkflowUnavailable(workflow_id));
        }

        let mut transitions: Vec<Transition> = self
            .store
            .transitions(workflow_id)?
            .into_iter()
            .filter(|t| t.published && t.from_stage.matches(stage_id, allow_any))
            .collect();
        transitions.sort_by_key(|t| (t.ordering, t.id));

        debug!(
            "{} transition(s) available from stage {}",
            transitions.len(),
            stage_id
        );
        Ok(transitions)
    }

    /// Same as [`Self::applicable_transitions`], keyed on an item.
    ///
    /// Items not yet associated are treated as sitting in the default stage.
    pub fn transitions_for_item(
        &self,
        item: &WorkflowItem,
        item_type: &dyn ItemType,
    ) -> Result<Vec<Transition>, WorkflowError> {
        ensure_item_type(item, item_type)?;
        let stage_id = self.current_stage(item)?;
        self.applicable_transitions(item.workflow_id, stage_id, item_type.supports_any_stage())
    }

    /// Counts the transitions available to `item` per condition.
    pub fn classify_item(
        &self,
        item: &WorkflowItem,
        item_type: &dyn ItemType,
    ) -> Result<ConditionCounts, WorkflowError> {
        let transitions = self.transitions_for_item(item, item_type)?;
        Ok(classify_transitions(&transitions))
    }

    fn current_stage(&self, item: &WorkflowItem) -> Result<StageId, WorkflowError> {
        match item.stage_id {
            Some(stage_id) => Ok(stage_id),
            None => Ok(self.default_stage(item.workflow_id)?.id),
        }
    }

    /// Places an item without a stage into its workflow's default stage.
    ///
    /// Items that already have a stage are left untouched.
    #[instrument(skip(self, item), fields(item = %item.id))]
    pub fn associate(&mut self, item: &mut WorkflowItem) -> Result<StageId, WorkflowError> {
        if let Some(stage_id) = item.stage_id {
            return Ok(stage_id);
        }

        let stage = self.default_stage(item.workflow_id)?;
        let mut updated = item.clone();
        updated.stage_id = Some(stage.id);
        self.store.save_item(&updated)?;
        *item = updated;

        debug!("item {} associated with stage {}", item.id, stage.id);
        Ok(stage.id)
    }

    /// Fires `transition_id` on `item`.
    ///
    /// The stage change and the publication-state change are persisted with a
    /// single [`WorkflowStore::save_item`] call and copied back into `item`
    /// only after that call succeeds. On error `item` is left as it was.
    ///
    /// # Errors
    /// Returns [`WorkflowError::InvalidTransition`] when the transition is
    /// unknown, unpublished, belongs to another workflow or does not leave the
    /// item's current stage, and [`WorkflowError::Authorization`] when the
    /// authorizer refuses execution.
    #[instrument(skip(self, item, item_type), fields(item = %item.id))]
    pub fn apply_transition(
        &mut self,
        item: &mut WorkflowItem,
        transition_id: TransitionId,
        item_type: &dyn ItemType,
    ) -> Result<(), WorkflowError> {
        ensure_item_type(item, item_type)?;
        let item_id = item.id;
        let invalid =
            |reason: &str| WorkflowError::invalid_transition(item_id, transition_id, reason);

        let transition = self
            .store
            .transition(transition_id)?
            .ok_or_else(|| invalid("transition does not exist"))?;
        if transition.workflow_id != item.workflow_id {
            return Err(invalid("transition belongs to another workflow"));
        }
        if !transition.published {
            return Err(invalid("transition is unpublished"));
        }

        let workflow = self.workflow(item.workflow_id)?;
        if !workflow.published {
            return Err(invalid("workflow is unpublished"));
        }

        let current = self.current_stage(item)?;
        if !transition
            .from_stage
            .matches(current, item_type.supports_any_stage())
        {
            let reason = match transition.from_stage {
                FromStage::Any => "any-stage transitions are disabled for this item type".to_string(),
                FromStage::Stage(from) => {
                    format!("item is in stage {current}, transition leaves stage {from}")
                }
            };
            return Err(invalid(reason.as_str()));
        }

        let target = self
            .store
            .stage(transition.to_stage_id)?
            .ok_or(WorkflowError::UnknownStage(transition.to_stage_id))?;
        if target.workflow_id != workflow.id {
            return Err(WorkflowError::ForeignStage {
                workflow_id: workflow.id,
                stage_id: target.id,
            });
        }

        let asset = auth::transition_asset(&workflow.extension, transition.id);
        if !self
            .authorizer
            .authorise(auth::ACTION_EXECUTE_TRANSITION, &asset)
        {
            return Err(WorkflowError::Authorization {
                action: auth::ACTION_EXECUTE_TRANSITION.to_string(),
                asset,
            });
        }

        let mut updated = item.clone();
        updated.stage_id = Some(target.id);
        item_type.apply_condition(&mut updated, transition.stage_condition);
        self.store.save_item(&updated)?;
        *item = updated;

        info!(
            "item {} moved {} -> {} ({})",
            item.id, current, target.id, transition.stage_condition
        );
        Ok(())
    }

    /// Loads a workflow for structural change, refusing core workflows and
    /// users without `action` permission.
    fn guard_structure(
        &self,
        workflow_id: WorkflowId,
        action: &str,
    ) -> Result<Workflow, WorkflowError> {
        let workflow = self.workflow(workflow_id)?;
        let asset = auth::workflow_asset(workflow_id);
        if workflow.core || !self.authorizer.authorise(action, &asset) {
            return Err(WorkflowError::Authorization {
                action: action.to_string(),
                asset,
            });
        }
        Ok(workflow)
    }

    fn stage(&self, stage_id: StageId) -> Result<Stage, WorkflowError> {
        self.store
            .stage(stage_id)?
            .ok_or(WorkflowError::UnknownStage(stage_id))
    }

    #[instrument(skip(self, draft))]
    pub fn add_stage(
        &mut self,
        workflow_id: WorkflowId,
        draft: StageDraft,
    ) -> Result<Stage, WorkflowError> {
        self.guard_structure(workflow_id, auth::ACTION_CREATE)?;
        let stage = self.store.insert_stage(workflow_id, draft)?;
        debug!("created stage {} '{}'", stage.id, stage.title);
        Ok(stage)
    }

    #[instrument(skip(self, draft))]
    pub fn add_transition(
        &mut self,
        workflow_id: WorkflowId,
        draft: TransitionDraft,
    ) -> Result<Transition, WorkflowError> {
        self.guard_structure(workflow_id, auth::ACTION_CREATE)?;

        let endpoints = match draft.from_stage {
            FromStage::Any => vec![draft.to_stage_id],
            FromStage::Stage(from) => vec![from, draft.to_stage_id],
        };
        for stage_id in endpoints {
            let stage = self.stage(stage_id)?;
            if stage.workflow_id != workflow_id {
                return Err(WorkflowError::ForeignStage {
                    workflow_id,
                    stage_id,
                });
            }
        }

        let transition = self.store.insert_transition(workflow_id, draft)?;
        debug!("created transition {} '{}'", transition.id, transition.title);
        Ok(transition)
    }

    /// Deletes a stage and the transitions touching it.
    ///
    /// # Errors
    /// Refuses the default stage and any stage that still holds items.
    #[instrument(skip(self))]
    pub fn remove_stage(&mut self, stage_id: StageId) -> Result<(), WorkflowError> {
        let stage = self.stage(stage_id)?;
        self.guard_structure(stage.workflow_id, auth::ACTION_DELETE)?;

        if stage.default {
            return Err(WorkflowError::DefaultStage(stage_id));
        }
        let items = self.store.items_in_stage(stage_id)?;
        if items > 0 {
            return Err(WorkflowError::StageInUse { stage_id, items });
        }

        self.store.delete_stage(stage_id)?;
        debug!("removed stage {}", stage_id);
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn remove_transition(&mut self, transition_id: TransitionId) -> Result<(), WorkflowError> {
        let transition = self
            .store
            .transition(transition_id)?
            .ok_or(WorkflowError::UnknownTransition(transition_id))?;
        self.guard_structure(transition.workflow_id, auth::ACTION_DELETE)?;
        self.store.delete_transition(transition_id)?;
        debug!("removed transition {}", transition_id);
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn set_default_stage(&mut self, stage_id: StageId) -> Result<(), WorkflowError> {
        let stage = self.stage(stage_id)?;
        self.guard_structure(stage.workflow_id, auth::ACTION_EDIT)?;
        self.store.set_default_stage(stage.workflow_id, stage_id)?;
        Ok(())
    }

    /// Publishes or unpublishes a stage. The default stage stays published.
    #[instrument(skip(self))]
    pub fn set_stage_published(
        &mut self,
        stage_id: StageId,
        published: bool,
    ) -> Result<(), WorkflowError> {
        let stage = self.stage(stage_id)?;
        self.guard_structure(stage.workflow_id, auth::ACTION_EDIT_STATE)?;
        if stage.default && !published {
            return Err(WorkflowError::DefaultStage(stage_id));
        }
        self.store.set_stage_published(stage_id, published)?;
        debug!("stage {} published={}", stage_id, published);
        Ok(())
    }

    /// Publishes or unpublishes a transition. Unpublished transitions are
    /// neither listed nor applicable.
    #[instrument(skip(self))]
    pub fn set_transition_published(
        &mut self,
        transition_id: TransitionId,
        published: bool,
    ) -> Result<(), WorkflowError> {
        let transition = self
            .store
            .transition(transition_id)?
            .ok_or(WorkflowError::UnknownTransition(transition_id))?;
        self.guard_structure(transition.workflow_id, auth::ACTION_EDIT_STATE)?;
        self.store.set_transition_published(transition_id, published)?;
        debug!("transition {} published={}", transition_id, published);
        Ok(())
    }
}

fn ensure_item_type(item: &WorkflowItem, item_type: &dyn ItemType) -> Result<(), WorkflowError> {
    if item.extension != item_type.extension() {
        return Err(WorkflowError::UnsupportedExtension(item.extension.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::PlainItemType;
    use crate::model::{ItemId, PublicationState, StageCondition, WorkflowDefinition};
    use crate::store::InMemoryStore;

    const EXT: &str = "com_content.article";

    #[derive(Debug)]
    struct DenyAll;

    impl Authorizer for DenyAll {
        fn authorise(&self, _action: &str, _asset: &str) -> bool {
            false
        }
    }

    fn stage(id: u64, title: &str, default: bool) -> Stage {
        Stage {
            id: StageId(id),
            workflow_id: WorkflowId(1),
            title: title.to_string(),
            ordering: id as i32,
            default,
            published: true,
        }
    }

    fn transition(
        id: u64,
        from: FromStage,
        to: u64,
        condition: StageCondition,
        ordering: i32,
    ) -> Transition {
        Transition {
            id: TransitionId(id),
            workflow_id: WorkflowId(1),
            from_stage: from,
            to_stage_id: StageId(to),
            title: format!("t{id}"),
            stage_condition: condition,
            published: true,
            ordering,
        }
    }

    fn fixture(core: bool) -> WorkflowEngine<InMemoryStore> {
        let mut store = InMemoryStore::new();
        store.insert_definition(WorkflowDefinition {
            workflow: Workflow {
                id: WorkflowId(1),
                extension: EXT.to_string(),
                title: "Editorial".to_string(),
                core,
                default: true,
                published: true,
            },
            stages: vec![
                stage(1, "Draft", true),
                stage(2, "Review", false),
                stage(3, "Live", false),
            ],
            transitions: vec![
                transition(1, FromStage::Stage(StageId(1)), 2, StageCondition::Unpublished, 2),
                transition(2, FromStage::Stage(StageId(2)), 3, StageCondition::Published, 1),
                transition(3, FromStage::Stage(StageId(3)), 1, StageCondition::Unpublished, 1),
                transition(4, FromStage::Stage(StageId(1)), 3, StageCondition::Published, 1),
                transition(5, FromStage::Any, 1, StageCondition::Trashed, 9),
                Transition {
                    published: false,
                    ..transition(6, FromStage::Stage(StageId(1)), 3, StageCondition::Archived, 0)
                },
            ],
        });
        WorkflowEngine::new(store)
    }

    fn article(stage: Option<u64>) -> WorkflowItem {
        WorkflowItem {
            id: ItemId(10),
            extension: EXT.to_string(),
            workflow_id: WorkflowId(1),
            stage_id: stage.map(StageId),
            state: PublicationState::Unpublished,
            featured: false,
        }
    }

    fn ids(transitions: &[Transition]) -> Vec<u64> {
        transitions.iter().map(|t| t.id.0).collect()
    }

    #[test]
    fn applicable_transitions_are_published_and_ordered() {
        let engine = fixture(false);
        let out = engine
            .applicable_transitions(WorkflowId(1), StageId(1), false)
            .expect("workflow is published");
        assert_eq!(ids(&out), vec![4, 1]);
        assert!(out
            .iter()
            .all(|t| t.published && t.from_stage == FromStage::Stage(StageId(1))));
    }

    #[test]
    fn wildcard_transitions_follow_capability() {
        let engine = fixture(false);
        let out = engine
            .applicable_transitions(WorkflowId(1), StageId(2), true)
            .unwrap();
        assert_eq!(ids(&out), vec![2, 5]);

        let item_type = PlainItemType::new(EXT);
        let out = engine
            .transitions_for_item(&article(Some(2)), &item_type)
            .unwrap();
        assert_eq!(ids(&out), vec![2]);
    }

    #[test]
    fn unpublished_workflow_offers_nothing() {
        let mut engine = fixture(false);
        let mut workflow = engine.store().workflow(WorkflowId(1)).unwrap().unwrap();
        workflow.published = false;
        engine.store_mut().insert_definition(WorkflowDefinition {
            workflow,
            stages: vec![],
            transitions: vec![],
        });
        let err = engine
            .applicable_transitions(WorkflowId(1), StageId(1), false)
            .expect_err("must fail");
        assert!(matches!(err, WorkflowError::WorkflowUnavailable(_)));
    }

    #[test]
    fn apply_sets_stage_and_state_for_every_condition() {
        let cases = [
            (4, StageCondition::Published, PublicationState::Published, 3),
            (1, StageCondition::Unpublished, PublicationState::Unpublished, 2),
        ];
        let item_type = PlainItemType::new(EXT);
        for (transition_id, _, state, stage) in cases {
            let mut engine = fixture(false);
            let mut item = article(Some(1));
            engine
                .apply_transition(&mut item, TransitionId(transition_id), &item_type)
                .expect("transition applies");
            assert_eq!(item.stage_id, Some(StageId(stage)));
            assert_eq!(item.state, state);
            assert_eq!(engine.store().item(item.id).unwrap(), Some(item));
        }

        let mut engine = fixture(false);
        let archived = engine
            .add_transition(
                WorkflowId(1),
                TransitionDraft {
                    from_stage: FromStage::Stage(StageId(1)),
                    to_stage_id: StageId(3),
                    title: "Archive".to_string(),
                    stage_condition: StageCondition::Archived,
                    published: true,
                    ordering: 5,
                },
            )
            .unwrap();
        let mut item = article(Some(1));
        engine
            .apply_transition(&mut item, archived.id, &item_type)
            .unwrap();
        assert_eq!(item.state, PublicationState::Archived);

        let trash_type = PlainItemType::new(EXT).with_any_stage(true);
        engine
            .apply_transition(&mut item, TransitionId(5), &trash_type)
            .unwrap();
        assert_eq!(item.state, PublicationState::Trashed);
        assert_eq!(item.stage_id, Some(StageId(1)));
    }

    #[test]
    fn mismatched_stage_leaves_item_unchanged() {
        let mut engine = fixture(false);
        let item_type = PlainItemType::new(EXT);
        let mut item = article(Some(3));
        let before = item.clone();

        let err = engine
            .apply_transition(&mut item, TransitionId(1), &item_type)
            .expect_err("stage mismatch must fail");
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
        assert_eq!(item, before);
        assert_eq!(engine.store().item(item.id).unwrap(), None);
    }

    #[test]
    fn unpublished_or_wildcard_disabled_transition_is_invalid() {
        let mut engine = fixture(false);
        let item_type = PlainItemType::new(EXT);
        let mut item = article(Some(1));

        let err = engine
            .apply_transition(&mut item, TransitionId(6), &item_type)
            .expect_err("unpublished");
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));

        let err = engine
            .apply_transition(&mut item, TransitionId(5), &item_type)
            .expect_err("wildcard disabled");
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
        assert_eq!(item, article(Some(1)));
    }

    #[test]
    fn cycles_are_allowed() {
        let mut engine = fixture(true);
        let item_type = PlainItemType::new(EXT);
        let mut item = article(Some(1));
        for id in [1, 2, 3, 1] {
            engine
                .apply_transition(&mut item, TransitionId(id), &item_type)
                .unwrap();
        }
        assert_eq!(item.stage_id, Some(StageId(2)));
    }

    #[test]
    fn unassociated_item_starts_in_default_stage() {
        let mut engine = fixture(false);
        let mut item = article(None);
        let stage = engine.associate(&mut item).unwrap();
        assert_eq!(stage, StageId(1));
        assert_eq!(item.stage_id, Some(StageId(1)));

        let mut fresh = article(None);
        let item_type = PlainItemType::new(EXT);
        engine
            .apply_transition(&mut fresh, TransitionId(4), &item_type)
            .expect("default stage is the implicit source");
        assert_eq!(fresh.stage_id, Some(StageId(3)));
    }

    #[test]
    fn denied_execution_is_an_authorization_error() {
        let mut engine = fixture(false).with_authorizer(Box::new(DenyAll));
        let item_type = PlainItemType::new(EXT);
        let mut item = article(Some(1));
        let err = engine
            .apply_transition(&mut item, TransitionId(4), &item_type)
            .expect_err("denied");
        assert!(matches!(err, WorkflowError::Authorization { .. }));
        assert_eq!(item, article(Some(1)));
    }

    #[test]
    fn wrong_item_type_is_rejected() {
        let engine = fixture(false);
        let item_type = PlainItemType::new("com_contact.contact");
        let err = engine
            .transitions_for_item(&article(Some(1)), &item_type)
            .expect_err("extension mismatch");
        assert!(matches!(err, WorkflowError::UnsupportedExtension(_)));
    }

    #[test]
    fn core_workflow_rejects_structural_changes() {
        let mut engine = fixture(true);
        let draft = StageDraft {
            title: "Extra".to_string(),
            ordering: 9,
            default: false,
            published: true,
        };
        assert!(matches!(
            engine.add_stage(WorkflowId(1), draft),
            Err(WorkflowError::Authorization { .. })
        ));
        assert!(matches!(
            engine.remove_transition(TransitionId(1)),
            Err(WorkflowError::Authorization { .. })
        ));
        assert!(matches!(
            engine.remove_stage(StageId(2)),
            Err(WorkflowError::Authorization { .. })
        ));
        assert!(matches!(
            engine.set_default_stage(StageId(2)),
            Err(WorkflowError::Authorization { .. })
        ));
    }

    #[test]
    fn stage_removal_policy() {
        let mut engine = fixture(false);
        assert!(matches!(
            engine.remove_stage(StageId(1)),
            Err(WorkflowError::DefaultStage(_))
        ));

        engine.store_mut().insert_item(article(Some(2)));
        assert!(matches!(
            engine.remove_stage(StageId(2)),
            Err(WorkflowError::StageInUse { items: 1, .. })
        ));

        engine.remove_stage(StageId(3)).expect("empty stage can go");
        let remaining = engine.store().transitions(WorkflowId(1)).unwrap();
        assert_eq!(ids(&remaining), vec![1, 5]);
    }

    #[test]
    fn new_default_stage_replaces_old_one() {
        let mut engine = fixture(false);
        let stage = engine
            .add_stage(
                WorkflowId(1),
                StageDraft {
                    title: "Inbox".to_string(),
                    ordering: 0,
                    default: true,
                    published: true,
                },
            )
            .unwrap();
        let default = engine.default_stage(WorkflowId(1)).unwrap();
        assert_eq!(default.id, stage.id);
        let defaults = engine
            .store()
            .stages(WorkflowId(1))
            .unwrap()
            .into_iter()
            .filter(|s| s.default)
            .count();
        assert_eq!(defaults, 1);
    }

    #[test]
    fn transition_endpoints_must_belong_to_workflow() {
        let mut engine = fixture(false);
        let err = engine
            .add_transition(
                WorkflowId(1),
                TransitionDraft {
                    from_stage: FromStage::Stage(StageId(1)),
                    to_stage_id: StageId(42),
                    title: "Nowhere".to_string(),
                    stage_condition: StageCondition::Published,
                    published: true,
                    ordering: 1,
                },
            )
            .expect_err("unknown target");
        assert!(matches!(err, WorkflowError::UnknownStage(StageId(42))));

        engine.store_mut().insert_definition(WorkflowDefinition {
            workflow: Workflow {
                id: WorkflowId(2),
                extension: EXT.to_string(),
                title: "Other".to_string(),
                core: false,
                default: false,
                published: true,
            },
            stages: vec![Stage {
                workflow_id: WorkflowId(2),
                ..stage(10, "Elsewhere", true)
            }],
            transitions: vec![],
        });
        let err = engine
            .add_transition(
                WorkflowId(1),
                TransitionDraft {
                    from_stage: FromStage::Any,
                    to_stage_id: StageId(10),
                    title: "Across".to_string(),
                    stage_condition: StageCondition::Published,
                    published: true,
                    ordering: 1,
                },
            )
            .expect_err("stage of another workflow");
        assert!(matches!(
            err,
            WorkflowError::ForeignStage {
                workflow_id: WorkflowId(1),
                stage_id: StageId(10),
            }
        ));
    }

    #[test]
    fn unpublished_transition_is_hidden_and_inapplicable() {
        let mut engine = fixture(false);
        engine
            .set_transition_published(TransitionId(4), false)
            .unwrap();
        let out = engine
            .applicable_transitions(WorkflowId(1), StageId(1), false)
            .unwrap();
        assert_eq!(ids(&out), vec![1]);

        let item_type = PlainItemType::new(EXT);
        let mut item = article(Some(1));
        assert!(matches!(
            engine.apply_transition(&mut item, TransitionId(4), &item_type),
            Err(WorkflowError::InvalidTransition { .. })
        ));

        engine.set_transition_published(TransitionId(6), true).unwrap();
        let out = engine
            .applicable_transitions(WorkflowId(1), StageId(1), false)
            .unwrap();
        assert_eq!(ids(&out), vec![6, 1]);
    }

    #[test]
    fn stage_publication_toggles_and_keeps_default_published() {
        let mut engine = fixture(false);
        engine.set_stage_published(StageId(2), false).unwrap();
        assert!(!engine.store().stage(StageId(2)).unwrap().unwrap().published);
        engine.set_stage_published(StageId(2), true).unwrap();
        assert!(engine.store().stage(StageId(2)).unwrap().unwrap().published);

        assert!(matches!(
            engine.set_stage_published(StageId(1), false),
            Err(WorkflowError::DefaultStage(_))
        ));
    }

    #[test]
    fn publication_changes_are_guarded() {
        let mut engine = fixture(true);
        assert!(matches!(
            engine.set_stage_published(StageId(2), false),
            Err(WorkflowError::Authorization { .. })
        ));
        assert!(matches!(
            engine.set_transition_published(TransitionId(1), false),
            Err(WorkflowError::Authorization { action, .. }) if action == "core.edit.state"
        ));

        let mut engine = fixture(false).with_authorizer(Box::new(DenyAll));
        assert!(matches!(
            engine.set_transition_published(TransitionId(1), false),
            Err(WorkflowError::Authorization { .. })
        ));
        assert!(engine.store().transition(TransitionId(1)).unwrap().unwrap().published);
    }
}
