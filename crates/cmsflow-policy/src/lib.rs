//! Which bulk toolbar actions a selection of items can offer.

use std::collections::HashSet;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use cmsflow_core::{ExtensionRegistry, Site};
use cmsflow_workflow::{
    ConditionCounts, ItemId, StageCondition, TransitionId, WorkflowEngine, WorkflowError,
    WorkflowItem, WorkflowStore,
};

/// One flag per publication condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkActions {
    pub publish: bool,
    pub unpublish: bool,
    pub archive: bool,
    pub trash: bool,
}

impl BulkActions {
    pub fn allows(&self, condition: StageCondition) -> bool {
        match condition {
            StageCondition::Published => self.publish,
            StageCondition::Unpublished => self.unpublish,
            StageCondition::Archived => self.archive,
            StageCondition::Trashed => self.trash,
        }
    }

    fn enable(&mut self, condition: StageCondition) {
        match condition {
            StageCondition::Published => self.publish = true,
            StageCondition::Unpublished => self.unpublish = true,
            StageCondition::Archived => self.archive = true,
            StageCondition::Trashed => self.trash = true,
        }
    }

    fn all_enabled(&self) -> bool {
        StageCondition::ALL.into_iter().all(|c| self.allows(c))
    }
}

/// An action is enabled when at least one item has a transition applying
/// its condition.
///
/// Items whose transitions cannot be computed are skipped.
pub fn resolve_bulk_actions<'a, S, I>(
    engine: &WorkflowEngine<S>,
    extensions: &ExtensionRegistry,
    items: I,
) -> BulkActions
where
    S: WorkflowStore,
    I: IntoIterator<Item = &'a WorkflowItem>,
{
    let mut actions = BulkActions::default();
    for item in items {
        let counts = match classify(engine, extensions, item) {
            Ok(counts) => counts,
            Err(err) => {
                warn!("skipping item {} in bulk actions: {}", item.id, err);
                continue;
            }
        };
        for condition in StageCondition::ALL {
            if counts.offers(condition) {
                actions.enable(condition);
            }
        }
        if actions.all_enabled() {
            break;
        }
    }
    debug!("bulk actions: {:?}", actions);
    actions
}

/// Resolves bulk actions for the given items of `site`, or all of them
/// when `ids` is empty.
pub fn site_bulk_actions(site: &Site, ids: &[ItemId]) -> Result<BulkActions> {
    let items = if ids.is_empty() {
        site.items()?
    } else {
        ids.iter()
            .map(|id| site.item(*id))
            .collect::<Result<Vec<_>>>()?
    };
    Ok(resolve_bulk_actions(&site.engine, &site.extensions, &items))
}

/// Outcome of firing one transition over a selection of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkApplyReport {
    pub transition: TransitionId,
    pub applied: Vec<WorkflowItem>,
    pub failed: Vec<BulkFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkFailure {
    pub item: ItemId,
    pub reason: String,
}

impl BulkApplyReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Applies `transition` to every item in `ids`, in order.
///
/// Each item is its own unit of work: a failing item is recorded and the
/// rest of the selection still runs. Duplicate ids are applied once.
#[instrument(skip(site))]
pub fn apply_bulk(site: &mut Site, transition: TransitionId, ids: &[ItemId]) -> BulkApplyReport {
    let mut report = BulkApplyReport {
        transition,
        applied: Vec::new(),
        failed: Vec::new(),
    };
    let mut seen = HashSet::new();
    for &id in ids {
        if !seen.insert(id) {
            continue;
        }
        match site.apply_transition(id, transition) {
            Ok(item) => report.applied.push(item),
            Err(err) => {
                warn!("transition {} not applied to item {}: {}", transition, id, err);
                report.failed.push(BulkFailure {
                    item: id,
                    reason: err.to_string(),
                });
            }
        }
    }
    info!(
        "transition {}: {} applied, {} failed",
        transition,
        report.applied.len(),
        report.failed.len()
    );
    report
}

fn classify<S: WorkflowStore>(
    engine: &WorkflowEngine<S>,
    extensions: &ExtensionRegistry,
    item: &WorkflowItem,
) -> Result<ConditionCounts, WorkflowError> {
    let item_type = extensions.require(&item.extension)?;
    engine.classify_item(item, item_type)
}
