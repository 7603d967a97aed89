use anyhow::{bail, Result};
use serde::Serialize;
use tracing::instrument;

use cmsflow_core::Site;
use cmsflow_workflow::{
    ConditionCounts, ItemId, Transition, TransitionId, WorkflowItem, WorkflowStore,
};

#[derive(Debug, Serialize)]
struct TransitionReport<'a> {
    item: ItemId,
    transitions: &'a [Transition],
    counts: ConditionCounts,
}

/// Summarises every configured workflow.
///
/// Bootstrapping the site already validated definitions and extension
/// support, so reaching this point means the configuration is sound.
#[instrument(skip(site))]
pub fn check(site: &Site) -> Result<String> {
    let store = site.engine.store();
    let mut lines = Vec::new();
    for workflow in store.workflows()? {
        let stages = store.stages(workflow.id)?;
        let transitions = store.transitions(workflow.id)?;
        let default = site.engine.default_stage(workflow.id)?;
        lines.push(format!(
            "workflow {} '{}' ({}): {} stage(s), {} transition(s), default stage '{}'{}",
            workflow.id,
            workflow.title,
            workflow.extension,
            stages.len(),
            transitions.len(),
            default.title,
            if workflow.core { ", core" } else { "" }
        ));
    }
    lines.push(format!(
        "item types: {}",
        site.extensions.extensions().join(", ")
    ));
    lines.push("workflow:check passed".to_string());
    Ok(lines.join("\n"))
}

#[instrument(skip(site))]
pub fn transitions(site: &Site, id: ItemId, json: bool) -> Result<String> {
    let transitions = site.transitions_for(id)?;
    let counts = site.classify(id)?;

    if json {
        let report = TransitionReport {
            item: id,
            transitions: &transitions,
            counts,
        };
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let mut lines: Vec<String> = transitions
        .iter()
        .map(|t| {
            format!(
                "{}  {:<20} {} -> {}  [{}]",
                t.id, t.title, t.from_stage, t.to_stage_id, t.stage_condition
            )
        })
        .collect();
    lines.push(format!(
        "published={} unpublished={} archived={} trashed={}",
        counts.published, counts.unpublished, counts.archived, counts.trashed
    ));
    Ok(lines.join("\n"))
}

/// Fires `transition` on each item of the selection.
///
/// Items that cannot take the transition are listed with their reason. The
/// command fails only when no item was moved.
#[instrument(skip(site))]
pub fn apply(site: &mut Site, transition: TransitionId, ids: &[ItemId], json: bool) -> Result<String> {
    let report = cmsflow_policy::apply_bulk(site, transition, ids);
    if report.applied.is_empty() {
        let reasons: Vec<String> = report
            .failed
            .iter()
            .map(|f| format!("item {}: {}", f.item, f.reason))
            .collect();
        bail!(
            "failed to apply transition {transition}: {}",
            reasons.join("; ")
        );
    }

    if json {
        return Ok(serde_json::to_string_pretty(&report)?);
    }
    let mut lines: Vec<String> = report.applied.iter().map(describe_item).collect();
    lines.extend(
        report
            .failed
            .iter()
            .map(|f| format!("item {} skipped: {}", f.item, f.reason)),
    );
    Ok(lines.join("\n"))
}

#[instrument(skip(site))]
pub fn actions(site: &Site, json: bool) -> Result<String> {
    let actions = cmsflow_policy::site_bulk_actions(site, &[])?;
    if json {
        return Ok(serde_json::to_string_pretty(&actions)?);
    }
    Ok(format!(
        "publish={} unpublish={} archive={} trash={}",
        actions.publish, actions.unpublish, actions.archive, actions.trash
    ))
}

fn describe_item(item: &WorkflowItem) -> String {
    let stage = item
        .stage_id
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "item {} ({}): workflow {}, stage {}, state {}, featured {}",
        item.id, item.extension, item.workflow_id, stage, item.state, item.featured
    )
}
