//! Authorization collaborator consulted before workflow mutations.

pub const ACTION_EXECUTE_TRANSITION: &str = "core.execute.transition";
pub const ACTION_CREATE: &str = "core.create";
pub const ACTION_EDIT: &str = "core.edit";
pub const ACTION_EDIT_STATE: &str = "core.edit.state";
pub const ACTION_DELETE: &str = "core.delete";

pub trait Authorizer: std::fmt::Debug {
    /// Returns `true` when the current user may perform `action` on `asset`.
    fn authorise(&self, action: &str, asset: &str) -> bool;
}

/// Grants everything. Suitable for CLI use and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorise(&self, _action: &str, _asset: &str) -> bool {
        true
    }
}

pub(crate) fn workflow_asset(workflow_id: crate::WorkflowId) -> String {
    format!("com_workflow.workflow.{workflow_id}")
}

pub(crate) fn transition_asset(extension: &str, transition_id: crate::TransitionId) -> String {
    format!("{extension}.transition.{transition_id}")
}
