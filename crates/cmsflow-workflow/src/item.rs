use crate::model::{PublicationState, StageCondition, WorkflowItem};

/// A contract for every item type that takes part in workflows.
///
/// The engine owns stage bookkeeping; the item type owns what a
/// `stage_condition` means for its own columns.
pub trait ItemType: std::fmt::Debug {
    /// Extension identifier this item type answers to, e.g. `com_content.article`.
    fn extension(&self) -> &str;

    /// Whether transitions declared with "any stage" as source apply to this type.
    fn supports_any_stage(&self) -> bool {
        false
    }

    /// Applies the publication side effect of a transition to `item`.
    fn apply_condition(&self, item: &mut WorkflowItem, condition: StageCondition) {
        item.state = PublicationState::from(condition);
    }
}

/// Item type with no secondary flags; used when an extension registers
/// nothing more specific.
#[derive(Debug, Clone)]
pub struct PlainItemType {
    extension: String,
    any_stage: bool,
}

impl PlainItemType {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            any_stage: false,
        }
    }

    pub fn with_any_stage(mut self, enabled: bool) -> Self {
        self.any_stage = enabled;
        self
    }
}

impl ItemType for PlainItemType {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn supports_any_stage(&self) -> bool {
        self.any_stage
    }
}
