//! Article item type for the content component.

use tracing::debug;

use cmsflow_workflow::{ItemType, PublicationState, StageCondition, WorkflowItem};

pub const EXTENSION: &str = "com_content.article";

/// Articles keep a `featured` flag next to their publication state.
///
/// A trashed article can no longer be featured. Articles accept transitions
/// declared from "any stage".
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleType;

impl ItemType for ArticleType {
    fn extension(&self) -> &str {
        EXTENSION
    }

    fn supports_any_stage(&self) -> bool {
        true
    }

    fn apply_condition(&self, item: &mut WorkflowItem, condition: StageCondition) {
        item.state = PublicationState::from(condition);
        if condition == StageCondition::Trashed && item.featured {
            debug!("article {} unfeatured on trash", item.id);
            item.featured = false;
        }
    }
}
