use serde::Serialize;

use crate::model::{StageCondition, Transition};

/// Number of transitions per [`StageCondition`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConditionCounts {
    pub published: usize,
    pub unpublished: usize,
    pub archived: usize,
    pub trashed: usize,
}

impl ConditionCounts {
    pub fn get(&self, condition: StageCondition) -> usize {
        match condition {
            StageCondition::Published => self.published,
            StageCondition::Unpublished => self.unpublished,
            StageCondition::Archived => self.archived,
            StageCondition::Trashed => self.trashed,
        }
    }

    /// Whether at least one transition applies `condition`.
    pub fn offers(&self, condition: StageCondition) -> bool {
        self.get(condition) > 0
    }

    pub fn is_empty(&self) -> bool {
        StageCondition::ALL.into_iter().all(|c| !self.offers(c))
    }

    fn bump(&mut self, condition: StageCondition) {
        let slot = match condition {
            StageCondition::Published => &mut self.published,
            StageCondition::Unpublished => &mut self.unpublished,
            StageCondition::Archived => &mut self.archived,
            StageCondition::Trashed => &mut self.trashed,
        };
        *slot += 1;
    }
}

/// Counts `transitions` by the condition they apply.
pub fn classify_transitions<'a, I>(transitions: I) -> ConditionCounts
where
    I: IntoIterator<Item = &'a Transition>,
{
    let mut counts = ConditionCounts::default();
    for transition in transitions {
        counts.bump(transition.stage_condition);
    }
    counts
}
