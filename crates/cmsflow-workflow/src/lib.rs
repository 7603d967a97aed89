//! Stage/transition workflows for content items.
//!
//! A workflow is a per-extension directed graph: stages are the states an
//! item can sit in, transitions are the edges, and each transition carries a
//! [`StageCondition`] that decides the item's publication state once fired.

pub mod auth;
pub mod classify;
pub mod engine;
pub mod error;
pub mod item;
pub mod model;
pub mod store;

pub use auth::{AllowAll, Authorizer};
pub use classify::{classify_transitions, ConditionCounts};
pub use engine::WorkflowEngine;
pub use error::{StoreError, WorkflowError};
pub use item::{ItemType, PlainItemType};
pub use model::{
    FromStage, ItemId, PublicationState, Stage, StageCondition, StageDraft, StageId, Transition,
    TransitionDraft, TransitionId, Workflow, WorkflowDefinition, WorkflowId, WorkflowItem,
};
pub use store::{InMemoryStore, WorkflowStore};
