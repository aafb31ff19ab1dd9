use thiserror::Error;

use crate::plan::PlanNodeId;

/// Result type used across the optimizer.
///
/// Typed failures are raised as [`OptError`] and can be recovered from the `anyhow::Error` with
/// `downcast_ref::<OptError>()`.
pub type OptResult<T> = anyhow::Result<T>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptError {
    #[error("relation `{0}` is not in the catalogue")]
    UnknownRelation(String),
    #[error("relation `{0}` is already in the catalogue")]
    DuplicateRelation(String),
    #[error("attribute `{attribute}` already belongs to relation `{owner}`")]
    DuplicateAttribute { attribute: String, owner: String },
    #[error("attribute `{attribute}` is not produced by the input of plan node {node}")]
    UnknownAttribute { attribute: String, node: PlanNodeId },
    #[error("plan node {0} has not been estimated")]
    MissingOutput(PlanNodeId),
    #[error("plan node {node} has no input at position {idx}")]
    MissingInput { node: PlanNodeId, idx: usize },
    #[error("plan node {node} has {actual} inputs, its operator takes {expected}")]
    WrongArity {
        node: PlanNodeId,
        expected: usize,
        actual: usize,
    },
    #[error("plan contains no scan")]
    EmptyPlan,
    #[error("search produced no candidate plan")]
    NoCandidate,
}
