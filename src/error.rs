//! Error types for tree and constraint mutations.
//!
//! Only *referential* problems are errors: a handle that is dead or belongs to
//! another environment, or a reparent that would break the tree. Layout
//! contradictions and dependency cycles are recovered during resolution and
//! reported through the [`Logger`](crate::logger::Logger) instead.

use thiserror::Error;

use crate::engine::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("node {0} no longer exists")]
    DeadNode(NodeId),

    #[error("node {0} belongs to a different environment")]
    ForeignEnvironment(NodeId),

    #[error("cannot parent {node} under {parent}: {parent} is inside its subtree")]
    ParentCycle { node: NodeId, parent: NodeId },

    #[error("node {0} cannot be parented to itself")]
    SelfParent(NodeId),

    #[error("the root node cannot be reparented or obliterated")]
    RootImmutable,
}

pub type Result<T> = std::result::Result<T, FrameError>;
