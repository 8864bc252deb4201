use std::io;

use crate::graph::GraphError;
use crate::render::RenderError;

/// Failure of a replay run. Statement-level variants carry the statement's
/// step index, input line and raw text.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("statement {index} (line {line}) is malformed: {reason}: {text}")]
    Malformed {
        index: usize,
        line: usize,
        text: String,
        reason: String,
    },
    #[error("statement {index} (line {line}) could not be applied: {text}")]
    Mutation {
        index: usize,
        line: usize,
        text: String,
        #[source]
        source: GraphError,
    },
    #[error("snapshot {index} (line {line}) failed to render: {text}")]
    Render {
        index: usize,
        line: usize,
        text: String,
        #[source]
        source: RenderError,
    },
    #[error("failed to write {artifact}")]
    Sink {
        artifact: String,
        #[source]
        source: io::Error,
    },
}

impl ReplayError {
    /// Step index of the failing statement, if the failure came from one.
    pub fn index(&self) -> Option<usize> {
        match self {
            ReplayError::Malformed { index, .. }
            | ReplayError::Mutation { index, .. }
            | ReplayError::Render { index, .. } => Some(*index),
            ReplayError::Sink { .. } => None,
        }
    }
}
