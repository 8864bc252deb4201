//! Diagram graph: the capability trait the replay core works against, and
//! the in-memory graph that implements it.
//!
//! Graphs are values. [`DiagramGraph::create`] and [`DiagramGraph::set`]
//! never touch `self`; they return the updated graph, so a caller can keep
//! any earlier state around.

pub mod format;
pub mod key;
pub(crate) mod lexer;
mod model;

pub use key::{Endpoint, PathKey};
pub use lexer::LexError;
pub use model::{Edge, Field, Graph, Object};

/// Shape value marking an object as a table.
pub const TABLE_SHAPE: &str = "sql_table";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("invalid key `{key}`: {reason}")]
    InvalidKey { key: String, reason: String },
    #[error("unknown reference `{missing}` in `{key}`")]
    UnknownReference { key: String, missing: String },
    #[error("`{key}` already exists")]
    AlreadyExists { key: String },
}

impl GraphError {
    pub(crate) fn invalid_key(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_reference(key: &str, missing: impl Into<String>) -> Self {
        Self::UnknownReference {
            key: key.to_string(),
            missing: missing.into(),
        }
    }
}

/// Path-key editing interface of a diagram graph.
///
/// Keys follow the language in [`key`]: `table`, `table.column`,
/// `table.shape` and `table.column -> other.column`.
pub trait DiagramGraph: Sized {
    /// Create an object, field or edge. Returns the new graph and the
    /// resolved (canonical, escaped) key of what was created.
    fn create(&self, key: &str) -> Result<(Self, String), GraphError>;

    /// Set an attribute or field at `key` to `value`, creating the field if
    /// needed. The owning object must already exist.
    fn set(&self, key: &str, value: &str) -> Result<Self, GraphError>;

    /// Diagram source text for the current state.
    fn serialize(&self) -> String;
}
