use thiserror::Error;

/// Why a lifecycle operation left the tree untouched.
///
/// Both variants are recoverable: the caller gets no node back and carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The operation was handed a missing node or one of the wrong kind.
    #[error("invalid parent: {0}")]
    InvalidParent(&'static str),
    /// Going ahead would break a tree invariant.
    #[error("refused: {0}")]
    StructuralRefusal(&'static str),
}
