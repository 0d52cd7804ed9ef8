//! Error types for collection views.

/// Result type alias for collection view operations.
pub type Result<T> = std::result::Result<T, ViewError>;

/// Errors that can occur when editing a collection view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// A sort description index was past the end of the sort list.
    #[error("sort description index {index} out of range (len {len})")]
    SortIndexOutOfRange { index: usize, len: usize },

    /// A cursor position was past the end of the view.
    #[error("position {position} out of range (len {len})")]
    PositionOutOfRange { position: usize, len: usize },
}

impl ViewError {
    /// Create a sort index error.
    pub fn sort_index(index: usize, len: usize) -> Self {
        Self::SortIndexOutOfRange { index, len }
    }

    /// Create a position error.
    pub fn position(position: usize, len: usize) -> Self {
        Self::PositionOutOfRange { position, len }
    }
}
