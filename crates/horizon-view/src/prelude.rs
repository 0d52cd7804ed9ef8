//! Prelude module for Horizon View.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use horizon_view::prelude::*;
//! ```

// ============================================================================
// Signal/Slot System
// ============================================================================

pub use horizon_view_core::{ConnectionId, Signal};

// ============================================================================
// Views and Sources
// ============================================================================

pub use crate::model::{
    CollectionView, CollectionViewBuilder, DeferGuard, ItemSource, ObservableList, SourceChange,
    ViewChange, ViewProperty,
};

// ============================================================================
// Ordering and Grouping
// ============================================================================

pub use crate::model::{
    CollectionGroup, CompositeComparator, GroupDescription, Key, SortDescription, SortDirection,
};

// ============================================================================
// Errors
// ============================================================================

pub use crate::{Result, ViewError};
