//! Horizon View - live, incrementally maintained collection views.
//!
//! A [`CollectionView`](model::CollectionView) projects a mutable source
//! through a filter, a chain of sort descriptions and an optional group
//! description, and reports every change to the projection as a granular
//! insert/remove delta rather than a full rebuild.
//!
//! # Example
//!
//! ```
//! use horizon_view::prelude::*;
//! use std::sync::Arc;
//!
//! let source = Arc::new(ObservableList::from_vec(vec![1, 2, 3, 4]));
//! let view = CollectionView::builder(source.clone())
//!     .group(SortDescription::ascending(|n: &i32| {
//!         Key::from(if n % 2 == 0 { "even" } else { "odd" })
//!     }))
//!     .build();
//!
//! let groups: Vec<Vec<i32>> = view.groups().into_iter().map(|g| g.into_items()).collect();
//! assert_eq!(groups, vec![vec![2, 4], vec![1, 3]]);
//! ```

pub mod model;
pub mod prelude;

pub use horizon_view_core::{ConnectionId, PerfSpan, Signal, logging};
pub use model::error::{Result, ViewError};
