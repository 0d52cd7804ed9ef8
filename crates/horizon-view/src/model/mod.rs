//! Collection views over mutable sources.
//!
//! This module provides the view engine and the types it is configured with.
//!
//! # Core Types
//!
//! - `CollectionView`: Live filtered, sorted and grouped projection of a source
//! - `ItemSource`: The trait backing collections implement
//! - `ObservableList`: A list that reports its own structural changes
//! - `SortDescription` / `GroupDescription`: Ordering and grouping rules
//! - `CompositeComparator`: Group rule then sort chain, as one order
//! - `ViewSignals`: Change feed and property notifications
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────┐  SourceChange  ┌────────────────┐  ViewChange   ┌──────────┐
//! │    Source    │───────────────>│ CollectionView │──────────────>│ Consumer │
//! │ (ItemSource) │                │  filter/sort/  │ ViewProperty  │          │
//! └──────────────┘<───snapshot────│     group      │──────────────>│          │
//!                                 └────────────────┘               └──────────┘
//! ```
//!
//! Single-item source changes become single-item view changes. Multi-item
//! changes and resets rebuild the view and emit `ViewChange::Reset`.

mod comparator;
mod defer;
pub mod error;
mod group;
mod key;
mod observable_list;
mod signals;
mod sort;
mod source;
mod state;
mod view;

pub use comparator::CompositeComparator;
pub use defer::DeferGuard;
pub use error::{Result, ViewError};
pub use group::CollectionGroup;
pub use key::Key;
pub use observable_list::ObservableList;
pub use signals::{ViewChange, ViewProperty, ViewSignals};
pub use sort::{GroupDescription, KeyCompareFn, KeyFn, SortDescription, SortDirection};
pub use source::{ItemSource, SourceChange};
pub use state::FilterFn;
pub use view::{CollectionView, CollectionViewBuilder, ViewItem};
