//! List rendering - Keyed reconciliation and its two wrappers.
//!
//! - [`list`] / [`KeyedList`] - keyed reconciliation with LIS-based moves
//! - [`virtual_list`] - fixed-height windowing over a keyed list
//! - [`delegated_list`] - keyed list with one listener per event type
//! - [`ElementPool`] - per-tag recycling of detached elements
//! - [`compute_lis`] - the longest increasing subsequence solver
//!
//! All three entry points take a [`ListSource`]
//! and re-run whenever a reactive source changes. Templates run only for keys
//! that are new in a pass; surviving items keep their nodes.

mod delegate;
mod keyed;
mod lis;
mod pool;
mod source;
mod virtual_list;

pub use delegate::{DelegatedList, DelegatedListOptions, KEY_ATTRIBUTE, delegated_list};
pub use keyed::{KeyedList, ListOptions, ListView, list};
pub use lis::compute_lis;
pub use pool::{ElementPool, PoolOptions, PoolStats, create_element_pool, get_pool, reset_pool};
pub use source::ListSource;
pub use virtual_list::{
    DEFAULT_VIEWPORT_HEIGHT, VirtualList, VirtualListConfig, VisibleRange, virtual_list,
    visible_range,
};
