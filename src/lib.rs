//! # spark-dom
//!
//! Keyed list reconciliation for reactive DOM trees.
//!
//! Renders collections into a document and keeps them in sync as the data
//! changes, with as few DOM mutations as possible.
//!
//! ## Architecture
//!
//! ```text
//! ListSource → effect → KeyedList::reconcile → Dom adapter
//!                           ├─ compute_lis   (which items stay put)
//!                           └─ ElementPool   (which elements get reused)
//! ```
//!
//! [`virtual_list`] and [`delegated_list`] wrap the same reconciler: the first
//! feeds it only the visible slice, the second stamps each row with its key
//! and routes events from one listener per type.
//!
//! The document is reached only through the [`Dom`] trait and deferred work
//! only through the [`Scheduler`] trait, so everything runs against
//! [`MockDom`] and [`ManualScheduler`] in tests.
//!
//! ## Modules
//!
//! - [`types`] - Keys, template output, cleanup and handler aliases
//! - [`error`] - Error types
//! - [`dom`] - Document adapter trait, events, mock document
//! - [`scheduler`] - Frames, timers and microtasks
//! - [`list`] - Keyed, virtual and delegated lists, element pool, LIS

pub mod dom;
pub mod error;
pub mod host;
pub mod list;
pub mod scheduler;
pub mod types;

pub use types::*;

pub use error::{DomError, Error, Result};

pub use host::Host;

pub use dom::{
    Dom, DomEvent, DomStats, EventListener, EventPhase, ListenerId, ListenerOptions,
    ListenerRecord, MockDom, NodeId, NodeKind, event_bubbles,
};

pub use scheduler::{FRAME_FALLBACK, ManualScheduler, Scheduler, Task, TaskId};

pub use list::{
    // Keyed
    KeyedList, ListOptions, ListSource, ListView, compute_lis, list,
    // Pool
    ElementPool, PoolOptions, PoolStats, create_element_pool, get_pool, reset_pool,
    // Virtual
    DEFAULT_VIEWPORT_HEIGHT, VirtualList, VirtualListConfig, VisibleRange, virtual_list,
    visible_range,
    // Delegated
    DelegatedList, DelegatedListOptions, KEY_ATTRIBUTE, delegated_list,
};
