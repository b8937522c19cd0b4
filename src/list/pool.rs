//! Element Recycling Pool - Detached elements kept for reuse, per tag name.
//!
//! Same idea as the free-index pool in the component registry: instead of
//! building a new element for every row that appears, pop a blank one that an
//! earlier row left behind.
//!
//! - Buckets are LIFO stacks keyed by lowercase tag name
//! - `release` resets the element before it enters a bucket, so `acquire`
//!   always hands back something indistinguishable from a fresh element
//! - Both `max_per_tag` and `max_total` bound the pool; a full pool rejects
//!   the element (returns `false`) and it is simply dropped
//!
//! Buckets are never borrowed across a DOM call, so a DOM adapter that calls
//! back into the pool cannot corrupt them.
//!
//! # Example
//!
//! ```ignore
//! use spark_dom::list::{create_element_pool, PoolOptions};
//!
//! let pool = create_element_pool(dom.clone(), PoolOptions::default());
//! let li = pool.acquire("LI");   // miss: created
//! pool.release(li);              // reset and pooled
//! let again = pool.acquire("li"); // hit: same element
//! assert_eq!(li, again);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::dom::{Dom, NodeId};

// =============================================================================
// Options & Stats
// =============================================================================

/// Pool bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Most elements kept for any one tag.
    pub max_per_tag: usize,
    /// Most elements kept across all tags.
    pub max_total: usize,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_per_tag: 50,
            max_total: 500,
        }
    }
}

/// Pool counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    /// Elements currently pooled.
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`, 0 before the first acquire.
    pub hit_rate: f64,
}

// =============================================================================
// ElementPool
// =============================================================================

/// Per-tag stacks of detached, reset elements belonging to one document.
pub struct ElementPool {
    dom: Rc<dyn Dom>,
    options: PoolOptions,
    buckets: RefCell<HashMap<String, Vec<NodeId>>>,
    size: Cell<usize>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl ElementPool {
    pub fn new(dom: Rc<dyn Dom>, options: PoolOptions) -> Self {
        if options.max_per_tag == 0 || options.max_total == 0 {
            warn!(
                max_per_tag = options.max_per_tag,
                max_total = options.max_total,
                "element pool bounds are zero; nothing will ever be pooled"
            );
        }
        Self {
            dom,
            options,
            buckets: RefCell::new(HashMap::new()),
            size: Cell::new(0),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    /// Document the pooled elements belong to.
    pub fn dom(&self) -> &Rc<dyn Dom> {
        &self.dom
    }

    pub fn options(&self) -> PoolOptions {
        self.options
    }

    /// Elements currently pooled.
    pub fn size(&self) -> usize {
        self.size.get()
    }

    /// Pop a pooled element or build a new one.
    pub fn acquire(&self, tag: &str) -> NodeId {
        match self.try_acquire(tag) {
            Some(element) => element,
            None => self.dom.create_element(&tag.to_ascii_lowercase()),
        }
    }

    /// Pop a pooled element, recording a hit, or record a miss and return
    /// `None`.
    ///
    /// The reconciler uses this form: on a miss it keeps the element its
    /// template already built instead of constructing a second one.
    pub fn try_acquire(&self, tag: &str) -> Option<NodeId> {
        let tag = tag.to_ascii_lowercase();
        let popped = {
            let mut buckets = self.buckets.borrow_mut();
            buckets.get_mut(&tag).and_then(Vec::pop)
        };
        match popped {
            Some(element) => {
                self.size.set(self.size.get() - 1);
                self.hits.set(self.hits.get() + 1);
                trace!(%tag, ?element, "pool hit");
                Some(element)
            }
            None => {
                self.misses.set(self.misses.get() + 1);
                trace!(%tag, "pool miss");
                None
            }
        }
    }

    /// Reset `node` and keep it for reuse.
    ///
    /// Returns `false` without touching the node when it is not an element,
    /// is already pooled, or the pool is full. That is backpressure, not an
    /// error: the caller just lets the node go.
    pub fn release(&self, node: NodeId) -> bool {
        let Some(tag) = self.dom.tag_name(node) else {
            return false;
        };

        {
            let buckets = self.buckets.borrow();
            let bucket_len = buckets.get(&tag).map_or(0, Vec::len);
            if self.size.get() >= self.options.max_total || bucket_len >= self.options.max_per_tag {
                trace!(%tag, size = self.size.get(), "pool full; element dropped");
                return false;
            }
            if buckets.get(&tag).is_some_and(|b| b.contains(&node)) {
                return false;
            }
        }

        self.reset(node);

        self.buckets.borrow_mut().entry(tag).or_default().push(node);
        self.size.set(self.size.get() + 1);
        true
    }

    /// Drop every pooled element. Counters are kept.
    pub fn clear(&self) {
        self.buckets.borrow_mut().clear();
        self.size.set(0);
    }

    /// Zero the hit/miss counters. Pooled elements are kept.
    pub fn reset_stats(&self) {
        self.hits.set(0);
        self.misses.set(0);
    }

    pub fn stats(&self) -> PoolStats {
        let hits = self.hits.get();
        let misses = self.misses.get();
        let total = hits + misses;
        PoolStats {
            size: self.size.get(),
            hits,
            misses,
            hit_rate: if total == 0 {
                0.0
            } else {
                hits as f64 / total as f64
            },
        }
    }

    /// Strip everything a previous user could have left behind.
    fn reset(&self, element: NodeId) {
        let dom = &self.dom;
        dom.remove(element);
        for name in dom.attribute_names(element) {
            dom.remove_attribute(element, &name);
        }
        dom.set_class_name(element, "");
        dom.set_style_text(element, "");
        for record in dom.listeners(element) {
            dom.remove_event_listener(element, record.id);
        }
        dom.set_text_content(element, "");
        for child in dom.children(element) {
            dom.remove_child(element, child);
        }
    }
}

// =============================================================================
// Default Pool
// =============================================================================

thread_local! {
    /// Shared pool used when a list asks for recycling without its own pool.
    static DEFAULT_POOL: RefCell<Option<Rc<ElementPool>>> = const { RefCell::new(None) };
}

/// Create an isolated pool.
pub fn create_element_pool(dom: Rc<dyn Dom>, options: PoolOptions) -> Rc<ElementPool> {
    Rc::new(ElementPool::new(dom, options))
}

/// The shared default pool for `dom`.
///
/// Created on first use with default options. Pooled elements only make
/// sense for the document that created them, so asking for a different
/// document replaces the shared pool.
pub fn get_pool(dom: &Rc<dyn Dom>) -> Rc<ElementPool> {
    DEFAULT_POOL.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(pool) = slot.as_ref() {
            if std::ptr::addr_eq(Rc::as_ptr(pool.dom()), Rc::as_ptr(dom)) {
                return pool.clone();
            }
            debug!("default element pool rebound to another document");
        }
        let pool = create_element_pool(dom.clone(), PoolOptions::default());
        *slot = Some(pool.clone());
        pool
    })
}

/// Drop the shared default pool (for testing).
pub fn reset_pool() {
    let previous = DEFAULT_POOL.with(|slot| slot.borrow_mut().take());
    if let Some(pool) = previous {
        pool.clear();
    }
}
