//! Keyed List Reconciler - Minimal-move list updates.
//!
//! A [`KeyedList`] owns the DOM region between two comment markers and keeps
//! it in sync with a sequence of items. Each pass:
//!
//! 1. computes one key per item
//! 2. renders the items whose key is new (optionally on a recycled element)
//! 3. detaches and cleans up items whose key disappeared
//! 4. runs LIS over the old positions of surviving items; those stay put
//! 5. walks the new order once, batching every run of out-of-place items
//!    into a single fragment insert
//! 6. commits the new key order as the baseline for the next pass
//!
//! Any failure in step 2 rolls back the items created so far and leaves the
//! DOM and the list state exactly as the previous pass left them. A pass over
//! a list whose markers were removed from the document stops before step 1
//! with [`Error::Detached`].
//!
//! [`list`] wraps a `KeyedList` in an effect so it follows a [`ListSource`].
//!
//! # Example
//!
//! ```ignore
//! use spark_dom::list::{list, ListOptions};
//! use spark_signals::signal;
//!
//! let todos = signal(vec!["write", "test"]);
//! let dom_for_template = host.dom().clone();
//!
//! let view = list(
//!     &host,
//!     todos.clone(),
//!     move |todo: &&str, _| {
//!         let li = dom_for_template.create_element("li");
//!         dom_for_template.set_text_content(li, todo);
//!         li
//!     },
//!     |todo: &&str, _| *todo,
//!     ListOptions::default(),
//! );
//! host.dom().append_child(container, view.fragment());
//!
//! todos.set(vec!["ship", "write", "test"]); // one insert, nothing re-rendered
//! view.dispose();
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use spark_signals::{effect, untrack};
use tracing::{debug, error, trace, warn};

use super::lis::compute_lis;
use super::pool::{ElementPool, get_pool};
use super::source::ListSource;
use crate::dom::{Dom, NodeId};
use crate::error::{Error, Result};
use crate::host::Host;
use crate::types::{Cleanup, IntoRendered, Key, NodeList};

// =============================================================================
// Options
// =============================================================================

/// Options for [`list`] and [`KeyedList::new`].
#[derive(Clone, Default)]
pub struct ListOptions {
    /// Reuse pooled elements for new single-element items, and release
    /// removed elements to the pool.
    pub recycle: bool,
    /// Pool to use when recycling. Defaults to the shared pool.
    pub pool: Option<Rc<ElementPool>>,
}

impl ListOptions {
    pub(crate) fn resolve_pool(&self, dom: &Rc<dyn Dom>) -> Option<Rc<ElementPool>> {
        if !self.recycle {
            return None;
        }
        Some(self.pool.clone().unwrap_or_else(|| get_pool(dom)))
    }
}

// =============================================================================
// Entry
// =============================================================================

struct Entry<T> {
    nodes: NodeList,
    cleanup: Option<Cleanup>,
    item: T,
}

/// Attribute names like `onclick` are never carried onto a recycled element.
fn is_inline_handler(name: &str) -> bool {
    name.get(..2).is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
}

/// Move everything a template put on `fresh` over to the blank `recycled`.
fn transfer_element(dom: &dyn Dom, fresh: NodeId, recycled: NodeId) {
    for name in dom.attribute_names(fresh) {
        if is_inline_handler(&name) {
            continue;
        }
        if let Some(value) = dom.get_attribute(fresh, &name) {
            dom.set_attribute(recycled, &name, &value);
        }
    }
    for child in dom.children(fresh) {
        dom.append_child(recycled, child);
    }
    for record in dom.listeners(fresh) {
        dom.remove_event_listener(fresh, record.id);
        dom.add_event_listener(recycled, &record.event_type, record.listener, record.options);
    }
    dom.set_style_text(recycled, &dom.style_text(fresh));
    dom.set_class_name(recycled, &dom.class_name(fresh));
}

// =============================================================================
// KeyedList
// =============================================================================

/// Keyed reconciler for one list region.
///
/// Not reentrant: a pass must finish before the next one starts.
pub struct KeyedList<T> {
    dom: Rc<dyn Dom>,
    fragment: NodeId,
    start: NodeId,
    end: NodeId,
    entries: HashMap<Key, Entry<T>>,
    key_order: Vec<Key>,
    pool: Option<Rc<ElementPool>>,
}

impl<T: Clone> KeyedList<T> {
    /// Create an empty list. Its markers start out inside
    /// [`fragment`](Self::fragment); insert that fragment wherever the list
    /// should live.
    pub fn new(dom: Rc<dyn Dom>, options: &ListOptions) -> Self {
        let pool = options.resolve_pool(&dom);
        let fragment = dom.create_fragment();
        let start = dom.create_comment("list-start");
        let end = dom.create_comment("list-end");
        dom.append_child(fragment, start);
        dom.append_child(fragment, end);

        Self {
            dom,
            fragment,
            start,
            end,
            entries: HashMap::new(),
            key_order: Vec::new(),
            pool,
        }
    }

    /// Bring the DOM in line with `items`.
    ///
    /// `template` runs only for keys not seen in the previous pass. Keys must
    /// be unique: a duplicate shadows the earlier item with the same key.
    pub fn reconcile<F, R, K, KK>(&mut self, items: &[T], mut template: F, mut key_fn: K) -> Result<()>
    where
        F: FnMut(&T, usize) -> R,
        R: IntoRendered,
        K: FnMut(&T, usize) -> KK,
        KK: Into<Key>,
    {
        let Some(parent) = self.dom.parent(self.end) else {
            warn!("list markers are detached; pass abandoned");
            return Err(Error::Detached);
        };

        // Phase 1: keys
        let keys: Vec<Key> = items
            .iter()
            .enumerate()
            .map(|(index, item)| key_fn(item, index).into())
            .collect();

        // Phase 2: render new keys
        let mut created: HashMap<Key, Entry<T>> = HashMap::new();
        for (index, (item, key)) in items.iter().zip(&keys).enumerate() {
            if self.entries.contains_key(key) {
                continue;
            }
            match self.create_entry(item, index, &mut template) {
                Ok(entry) => {
                    if let Some(shadowed) = created.insert(key.clone(), entry) {
                        trace!(%key, "duplicate key; earlier item shadowed");
                        self.discard(shadowed);
                    }
                }
                Err(err) => {
                    for (_, entry) in created.drain() {
                        self.discard(entry);
                    }
                    return Err(err);
                }
            }
        }

        // Phase 3: remove keys that are gone
        let removed = {
            let next_keys: HashSet<&Key> = keys.iter().collect();
            let stale: Vec<Key> = self
                .key_order
                .iter()
                .filter(|key| !next_keys.contains(key))
                .cloned()
                .collect();
            let mut removed = 0;
            for key in stale {
                if let Some(entry) = self.entries.remove(&key) {
                    self.detach(entry);
                    removed += 1;
                }
            }
            removed
        };

        // Phase 4: stable set
        let mut stable = vec![false; keys.len()];
        let stable_count = {
            let old_positions: HashMap<&Key, usize> = self
                .key_order
                .iter()
                .enumerate()
                .map(|(position, key)| (key, position))
                .collect();
            let mut reused_at = Vec::new();
            let mut reused_positions = Vec::new();
            for (index, key) in keys.iter().enumerate() {
                if created.contains_key(key) {
                    continue;
                }
                if let Some(&position) = old_positions.get(key) {
                    reused_at.push(index);
                    reused_positions.push(position);
                }
            }
            let lis = compute_lis(&reused_positions);
            for &i in &lis {
                stable[reused_at[i]] = true;
            }
            lis.len()
        };

        let created_count = created.len();
        self.entries.extend(created);
        for (item, key) in items.iter().zip(&keys) {
            if let Some(entry) = self.entries.get_mut(key) {
                entry.item = item.clone();
            }
        }

        // Phase 5: positioning
        let inserts = self.position(parent, &keys, &stable);

        // Phase 6: commit
        self.key_order = keys;

        debug!(
            items = self.key_order.len(),
            created = created_count,
            removed,
            stable = stable_count,
            inserts,
            "list reconciled"
        );
        Ok(())
    }

    fn create_entry<F, R>(&self, item: &T, index: usize, template: &mut F) -> Result<Entry<T>>
    where
        F: FnMut(&T, usize) -> R,
        R: IntoRendered,
    {
        let rendered = template(item, index)
            .into_rendered()
            .map_err(|source| Error::Template { index, source })?;
        let (mut nodes, cleanup) = rendered.into_parts();

        if nodes.is_empty() {
            warn!(index, "template rendered no nodes");
            if let Some(cleanup) = cleanup {
                cleanup();
            }
            return Err(Error::EmptyRender { index });
        }

        if nodes.len() == 1 {
            if let Some(recycled) = self.recycle_root(nodes[0]) {
                nodes[0] = recycled;
            }
        }

        Ok(Entry {
            nodes,
            cleanup,
            item: item.clone(),
        })
    }

    /// Swap a freshly rendered element for a pooled one of the same tag.
    fn recycle_root(&self, fresh: NodeId) -> Option<NodeId> {
        let pool = self.pool.as_ref()?;
        let tag = self.dom.tag_name(fresh)?;
        let recycled = pool.try_acquire(&tag)?;
        transfer_element(&*self.dom, fresh, recycled);
        Some(recycled)
    }

    /// Walk `keys` once and move whatever is out of place.
    ///
    /// Returns the number of `insert_before` calls made.
    fn position(&self, parent: NodeId, keys: &[Key], stable: &[bool]) -> usize {
        let dom = &*self.dom;
        let first_node = |key: &Key| self.entries.get(key).and_then(|e| e.nodes.first().copied());

        let mut cursor = self.start;
        let mut inserts = 0;
        let mut i = 0;
        while i < keys.len() {
            let Some(entry) = self.entries.get(&keys[i]) else {
                i += 1;
                continue;
            };
            let (Some(first), Some(last)) = (entry.nodes.first().copied(), entry.nodes.last().copied()) else {
                i += 1;
                continue;
            };

            // In place, or stable and left alone; whatever sits between
            // the cursor and a stable item is moved later.
            let next = dom.next_sibling(cursor);
            if next == Some(first) || stable[i] {
                cursor = last;
                i += 1;
                continue;
            }

            // Longest run of out-of-place items starting here.
            let mut end = i + 1;
            while end < keys.len() && !stable[end] {
                match first_node(&keys[end]) {
                    Some(node) if next != Some(node) => end += 1,
                    _ => break,
                }
            }

            let nodes: Vec<NodeId> = keys[i..end]
                .iter()
                .filter_map(|key| self.entries.get(key))
                .flat_map(|entry| entry.nodes.iter().copied())
                .collect();

            if let [node] = nodes.as_slice() {
                let reference = dom.next_sibling(cursor);
                dom.insert_before(parent, *node, reference);
            } else {
                let fragment = dom.create_fragment();
                for &node in &nodes {
                    dom.append_child(fragment, node);
                }
                let reference = dom.next_sibling(cursor);
                dom.insert_before(parent, fragment, reference);
            }
            inserts += 1;

            if let Some(&run_last) = nodes.last() {
                cursor = run_last;
            }
            i = end;
        }
        inserts
    }

    /// Detach a removed entry, pool its elements and run its cleanup.
    fn detach(&self, entry: Entry<T>) {
        for &node in &entry.nodes {
            self.dom.remove(node);
            if let Some(pool) = &self.pool {
                pool.release(node);
            }
        }
        if let Some(cleanup) = entry.cleanup {
            cleanup();
        }
    }

    /// Undo an entry that was rendered but never placed.
    fn discard(&self, entry: Entry<T>) {
        self.detach(entry);
    }

    /// Remove every item and both markers. Each item's cleanup runs once.
    pub fn dispose(&mut self) {
        for key in std::mem::take(&mut self.key_order) {
            if let Some(entry) = self.entries.remove(&key) {
                self.detach(entry);
            }
        }
        let leftover: Vec<Entry<T>> = self.entries.drain().map(|(_, entry)| entry).collect();
        for entry in leftover {
            self.detach(entry);
        }
        self.dom.remove(self.start);
        self.dom.remove(self.end);
    }
}

impl<T> KeyedList<T> {
    /// Holds the markers (and any items) until inserted somewhere.
    pub fn fragment(&self) -> NodeId {
        self.fragment
    }

    pub fn start_marker(&self) -> NodeId {
        self.start
    }

    pub fn end_marker(&self) -> NodeId {
        self.end
    }

    /// Node the list currently lives in.
    pub fn parent(&self) -> Option<NodeId> {
        self.dom.parent(self.end)
    }

    pub fn dom(&self) -> &Rc<dyn Dom> {
        &self.dom
    }

    /// Pool in use, when recycling.
    pub fn pool(&self) -> Option<&Rc<ElementPool>> {
        self.pool.as_ref()
    }

    /// Keys of the last committed pass, in order.
    pub fn keys(&self) -> &[Key] {
        &self.key_order
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    pub fn nodes(&self, key: &Key) -> Option<&[NodeId]> {
        self.entries.get(key).map(|entry| entry.nodes.as_slice())
    }

    pub fn item(&self, key: &Key) -> Option<&T> {
        self.entries.get(key).map(|entry| &entry.item)
    }
}

// =============================================================================
// list() - reactive entry point
// =============================================================================

/// Handle to a mounted reactive list.
pub struct ListView<T> {
    fragment: NodeId,
    list: Rc<RefCell<KeyedList<T>>>,
    stop: RefCell<Option<Box<dyn FnOnce()>>>,
    disposed: Cell<bool>,
}

impl<T: Clone> ListView<T> {
    /// Fragment holding the list's nodes; insert it into the document.
    pub fn fragment(&self) -> NodeId {
        self.fragment
    }

    pub fn len(&self) -> usize {
        self.list.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.borrow().is_empty()
    }

    pub fn keys(&self) -> Vec<Key> {
        self.list.borrow().keys().to_vec()
    }

    /// Inspect the underlying reconciler.
    pub fn with_list<R>(&self, f: impl FnOnce(&KeyedList<T>) -> R) -> R {
        f(&self.list.borrow())
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Stop following the source and remove every item. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        if let Some(stop) = self.stop.borrow_mut().take() {
            stop();
        }
        self.list.borrow_mut().dispose();
    }
}

/// Render `source` as a keyed list that updates whenever the source changes.
///
/// A failing pass is logged and skipped; the previous render stays.
pub fn list<T, F, R, K, KK>(
    host: &Host,
    source: impl Into<ListSource<T>>,
    template: F,
    key_fn: K,
    options: ListOptions,
) -> ListView<T>
where
    T: Clone + 'static,
    F: Fn(&T, usize) -> R + 'static,
    R: IntoRendered,
    K: Fn(&T, usize) -> KK + 'static,
    KK: Into<Key>,
{
    let source = source.into();
    let keyed = Rc::new(RefCell::new(KeyedList::new(host.dom().clone(), &options)));
    let fragment = keyed.borrow().fragment();

    let state = keyed.clone();
    let stop = effect(move || {
        let items = source.get();
        let Ok(mut keyed) = state.try_borrow_mut() else {
            warn!("list update re-entered; skipped");
            return;
        };
        if let Err(err) = untrack(|| keyed.reconcile(&items, &template, &key_fn)) {
            error!(error = %err, "list update failed; previous render kept");
        }
    });

    ListView {
        fragment,
        list: keyed,
        stop: RefCell::new(Some(Box::new(stop))),
        disposed: Cell::new(false),
    }
}
