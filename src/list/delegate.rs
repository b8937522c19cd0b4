//! Delegated List - One listener per event type instead of one per row.
//!
//! Every rendered root is stamped with `data-key`. The list's parent element
//! gets a single listener per configured event type; on dispatch the target
//! is walked up to the nearest stamped row and resolved through a key map to
//! `(item, index)`.
//!
//! - Event types that do not bubble (focus, blur, mouseenter, ...) are
//!   listened for in the capture phase
//! - Listeners can only go on once the list sits inside a real element, so
//!   setup waits for a microtask after construction and is retried on every
//!   pass until it succeeds
//! - The key map is rebuilt on every pass, so indices follow reorders and a
//!   removed row can never resolve
//! - Rows are matched by the key's text. `Key::Str("1")` and `Key::Num(1)`
//!   are different items to the reconciler but stamp the same `data-key`;
//!   when texts collide the later row wins and a warning is logged
//!
//! # Example
//!
//! ```ignore
//! use spark_dom::list::{delegated_list, DelegatedListOptions};
//!
//! let todos = delegated_list(
//!     &host,
//!     todos_signal.clone(),
//!     move |todo: &Todo, _| todo_row(&dom, todo),
//!     |todo: &Todo, _| todo.id,
//!     DelegatedListOptions::default()
//!         .on("click", |_event, todo: &Todo, index| println!("clicked {index}: {}", todo.title)),
//! );
//! host.dom().append_child(ul, todos.fragment());
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use spark_signals::{effect, untrack};
use tracing::{debug, error, trace, warn};

use super::source::ListSource;
use super::keyed::{KeyedList, ListOptions};
use super::pool::ElementPool;
use crate::dom::{Dom, DomEvent, ListenerId, ListenerOptions, NodeId, NodeKind, event_bubbles};
use crate::host::Host;
use crate::types::{BoxError, DelegatedHandler, IntoRendered, Key, RenderOutcome, Rendered};

/// Attribute stamped on every delegated row root.
pub const KEY_ATTRIBUTE: &str = "data-key";

const KEY_SELECTOR: &str = "[data-key]";

// =============================================================================
// Options
// =============================================================================

/// Options for [`delegated_list`].
pub struct DelegatedListOptions<T> {
    /// `(event type, handler)` pairs. Several handlers may share a type.
    pub on: Vec<(String, DelegatedHandler<T>)>,
    pub recycle: bool,
    pub pool: Option<Rc<ElementPool>>,
}

impl<T> Default for DelegatedListOptions<T> {
    fn default() -> Self {
        Self {
            on: Vec::new(),
            recycle: false,
            pool: None,
        }
    }
}

impl<T> Clone for DelegatedListOptions<T> {
    fn clone(&self) -> Self {
        Self {
            on: self.on.clone(),
            recycle: self.recycle,
            pool: self.pool.clone(),
        }
    }
}

impl<T> DelegatedListOptions<T> {
    /// Add a handler for `event_type`.
    pub fn on(mut self, event_type: &str, handler: impl Fn(&DomEvent, &T, usize) + 'static) -> Self {
        self.on.push((event_type.to_string(), Rc::new(handler)));
        self
    }
}

// =============================================================================
// Target Resolution
// =============================================================================

/// Nearest stamped element from `node` up to, but excluding, `container`.
fn manual_closest(dom: &dyn Dom, node: NodeId, container: NodeId) -> Option<NodeId> {
    let mut current = Some(node);
    while let Some(n) = current {
        if n == container {
            return None;
        }
        if dom.is_element(n) && dom.get_attribute(n, KEY_ATTRIBUTE).is_some() {
            return Some(n);
        }
        current = dom.parent(n);
    }
    None
}

/// Row element an event target belongs to, if any.
fn find_row(dom: &dyn Dom, target: NodeId, container: NodeId) -> Option<NodeId> {
    match dom.closest(target, KEY_SELECTOR) {
        Ok(Some(row)) if row != container && dom.contains(container, row) => Some(row),
        Ok(_) => None,
        Err(err) => {
            trace!(error = %err, "native closest unavailable; walking ancestors");
            manual_closest(dom, target, container)
        }
    }
}

// =============================================================================
// State
// =============================================================================

struct DelegateState<T> {
    host: Host,
    list: RefCell<KeyedList<T>>,
    source: ListSource<T>,
    template: Box<dyn Fn(&T, usize) -> RenderOutcome>,
    key_fn: Box<dyn Fn(&T, usize) -> Key>,
    handlers: Vec<(String, DelegatedHandler<T>)>,
    map: RefCell<HashMap<String, (T, usize)>>,
    container: Cell<Option<NodeId>>,
    listeners: RefCell<Vec<ListenerId>>,
    delegation_disposed: Cell<bool>,
    disposed: Cell<bool>,
}

impl<T: Clone + 'static> DelegateState<T> {
    fn update(self: &Rc<Self>, items: &[T]) {
        if self.disposed.get() {
            return;
        }
        let Ok(mut list) = self.list.try_borrow_mut() else {
            warn!("delegated list update re-entered; skipped");
            return;
        };

        let dom = self.host.dom().clone();
        let template = |item: &T, index: usize| -> std::result::Result<Rendered, BoxError> {
            let rendered = (self.template)(item, index)?;
            if let Some(root) = rendered.root() {
                if dom.is_element(root) {
                    let key = (self.key_fn)(item, index);
                    dom.set_attribute(root, KEY_ATTRIBUTE, &key.to_string());
                }
            }
            Ok(rendered)
        };

        if let Err(err) = list.reconcile(items, template, |item: &T, index| (self.key_fn)(item, index)) {
            error!(error = %err, "delegated list update failed; previous render kept");
            return;
        }

        let mut map: HashMap<String, (T, usize)> = HashMap::with_capacity(items.len());
        for (index, (item, key)) in items.iter().zip(list.keys()).enumerate() {
            if map.insert(key.to_string(), (item.clone(), index)).is_some() {
                warn!(%key, index, "rows share a data-key; events resolve to the later one");
            }
        }
        *self.map.borrow_mut() = map;
        drop(list);

        self.try_setup();
    }

    /// Attach one listener per event type to the list's parent element.
    ///
    /// Does nothing until the list lives inside an element.
    fn try_setup(self: &Rc<Self>) {
        if self.delegation_disposed.get() || self.container.get().is_some() || self.handlers.is_empty() {
            return;
        }
        let parent = match self.list.try_borrow() {
            Ok(list) => list.parent(),
            Err(_) => return,
        };
        let dom = self.host.dom();
        let Some(container) = parent.filter(|&p| dom.node_kind(p) == Some(NodeKind::Element)) else {
            trace!("delegated list not attached yet; setup deferred");
            return;
        };

        let mut event_types: Vec<&str> = Vec::new();
        for (event_type, _) in &self.handlers {
            if !event_types.contains(&event_type.as_str()) {
                event_types.push(event_type);
            }
        }

        let mut listeners = self.listeners.borrow_mut();
        for event_type in &event_types {
            let options = if event_bubbles(event_type) {
                ListenerOptions::NONE
            } else {
                ListenerOptions::CAPTURE
            };
            let weak = Rc::downgrade(self);
            let owned_type = event_type.to_string();
            let id = dom.add_event_listener(
                container,
                event_type,
                Rc::new(move |event: &DomEvent| {
                    if let Some(state) = weak.upgrade() {
                        state.dispatch(event, &owned_type);
                    }
                }),
                options,
            );
            listeners.push(id);
        }
        self.container.set(Some(container));
        debug!(?container, event_types = event_types.len(), "delegation attached");
    }

    fn dispatch(&self, event: &DomEvent, event_type: &str) {
        if self.delegation_disposed.get() {
            return;
        }
        let Some((item, index)) = self.resolve_target(event.target()) else {
            trace!(event_type, target = ?event.target(), "event outside any row");
            return;
        };
        trace!(event_type, index, "delegated event resolved");
        for (handler_type, handler) in &self.handlers {
            if handler_type == event_type {
                handler(event, &item, index);
            }
        }
    }

    fn resolve_target(&self, target: NodeId) -> Option<(T, usize)> {
        let container = self.container.get()?;
        let dom = self.host.dom();
        let row = find_row(&**dom, target, container)?;
        let key = dom.get_attribute(row, KEY_ATTRIBUTE)?;
        self.map.borrow().get(&key).cloned()
    }

    fn cleanup_delegation(&self) {
        self.delegation_disposed.set(true);
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        if let Some(container) = self.container.take() {
            let dom = self.host.dom();
            for id in listeners {
                dom.remove_event_listener(container, id);
            }
        }
        self.map.borrow_mut().clear();
    }
}

// =============================================================================
// DelegatedList
// =============================================================================

/// Handle to a mounted delegated list.
pub struct DelegatedList<T> {
    state: Rc<DelegateState<T>>,
    fragment: NodeId,
    stop: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl<T: Clone + 'static> DelegatedList<T> {
    /// Fragment holding the list's nodes; insert it into an element.
    pub fn fragment(&self) -> NodeId {
        self.fragment
    }

    /// Whether delegated listeners are currently attached.
    pub fn is_delegating(&self) -> bool {
        self.state.container.get().is_some()
    }

    /// Element the delegated listeners live on.
    pub fn container(&self) -> Option<NodeId> {
        self.state.container.get()
    }

    /// `(item, index)` a key currently resolves to.
    pub fn resolve(&self, key: impl Into<Key>) -> Option<(T, usize)> {
        self.state.map.borrow().get(&key.into().to_string()).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.list.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every delegated listener and forget the key map.
    ///
    /// Delegation stays off for the rest of the list's life; the list itself
    /// keeps rendering.
    pub fn cleanup_delegation(&self) {
        self.state.cleanup_delegation();
    }

    pub fn is_disposed(&self) -> bool {
        self.state.disposed.get()
    }

    /// Remove listeners, stop following the source and remove every row.
    /// Idempotent.
    pub fn dispose(&self) {
        let state = &self.state;
        if state.disposed.replace(true) {
            return;
        }
        state.cleanup_delegation();
        if let Some(stop) = self.stop.borrow_mut().take() {
            stop();
        }
        if let Ok(mut list) = state.list.try_borrow_mut() {
            list.dispose();
        }
    }
}

/// Render `source` as a keyed list whose row events are handled by one
/// listener per event type on the parent element.
pub fn delegated_list<T, F, R, K, KK>(
    host: &Host,
    source: impl Into<ListSource<T>>,
    template: F,
    key_fn: K,
    options: DelegatedListOptions<T>,
) -> DelegatedList<T>
where
    T: Clone + 'static,
    F: Fn(&T, usize) -> R + 'static,
    R: IntoRendered,
    K: Fn(&T, usize) -> KK + 'static,
    KK: Into<Key>,
{
    let list = KeyedList::new(
        host.dom().clone(),
        &ListOptions {
            recycle: options.recycle,
            pool: options.pool.clone(),
        },
    );
    let fragment = list.fragment();

    let state = Rc::new(DelegateState {
        host: host.clone(),
        list: RefCell::new(list),
        source: source.into(),
        template: Box::new(move |item: &T, index: usize| template(item, index).into_rendered()),
        key_fn: Box::new(move |item: &T, index: usize| key_fn(item, index).into()),
        handlers: options.on,
        map: RefCell::new(HashMap::new()),
        container: Cell::new(None),
        listeners: RefCell::new(Vec::new()),
        delegation_disposed: Cell::new(false),
        disposed: Cell::new(false),
    });

    let effect_state = state.clone();
    let stop = effect(move || {
        let items = effect_state.source.get();
        untrack(|| effect_state.update(&items));
    });

    let weak = Rc::downgrade(&state);
    host.scheduler().queue_microtask(Box::new(move || {
        if let Some(state) = weak.upgrade() {
            state.try_setup();
        }
    }));

    DelegatedList {
        state,
        fragment,
        stop: RefCell::new(Some(Box::new(stop))),
    }
}
