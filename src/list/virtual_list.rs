//! Virtual List - Render only the rows that can be seen.
//!
//! Rows have one fixed height, so the visible window is pure arithmetic on
//! the scroll offset. Everything else is handled by the keyed reconciler,
//! which sees only the current slice.
//!
//! # DOM Shape
//!
//! ```text
//! container   overflow-y: auto, role="list", aria-rowcount = total
//! └─ spacer   position: relative, height = total * item_height
//!    └─ viewport   position: absolute, top = start * item_height
//!       └─ rows start..end (role="listitem")
//! ```
//!
//! # Scrolling
//!
//! Scroll events only schedule a recompute; any number of them within one
//! frame collapse into a single reconciliation. Hosts without animation
//! frames fall back to a short timer.
//!
//! # Example
//!
//! ```ignore
//! use spark_dom::list::{virtual_list, VirtualListConfig};
//!
//! let rows = virtual_list(
//!     &host,
//!     (0..10_000u32).collect::<Vec<_>>(),
//!     move |n: &u32, _| row(&dom, *n),
//!     |n: &u32, _| *n,
//!     VirtualListConfig {
//!         item_height: 24.0,
//!         container_height: Some(480.0),
//!         ..Default::default()
//!     },
//! )?;
//! host.dom().append_child(body, rows.container());
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_signals::{effect, untrack};
use tracing::{debug, error, trace, warn};

use super::source::ListSource;
use super::keyed::{KeyedList, ListOptions};
use super::pool::ElementPool;
use crate::dom::{ListenerId, ListenerOptions, NodeId};
use crate::error::{Error, Result};
use crate::host::Host;
use crate::scheduler::TaskId;
use crate::types::{BoxError, IntoRendered, Key, RenderOutcome, Rendered};

/// Viewport height used when neither the config nor the container knows one.
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 400.0;

// =============================================================================
// Config
// =============================================================================

/// Configuration for [`virtual_list`].
#[derive(Clone)]
pub struct VirtualListConfig {
    /// Fixed row height in px. Required: the default of 0 is rejected.
    pub item_height: f64,
    /// Fixed viewport height in px. Measured from the container when `None`.
    pub container_height: Option<f64>,
    /// Extra rows rendered above and below the viewport.
    pub overscan: usize,
    pub recycle: bool,
    pub pool: Option<Rc<ElementPool>>,
    /// Class name for the container.
    pub class_name: Option<String>,
}

impl Default for VirtualListConfig {
    fn default() -> Self {
        Self {
            item_height: 0.0,
            container_height: None,
            overscan: 5,
            recycle: false,
            pool: None,
            class_name: None,
        }
    }
}

// =============================================================================
// Window Math
// =============================================================================

/// Half-open index range `[start, end)` of rendered rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl VisibleRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }
}

/// Rows to render for a scroll offset.
///
/// `item_height` must be positive; callers validate it up front.
pub fn visible_range(
    scroll_top: f64,
    viewport_height: f64,
    item_height: f64,
    overscan: usize,
    total: usize,
) -> VisibleRange {
    let scroll_top = scroll_top.max(0.0);
    let first = (scroll_top / item_height).floor() as usize;
    let last = ((scroll_top + viewport_height.max(0.0)) / item_height).ceil() as usize;

    let end = last.saturating_add(overscan).min(total);
    let start = first.saturating_sub(overscan).min(end);
    VisibleRange { start, end }
}

fn px(value: f64) -> String {
    format!("{value}px")
}

// =============================================================================
// State
// =============================================================================

type ErasedTemplate<T> = Box<dyn Fn(&T, usize) -> RenderOutcome>;
type ErasedKeyFn<T> = Box<dyn Fn(&T, usize) -> Key>;

struct VirtualState<T> {
    host: Host,
    container: NodeId,
    spacer: NodeId,
    viewport: NodeId,
    list: RefCell<KeyedList<T>>,
    source: ListSource<T>,
    items: RefCell<Vec<T>>,
    template: ErasedTemplate<T>,
    key_fn: ErasedKeyFn<T>,
    item_height: f64,
    container_height: Option<f64>,
    overscan: usize,
    range: Cell<VisibleRange>,
    frame_pending: Cell<bool>,
    pending_task: Cell<Option<TaskId>>,
    scroll_listener: Cell<Option<ListenerId>>,
    disposed: Cell<bool>,
}

impl<T: Clone + 'static> VirtualState<T> {
    fn viewport_height(&self) -> f64 {
        self.container_height.unwrap_or_else(|| {
            let measured = self.host.dom().client_height(self.container);
            if measured > 0.0 {
                measured
            } else {
                DEFAULT_VIEWPORT_HEIGHT
            }
        })
    }

    /// Coalesce a recompute onto the next frame.
    fn schedule(self: &Rc<Self>) {
        if self.disposed.get() {
            return;
        }
        if self.frame_pending.get() {
            trace!("scroll coalesced into pending frame");
            return;
        }
        self.frame_pending.set(true);

        let weak = Rc::downgrade(self);
        let id = self.host.scheduler().next_frame(Box::new(move || {
            let Some(state) = weak.upgrade() else { return };
            state.frame_pending.set(false);
            state.pending_task.set(None);
            if !state.disposed.get() {
                state.update();
            }
        }));
        if self.frame_pending.get() {
            self.pending_task.set(Some(id));
        }
    }

    /// Recompute the window and reconcile the slice.
    fn update(&self) {
        if self.disposed.get() {
            return;
        }
        let dom = self.host.dom().clone();
        let (total, range, slice) = {
            let items = self.items.borrow();
            let range = visible_range(
                dom.scroll_top(self.container),
                self.viewport_height(),
                self.item_height,
                self.overscan,
                items.len(),
            );
            (items.len(), range, items[range.start..range.end].to_vec())
        };

        let Ok(mut list) = self.list.try_borrow_mut() else {
            warn!("virtual list update re-entered; skipped");
            return;
        };

        let start = range.start;
        let template = |item: &T, offset: usize| -> std::result::Result<Rendered, BoxError> {
            let rendered = (self.template)(item, start + offset)?;
            if let Some(root) = rendered.root() {
                if dom.is_element(root) {
                    dom.set_attribute(root, "role", "listitem");
                }
            }
            Ok(rendered)
        };
        let key_fn = |item: &T, offset: usize| (self.key_fn)(item, start + offset);

        if let Err(err) = list.reconcile(&slice, template, key_fn) {
            error!(error = %err, "virtual list update failed; previous window kept");
            return;
        }

        dom.set_style(self.spacer, "height", &px(total as f64 * self.item_height));
        dom.set_style(self.viewport, "top", &px(start as f64 * self.item_height));
        dom.set_attribute(self.container, "aria-rowcount", &total.to_string());
        self.range.set(range);

        debug!(total, start = range.start, end = range.end, "virtual window updated");
    }

    fn cancel_pending(&self) {
        self.frame_pending.set(false);
        if let Some(id) = self.pending_task.take() {
            self.host.scheduler().cancel(id);
        }
    }
}

// =============================================================================
// VirtualList
// =============================================================================

/// Handle to a mounted virtual list.
///
/// Keep it alive while the list is on screen; scroll handling only holds a
/// weak reference.
pub struct VirtualList<T> {
    state: Rc<VirtualState<T>>,
    stop: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl<T: Clone + 'static> VirtualList<T> {
    /// Scrollable root element; insert it into the document.
    pub fn container(&self) -> NodeId {
        self.state.container
    }

    pub fn spacer(&self) -> NodeId {
        self.state.spacer
    }

    pub fn viewport(&self) -> NodeId {
        self.state.viewport
    }

    /// Window of the last successful update.
    pub fn visible_range(&self) -> VisibleRange {
        self.state.range.get()
    }

    /// Items in the source, rendered or not.
    pub fn total(&self) -> usize {
        self.state.items.borrow().len()
    }

    /// Keys currently rendered, in order.
    pub fn rendered_keys(&self) -> Vec<Key> {
        self.state.list.borrow().keys().to_vec()
    }

    /// Scroll so row `index` is at the top and schedule a recompute.
    pub fn scroll_to_index(&self, index: usize) {
        if self.state.disposed.get() {
            return;
        }
        let index = index.min(self.total().saturating_sub(1));
        let dom = self.state.host.dom();
        dom.set_scroll_top(self.state.container, index as f64 * self.state.item_height);
        self.state.schedule();
    }

    /// Recompute right now instead of waiting for the next frame.
    pub fn refresh(&self) {
        self.state.cancel_pending();
        self.state.update();
    }

    pub fn is_disposed(&self) -> bool {
        self.state.disposed.get()
    }

    /// Remove the scroll listener, cancel any pending frame, stop following
    /// the source and remove the rendered rows. Idempotent.
    pub fn dispose(&self) {
        let state = &self.state;
        if state.disposed.replace(true) {
            return;
        }
        if let Some(id) = state.scroll_listener.take() {
            state.host.dom().remove_event_listener(state.container, id);
        }
        state.cancel_pending();
        if let Some(stop) = self.stop.borrow_mut().take() {
            stop();
        }
        if let Ok(mut list) = state.list.try_borrow_mut() {
            list.dispose();
        }
    }
}

/// Render `source` as a windowed list of fixed-height rows.
///
/// Fails before creating anything when `item_height` or `container_height`
/// cannot be used for geometry. The template and key function receive the
/// item's index in the full source, not in the window.
pub fn virtual_list<T, F, R, K, KK>(
    host: &Host,
    source: impl Into<ListSource<T>>,
    template: F,
    key_fn: K,
    config: VirtualListConfig,
) -> Result<VirtualList<T>>
where
    T: Clone + 'static,
    F: Fn(&T, usize) -> R + 'static,
    R: IntoRendered,
    K: Fn(&T, usize) -> KK + 'static,
    KK: Into<Key>,
{
    let item_height = config.item_height;
    if !(item_height.is_finite() && item_height > 0.0) {
        return Err(Error::InvalidItemHeight(item_height));
    }
    if let Some(height) = config.container_height {
        if !(height.is_finite() && height > 0.0) {
            return Err(Error::InvalidContainerHeight(height));
        }
    }

    let dom = host.dom().clone();

    let container = dom.create_element("div");
    dom.set_style(container, "overflow-y", "auto");
    if let Some(height) = config.container_height {
        dom.set_style(container, "height", &px(height));
    }
    dom.set_attribute(container, "role", "list");
    if let Some(class_name) = &config.class_name {
        dom.set_class_name(container, class_name);
    }

    let spacer = dom.create_element("div");
    dom.set_style(spacer, "position", "relative");
    dom.set_style(spacer, "height", "0px");

    let viewport = dom.create_element("div");
    dom.set_style(viewport, "position", "absolute");
    dom.set_style(viewport, "top", "0px");
    dom.set_style(viewport, "left", "0");
    dom.set_style(viewport, "right", "0");

    let list = KeyedList::new(
        dom.clone(),
        &ListOptions {
            recycle: config.recycle,
            pool: config.pool.clone(),
        },
    );
    dom.append_child(container, spacer);
    dom.append_child(spacer, viewport);
    dom.append_child(viewport, list.fragment());

    let state = Rc::new(VirtualState {
        host: host.clone(),
        container,
        spacer,
        viewport,
        list: RefCell::new(list),
        source: source.into(),
        items: RefCell::new(Vec::new()),
        template: Box::new(move |item: &T, index: usize| template(item, index).into_rendered()),
        key_fn: Box::new(move |item: &T, index: usize| key_fn(item, index).into()),
        item_height,
        container_height: config.container_height,
        overscan: config.overscan,
        range: Cell::new(VisibleRange::default()),
        frame_pending: Cell::new(false),
        pending_task: Cell::new(None),
        scroll_listener: Cell::new(None),
        disposed: Cell::new(false),
    });

    let weak = Rc::downgrade(&state);
    let listener = dom.add_event_listener(
        container,
        "scroll",
        Rc::new(move |_| {
            if let Some(state) = weak.upgrade() {
                state.schedule();
            }
        }),
        ListenerOptions::PASSIVE,
    );
    state.scroll_listener.set(Some(listener));

    let effect_state = state.clone();
    let stop = effect(move || {
        let items = effect_state.source.get();
        *effect_state.items.borrow_mut() = items;
        untrack(|| effect_state.update());
    });

    Ok(VirtualList {
        state,
        stop: RefCell::new(Some(Box::new(stop))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Dom, MockDom};
    use spark_signals::signal;
    use crate::scheduler::ManualScheduler;
    use std::time::Duration;

    fn setup(scheduler: ManualScheduler) -> (Rc<MockDom>, Rc<ManualScheduler>, Host) {
        let dom = Rc::new(MockDom::new());
        let scheduler = Rc::new(scheduler);
        let host = Host::new(dom.clone(), scheduler.clone());
        (dom, scheduler, host)
    }

    fn row_template(dom: &Rc<MockDom>) -> impl Fn(&u32, usize) -> NodeId + use<> {
        let dom = dom.clone();
        move |item: &u32, _: usize| {
            let li = dom.create_element("li");
            dom.set_text_content(li, &format!("item {item}"));
            li
        }
    }

    fn items(n: u32) -> Vec<u32> {
        (0..n).collect()
    }

    fn config(overscan: usize) -> VirtualListConfig {
        VirtualListConfig {
            item_height: 40.0,
            container_height: Some(400.0),
            overscan,
            ..Default::default()
        }
    }

    #[test]
    fn test_visible_range_math() {
        assert_eq!(visible_range(0.0, 400.0, 40.0, 0, 1000), VisibleRange { start: 0, end: 10 });
        assert_eq!(visible_range(4000.0, 400.0, 40.0, 5, 1000), VisibleRange { start: 95, end: 115 });
        // Partially visible rows count.
        assert_eq!(visible_range(20.0, 400.0, 40.0, 0, 1000), VisibleRange { start: 0, end: 11 });
        // Clamped at both ends.
        assert_eq!(visible_range(0.0, 400.0, 40.0, 5, 3), VisibleRange { start: 0, end: 3 });
        assert_eq!(visible_range(99_999.0, 400.0, 40.0, 2, 10), VisibleRange { start: 10, end: 10 });
        assert!(visible_range(0.0, 400.0, 40.0, 0, 0).is_empty());
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let (dom, _scheduler, host) = setup(ManualScheduler::new());
        let before = dom.node_count();

        for item_height in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = virtual_list(
                &host,
                items(10),
                row_template(&dom),
                |n: &u32, _| *n,
                VirtualListConfig {
                    item_height,
                    ..Default::default()
                },
            );
            assert!(matches!(result, Err(Error::InvalidItemHeight(_))));
        }

        let result = virtual_list(
            &host,
            items(10),
            row_template(&dom),
            |n: &u32, _| *n,
            VirtualListConfig {
                item_height: 20.0,
                container_height: Some(0.0),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::InvalidContainerHeight(_))));
        assert_eq!(dom.node_count(), before, "nothing built on config error");
    }

    #[test]
    fn test_initial_window() {
        let (dom, _scheduler, host) = setup(ManualScheduler::new());
        let list = virtual_list(&host, items(1000), row_template(&dom), |n: &u32, _| *n, config(0)).unwrap();

        let rows: Vec<_> = dom
            .children(list.viewport())
            .into_iter()
            .filter(|&n| dom.is_element(n))
            .collect();
        assert_eq!(rows.len(), 10);
        assert!(rows.iter().all(|&r| dom.get_attribute(r, "role").as_deref() == Some("listitem")));

        assert_eq!(dom.style(list.spacer(), "height").as_deref(), Some("40000px"));
        assert_eq!(
            dom.get_attribute(list.container(), "aria-rowcount").as_deref(),
            Some("1000")
        );
        assert_eq!(dom.get_attribute(list.container(), "role").as_deref(), Some("list"));
        assert_eq!(dom.style(list.container(), "height").as_deref(), Some("400px"));
        assert_eq!(list.visible_range(), VisibleRange { start: 0, end: 10 });
    }

    #[test]
    fn test_scroll_events_coalesce_into_one_frame() {
        let (dom, scheduler, host) = setup(ManualScheduler::new());
        let list = virtual_list(&host, items(1000), row_template(&dom), |n: &u32, _| *n, config(0)).unwrap();

        dom.set_scroll_top(list.container(), 4000.0);
        for _ in 0..3 {
            dom.dispatch_event(list.container(), "scroll");
        }
        assert_eq!(scheduler.pending_frames(), 1);
        assert_eq!(list.visible_range().start, 0, "nothing happens before the frame");

        assert_eq!(scheduler.run_frame(), 1);
        assert_eq!(list.visible_range(), VisibleRange { start: 100, end: 110 });
        assert_eq!(dom.style(list.viewport(), "top").as_deref(), Some("4000px"));
        assert_eq!(dom.child_texts(list.viewport())[0], "item 100");

        // A new scroll after the frame schedules a new one.
        dom.dispatch_event(list.container(), "scroll");
        assert_eq!(scheduler.pending_frames(), 1);
    }

    #[test]
    fn test_template_gets_absolute_index() {
        let (dom, scheduler, host) = setup(ManualScheduler::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let template = {
            let dom = dom.clone();
            let seen = seen.clone();
            move |_: &u32, index: usize| {
                seen.borrow_mut().push(index);
                dom.create_element("li")
            }
        };
        let list = virtual_list(&host, items(1000), template, |n: &u32, _| *n, config(0)).unwrap();

        list.scroll_to_index(500);
        scheduler.run_frame();
        assert!(seen.borrow().contains(&500));
        assert!(seen.borrow().contains(&509));
        assert_eq!(list.visible_range().start, 500);
    }

    #[test]
    fn test_timer_fallback_without_frames() {
        let (dom, scheduler, host) = setup(ManualScheduler::without_frames());
        let list = virtual_list(&host, items(1000), row_template(&dom), |n: &u32, _| *n, config(0)).unwrap();

        dom.set_scroll_top(list.container(), 400.0);
        dom.dispatch_event(list.container(), "scroll");
        dom.dispatch_event(list.container(), "scroll");
        assert_eq!(scheduler.pending_timers(), 1);

        scheduler.advance(Duration::from_millis(16));
        assert_eq!(list.visible_range().start, 10);
    }

    #[test]
    fn test_dispose_is_idempotent_and_cancels_frame() {
        let (dom, scheduler, host) = setup(ManualScheduler::new());
        let list = virtual_list(&host, items(1000), row_template(&dom), |n: &u32, _| *n, config(0)).unwrap();

        dom.dispatch_event(list.container(), "scroll");
        assert_eq!(scheduler.pending_frames(), 1);

        list.dispose();
        list.dispose();
        assert!(list.is_disposed());
        assert_eq!(scheduler.pending_frames(), 0);
        assert!(dom.listeners(list.container()).is_empty());

        dom.dispatch_event(list.container(), "scroll");
        assert_eq!(scheduler.run_frame(), 0);
    }

    #[test]
    fn test_frame_after_dispose_is_ignored() {
        let (dom, scheduler, host) = setup(ManualScheduler::new());
        let list = virtual_list(&host, items(1000), row_template(&dom), |n: &u32, _| *n, config(0)).unwrap();

        // A host that cannot cancel still must not touch a disposed list.
        let state = list.state.clone();
        state.schedule();
        state.pending_task.set(None);
        list.dispose();

        dom.set_scroll_top(list.container(), 4000.0);
        scheduler.run_frame();
        assert_eq!(list.visible_range().start, 0);
    }

    #[test]
    fn test_source_changes_resize_spacer() {
        let (dom, _scheduler, host) = setup(ManualScheduler::new());
        let source = signal(items(1000));
        let list = virtual_list(&host, source.clone(), row_template(&dom), |n: &u32, _| *n, config(0)).unwrap();

        source.set(items(5));
        assert_eq!(dom.style(list.spacer(), "height").as_deref(), Some("200px"));
        assert_eq!(list.rendered_keys().len(), 5);
        assert_eq!(
            dom.get_attribute(list.container(), "aria-rowcount").as_deref(),
            Some("5")
        );
    }

    #[test]
    fn test_viewport_height_falls_back() {
        let (dom, _scheduler, host) = setup(ManualScheduler::new());
        let measured = virtual_list(
            &host,
            items(1000),
            row_template(&dom),
            |n: &u32, _| *n,
            VirtualListConfig {
                item_height: 10.0,
                overscan: 0,
                ..Default::default()
            },
        )
        .unwrap();
        // Unmeasured container: 400px fallback.
        assert_eq!(measured.visible_range().end, 40);

        dom.set_client_height(measured.container(), 100.0);
        measured.refresh();
        assert_eq!(measured.visible_range().end, 10);
    }
}
