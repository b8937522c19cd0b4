//! In-memory [`Dom`] implementation.
//!
//! Nodes live in a flat arena and are addressed by index. Nothing is ever
//! freed: detached nodes simply stay in the arena, which keeps handles valid
//! for assertions after removal.
//!
//! Mutation calls are counted in [`DomStats`] so tests can assert on the
//! exact number of `insert_before` / `append_child` / `remove_child` calls a
//! reconciliation pass performed.

use std::cell::{Cell, RefCell};

use tracing::warn;

use super::{
    Dom, DomEvent, EventListener, EventPhase, ListenerId, ListenerOptions, ListenerRecord, NodeId,
    NodeKind,
};
use crate::error::DomError;

/// Mutation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomStats {
    /// Element and text nodes created through the adapter. Fragments and
    /// comments are list plumbing and not counted.
    pub created: usize,
    /// `insert_before` calls (a fragment insert counts once).
    pub inserts: usize,
    /// `append_child` calls.
    pub appends: usize,
    /// `remove_child` calls that detached something.
    pub removes: usize,
}

struct NodeData {
    kind: NodeKind,
    tag: String,
    text: String,
    attributes: Vec<(String, String)>,
    class_name: String,
    style: Vec<(String, String)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<ListenerRecord>,
    scroll_top: f64,
    client_height: Option<f64>,
}

impl NodeData {
    fn new(kind: NodeKind, tag: &str, text: &str) -> Self {
        Self {
            kind,
            tag: tag.to_ascii_lowercase(),
            text: text.to_string(),
            attributes: Vec::new(),
            class_name: String::new(),
            style: Vec::new(),
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
            scroll_top: 0.0,
            client_height: None,
        }
    }
}

/// Arena-backed mock document.
pub struct MockDom {
    nodes: RefCell<Vec<NodeData>>,
    stats: Cell<DomStats>,
    next_listener: Cell<usize>,
    body: NodeId,
}

impl Default for MockDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDom {
    /// Create a document with an empty `<body>` root.
    pub fn new() -> Self {
        let body = NodeData::new(NodeKind::Element, "body", "");
        Self {
            nodes: RefCell::new(vec![body]),
            stats: Cell::new(DomStats::default()),
            next_listener: Cell::new(0),
            body: NodeId(0),
        }
    }

    /// The document root. Anything under it counts as attached.
    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn stats(&self) -> DomStats {
        self.stats.get()
    }

    pub fn reset_stats(&self) {
        self.stats.set(DomStats::default());
    }

    pub fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// Pin the value reported by [`Dom::client_height`].
    pub fn set_client_height(&self, node: NodeId, height: f64) {
        self.with_node_mut(node, |data| data.client_height = Some(height));
    }

    /// Whether `node` is reachable from [`MockDom::body`].
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(self.body, node)
    }

    /// Dispatch an event through capture, target and bubble phases.
    ///
    /// Listeners run with no internal borrow held, so they may mutate the
    /// document (including removing themselves).
    pub fn dispatch_event(&self, target: NodeId, event_type: &str) -> DomEvent {
        let event = DomEvent::new(event_type, target);

        let mut path = Vec::new();
        let mut current = self.parent(target);
        while let Some(node) = current {
            path.push(node);
            current = self.parent(node);
        }

        for &node in path.iter().rev() {
            self.invoke(node, &event, EventPhase::Capturing);
            if event.is_propagation_stopped() {
                event.finish();
                return event;
            }
        }

        self.invoke(target, &event, EventPhase::AtTarget);

        if event.bubbles() && !event.is_propagation_stopped() {
            for &node in &path {
                self.invoke(node, &event, EventPhase::Bubbling);
                if event.is_propagation_stopped() {
                    break;
                }
            }
        }

        event.finish();
        event
    }

    /// Text of every direct child, in order. Handy for asserting list order.
    pub fn child_texts(&self, parent: NodeId) -> Vec<String> {
        self.children(parent)
            .into_iter()
            .filter(|&child| self.node_kind(child) != Some(NodeKind::Comment))
            .map(|child| self.text_content(child))
            .collect()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn alloc(&self, data: NodeData) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        if matches!(data.kind, NodeKind::Element | NodeKind::Text) {
            self.bump(|s| s.created += 1);
        }
        nodes.push(data);
        NodeId(nodes.len() - 1)
    }

    fn bump(&self, f: impl FnOnce(&mut DomStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    fn with_node<R>(&self, node: NodeId, f: impl FnOnce(&NodeData) -> R) -> Option<R> {
        self.nodes.borrow().get(node.0).map(f)
    }

    fn with_node_mut<R>(&self, node: NodeId, f: impl FnOnce(&mut NodeData) -> R) -> Option<R> {
        self.nodes.borrow_mut().get_mut(node.0).map(f)
    }

    fn detach(nodes: &mut [NodeData], node: NodeId) -> bool {
        let Some(parent) = nodes[node.0].parent.take() else {
            return false;
        };
        nodes[parent.0].children.retain(|&c| c != node);
        true
    }

    fn insert_node(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let mut nodes = self.nodes.borrow_mut();
        if parent.0 >= nodes.len() || child.0 >= nodes.len() {
            warn!(?parent, ?child, "insert with unknown node ignored");
            return;
        }

        // Refuse to create cycles.
        let mut ancestor = Some(parent);
        while let Some(a) = ancestor {
            if a == child {
                warn!(?parent, ?child, "insert would create a cycle; ignored");
                return;
            }
            ancestor = nodes[a.0].parent;
        }

        let reference = if reference == Some(child) {
            let siblings = &nodes[parent.0].children;
            siblings
                .iter()
                .position(|&c| c == child)
                .and_then(|i| siblings.get(i + 1).copied())
        } else {
            reference
        };

        Self::detach(&mut nodes, child);

        let position = reference.and_then(|r| nodes[parent.0].children.iter().position(|&c| c == r));
        match position {
            Some(index) => nodes[parent.0].children.insert(index, child),
            None => {
                if reference.is_some() {
                    warn!(?parent, ?reference, "reference is not a child; appending");
                }
                nodes[parent.0].children.push(child);
            }
        }
        nodes[child.0].parent = Some(parent);
    }

    fn insert_any(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if self.node_kind(child) == Some(NodeKind::Fragment) {
            for moved in self.children(child) {
                self.insert_node(parent, moved, reference);
            }
        } else {
            self.insert_node(parent, child, reference);
        }
    }

    fn invoke(&self, node: NodeId, event: &DomEvent, phase: EventPhase) {
        let records: Vec<ListenerRecord> = self
            .with_node(node, |data| {
                data.listeners
                    .iter()
                    .filter(|r| r.event_type == event.event_type())
                    .filter(|r| match phase {
                        EventPhase::Capturing => r.options.contains(ListenerOptions::CAPTURE),
                        EventPhase::Bubbling => !r.options.contains(ListenerOptions::CAPTURE),
                        EventPhase::AtTarget => true,
                        EventPhase::None => false,
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        for record in records {
            // An earlier listener may have removed this one.
            let still_registered = self
                .with_node(node, |data| data.listeners.iter().any(|r| r.id == record.id))
                .unwrap_or(false);
            if !still_registered {
                continue;
            }
            if record.options.contains(ListenerOptions::ONCE) {
                self.remove_event_listener(node, record.id);
            }
            event.enter(node, phase, record.options.contains(ListenerOptions::PASSIVE));
            (record.listener)(event);
        }
    }
}

// =============================================================================
// Selectors (closest)
// =============================================================================

enum Selector {
    Tag(String),
    HasAttr(String),
    AttrEq(String, String),
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn parse_selector(selector: &str) -> Result<Selector, DomError> {
    let invalid = || DomError::InvalidSelector(selector.to_string());
    let trimmed = selector.trim();

    if let Some(inner) = trimmed.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        return match inner.split_once('=') {
            None if is_ident(inner) => Ok(Selector::HasAttr(inner.to_string())),
            None => Err(invalid()),
            Some((name, value)) => {
                if !is_ident(name) {
                    return Err(invalid());
                }
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                    .unwrap_or(value);
                Ok(Selector::AttrEq(name.to_string(), value.to_string()))
            }
        };
    }

    if is_ident(trimmed) {
        Ok(Selector::Tag(trimmed.to_ascii_lowercase()))
    } else {
        Err(invalid())
    }
}

fn style_to_text(style: &[(String, String)]) -> String {
    style
        .iter()
        .map(|(p, v)| format!("{p}: {v};"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_style_text(text: &str) -> Vec<(String, String)> {
    text.split(';')
        .filter_map(|decl| decl.split_once(':'))
        .map(|(p, v)| (p.trim().to_string(), v.trim().to_string()))
        .filter(|(p, _)| !p.is_empty())
        .collect()
}

// =============================================================================
// Dom impl
// =============================================================================

impl Dom for MockDom {
    fn create_element(&self, tag: &str) -> NodeId {
        self.alloc(NodeData::new(NodeKind::Element, tag, ""))
    }

    fn create_text(&self, text: &str) -> NodeId {
        self.alloc(NodeData::new(NodeKind::Text, "", text))
    }

    fn create_comment(&self, data: &str) -> NodeId {
        self.alloc(NodeData::new(NodeKind::Comment, "", data))
    }

    fn create_fragment(&self) -> NodeId {
        self.alloc(NodeData::new(NodeKind::Fragment, "", ""))
    }

    fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.with_node(node, |data| data.kind)
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.with_node(node, |data| (data.kind == NodeKind::Element).then(|| data.tag.clone()))
            .flatten()
    }

    fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.with_node(node, |data| {
            data.attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
        })
        .flatten()
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.with_node_mut(node, |data| {
            match data.attributes.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = value.to_string(),
                None => data.attributes.push((name.to_string(), value.to_string())),
            }
        });
    }

    fn remove_attribute(&self, node: NodeId, name: &str) {
        self.with_node_mut(node, |data| data.attributes.retain(|(n, _)| n != name));
    }

    fn attribute_names(&self, node: NodeId) -> Vec<String> {
        self.with_node(node, |data| data.attributes.iter().map(|(n, _)| n.clone()).collect())
            .unwrap_or_default()
    }

    fn text_content(&self, node: NodeId) -> String {
        let Some((kind, text, children)) =
            self.with_node(node, |data| (data.kind, data.text.clone(), data.children.clone()))
        else {
            return String::new();
        };
        match kind {
            NodeKind::Text | NodeKind::Comment => text,
            NodeKind::Element | NodeKind::Fragment => children
                .into_iter()
                .filter(|&c| self.node_kind(c) != Some(NodeKind::Comment))
                .map(|c| self.text_content(c))
                .collect(),
        }
    }

    fn set_text_content(&self, node: NodeId, text: &str) {
        let Some(kind) = self.node_kind(node) else {
            return;
        };
        match kind {
            NodeKind::Text | NodeKind::Comment => {
                self.with_node_mut(node, |data| data.text = text.to_string());
            }
            NodeKind::Element | NodeKind::Fragment => {
                {
                    let mut nodes = self.nodes.borrow_mut();
                    let children = std::mem::take(&mut nodes[node.0].children);
                    for child in children {
                        nodes[child.0].parent = None;
                    }
                }
                if !text.is_empty() {
                    let child = self.create_text(text);
                    self.insert_node(node, child, None);
                }
            }
        }
    }

    fn class_name(&self, node: NodeId) -> String {
        self.with_node(node, |data| data.class_name.clone())
            .unwrap_or_default()
    }

    fn set_class_name(&self, node: NodeId, class_name: &str) {
        self.with_node_mut(node, |data| data.class_name = class_name.to_string());
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.with_node(node, |data| {
            data.style
                .iter()
                .find(|(p, _)| p == property)
                .map(|(_, v)| v.clone())
        })
        .flatten()
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        self.with_node_mut(node, |data| {
            if value.is_empty() {
                data.style.retain(|(p, _)| p != property);
                return;
            }
            match data.style.iter_mut().find(|(p, _)| p == property) {
                Some((_, v)) => *v = value.to_string(),
                None => data.style.push((property.to_string(), value.to_string())),
            }
        });
    }

    fn style_text(&self, node: NodeId) -> String {
        self.with_node(node, |data| style_to_text(&data.style))
            .unwrap_or_default()
    }

    fn set_style_text(&self, node: NodeId, text: &str) {
        self.with_node_mut(node, |data| data.style = parse_style_text(text));
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.with_node(node, |data| data.parent).flatten()
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.with_node(node, |data| data.children.first().copied())
            .flatten()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        let parent = nodes.get(node.0)?.parent?;
        let siblings = &nodes[parent.0].children;
        let index = siblings.iter().position(|&c| c == node)?;
        siblings.get(index + 1).copied()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.with_node(node, |data| data.children.clone())
            .unwrap_or_default()
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        self.bump(|s| s.appends += 1);
        self.insert_any(parent, child, None);
    }

    fn insert_before(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.bump(|s| s.inserts += 1);
        self.insert_any(parent, child, reference);
    }

    fn remove_child(&self, parent: NodeId, child: NodeId) {
        let removed = {
            let mut nodes = self.nodes.borrow_mut();
            let is_child = nodes
                .get(child.0)
                .is_some_and(|data| data.parent == Some(parent));
            is_child && Self::detach(&mut nodes, child)
        };
        if removed {
            self.bump(|s| s.removes += 1);
        }
    }

    fn add_event_listener(
        &self,
        node: NodeId,
        event_type: &str,
        listener: EventListener,
        options: ListenerOptions,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.with_node_mut(node, |data| {
            data.listeners.push(ListenerRecord {
                id,
                event_type: event_type.to_string(),
                listener,
                options,
            })
        });
        id
    }

    fn remove_event_listener(&self, node: NodeId, id: ListenerId) {
        self.with_node_mut(node, |data| data.listeners.retain(|r| r.id != id));
    }

    fn listeners(&self, node: NodeId) -> Vec<ListenerRecord> {
        self.with_node(node, |data| data.listeners.clone())
            .unwrap_or_default()
    }

    fn scroll_top(&self, node: NodeId) -> f64 {
        self.with_node(node, |data| data.scroll_top).unwrap_or(0.0)
    }

    fn set_scroll_top(&self, node: NodeId, value: f64) {
        self.with_node_mut(node, |data| data.scroll_top = value.max(0.0));
    }

    fn client_height(&self, node: NodeId) -> f64 {
        self.with_node(node, |data| {
            data.client_height.unwrap_or_else(|| {
                data.style
                    .iter()
                    .find(|(p, _)| p == "height")
                    .and_then(|(_, v)| v.strip_suffix("px"))
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .unwrap_or(0.0)
            })
        })
        .unwrap_or(0.0)
    }

    fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let selector = parse_selector(selector)?;
        let mut current = Some(node);
        while let Some(n) = current {
            let matched = self
                .with_node(n, |data| {
                    data.kind == NodeKind::Element
                        && match &selector {
                            Selector::Tag(tag) => &data.tag == tag,
                            Selector::HasAttr(name) => data.attributes.iter().any(|(a, _)| a == name),
                            Selector::AttrEq(name, value) => data
                                .attributes
                                .iter()
                                .any(|(a, v)| a == name && v == value),
                        }
                })
                .unwrap_or(false);
            if matched {
                return Ok(Some(n));
            }
            current = self.parent(n);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_insert_and_order() {
        let dom = MockDom::new();
        let list = dom.create_element("ul");
        let a = dom.create_text("a");
        let b = dom.create_text("b");
        let c = dom.create_text("c");

        dom.append_child(list, a);
        dom.append_child(list, c);
        dom.insert_before(list, b, Some(c));

        assert_eq!(dom.child_texts(list), vec!["a", "b", "c"]);
        assert_eq!(dom.next_sibling(a), Some(b));
        assert_eq!(dom.next_sibling(c), None);
        assert_eq!(dom.parent(b), Some(list));

        let stats = dom.stats();
        assert_eq!(stats.appends, 2);
        assert_eq!(stats.inserts, 1);
    }

    #[test]
    fn test_fragment_insert_moves_children_once() {
        let dom = MockDom::new();
        let list = dom.create_element("ul");
        let frag = dom.create_fragment();
        for text in ["x", "y", "z"] {
            let node = dom.create_text(text);
            dom.append_child(frag, node);
        }
        dom.reset_stats();

        dom.insert_before(list, frag, None);

        assert_eq!(dom.child_texts(list), vec!["x", "y", "z"]);
        assert!(dom.children(frag).is_empty());
        assert_eq!(dom.stats().inserts, 1);
    }

    #[test]
    fn test_created_counts_content_nodes_only() {
        let dom = MockDom::new();
        dom.create_element("li");
        dom.create_text("a");
        dom.create_fragment();
        dom.create_comment("list-end");

        assert_eq!(dom.stats().created, 2);
    }

    #[test]
    fn test_insert_moves_existing_node() {
        let dom = MockDom::new();
        let list = dom.create_element("ul");
        let nodes: Vec<_> = ["a", "b", "c"].iter().map(|t| dom.create_text(t)).collect();
        for &n in &nodes {
            dom.append_child(list, n);
        }

        dom.insert_before(list, nodes[2], Some(nodes[0]));
        assert_eq!(dom.child_texts(list), vec!["c", "a", "b"]);

        // Inserting before itself is a no-op move.
        dom.insert_before(list, nodes[0], Some(nodes[0]));
        assert_eq!(dom.child_texts(list), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_remove_child_counts_only_real_removals() {
        let dom = MockDom::new();
        let list = dom.create_element("ul");
        let other = dom.create_element("ol");
        let item = dom.create_element("li");
        dom.append_child(list, item);

        dom.remove_child(other, item);
        assert_eq!(dom.stats().removes, 0);
        assert_eq!(dom.parent(item), Some(list));

        dom.remove(item);
        assert_eq!(dom.stats().removes, 1);
        assert_eq!(dom.parent(item), None);
    }

    #[test]
    fn test_style_round_trip() {
        let dom = MockDom::new();
        let el = dom.create_element("div");
        dom.set_style(el, "height", "400px");
        dom.set_style(el, "overflow-y", "auto");
        assert_eq!(dom.style_text(el), "height: 400px; overflow-y: auto;");
        assert_eq!(dom.client_height(el), 400.0);

        dom.set_style_text(el, "top: 10px; position: absolute");
        assert_eq!(dom.style(el, "top").as_deref(), Some("10px"));
        assert_eq!(dom.style(el, "height"), None);

        dom.set_style(el, "top", "");
        assert_eq!(dom.style(el, "top"), None);
    }

    #[test]
    fn test_set_text_content_replaces_children() {
        let dom = MockDom::new();
        let el = dom.create_element("li");
        let child = dom.create_element("span");
        dom.append_child(el, child);

        dom.set_text_content(el, "hello");
        assert_eq!(dom.text_content(el), "hello");
        assert_eq!(dom.parent(child), None);

        dom.set_text_content(el, "");
        assert!(dom.children(el).is_empty());
    }

    #[test]
    fn test_dispatch_capture_target_bubble_order() {
        let dom = MockDom::new();
        let outer = dom.create_element("div");
        let inner = dom.create_element("span");
        dom.append_child(dom.body(), outer);
        dom.append_child(outer, inner);

        let log = Rc::new(RefCell::new(Vec::new()));
        for (node, label, options) in [
            (outer, "outer-capture", ListenerOptions::CAPTURE),
            (outer, "outer-bubble", ListenerOptions::NONE),
            (inner, "inner", ListenerOptions::NONE),
        ] {
            let log = log.clone();
            dom.add_event_listener(
                node,
                "click",
                Rc::new(move |_| log.borrow_mut().push(label)),
                options,
            );
        }

        dom.dispatch_event(inner, "click");
        assert_eq!(*log.borrow(), vec!["outer-capture", "inner", "outer-bubble"]);

        // Non-bubbling events only reach capture listeners on ancestors.
        log.borrow_mut().clear();
        for (node, label, options) in [
            (outer, "focus-capture", ListenerOptions::CAPTURE),
            (outer, "focus-bubble", ListenerOptions::NONE),
        ] {
            let log = log.clone();
            dom.add_event_listener(
                node,
                "focus",
                Rc::new(move |_| log.borrow_mut().push(label)),
                options,
            );
        }
        dom.dispatch_event(inner, "focus");
        assert_eq!(*log.borrow(), vec!["focus-capture"]);
    }

    #[test]
    fn test_once_listener_runs_once() {
        let dom = MockDom::new();
        let el = dom.create_element("button");
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        dom.add_event_listener(
            el,
            "click",
            Rc::new(move |_| count_clone.set(count_clone.get() + 1)),
            ListenerOptions::ONCE,
        );

        dom.dispatch_event(el, "click");
        dom.dispatch_event(el, "click");
        assert_eq!(count.get(), 1);
        assert!(dom.listeners(el).is_empty());
    }

    #[test]
    fn test_closest_selectors() {
        let dom = MockDom::new();
        let row = dom.create_element("li");
        let cell = dom.create_element("span");
        dom.append_child(row, cell);
        dom.set_attribute(row, "data-key", "7");

        assert_eq!(dom.closest(cell, "[data-key]"), Ok(Some(row)));
        assert_eq!(dom.closest(cell, "[data-key=\"7\"]"), Ok(Some(row)));
        assert_eq!(dom.closest(cell, "[data-key='8']"), Ok(None));
        assert_eq!(dom.closest(cell, "LI"), Ok(Some(row)));
        assert!(matches!(
            dom.closest(cell, "div > [data-key]"),
            Err(DomError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_cycle_insert_ignored() {
        let dom = MockDom::new();
        let outer = dom.create_element("div");
        let inner = dom.create_element("div");
        dom.append_child(outer, inner);

        dom.append_child(inner, outer);
        assert_eq!(dom.parent(outer), None);
        assert_eq!(dom.parent(inner), Some(outer));
    }
}
