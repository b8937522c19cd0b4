//! DOM events as seen by listeners.

use std::cell::Cell;

use super::NodeId;

/// Event types that do not bubble.
///
/// Delegation must listen for these in the capture phase, otherwise the
/// container never sees them.
const NON_BUBBLING: &[&str] = &[
    "focus",
    "blur",
    "scroll",
    "mouseenter",
    "mouseleave",
    "pointerenter",
    "pointerleave",
    "load",
    "unload",
    "error",
];

/// Whether events of this type bubble.
pub fn event_bubbles(event_type: &str) -> bool {
    !NON_BUBBLING.contains(&event_type)
}

/// Dispatch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// An event travelling through the tree.
///
/// Listeners only get `&DomEvent`; the mutable bits (current target,
/// propagation flags) use interior mutability.
#[derive(Debug)]
pub struct DomEvent {
    event_type: String,
    target: NodeId,
    bubbles: bool,
    current_target: Cell<Option<NodeId>>,
    phase: Cell<EventPhase>,
    propagation_stopped: Cell<bool>,
    default_prevented: Cell<bool>,
    passive: Cell<bool>,
}

impl DomEvent {
    pub fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            bubbles: event_bubbles(event_type),
            current_target: Cell::new(None),
            phase: Cell::new(EventPhase::None),
            propagation_stopped: Cell::new(false),
            default_prevented: Cell::new(false),
            passive: Cell::new(false),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The node the event was dispatched on.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The node whose listener is currently running.
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target.get()
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn phase(&self) -> EventPhase {
        self.phase.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    /// Ignored while a passive listener runs.
    pub fn prevent_default(&self) {
        if !self.passive.get() {
            self.default_prevented.set(true);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub(crate) fn enter(&self, node: NodeId, phase: EventPhase, passive: bool) {
        self.current_target.set(Some(node));
        self.phase.set(phase);
        self.passive.set(passive);
    }

    pub(crate) fn finish(&self) {
        self.current_target.set(None);
        self.phase.set(EventPhase::None);
        self.passive.set(false);
    }
}
