//! DOM adapter - The seam between the list runtime and a concrete document.
//!
//! The reconciler never talks to a browser directly. Everything it needs goes
//! through the [`Dom`] trait:
//! - node creation (element, text, comment, fragment)
//! - attribute, class and inline style access
//! - child insertion, removal and traversal
//! - event listener registration
//! - scroll geometry for virtual lists
//!
//! The same reconciliation logic therefore runs against a real browser
//! binding, a server-side document, or [`MockDom`] in tests.
//!
//! # Node handles
//!
//! Nodes are plain indices ([`NodeId`]) into the adapter's own storage, the
//! same way components are indices into parallel arrays elsewhere in spark.
//! Handles are `Copy` and carry no lifetime; an adapter ignores handles it
//! does not know.
//!
//! # Re-entrancy
//!
//! All methods take `&self`. Event listeners run synchronously inside
//! [`MockDom::dispatch_event`] and are free to call back into the adapter,
//! so implementations must not hold internal borrows across listener calls.

mod event;
mod mock;

pub use event::{DomEvent, EventPhase, event_bubbles};
pub use mock::{DomStats, MockDom};

use std::fmt;
use std::rc::Rc;

use crate::error::DomError;

// =============================================================================
// Handles
// =============================================================================

/// Handle to a node owned by a [`Dom`] adapter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw index of this node inside its adapter.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    Fragment,
}

/// Handle to a registered event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) usize);

/// Event listener callback.
pub type EventListener = Rc<dyn Fn(&DomEvent)>;

bitflags::bitflags! {
    /// Listener registration options.
    ///
    /// Combine with bitwise OR: `ListenerOptions::CAPTURE | ListenerOptions::PASSIVE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ListenerOptions: u8 {
        const NONE = 0;
        const CAPTURE = 1 << 0;
        const ONCE = 1 << 1;
        const PASSIVE = 1 << 2;
    }
}

/// A listener as stored on a node.
///
/// Returned by [`Dom::listeners`] so listener references can be moved from
/// one element to another when a recycled element replaces a fresh one.
#[derive(Clone)]
pub struct ListenerRecord {
    pub id: ListenerId,
    pub event_type: String,
    pub listener: EventListener,
    pub options: ListenerOptions,
}

impl fmt::Debug for ListenerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRecord")
            .field("id", &self.id)
            .field("event_type", &self.event_type)
            .field("options", &self.options)
            .finish()
    }
}

// =============================================================================
// Adapter Trait
// =============================================================================

/// Document abstraction consumed by the list runtime.
pub trait Dom {
    // Creation
    fn create_element(&self, tag: &str) -> NodeId;
    fn create_text(&self, text: &str) -> NodeId;
    fn create_comment(&self, data: &str) -> NodeId;
    fn create_fragment(&self) -> NodeId;

    // Shape
    fn node_kind(&self, node: NodeId) -> Option<NodeKind>;
    /// Lowercase tag name for elements, `None` otherwise.
    fn tag_name(&self, node: NodeId) -> Option<String>;

    // Attributes. `class` and `style` have dedicated accessors below and
    // are not listed by `attribute_names`.
    fn get_attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&self, node: NodeId, name: &str);
    fn attribute_names(&self, node: NodeId) -> Vec<String>;

    fn text_content(&self, node: NodeId) -> String;
    fn set_text_content(&self, node: NodeId, text: &str);

    fn class_name(&self, node: NodeId) -> String;
    fn set_class_name(&self, node: NodeId, class_name: &str);

    // Inline style
    fn style(&self, node: NodeId, property: &str) -> Option<String>;
    /// Set one inline style property. An empty value removes it.
    fn set_style(&self, node: NodeId, property: &str, value: &str);
    fn style_text(&self, node: NodeId) -> String;
    fn set_style_text(&self, node: NodeId, text: &str);

    // Traversal
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn first_child(&self, node: NodeId) -> Option<NodeId>;
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    // Mutation. Inserting a fragment moves its children and leaves it empty.
    fn append_child(&self, parent: NodeId, child: NodeId);
    fn insert_before(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>);
    fn remove_child(&self, parent: NodeId, child: NodeId);

    // Events
    fn add_event_listener(
        &self,
        node: NodeId,
        event_type: &str,
        listener: EventListener,
        options: ListenerOptions,
    ) -> ListenerId;
    fn remove_event_listener(&self, node: NodeId, id: ListenerId);
    fn listeners(&self, node: NodeId) -> Vec<ListenerRecord>;

    // Scroll geometry
    fn scroll_top(&self, node: NodeId) -> f64;
    fn set_scroll_top(&self, node: NodeId, value: f64);
    fn client_height(&self, node: NodeId) -> f64;

    /// Native nearest-ancestor-or-self selector match.
    ///
    /// Adapters without selector support keep the default, which reports
    /// [`DomError::Unsupported`]; callers then walk ancestors by hand.
    fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let _ = (node, selector);
        Err(DomError::Unsupported("closest"))
    }

    /// Detach `node` from its parent, if it has one.
    fn remove(&self, node: NodeId) {
        if let Some(parent) = self.parent(node) {
            self.remove_child(parent, node);
        }
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.node_kind(node) == Some(NodeKind::Element)
    }

    /// Inclusive ancestor check.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }
}
