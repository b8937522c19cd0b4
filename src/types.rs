//! Core types for spark-dom.
//!
//! These types are shared by every list flavour: the identity of an item
//! ([`Key`]), what a template hands back ([`Rendered`]), and the cleanup and
//! callback aliases that flow through the reconciler.

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::dom::{DomEvent, NodeId};

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function registered by a template for one rendered item.
///
/// The reconciler calls it exactly once: when the item's key disappears from
/// a pass, or when the whole list is disposed.
pub type Cleanup = Box<dyn FnOnce()>;

/// Boxed error returned by fallible templates.
pub type BoxError = Box<dyn std::error::Error + 'static>;

/// Normalized template output.
pub type RenderOutcome = Result<Rendered, BoxError>;

/// Delegated event handler: `(event, item, index)`.
pub type DelegatedHandler<T> = Rc<dyn Fn(&DomEvent, &T, usize)>;

// =============================================================================
// Key
// =============================================================================

/// Identity of an item across reconciliation passes.
///
/// Produced by the caller's key function. Keys must be unique within one
/// pass; a duplicate silently shadows the earlier occurrence.
///
/// Delegated lists stamp the [`Display`](fmt::Display) text onto rows, so
/// there `Str("7")` and `Num(7)` name the same row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Str(Rc<str>),
    Num(i64),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => f.write_str(s),
            Key::Num(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(Rc::from(value))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(Rc::from(value))
    }
}

impl From<Rc<str>> for Key {
    fn from(value: Rc<str>) -> Self {
        Key::Str(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Num(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Num(value as i64)
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Key::Num(value as i64)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Num(value as i64)
    }
}

// =============================================================================
// Rendered
// =============================================================================

/// Node sequence of one rendered item. Almost always a single root.
pub type NodeList = SmallVec<[NodeId; 1]>;

/// What a template produced for one item.
///
/// A single node or an ordered run of nodes. The first node is the root:
/// it carries the key attribute for delegation, the `role` for virtual
/// lists, and is the node swapped for a recycled element.
pub struct Rendered {
    nodes: NodeList,
    cleanup: Option<Cleanup>,
}

impl Rendered {
    /// A single root node.
    pub fn node(node: NodeId) -> Self {
        Self {
            nodes: smallvec::smallvec![node],
            cleanup: None,
        }
    }

    /// An ordered run of sibling nodes.
    pub fn nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            cleanup: None,
        }
    }

    /// Attach a cleanup that runs when the item is removed.
    pub fn with_cleanup(mut self, cleanup: impl FnOnce() + 'static) -> Self {
        self.cleanup = Some(Box::new(cleanup));
        self
    }

    /// The root node, if the template produced anything.
    pub fn root(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn as_nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub(crate) fn into_parts(self) -> (NodeList, Option<Cleanup>) {
        (self.nodes, self.cleanup)
    }
}

impl fmt::Debug for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rendered")
            .field("nodes", &self.nodes)
            .field("cleanup", &self.cleanup.is_some())
            .finish()
    }
}

impl From<NodeId> for Rendered {
    fn from(node: NodeId) -> Self {
        Rendered::node(node)
    }
}

impl From<Vec<NodeId>> for Rendered {
    fn from(nodes: Vec<NodeId>) -> Self {
        Rendered::nodes(nodes)
    }
}

/// Anything a template may return.
///
/// Templates are normalized to [`RenderOutcome`] at the boundary so the
/// reconciler only ever deals with one shape.
pub trait IntoRendered {
    fn into_rendered(self) -> RenderOutcome;
}

impl IntoRendered for Rendered {
    fn into_rendered(self) -> RenderOutcome {
        Ok(self)
    }
}

impl IntoRendered for NodeId {
    fn into_rendered(self) -> RenderOutcome {
        Ok(Rendered::node(self))
    }
}

impl IntoRendered for Vec<NodeId> {
    fn into_rendered(self) -> RenderOutcome {
        Ok(Rendered::nodes(self))
    }
}

impl<R, E> IntoRendered for Result<R, E>
where
    R: IntoRendered,
    E: Into<BoxError>,
{
    fn into_rendered(self) -> RenderOutcome {
        self.map_err(Into::into).and_then(IntoRendered::into_rendered)
    }
}
