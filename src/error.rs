//! Error types.
//!
//! Configuration problems fail fast at construction. Template failures abort
//! the current pass and leave the previous render on screen, as does a pass
//! over a list whose markers were removed from the document. Pool capacity
//! rejections are not errors at all (see [`ElementPool::release`]).
//!
//! [`ElementPool::release`]: crate::list::ElementPool::release

use thiserror::Error;

use crate::types::BoxError;

/// Errors raised by the list runtime.
#[derive(Debug, Error)]
pub enum Error {
    /// `item_height` missing, zero, negative or not finite.
    #[error("virtual list requires a positive, finite item height (got {0})")]
    InvalidItemHeight(f64),

    /// An explicit container height that cannot be used for geometry.
    #[error("virtual list container height must be positive and finite (got {0})")]
    InvalidContainerHeight(f64),

    /// A template returned no nodes at all.
    #[error("template for item {index} rendered no nodes")]
    EmptyRender { index: usize },

    /// A template failed while creating an item.
    #[error("template failed for item {index}: {source}")]
    Template {
        index: usize,
        #[source]
        source: BoxError,
    },

    /// The list's end marker has no parent, so there is nowhere to place
    /// rows. The pass is abandoned before any node is created or moved.
    #[error("list markers are detached from the document")]
    Detached,
}

/// Errors reported by a [`Dom`](crate::dom::Dom) adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The adapter has no native implementation of this capability.
    #[error("dom adapter does not support `{0}`")]
    Unsupported(&'static str),

    #[error("invalid selector `{0}`")]
    InvalidSelector(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = Error::InvalidItemHeight(0.0);
        assert_eq!(
            err.to_string(),
            "virtual list requires a positive, finite item height (got 0)"
        );
    }

    #[test]
    fn test_template_error_keeps_source() {
        use std::error::Error as _;

        let err = Error::Template {
            index: 3,
            source: "bad row".into(),
        };
        assert_eq!(err.to_string(), "template failed for item 3: bad row");
        assert_eq!(err.source().map(|s| s.to_string()), Some("bad row".to_string()));
    }
}
