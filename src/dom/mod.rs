//! Host document abstraction.
//!
//! The lifecycle only ever touches the document through [`Dom`]. Two hosts
//! ship with the crate:
//!
//! - [`MemoryDocument`]: a deterministic arena document used by tests, the
//!   terminal preview and the bench. Paired with [`TransitionSimulator`] it
//!   behaves like a browser that runs CSS transitions.
//! - `web::WebDom` (feature `web`, wasm32 only): the real browser DOM.
//!
//! Events are host-driven. A host registers listeners on behalf of a menu and
//! later hands each delivery back to `SlideMenu::handle_event` together with
//! the [`ListenerId`] it was registered under.

pub mod memory;
pub mod selector;
pub mod transition;
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

use std::fmt;

use crate::error::DomError;

pub use memory::{MemoryDocument, NodeId};
pub use selector::SelectorList;
pub use transition::{ActiveTransition, TransitionSimulator};

/// Handle for a registered event listener, unique per host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// An event as seen by one listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent<N> {
    pub event_type: String,
    /// Node the event was originally dispatched to.
    pub target: N,
    /// Node the listener is attached to.
    pub current_target: N,
}

/// One listener invocation produced by dispatching an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery<N> {
    pub listener: ListenerId,
    pub event: DomEvent<N>,
}

pub trait Dom {
    type Node: Clone + PartialEq + fmt::Debug;

    fn body(&self) -> Self::Node;

    fn create_element(&mut self, tag: &str) -> Result<Self::Node, DomError>;

    fn is_element(&self, node: &Self::Node) -> bool;

    /// First element in document order matching `selector`.
    fn query_selector(&self, selector: &str) -> Result<Option<Self::Node>, DomError>;

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Node>, DomError>;

    /// First descendant of `root` matching `selector`.
    fn query_within(
        &self,
        root: &Self::Node,
        selector: &str,
    ) -> Result<Option<Self::Node>, DomError>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn next_element_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Whether the node is reachable from the document root.
    fn is_connected(&self, node: &Self::Node) -> bool;

    /// Move `child` to the end of `parent`'s children, detaching it first.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;

    /// Move `child` to the front of `parent`'s children, detaching it first.
    fn prepend_child(&mut self, parent: &Self::Node, child: &Self::Node)
    -> Result<(), DomError>;

    /// Move `child` before `reference`, or to the end when `reference` is `None`.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: Option<&Self::Node>,
    ) -> Result<(), DomError>;

    /// Detach `node` from its parent. Detached nodes are left alone.
    fn remove(&mut self, node: &Self::Node);

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str)
    -> Result<(), DomError>;

    fn add_class(&mut self, node: &Self::Node, class: &str) -> Result<(), DomError>;

    fn remove_class(&mut self, node: &Self::Node, class: &str) -> Result<(), DomError>;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str)
    -> Result<(), DomError>;

    /// Inline style value, if one is set.
    fn style(&self, node: &Self::Node, property: &str) -> Option<String>;

    fn remove_style(&mut self, node: &Self::Node, property: &str) -> Result<(), DomError>;

    /// Effective `display` value after stylesheets are applied.
    fn computed_display(&self, node: &Self::Node) -> String;

    fn add_listener(&mut self, target: &Self::Node, event_type: &str) -> ListenerId;

    /// Returns `false` when the listener was not registered.
    fn remove_listener(&mut self, listener: ListenerId) -> bool;
}
