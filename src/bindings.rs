//! Per-instance registry of the listeners a menu has installed.
//!
//! Every entry keeps the listener id the host handed out, so unbinding always
//! removes exactly what was bound and nothing is removed twice.

use crate::dom::{Dom, ListenerId};

/// What a listener does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    /// Toggler click: open the menu.
    Toggle,
    /// Backdrop or close control click: close the menu.
    Close,
    /// One-shot transition-end on the container: finish a hide.
    TransitionEnd,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding<N> {
    pub target: N,
    pub event_type: String,
    pub handler: Handler,
    pub listener: ListenerId,
}

#[derive(Debug, Clone)]
pub struct BindingRegistry<N> {
    entries: Vec<Binding<N>>,
}

impl<N> Default for BindingRegistry<N> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<N: Clone + PartialEq> BindingRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind<D: Dom<Node = N>>(
        &mut self,
        dom: &mut D,
        target: &N,
        event_type: &str,
        handler: Handler,
    ) -> ListenerId {
        let listener = dom.add_listener(target, event_type);
        self.entries.push(Binding {
            target: target.clone(),
            event_type: event_type.to_string(),
            handler,
            listener,
        });
        listener
    }

    pub fn get(&self, listener: ListenerId) -> Option<&Binding<N>> {
        self.entries.iter().find(|b| b.listener == listener)
    }

    pub fn handler_for(&self, listener: ListenerId) -> Option<Handler> {
        self.get(listener).map(|b| b.handler)
    }

    /// Remove one binding. Returns `false` if it was not registered here.
    pub fn unbind<D: Dom<Node = N>>(&mut self, dom: &mut D, listener: ListenerId) -> bool {
        let Some(pos) = self.entries.iter().position(|b| b.listener == listener) else {
            return false;
        };
        let binding = self.entries.remove(pos);
        dom.remove_listener(binding.listener);
        true
    }

    /// Remove every binding whose handler satisfies `pred`; returns how many
    /// were removed.
    pub fn release<D, F>(&mut self, dom: &mut D, mut pred: F) -> usize
    where
        D: Dom<Node = N>,
        F: FnMut(Handler) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|binding| {
            if pred(binding.handler) {
                dom.remove_listener(binding.listener);
                false
            } else {
                true
            }
        });
        before - self.entries.len()
    }

    pub fn count(&self, handler: Handler) -> usize {
        self.entries.iter().filter(|b| b.handler == handler).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding<N>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;

    #[test]
    fn bind_and_unbind_track_host_listeners() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let link = doc.add_element(body, "a", &[]).unwrap();
        let mut registry = BindingRegistry::new();

        let click = registry.bind(&mut doc, &link, "click", Handler::Toggle);
        let end = registry.bind(&mut doc, &link, "transitionend", Handler::TransitionEnd);
        assert_eq!(doc.listener_count(), 2);
        assert_eq!(registry.handler_for(click), Some(Handler::Toggle));
        assert_eq!(registry.get(end).map(|b| b.event_type.as_str()), Some("transitionend"));

        assert!(registry.unbind(&mut doc, click));
        assert!(!registry.unbind(&mut doc, click));
        assert_eq!(doc.listener_count(), 1);
        assert_eq!(registry.handler_for(click), None);
    }

    #[test]
    fn release_keeps_unmatched_bindings() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let mut registry = BindingRegistry::new();
        registry.bind(&mut doc, &body, "click", Handler::Toggle);
        registry.bind(&mut doc, &body, "click", Handler::Close);
        registry.bind(&mut doc, &body, "transitionend", Handler::TransitionEnd);

        let removed = registry.release(&mut doc, |h| h != Handler::TransitionEnd);
        assert_eq!(removed, 2);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.count(Handler::TransitionEnd), 1);
        assert_eq!(doc.listener_count(), 1);
        assert_eq!(registry.release(&mut doc, |h| h != Handler::TransitionEnd), 0);
    }
}
