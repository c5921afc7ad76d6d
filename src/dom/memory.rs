//! Deterministic in-memory document.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. The document starts
//! as `<html><body></body></html>`; detached nodes stay in the arena and can be
//! re-attached at any time, the same way browser nodes survive `remove()`.

use std::fmt::Write as _;

use super::selector::{ElementTree, SelectorList};
use super::{Delivery, Dom, DomEvent, ListenerId};
use crate::error::DomError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    style: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct ListenerEntry {
    id: ListenerId,
    target: NodeId,
    event_type: String,
}

/// One inline style mutation, recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleChange {
    pub node: NodeId,
    pub property: String,
    pub old: Option<String>,
    pub new: Option<String>,
    /// Whether the node was attached when the change happened.
    pub connected: bool,
}

#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
    root: NodeId,
    body: NodeId,
    listeners: Vec<ListenerEntry>,
    next_listener: u64,
    display_rules: Vec<(SelectorList, String)>,
    style_journal: Vec<StyleChange>,
}

const BLOCK_TAGS: &[&str] = &[
    "html", "body", "div", "nav", "ul", "ol", "li", "p", "section", "header", "footer", "main",
    "aside", "article", "form", "h1", "h2", "h3", "h4", "h5", "h6",
];
const HIDDEN_TAGS: &[&str] = &["head", "script", "style", "template"];

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            listeners: Vec::new(),
            next_listener: 1,
            display_rules: Vec::new(),
            style_journal: Vec::new(),
        };
        doc.root = doc.alloc(NodeKind::Element(ElementData::new("html")));
        doc.body = doc.alloc(NodeKind::Element(ElementData::new("body")));
        doc.link(doc.root, doc.body, None);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create an element with `attrs` and append it to `parent`.
    ///
    /// A `class` attribute is split into individual classes.
    pub fn add_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<NodeId, DomError> {
        let node = self.create_element(tag)?;
        for (name, value) in attrs {
            self.set_attribute(&node, name, value)?;
        }
        self.append_child(&parent, &node)?;
        Ok(node)
    }

    pub fn add_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, DomError> {
        let node = self.alloc(NodeKind::Text(text.to_string()));
        self.append_child(&parent, &node)?;
        Ok(node)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Text(text) => Some(text.as_str()),
            NodeKind::Element(_) => None,
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Elements whose computed display falls back to `display` when they match
    /// `selector` and carry no inline `display`. Later rules win.
    pub fn add_display_rule(&mut self, selector: &str, display: &str) -> Result<(), DomError> {
        let selector = SelectorList::parse(selector)?;
        self.display_rules.push((selector, display.to_string()));
        Ok(())
    }

    /// Dispatch an event at `target` and return the listener invocations it
    /// produces, innermost first. The event bubbles through every ancestor.
    pub fn dispatch(&self, event_type: &str, target: NodeId) -> Vec<Delivery<NodeId>> {
        let mut deliveries = Vec::new();
        let mut cursor = Some(target);
        while let Some(current) = cursor {
            deliveries.extend(
                self.listeners
                    .iter()
                    .filter(|l| l.target == current && l.event_type == event_type)
                    .map(|l| Delivery {
                        listener: l.id,
                        event: DomEvent {
                            event_type: event_type.to_string(),
                            target,
                            current_target: current,
                        },
                    }),
            );
            cursor = self.nodes.get(current.0).and_then(|n| n.parent);
        }
        deliveries
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listeners_on(&self, node: NodeId, event_type: &str) -> usize {
        self.listeners
            .iter()
            .filter(|l| l.target == node && l.event_type == event_type)
            .count()
    }

    /// Drain the inline style journal.
    pub fn take_style_changes(&mut self) -> Vec<StyleChange> {
        std::mem::take(&mut self.style_journal)
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_html(*child, &mut out);
        }
        out
    }

    pub fn body_html(&self) -> String {
        self.inner_html(self.body)
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(current.0).and_then(|n| n.parent);
        }
        false
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut ElementData, DomError> {
        match self.nodes.get_mut(node.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(data)) => Ok(data),
            Some(NodeKind::Text(_)) => Err(DomError::Host(format!("{node:?} is not an element"))),
            None => Err(DomError::NotFound(format!("{node:?}"))),
        }
    }

    fn check_exists(&self, node: NodeId) -> Result<(), DomError> {
        if node.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(DomError::NotFound(format!("{node:?}")))
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent) else {
            return;
        };
        self.nodes[parent.0].children.retain(|c| *c != node);
        self.nodes[node.0].parent = None;
    }

    fn link(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        let children = &mut self.nodes[parent.0].children;
        match index {
            Some(i) => children.insert(i.min(children.len()), child),
            None => children.push(child),
        }
        self.nodes[child.0].parent = Some(parent);
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_exists(parent)?;
        self.check_exists(child)?;
        if self.element(parent).is_none() {
            return Err(DomError::Host(format!("{parent:?} cannot have children")));
        }
        if child == self.root || self.contains(child, parent) {
            return Err(DomError::Host(format!(
                "inserting {child:?} into {parent:?} would create a cycle"
            )));
        }
        Ok(())
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    fn record_style(
        &mut self,
        node: NodeId,
        property: &str,
        old: Option<String>,
        new: Option<String>,
    ) {
        if old == new {
            return;
        }
        let connected = self.is_connected(&node);
        self.style_journal.push(StyleChange {
            node,
            property: property.to_string(),
            old,
            new,
            connected,
        });
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(&escape(text, false)),
            NodeKind::Element(el) => {
                let _ = write!(out, "<{}", el.tag);
                if !el.classes.is_empty() {
                    let _ = write!(out, " class=\"{}\"", escape(&el.classes.join(" "), true));
                }
                for (name, value) in &el.attributes {
                    let _ = write!(out, " {}=\"{}\"", name, escape(value, true));
                }
                if !el.style.is_empty() {
                    let style = el
                        .style
                        .iter()
                        .map(|(p, v)| format!("{p}: {v};"))
                        .collect::<Vec<_>>()
                        .join(" ");
                    let _ = write!(out, " style=\"{}\"", escape(&style, true));
                }
                out.push('>');
                for child in &data.children {
                    self.write_html(*child, out);
                }
                let _ = write!(out, "</{}>", el.tag);
            }
        }
    }
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            classes: Vec::new(),
            style: Vec::new(),
        }
    }
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

impl ElementTree for MemoryDocument {
    type Id = NodeId;

    fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.tag(id)
    }

    fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        MemoryDocument::attribute(self, id, name)
    }

    fn has_class_name(&self, id: NodeId, class: &str) -> bool {
        self.element(id)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }
}

impl Dom for MemoryDocument {
    type Node = NodeId;

    fn body(&self) -> NodeId {
        self.body
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(DomError::Host(format!("invalid tag name `{tag}`")));
        }
        Ok(self.alloc(NodeKind::Element(ElementData::new(tag))))
    }

    fn is_element(&self, node: &NodeId) -> bool {
        self.element(*node).is_some()
    }

    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        let selector = SelectorList::parse(selector)?;
        let root = self.root;
        Ok(std::iter::once(root)
            .chain(self.descendants(root))
            .find(|n| selector.matches(self, *n)))
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let selector = SelectorList::parse(selector)?;
        let root = self.root;
        Ok(std::iter::once(root)
            .chain(self.descendants(root))
            .filter(|n| selector.matches(self, *n))
            .collect())
    }

    fn query_within(&self, root: &NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let selector = SelectorList::parse(selector)?;
        Ok(self
            .descendants(*root)
            .into_iter()
            .find(|n| selector.matches(self, *n)))
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn next_element_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|c| c == node)?;
        siblings[pos + 1..]
            .iter()
            .copied()
            .find(|c| self.is_element(c))
    }

    fn is_connected(&self, node: &NodeId) -> bool {
        self.contains(self.root, *node)
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        self.check_insertion(*parent, *child)?;
        self.detach(*child);
        self.link(*parent, *child, None);
        Ok(())
    }

    fn prepend_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        self.check_insertion(*parent, *child)?;
        self.detach(*child);
        self.link(*parent, *child, Some(0));
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: &NodeId,
        child: &NodeId,
        reference: Option<&NodeId>,
    ) -> Result<(), DomError> {
        let Some(reference) = reference else {
            return self.append_child(parent, child);
        };
        self.check_insertion(*parent, *child)?;
        if self.parent(reference) != Some(*parent) {
            return Err(DomError::NotAChild);
        }
        if reference == child {
            return Ok(());
        }
        self.detach(*child);
        let index = self
            .children(*parent)
            .iter()
            .position(|c| c == reference)
            .ok_or(DomError::NotAChild)?;
        self.link(*parent, *child, Some(index));
        Ok(())
    }

    fn remove(&mut self, node: &NodeId) {
        self.detach(*node);
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let el = self.element_mut(*node)?;
        if name == "class" {
            el.classes = value.split_whitespace().map(str::to_string).collect();
            return Ok(());
        }
        match el.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => el.attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn add_class(&mut self, node: &NodeId, class: &str) -> Result<(), DomError> {
        let el = self.element_mut(*node)?;
        if !el.classes.iter().any(|c| c == class) {
            el.classes.push(class.to_string());
        }
        Ok(())
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) -> Result<(), DomError> {
        self.element_mut(*node)?.classes.retain(|c| c != class);
        Ok(())
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.has_class_name(*node, class)
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) -> Result<(), DomError> {
        let el = self.element_mut(*node)?;
        let old = match el.style.iter_mut().find(|(p, _)| p == property) {
            Some((_, v)) => Some(std::mem::replace(v, value.to_string())),
            None => {
                el.style.push((property.to_string(), value.to_string()));
                None
            }
        };
        self.record_style(*node, property, old, Some(value.to_string()));
        Ok(())
    }

    fn style(&self, node: &NodeId, property: &str) -> Option<String> {
        self.element(*node)?
            .style
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.clone())
    }

    fn remove_style(&mut self, node: &NodeId, property: &str) -> Result<(), DomError> {
        let el = self.element_mut(*node)?;
        let Some(pos) = el.style.iter().position(|(p, _)| p == property) else {
            return Ok(());
        };
        let (_, old) = el.style.remove(pos);
        self.record_style(*node, property, Some(old), None);
        Ok(())
    }

    fn computed_display(&self, node: &NodeId) -> String {
        let Some(el) = self.element(*node) else {
            return String::new();
        };
        if let Some(display) = self.style(node, "display") {
            return display;
        }
        if let Some((_, display)) = self
            .display_rules
            .iter()
            .rev()
            .find(|(selector, _)| selector.matches(self, *node))
        {
            return display.clone();
        }
        let tag = el.tag.as_str();
        if el.attributes.iter().any(|(n, _)| n == "hidden") || HIDDEN_TAGS.iter().any(|t| *t == tag)
        {
            return "none".to_string();
        }
        if BLOCK_TAGS.iter().any(|t| *t == tag) {
            "block".to_string()
        } else {
            "inline".to_string()
        }
    }

    fn add_listener(&mut self, target: &NodeId, event_type: &str) -> ListenerId {
        let id = ListenerId::new(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(ListenerEntry {
            id,
            target: *target,
            event_type: event_type.to_string(),
        });
        id
    }

    fn remove_listener(&mut self, listener: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != listener);
        self.listeners.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (MemoryDocument, NodeId, NodeId, NodeId) {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let header = doc.add_element(body, "header", &[("id", "top")]).unwrap();
        let nav = doc
            .add_element(body, "nav", &[("class", "menu main"), ("id", "menu")])
            .unwrap();
        let main = doc.add_element(body, "main", &[]).unwrap();
        (doc, header, nav, main)
    }

    #[test]
    fn serializes_in_document_order() {
        let (mut doc, _, nav, _) = page();
        doc.add_text(nav, "a < b").unwrap();
        doc.set_style(&nav, "color", "red").unwrap();
        assert_eq!(
            doc.body_html(),
            "<header id=\"top\"></header><nav class=\"menu main\" id=\"menu\" \
             style=\"color: red;\">a &lt; b</nav><main></main>"
        );
    }

    #[test]
    fn queries_follow_document_order() {
        let (doc, header, nav, _) = page();
        assert_eq!(doc.query_selector("#menu").unwrap(), Some(nav));
        assert_eq!(doc.query_selector("body > nav").ok(), None);
        assert_eq!(
            doc.query_selector_all("header, .menu").unwrap(),
            vec![header, nav]
        );
        assert_eq!(doc.query_selector(".missing").unwrap(), None);
    }

    #[test]
    fn sibling_navigation_skips_text() {
        let (mut doc, header, nav, main) = page();
        let body = doc.body();
        let text = doc.add_text(body, "tail").unwrap();
        doc.insert_before(&body, &text, Some(&nav)).unwrap();
        assert_eq!(doc.next_element_sibling(&header), Some(nav));
        assert_eq!(doc.next_element_sibling(&nav), Some(main));
        assert_eq!(doc.next_element_sibling(&main), None);
    }

    #[test]
    fn insert_before_validates_reference() {
        let (mut doc, header, nav, main) = page();
        assert_eq!(
            doc.insert_before(&nav, &main, Some(&header)),
            Err(DomError::NotAChild)
        );
        let body = doc.body();
        doc.insert_before(&body, &main, Some(&header)).unwrap();
        assert_eq!(doc.children(body), &[main, header, nav]);
    }

    #[test]
    fn rejects_cycles() {
        let (mut doc, _, nav, _) = page();
        let inner = doc.add_element(nav, "ul", &[]).unwrap();
        assert!(doc.append_child(&inner, &nav).is_err());
        let root = doc.root();
        assert!(doc.append_child(&nav, &root).is_err());
    }

    #[test]
    fn removed_nodes_are_disconnected_but_reusable() {
        let (mut doc, header, nav, _) = page();
        let link = doc.add_element(nav, "a", &[]).unwrap();
        doc.remove(&nav);
        assert!(!doc.is_connected(&nav));
        assert!(!doc.is_connected(&link));
        assert_eq!(doc.query_selector("a").unwrap(), None);
        doc.prepend_child(&header, &nav).unwrap();
        assert!(doc.is_connected(&link));
    }

    #[test]
    fn computed_display_layers() {
        let (mut doc, header, nav, _) = page();
        let span = doc.add_element(header, "span", &[]).unwrap();
        let hidden = doc.add_element(header, "div", &[("hidden", "")]).unwrap();
        assert_eq!(doc.computed_display(&header), "block");
        assert_eq!(doc.computed_display(&span), "inline");
        assert_eq!(doc.computed_display(&hidden), "none");
        doc.add_display_rule(".menu", "none").unwrap();
        assert_eq!(doc.computed_display(&nav), "none");
        doc.set_style(&nav, "display", "flex").unwrap();
        assert_eq!(doc.computed_display(&nav), "flex");
    }

    #[test]
    fn dispatch_bubbles_to_ancestors() {
        let (mut doc, _, nav, _) = page();
        let link = doc.add_element(nav, "a", &[]).unwrap();
        let on_nav = doc.add_listener(&nav, "click");
        let on_link = doc.add_listener(&link, "click");
        let _other = doc.add_listener(&nav, "transitionend");
        let deliveries = doc.dispatch("click", link);
        let ids: Vec<_> = deliveries.iter().map(|d| d.listener).collect();
        assert_eq!(ids, vec![on_link, on_nav]);
        assert!(deliveries.iter().all(|d| d.event.target == link));
        assert_eq!(deliveries[1].event.current_target, nav);
        assert!(doc.remove_listener(on_nav));
        assert!(!doc.remove_listener(on_nav));
        assert_eq!(doc.listeners_on(nav, "click"), 0);
    }

    #[test]
    fn style_journal_records_connectivity() {
        let mut doc = MemoryDocument::new();
        let detached = doc.create_element("div").unwrap();
        doc.set_style(&detached, "opacity", "0").unwrap();
        let body = doc.body();
        doc.append_child(&body, &detached).unwrap();
        doc.set_style(&detached, "opacity", "0").unwrap();
        doc.set_style(&detached, "opacity", "1").unwrap();
        let changes = doc.take_style_changes();
        assert_eq!(changes.len(), 2);
        assert!(!changes[0].connected);
        assert!(changes[1].connected);
        assert_eq!(changes[1].old.as_deref(), Some("0"));
        assert!(doc.take_style_changes().is_empty());
    }
}
