//! CSS transition emulation for [`MemoryDocument`].
//!
//! A browser starts a transition when an attached element's property changes
//! and its `transition` declaration covers that property with a non-zero
//! duration. When the transition finishes, a transition-end event is fired at
//! the element and bubbles. Detaching an element cancels its transitions
//! without firing anything. This module reproduces exactly that much, with one
//! simplification: a property gaining or losing its inline value never
//! transitions.

use std::time::Duration;

use super::memory::{MemoryDocument, NodeId};
use super::{Delivery, Dom};
use crate::capabilities::Capabilities;

const EASING_KEYWORDS: &[&str] = &[
    "ease",
    "linear",
    "ease-in",
    "ease-out",
    "ease-in-out",
    "step-start",
    "step-end",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTransition {
    pub node: NodeId,
    pub property: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub started: Duration,
    pub duration: Duration,
}

impl ActiveTransition {
    pub fn ends_at(&self) -> Duration {
        self.started + self.duration
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct TransitionSimulator {
    event_type: String,
    transition_properties: Vec<String>,
    active: Vec<ActiveTransition>,
}

impl TransitionSimulator {
    pub fn new(caps: &Capabilities) -> Self {
        let mut transition_properties = vec!["transition".to_string()];
        if caps.transition_property != "transition" {
            transition_properties.push(caps.transition_property.clone());
        }
        Self {
            event_type: caps.transition_end_event.clone(),
            transition_properties,
            active: Vec::new(),
        }
    }

    /// Consume the document's style journal and start or cancel transitions.
    pub fn observe(&mut self, doc: &mut MemoryDocument, now: Duration) {
        for change in doc.take_style_changes() {
            self.active
                .retain(|t| !(t.node == change.node && t.property == change.property));
            if !change.connected
                || change.old.is_none()
                || change.new.is_none()
                || self.transition_properties.contains(&change.property)
            {
                continue;
            }
            let Some(duration) = self.duration_for(doc, change.node, &change.property) else {
                continue;
            };
            if duration.is_zero() {
                continue;
            }
            tracing::trace!(
                node = change.node.index(),
                property = %change.property,
                ?duration,
                "transition started"
            );
            self.active.push(ActiveTransition {
                node: change.node,
                property: change.property,
                from: change.old,
                to: change.new,
                started: now,
                duration,
            });
        }
    }

    /// Finish due transitions and return the transition-end deliveries they
    /// produce. Transitions on detached nodes are dropped silently.
    pub fn poll(&mut self, doc: &MemoryDocument, now: Duration) -> Vec<Delivery<NodeId>> {
        let mut deliveries = Vec::new();
        let mut remaining = Vec::with_capacity(self.active.len());
        for transition in self.active.drain(..) {
            if !doc.is_connected(&transition.node) {
                continue;
            }
            if transition.ends_at() <= now {
                deliveries.extend(doc.dispatch(&self.event_type, transition.node));
            } else {
                remaining.push(transition);
            }
        }
        self.active = remaining;
        deliveries
    }

    pub fn active(&self) -> &[ActiveTransition] {
        &self.active
    }

    pub fn active_for(&self, node: NodeId, property: &str) -> Option<&ActiveTransition> {
        self.active
            .iter()
            .find(|t| t.node == node && t.property == property)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.active.iter().map(ActiveTransition::ends_at).min()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    fn duration_for(&self, doc: &MemoryDocument, node: NodeId, property: &str) -> Option<Duration> {
        let declaration = self
            .transition_properties
            .iter()
            .find_map(|p| doc.style(&node, p))?;
        declaration.split(',').find_map(|part| {
            let (covered, duration) = parse_transition(part)?;
            (covered == property || covered == "all").then_some(duration)
        })
    }
}

/// Parse one `<duration> <property> <easing>` entry, in any token order.
fn parse_transition(part: &str) -> Option<(String, Duration)> {
    let mut duration = None;
    let mut property = None;
    for token in part.split_whitespace() {
        if let Some(time) = parse_time(token) {
            duration.get_or_insert(time);
        } else if !EASING_KEYWORDS.iter().any(|k| *k == token) && !token.contains('(') {
            property.get_or_insert_with(|| token.to_string());
        }
    }
    Some((property.unwrap_or_else(|| "all".to_string()), duration?))
}

fn parse_time(token: &str) -> Option<Duration> {
    let (number, scale) = match token.strip_suffix("ms") {
        Some(ms) => (ms, 1_000_000.0),
        None => (token.strip_suffix('s')?, 1_000_000_000.0),
    };
    let value: f64 = number.parse().ok()?;
    (value >= 0.0).then(|| Duration::from_nanos((value * scale).round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn transitioning_box(doc: &mut MemoryDocument) -> NodeId {
        let body = doc.body();
        let el = doc.add_element(body, "div", &[]).unwrap();
        doc.set_style(&el, "transition", "200ms transform ease").unwrap();
        doc.set_style(&el, "transform", "translateX(100%)").unwrap();
        el
    }

    #[test]
    fn parses_transition_entries() {
        assert_eq!(
            parse_transition("300ms transform ease"),
            Some(("transform".to_string(), ms(300)))
        );
        assert_eq!(
            parse_transition("opacity 0.5s cubic-bezier(0,0,1,1)"),
            Some(("opacity".to_string(), ms(500)))
        );
        assert_eq!(parse_transition("1s"), Some(("all".to_string(), ms(1000))));
        assert_eq!(parse_transition("transform ease"), None);
    }

    #[test]
    fn covered_change_fires_after_duration() {
        let mut doc = MemoryDocument::new();
        let el = transitioning_box(&mut doc);
        let listener = doc.add_listener(&el, "transitionend");
        let mut sim = TransitionSimulator::new(&Capabilities::standard());
        sim.observe(&mut doc, ms(0));
        // initial values never transition
        assert!(sim.is_idle());

        doc.set_style(&el, "transform", "translateX(0)").unwrap();
        sim.observe(&mut doc, ms(10));
        assert_eq!(sim.next_deadline(), Some(ms(210)));
        let active = sim.active_for(el, "transform").unwrap();
        assert_eq!(active.from.as_deref(), Some("translateX(100%)"));
        assert!((active.progress(ms(110)) - 0.5).abs() < 1e-4);

        assert!(sim.poll(&doc, ms(209)).is_empty());
        let fired = sim.poll(&doc, ms(210));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].listener, listener);
        assert!(sim.is_idle());
    }

    #[test]
    fn uncovered_or_detached_changes_do_not_fire() {
        let mut doc = MemoryDocument::new();
        let el = transitioning_box(&mut doc);
        doc.add_listener(&el, "transitionend");
        let mut sim = TransitionSimulator::new(&Capabilities::standard());
        sim.observe(&mut doc, ms(0));

        doc.set_style(&el, "opacity", "1").unwrap();
        doc.set_style(&el, "opacity", "0.5").unwrap();
        sim.observe(&mut doc, ms(0));
        assert!(sim.is_idle());

        doc.set_style(&el, "transform", "translateX(0)").unwrap();
        sim.observe(&mut doc, ms(0));
        doc.remove(&el);
        assert!(sim.poll(&doc, ms(1000)).is_empty());
        assert!(sim.is_idle());
    }

    #[test]
    fn zero_duration_never_starts() {
        let mut doc = MemoryDocument::new();
        let el = transitioning_box(&mut doc);
        doc.set_style(&el, "transition", "0ms transform ease").unwrap();
        let mut sim = TransitionSimulator::new(&Capabilities::standard());
        sim.observe(&mut doc, ms(0));
        doc.set_style(&el, "transform", "translateX(0)").unwrap();
        sim.observe(&mut doc, ms(0));
        assert!(sim.is_idle());
    }
}
