//! The slide menu lifecycle.
//!
//! ```text
//!            show              advance (+15ms)
//!   Closed ────────▶ Opening ─────────────────▶ Open
//!     ▲                 │ hide                    │ hide
//!     │◀────────────────┘ (immediate teardown)    ▼
//!     └──────────────── transition end ──────── Closing
//!                       or fallback deadline
//! ```
//!
//! Time never comes from a clock in here. Every call that may schedule work
//! takes the host's current monotonic time, [`SlideMenu::next_deadline`]
//! reports when the host should call back, and [`SlideMenu::advance`] runs
//! whatever is due.

use std::fmt;
use std::time::Duration;

use crate::bindings::{BindingRegistry, Handler};
use crate::capabilities::Capabilities;
use crate::config::SlideMenuConfig;
use crate::constants::{CLICK_EVENT, SHOW_STYLE_DELAY};
use crate::dom::{Dom, DomEvent, ListenerId};
use crate::error::{Result, SlideMenuError};
use crate::relocation::MountPoint;
use crate::style::{base_styles, hidden_styles, shown_styles};
use crate::template::{PanelNodes, build_panel};

/// What a menu mounts: an existing node or a selector resolving to one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<N> {
    Node(N),
    Selector(String),
}

impl<N> From<&str> for Target<N> {
    fn from(selector: &str) -> Self {
        Target::Selector(selector.to_string())
    }
}

impl<N> From<String> for Target<N> {
    fn from(selector: String) -> Self {
        Target::Selector(selector)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Closed,
    Opening,
    Open,
    Closing,
}

impl fmt::Display for MenuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuState::Closed => "closed",
            MenuState::Opening => "opening",
            MenuState::Open => "open",
            MenuState::Closing => "closing",
        })
    }
}

/// Result of a `show`/`hide` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The request started an animated transition.
    Started,
    /// The request took full effect synchronously.
    Completed,
    /// The request does not apply in the current state.
    Ignored,
}

/// Result of delivering an event to a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The listener does not belong to this menu, or the event was filtered.
    Ignored,
    Handled { prevent_default: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Closed,
    Opening { apply_at: Duration },
    Open,
    Closing { deadline: Option<Duration> },
}

pub struct SlideMenu<D: Dom> {
    config: SlideMenuConfig,
    caps: Capabilities,
    element: D::Node,
    panel: PanelNodes<D::Node>,
    mount: MountPoint<D::Node>,
    togglers: Vec<D::Node>,
    bindings: BindingRegistry<D::Node>,
    phase: Phase,
    destroyed: bool,
}

impl<D: Dom> fmt::Debug for SlideMenu<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlideMenu")
            .field("element", &self.element)
            .field("phase", &self.phase)
            .field("togglers", &self.togglers.len())
            .field("bindings", &self.bindings.len())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl<D: Dom> SlideMenu<D> {
    /// Resolve the target, record where it lives, build the hidden panel and
    /// bind the toggler, backdrop and close listeners.
    pub fn new(
        dom: &mut D,
        target: impl Into<Target<D::Node>>,
        config: SlideMenuConfig,
        caps: Capabilities,
    ) -> Result<Self> {
        let element = match target.into() {
            Target::Node(node) => node,
            Target::Selector(selector) => dom
                .query_selector(&selector)
                .map_err(|err| SlideMenuError::InvalidTarget(err.to_string()))?
                .ok_or_else(|| {
                    SlideMenuError::InvalidTarget(format!("no element matches `{selector}`"))
                })?,
        };
        let mount = MountPoint::record(dom, &element).ok_or_else(|| {
            SlideMenuError::InvalidTarget("target is not attached to a parent".to_string())
        })?;

        let panel = build_panel(dom, config.prefix())?;
        let base = base_styles(&config, &caps);
        base.wrap.apply_to(dom, &panel.wrap)?;
        base.backdrop.apply_to(dom, &panel.backdrop)?;
        base.container.apply_to(dom, &panel.container)?;

        let togglers = dom.query_selector_all(config.toggler())?;
        let mut bindings = BindingRegistry::new();
        for toggler in &togglers {
            bindings.bind(dom, toggler, CLICK_EVENT, Handler::Toggle);
        }
        bindings.bind(dom, &panel.backdrop, CLICK_EVENT, Handler::Close);
        bindings.bind(dom, &panel.close, CLICK_EVENT, Handler::Close);

        tracing::debug!(
            element = ?element,
            side = %config.side(),
            togglers = togglers.len(),
            "slide menu created"
        );

        Ok(Self {
            config,
            caps,
            element,
            panel,
            mount,
            togglers,
            bindings,
            phase: Phase::Closed,
            destroyed: false,
        })
    }

    pub fn state(&self) -> MenuState {
        match self.phase {
            Phase::Closed => MenuState::Closed,
            Phase::Opening { .. } => MenuState::Opening,
            Phase::Open => MenuState::Open,
            Phase::Closing { .. } => MenuState::Closing,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn config(&self) -> &SlideMenuConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    pub fn element(&self) -> &D::Node {
        &self.element
    }

    pub fn panel(&self) -> &PanelNodes<D::Node> {
        &self.panel
    }

    pub fn mount_point(&self) -> &MountPoint<D::Node> {
        &self.mount
    }

    pub fn togglers(&self) -> &[D::Node] {
        &self.togglers
    }

    pub fn bindings(&self) -> &BindingRegistry<D::Node> {
        &self.bindings
    }

    /// When the host should next call [`advance`](Self::advance), if ever.
    pub fn next_deadline(&self) -> Option<Duration> {
        match self.phase {
            Phase::Opening { apply_at } => Some(apply_at),
            Phase::Closing { deadline } => deadline,
            Phase::Closed | Phase::Open => None,
        }
    }

    /// Mount the element and start sliding the panel in.
    ///
    /// While a hide is still waiting for its transition to end, that hide is
    /// completed first.
    pub fn show(&mut self, dom: &mut D, now: Duration) -> Result<Transition> {
        if self.destroyed {
            return Err(SlideMenuError::Destroyed);
        }
        match self.phase {
            Phase::Opening { .. } | Phase::Open => {
                tracing::debug!(state = %self.state(), "show ignored");
                return Ok(Transition::Ignored);
            }
            Phase::Closing { .. } => self.finish_hide(dom)?,
            Phase::Closed => {}
        }

        self.mount
            .detach_into(dom, &self.element, &self.panel.content)?;
        let body = dom.body();
        dom.prepend_child(&body, &self.panel.wrap)?;
        dom.add_class(&body, &self.config.open_class())?;

        let apply_at = now + SHOW_STYLE_DELAY;
        self.phase = Phase::Opening { apply_at };
        tracing::debug!(?apply_at, "slide menu opening");
        Ok(Transition::Started)
    }

    /// Start sliding the panel out.
    ///
    /// A menu whose shown styles were not applied yet has nothing to animate,
    /// so it is torn down on the spot.
    pub fn hide(&mut self, dom: &mut D, now: Duration) -> Result<Transition> {
        match self.phase {
            Phase::Closed | Phase::Closing { .. } => {
                tracing::debug!(state = %self.state(), "hide ignored");
                Ok(Transition::Ignored)
            }
            Phase::Opening { .. } => {
                let body = dom.body();
                dom.remove_class(&body, &self.config.open_class())?;
                self.finish_hide(dom)?;
                Ok(Transition::Completed)
            }
            Phase::Open => {
                let hidden = hidden_styles(&self.config, &self.caps);
                hidden.backdrop.apply_to(dom, &self.panel.backdrop)?;
                hidden.container.apply_to(dom, &self.panel.container)?;
                let body = dom.body();
                dom.remove_class(&body, &self.config.open_class())?;

                self.bindings.bind(
                    dom,
                    &self.panel.container,
                    &self.caps.transition_end_event,
                    Handler::TransitionEnd,
                );
                let deadline = self.config.completion_timeout().map(|t| now + t);
                self.phase = Phase::Closing { deadline };
                tracing::debug!(?deadline, "slide menu closing");
                Ok(Transition::Started)
            }
        }
    }

    /// Run deferred work that is due at `now`. Returns whether anything ran.
    pub fn advance(&mut self, dom: &mut D, now: Duration) -> Result<bool> {
        match self.phase {
            Phase::Opening { apply_at } if now >= apply_at => {
                let shown = shown_styles(&self.config, &self.caps);
                shown.backdrop.apply_to(dom, &self.panel.backdrop)?;
                shown.container.apply_to(dom, &self.panel.container)?;
                self.phase = Phase::Open;
                tracing::debug!("slide menu open");
                Ok(true)
            }
            Phase::Closing {
                deadline: Some(deadline),
            } if now >= deadline => {
                tracing::warn!(
                    ?deadline,
                    "no transition end for the container, completing hide"
                );
                self.finish_hide(dom)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Route one listener invocation to this menu.
    pub fn handle_event(
        &mut self,
        dom: &mut D,
        listener: ListenerId,
        event: &DomEvent<D::Node>,
        now: Duration,
    ) -> Result<EventOutcome> {
        let Some(handler) = self.bindings.handler_for(listener) else {
            return Ok(EventOutcome::Ignored);
        };
        match handler {
            Handler::Toggle => {
                self.show(dom, now)?;
                Ok(EventOutcome::Handled {
                    prevent_default: true,
                })
            }
            Handler::Close => {
                self.hide(dom, now)?;
                Ok(EventOutcome::Handled {
                    prevent_default: false,
                })
            }
            Handler::TransitionEnd => {
                if event.target != self.panel.container {
                    tracing::trace!(node = ?event.target, "bubbled transition end ignored");
                    return Ok(EventOutcome::Ignored);
                }
                if matches!(self.phase, Phase::Closing { .. }) {
                    self.finish_hide(dom)?;
                }
                Ok(EventOutcome::Handled {
                    prevent_default: false,
                })
            }
        }
    }

    /// Force a hide and remove every toggler, backdrop and close listener.
    ///
    /// A hide that is still animating keeps its transition-end listener until
    /// it completes. Calling this again does nothing.
    pub fn destroy(&mut self, dom: &mut D, now: Duration) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        self.destroyed = true;
        let hidden = self.hide(dom, now);
        let released = self
            .bindings
            .release(dom, |handler| handler != Handler::TransitionEnd);
        tracing::debug!(released, "slide menu destroyed");
        hidden.map(|_| ())
    }

    /// Detach the panel and put the element back where it came from.
    fn finish_hide(&mut self, dom: &mut D) -> Result<()> {
        dom.remove(&self.panel.wrap);
        self.bindings
            .release(dom, |handler| handler == Handler::TransitionEnd);
        self.phase = Phase::Closed;
        self.mount
            .restore(dom, &self.element)
            .inspect_err(|err| tracing::error!(%err, "could not restore slide menu target"))?;
        tracing::debug!("slide menu closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, NodeId};
    use pretty_assertions::assert_eq;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    struct Page {
        doc: MemoryDocument,
        nav: NodeId,
        after: NodeId,
        toggler: NodeId,
    }

    fn page() -> Page {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let toggler = doc
            .add_element(body, "a", &[("class", "rs-slide-menu-toggler"), ("href", "#")])
            .unwrap();
        let wrapper = doc.add_element(body, "div", &[("id", "page")]).unwrap();
        let nav = doc.add_element(wrapper, "nav", &[("id", "menu")]).unwrap();
        let after = doc.add_element(wrapper, "p", &[]).unwrap();
        Page {
            doc,
            nav,
            after,
            toggler,
        }
    }

    fn menu(page: &mut Page, config: SlideMenuConfig) -> SlideMenu<MemoryDocument> {
        SlideMenu::new(&mut page.doc, "#menu", config, Capabilities::standard()).unwrap()
    }

    fn end_transition(page: &mut Page, menu: &mut SlideMenu<MemoryDocument>, now: Duration) {
        let container = menu.panel().container;
        for delivery in page.doc.dispatch("transitionend", container) {
            menu.handle_event(&mut page.doc, delivery.listener, &delivery.event, now)
                .unwrap();
        }
    }

    #[test]
    fn construction_resolves_targets() {
        let mut page = page();
        let by_node = SlideMenu::new(
            &mut page.doc,
            Target::Node(page.nav),
            SlideMenuConfig::default(),
            Capabilities::standard(),
        )
        .unwrap();
        assert_eq!(by_node.element(), &page.nav);
        assert_eq!(by_node.togglers(), &[page.toggler]);
        assert_eq!(by_node.mount_point().next_sibling(), Some(&page.after));
        assert!(!page.doc.is_connected(&by_node.panel().wrap));

        for bad in ["#missing", "nav >", "a..b"] {
            let err = SlideMenu::new(
                &mut page.doc,
                bad,
                SlideMenuConfig::default(),
                Capabilities::standard(),
            )
            .unwrap_err();
            assert!(matches!(err, SlideMenuError::InvalidTarget(_)), "{bad}: {err}");
        }
        let detached = page.doc.create_element("nav").unwrap();
        let err = SlideMenu::new(
            &mut page.doc,
            Target::Node(detached),
            SlideMenuConfig::default(),
            Capabilities::standard(),
        )
        .unwrap_err();
        assert!(matches!(err, SlideMenuError::InvalidTarget(_)));
    }

    #[test]
    fn show_applies_shown_styles_after_delay() {
        let mut page = page();
        let mut menu = menu(&mut page, SlideMenuConfig::default().with_bg_opacity(0.8));
        assert_eq!(menu.show(&mut page.doc, ms(0)).unwrap(), Transition::Started);
        let panel = menu.panel().clone();
        let body = page.doc.body();

        assert_eq!(menu.state(), MenuState::Opening);
        assert_eq!(page.doc.children(body).first(), Some(&panel.wrap));
        assert!(page.doc.has_class(&body, "rs-slide-menu-open"));
        assert_eq!(page.doc.parent(&page.nav), Some(panel.content));
        assert_eq!(page.doc.style(&panel.backdrop, "opacity").as_deref(), Some("0"));
        assert_eq!(menu.next_deadline(), Some(ms(15)));

        assert!(!menu.advance(&mut page.doc, ms(14)).unwrap());
        assert!(menu.advance(&mut page.doc, ms(15)).unwrap());
        assert_eq!(menu.state(), MenuState::Open);
        assert_eq!(page.doc.style(&panel.backdrop, "opacity").as_deref(), Some("0.8"));
        assert_eq!(
            page.doc.style(&panel.container, "transform").as_deref(),
            Some("translate3d(0, 0, 0)")
        );
        assert_eq!(menu.next_deadline(), None);
    }

    #[test]
    fn hide_completes_on_container_transition_end() {
        let mut page = page();
        let before = page.doc.body_html();
        let mut menu = menu(&mut page, SlideMenuConfig::default());
        menu.show(&mut page.doc, ms(0)).unwrap();
        menu.advance(&mut page.doc, ms(15)).unwrap();

        assert_eq!(menu.hide(&mut page.doc, ms(100)).unwrap(), Transition::Started);
        let panel = menu.panel().clone();
        let body = page.doc.body();
        assert_eq!(menu.state(), MenuState::Closing);
        assert!(!page.doc.has_class(&body, "rs-slide-menu-open"));
        assert_eq!(
            page.doc.style(&panel.container, "transform").as_deref(),
            Some("translate3d(100%, 0, 0)")
        );
        assert_eq!(page.doc.listeners_on(panel.container, "transitionend"), 1);
        assert_eq!(menu.next_deadline(), Some(ms(500)));

        end_transition(&mut page, &mut menu, ms(400));
        assert_eq!(menu.state(), MenuState::Closed);
        assert!(!page.doc.is_connected(&panel.wrap));
        assert_eq!(page.doc.next_element_sibling(&page.nav), Some(page.after));
        assert_eq!(page.doc.listeners_on(panel.container, "transitionend"), 0);
        assert_eq!(page.doc.body_html(), before);
    }

    #[test]
    fn bubbled_transition_end_is_filtered() {
        let mut page = page();
        let mut menu = menu(&mut page, SlideMenuConfig::default());
        menu.show(&mut page.doc, ms(0)).unwrap();
        menu.advance(&mut page.doc, ms(15)).unwrap();
        menu.hide(&mut page.doc, ms(20)).unwrap();

        let inner = page.doc.add_element(page.nav, "span", &[]).unwrap();
        for delivery in page.doc.dispatch("transitionend", inner) {
            let outcome = menu
                .handle_event(&mut page.doc, delivery.listener, &delivery.event, ms(30))
                .unwrap();
            assert_eq!(outcome, EventOutcome::Ignored);
        }
        assert_eq!(menu.state(), MenuState::Closing);
    }

    #[test]
    fn reentrant_calls_follow_policy() {
        let mut page = page();
        let mut menu = menu(&mut page, SlideMenuConfig::default());
        assert_eq!(menu.hide(&mut page.doc, ms(0)).unwrap(), Transition::Ignored);
        menu.show(&mut page.doc, ms(0)).unwrap();
        assert_eq!(menu.show(&mut page.doc, ms(5)).unwrap(), Transition::Ignored);

        // hide before the shown styles land tears down at once
        assert_eq!(menu.hide(&mut page.doc, ms(5)).unwrap(), Transition::Completed);
        assert_eq!(menu.state(), MenuState::Closed);
        assert!(!menu.advance(&mut page.doc, ms(100)).unwrap());
        assert_eq!(
            page.doc.style(&menu.panel().backdrop, "opacity").as_deref(),
            Some("0")
        );

        menu.show(&mut page.doc, ms(200)).unwrap();
        menu.advance(&mut page.doc, ms(215)).unwrap();
        menu.hide(&mut page.doc, ms(300)).unwrap();
        assert_eq!(menu.hide(&mut page.doc, ms(301)).unwrap(), Transition::Ignored);
        // show while closing finishes the old hide first
        assert_eq!(menu.show(&mut page.doc, ms(310)).unwrap(), Transition::Started);
        assert_eq!(menu.state(), MenuState::Opening);
        assert_eq!(page.doc.listeners_on(menu.panel().container, "transitionend"), 0);
    }

    #[test]
    fn fallback_deadline_completes_hide() {
        let mut page = page();
        let mut menu = menu(&mut page, SlideMenuConfig::default());
        menu.show(&mut page.doc, ms(0)).unwrap();
        menu.advance(&mut page.doc, ms(15)).unwrap();
        menu.hide(&mut page.doc, ms(100)).unwrap();
        assert!(!menu.advance(&mut page.doc, ms(499)).unwrap());
        assert!(menu.advance(&mut page.doc, ms(500)).unwrap());
        assert_eq!(menu.state(), MenuState::Closed);
        assert_eq!(page.doc.next_element_sibling(&page.nav), Some(page.after));
    }

    #[test]
    fn disabled_grace_waits_for_signal() {
        let mut page = page();
        let config = SlideMenuConfig::default().with_completion_grace(None);
        let mut menu = menu(&mut page, config);
        menu.show(&mut page.doc, ms(0)).unwrap();
        menu.advance(&mut page.doc, ms(15)).unwrap();
        menu.hide(&mut page.doc, ms(100)).unwrap();
        assert_eq!(menu.next_deadline(), None);
        assert!(!menu.advance(&mut page.doc, ms(60_000)).unwrap());
        assert_eq!(menu.state(), MenuState::Closing);
        end_transition(&mut page, &mut menu, ms(60_001));
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn toggler_click_shows_and_prevents_default() {
        let mut page = page();
        let mut menu = menu(&mut page, SlideMenuConfig::default());
        let deliveries = page.doc.dispatch("click", page.toggler);
        assert_eq!(deliveries.len(), 1);
        let outcome = menu
            .handle_event(&mut page.doc, deliveries[0].listener, &deliveries[0].event, ms(0))
            .unwrap();
        assert_eq!(
            outcome,
            EventOutcome::Handled {
                prevent_default: true
            }
        );
        assert_eq!(menu.state(), MenuState::Opening);

        let foreign = ListenerId::new(9_999);
        let outcome = menu
            .handle_event(&mut page.doc, foreign, &deliveries[0].event, ms(1))
            .unwrap();
        assert_eq!(outcome, EventOutcome::Ignored);
    }

    #[test]
    fn backdrop_and_close_clicks_hide() {
        let mut page = page();
        let mut menu = menu(&mut page, SlideMenuConfig::default());
        for node in [menu.panel().backdrop, menu.panel().close] {
            menu.show(&mut page.doc, ms(0)).unwrap();
            menu.advance(&mut page.doc, ms(15)).unwrap();
            let deliveries = page.doc.dispatch("click", node);
            assert_eq!(deliveries.len(), 1);
            menu.handle_event(&mut page.doc, deliveries[0].listener, &deliveries[0].event, ms(20))
                .unwrap();
            assert_eq!(menu.state(), MenuState::Closing);
            end_transition(&mut page, &mut menu, ms(320));
            assert_eq!(menu.state(), MenuState::Closed);
        }
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut page = page();
        let baseline = page.doc.listener_count();
        let mut menu = menu(&mut page, SlideMenuConfig::default());
        assert_eq!(page.doc.listener_count(), baseline + 3);
        menu.show(&mut page.doc, ms(0)).unwrap();
        menu.advance(&mut page.doc, ms(15)).unwrap();

        menu.destroy(&mut page.doc, ms(20)).unwrap();
        assert!(menu.is_destroyed());
        assert_eq!(menu.state(), MenuState::Closing);
        // only the pending transition-end listener is left
        assert_eq!(page.doc.listener_count(), baseline + 1);
        menu.destroy(&mut page.doc, ms(21)).unwrap();
        assert_eq!(page.doc.listener_count(), baseline + 1);

        end_transition(&mut page, &mut menu, ms(320));
        assert_eq!(page.doc.listener_count(), baseline);
        assert!(matches!(
            menu.show(&mut page.doc, ms(400)),
            Err(SlideMenuError::Destroyed)
        ));
    }

    #[test]
    fn relocation_failure_leaves_menu_closed() {
        let mut page = page();
        let mut menu = menu(&mut page, SlideMenuConfig::default());
        menu.show(&mut page.doc, ms(0)).unwrap();
        menu.advance(&mut page.doc, ms(15)).unwrap();
        menu.hide(&mut page.doc, ms(20)).unwrap();
        page.doc.remove(&page.after);

        let err = menu.advance(&mut page.doc, ms(1_000)).unwrap_err();
        assert!(matches!(err, SlideMenuError::Relocation(_)));
        assert_eq!(menu.state(), MenuState::Closed);
        assert_eq!(page.doc.parent(&page.nav), Some(menu.panel().content));
        assert!(!page.doc.is_connected(&menu.panel().wrap));
    }
}
