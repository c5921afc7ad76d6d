//! Browser backend over `web-sys`.
//!
//! [`WebDom`] implements [`Dom`] for `web_sys::Element` handles and installs
//! listeners through `gloo`. Listener callbacks are forwarded to a router,
//! which [`WebSlideMenu`] points at its menu; deadlines reported by the menu
//! are turned into `gloo` timeouts.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Node, Window};

use super::{Dom, DomEvent, ListenerId};
use crate::capabilities::Capabilities;
use crate::config::SlideMenuConfig;
use crate::error::{DomError, Result};
use crate::menu::{EventOutcome, MenuState, SlideMenu, Target, Transition};

type Route = Rc<dyn Fn(ListenerId, DomEvent<Element>) -> bool>;

/// Probe the browser once for transform support and property naming.
pub fn detect_capabilities() -> Capabilities {
    let supports = |property: &str, value: &str| {
        web_sys::css::supports_with_value(property, value).unwrap_or(false)
    };
    if supports("transform", "translateX(0)") {
        Capabilities::standard().with_transform3d(supports("transform", "translate3d(0, 0, 0)"))
    } else if supports("-webkit-transform", "translateX(0)") {
        Capabilities::legacy_webkit()
            .with_transform3d(supports("-webkit-transform", "translate3d(0, 0, 0)"))
    } else {
        Capabilities::flat()
    }
}

fn host(err: wasm_bindgen::JsValue) -> DomError {
    DomError::Host(format!("{err:?}"))
}

pub struct WebDom {
    window: Window,
    document: Document,
    body: Element,
    listeners: HashMap<ListenerId, EventListener>,
    next_listener: u64,
    router: Rc<RefCell<Option<Route>>>,
}

impl WebDom {
    pub fn new() -> Result<Self, DomError> {
        let window = web_sys::window().ok_or_else(|| DomError::Host("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| DomError::Host("no document".into()))?;
        let body = document
            .body()
            .map(Element::from)
            .ok_or_else(|| DomError::Host("document has no body".into()))?;
        Ok(Self {
            window,
            document,
            body,
            listeners: HashMap::new(),
            next_listener: 1,
            router: Rc::new(RefCell::new(None)),
        })
    }

    /// Where listener invocations go. The return value requests
    /// `preventDefault`.
    pub fn set_router(&self, route: impl Fn(ListenerId, DomEvent<Element>) -> bool + 'static) {
        *self.router.borrow_mut() = Some(Rc::new(route));
    }

    /// Page time, monotonic when the Performance API is available.
    pub fn now(&self) -> Duration {
        let millis = self
            .window
            .performance()
            .map_or_else(js_sys::Date::now, |p| p.now());
        Duration::from_secs_f64(millis.max(0.0) / 1000.0)
    }

    fn html(node: &Element) -> Result<&HtmlElement, DomError> {
        node.dyn_ref::<HtmlElement>()
            .ok_or_else(|| DomError::Host("element has no inline style".into()))
    }
}

impl Dom for WebDom {
    type Node = Element;

    fn body(&self) -> Element {
        self.body.clone()
    }

    fn create_element(&mut self, tag: &str) -> Result<Element, DomError> {
        self.document.create_element(tag).map_err(host)
    }

    fn is_element(&self, _node: &Element) -> bool {
        true
    }

    fn query_selector(&self, selector: &str) -> Result<Option<Element>, DomError> {
        self.document
            .query_selector(selector)
            .map_err(|_| DomError::InvalidSelector(selector.to_string()))
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>, DomError> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|_| DomError::InvalidSelector(selector.to_string()))?;
        Ok((0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    fn query_within(
        &self,
        root: &Element,
        selector: &str,
    ) -> Result<Option<Element>, DomError> {
        root.query_selector(selector)
            .map_err(|_| DomError::InvalidSelector(selector.to_string()))
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn next_element_sibling(&self, node: &Element) -> Option<Element> {
        node.next_element_sibling()
    }

    fn is_connected(&self, node: &Element) -> bool {
        node.is_connected()
    }

    fn append_child(&mut self, parent: &Element, child: &Element) -> Result<(), DomError> {
        parent.append_child(child).map(|_| ()).map_err(host)
    }

    fn prepend_child(
        &mut self,
        parent: &Element,
        child: &Element,
    ) -> Result<(), DomError> {
        parent.prepend_with_node_1(child).map_err(host)
    }

    fn insert_before(
        &mut self,
        parent: &Element,
        child: &Element,
        reference: Option<&Element>,
    ) -> Result<(), DomError> {
        if let Some(reference) = reference
            && reference.parent_element().as_ref() != Some(parent)
        {
            return Err(DomError::NotAChild);
        }
        let reference: Option<&Node> = reference.map(|r| &**r);
        parent.insert_before(child, reference).map(|_| ()).map_err(host)
    }

    fn remove(&mut self, node: &Element) {
        node.remove();
    }

    fn set_attribute(
        &mut self,
        node: &Element,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        node.set_attribute(name, value).map_err(host)
    }

    fn add_class(&mut self, node: &Element, class: &str) -> Result<(), DomError> {
        node.class_list().add_1(class).map_err(host)
    }

    fn remove_class(&mut self, node: &Element, class: &str) -> Result<(), DomError> {
        node.class_list().remove_1(class).map_err(host)
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn set_style(
        &mut self,
        node: &Element,
        property: &str,
        value: &str,
    ) -> Result<(), DomError> {
        Self::html(node)?
            .style()
            .set_property(property, value)
            .map_err(host)
    }

    fn style(&self, node: &Element, property: &str) -> Option<String> {
        let value = Self::html(node)
            .ok()?
            .style()
            .get_property_value(property)
            .ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn remove_style(&mut self, node: &Element, property: &str) -> Result<(), DomError> {
        Self::html(node)?
            .style()
            .remove_property(property)
            .map(|_| ())
            .map_err(host)
    }

    fn computed_display(&self, node: &Element) -> String {
        self.window
            .get_computed_style(node)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value("display").ok())
            .unwrap_or_default()
    }

    fn add_listener(&mut self, target: &Element, event_type: &str) -> ListenerId {
        let id = ListenerId::new(self.next_listener);
        self.next_listener += 1;
        let router = Rc::clone(&self.router);
        let listener = EventListener::new_with_options(
            target,
            event_type.to_string(),
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                // release the router before calling into the menu
                let Some(route) = router.borrow().clone() else {
                    return;
                };
                let element = |t: Option<web_sys::EventTarget>| t?.dyn_into::<Element>().ok();
                let (Some(target), Some(current_target)) =
                    (element(event.target()), element(event.current_target()))
                else {
                    return;
                };
                let dom_event = DomEvent {
                    event_type: event.type_(),
                    target,
                    current_target,
                };
                if route(id, dom_event) {
                    event.prevent_default();
                }
            },
        );
        self.listeners.insert(id, listener);
        id
    }

    fn remove_listener(&mut self, listener: ListenerId) -> bool {
        self.listeners.remove(&listener).is_some()
    }
}

struct Inner {
    dom: WebDom,
    menu: SlideMenu<WebDom>,
    timer: Option<Timeout>,
}

/// A slide menu wired to the live page: events are routed to it and its
/// deferred steps run on browser timers.
#[derive(Clone)]
pub struct WebSlideMenu {
    inner: Rc<RefCell<Inner>>,
}

impl WebSlideMenu {
    pub fn mount(target: impl Into<Target<Element>>, config: SlideMenuConfig) -> Result<Self> {
        let mut dom = WebDom::new()?;
        let menu = SlideMenu::new(&mut dom, target, config, detect_capabilities())?;
        let inner = Rc::new(RefCell::new(Inner {
            dom,
            menu,
            timer: None,
        }));
        let weak = Rc::downgrade(&inner);
        inner.borrow().dom.set_router(move |listener, event| {
            weak.upgrade()
                .is_some_and(|inner| route_event(&inner, listener, event))
        });
        Ok(Self { inner })
    }

    pub fn show(&self) -> Result<Transition> {
        self.with_menu(|menu, dom, now| menu.show(dom, now))
    }

    pub fn hide(&self) -> Result<Transition> {
        self.with_menu(|menu, dom, now| menu.hide(dom, now))
    }

    pub fn destroy(&self) -> Result<()> {
        self.with_menu(|menu, dom, now| menu.destroy(dom, now))
    }

    pub fn state(&self) -> MenuState {
        self.inner.borrow().menu.state()
    }

    fn with_menu<T>(
        &self,
        f: impl FnOnce(&mut SlideMenu<WebDom>, &mut WebDom, Duration) -> Result<T>,
    ) -> Result<T> {
        let result = {
            let mut guard = self.inner.borrow_mut();
            let Inner { dom, menu, .. } = &mut *guard;
            let now = dom.now();
            f(menu, dom, now)
        };
        schedule(&self.inner);
        result
    }
}

fn route_event(inner: &Rc<RefCell<Inner>>, listener: ListenerId, event: DomEvent<Element>) -> bool {
    let outcome = {
        let Ok(mut guard) = inner.try_borrow_mut() else {
            tracing::warn!(%listener, "event arrived while the menu was busy");
            return false;
        };
        let Inner { dom, menu, .. } = &mut *guard;
        let now = dom.now();
        menu.handle_event(dom, listener, &event, now)
    };
    schedule(inner);
    match outcome {
        Ok(EventOutcome::Handled { prevent_default }) => prevent_default,
        Ok(EventOutcome::Ignored) => false,
        Err(err) => {
            tracing::error!(%err, "slide menu event failed");
            false
        }
    }
}

/// Arm a timeout for the menu's next deadline, replacing any previous one.
fn schedule(inner: &Rc<RefCell<Inner>>) {
    let Ok(mut guard) = inner.try_borrow_mut() else {
        return;
    };
    let now = guard.dom.now();
    let weak: Weak<RefCell<Inner>> = Rc::downgrade(inner);
    guard.timer = guard.menu.next_deadline().map(|deadline| {
        let delay = u32::try_from(deadline.saturating_sub(now).as_millis()).unwrap_or(u32::MAX);
        Timeout::new(delay, move || {
            if let Some(inner) = weak.upgrade() {
                fire(&inner);
            }
        })
    });
}

fn fire(inner: &Rc<RefCell<Inner>>) {
    {
        let Ok(mut guard) = inner.try_borrow_mut() else {
            return;
        };
        let Inner { dom, menu, timer } = &mut *guard;
        timer.take();
        let now = dom.now();
        if let Err(err) = menu.advance(dom, now) {
            tracing::error!(%err, "slide menu deferred step failed");
        }
    }
    schedule(inner);
}
