use std::time::Duration;

use pretty_assertions::assert_eq;
use slide_menu::dom::{Dom, MemoryDocument, NodeId, TransitionSimulator};
use slide_menu::{
    Capabilities, MenuState, SlideMenu, SlideMenuConfig, SlideMenuError, Target, Transition,
};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Drive the menu and the simulated renderer until nothing is pending.
fn settle(
    doc: &mut MemoryDocument,
    sim: &mut TransitionSimulator,
    menu: &mut SlideMenu<MemoryDocument>,
    mut now: Duration,
) -> Duration {
    loop {
        sim.observe(doc, now);
        let next = [menu.next_deadline(), sim.next_deadline()]
            .into_iter()
            .flatten()
            .min();
        let Some(next) = next else {
            return now;
        };
        now = now.max(next);
        menu.advance(doc, now).unwrap();
        sim.observe(doc, now);
        for delivery in sim.poll(doc, now) {
            menu.handle_event(doc, delivery.listener, &delivery.event, now)
                .unwrap();
        }
    }
}

fn page_with_sibling() -> (MemoryDocument, NodeId, NodeId, NodeId) {
    let mut doc = MemoryDocument::new();
    let body = doc.body();
    let wrapper = doc.add_element(body, "section", &[]).unwrap();
    let target = doc
        .add_element(wrapper, "nav", &[("class", "site-nav")])
        .unwrap();
    let link = doc.add_element(target, "a", &[("href", "/")]).unwrap();
    doc.add_text(link, "Home").unwrap();
    let sibling = doc.add_element(wrapper, "p", &[]).unwrap();
    (doc, wrapper, target, sibling)
}

#[test]
fn round_trip_restores_document_for_many_configs() {
    let configs = [
        SlideMenuConfig::default(),
        SlideMenuConfig::default()
            .with_side("left")
            .with_width(300)
            .with_z_index(1000),
        SlideMenuConfig::default()
            .with_side("top")
            .with_width("80vw")
            .with_duration(ms(120)),
        SlideMenuConfig::default().with_prefix("nav-panel"),
    ];
    let capabilities = [
        Capabilities::standard(),
        Capabilities::flat(),
        Capabilities::legacy_webkit(),
    ];
    for config in configs {
        for caps in capabilities.clone() {
            let (mut doc, _, target, sibling) = page_with_sibling();
            let before = doc.body_html();
            let mut sim = TransitionSimulator::new(&caps);
            let mut menu =
                SlideMenu::new(&mut doc, ".site-nav", config.clone(), caps.clone()).unwrap();

            assert_eq!(menu.show(&mut doc, ms(0)).unwrap(), Transition::Started);
            let now = settle(&mut doc, &mut sim, &mut menu, ms(0));
            assert_eq!(menu.state(), MenuState::Open);

            assert_eq!(menu.hide(&mut doc, now).unwrap(), Transition::Started);
            settle(&mut doc, &mut sim, &mut menu, now);
            assert_eq!(menu.state(), MenuState::Closed);
            assert_eq!(doc.next_element_sibling(&target), Some(sibling));
            assert_eq!(doc.body_html(), before, "{config:?} / {caps:?}");
        }
    }
}

#[test]
fn hide_completes_by_signal_not_fallback() {
    let (mut doc, _, _, _) = page_with_sibling();
    let caps = Capabilities::legacy_webkit();
    let mut sim = TransitionSimulator::new(&caps);
    let mut menu = SlideMenu::new(&mut doc, "nav", SlideMenuConfig::default(), caps).unwrap();
    menu.show(&mut doc, ms(0)).unwrap();
    let now = settle(&mut doc, &mut sim, &mut menu, ms(0));
    menu.hide(&mut doc, now).unwrap();
    let container = menu.panel().container;
    assert_eq!(doc.listeners_on(container, "webkitTransitionEnd"), 1);
    let closed_at = settle(&mut doc, &mut sim, &mut menu, now);
    // 300ms transition; the fallback would land at 400ms
    assert_eq!(closed_at, now + ms(300));
    assert_eq!(menu.state(), MenuState::Closed);
}

#[test]
fn shown_state_carries_opacity_transform_and_body_class() {
    let (mut doc, _, _, _) = page_with_sibling();
    let config = SlideMenuConfig::default()
        .with_bg_opacity(0.65)
        .with_prefix("drawer");
    let mut menu =
        SlideMenu::new(&mut doc, "nav", config, Capabilities::flat()).unwrap();
    menu.show(&mut doc, ms(100)).unwrap();
    menu.advance(&mut doc, ms(115)).unwrap();

    let panel = menu.panel();
    let body = doc.body();
    assert!(doc.has_class(&body, "drawer-open"));
    assert_eq!(doc.style(&panel.backdrop, "opacity").as_deref(), Some("0.65"));
    assert_eq!(
        doc.style(&panel.container, "transform").as_deref(),
        Some("translateX(0)")
    );
    assert_eq!(doc.query_selector(".drawer-close").unwrap(), Some(panel.close));
}

#[test]
fn last_child_target_is_appended_back() {
    let mut doc = MemoryDocument::new();
    let body = doc.body();
    let list = doc.add_element(body, "ul", &[]).unwrap();
    doc.add_element(list, "li", &[]).unwrap();
    let last = doc.add_element(list, "li", &[("id", "last")]).unwrap();
    let mut menu = SlideMenu::new(
        &mut doc,
        Target::Node(last),
        SlideMenuConfig::default(),
        Capabilities::standard(),
    )
    .unwrap();
    assert!(menu.mount_point().next_sibling().is_none());

    menu.show(&mut doc, ms(0)).unwrap();
    menu.advance(&mut doc, ms(15)).unwrap();
    // the list changes while the menu is open
    let added = doc.add_element(list, "li", &[]).unwrap();
    menu.hide(&mut doc, ms(20)).unwrap();
    menu.advance(&mut doc, ms(1_000)).unwrap();
    assert_eq!(doc.children(list).last(), Some(&last));
    assert_eq!(doc.next_element_sibling(&added), Some(last));
}

#[test]
fn hidden_target_is_forced_visible_then_restored() {
    let (mut doc, _, target, _) = page_with_sibling();
    doc.add_display_rule(".site-nav", "none").unwrap();
    let mut menu = SlideMenu::new(
        &mut doc,
        ".site-nav",
        SlideMenuConfig::default(),
        Capabilities::standard(),
    )
    .unwrap();
    menu.show(&mut doc, ms(0)).unwrap();
    assert_eq!(doc.computed_display(&target), "block");
    menu.advance(&mut doc, ms(15)).unwrap();
    menu.hide(&mut doc, ms(20)).unwrap();
    menu.advance(&mut doc, ms(1_000)).unwrap();
    assert_eq!(doc.style(&target, "display"), None);
    assert_eq!(doc.computed_display(&target), "none");
}

#[test]
fn removed_mount_point_surfaces_relocation_error() {
    let (mut doc, wrapper, target, _) = page_with_sibling();
    let caps = Capabilities::standard();
    let mut sim = TransitionSimulator::new(&caps);
    let mut menu = SlideMenu::new(&mut doc, "nav", SlideMenuConfig::default(), caps).unwrap();
    menu.show(&mut doc, ms(0)).unwrap();
    let now = settle(&mut doc, &mut sim, &mut menu, ms(0));
    doc.remove(&wrapper);
    menu.hide(&mut doc, now).unwrap();
    sim.observe(&mut doc, now);

    let mut errors = Vec::new();
    for delivery in sim.poll(&doc, now + ms(300)) {
        if let Err(err) = menu.handle_event(&mut doc, delivery.listener, &delivery.event, now) {
            errors.push(err);
        }
    }
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], SlideMenuError::Relocation(_)));
    assert_eq!(menu.state(), MenuState::Closed);
    assert_eq!(doc.parent(&target), Some(menu.panel().content));
    assert!(!doc.is_connected(&menu.panel().wrap));
}
