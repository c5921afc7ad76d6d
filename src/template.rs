//! Panel markup.

use crate::dom::Dom;
use crate::error::DomError;

/// The nodes making up one panel. The content area receives the relocated
/// target element.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelNodes<N> {
    pub wrap: N,
    pub backdrop: N,
    pub container: N,
    pub close: N,
    pub content: N,
}

/// Build a detached panel:
///
/// ```text
/// div.<prefix>-wrap
/// ├── div.<prefix>-backdrop
/// └── div.<prefix>-container
///     ├── button.<prefix>-close
///     └── div.<prefix>-content
/// ```
pub fn build_panel<D: Dom>(dom: &mut D, prefix: &str) -> Result<PanelNodes<D::Node>, DomError> {
    let wrap = element(dom, "div", &format!("{prefix}-wrap"))?;
    let backdrop = element(dom, "div", &format!("{prefix}-backdrop"))?;
    let container = element(dom, "div", &format!("{prefix}-container"))?;
    let close = element(dom, "button", &format!("{prefix}-close"))?;
    dom.set_attribute(&close, "type", "button")?;
    dom.set_attribute(&close, "aria-label", "Close")?;
    let content = element(dom, "div", &format!("{prefix}-content"))?;

    dom.append_child(&wrap, &backdrop)?;
    dom.append_child(&wrap, &container)?;
    dom.append_child(&container, &close)?;
    dom.append_child(&container, &content)?;

    Ok(PanelNodes {
        wrap,
        backdrop,
        container,
        close,
        content,
    })
}

fn element<D: Dom>(dom: &mut D, tag: &str, class: &str) -> Result<D::Node, DomError> {
    let node = dom.create_element(tag)?;
    dom.add_class(&node, class)?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;

    #[test]
    fn builds_detached_structure() {
        let mut doc = MemoryDocument::new();
        let panel = build_panel(&mut doc, "nav").unwrap();
        assert!(!doc.is_connected(&panel.wrap));
        assert_eq!(
            doc.outer_html(panel.wrap),
            "<div class=\"nav-wrap\"><div class=\"nav-backdrop\"></div>\
             <div class=\"nav-container\"><button class=\"nav-close\" type=\"button\" \
             aria-label=\"Close\"></button><div class=\"nav-content\"></div></div></div>"
        );
        assert_eq!(
            doc.query_within(&panel.wrap, ".nav-close").unwrap(),
            Some(panel.close)
        );
    }
}
