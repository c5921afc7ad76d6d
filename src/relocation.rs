//! Moving the target element into the panel and back.

use crate::dom::Dom;
use crate::error::{Result, SlideMenuError};

/// Where the target element lived before the menu first opened.
///
/// Captured once, at construction, because by the time a hide completes the
/// element has already moved.
#[derive(Debug, Clone, PartialEq)]
pub struct MountPoint<N> {
    parent: N,
    next_sibling: Option<N>,
    /// Inline `display` the element carried before it was forced visible.
    /// `Some(None)` means there was no inline value.
    forced_display: Option<Option<String>>,
}

impl<N: Clone + PartialEq> MountPoint<N> {
    pub fn record<D: Dom<Node = N>>(dom: &D, element: &N) -> Option<Self> {
        Some(Self {
            parent: dom.parent(element)?,
            next_sibling: dom.next_element_sibling(element),
            forced_display: None,
        })
    }

    pub fn parent(&self) -> &N {
        &self.parent
    }

    pub fn next_sibling(&self) -> Option<&N> {
        self.next_sibling.as_ref()
    }

    /// Move `element` to the end of `content`, forcing `display: block` first
    /// when it is currently not displayed.
    pub fn detach_into<D: Dom<Node = N>>(
        &mut self,
        dom: &mut D,
        element: &N,
        content: &N,
    ) -> Result<()> {
        if dom.computed_display(element) == "none" {
            self.forced_display = Some(dom.style(element, "display"));
            dom.set_style(element, "display", "block")?;
        }
        dom.append_child(content, element)?;
        Ok(())
    }

    /// Put `element` back before its recorded sibling, or at the end of its
    /// recorded parent when it had none.
    pub fn restore<D: Dom<Node = N>>(&mut self, dom: &mut D, element: &N) -> Result<()> {
        self.validate(dom)?;
        if let Some(previous) = self.forced_display.take() {
            match previous {
                Some(display) => dom.set_style(element, "display", &display)?,
                None => dom.remove_style(element, "display")?,
            }
        }
        dom.insert_before(&self.parent, element, self.next_sibling.as_ref())?;
        Ok(())
    }

    fn validate<D: Dom<Node = N>>(&self, dom: &D) -> Result<()> {
        if !dom.is_element(&self.parent) || !dom.is_connected(&self.parent) {
            return Err(SlideMenuError::Relocation(
                "original parent is no longer in the document".to_string(),
            ));
        }
        if let Some(sibling) = &self.next_sibling
            && dom.parent(sibling).as_ref() != Some(&self.parent)
        {
            return Err(SlideMenuError::Relocation(
                "original next sibling was moved or removed".to_string(),
            ));
        }
        Ok(())
    }
}
