//! Rendering-environment capabilities.
//!
//! Detected once by the host (see the `web` backend) and injected into each
//! menu, so the lifecycle never probes the environment on its own.

/// What the host renderer supports and how it names things.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether `translate3d` transforms are available.
    pub transform3d: bool,
    pub transform_property: String,
    pub transition_property: String,
    pub box_sizing_property: String,
    pub will_change_property: String,
    /// Name of the event fired when a CSS transition finishes.
    pub transition_end_event: String,
}

impl Capabilities {
    /// Unprefixed properties with 3D transform support.
    pub fn standard() -> Self {
        Self {
            transform3d: true,
            transform_property: "transform".to_string(),
            transition_property: "transition".to_string(),
            box_sizing_property: "box-sizing".to_string(),
            will_change_property: "will-change".to_string(),
            transition_end_event: "transitionend".to_string(),
        }
    }

    /// Unprefixed properties, 2D transforms only.
    pub fn flat() -> Self {
        Self {
            transform3d: false,
            ..Self::standard()
        }
    }

    /// Older WebKit engines that only understand the `-webkit-` names.
    pub fn legacy_webkit() -> Self {
        Self {
            transform3d: true,
            transform_property: "-webkit-transform".to_string(),
            transition_property: "-webkit-transition".to_string(),
            box_sizing_property: "-webkit-box-sizing".to_string(),
            will_change_property: "will-change".to_string(),
            transition_end_event: "webkitTransitionEnd".to_string(),
        }
    }

    pub fn with_transform3d(mut self, supported: bool) -> Self {
        self.transform3d = supported;
        self
    }

    /// Map a standard property name to the name this host expects.
    /// Properties without a known prefixed form pass through unchanged.
    pub fn prefixed<'a>(&'a self, property: &'a str) -> &'a str {
        match property {
            "transform" => &self.transform_property,
            "transition" => &self.transition_property,
            "box-sizing" => &self.box_sizing_property,
            "will-change" => &self.will_change_property,
            other => other,
        }
    }

    /// Every name the host might use for a transition declaration.
    pub fn is_transition_property(&self, property: &str) -> bool {
        property == "transition" || property == self.transition_property
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_maps_known_properties() {
        let caps = Capabilities::legacy_webkit();
        assert_eq!(caps.prefixed("transform"), "-webkit-transform");
        assert_eq!(caps.prefixed("transition"), "-webkit-transition");
        assert_eq!(caps.prefixed("opacity"), "opacity");
        assert!(caps.is_transition_property("-webkit-transition"));
    }

    #[test]
    fn flat_disables_3d_only() {
        let caps = Capabilities::flat();
        assert!(!caps.transform3d);
        assert_eq!(caps.transform_property, "transform");
        assert_eq!(caps.transition_end_event, "transitionend");
    }
}
