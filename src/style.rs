//! Style resolution for the panel nodes.
//!
//! Everything here is a pure function of the configuration and the host
//! capabilities. Writing the declarations onto nodes is the caller's job.

use crate::capabilities::Capabilities;
use crate::config::SlideMenuConfig;
use crate::dom::Dom;
use crate::error::DomError;

/// Ordered list of inline CSS declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    entries: Vec<(String, String)>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.entries.push((property.into(), value.into()));
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn apply_to<D: Dom>(&self, dom: &mut D, node: &D::Node) -> Result<(), DomError> {
        for (property, value) in self.iter() {
            dom.set_style(node, property, value)?;
        }
        Ok(())
    }
}

/// Hidden starting styles for the three styled panel nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseStyles {
    pub wrap: Declarations,
    pub backdrop: Declarations,
    pub container: Declarations,
}

/// The two animated properties, for either end of the transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimatedStyles {
    pub backdrop: Declarations,
    pub container: Declarations,
}

/// `translate3d(x, 0, 0)` when 3D transforms are available, else `translateX(x)`.
pub fn transform_x(offset: &str, caps: &Capabilities) -> String {
    if caps.transform3d {
        format!("translate3d({offset}, 0, 0)")
    } else {
        format!("translateX({offset})")
    }
}

fn transition(config: &SlideMenuConfig, property: &str) -> String {
    let animation = config.animation();
    format!(
        "{}ms {} {}",
        animation.duration.as_millis(),
        property,
        animation.easing
    )
}

pub fn wrap_styles(config: &SlideMenuConfig, caps: &Capabilities) -> Declarations {
    let mut decl = Declarations::new();
    decl.push("position", "fixed");
    decl.push("left", "0");
    decl.push("top", "0");
    decl.push("width", "100%");
    decl.push("height", "100%");
    decl.push("overflow", "hidden");
    decl.push("z-index", config.z_index().to_string());
    decl.push(caps.prefixed("transform"), "translate3d(0, 0, 0)");
    decl.push(caps.prefixed("transition"), transition(config, "visibility"));
    decl
}

pub fn backdrop_styles(config: &SlideMenuConfig, caps: &Capabilities) -> Declarations {
    let mut decl = Declarations::new();
    decl.push("position", "fixed");
    decl.push("top", "0");
    decl.push("left", "0");
    decl.push("width", "100%");
    decl.push("height", "100%");
    decl.push("background", config.bg_color());
    decl.push("opacity", "0");
    decl.push("z-index", config.z_index_backdrop().to_string());
    decl.push(caps.prefixed("transform"), "translate3d(0, 0, 0)");
    decl.push(caps.prefixed("transition"), transition(config, "opacity"));
    decl
}

pub fn container_styles(config: &SlideMenuConfig, caps: &Capabilities) -> Declarations {
    let mut decl = Declarations::new();
    decl.push("width", config.width().to_css());
    decl.push("float", config.side().as_str());
    decl.push("z-index", config.z_index_container().to_string());
    decl.push("height", "100%");
    decl.push("overflow-x", "hidden");
    decl.push("overflow-y", "auto");
    decl.push("position", "relative");
    decl.push(caps.prefixed("box-sizing"), "border-box");
    decl.push(
        caps.prefixed("transition"),
        transition(config, caps.prefixed("transform")),
    );
    decl.push(caps.prefixed("will-change"), "transform");
    decl.push(
        caps.prefixed("transform"),
        transform_x(config.hide_transform_x(), caps),
    );
    decl
}

pub fn base_styles(config: &SlideMenuConfig, caps: &Capabilities) -> BaseStyles {
    BaseStyles {
        wrap: wrap_styles(config, caps),
        backdrop: backdrop_styles(config, caps),
        container: container_styles(config, caps),
    }
}

/// Backdrop at the configured opacity, container on screen.
pub fn shown_styles(config: &SlideMenuConfig, caps: &Capabilities) -> AnimatedStyles {
    let mut backdrop = Declarations::new();
    backdrop.push("opacity", config.bg_opacity().to_string());
    let mut container = Declarations::new();
    container.push(caps.prefixed("transform"), transform_x("0", caps));
    AnimatedStyles {
        backdrop,
        container,
    }
}

/// Backdrop transparent, container parked off screen on its side.
pub fn hidden_styles(config: &SlideMenuConfig, caps: &Capabilities) -> AnimatedStyles {
    let mut backdrop = Declarations::new();
    backdrop.push("opacity", "0");
    let mut container = Declarations::new();
    container.push(
        caps.prefixed("transform"),
        transform_x(config.hide_transform_x(), caps),
    );
    AnimatedStyles {
        backdrop,
        container,
    }
}

/// Horizontal offset of a `translate3d(..)` / `translateX(..)` value as a
/// fraction of the element width. Only percentage and zero offsets are
/// understood.
pub fn parse_translate_x(value: &str) -> Option<f32> {
    let value = value.trim();
    let inner = value
        .strip_prefix("translate3d(")
        .or_else(|| value.strip_prefix("translateX("))?
        .strip_suffix(')')?;
    let first = inner.split(',').next()?.trim();
    if let Some(pct) = first.strip_suffix('%') {
        return pct.trim().parse::<f32>().ok().map(|p| p / 100.0);
    }
    let number = first.strip_suffix("px").unwrap_or(first);
    match number.parse::<f32>() {
        Ok(v) if v == 0.0 => Some(0.0),
        _ => None,
    }
}
