//! Slide menu configuration.
//!
//! `SlideMenuConfig::default()` carries the stock settings; callers override
//! individual fields through the builder methods. Values derived from the base
//! fields (stacking order, resting transform, class names) are methods so they
//! can never drift from what they are derived from.

use std::fmt;
use std::time::Duration;

use crate::constants::{
    BACKDROP_Z_OFFSET, CONTAINER_Z_OFFSET, DEFAULT_BG_COLOR, DEFAULT_BG_OPACITY,
    DEFAULT_COMPLETION_GRACE, DEFAULT_DURATION, DEFAULT_EASING, DEFAULT_PREFIX, DEFAULT_TOGGLER,
    DEFAULT_WIDTH_PX, DEFAULT_Z_INDEX,
};

/// Edge of the viewport the panel is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    Left,
    #[default]
    Right,
}

impl Side {
    /// Anything other than `left` anchors the panel on the right.
    pub fn from_name(name: &str) -> Self {
        if name == "left" { Side::Left } else { Side::Right }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    /// Resting (hidden) horizontal offset of the container.
    pub fn hide_transform_x(self) -> &'static str {
        match self {
            Side::Left => "-100%",
            Side::Right => "100%",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Panel width, either a whole pixel count or any CSS length.
///
/// Fractional pixel counts convert to a `px` length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Width {
    Pixels(u32),
    Length(String),
}

impl Width {
    pub fn to_css(&self) -> String {
        match self {
            Width::Pixels(px) => format!("{px}px"),
            Width::Length(len) => len.clone(),
        }
    }
}

impl From<u32> for Width {
    fn from(px: u32) -> Self {
        Width::Pixels(px)
    }
}

impl From<f64> for Width {
    fn from(px: f64) -> Self {
        if px.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&px) {
            Width::Pixels(px as u32)
        } else {
            Width::Length(format!("{px}px"))
        }
    }
}

impl From<&str> for Width {
    fn from(len: &str) -> Self {
        Width::Length(len.to_string())
    }
}

impl From<String> for Width {
    fn from(len: String) -> Self {
        Width::Length(len)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    pub duration: Duration,
    pub easing: String,
    /// Extra time allowed after `duration` before a hide completes without a
    /// transition-end signal. `None` waits for the signal indefinitely.
    pub completion_grace: Option<Duration>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            easing: DEFAULT_EASING.to_string(),
            completion_grace: Some(DEFAULT_COMPLETION_GRACE),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideMenuConfig {
    side: Side,
    width: Width,
    bg_color: String,
    bg_opacity: f32,
    z_index: i32,
    animation: AnimationConfig,
    prefix: String,
    toggler: String,
}

impl Default for SlideMenuConfig {
    fn default() -> Self {
        Self {
            side: Side::Right,
            width: Width::Pixels(DEFAULT_WIDTH_PX),
            bg_color: DEFAULT_BG_COLOR.to_string(),
            bg_opacity: DEFAULT_BG_OPACITY,
            z_index: DEFAULT_Z_INDEX,
            animation: AnimationConfig::default(),
            prefix: DEFAULT_PREFIX.to_string(),
            toggler: DEFAULT_TOGGLER.to_string(),
        }
    }
}

impl SlideMenuConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the anchoring side by name; unrecognized names fall back to `right`.
    pub fn with_side(mut self, side: impl AsRef<str>) -> Self {
        self.side = Side::from_name(side.as_ref());
        self
    }

    pub fn with_anchor(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn with_width(mut self, width: impl Into<Width>) -> Self {
        self.width = width.into();
        self
    }

    pub fn with_bg_color(mut self, color: impl Into<String>) -> Self {
        self.bg_color = color.into();
        self
    }

    pub fn with_bg_opacity(mut self, opacity: f32) -> Self {
        self.bg_opacity = opacity;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.animation.duration = duration;
        self
    }

    pub fn with_easing(mut self, easing: impl Into<String>) -> Self {
        self.animation.easing = easing.into();
        self
    }

    pub fn with_completion_grace(mut self, grace: Option<Duration>) -> Self {
        self.animation.completion_grace = grace;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_toggler(mut self, selector: impl Into<String>) -> Self {
        self.toggler = selector.into();
        self
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn width(&self) -> &Width {
        &self.width
    }

    pub fn bg_color(&self) -> &str {
        &self.bg_color
    }

    pub fn bg_opacity(&self) -> f32 {
        self.bg_opacity
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn animation(&self) -> &AnimationConfig {
        &self.animation
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn toggler(&self) -> &str {
        &self.toggler
    }

    pub fn z_index_container(&self) -> i32 {
        self.z_index.saturating_sub(CONTAINER_Z_OFFSET)
    }

    pub fn z_index_backdrop(&self) -> i32 {
        self.z_index.saturating_sub(BACKDROP_Z_OFFSET)
    }

    pub fn hide_transform_x(&self) -> &'static str {
        self.side.hide_transform_x()
    }

    /// Class added to the body while the menu is open.
    pub fn open_class(&self) -> String {
        format!("{}-open", self.prefix)
    }

    /// Class carried by the panel's close control.
    pub fn close_class(&self) -> String {
        format!("{}-close", self.prefix)
    }

    /// How long a hide may wait for its transition-end signal.
    pub fn completion_timeout(&self) -> Option<Duration> {
        self.animation
            .completion_grace
            .map(|grace| self.animation.duration + grace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_side_normalizes_to_right() {
        for name in ["right", "top", "", "LEFT"] {
            let cfg = SlideMenuConfig::default().with_side(name);
            assert_eq!(cfg.side(), Side::Right);
            assert_eq!(cfg.hide_transform_x(), "100%");
        }
        let cfg = SlideMenuConfig::default().with_side("left");
        assert_eq!(cfg.side(), Side::Left);
        assert_eq!(cfg.hide_transform_x(), "-100%");
    }

    #[test]
    fn z_indices_follow_base() {
        for base in [-50, 0, 15, 1000, i32::MAX / 2] {
            let cfg = SlideMenuConfig::default().with_z_index(base);
            assert_eq!(cfg.z_index_container(), base - 10);
            assert_eq!(cfg.z_index_backdrop(), base - 20);
        }
    }

    #[test]
    fn z_indices_saturate_at_the_bottom() {
        let cfg = SlideMenuConfig::default().with_z_index(i32::MIN);
        assert_eq!(cfg.z_index_container(), i32::MIN);
        assert_eq!(cfg.z_index_backdrop(), i32::MIN);

        let cfg = SlideMenuConfig::default().with_z_index(i32::MIN + 15);
        assert_eq!(cfg.z_index_container(), i32::MIN + 5);
        assert_eq!(cfg.z_index_backdrop(), i32::MIN);
    }

    #[test]
    fn overrides_leave_other_defaults_alone() {
        let cfg = SlideMenuConfig::default().with_width(420).with_prefix("nav");
        assert_eq!(cfg.width().to_css(), "420px");
        assert_eq!(cfg.open_class(), "nav-open");
        assert_eq!(cfg.close_class(), "nav-close");
        assert_eq!(cfg.bg_color(), DEFAULT_BG_COLOR);
        assert_eq!(cfg.toggler(), DEFAULT_TOGGLER);
        assert_eq!(cfg.z_index(), DEFAULT_Z_INDEX);
    }

    #[test]
    fn width_accepts_lengths() {
        assert_eq!(Width::from("80vw").to_css(), "80vw");
        assert_eq!(Width::from(12).to_css(), "12px");
    }

    #[test]
    fn fractional_pixels_keep_their_fraction() {
        assert_eq!(Width::from(250.5).to_css(), "250.5px");
        assert_eq!(Width::from(300.0), Width::Pixels(300));
        assert_eq!(Width::from(-4.0).to_css(), "-4px");
    }

    #[test]
    fn completion_timeout_adds_grace() {
        let cfg = SlideMenuConfig::default()
            .with_duration(Duration::from_millis(200))
            .with_completion_grace(Some(Duration::from_millis(50)));
        assert_eq!(cfg.completion_timeout(), Some(Duration::from_millis(250)));
        let cfg = cfg.with_completion_grace(None);
        assert_eq!(cfg.completion_timeout(), None);
    }
}
