//! Shared crate-wide constants.

use std::time::Duration;

/// Offset subtracted from the base z-index for the sliding container.
pub const CONTAINER_Z_OFFSET: i32 = 10;

/// Offset subtracted from the base z-index for the backdrop.
///
/// The backdrop always sits below the container so clicks on the panel never
/// reach the backdrop's close handler.
pub const BACKDROP_Z_OFFSET: i32 = 20;

/// Delay between inserting the panel and applying the shown styles.
///
/// Roughly one frame. The renderer has to commit the hidden starting styles
/// first, otherwise the transition jumps straight to the end state.
pub const SHOW_STYLE_DELAY: Duration = Duration::from_millis(15);

/// Slack added on top of the animation duration before a pending hide is
/// force-completed without a transition-end signal.
pub const DEFAULT_COMPLETION_GRACE: Duration = Duration::from_millis(100);

pub const DEFAULT_PREFIX: &str = "rs-slide-menu";
pub const DEFAULT_TOGGLER: &str = ".rs-slide-menu-toggler";
pub const DEFAULT_WIDTH_PX: u32 = 300;
pub const DEFAULT_BG_COLOR: &str = "#000";
pub const DEFAULT_BG_OPACITY: f32 = 0.5;
pub const DEFAULT_Z_INDEX: i32 = 1000;
pub const DEFAULT_DURATION: Duration = Duration::from_millis(300);
pub const DEFAULT_EASING: &str = "ease";

pub const CLICK_EVENT: &str = "click";
