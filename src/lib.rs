//! Off-canvas slide menu.
//!
//! A [`SlideMenu`] takes an element out of the page, mounts it in a sliding
//! panel with a dimming backdrop, animates the panel in and out, and puts the
//! element back exactly where it was once the panel has slid away. The
//! document is reached through the [`dom::Dom`] trait, so the same lifecycle
//! drives the in-memory [`dom::MemoryDocument`] and, with the `web` feature on
//! `wasm32`, the browser DOM.
//!
//! ```
//! use std::time::Duration;
//! use slide_menu::dom::{Dom, MemoryDocument};
//! use slide_menu::{Capabilities, MenuState, SlideMenu, SlideMenuConfig};
//!
//! let mut doc = MemoryDocument::new();
//! let body = doc.body();
//! doc.add_element(body, "nav", &[("id", "menu")]).unwrap();
//!
//! let config = SlideMenuConfig::default().with_side("left");
//! let mut menu = SlideMenu::new(&mut doc, "#menu", config, Capabilities::standard()).unwrap();
//! menu.show(&mut doc, Duration::ZERO).unwrap();
//! menu.advance(&mut doc, Duration::from_millis(15)).unwrap();
//! assert_eq!(menu.state(), MenuState::Open);
//! ```

pub mod bindings;
pub mod capabilities;
pub mod config;
pub mod constants;
pub mod debug_log;
pub mod dom;
pub mod error;
pub mod menu;
pub mod relocation;
pub mod style;
pub mod template;
pub mod tracing_sub;

#[cfg(feature = "preview")]
pub mod drivers;
#[cfg(feature = "preview")]
pub mod event_loop;
#[cfg(feature = "preview")]
pub mod keybindings;
#[cfg(feature = "preview")]
pub mod preview;
#[cfg(feature = "preview")]
pub mod state;
#[cfg(feature = "preview")]
pub mod theme;

pub use capabilities::Capabilities;
pub use config::{AnimationConfig, Side, SlideMenuConfig, Width};
pub use error::{DomError, Result, SlideMenuError};
pub use menu::{EventOutcome, MenuState, SlideMenu, Target, Transition};
