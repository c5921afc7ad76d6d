use ratatui::style::Color;

// Preview colors, kept as small helpers so the palette lives in one place.

pub const ACCENT_RGB: (u8, u8, u8) = (200, 100, 0);
pub const PAGE_FG_RGB: (u8, u8, u8) = (220, 220, 220);
pub const PANEL_BG_RGB: (u8, u8, u8) = (30, 34, 42);

pub fn rgb_to_color(rgb: (u8, u8, u8)) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

pub fn accent() -> Color {
    rgb_to_color(ACCENT_RGB)
}

pub fn page_fg() -> Color {
    rgb_to_color(PAGE_FG_RGB)
}

/// Page text as seen through a black backdrop of the given opacity.
pub fn dimmed_page_fg(opacity: f32) -> Color {
    rgb_to_color(scale(PAGE_FG_RGB, 1.0 - opacity.clamp(0.0, 1.0)))
}

pub fn panel_bg() -> Color {
    rgb_to_color(PANEL_BG_RGB)
}

pub fn panel_fg() -> Color {
    Color::White
}

pub fn panel_border() -> Color {
    accent()
}

pub fn status_bg() -> Color {
    Color::DarkGray
}

pub fn status_fg() -> Color {
    Color::White
}

pub fn debug_highlight() -> Color {
    Color::Yellow
}

fn scale(rgb: (u8, u8, u8), factor: f32) -> (u8, u8, u8) {
    let channel = |c: u8| (f32::from(c) * factor).round() as u8;
    (channel(rgb.0), channel(rgb.1), channel(rgb.2))
}
