//! Terminal playground for the slide menu.
//!
//! Runs a real [`SlideMenu`] against a small demo page in a
//! [`MemoryDocument`], lets the [`TransitionSimulator`] play the browser's
//! part, and paints the result: page text dimmed by the backdrop, and the
//! panel sliding in from its side at whatever offset the running transform
//! transition has reached.

use std::time::Duration;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};

use crate::capabilities::Capabilities;
use crate::config::{Side, SlideMenuConfig, Width};
use crate::constants::CLICK_EVENT;
use crate::debug_log::DebugLogHandle;
use crate::dom::{Dom, MemoryDocument, NodeId, TransitionSimulator};
use crate::error::{DomError, Result};
use crate::keybindings::Action;
use crate::menu::{EventOutcome, SlideMenu};
use crate::state::PreviewState;
use crate::style::parse_translate_x;
use crate::theme;

const MENU_ITEMS: [&str; 4] = ["Home", "Articles", "About", "Contact"];
const DEFAULT_PANEL_COLUMNS: u16 = 30;
const PIXELS_PER_COLUMN: u32 = 10;
const LOG_PANE_HEIGHT: u16 = 8;

/// Nodes of the demo page the preview pokes at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoPage {
    pub toggler: NodeId,
    pub menu: NodeId,
    pub main: NodeId,
}

/// Build the demo page. The menu is hidden by a stylesheet rule, so opening
/// it exercises the forced-display path.
pub fn build_demo_page(
    doc: &mut MemoryDocument,
    toggler_class: &str,
) -> std::result::Result<DemoPage, DomError> {
    let body = doc.body();
    let header = doc.add_element(body, "header", &[])?;
    let title = doc.add_element(header, "h1", &[])?;
    doc.add_text(title, "Slide menu preview")?;
    let toggler = doc.add_element(header, "a", &[("class", toggler_class), ("href", "#menu")])?;
    doc.add_text(toggler, "[=] Menu")?;

    let page = doc.add_element(body, "div", &[("id", "page")])?;
    let menu = doc.add_element(page, "nav", &[("id", "site-menu")])?;
    let list = doc.add_element(menu, "ul", &[])?;
    for item in MENU_ITEMS {
        let li = doc.add_element(list, "li", &[])?;
        let link = doc.add_element(li, "a", &[("href", "#")])?;
        doc.add_text(link, item)?;
    }
    let main = doc.add_element(page, "main", &[])?;
    let para = doc.add_element(main, "p", &[])?;
    doc.add_text(para, "Page content stays put while the panel slides over it.")?;
    doc.add_display_rule("#site-menu", "none")?;

    Ok(DemoPage {
        toggler,
        menu,
        main,
    })
}

/// One line per element with direct text, indented by depth. Elements that
/// are not displayed are skipped along with their subtree, as is `exclude`.
pub fn text_lines(doc: &MemoryDocument, root: NodeId, exclude: Option<NodeId>) -> Vec<String> {
    let mut lines = Vec::new();
    collect_text(doc, root, 0, exclude, &mut lines);
    lines
}

fn collect_text(
    doc: &MemoryDocument,
    node: NodeId,
    depth: usize,
    exclude: Option<NodeId>,
    out: &mut Vec<String>,
) {
    if Some(node) == exclude || doc.computed_display(&node) == "none" {
        return;
    }
    let own: String = doc
        .children(node)
        .iter()
        .filter_map(|child| doc.text(*child))
        .collect();
    let own = own.trim();
    let next_depth = if own.is_empty() {
        depth
    } else {
        out.push(format!("{}{own}", "  ".repeat(depth)));
        depth + 1
    };
    for child in doc.children(node) {
        if doc.is_element(child) {
            collect_text(doc, *child, next_depth, exclude, out);
        }
    }
}

pub struct PreviewApp {
    doc: MemoryDocument,
    sim: TransitionSimulator,
    menu: SlideMenu<MemoryDocument>,
    page: DemoPage,
}

impl PreviewApp {
    pub fn new(config: SlideMenuConfig, caps: Capabilities) -> Result<Self> {
        let mut doc = MemoryDocument::new();
        let toggler_class = config.toggler().trim_start_matches('.').to_string();
        let page = build_demo_page(&mut doc, &toggler_class)?;
        let mut sim = TransitionSimulator::new(&caps);
        let menu = SlideMenu::new(&mut doc, "#site-menu", config, caps)?;
        sim.observe(&mut doc, Duration::ZERO);
        Ok(Self {
            doc,
            sim,
            menu,
            page,
        })
    }

    pub fn document(&self) -> &MemoryDocument {
        &self.doc
    }

    pub fn menu(&self) -> &SlideMenu<MemoryDocument> {
        &self.menu
    }

    pub fn page(&self) -> &DemoPage {
        &self.page
    }

    pub fn simulator(&self) -> &TransitionSimulator {
        &self.sim
    }

    /// Apply a menu action and return a one-line description of what happened.
    pub fn perform(&mut self, action: Action, now: Duration) -> Result<String> {
        let summary = match action {
            Action::ClickToggler => self.click(self.page.toggler, now)?,
            Action::ClickBackdrop => self.click(self.menu.panel().backdrop, now)?,
            Action::ClickClose => self.click(self.menu.panel().close, now)?,
            Action::Hide => format!("hide: {:?}", self.menu.hide(&mut self.doc, now)?),
            Action::Destroy => {
                self.menu.destroy(&mut self.doc, now)?;
                "destroyed".to_string()
            }
            Action::ToggleLog | Action::Quit => return Ok(String::new()),
        };
        self.sim.observe(&mut self.doc, now);
        Ok(summary)
    }

    fn click(&mut self, node: NodeId, now: Duration) -> Result<String> {
        let deliveries = self.doc.dispatch(CLICK_EVENT, node);
        if deliveries.is_empty() {
            return Ok("click: no listener".to_string());
        }
        let mut prevented = false;
        for delivery in deliveries {
            let outcome =
                self.menu
                    .handle_event(&mut self.doc, delivery.listener, &delivery.event, now)?;
            if let EventOutcome::Handled {
                prevent_default: true,
            } = outcome
            {
                prevented = true;
            }
        }
        Ok(format!(
            "click: {}{}",
            self.menu.state(),
            if prevented { " (default prevented)" } else { "" }
        ))
    }

    /// Run everything due at `now`: deferred menu work, then finished
    /// transitions and the events they fire.
    pub fn tick(&mut self, now: Duration) -> Result<()> {
        self.menu.advance(&mut self.doc, now)?;
        self.sim.observe(&mut self.doc, now);
        for delivery in self.sim.poll(&self.doc, now) {
            self.menu
                .handle_event(&mut self.doc, delivery.listener, &delivery.event, now)?;
        }
        self.sim.observe(&mut self.doc, now);
        Ok(())
    }

    /// How long the host may sleep before something is due.
    pub fn next_wakeup(&self, now: Duration) -> Option<Duration> {
        let due = match (self.menu.next_deadline(), self.sim.next_deadline()) {
            (Some(a), Some(b)) => a.min(b),
            (a, b) => a.or(b)?,
        };
        Some(due.saturating_sub(now))
    }

    /// Horizontal container offset as a fraction of its width; `0` is fully
    /// on screen. `None` while the panel is not in the document.
    pub fn panel_offset(&self, now: Duration) -> Option<f32> {
        let container = self.menu.panel().container;
        if !self.doc.is_connected(&container) {
            return None;
        }
        let property = self.menu.capabilities().prefixed("transform");
        let current = parse_translate_x(&self.doc.style(&container, property)?)?;
        Some(self.interpolate(container, property, current, now, parse_translate_x))
    }

    /// Backdrop opacity as currently rendered, `0` while detached.
    pub fn backdrop_opacity(&self, now: Duration) -> f32 {
        let backdrop = self.menu.panel().backdrop;
        if !self.doc.is_connected(&backdrop) {
            return 0.0;
        }
        let parse = |v: &str| v.trim().parse::<f32>().ok();
        let current = self
            .doc
            .style(&backdrop, "opacity")
            .and_then(|v| parse(&v))
            .unwrap_or(0.0);
        self.interpolate(backdrop, "opacity", current, now, parse)
    }

    fn interpolate(
        &self,
        node: NodeId,
        property: &str,
        current: f32,
        now: Duration,
        parse: impl Fn(&str) -> Option<f32>,
    ) -> f32 {
        let Some(active) = self.sim.active_for(node, property) else {
            return current;
        };
        let from = active.from.as_deref().and_then(&parse).unwrap_or(current);
        from + (current - from) * active.progress(now)
    }

    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        now: Duration,
        state: &PreviewState,
        log: Option<&DebugLogHandle>,
        hints: &str,
    ) {
        let area = frame.area();
        let log_height = if state.debug_log_visible() && log.is_some() {
            LOG_PANE_HEIGHT.min(area.height.saturating_sub(3))
        } else {
            0
        };
        let rows = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(log_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        self.render_page(frame, rows[0], now);
        if let (Some(log), true) = (log, log_height > 0) {
            let lines: Vec<Line> = log
                .tail(usize::from(log_height.saturating_sub(2)))
                .into_iter()
                .map(Line::from)
                .collect();
            let pane = Paragraph::new(lines)
                .block(Block::bordered().title(" log "))
                .style(Style::default().fg(theme::debug_highlight()));
            frame.render_widget(pane, rows[1]);
        }

        let status = format!(
            " {} | listeners: {} | {}",
            self.menu.state(),
            self.doc.listener_count(),
            state.status().unwrap_or("ready")
        );
        frame.render_widget(
            Paragraph::new(status)
                .style(Style::default().bg(theme::status_bg()).fg(theme::status_fg())),
            rows[2],
        );
        frame.render_widget(Paragraph::new(hints.to_string()), rows[3]);
    }

    fn render_page(&self, frame: &mut Frame<'_>, area: Rect, now: Duration) {
        let panel = self.menu.panel();
        let page_style = if self.doc.is_connected(&panel.wrap) {
            Style::default().fg(theme::dimmed_page_fg(self.backdrop_opacity(now)))
        } else {
            Style::default().fg(theme::page_fg())
        };
        let page_lines: Vec<Line> = text_lines(&self.doc, self.doc.body(), Some(panel.wrap))
            .into_iter()
            .map(Line::from)
            .collect();
        frame.render_widget(Paragraph::new(page_lines).style(page_style), area);

        let Some(offset) = self.panel_offset(now) else {
            return;
        };
        let Some(rect) = panel_rect(area, self.menu.config(), offset) else {
            return;
        };
        let mut lines = vec![Line::from("[x] Close"), Line::from("")];
        lines.extend(
            text_lines(&self.doc, panel.content, None)
                .into_iter()
                .map(Line::from),
        );
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(lines)
                .block(
                    Block::bordered()
                        .title(" menu ")
                        .border_style(Style::default().fg(theme::panel_border())),
                )
                .style(Style::default().bg(theme::panel_bg()).fg(theme::panel_fg())),
            rect,
        );
    }
}

/// Panel width in terminal columns.
pub fn panel_columns(width: &Width, available: u16) -> u16 {
    let columns = match width {
        Width::Pixels(px) => u16::try_from(px / PIXELS_PER_COLUMN).unwrap_or(u16::MAX),
        Width::Length(len) => match len.trim().strip_suffix('%') {
            Some(pct) => pct
                .trim()
                .parse::<f32>()
                .map(|p| (f32::from(available) * p / 100.0).round() as u16)
                .unwrap_or(DEFAULT_PANEL_COLUMNS),
            None => len
                .trim()
                .strip_suffix("px")
                .and_then(|px| px.trim().parse::<f32>().ok())
                .map_or(DEFAULT_PANEL_COLUMNS, |px| (px / PIXELS_PER_COLUMN as f32) as u16),
        },
    };
    columns.clamp(1, available.max(1))
}

/// Visible part of the panel at `offset`, clipped to `area`.
pub fn panel_rect(area: Rect, config: &SlideMenuConfig, offset: f32) -> Option<Rect> {
    let width = panel_columns(config.width(), area.width);
    let shift = (offset * f32::from(width)).round() as i32;
    let resting = match config.side() {
        Side::Left => i32::from(area.x),
        Side::Right => i32::from(area.right()) - i32::from(width),
    };
    let left = (resting + shift).max(i32::from(area.x));
    let right = (resting + shift + i32::from(width)).min(i32::from(area.right()));
    if right <= left {
        return None;
    }
    Some(Rect {
        x: u16::try_from(left).ok()?,
        y: area.y,
        width: u16::try_from(right - left).ok()?,
        height: area.height,
    })
}
