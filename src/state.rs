use std::time::Duration;

/// UI-only state of the preview, kept apart from the menu itself.
#[derive(Debug, Default, Clone)]
pub struct PreviewState {
    debug_log_visible: bool,
    status: Option<String>,
    frames: u64,
    last_frame_at: Duration,
}

impl PreviewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug_log_visible(&self) -> bool {
        self.debug_log_visible
    }

    pub fn set_debug_log_visible(&mut self, visible: bool) {
        self.debug_log_visible = visible;
    }

    pub fn toggle_debug_log_visible(&mut self) {
        self.debug_log_visible = !self.debug_log_visible;
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn record_frame(&mut self, now: Duration) {
        self.frames += 1;
        self.last_frame_at = now;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_frame_at(&self) -> Duration {
        self.last_frame_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_and_counts() {
        let mut s = PreviewState::new();
        assert!(!s.debug_log_visible());
        s.toggle_debug_log_visible();
        assert!(s.debug_log_visible());
        s.set_status("opened");
        assert_eq!(s.status(), Some("opened"));
        s.record_frame(Duration::from_millis(16));
        s.record_frame(Duration::from_millis(32));
        assert_eq!(s.frames(), 2);
        assert_eq!(s.last_frame_at(), Duration::from_millis(32));
    }
}
