use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// The preview's message pump.
///
/// The only place that polls the input driver. The handler is called with
/// `Some(event)` for each input event and with `None` once per iteration,
/// which is where deferred menu work runs and the frame is drawn.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.poll_interval = interval;
    }

    /// Run until the handler returns [`ControlFlow::Quit`].
    ///
    /// `wait` is asked before each poll for how long the loop may sleep; it
    /// is capped at the configured poll interval.
    pub fn run<F, W>(&mut self, mut wait: W, mut handler: F) -> io::Result<()>
    where
        W: FnMut() -> Option<Duration>,
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(&mut self.driver, None)? {
                break;
            }

            let timeout = wait().map_or(self.poll_interval, |w| w.min(self.poll_interval));
            if self.driver.poll(timeout)? {
                // Drain bursts so input never lags behind rendering.
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::ZERO)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::collections::VecDeque;

    struct Scripted {
        events: VecDeque<Event>,
        timeouts: Vec<Duration>,
    }

    impl InputDriver for Scripted {
        fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
            self.timeouts.push(timeout);
            Ok(!self.events.is_empty())
        }

        fn read(&mut self) -> io::Result<Event> {
            self.events
                .pop_front()
                .ok_or_else(|| io::Error::other("script exhausted"))
        }
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn drains_burst_then_ticks() {
        let driver = Scripted {
            events: VecDeque::from([key('a'), key('b'), key('q')]),
            timeouts: Vec::new(),
        };
        let mut event_loop = EventLoop::new(driver, Duration::from_millis(16));
        let mut seen = Vec::new();
        event_loop
            .run(
                || Some(Duration::from_millis(5)),
                |_, event| {
                    let Some(Event::Key(k)) = event else {
                        seen.push('.');
                        return Ok(ControlFlow::Continue);
                    };
                    let KeyCode::Char(c) = k.code else {
                        return Ok(ControlFlow::Continue);
                    };
                    seen.push(c);
                    Ok(if c == 'q' {
                        ControlFlow::Quit
                    } else {
                        ControlFlow::Continue
                    })
                },
            )
            .unwrap();
        assert_eq!(seen, vec!['.', 'a', 'b', 'q']);
        assert_eq!(event_loop.driver().timeouts[0], Duration::from_millis(5));
    }
}
