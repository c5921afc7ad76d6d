use std::cell::Cell;
use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::Event;
use indoc::indoc;

use slide_menu::debug_log::{DebugLogHandle, install_panic_hook, set_global_debug_log};
use slide_menu::drivers::OutputDriver;
use slide_menu::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use slide_menu::event_loop::{ControlFlow, EventLoop};
use slide_menu::keybindings::{Action, KeyBindings};
use slide_menu::preview::PreviewApp;
use slide_menu::state::PreviewState;
use slide_menu::{Capabilities, SlideMenuConfig, tracing_sub};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(
    name = "slide-menu",
    version = env!("CARGO_PKG_VERSION"),
    about = "Interactive terminal preview of the slide menu lifecycle",
    after_help = indoc! {"
        Keys:
          t, Enter     click the toggler
          b            click the backdrop
          c            click the close button
          h, Esc       hide the menu
          d            destroy the menu
          l            show or hide the debug log
          q, Ctrl+C    quit
    "}
)]
struct PreviewCli {
    /// Side the panel is anchored to (`left` or `right`).
    #[arg(short = 's', long = "side", default_value = "right")]
    side: String,

    /// Panel width: a pixel count (`300`) or a CSS length (`40%`).
    #[arg(short = 'w', long = "width", default_value = "300")]
    width: String,

    /// Slide animation duration.
    #[arg(short = 'd', long = "duration-ms", value_name = "MS", default_value_t = 300)]
    duration_ms: u64,

    /// Render as if the host had no 3D transform support.
    #[arg(long = "no-3d")]
    no_3d: bool,
}

impl PreviewCli {
    fn config(&self) -> SlideMenuConfig {
        let config = SlideMenuConfig::default()
            .with_side(&self.side)
            .with_duration(Duration::from_millis(self.duration_ms));
        match self.width.parse::<f64>() {
            Ok(px) => config.with_width(px),
            Err(_) => config.with_width(self.width.as_str()),
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::standard().with_transform3d(!self.no_3d)
    }
}

fn main() -> io::Result<()> {
    let args = PreviewCli::parse();

    let log = DebugLogHandle::default();
    set_global_debug_log(log.clone());
    tracing_sub::init_default();
    install_panic_hook();

    let mut app = PreviewApp::new(args.config(), args.capabilities())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;
    let keys = KeyBindings::default();
    let hints = keys.hint_line();
    let mut state = PreviewState::new();

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let start = Instant::now();
    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), FRAME_INTERVAL);

    // deadline of the next deferred step, refreshed after every tick
    let wakeup = Cell::new(None);
    let result = event_loop.run(
        || wakeup.get(),
        |_, event| {
            let now = start.elapsed();
            match event {
                Some(Event::Key(key)) => {
                    let Some(action) = keys.action_for_key(&key) else {
                        return Ok(ControlFlow::Continue);
                    };
                    match action {
                        Action::Quit => return Ok(ControlFlow::Quit),
                        Action::ToggleLog => state.toggle_debug_log_visible(),
                        other => match app.perform(other, now) {
                            Ok(summary) => state.set_status(summary),
                            Err(err) => {
                                tracing::error!(%err, "menu action failed");
                                state.set_status(format!("error: {err}"));
                            }
                        },
                    }
                }
                Some(_) => {}
                None => {
                    if let Err(err) = app.tick(now) {
                        tracing::error!(%err, "menu tick failed");
                        state.set_status(format!("error: {err}"));
                    }
                    wakeup.set(app.next_wakeup(now));
                    state.record_frame(now);
                    output.draw(|frame| app.render(frame, now, &state, Some(&log), &hints))?;
                }
            }
            Ok(ControlFlow::Continue)
        },
    );

    output.exit()?;
    result
}
