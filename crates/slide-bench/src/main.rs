use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::Level;

use slide_menu::dom::{Dom, MemoryDocument, NodeId, TransitionSimulator};
use slide_menu::{
    Capabilities, EventOutcome, MenuState, SlideMenu, SlideMenuConfig, SlideMenuError,
};

#[derive(Parser, Debug)]
#[command(
    name = "slide-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Headless benchmark of full slide menu open/close cycles"
)]
struct BenchCli {
    /// Number of open/close cycles to run.
    #[arg(short = 'n', long = "cycles", default_value_t = 10_000)]
    cycles: u32,

    /// Animation duration used for the simulated transitions.
    #[arg(short = 'd', long = "duration-ms", value_name = "MS", default_value_t = 300)]
    duration_ms: u64,

    /// Side the panel is anchored to.
    #[arg(short = 's', long = "side", default_value = "right")]
    side: String,

    /// Number of toggler links on the page; cycles click them in turn.
    #[arg(short = 't', long = "togglers", default_value_t = 3)]
    togglers: usize,

    /// Log lifecycle transitions to stderr.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

struct BenchConfig {
    cycles: u32,
    duration: Duration,
    togglers: usize,
    menu: SlideMenuConfig,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(1..=1_000_000).contains(&cli.cycles) {
            return Err("cycles must be between 1 and 1000000".to_string());
        }
        if cli.duration_ms > 10_000 {
            return Err("duration must be at most 10000 ms".to_string());
        }
        if !(1..=64).contains(&cli.togglers) {
            return Err("togglers must be between 1 and 64".to_string());
        }
        let duration = Duration::from_millis(cli.duration_ms);
        Ok(Self {
            cycles: cli.cycles,
            duration,
            togglers: cli.togglers,
            menu: SlideMenuConfig::default()
                .with_side(&cli.side)
                .with_duration(duration),
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .with_target(false)
        .try_init();

    let stats = run_benchmark(&config)
        .map_err(|err| io::Error::other(format!("benchmark aborted: {err}")))?;
    println!("{}", stats.final_report(&config));
    Ok(())
}

struct Harness {
    doc: MemoryDocument,
    sim: TransitionSimulator,
    menu: SlideMenu<MemoryDocument>,
    togglers: Vec<NodeId>,
}

impl Harness {
    fn new(config: &BenchConfig) -> Result<Self, SlideMenuError> {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let header = doc.add_element(body, "header", &[])?;
        let mut togglers = Vec::with_capacity(config.togglers);
        for _ in 0..config.togglers {
            togglers.push(doc.add_element(header, "a", &[("class", "rs-slide-menu-toggler")])?);
        }
        let page = doc.add_element(body, "div", &[("id", "page")])?;
        let nav = doc.add_element(page, "nav", &[("id", "menu")])?;
        for _ in 0..8 {
            doc.add_element(nav, "a", &[("href", "#")])?;
        }
        doc.add_element(page, "main", &[])?;
        doc.add_display_rule("#menu", "none")?;

        let caps = Capabilities::standard();
        let sim = TransitionSimulator::new(&caps);
        let menu = SlideMenu::new(&mut doc, "#menu", config.menu.clone(), caps)?;
        Ok(Self {
            doc,
            sim,
            menu,
            togglers,
        })
    }

    fn click(&mut self, node: NodeId, now: Duration) -> Result<(), SlideMenuError> {
        for delivery in self.doc.dispatch("click", node) {
            self.menu
                .handle_event(&mut self.doc, delivery.listener, &delivery.event, now)?;
        }
        Ok(())
    }

    /// Jump from deadline to deadline until nothing is pending. Returns the
    /// final time and how many transition-end signals the menu consumed.
    fn settle(&mut self, mut now: Duration) -> Result<(Duration, u64), SlideMenuError> {
        let mut signals = 0;
        loop {
            self.sim.observe(&mut self.doc, now);
            let next = [self.menu.next_deadline(), self.sim.next_deadline()]
                .into_iter()
                .flatten()
                .min();
            let Some(next) = next else {
                return Ok((now, signals));
            };
            now = now.max(next);
            self.menu.advance(&mut self.doc, now)?;
            self.sim.observe(&mut self.doc, now);
            for delivery in self.sim.poll(&self.doc, now) {
                let outcome =
                    self.menu
                        .handle_event(&mut self.doc, delivery.listener, &delivery.event, now)?;
                if matches!(outcome, EventOutcome::Handled { .. }) {
                    signals += 1;
                }
            }
        }
    }
}

fn run_benchmark(config: &BenchConfig) -> Result<BenchStats, SlideMenuError> {
    let mut harness = Harness::new(config)?;
    let baseline = harness.doc.body_html();
    let listeners = harness.doc.listener_count();
    let mut stats = BenchStats::new();
    let mut now = Duration::ZERO;

    for cycle in 0..config.cycles {
        let cycle_start = Instant::now();
        let toggler = harness.togglers[cycle as usize % harness.togglers.len()];
        harness.click(toggler, now)?;
        let (opened_at, _) = harness.settle(now)?;
        if harness.menu.state() != MenuState::Open {
            stats.failed_opens += 1;
        }

        let backdrop = harness.menu.panel().backdrop;
        harness.click(backdrop, opened_at)?;
        let (closed_at, signals) = harness.settle(opened_at)?;
        if signals == 0 {
            stats.fallback_closes += 1;
        }
        if harness.doc.body_html() != baseline {
            stats.restore_mismatches += 1;
        }
        if harness.doc.listener_count() != listeners {
            stats.listener_leaks += 1;
        }

        stats.record_cycle(cycle_start.elapsed(), closed_at.saturating_sub(now));
        now = closed_at;
    }

    harness.menu.destroy(&mut harness.doc, now)?;
    stats.listeners_after_destroy = harness.doc.listener_count();
    stats.mark_completed();
    tracing::debug!(cycles = stats.cycles, "benchmark finished");
    Ok(stats)
}

struct BenchStats {
    start: Instant,
    completed_at: Option<Instant>,
    cycles: u64,
    total_cycle_time: Duration,
    fastest_cycle: Duration,
    slowest_cycle: Duration,
    simulated: Duration,
    failed_opens: u64,
    fallback_closes: u64,
    restore_mismatches: u64,
    listener_leaks: u64,
    listeners_after_destroy: usize,
}

impl BenchStats {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            completed_at: None,
            cycles: 0,
            total_cycle_time: Duration::ZERO,
            fastest_cycle: Duration::MAX,
            slowest_cycle: Duration::ZERO,
            simulated: Duration::ZERO,
            failed_opens: 0,
            fallback_closes: 0,
            restore_mismatches: 0,
            listener_leaks: 0,
            listeners_after_destroy: 0,
        }
    }

    fn elapsed(&self) -> Duration {
        match self.completed_at {
            Some(done) => done.duration_since(self.start),
            None => self.start.elapsed(),
        }
    }

    fn mark_completed(&mut self) {
        self.completed_at = Some(Instant::now());
    }

    fn record_cycle(&mut self, wall: Duration, simulated: Duration) {
        self.cycles = self.cycles.saturating_add(1);
        self.total_cycle_time += wall;
        self.simulated += simulated;
        self.fastest_cycle = self.fastest_cycle.min(wall);
        self.slowest_cycle = self.slowest_cycle.max(wall);
    }

    fn average_cycle_us(&self) -> f64 {
        if self.cycles == 0 {
            return 0.0;
        }
        self.total_cycle_time.as_secs_f64() / self.cycles as f64 * 1_000_000.0
    }

    fn fastest_cycle_us(&self) -> f64 {
        if self.cycles == 0 {
            return 0.0;
        }
        self.fastest_cycle.as_secs_f64() * 1_000_000.0
    }

    fn slowest_cycle_us(&self) -> f64 {
        self.slowest_cycle.as_secs_f64() * 1_000_000.0
    }

    fn healthy(&self) -> bool {
        self.failed_opens == 0
            && self.restore_mismatches == 0
            && self.listener_leaks == 0
            && self.listeners_after_destroy == 0
    }

    fn final_report(&self, config: &BenchConfig) -> String {
        let elapsed = self.elapsed().as_secs_f64();
        let cycles_per_second = if elapsed > 0.0 {
            self.cycles as f64 / elapsed
        } else {
            0.0
        };
        indoc::formatdoc!(
            r#"
            Slide bench {status}.
            Cycles: {cycles} (target {target}) in {elapsed:.3}s | {rate:.0} cycles/s
            Avg cycle: {avg:.2} us | Best: {best:.2} us | Worst: {worst:.2} us
            Simulated time: {simulated:.1}s at {duration} ms per transition
            Failed opens: {failed} | Fallback closes: {fallback}
            Restore mismatches: {mismatches} | Listener leaks: {leaks}
            Listeners after destroy: {after}
            "#,
            status = if self.healthy() { "passed" } else { "FAILED" },
            cycles = self.cycles,
            target = config.cycles,
            elapsed = elapsed,
            rate = cycles_per_second,
            avg = self.average_cycle_us(),
            best = self.fastest_cycle_us(),
            worst = self.slowest_cycle_us(),
            simulated = self.simulated.as_secs_f64(),
            duration = config.duration.as_millis(),
            failed = self.failed_opens,
            fallback = self.fallback_closes,
            mismatches = self.restore_mismatches,
            leaks = self.listener_leaks,
            after = self.listeners_after_destroy,
        )
    }
}
