use crate::config::{Args, Settings};
use crate::cycle::{fingerprint, CycleDetector};
use crate::grid::Grid;
use crate::input::{self, Notices};
use crate::logging;
use crate::render::{DisplayMode, Renderer};
use crate::terminal::{TermSize, Terminal};
use anyhow::{Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use std::io::{self, Write};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of one pass through the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tick {
    /// The grid was drawn and advanced one generation.
    Drawn,
    /// The grid matches a configuration seen earlier in this run.
    Repeated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResetReason {
    Cycle,
    Resize,
    Reseed,
}

/// Everything one simulation run owns. Only the loop thread touches it;
/// asynchronous requests arrive through `Notices` and are applied between
/// ticks.
pub(crate) struct Session {
    settings: Settings,
    renderer: Renderer,
    rng: StdRng,
    grid: Grid,
    previous: Option<Grid>,
    detector: CycleDetector,
    generation: u64,
    runs: u64,
}

impl Session {
    pub(crate) fn new(settings: Settings, size: TermSize) -> Self {
        let renderer = Renderer::new(settings.mode, settings.color);
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let (rows, cols) = settings.mode.grid_dims(size.rows, size.cols);
        let grid = Grid::random(rows, cols, settings.probability, &mut rng);
        Self {
            settings,
            renderer,
            rng,
            grid,
            previous: None,
            detector: CycleDetector::new(),
            generation: 0,
            runs: 1,
        }
    }

    /// Check for a repeat, otherwise draw the grid and step it forward.
    pub(crate) fn tick<W: Write>(&mut self, out: &mut W) -> io::Result<Tick> {
        if self.detector.observe(fingerprint(&self.grid)) {
            return Ok(Tick::Repeated);
        }

        self.renderer.draw(out, &self.grid, self.previous.as_ref())?;

        let next = self.grid.next_generation();
        let drawn = std::mem::replace(&mut self.grid, next);
        if self.renderer.mode() == DisplayMode::HalfBlock {
            self.previous = Some(drawn);
        }
        self.generation += 1;
        Ok(Tick::Drawn)
    }

    /// Abandon the current run and seed a fresh grid at `size`.
    pub(crate) fn restart(&mut self, size: TermSize, reason: ResetReason) {
        let (rows, cols) = self.settings.mode.grid_dims(size.rows, size.cols);
        info!(
            ?reason,
            generations = self.generation,
            seen = self.detector.len(),
            rows,
            cols,
            "restarting run"
        );
        self.grid = Grid::random(rows, cols, self.settings.probability, &mut self.rng);
        self.previous = None;
        self.detector.reset();
        self.generation = 0;
        self.runs += 1;
    }

    pub(crate) fn runs(&self) -> u64 {
        self.runs
    }
}

pub(crate) fn run() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::from_args(&args)?;
    logging::init(args.log.as_deref())?;

    if let Some(name) = &settings.color_fallback {
        warn!(color = %name, "unknown color, using {}", settings.color.name());
    }
    info!(
        probability = settings.probability,
        interval_ms = settings.interval.as_millis() as u64,
        color = settings.color.name(),
        mode = ?settings.mode,
        seed = settings.seed,
        "starting"
    );

    let notices = Notices::new();
    input::install_signal_handlers(&notices).context("could not install signal handlers")?;

    let mut term = Terminal::begin().context("could not prepare terminal")?;
    let mut session = Session::new(settings, TermSize::query());

    let interval = session.settings.interval;
    let result = drive(
        &mut term.out,
        &mut session,
        &notices,
        TermSize::query,
        |notices: &Notices| input::wait_until(Instant::now() + interval, notices),
    );
    let ended = term.end();
    info!(runs = session.runs(), "stopped");
    finish(result, ended)
}

/// A loop error wins over a cleanup error; the latter is still logged.
fn finish(result: Result<()>, ended: io::Result<()>) -> Result<()> {
    match (result, ended) {
        (Err(e), Err(cleanup)) => {
            warn!(error = %cleanup, "terminal restore failed");
            Err(e)
        }
        (result, ended) => {
            result?;
            ended.context("could not restore terminal")
        }
    }
}

/// Run ticks until quit is requested. Pending resize or reseed notices are
/// applied before the next fingerprint; `pause` sleeps between ticks.
fn drive<W, S, P>(
    out: &mut W,
    session: &mut Session,
    notices: &Notices,
    size: S,
    mut pause: P,
) -> Result<()>
where
    W: Write,
    S: Fn() -> TermSize,
    P: FnMut(&Notices) -> io::Result<()>,
{
    while !notices.quit_requested() {
        let resized = notices.take_resize();
        let reseed = notices.take_reseed();
        if resized || reseed {
            let size = size();
            debug!(?size, resized, reseed, "notice");
            let reason = if resized {
                ResetReason::Resize
            } else {
                ResetReason::Reseed
            };
            session.restart(size, reason);
        } else if session.tick(out)? == Tick::Repeated {
            session.restart(size(), ResetReason::Cycle);
        }
        pause(notices)?;
    }
    Ok(())
}
