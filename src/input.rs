use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Longest single poll while waiting out a tick, so signals raised outside
/// the event stream are still noticed promptly.
const POLL_SLICE: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Quit,
    Reseed,
    Resize,
}

/// Requests raised asynchronously (signal threads, terminal events) and
/// consumed by the loop at its next safe point.
#[derive(Clone, Debug, Default)]
pub(crate) struct Notices {
    quit: Arc<AtomicBool>,
    resize: Arc<AtomicBool>,
    reseed: Arc<AtomicBool>,
}

impl Notices {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn raise(&self, action: Action) {
        let flag = match action {
            Action::Quit => &self.quit,
            Action::Reseed => &self.reseed,
            Action::Resize => &self.resize,
        };
        flag.store(true, Ordering::SeqCst);
    }

    pub(crate) fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }

    pub(crate) fn take_resize(&self) -> bool {
        self.resize.swap(false, Ordering::SeqCst)
    }

    pub(crate) fn take_reseed(&self) -> bool {
        self.reseed.swap(false, Ordering::SeqCst)
    }

    fn pending(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
            || self.resize.load(Ordering::SeqCst)
            || self.reseed.load(Ordering::SeqCst)
    }
}

/// Route termination signals and SIGWINCH into `notices`.
///
/// A second termination signal while the first is still pending means the
/// loop is not getting back to its checks: restore the terminal here and exit.
/// Once the loop has begun its own restore, repeats are ignored so the two
/// threads never interleave escape sequences.
#[cfg(unix)]
pub(crate) fn install_signal_handlers(notices: &Notices) -> io::Result<()> {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM, SIGWINCH};
    use signal_hook::iterator::Signals;

    signal_hook::flag::register(SIGWINCH, Arc::clone(&notices.resize))?;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;
    let quit = Arc::clone(&notices.quit);
    std::thread::Builder::new()
        .name("signals".into())
        .spawn(move || {
            for sig in signals.forever() {
                let already_quitting = quit.swap(true, Ordering::SeqCst);
                if bail_out(already_quitting, crate::terminal::cleanup_started()) {
                    crate::terminal::restore_best_effort();
                    std::process::exit(128 + sig);
                }
            }
        })?;
    Ok(())
}

/// Whether a repeated termination signal should restore and exit from the
/// signal thread.
#[cfg_attr(not(unix), allow(dead_code))]
fn bail_out(already_quitting: bool, cleanup_started: bool) -> bool {
    already_quitting && !cleanup_started
}

#[cfg(not(unix))]
pub(crate) fn install_signal_handlers(_notices: &Notices) -> io::Result<()> {
    Ok(())
}

pub(crate) fn map_event(ev: &Event) -> Option<Action> {
    match ev {
        Event::Resize(_, _) => Some(Action::Resize),
        Event::Key(k) => map_key(k),
        _ => None,
    }
}

fn map_key(k: &KeyEvent) -> Option<Action> {
    if !matches!(k.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }
    match k.code {
        KeyCode::Char('c') | KeyCode::Char('C') if k.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::Quit)
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Reseed),
        _ => None,
    }
}

/// Sleep until `deadline` while pumping terminal events into `notices`.
/// Returns early as soon as any notice is pending.
pub(crate) fn wait_until(deadline: Instant, notices: &Notices) -> io::Result<()> {
    let mut timeout = Duration::ZERO;
    loop {
        while event::poll(timeout)? {
            let ev = event::read()?;
            if let Some(action) = map_event(&ev) {
                debug!(?action, "input");
                notices.raise(action);
            }
            timeout = Duration::ZERO;
        }
        if notices.pending() {
            return Ok(());
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        timeout = (deadline - now).min(POLL_SLICE);
    }
}
