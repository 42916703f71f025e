use crossterm::{
    cursor, execute, queue,
    style::ResetColor,
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Set once a restore sequence has begun writing to stdout.
static CLEANUP_STARTED: AtomicBool = AtomicBool::new(false);

pub(crate) fn cleanup_started() -> bool {
    CLEANUP_STARTED.load(Ordering::SeqCst)
}

/// Terminal size in character cells, never smaller than 1x1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TermSize {
    pub(crate) cols: u16,
    pub(crate) rows: u16,
}

impl TermSize {
    pub(crate) fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
        }
    }

    pub(crate) fn query() -> Self {
        match terminal::size() {
            Ok((c, r)) => Self::new(c, r),
            Err(_) => Self::new(1, 1),
        }
    }
}

/// Owns stdout for the lifetime of the visualizer. Dropping it restores the
/// terminal even when the loop bails out with an error or a panic unwinds.
pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    active: bool,
}

impl Terminal {
    pub(crate) fn begin() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut term = Self {
            out: io::stdout(),
            active: true,
        };
        execute!(
            term.out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )?;
        Ok(term)
    }

    /// Clear screen and scrollback, show the cursor and leave raw mode.
    /// Safe to call more than once.
    pub(crate) fn end(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        CLEANUP_STARTED.store(true, Ordering::SeqCst);
        queue!(
            self.out,
            EndSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            Clear(ClearType::Purge),
            cursor::MoveTo(0, 0),
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active && self.end().is_err() {
            restore_best_effort();
        }
    }
}

/// Restore without a `Terminal` at hand, ignoring every error.
pub(crate) fn restore_best_effort() {
    CLEANUP_STARTED.store(true, Ordering::SeqCst);
    let mut out = io::stdout();
    let _ = queue!(
        out,
        EndSynchronizedUpdate,
        ResetColor,
        Clear(ClearType::All),
        Clear(ClearType::Purge),
        cursor::Show,
        EnableLineWrap,
        LeaveAlternateScreen
    );
    let _ = out.flush();
    let _ = terminal::disable_raw_mode();
}
