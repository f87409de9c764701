use std::cell::OnceCell;

use crossterm::terminal;
use crossterm::tty::IsTty;
use tracing::debug;

use optree_core::{DEFAULT_WIDTH, StdTerminal, Terminal};

/// [`Terminal`] backed by `crossterm`.
///
/// Standard output is probed once; the answer is reused by later width
/// queries. Width comes from the attached terminal. When standard output is
/// not a terminal, or its size cannot be read, `$COLUMNS` and then
/// [`DEFAULT_WIDTH`] are used.
#[derive(Debug, Clone, Default)]
pub struct CrosstermTerminal {
    is_tty: OnceCell<bool>,
}

impl CrosstermTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn with_tty(is_tty: bool) -> Self {
        Self {
            is_tty: OnceCell::from(is_tty),
        }
    }
}

impl Terminal for CrosstermTerminal {
    fn stdout_is_terminal(&self) -> bool {
        *self.is_tty.get_or_init(|| std::io::stdout().is_tty())
    }

    fn width(&self) -> usize {
        if !self.stdout_is_terminal() {
            return StdTerminal.width();
        }
        match terminal::size() {
            Ok((columns, _)) if columns > 0 => usize::from(columns),
            Ok(_) => StdTerminal.width(),
            Err(err) => {
                debug!(error = %err, fallback = DEFAULT_WIDTH, "Failed to read terminal size");
                StdTerminal.width()
            }
        }
    }
}
