#![forbid(unsafe_code)]

//! Terminal lifecycle guard.
//!
//! [`TerminalSession`] enters raw mode on creation and restores the
//! terminal when dropped, on every exit path the process can take:
//!
//! - normal return and `?` propagation run [`Drop`];
//! - a panic runs the installed hook, which resets the terminal before the
//!   previous hook prints the message (the release profile aborts on panic,
//!   so the hook is the only cleanup that runs there);
//! - SIGINT and SIGTERM (unix) reset the terminal and exit with `128 + sig`.
//!
//! Enabled modes are kept as a stack and undone newest first; raw mode is
//! always the bottom entry.

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crossterm::{cursor, event as cte, execute, terminal};
use gitdash_core::event::Event;

/// Which optional terminal modes to enable.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Draw on the alternate screen and restore scrollback on exit.
    pub alternate_screen: bool,
    /// Deliver pastes as a single [`Event::Paste`].
    pub bracketed_paste: bool,
    /// Report terminal focus changes.
    pub focus_events: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            bracketed_paste: true,
            focus_events: false,
        }
    }
}

/// A terminal mode that has to be undone on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Raw,
    AlternateScreen,
    BracketedPaste,
    FocusEvents,
    HiddenCursor,
}

impl Mode {
    /// Every mode in the order [`TerminalSession::new`] enables them.
    const ENABLE_ORDER: [Mode; 5] = [
        Mode::Raw,
        Mode::AlternateScreen,
        Mode::BracketedPaste,
        Mode::FocusEvents,
        Mode::HiddenCursor,
    ];

    fn wanted(self, options: &SessionOptions) -> bool {
        match self {
            Mode::Raw | Mode::HiddenCursor => true,
            Mode::AlternateScreen => options.alternate_screen,
            Mode::BracketedPaste => options.bracketed_paste,
            Mode::FocusEvents => options.focus_events,
        }
    }

    fn enable(self, out: &mut impl Write) -> io::Result<()> {
        match self {
            Mode::Raw => terminal::enable_raw_mode(),
            Mode::AlternateScreen => execute!(out, terminal::EnterAlternateScreen),
            Mode::BracketedPaste => execute!(out, cte::EnableBracketedPaste),
            Mode::FocusEvents => execute!(out, cte::EnableFocusChange),
            Mode::HiddenCursor => execute!(out, cursor::Hide),
        }
    }

    fn disable(self, out: &mut impl Write) -> io::Result<()> {
        match self {
            Mode::Raw => terminal::disable_raw_mode(),
            Mode::AlternateScreen => execute!(out, terminal::LeaveAlternateScreen),
            Mode::BracketedPaste => execute!(out, cte::DisableBracketedPaste),
            Mode::FocusEvents => execute!(out, cte::DisableFocusChange),
            Mode::HiddenCursor => execute!(out, cursor::Show),
        }
    }
}

/// Raw-mode terminal that cleans up after itself.
#[derive(Debug)]
pub struct TerminalSession {
    options: SessionOptions,
    enabled: Vec<Mode>,
    #[cfg(unix)]
    signals: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode and enable the requested modes.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        let mut session = Self {
            options,
            enabled: Vec::with_capacity(Mode::ENABLE_ORDER.len()),
            #[cfg(unix)]
            signals: None,
        };
        // On error `session` drops here and undoes whatever was enabled.
        #[cfg(unix)]
        {
            session.signals = Some(SignalGuard::install()?);
        }
        let mut stdout = io::stdout();
        for mode in Mode::ENABLE_ORDER {
            if mode.wanted(&session.options) {
                mode.enable(&mut stdout)?;
                session.enabled.push(mode);
            }
        }
        tracing::info!(modes = ?session.enabled, "terminal session started");
        Ok(session)
    }

    /// Current terminal size (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Whether input arrives within `timeout`.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        cte::poll(timeout)
    }

    /// Read the next input. `None` for input the dashboard does not use.
    pub fn read_event(&self) -> io::Result<Option<Event>> {
        cte::read().map(Event::from_crossterm)
    }

    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    fn restore(&mut self) {
        #[cfg(unix)]
        drop(self.signals.take());

        let mut stdout = io::stdout();
        while let Some(mode) = self.enabled.pop() {
            if let Err(e) = mode.disable(&mut stdout) {
                tracing::warn!(?mode, error = %e, "failed to restore terminal mode");
            }
        }
        let _ = stdout.flush();
        tracing::info!("terminal restored");
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.restore();
    }
}

fn install_panic_hook() {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    INSTALLED.get_or_init(|| {
        let chained = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            force_restore();
            chained(info);
        }));
    });
}

/// Undo every mode regardless of what was enabled. Used where the session
/// value is out of reach.
fn force_restore() {
    let mut stdout = io::stdout();
    for mode in Mode::ENABLE_ORDER.iter().rev() {
        let _ = mode.disable(&mut stdout);
    }
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    watcher: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn install() -> io::Result<Self> {
        use signal_hook::consts::signal::{SIGINT, SIGTERM};

        let mut signals =
            signal_hook::iterator::Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let watcher = std::thread::Builder::new()
            .name("gitdash-signals".into())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    tracing::warn!(signal, "terminated by signal");
                    force_restore();
                    std::process::exit(128 + signal);
                }
            })?;
        Ok(Self {
            handle,
            watcher: Some(watcher),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(watcher) = self.watcher.take() {
            let _ = watcher.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_modes_follow_options() {
        let all_off = SessionOptions {
            alternate_screen: false,
            bracketed_paste: false,
            focus_events: false,
        };
        let wanted: Vec<Mode> = Mode::ENABLE_ORDER
            .into_iter()
            .filter(|m| m.wanted(&all_off))
            .collect();
        assert_eq!(wanted, [Mode::Raw, Mode::HiddenCursor]);

        let defaults = SessionOptions::default();
        assert!(Mode::AlternateScreen.wanted(&defaults));
        assert!(!Mode::FocusEvents.wanted(&defaults));
    }

    #[test]
    fn raw_mode_is_enabled_first() {
        assert_eq!(Mode::ENABLE_ORDER[0], Mode::Raw);
    }
}
