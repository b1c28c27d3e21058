#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! Everything above this crate sees terminal input through these types rather
//! than through crossterm directly, so headless sessions (tests, key replay)
//! can feed the exact same values the terminal loop does.
//!
//! # Key names
//!
//! Keys have a short textual form used by status hints and replay scripts:
//! `enter`, `esc`, `tab`, `backspace`, `up`, `f5`, `q`, `ctrl+c`, `space`.
//! [`KeyEvent`]'s `Display` and `FromStr` implementations agree on it.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
#[cfg(not(target_arch = "wasm32"))]
use crossterm::event as cte;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// Terminal was resized.
    Resize {
        /// New terminal width in columns.
        width: u16,
        /// New terminal height in rows.
        height: u16,
    },

    /// Bracketed paste.
    Paste(String),

    /// Focus gained (`true`) or lost (`false`) by the terminal window.
    Focus(bool),

    /// Loop heartbeat, fired when no input arrived within the poll window.
    Tick,
}

impl Event {
    /// Convert a Crossterm event into a gitdash [`Event`].
    ///
    /// Mouse input is not used by the dashboard and maps to `None`.
    #[must_use]
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        match event {
            cte::Event::Key(key) => map_key_event(key).map(Event::Key),
            cte::Event::Mouse(_) => None,
            cte::Event::Resize(width, height) => Some(Event::Resize { width, height }),
            cte::Event::Paste(text) => Some(Event::Paste(text)),
            cte::Event::FocusGained => Some(Event::Focus(true)),
            cte::Event::FocusLost => Some(Event::Focus(false)),
        }
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt modifier is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Whether this event should drive bindings. Releases never do.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        !matches!(self.kind, KeyEventKind::Release)
    }

    /// The printable character this key would insert into a text buffer, if any.
    #[must_use]
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if !self.ctrl() && !self.alt() && !c.is_control() => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl() {
            f.write_str("ctrl+")?;
        }
        if self.alt() {
            f.write_str("alt+")?;
        }
        if self.modifiers.contains(Modifiers::SHIFT) && !matches!(self.code, KeyCode::Char(_)) {
            f.write_str("shift+")?;
        }
        write!(f, "{}", self.code)
    }
}

impl FromStr for KeyEvent {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseKeyError::Empty);
        }

        let mut modifiers = Modifiers::NONE;
        let mut rest = trimmed;
        // A lone "+" is the plus key, not a separator.
        while let Some((prefix, tail)) = rest.split_once('+') {
            if tail.is_empty() {
                break;
            }
            match prefix.to_ascii_lowercase().as_str() {
                "ctrl" | "c" => modifiers |= Modifiers::CTRL,
                "alt" | "m" => modifiers |= Modifiers::ALT,
                "shift" | "s" => modifiers |= Modifiers::SHIFT,
                _ => return Err(ParseKeyError::UnknownModifier(prefix.to_string())),
            }
            rest = tail;
        }

        let code = rest.parse::<KeyCode>()?;
        Ok(KeyEvent::new(code).with_modifiers(modifiers))
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Escape key.
    Escape,
    /// Backspace key.
    Backspace,
    /// Tab key.
    Tab,
    /// Shift+Tab (back-tab).
    BackTab,
    /// Delete key.
    Delete,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page Up key.
    PageUp,
    /// Page Down key.
    PageDown,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Function key (F1-F24).
    F(u8),
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Escape => f.write_str("esc"),
            KeyCode::Backspace => f.write_str("backspace"),
            KeyCode::Tab => f.write_str("tab"),
            KeyCode::BackTab => f.write_str("backtab"),
            KeyCode::Delete => f.write_str("delete"),
            KeyCode::Home => f.write_str("home"),
            KeyCode::End => f.write_str("end"),
            KeyCode::PageUp => f.write_str("pgup"),
            KeyCode::PageDown => f.write_str("pgdn"),
            KeyCode::Up => f.write_str("up"),
            KeyCode::Down => f.write_str("down"),
            KeyCode::Left => f.write_str("left"),
            KeyCode::Right => f.write_str("right"),
            KeyCode::F(n) => write!(f, "f{n}"),
        }
    }
}

impl FromStr for KeyCode {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(KeyCode::Char(c));
        }

        let lower = s.to_ascii_lowercase();
        let code = match lower.as_str() {
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Escape,
            "backspace" => KeyCode::Backspace,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "delete" | "del" => KeyCode::Delete,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pgup" | "pageup" => KeyCode::PageUp,
            "pgdn" | "pagedown" => KeyCode::PageDown,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "space" => KeyCode::Char(' '),
            other => match other.strip_prefix('f').map(str::parse::<u8>) {
                Some(Ok(n)) if (1..=24).contains(&n) => KeyCode::F(n),
                _ => return Err(ParseKeyError::UnknownKey(s.to_string())),
            },
        };
        Ok(code)
    }
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,
    /// Key is being held (repeat event).
    Repeat,
    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Failure to parse a key name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseKeyError {
    /// Empty input.
    Empty,
    /// Unrecognized key name.
    UnknownKey(String),
    /// Unrecognized modifier prefix.
    UnknownModifier(String),
}

impl fmt::Display for ParseKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseKeyError::Empty => f.write_str("empty key name"),
            ParseKeyError::UnknownKey(name) => write!(f, "unknown key: {name}"),
            ParseKeyError::UnknownModifier(name) => write!(f, "unknown modifier: {name}"),
        }
    }
}

impl std::error::Error for ParseKeyError {}

#[cfg(not(target_arch = "wasm32"))]
fn map_key_event(event: cte::KeyEvent) -> Option<KeyEvent> {
    let code = map_key_code(event.code)?;
    let modifiers = map_modifiers(event.modifiers);
    let kind = match event.kind {
        cte::KeyEventKind::Press => KeyEventKind::Press,
        cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
        cte::KeyEventKind::Release => KeyEventKind::Release,
    };
    Some(KeyEvent {
        code,
        modifiers,
        kind,
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn map_key_code(code: cte::KeyCode) -> Option<KeyCode> {
    match code {
        cte::KeyCode::Backspace => Some(KeyCode::Backspace),
        cte::KeyCode::Enter => Some(KeyCode::Enter),
        cte::KeyCode::Left => Some(KeyCode::Left),
        cte::KeyCode::Right => Some(KeyCode::Right),
        cte::KeyCode::Up => Some(KeyCode::Up),
        cte::KeyCode::Down => Some(KeyCode::Down),
        cte::KeyCode::Home => Some(KeyCode::Home),
        cte::KeyCode::End => Some(KeyCode::End),
        cte::KeyCode::PageUp => Some(KeyCode::PageUp),
        cte::KeyCode::PageDown => Some(KeyCode::PageDown),
        cte::KeyCode::Tab => Some(KeyCode::Tab),
        cte::KeyCode::BackTab => Some(KeyCode::BackTab),
        cte::KeyCode::Delete => Some(KeyCode::Delete),
        cte::KeyCode::F(n) => Some(KeyCode::F(n)),
        cte::KeyCode::Char(c) => Some(KeyCode::Char(c)),
        cte::KeyCode::Esc => Some(KeyCode::Escape),
        _ => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn map_modifiers(modifiers: cte::KeyModifiers) -> Modifiers {
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(cte::KeyModifiers::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(cte::KeyModifiers::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(cte::KeyModifiers::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    mapped
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crossterm::event as ct_event;

    #[test]
    fn key_event_is_char() {
        let event = KeyEvent::new(KeyCode::Char('q'));
        assert!(event.is_char('q'));
        assert!(!event.is_char('x'));
    }

    #[test]
    fn printable_ignores_control_chords() {
        assert_eq!(KeyEvent::new(KeyCode::Char('a')).printable(), Some('a'));
        assert_eq!(
            KeyEvent::new(KeyCode::Char('c'))
                .with_modifiers(Modifiers::CTRL)
                .printable(),
            None
        );
        assert_eq!(KeyEvent::new(KeyCode::Enter).printable(), None);
    }

    #[test]
    fn release_is_not_actionable() {
        let press = KeyEvent::new(KeyCode::Enter);
        assert!(press.is_actionable());
        assert!(!press.with_kind(KeyEventKind::Release).is_actionable());
    }

    #[test]
    fn display_names() {
        assert_eq!(KeyEvent::new(KeyCode::Escape).to_string(), "esc");
        assert_eq!(KeyEvent::new(KeyCode::Enter).to_string(), "enter");
        assert_eq!(KeyEvent::new(KeyCode::Char(' ')).to_string(), "space");
        assert_eq!(
            KeyEvent::new(KeyCode::Char('c'))
                .with_modifiers(Modifiers::CTRL)
                .to_string(),
            "ctrl+c"
        );
    }

    #[test]
    fn parse_names_and_chords() {
        assert_eq!("enter".parse::<KeyEvent>(), Ok(KeyEvent::new(KeyCode::Enter)));
        assert_eq!("Esc".parse::<KeyEvent>(), Ok(KeyEvent::new(KeyCode::Escape)));
        assert_eq!("q".parse::<KeyEvent>(), Ok(KeyEvent::new(KeyCode::Char('q'))));
        assert_eq!("f5".parse::<KeyEvent>(), Ok(KeyEvent::new(KeyCode::F(5))));
        assert_eq!(
            "ctrl+c".parse::<KeyEvent>(),
            Ok(KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL))
        );
        assert_eq!("+".parse::<KeyEvent>(), Ok(KeyEvent::new(KeyCode::Char('+'))));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("".parse::<KeyEvent>(), Err(ParseKeyError::Empty));
        assert!(matches!(
            "hyper+x".parse::<KeyEvent>(),
            Err(ParseKeyError::UnknownModifier(_))
        ));
        assert!(matches!(
            "enterr".parse::<KeyEvent>(),
            Err(ParseKeyError::UnknownKey(_))
        ));
        assert!(matches!(
            "f99".parse::<KeyEvent>(),
            Err(ParseKeyError::UnknownKey(_))
        ));
    }

    #[test]
    fn crossterm_key_maps() {
        let ct = ct_event::KeyEvent::new(ct_event::KeyCode::Esc, ct_event::KeyModifiers::NONE);
        let mapped = Event::from_crossterm(ct_event::Event::Key(ct));
        assert_eq!(mapped, Some(Event::Key(KeyEvent::new(KeyCode::Escape))));
    }

    #[test]
    fn crossterm_modifiers_map() {
        let ct = ct_event::KeyEvent::new(
            ct_event::KeyCode::Char('x'),
            ct_event::KeyModifiers::CONTROL | ct_event::KeyModifiers::ALT,
        );
        let Some(Event::Key(key)) = Event::from_crossterm(ct_event::Event::Key(ct)) else {
            panic!("expected key event");
        };
        assert!(key.ctrl());
        assert!(key.alt());
    }

    #[test]
    fn crossterm_resize_maps() {
        let mapped = Event::from_crossterm(ct_event::Event::Resize(100, 40));
        assert_eq!(
            mapped,
            Some(Event::Resize {
                width: 100,
                height: 40
            })
        );
    }

    #[test]
    fn modifiers_default() {
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }
}
