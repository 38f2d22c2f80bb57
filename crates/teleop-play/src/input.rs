//! Keyboard state polling

use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};

/// Source of instantaneous key state.
///
/// `refresh` is called once at the top of every frame; `is_pressed` is then
/// asked about each bound key.
pub trait Keyboard {
    /// Pull in whatever input arrived since the last frame
    fn refresh(&mut self) -> Result<()> {
        Ok(())
    }

    /// Whether `key` is held right now (case-insensitive)
    fn is_pressed(&self, key: char) -> bool;

    /// Whether the user asked to stop
    fn interrupt_requested(&self) -> bool {
        false
    }
}

/// How long a key counts as held without a release event.
///
/// The OS waits a while before auto-repeat kicks in, so the first press has
/// to bridge that delay; after that repeats arrive every few tens of
/// milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldWindows {
    /// Window after the initial press, longer than the auto-repeat delay
    pub first: Duration,
    /// Window after each auto-repeat
    pub repeat: Duration,
}

impl Default for HoldWindows {
    fn default() -> Self {
        Self {
            first: Duration::from_millis(600),
            repeat: Duration::from_millis(120),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct HeldKey {
    last_seen: Instant,
    repeating: bool,
}

/// Folds key events into a set of held keys.
///
/// Terminals that report key releases give exact state. Everywhere else a
/// key counts as held until its [`HoldWindows`] window has passed since the
/// last press or auto-repeat.
#[derive(Debug, Clone)]
pub struct KeyTracker {
    held: HashMap<char, HeldKey>,
    windows: HoldWindows,
    reports_release: bool,
    interrupted: bool,
}

impl KeyTracker {
    /// Create a tracker
    #[must_use]
    pub fn new(windows: HoldWindows, reports_release: bool) -> Self {
        Self {
            held: HashMap::new(),
            windows,
            reports_release,
            interrupted: false,
        }
    }

    /// Apply one key event observed at `now`
    pub fn apply(&mut self, key: KeyEvent, now: Instant) {
        let is_down = matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat);

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) && is_down => {
                self.interrupted = true;
            }
            KeyCode::Esc if is_down => self.interrupted = true,
            KeyCode::Char(c) => {
                let c = c.to_ascii_lowercase();
                if is_down {
                    self.held
                        .entry(c)
                        .and_modify(|key| {
                            key.last_seen = now;
                            key.repeating = true;
                        })
                        .or_insert(HeldKey {
                            last_seen: now,
                            repeating: false,
                        });
                } else {
                    self.held.remove(&c);
                }
            }
            _ => {}
        }
    }

    /// Drop keys whose hold window ran out
    pub fn expire(&mut self, now: Instant) {
        if self.reports_release {
            return;
        }
        let windows = self.windows;
        self.held.retain(|_, key| {
            let window = if key.repeating { windows.repeat } else { windows.first };
            now.saturating_duration_since(key.last_seen) <= window
        });
    }

    /// Whether `key` is currently held
    #[must_use]
    pub fn is_held(&self, key: char) -> bool {
        self.held.contains_key(&key.to_ascii_lowercase())
    }

    /// Whether Ctrl-C or Esc was seen
    #[must_use]
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }
}

/// Keyboard read from the controlling terminal.
///
/// Puts the terminal in raw mode for as long as it lives.
pub struct TerminalKeyboard {
    tracker: KeyTracker,
    pushed_flags: bool,
}

impl TerminalKeyboard {
    /// Take over the terminal
    pub fn new(windows: HoldWindows) -> Result<Self> {
        terminal::enable_raw_mode().context("failed to put terminal in raw mode")?;

        let mut keyboard = Self {
            tracker: KeyTracker::new(windows, false),
            pushed_flags: false,
        };

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .context("failed to enable key release reporting")?;
            keyboard.pushed_flags = true;
            keyboard.tracker.reports_release = true;
        }

        tracing::debug!(
            reports_release = keyboard.tracker.reports_release,
            first_hold = ?windows.first,
            repeat_hold = ?windows.repeat,
            "terminal keyboard ready"
        );
        Ok(keyboard)
    }
}

impl Keyboard for TerminalKeyboard {
    fn refresh(&mut self) -> Result<()> {
        let now = Instant::now();
        while event::poll(Duration::ZERO).context("failed to poll terminal input")? {
            if let Event::Key(key) = event::read().context("failed to read terminal input")? {
                self.tracker.apply(key, now);
            }
        }
        self.tracker.expire(now);
        Ok(())
    }

    fn is_pressed(&self, key: char) -> bool {
        self.tracker.is_held(key)
    }

    fn interrupt_requested(&self) -> bool {
        self.tracker.interrupted()
    }
}

impl Drop for TerminalKeyboard {
    fn drop(&mut self) {
        if self.pushed_flags {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = terminal::disable_raw_mode();
    }
}
