//! Terminal output.
//!
//! - `log!("module"; ...)` prints one line behind a colored `[module]` tag
//! - `debug!` does the same, only under `--verbose`
//! - `ProgressLine` keeps a batch's counters on the last line while logs
//!   scroll above it
//!
//! # Example
//!
//! ```ignore
//! // Simple logging
//! log!("done"; "edit-copy@16 in {}ms", elapsed);
//!
//! // Progress line for one cookbook
//! let progress = ProgressLine::new("breeze", &[("units", 40)]);
//! progress.inc("units");
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Active progress bar count (for log coordination)
static BAR_COUNT: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
#[allow(clippy::cast_possible_truncation)] // Safe: bars count is always small
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();

    let bar_count = BAR_COUNT.load(Ordering::SeqCst);
    if bar_count > 0 {
        execute!(stdout, cursor::MoveUp(bar_count as u16)).ok();
        execute!(stdout, Clear(ClearType::FromCursorDown)).ok();
    } else {
        execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    }

    writeln!(stdout, "{prefix} {message}").ok();

    if bar_count > 0 {
        for _ in 0..bar_count {
            writeln!(stdout).ok();
        }
    }

    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "done" => prefix.green().bold().to_string(),
        "fail" => prefix.red().bold().to_string(),
        "skip" | "warning" => prefix.yellow().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Progress Line (single-line counters)
// ============================================================================

/// Counters of one batch, redrawn in place on a single line
///
/// Displays: `[breeze] units(42/69)`
///
/// Workers never wait on the terminal: a refresh is dropped when another
/// thread holds the display lock.
pub struct ProgressLine {
    label: String,
    counters: Vec<Counter>,
    lock: Mutex<()>,
}

struct Counter {
    name: &'static str,
    total: usize,
    current: AtomicUsize,
}

impl ProgressLine {
    /// Create a new progress display prefixed with `[label]`.
    ///
    /// Only includes counters with total > 0.
    pub fn new(label: impl Into<String>, items: &[(&'static str, usize)]) -> Self {
        let counters: Vec<_> = items
            .iter()
            .filter(|(_, total)| *total > 0)
            .map(|(name, total)| Counter {
                name,
                total: *total,
                current: AtomicUsize::new(0),
            })
            .collect();

        BAR_COUNT.store(1, Ordering::SeqCst);

        let progress = Self {
            label: label.into(),
            counters,
            lock: Mutex::new(()),
        };
        progress.display();
        progress
    }

    /// Increment the counter with the given name.
    ///
    /// Non-blocking: if display lock is held, skips refresh.
    #[inline]
    pub fn inc(&self, name: &str) {
        if let Some(counter) = self.counters.iter().find(|c| c.name == name) {
            counter.current.fetch_add(1, Ordering::Relaxed);
            if self.lock.try_lock().is_some() {
                self.display();
            }
        }
    }

    /// `name(current/total)` for every counter.
    fn line(&self) -> String {
        self.counters
            .iter()
            .map(|counter| {
                let current = counter.current.load(Ordering::Relaxed);
                format!("{}({}/{})", counter.name, current, counter.total)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Redraw the line in place, ending it when `done`.
    fn display(&self) {
        self.redraw(false);
    }

    fn redraw(&self, done: bool) {
        let prefix = colorize_prefix(&self.label, "");
        let line = self.line();

        let mut stdout = stdout().lock();
        clear_line(&mut stdout);
        if done {
            writeln!(stdout, "{prefix} {line}").ok();
        } else {
            write!(stdout, "{prefix} {line}").ok();
        }
        stdout.flush().ok();
    }

    /// Leave the final counts on screen and release the line.
    pub fn finish(self) {
        BAR_COUNT.store(0, Ordering::SeqCst);
        {
            let _guard = self.lock.lock(); // pending redraws first
            self.redraw(true);
        }
        std::mem::forget(self);
    }
}

impl Drop for ProgressLine {
    /// An unfinished line is wiped.
    fn drop(&mut self) {
        BAR_COUNT.store(0, Ordering::SeqCst);
        let mut stdout = stdout().lock();
        clear_line(&mut stdout);
        stdout.flush().ok();
    }
}

fn clear_line(stdout: &mut impl Write) {
    execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
}

// ============================================================================
// Tests
// ============================================================================
