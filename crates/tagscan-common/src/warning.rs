//! Scanner diagnostics with colored terminal output.
//!
//! Messages are deduplicated so a malformed document cannot flood stderr
//! with the same complaint. A warning is identified by its component and
//! message only; where it happened is printed but never recorded, so the set
//! of recorded warnings stays bounded however many documents are scanned. The tokenizer reports stack overflows and
//! malformed tails here; the parser reports grammar errors when asked to.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Global mute switch, flipped by `--quiet` in the CLI.
static ENABLED: AtomicBool = AtomicBool::new(true);

fn warning_key(component: &str, message: &str) -> String {
    format!("[{component}] {message}")
}

/// Report a scanner diagnostic that happened at `location` (prints once per
/// unique message)
///
/// Muted warnings are still recorded, so [`has_warned`] keeps working. Later
/// occurrences of the same message at other locations are dropped.
///
/// # Example
/// ```ignore
/// warn_once("Tokenizer", "malformed input in OPEN_TAG context", format_args!("byte {}", 3));
/// ```
pub fn warn_once(component: &str, message: &str, location: fmt::Arguments<'_>) {
    if record(component, message) && ENABLED.load(Ordering::Relaxed) {
        eprintln!("{YELLOW}[tagscan {component}] ⚠ {message} (at {location}){RESET}");
    }
}

/// Remember a warning; true if it had not been seen before.
fn record(component: &str, message: &str) -> bool {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(warning_key(component, message))
}

/// Whether `message` has been reported for `component` since the last clear.
#[must_use]
pub fn has_warned(component: &str, message: &str) -> bool {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&warning_key(component, message)))
}

/// Clear all recorded warnings (call before scanning a new document)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

/// Turn terminal output of warnings on or off.
pub fn set_warnings_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}
