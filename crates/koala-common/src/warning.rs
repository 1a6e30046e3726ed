//! Deduplicated engine warnings.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! The selector engine and its hosts use it to report conditions worth
//! seeing once, such as cache saturation, without flooding the log on every
//! query.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a condition once per unique `(component, message)` pair.
///
/// The warning is emitted through [`log::warn!`] with the component as the
/// log target prefix, so hosts decide where it ends up.
///
/// # Example
/// ```
/// use koala_common::warning::{warn_once, was_warned};
///
/// warn_once("Selectors", "selector cache reached capacity 1024");
/// assert!(was_warned("Selectors", "selector cache reached capacity 1024"));
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_emit = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_emit {
        log::warn!(target: "koala", "[Koala {component}] {message}");
    }
}

/// Returns `true` if this exact warning has already been emitted.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key))
}

/// Clear all recorded warnings (call when a host starts a fresh session)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
