//! Compilation of `pattern` and `patternProperties` regular expressions.
//!
//! Patterns are compiled with the `regex` crate in its default Unicode mode.
//! The engine takes the pattern text without delimiters, so characters that
//! other engines reserve as delimiters (`#`, `/`, `~`) need no escaping and
//! match literally.
//!
//! The engine guarantees linear-time matching and so has no lookaround
//! (`(?=`, `(?!`, `(?<=`, `(?<!`) and no backreferences (`\1`). Patterns
//! using them fail to compile: validation then rejects every value with
//! `rest_invalid_pattern` and raises an invalid-pattern usage notice, and
//! the linter reports them as `E003`.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use regex::Regex;

/// Entries kept before the cache is flushed.
const CACHE_LIMIT: usize = 256;

type Cache = Mutex<HashMap<String, Result<Regex, String>>>;

fn cache() -> &'static Cache {
    static CACHE: OnceLock<Cache> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Compile a schema pattern, reusing an earlier compilation of the same text.
///
/// # Errors
///
/// Returns the compiler's message when the pattern is not a valid regex.
pub fn compile_pattern(text: &str) -> Result<Regex, String> {
    // A poisoned lock only means another thread panicked mid-insert; the map is still usable.
    let mut guard = match cache().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(hit) = guard.get(text) {
        return hit.clone();
    }

    let compiled = Regex::new(text).map_err(|e| e.to_string());
    if guard.len() >= CACHE_LIMIT {
        guard.clear();
    }
    guard.insert(text.to_string(), compiled.clone());
    compiled
}

/// Whether `subject` matches `pattern` anywhere (patterns are unanchored).
///
/// # Errors
///
/// Returns the compiler's message when the pattern is not a valid regex.
pub fn matches_pattern(pattern: &str, subject: &str) -> Result<bool, String> {
    compile_pattern(pattern).map(|re| re.is_match(subject))
}
