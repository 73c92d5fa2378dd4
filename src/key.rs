// src/key.rs

//! Deterministic, filesystem-safe identifiers for command lines.
//!
//! Keys name the per-command lock and log files. They stay readable for
//! short commands; long ones are truncated and suffixed with a hash of the
//! full key so distinct commands keep distinct keys.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum length of a key produced by [`make_key`].
pub const MAX_KEY_LENGTH: usize = 128;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9A-Za-z_]+").unwrap());
static UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_{2,}").unwrap());

fn sub_non_words(s: &str) -> String {
    let s = NON_WORD.replace_all(s, "_");
    UNDERSCORES.replace_all(&s, "_").into_owned()
}

/// Produce the key for `command` invoked with `args`.
pub fn make_key(command: &str, args: &[String]) -> String {
    let mut key = command.to_string();
    let joined = sub_non_words(&args.join("_"));
    if !joined.is_empty() && joined != "_" {
        key.push('_');
        key.push_str(&joined);
    }
    let key = sub_non_words(&key);
    let key = key.trim_matches('_');

    if key.len() <= MAX_KEY_LENGTH {
        return key.to_string();
    }

    let hash = blake3::hash(key.as_bytes()).to_hex();
    // Sanitized keys are ASCII, so byte slicing is safe.
    format!("{}{}", &key[..MAX_KEY_LENGTH - hash.len()], hash)
}
