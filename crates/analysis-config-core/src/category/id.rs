//! Deterministic category ids
//!
//! Ids are derived from a hash over the config identity and the category
//! name, then shifted above a threshold so they never clash with small,
//! manually assigned ids.

use sha2::{Digest, Sha256};

use crate::error::{AnalysisConfigError, Result};
use crate::model::Config;

/// Default number of hex digits kept from the hash.
pub const DEFAULT_HASH_LEN: usize = 7;

/// Largest hash length whose offset id still fits into a `u64`.
pub const MAX_HASH_LEN: usize = 15;

/// First `len` hex digits of the SHA-256 digest of `input`.
pub fn create_hash(input: &str, len: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(len);
    digest
}

/// Create the id of a category named `name` in `config`.
///
/// The id depends only on the config name and id, the category name and the
/// optional `salt`. Collisions are unlikely but possible; pass a different
/// `salt` to move a category away from a colliding id.
///
/// With the default `hash_len` of 7 ids lie in `1_000_000_000..=1_268_435_455`
/// and therefore need 64-bit storage.
pub fn create_category_id(
    config: &Config,
    name: &str,
    hash_len: usize,
    salt: Option<&str>,
) -> Result<u64> {
    if hash_len == 0 || hash_len > MAX_HASH_LEN {
        return Err(AnalysisConfigError::InvalidHashLength { hash_len });
    }

    let input = hash_input(&config.name, config.id, name, salt);
    let hash = create_hash(&input, hash_len);
    let value = hash
        .chars()
        .filter_map(|c| c.to_digit(16))
        .fold(0u64, |acc, digit| acc * 16 + u64::from(digit));

    Ok(value + id_offset(hash_len))
}

/// `10^d` where `d` is the number of decimal digits of the largest
/// `hash_len`-digit hex value.
fn id_offset(hash_len: usize) -> u64 {
    let max = u64::MAX >> (64 - 4 * hash_len as u32);
    10u64.pow(max.to_string().len() as u32)
}

/// Canonical tuple rendering hashed for an id, e.g. `('cfg', 1, 'e__1j', None)`.
fn hash_input(config_name: &str, config_id: u64, name: &str, salt: Option<&str>) -> String {
    let salt = salt.map(quoted).unwrap_or_else(|| "None".to_string());
    format!(
        "({}, {}, {}, {})",
        quoted(config_name),
        config_id,
        quoted(name),
        salt
    )
}

/// Quote `value` the way a Python `repr` of a string does.
///
/// Double quotes are used when the value contains `'` but no `"`.
fn quoted(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
