//! Invocation configuration
//!
//! Values arrive from command-line flags or their `KUBERPAK_*` environment
//! fallbacks (see [`crate::cli`]). This module validates them and fills in
//! defaults.

use std::path::{Path, PathBuf};

use crate::domain::chunk::{CHUNK_HASH_PREFIX_LEN, CHUNK_NAME_PREFIX};
use crate::error::Result;
use crate::error::config::invalid;

/// Environment variable naming the store root
pub const STORE_DIR_ENV: &str = "KUBERPAK_STORE_DIR";

const APP_DIR: &str = "kuberpak";
const STORE_SUBDIR: &str = "store";
const MAX_NAME_LEN: usize = 253;

/// Longest bundle name whose chunk names still fit [`MAX_NAME_LEN`]
pub const MAX_BUNDLE_NAME_LEN: usize =
    MAX_NAME_LEN - CHUNK_NAME_PREFIX.len() - 1 - CHUNK_HASH_PREFIX_LEN;

/// Store root: the explicit value if given, else `<data dir>/kuberpak/store`
pub fn store_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    dirs::data_dir()
        .map(|d| d.join(APP_DIR).join(STORE_SUBDIR))
        .ok_or_else(|| invalid(format!("no data directory available; set {STORE_DIR_ENV}")))
}

/// Check that `value` is a usable object name: non-empty, lowercase
/// alphanumerics, `-` and `.`, starting and ending alphanumeric.
pub fn validate_name(field: &str, value: &str) -> Result<()> {
    validate_name_within(field, value, MAX_NAME_LEN)
}

/// Like [`validate_name`], but short enough to derive chunk names from
pub fn validate_bundle_name(value: &str) -> Result<()> {
    validate_name_within("bundle name", value, MAX_BUNDLE_NAME_LEN)
}

fn validate_name_within(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.is_empty() {
        return Err(invalid(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(invalid(format!(
            "{field} '{value}' is longer than {max_len} characters"
        )));
    }

    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.';
    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    let starts_ok = value.chars().next().is_some_and(alnum);
    let ends_ok = value.chars().last().is_some_and(alnum);
    if !value.chars().all(allowed) || !starts_ok || !ends_ok {
        return Err(invalid(format!(
            "{field} '{value}' must consist of lowercase alphanumerics, '-' or '.', \
             and start and end with an alphanumeric"
        )));
    }
    Ok(())
}

/// Check that `dir` exists and is a directory
pub fn validate_manifests_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(invalid(format!(
            "manifests directory '{}' does not exist or is not a directory",
            dir.display()
        )));
    }
    Ok(())
}
