// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables read by hookchain are defined here.
//! Use these accessors instead of calling `std::env::var()` directly.

/// Generated env var name constants.
mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

pub use names::*;

use std::ffi::OsString;
use std::path::PathBuf;

/// `HOOKCHAIN_CONFIG_DIR`: directory holding the user settings file.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var(names::HOOKCHAIN_CONFIG_DIR)
        .ok()
        .map(PathBuf::from)
}

/// `HOOKCHAIN_DEFAULT_TIMEOUT_MS`: timeout for records that omit `timeoutMs`.
pub fn default_timeout_ms() -> Option<u64> {
    var_u64(names::HOOKCHAIN_DEFAULT_TIMEOUT_MS)
}

/// `HOOKCHAIN_LOG`: tracing filter directive for the binary.
pub fn log_filter() -> Option<String> {
    std::env::var(names::HOOKCHAIN_LOG).ok()
}

/// `HOME`: user's home directory.
pub fn home() -> Option<PathBuf> {
    std::env::var(names::HOME).ok().map(PathBuf::from)
}

/// `PATH`: raw search path used to resolve bare handler names.
pub fn search_path() -> Option<OsString> {
    std::env::var_os(names::PATH)
}

fn var_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| parse_u64(&v))
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
