// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for configuration and dispatch.
//!
//! Configuration-time errors (`ConfigError`, `MatchCompileError`) never
//! escape composition; they become diagnostics that exclude one hook.
//! Dispatch-time errors (`HandlerFailure`) terminate a chain and are resolved
//! per event kind.

use crate::event::EventKind;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A matcher pattern that could not be compiled.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid matcher `{pattern}`: {detail}")]
pub struct MatchCompileError {
    pub pattern: String,
    pub detail: String,
}

impl MatchCompileError {
    pub fn new(pattern: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            detail: detail.into(),
        }
    }
}

/// A hook record rejected at registration.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown event kind `{0}`")]
    UnknownEvent(String),

    #[error("matcher must not be empty")]
    EmptyMatcher,

    #[error(transparent)]
    Matcher(#[from] MatchCompileError),

    #[error("handler `{path}` could not be resolved: {detail}")]
    UnresolvedHandler { path: String, detail: String },

    #[error("priority must be an integer, got {0}")]
    InvalidPriority(String),

    #[error("timeoutMs must be a positive integer, got {0}")]
    InvalidTimeout(String),

    #[error("malformed hook record: {0}")]
    MalformedRecord(String),

    #[error("failed to load {}: {detail}", .path.display())]
    SourceUnreadable { path: PathBuf, detail: String },
}

/// A payload that could not be serialized or parsed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    NotJson(String),

    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("payload names event {found}, expected \"{expected}\"")]
    KindMismatch { expected: EventKind, found: String },

    #[error("payload does not match the event schema: {0}")]
    Schema(String),

    #[error("failed to serialize payload: {0}")]
    Serialize(String),
}

/// Failure to run a handler at all.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvokeError {
    #[error("failed to spawn handler: {0}")]
    Spawn(String),

    #[error("handler I/O error: {0}")]
    Io(String),

    #[error("handler timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// Why a handler terminated its chain with an error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HandlerFailure {
    /// Exceeded its `timeoutMs`; the process was killed.
    #[error("handler timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Exit code outside {0, 1, 2}, or terminated by a signal.
    #[error("handler exited with {}{}", exit_label(.exit_code), stderr_suffix(.stderr))]
    Crash {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Exit 0 with output that is not a valid replacement payload.
    #[error("handler returned a malformed payload: {0}")]
    MalformedOutput(String),

    /// Explicit exit 1.
    #[error("handler rejected the event{}", stderr_suffix(.0))]
    Rejected(String),

    /// Could not be launched or talked to.
    #[error("handler could not be run: {0}")]
    Launch(String),
}

impl HandlerFailure {
    /// Taxonomy name used in logs.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "HandlerTimeout",
            Self::Crash { .. } | Self::MalformedOutput(_) | Self::Launch(_) => "HandlerCrash",
            Self::Rejected(_) => "ChainError",
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (killed by signal)".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// The dispatch was cancelled before the chain resolved.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("dispatch cancelled")]
pub struct Cancelled;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
