// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal output for the CLI.
//!
//! Diagnostic helpers color errors and warnings when stderr is a terminal.
//! Renderers produce the plain-text forms of the inspection reports; every
//! report also serializes to JSON for `--json`.

use crate::definition::HookDefinition;
use crate::diagnostic::HookDiagnostic;
use crate::inspect::{HookListing, MatchExplanation};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

/// Print an error message to stderr.
///
/// Displays in red when stderr is a terminal, plain text otherwise.
pub fn print_error(msg: impl std::fmt::Display) {
    let is_tty = io::stderr().is_terminal();
    write_error(&mut io::stderr(), msg, is_tty);
}

fn write_error<W: Write>(writer: &mut W, msg: impl std::fmt::Display, is_terminal: bool) {
    if is_terminal {
        let _ = writeln!(writer, "\x1b[31mError: {}\x1b[0m", msg);
    } else {
        let _ = writeln!(writer, "Error: {}", msg);
    }
}

/// Print a warning message to stderr.
///
/// Displays in yellow when stderr is a terminal, plain text otherwise.
pub fn print_warning(msg: impl std::fmt::Display) {
    let is_tty = io::stderr().is_terminal();
    write_warning(&mut io::stderr(), msg, is_tty);
}

fn write_warning<W: Write>(writer: &mut W, msg: impl std::fmt::Display, is_terminal: bool) {
    if is_terminal {
        let _ = writeln!(writer, "\x1b[33mWarning: {}\x1b[0m", msg);
    } else {
        let _ = writeln!(writer, "Warning: {}", msg);
    }
}

/// Output of `hookchain list`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReport {
    pub listings: Vec<HookListing>,
    /// Exclusions not tied to an event kind (unreadable files, unknown events)
    pub unattributed: Vec<HookDiagnostic>,
}

/// Output of `hookchain invoke`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationReport {
    pub handler: PathBuf,
    pub verdict: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub elapsed_ms: u64,
    pub stdout: String,
    pub stderr: String,
    /// Failure or skip reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

pub fn render_list(report: &ListReport) -> String {
    let mut out = String::new();
    for (i, listing) in report.listings.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&render_listing(listing));
    }
    if !report.unattributed.is_empty() {
        out.push_str("\nNot loaded:\n");
        for diag in &report.unattributed {
            let _ = writeln!(out, "  {diag}");
        }
    }
    out
}

pub fn render_listing(listing: &HookListing) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} {}, snapshot {})",
        listing.event,
        listing.hooks.len(),
        if listing.hooks.len() == 1 { "hook" } else { "hooks" },
        listing.version
    );
    if listing.hooks.is_empty() {
        out.push_str("  (none)\n");
    }
    for hook in &listing.hooks {
        let _ = writeln!(out, "  {}. {}", hook.position, describe(&hook.definition));
    }
    if !listing.excluded.is_empty() {
        out.push_str("  excluded:\n");
        for diag in &listing.excluded {
            let _ = writeln!(out, "    {diag}");
        }
    }
    out
}

pub fn render_explanation(explanation: &MatchExplanation) -> String {
    let mut out = String::new();
    match &explanation.subject {
        Some(subject) => {
            let _ = writeln!(out, "{} {}", explanation.event, subject);
        }
        None => {
            let _ = writeln!(out, "{} (all hooks)", explanation.event);
        }
    }
    if explanation.entries.is_empty() {
        out.push_str("  (no hooks)\n");
    }
    for entry in &explanation.entries {
        let status = match entry.chain_position {
            Some(n) => format!("runs #{n}"),
            None => "no match".to_string(),
        };
        let _ = writeln!(
            out,
            "  {}. {:<8}  {}",
            entry.position,
            status,
            describe(&entry.definition)
        );
    }
    out
}

pub fn render_invocation(report: &InvocationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "handler: {}", report.handler.display());
    match report.exit_code {
        Some(code) => {
            let _ = writeln!(out, "exit:    {code}");
        }
        None => out.push_str("exit:    (none)\n"),
    }
    let _ = writeln!(out, "elapsed: {}ms", report.elapsed_ms);
    let _ = writeln!(out, "verdict: {}", report.verdict);
    if let Some(detail) = &report.detail {
        let _ = writeln!(out, "detail:  {detail}");
    }
    for (label, text) in [("stdout", &report.stdout), ("stderr", &report.stderr)] {
        if !text.trim().is_empty() {
            let _ = writeln!(out, "{label}:\n{}", text.trim_end());
        }
    }
    out
}

fn describe(def: &HookDefinition) -> String {
    let mut line = def.describe();
    if def.run_async {
        line.push_str(" async");
    }
    let _ = write!(line, " timeout {}ms", def.timeout_ms);
    line
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
