// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Handler invocation.
//!
//! The dispatcher only sees [`HandlerInvoker`]; how a handler is actually
//! run is up to the implementation:
//! - [`ProcessInvoker`] spawns the handler as a child process
//! - [`ScriptedInvoker`] answers from a table, for tests

mod process;
mod scripted;

pub use process::ProcessInvoker;
pub use scripted::{ScriptedInvoker, ScriptedResponse};

use crate::error::InvokeError;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future returned by [`HandlerInvoker::invoke`].
pub type InvokeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<HandlerOutput, InvokeError>> + Send + 'a>>;

/// One handler run: the program, its stdin, and its wall-clock budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub handler: PathBuf,
    pub input: String,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(handler: impl Into<PathBuf>, input: impl Into<String>, timeout: Duration) -> Self {
        Self {
            handler: handler.into(),
            input: input.into(),
            timeout,
        }
    }
}

/// What a handler produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandlerOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs a handler with a payload and a timeout.
///
/// Implementations must stop the handler once `timeout` elapses and return
/// [`InvokeError::Timeout`]. Dropping the returned future must stop it too.
pub trait HandlerInvoker: Send + Sync {
    fn invoke(&self, invocation: Invocation) -> InvokeFuture<'_>;
}
