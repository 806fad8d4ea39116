// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory handler invoker for testing hook policies.

use super::{HandlerInvoker, HandlerOutput, InvokeFuture, Invocation};
use crate::error::InvokeError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Canned result for one handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptedResponse {
    Exit {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// Never finishes; resolves as a timeout once the budget elapses
    Hang,
    Fail(InvokeError),
}

impl ScriptedResponse {
    /// Exit 0, no output.
    pub fn ok() -> Self {
        Self::exit(0)
    }

    /// Exit 0 with a replacement payload.
    pub fn modify(stdout: impl Into<String>) -> Self {
        Self::Exit {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Exit 2 with a reason on stderr.
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::Exit {
            code: Some(2),
            stdout: String::new(),
            stderr: reason.into(),
        }
    }

    /// Exit 1 with a reason on stderr.
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Exit {
            code: Some(1),
            stdout: String::new(),
            stderr: reason.into(),
        }
    }

    pub fn exit(code: i32) -> Self {
        Self::Exit {
            code: Some(code),
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Answers invocations from a table keyed by handler path and records every
/// call. Handlers without an entry exit 0 with no output.
#[derive(Debug, Default)]
pub struct ScriptedInvoker {
    responses: Mutex<HashMap<PathBuf, ScriptedResponse>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ScriptedInvoker::set`].
    pub fn on(self, handler: impl Into<PathBuf>, response: ScriptedResponse) -> Self {
        self.set(handler, response);
        self
    }

    pub fn set(&self, handler: impl Into<PathBuf>, response: ScriptedResponse) {
        self.responses.lock().insert(handler.into(), response);
    }

    /// Every invocation so far, in call order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, handler: impl AsRef<Path>) -> usize {
        let handler = handler.as_ref();
        self.calls
            .lock()
            .iter()
            .filter(|call| call.handler == handler)
            .count()
    }

    /// Handlers in the order they were invoked.
    pub fn call_order(&self) -> Vec<PathBuf> {
        self.calls
            .lock()
            .iter()
            .map(|call| call.handler.clone())
            .collect()
    }
}

impl HandlerInvoker for ScriptedInvoker {
    fn invoke(&self, invocation: Invocation) -> InvokeFuture<'_> {
        let response = self
            .responses
            .lock()
            .get(&invocation.handler)
            .cloned()
            .unwrap_or_else(ScriptedResponse::ok);
        let timeout = invocation.timeout;
        self.calls.lock().push(invocation);

        Box::pin(async move {
            match response {
                ScriptedResponse::Exit {
                    code,
                    stdout,
                    stderr,
                } => Ok(HandlerOutput {
                    exit_code: code,
                    stdout,
                    stderr,
                }),
                ScriptedResponse::Hang => {
                    tokio::time::sleep(timeout).await;
                    Err(InvokeError::Timeout(timeout))
                }
                ScriptedResponse::Fail(error) => Err(error),
            }
        })
    }
}

#[cfg(test)]
#[path = "scripted_tests.rs"]
mod tests;
