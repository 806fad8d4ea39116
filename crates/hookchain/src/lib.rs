// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle hook composition and dispatch.
//!
//! Hooks are declared by four source tiers (builtin, setup manifest, addon
//! manifests, user settings). Each load validates every record, composes one
//! ordered chain per event kind, and publishes the result as an immutable
//! [`HookSnapshot`]. A [`Dispatcher`] runs the matching chain for an event,
//! handing the payload to each handler process in turn, and the resolver
//! turns the chain's outcome into what the caller should do.
//!
//! ```no_run
//! use hookchain::{Dispatcher, EventPayload, HookSources, HookStore, ProcessInvoker, SourcePaths};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let sources = HookSources::new(SourcePaths::from_env(Path::new(".")));
//! let store = Arc::new(HookStore::new());
//! store.reload(&sources);
//!
//! let dispatcher = Dispatcher::new(store, Arc::new(ProcessInvoker::new()));
//! let event = EventPayload::pre_operation("Bash", serde_json::json!({"command": "ls"}));
//! let action = dispatcher.dispatch_resolved(event).await;
//! # let _ = action;
//! # }
//! ```

pub mod compose;
pub mod definition;
pub mod diagnostic;
pub mod dispatcher;
pub mod env;
pub mod error;
pub mod event;
pub mod handler_path;
pub mod inspect;
pub mod invoker;
pub mod loader;
pub mod matcher;
pub mod registry;
pub mod resolver;
pub mod snapshot;
pub mod source;

// Binary support, hidden from docs
#[doc(hidden)]
pub mod cli;
#[doc(hidden)]
pub mod commands;
#[doc(hidden)]
pub mod output;

pub use compose::EffectiveHookSet;
pub use definition::{HookDefinition, RawHook};
pub use diagnostic::{ExclusionReason, HookDiagnostic};
pub use dispatcher::{ChainOutcome, Dispatcher};
pub use error::{Cancelled, ConfigError, HandlerFailure, InvokeError, MatchCompileError};
pub use event::{EventKind, EventPayload};
pub use invoker::{HandlerInvoker, ProcessInvoker, ScriptedInvoker, ScriptedResponse};
pub use loader::{HookSources, SourcePaths};
pub use registry::HookRegistry;
pub use resolver::{resolve, ResolvedAction};
pub use snapshot::{HookSnapshot, HookStore};
pub use source::SourceTier;
