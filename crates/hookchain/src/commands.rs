// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command execution.

use crate::cli::{Cli, Command};
use crate::definition::DEFAULT_TIMEOUT_MS;
use crate::dispatcher::{classify, Dispatcher, Verdict};
use crate::env;
use crate::event::{EventKind, EventPayload};
use crate::handler_path::HandlerResolver;
use crate::inspect;
use crate::invoker::{HandlerInvoker, Invocation, ProcessInvoker};
use crate::loader::{HookSources, SourcePaths};
use crate::output::{self, InvocationReport, ListReport};
use crate::resolver::ResolvedAction;
use crate::snapshot::{HookSnapshot, HookStore};
use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;

/// Run a parsed command line, returning the process exit code.
pub async fn run(cli: Cli) -> anyhow::Result<i32> {
    let project = cli
        .project
        .canonicalize()
        .with_context(|| format!("project directory {} not found", cli.project.display()))?;
    let sources = hook_sources(&project, cli.config_dir.as_deref());

    match cli.command {
        Command::List { event, json } => list(&sources, event, json),
        Command::Explain {
            event,
            operation,
            json,
        } => explain(&sources, event, operation.as_deref(), json),
        Command::Invoke {
            handler,
            event,
            input,
            operation,
            timeout_ms,
            json,
        } => {
            let payload = match input {
                Some(text) => parse_payload(event, &text)?,
                None => EventPayload::synthetic(event, operation.as_deref()),
            };
            invoke(&project, &handler, payload, timeout_ms, json).await
        }
        Command::Dispatch { event, input } => {
            let text = match input {
                Some(text) => text,
                None => read_stdin().await?,
            };
            dispatch(&project, &sources, parse_payload(event, &text)?).await
        }
    }
}

fn hook_sources(project: &Path, config_dir: Option<&Path>) -> HookSources {
    let paths = match config_dir {
        Some(dir) => SourcePaths::new(project, Some(dir)),
        None => SourcePaths::from_env(project),
    };
    HookSources::new(paths).with_resolver(HandlerResolver::from_env().with_cwd(project))
}

fn load(sources: &HookSources) -> Arc<HookSnapshot> {
    HookStore::new().reload(sources)
}

fn list(sources: &HookSources, event: Option<EventKind>, json: bool) -> anyhow::Result<i32> {
    let snapshot = load(sources);
    let report = ListReport {
        listings: match event {
            Some(kind) => vec![inspect::list_effective(&snapshot, kind)],
            None => inspect::list_all(&snapshot),
        },
        unattributed: inspect::unattributed(&snapshot),
    };

    if json {
        print_json(&report)?;
    } else {
        print!("{}", output::render_list(&report));
    }
    Ok(0)
}

fn explain(
    sources: &HookSources,
    event: EventKind,
    operation: Option<&str>,
    json: bool,
) -> anyhow::Result<i32> {
    if operation.is_none() && inspect::has_subject(event) {
        output::print_warning(format_args!(
            "no operation given; showing every {event} hook"
        ));
    }
    let snapshot = load(sources);
    let explanation = inspect::explain(&snapshot, event, operation);

    if json {
        print_json(&explanation)?;
    } else {
        print!("{}", output::render_explanation(&explanation));
    }
    Ok(0)
}

/// Run one handler directly. Exits with the code the chain would react to:
/// 0 to continue, 2 to skip, 1 on failure.
async fn invoke(
    project: &Path,
    handler: &str,
    payload: EventPayload,
    timeout_ms: Option<u64>,
    json: bool,
) -> anyhow::Result<i32> {
    let kind = payload.kind();
    let handler: PathBuf = HandlerResolver::from_env()
        .resolve(handler, None)
        .context("cannot run handler")?;
    let timeout_ms = timeout_ms
        .or_else(env::default_timeout_ms)
        .filter(|ms| *ms > 0)
        .unwrap_or(DEFAULT_TIMEOUT_MS);
    let input = payload.to_wire_string()?;

    let invoker = ProcessInvoker::new().with_working_dir(project);
    let started = Instant::now();
    let result = invoker
        .invoke(Invocation::new(
            &handler,
            input,
            Duration::from_millis(timeout_ms),
        ))
        .await;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (exit_code, stdout, stderr) = match &result {
        Ok(out) => (out.exit_code, out.stdout.clone(), out.stderr.clone()),
        Err(_) => (None, String::new(), String::new()),
    };
    let verdict = classify(kind, result);
    let (code, detail) = match &verdict {
        Verdict::Continue | Verdict::Modify(_) => (0, None),
        Verdict::Skip(reason) => (2, Some(reason.clone())),
        Verdict::Fail(failure) => (1, Some(failure.to_string())),
    };

    let report = InvocationReport {
        handler,
        verdict: verdict.name(),
        exit_code,
        elapsed_ms,
        stdout,
        stderr,
        detail,
    };
    if json {
        print_json(&report)?;
    } else {
        print!("{}", output::render_invocation(&report));
    }
    Ok(code)
}

/// Dispatch through the chain and report the resolved action.
async fn dispatch(
    project: &Path,
    sources: &HookSources,
    payload: EventPayload,
) -> anyhow::Result<i32> {
    let store = Arc::new(HookStore::new());
    store.reload(sources);
    let invoker = Arc::new(ProcessInvoker::new().with_working_dir(project));
    let dispatcher = Dispatcher::new(store, invoker);

    let action = dispatcher.dispatch_resolved(payload).await;
    dispatcher.drain_async().await;

    match &action {
        ResolvedAction::Proceed(payload) => println!("{}", payload.to_wire_string()?),
        ResolvedAction::Suppress(reason) => eprintln!("{reason}"),
        ResolvedAction::Abort(reason) => output::print_error(reason),
    }
    Ok(action.exit_code())
}

fn parse_payload(kind: EventKind, text: &str) -> anyhow::Result<EventPayload> {
    EventPayload::from_json(kind, text).with_context(|| format!("invalid {kind} payload"))
}

async fn read_stdin() -> anyhow::Result<String> {
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("failed to read payload from stdin")?;
    Ok(text)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
