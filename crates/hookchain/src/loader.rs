// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration sources.
//!
//! | Tier            | Location                                     |
//! |-----------------|----------------------------------------------|
//! | builtin         | supplied in code ([`HookSources::with_builtin`]) |
//! | setup manifest  | `<project>/.hookchain/setup.{json,toml}`     |
//! | addon manifests | `<project>/.hookchain/addons/*.{json,toml}`  |
//! | user settings   | `<config dir>/settings.{json,toml}`          |
//!
//! A file holds a `hooks` table keyed by event kind:
//!
//! ```json
//! {
//!   "hooks": {
//!     "PreOperation": [
//!       { "matcher": "Bash", "handler": "./guard.sh", "priority": 10, "timeoutMs": 5000 }
//!     ]
//!   }
//! }
//! ```
//!
//! `hooks` may also be a flat list whose records name their own `event`. A
//! record may group handlers under one matcher, as agent settings files do:
//! `{ "matcher": "Write", "hooks": [{ "command": "fmt.sh" }] }`.

use crate::definition::RawHook;
use crate::diagnostic::HookDiagnostic;
use crate::env;
use crate::error::ConfigError;
use crate::handler_path::HandlerResolver;
use crate::registry::HookRegistry;
use crate::source::SourceTier;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Directory under the project root holding setup and addon manifests.
pub const PROJECT_DIR: &str = ".hookchain";

/// Directory under the home directory used when no config dir is set.
pub const USER_DIR: &str = ".hookchain";

const EXTENSIONS: &[&str] = &["json", "json5", "toml"];

/// Where each file-backed tier is read from.
///
/// The setup manifest and user settings are stems: `setup` matches
/// `setup.json`, `setup.json5` or `setup.toml`, first found wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourcePaths {
    pub setup_manifest: PathBuf,
    pub addon_dir: PathBuf,
    pub user_settings: Option<PathBuf>,
}

impl SourcePaths {
    pub fn new(project_dir: &Path, config_dir: Option<&Path>) -> Self {
        let base = project_dir.join(PROJECT_DIR);
        Self {
            setup_manifest: base.join("setup"),
            addon_dir: base.join("addons"),
            user_settings: config_dir.map(|dir| dir.join("settings")),
        }
    }

    /// Paths for `project_dir`, with the user config dir taken from
    /// `HOOKCHAIN_CONFIG_DIR` or `~/.hookchain`.
    pub fn from_env(project_dir: &Path) -> Self {
        let config_dir = env::config_dir().or_else(|| env::home().map(|h| h.join(USER_DIR)));
        Self::new(project_dir, config_dir.as_deref())
    }
}

/// All four configuration sources.
#[derive(Clone, Debug)]
pub struct HookSources {
    paths: SourcePaths,
    builtin: Vec<RawHook>,
    resolver: Option<HandlerResolver>,
    default_timeout_ms: Option<u64>,
}

impl HookSources {
    pub fn new(paths: SourcePaths) -> Self {
        Self {
            paths,
            builtin: Vec::new(),
            resolver: None,
            default_timeout_ms: None,
        }
    }

    /// Hooks compiled into the embedding program.
    pub fn with_builtin(mut self, hooks: Vec<RawHook>) -> Self {
        self.builtin = hooks;
        self
    }

    pub fn with_resolver(mut self, resolver: HandlerResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_default_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn paths(&self) -> &SourcePaths {
        &self.paths
    }

    /// Read every source, lowest tier first, into a fresh registry.
    ///
    /// Never fails: unreadable files and bad records become diagnostics.
    pub fn load(&self) -> HookRegistry {
        let mut registry = HookRegistry::new();
        if let Some(resolver) = &self.resolver {
            registry = registry.with_resolver(resolver.clone());
        }
        if let Some(timeout_ms) = self.default_timeout_ms {
            registry = registry.with_default_timeout_ms(timeout_ms);
        }

        registry.register(SourceTier::Builtin, self.builtin.clone());

        if let Some(file) = find_with_extension(&self.paths.setup_manifest) {
            load_file(&mut registry, SourceTier::SetupManifest, &file);
        }

        match addon_files(&self.paths.addon_dir) {
            Ok(files) => {
                for file in files {
                    load_file(&mut registry, SourceTier::AddonManifest, &file);
                }
            }
            Err(error) => {
                registry.record(HookDiagnostic::source_failure(
                    SourceTier::AddonManifest,
                    &error,
                ));
            }
        }

        if let Some(file) = self
            .paths
            .user_settings
            .as_deref()
            .and_then(find_with_extension)
        {
            load_file(&mut registry, SourceTier::UserSettings, &file);
        }

        registry
    }
}

/// First existing `stem.<ext>`.
fn find_with_extension(stem: &Path) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| stem.with_extension(ext))
        .find(|path| path.is_file())
}

/// Manifest files in `dir`, sorted by file name. A missing directory has none.
fn addon_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(ConfigError::SourceUnreadable {
                path: dir.to_path_buf(),
                detail: e.to_string(),
            });
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_manifest_extension(path))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn has_manifest_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
}

fn load_file(registry: &mut HookRegistry, tier: SourceTier, path: &Path) {
    tracing::debug!(tier = %tier, path = %path.display(), "loading hook source");

    let records = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| parse_document(path, &text))
        .and_then(|document| hook_records(&document));

    let records = match records {
        Ok(records) => records,
        Err(detail) => {
            let error = ConfigError::SourceUnreadable {
                path: path.to_path_buf(),
                detail,
            };
            registry.record(HookDiagnostic::source_failure(tier, &error));
            return;
        }
    };

    let mut accepted = Vec::with_capacity(records.len());
    for record in records {
        match record.parse() {
            Ok(raw) => accepted.push(raw.with_origin(path)),
            Err((partial, error)) => {
                registry.record(HookDiagnostic::rejected(
                    tier,
                    &partial.with_origin(path),
                    &error,
                ));
            }
        }
    }
    registry.register(tier, accepted);
}

/// Parse a source file as JSON5 (falling back to strict JSON) or TOML.
pub fn parse_document(path: &Path, text: &str) -> Result<Value, String> {
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    if is_toml {
        toml::from_str(text).map_err(|e| e.to_string())
    } else {
        parse_json5_or_json(text).map_err(|e| e.to_string())
    }
}

/// Parse content as JSON5, falling back to strict JSON on parse failure.
fn parse_json5_or_json<T: serde::de::DeserializeOwned>(
    content: &str,
) -> Result<T, serde_json::Error> {
    json5::from_str(content).or_else(|_| serde_json::from_str(content))
}

/// One record awaiting conversion, with the event it was declared under.
#[derive(Debug)]
struct PendingRecord {
    event: Option<String>,
    value: Value,
}

impl PendingRecord {
    fn parse(self) -> Result<RawHook, (RawHook, ConfigError)> {
        let mut value = self.value;
        if let (Some(event), Some(obj)) = (&self.event, value.as_object_mut()) {
            obj.entry("event")
                .or_insert_with(|| Value::String(event.clone()));
        }

        match serde_json::from_value::<RawHook>(value.clone()) {
            Ok(raw) => Ok(raw),
            Err(e) => {
                let partial = RawHook {
                    event: str_field(&value, "event").unwrap_or_default(),
                    matcher: str_field(&value, "matcher").unwrap_or_default(),
                    handler: str_field(&value, "handler")
                        .or_else(|| str_field(&value, "command"))
                        .unwrap_or_default(),
                    ..Default::default()
                };
                Err((partial, ConfigError::MalformedRecord(e.to_string())))
            }
        }
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Flatten a document's `hooks` into individual records.
fn hook_records(document: &Value) -> Result<Vec<PendingRecord>, String> {
    let root = document
        .as_object()
        .ok_or_else(|| "document must be an object".to_string())?;

    let mut records = Vec::new();
    match root.get("hooks") {
        None | Some(Value::Null) => {}
        Some(Value::Object(groups)) => {
            for (event, entries) in groups {
                let Value::Array(entries) = entries else {
                    return Err(format!("hooks.{event} must be a list"));
                };
                for entry in entries {
                    push_record(&mut records, Some(event.as_str()), entry);
                }
            }
        }
        Some(Value::Array(entries)) => {
            for entry in entries {
                push_record(&mut records, None, entry);
            }
        }
        Some(_) => return Err("hooks must be a table or a list".to_string()),
    }
    Ok(records)
}

/// Push one record, expanding a `{matcher, hooks: [...]}` group.
fn push_record(records: &mut Vec<PendingRecord>, event: Option<&str>, entry: &Value) {
    let grouped = entry
        .as_object()
        .filter(|obj| !obj.contains_key("handler") && !obj.contains_key("command"))
        .and_then(|obj| obj.get("hooks").and_then(Value::as_array).map(|inner| (obj, inner)));

    let Some((outer, inner)) = grouped else {
        records.push(PendingRecord {
            event: event.map(str::to_string),
            value: entry.clone(),
        });
        return;
    };

    for hook in inner {
        let mut merged: Map<String, Value> = outer
            .iter()
            .filter(|(key, _)| key.as_str() != "hooks")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        match hook {
            Value::Object(fields) => {
                // Host agent settings tag handlers with `"type": "command"`
                for (key, value) in fields.iter().filter(|(key, _)| key.as_str() != "type") {
                    merged.insert(key.clone(), value.clone());
                }
                records.push(PendingRecord {
                    event: event.map(str::to_string),
                    value: Value::Object(merged),
                });
            }
            other => records.push(PendingRecord {
                event: event.map(str::to_string),
                value: other.clone(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
