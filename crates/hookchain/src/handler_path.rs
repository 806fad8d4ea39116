// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Handler path resolution.

use crate::env;
use crate::error::ConfigError;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Turns the `handler` string of a record into an executable path.
///
/// - `~/bin/guard` expands against the home directory
/// - `/opt/hooks/guard` is used as-is
/// - `./guard.sh`, `hooks/guard.sh` resolve against the declaring file's directory
/// - `guard` is looked up on the search path
#[derive(Clone, Debug, Default)]
pub struct HandlerResolver {
    search_path: Option<OsString>,
    home: Option<PathBuf>,
    cwd: PathBuf,
}

impl HandlerResolver {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            search_path: None,
            home: None,
            cwd: cwd.into(),
        }
    }

    /// Resolver using `PATH`, `HOME` and the process working directory.
    pub fn from_env() -> Self {
        Self {
            search_path: env::search_path(),
            home: env::home(),
            cwd: std::env::current_dir().unwrap_or_default(),
        }
    }

    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Directory that relative handlers of builtin records resolve against.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Resolve `raw`, relative paths against `base_dir` (or the working
    /// directory when the record has no file of origin).
    pub fn resolve(&self, raw: &str, base_dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(unresolved(raw, "handler is empty"));
        }

        let candidate = if let Some(rest) = raw.strip_prefix("~/") {
            let home = self
                .home
                .as_ref()
                .ok_or_else(|| unresolved(raw, "home directory is not known"))?;
            home.join(rest)
        } else if Path::new(raw).is_absolute() {
            PathBuf::from(raw)
        } else if raw.contains('/') || raw.contains(std::path::MAIN_SEPARATOR) {
            base_dir.unwrap_or(&self.cwd).join(raw)
        } else {
            return self
                .search(raw)
                .ok_or_else(|| unresolved(raw, "not found on PATH"));
        };

        let candidate = normalize(&candidate);
        check_executable(&candidate).map_err(|detail| unresolved(raw, detail))?;
        Ok(candidate)
    }

    fn search(&self, name: &str) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        std::env::split_paths(search_path)
            .map(|dir| dir.join(name))
            .find(|candidate| check_executable(candidate).is_ok())
    }
}

fn unresolved(raw: &str, detail: impl Into<String>) -> ConfigError {
    ConfigError::UnresolvedHandler {
        path: raw.to_string(),
        detail: detail.into(),
    }
}

/// Drop `.` components so `./guard.sh` and `guard.sh` under the same
/// directory compare equal.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn check_executable(path: &Path) -> Result<(), String> {
    let metadata = std::fs::metadata(path).map_err(|e| format!("{}: {e}", path.display()))?;
    if !metadata.is_file() {
        return Err(format!("{} is not a file", path.display()));
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(format!("{} is not executable", path.display()));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "handler_path_tests.rs"]
mod tests;
