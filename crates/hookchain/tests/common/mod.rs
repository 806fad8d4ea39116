// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Shared helpers: a throwaway project with hook manifests and shell
//! handlers that record their calls.

#![allow(dead_code)]

use hookchain::{HookSources, SourcePaths};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A project directory plus a user config directory.
pub struct Project {
    root: TempDir,
    config: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let project = Self {
            root: TempDir::new().unwrap(),
            config: TempDir::new().unwrap(),
        };
        fs::create_dir_all(project.hook_dir().join("addons")).unwrap();
        project
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn config_dir(&self) -> &Path {
        self.config.path()
    }

    pub fn hook_dir(&self) -> PathBuf {
        self.root.path().join(".hookchain")
    }

    /// File every recording handler appends its name to.
    pub fn log_path(&self) -> PathBuf {
        self.root.path().join("calls.log")
    }

    /// Names of the recording handlers that ran, in order.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Write an executable shell handler into the hook directory.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.hook_dir().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        path
    }

    /// A handler that logs its name, writes `stderr`, and exits with `code`.
    pub fn recording_script(&self, name: &str, code: i32, stderr: &str) -> PathBuf {
        let log = self.log_path();
        self.script(
            name,
            &format!(
                "cat > /dev/null\necho {name} >> '{}'\nprintf '%s' '{stderr}' >&2\nexit {code}",
                log.display()
            ),
        )
    }

    pub fn setup_manifest(&self, content: &str) -> PathBuf {
        self.write(self.hook_dir().join("setup.json"), content)
    }

    pub fn addon(&self, file_name: &str, content: &str) -> PathBuf {
        self.write(self.hook_dir().join("addons").join(file_name), content)
    }

    pub fn user_settings(&self, content: &str) -> PathBuf {
        self.write(self.config.path().join("settings.json"), content)
    }

    pub fn sources(&self) -> HookSources {
        HookSources::new(SourcePaths::new(self.root(), Some(self.config_dir())))
    }

    fn write(&self, path: PathBuf, content: &str) -> PathBuf {
        fs::write(&path, content).unwrap();
        path
    }
}
