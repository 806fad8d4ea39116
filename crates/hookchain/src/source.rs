// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration source tiers.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Origin of a hook definition.
///
/// Variants are declared in precedence order, so the derived `Ord` is the
/// override rule: a later tier outranks an earlier one when declared
/// priorities tie.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "camelCase")]
pub enum SourceTier {
    /// Defaults compiled into the embedding program
    Builtin,
    /// Project setup manifest (.hookchain/setup.json)
    SetupManifest,
    /// Addon manifests (.hookchain/addons/*.json)
    AddonManifest,
    /// User settings (~/.hookchain/settings.json)
    UserSettings,
}

impl SourceTier {
    /// Return all tiers in precedence order (lowest to highest).
    pub fn all() -> &'static [SourceTier] {
        &[
            Self::Builtin,
            Self::SetupManifest,
            Self::AddonManifest,
            Self::UserSettings,
        ]
    }

    /// Short label used in diagnostics and CLI output.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Builtin => "builtin",
            Self::SetupManifest => "setup",
            Self::AddonManifest => "addon",
            Self::UserSettings => "user",
        }
    }
}

impl fmt::Display for SourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SourceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "builtin" | "default" => Ok(Self::Builtin),
            "setup" | "setup-manifest" | "setupmanifest" => Ok(Self::SetupManifest),
            "addon" | "addon-manifest" | "addonmanifest" => Ok(Self::AddonManifest),
            "user" | "user-settings" | "usersettings" => Ok(Self::UserSettings),
            _ => Err(format!("unknown source tier: {s}")),
        }
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
