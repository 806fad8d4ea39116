// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Build scripts are expected to panic on failure.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::io::Write;

fn main() {
    let out_dir = std::env::var("OUT_DIR").unwrap();
    let path = std::path::Path::new(&out_dir).join("env_names.rs");
    let mut f = std::fs::File::create(path).unwrap();

    let vars = [
        ("HOOKCHAIN_CONFIG_DIR", "HOOKCHAIN_CONFIG_DIR"),
        ("HOOKCHAIN_DEFAULT_TIMEOUT_MS", "HOOKCHAIN_DEFAULT_TIMEOUT_MS"),
        ("HOOKCHAIN_LOG", "HOOKCHAIN_LOG"),
        ("HOME", "HOME"),
        ("PATH", "PATH"),
    ];

    for (const_name, var_name) in vars {
        writeln!(f, "pub const {}: &str = \"{}\";", const_name, var_name).unwrap();
    }

    println!("cargo:rerun-if-changed=build.rs");
}
