// autoclear — Automated App Cache Clearing Through the Accessibility Layer
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ── Defaults ────────────────────────────────────────
pub const TARGET_PACKAGE: &str = "jp.co.canon.android.printservice.plugin";
pub const DB_PATH: &str = "autoclear/prefs.db";
pub const ARM_WINDOW_MS: u64 = 25_000;
pub const DEBOUNCE_MS: u64 = 120;      // events closer than this are dropped
pub const DRIVE_DELAY_MS: u64 = 150;   // event → first pass
pub const RESCAN_DELAY_MS: u64 = 250;  // scroll → next pass
pub const EXIT_INITIAL_DELAY_MS: u64 = 3000; // let the cache size settle before leaving
pub const EXIT_STEP_DELAY_MS: u64 = 400;
pub const MAX_ANCESTOR: usize = 6;
pub const MAX_PARENT_WALK: usize = 8;

/// Runtime knobs. Every field has a default, so an empty TOML file is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target_package: String,
    pub db_path: PathBuf,
    pub log_file: Option<PathBuf>,
    pub arm_window_ms: u64,
    pub debounce_ms: u64,
    pub drive_delay_ms: u64,
    pub rescan_delay_ms: u64,
    pub exit_initial_delay_ms: u64,
    pub exit_step_delay_ms: u64,
    pub max_ancestor: usize,
    pub max_parent_walk: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_package: TARGET_PACKAGE.to_string(),
            db_path: PathBuf::from(DB_PATH),
            log_file: None,
            arm_window_ms: ARM_WINDOW_MS,
            debounce_ms: DEBOUNCE_MS,
            drive_delay_ms: DRIVE_DELAY_MS,
            rescan_delay_ms: RESCAN_DELAY_MS,
            exit_initial_delay_ms: EXIT_INITIAL_DELAY_MS,
            exit_step_delay_ms: EXIT_STEP_DELAY_MS,
            max_ancestor: MAX_ANCESTOR,
            max_parent_walk: MAX_PARENT_WALK,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// A zero rescan delay would let a scrollable screen reschedule itself
    /// at the same instant forever.
    pub fn validate(&self) -> Result<()> {
        if self.rescan_delay_ms == 0 {
            return Err(Error::InvalidConfig("rescan_delay_ms must be positive"));
        }
        Ok(())
    }

    /// `load` when the file exists, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.arm_window_ms, 25_000);
        assert_eq!(cfg.max_parent_walk, 8);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = Config::from_toml(
            "target_package = \"com.example.app\"\ndebounce_ms = 50\nlog_file = \"ac.log\"\n",
        )
        .unwrap();
        assert_eq!(cfg.target_package, "com.example.app");
        assert_eq!(cfg.debounce_ms, 50);
        assert_eq!(cfg.log_file, Some(PathBuf::from("ac.log")));
        assert_eq!(cfg.rescan_delay_ms, RESCAN_DELAY_MS);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = Config::from_toml("debounce_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
    }

    #[test]
    fn zero_rescan_delay_is_rejected() {
        let err = Config::from_toml("rescan_delay_ms = 0").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = Config::load_or_default(Some(Path::new("/nonexistent/autoclear.toml"))).unwrap();
        assert_eq!(cfg, Config::default());
    }
}
