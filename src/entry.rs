// autoclear — Automated App Cache Clearing Through the Accessibility Layer
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Launcher screen and quick-settings tile. Both only arm the flow and open
//! Settings; the accessibility service does the rest.

use std::fmt;

use tracing::info;

use crate::clock::Clock;
use crate::config::Config;
use crate::error::Result;
use crate::intents::{open_storage_or_app_info, Intent, LaunchMode, SystemIntents};
use crate::prefs::{ArmingStore, PrefStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    EnableAccessibilityFirst,
    RunningAutoClear,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::EnableAccessibilityFirst => "Enable the accessibility service first",
            Status::RunningAutoClear => "Clearing cache automatically…",
        })
    }
}

pub struct Launcher<'a, I: ?Sized, S, C> {
    intents: &'a I,
    arming: &'a ArmingStore<S, C>,
    config: &'a Config,
    status: Option<Status>,
}

impl<'a, I, S, C> Launcher<'a, I, S, C>
where
    I: SystemIntents + ?Sized,
    S: PrefStore,
    C: Clock,
{
    pub fn new(intents: &'a I, arming: &'a ArmingStore<S, C>, config: &'a Config) -> Self {
        Self { intents, arming, config, status: None }
    }

    /// Text of the status line, if any button set one.
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn on_open_accessibility(&mut self) -> Result<()> {
        self.intents.start_activity(&Intent::AccessibilitySettings)
    }

    pub fn on_open_app_info(&mut self) -> Result<Intent> {
        open_storage_or_app_info(self.intents, &self.config.target_package, LaunchMode::Activity)
    }

    pub fn on_clear(&mut self) -> Result<Status> {
        if !self.intents.is_service_enabled() {
            self.status = Some(Status::EnableAccessibilityFirst);
            self.intents.start_activity(&Intent::AccessibilitySettings)?;
            return Ok(Status::EnableAccessibilityFirst);
        }
        self.arming.schedule_auto_run(self.config.arm_window_ms)?;
        open_storage_or_app_info(self.intents, &self.config.target_package, LaunchMode::Activity)?;
        self.status = Some(Status::RunningAutoClear);
        Ok(Status::RunningAutoClear)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TileOutcome {
    /// Service off: accessibility settings opened instead.
    NeedsAccessibility,
    /// Armed and Settings opened with this intent.
    Armed(Intent),
}

pub struct QuickTile<'a, I: ?Sized, S, C> {
    intents: &'a I,
    arming: &'a ArmingStore<S, C>,
    config: &'a Config,
}

impl<'a, I, S, C> QuickTile<'a, I, S, C>
where
    I: SystemIntents + ?Sized,
    S: PrefStore,
    C: Clock,
{
    pub fn new(intents: &'a I, arming: &'a ArmingStore<S, C>, config: &'a Config) -> Self {
        Self { intents, arming, config }
    }

    pub fn on_click(&self) -> Result<TileOutcome> {
        if !self.intents.is_service_enabled() {
            info!("tile: service disabled, opening accessibility settings");
            self.intents.start_activity_and_collapse(&Intent::AccessibilitySettings)?;
            return Ok(TileOutcome::NeedsAccessibility);
        }
        self.arming.schedule_auto_run(self.config.arm_window_ms)?;
        let used = open_storage_or_app_info(self.intents, &self.config.target_package, LaunchMode::Collapse)?;
        Ok(TileOutcome::Armed(used))
    }
}
