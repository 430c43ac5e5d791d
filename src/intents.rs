// autoclear — Automated App Cache Clearing Through the Accessibility Layer
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

use tracing::{info, warn};

use crate::error::{Error, Result};

pub const ACTION_ACCESSIBILITY_SETTINGS: &str = "android.settings.ACCESSIBILITY_SETTINGS";
pub const ACTION_APP_STORAGE_SETTINGS: &str = "android.settings.APP_STORAGE_SETTINGS";
pub const ACTION_APPLICATION_DETAILS_SETTINGS: &str = "android.settings.APPLICATION_DETAILS_SETTINGS";
pub const EXTRA_APP_PACKAGE: &str = "android.provider.extra.APP_PACKAGE";

/// Settings screens the entry points can ask for. All are launched as a new
/// task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    AccessibilitySettings,
    /// Per-app storage page. Not every vendor ships a handler.
    AppStorageSettings { package: String },
    /// Generic app-info page, addressed by a `package:` URI.
    AppDetailsSettings { package: String },
}

impl Intent {
    pub fn action(&self) -> &'static str {
        match self {
            Intent::AccessibilitySettings => ACTION_ACCESSIBILITY_SETTINGS,
            Intent::AppStorageSettings { .. } => ACTION_APP_STORAGE_SETTINGS,
            Intent::AppDetailsSettings { .. } => ACTION_APPLICATION_DETAILS_SETTINGS,
        }
    }

    pub fn data(&self) -> Option<String> {
        match self {
            Intent::AppDetailsSettings { package } => Some(format!("package:{package}")),
            _ => None,
        }
    }

    pub fn extra(&self) -> Option<(&'static str, &str)> {
        match self {
            Intent::AppStorageSettings { package } => Some((EXTRA_APP_PACKAGE, package.as_str())),
            _ => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())?;
        if let Some(d) = self.data() {
            write!(f, " data={d}")?;
        }
        if let Some((k, v)) = self.extra() {
            write!(f, " {k}={v}")?;
        }
        Ok(())
    }
}

/// The OS surface the entry points talk to.
pub trait SystemIntents {
    /// Whether our accessibility service is among the enabled ones.
    fn is_service_enabled(&self) -> bool;

    /// `Err(Error::ActivityNotFound)` when nothing handles the intent.
    fn start_activity(&self, intent: &Intent) -> Result<()>;

    /// Tile launches also collapse the notification shade.
    fn start_activity_and_collapse(&self, intent: &Intent) -> Result<()> {
        self.start_activity(intent)
    }
}

impl<I: SystemIntents + ?Sized> SystemIntents for &I {
    fn is_service_enabled(&self) -> bool {
        (**self).is_service_enabled()
    }
    fn start_activity(&self, intent: &Intent) -> Result<()> {
        (**self).start_activity(intent)
    }
    fn start_activity_and_collapse(&self, intent: &Intent) -> Result<()> {
        (**self).start_activity_and_collapse(intent)
    }
}

/// How a launch was issued and which errors trigger the app-details fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchMode {
    /// From an activity; only a missing handler falls back.
    Activity,
    /// From the tile; any failure falls back.
    Collapse,
}

/// Open the target's storage page, or its app-info page where the vendor
/// does not support the direct storage intent. Returns the intent that
/// actually launched.
pub fn open_storage_or_app_info<I: SystemIntents + ?Sized>(
    intents: &I,
    package: &str,
    mode: LaunchMode,
) -> Result<Intent> {
    let storage = Intent::AppStorageSettings { package: package.to_string() };
    let res = match mode {
        LaunchMode::Activity => intents.start_activity(&storage),
        LaunchMode::Collapse => intents.start_activity_and_collapse(&storage),
    };
    match res {
        Ok(()) => {
            info!(%storage, "launched");
            return Ok(storage);
        }
        Err(e @ Error::ActivityNotFound(_)) => warn!("storage intent unsupported: {e}"),
        Err(e) if mode == LaunchMode::Collapse => warn!("storage intent failed: {e}"),
        Err(e) => return Err(e),
    }

    let details = Intent::AppDetailsSettings { package: package.to_string() };
    match mode {
        LaunchMode::Activity => intents.start_activity(&details)?,
        LaunchMode::Collapse => intents.start_activity_and_collapse(&details)?,
    }
    info!(%details, "launched fallback");
    Ok(details)
}
