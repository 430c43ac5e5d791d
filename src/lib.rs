// autoclear — Automated App Cache Clearing Through the Accessibility Layer
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Clears one Android app's cache by walking the Settings screens through
//! the accessibility layer.
//!
//! An entry point ([`entry`]) arms the flow and opens the app's storage
//! page. The [`service`] receives accessibility events, and each pass of the
//! [`flow`] driver clicks "Storage", clicks "Clear cache", or scrolls, using
//! the text heuristics in [`matcher`]. The host runtime is only reached
//! through [`node::AccessibilityHost`], [`intents::SystemIntents`] and
//! [`prefs::PrefStore`].

pub mod clock;
pub mod config;
pub mod entry;
pub mod error;
pub mod flow;
pub mod intents;
pub mod logging;
pub mod matcher;
pub mod node;
pub mod prefs;
pub mod scheduler;
pub mod service;
pub mod sim;
pub mod synthetic;

pub use config::Config;
pub use error::{Error, Result};
pub use flow::{FlowDriver, FlowState, PassOutcome};
pub use node::{AccessibilityEvent, AccessibilityHost, GlobalAction, NodeAction, UiNode};
pub use prefs::{ArmingStore, MemoryPrefs, PrefStore, SqlitePrefs};
pub use service::AutomationService;
