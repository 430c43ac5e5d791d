// autoclear — Automated App Cache Clearing Through the Accessibility Layer
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::rc::Rc;

use autoclear::clock::{Clock, ManualClock};
use autoclear::entry::{Launcher, Status, TileOutcome};
use autoclear::intents::Intent;
use autoclear::sim::{Screen, SettingsSimulator, SimOptions, Simulation};
use autoclear::{ArmingStore, Config, FlowState, GlobalAction, MemoryPrefs, SqlitePrefs};

const PKG: &str = "jp.co.canon.android.printservice.plugin";

fn sim(opts: SimOptions) -> Simulation<MemoryPrefs> {
    Simulation::new(opts, MemoryPrefs::new(), ManualClock::new(10_000), Config::default())
}

#[test]
fn tile_clears_cache_and_returns_home() {
    let mut s = sim(SimOptions::default());
    let out = s.tap_tile().unwrap();
    assert_eq!(out, TileOutcome::Armed(Intent::AppStorageSettings { package: PKG.into() }));

    s.run_for(30_000);
    let report = s.settings().report();
    assert!(report.cache_cleared);
    assert!(!report.data_wiped);
    assert_eq!(report.globals, vec![GlobalAction::Back, GlobalAction::Back, GlobalAction::Home]);
    assert_eq!(s.settings().screen(), Screen::Home);
    assert_eq!(s.service().state(), FlowState::Done);
    assert!(s.service().arming().is_done());
    assert_eq!(s.service().pending(), 0);
}

#[test]
fn exit_chain_timing() {
    let mut s = sim(SimOptions::default());
    s.tap_tile().unwrap();
    // first pass lands 150 ms after the launch event
    s.run_for(150);
    assert!(s.settings().report().cache_cleared);
    assert_eq!(s.service().next_deadline(), Some(10_000 + 150 + 3_000));

    s.run_for(2_999);
    assert!(s.settings().report().globals.is_empty());
    s.run_for(1);
    assert_eq!(s.settings().report().globals, vec![GlobalAction::Back]);
    s.run_for(800);
    assert_eq!(s.settings().report().globals.len(), 3);
}

#[test]
fn vendor_fallback_scrolls_to_storage_row() {
    let mut s = sim(SimOptions { storage_intent_supported: false, ..SimOptions::default() });
    let out = s.tap_tile().unwrap();
    assert_eq!(out, TileOutcome::Armed(Intent::AppDetailsSettings { package: PKG.into() }));
    assert_eq!(s.settings().screen(), Screen::AppInfo);

    s.run_for(30_000);
    let report = s.settings().report();
    assert_eq!(
        report.visited[..3],
        [Screen::Home, Screen::AppInfo, Screen::Storage]
    );
    assert!(report.cache_cleared);
    assert!(!report.data_wiped);
    assert_eq!(s.settings().screen(), Screen::Home);
}

#[test]
fn zero_rescan_delay_still_returns() {
    let config = Config { rescan_delay_ms: 0, ..Config::default() };
    let opts = SimOptions { storage_intent_supported: false, ..SimOptions::default() };
    let mut s = Simulation::new(opts, MemoryPrefs::new(), ManualClock::new(10_000), config);
    s.tap_tile().unwrap();
    s.run_for(30_000);
    assert!(s.settings().report().visited.contains(&Screen::Storage));
    assert!(!s.settings().report().data_wiped);
}

#[test]
fn disabled_service_only_opens_accessibility_settings() {
    let mut s = sim(SimOptions { service_enabled: false, ..SimOptions::default() });
    assert_eq!(s.tap_tile().unwrap(), TileOutcome::NeedsAccessibility);
    assert_eq!(s.settings().screen(), Screen::AccessibilitySettings);
    assert!(!s.service().arming().is_armed());

    assert_eq!(s.run_for(30_000), 0);
    assert!(!s.settings().report().cache_cleared);
}

#[test]
fn launcher_button_sets_status() {
    let mut s = sim(SimOptions::default());
    assert_eq!(s.press_clear().unwrap(), Status::RunningAutoClear);
    s.run_for(30_000);
    assert!(s.settings().report().cache_cleared);

    let mut off = sim(SimOptions { service_enabled: false, ..SimOptions::default() });
    assert_eq!(off.press_clear().unwrap(), Status::EnableAccessibilityFirst);
    assert_eq!(off.settings().screen(), Screen::AccessibilitySettings);
}

#[test]
fn launcher_plain_buttons_do_not_arm() {
    let settings = SettingsSimulator::new(SimOptions::default());
    let clock = ManualClock::new(0);
    let arming = ArmingStore::new(MemoryPrefs::new(), clock);
    let config = Config::default();
    let mut launcher = Launcher::new(&settings, &arming, &config);

    launcher.on_open_accessibility().unwrap();
    assert_eq!(settings.screen(), Screen::AccessibilitySettings);
    let used = launcher.on_open_app_info().unwrap();
    assert_eq!(used, Intent::AppStorageSettings { package: PKG.into() });
    assert_eq!(settings.screen(), Screen::Storage);
    assert_eq!(launcher.status(), None);
    assert!(!arming.is_armed());
}

#[test]
fn expired_window_stops_automation() {
    let mut s = sim(SimOptions { storage_intent_supported: false, ..SimOptions::default() });
    s.tap_tile().unwrap();
    // Let the window lapse before any pass runs.
    s.clock().advance(Config::default().arm_window_ms);
    s.run_for(5_000);
    assert!(!s.settings().report().cache_cleared);
    assert_eq!(s.service().passes(), 0);
    assert_eq!(s.settings().screen(), Screen::AppInfo);
}

#[test]
fn rearming_after_done_runs_again() {
    let mut s = sim(SimOptions::default());
    s.tap_tile().unwrap();
    s.run_for(30_000);
    assert!(s.service().arming().is_done());

    s.tap_tile().unwrap();
    assert!(!s.service().arming().is_done());
    assert!(s.service().arming().is_active());
    s.run_for(30_000);
    assert!(s.service().arming().is_done());
    assert_eq!(s.settings().report().globals.len(), 6);
}

#[test]
fn sqlite_store_backs_a_full_run() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = Rc::new(SqlitePrefs::open(&dir.path().join("prefs.db")).unwrap());
    let clock = ManualClock::new(0);
    let mut s = Simulation::new(SimOptions::default(), Rc::clone(&prefs), clock.clone(), Config::default());
    s.tap_tile().unwrap();
    s.run_for(30_000);
    assert!(s.settings().report().cache_cleared);

    let view = ArmingStore::new(Rc::clone(&prefs), clock.clone());
    assert!(view.is_done());
    assert_eq!(view.arm_until().unwrap(), 25_000);
    assert_eq!(clock.now_ms(), 30_000);
    assert!(!view.is_armed());
}
