// autoclear — Automated App Cache Clearing Through the Accessibility Layer
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-process stand-in for the phone: a handful of Settings screens built
//! from synthetic trees, a screen stack, and the event stream they produce.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use tracing::debug;

use crate::clock::{Clock, ManualClock};
use crate::config::Config;
use crate::entry::{Launcher, QuickTile, Status, TileOutcome};
use crate::error::{Error, Result};
use crate::intents::{Intent, SystemIntents};
use crate::node::{AccessibilityEvent, AccessibilityHost, EventKind, GlobalAction, NodeAction};
use crate::prefs::{ArmingStore, PrefStore};
use crate::service::AutomationService;
use crate::synthetic::{NodeSpec, SyntheticNode, SyntheticTree};

const SETTINGS_PKG: &str = "com.android.settings";
const LAUNCHER_PKG: &str = "com.android.launcher";

const TAG_STORAGE_ROW: &str = "storage_row";
const TAG_CLEAR_CACHE: &str = "clear_cache";
const TAG_CLEAR_DATA: &str = "clear_data";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Home,
    AccessibilitySettings,
    AppInfo,
    Storage,
}

#[derive(Clone, Debug)]
pub struct SimOptions {
    pub storage_intent_supported: bool,
    pub service_enabled: bool,
    pub app_label: String,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            storage_intent_supported: true,
            service_enabled: true,
            app_label: "Canon Print Service".to_string(),
        }
    }
}

/// What happened to the simulated phone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimReport {
    pub visited: Vec<Screen>,
    pub launched: Vec<Intent>,
    pub globals: Vec<GlobalAction>,
    pub cache_cleared: bool,
    pub data_wiped: bool,
}

pub struct SettingsSimulator {
    opts: SimOptions,
    home: SyntheticTree,
    accessibility: SyntheticTree,
    // [0] before the list is scrolled, [1] after
    app_info: [SyntheticTree; 2],
    storage: SyntheticTree,
    stack: RefCell<Vec<Screen>>,
    scrolled: Cell<bool>,
    events: RefCell<VecDeque<AccessibilityEvent>>,
    report: RefCell<SimReport>,
}

impl SettingsSimulator {
    pub fn new(opts: SimOptions) -> Self {
        let home = build_home();
        let accessibility = build_accessibility(opts.service_enabled);
        let app_info = [build_app_info(&opts.app_label, false), build_app_info(&opts.app_label, true)];
        let storage = build_storage();
        let report = SimReport { visited: vec![Screen::Home], ..SimReport::default() };
        Self {
            opts,
            home,
            accessibility,
            app_info,
            storage,
            stack: RefCell::new(vec![Screen::Home]),
            scrolled: Cell::new(false),
            events: RefCell::new(VecDeque::new()),
            report: RefCell::new(report),
        }
    }

    pub fn screen(&self) -> Screen {
        self.stack.borrow().last().copied().unwrap_or(Screen::Home)
    }

    pub fn report(&self) -> SimReport {
        self.report.borrow().clone()
    }

    pub fn drain_events(&self) -> Vec<AccessibilityEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    fn tree(&self, screen: Screen) -> &SyntheticTree {
        match screen {
            Screen::Home => &self.home,
            Screen::AccessibilitySettings => &self.accessibility,
            Screen::AppInfo => &self.app_info[self.scrolled.get() as usize],
            Screen::Storage => &self.storage,
        }
    }

    fn emit(&self, kind: EventKind) {
        let pkg = match self.screen() {
            Screen::Home => LAUNCHER_PKG,
            _ => SETTINGS_PKG,
        };
        self.events.borrow_mut().push_back(AccessibilityEvent::new(kind, pkg));
    }

    fn push(&self, screen: Screen) {
        if screen == Screen::AppInfo {
            self.scrolled.set(false);
        }
        self.stack.borrow_mut().push(screen);
        self.report.borrow_mut().visited.push(screen);
        self.emit(EventKind::WindowStateChanged);
    }

    /// Apply the effects of node actions performed since the last call.
    pub fn settle(&self) {
        let trees = [&self.home, &self.accessibility, &self.app_info[0], &self.app_info[1], &self.storage];
        for tree in trees {
            for rec in tree.take_actions() {
                if !rec.accepted {
                    continue;
                }
                match rec.action {
                    NodeAction::Click => self.on_click(tree.spec(rec.node).tag),
                    NodeAction::ScrollForward => {
                        self.scrolled.set(true);
                        self.emit(EventKind::ViewScrolled);
                    }
                    NodeAction::AccessibilityFocus => {}
                }
            }
        }
    }

    fn on_click(&self, tag: Option<&'static str>) {
        debug!(?tag, "sim: click");
        match tag {
            Some(TAG_STORAGE_ROW) => self.push(Screen::Storage),
            Some(TAG_CLEAR_CACHE) => {
                self.report.borrow_mut().cache_cleared = true;
                self.emit(EventKind::WindowContentChanged);
            }
            Some(TAG_CLEAR_DATA) => {
                self.report.borrow_mut().data_wiped = true;
                self.emit(EventKind::WindowContentChanged);
            }
            _ => self.emit(EventKind::ViewClicked),
        }
    }
}

impl AccessibilityHost for SettingsSimulator {
    type Node<'a> = SyntheticNode<'a>;

    fn root_in_active_window(&self) -> Option<SyntheticNode<'_>> {
        Some(self.tree(self.screen()).root())
    }

    fn perform_global_action(&self, action: GlobalAction) -> bool {
        {
            let mut stack = self.stack.borrow_mut();
            match action {
                GlobalAction::Back => {
                    if stack.len() > 1 {
                        stack.pop();
                    }
                }
                GlobalAction::Home => stack.truncate(1),
            }
        }
        let now_on = self.screen();
        let mut report = self.report.borrow_mut();
        report.globals.push(action);
        report.visited.push(now_on);
        drop(report);
        self.emit(EventKind::WindowStateChanged);
        true
    }
}

impl SystemIntents for SettingsSimulator {
    fn is_service_enabled(&self) -> bool {
        self.opts.service_enabled
    }

    fn start_activity(&self, intent: &Intent) -> Result<()> {
        let screen = match intent {
            Intent::AccessibilitySettings => Screen::AccessibilitySettings,
            Intent::AppStorageSettings { .. } if !self.opts.storage_intent_supported => {
                return Err(Error::ActivityNotFound(intent.clone()));
            }
            Intent::AppStorageSettings { .. } => Screen::Storage,
            Intent::AppDetailsSettings { .. } => Screen::AppInfo,
        };
        self.report.borrow_mut().launched.push(intent.clone());
        self.push(screen);
        Ok(())
    }
}

// ── Screens ─────────────────────────────────────────

fn build_home() -> SyntheticTree {
    let mut t = SyntheticTree::new(NodeSpec::new());
    t.add(SyntheticTree::ROOT, NodeSpec::label("Phone").clickable());
    t.add(SyntheticTree::ROOT, NodeSpec::label("Settings").clickable());
    t
}

fn build_accessibility(enabled: bool) -> SyntheticTree {
    let mut t = SyntheticTree::new(NodeSpec::new());
    t.add(SyntheticTree::ROOT, NodeSpec::label("Accessibility"));
    let row = t.add(SyntheticTree::ROOT, NodeSpec::new().clickable());
    t.add(row, NodeSpec::label("Auto clear cache"));
    t.add(row, NodeSpec::label(if enabled { "On" } else { "Off" }));
    t
}

/// App info list. The storage row sits below the fold until scrolled.
fn build_app_info(app_label: &str, scrolled: bool) -> SyntheticTree {
    let mut t = SyntheticTree::new(NodeSpec::new());
    t.add(SyntheticTree::ROOT, NodeSpec::label("App info"));
    let list = t.add(SyntheticTree::ROOT, NodeSpec::new().scrollable());
    let header = t.add(list, NodeSpec::new());
    t.add(header, NodeSpec::label(app_label));
    t.add(header, NodeSpec::new().desc("App icon"));
    let rows: &[&str] = if scrolled {
        &["Permissions", "Mobile data & Wi-Fi"]
    } else {
        &["Open", "Force stop", "Notifications", "Permissions"]
    };
    for label in rows {
        let row = t.add(list, NodeSpec::new().clickable());
        t.add(row, NodeSpec::label(label));
    }
    if scrolled {
        let row = t.add(list, NodeSpec::new().clickable().tag(TAG_STORAGE_ROW));
        let text = t.add(row, NodeSpec::new());
        t.add(text, NodeSpec::label("Storage & cache"));
        t.add(text, NodeSpec::label("24.1 MB used in internal storage"));
    }
    t
}

/// Storage page: the title matches the storage list but nothing above it
/// is clickable, and "Clear cache" is a bare label inside a clickable frame.
fn build_storage() -> SyntheticTree {
    let mut t = SyntheticTree::new(NodeSpec::new());
    t.add(SyntheticTree::ROOT, NodeSpec::label("Storage & cache"));
    let body = t.add(SyntheticTree::ROOT, NodeSpec::new());
    for (k, v) in [("App size", "18.0 MB"), ("User data", "2.1 MB"), ("Cache", "4.0 MB")] {
        let line = t.add(body, NodeSpec::new());
        t.add(line, NodeSpec::label(k));
        t.add(line, NodeSpec::label(v));
    }
    let buttons = t.add(body, NodeSpec::new());
    t.add(buttons, NodeSpec::label("Clear storage").clickable().tag(TAG_CLEAR_DATA));
    let frame = t.add(buttons, NodeSpec::new().clickable().tag(TAG_CLEAR_CACHE));
    let inner = t.add(frame, NodeSpec::new());
    t.add(inner, NodeSpec::label("Clear cache"));
    t
}

// ── Driver ──────────────────────────────────────────

/// The automation service wired to a simulator and a hand-driven clock.
pub struct Simulation<S> {
    svc: AutomationService<SettingsSimulator, S, ManualClock>,
    clock: ManualClock,
    config: Config,
}

impl<S: PrefStore> Simulation<S> {
    pub fn new(opts: SimOptions, prefs: S, clock: ManualClock, config: Config) -> Self {
        let arming = ArmingStore::new(prefs, clock.clone());
        let svc = AutomationService::new(SettingsSimulator::new(opts), arming, &config);
        Self { svc, clock, config }
    }

    pub fn service(&self) -> &AutomationService<SettingsSimulator, S, ManualClock> {
        &self.svc
    }

    pub fn settings(&self) -> &SettingsSimulator {
        self.svc.host()
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn tap_tile(&mut self) -> Result<TileOutcome> {
        let out = QuickTile::new(self.svc.host(), self.svc.arming(), &self.config).on_click()?;
        self.pump_events();
        Ok(out)
    }

    pub fn press_clear(&mut self) -> Result<Status> {
        let status = Launcher::new(self.svc.host(), self.svc.arming(), &self.config).on_clear()?;
        self.pump_events();
        Ok(status)
    }

    fn pump_events(&mut self) {
        for ev in self.svc.host().drain_events() {
            self.svc.on_accessibility_event(&ev);
        }
    }

    /// Jump from deadline to deadline for up to `budget_ms`. Returns how many
    /// tasks ran.
    pub fn run_for(&mut self, budget_ms: u64) -> usize {
        let end = self.clock.now_ms() + budget_ms;
        let mut ran = 0;
        loop {
            self.pump_events();
            match self.svc.next_deadline() {
                Some(t) if t <= end => {
                    self.clock.advance_to(t);
                    ran += self.svc.run_due();
                    self.svc.host().settle();
                }
                _ => break,
            }
        }
        self.clock.advance_to(end);
        ran
    }
}
