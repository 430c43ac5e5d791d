// autoclear — Automated App Cache Clearing Through the Accessibility Layer
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The accessibility-event listener and the delayed-task chain behind it.
//!
//! Everything runs on the host's UI thread. Events schedule passes, passes
//! schedule rescans or the exit chain, and the host calls [`run_due`] when
//! the next deadline arrives.
//!
//! [`run_due`]: AutomationService::run_due

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::flow::{FlowDriver, FlowState, PassOutcome};
use crate::matcher::ClickLimits;
use crate::node::{AccessibilityEvent, AccessibilityHost, GlobalAction};
use crate::prefs::{ArmingStore, PrefStore};
use crate::scheduler::Scheduler;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitStep {
    FirstBack,
    SecondBack,
    Home,
}

impl ExitStep {
    fn action(self) -> GlobalAction {
        match self {
            ExitStep::FirstBack | ExitStep::SecondBack => GlobalAction::Back,
            ExitStep::Home => GlobalAction::Home,
        }
    }

    fn next(self) -> Option<ExitStep> {
        match self {
            ExitStep::FirstBack => Some(ExitStep::SecondBack),
            ExitStep::SecondBack => Some(ExitStep::Home),
            ExitStep::Home => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    DriveFlow,
    Exit(ExitStep),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timings {
    pub debounce_ms: u64,
    pub drive_delay_ms: u64,
    pub rescan_delay_ms: u64,
    pub exit_initial_delay_ms: u64,
    pub exit_step_delay_ms: u64,
}

impl From<&Config> for Timings {
    fn from(c: &Config) -> Self {
        Self {
            debounce_ms: c.debounce_ms,
            drive_delay_ms: c.drive_delay_ms,
            rescan_delay_ms: c.rescan_delay_ms,
            exit_initial_delay_ms: c.exit_initial_delay_ms,
            exit_step_delay_ms: c.exit_step_delay_ms,
        }
    }
}

pub struct AutomationService<H, S, C> {
    host: H,
    arming: ArmingStore<S, C>,
    driver: FlowDriver,
    timings: Timings,
    scheduler: Scheduler<Task>,
    last_tick: Option<u64>,
    state: FlowState,
    passes: u64,
}

impl<H: AccessibilityHost, S: PrefStore, C: Clock> AutomationService<H, S, C> {
    pub fn new(host: H, arming: ArmingStore<S, C>, config: &Config) -> Self {
        let limits = ClickLimits {
            max_ancestor: config.max_ancestor,
            max_parent_walk: config.max_parent_walk,
        };
        Self {
            host,
            arming,
            driver: FlowDriver::new(limits),
            timings: Timings::from(config),
            scheduler: Scheduler::new(),
            last_tick: None,
            state: FlowState::Idle,
            passes: 0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn arming(&self) -> &ArmingStore<S, C> {
        &self.arming
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Passes actually evaluated against a screen (stale ones excluded).
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn pending(&self) -> usize {
        self.scheduler.len()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    /// Returns whether a pass got scheduled.
    pub fn on_accessibility_event(&mut self, event: &AccessibilityEvent) -> bool {
        if !self.arming.is_active() {
            return false;
        }
        let now = self.arming.now_ms();
        if let Some(last) = self.last_tick {
            if now.saturating_sub(last) < self.timings.debounce_ms {
                return false;
            }
        }
        self.last_tick = Some(now);
        // Done here means re-armed since the last run
        if matches!(self.state, FlowState::Idle | FlowState::Done) {
            self.state = FlowState::LocateStorage;
        }
        debug!(kind = ?event.kind, package = ?event.package, "event: scheduling pass");
        self.scheduler.post_delayed(now, self.timings.drive_delay_ms, Task::DriveFlow);
        true
    }

    /// Interrupts are ignored.
    pub fn on_interrupt(&mut self) {}

    /// Run the tasks that were due when called. Returns how many ran.
    pub fn run_due(&mut self) -> usize {
        let batch = self.scheduler.take_due(self.arming.now_ms());
        let ran = batch.len();
        for task in batch {
            match task {
                Task::DriveFlow => self.drive_flow(),
                Task::Exit(step) => self.run_exit_step(step),
            }
        }
        ran
    }

    fn drive_flow(&mut self) {
        // Nothing cancels queued passes; they die here instead.
        if !self.arming.is_active() {
            debug!("pass: stale, skipped");
            if self.state != FlowState::Done {
                self.state = FlowState::Idle;
            }
            return;
        }

        let outcome = {
            let root = self.host.root_in_active_window();
            self.driver.run_pass(root.as_ref())
        };
        self.passes += 1;
        if let Some(next) = outcome.next_state() {
            self.state = next;
        }
        debug!(?outcome, state = %self.state, "pass");

        match outcome {
            PassOutcome::StorageOpened(hit) => {
                info!(depth = hit.depth, "storage entry clicked");
            }
            PassOutcome::CacheCleared(hit) => {
                info!(depth = hit.depth, "clear cache clicked");
                self.post_clear_and_exit();
            }
            PassOutcome::Scrolled => {
                let now = self.arming.now_ms();
                self.scheduler.post_delayed(now, self.timings.rescan_delay_ms, Task::DriveFlow);
            }
            PassOutcome::NoWindow | PassOutcome::Stalled => {}
        }
    }

    fn post_clear_and_exit(&mut self) {
        if let Err(e) = self.arming.set_done(true) {
            warn!("could not persist done flag: {e}");
        }
        let now = self.arming.now_ms();
        self.scheduler.post_delayed(
            now,
            self.timings.exit_initial_delay_ms,
            Task::Exit(ExitStep::FirstBack),
        );
    }

    fn run_exit_step(&mut self, step: ExitStep) {
        let action = step.action();
        let ok = self.host.perform_global_action(action);
        info!(?step, %action, ok, "exit");
        if let Some(next) = step.next() {
            let now = self.arming.now_ms();
            self.scheduler.post_delayed(now, self.timings.exit_step_delay_ms, Task::Exit(next));
        }
    }
}
