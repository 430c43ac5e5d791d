// autoclear — Automated App Cache Clearing Through the Accessibility Layer
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! One inspection pass over the current screen.

use std::fmt;

use tracing::debug;

use crate::matcher::{
    click_by_texts_with_ancestor, contains_texts, scroll_any, ClickHit, ClickLimits, MatchMode,
    DANGEROUS_TEXTS, SAFE_CLEAR_TEXTS, STORAGE_TEXTS,
};
use crate::node::UiNode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    /// Not armed, or armed but nothing seen yet.
    Idle,
    LocateStorage,
    LocateClearCache,
    ScrollAndRetry,
    Done,
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlowState::Idle => "idle",
            FlowState::LocateStorage => "locate-storage",
            FlowState::LocateClearCache => "locate-clear-cache",
            FlowState::ScrollAndRetry => "scroll-and-retry",
            FlowState::Done => "done",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// Host had no active window.
    NoWindow,
    /// Storage entry clicked; the next screen brings its own event.
    StorageOpened(ClickHit),
    /// Clear cache clicked; caller marks done and leaves Settings.
    CacheCleared(ClickHit),
    /// Nothing clickable, list scrolled; caller re-runs the pass.
    Scrolled,
    /// Nothing to click, nothing to scroll.
    Stalled,
}

impl PassOutcome {
    /// State the flow is in after this pass, `None` when it did not move.
    pub fn next_state(&self) -> Option<FlowState> {
        match self {
            PassOutcome::StorageOpened(_) => Some(FlowState::LocateClearCache),
            PassOutcome::CacheCleared(_) => Some(FlowState::Done),
            PassOutcome::Scrolled => Some(FlowState::ScrollAndRetry),
            PassOutcome::NoWindow | PassOutcome::Stalled => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FlowDriver {
    limits: ClickLimits,
}

impl FlowDriver {
    pub fn new(limits: ClickLimits) -> Self {
        Self { limits }
    }

    pub fn run_pass<N: UiNode>(&self, root: Option<&N>) -> PassOutcome {
        let Some(root) = root else {
            return PassOutcome::NoWindow;
        };

        if let Some(hit) = self.click_menu_storage(root) {
            return PassOutcome::StorageOpened(hit);
        }
        if let Some(hit) = self.click_clear_cache(root) {
            return PassOutcome::CacheCleared(hit);
        }
        if scroll_any(root) {
            return PassOutcome::Scrolled;
        }
        PassOutcome::Stalled
    }

    fn click_menu_storage<N: UiNode>(&self, root: &N) -> Option<ClickHit> {
        click_by_texts_with_ancestor(root, STORAGE_TEXTS, MatchMode::Contains, self.limits)
    }

    fn click_clear_cache<N: UiNode>(&self, root: &N) -> Option<ClickHit> {
        // Seeing "Clear data" only tells us we are on the storage page.
        // It is never a click target.
        let storage_page = contains_texts(root, DANGEROUS_TEXTS, MatchMode::Exact);
        debug!(storage_page, "pass: looking for clear cache");
        click_by_texts_with_ancestor(root, SAFE_CLEAR_TEXTS, MatchMode::Exact, self.limits)
    }
}
