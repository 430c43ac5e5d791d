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

/// Per-node actions the automation ever requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeAction {
    Click,
    AccessibilityFocus,
    ScrollForward,
}

/// Window-independent navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlobalAction {
    Back,
    Home,
}

impl fmt::Display for GlobalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GlobalAction::Back => "BACK",
            GlobalAction::Home => "HOME",
        })
    }
}

/// One node of the host's accessibility tree.
///
/// Handles are cheap to clone and never outlive the snapshot they came from.
/// The automation only reads nodes and asks for actions; it never mutates the
/// tree itself.
pub trait UiNode: Clone {
    fn text(&self) -> Option<String>;
    fn description(&self) -> Option<String>;
    fn children(&self) -> Vec<Self>;
    fn parent(&self) -> Option<Self>;
    fn is_clickable(&self) -> bool;
    fn is_scrollable(&self) -> bool;
    /// Returns whether the host accepted the action.
    fn perform(&self, action: NodeAction) -> bool;

    fn perform_click(&self) -> bool {
        self.perform(NodeAction::Click)
    }

    fn perform_scroll(&self) -> bool {
        self.perform(NodeAction::ScrollForward)
    }
}

/// Kinds of accessibility events the host forwards. The flow reacts to all
/// of them the same way; the kind only shows up in logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    WindowStateChanged,
    WindowContentChanged,
    ViewScrolled,
    ViewClicked,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessibilityEvent {
    pub kind: EventKind,
    pub package: Option<String>,
}

impl AccessibilityEvent {
    pub fn new(kind: EventKind, package: impl Into<String>) -> Self {
        Self { kind, package: Some(package.into()) }
    }
}

/// The accessibility runtime, as seen by the service.
pub trait AccessibilityHost {
    type Node<'a>: UiNode
    where
        Self: 'a;

    /// Root of the currently active window, if any.
    fn root_in_active_window(&self) -> Option<Self::Node<'_>>;
    fn perform_global_action(&self, action: GlobalAction) -> bool;
}
