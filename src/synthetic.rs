// autoclear — Automated App Cache Clearing Through the Accessibility Layer
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Arena-backed node trees that stand in for a host's accessibility tree.
//!
//! Every action request is recorded, accepted or not, so callers can assert
//! on exactly what the automation tried.

use std::cell::RefCell;
use std::fmt;

use crate::node::{NodeAction, UiNode};

pub type NodeId = usize;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeSpec {
    pub text: Option<String>,
    pub description: Option<String>,
    pub clickable: bool,
    pub scrollable: bool,
    pub tag: Option<&'static str>,
}

impl NodeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain non-clickable text view.
    pub fn label(text: &str) -> Self {
        Self::new().text(text)
    }

    pub fn text(mut self, t: &str) -> Self {
        self.text = Some(t.to_string());
        self
    }

    pub fn desc(mut self, d: &str) -> Self {
        self.description = Some(d.to_string());
        self
    }

    pub fn clickable(mut self) -> Self {
        self.clickable = true;
        self
    }

    pub fn scrollable(mut self) -> Self {
        self.scrollable = true;
        self
    }

    pub fn tag(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }
}

#[derive(Debug)]
struct NodeData {
    spec: NodeSpec,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionRecord {
    pub node: NodeId,
    pub action: NodeAction,
    pub accepted: bool,
}

#[derive(Debug)]
pub struct SyntheticTree {
    nodes: Vec<NodeData>,
    log: RefCell<Vec<ActionRecord>>,
}

impl SyntheticTree {
    pub const ROOT: NodeId = 0;

    pub fn new(root: NodeSpec) -> Self {
        Self {
            nodes: vec![NodeData { spec: root, parent: None, children: Vec::new() }],
            log: RefCell::new(Vec::new()),
        }
    }

    /// Append `spec` as the last child of `parent`.
    pub fn add(&mut self, parent: NodeId, spec: NodeSpec) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(NodeData { spec, parent: Some(parent), children: Vec::new() });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn root(&self) -> SyntheticNode<'_> {
        self.node(Self::ROOT)
    }

    pub fn node(&self, id: NodeId) -> SyntheticNode<'_> {
        SyntheticNode { tree: self, id }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn spec(&self, id: NodeId) -> &NodeSpec {
        &self.nodes[id].spec
    }

    pub fn find_tag(&self, tag: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.spec.tag == Some(tag))
    }

    pub fn actions(&self) -> Vec<ActionRecord> {
        self.log.borrow().clone()
    }

    pub fn take_actions(&self) -> Vec<ActionRecord> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    /// Nodes that accepted a click, in order.
    pub fn clicked(&self) -> Vec<NodeId> {
        self.log
            .borrow()
            .iter()
            .filter(|r| r.action == NodeAction::Click && r.accepted)
            .map(|r| r.node)
            .collect()
    }

    fn perform(&self, id: NodeId, action: NodeAction) -> bool {
        let spec = &self.nodes[id].spec;
        let accepted = match action {
            NodeAction::Click => spec.clickable,
            NodeAction::ScrollForward => spec.scrollable,
            NodeAction::AccessibilityFocus => true,
        };
        self.log.borrow_mut().push(ActionRecord { node: id, action, accepted });
        accepted
    }
}

#[derive(Clone, Copy)]
pub struct SyntheticNode<'t> {
    tree: &'t SyntheticTree,
    id: NodeId,
}

impl SyntheticNode<'_> {
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl fmt::Debug for SyntheticNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spec = self.tree.spec(self.id);
        f.debug_struct("SyntheticNode")
            .field("id", &self.id)
            .field("text", &spec.text)
            .field("tag", &spec.tag)
            .finish()
    }
}

impl PartialEq for SyntheticNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl UiNode for SyntheticNode<'_> {
    fn text(&self) -> Option<String> {
        self.tree.spec(self.id).text.clone()
    }

    fn description(&self) -> Option<String> {
        self.tree.spec(self.id).description.clone()
    }

    fn children(&self) -> Vec<Self> {
        self.tree.nodes[self.id]
            .children
            .iter()
            .map(|&c| self.tree.node(c))
            .collect()
    }

    fn parent(&self) -> Option<Self> {
        self.tree.nodes[self.id].parent.map(|p| self.tree.node(p))
    }

    fn is_clickable(&self) -> bool {
        self.tree.spec(self.id).clickable
    }

    fn is_scrollable(&self) -> bool {
        self.tree.spec(self.id).scrollable
    }

    fn perform(&self, action: NodeAction) -> bool {
        self.tree.perform(self.id, action)
    }
}
