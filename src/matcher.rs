// autoclear — Automated App Cache Clearing Through the Accessibility Layer
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Text matching and click heuristics over an arbitrary Settings tree.
//!
//! Vendor Settings screens put the label on a plain text view inside a
//! clickable row, so a hit on the label is turned into a click by walking up
//! until something accepts it.

use tracing::debug;

use crate::node::{NodeAction, UiNode};

// ── Candidate labels (English + Thai) ───────────────

/// Menu entry leading to the per-app storage page. Matched as substring.
pub const STORAGE_TEXTS: &[&str] = &[
    "Storage",
    "Storage & cache",
    "Storage used",
    "ที่เก็บข้อมูล",
    "พื้นที่เก็บข้อมูล",
    "พื้นที่จัดเก็บ",
    "พื้นที่จัดเก็บข้อมูล",
    "พื้นที่จัดเก็บและแคช",
    "การใช้งานที่เก็บข้อมูล",
    "ที่จัดเก็บข้อมูล",
];

/// The only button the automation presses on the storage page. Exact match.
pub const SAFE_CLEAR_TEXTS: &[&str] = &["Clear cache", "ล้างแคช", "ลบแคช", "เคลียร์แคช"];

/// Wipes user data. Only ever looked at, never clicked.
pub const DANGEROUS_TEXTS: &[&str] = &[
    "Clear data",
    "Clear storage",
    "ล้างข้อมูล",
    "ล้างข้อมูลทั้งหมด",
    "ล้างพื้นที่จัดเก็บ",
    "ล้างข้อมูลแอป",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Contains,
}

/// Where a click landed: index of the matching node among all matches, and
/// how many hops above it the accepting node sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClickHit {
    pub candidate: usize,
    pub depth: usize,
}

/// Limits for the two nested upward walks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClickLimits {
    /// Levels above a match that are retried as a fresh click target.
    pub max_ancestor: usize,
    /// Parents probed by a single click attempt.
    pub max_parent_walk: usize,
}

impl Default for ClickLimits {
    fn default() -> Self {
        Self {
            max_ancestor: crate::config::MAX_ANCESTOR,
            max_parent_walk: crate::config::MAX_PARENT_WALK,
        }
    }
}

/// Non-blank text, then non-blank description.
pub fn node_texts<N: UiNode>(n: &N) -> Vec<String> {
    [n.text(), n.description()]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect()
}

pub fn matches(text: &str, options: &[&str], mode: MatchMode) -> bool {
    let t = text.trim().to_lowercase();
    if t.is_empty() {
        return false;
    }
    options.iter().any(|opt| {
        let o = opt.to_lowercase();
        match mode {
            MatchMode::Exact => t == o,
            MatchMode::Contains => t.contains(&o),
        }
    })
}

fn node_matches<N: UiNode>(n: &N, options: &[&str], mode: MatchMode) -> bool {
    node_texts(n).iter().any(|t| matches(t, options, mode))
}

fn is_dangerous<N: UiNode>(n: &N) -> bool {
    node_matches(n, DANGEROUS_TEXTS, MatchMode::Exact)
}

/// Pre-order walk of the whole tree.
pub fn find_all_nodes<N: UiNode>(root: &N) -> Vec<N> {
    let mut out = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(n) = stack.pop() {
        let mut kids = n.children();
        out.push(n);
        kids.reverse();
        stack.extend(kids);
    }
    out
}

pub fn contains_texts<N: UiNode>(root: &N, options: &[&str], mode: MatchMode) -> bool {
    find_all_nodes(root).iter().any(|n| node_matches(n, options, mode))
}

/// One click attempt on `node`: direct click, focus + click, then up to
/// `max_parent_walk` clickable parents. Returns hops to the accepting node.
pub fn try_click_node<N: UiNode>(node: &N, max_parent_walk: usize) -> Option<usize> {
    if node.is_clickable() && node.perform_click() {
        return Some(0);
    }
    // Some rows only react once they hold accessibility focus
    node.perform(NodeAction::AccessibilityFocus);
    if node.perform_click() {
        return Some(0);
    }
    let mut p = node.parent();
    let mut depth = 0;
    while let Some(cur) = p {
        if depth >= max_parent_walk {
            break;
        }
        if cur.is_clickable() && cur.perform_click() {
            return Some(depth + 1);
        }
        p = cur.parent();
        depth += 1;
    }
    None
}

/// Click the first matching node that can be made to accept a click, trying
/// each match and its ancestors in turn.
///
/// Nodes carrying a dangerous label are never candidates, even when they
/// also match `options` ("Clear storage" contains "Storage").
pub fn click_by_texts_with_ancestor<N: UiNode>(
    root: &N,
    options: &[&str],
    mode: MatchMode,
    limits: ClickLimits,
) -> Option<ClickHit> {
    let candidates: Vec<N> = find_all_nodes(root)
        .into_iter()
        .filter(|n| node_matches(n, options, mode) && !is_dangerous(n))
        .collect();
    debug!(count = candidates.len(), "click: candidates");

    for (i, n) in candidates.iter().enumerate() {
        let mut cur = Some(n.clone());
        let mut level = 0;
        while let Some(c) = cur {
            if level > limits.max_ancestor {
                break;
            }
            if let Some(hops) = try_click_node(&c, limits.max_parent_walk) {
                return Some(ClickHit { candidate: i, depth: level + hops });
            }
            cur = c.parent();
            level += 1;
        }
    }
    None
}

/// Scroll the first scrollable node forward once.
pub fn scroll_any<N: UiNode>(root: &N) -> bool {
    find_all_nodes(root)
        .into_iter()
        .find(|n| n.is_scrollable())
        .map(|n| n.perform_scroll())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{NodeSpec, SyntheticTree};
    use rstest::rstest;

    #[rstest]
    #[case("Clear cache", true)]
    #[case("  CLEAR CACHE \n", true)]
    #[case("ล้างแคช", true)]
    #[case("Clear cache now", false)]
    #[case("Clear data", false)]
    #[case("   ", false)]
    #[case("", false)]
    fn exact_matching(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(matches(text, SAFE_CLEAR_TEXTS, MatchMode::Exact), expected);
    }

    #[rstest]
    #[case("Storage", true)]
    #[case("Storage & cache", true)]
    #[case("Internal storage used: 12 MB", true)]
    #[case("การใช้งานที่เก็บข้อมูล 3 MB", true)]
    #[case("Permissions", false)]
    #[case("Stora", false)]
    fn contains_matching(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(matches(text, STORAGE_TEXTS, MatchMode::Contains), expected);
    }

    #[test]
    fn every_candidate_matches_itself() {
        for list in [STORAGE_TEXTS, SAFE_CLEAR_TEXTS, DANGEROUS_TEXTS] {
            for c in list {
                assert!(matches(c, list, MatchMode::Exact), "{c}");
                assert!(matches(&format!(" {} ", c.to_uppercase()), list, MatchMode::Contains), "{c}");
            }
        }
    }

    #[test]
    fn texts_skip_blank_fields() {
        let mut t = SyntheticTree::new(NodeSpec::new().text("  ").desc("Storage"));
        let both = t.add(SyntheticTree::ROOT, NodeSpec::new().text("A").desc("B"));
        assert_eq!(node_texts(&t.root()), vec!["Storage".to_string()]);
        assert_eq!(node_texts(&t.node(both)), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn walk_is_preorder() {
        let mut t = SyntheticTree::new(NodeSpec::label("0"));
        let a = t.add(SyntheticTree::ROOT, NodeSpec::label("1"));
        t.add(a, NodeSpec::label("2"));
        t.add(a, NodeSpec::label("3"));
        t.add(SyntheticTree::ROOT, NodeSpec::label("4"));
        let order: Vec<String> = find_all_nodes(&t.root()).iter().filter_map(|n| n.text()).collect();
        assert_eq!(order, ["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn description_alone_can_match() {
        let mut t = SyntheticTree::new(NodeSpec::new());
        t.add(SyntheticTree::ROOT, NodeSpec::new().desc("Clear data"));
        assert!(contains_texts(&t.root(), DANGEROUS_TEXTS, MatchMode::Exact));
        assert!(!contains_texts(&t.root(), SAFE_CLEAR_TEXTS, MatchMode::Exact));
    }

    #[test]
    fn clickable_match_is_clicked_directly() {
        let mut t = SyntheticTree::new(NodeSpec::new());
        let btn = t.add(SyntheticTree::ROOT, NodeSpec::label("Clear cache").clickable());
        let hit = click_by_texts_with_ancestor(&t.root(), SAFE_CLEAR_TEXTS, MatchMode::Exact, ClickLimits::default());
        assert_eq!(hit, Some(ClickHit { candidate: 0, depth: 0 }));
        assert_eq!(t.clicked(), vec![btn]);
        // no focus request needed
        assert_eq!(t.actions().len(), 1);
    }

    #[test]
    fn label_inside_clickable_grandparent() {
        let mut t = SyntheticTree::new(NodeSpec::new());
        let row = t.add(SyntheticTree::ROOT, NodeSpec::new().clickable());
        let wrap = t.add(row, NodeSpec::new());
        let label = t.add(wrap, NodeSpec::label("Clear cache"));

        let hit = click_by_texts_with_ancestor(&t.root(), SAFE_CLEAR_TEXTS, MatchMode::Exact, ClickLimits::default());
        assert_eq!(hit, Some(ClickHit { candidate: 0, depth: 2 }));
        assert_eq!(t.clicked(), vec![row]);

        let log = t.actions();
        assert_eq!(log[0].node, label);
        assert_eq!(log[0].action, NodeAction::AccessibilityFocus);
        assert_eq!(log[1].node, label);
        assert_eq!(log[1].action, NodeAction::Click);
        assert!(!log[1].accepted);
    }

    #[test]
    fn parent_walk_is_bounded() {
        let mut t = SyntheticTree::new(NodeSpec::new().clickable());
        let mut cur = SyntheticTree::ROOT;
        for _ in 0..9 {
            cur = t.add(cur, NodeSpec::new());
        }
        let leaf = t.add(cur, NodeSpec::label("x"));
        // root is 10 hops above the leaf
        assert_eq!(try_click_node(&t.node(leaf), 8), None);
        assert_eq!(try_click_node(&t.node(leaf), 10), Some(10));
    }

    #[test]
    fn ancestor_retry_extends_reach() {
        let mut t = SyntheticTree::new(NodeSpec::new().clickable());
        let mut cur = SyntheticTree::ROOT;
        for _ in 0..9 {
            cur = t.add(cur, NodeSpec::new());
        }
        t.add(cur, NodeSpec::label("Clear cache"));
        let limits = ClickLimits { max_ancestor: 6, max_parent_walk: 8 };
        let hit = click_by_texts_with_ancestor(&t.root(), SAFE_CLEAR_TEXTS, MatchMode::Exact, limits);
        assert_eq!(hit.map(|h| h.depth), Some(10));
        assert_eq!(t.clicked(), vec![SyntheticTree::ROOT]);
    }

    #[test]
    fn falls_through_to_next_candidate() {
        let mut t = SyntheticTree::new(NodeSpec::new());
        t.add(SyntheticTree::ROOT, NodeSpec::label("Storage"));
        let second = t.add(SyntheticTree::ROOT, NodeSpec::label("Storage used").clickable());
        let limits = ClickLimits { max_ancestor: 0, max_parent_walk: 0 };
        let hit = click_by_texts_with_ancestor(&t.root(), STORAGE_TEXTS, MatchMode::Contains, limits);
        assert_eq!(hit, Some(ClickHit { candidate: 1, depth: 0 }));
        assert_eq!(t.clicked(), vec![second]);
    }

    #[test]
    fn clear_storage_is_not_a_storage_entry() {
        let mut t = SyntheticTree::new(NodeSpec::new());
        t.add(SyntheticTree::ROOT, NodeSpec::label("Clear storage").clickable());
        t.add(SyntheticTree::ROOT, NodeSpec::label("ล้างพื้นที่จัดเก็บ").clickable());
        let hit = click_by_texts_with_ancestor(&t.root(), STORAGE_TEXTS, MatchMode::Contains, ClickLimits::default());
        assert_eq!(hit, None);
        assert!(t.actions().is_empty());
    }

    #[test]
    fn scroll_hits_first_scrollable_only() {
        let mut t = SyntheticTree::new(NodeSpec::new());
        let list = t.add(SyntheticTree::ROOT, NodeSpec::new().scrollable());
        t.add(SyntheticTree::ROOT, NodeSpec::new().scrollable());
        t.add(list, NodeSpec::label("Permissions"));

        assert!(scroll_any(&t.root()));
        let log = t.actions();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].node, list);
        assert_eq!(log[0].action, NodeAction::ScrollForward);
    }

    #[test]
    fn nothing_to_scroll() {
        let t = SyntheticTree::new(NodeSpec::label("Clear data").clickable());
        assert!(!scroll_any(&t.root()));
        assert!(t.actions().is_empty());
    }
}
