// autoclear — Automated App Cache Clearing Through the Accessibility Layer
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Arming flags and the key-value stores that hold them.
//!
//! Only two keys exist: `arm_until` (ms timestamp) and `done`. Entry points
//! arm, the flow driver marks done, and every pass rechecks both.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::error::Result;

pub const KEY_ARM_UNTIL: &str = "arm_until";
pub const KEY_DONE: &str = "done";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefValue {
    Long(i64),
    Bool(bool),
}

/// Minimal key-value surface. `&self` everywhere: stores are shared between
/// the service and the entry points on one thread.
pub trait PrefStore {
    fn get(&self, key: &str) -> Result<Option<PrefValue>>;
    fn set(&self, key: &str, value: PrefValue) -> Result<()>;
}

impl<S: PrefStore + ?Sized> PrefStore for &S {
    fn get(&self, key: &str) -> Result<Option<PrefValue>> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: PrefValue) -> Result<()> {
        (**self).set(key, value)
    }
}

impl<S: PrefStore + ?Sized> PrefStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<PrefValue>> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: PrefValue) -> Result<()> {
        (**self).set(key, value)
    }
}

// ── In-memory ───────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryPrefs {
    map: RefCell<HashMap<String, PrefValue>>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrefStore for MemoryPrefs {
    fn get(&self, key: &str) -> Result<Option<PrefValue>> {
        Ok(self.map.borrow().get(key).copied())
    }

    fn set(&self, key: &str, value: PrefValue) -> Result<()> {
        self.map.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

// ── SQLite ──────────────────────────────────────────

pub struct SqlitePrefs {
    conn: Connection,
}

impl SqlitePrefs {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        // busy_timeout: the CLI and a running host may touch the file at once
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA busy_timeout=500;")?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS prefs (
                key   TEXT PRIMARY KEY,
                kind  TEXT NOT NULL,
                value INTEGER NOT NULL
            );
            ",
        )?;
        Ok(Self { conn })
    }
}

impl PrefStore for SqlitePrefs {
    fn get(&self, key: &str) -> Result<Option<PrefValue>> {
        let row: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT kind, value FROM prefs WHERE key=?1",
                params![key],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
        Ok(row.and_then(|(kind, v)| match kind.as_str() {
            "long" => Some(PrefValue::Long(v)),
            "bool" => Some(PrefValue::Bool(v != 0)),
            _ => None,
        }))
    }

    fn set(&self, key: &str, value: PrefValue) -> Result<()> {
        let (kind, v) = match value {
            PrefValue::Long(n) => ("long", n),
            PrefValue::Bool(b) => ("bool", b as i64),
        };
        self.conn.execute(
            "INSERT INTO prefs(key, kind, value) VALUES(?1, ?2, ?3) \
             ON CONFLICT(key) DO UPDATE SET kind=excluded.kind, value=excluded.value",
            params![key, kind, v],
        )?;
        Ok(())
    }
}

// ── Arming store ────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmingState {
    pub arm_until: u64,
    pub done: bool,
    pub armed: bool,
}

/// Typed view over the two flags.
///
/// Failed reads are absorbed in the direction that stops automation: an
/// unreadable `arm_until` is "not armed", an unreadable `done` is "done".
pub struct ArmingStore<S, C> {
    prefs: S,
    clock: C,
}

impl<S: PrefStore, C: Clock> ArmingStore<S, C> {
    pub fn new(prefs: S, clock: C) -> Self {
        Self { prefs, clock }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Arm for `window_ms` from now and clear the completion flag.
    pub fn schedule_auto_run(&self, window_ms: u64) -> Result<()> {
        let until = self.clock.now_ms().saturating_add(window_ms);
        // stored as i64; clamp so huge windows stay armed instead of wrapping
        let stored = i64::try_from(until).unwrap_or(i64::MAX);
        self.prefs.set(KEY_ARM_UNTIL, PrefValue::Long(stored))?;
        self.prefs.set(KEY_DONE, PrefValue::Bool(false))?;
        info!(until, window_ms, "armed");
        Ok(())
    }

    pub fn disarm(&self) -> Result<()> {
        self.prefs.set(KEY_ARM_UNTIL, PrefValue::Long(0))?;
        info!("disarmed");
        Ok(())
    }

    pub fn arm_until(&self) -> Result<u64> {
        Ok(match self.prefs.get(KEY_ARM_UNTIL)? {
            Some(PrefValue::Long(n)) if n > 0 => n as u64,
            _ => 0,
        })
    }

    pub fn is_armed(&self) -> bool {
        match self.arm_until() {
            Ok(until) => self.clock.now_ms() < until,
            Err(e) => {
                warn!("is_armed: read failed, treating as disarmed: {e}");
                false
            }
        }
    }

    pub fn set_done(&self, v: bool) -> Result<()> {
        self.prefs.set(KEY_DONE, PrefValue::Bool(v))
    }

    pub fn is_done(&self) -> bool {
        match self.prefs.get(KEY_DONE) {
            Ok(Some(PrefValue::Bool(b))) => b,
            Ok(_) => false,
            Err(e) => {
                warn!("is_done: read failed, treating as done: {e}");
                true
            }
        }
    }

    /// Armed and not yet done: the only state in which the flow may act.
    pub fn is_active(&self) -> bool {
        self.is_armed() && !self.is_done()
    }

    pub fn snapshot(&self) -> ArmingState {
        ArmingState {
            arm_until: self.arm_until().unwrap_or(0),
            done: self.is_done(),
            armed: self.is_armed(),
        }
    }
}
