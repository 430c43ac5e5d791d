// autoclear — Automated App Cache Clearing Through the Accessibility Layer
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

// ── Logging (ring buffer in RAM, flushed to disk) ───

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "AUTOCLEAR_LOG";
pub const LOG_MAX: usize = 100;

/// Keeps the last `LOG_MAX` lines and rewrites the whole file after every
/// event, so the file never grows past that.
#[derive(Debug)]
pub struct RingLog {
    path: PathBuf,
    buf: Mutex<VecDeque<String>>,
}

impl RingLog {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf(), buf: Mutex::new(VecDeque::with_capacity(LOG_MAX + 1)) }
    }

    fn push(&self, chunk: &[u8]) {
        let text = String::from_utf8_lossy(chunk);
        let content = {
            let mut buf = match self.buf.lock() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            for line in text.lines() {
                buf.push_back(line.to_string());
            }
            while buf.len() > LOG_MAX {
                buf.pop_front();
            }
            buf.iter().map(|l| l.as_str()).collect::<Vec<_>>().join("\n") + "\n"
        };
        // lock released before IO
        let _ = fs::write(&self.path, content);
    }

    pub fn lines(&self) -> Vec<String> {
        match self.buf.lock() {
            Ok(g) => g.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }
}

/// One formatted event; handed to the ring when dropped.
pub struct RingWriter<'a> {
    ring: &'a RingLog,
    pending: Vec<u8>,
}

impl io::Write for RingWriter<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for RingWriter<'_> {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            self.ring.push(&self.pending);
        }
    }
}

impl<'a> MakeWriter<'a> for RingLog {
    type Writer = RingWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RingWriter { ring: self, pending: Vec::new() }
    }
}

/// Stderr always, plus the ring file when configured. Level comes from
/// `AUTOCLEAR_LOG`, `info` by default. Safe to call twice.
pub fn init(log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = log_file.map(|p| {
        if let Some(dir) = p.parent() {
            let _ = fs::create_dir_all(dir);
        }
        fmt::layer().with_ansi(false).with_target(false).with_writer(RingLog::new(p))
    });
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn keeps_only_the_newest_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoclear.log");
        let ring = RingLog::new(&path);
        for i in 0..(LOG_MAX + 5) {
            let mut w = ring.make_writer();
            writeln!(w, "line {i}").unwrap();
        }
        let lines = ring.lines();
        assert_eq!(lines.len(), LOG_MAX);
        assert_eq!(lines[0], "line 5");

        let on_disk = fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk.lines().count(), LOG_MAX);
        assert!(on_disk.ends_with(&format!("line {}\n", LOG_MAX + 4)));
    }

    #[test]
    fn multi_line_events_split() {
        let dir = tempfile::tempdir().unwrap();
        let ring = RingLog::new(&dir.path().join("x.log"));
        {
            let mut w = ring.make_writer();
            w.write_all(b"a\n").unwrap();
            w.write_all(b"b\n").unwrap();
        }
        assert_eq!(ring.lines(), vec!["a".to_string(), "b".to_string()]);
    }
}
