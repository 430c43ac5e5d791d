// autoclear — Automated App Cache Clearing Through the Accessibility Layer
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use autoclear::clock::{Clock, ManualClock, WallClock};
use autoclear::entry::TileOutcome;
use autoclear::sim::{SimOptions, Simulation};
use autoclear::{logging, ArmingStore, Config, MemoryPrefs, Result, SqlitePrefs};

#[derive(Parser)]
#[command(name = "autoclear", version, about = "Clear one app's cache through the Settings accessibility tree")]
struct Cli {
    /// TOML config; defaults apply when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Arm the flow in the preference store
    Arm {
        #[arg(long)]
        window_ms: Option<u64>,
    },
    /// Drop the arming window
    Disarm,
    /// Show the arming flags
    Status,
    /// Run the whole flow against simulated Settings screens
    Simulate {
        /// Vendor without the direct storage intent
        #[arg(long)]
        storage_intent_unsupported: bool,
        /// Accessibility service not enabled yet
        #[arg(long)]
        service_disabled: bool,
        /// Start from the launcher button instead of the tile
        #[arg(long)]
        launcher: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref())?;
    logging::init(config.log_file.as_deref());
    info!("=== autoclear START ===");

    match cli.cmd {
        Command::Arm { window_ms } => {
            let store = ArmingStore::new(SqlitePrefs::open(&config.db_path)?, WallClock);
            let window = window_ms.unwrap_or(config.arm_window_ms);
            store.schedule_auto_run(window)?;
            println!("armed for {window} ms ({})", config.db_path.display());
        }
        Command::Disarm => {
            let store = ArmingStore::new(SqlitePrefs::open(&config.db_path)?, WallClock);
            store.disarm()?;
            println!("disarmed");
        }
        Command::Status => {
            let store = ArmingStore::new(SqlitePrefs::open(&config.db_path)?, WallClock);
            let s = store.snapshot();
            let left = s.arm_until.saturating_sub(store.now_ms());
            println!("armed:     {}", s.armed);
            println!("done:      {}", s.done);
            println!("arm_until: {} ({left} ms left)", s.arm_until);
        }
        Command::Simulate { storage_intent_unsupported, service_disabled, launcher } => {
            let opts = SimOptions {
                storage_intent_supported: !storage_intent_unsupported,
                service_enabled: !service_disabled,
                ..SimOptions::default()
            };
            let budget = config.arm_window_ms + config.exit_initial_delay_ms;
            let mut sim = Simulation::new(opts, MemoryPrefs::new(), ManualClock::new(0), config);
            if launcher {
                let status = sim.press_clear()?;
                println!("status: {status}");
            } else {
                match sim.tap_tile()? {
                    TileOutcome::NeedsAccessibility => println!("tile: accessibility settings opened"),
                    TileOutcome::Armed(intent) => println!("tile: armed, opened {intent}"),
                }
            }
            let ran = sim.run_for(budget);
            let report = sim.settings().report();
            println!("tasks run:     {ran}");
            println!("flow state:    {}", sim.service().state());
            println!("screens:       {:?}", report.visited);
            println!("global:        {:?}", report.globals);
            println!("cache cleared: {}", report.cache_cleared);
            println!("data wiped:    {}", report.data_wiped);
            println!("ended at {} ms on {:?}", sim.clock().now_ms(), sim.settings().screen());
        }
    }

    info!("=== autoclear EXIT ===");
    Ok(())
}
