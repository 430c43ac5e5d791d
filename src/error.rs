// autoclear — Automated App Cache Clearing Through the Accessibility Layer
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use thiserror::Error;

use crate::intents::Intent;

#[derive(Debug, Error)]
pub enum Error {
    #[error("preference store: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config: {0}")]
    InvalidConfig(&'static str),

    #[error("no activity handles {0}")]
    ActivityNotFound(Intent),
}

pub type Result<T> = std::result::Result<T, Error>;
