// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use clap::ValueEnum;
use gpiosysfs::Level;
use std::time::Duration;

// common helper functions

pub fn format_error(verbose: bool, e: &anyhow::Error) -> String {
    if verbose {
        format!("{e:#}")
    } else {
        format!("{e}")
    }
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum ParseDurationError {
    #[error("'{0}' unknown units - use 's', 'ms' or 'us'.")]
    Units(String),
    #[error("'{0}' must start with a digit")]
    NoDigits(String),
    #[error("'{0}' {1}")]
    ParseDigits(String, std::num::ParseIntError),
    #[error("'{0}' is too large")]
    Overflow(String),
}

pub fn parse_duration(s: &str) -> std::result::Result<Duration, ParseDurationError> {
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    let (num, scale) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(0) => return Err(ParseDurationError::NoDigits(s.into())),
        Some(n) => {
            let (num, units) = s.split_at(n);
            let scale: u64 = match units {
                "us" => 1000,
                "ms" => 1000000,
                "s" => 1000000000,
                _ => return Err(ParseDurationError::Units(s.into())),
            };
            (num, scale)
        }
        None => (s, 1000000),
    };
    let t = num
        .parse::<u64>()
        .map_err(|e| ParseDurationError::ParseDigits(num.into(), e))?;
    t.checked_mul(scale)
        .map(Duration::from_nanos)
        .ok_or_else(|| ParseDurationError::Overflow(s.into()))
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum LevelOpt {
    /// Physically low, or '0'
    #[default]
    Low,
    /// Physically high, or '1'
    High,
}

impl From<LevelOpt> for Level {
    fn from(l: LevelOpt) -> Self {
        match l {
            LevelOpt::Low => Level::Low,
            LevelOpt::High => Level::High,
        }
    }
}
