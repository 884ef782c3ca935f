// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::Error;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The direction of a pin.
///
/// Encoded in the pin's `direction` attribute as:
///
/// | Direction | Encoding |
/// |-----------|----------|
/// | **In**    | `in`     |
/// | **Out**   | `out`    |
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// The pin senses the level of the line.
    #[default]
    In,
    /// The pin drives the level of the line.
    Out,
}

impl Direction {
    /// The encoding of the direction in the `direction` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    /// Decode the content of a `direction` attribute.
    ///
    /// Surrounding whitespace is ignored, otherwise the match is exact.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            raw => Err(Error::UnrecognizedState(raw.into())),
        }
    }
}

/// The physical level of a pin.
///
/// Encoded in the pin's `value` attribute as:
///
/// | Level    | Encoding |
/// |----------|----------|
/// | **Low**  | `0`      |
/// | **High** | `1`      |
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Level {
    /// The line is low.
    #[default]
    Low,
    /// The line is high.
    High,
}

impl Level {
    /// The level opposite the current level.
    pub fn not(&self) -> Level {
        match self {
            Level::High => Level::Low,
            Level::Low => Level::High,
        }
    }

    /// The encoding of the level in the `value` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "0",
            Level::High => "1",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::High => "high",
            Level::Low => "low",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Level {
    type Err = Error;

    /// Decode the content of a `value` attribute.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(Level::Low),
            "1" => Ok(Level::High),
            raw => Err(Error::UnrecognizedState(raw.into())),
        }
    }
}

impl From<Level> for bool {
    fn from(l: Level) -> bool {
        match l {
            Level::Low => false,
            Level::High => true,
        }
    }
}

impl From<bool> for Level {
    fn from(b: bool) -> Level {
        match b {
            false => Level::Low,
            true => Level::High,
        }
    }
}
