// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Pin, Result};
use std::thread;
use std::time::Duration;

/// The default number of toggles performed by a [`Blinker`].
pub const DEFAULT_ITERATIONS: u32 = 50;

/// The default delay following each toggle performed by a [`Blinker`].
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(200);

/// Drives an output pin through a fixed number of toggles, with a fixed
/// delay following each toggle.
///
/// After an even number of iterations the pin is back at its starting
/// level, and after an odd number it is at the complement.
///
/// The first failed toggle ends the sequence and is returned.
///
/// The pin is borrowed, not consumed, so releasing it remains the
/// responsibility of the caller.
///
/// # Examples
/// ```no_run
/// # fn example() -> Result<(), gpiosysfs::Error> {
/// use gpiosysfs::{Blinker, Level, Pin};
/// use std::time::Duration;
///
/// let mut led = Pin::builder(12).as_output(Level::Low).acquire()?;
/// Blinker::new(4, Duration::from_millis(100)).run(&mut led)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Blinker {
    /// The number of toggles to perform.
    pub iterations: u32,

    /// The delay following each toggle.
    pub interval: Duration,
}

impl Default for Blinker {
    fn default() -> Self {
        Blinker {
            iterations: DEFAULT_ITERATIONS,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl Blinker {
    /// Create a Blinker performing `iterations` toggles with `interval`
    /// following each.
    pub fn new(iterations: u32, interval: Duration) -> Self {
        Blinker {
            iterations,
            interval,
        }
    }

    /// Blink the pin, blocking the calling thread until complete.
    ///
    /// For a pin that is not an output the toggles have no effect, but the
    /// delays are still performed.
    pub fn run(&self, pin: &mut Pin) -> Result<()> {
        for i in 0..self.iterations {
            pin.toggle()?;
            log::trace!("gpio{} blink {}/{}", pin.number(), i + 1, self.iterations);
            thread::sleep(self.interval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default() {
        let b = Blinker::default();
        assert_eq!(b.iterations, 50);
        assert_eq!(b.interval, Duration::from_millis(200));
    }

    #[test]
    fn new() {
        let b = Blinker::new(4, Duration::from_millis(5));
        assert_eq!(b.iterations, 4);
        assert_eq!(b.interval, Duration::from_millis(5));
    }
}
