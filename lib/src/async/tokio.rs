// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Blinker, Pin, Result};

/// Async form of [`Blinker::run`].
///
/// The delay between toggles is a tokio sleep, so other tasks are free to
/// run while the pin is waiting to be toggled.
///
/// There is no explicit cancellation.  Dropping the returned future, e.g. by
/// wrapping it in [`tokio::time::timeout`], stops the sequence at its next
/// delay and leaves the pin with the caller.
///
/// # Examples
/// ```no_run
/// # async fn example() -> Result<(), gpiosysfs::Error> {
/// use gpiosysfs::{Blinker, Level, Pin};
///
/// let mut led = Pin::builder(12).as_output(Level::Low).acquire()?;
/// gpiosysfs::tokio::run(&Blinker::default(), &mut led).await?;
/// led.release();
/// # Ok(())
/// # }
/// ```
///
/// [`tokio::time::timeout`]: ::tokio::time::timeout
pub async fn run(blinker: &Blinker, pin: &mut Pin) -> Result<()> {
    for i in 0..blinker.iterations {
        pin.toggle()?;
        log::trace!("gpio{} blink {}/{}", pin.number(), i + 1, blinker.iterations);
        ::tokio::time::sleep(blinker.interval).await;
    }
    Ok(())
}
