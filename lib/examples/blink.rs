// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Example of blinking a pin, blocking until the sequence is complete.

use gpiosysfs::{Blinker, Level, Pin};

fn main() -> gpiosysfs::Result<()> {
    let mut led = Pin::acquire(12, gpiosysfs::Direction::Out, Level::Low, true, "led")?;
    let res = Blinker::default().run(&mut led);
    led.release();
    res
}
