// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of toggling a single pin.

use gpiosysfs::{Level, Pin};
use std::thread;
use std::time::Duration;

fn main() -> gpiosysfs::Result<()> {
    let mut pin = Pin::builder(22)
        .as_output(Level::High)
        .with_label("toggle_pin_level")
        .acquire()?;

    loop {
        thread::sleep(Duration::from_millis(500));
        pin.toggle()?;
        println!("{}", pin.level()?);
    }
}
