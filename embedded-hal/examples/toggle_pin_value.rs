// SPDX-FileCopyrightText: 2024 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of toggling a single pin.

use embedded_hal::digital::{PinState, StatefulOutputPin};
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut pin = gpiosysfs_embedded_hal::OutputPin::from_number(22, PinState::High)?;

    loop {
        thread::sleep(Duration::from_millis(500));
        println!("toggle pin...");
        pin.toggle()?;
    }
}
