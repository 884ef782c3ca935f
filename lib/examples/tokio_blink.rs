// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Example of blinking a pin from a tokio task.

use gpiosysfs::{Blinker, Level, Pin};
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() -> gpiosysfs::Result<()> {
    let mut led = Pin::builder(12)
        .as_output(Level::Low)
        .force_reacquire()
        .with_label("led")
        .acquire()?;
    let blinker = Blinker::new(10, Duration::from_millis(250));
    let res = gpiosysfs::tokio::run(&blinker, &mut led).await;
    led.release();
    res
}
