// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of reading the level of a single input pin.

use anyhow::Context;
use gpiosysfs::Pin;

fn main() -> anyhow::Result<()> {
    let pin = Pin::builder(22)
        .as_input()
        .acquire()
        .context("failed to acquire gpio22")?;
    println!("gpio{}: {} {}", pin.number(), pin.direction()?, pin.level()?);
    pin.release();
    Ok(())
}
