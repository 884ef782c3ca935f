// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use gpiosysfs::{Blinker, Error, Level, Pin};
use gpiosysfs_sim as sim;
use std::time::{Duration, Instant};

const INTERVAL: Duration = Duration::from_millis(2);

fn output(s: &sim::Sim, number: u32, level: Level) -> Pin {
    Pin::builder(number)
        .on_root(s.root())
        .as_output(level)
        .acquire()
        .unwrap()
}

#[test]
fn even_iterations_restore_level() {
    let s = sim::simpleton(&[12]);

    let mut pin = output(&s, 12, Level::Low);
    Blinker::new(4, INTERVAL).run(&mut pin).unwrap();
    assert_eq!(pin.level().unwrap(), Level::Low);
    assert_eq!(s.get_level(12).unwrap(), sim::Level::Low);
}

#[test]
fn odd_iterations_complement_level() {
    let s = sim::simpleton(&[12]);

    let mut pin = output(&s, 12, Level::Low);
    Blinker::new(5, INTERVAL).run(&mut pin).unwrap();
    assert_eq!(pin.level().unwrap(), Level::High);
    assert_eq!(s.get_level(12).unwrap(), sim::Level::High);
    pin.release();

    let mut pin = output(&s, 12, Level::High);
    Blinker::new(1, INTERVAL).run(&mut pin).unwrap();
    assert_eq!(pin.level().unwrap(), Level::Low);
}

#[test]
fn zero_iterations() {
    let s = sim::simpleton(&[12]);

    let mut pin = output(&s, 12, Level::High);
    s.set_raw_direction(12, "float").unwrap();
    // no toggles, so the corrupt direction is never read
    Blinker::new(0, Duration::from_secs(1)).run(&mut pin).unwrap();
    assert_eq!(s.get_level(12).unwrap(), sim::Level::High);
}

#[test]
fn delays_after_each_toggle() {
    let s = sim::simpleton(&[12]);

    let mut pin = output(&s, 12, Level::Low);
    let interval = Duration::from_millis(10);
    let start = Instant::now();
    Blinker::new(3, interval).run(&mut pin).unwrap();
    assert!(start.elapsed() >= interval * 3);
}

#[test]
fn input_unchanged() {
    let s = sim::builder()
        .with_pin_state(12, sim::Direction::In, sim::Level::High)
        .live()
        .unwrap();

    let mut pin = Pin::builder(12).on_root(s.root()).acquire().unwrap();
    Blinker::new(3, INTERVAL).run(&mut pin).unwrap();
    assert_eq!(s.get_level(12).unwrap(), sim::Level::High);
}

#[test]
fn fails_fast() {
    let s = sim::simpleton(&[12]);

    let mut pin = output(&s, 12, Level::Low);
    s.set_raw_level(12, "x").unwrap();
    let interval = Duration::from_millis(200);
    let start = Instant::now();
    let res = Blinker::new(10, interval).run(&mut pin);
    assert!(matches!(res, Err(Error::UnrecognizedState(raw)) if raw == "x"));
    // no delays once failed
    assert!(start.elapsed() < interval);

    // pin remains with the caller
    s.set_level(12, sim::Level::Low).unwrap();
    pin.toggle().unwrap();
    assert_eq!(s.get_level(12).unwrap(), sim::Level::High);
    pin.release();
    assert_eq!(s.last_unexported().unwrap(), Some(12));
}
