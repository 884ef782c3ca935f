// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Pin, DEFAULT_EXPORT_TIMEOUT, DEFAULT_ROOT};
use crate::line::{Direction, Level};
use crate::Result;
use std::path::PathBuf;
use std::time::Duration;

/// A builder of pin acquisitions.
///
/// Apply mutators to specify the pin configuration, then use [`acquire`]
/// to export the pin from the kernel and apply the configuration.
///
/// By default the pin is acquired as an input, from `/sys/class/gpio`,
/// without a label, and without forcing a reacquire.
///
/// # Examples
/// Acquire and read a basic input pin:
/// ```no_run
/// # fn example() -> Result<(), gpiosysfs::Error> {
/// let p3 = gpiosysfs::Pin::builder(3).acquire()?;
/// let level = p3.level()?;
/// # Ok(())
/// # }
/// ```
///
/// Acquire an output pin, discarding any existing export:
///
/// ```no_run
/// # use gpiosysfs::Level;
/// # fn example() -> Result<(), gpiosysfs::Error> {
/// let mut led = gpiosysfs::Pin::builder(12)
///     .as_output(Level::Low)
///     .force_reacquire()
///     .with_label("status led")
///     .acquire()?;
/// led.toggle()?;
/// # Ok(())
/// # }
/// ```
///
/// [`acquire`]: #method.acquire
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Builder {
    pub(super) number: u32,
    pub(super) direction: Direction,
    pub(super) level: Level,
    pub(super) force: bool,
    pub(super) label: String,
    pub(super) root: PathBuf,
    pub(super) export_timeout: Duration,
}

impl Builder {
    pub(crate) fn new(number: u32) -> Self {
        Builder {
            number,
            direction: Direction::In,
            level: Level::Low,
            force: false,
            label: String::new(),
            root: DEFAULT_ROOT.into(),
            export_timeout: DEFAULT_EXPORT_TIMEOUT,
        }
    }

    /// Perform the acquisition.
    ///
    /// Exports the pin, if necessary, then applies the direction and,
    /// for outputs, the level.
    ///
    /// On success returns the [`Pin`] that owns the exported pin.
    /// On failure any export performed is undone before returning.
    pub fn acquire(&self) -> Result<Pin> {
        Pin::from_builder(self)
    }

    /// Set the pin to be an input.
    pub fn as_input(&mut self) -> &mut Self {
        self.direction = Direction::In;
        self
    }

    /// Set the pin to be an output with the given initial level.
    pub fn as_output(&mut self, level: Level) -> &mut Self {
        self.direction = Direction::Out;
        self.level = level;
        self
    }

    /// Set the direction of the pin.
    pub fn with_direction(&mut self, direction: Direction) -> &mut Self {
        self.direction = direction;
        self
    }

    /// Set the initial level of the pin.
    ///
    /// Only applied if the pin is an output.
    pub fn with_level(&mut self, level: Level) -> &mut Self {
        self.level = level;
        self
    }

    /// Unexport the pin first if it is already exported.
    pub fn force_reacquire(&mut self) -> &mut Self {
        self.force = true;
        self
    }

    /// Set whether an existing export is discarded before exporting.
    ///
    /// If not set then an existing export is adopted as-is, and then
    /// reconfigured.
    pub fn with_force_reacquire(&mut self, force: bool) -> &mut Self {
        self.force = force;
        self
    }

    /// Set the label for the pin.
    ///
    /// The label is for the convenience of the user and has no effect on
    /// the pin.
    pub fn with_label<N: Into<String>>(&mut self, label: N) -> &mut Self {
        self.label = label.into();
        self
    }

    /// Set the root of the sysfs GPIO interface.
    ///
    /// Defaults to `/sys/class/gpio`.
    pub fn on_root<P: Into<PathBuf>>(&mut self, root: P) -> &mut Self {
        self.root = root.into();
        self
    }

    /// Set the maximum time to wait for the pin's control node to appear
    /// after export.
    pub fn with_export_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.export_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new() {
        let b = Builder::new(12);
        assert_eq!(b.number, 12);
        assert_eq!(b.direction, Direction::In);
        assert_eq!(b.level, Level::Low);
        assert!(!b.force);
        assert!(b.label.is_empty());
        assert_eq!(b.root, PathBuf::from("/sys/class/gpio"));
        assert_eq!(b.export_timeout, DEFAULT_EXPORT_TIMEOUT);
    }

    #[test]
    fn as_output() {
        let mut b = Builder::new(3);
        b.as_output(Level::High);
        assert_eq!(b.direction, Direction::Out);
        assert_eq!(b.level, Level::High);
        b.as_input();
        assert_eq!(b.direction, Direction::In);
        // level is retained, but unused
        assert_eq!(b.level, Level::High);
    }

    #[test]
    fn with_direction_and_level() {
        let mut b = Builder::new(3);
        b.with_direction(Direction::Out).with_level(Level::High);
        assert_eq!(b.direction, Direction::Out);
        assert_eq!(b.level, Level::High);
    }

    #[test]
    fn force_reacquire() {
        let mut b = Builder::new(3);
        b.force_reacquire();
        assert!(b.force);
        b.with_force_reacquire(false);
        assert!(!b.force);
    }

    #[test]
    fn with_label() {
        let mut b = Builder::new(3);
        b.with_label("test");
        assert_eq!(b.label, "test");
        b.with_label(String::from("led"));
        assert_eq!(b.label, "led");
    }

    #[test]
    fn on_root() {
        let mut b = Builder::new(3);
        b.on_root("/tmp/gpio");
        assert_eq!(b.root, PathBuf::from("/tmp/gpio"));
    }

    #[test]
    fn with_export_timeout() {
        let mut b = Builder::new(3);
        b.with_export_timeout(Duration::from_millis(50));
        assert_eq!(b.export_timeout, Duration::from_millis(50));
    }
}
