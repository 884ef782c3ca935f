// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A library for accessing GPIO pins on Linux platforms
//! using the sysfs GPIO interface.
//!
//! Pins are exported, configured and released using the [`pin`] module.
//!
//! The [`blink`] module drives an output pin through a timed sequence of
//! toggles.
//!
//! To acquire an output pin and blink it:
//! ```no_run
//! # use gpiosysfs::Result;
//! use gpiosysfs::{Blinker, Level, Pin};
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let mut led = Pin::builder(12)
//!     .as_output(Level::Low)
//!     .with_label("led")
//!     .acquire()?;
//! Blinker::new(10, Duration::from_millis(200)).run(&mut led)?;
//! led.release();
//! # Ok(())
//! # }
//! ```
//!
//! [`pin`]: module@pin
//! [`blink`]: module@blink

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Types and functions for driving a pin through a timed toggle sequence.
pub mod blink;
pub use blink::Blinker;

/// Types describing the configuration of a pin.
pub mod line;
pub use line::{Direction, Level};

/// Types and functions related to acquiring and manipulating pins.
///
/// The [`Builder`] exports the pin from the kernel and returns a [`Pin`] that
/// owns the export until it is released or dropped.
///
/// [`Builder`]: struct.Builder.html
/// [`Pin`]: struct.Pin.html
pub mod pin;
pub use pin::Pin;

/// Wrappers for various async reactors.
#[cfg(feature = "async_tokio")]
mod r#async;

#[cfg(feature = "async_tokio")]
pub use r#async::tokio;

/// Errors returned by [`gpiosysfs`] functions.
///
/// [`gpiosysfs`]: crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The pin is held by another live [`Pin`] in this process.
    #[error("gpio{0} is already held by this process")]
    Busy(u32),

    /// An I/O error returned while accessing a control file.
    #[error("\"{0}\" {1}")]
    Io(PathBuf, #[source] io::Error),

    /// Writing to a control file was rejected.
    #[error("permission denied writing \"{0}\"")]
    PermissionDenied(PathBuf),

    /// Exporting the pin did not produce its control node.
    #[error("gpio{0} is unavailable - export did not create its control node")]
    PortUnavailable(u32),

    /// A control file contained neither of its expected values.
    #[error("unrecognized state {0:?}")]
    UnrecognizedState(String),
}

impl Error {
    /// Classify an I/O error encountered while accessing the given path.
    pub(crate) fn from_io(path: &Path, err: io::Error) -> Error {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Error::PermissionDenied(path.into()),
            _ => Error::Io(path.into(), err),
        }
    }
}

/// The result for [`gpiosysfs`] functions.
///
/// [`gpiosysfs`]: crate
pub type Result<T> = std::result::Result<T, Error>;

// Helper to write to pin-control attribute files.
pub(crate) fn write_attr(path: &Path, data: &str) -> Result<()> {
    fs::write(path, data).map_err(|e| Error::from_io(path, e))
}

// Helper to read from pin-control attribute files.
pub(crate) fn read_attr(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| Error::from_io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_from_io_permission_denied() {
        let path = Path::new("/sys/class/gpio/export");
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        let e = Error::from_io(path, err);
        assert!(matches!(e, Error::PermissionDenied(p) if p == path));
    }

    #[test]
    fn error_from_io_other() {
        let path = Path::new("/sys/class/gpio/gpio4/value");
        let err = io::Error::from(io::ErrorKind::NotFound);
        let e = Error::from_io(path, err);
        match e {
            Error::Io(p, err) => {
                assert_eq!(p, path);
                assert_eq!(err.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("unexpected error {e:?}"),
        }
    }

    #[test]
    fn error_display() {
        assert_eq!(
            Error::PortUnavailable(12).to_string(),
            "gpio12 is unavailable - export did not create its control node"
        );
        assert_eq!(
            Error::UnrecognizedState("float".into()).to_string(),
            "unrecognized state \"float\""
        );
        assert_eq!(
            Error::Busy(3).to_string(),
            "gpio3 is already held by this process"
        );
    }

    #[test]
    fn read_attr_trims() {
        let dir = std::env::temp_dir().join(format!("gpiosysfs-attr-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("direction");
        fs::write(&path, "out\n").unwrap();
        assert_eq!(read_attr(&path).unwrap(), "out");
        write_attr(&path, "in").unwrap();
        assert_eq!(read_attr(&path).unwrap(), "in");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn read_attr_missing() {
        let path = Path::new("/nonexistent/gpiosysfs/value");
        assert!(matches!(read_attr(path), Err(Error::Io(p, _)) if p == path));
    }
}
