// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod builder;
pub use self::builder::Builder;

use crate::line::{Direction, Level};
use crate::{read_attr, write_attr, Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// The default location of the sysfs GPIO interface.
pub const DEFAULT_ROOT: &str = "/sys/class/gpio";

/// The default period to wait for the control node to appear after export.
pub const DEFAULT_EXPORT_TIMEOUT: Duration = Duration::from_secs(1);

// interval between checks for the control node after export
const NODE_POLL_INTERVAL: Duration = Duration::from_millis(5);

// pins held by live Pins in this process, identified by resolved root and number
static HELD: Mutex<Vec<(PathBuf, u32)>> = Mutex::new(Vec::new());

/// An exported pin.
///
/// Pins are acquired by the [`Builder`], which itself can be constructed by
/// [`builder`](#method.builder).
///
/// Holding the [`Pin`] grants exclusive access to the pin within the process.
/// A second acquisition of the same pin fails with [`Error::Busy`] until
/// the first is released.
///
/// # Release
///
/// The pin is returned to the kernel by [`release`](#method.release), or when
/// the [`Pin`] is dropped, so it is released on every exit path, including
/// early returns and unwinding.
/// Failures to unexport the pin at release are logged, not returned.
///
/// A pin that was already exported when acquired is adopted, and only
/// becomes the responsibility of the [`Pin`] once fully configured.
/// If configuring an adopted pin fails then it is left exported.
///
/// # Concurrency
///
/// [`toggle`](#method.toggle) reads the current level and writes its
/// complement.  That is not atomic, so the result is undefined if the
/// pin is altered by another process between the read and the write.
#[derive(Debug)]
pub struct Pin {
    /// The kernel GPIO number.
    number: u32,

    /// The human-readable name of the pin.
    label: String,

    /// The root of the sysfs GPIO interface.
    root: PathBuf,

    /// The per-pin control node, `<root>/gpio<number>`.
    node: PathBuf,

    /// The direction last applied through this Pin.
    direction: Direction,

    /// The level last applied through this Pin.
    level: Option<Level>,

    /// The period to wait for the control node to appear or vanish.
    export_timeout: Duration,

    /// Set while this Pin is responsible for unexporting the pin.
    exported: bool,

    /// The resolved root of the in-process claim on the pin, while held.
    claim: Option<PathBuf>,
}

impl Pin {
    /// Start building a new pin acquisition.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # fn example() -> Result<(), gpiosysfs::Error> {
    /// use gpiosysfs::{Level, Pin};
    ///
    /// let pin = Pin::builder(17)
    ///     .as_output(Level::High)
    ///     .force_reacquire()
    ///     .acquire()?;
    /// assert_eq!(pin.level()?, Level::High);
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder(number: u32) -> Builder {
        Builder::new(number)
    }

    /// Acquire a pin from the default sysfs root.
    ///
    /// The `level` is only applied if the `direction` is [`Direction::Out`].
    ///
    /// If `force_reacquire` is set and the pin is already exported then it
    /// is unexported first, so the pin starts from a clean state.
    pub fn acquire<N: Into<String>>(
        number: u32,
        direction: Direction,
        level: Level,
        force_reacquire: bool,
        label: N,
    ) -> Result<Pin> {
        Pin::builder(number)
            .with_direction(direction)
            .with_level(level)
            .with_force_reacquire(force_reacquire)
            .with_label(label)
            .acquire()
    }

    pub(crate) fn from_builder(cfg: &Builder) -> Result<Pin> {
        let claim = claim(&cfg.root, cfg.number)?;
        // from here the Pin owns the claim, so errors unwind via drop.
        let mut pin = Pin {
            number: cfg.number,
            label: cfg.label.clone(),
            node: cfg.root.join(format!("gpio{}", cfg.number)),
            root: cfg.root.clone(),
            direction: cfg.direction,
            level: None,
            export_timeout: cfg.export_timeout,
            exported: false,
            claim: Some(claim),
        };
        pin.export(cfg.force)?;
        pin.set_direction(cfg.direction)?;
        if cfg.direction == Direction::Out {
            pin.set_level(cfg.level)?;
        }
        // adopted exports are only ours once configured
        pin.exported = true;
        log::debug!(
            "acquired gpio{} {:?} as {} {:?}",
            pin.number,
            pin.label,
            pin.direction,
            pin.level
        );
        Ok(pin)
    }

    fn export(&mut self, force: bool) -> Result<()> {
        let n = self.number.to_string();
        if self.node.exists() {
            if !force {
                log::debug!("gpio{} already exported - adopting", self.number);
                return Ok(());
            }
            log::debug!("gpio{} already exported - unexporting", self.number);
            write_attr(&self.root.join("unexport"), &n)?;
            if !wait_for_node(&self.node, false, self.export_timeout) {
                log::warn!("gpio{} still present after unexport", self.number);
            }
        }
        write_attr(&self.root.join("export"), &n)?;
        self.exported = true;
        if !wait_for_node(&self.node, true, self.export_timeout) {
            return Err(Error::PortUnavailable(self.number));
        }
        log::debug!("exported gpio{}", self.number);
        Ok(())
    }

    /// The kernel GPIO number of the pin.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The label provided when the pin was acquired.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The root of the sysfs GPIO interface containing the pin.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The path of the control node for the pin.
    pub fn node(&self) -> &Path {
        &self.node
    }

    /// The direction most recently applied through this Pin.
    ///
    /// Use [`direction`](#method.direction) to read the actual direction.
    pub fn last_direction(&self) -> Direction {
        self.direction
    }

    /// The level most recently applied through this Pin, if any.
    ///
    /// Use [`level`](#method.level) to read the actual level.
    pub fn last_level(&self) -> Option<Level> {
        self.level
    }

    /// Read the direction of the pin.
    ///
    /// The direction is always read from the pin, so this reflects changes
    /// made outside this Pin.
    pub fn direction(&self) -> Result<Direction> {
        read_attr(&self.node.join("direction"))?.parse()
    }

    /// Set the direction of the pin.
    ///
    /// This does not set the level of an output. That must be set separately
    /// with [`set_level`](#method.set_level).
    pub fn set_direction(&mut self, direction: Direction) -> Result<()> {
        write_attr(&self.node.join("direction"), direction.as_str())?;
        self.direction = direction;
        Ok(())
    }

    /// Read the level of the pin.
    pub fn level(&self) -> Result<Level> {
        read_attr(&self.node.join("value"))?.parse()
    }

    /// Set the level of the pin.
    ///
    /// The level is written regardless of the direction of the pin.
    /// Setting the level of an input is rejected by most kernels, which is
    /// returned as [`Error::PermissionDenied`].
    pub fn set_level(&mut self, level: Level) -> Result<()> {
        write_attr(&self.node.join("value"), level.as_str())?;
        self.level = Some(level);
        Ok(())
    }

    /// Toggle the level of an output pin.
    ///
    /// Has no effect if the pin is an input.
    pub fn toggle(&mut self) -> Result<()> {
        if self.direction()? != Direction::Out {
            return Ok(());
        }
        let level = self.level()?.not();
        self.set_level(level)?;
        log::trace!("gpio{} toggled to {}", self.number, level);
        Ok(())
    }

    /// Release the pin back to the kernel.
    ///
    /// Equivalent to dropping the Pin.
    pub fn release(mut self) {
        self.unexport();
    }

    fn unexport(&mut self) {
        if self.exported {
            self.exported = false;
            let path = self.root.join("unexport");
            match write_attr(&path, &self.number.to_string()) {
                Ok(()) if wait_for_node(&self.node, false, self.export_timeout) => {
                    log::debug!("released gpio{}", self.number)
                }
                Ok(()) => log::warn!("gpio{} still present after release", self.number),
                Err(e) => log::warn!("failed to release gpio{}: {}", self.number, e),
            }
        }
        if let Some(root) = self.claim.take() {
            unclaim(&root, self.number);
        }
    }
}

impl Drop for Pin {
    fn drop(&mut self) {
        self.unexport();
    }
}

// wait for the control node to appear, or vanish
fn wait_for_node(node: &Path, present: bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if node.exists() == present {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(NODE_POLL_INTERVAL);
    }
}

// Claims are keyed on the resolved root so aliases of a root collide.
// A root that cannot be resolved is used as is.
fn claim(root: &Path, number: u32) -> Result<PathBuf> {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let mut held = HELD.lock().unwrap_or_else(|e| e.into_inner());
    if held.iter().any(|(r, n)| *n == number && *r == root) {
        return Err(Error::Busy(number));
    }
    held.push((root.clone(), number));
    Ok(root)
}

fn unclaim(root: &Path, number: u32) {
    let mut held = HELD.lock().unwrap_or_else(|e| e.into_inner());
    held.retain(|(r, n)| !(*n == number && r == root));
}
