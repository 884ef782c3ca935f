// SPDX-FileCopyrightText: 2022 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A library for creating simulated sysfs GPIO interfaces, for testing
//! code that drives pins through `/sys/class/gpio`.
//!
//! Simulators can be built using the [`Builder`].
//!
//! For simple tests that only require a set of available pins the
//! [`simpleton`] creates a live simulator directly.
//!
//! A simulator is a directory tree laid out like the sysfs GPIO interface,
//! with `export` and `unexport` files at its root.
//! An exported pin has a `gpio<N>` control node containing `direction` and
//! `value` attributes.
//! Pins added with [`with_pin`] appear already exported, while those added
//! with [`with_unexported_pin`] only appear once exported.
//! Pins not added never appear, no matter what is written to `export`.
//!
//! A background thread services writes to `export` and `unexport` much as
//! the kernel does, creating and removing the control nodes of available
//! pins. The attributes of a pin persist while it is unexported.
//! All writes are recorded as [`Event`]s, in the order serviced.
//!
//! The tree is created in the system temporary directory and is removed
//! when the simulator is dropped.
//!
//! [`Builder`]: fn.builder.html
//! [`simpleton`]: fn.simpleton.html
//! [`with_pin`]: Builder::with_pin
//! [`with_unexported_pin`]: Builder::with_unexported_pin

use nohash_hasher::{IntMap, IntSet};
use std::env;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[macro_use]
extern crate global_counter;

// interval between checks for writes to export and unexport
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// A live simulator of a sysfs GPIO interface.
#[derive(Debug)]
pub struct Sim {
    /// The name of the simulator.
    name: String,

    /// The initial state of the pins that are available.
    pins: IntMap<Number, Pin>,

    /// The root of the simulated interface.
    root: PathBuf,

    /// Services writes to `export` and `unexport`.
    exporter: Arc<Exporter>,

    /// The thread running the exporter.
    thread: Option<JoinHandle<()>>,
}

impl Sim {
    /// The name of the simulator.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root of the simulated interface, in place of `/sys/class/gpio`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The numbers of the pins available on the simulator.
    pub fn pins(&self) -> Vec<Number> {
        let mut pins: Vec<Number> = self.pins.keys().copied().collect();
        pins.sort_unstable();
        pins
    }

    /// The path to the control node for a pin.
    pub fn node(&self, number: Number) -> PathBuf {
        self.root.join(format!("gpio{}", number))
    }

    fn live(&mut self, unexported: &IntSet<Number>) -> Result<()> {
        write_attr(&self.root, "export", "")?;
        write_attr(&self.root, "unexport", "")?;
        for (number, pin) in &self.pins {
            let node = if unexported.contains(number) {
                self.exporter.hidden(*number)
            } else {
                self.node(*number)
            };
            fs::create_dir(&node)?;
            write_attr(&node, "direction", pin.direction.as_str())?;
            write_attr(&node, "value", pin.level.as_str())?;
        }
        let exporter = Arc::clone(&self.exporter);
        self.thread = Some(thread::spawn(move || {
            while !exporter.done.load(Ordering::Relaxed) {
                // failures resurface when a query syncs
                _ = exporter.sync();
                thread::sleep(POLL_INTERVAL);
            }
        }));
        Ok(())
    }

    // Apply any pending writes and find the attributes of a pin,
    // whether exported or not.
    fn attrs(&self, number: Number) -> Result<PathBuf> {
        self.exporter.sync()?;
        let node = self.node(number);
        if node.exists() {
            return Ok(node);
        }
        Ok(self.exporter.hidden(number))
    }

    /// Returns true if the control node for the pin is present.
    pub fn is_exported(&self, number: Number) -> Result<bool> {
        self.exporter.sync()?;
        Ok(self.node(number).is_dir())
    }

    /// Get the current direction of a pin.
    pub fn get_direction(&self, number: Number) -> Result<Direction> {
        let dir = read_attr(&self.attrs(number)?, "direction")?;
        match dir.as_str() {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            _ => Err(Error::UnexpectedValue(dir)),
        }
    }

    /// Set the direction of a pin, simulating an external agent.
    pub fn set_direction(&self, number: Number, direction: Direction) -> Result<()> {
        self.set_raw_direction(number, direction.as_str())
    }

    /// Write arbitrary content to the direction attribute of a pin.
    ///
    /// Allows simulation of a corrupted or unexpected attribute.
    pub fn set_raw_direction(&self, number: Number, raw: &str) -> Result<()> {
        write_attr(&self.attrs(number)?, "direction", raw)
    }

    /// Get the current level of a pin.
    pub fn get_level(&self, number: Number) -> Result<Level> {
        let val = read_attr(&self.attrs(number)?, "value")?;
        match val.as_str() {
            "0" => Ok(Level::Low),
            "1" => Ok(Level::High),
            _ => Err(Error::UnexpectedValue(val)),
        }
    }

    /// Set the level of a pin, simulating the line being externally driven.
    pub fn set_level(&self, number: Number, level: Level) -> Result<()> {
        self.set_raw_level(number, level.as_str())
    }

    /// Write arbitrary content to the value attribute of a pin.
    pub fn set_raw_level(&self, number: Number, raw: &str) -> Result<()> {
        write_attr(&self.attrs(number)?, "value", raw)
    }

    /// Replace an attribute of a pin with a directory, so any access to
    /// the attribute fails.
    pub fn break_attr(&self, number: Number, attr: &str) -> Result<()> {
        let path = self.attrs(number)?.join(attr);
        fs::remove_file(&path)?;
        fs::create_dir(&path)?;
        Ok(())
    }

    /// Toggle the level of a pin.
    pub fn toggle(&self, number: Number) -> Result<Level> {
        let level = match self.get_level(number)? {
            Level::High => Level::Low,
            Level::Low => Level::High,
        };
        self.set_level(number, level)?;
        Ok(level)
    }

    /// The writes to `export` and `unexport`, in the order serviced.
    pub fn events(&self) -> Result<Vec<Event>> {
        self.exporter.sync()?;
        Ok(self.exporter.events().clone())
    }

    /// The pin number most recently written to `export`, if any.
    pub fn last_exported(&self) -> Result<Option<Number>> {
        self.last_written(|e| match e {
            Event::Export(raw) => Some(raw),
            Event::Unexport(_) => None,
        })
    }

    /// The pin number most recently written to `unexport`, if any.
    pub fn last_unexported(&self) -> Result<Option<Number>> {
        self.last_written(|e| match e {
            Event::Unexport(raw) => Some(raw),
            Event::Export(_) => None,
        })
    }

    /// Forget any writes to `export` and `unexport`.
    pub fn clear_exports(&self) -> Result<()> {
        self.exporter.sync()?;
        self.exporter.events().clear();
        Ok(())
    }

    fn last_written<F>(&self, f: F) -> Result<Option<Number>>
    where
        F: Fn(&Event) -> Option<&String>,
    {
        self.exporter.sync()?;
        match self.exporter.events().iter().rev().find_map(f) {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| Error::UnexpectedValue(raw.clone())),
            None => Ok(None),
        }
    }
}

impl Drop for Sim {
    fn drop(&mut self) {
        self.exporter.done.store(true, Ordering::Relaxed);
        if let Some(t) = self.thread.take() {
            _ = t.join();
        }
        _ = fs::remove_dir_all(&self.root);
    }
}

/// A write to `export` or `unexport`, with the content as written.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    /// Content written to `export`.
    Export(String),

    /// Content written to `unexport`.
    Unexport(String),
}

// Moves the control nodes of available pins in response to writes to
// export and unexport.
//
// An unexported pin keeps its attributes in a hidden `.gpio<N>` directory,
// which is renamed to and from the control node so a node never appears
// partially populated.
#[derive(Debug)]
struct Exporter {
    root: PathBuf,
    available: IntSet<Number>,
    events: Mutex<Vec<Event>>,
    done: AtomicBool,
}

impl Exporter {
    fn hidden(&self, number: Number) -> PathBuf {
        self.root.join(format!(".gpio{}", number))
    }

    fn events(&self) -> MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    // Service any pending writes, unexport first.
    fn sync(&self) -> Result<()> {
        let mut events = self.events();
        let unexported = self.service(&mut events, false);
        let exported = self.service(&mut events, true);
        unexported.and(exported)
    }

    fn service(&self, events: &mut Vec<Event>, export: bool) -> Result<()> {
        let file = if export { "export" } else { "unexport" };
        let raw = match take_attr(&self.root, file)? {
            Some(raw) => raw,
            None => return Ok(()),
        };
        let number = raw.parse::<Number>().ok();
        events.push(if export {
            Event::Export(raw)
        } else {
            Event::Unexport(raw)
        });
        // writes for unavailable pins have no effect, as do repeats
        let number = match number {
            Some(n) if self.available.contains(&n) => n,
            _ => return Ok(()),
        };
        let node = self.root.join(format!("gpio{}", number));
        let hidden = self.hidden(number);
        let (from, to) = if export {
            (hidden, node)
        } else {
            (node, hidden)
        };
        if from.exists() && !to.exists() {
            fs::rename(from, to)?;
        }
        Ok(())
    }
}

/// Start building a sysfs GPIO simulator.
pub fn builder() -> Builder {
    Builder::default()
}

/// Build a simulator with the given pins available and take it live.
///
/// The pins are inputs, at low level.
///
/// This is sufficient for tests that do not require pins in a particular
/// initial state.
pub fn simpleton(pins: &[Number]) -> Sim {
    let mut builder = builder();
    for pin in pins {
        builder.with_pin(*pin);
    }
    builder.live().unwrap()
}

/// A builder of simulators.
///
/// Collects the configuration for the simulator, and then creates
/// the simulator when taken live.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Builder {
    /// The name for the simulator.
    ///
    /// If None when [`live`] is called then a unique name is generated.
    ///
    /// [`live`]: Builder::live
    pub name: Option<String>,

    /// The initial state of the pins to be simulated.
    pub pins: IntMap<Number, Pin>,

    /// The pins that are not initially exported.
    pub unexported: IntSet<Number>,
}

impl Builder {
    /// Add an available pin, initially exported as an input at low level.
    pub fn with_pin(&mut self, number: Number) -> &mut Self {
        self.pins.insert(number, Pin::default());
        self.unexported.remove(&number);
        self
    }

    /// Add an available pin that has not been exported.
    ///
    /// The control node for the pin appears once its number is written to
    /// `export`.
    pub fn with_unexported_pin(&mut self, number: Number) -> &mut Self {
        self.pins.insert(number, Pin::default());
        self.unexported.insert(number);
        self
    }

    /// Add an available pin with the given initial state.
    ///
    /// Simulates a pin left configured by a previous user.
    pub fn with_pin_state(
        &mut self,
        number: Number,
        direction: Direction,
        level: Level,
    ) -> &mut Self {
        self.pins.insert(number, Pin { direction, level });
        self.unexported.remove(&number);
        self
    }

    /// Remove a pin from the simulator.
    pub fn without_pin(&mut self, number: Number) -> &mut Self {
        self.pins.remove(&number);
        self.unexported.remove(&number);
        self
    }

    /// A convenience function to specify the name for the simulator.
    ///
    /// The name must be unique or going live will fail.
    pub fn with_name<N: Into<String>>(&mut self, name: N) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Take the builder config live and return the created simulator.
    ///
    /// If no name has been provided for the builder then one is generated
    /// in the format `<app>-p<pid>-<N>` where:
    ///  - the app name is drawn from `argv[0]` of the executable
    ///  - pid is the process id
    ///  - N is a counter of sims taken live by this process, starting at 0
    pub fn live(&mut self) -> Result<Sim> {
        let name = match &self.name {
            Some(n) => n.clone(),
            None => default_name(),
        };
        let base = env::temp_dir().join("gpiosysfs-sim");
        fs::create_dir_all(&base)?;
        let root = base.join(&name);
        if root.exists() {
            return Err(Error::SimulatorExists(name));
        }
        fs::create_dir(&root)?;

        let exporter = Exporter {
            root: root.clone(),
            available: self.pins.keys().copied().collect(),
            events: Mutex::new(Vec::new()),
            done: AtomicBool::new(false),
        };
        let mut sim = Sim {
            name,
            pins: self.pins.clone(),
            root,
            exporter: Arc::new(exporter),
            thread: None,
        };
        sim.live(&self.unexported)?;

        Ok(sim)
    }
}

/// The number of a pin.
pub type Number = u32;

/// The initial state of a simulated pin.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Pin {
    /// The initial direction of the pin.
    pub direction: Direction,

    /// The initial level of the pin.
    pub level: Level,
}

/// The direction of a simulated pin.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Direction {
    /// The pin is an input.
    #[default]
    In,

    /// The pin is an output.
    Out,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

/// The physical value of a simulated pin.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Level {
    /// The pin is physically high.
    High,

    /// The pin is physically low.
    #[default]
    Low,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::High => "1",
            Level::Low => "0",
        }
    }
}

/// Create a unique, but predictable, name for the simulator.
///
/// The name format is `<app>-p<pid>-<N>[-<instance>]`
/// where:
///   - the app name provided by the caller
///   - pid is the process id
///   - N is a counter of the sims created, starting at 0
///   - instance is optionally provided by the caller
pub fn unique_name(app: &str, instance: Option<&str>) -> String {
    global_counter!(SIM_COUNT, u32, 0);

    let mut name = format!("{}-p{}-{}", app, process::id(), SIM_COUNT.inc_cloning());
    if let Some(i) = instance {
        name += "-";
        name += i;
    }
    name
}

// Helper to write to simulated attribute files.
fn write_attr<D: AsRef<[u8]>>(p: &Path, file: &str, data: D) -> Result<()> {
    let path = p.join(file);
    fs::write(path, data).map_err(Error::IoError)
}

// Helper to take anything written to an attribute file, leaving it empty.
fn take_attr(p: &Path, file: &str) -> Result<Option<String>> {
    let mut f = fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(p.join(file))?;
    let mut raw = String::new();
    f.read_to_string(&mut raw)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    f.set_len(0)?;
    Ok(Some(raw.to_string()))
}

// Helper to read from simulated attribute files.
fn read_attr(p: &Path, file: &str) -> Result<String> {
    let path = p.join(file);
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(Error::IoError)
}

fn app_name() -> String {
    if let Some(app) = env::args_os().next() {
        if let Some(path) = Path::new(app.as_os_str()).file_name() {
            if let Some(app) = path.to_str() {
                return app.into();
            }
        }
    }
    "gpiosysfs".into()
}

fn default_name() -> String {
    unique_name(&app_name(), None)
}

/// The result for [`gpiosysfs_sim`] functions.
///
/// [`gpiosysfs_sim`]: crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`gpiosysfs_sim`] functions.
///
/// [`gpiosysfs_sim`]: crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Attempt to take a simulator live with a name of an active simulator.
    #[error("Simulator with name {0:?} already exists")]
    SimulatorExists(String),

    /// An unexpected value was read from a simulated attribute file.
    #[error("Read unexpected attr value {0:?}")]
    UnexpectedValue(String),

    /// An IO error detected while accessing a simulated attribute file.
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}
