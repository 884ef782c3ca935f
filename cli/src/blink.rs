// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::common::{self, LevelOpt};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use gpiosysfs::pin::{Builder, DEFAULT_ROOT};
use gpiosysfs::{Blinker, Pin};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
pub struct Opts {
    /// The number of the pin to blink
    #[arg(value_name = "pin")]
    pin: u32,

    /// The number of times to toggle the pin
    #[arg(short = 'n', long, value_name = "count", default_value_t = 50)]
    count: u32,

    /// The delay following each toggle
    ///
    /// The period is taken as milliseconds unless otherwise specified.
    #[arg(short, long, value_name = "period", default_value = "200ms", value_parser = common::parse_duration)]
    interval: Duration,

    /// The level of the pin before the first toggle
    #[arg(long, value_name = "level", value_enum, default_value_t = LevelOpt::Low)]
    level: LevelOpt,

    /// Unexport the pin first if it is already exported
    ///
    /// If not specified then an existing export is adopted and reconfigured.
    #[arg(short, long)]
    force: bool,

    /// The label applied to the pin
    #[arg(short, long, value_name = "name", default_value = "gpioblink")]
    label: String,

    /// The root of the sysfs GPIO interface
    #[arg(long, value_name = "path", env = "GPIOBLINK_ROOT", default_value = DEFAULT_ROOT)]
    root: PathBuf,

    /// The maximum time to wait for the pin to appear after export
    ///
    /// The period is taken as milliseconds unless otherwise specified.
    #[arg(long, value_name = "period", default_value = "1s", value_parser = common::parse_duration)]
    export_timeout: Duration,

    /// Stop blinking after this period, even if not complete
    ///
    /// The period is taken as milliseconds unless otherwise specified.
    #[arg(short, long, value_name = "period", value_parser = common::parse_duration)]
    timeout: Option<Duration>,
}

impl Opts {
    fn builder(&self) -> Builder {
        let mut bld = Pin::builder(self.pin);
        bld.as_output(self.level.into())
            .with_force_reacquire(self.force)
            .with_label(&self.label)
            .on_root(&self.root)
            .with_export_timeout(self.export_timeout);
        bld
    }

    fn blinker(&self) -> Blinker {
        Blinker::new(self.count, self.interval)
    }
}

pub fn cmd(opts: &Opts) -> Result<()> {
    let mut pin = opts
        .builder()
        .acquire()
        .with_context(|| format!("failed to acquire gpio{}", opts.pin))?;
    println!(
        "Blinking gpio{} ({}) {} times...",
        pin.number(),
        pin.label(),
        opts.count
    );
    let res = blink(opts, &mut pin);
    // released on all paths, including failed blinks
    pin.release();
    res
}

fn blink(opts: &Opts, pin: &mut Pin) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let blinker = opts.blinker();
    rt.block_on(async {
        let blink = gpiosysfs::tokio::run(&blinker, pin);
        let blink = async {
            match opts.timeout {
                Some(period) => tokio::time::timeout(period, blink)
                    .await
                    .map_err(|_| anyhow!("timed out after {period:?}"))??,
                None => blink.await?,
            }
            Ok::<(), anyhow::Error>(())
        };
        tokio::select! {
            res = blink => res,
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted - stopping");
                Ok(())
            }
        }
    })
    .with_context(|| format!("failed to blink gpio{}", opts.pin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpiosysfs_sim::{self as sim, Level, Sim};

    fn opts(s: &Sim, args: &[&str]) -> Opts {
        let root = s.root().to_str().unwrap();
        let args = ["gpioblink", "--root", root, "--interval", "1ms"]
            .into_iter()
            .chain(args.iter().copied());
        Opts::try_parse_from(args).unwrap()
    }

    #[test]
    fn defaults() {
        let opts = Opts::try_parse_from(["gpioblink", "12"]).unwrap();
        assert_eq!(opts.pin, 12);
        assert_eq!(opts.count, 50);
        assert_eq!(opts.interval, Duration::from_millis(200));
        assert_eq!(opts.level, LevelOpt::Low);
        assert!(!opts.force);
        assert_eq!(opts.label, "gpioblink");
        assert_eq!(opts.export_timeout, Duration::from_secs(1));
        assert_eq!(opts.timeout, None);

        let bld = opts.builder();
        let mut expected = Pin::builder(12);
        expected
            .as_output(gpiosysfs::Level::Low)
            .with_label("gpioblink")
            .on_root(&opts.root);
        assert_eq!(bld, expected);
        assert_eq!(opts.blinker(), Blinker::default());
    }

    #[test]
    fn pin_required() {
        assert!(Opts::try_parse_from(["gpioblink"]).is_err());
        assert!(Opts::try_parse_from(["gpioblink", "-1"]).is_err());
    }

    #[test]
    fn even_count() {
        let s = sim::simpleton(&[12]);

        let opts = opts(&s, &["-n", "4", "12"]);
        cmd(&opts).unwrap();
        assert_eq!(s.get_level(12).unwrap(), Level::Low);
        assert_eq!(s.last_unexported().unwrap(), Some(12));
    }

    #[test]
    fn odd_count() {
        let s = sim::simpleton(&[12]);

        let opts = opts(&s, &["-n", "5", "12"]);
        cmd(&opts).unwrap();
        assert_eq!(s.get_level(12).unwrap(), Level::High);
        assert_eq!(s.last_unexported().unwrap(), Some(12));
    }

    #[test]
    fn initial_level_high() {
        let s = sim::simpleton(&[12]);

        let opts = opts(&s, &["--level", "high", "-n", "4", "-l", "led", "12"]);
        cmd(&opts).unwrap();
        assert_eq!(s.get_level(12).unwrap(), Level::High);
    }

    #[test]
    fn force() {
        let s = sim::simpleton(&[12]);

        let opts = opts(&s, &["--force", "-n", "1", "12"]);
        cmd(&opts).unwrap();
        assert_eq!(s.last_exported().unwrap(), Some(12));
        assert_eq!(s.get_level(12).unwrap(), Level::High);
    }

    #[test]
    fn unavailable() {
        let s = sim::simpleton(&[3]);

        let opts = opts(&s, &["--export-timeout", "10ms", "12"]);
        let err = cmd(&opts).unwrap_err();
        assert_eq!(format!("{err}"), "failed to acquire gpio12");
        assert!(matches!(
            err.downcast_ref::<gpiosysfs::Error>(),
            Some(gpiosysfs::Error::PortUnavailable(12))
        ));
    }

    #[test]
    fn timeout_releases() {
        let s = sim::simpleton(&[12]);

        let opts = opts(&s, &["-n", "1000", "--timeout", "20ms", "12"]);
        let err = cmd(&opts).unwrap_err();
        assert_eq!(format!("{err}"), "failed to blink gpio12");
        assert_eq!(
            format!("{err:#}"),
            "failed to blink gpio12: timed out after 20ms"
        );
        assert_eq!(s.last_unexported().unwrap(), Some(12));
    }
}
