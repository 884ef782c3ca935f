// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A command line tool that blinks a GPIO pin using the sysfs GPIO interface.

use clap::Parser;
use std::process::ExitCode;

mod blink;
mod common;

fn main() -> ExitCode {
    match Opts::try_parse() {
        Ok(opt) => {
            init_logger(opt.verbose);
            match blink::cmd(&opt.blink) {
                Ok(()) => return ExitCode::SUCCESS,
                Err(e) => eprintln!("{}", common::format_error(opt.verbose, &e)),
            }
        }
        Err(e) => eprintln!("{e}"),
    }
    ExitCode::FAILURE
}

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

#[derive(Parser)]
#[command(
    name = "gpioblink",
    about = "A utility to blink a GPIO line on Linux using the sysfs GPIO interface.",
    version
)]
struct Opts {
    /// Provide more detailed error messages and debug logging.
    #[arg(short = 'v', long, display_order = 800)]
    pub verbose: bool,

    #[command(flatten)]
    blink: blink::Opts,
}
