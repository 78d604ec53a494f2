// sound-world -- note names, frequencies and envelopes for programmatic sound control
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `tsw` - the sound world on the command line.

use std::io;

use structopt::StructOpt;

use sound_world::cli::{self, Opt};

fn main() -> io::Result<()> {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::run(&opt.command, &mut out)?;
    Ok(())
}
