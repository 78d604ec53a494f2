// sound-world -- note names, frequencies and envelopes for programmatic sound control
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The `tsw` command line.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use log::info;
use snafu::Snafu;
use structopt::StructOpt;

use crate::automation::AutomatedParam;
use crate::clock::{Clock, ManualClock, SystemClock};
use crate::envelope::{ConfigurationError, Envelope, EnvelopeSpec};
use crate::midi::{midi_note, NoteValue};
use crate::note::{self, parse_note, NoteError, PitchName};
use crate::theory::{self, TheoryError};
use crate::tuning::Tuning;

#[derive(Debug, StructOpt)]
#[structopt(name = "tsw", about = "Note names, frequencies and envelopes")]
pub struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    pub verbose: usize,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Print the frequency of a note in Hz.
    Frequency {
        note: String,
        /// Frequency of A4 in Hz.
        #[structopt(long, default_value = "440")]
        concert_pitch: f64,
    },
    /// Convert a note name to its MIDI number or a MIDI number to its note name.
    Midi { value: String },
    /// Spell a note with a sharp.
    Sharp { note: String },
    /// Spell a note with a flat.
    Flat { note: String },
    /// Print the notes of a chord (major or minor).
    Chord { root: String, kind: Option<String> },
    /// Print the notes of a scale (major or minor).
    Scale { root: String, mode: String },
    /// Run an envelope, printing its state and value at regular steps.
    Envelope(EnvelopeOpt),
}

#[derive(Debug, StructOpt)]
pub struct EnvelopeOpt {
    #[structopt(long, default_value = "0")]
    pub start_level: f64,
    #[structopt(long, default_value = "1")]
    pub max_level: f64,
    #[structopt(long, default_value = "1")]
    pub sustain_level: f64,
    /// Attack time in seconds.
    #[structopt(long, default_value = "0")]
    pub attack: f64,
    /// Decay time in seconds.
    #[structopt(long, default_value = "0")]
    pub decay: f64,
    /// Release time in seconds.
    #[structopt(long, default_value = "0")]
    pub release: f64,
    #[structopt(long)]
    pub auto_stop: bool,
    /// Time in seconds at which the envelope is stopped.
    #[structopt(long)]
    pub stop_at: Option<f64>,
    /// Seconds between printed rows.
    #[structopt(long, default_value = "0.1")]
    pub step: f64,
    /// Seconds to simulate.
    #[structopt(long, default_value = "1")]
    pub duration: f64,
    /// Follow the wall clock instead of a virtual one.
    #[structopt(long)]
    pub realtime: bool,
}

impl EnvelopeOpt {
    pub fn spec(&self) -> EnvelopeSpec {
        EnvelopeSpec {
            start_level: self.start_level,
            max_level: self.max_level,
            sustain_level: self.sustain_level,
            attack_time: self.attack,
            decay_time: self.decay,
            release_time: self.release,
            auto_stop: self.auto_stop,
        }
    }
}

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("{}", source))]
    Note { source: NoteError },
    #[snafu(display("{}", source))]
    Theory { source: TheoryError },
    #[snafu(display("Invalid envelope: {}", source))]
    Configuration { source: ConfigurationError },
    #[snafu(display(
        "Cannot simulate {}s in steps of {}s, both must be positive",
        duration,
        step
    ))]
    InvalidSimulation { step: f64, duration: f64 },
    #[snafu(display("Could not write output: {}", source))]
    Io { source: io::Error },
}

impl From<CliError> for io::Error {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Io { source } => source,
            other => io::Error::new(io::ErrorKind::InvalidInput, other.to_string()),
        }
    }
}

/// Execute a command, writing its result to `out`.
pub fn run(command: &Command, out: &mut dyn Write) -> Result<(), CliError> {
    let line = match command {
        Command::Frequency {
            note,
            concert_pitch,
        } => {
            let tuning = Tuning::with_concert_pitch(*concert_pitch);
            match parse_note(note) {
                Ok(note) => tuning.frequency(note).to_string(),
                Err(_) => "not a note".to_string(),
            }
        }
        Command::Midi { value } => {
            let value: NoteValue = value.parse().map_err(|source| CliError::Note { source })?;
            midi_note(value)
                .map_err(|source| CliError::Note { source })?
                .to_string()
        }
        Command::Sharp { note } => {
            note::sharp(note).map_err(|source| CliError::Note { source })?
        }
        Command::Flat { note } => note::flat(note).map_err(|source| CliError::Note { source })?,
        Command::Chord { root, kind } => join(
            theory::chord(root, kind.as_deref()).map_err(|source| CliError::Theory { source })?,
        ),
        Command::Scale { root, mode } => {
            join(theory::scale(root, mode).map_err(|source| CliError::Theory { source })?)
        }
        Command::Envelope(opt) => return simulate(opt, out),
    };
    writeln!(out, "{}", line).map_err(|source| CliError::Io { source })
}

fn join(notes: Vec<PitchName>) -> String {
    notes
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run an envelope, printing one `time state value` row per step.
fn simulate(opt: &EnvelopeOpt, out: &mut dyn Write) -> Result<(), CliError> {
    if !(opt.step > 0.0 && opt.duration >= 0.0 && opt.duration.is_finite()) {
        return Err(CliError::InvalidSimulation {
            step: opt.step,
            duration: opt.duration,
        });
    }
    info!(
        "running {:?} for {}s{}",
        opt.spec(),
        opt.duration,
        if opt.realtime { " in real time" } else { "" }
    );

    if opt.realtime {
        let clock = SystemClock::new();
        play(opt, &clock, |time| wait_until(&clock, time), out)
    } else {
        let clock = ManualClock::new();
        play(opt, &clock, |time| clock.set(time), out)
    }
}

/// Drive an envelope on `clock`, calling `advance` to get to the time of each row.
fn play<C: Clock>(
    opt: &EnvelopeOpt,
    clock: C,
    mut advance: impl FnMut(f64),
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let spec = opt.spec();
    let param = AutomatedParam::new(spec.start_level);
    let mut envelope = Envelope::new(param, clock, spec);
    envelope
        .start()
        .map_err(|source| CliError::Configuration { source })?;

    let steps = (opt.duration / opt.step).round() as usize;
    let mut stop_at = opt.stop_at;
    for i in 0..=steps {
        let time = i as f64 * opt.step;
        advance(time);
        if stop_at.map_or(false, |at| time >= at) {
            envelope.stop();
            stop_at = None;
        }
        writeln!(
            out,
            "{:.2}s {:<10} {:.3}",
            time,
            envelope.state(),
            envelope.value()
        )
        .map_err(|source| CliError::Io { source })?;
    }
    Ok(())
}

fn wait_until(clock: &SystemClock, time: f64) {
    let remaining = time - clock.now();
    if remaining > 0.0 {
        thread::sleep(Duration::from_secs_f64(remaining));
    }
}
