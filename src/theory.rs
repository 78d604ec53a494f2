// sound-world -- note names, frequencies and envelopes for programmatic sound control
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Scales and chords built on top of note names.

use std::fmt;
use std::str::FromStr;

use snafu::Snafu;

use crate::note::{parse_note, NoteError, PitchName};

/// The tonality of a scale, which also determines the chord built on it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    /// Semitone steps between neighbouring notes of the scale, adding up to one octave.
    pub fn intervals(self) -> [u8; 7] {
        match self {
            Mode::Major => [2, 2, 1, 2, 2, 2, 1],
            Mode::Minor => [2, 1, 2, 2, 1, 2, 2],
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Major
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Major => f.write_str("major"),
            Mode::Minor => f.write_str("minor"),
        }
    }
}

impl FromStr for Mode {
    type Err = TheoryError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.eq_ignore_ascii_case("major") {
            Ok(Mode::Major)
        } else if input.eq_ignore_ascii_case("minor") {
            Ok(Mode::Minor)
        } else {
            Err(TheoryError::UnsupportedMode {
                mode: input.to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum TheoryError {
    #[snafu(display("Invalid root note: {}", source))]
    InvalidRoot { source: NoteError },
    #[snafu(display("Unsupported mode {:?}, expected \"major\" or \"minor\"", mode))]
    UnsupportedMode { mode: String },
}

/// Scale degrees making up a chord: root, third, fifth and the root an octave up.
const TRIAD_DEGREES: [usize; 4] = [0, 2, 4, 7];

/// The notes of a scale, starting on the root and ending on the root an octave up.
/// Notes between the two roots are spelled with sharps.
///
/// ```
/// use sound_world::note::PitchName;
/// use sound_world::theory::*;
///
/// let root: PitchName = "D".parse().unwrap();
/// let names: Vec<_> = scale_of(root, Mode::Minor).iter().map(|n| n.to_string()).collect();
/// assert_eq!(names, ["D", "E", "F", "G", "A", "A#", "C", "D"]);
/// ```
pub fn scale_of(root: PitchName, mode: Mode) -> Vec<PitchName> {
    let intervals = mode.intervals();
    let mut notes = Vec::with_capacity(intervals.len() + 1);
    notes.push(root);

    let mut pitch_class = root.pitch_class();
    // The last interval leads back to the root, which keeps its own spelling.
    for step in &intervals[..intervals.len() - 1] {
        pitch_class = (pitch_class + step) % 12;
        notes.push(PitchName::from_pitch_class(pitch_class));
    }
    notes.push(root);
    notes
}

/// The notes of the chord built on the root of a scale.
pub fn chord_of(root: PitchName, mode: Mode) -> Vec<PitchName> {
    let scale = scale_of(root, mode);
    TRIAD_DEGREES.iter().map(|&degree| scale[degree]).collect()
}

/// Parse the root and mode of a scale.
///
/// The root may carry an octave, which is ignored.
pub fn scale(root: &str, mode: &str) -> Result<Vec<PitchName>, TheoryError> {
    let root = parse_root(root)?;
    let mode = mode.parse()?;
    Ok(scale_of(root, mode))
}

/// Parse the root and type of a chord. The chord type defaults to major.
///
/// ```
/// # use sound_world::theory::chord;
/// let c = chord("c", None).unwrap();
/// assert_eq!(c, chord("C", Some("major")).unwrap());
/// assert_eq!(c.iter().map(|n| n.to_string()).collect::<Vec<_>>(), ["C", "E", "G", "C"]);
/// ```
pub fn chord(root: &str, kind: Option<&str>) -> Result<Vec<PitchName>, TheoryError> {
    let root = parse_root(root)?;
    let mode = match kind {
        Some(kind) => kind.parse()?,
        None => Mode::default(),
    };
    Ok(chord_of(root, mode))
}

fn parse_root(root: &str) -> Result<PitchName, TheoryError> {
    parse_note(root)
        .map(|note| note.pitch)
        .map_err(|source| TheoryError::InvalidRoot { source })
}
