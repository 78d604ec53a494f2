// sound-world -- note names, frequencies and envelopes for programmatic sound control
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Definitions of what a note name is.

use std::fmt;
use std::str::FromStr;

use snafu::Snafu;

use crate::tuning::Tuning;

/// The octave of a note name that does not state one.
pub const DEFAULT_OCTAVE: i32 = 4;

/// Largest octave (in either direction) whose semitone index still fits into an `i32`.
pub const MAX_OCTAVE: i32 = i32::MAX / 12 - 1;

/// The name of a note in standard notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NoteName {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl NoteName {
    /// Semitones between C and this note within the same octave.
    pub fn semitones(self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }

    fn from_char(ch: char) -> Option<NoteName> {
        match ch.to_ascii_uppercase() {
            'A' => Some(NoteName::A),
            'B' => Some(NoteName::B),
            'C' => Some(NoteName::C),
            'D' => Some(NoteName::D),
            'E' => Some(NoteName::E),
            'F' => Some(NoteName::F),
            'G' => Some(NoteName::G),
            _ => None,
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            NoteName::A => "A",
            NoteName::B => "B",
            NoteName::C => "C",
            NoteName::D => "D",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::G => "G",
        };
        f.write_str(letter)
    }
}

/// Any offset applied to a note in standard notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Accidental {
    /// The note is a half-tone lower then indicated by its name.
    Flat,
    /// The note is left unchanged.
    Base,
    /// The note is a half-tone higher then indicated by its name.
    Sharp,
}

impl Accidental {
    pub fn offset(self) -> i32 {
        match self {
            Accidental::Flat => -1,
            Accidental::Base => 0,
            Accidental::Sharp => 1,
        }
    }
}

impl fmt::Display for Accidental {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accidental::Flat => f.write_str("b"),
            Accidental::Base => Ok(()),
            Accidental::Sharp => f.write_str("#"),
        }
    }
}

/// A note spelled without an octave, such as `C#` or `Bb`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PitchName {
    pub name: NoteName,
    pub accidental: Accidental,
}

/// Spelling of every pitch class, starting at C, using sharps for the black keys.
const SHARP_SPELLINGS: [PitchName; 12] = [
    PitchName::new(NoteName::C, Accidental::Base),
    PitchName::new(NoteName::C, Accidental::Sharp),
    PitchName::new(NoteName::D, Accidental::Base),
    PitchName::new(NoteName::D, Accidental::Sharp),
    PitchName::new(NoteName::E, Accidental::Base),
    PitchName::new(NoteName::F, Accidental::Base),
    PitchName::new(NoteName::F, Accidental::Sharp),
    PitchName::new(NoteName::G, Accidental::Base),
    PitchName::new(NoteName::G, Accidental::Sharp),
    PitchName::new(NoteName::A, Accidental::Base),
    PitchName::new(NoteName::A, Accidental::Sharp),
    PitchName::new(NoteName::B, Accidental::Base),
];

/// Spelling of every pitch class, starting at C, using flats for the black keys.
const FLAT_SPELLINGS: [PitchName; 12] = [
    PitchName::new(NoteName::C, Accidental::Base),
    PitchName::new(NoteName::D, Accidental::Flat),
    PitchName::new(NoteName::D, Accidental::Base),
    PitchName::new(NoteName::E, Accidental::Flat),
    PitchName::new(NoteName::E, Accidental::Base),
    PitchName::new(NoteName::F, Accidental::Base),
    PitchName::new(NoteName::G, Accidental::Flat),
    PitchName::new(NoteName::G, Accidental::Base),
    PitchName::new(NoteName::A, Accidental::Flat),
    PitchName::new(NoteName::A, Accidental::Base),
    PitchName::new(NoteName::B, Accidental::Flat),
    PitchName::new(NoteName::B, Accidental::Base),
];

impl PitchName {
    pub const fn new(name: NoteName, accidental: Accidental) -> Self {
        Self { name, accidental }
    }

    /// The pitch class of this spelling, from 0 (C) to 11 (B).
    /// Spellings crossing the octave boundary wrap around, so `Cb` is 11 and `B#` is 0.
    pub fn pitch_class(self) -> u8 {
        (self.name.semitones() + self.accidental.offset()).rem_euclid(12) as u8
    }

    /// Spell a pitch class using sharps. Values above 11 wrap around.
    pub fn from_pitch_class(pitch_class: u8) -> PitchName {
        SHARP_SPELLINGS[usize::from(pitch_class % 12)]
    }

    /// The enharmonic spelling of this pitch using sharps, e.g. `Db` becomes `C#`.
    /// Natural notes stay as they are.
    pub fn sharp(self) -> PitchName {
        SHARP_SPELLINGS[usize::from(self.pitch_class())]
    }

    /// The enharmonic spelling of this pitch using flats, e.g. `A#` becomes `Bb`.
    /// Natural notes stay as they are.
    pub fn flat(self) -> PitchName {
        FLAT_SPELLINGS[usize::from(self.pitch_class())]
    }
}

impl fmt::Display for PitchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.accidental)
    }
}

impl FromStr for PitchName {
    type Err = NoteError;

    /// Parse `<letter>[#|b]`, rejecting names that carry an octave.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match parse_parts(input) {
            Some((pitch, None)) => Ok(pitch),
            _ => Err(NoteError::InvalidName {
                input: input.to_string(),
            }),
        }
    }
}

/// A note name together with its octave, such as `A4`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NamedNote {
    pub pitch: PitchName,
    pub octave: i32,
}

impl NamedNote {
    pub fn new(name: NoteName, accidental: Accidental, octave: i32) -> Self {
        Self {
            pitch: PitchName::new(name, accidental),
            octave,
        }
    }

    /// Parse a name string of the format `<letter>[#|b][octave]`.
    /// The letter is case-insensitive and the octave defaults to 4.
    ///
    /// # Examples
    ///
    /// ```
    /// use sound_world::note::*;
    ///
    /// assert_eq!(NamedNote::parse("A4"), Ok(NamedNote::new(NoteName::A, Accidental::Base, 4)));
    /// assert_eq!(NamedNote::parse("eb3"), Ok(NamedNote::new(NoteName::E, Accidental::Flat, 3)));
    /// assert_eq!(NamedNote::parse("C#"), Ok(NamedNote::new(NoteName::C, Accidental::Sharp, 4)));
    /// assert!(NamedNote::parse("H2").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<NamedNote, NoteError> {
        let (pitch, octave) = parse_parts(input).ok_or_else(|| NoteError::InvalidName {
            input: input.to_string(),
        })?;
        Ok(NamedNote {
            pitch,
            octave: octave.unwrap_or(DEFAULT_OCTAVE),
        })
    }

    /// Semitones above C0. This is the MIDI number in the `floor(n / 12)` octave convention
    /// used throughout this crate, so C4 is 48 and A4 is 57.
    /// The octave must not exceed [`MAX_OCTAVE`], which parsing guarantees.
    pub fn index(self) -> i32 {
        self.octave * 12 + self.pitch.name.semitones() + self.pitch.accidental.offset()
    }

    /// The note `index` semitones above C0, spelled with sharps.
    pub fn from_index(index: i32) -> NamedNote {
        NamedNote {
            pitch: PitchName::from_pitch_class(index.rem_euclid(12) as u8),
            octave: index.div_euclid(12),
        }
    }

    /// Respell the note using sharps. The octave follows the pitch, so `Cb4` becomes `B3`.
    pub fn sharp(self) -> NamedNote {
        NamedNote::from_index(self.index())
    }

    /// Respell the note using flats. The octave follows the pitch, so `B#3` becomes `C4`.
    pub fn flat(self) -> NamedNote {
        let index = self.index();
        NamedNote {
            pitch: FLAT_SPELLINGS[index.rem_euclid(12) as usize],
            octave: index.div_euclid(12),
        }
    }

    /// Frequency of this note in concert tuning.
    pub fn frequency(self) -> f64 {
        Tuning::default().frequency(self)
    }
}

impl fmt::Display for NamedNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch, self.octave)
    }
}

impl FromStr for NamedNote {
    type Err = NoteError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        NamedNote::parse(input)
    }
}

/// Possible errors when dealing with note names.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum NoteError {
    #[snafu(display("{:?} is not a note name", input))]
    InvalidName { input: String },
    #[snafu(display("{:?} is not a MIDI note number", input))]
    InvalidNumber { input: String },
    #[snafu(display("{} lies outside the MIDI note range", note))]
    OutOfMidiRange { note: NamedNote },
}

/// Parse a note name, see [`NamedNote::parse`].
pub fn parse_note(input: &str) -> Result<NamedNote, NoteError> {
    NamedNote::parse(input)
}

/// Respell a note name using sharps, keeping the octave if one is given.
///
/// ```
/// # use sound_world::note::sharp;
/// assert_eq!(sharp("Db").unwrap(), "C#");
/// assert_eq!(sharp("ab2").unwrap(), "G#2");
/// assert_eq!(sharp("E").unwrap(), "E");
/// ```
pub fn sharp(input: &str) -> Result<String, NoteError> {
    respell(input, PitchName::sharp, NamedNote::sharp)
}

/// Respell a note name using flats, keeping the octave if one is given.
///
/// ```
/// # use sound_world::note::flat;
/// assert_eq!(flat("A#").unwrap(), "Bb");
/// assert_eq!(flat("G#").unwrap(), "Ab");
/// ```
pub fn flat(input: &str) -> Result<String, NoteError> {
    respell(input, PitchName::flat, NamedNote::flat)
}

fn respell(
    input: &str,
    pitch_only: fn(PitchName) -> PitchName,
    with_octave: fn(NamedNote) -> NamedNote,
) -> Result<String, NoteError> {
    match parse_parts(input) {
        Some((pitch, None)) => Ok(pitch_only(pitch).to_string()),
        Some((pitch, Some(octave))) => Ok(with_octave(NamedNote { pitch, octave }).to_string()),
        None => Err(NoteError::InvalidName {
            input: input.to_string(),
        }),
    }
}

/// Split `<letter>[#|b][-]<digits>` into its spelling and the optional octave.
fn parse_parts(input: &str) -> Option<(PitchName, Option<i32>)> {
    let mut chars = input.chars();
    let name = NoteName::from_char(chars.next()?)?;

    let rest = chars.as_str();
    let (accidental, rest) = if let Some(rest) = rest.strip_prefix('#') {
        (Accidental::Sharp, rest)
    } else if let Some(rest) = rest.strip_prefix('b') {
        (Accidental::Flat, rest)
    } else {
        (Accidental::Base, rest)
    };

    let octave = if rest.is_empty() {
        None
    } else {
        Some(parse_octave(rest)?)
    };
    Some((PitchName::new(name, accidental), octave))
}

fn parse_octave(input: &str) -> Option<i32> {
    let digits = input.strip_prefix('-').unwrap_or(input);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let octave: i32 = input.parse().ok()?;
    if octave.abs() <= MAX_OCTAVE {
        Some(octave)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::{expect, Expect};

    fn check(input: &str, output: Expect) {
        let result = parse_note(input);
        let debug = format!("{:#?}", result);
        output.assert_eq(&debug);
    }

    #[test]
    fn parse_full_name() {
        check(
            "C#3",
            expect![[r#"
                Ok(
                    NamedNote {
                        pitch: PitchName {
                            name: C,
                            accidental: Sharp,
                        },
                        octave: 3,
                    },
                )"#]],
        );
    }

    #[test]
    fn parse_lowercase_flat_without_octave() {
        check(
            "bb",
            expect![[r#"
                Ok(
                    NamedNote {
                        pitch: PitchName {
                            name: B,
                            accidental: Flat,
                        },
                        octave: 4,
                    },
                )"#]],
        );
    }

    #[test]
    fn parse_negative_octave() {
        check(
            "G-1",
            expect![[r#"
                Ok(
                    NamedNote {
                        pitch: PitchName {
                            name: G,
                            accidental: Base,
                        },
                        octave: -1,
                    },
                )"#]],
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        check(
            "Not a note",
            expect![[r#"
                Err(
                    InvalidName {
                        input: "Not a note",
                    },
                )"#]],
        );
    }

    #[test]
    fn parse_rejects_malformed_octaves() {
        for input in &["", "H4", "C##4", "C+4", "C-", "C4.5", "Cb 4", "c#x", "4"] {
            assert_eq!(
                parse_note(input),
                Err(NoteError::InvalidName {
                    input: input.to_string()
                }),
                "{:?} should not parse",
                input
            );
        }
    }

    #[test]
    fn octaves_too_large_to_index() {
        for input in &["C999999999", "B-999999999", "C99999999999"] {
            assert_eq!(
                parse_note(input),
                Err(NoteError::InvalidName {
                    input: input.to_string()
                })
            );
            assert!(sharp(input).is_err());
        }

        let highest = format!("B{}", MAX_OCTAVE);
        let lowest = format!("Cb-{}", MAX_OCTAVE);
        assert_eq!(parse_note(&highest).unwrap().index(), MAX_OCTAVE * 12 + 11);
        assert_eq!(parse_note(&lowest).unwrap().index(), -MAX_OCTAVE * 12 - 1);
        assert_eq!(sharp(&lowest).unwrap(), format!("B-{}", MAX_OCTAVE + 1));
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(parse_note("a6").unwrap().to_string(), "A6");
        assert_eq!(parse_note("eb").unwrap().to_string(), "Eb4");
        assert_eq!(parse_note("f#-2").unwrap().to_string(), "F#-2");
    }

    #[test]
    fn index_uses_floor_octaves() {
        assert_eq!(parse_note("C0").unwrap().index(), 0);
        assert_eq!(parse_note("C4").unwrap().index(), 48);
        assert_eq!(parse_note("A4").unwrap().index(), 57);
        assert_eq!(parse_note("Cb4").unwrap().index(), 47);
        assert_eq!(NamedNote::from_index(30).to_string(), "F#2");
        assert_eq!(NamedNote::from_index(-1).to_string(), "B-1");
    }

    #[test]
    fn enharmonic_pairs() {
        assert_eq!(flat("A#").unwrap(), "Bb");
        assert_eq!(flat("G#").unwrap(), "Ab");
        assert_eq!(sharp("Db").unwrap(), "C#");
        assert_eq!(sharp("Ab").unwrap(), "G#");

        for flat_name in &["Db", "Eb", "Gb", "Ab", "Bb"] {
            let sharp_name = sharp(flat_name).unwrap();
            assert_ne!(&sharp_name, flat_name);
            assert_eq!(&flat(&sharp_name).unwrap(), flat_name);
        }
        for sharp_name in &["C#", "D#", "F#", "G#", "A#"] {
            assert_eq!(&sharp(&flat(sharp_name).unwrap()).unwrap(), sharp_name);
        }
    }

    #[test]
    fn naturals_keep_their_spelling() {
        for natural in &["C", "D", "E", "F", "G", "A", "B"] {
            assert_eq!(&sharp(natural).unwrap(), natural);
            assert_eq!(&flat(natural).unwrap(), natural);
        }
    }

    #[test]
    fn respelling_keeps_octave_with_pitch() {
        assert_eq!(sharp("Db3").unwrap(), "C#3");
        assert_eq!(sharp("Cb4").unwrap(), "B3");
        assert_eq!(flat("B#3").unwrap(), "C4");
        assert!(sharp("X#").is_err());
    }

    #[test]
    fn pitch_name_rejects_octave() {
        assert_eq!(
            "C#".parse::<PitchName>(),
            Ok(PitchName::new(NoteName::C, Accidental::Sharp))
        );
        assert!("C#4".parse::<PitchName>().is_err());
    }
}
