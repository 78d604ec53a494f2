// sound-world -- note names, frequencies and envelopes for programmatic sound control
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! MIDI note numbers.
//!
//! Octaves of MIDI numbers are counted as `floor(n / 12)`, so note 0 is C0 and note 48 is C4.
//! This is one octave lower than the usual MIDI convention where C4 is 60. Every conversion
//! in this crate uses the same convention, which makes `note_to_midi` the exact inverse of
//! `midi_to_note`.

use std::fmt;
use std::str::FromStr;

use crate::note::{NamedNote, NoteError};

/// A MIDI note number between 0 and 127.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MidiNumber(u8);

impl MidiNumber {
    pub const MIN: MidiNumber = MidiNumber(0);
    pub const MAX: MidiNumber = MidiNumber(127);

    pub fn try_from_midi(midi_note: i64) -> Option<MidiNumber> {
        if (i64::from(Self::MIN.0)..=i64::from(Self::MAX.0)).contains(&midi_note) {
            Some(MidiNumber(midi_note as u8))
        } else {
            None
        }
    }

    pub fn to_midi(self) -> u8 {
        self.0
    }

    pub fn octave(self) -> i32 {
        i32::from(self.0 / 12)
    }

    pub fn pitch_class(self) -> u8 {
        self.0 % 12
    }

    /// Frequency of the note this number stands for in concert tuning.
    pub fn frequency(self) -> f64 {
        midi_to_note(self).frequency()
    }
}

impl fmt::Display for MidiNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Name a MIDI note number, spelling black keys with sharps.
///
/// ```
/// use sound_world::midi::*;
///
/// let name = |n| midi_to_note(MidiNumber::try_from_midi(n).unwrap()).to_string();
/// assert_eq!(name(0), "C0");
/// assert_eq!(name(48), "C4");
/// assert_eq!(name(30), "F#2");
/// ```
pub fn midi_to_note(midi_note: MidiNumber) -> NamedNote {
    NamedNote::from_index(i32::from(midi_note.0))
}

/// Number a note name. Fails for notes outside of the MIDI range.
pub fn note_to_midi(note: NamedNote) -> Result<MidiNumber, NoteError> {
    MidiNumber::try_from_midi(i64::from(note.index())).ok_or(NoteError::OutOfMidiRange { note })
}

/// Something that is either a note name or a MIDI number.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NoteValue {
    Name(NamedNote),
    Number(MidiNumber),
}

impl fmt::Display for NoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteValue::Name(note) => note.fmt(f),
            NoteValue::Number(number) => number.fmt(f),
        }
    }
}

impl FromStr for NoteValue {
    type Err = NoteError;

    /// Strings of digits are MIDI numbers, everything else must be a note name.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
            input
                .parse::<i64>()
                .ok()
                .and_then(MidiNumber::try_from_midi)
                .map(NoteValue::Number)
                .ok_or_else(|| NoteError::InvalidNumber {
                    input: input.to_string(),
                })
        } else {
            NamedNote::parse(input).map(NoteValue::Name)
        }
    }
}

impl From<NamedNote> for NoteValue {
    fn from(note: NamedNote) -> Self {
        NoteValue::Name(note)
    }
}

impl From<MidiNumber> for NoteValue {
    fn from(number: MidiNumber) -> Self {
        NoteValue::Number(number)
    }
}

/// Convert a note name to its MIDI number, or a MIDI number to its note name.
///
/// ```
/// use sound_world::midi::*;
/// use sound_world::note::NamedNote;
///
/// let c4 = NamedNote::parse("C4").unwrap();
/// let forty_eight = MidiNumber::try_from_midi(48).unwrap();
/// assert_eq!(midi_note(c4.into()), Ok(NoteValue::Number(forty_eight)));
/// assert_eq!(midi_note(forty_eight.into()), Ok(NoteValue::Name(c4)));
/// ```
pub fn midi_note(value: NoteValue) -> Result<NoteValue, NoteError> {
    match value {
        NoteValue::Name(note) => note_to_midi(note).map(NoteValue::Number),
        NoteValue::Number(number) => Ok(NoteValue::Name(midi_to_note(number))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn midi(n: i64) -> MidiNumber {
        MidiNumber::try_from_midi(n).unwrap()
    }

    #[test]
    fn names_of_numbers() {
        assert_eq!(midi_to_note(midi(0)).to_string(), "C0");
        assert_eq!(midi_to_note(midi(48)).to_string(), "C4");
        assert_eq!(midi_to_note(midi(30)).to_string(), "F#2");
        assert_eq!(midi_to_note(midi(127)).to_string(), "G10");
    }

    #[test]
    fn every_number_survives_a_round_trip() {
        for n in 0..128 {
            let number = midi(n);
            let note = midi_to_note(number);
            assert_eq!(note.pitch.pitch_class(), number.pitch_class());
            assert_eq!(note.octave, number.octave());
            assert_eq!(i64::from(note.octave) * 12 + i64::from(note.pitch.pitch_class()), n);
            assert_eq!(note_to_midi(note), Ok(number));
        }
    }

    #[test]
    fn flats_are_numbered_like_sharps() {
        let eb3 = NamedNote::parse("Eb3").unwrap();
        let d_sharp3 = NamedNote::parse("D#3").unwrap();
        assert_eq!(note_to_midi(eb3), note_to_midi(d_sharp3));
        assert_eq!(note_to_midi(eb3), Ok(midi(39)));
    }

    #[test]
    fn out_of_range() {
        assert_eq!(MidiNumber::try_from_midi(-1), None);
        assert_eq!(MidiNumber::try_from_midi(128), None);

        let cb0 = NamedNote::parse("Cb0").unwrap();
        assert_eq!(note_to_midi(cb0), Err(NoteError::OutOfMidiRange { note: cb0 }));
        let a10 = NamedNote::parse("A10").unwrap();
        assert!(note_to_midi(a10).is_err());
    }

    #[test]
    fn dispatch_on_value_shape() {
        assert_eq!(
            midi_note("F#2".parse().unwrap()),
            Ok(NoteValue::Number(midi(30)))
        );
        assert_eq!(
            midi_note("30".parse().unwrap()).map(|v| v.to_string()),
            Ok("F#2".to_string())
        );
        assert_eq!(
            "200".parse::<NoteValue>(),
            Err(NoteError::InvalidNumber {
                input: "200".to_string()
            })
        );
        assert!("-3".parse::<NoteValue>().is_err());
    }

    #[test]
    fn frequency_follows_the_named_note() {
        assert_eq!(midi(57).frequency(), 440.0);
        assert_eq!(midi(45).frequency(), 220.0);
    }
}
