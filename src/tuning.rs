// sound-world -- note names, frequencies and envelopes for programmatic sound control
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use crate::note::*;

/// Defines the tuning of an instrument by assinging a frequency to a certain note.
/// This defines the frequencies of all other notes at a standard tuning of 12 half-tones per octave.
///
/// # Examples
///
/// ```
/// use sound_world::note::*;
/// use sound_world::tuning::*;
/// assert_eq!(Tuning::default().frequency(NamedNote::new(NoteName::A, Accidental::Base, 3)), 220.0);
/// assert_eq!(Tuning::default().frequency(NamedNote::new(NoteName::A, Accidental::Base, 5)), 880.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub reference_note: NamedNote,
    pub reference_frequency: f64,
}

impl Tuning {
    /// A tuning where A4 sounds at the given frequency.
    pub fn with_concert_pitch(frequency: f64) -> Self {
        Tuning {
            reference_frequency: frequency,
            ..Tuning::default()
        }
    }

    /// Return the frequency of a note relative to this tuning.
    pub fn frequency(&self, other: NamedNote) -> f64 {
        let semitones = i64::from(other.index()) - i64::from(self.reference_note.index());
        let octaves = semitones as f64 / 12.0;
        self.reference_frequency * 2.0f64.powf(octaves)
    }
}

/// Default concert tuning, where A4 corresponds to 440 Hz.
impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            reference_note: NamedNote::new(NoteName::A, Accidental::Base, 4),
            reference_frequency: 440.0,
        }
    }
}

/// Frequency in Hz of a note name in concert tuning.
/// Returns `None` for anything that is not a note name instead of failing.
///
/// ```
/// # use sound_world::tuning::frequency;
/// assert_eq!(frequency("A4"), Some(440.0));
/// assert_eq!(frequency("Not a note"), None);
/// ```
pub fn frequency(input: &str) -> Option<f64> {
    parse_note(input).ok().map(NamedNote::frequency)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("expected a frequency");
        assert!(
            (actual - expected).abs() < 1e-9,
            "{} is not close to {}",
            actual,
            expected
        );
    }

    #[test]
    fn concert_pitch() {
        assert_eq!(frequency("A4"), Some(440.0));
        assert_eq!(frequency("a6"), Some(1760.0));
    }

    #[test]
    fn equal_temperament() {
        assert_eq!(frequency("B2"), Some(123.47082531403103));
        assert_eq!(frequency("C#3"), Some(138.59131548843604));
        assert_eq!(frequency("d#3"), Some(155.56349186104046));
        assert_eq!(frequency("eb3"), Some(155.56349186104046));
        assert_eq!(frequency("C"), Some(261.6255653005986));
        // 440 * 2^(-6/12) lands one ulp away from the usual table value.
        assert_close(frequency("D#"), 311.12698372208087);
        assert_close(frequency("eb"), 311.12698372208087);
    }

    #[test]
    fn enharmonic_notes_share_a_frequency() {
        assert_eq!(frequency("D#3"), frequency("Eb3"));
        assert_eq!(frequency("B#3"), frequency("C4"));
        assert_eq!(frequency("Cb4"), frequency("B3"));
    }

    #[test]
    fn not_a_note() {
        assert_eq!(frequency("Not a note"), None);
        assert_eq!(frequency("123"), None);
        assert_eq!(frequency(""), None);
        assert_eq!(frequency("C999999999"), None);
    }

    #[test]
    fn custom_concert_pitch() {
        let baroque = Tuning::with_concert_pitch(415.0);
        let a3 = NamedNote::new(NoteName::A, Accidental::Base, 3);
        assert_eq!(baroque.frequency(a3), 207.5);
    }
}
