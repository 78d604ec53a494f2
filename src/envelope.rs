// sound-world -- note names, frequencies and envelopes for programmatic sound control
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Attack-Decay-Sustain-Release envelopes driving a parameter through scheduled ramps.

use std::fmt;

use log::debug;
use snafu::Snafu;

use crate::automation::{Param, Ramp};
use crate::clock::Clock;

/// The shape of an Attack-Decay-Sustain-Release envelope.
/// When started, the parameter rises from `start_level` to `max_level` over `attack_time` seconds,
/// then decays over an additional `decay_time` seconds to `sustain_level` where it is held
/// until the envelope is stopped. When stopped, the parameter falls back to `start_level`
/// over the next `release_time` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSpec {
    pub start_level: f64,
    pub max_level: f64,
    pub sustain_level: f64,
    pub attack_time: f64,
    pub decay_time: f64,
    pub release_time: f64,
    /// Release right after the decay instead of waiting to be stopped.
    pub auto_stop: bool,
}

impl Default for EnvelopeSpec {
    fn default() -> Self {
        Self {
            start_level: 0.0,
            max_level: 1.0,
            sustain_level: 1.0,
            attack_time: 0.0,
            decay_time: 0.0,
            release_time: 0.0,
            auto_stop: false,
        }
    }
}

impl EnvelopeSpec {
    /// Check that all times are non-negative and that the sustain level lies between
    /// the start and the maximum level.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let levels = [
            ("start_level", self.start_level),
            ("max_level", self.max_level),
            ("sustain_level", self.sustain_level),
        ];
        for &(field, value) in levels.iter() {
            if !value.is_finite() {
                return Err(ConfigurationError::InvalidLevel { field, value });
            }
        }

        let times = [
            ("attack_time", self.attack_time),
            ("decay_time", self.decay_time),
            ("release_time", self.release_time),
        ];
        for &(field, value) in times.iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidTime { field, value });
            }
        }

        if self.start_level <= self.sustain_level && self.sustain_level <= self.max_level {
            Ok(())
        } else {
            Err(ConfigurationError::LevelOrder {
                start: self.start_level,
                sustain: self.sustain_level,
                max: self.max_level,
            })
        }
    }
}

/// Reasons why an envelope refuses to start.
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum ConfigurationError {
    #[snafu(display("{} must be a non-negative number of seconds, got {}", field, value))]
    InvalidTime { field: &'static str, value: f64 },
    #[snafu(display("{} must be a finite level, got {}", field, value))]
    InvalidLevel { field: &'static str, value: f64 },
    #[snafu(display(
        "Sustain level {} must lie between start level {} and max level {}",
        sustain,
        start,
        max
    ))]
    LevelOrder { start: f64, sustain: f64, max: f64 },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EnvelopeState {
    Idle,
    Attacking,
    Decaying,
    Sustaining,
    Releasing,
    Stopped,
}

impl fmt::Display for EnvelopeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnvelopeState::Idle => "idle",
            EnvelopeState::Attacking => "attacking",
            EnvelopeState::Decaying => "decaying",
            EnvelopeState::Sustaining => "sustaining",
            EnvelopeState::Releasing => "releasing",
            EnvelopeState::Stopped => "stopped",
        };
        f.pad(name)
    }
}

/// Where the envelope is on its timeline.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Phase {
    Idle,
    /// Started at `since`. `release` is the clock time the release begins at, once known
    /// from a call to `stop` or from `auto_stop`.
    Started { since: f64, release: Option<f64> },
}

/// An envelope bound to a parameter.
///
/// Starting the envelope schedules its whole timeline on the parameter at once, with one ramp
/// per phase at absolute clock times. The parameter then follows the envelope without any
/// further calls, and the current state is derived from the clock alone.
///
/// # Example
///
/// ```
/// use sound_world::automation::{shared, AutomatedParam, Param};
/// use sound_world::clock::ManualClock;
/// use sound_world::envelope::*;
///
/// let clock = ManualClock::new();
/// let gain = shared(AutomatedParam::new(0.0));
/// let mut envelope = Envelope::new(gain.clone(), clock.clone(), EnvelopeSpec {
///     attack_time: 1.0,
///     decay_time: 1.0,
///     sustain_level: 0.5,
///     release_time: 1.0,
///     ..EnvelopeSpec::default()
/// });
///
/// envelope.start().unwrap();
/// assert_eq!(gain.value_at(0.5), 0.5);
/// assert_eq!(gain.value_at(1.5), 0.75);
/// assert_eq!(gain.value_at(60.0), 0.5);
///
/// clock.set(2.5);
/// assert_eq!(envelope.state(), EnvelopeState::Sustaining);
/// envelope.stop();
/// assert_eq!(gain.value_at(3.0), 0.25);
///
/// clock.set(3.5);
/// assert_eq!(envelope.state(), EnvelopeState::Stopped);
/// assert_eq!(envelope.value(), 0.0);
/// ```
pub struct Envelope<P, C> {
    param: P,
    clock: C,
    spec: EnvelopeSpec,
    phase: Phase,
}

impl<P: Param, C: Clock> Envelope<P, C> {
    pub fn new(param: P, clock: C, spec: EnvelopeSpec) -> Self {
        Self {
            param,
            clock,
            spec,
            phase: Phase::Idle,
        }
    }

    pub fn spec(&self) -> &EnvelopeSpec {
        &self.spec
    }

    pub fn param(&self) -> &P {
        &self.param
    }

    /// The phase the envelope is in at the current clock time.
    pub fn state(&self) -> EnvelopeState {
        self.state_at(self.clock.now())
    }

    fn state_at(&self, time: f64) -> EnvelopeState {
        let spec = &self.spec;
        match self.phase {
            Phase::Idle => EnvelopeState::Idle,
            Phase::Started {
                release: Some(release),
                ..
            } if time >= release => {
                if time >= release + spec.release_time {
                    EnvelopeState::Stopped
                } else {
                    EnvelopeState::Releasing
                }
            }
            Phase::Started { since, .. } => {
                if time < since + spec.attack_time {
                    EnvelopeState::Attacking
                } else if time < since + spec.attack_time + spec.decay_time {
                    EnvelopeState::Decaying
                } else {
                    EnvelopeState::Sustaining
                }
            }
        }
    }

    /// The value of the bound parameter right now.
    pub fn value(&self) -> f64 {
        self.param.value_at(self.clock.now())
    }

    /// Start the envelope at the current clock time.
    /// A running envelope starts over, replacing whatever it had scheduled before.
    /// An invalid spec leaves the envelope and its parameter untouched.
    pub fn start(&mut self) -> Result<(), ConfigurationError> {
        self.spec.validate()?;
        let spec = self.spec;
        let now = self.clock.now();
        let decay_start = now + spec.attack_time;
        let decay_end = decay_start + spec.decay_time;

        self.param.forget_before(now);
        self.param.schedule_ramp(Ramp::new(
            spec.start_level,
            spec.max_level,
            now,
            spec.attack_time,
        ));
        self.param.schedule_ramp(Ramp::new(
            spec.max_level,
            spec.sustain_level,
            decay_start,
            spec.decay_time,
        ));
        let release = if spec.auto_stop {
            self.schedule_release(spec.sustain_level, decay_end);
            Some(decay_end)
        } else {
            self.param
                .schedule_ramp(Ramp::hold(spec.sustain_level, decay_end));
            None
        };

        debug!(
            "envelope started at {:.3}s, decaying at {:.3}s, {} at {:.3}s",
            now,
            decay_start,
            if spec.auto_stop {
                EnvelopeState::Releasing
            } else {
                EnvelopeState::Sustaining
            },
            decay_end
        );
        self.phase = Phase::Started { since: now, release };
        Ok(())
    }

    /// Replace the spec and start over with it.
    pub fn start_with(&mut self, spec: EnvelopeSpec) -> Result<(), ConfigurationError> {
        spec.validate()?;
        self.spec = spec;
        self.start()
    }

    /// Release the envelope from wherever it currently is, replacing the rest of its timeline.
    /// Does nothing unless the envelope is attacking, decaying or sustaining.
    pub fn stop(&mut self) {
        let now = self.clock.now();
        let state = self.state_at(now);
        match state {
            EnvelopeState::Attacking | EnvelopeState::Decaying | EnvelopeState::Sustaining => {
                let current = self.param.value_at(now);
                self.param.forget_before(now);
                self.schedule_release(current, now);
                if let Phase::Started { release, .. } = &mut self.phase {
                    *release = Some(now);
                }
                debug!("envelope released while {} at {:.3}s", state, now);
            }
            EnvelopeState::Idle | EnvelopeState::Releasing | EnvelopeState::Stopped => {}
        }
    }

    /// Ramp from `level` back to the start level, then hold it.
    fn schedule_release(&mut self, level: f64, at: f64) {
        let spec = self.spec;
        self.param.schedule_ramp(Ramp::new(
            level,
            spec.start_level,
            at,
            spec.release_time,
        ));
        self.param
            .schedule_ramp(Ramp::hold(spec.start_level, at + spec.release_time));
    }
}

/// Ramp a parameter from its current value up to full level.
pub fn fade_in<P: Param>(param: &mut P, now: f64, duration: f64) {
    fade_to(param, 1.0, now, duration)
}

/// Ramp a parameter from its current value down to silence.
pub fn fade_out<P: Param>(param: &mut P, now: f64, duration: f64) {
    fade_to(param, 0.0, now, duration)
}

fn fade_to<P: Param>(param: &mut P, level: f64, now: f64, duration: f64) {
    let current = param.value_at(now);
    param.schedule_ramp(Ramp::new(current, level, now, duration));
}
