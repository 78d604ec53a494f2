// sound-world -- note names, frequencies and envelopes for programmatic sound control
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Sources of the current audio time.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Time measured in samples.
pub type Sample = usize;

/// A monotonic clock reporting the current time in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
///
/// ```
/// use sound_world::clock::*;
/// let clock = ManualClock::new();
/// let view = clock.clone();
/// clock.advance(1.5);
/// assert_eq!(view.now(), 1.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    seconds: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock to an absolute time. Moving backwards is ignored to keep the clock monotonic.
    pub fn set(&self, seconds: f64) {
        if seconds > self.seconds.get() {
            self.seconds.set(seconds);
        }
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.seconds.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.seconds.get()
    }
}

/// A clock counting rendered samples. Clones share the same counter.
#[derive(Debug, Clone)]
pub struct SampleClock {
    samples: Rc<Cell<Sample>>,
    sample_rate: f64,
}

impl SampleClock {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            samples: Rc::new(Cell::new(0)),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn samples(&self) -> Sample {
        self.samples.get()
    }

    /// Time in seconds of the given sample.
    pub fn seconds(&self, sample: Sample) -> f64 {
        sample as f64 / self.sample_rate
    }

    pub fn advance(&self, samples: Sample) {
        self.samples.set(self.samples.get() + samples);
    }
}

impl Clock for SampleClock {
    fn now(&self) -> f64 {
        self.seconds(self.samples.get())
    }
}

/// Wall clock time since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}
