// sound-world -- note names, frequencies and envelopes for programmatic sound control
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Parameters whose value is scheduled ahead of time as a series of linear ramps.

use std::cell::RefCell;
use std::rc::Rc;

use log::trace;

/// A linear change of a parameter between two absolute points in time (in seconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    pub from: f64,
    pub to: f64,
    pub start: f64,
    pub end: f64,
}

impl Ramp {
    /// Ramp from `from` to `to`, starting at `start` and lasting `duration` seconds.
    pub fn new(from: f64, to: f64, start: f64, duration: f64) -> Self {
        Self {
            from,
            to,
            start,
            end: start + duration,
        }
    }

    /// Jump to `level` at time `at` and stay there.
    pub fn hold(level: f64, at: f64) -> Self {
        Self::new(level, level, at, 0.0)
    }

    /// The value of the ramp at `time`. Times outside of the ramp are clamped to its ends.
    pub fn value_at(&self, time: f64) -> f64 {
        if time >= self.end {
            self.to
        } else if time <= self.start {
            self.from
        } else {
            let progress = (time - self.start) / (self.end - self.start);
            self.from + (self.to - self.from) * progress
        }
    }
}

/// A numeric parameter controlled by scheduled ramps.
pub trait Param {
    /// The value of the parameter at the given clock time.
    fn value_at(&self, time: f64) -> f64;

    /// Schedule a ramp. Everything scheduled to start at or after the start of the ramp is
    /// replaced, so the most recently scheduled ramp always wins.
    fn schedule_ramp(&mut self, ramp: Ramp);

    /// Drop history that no longer influences the value at or after `time`.
    fn forget_before(&mut self, _time: f64) {}
}

/// Parameters shared between an envelope and the node they control.
impl<P: Param> Param for Rc<RefCell<P>> {
    fn value_at(&self, time: f64) -> f64 {
        self.borrow().value_at(time)
    }

    fn schedule_ramp(&mut self, ramp: Ramp) {
        self.borrow_mut().schedule_ramp(ramp)
    }

    fn forget_before(&mut self, time: f64) {
        self.borrow_mut().forget_before(time)
    }
}

/// The timeline of a parameter, storing its values at single precision like the parameters
/// of audio hardware do. Reading back a value therefore yields the nearest `f32`,
/// e.g. setting `0.2` reads back as `0.20000000298023224`.
///
/// # Example
///
/// ```
/// use sound_world::automation::*;
///
/// let mut gain = AutomatedParam::new(1.0);
/// gain.schedule_ramp(Ramp::new(1.0, 0.0, 2.0, 4.0));
/// assert_eq!(gain.value_at(0.0), 1.0);
/// assert_eq!(gain.value_at(4.0), 0.5);
/// assert_eq!(gain.value_at(10.0), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AutomatedParam {
    /// Value before the first ramp.
    base: f32,
    /// Scheduled ramps, ordered by start time.
    ramps: Vec<StoredRamp>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StoredRamp {
    from: f32,
    to: f32,
    start: f64,
    end: f64,
}

impl StoredRamp {
    fn value_at(&self, time: f64) -> f64 {
        let ramp = Ramp {
            from: f64::from(self.from),
            to: f64::from(self.to),
            start: self.start,
            end: self.end,
        };
        f64::from(ramp.value_at(time) as f32)
    }
}

impl AutomatedParam {
    pub fn new(value: f64) -> Self {
        Self {
            base: value as f32,
            ramps: Vec::new(),
        }
    }

    /// Drop all scheduled ramps and hold `value` from now on.
    pub fn set_value(&mut self, value: f64) {
        self.base = value as f32;
        self.ramps.clear();
    }

    /// Number of ramps currently on the timeline.
    pub fn scheduled_ramps(&self) -> usize {
        self.ramps.len()
    }
}

impl Default for AutomatedParam {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Param for AutomatedParam {
    fn value_at(&self, time: f64) -> f64 {
        // The ramp that started last before `time` determines the value.
        match self.ramps.iter().rev().find(|r| r.start <= time) {
            Some(ramp) => ramp.value_at(time),
            None => f64::from(self.base),
        }
    }

    fn schedule_ramp(&mut self, ramp: Ramp) {
        trace!(
            "ramp {:.3} -> {:.3} from {:.3}s to {:.3}s",
            ramp.from,
            ramp.to,
            ramp.start,
            ramp.end
        );
        self.ramps.retain(|r| r.start < ramp.start);
        self.ramps.push(StoredRamp {
            from: ramp.from as f32,
            to: ramp.to as f32,
            start: ramp.start,
            end: ramp.end.max(ramp.start),
        });
    }

    fn forget_before(&mut self, time: f64) {
        // The last ramp starting by `time` alone determines the value from `time` on.
        if let Some(last) = self.ramps.iter().rposition(|r| r.start <= time) {
            self.ramps.drain(..last);
        }
    }
}

/// Create a parameter that can be handed to both an envelope and a graph node.
pub fn shared(param: AutomatedParam) -> Rc<RefCell<AutomatedParam>> {
    Rc::new(RefCell::new(param))
}
