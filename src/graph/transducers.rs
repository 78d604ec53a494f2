// sound-world -- note names, frequencies and envelopes for programmatic sound control
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use std::cell::RefCell;
use std::rc::Rc;

use crate::automation::Param;

/// A source emitting the same value on every sample.
pub struct Constant {
    value: f64,
}

impl Constant {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl super::Node for Constant {
    fn num_inputs(&self) -> usize {
        0
    }
    fn num_outputs(&self) -> usize {
        1
    }
    fn render(&mut self, rio: &super::RenderIo) {
        for o in rio.output(0).iter_mut() {
            *o = self.value;
        }
    }
}

pub struct Gain {
    gain: f64,
}

impl Gain {
    /// Create a gain node that applies a linear gain.
    pub fn from_linear(gain: f64) -> Self {
        Self { gain }
    }
}

impl Default for Gain {
    fn default() -> Self {
        Self::from_linear(1.0)
    }
}

impl super::Node for Gain {
    fn num_inputs(&self) -> usize {
        1
    }
    fn num_outputs(&self) -> usize {
        1
    }
    fn render(&mut self, rio: &super::RenderIo) {
        let input = rio.input(0);
        let mut output = rio.output(0);

        for (i, o) in input.iter().zip(output.iter_mut()) {
            *o = *i * self.gain;
        }
    }
}

/// A gain node whose gain follows an automated parameter, evaluated at the clock time of
/// every sample.
pub struct ParamGain<P> {
    gain: P,
}

impl<P: Param> ParamGain<P> {
    pub fn new(gain: P) -> Self {
        Self { gain }
    }
}

impl<P: Param> super::Node for ParamGain<P> {
    fn num_inputs(&self) -> usize {
        1
    }
    fn num_outputs(&self) -> usize {
        1
    }
    fn render(&mut self, rio: &super::RenderIo) {
        let input = rio.input(0);
        let mut output = rio.output(0);

        for (offset, (i, o)) in input.iter().zip(output.iter_mut()).enumerate() {
            *o = *i * self.gain.value_at(rio.time_of(offset));
        }
    }
}

/// A sink appending everything it receives to a shared buffer.
pub struct Recorder {
    samples: Rc<RefCell<Vec<f64>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            samples: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A handle to the recorded samples that stays valid after the recorder was moved into a graph.
    pub fn samples(&self) -> Rc<RefCell<Vec<f64>>> {
        Rc::clone(&self.samples)
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Node for Recorder {
    fn num_inputs(&self) -> usize {
        1
    }
    fn num_outputs(&self) -> usize {
        0
    }
    fn render(&mut self, rio: &super::RenderIo) {
        self.samples.borrow_mut().extend_from_slice(&rio.input(0));
    }
}
