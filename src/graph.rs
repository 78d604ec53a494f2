// sound-world -- note names, frequencies and envelopes for programmatic sound control
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! A graph of audio nodes, rendered block by block from the sources to the sinks.
//! Parameters of the nodes can be automated, e.g. by an envelope sharing the parameter.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::clock::{Sample, SampleClock};

mod builder;
mod transducers;

pub use builder::{GraphBuildError, GraphBuilder, NodeBuilder};
pub use transducers::*;

/// A block of mono samples.
pub type Buffer = Vec<f64>;

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn input(self, index: usize) -> InputRef {
        InputRef { node: self, index }
    }

    pub fn output(self, index: usize) -> OutputRef {
        OutputRef { node: self, index }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct InputRef {
    node: NodeId,
    index: usize,
}

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct OutputRef {
    node: NodeId,
    index: usize,
}

pub struct Graph {
    nodes: Vec<NodeHolder>,
    evaluation_order: Vec<NodeId>,
    clock: SampleClock,
    buffer_size: Sample,
}

impl Graph {
    /// Render one block of samples and advance the clock past it.
    pub fn step(&mut self) {
        for id in self.evaluation_order.iter() {
            let holder = &mut self.nodes[id.0];

            let rio = RenderIo {
                start: self.clock.samples(),
                length: self.buffer_size,
                sample_rate: self.clock.sample_rate(),
                inputs: &holder.input_buffers,
                outputs: &holder.output_buffers,
            };
            holder.node.render(&rio);
        }
        self.clock.advance(self.buffer_size);
    }

    /// The clock advanced by `step`. Clones of it can drive envelopes automating the nodes.
    pub fn clock(&self) -> &SampleClock {
        &self.clock
    }

    pub fn buffer_size(&self) -> Sample {
        self.buffer_size
    }

    /// The order in which nodes are rendered, sources first.
    pub fn evaluation_order(&self) -> &[NodeId] {
        &self.evaluation_order
    }
}

struct NodeHolder {
    node: Box<dyn Node>,
    input_buffers: Vec<Rc<RefCell<Buffer>>>,
    output_buffers: Vec<Rc<RefCell<Buffer>>>,
}

impl NodeHolder {
    fn new(node: Box<dyn Node>, buffer_size: Sample) -> Self {
        // Unconnected inputs keep reading this silent buffer.
        let input_buffers = std::iter::repeat_with(|| Rc::new(RefCell::new(vec![0.0; buffer_size])))
            .take(node.num_inputs())
            .collect();
        let output_buffers =
            std::iter::repeat_with(|| Rc::new(RefCell::new(vec![0.0; buffer_size])))
                .take(node.num_outputs())
                .collect();

        Self {
            node,
            input_buffers,
            output_buffers,
        }
    }
}

pub trait Node {
    /// Number of inputs.
    fn num_inputs(&self) -> usize;

    /// Number of outputs.
    fn num_outputs(&self) -> usize;

    fn render(&mut self, rio: &RenderIo);
}

/// References to inputs and outputs while rendering a node.
pub struct RenderIo<'a> {
    /// Sample time of the first sample in these buffers.
    start: Sample,
    /// Number of samples in these buffers
    length: Sample,
    sample_rate: f64,
    inputs: &'a [Rc<RefCell<Buffer>>],
    outputs: &'a [Rc<RefCell<Buffer>>],
}

impl<'a> RenderIo<'a> {
    pub fn start(&self) -> Sample {
        self.start
    }

    pub fn length(&self) -> Sample {
        self.length
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Clock time in seconds of the sample at `offset` within the current block.
    pub fn time_of(&self, offset: Sample) -> f64 {
        (self.start + offset) as f64 / self.sample_rate
    }

    pub fn input(&self, index: usize) -> Ref<Buffer> {
        self.inputs[index].borrow()
    }

    pub fn output(&self, index: usize) -> RefMut<Buffer> {
        self.outputs[index].borrow_mut()
    }
}
