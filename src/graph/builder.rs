// sound-world -- note names, frequencies and envelopes for programmatic sound control
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use std::rc::Rc;

use log::trace;
use snafu::Snafu;

use super::*;

/// Construct an audio graph.
pub struct GraphBuilder {
    nodes: Vec<Box<dyn Node>>,
    edges: Vec<(OutputRef, InputRef)>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn add_node<N: Node + 'static>(&mut self, node: N) -> NodeBuilder<'_> {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Box::new(node));
        NodeBuilder {
            graph_builder: self,
            node: id,
        }
    }

    /// Chain the given nodes, feeding the first output of each node into the first input
    /// of the next one. The first node acts as the source and the last one as the sink.
    pub fn connect(&mut self, chain: &[NodeId]) {
        for pair in chain.windows(2) {
            self.edges.push((pair[0].output(0), pair[1].input(0)));
        }
    }

    /// Consume the builder and turn it into a graph, provided that the graph structure has
    /// no cycles and all edges refer to existing inputs and outputs.
    pub fn build(self, buffer_size: Sample, sample_rate: f64) -> Result<Graph, GraphBuildError> {
        let mut nodes: Vec<NodeHolder> = self
            .nodes
            .into_iter()
            .map(|node| NodeHolder::new(node, buffer_size))
            .collect();

        // For every node, the nodes reading from one of its outputs.
        let mut dependents: Vec<Vec<NodeId>> = vec![Vec::new(); nodes.len()];
        for (output, input) in self.edges {
            share_buffer(&mut nodes, output, input)?;
            let readers = &mut dependents[output.node.0];
            if !readers.contains(&input.node) {
                readers.push(input.node);
            }
        }

        let evaluation_order = evaluation_order(&dependents)?;
        trace!("graph evaluation order {:?}", evaluation_order);
        Ok(Graph {
            nodes,
            evaluation_order,
            clock: SampleClock::new(sample_rate),
            buffer_size,
        })
    }
}

/// Let `input` read the buffer `output` writes to.
fn share_buffer(
    nodes: &mut [NodeHolder],
    output: OutputRef,
    input: InputRef,
) -> Result<(), GraphBuildError> {
    let buffer = nodes
        .get(output.node.0)
        .ok_or(GraphBuildError::InvalidNode { node: output.node })?
        .output_buffers
        .get(output.index)
        .ok_or(GraphBuildError::InvalidOutput { output })?;
    let buffer = Rc::clone(buffer);

    let slot = nodes
        .get_mut(input.node.0)
        .ok_or(GraphBuildError::InvalidNode { node: input.node })?
        .input_buffers
        .get_mut(input.index)
        .ok_or(GraphBuildError::InvalidInput { input })?;
    *slot = buffer;
    Ok(())
}

/// Order the nodes such that each one comes after every node it reads from (Kahn's algorithm).
fn evaluation_order(dependents: &[Vec<NodeId>]) -> Result<Vec<NodeId>, GraphBuildError> {
    let mut unresolved = vec![0usize; dependents.len()];
    for readers in dependents {
        for reader in readers {
            unresolved[reader.0] += 1;
        }
    }

    let mut ready: Vec<NodeId> = (0..dependents.len())
        .filter(|&id| unresolved[id] == 0)
        .map(NodeId)
        .collect();
    let mut order = Vec::with_capacity(dependents.len());
    while let Some(node) = ready.pop() {
        order.push(node);
        for reader in &dependents[node.0] {
            unresolved[reader.0] -= 1;
            if unresolved[reader.0] == 0 {
                ready.push(*reader);
            }
        }
    }

    // Nodes on a cycle never become ready.
    if order.len() == dependents.len() {
        Ok(order)
    } else {
        Err(GraphBuildError::Cycle)
    }
}

/// Possible errors when building a graph.
#[derive(Debug, PartialEq, Snafu)]
pub enum GraphBuildError {
    #[snafu(display("There is a cycle in the graph"))]
    Cycle,
    #[snafu(display("Referenced node {:?} does not exist", node))]
    InvalidNode { node: NodeId },
    #[snafu(display("Referenced input {:?} does not exist", input))]
    InvalidInput { input: InputRef },
    #[snafu(display("Referenced output {:?} does not exist", output))]
    InvalidOutput { output: OutputRef },
}

/// Construct the connections between nodes.
pub struct NodeBuilder<'a> {
    graph_builder: &'a mut GraphBuilder,
    node: NodeId,
}

impl<'a> NodeBuilder<'a> {
    /// Feed the output of this node with the given index to the input of another node.
    pub fn output_to(self, output_index: usize, input: InputRef) -> NodeBuilder<'a> {
        self.graph_builder
            .edges
            .push((self.node.output(output_index), input));
        self
    }

    /// Receive the output of another node at the given input of this node.
    pub fn input_from(self, input_index: usize, output: OutputRef) -> NodeBuilder<'a> {
        self.graph_builder
            .edges
            .push((output, self.node.input(input_index)));
        self
    }

    /// Stop building this node, returning its ID for future references.
    pub fn build(self) -> NodeId {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A cycle between two nodes is rejected.
    #[test]
    fn cycle_detection() {
        let mut b = GraphBuilder::new();
        let sink = b.add_node(Recorder::new()).build();
        let gain = b.add_node(Gain::default()).build();
        let feedback = b.add_node(Gain::from_linear(0.5)).build();
        b.connect(&[gain, feedback, gain]);
        b.connect(&[gain, sink]);

        match b.build(10, 44100.0) {
            Ok(_) => panic!("Expected graph build to fail due to cycle"),
            Err(err) => assert_eq!(err, GraphBuildError::Cycle),
        }
    }

    /// Nodes are evaluated from source to sink, even when added in a different order.
    #[test]
    fn correct_order() {
        let mut b = GraphBuilder::new();
        let sink = b.add_node(Recorder::new()).build();
        let y = b
            .add_node(Gain::default())
            .output_to(0, sink.input(0))
            .build();
        let x = b.add_node(Gain::default()).output_to(0, y.input(0)).build();
        let source = b.add_node(Constant::new(1.0)).build();
        b.connect(&[source, x]);

        let graph = b.build(10, 44100.0).unwrap();

        assert_eq!(graph.evaluation_order(), &[source, x, y, sink][..]);
    }

    #[test]
    fn connect_chains_in_call_order() {
        let mut b = GraphBuilder::new();
        let nodes = [
            b.add_node(Constant::new(0.5)).build(),
            b.add_node(Gain::from_linear(2.0)).build(),
            b.add_node(Gain::from_linear(3.0)).build(),
            b.add_node(Recorder::new()).build(),
        ];
        b.connect(&nodes);
        let graph = b.build(4, 8.0).unwrap();
        assert_eq!(graph.evaluation_order(), &nodes[..]);

        // Chains of fewer than two nodes have nothing to connect.
        let mut b = GraphBuilder::new();
        let lonely = b.add_node(Constant::new(0.0)).build();
        b.connect(&[lonely]);
        b.connect(&[]);
        assert_eq!(b.build(4, 8.0).unwrap().evaluation_order(), &[lonely][..]);
    }

    #[test]
    fn dangling_references() {
        let mut b = GraphBuilder::new();
        let source = b.add_node(Constant::new(1.0)).build();
        let sink = b.add_node(Recorder::new()).build();
        b.add_node(Gain::default())
            .input_from(0, source.output(1))
            .output_to(0, sink.input(0));
        assert_eq!(
            b.build(4, 8.0).err(),
            Some(GraphBuildError::InvalidOutput {
                output: source.output(1)
            })
        );

        let mut b = GraphBuilder::new();
        let source = b.add_node(Constant::new(1.0)).build();
        b.add_node(Recorder::new()).input_from(1, source.output(0));
        assert_eq!(
            b.build(4, 8.0).err(),
            Some(GraphBuildError::InvalidInput {
                input: NodeId(1).input(1)
            })
        );

        let mut b = GraphBuilder::new();
        b.add_node(Constant::new(1.0)).output_to(0, NodeId(7).input(0));
        assert_eq!(
            b.build(4, 8.0).err(),
            Some(GraphBuildError::InvalidNode { node: NodeId(7) })
        );
    }
}
