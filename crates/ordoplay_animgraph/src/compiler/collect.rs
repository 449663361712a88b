// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node collection and per-kind pin counting.

use crate::connection::Connection;
use crate::document::Document;
use crate::node::{Node, NodeId};
use crate::pin::{PinId, PinKind};
use std::collections::HashMap;

/// Slot counters for one pin kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotCounter {
    /// Connected input pins
    pub input_count: u32,
    /// Connected output pins
    pub output_count: u32,
    /// Next free input slot
    pub next_input: u32,
    /// Next free output slot
    pub next_output: u32,
}

/// Slot counters for every pin kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinSlotCounts {
    counters: [SlotCounter; PinKind::COUNT],
}

impl PinSlotCounts {
    /// Counters of a kind
    pub fn get(&self, kind: PinKind) -> &SlotCounter {
        &self.counters[kind.index()]
    }

    /// Input slot count of every kind, in artifact order
    pub fn input_counts(&self) -> [u32; PinKind::COUNT] {
        self.counters.map(|c| c.input_count)
    }

    /// Output slot count of every kind, in artifact order
    pub fn output_counts(&self) -> [u32; PinKind::COUNT] {
        self.counters.map(|c| c.output_count)
    }

    pub(crate) fn count_input(&mut self, kind: PinKind) {
        self.counters[kind.index()].input_count += 1;
    }

    pub(crate) fn count_output(&mut self, kind: PinKind) {
        self.counters[kind.index()].output_count += 1;
    }

    /// Take the next free input slot of a kind
    pub(crate) fn allocate_input(&mut self, kind: PinKind) -> u32 {
        let counter = &mut self.counters[kind.index()];
        let index = counter.next_input;
        counter.next_input += 1;
        index
    }

    /// Take the next free output slot of a kind
    pub(crate) fn allocate_output(&mut self, kind: PinKind) -> u32 {
        let counter = &mut self.counters[kind.index()];
        let index = counter.next_output;
        counter.next_output += 1;
        index
    }
}

/// Read-only view of a document's nodes and pin connections
pub struct GraphView<'a> {
    nodes: Vec<&'a Node>,
    node_index: HashMap<NodeId, usize>,
    pin_connections: HashMap<PinId, Vec<&'a Connection>>,
}

impl<'a> GraphView<'a> {
    /// Nodes in authoring order
    pub fn nodes(&self) -> &[&'a Node] {
        &self.nodes
    }

    /// Position of a node in [`GraphView::nodes`]
    pub fn node_index(&self, node_id: NodeId) -> Option<usize> {
        self.node_index.get(&node_id).copied()
    }

    /// Connections attached to a pin, in the order they were made
    pub fn connections(&self, pin_id: PinId) -> &[&'a Connection] {
        self.pin_connections
            .get(&pin_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether a pin has at least one connection
    pub fn is_connected(&self, pin_id: PinId) -> bool {
        !self.connections(pin_id).is_empty()
    }
}

/// Gather the document's nodes and count connected pins per kind.
///
/// Comments and other non-node objects are skipped. Unconnected pins get no
/// runtime slot and are not counted.
pub fn collect(document: &Document) -> (GraphView<'_>, PinSlotCounts) {
    let nodes: Vec<&Node> = document.nodes().collect();
    let node_index = nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();

    let mut pin_connections: HashMap<PinId, Vec<&Connection>> = HashMap::new();
    for connection in document.connections() {
        pin_connections.entry(connection.from_pin).or_default().push(connection);
        pin_connections.entry(connection.to_pin).or_default().push(connection);
    }

    let view = GraphView {
        nodes,
        node_index,
        pin_connections,
    };

    let mut counts = PinSlotCounts::default();
    for node in view.nodes() {
        for pin in node.inputs.iter().filter(|p| view.is_connected(p.id)) {
            counts.count_input(pin.kind());
        }
        for pin in node.outputs.iter().filter(|p| view.is_connected(p.id)) {
            counts.count_output(pin.kind());
        }
    }

    (view, counts)
}
