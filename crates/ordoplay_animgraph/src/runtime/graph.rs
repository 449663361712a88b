// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiled graph artifact and its binary framing.
//!
//! The block is encoded with bincode's fixed-int little-endian layout:
//! per-kind input slot counts, per-kind fan-out tables, then the ordered
//! nodes, each prefixed by its variant tag. On the stream the block is
//! preceded by its byte length as a `u64` so readers can skip it.

use super::{AnimGraphNode, PIN_UNCONNECTED};
use crate::pin::PinKind;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Flattened runtime graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledGraph {
    /// Number of input slots per pin kind
    pub input_slot_counts: [u32; PinKind::COUNT],
    /// Per pin kind, for every output slot the input slots it feeds
    pub output_to_input: [Vec<Vec<u16>>; PinKind::COUNT],
    /// Nodes in execution order
    pub nodes: Vec<AnimGraphNode>,
}

impl CompiledGraph {
    /// Number of input slots of a kind
    pub fn input_slot_count(&self, kind: PinKind) -> u32 {
        self.input_slot_counts[kind.index()]
    }

    /// Number of output slots of a kind
    pub fn output_slot_count(&self, kind: PinKind) -> usize {
        self.output_to_input[kind.index()].len()
    }

    /// Input slots fed by an output slot
    pub fn fan_out(&self, kind: PinKind, output_slot: u16) -> Option<&[u16]> {
        self.output_to_input[kind.index()]
            .get(usize::from(output_slot))
            .map(Vec::as_slice)
    }

    /// Whether the graph holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check that every slot reference is in range
    pub fn validate(&self) -> Result<(), ArtifactError> {
        for kind in PinKind::ALL {
            let count = self.input_slot_count(kind);
            for &index in self.output_to_input[kind.index()].iter().flatten() {
                if u32::from(index) >= count {
                    return Err(ArtifactError::SlotOutOfRange { kind, index, count });
                }
            }
        }

        for node in &self.nodes {
            let node = node.as_node();
            for (position, descriptor) in node.input_descriptors().into_iter().enumerate() {
                let Some(pin) = node.input_pin(position) else {
                    continue;
                };
                let count = self.input_slot_count(descriptor.kind);
                if pin.pin_index != PIN_UNCONNECTED && u32::from(pin.pin_index) >= count {
                    return Err(ArtifactError::SlotOutOfRange {
                        kind: descriptor.kind,
                        index: pin.pin_index,
                        count,
                    });
                }
            }
            for (position, descriptor) in node.output_descriptors().into_iter().enumerate() {
                let Some(pin) = node.output_pin(position) else {
                    continue;
                };
                let count = self.output_slot_count(descriptor.kind) as u32;
                if pin.pin_index != PIN_UNCONNECTED && u32::from(pin.pin_index) >= count {
                    return Err(ArtifactError::SlotOutOfRange {
                        kind: descriptor.kind,
                        index: pin.pin_index,
                        count,
                    });
                }
            }
        }

        Ok(())
    }

    /// Encode the block without its length prefix
    pub fn encode(&self) -> Result<Vec<u8>, ArtifactError> {
        Ok(bincode::serialize(self)?)
    }

    /// Write the length-prefixed block, returning the number of bytes written
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<u64, ArtifactError> {
        let block = self.encode()?;
        let len = block.len() as u64;
        writer.write_all(&len.to_le_bytes())?;
        writer.write_all(&block)?;
        Ok(len + 8)
    }

    /// Read a length-prefixed block written by [`CompiledGraph::write_to`]
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, ArtifactError> {
        let mut len_bytes = [0u8; 8];
        reader.read_exact(&mut len_bytes)?;
        let len = u64::from_le_bytes(len_bytes);

        let mut block = Vec::new();
        reader.take(len).read_to_end(&mut block)?;
        if block.len() as u64 != len {
            return Err(ArtifactError::Truncated {
                expected: len,
                found: block.len() as u64,
            });
        }

        let graph: CompiledGraph = bincode::deserialize(&block)?;
        graph.validate()?;
        Ok(graph)
    }

    /// Human readable dump for debugging
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Error reading or writing a compiled graph
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// Binary encoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Stream error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream ended inside the block
    #[error("Truncated graph block: expected {expected} bytes, found {found}")]
    Truncated {
        /// Declared block length
        expected: u64,
        /// Bytes actually available
        found: u64,
    },

    /// A slot reference exceeds the declared slot count
    #[error("{kind:?} slot {index} out of range (count {count})")]
    SlotOutOfRange {
        /// Pin kind of the slot
        kind: PinKind,
        /// Offending index
        index: u16,
        /// Declared count
        count: u32,
    },
}
