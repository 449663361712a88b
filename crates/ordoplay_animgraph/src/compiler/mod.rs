// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compilation of an authored document into a [`CompiledGraph`].
//!
//! The pipeline runs in fixed stages:
//! 1. [`collect`] gathers nodes and counts connected pins per kind
//! 2. [`priority`] orders the nodes and drops those no terminal node reaches
//! 3. [`materialize`] creates the runtime nodes and copies their properties
//! 4. [`allocate`] numbers input slots, then output slots with their fan-out
//!
//! Slot counts are taken from the whole document before unreachable nodes
//! are dropped, so the artifact may declare slots no surviving pin uses.

pub mod allocate;
pub mod collect;
pub mod materialize;
pub mod priority;

use crate::document::Document;
use crate::node::NodeRegistry;
use crate::pin::{PinDirection, PinKind};
use crate::property::PropertyError;
use crate::runtime::{ArtifactError, CompiledGraph};
use allocate::SlotAllocator;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Compiler options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileSettings {
    /// Fail instead of warning when a connection cannot be resolved
    pub strict: bool,
    /// Maximum number of input or output slots of a single pin kind
    pub max_slots_per_kind: u32,
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self {
            strict: false,
            max_slots_per_kind: u32::from(u16::MAX),
        }
    }
}

impl CompileSettings {
    /// Load settings from RON, missing fields keep their defaults
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Effective slot limit, never above what a `u16` index can address
    fn slot_limit(&self) -> u32 {
        self.max_slots_per_kind.min(u32::from(u16::MAX))
    }
}

/// Compilation error
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Nodes exist but none of them produces output
    #[error("Animation controller graph doesn't have any output nodes")]
    NoOutputNodes,

    /// Node type is not in the registry
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// Authored pins no longer match the runtime node layout
    #[error("Pin '{pin}' of node '{node}' does not match the layout of '{node_type}'")]
    PinLayoutMismatch {
        /// Node name
        node: String,
        /// Node type id
        node_type: String,
        /// Pin name
        pin: String,
    },

    /// Property could not be applied to the runtime node
    #[error("Node '{node}': {source}")]
    Property {
        /// Node name
        node: String,
        /// Underlying error
        #[source]
        source: PropertyError,
    },

    /// Too many slots of one kind
    #[error("{count} {direction:?} slots of kind {kind:?} exceed the limit of {limit}")]
    SlotOverflow {
        /// Pin kind
        kind: PinKind,
        /// Slot direction
        direction: PinDirection,
        /// Slots required
        count: usize,
        /// Allowed maximum
        limit: u32,
    },

    /// Output feeds a compiled input that has no slot
    #[error("Output '{pin}' of node '{node}' feeds an input without a slot")]
    MissingFanOutTarget {
        /// Node name
        node: String,
        /// Pin name
        pin: String,
    },

    /// Artifact could not be written
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Compile a document into its runtime graph.
///
/// A document without nodes compiles to an empty graph.
pub fn compile_graph(
    document: &Document,
    registry: &NodeRegistry,
    settings: &CompileSettings,
) -> Result<CompiledGraph, CompileError> {
    let (view, counts) = collect::collect(document);
    if view.nodes().is_empty() {
        tracing::debug!("Document '{}' has no nodes, writing empty graph", document.name);
        return Ok(CompiledGraph::default());
    }

    let ordered = priority::sort_by_priority(&view);
    if ordered.is_empty() {
        return Err(CompileError::NoOutputNodes);
    }
    let pruned = view.nodes().len() - ordered.len();
    if pruned > 0 {
        tracing::debug!("Dropped {} node(s) that feed no output", pruned);
    }

    let limit = settings.slot_limit();
    for kind in PinKind::ALL {
        let counter = counts.get(kind);
        for (direction, count) in [
            (PinDirection::Input, counter.input_count),
            (PinDirection::Output, counter.output_count),
        ] {
            if count > limit {
                return Err(CompileError::SlotOverflow {
                    kind,
                    direction,
                    count: count as usize,
                    limit,
                });
            }
        }
    }

    let input_slot_counts = counts.input_counts();
    let mut output_to_input = counts
        .output_counts()
        .map(|count| vec![Vec::new(); count as usize]);

    let mut nodes = materialize::materialize_nodes(&ordered, registry)?;

    let mut allocator = SlotAllocator::new(&view, counts, settings.strict);
    allocator.assign_inputs(&ordered, &mut nodes)?;
    allocator.assign_outputs(&ordered, &mut nodes, &mut output_to_input)?;

    tracing::info!(
        "Compiled '{}': {} node(s), input slots {:?}",
        document.name,
        nodes.len(),
        input_slot_counts
    );

    Ok(CompiledGraph {
        input_slot_counts,
        output_to_input,
        nodes,
    })
}

/// Compile a document and write the length-prefixed artifact.
///
/// Returns the number of bytes written.
pub fn compile_to_writer<W: Write>(
    document: &Document,
    registry: &NodeRegistry,
    settings: &CompileSettings,
    writer: &mut W,
) -> Result<u64, CompileError> {
    let graph = compile_graph(document, registry, settings)?;
    Ok(graph.write_to(writer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::create_animation_registry;

    #[test]
    fn test_settings_defaults_from_partial_ron() {
        let settings = CompileSettings::from_ron("(strict: true)").unwrap();
        assert!(settings.strict);
        assert_eq!(settings.max_slots_per_kind, 65535);
    }

    #[test]
    fn test_slot_limit_is_enforced() {
        let registry = create_animation_registry();
        let mut doc = Document::new("Limit");
        let number = doc.add_node(registry.create_node("controller_number").unwrap());
        for _ in 0..3 {
            let compare = doc.add_node(registry.create_node("compare_number").unwrap());
            let event = doc.add_node(registry.create_node("send_event").unwrap());
            doc.connect_named(number, "Value", compare, "Number").unwrap();
            doc.connect_named(compare, "IsTrue", event, "Active").unwrap();
        }

        let settings = CompileSettings {
            max_slots_per_kind: 2,
            ..Default::default()
        };
        let err = compile_graph(&doc, &registry, &settings).unwrap_err();
        assert!(matches!(
            err,
            CompileError::SlotOverflow {
                count: 3,
                limit: 2,
                ..
            }
        ));

        assert!(compile_graph(&doc, &registry, &CompileSettings::default()).is_ok());
    }

    #[test]
    fn test_compile_to_writer_reports_length() {
        let registry = create_animation_registry();
        let mut doc = Document::new("Writer");
        doc.add_node(registry.create_node("send_event").unwrap());

        let mut out = Vec::new();
        let written = compile_to_writer(&doc, &registry, &CompileSettings::default(), &mut out).unwrap();
        assert_eq!(written, out.len() as u64);

        let len = u64::from_le_bytes(out[..8].try_into().unwrap());
        assert_eq!(len + 8, written);
    }
}
