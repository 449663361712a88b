// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation controller graphs for `OrdoPlay`.
//!
//! This crate holds both halves of an animation controller:
//! - The authored document: nodes with typed pins, properties and connections
//! - The compiled runtime graph: ordered runtime nodes with per-kind pin slots
//!
//! ## Architecture
//!
//! Documents are edited through [`Document`] and validated against
//! [`can_connect`]. The [`compiler`] flattens a document into a
//! [`CompiledGraph`], which is written as a length-prefixed binary block.

pub mod catalog;
pub mod compiler;
pub mod connection;
pub mod document;
pub mod node;
pub mod pin;
pub mod property;
pub mod runtime;
pub mod validation;

pub use catalog::create_animation_registry;
pub use compiler::{compile_graph, compile_to_writer, CompileError, CompileSettings};
pub use connection::{Connection, ConnectionId};
pub use document::{Comment, ConnectionError, Document, DocumentObject};
pub use node::{Node, NodeCategory, NodeId, NodeRegistry, NodeType};
pub use pin::{Pin, PinDescriptor, PinDirection, PinId, PinKind};
pub use property::{PropertyError, PropertyType, PropertyValue};
pub use runtime::{AnimGraphNode, AnimNode, ArtifactError, CompiledGraph};
pub use validation::{can_connect, ConnectCardinality, ValidationError};
