// SPDX-License-Identifier: MIT OR Apache-2.0
//! Authored node definitions and the node type registry.

use crate::pin::{Pin, PinDirection, PinId};
use crate::property::PropertyValue;
use crate::runtime::AnimGraphNode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Controller parameters and constants
    Input,
    /// Final results (poses, events)
    Output,
    /// Pose sampling and blending
    Pose,
    /// Logic/flow control
    Logic,
    /// Bone masks and helpers
    Utility,
}

/// Creates the default runtime node of a type
pub type NodeFactory = fn() -> AnimGraphNode;

/// Node type definition
#[derive(Debug, Clone)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Runtime node factory
    pub factory: NodeFactory,
}

impl NodeType {
    /// Create a default runtime node of this type
    pub fn instantiate(&self) -> AnimGraphNode {
        (self.factory)()
    }
}

/// A node instance in the authored graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node type ID
    pub node_type: String,
    /// Display name (can be customized)
    pub name: String,
    /// Position in the graph UI
    pub position: [f32; 2],
    /// Input pins
    pub inputs: Vec<Pin>,
    /// Output pins
    pub outputs: Vec<Pin>,
    /// Authored property values
    pub properties: IndexMap<String, PropertyValue>,
    /// Whether the node is collapsed in the UI
    pub collapsed: bool,
}

impl Node {
    /// Create a new node from a type definition.
    ///
    /// Pins follow the runtime type's pin layout and every visible property
    /// starts at the runtime type's default value.
    pub fn new(node_type: &NodeType) -> Self {
        let runtime = node_type.instantiate();
        let runtime = runtime.as_node();

        let (inputs, outputs): (Vec<_>, Vec<_>) = runtime
            .pins()
            .iter()
            .map(Pin::from_descriptor)
            .partition(Pin::is_input);

        let properties = runtime
            .properties()
            .iter()
            .filter(|p| !p.hidden)
            .filter_map(|p| runtime.property(p.name).map(|v| (p.name.to_string(), v)))
            .collect();

        Self {
            id: NodeId::new(),
            node_type: node_type.id.clone(),
            name: node_type.name.clone(),
            position: [0.0, 0.0],
            inputs,
            outputs,
            properties,
            collapsed: false,
        }
    }

    /// Create a node without pins or properties
    pub fn empty(node_type: impl Into<String>) -> Self {
        let node_type = node_type.into();
        Self {
            id: NodeId::new(),
            name: node_type.clone(),
            node_type,
            position: [0.0, 0.0],
            inputs: Vec::new(),
            outputs: Vec::new(),
            properties: IndexMap::new(),
            collapsed: false,
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Set a property value
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set_property(name, value);
        self
    }

    /// Set a property value
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Get a property value
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Get an input pin by index
    pub fn input(&self, index: usize) -> Option<&Pin> {
        self.inputs.get(index)
    }

    /// Get an output pin by index
    pub fn output(&self, index: usize) -> Option<&Pin> {
        self.outputs.get(index)
    }

    /// Get an input pin by name
    pub fn input_named(&self, name: &str) -> Option<&Pin> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Get an output pin by name
    pub fn output_named(&self, name: &str) -> Option<&Pin> {
        self.outputs.iter().find(|p| p.name == name)
    }

    /// Get a pin by ID
    pub fn pin(&self, pin_id: &PinId) -> Option<&Pin> {
        self.inputs
            .iter()
            .find(|p| p.id == *pin_id)
            .or_else(|| self.outputs.iter().find(|p| p.id == *pin_id))
    }

    /// Direction and position of a pin among its node's inputs or outputs
    pub fn pin_position(&self, pin_id: &PinId) -> Option<(PinDirection, usize)> {
        if let Some(index) = self.inputs.iter().position(|p| p.id == *pin_id) {
            return Some((PinDirection::Input, index));
        }
        self.outputs
            .iter()
            .position(|p| p.id == *pin_id)
            .map(|index| (PinDirection::Output, index))
    }

    /// Get all pins
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Whether the node has no output pins, making it a root of the graph
    pub fn is_terminal(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Registry of available node types
pub struct NodeRegistry {
    /// Registered node types by ID
    types: IndexMap<String, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    /// Register a node type
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Get types by category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.category == category)
    }

    /// IDs of every type the editor may create
    pub fn creatable_types(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Create a node from a type ID
    pub fn create_node(&self, type_id: &str) -> Option<Node> {
        self.get(type_id).map(Node::new)
    }

    /// Create a default runtime node from a type ID
    pub fn instantiate(&self, type_id: &str) -> Option<AnimGraphNode> {
        self.get(type_id).map(NodeType::instantiate)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
