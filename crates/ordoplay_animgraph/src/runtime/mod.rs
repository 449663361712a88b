// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runtime representation of a compiled animation controller graph.
//!
//! Runtime nodes are a closed set of concrete types wrapped in
//! [`AnimGraphNode`]. The variant order is the node type tag in the binary
//! artifact, so new node types are only ever appended.

pub mod graph;
pub mod nodes;

pub use graph::{ArtifactError, CompiledGraph};
pub use nodes::{
    BlendLocalPosesNode, BoneWeightsNode, CompareNumberNode, Comparison,
    ControllerInputNumberNode, ControllerInputTriggerNode, LocalToModelPoseNode,
    MixLocalPosesNode, ModelPoseOutputNode, SampleClipNode, SendEventNode,
};

use crate::pin::{PinDescriptor, PinDirection};
use crate::property::{PropertyDescriptor, PropertyError, PropertyValue};
use serde::{Deserialize, Serialize};

/// Pin index of a pin without connections
pub const PIN_UNCONNECTED: u16 = 0xFFFF;

/// Runtime state of an input pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPin {
    /// Slot in the per-kind input array, or [`PIN_UNCONNECTED`]
    pub pin_index: u16,
    /// Number of connections feeding this pin
    pub num_connections: u16,
}

impl InputPin {
    /// Whether the compiler assigned a slot
    pub fn is_connected(&self) -> bool {
        self.pin_index != PIN_UNCONNECTED
    }
}

impl Default for InputPin {
    fn default() -> Self {
        Self {
            pin_index: PIN_UNCONNECTED,
            num_connections: 0,
        }
    }
}

/// Runtime state of an output pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPin {
    /// Slot in the per-kind output table, or [`PIN_UNCONNECTED`]
    pub pin_index: u16,
}

impl OutputPin {
    /// Whether the compiler assigned a slot
    pub fn is_connected(&self) -> bool {
        self.pin_index != PIN_UNCONNECTED
    }
}

impl Default for OutputPin {
    fn default() -> Self {
        Self {
            pin_index: PIN_UNCONNECTED,
        }
    }
}

/// Common interface of all runtime node types
pub trait AnimNode {
    /// Registry identifier of the node type
    fn type_name(&self) -> &'static str;

    /// Pin layout, inputs and outputs in declaration order
    fn pins(&self) -> &'static [PinDescriptor];

    /// Property table, including the hidden pin properties
    fn properties(&self) -> &'static [PropertyDescriptor];

    /// Read a non-hidden property
    fn property(&self, name: &str) -> Option<PropertyValue>;

    /// Write a non-hidden property
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError>;

    /// Input pin by position among the inputs
    fn input_pin(&self, index: usize) -> Option<&InputPin>;

    /// Mutable input pin by position among the inputs
    fn input_pin_mut(&mut self, index: usize) -> Option<&mut InputPin>;

    /// Output pin by position among the outputs
    fn output_pin(&self, index: usize) -> Option<&OutputPin>;

    /// Mutable output pin by position among the outputs
    fn output_pin_mut(&mut self, index: usize) -> Option<&mut OutputPin>;

    /// Input pin descriptors
    fn input_descriptors(&self) -> Vec<&'static PinDescriptor> {
        self.pins()
            .iter()
            .filter(|p| p.direction == PinDirection::Input)
            .collect()
    }

    /// Output pin descriptors
    fn output_descriptors(&self) -> Vec<&'static PinDescriptor> {
        self.pins()
            .iter()
            .filter(|p| p.direction == PinDirection::Output)
            .collect()
    }
}

/// A runtime node of any type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnimGraphNode {
    /// See [`SampleClipNode`]
    SampleClip(SampleClipNode),
    /// See [`ControllerInputNumberNode`]
    ControllerInputNumber(ControllerInputNumberNode),
    /// See [`ControllerInputTriggerNode`]
    ControllerInputTrigger(ControllerInputTriggerNode),
    /// See [`BoneWeightsNode`]
    BoneWeights(BoneWeightsNode),
    /// See [`BlendLocalPosesNode`]
    BlendLocalPoses(BlendLocalPosesNode),
    /// See [`MixLocalPosesNode`]
    MixLocalPoses(MixLocalPosesNode),
    /// See [`CompareNumberNode`]
    CompareNumber(CompareNumberNode),
    /// See [`LocalToModelPoseNode`]
    LocalToModelPose(LocalToModelPoseNode),
    /// See [`ModelPoseOutputNode`]
    ModelPoseOutput(ModelPoseOutputNode),
    /// See [`SendEventNode`]
    SendEvent(SendEventNode),
}

impl AnimGraphNode {
    /// Borrow the node through the common interface
    pub fn as_node(&self) -> &dyn AnimNode {
        match self {
            Self::SampleClip(n) => n,
            Self::ControllerInputNumber(n) => n,
            Self::ControllerInputTrigger(n) => n,
            Self::BoneWeights(n) => n,
            Self::BlendLocalPoses(n) => n,
            Self::MixLocalPoses(n) => n,
            Self::CompareNumber(n) => n,
            Self::LocalToModelPose(n) => n,
            Self::ModelPoseOutput(n) => n,
            Self::SendEvent(n) => n,
        }
    }

    /// Mutably borrow the node through the common interface
    pub fn as_node_mut(&mut self) -> &mut dyn AnimNode {
        match self {
            Self::SampleClip(n) => n,
            Self::ControllerInputNumber(n) => n,
            Self::ControllerInputTrigger(n) => n,
            Self::BoneWeights(n) => n,
            Self::BlendLocalPoses(n) => n,
            Self::MixLocalPoses(n) => n,
            Self::CompareNumber(n) => n,
            Self::LocalToModelPose(n) => n,
            Self::ModelPoseOutput(n) => n,
            Self::SendEvent(n) => n,
        }
    }

    /// Registry identifier of the node type
    pub fn type_name(&self) -> &'static str {
        self.as_node().type_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::PinKind;

    #[test]
    fn test_pins_start_unconnected() {
        let node = AnimGraphNode::SampleClip(SampleClipNode::default());
        let node = node.as_node();
        assert!(!node.input_pin(0).unwrap().is_connected());
        assert!(!node.output_pin(1).unwrap().is_connected());
        assert!(node.input_pin(3).is_none());
        assert!(node.output_pin(2).is_none());
    }

    #[test]
    fn test_pin_descriptors_match_pin_fields() {
        let nodes = [
            AnimGraphNode::SampleClip(SampleClipNode::default()),
            AnimGraphNode::ControllerInputNumber(ControllerInputNumberNode::default()),
            AnimGraphNode::ControllerInputTrigger(ControllerInputTriggerNode::default()),
            AnimGraphNode::BoneWeights(BoneWeightsNode::default()),
            AnimGraphNode::BlendLocalPoses(BlendLocalPosesNode::default()),
            AnimGraphNode::MixLocalPoses(MixLocalPosesNode::default()),
            AnimGraphNode::CompareNumber(CompareNumberNode::default()),
            AnimGraphNode::LocalToModelPose(LocalToModelPoseNode::default()),
            AnimGraphNode::ModelPoseOutput(ModelPoseOutputNode::default()),
            AnimGraphNode::SendEvent(SendEventNode::default()),
        ];

        for node in &nodes {
            let node = node.as_node();
            let inputs = node.input_descriptors();
            let outputs = node.output_descriptors();
            assert!((0..inputs.len()).all(|i| node.input_pin(i).is_some()));
            assert!((0..outputs.len()).all(|i| node.output_pin(i).is_some()));
            assert!(node.input_pin(inputs.len()).is_none(), "{}", node.type_name());
            assert!(node.output_pin(outputs.len()).is_none(), "{}", node.type_name());

            // every pin has a hidden property of the same name
            for pin in node.pins() {
                assert!(
                    node.properties().iter().any(|p| p.name == pin.name && p.hidden),
                    "{} pin {}",
                    node.type_name(),
                    pin.name
                );
            }
        }
    }

    #[test]
    fn test_hidden_properties_cannot_be_authored() {
        let mut node = MixLocalPosesNode::default();
        assert_eq!(
            node.set_property("Poses", PropertyValue::Int(3)),
            Err(PropertyError::Hidden("Poses".to_string()))
        );
        assert_eq!(
            node.set_property("Speed", PropertyValue::Float(1.0)),
            Err(PropertyError::Unknown("Speed".to_string()))
        );
        assert_eq!(node.pins()[0].kind, PinKind::LocalPose);
        assert!(node.pins()[0].multi_input);
    }

    #[test]
    fn test_comparison_property_round_trip() {
        let mut node = CompareNumberNode::default();
        node.set_property("Comparison", PropertyValue::from("GreaterEqual")).unwrap();
        assert_eq!(node.comparison, Comparison::GreaterEqual);
        assert_eq!(node.property("Comparison"), Some(PropertyValue::from("GreaterEqual")));
        assert!(matches!(
            node.set_property("Comparison", PropertyValue::from(">=")),
            Err(PropertyError::InvalidValue { .. })
        ));
    }
}
