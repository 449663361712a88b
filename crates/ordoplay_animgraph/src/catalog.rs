// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation controller node catalog.
//!
//! Supports controller parameters, clip sampling, pose blending and events.

use crate::node::{NodeCategory, NodeRegistry, NodeType};
use crate::runtime::{
    AnimGraphNode, BlendLocalPosesNode, BoneWeightsNode, CompareNumberNode,
    ControllerInputNumberNode, ControllerInputTriggerNode, LocalToModelPoseNode,
    MixLocalPosesNode, ModelPoseOutputNode, SampleClipNode, SendEventNode,
};

/// Create the animation controller node registry
pub fn create_animation_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // ========================================================================
    // Inputs
    // ========================================================================

    registry.register(NodeType {
        id: "controller_number".to_string(),
        name: "Number Parameter".to_string(),
        category: NodeCategory::Input,
        description: "Numeric value set by gameplay code".to_string(),
        factory: || AnimGraphNode::ControllerInputNumber(ControllerInputNumberNode::default()),
    });

    registry.register(NodeType {
        id: "controller_trigger".to_string(),
        name: "Trigger Parameter".to_string(),
        category: NodeCategory::Input,
        description: "Trigger set by gameplay code".to_string(),
        factory: || AnimGraphNode::ControllerInputTrigger(ControllerInputTriggerNode::default()),
    });

    // ========================================================================
    // Poses
    // ========================================================================

    registry.register(NodeType {
        id: "sample_clip".to_string(),
        name: "Sample Clip".to_string(),
        category: NodeCategory::Pose,
        description: "Plays an animation clip".to_string(),
        factory: || AnimGraphNode::SampleClip(SampleClipNode::default()),
    });

    registry.register(NodeType {
        id: "blend_local_poses".to_string(),
        name: "Blend Poses".to_string(),
        category: NodeCategory::Pose,
        description: "Blend between two poses".to_string(),
        factory: || AnimGraphNode::BlendLocalPoses(BlendLocalPosesNode::default()),
    });

    registry.register(NodeType {
        id: "mix_local_poses".to_string(),
        name: "Mix Poses".to_string(),
        category: NodeCategory::Pose,
        description: "Combine any number of poses".to_string(),
        factory: || AnimGraphNode::MixLocalPoses(MixLocalPosesNode::default()),
    });

    registry.register(NodeType {
        id: "local_to_model_pose".to_string(),
        name: "Local To Model Pose".to_string(),
        category: NodeCategory::Pose,
        description: "Convert a local pose to model space".to_string(),
        factory: || AnimGraphNode::LocalToModelPose(LocalToModelPoseNode::default()),
    });

    // ========================================================================
    // Logic & utility
    // ========================================================================

    registry.register(NodeType {
        id: "compare_number".to_string(),
        name: "Compare Number".to_string(),
        category: NodeCategory::Logic,
        description: "Fires a trigger depending on a comparison".to_string(),
        factory: || AnimGraphNode::CompareNumber(CompareNumberNode::default()),
    });

    registry.register(NodeType {
        id: "bone_weights".to_string(),
        name: "Bone Weights".to_string(),
        category: NodeCategory::Utility,
        description: "Weights for a set of bone hierarchies".to_string(),
        factory: || AnimGraphNode::BoneWeights(BoneWeightsNode::default()),
    });

    // ========================================================================
    // Outputs
    // ========================================================================

    registry.register(NodeType {
        id: "model_pose_output".to_string(),
        name: "Output Pose".to_string(),
        category: NodeCategory::Output,
        description: "Final animation output".to_string(),
        factory: || AnimGraphNode::ModelPoseOutput(ModelPoseOutputNode::default()),
    });

    registry.register(NodeType {
        id: "send_event".to_string(),
        name: "Send Event".to_string(),
        category: NodeCategory::Output,
        description: "Raise a gameplay event".to_string(),
        factory: || AnimGraphNode::SendEvent(SendEventNode::default()),
    });

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::PinKind;

    #[test]
    fn test_registry_ids_match_runtime_types() {
        let registry = create_animation_registry();
        assert_eq!(registry.creatable_types().count(), 10);
        for node_type in registry.types() {
            assert_eq!(node_type.instantiate().type_name(), node_type.id);
        }
    }

    #[test]
    fn test_created_node_pins_and_defaults() {
        let registry = create_animation_registry();
        let node = registry.create_node("sample_clip").unwrap();

        let inputs: Vec<_> = node.inputs.iter().map(|p| (p.name.as_str(), p.kind())).collect();
        assert_eq!(
            inputs,
            [
                ("Active", PinKind::Trigger),
                ("Speed", PinKind::Number),
                ("Weights", PinKind::BoneWeights),
            ]
        );
        assert_eq!(node.outputs.len(), 2);
        assert_eq!(node.property("PlaybackSpeed"), Some(&1.0f32.into()));
        assert_eq!(node.property("Loop"), Some(&true.into()));
        assert!(node.property("Pose").is_none());
    }

    #[test]
    fn test_output_nodes_are_terminal() {
        let registry = create_animation_registry();
        for node_type in registry.types_in_category(NodeCategory::Output) {
            let node = registry.create_node(&node_type.id).unwrap();
            assert!(node.is_terminal(), "{}", node_type.id);
        }
        assert!(registry.create_node("unknown").is_none());
    }
}
