// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runtime node instantiation.

use super::CompileError;
use crate::node::{Node, NodeRegistry};
use crate::runtime::{AnimGraphNode, AnimNode};

/// Create one runtime node per authored node, in the given order
pub fn materialize_nodes(nodes: &[&Node], registry: &NodeRegistry) -> Result<Vec<AnimGraphNode>, CompileError> {
    nodes.iter().map(|node| materialize_node(node, registry)).collect()
}

/// Create the runtime node for an authored node and copy its properties
pub fn materialize_node(node: &Node, registry: &NodeRegistry) -> Result<AnimGraphNode, CompileError> {
    let mut runtime = registry
        .instantiate(&node.node_type)
        .ok_or_else(|| CompileError::UnknownNodeType(node.node_type.clone()))?;

    copy_properties(node, runtime.as_node_mut())?;
    Ok(runtime)
}

/// Copy every non-hidden property the runtime type declares.
///
/// Properties missing from the authored node keep the runtime default.
fn copy_properties(node: &Node, target: &mut dyn AnimNode) -> Result<(), CompileError> {
    let descriptors = target.properties();

    for descriptor in descriptors.iter().filter(|p| !p.hidden) {
        let Some(value) = node.property(descriptor.name) else {
            continue;
        };
        target
            .set_property(descriptor.name, value.clone())
            .map_err(|source| CompileError::Property {
                node: node.name.clone(),
                source,
            })?;
    }

    for name in node.properties.keys() {
        if !descriptors.iter().any(|p| p.name == name && !p.hidden) {
            tracing::debug!("Dropping property '{}' of node '{}': not part of '{}'", name, node.name, node.node_type);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::create_animation_registry;
    use crate::property::{PropertyError, PropertyValue};
    use crate::runtime::{SampleClipNode, PIN_UNCONNECTED};

    #[test]
    fn test_copies_authored_values() {
        let registry = create_animation_registry();
        let node = registry
            .create_node("sample_clip")
            .unwrap()
            .with_property("Clip", "Anims/Run.clip")
            .with_property("Loop", false)
            .with_property("PlaybackSpeed", 1.5f32);

        let runtime = materialize_node(&node, &registry).unwrap();
        let AnimGraphNode::SampleClip(clip) = runtime else {
            panic!("wrong node type");
        };
        assert_eq!(clip.clip, "Anims/Run.clip");
        assert!(!clip.looping);
        assert_eq!(clip.playback_speed, 1.5);
        assert_eq!(clip.pose.pin_index, PIN_UNCONNECTED);
    }

    #[test]
    fn test_hidden_and_unknown_properties_are_not_copied() {
        let registry = create_animation_registry();
        let node = registry
            .create_node("sample_clip")
            .unwrap()
            .with_property("Pose", PropertyValue::Int(7))
            .with_property("Color", "red");

        let runtime = materialize_node(&node, &registry).unwrap();
        assert_eq!(runtime, AnimGraphNode::SampleClip(SampleClipNode::default()));
    }

    #[test]
    fn test_property_type_errors_are_reported() {
        let registry = create_animation_registry();
        let node = registry.create_node("sample_clip").unwrap().with_property("Loop", "sometimes");
        let err = materialize_node(&node, &registry).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Property {
                source: PropertyError::TypeMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_node_type() {
        let registry = create_animation_registry();
        let node = Node::empty("state_machine");
        assert!(matches!(
            materialize_node(&node, &registry),
            Err(CompileError::UnknownNodeType(t)) if t == "state_machine"
        ));
    }
}
