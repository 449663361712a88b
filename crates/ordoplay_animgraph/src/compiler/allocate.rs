// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slot allocation for connected pins.
//!
//! Inputs are numbered first so the output pass can resolve every outgoing
//! connection to the slot of the input it feeds. Input and output slots are
//! numbered independently per pin kind.

use super::collect::{GraphView, PinSlotCounts};
use super::CompileError;
use crate::node::{Node, NodeId};
use crate::pin::{Pin, PinDirection, PinId, PinKind};
use crate::runtime::{AnimGraphNode, AnimNode, InputPin, OutputPin};
use std::collections::{HashMap, HashSet};

/// Assigns slots to the pins of the ordered nodes
pub struct SlotAllocator<'v, 'a> {
    view: &'v GraphView<'a>,
    counts: PinSlotCounts,
    input_slots: HashMap<PinId, u16>,
    strict: bool,
}

impl<'v, 'a> SlotAllocator<'v, 'a> {
    /// Create an allocator starting from the collected counts
    pub fn new(view: &'v GraphView<'a>, counts: PinSlotCounts, strict: bool) -> Self {
        Self {
            view,
            counts,
            input_slots: HashMap::new(),
            strict,
        }
    }

    /// Slot assigned to an input pin by [`SlotAllocator::assign_inputs`]
    pub fn input_slot(&self, pin_id: PinId) -> Option<u16> {
        self.input_slots.get(&pin_id).copied()
    }

    /// Counters after allocation
    pub fn counts(&self) -> &PinSlotCounts {
        &self.counts
    }

    /// Give every connected input pin a slot and record its fan-in
    pub fn assign_inputs(&mut self, nodes: &[&Node], runtime: &mut [AnimGraphNode]) -> Result<(), CompileError> {
        for (node, runtime_node) in nodes.iter().zip(runtime.iter_mut()) {
            let runtime_node = runtime_node.as_node_mut();

            for (position, pin) in node.inputs.iter().enumerate() {
                let fan_in = self
                    .view
                    .connections(pin.id)
                    .iter()
                    .filter(|c| c.to_pin == pin.id)
                    .count();
                if fan_in == 0 {
                    continue;
                }

                let slot = runtime_input(node, runtime_node, position, pin)?;
                let index = to_slot(self.counts.allocate_input(pin.kind()), pin.kind(), PinDirection::Input)?;

                slot.pin_index = index;
                slot.num_connections = u16::try_from(fan_in).unwrap_or(u16::MAX);
                self.input_slots.insert(pin.id, index);
            }
        }

        Ok(())
    }

    /// Give every connected output pin a slot and fill its fan-out list.
    ///
    /// `fan_out` holds one table per pin kind, already sized to the output
    /// slot count of that kind.
    pub fn assign_outputs(
        &mut self,
        nodes: &[&Node],
        runtime: &mut [AnimGraphNode],
        fan_out: &mut [Vec<Vec<u16>>; PinKind::COUNT],
    ) -> Result<(), CompileError> {
        let compiled: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();

        for (node, runtime_node) in nodes.iter().zip(runtime.iter_mut()) {
            let runtime_node = runtime_node.as_node_mut();

            for (position, pin) in node.outputs.iter().enumerate() {
                let connections: Vec<_> = self
                    .view
                    .connections(pin.id)
                    .iter()
                    .filter(|c| c.from_pin == pin.id)
                    .collect();
                if connections.is_empty() {
                    continue;
                }

                let slot = runtime_output(node, runtime_node, position, pin)?;
                let index = to_slot(self.counts.allocate_output(pin.kind()), pin.kind(), PinDirection::Output)?;
                slot.pin_index = index;

                let table = &mut fan_out[pin.kind().index()];
                let limit = table.len();
                let Some(targets) = table.get_mut(usize::from(index)) else {
                    return Err(CompileError::SlotOverflow {
                        kind: pin.kind(),
                        direction: PinDirection::Output,
                        count: usize::from(index) + 1,
                        limit: u32::try_from(limit).unwrap_or(u32::MAX),
                    });
                };
                targets.reserve(connections.len());

                for connection in connections {
                    if let Some(&target) = self.input_slots.get(&connection.to_pin) {
                        targets.push(target);
                    } else if !compiled.contains(&connection.to_node) {
                        // target node was pruned as unreachable
                        tracing::debug!("Output '{}' of '{}' feeds a pruned node", pin.name, node.name);
                    } else if self.strict {
                        return Err(CompileError::MissingFanOutTarget {
                            node: node.name.clone(),
                            pin: pin.name.clone(),
                        });
                    } else {
                        tracing::warn!(
                            "Output '{}' of '{}' feeds an input without a slot, skipping",
                            pin.name,
                            node.name
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

fn to_slot(index: u32, kind: PinKind, direction: PinDirection) -> Result<u16, CompileError> {
    u16::try_from(index)
        .ok()
        .filter(|&i| i != crate::runtime::PIN_UNCONNECTED)
        .ok_or(CompileError::SlotOverflow {
            kind,
            direction,
            count: index as usize + 1,
            limit: u32::from(u16::MAX),
        })
}

fn layout_mismatch(node: &Node, pin: &Pin) -> CompileError {
    CompileError::PinLayoutMismatch {
        node: node.name.clone(),
        node_type: node.node_type.clone(),
        pin: pin.name.clone(),
    }
}

/// Runtime field backing an authored input pin, checked against the type's layout
fn runtime_input<'r>(
    node: &Node,
    runtime: &'r mut dyn AnimNode,
    position: usize,
    pin: &Pin,
) -> Result<&'r mut InputPin, CompileError> {
    let matches = runtime
        .input_descriptors()
        .get(position)
        .is_some_and(|d| d.name == pin.name && d.kind == pin.kind());
    if !matches {
        return Err(layout_mismatch(node, pin));
    }
    runtime.input_pin_mut(position).ok_or_else(|| layout_mismatch(node, pin))
}

/// Runtime field backing an authored output pin, checked against the type's layout
fn runtime_output<'r>(
    node: &Node,
    runtime: &'r mut dyn AnimNode,
    position: usize,
    pin: &Pin,
) -> Result<&'r mut OutputPin, CompileError> {
    let matches = runtime
        .output_descriptors()
        .get(position)
        .is_some_and(|d| d.name == pin.name && d.kind == pin.kind());
    if !matches {
        return Err(layout_mismatch(node, pin));
    }
    runtime.output_pin_mut(position).ok_or_else(|| layout_mismatch(node, pin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::create_animation_registry;
    use crate::compiler::collect::collect;
    use crate::compiler::materialize::materialize_nodes;
    use crate::compiler::priority::sort_by_priority;
    use crate::document::Document;
    use crate::node::Node;
    use crate::runtime::PIN_UNCONNECTED;

    #[test]
    fn test_input_slots_are_dense_and_unique() {
        let registry = create_animation_registry();
        let mut doc = Document::new("Mix");
        let mix = doc.add_node(registry.create_node("mix_local_poses").unwrap());
        let blend = doc.add_node(registry.create_node("blend_local_poses").unwrap());
        let to_model = doc.add_node(registry.create_node("local_to_model_pose").unwrap());
        let output = doc.add_node(registry.create_node("model_pose_output").unwrap());
        let clips: Vec<_> = (0..3)
            .map(|_| doc.add_node(registry.create_node("sample_clip").unwrap()))
            .collect();
        for &clip in &clips {
            doc.connect_named(clip, "Pose", mix, "Poses").unwrap();
        }
        doc.connect_named(clips[0], "Pose", blend, "PoseB").unwrap();
        doc.connect_named(mix, "Pose", blend, "PoseA").unwrap();
        doc.connect_named(blend, "Pose", to_model, "LocalPose").unwrap();
        doc.connect_named(to_model, "ModelPose", output, "Pose").unwrap();

        let (view, counts) = collect(&doc);
        let order = sort_by_priority(&view);
        let mut runtime = materialize_nodes(&order, &registry).unwrap();
        let mut allocator = SlotAllocator::new(&view, counts, false);
        allocator.assign_inputs(&order, &mut runtime).unwrap();

        let local_pose_count = allocator.counts().get(PinKind::LocalPose).input_count;
        assert_eq!(local_pose_count, 4);

        let mut seen: Vec<u16> = order
            .iter()
            .flat_map(|n| n.inputs.iter())
            .filter(|p| p.kind() == PinKind::LocalPose)
            .filter_map(|p| allocator.input_slot(p.id))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, [0, 1, 2, 3]);

        let mix_runtime = &runtime[order.iter().position(|n| n.id == mix).unwrap()];
        let mix_pin = mix_runtime.as_node().input_pin(0).unwrap();
        assert_eq!(mix_pin.num_connections, 3);
    }

    #[test]
    fn test_fan_out_lists_follow_input_slots() {
        let registry = create_animation_registry();
        let mut doc = Document::new("Fan out");
        let number = doc.add_node(registry.create_node("controller_number").unwrap());
        let compare_a = doc.add_node(registry.create_node("compare_number").unwrap());
        let compare_b = doc.add_node(registry.create_node("compare_number").unwrap());
        let event_a = doc.add_node(registry.create_node("send_event").unwrap());
        let event_b = doc.add_node(registry.create_node("send_event").unwrap());
        doc.connect_named(number, "Value", compare_a, "Number").unwrap();
        doc.connect_named(number, "Value", compare_b, "Number").unwrap();
        doc.connect_named(compare_a, "IsTrue", event_a, "Active").unwrap();
        doc.connect_named(compare_b, "IsTrue", event_b, "Active").unwrap();

        let (view, counts) = collect(&doc);
        let output_counts = counts.output_counts();
        let order = sort_by_priority(&view);
        let mut runtime = materialize_nodes(&order, &registry).unwrap();
        let mut allocator = SlotAllocator::new(&view, counts, true);
        allocator.assign_inputs(&order, &mut runtime).unwrap();

        let mut fan_out: [Vec<Vec<u16>>; PinKind::COUNT] =
            output_counts.map(|count| vec![Vec::new(); count as usize]);
        allocator.assign_outputs(&order, &mut runtime, &mut fan_out).unwrap();

        let compare_a_input = doc.node(compare_a).unwrap().input(0).unwrap().id;
        let compare_b_input = doc.node(compare_b).unwrap().input(0).unwrap().id;
        let expected = vec![
            allocator.input_slot(compare_a_input).unwrap(),
            allocator.input_slot(compare_b_input).unwrap(),
        ];
        assert_eq!(fan_out[PinKind::Number.index()], [expected]);

        assert_eq!(fan_out[PinKind::Trigger.index()], [vec![0], vec![1]]);
    }

    #[test]
    fn test_pruned_targets_are_skipped_even_when_strict() {
        let registry = create_animation_registry();
        let mut doc = Document::new("Dead branch");
        let trigger = doc.add_node(registry.create_node("controller_trigger").unwrap());
        let event = doc.add_node(registry.create_node("send_event").unwrap());
        let clip = doc.add_node(registry.create_node("sample_clip").unwrap());
        doc.connect_named(trigger, "Triggered", event, "Active").unwrap();
        doc.connect_named(trigger, "Triggered", clip, "Active").unwrap();

        let (view, counts) = collect(&doc);
        let output_counts = counts.output_counts();
        let order = sort_by_priority(&view);
        assert_eq!(order.len(), 2);

        let mut runtime = materialize_nodes(&order, &registry).unwrap();
        let mut allocator = SlotAllocator::new(&view, counts, true);
        allocator.assign_inputs(&order, &mut runtime).unwrap();
        let mut fan_out = output_counts.map(|count| vec![Vec::new(); count as usize]);
        allocator.assign_outputs(&order, &mut runtime, &mut fan_out).unwrap();

        assert_eq!(fan_out[PinKind::Trigger.index()], [vec![0]]);
    }

    #[test]
    fn test_stale_pin_layout_is_rejected() {
        let registry = create_animation_registry();
        let mut doc = Document::new("Stale");
        let mut stale = Node::empty("send_event");
        stale.inputs.push(Pin::input("Enabled", PinKind::Trigger));
        let stale = doc.add_node(stale);
        let trigger = doc.add_node(registry.create_node("controller_trigger").unwrap());
        doc.connect_named(trigger, "Triggered", stale, "Enabled").unwrap();

        let (view, counts) = collect(&doc);
        let order = sort_by_priority(&view);
        let mut runtime = materialize_nodes(&order, &registry).unwrap();
        let mut allocator = SlotAllocator::new(&view, counts, false);
        let err = allocator.assign_inputs(&order, &mut runtime).unwrap_err();
        assert!(matches!(err, CompileError::PinLayoutMismatch { pin, .. } if pin == "Enabled"));
    }

    #[test]
    fn test_unconnected_pins_keep_sentinel() {
        let registry = create_animation_registry();
        let mut doc = Document::new("Sparse");
        let clip = doc.add_node(registry.create_node("sample_clip").unwrap());
        let to_model = doc.add_node(registry.create_node("local_to_model_pose").unwrap());
        doc.add_node(registry.create_node("model_pose_output").unwrap());
        doc.connect_named(clip, "Pose", to_model, "LocalPose").unwrap();

        let (view, counts) = collect(&doc);
        let order = sort_by_priority(&view);
        // only the output node is reachable
        assert_eq!(order.len(), 1);
        let mut runtime = materialize_nodes(&order, &registry).unwrap();
        let mut allocator = SlotAllocator::new(&view, counts, false);
        allocator.assign_inputs(&order, &mut runtime).unwrap();
        assert_eq!(runtime[0].as_node().input_pin(0).unwrap().pin_index, PIN_UNCONNECTED);
    }
}
