// SPDX-License-Identifier: MIT OR Apache-2.0
//! Weak topological ordering of the nodes.
//!
//! The walk starts at the terminal nodes (no output pins) and moves
//! backward over the connections of their input pins. Every hop lowers the
//! priority by one and each node keeps the lowest value it was reached with,
//! so nodes feeding others always sort before them. Nodes no terminal node
//! can reach keep [`UNVISITED`] and are dropped.

use super::collect::GraphView;
use crate::node::Node;

/// Priority of nodes no terminal node reaches
pub const UNVISITED: u32 = u32::MAX;

/// Priority given to terminal nodes
pub const TERMINAL: u32 = UNVISITED - 1;

enum Step {
    Enter { node: usize, priority: u32 },
    Leave { node: usize },
}

/// Compute the priority of every node in `view`, indexed like
/// [`GraphView::nodes`].
///
/// A node is only revisited when it is reached with a strictly lower
/// priority, and a node already on the current path is not entered again,
/// which keeps cyclic graphs finite.
pub fn assign_priorities(view: &GraphView<'_>) -> Vec<u32> {
    let nodes = view.nodes();
    let mut priorities = vec![UNVISITED; nodes.len()];
    let mut on_path = vec![false; nodes.len()];
    let mut stack = Vec::new();

    for (root, _) in nodes.iter().enumerate().filter(|(_, n)| n.is_terminal()) {
        stack.push(Step::Enter {
            node: root,
            priority: TERMINAL,
        });

        while let Some(step) = stack.pop() {
            let (node, priority) = match step {
                Step::Leave { node } => {
                    on_path[node] = false;
                    continue;
                }
                Step::Enter { node, priority } => (node, priority),
            };

            if on_path[node] || priority >= priorities[node] {
                continue;
            }

            priorities[node] = priority;
            on_path[node] = true;
            stack.push(Step::Leave { node });

            let upstream = upstream_nodes(view, nodes[node]);
            // reversed so the first connection is walked first
            for source in upstream.into_iter().rev() {
                stack.push(Step::Enter {
                    node: source,
                    priority: priority.saturating_sub(1),
                });
            }
        }
    }

    priorities
}

fn upstream_nodes(view: &GraphView<'_>, node: &Node) -> Vec<usize> {
    node.inputs
        .iter()
        .flat_map(|pin| view.connections(pin.id).iter().filter(move |c| c.to_pin == pin.id))
        .filter_map(|c| view.node_index(c.from_node))
        .collect()
}

/// Drop unreachable nodes and order the rest by ascending priority.
///
/// The sort is stable: nodes with equal priority keep their authoring order.
pub fn sort_by_priority<'a>(view: &GraphView<'a>) -> Vec<&'a Node> {
    let priorities = assign_priorities(view);

    let mut reachable: Vec<usize> = (0..priorities.len())
        .filter(|&i| priorities[i] != UNVISITED)
        .collect();
    reachable.sort_by_key(|&i| priorities[i]);

    reachable.into_iter().map(|i| view.nodes()[i]).collect()
}
