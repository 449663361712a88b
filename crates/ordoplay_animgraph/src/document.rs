// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation controller document: nodes, comments and connections.

use crate::connection::{Connection, ConnectionId};
use crate::node::{Node, NodeId};
use crate::pin::{Pin, PinDirection, PinId};
use crate::validation::{can_connect, ValidationError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A free-standing note placed on the canvas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique comment ID
    pub id: Uuid,
    /// Comment text
    pub text: String,
    /// Position in the graph UI
    pub position: [f32; 2],
}

impl Comment {
    /// Create a new comment
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            position: [0.0, 0.0],
        }
    }
}

/// Object stored in a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DocumentObject {
    /// Graph node
    Node(Node),
    /// Canvas comment
    Comment(Comment),
}

impl DocumentObject {
    /// Whether this object is a graph node
    pub fn is_node(&self) -> bool {
        matches!(self, Self::Node(_))
    }

    /// Borrow the node, if this object is one
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            Self::Comment(_) => None,
        }
    }

    /// Mutably borrow the node, if this object is one
    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Self::Node(node) => Some(node),
            Self::Comment(_) => None,
        }
    }
}

/// An animation controller document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document name
    pub name: String,
    /// Format version
    pub version: u32,
    /// Root objects in authoring order
    objects: IndexMap<Uuid, DocumentObject>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
}

impl Document {
    /// Current document format version
    pub const FORMAT_VERSION: u32 = 1;

    /// Create a new empty document
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Self::FORMAT_VERSION,
            objects: IndexMap::new(),
            connections: IndexMap::new(),
        }
    }

    /// Add a node to the document
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.objects.insert(id.0, DocumentObject::Node(node));
        id
    }

    /// Add a comment to the document
    pub fn add_comment(&mut self, comment: Comment) -> Uuid {
        let id = comment.id;
        self.objects.insert(id, DocumentObject::Comment(comment));
        id
    }

    /// Remove a node and its connections
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.objects.get(&node_id.0).and_then(DocumentObject::as_node)?;
        self.connections.retain(|_, c| !c.involves_node(node_id));
        // shift_remove keeps the authoring order of the remaining objects
        match self.objects.shift_remove(&node_id.0) {
            Some(DocumentObject::Node(node)) => Some(node),
            _ => None,
        }
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.objects.get(&node_id.0).and_then(DocumentObject::as_node)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.objects.get_mut(&node_id.0).and_then(DocumentObject::as_node_mut)
    }

    /// All root objects in authoring order
    pub fn objects(&self) -> impl Iterator<Item = &DocumentObject> {
        self.objects.values()
    }

    /// All nodes in authoring order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.objects.values().filter_map(DocumentObject::as_node)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Connect an output pin to an input pin.
    ///
    /// The pins may be given in either order; the stored connection always
    /// runs from the output to the input.
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_pin: PinId,
        to_node: NodeId,
        to_pin: PinId,
    ) -> Result<ConnectionId, ConnectionError> {
        let source_pin = self.find_pin(from_node, from_pin)?;
        let target_pin = self.find_pin(to_node, to_pin)?;

        let cardinality = can_connect(source_pin, target_pin)?;

        let (from_node, from_pin, to_node, to_pin) = if source_pin.direction == PinDirection::Output {
            (from_node, from_pin, to_node, to_pin)
        } else {
            (to_node, to_pin, from_node, from_pin)
        };

        if self
            .connections
            .values()
            .any(|c| c.from_pin == from_pin && c.to_pin == to_pin)
        {
            return Err(ConnectionError::AlreadyConnected);
        }

        if !cardinality.input_accepts_many() && self.connections_to(to_pin).next().is_some() {
            return Err(ConnectionError::PinAlreadyConnected(to_pin));
        }

        if !cardinality.output_accepts_many() && self.connections_from(from_pin).next().is_some() {
            return Err(ConnectionError::PinAlreadyConnected(from_pin));
        }

        let connection = Connection::new(from_node, from_pin, to_node, to_pin);
        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Connect two pins addressed by name
    pub fn connect_named(
        &mut self,
        from_node: NodeId,
        from_pin: &str,
        to_node: NodeId,
        to_pin: &str,
    ) -> Result<ConnectionId, ConnectionError> {
        let source = self.node(from_node).ok_or(ConnectionError::NodeNotFound(from_node))?;
        let from_pin = source
            .output_named(from_pin)
            .ok_or_else(|| ConnectionError::PinNameNotFound(from_pin.to_string()))?
            .id;
        let target = self.node(to_node).ok_or(ConnectionError::NodeNotFound(to_node))?;
        let to_pin = target
            .input_named(to_pin)
            .ok_or_else(|| ConnectionError::PinNameNotFound(to_pin.to_string()))?
            .id;
        self.connect(from_node, from_pin, to_node, to_pin)
    }

    fn find_pin(&self, node_id: NodeId, pin_id: PinId) -> Result<&Pin, ConnectionError> {
        self.node(node_id)
            .ok_or(ConnectionError::NodeNotFound(node_id))?
            .pin(&pin_id)
            .ok_or(ConnectionError::PinNotFound(pin_id))
    }

    /// Remove a connection
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        self.connections.shift_remove(&connection_id)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get connections from a specific pin
    pub fn connections_from(&self, pin_id: PinId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.from_pin == pin_id)
    }

    /// Get connections to a specific pin
    pub fn connections_to(&self, pin_id: PinId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.to_pin == pin_id)
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Fingerprint of the connection topology.
    ///
    /// Property values are hashed by the asset pipeline; this covers edits
    /// that only rewire pins so those still trigger a new transform.
    pub fn connection_hash(&self) -> String {
        let mut hasher = Sha256::new();
        for node in self.nodes() {
            for pin in &node.outputs {
                for connection in self.connections_from(pin.id) {
                    let Some(target_pin) = self
                        .node(connection.to_node)
                        .and_then(|n| n.pin(&connection.to_pin))
                    else {
                        continue;
                    };
                    hasher.update(node.id.0.as_bytes());
                    hasher.update(connection.to_node.0.as_bytes());
                    hasher.update(pin.name.as_bytes());
                    hasher.update(target_pin.name.as_bytes());
                }
            }
        }
        format!("{:x}", hasher.finalize())
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when creating a connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Pin not found
    #[error("Pin not found: {0:?}")]
    PinNotFound(PinId),

    /// No pin with this name on the node
    #[error("Pin not found: '{0}'")]
    PinNameNotFound(String),

    /// Pins cannot be linked
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Pin accepts no further connections
    #[error("Pin already connected: {0:?}")]
    PinAlreadyConnected(PinId),

    /// The same two pins are already linked
    #[error("Pins are already connected")]
    AlreadyConnected,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::create_animation_registry;
    use crate::pin::PinKind;

    fn sample_document() -> (Document, NodeId, NodeId, NodeId) {
        let registry = create_animation_registry();
        let mut doc = Document::new("Test");
        let clip = doc.add_node(registry.create_node("sample_clip").unwrap());
        let to_model = doc.add_node(registry.create_node("local_to_model_pose").unwrap());
        let output = doc.add_node(registry.create_node("model_pose_output").unwrap());
        (doc, clip, to_model, output)
    }

    #[test]
    fn test_connect_and_remove_node() {
        let (mut doc, clip, to_model, output) = sample_document();
        doc.connect_named(clip, "Pose", to_model, "LocalPose").unwrap();
        doc.connect_named(to_model, "ModelPose", output, "Pose").unwrap();
        assert_eq!(doc.connection_count(), 2);

        doc.remove_node(to_model).unwrap();
        assert_eq!(doc.connection_count(), 0);
        assert_eq!(doc.node_count(), 2);
        let order: Vec<_> = doc.nodes().map(|n| n.id).collect();
        assert_eq!(order, [clip, output]);
    }

    #[test]
    fn test_connect_reversed_pins_is_normalized() {
        let (mut doc, clip, to_model, _) = sample_document();
        let input = doc.node(to_model).unwrap().input_named("LocalPose").unwrap().id;
        let output = doc.node(clip).unwrap().output_named("Pose").unwrap().id;

        let id = doc.connect(to_model, input, clip, output).unwrap();
        let connection = doc.connection(id).unwrap();
        assert_eq!(connection.from_node, clip);
        assert_eq!(connection.to_pin, input);
    }

    #[test]
    fn test_single_input_rejects_second_connection() {
        let registry = create_animation_registry();
        let (mut doc, clip, to_model, _) = sample_document();
        let other = doc.add_node(registry.create_node("sample_clip").unwrap());

        doc.connect_named(clip, "Pose", to_model, "LocalPose").unwrap();
        let err = doc.connect_named(other, "Pose", to_model, "LocalPose").unwrap_err();
        assert!(matches!(err, ConnectionError::PinAlreadyConnected(_)));
    }

    #[test]
    fn test_multi_input_accepts_many() {
        let registry = create_animation_registry();
        let mut doc = Document::new("Mix");
        let mix = doc.add_node(registry.create_node("mix_local_poses").unwrap());
        for _ in 0..3 {
            let clip = doc.add_node(registry.create_node("sample_clip").unwrap());
            doc.connect_named(clip, "Pose", mix, "Poses").unwrap();
        }
        let poses = doc.node(mix).unwrap().input_named("Poses").unwrap().id;
        assert_eq!(doc.connections_to(poses).count(), 3);
    }

    #[test]
    fn test_duplicate_connection_rejected() {
        let registry = create_animation_registry();
        let mut doc = Document::new("Triggers");
        let trigger = doc.add_node(registry.create_node("controller_trigger").unwrap());
        let event = doc.add_node(registry.create_node("send_event").unwrap());
        doc.connect_named(trigger, "Triggered", event, "Active").unwrap();
        assert!(matches!(
            doc.connect_named(trigger, "Triggered", event, "Active"),
            Err(ConnectionError::AlreadyConnected)
        ));
    }

    #[test]
    fn test_validation_error_leaves_document_untouched() {
        let (mut doc, clip, _, output) = sample_document();
        let clip_pose = doc.node(clip).unwrap().output_named("Pose").unwrap().id;
        let output_pose = doc.node(output).unwrap().input_named("Pose").unwrap().id;

        let err = doc.connect(clip, clip_pose, output, output_pose).unwrap_err();
        assert!(matches!(
            err,
            ConnectionError::Invalid(ValidationError::DifferentDataTypes {
                from: PinKind::LocalPose,
                to: PinKind::ModelPose,
            })
        ));
        assert_eq!(doc.connection_count(), 0);
    }

    #[test]
    fn test_comments_are_not_nodes() {
        let (mut doc, ..) = sample_document();
        doc.add_comment(Comment::new("Locomotion"));
        assert_eq!(doc.objects().count(), 4);
        assert_eq!(doc.node_count(), 3);
    }

    #[test]
    fn test_connection_hash_tracks_rewiring() {
        let (mut doc, clip, to_model, output) = sample_document();
        let unconnected = doc.connection_hash();

        let id = doc.connect_named(clip, "Pose", to_model, "LocalPose").unwrap();
        let connected = doc.connection_hash();
        assert_ne!(unconnected, connected);

        doc.node_mut(output).unwrap().name = "Renamed".to_string();
        assert_eq!(doc.connection_hash(), connected);

        doc.disconnect(id);
        assert_eq!(doc.connection_hash(), unconnected);
    }

    #[test]
    fn test_ron_round_trip() {
        let (mut doc, clip, to_model, _) = sample_document();
        doc.connect_named(clip, "Pose", to_model, "LocalPose").unwrap();
        doc.add_comment(Comment::new("note"));

        let ron = doc.to_ron().unwrap();
        let loaded = Document::from_ron(&ron).unwrap();
        assert_eq!(loaded.version, Document::FORMAT_VERSION);
        assert_eq!(loaded.objects().count(), 4);
        assert_eq!(loaded.connection_hash(), doc.connection_hash());
    }
}
