// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pin definitions for node inputs/outputs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinId(pub Uuid);

impl PinId {
    /// Create a new random pin ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PinId {
    fn default() -> Self {
        Self::new()
    }
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    /// Input pin
    Input,
    /// Output pin
    Output,
}

/// Kind of data that flows through a pin.
///
/// The declaration order is part of the compiled artifact layout: per-kind
/// tables are always written in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PinKind {
    /// Event pulse
    Trigger,
    /// Scalar value
    Number,
    /// Per-bone blend weights
    BoneWeights,
    /// Pose in local (parent relative) space
    LocalPose,
    /// Pose in model space
    ModelPose,
}

impl PinKind {
    /// Number of pin kinds
    pub const COUNT: usize = 5;

    /// All pin kinds in artifact order
    pub const ALL: [PinKind; Self::COUNT] = [
        Self::Trigger,
        Self::Number,
        Self::BoneWeights,
        Self::LocalPose,
        Self::ModelPose,
    ];

    /// Position of this kind in per-kind tables
    pub const fn index(self) -> usize {
        match self {
            Self::Trigger => 0,
            Self::Number => 1,
            Self::BoneWeights => 2,
            Self::LocalPose => 3,
            Self::ModelPose => 4,
        }
    }

    /// Get the color for this pin kind (for UI)
    pub fn color(self) -> [u8; 3] {
        match self {
            Self::Trigger => [0xa1, 0x12, 0x6c],
            Self::Number => [107, 142, 35],
            Self::BoneWeights => [32, 178, 170],
            Self::LocalPose => [70, 130, 180],
            Self::ModelPose => [0x52, 0x46, 0xa0],
        }
    }
}

/// Static description of a pin on a runtime node type.
///
/// Authored pins are created from these, in declaration order, so the
/// position of a pin among its node's inputs (or outputs) is also the
/// position of the matching runtime pin field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinDescriptor {
    /// Pin name, unique per node and direction
    pub name: &'static str,
    /// Pin direction
    pub direction: PinDirection,
    /// Data kind
    pub kind: PinKind,
    /// Whether many connections merge into this input
    pub multi_input: bool,
}

impl PinDescriptor {
    /// Describe an input pin
    pub const fn input(name: &'static str, kind: PinKind) -> Self {
        Self {
            name,
            direction: PinDirection::Input,
            kind,
            multi_input: false,
        }
    }

    /// Describe a local pose input that accepts any number of connections
    pub const fn multi_input(name: &'static str) -> Self {
        Self {
            name,
            direction: PinDirection::Input,
            kind: PinKind::LocalPose,
            multi_input: true,
        }
    }

    /// Describe an output pin
    pub const fn output(name: &'static str, kind: PinKind) -> Self {
        Self {
            name,
            direction: PinDirection::Output,
            kind,
            multi_input: false,
        }
    }
}

/// A pin on an authored node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    /// Unique pin ID
    pub id: PinId,
    /// Pin name
    pub name: String,
    /// Pin direction
    pub direction: PinDirection,
    /// Data kind, fixed at creation
    kind: PinKind,
    /// Whether multiple incoming connections merge into one slot
    pub multi_input: bool,
}

impl Pin {
    /// Create a new input pin
    pub fn input(name: impl Into<String>, kind: PinKind) -> Self {
        Self {
            id: PinId::new(),
            name: name.into(),
            direction: PinDirection::Input,
            kind,
            multi_input: false,
        }
    }

    /// Create a new output pin
    pub fn output(name: impl Into<String>, kind: PinKind) -> Self {
        Self {
            id: PinId::new(),
            name: name.into(),
            direction: PinDirection::Output,
            kind,
            multi_input: false,
        }
    }

    /// Create a local pose input that accepts many connections
    pub fn multi_input(name: impl Into<String>) -> Self {
        Self {
            multi_input: true,
            ..Self::input(name, PinKind::LocalPose)
        }
    }

    /// Instantiate a pin from its static description
    pub fn from_descriptor(descriptor: &PinDescriptor) -> Self {
        let mut pin = match descriptor.direction {
            PinDirection::Input => Self::input(descriptor.name, descriptor.kind),
            PinDirection::Output => Self::output(descriptor.name, descriptor.kind),
        };
        pin.multi_input = descriptor.multi_input && descriptor.direction == PinDirection::Input;
        pin
    }

    /// Data kind of this pin
    pub fn kind(&self) -> PinKind {
        self.kind
    }

    /// Color used to draw this pin
    pub fn color(&self) -> [u8; 3] {
        self.kind.color()
    }

    /// Whether this is an input pin
    pub fn is_input(&self) -> bool {
        self.direction == PinDirection::Input
    }
}
