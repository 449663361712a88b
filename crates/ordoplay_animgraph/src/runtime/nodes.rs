// SPDX-License-Identifier: MIT OR Apache-2.0
//! Concrete runtime node types.
//!
//! Every type lists its pins and properties in static tables. Pin fields are
//! hidden properties: the compiler writes them, users never author them.

use super::{AnimNode, InputPin, OutputPin};
use crate::pin::{PinDescriptor, PinKind};
use crate::property::{FromProperty, PropertyDescriptor, PropertyError, PropertyType, PropertyValue};
use serde::{Deserialize, Serialize};

/// Generates positional pin accessors from the pin field lists.
macro_rules! pin_fields {
    (inputs: [$($input:ident),*], outputs: [$($output:ident),*]) => {
        fn input_pin(&self, index: usize) -> Option<&InputPin> {
            [$(&self.$input),*].into_iter().nth(index)
        }

        fn input_pin_mut(&mut self, index: usize) -> Option<&mut InputPin> {
            [$(&mut self.$input),*].into_iter().nth(index)
        }

        fn output_pin(&self, index: usize) -> Option<&OutputPin> {
            [$(&self.$output),*].into_iter().nth(index)
        }

        fn output_pin_mut(&mut self, index: usize) -> Option<&mut OutputPin> {
            [$(&mut self.$output),*].into_iter().nth(index)
        }
    };
}

fn reject_hidden_or_unknown(properties: &[PropertyDescriptor], name: &str) -> PropertyError {
    if properties.iter().any(|p| p.name == name && p.hidden) {
        PropertyError::Hidden(name.to_string())
    } else {
        PropertyError::Unknown(name.to_string())
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Plays back an animation clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleClipNode {
    /// Clip asset reference
    pub clip: String,
    /// Restart when the clip ends
    pub looping: bool,
    /// Speed used when the Speed pin is unconnected
    pub playback_speed: f32,
    /// Whether root motion is extracted
    pub apply_root_motion: bool,
    /// Starts playback while triggered
    pub active: InputPin,
    /// Playback speed multiplier
    pub speed: InputPin,
    /// Restricts the sampled bones
    pub weights: InputPin,
    /// Sampled pose
    pub pose: OutputPin,
    /// Fires when a non-looping clip finishes
    pub on_finished: OutputPin,
}

impl SampleClipNode {
    const PINS: &'static [PinDescriptor] = &[
        PinDescriptor::input("Active", PinKind::Trigger),
        PinDescriptor::input("Speed", PinKind::Number),
        PinDescriptor::input("Weights", PinKind::BoneWeights),
        PinDescriptor::output("Pose", PinKind::LocalPose),
        PinDescriptor::output("OnFinished", PinKind::Trigger),
    ];

    const PROPERTIES: &'static [PropertyDescriptor] = &[
        PropertyDescriptor::new("Clip", PropertyType::String),
        PropertyDescriptor::new("Loop", PropertyType::Bool),
        PropertyDescriptor::new("PlaybackSpeed", PropertyType::Float),
        PropertyDescriptor::new("ApplyRootMotion", PropertyType::Bool),
        PropertyDescriptor::pin("Active"),
        PropertyDescriptor::pin("Speed"),
        PropertyDescriptor::pin("Weights"),
        PropertyDescriptor::pin("Pose"),
        PropertyDescriptor::pin("OnFinished"),
    ];
}

impl Default for SampleClipNode {
    fn default() -> Self {
        Self {
            clip: String::new(),
            looping: true,
            playback_speed: 1.0,
            apply_root_motion: false,
            active: InputPin::default(),
            speed: InputPin::default(),
            weights: InputPin::default(),
            pose: OutputPin::default(),
            on_finished: OutputPin::default(),
        }
    }
}

impl AnimNode for SampleClipNode {
    fn type_name(&self) -> &'static str {
        "sample_clip"
    }

    fn pins(&self) -> &'static [PinDescriptor] {
        Self::PINS
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        Self::PROPERTIES
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "Clip" => Some(self.clip.clone().into()),
            "Loop" => Some(self.looping.into()),
            "PlaybackSpeed" => Some(self.playback_speed.into()),
            "ApplyRootMotion" => Some(self.apply_root_motion.into()),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match name {
            "Clip" => self.clip = FromProperty::from_property(name, value)?,
            "Loop" => self.looping = FromProperty::from_property(name, value)?,
            "PlaybackSpeed" => self.playback_speed = FromProperty::from_property(name, value)?,
            "ApplyRootMotion" => self.apply_root_motion = FromProperty::from_property(name, value)?,
            _ => return Err(reject_hidden_or_unknown(Self::PROPERTIES, name)),
        }
        Ok(())
    }

    pin_fields!(inputs: [active, speed, weights], outputs: [pose, on_finished]);
}

/// Exposes a numeric controller parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerInputNumberNode {
    /// Parameter name set by gameplay code
    pub parameter: String,
    /// Value until gameplay code writes the parameter
    pub default_value: f32,
    /// Current parameter value
    pub value: OutputPin,
}

impl ControllerInputNumberNode {
    const PINS: &'static [PinDescriptor] = &[PinDescriptor::output("Value", PinKind::Number)];

    const PROPERTIES: &'static [PropertyDescriptor] = &[
        PropertyDescriptor::new("Parameter", PropertyType::String),
        PropertyDescriptor::new("DefaultValue", PropertyType::Float),
        PropertyDescriptor::pin("Value"),
    ];
}

impl AnimNode for ControllerInputNumberNode {
    fn type_name(&self) -> &'static str {
        "controller_number"
    }

    fn pins(&self) -> &'static [PinDescriptor] {
        Self::PINS
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        Self::PROPERTIES
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "Parameter" => Some(self.parameter.clone().into()),
            "DefaultValue" => Some(self.default_value.into()),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match name {
            "Parameter" => self.parameter = FromProperty::from_property(name, value)?,
            "DefaultValue" => self.default_value = FromProperty::from_property(name, value)?,
            _ => return Err(reject_hidden_or_unknown(Self::PROPERTIES, name)),
        }
        Ok(())
    }

    pin_fields!(inputs: [], outputs: [value]);
}

/// Exposes a trigger controller parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerInputTriggerNode {
    /// Parameter name set by gameplay code
    pub parameter: String,
    /// Fires while the parameter is set
    pub triggered: OutputPin,
}

impl ControllerInputTriggerNode {
    const PINS: &'static [PinDescriptor] = &[PinDescriptor::output("Triggered", PinKind::Trigger)];

    const PROPERTIES: &'static [PropertyDescriptor] = &[
        PropertyDescriptor::new("Parameter", PropertyType::String),
        PropertyDescriptor::pin("Triggered"),
    ];
}

impl AnimNode for ControllerInputTriggerNode {
    fn type_name(&self) -> &'static str {
        "controller_trigger"
    }

    fn pins(&self) -> &'static [PinDescriptor] {
        Self::PINS
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        Self::PROPERTIES
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "Parameter" => Some(self.parameter.clone().into()),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match name {
            "Parameter" => self.parameter = FromProperty::from_property(name, value)?,
            _ => return Err(reject_hidden_or_unknown(Self::PROPERTIES, name)),
        }
        Ok(())
    }

    pin_fields!(inputs: [], outputs: [triggered]);
}

/// Produces per-bone weights for a set of root bones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneWeightsNode {
    /// Weight applied to every bone below the roots
    pub weight: f32,
    /// Bones whose hierarchies receive the weight
    pub root_bones: Vec<String>,
    /// Resulting weights
    pub weights: OutputPin,
}

impl BoneWeightsNode {
    const PINS: &'static [PinDescriptor] = &[PinDescriptor::output("Weights", PinKind::BoneWeights)];

    const PROPERTIES: &'static [PropertyDescriptor] = &[
        PropertyDescriptor::new("Weight", PropertyType::Float),
        PropertyDescriptor::new("RootBones", PropertyType::StringList),
        PropertyDescriptor::pin("Weights"),
    ];
}

impl Default for BoneWeightsNode {
    fn default() -> Self {
        Self {
            weight: 1.0,
            root_bones: Vec::new(),
            weights: OutputPin::default(),
        }
    }
}

impl AnimNode for BoneWeightsNode {
    fn type_name(&self) -> &'static str {
        "bone_weights"
    }

    fn pins(&self) -> &'static [PinDescriptor] {
        Self::PINS
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        Self::PROPERTIES
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "Weight" => Some(self.weight.into()),
            "RootBones" => Some(self.root_bones.clone().into()),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match name {
            "Weight" => {
                let weight: f32 = FromProperty::from_property(name, value)?;
                if !(0.0..=1.0).contains(&weight) {
                    return Err(PropertyError::InvalidValue {
                        name: name.to_string(),
                        reason: format!("{weight} is outside 0..=1"),
                    });
                }
                self.weight = weight;
            }
            "RootBones" => self.root_bones = FromProperty::from_property(name, value)?,
            _ => return Err(reject_hidden_or_unknown(Self::PROPERTIES, name)),
        }
        Ok(())
    }

    pin_fields!(inputs: [], outputs: [weights]);
}

// ============================================================================
// Pose operations
// ============================================================================

/// Interpolates between two local poses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendLocalPosesNode {
    /// Clamp the lerp factor to 0..=1
    pub clamp_lerp: bool,
    /// First pose
    pub pose_a: InputPin,
    /// Second pose
    pub pose_b: InputPin,
    /// Interpolation factor
    pub lerp: InputPin,
    /// Blended pose
    pub pose: OutputPin,
}

impl BlendLocalPosesNode {
    const PINS: &'static [PinDescriptor] = &[
        PinDescriptor::input("PoseA", PinKind::LocalPose),
        PinDescriptor::input("PoseB", PinKind::LocalPose),
        PinDescriptor::input("Lerp", PinKind::Number),
        PinDescriptor::output("Pose", PinKind::LocalPose),
    ];

    const PROPERTIES: &'static [PropertyDescriptor] = &[
        PropertyDescriptor::new("ClampLerp", PropertyType::Bool),
        PropertyDescriptor::pin("PoseA"),
        PropertyDescriptor::pin("PoseB"),
        PropertyDescriptor::pin("Lerp"),
        PropertyDescriptor::pin("Pose"),
    ];
}

impl Default for BlendLocalPosesNode {
    fn default() -> Self {
        Self {
            clamp_lerp: true,
            pose_a: InputPin::default(),
            pose_b: InputPin::default(),
            lerp: InputPin::default(),
            pose: OutputPin::default(),
        }
    }
}

impl AnimNode for BlendLocalPosesNode {
    fn type_name(&self) -> &'static str {
        "blend_local_poses"
    }

    fn pins(&self) -> &'static [PinDescriptor] {
        Self::PINS
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        Self::PROPERTIES
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "ClampLerp" => Some(self.clamp_lerp.into()),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match name {
            "ClampLerp" => self.clamp_lerp = FromProperty::from_property(name, value)?,
            _ => return Err(reject_hidden_or_unknown(Self::PROPERTIES, name)),
        }
        Ok(())
    }

    pin_fields!(inputs: [pose_a, pose_b, lerp], outputs: [pose]);
}

/// Merges any number of weighted local poses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixLocalPosesNode {
    /// Normalize the accumulated weights
    pub normalize: bool,
    /// Incoming poses, all merged into one slot
    pub poses: InputPin,
    /// Mixed pose
    pub pose: OutputPin,
}

impl MixLocalPosesNode {
    const PINS: &'static [PinDescriptor] = &[
        PinDescriptor::multi_input("Poses"),
        PinDescriptor::output("Pose", PinKind::LocalPose),
    ];

    const PROPERTIES: &'static [PropertyDescriptor] = &[
        PropertyDescriptor::new("Normalize", PropertyType::Bool),
        PropertyDescriptor::pin("Poses"),
        PropertyDescriptor::pin("Pose"),
    ];
}

impl Default for MixLocalPosesNode {
    fn default() -> Self {
        Self {
            normalize: true,
            poses: InputPin::default(),
            pose: OutputPin::default(),
        }
    }
}

impl AnimNode for MixLocalPosesNode {
    fn type_name(&self) -> &'static str {
        "mix_local_poses"
    }

    fn pins(&self) -> &'static [PinDescriptor] {
        Self::PINS
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        Self::PROPERTIES
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "Normalize" => Some(self.normalize.into()),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match name {
            "Normalize" => self.normalize = FromProperty::from_property(name, value)?,
            _ => return Err(reject_hidden_or_unknown(Self::PROPERTIES, name)),
        }
        Ok(())
    }

    pin_fields!(inputs: [poses], outputs: [pose]);
}

/// Converts a local pose into model space
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalToModelPoseNode {
    /// Local pose
    pub local_pose: InputPin,
    /// Model space pose
    pub model_pose: OutputPin,
}

impl LocalToModelPoseNode {
    const PINS: &'static [PinDescriptor] = &[
        PinDescriptor::input("LocalPose", PinKind::LocalPose),
        PinDescriptor::output("ModelPose", PinKind::ModelPose),
    ];

    const PROPERTIES: &'static [PropertyDescriptor] = &[
        PropertyDescriptor::pin("LocalPose"),
        PropertyDescriptor::pin("ModelPose"),
    ];
}

impl AnimNode for LocalToModelPoseNode {
    fn type_name(&self) -> &'static str {
        "local_to_model_pose"
    }

    fn pins(&self) -> &'static [PinDescriptor] {
        Self::PINS
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        Self::PROPERTIES
    }

    fn property(&self, _name: &str) -> Option<PropertyValue> {
        None
    }

    fn set_property(&mut self, name: &str, _value: PropertyValue) -> Result<(), PropertyError> {
        Err(reject_hidden_or_unknown(Self::PROPERTIES, name))
    }

    pin_fields!(inputs: [local_pose], outputs: [model_pose]);
}

// ============================================================================
// Logic
// ============================================================================

/// Comparison operator used by [`CompareNumberNode`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    /// `==`
    #[default]
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
}

impl Comparison {
    /// Name used in authored documents
    pub fn name(self) -> &'static str {
        match self {
            Self::Equal => "Equal",
            Self::NotEqual => "NotEqual",
            Self::Less => "Less",
            Self::LessEqual => "LessEqual",
            Self::Greater => "Greater",
            Self::GreaterEqual => "GreaterEqual",
        }
    }

    /// Parse an authored name
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::Equal,
            Self::NotEqual,
            Self::Less,
            Self::LessEqual,
            Self::Greater,
            Self::GreaterEqual,
        ]
        .into_iter()
        .find(|c| c.name() == name)
    }
}

/// Compares a number against a reference value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompareNumberNode {
    /// Operator
    pub comparison: Comparison,
    /// Right-hand side of the comparison
    pub reference_value: f32,
    /// Left-hand side of the comparison
    pub number: InputPin,
    /// Fires while the comparison holds
    pub is_true: OutputPin,
    /// Fires while the comparison fails
    pub is_false: OutputPin,
}

impl CompareNumberNode {
    const PINS: &'static [PinDescriptor] = &[
        PinDescriptor::input("Number", PinKind::Number),
        PinDescriptor::output("IsTrue", PinKind::Trigger),
        PinDescriptor::output("IsFalse", PinKind::Trigger),
    ];

    const PROPERTIES: &'static [PropertyDescriptor] = &[
        PropertyDescriptor::new("Comparison", PropertyType::String),
        PropertyDescriptor::new("ReferenceValue", PropertyType::Float),
        PropertyDescriptor::pin("Number"),
        PropertyDescriptor::pin("IsTrue"),
        PropertyDescriptor::pin("IsFalse"),
    ];
}

impl AnimNode for CompareNumberNode {
    fn type_name(&self) -> &'static str {
        "compare_number"
    }

    fn pins(&self) -> &'static [PinDescriptor] {
        Self::PINS
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        Self::PROPERTIES
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "Comparison" => Some(self.comparison.name().into()),
            "ReferenceValue" => Some(self.reference_value.into()),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match name {
            "Comparison" => {
                let text: String = FromProperty::from_property(name, value)?;
                self.comparison = Comparison::from_name(&text).ok_or_else(|| PropertyError::InvalidValue {
                    name: name.to_string(),
                    reason: format!("unknown comparison '{text}'"),
                })?;
            }
            "ReferenceValue" => self.reference_value = FromProperty::from_property(name, value)?,
            _ => return Err(reject_hidden_or_unknown(Self::PROPERTIES, name)),
        }
        Ok(())
    }

    pin_fields!(inputs: [number], outputs: [is_true, is_false]);
}

// ============================================================================
// Sinks
// ============================================================================

/// Final model space pose of the controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPoseOutputNode {
    /// Pose applied to the skeleton
    pub pose: InputPin,
}

impl ModelPoseOutputNode {
    const PINS: &'static [PinDescriptor] = &[PinDescriptor::input("Pose", PinKind::ModelPose)];

    const PROPERTIES: &'static [PropertyDescriptor] = &[PropertyDescriptor::pin("Pose")];
}

impl AnimNode for ModelPoseOutputNode {
    fn type_name(&self) -> &'static str {
        "model_pose_output"
    }

    fn pins(&self) -> &'static [PinDescriptor] {
        Self::PINS
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        Self::PROPERTIES
    }

    fn property(&self, _name: &str) -> Option<PropertyValue> {
        None
    }

    fn set_property(&mut self, name: &str, _value: PropertyValue) -> Result<(), PropertyError> {
        Err(reject_hidden_or_unknown(Self::PROPERTIES, name))
    }

    pin_fields!(inputs: [pose], outputs: []);
}

/// Raises a named gameplay event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendEventNode {
    /// Event raised on the owning entity
    pub event_name: String,
    /// Sends the event when triggered
    pub active: InputPin,
}

impl SendEventNode {
    const PINS: &'static [PinDescriptor] = &[PinDescriptor::input("Active", PinKind::Trigger)];

    const PROPERTIES: &'static [PropertyDescriptor] = &[
        PropertyDescriptor::new("EventName", PropertyType::String),
        PropertyDescriptor::pin("Active"),
    ];
}

impl AnimNode for SendEventNode {
    fn type_name(&self) -> &'static str {
        "send_event"
    }

    fn pins(&self) -> &'static [PinDescriptor] {
        Self::PINS
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        Self::PROPERTIES
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "EventName" => Some(self.event_name.clone().into()),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match name {
            "EventName" => self.event_name = FromProperty::from_property(name, value)?,
            _ => return Err(reject_hidden_or_unknown(Self::PROPERTIES, name)),
        }
        Ok(())
    }

    pin_fields!(inputs: [active], outputs: []);
}
