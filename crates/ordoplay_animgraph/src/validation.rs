// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection validation between pins.
//!
//! The editing framework asks [`can_connect`] about every proposed edge
//! before it is committed to the document.

use crate::pin::{Pin, PinDirection, PinKind};

/// How many connections each side of an accepted edge may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectCardinality {
    /// The pins can never be connected
    Never,
    /// One connection per output and per input
    OneToOne,
    /// Outputs fan out freely, inputs take a single connection
    ManyToOne,
    /// No limit on either side
    ManyToMany,
}

impl ConnectCardinality {
    /// Whether the output side may carry more than one connection
    pub fn output_accepts_many(self) -> bool {
        matches!(self, Self::ManyToOne | Self::ManyToMany)
    }

    /// Whether the input side may carry more than one connection
    pub fn input_accepts_many(self) -> bool {
        matches!(self, Self::ManyToMany)
    }
}

/// Reason a connection between two pins was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Pins carry different data kinds
    #[error("Can't connect pins of different data types ({from:?} and {to:?})")]
    DifferentDataTypes {
        /// Kind of the source pin
        from: PinKind,
        /// Kind of the target pin
        to: PinKind,
    },

    /// Both pins are inputs or both are outputs
    #[error("Can only connect input pins with output pins")]
    SameDirection(PinDirection),
}

/// Decide whether `source` may be linked to `target`.
///
/// The pins may be passed in either order; the multi-input flag is read from
/// whichever of the two is the input.
pub fn can_connect(source: &Pin, target: &Pin) -> Result<ConnectCardinality, ValidationError> {
    if source.kind() != target.kind() {
        return Err(ValidationError::DifferentDataTypes {
            from: source.kind(),
            to: target.kind(),
        });
    }

    if source.direction == target.direction {
        return Err(ValidationError::SameDirection(source.direction));
    }

    let input = if target.is_input() { target } else { source };

    let cardinality = match source.kind() {
        PinKind::Trigger => ConnectCardinality::ManyToMany,
        PinKind::Number | PinKind::BoneWeights | PinKind::ModelPose => ConnectCardinality::ManyToOne,
        PinKind::LocalPose if input.multi_input => ConnectCardinality::ManyToMany,
        PinKind::LocalPose => ConnectCardinality::ManyToOne,
    };

    Ok(cardinality)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_different_kinds() {
        let out = Pin::output("Value", PinKind::Number);
        let input = Pin::input("Weights", PinKind::BoneWeights);
        assert_eq!(
            can_connect(&out, &input),
            Err(ValidationError::DifferentDataTypes {
                from: PinKind::Number,
                to: PinKind::BoneWeights,
            })
        );
    }

    #[test]
    fn test_rejects_two_trigger_outputs() {
        let a = Pin::output("Triggered", PinKind::Trigger);
        let b = Pin::output("OnFinished", PinKind::Trigger);
        assert_eq!(
            can_connect(&a, &b),
            Err(ValidationError::SameDirection(PinDirection::Output))
        );
    }

    #[test]
    fn test_kind_mismatch_is_checked_first() {
        let a = Pin::input("Active", PinKind::Trigger);
        let b = Pin::input("Speed", PinKind::Number);
        assert!(matches!(
            can_connect(&a, &b),
            Err(ValidationError::DifferentDataTypes { .. })
        ));
    }

    #[test]
    fn test_cardinality_table() {
        let cases = [
            (PinKind::Trigger, ConnectCardinality::ManyToMany),
            (PinKind::Number, ConnectCardinality::ManyToOne),
            (PinKind::BoneWeights, ConnectCardinality::ManyToOne),
            (PinKind::LocalPose, ConnectCardinality::ManyToOne),
            (PinKind::ModelPose, ConnectCardinality::ManyToOne),
        ];
        for (kind, expected) in cases {
            let out = Pin::output("Out", kind);
            let input = Pin::input("In", kind);
            assert_eq!(can_connect(&out, &input), Ok(expected), "{kind:?}");
        }
    }

    #[test]
    fn test_multi_input_local_pose() {
        let out = Pin::output("Pose", PinKind::LocalPose);
        let input = Pin::multi_input("Poses");
        assert_eq!(can_connect(&out, &input), Ok(ConnectCardinality::ManyToMany));
        // argument order does not hide the flag
        assert_eq!(can_connect(&input, &out), Ok(ConnectCardinality::ManyToMany));
    }

    #[test]
    fn test_accepted_connections_have_matching_kinds_and_opposite_directions() {
        let pins: Vec<Pin> = PinKind::ALL
            .iter()
            .flat_map(|&kind| [Pin::input("In", kind), Pin::output("Out", kind)])
            .chain([Pin::multi_input("Poses")])
            .collect();

        for a in &pins {
            for b in &pins {
                if can_connect(a, b).is_ok() {
                    assert_eq!(a.kind(), b.kind());
                    assert_ne!(a.direction, b.direction);
                }
            }
        }
    }
}
