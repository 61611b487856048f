use crate::Pose;

pub type InputSourceId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum Handedness {
    Left,
    Right,
}

/// A tracked controller as reported to the caller for one frame.
///
/// `id` is assigned the first time the controller is observed and is kept
/// for as long as it stays tracked. Ids are never reused.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct InputSource {
    pub id: InputSourceId,
    pub handedness: Handedness,
    pub tracked_this_frame: bool,
    pub grip_space: Pose,
    pub aim_space: Pose,
}

/// Raw controller state as the runtime reports it, before identity is
/// assigned by the frame producer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct ControllerState {
    pub handedness: Handedness,
    pub tracked: bool,
    pub grip: Pose,
    pub aim: Pose,
}
