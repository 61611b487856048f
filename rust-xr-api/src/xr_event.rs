use crate::{ReferenceSpaceType, SessionState};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum XrRuntimeEvent {
    // The runtime moved the session to a new state.
    SessionStateChanged(SessionState),

    // The runtime is about to go away; every session must be recreated.
    InstanceLossPending,

    // The origin of a reference space is about to change, for example
    // after the user recentered.
    ReferenceSpaceChangePending(ReferenceSpaceType),
}
