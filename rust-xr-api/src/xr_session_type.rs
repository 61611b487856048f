use crate::{GraphicsDeviceHandle, WindowHandle, XrError};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum SessionType {
    ImmersiveVr,
    ImmersiveAr,
    Inline,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match *self {
            SessionType::ImmersiveVr => "immersive-vr",
            SessionType::ImmersiveAr => "immersive-ar",
            SessionType::Inline => "inline",
        }
    }
}

impl FromStr for SessionType {
    type Err = XrError;

    fn from_str(name: &str) -> Result<SessionType, XrError> {
        match name {
            "immersive-vr" => Ok(SessionType::ImmersiveVr),
            "immersive-ar" => Ok(SessionType::ImmersiveAr),
            "inline" => Ok(SessionType::Inline),
            _ => Err(XrError::InvalidSessionType(name.to_owned())),
        }
    }
}

/// Session states as driven by the device runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum SessionState {
    Idle,
    Ready,
    Synchronized,
    Visible,
    Focused,
    Stopping,
    LossPending,
    Exiting,
}

/// Parameters for creating a runtime session.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct SessionCreateInfo {
    pub session_type: SessionType,
    pub graphics_device: GraphicsDeviceHandle,
    pub window: WindowHandle,
}

impl Default for SessionCreateInfo {
    fn default() -> SessionCreateInfo {
        SessionCreateInfo {
            session_type: SessionType::ImmersiveVr,
            graphics_device: GraphicsDeviceHandle::NULL,
            window: WindowHandle::NULL,
        }
    }
}
