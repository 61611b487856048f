#[cfg(feature = "utils")]
extern crate time;

#[cfg(feature = "utils")]
pub mod utils;

#[cfg(feature = "serde-serialization")]
#[macro_use]
extern crate serde_derive;

pub mod mock;
pub mod xr_device;
pub mod xr_error;
pub mod xr_event;
pub mod xr_future;
pub mod xr_input_source;
pub mod xr_native;
pub mod xr_pose;
pub mod xr_reference_space_type;
pub mod xr_scene;
pub mod xr_service;
pub mod xr_session_type;
pub mod xr_texture;
pub mod xr_view;

pub use xr_device::{FrameSubmission, FrameTiming, XrDevice};
pub use xr_error::{XrError, XrResult};
pub use xr_event::XrRuntimeEvent;
pub use xr_future::{XrFuture, XrPromise};
pub use xr_hit_test::{HitResult, Ray};
pub use xr_input_source::{ControllerState, Handedness, InputSource, InputSourceId};
pub use xr_native::{GraphicsDeviceHandle, NativeAnchorHandle, NativeSessionHandle,
                    NativeSpaceHandle, NativeTrackableHandle, TextureHandle, WindowHandle};
pub use xr_pose::{Pose, RigidTransform, SpaceLocation};
pub use xr_reference_space_type::ReferenceSpaceType;
pub use xr_scene::{DetectionBoundary, Frustum, Mesh, MeshId, Plane, PlaneId, SceneObject,
                   SceneObjectId, SceneObjectKind, SceneSnapshot};
pub use xr_service::{XrService, XrServiceCreator};
pub use xr_session_type::{SessionCreateInfo, SessionState, SessionType};
pub use xr_texture::{Size, SwapchainImage, SwapchainKind, TextureFormat};
pub use xr_view::{FieldOfView, LocatedView, View, ViewConfiguration, ViewKind,
                  DEFAULT_DEPTH_FAR_Z, DEFAULT_DEPTH_NEAR_Z};
