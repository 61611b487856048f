extern crate euclid;
extern crate rust_xr_api;
#[macro_use]
extern crate log;
#[cfg(feature = "serde-serialization")]
#[macro_use] extern crate serde_derive;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod api;
mod xr_anchor;
mod xr_capabilities;
mod xr_frame;
mod xr_reference_space;
mod xr_scene_manager;
mod xr_session;
mod xr_system;
#[cfg(test)]
mod test_util;

pub use rust_xr_api::*;
#[cfg(any(test, feature = "mock"))]
pub use api::{MockCall, MockCallLog, MockServiceCreator};
pub use xr_anchor::{Anchor, AnchorId};
pub use xr_capabilities::{GraphicsApi, XrCapabilities, KHR_COMPOSITION_LAYER_DEPTH,
                          KHR_D3D11_ENABLE, KHR_OPENGL_ENABLE, KHR_OPENGL_ES_ENABLE,
                          KHR_VULKAN_ENABLE2, MSFT_FIRST_PERSON_OBSERVER,
                          MSFT_SCENE_UNDERSTANDING, MSFT_SECONDARY_VIEW_CONFIGURATION,
                          MSFT_SPATIAL_ANCHOR, MSFT_UNBOUNDED_REFERENCE_SPACE};
pub use xr_frame::{Frame, NextFrame};
pub use xr_reference_space::ReferenceSpace;
pub use xr_scene_manager::{SceneTable, SceneUnderstandingOptions, SceneUpdate};
pub use xr_session::{Session, SessionLifecycle};
pub use xr_system::{XrServicePtr, XrSystem, XrSystemConfig};
pub use rust_xr_api::mock::{MockXrControlMsg, MockXrInit};

// A panic on the render loop must not take every other handle down with it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
