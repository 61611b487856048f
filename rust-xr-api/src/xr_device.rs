use crate::{
    ControllerState, DetectionBoundary, HitResult, LocatedView, NativeAnchorHandle,
    NativeSessionHandle, NativeSpaceHandle, Pose, Ray, ReferenceSpaceType, SceneSnapshot,
    SwapchainImage, SwapchainKind, TextureHandle, View, ViewConfiguration, XrError,
    XrResult, XrRuntimeEvent,
};

/// Returned by `XrDevice::wait_frame`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    // Time, in seconds, at which the frame is expected to be displayed.
    pub predicted_display_time: f64,
    // false when the runtime wants the frame submitted without content.
    pub should_render: bool,
}

/// What gets handed back to the compositor when a frame ends.
#[derive(Debug, Clone, Copy)]
pub struct FrameSubmission<'a> {
    pub display_time: f64,
    pub space: NativeSpaceHandle,
    pub views: &'a [View],
}

/// A session on a device runtime. Every space and time argument refers to
/// objects created by this session.
///
/// Methods for optional capabilities have default implementations that
/// report the capability as missing; the core only calls them when the
/// matching extension has been enabled.
pub trait XrDevice: Send {
    fn native_handle(&self) -> NativeSessionHandle;

    /// Pops the next pending runtime event.
    fn poll_event(&mut self) -> Option<XrRuntimeEvent>;

    fn begin_session(&mut self) -> XrResult<()>;

    fn end_session(&mut self) -> XrResult<()>;

    /// Asks the runtime to move the session to `Stopping`.
    fn request_exit_session(&mut self) -> XrResult<()>;

    fn view_configurations(&self) -> Vec<ViewConfiguration>;

    /// Blocks until the next frame should be rendered.
    fn wait_frame(&mut self) -> XrResult<FrameTiming>;

    fn begin_frame(&mut self) -> XrResult<()>;

    fn end_frame(&mut self, submission: &FrameSubmission) -> XrResult<()>;

    fn acquire_swapchain_image(&mut self, view_index: usize, kind: SwapchainKind) -> XrResult<SwapchainImage>;

    /// Swapchain images the runtime no longer uses, in retirement order.
    fn retired_textures(&mut self) -> Vec<TextureHandle> {
        Vec::new()
    }

    fn create_reference_space(&mut self, space_type: ReferenceSpaceType, pose_in_space: &Pose) -> XrResult<NativeSpaceHandle>;

    /// Pose of the space relative to the tracking origin, or `None` when the
    /// runtime cannot locate it at `display_time`.
    fn locate_space(&self, space: NativeSpaceHandle, display_time: f64) -> Option<Pose>;

    fn destroy_space(&mut self, space: NativeSpaceHandle);

    fn locate_views(&self, space: NativeSpaceHandle, display_time: f64) -> XrResult<Vec<LocatedView>>;

    fn locate_controllers(&self, space: NativeSpaceHandle, display_time: f64) -> Vec<ControllerState>;

    fn hit_test(&self, _ray: &Ray, _space: NativeSpaceHandle, _display_time: f64) -> Vec<HitResult> {
        Vec::new()
    }

    fn create_spatial_anchor(&mut self, _pose: &Pose, _space: NativeSpaceHandle, _display_time: f64) -> XrResult<NativeAnchorHandle> {
        Err(XrError::rejected("create_spatial_anchor", "spatial anchors are not supported"))
    }

    /// Pose of the anchor in `space`, or `None` once the runtime has lost it.
    fn locate_anchor(&self, _anchor: NativeAnchorHandle, _space: NativeSpaceHandle, _display_time: f64) -> Option<Pose> {
        None
    }

    fn destroy_spatial_anchor(&mut self, _anchor: NativeAnchorHandle) {}

    fn compute_scene(&mut self, _boundary: &DetectionBoundary, _space: NativeSpaceHandle, _display_time: f64) -> XrResult<SceneSnapshot> {
        Err(XrError::rejected("compute_scene", "scene understanding is not supported"))
    }

    /// Releases the runtime session. Called exactly once, last.
    fn destroy_session(&mut self);
}
