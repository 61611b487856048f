use crate::{
    ControllerState, FieldOfView, Handedness, NativeAnchorHandle, Pose, ReferenceSpaceType,
    SceneSnapshot, SessionType, Size,
};

/// Messages accepted by the mock runtime. They are applied, in order, the
/// next time the session polls the runtime for events.
#[derive(Debug, Clone)]
pub enum MockXrControlMsg {
    SetViewerPose(Pose),
    // When false, no reference space can be located and controllers report
    // themselves untracked.
    SetTracking(bool),
    SetController(ControllerState),
    RemoveController(Handedness),
    MoveAnchor(NativeAnchorHandle, Pose),
    LoseAnchor(NativeAnchorHandle),
    SetScene(SceneSnapshot),
    // Retires every swapchain image in use and allocates new ones.
    RecreateSwapchains,
    RejectSpaceCreation(bool),
    Recenter(ReferenceSpaceType),
    LoseSession,
    LoseInstance,
}

/// Static description of the simulated device.
#[derive(Debug, Clone)]
pub struct MockXrInit {
    pub extensions: Vec<String>,
    pub session_types: Vec<SessionType>,
    pub available: bool,
    // Simulated refresh period, in seconds.
    pub frame_period: f64,
    pub floor_height: f32,
    pub eye_separation: f32,
    pub render_size: Size,
    pub left_fov: FieldOfView,
    pub right_fov: FieldOfView,
    pub viewer_pose: Pose,
}

impl Default for MockXrInit {
    fn default() -> MockXrInit {
        // Simulates a virtual HTC Vive
        MockXrInit {
            extensions: [
                "XR_KHR_D3D11_enable",
                "XR_KHR_opengl_enable",
                "XR_KHR_composition_layer_depth",
                "XR_MSFT_unbounded_reference_space",
                "XR_MSFT_spatial_anchor",
                "XR_MSFT_secondary_view_configuration",
                "XR_MSFT_first_person_observer",
                "XR_MSFT_scene_understanding",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
            session_types: vec![SessionType::ImmersiveVr, SessionType::Inline],
            available: true,
            frame_period: 1.0 / 90.0,
            floor_height: 1.6,
            eye_separation: 0.07190,
            render_size: Size::new(1512, 1680),
            left_fov: FieldOfView::from_degrees(54.42263, 51.26948, 55.82093, 55.70780),
            right_fov: FieldOfView::from_degrees(51.30490, 54.37410, 55.89804, 55.61471),
            viewer_pose: Pose::IDENTITY,
        }
    }
}

impl MockXrInit {
    pub fn without_extension(mut self, name: &str) -> MockXrInit {
        self.extensions.retain(|ext| ext != name);
        self
    }
}
