use super::service::MockReceiver;
use super::{MockCall, MockCallLog};
use crate::lock;
use crate::xr_capabilities::{
    KHR_COMPOSITION_LAYER_DEPTH, MSFT_FIRST_PERSON_OBSERVER, MSFT_SCENE_UNDERSTANDING,
    MSFT_SECONDARY_VIEW_CONFIGURATION, MSFT_SPATIAL_ANCHOR, MSFT_UNBOUNDED_REFERENCE_SPACE,
};
use euclid::default::Vector3D;
use rust_xr_api::mock::{MockXrControlMsg, MockXrInit};
use rust_xr_api::{
    ControllerState, DetectionBoundary, FrameSubmission, FrameTiming, Handedness, HitResult,
    LocatedView, NativeAnchorHandle, NativeSessionHandle, NativeSpaceHandle, NativeTrackableHandle,
    Pose, Ray, ReferenceSpaceType, SceneObject, SceneObjectId, SceneSnapshot, SessionState, Size,
    SwapchainImage, SwapchainKind, TextureFormat, TextureHandle, ViewConfiguration, ViewKind,
    XrDevice, XrError, XrResult, XrRuntimeEvent,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::mem;
use std::thread;
use std::time::Duration;

// Every hit test lands on the simulated floor.
const FLOOR_TRACKABLE: NativeTrackableHandle = NativeTrackableHandle(1);

struct MockSpace {
    space_type: ReferenceSpaceType,
    offset: Pose,
}

struct MockAnchor {
    // World pose, relative to the tracking origin.
    pose: Pose,
    lost: bool,
}

/// A simulated headset. The tracking origin is the `local` space origin,
/// at eye height; the floor lies `floor_height` meters below it.
pub struct MockXrDevice {
    session: NativeSessionHandle,
    init: MockXrInit,
    extensions: HashSet<String>,
    receiver: Option<MockReceiver>,
    events: VecDeque<XrRuntimeEvent>,
    next_handle: u64,
    display_time: f64,
    viewer: Pose,
    tracking: bool,
    reject_spaces: bool,
    spaces: HashMap<NativeSpaceHandle, MockSpace>,
    controllers: HashMap<Handedness, ControllerState>,
    anchors: HashMap<NativeAnchorHandle, MockAnchor>,
    scene: SceneSnapshot,
    swapchains: HashMap<(usize, SwapchainKind), TextureHandle>,
    retired: Vec<TextureHandle>,
    // Retired handles already returned to the app, reissued first.
    recycled: VecDeque<TextureHandle>,
    calls: Option<MockCallLog>,
    running: bool,
    frame_begun: bool,
}

impl MockXrDevice {
    pub fn new(
        init: MockXrInit,
        extensions: Vec<String>,
        receiver: Option<MockReceiver>,
        calls: Option<MockCallLog>,
    ) -> MockXrDevice {
        let mut device = MockXrDevice {
            session: NativeSessionHandle::NULL,
            viewer: init.viewer_pose,
            init,
            extensions: extensions.into_iter().collect(),
            receiver,
            events: VecDeque::new(),
            next_handle: 1,
            display_time: 0.0,
            tracking: true,
            reject_spaces: false,
            spaces: HashMap::new(),
            controllers: HashMap::new(),
            anchors: HashMap::new(),
            scene: SceneSnapshot::default(),
            swapchains: HashMap::new(),
            retired: Vec::new(),
            recycled: VecDeque::new(),
            calls,
            running: false,
            frame_begun: false,
        };
        device.session = NativeSessionHandle(device.alloc_handle());
        device.events.push_back(XrRuntimeEvent::SessionStateChanged(SessionState::Idle));
        device.events.push_back(XrRuntimeEvent::SessionStateChanged(SessionState::Ready));
        device
    }

    fn alloc_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn record(&self, call: MockCall) {
        if let Some(ref calls) = self.calls {
            lock(calls).push(call);
        }
    }

    fn has(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }

    fn observer_enabled(&self) -> bool {
        self.has(MSFT_SECONDARY_VIEW_CONFIGURATION) && self.has(MSFT_FIRST_PERSON_OBSERVER)
    }

    fn root_pose(&self, space_type: ReferenceSpaceType) -> Pose {
        match space_type {
            ReferenceSpaceType::Viewer => self.viewer,
            ReferenceSpaceType::Local | ReferenceSpaceType::Unbounded => Pose::IDENTITY,
            ReferenceSpaceType::LocalFloor | ReferenceSpaceType::BoundedFloor => {
                Pose::from_translation(0.0, -self.init.floor_height, 0.0)
            }
        }
    }

    // World pose of a space, regardless of tracking.
    fn space_pose(&self, space: NativeSpaceHandle) -> Option<Pose> {
        self.spaces
            .get(&space)
            .map(|space| self.root_pose(space.space_type).compose(&space.offset))
    }

    fn drain_messages(&mut self) {
        let receiver = match self.receiver {
            Some(ref receiver) => receiver.clone(),
            None => return,
        };
        let receiver = lock(&receiver);
        while let Ok(msg) = receiver.try_recv() {
            self.handle_msg(msg);
        }
    }

    fn handle_msg(&mut self, msg: MockXrControlMsg) {
        match msg {
            MockXrControlMsg::SetViewerPose(pose) => self.viewer = pose,
            MockXrControlMsg::SetTracking(tracking) => self.tracking = tracking,
            MockXrControlMsg::SetController(state) => {
                self.controllers.insert(state.handedness, state);
            }
            MockXrControlMsg::RemoveController(handedness) => {
                self.controllers.remove(&handedness);
            }
            MockXrControlMsg::MoveAnchor(handle, pose) => {
                if let Some(anchor) = self.anchors.get_mut(&handle) {
                    anchor.pose = pose;
                }
            }
            MockXrControlMsg::LoseAnchor(handle) => {
                if let Some(anchor) = self.anchors.get_mut(&handle) {
                    anchor.lost = true;
                }
            }
            MockXrControlMsg::SetScene(scene) => self.scene = scene,
            MockXrControlMsg::RecreateSwapchains => {
                let mut retired: Vec<_> = self.swapchains.drain().map(|(_, texture)| texture).collect();
                retired.sort();
                self.retired.extend(retired);
            }
            MockXrControlMsg::RejectSpaceCreation(reject) => self.reject_spaces = reject,
            MockXrControlMsg::Recenter(space_type) => {
                self.events.push_back(XrRuntimeEvent::ReferenceSpaceChangePending(space_type));
            }
            MockXrControlMsg::LoseSession => {
                self.events.push_back(XrRuntimeEvent::SessionStateChanged(SessionState::LossPending));
            }
            MockXrControlMsg::LoseInstance => {
                self.events.push_back(XrRuntimeEvent::InstanceLossPending);
            }
        }
    }

    fn in_boundary(&self, boundary: &DetectionBoundary, space_pose: &Pose, world: &Pose) -> bool {
        match *boundary {
            DetectionBoundary::Sphere { radius } => {
                let [x, y, z] = world.position;
                let [vx, vy, vz] = self.viewer.position;
                (Vector3D::new(x, y, z) - Vector3D::new(vx, vy, vz)).length() <= radius
            }
            DetectionBoundary::Box { pose, extents } => {
                let local = space_pose.compose(&pose).inverse().compose(world);
                local
                    .position
                    .iter()
                    .zip(extents.iter())
                    .all(|(coord, extent)| coord.abs() <= extent / 2.0)
            }
            // Frustum culling is not simulated.
            DetectionBoundary::Frustum(_) => true,
        }
    }
}

impl XrDevice for MockXrDevice {
    fn native_handle(&self) -> NativeSessionHandle {
        self.session
    }

    fn poll_event(&mut self) -> Option<XrRuntimeEvent> {
        self.drain_messages();
        self.events.pop_front()
    }

    fn begin_session(&mut self) -> XrResult<()> {
        if self.running {
            return Err(XrError::rejected("begin_session", "session already running"));
        }
        self.running = true;
        for state in &[SessionState::Synchronized, SessionState::Visible, SessionState::Focused] {
            self.events.push_back(XrRuntimeEvent::SessionStateChanged(*state));
        }
        Ok(())
    }

    fn end_session(&mut self) -> XrResult<()> {
        self.record(MockCall::EndSession);
        if !self.running {
            return Err(XrError::rejected("end_session", "session not running"));
        }
        self.running = false;
        self.frame_begun = false;
        self.events.push_back(XrRuntimeEvent::SessionStateChanged(SessionState::Idle));
        self.events.push_back(XrRuntimeEvent::SessionStateChanged(SessionState::Exiting));
        Ok(())
    }

    fn request_exit_session(&mut self) -> XrResult<()> {
        if !self.running {
            return Err(XrError::rejected("request_exit_session", "session not running"));
        }
        self.events.push_back(XrRuntimeEvent::SessionStateChanged(SessionState::Stopping));
        Ok(())
    }

    fn view_configurations(&self) -> Vec<ViewConfiguration> {
        let size = self.init.render_size;
        let mut configurations = vec![
            ViewConfiguration {
                kind: ViewKind::Primary,
                recommended_size: size,
            };
            2
        ];
        if self.observer_enabled() {
            configurations.push(ViewConfiguration {
                kind: ViewKind::FirstPersonObserver,
                recommended_size: Size::new(size.width / 2, size.height / 2),
            });
        }
        configurations
    }

    fn wait_frame(&mut self) -> XrResult<FrameTiming> {
        if !self.running {
            return Err(XrError::rejected("wait_frame", "session not running"));
        }
        // Simulate Vsync
        thread::sleep(Duration::from_millis(1));
        self.display_time += self.init.frame_period;
        Ok(FrameTiming {
            predicted_display_time: self.display_time,
            should_render: true,
        })
    }

    fn begin_frame(&mut self) -> XrResult<()> {
        if !self.running {
            return Err(XrError::rejected("begin_frame", "session not running"));
        }
        self.frame_begun = true;
        Ok(())
    }

    fn end_frame(&mut self, submission: &FrameSubmission) -> XrResult<()> {
        self.record(MockCall::EndFrame);
        if !self.frame_begun {
            return Err(XrError::rejected("end_frame", "no frame in progress"));
        }
        self.frame_begun = false;
        debug!("Mock frame {} ended with {} views", submission.display_time, submission.views.len());
        Ok(())
    }

    fn acquire_swapchain_image(&mut self, view_index: usize, kind: SwapchainKind) -> XrResult<SwapchainImage> {
        let configuration = match self.view_configurations().get(view_index) {
            Some(configuration) => *configuration,
            None => return Err(XrError::rejected("acquire_swapchain_image", format!("no view {}", view_index))),
        };
        let format = match kind {
            SwapchainKind::Color => TextureFormat::Rgba8Srgb,
            SwapchainKind::Depth if self.has(KHR_COMPOSITION_LAYER_DEPTH) => TextureFormat::D24S8,
            SwapchainKind::Depth => {
                return Err(XrError::rejected("acquire_swapchain_image", "depth composition not enabled"));
            }
        };
        let texture = match self.swapchains.get(&(view_index, kind)) {
            Some(texture) => *texture,
            None => {
                let texture = match self.recycled.pop_front() {
                    Some(texture) => texture,
                    None => TextureHandle(self.alloc_handle()),
                };
                self.swapchains.insert((view_index, kind), texture);
                texture
            }
        };
        Ok(SwapchainImage {
            texture,
            format,
            size: configuration.recommended_size,
        })
    }

    fn retired_textures(&mut self) -> Vec<TextureHandle> {
        let retired = mem::take(&mut self.retired);
        self.recycled.extend(retired.iter().copied());
        retired
    }

    fn create_reference_space(&mut self, space_type: ReferenceSpaceType, pose_in_space: &Pose) -> XrResult<NativeSpaceHandle> {
        if self.reject_spaces {
            return Err(XrError::rejected("create_reference_space", "space creation disabled"));
        }
        if space_type == ReferenceSpaceType::Unbounded && !self.has(MSFT_UNBOUNDED_REFERENCE_SPACE) {
            return Err(XrError::rejected("create_reference_space", "unbounded space not enabled"));
        }
        let handle = NativeSpaceHandle(self.alloc_handle());
        self.spaces.insert(
            handle,
            MockSpace {
                space_type,
                offset: *pose_in_space,
            },
        );
        Ok(handle)
    }

    fn locate_space(&self, space: NativeSpaceHandle, _display_time: f64) -> Option<Pose> {
        if !self.tracking {
            return None;
        }
        self.space_pose(space)
    }

    fn destroy_space(&mut self, space: NativeSpaceHandle) {
        self.record(MockCall::DestroySpace(space));
        self.spaces.remove(&space);
    }

    fn locate_views(&self, space: NativeSpaceHandle, _display_time: f64) -> XrResult<Vec<LocatedView>> {
        let to_space = match self.space_pose(space) {
            Some(pose) => pose.inverse(),
            None => return Err(XrError::rejected("locate_views", "unknown space")),
        };
        let half = self.init.eye_separation / 2.0;
        let eye = |x: f32, field_of_view| LocatedView {
            kind: ViewKind::Primary,
            pose: to_space.compose(&self.viewer.compose(&Pose::from_translation(x, 0.0, 0.0))),
            field_of_view,
        };
        let mut views = vec![eye(-half, self.init.left_fov), eye(half, self.init.right_fov)];
        if self.observer_enabled() {
            views.push(LocatedView {
                kind: ViewKind::FirstPersonObserver,
                pose: to_space.compose(&self.viewer),
                field_of_view: self.init.left_fov,
            });
        }
        Ok(views)
    }

    fn locate_controllers(&self, space: NativeSpaceHandle, _display_time: f64) -> Vec<ControllerState> {
        let to_space = match self.space_pose(space) {
            Some(pose) => pose.inverse(),
            None => return Vec::new(),
        };
        [Handedness::Left, Handedness::Right]
            .iter()
            .filter_map(|handedness| self.controllers.get(handedness))
            .map(|controller| ControllerState {
                handedness: controller.handedness,
                tracked: controller.tracked && self.tracking,
                grip: to_space.compose(&controller.grip),
                aim: to_space.compose(&controller.aim),
            })
            .collect()
    }

    fn hit_test(&self, ray: &Ray, space: NativeSpaceHandle, _display_time: f64) -> Vec<HitResult> {
        let space_pose = match self.space_pose(space) {
            Some(pose) => pose,
            None => return Vec::new(),
        };
        let [ox, oy, oz] = ray.origin;
        let [dx, dy, dz] = ray.direction;
        let rotation = Pose {
            position: [0.0; 3],
            ..space_pose
        };
        let [ox, oy, oz] = space_pose.compose(&Pose::from_translation(ox, oy, oz)).position;
        let [dx, dy, dz] = rotation.compose(&Pose::from_translation(dx, dy, dz)).position;
        let origin = Vector3D::new(ox, oy, oz);
        let direction = Vector3D::new(dx, dy, dz);

        let floor = -self.init.floor_height;
        if direction.y.abs() < f32::EPSILON {
            return Vec::new();
        }
        let distance = (floor - origin.y) / direction.y;
        if distance < 0.0 {
            return Vec::new();
        }
        let hit = origin + direction * distance;
        vec![HitResult {
            pose: space_pose.inverse().compose(&Pose::from_translation(hit.x, hit.y, hit.z)),
            native_trackable: FLOOR_TRACKABLE,
        }]
    }

    fn create_spatial_anchor(&mut self, pose: &Pose, space: NativeSpaceHandle, _display_time: f64) -> XrResult<NativeAnchorHandle> {
        if !self.has(MSFT_SPATIAL_ANCHOR) {
            return Err(XrError::rejected("create_spatial_anchor", "spatial anchors not enabled"));
        }
        let world = match self.space_pose(space) {
            Some(space_pose) => space_pose.compose(pose),
            None => return Err(XrError::rejected("create_spatial_anchor", "unknown space")),
        };
        let handle = NativeAnchorHandle(self.alloc_handle());
        self.anchors.insert(handle, MockAnchor { pose: world, lost: false });
        Ok(handle)
    }

    fn locate_anchor(&self, anchor: NativeAnchorHandle, space: NativeSpaceHandle, _display_time: f64) -> Option<Pose> {
        let anchor = self.anchors.get(&anchor).filter(|anchor| !anchor.lost)?;
        self.space_pose(space).map(|space_pose| space_pose.inverse().compose(&anchor.pose))
    }

    fn destroy_spatial_anchor(&mut self, anchor: NativeAnchorHandle) {
        self.record(MockCall::DestroySpatialAnchor(anchor));
        self.anchors.remove(&anchor);
    }

    fn compute_scene(&mut self, boundary: &DetectionBoundary, space: NativeSpaceHandle, _display_time: f64) -> XrResult<SceneSnapshot> {
        if !self.has(MSFT_SCENE_UNDERSTANDING) {
            return Err(XrError::rejected("compute_scene", "scene understanding not enabled"));
        }
        let space_pose = match self.space_pose(space) {
            Some(pose) => pose,
            None => return Err(XrError::rejected("compute_scene", "unknown space")),
        };
        let to_space = space_pose.inverse();

        let objects: Vec<SceneObject> = self
            .scene
            .objects
            .iter()
            .filter(|object| self.in_boundary(boundary, &space_pose, &object.pose))
            .map(|object| SceneObject {
                pose: to_space.compose(&object.pose),
                ..object.clone()
            })
            .collect();
        let kept: HashSet<SceneObjectId> = objects.iter().map(|object| object.id).collect();
        let planes = self
            .scene
            .planes
            .iter()
            .filter(|plane| kept.contains(&plane.parent))
            .map(|plane| {
                let mut plane = plane.clone();
                plane.pose = to_space.compose(&plane.pose);
                plane
            })
            .collect();
        let meshes = self
            .scene
            .meshes
            .iter()
            .filter(|mesh| kept.contains(&mesh.parent))
            .cloned()
            .collect();
        Ok(SceneSnapshot { objects, planes, meshes })
    }

    fn destroy_session(&mut self) {
        self.record(MockCall::DestroySession);
        self.running = false;
        self.spaces.clear();
        self.anchors.clear();
        self.swapchains.clear();
        debug!("Mock session {:?} destroyed", self.session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(init: MockXrInit) -> MockXrDevice {
        let extensions = init.extensions.clone();
        MockXrDevice::new(init, extensions, None, None)
    }

    fn drain(device: &mut MockXrDevice) -> Vec<XrRuntimeEvent> {
        let mut events = Vec::new();
        while let Some(event) = device.poll_event() {
            events.push(event);
        }
        events
    }

    fn state(state: SessionState) -> XrRuntimeEvent {
        XrRuntimeEvent::SessionStateChanged(state)
    }

    #[test]
    fn session_states_follow_the_runtime_lifecycle() {
        let mut device = device(MockXrInit::default());
        assert_eq!(drain(&mut device), vec![state(SessionState::Idle), state(SessionState::Ready)]);
        assert!(device.wait_frame().is_err());

        device.begin_session().unwrap();
        assert_eq!(
            drain(&mut device),
            vec![state(SessionState::Synchronized), state(SessionState::Visible), state(SessionState::Focused)]
        );
        device.request_exit_session().unwrap();
        assert_eq!(drain(&mut device), vec![state(SessionState::Stopping)]);
        device.end_session().unwrap();
        assert_eq!(drain(&mut device), vec![state(SessionState::Idle), state(SessionState::Exiting)]);
    }

    #[test]
    fn display_time_advances_by_the_frame_period() {
        let mut device = device(MockXrInit::default());
        device.begin_session().unwrap();
        let first = device.wait_frame().unwrap().predicted_display_time;
        let second = device.wait_frame().unwrap().predicted_display_time;
        assert!((second - first - MockXrInit::default().frame_period).abs() < 1e-9);
    }

    #[test]
    fn swapchain_images_are_reused_until_recreated() {
        let mut device = device(MockXrInit::default());
        let color = device.acquire_swapchain_image(0, SwapchainKind::Color).unwrap();
        let depth = device.acquire_swapchain_image(0, SwapchainKind::Depth).unwrap();
        assert_eq!(color.format, TextureFormat::Rgba8Srgb);
        assert_eq!(depth.format, TextureFormat::D24S8);
        assert_eq!(device.acquire_swapchain_image(0, SwapchainKind::Color).unwrap(), color);
        assert!(device.acquire_swapchain_image(5, SwapchainKind::Color).is_err());

        device.handle_msg(MockXrControlMsg::RecreateSwapchains);
        let fresh = device.acquire_swapchain_image(0, SwapchainKind::Color).unwrap();
        assert_ne!(fresh.texture, color.texture);
        assert_eq!(device.retired_textures(), vec![color.texture, depth.texture]);
        assert!(device.retired_textures().is_empty());

        // Handed back handles are reissued by the next swapchain.
        device.handle_msg(MockXrControlMsg::RecreateSwapchains);
        assert_eq!(device.acquire_swapchain_image(0, SwapchainKind::Color).unwrap().texture, color.texture);
        assert_eq!(device.retired_textures(), vec![fresh.texture]);
    }

    #[test]
    fn teardown_calls_are_recorded() {
        let calls = MockCallLog::default();
        let init = MockXrInit::default();
        let extensions = init.extensions.clone();
        let mut device = MockXrDevice::new(init, extensions, None, Some(calls.clone()));
        let local = device.create_reference_space(ReferenceSpaceType::Local, &Pose::IDENTITY).unwrap();
        device.destroy_space(local);
        device.destroy_session();
        assert_eq!(*lock(&calls), vec![MockCall::DestroySpace(local), MockCall::DestroySession]);
    }

    #[test]
    fn depth_needs_the_depth_extension() {
        let mut device = device(MockXrInit::default().without_extension(KHR_COMPOSITION_LAYER_DEPTH));
        assert!(device.acquire_swapchain_image(0, SwapchainKind::Depth).is_err());
    }

    #[test]
    fn floor_spaces_sit_below_the_origin() {
        let mut device = device(MockXrInit::default());
        let floor = device.create_reference_space(ReferenceSpaceType::LocalFloor, &Pose::IDENTITY).unwrap();
        let pose = device.locate_space(floor, 0.0).unwrap();
        assert_eq!(pose.position, [0.0, -1.6, 0.0]);

        device.handle_msg(MockXrControlMsg::SetTracking(false));
        assert_eq!(device.locate_space(floor, 0.0), None);
    }

    #[test]
    fn tracking_loss_hides_every_space_and_controller() {
        let mut device = device(MockXrInit::default());
        let viewer = device.create_reference_space(ReferenceSpaceType::Viewer, &Pose::IDENTITY).unwrap();
        let local = device.create_reference_space(ReferenceSpaceType::Local, &Pose::IDENTITY).unwrap();
        device.handle_msg(MockXrControlMsg::SetController(ControllerState {
            handedness: Handedness::Right,
            tracked: true,
            grip: Pose::IDENTITY,
            aim: Pose::IDENTITY,
        }));
        assert!(device.locate_space(viewer, 0.0).is_some());

        device.handle_msg(MockXrControlMsg::SetTracking(false));
        assert_eq!(device.locate_space(viewer, 0.0), None);
        assert_eq!(device.locate_space(local, 0.0), None);
        let controllers = device.locate_controllers(local, 0.0);
        assert_eq!(controllers.len(), 1);
        assert!(!controllers[0].tracked);
    }

    #[test]
    fn scene_is_filtered_by_the_detection_sphere() {
        let mut device = device(MockXrInit::default());
        let local = device.create_reference_space(ReferenceSpaceType::Local, &Pose::IDENTITY).unwrap();
        let object = |id, z| SceneObject {
            id: SceneObjectId(id),
            kind: rust_xr_api::SceneObjectKind::Floor,
            pose: Pose::from_translation(0.0, 0.0, z),
        };
        device.handle_msg(MockXrControlMsg::SetScene(SceneSnapshot {
            objects: vec![object(1, -1.0), object(2, -9.0)],
            planes: vec![],
            meshes: vec![],
        }));
        let boundary = DetectionBoundary::Sphere { radius: 5.0 };
        let snapshot = device.compute_scene(&boundary, local, 0.0).unwrap();
        let ids: Vec<_> = snapshot.objects.iter().map(|object| object.id).collect();
        assert_eq!(ids, vec![SceneObjectId(1)]);
    }
}
