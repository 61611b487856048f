use crate::lock;
use crate::xr_anchor::{Anchor, AnchorManager};
use crate::xr_capabilities::XrCapabilities;
use crate::xr_frame::{Frame, NextFrame};
use crate::xr_reference_space::{ReferenceSpace, ReferenceSpaces};
use crate::xr_scene_manager::{SceneManager, SceneTable, SceneUnderstandingOptions, SceneUpdate};
use crate::xr_system::{XrServicePtr, XrSystem};
use rust_xr_api::utils;
use rust_xr_api::{
    FrameSubmission, GraphicsDeviceHandle, Handedness, HitResult, InputSource, InputSourceId,
    NativeSessionHandle, Pose, Ray, ReferenceSpaceType, SessionCreateInfo, SessionState,
    SessionType, Size, SwapchainKind, TextureHandle, View, ViewKind, WindowHandle, XrDevice,
    XrError, XrFuture, XrResult, XrRuntimeEvent, DEFAULT_DEPTH_FAR_Z, DEFAULT_DEPTH_NEAR_Z,
};
use std::collections::{HashMap, HashSet};
use std::mem;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::SeqCst;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::thread;

/// Session level lifecycle, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum SessionLifecycle {
    // Created, waiting for the runtime to report it ready.
    Initializing,
    Ready,
    // Frames are being produced.
    Running,
    Stopping,
    Exited,
}

pub(crate) struct SessionInner {
    id: u32,
    session_type: SessionType,
    device: Box<dyn XrDevice>,
    capabilities: Arc<XrCapabilities>,
    weak_self: Weak<Mutex<SessionInner>>,
    lifecycle: SessionLifecycle,
    runtime_state: SessionState,
    spaces: ReferenceSpaces,
    // Space views, controllers and anchors are located in.
    scene_space: Arc<ReferenceSpace>,
    anchors: AnchorManager,
    scene: Option<SceneManager>,
    generation: Arc<AtomicU64>,
    frame_live: bool,
    live_views: Vec<View>,
    last_display_time: f64,
    input_ids: HashMap<Handedness, InputSourceId>,
    // Swapchain textures handed out in views and not yet retired.
    acquired_textures: HashSet<TextureHandle>,
    depth_near_z: f32,
    depth_far_z: f32,
    end_requested: bool,
    should_end: bool,
    should_restart: bool,
}

impl SessionInner {
    fn next_frame(&mut self, release: &mut dyn FnMut(TextureHandle)) -> NextFrame {
        self.end_live_frame();
        self.release_retired_textures(release);
        let generation = self.generation.fetch_add(1, SeqCst) + 1;

        self.process_events();
        if self.end_requested && !self.should_end {
            // The runtime never confirmed the exit request.
            self.should_end = true;
            self.end_runtime_session();
        }
        if self.should_end || self.should_restart {
            return NextFrame {
                frame: None,
                should_end_session: self.should_end,
                should_restart_session: self.should_restart,
            };
        }
        if self.lifecycle != SessionLifecycle::Running {
            debug!("Session {} is not running yet ({:?})", self.id, self.runtime_state);
            return NextFrame::default();
        }

        let timing = match self.device.wait_frame() {
            Ok(timing) => timing,
            Err(err) => {
                warn!("Failed to wait for frame: {}", err);
                return NextFrame::default();
            }
        };
        if let Err(err) = self.device.begin_frame() {
            warn!("Failed to begin frame: {}", err);
            return NextFrame::default();
        }
        self.frame_live = true;
        let display_time = timing.predicted_display_time;
        self.last_display_time = display_time;

        self.spaces.locate_all(&mut *self.device, display_time);
        let views = self.locate_views(display_time);
        let input_sources = self.update_input_sources(display_time);
        let (scene, scene_update) = self.poll_scene(display_time);
        self.live_views = views.clone();

        let frame = Frame::new(
            generation,
            self.generation.clone(),
            self.weak_self.clone(),
            display_time,
            timing.should_render,
            self.scene_space.clone(),
            views,
            input_sources,
            scene,
            scene_update,
        );
        NextFrame {
            frame: Some(frame),
            ..NextFrame::default()
        }
    }

    fn end_live_frame(&mut self) {
        if !self.frame_live {
            return;
        }
        self.frame_live = false;
        let views = mem::take(&mut self.live_views);
        let submission = FrameSubmission {
            display_time: self.last_display_time,
            space: self.scene_space.native_handle(),
            views: &views,
        };
        if let Err(err) = self.device.end_frame(&submission) {
            warn!("Failed to end frame: {}", err);
        }
    }

    pub(crate) fn end_frame_if_current(&mut self, generation: u64) {
        if self.generation.load(SeqCst) == generation {
            self.end_live_frame();
        }
    }

    // Reports each handed out texture the runtime retired. A handle value the
    // runtime reissues later is reported again once retired again.
    fn release_retired_textures(&mut self, release: &mut dyn FnMut(TextureHandle)) {
        for texture in self.device.retired_textures() {
            if self.acquired_textures.remove(&texture) {
                release(texture);
            } else {
                debug!("Ignoring retirement of texture {:?} never handed out", texture);
            }
        }
    }

    fn process_events(&mut self) {
        while let Some(event) = self.device.poll_event() {
            match event {
                XrRuntimeEvent::SessionStateChanged(state) => {
                    debug!("Session {} state changed to {:?}", self.id, state);
                    self.runtime_state = state;
                    self.on_state_changed(state);
                }
                XrRuntimeEvent::InstanceLossPending => {
                    warn!("XR instance loss pending, session {} must be recreated", self.id);
                    self.should_end = true;
                    self.should_restart = true;
                    self.end_runtime_session();
                }
                XrRuntimeEvent::ReferenceSpaceChangePending(space_type) => {
                    info!("Origin of the {} reference space is about to change", space_type);
                }
            }
        }
    }

    fn on_state_changed(&mut self, state: SessionState) {
        match state {
            SessionState::Ready => {
                self.lifecycle = SessionLifecycle::Ready;
                if self.end_requested {
                    return;
                }
                match self.device.begin_session() {
                    Ok(()) => {
                        info!("Session {} running", self.id);
                        self.lifecycle = SessionLifecycle::Running;
                    }
                    Err(err) => {
                        error!("Failed to begin session {}: {}", self.id, err);
                        self.should_end = true;
                    }
                }
            }
            SessionState::Stopping => {
                self.should_end = true;
                self.end_runtime_session();
            }
            SessionState::LossPending => {
                warn!("Session {} lost, it must be recreated", self.id);
                self.should_end = true;
                self.should_restart = true;
                self.end_runtime_session();
            }
            SessionState::Exiting => {
                self.should_end = true;
                self.lifecycle = SessionLifecycle::Exited;
            }
            SessionState::Idle
            | SessionState::Synchronized
            | SessionState::Visible
            | SessionState::Focused => {}
        }
    }

    fn end_runtime_session(&mut self) {
        if self.lifecycle != SessionLifecycle::Running {
            return;
        }
        self.end_live_frame();
        self.lifecycle = SessionLifecycle::Stopping;
        if let Err(err) = self.device.end_session() {
            warn!("Failed to end session {}: {}", self.id, err);
        }
    }

    fn locate_views(&mut self, display_time: f64) -> Vec<View> {
        let located = match self.device.locate_views(self.scene_space.native_handle(), display_time) {
            Ok(located) => located,
            Err(err) => {
                warn!("Failed to locate views: {}", err);
                return Vec::new();
            }
        };
        let depth = self.capabilities.depth_supported();
        let observers = self.capabilities.observer_views_supported();

        let mut views = Vec::with_capacity(located.len());
        for (index, located) in located.into_iter().enumerate() {
            if located.kind == ViewKind::FirstPersonObserver && !observers {
                continue;
            }
            let mut view = View {
                kind: located.kind,
                pose: located.pose,
                field_of_view: located.field_of_view,
                depth_near_z: self.depth_near_z,
                depth_far_z: self.depth_far_z,
                ..View::default()
            };
            match self.device.acquire_swapchain_image(index, SwapchainKind::Color) {
                Ok(image) => {
                    self.acquired_textures.insert(image.texture);
                    view.set_color(image);
                }
                Err(err) => warn!("Failed to acquire color texture for view {}: {}", index, err),
            }
            if depth {
                match self.device.acquire_swapchain_image(index, SwapchainKind::Depth) {
                    Ok(image) => {
                        self.acquired_textures.insert(image.texture);
                        view.set_depth(image);
                    }
                    Err(err) => warn!("Failed to acquire depth texture for view {}: {}", index, err),
                }
            }
            views.push(view);
        }
        views
    }

    fn update_input_sources(&mut self, display_time: f64) -> Vec<InputSource> {
        let controllers = self.device.locate_controllers(self.scene_space.native_handle(), display_time);
        let mut ids = HashMap::new();
        let mut sources = Vec::new();
        for controller in controllers {
            let known = self.input_ids.get(&controller.handedness).copied();
            let id = match (known, controller.tracked) {
                (Some(id), true) => id,
                (None, true) => {
                    let id = utils::new_input_source_id();
                    debug!("Tracking {:?} controller as input source {}", controller.handedness, id);
                    id
                }
                // Left out of this frame, its id is retired.
                (Some(id), false) => {
                    debug!("Input source {} lost tracking", id);
                    continue;
                }
                (None, false) => continue,
            };
            ids.insert(controller.handedness, id);
            sources.push(InputSource {
                id,
                handedness: controller.handedness,
                tracked_this_frame: true,
                grip_space: controller.grip,
                aim_space: controller.aim,
            });
        }
        self.input_ids = ids;
        sources
    }

    fn poll_scene(&mut self, display_time: f64) -> (Arc<SceneTable>, SceneUpdate) {
        match self.scene {
            Some(ref mut scene) => {
                let update = scene.poll(&mut *self.device, self.scene_space.native_handle(), display_time);
                (scene.table(), update)
            }
            None => (Arc::new(SceneTable::default()), SceneUpdate::default()),
        }
    }

    pub(crate) fn hit_test(&self, ray: &Ray, display_time: f64) -> Vec<HitResult> {
        self.device.hit_test(ray, self.scene_space.native_handle(), display_time)
    }

    pub(crate) fn anchors_mut(&mut self) -> &mut AnchorManager {
        &mut self.anchors
    }

    pub(crate) fn update_anchor(&mut self, anchor: &mut Anchor, display_time: f64) {
        self.anchors.update(
            anchor,
            &mut *self.device,
            &self.capabilities,
            self.scene_space.native_handle(),
            display_time,
        );
    }

    pub(crate) fn delete_anchor(&mut self, anchor: &mut Anchor) {
        self.anchors.delete(anchor, &mut *self.device);
    }

    pub(crate) fn create_offset_space(&mut self, base: &ReferenceSpace, offset: &Pose) -> Option<Arc<ReferenceSpace>> {
        self.spaces.try_create_at_offset(
            &mut *self.device,
            &self.weak_self,
            base,
            offset,
            self.last_display_time,
        )
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.end_live_frame();
        self.generation.fetch_add(1, SeqCst);
        self.end_runtime_session();
        self.anchors.release_all(&mut *self.device);
        self.spaces.release_all(&mut *self.device);
        self.device.destroy_session();
        info!("Session {} destroyed", self.id);
    }
}

/// A running XR session. Cloning yields another handle to the same session;
/// the session is torn down when the last handle goes away.
#[derive(Clone)]
pub struct Session(Arc<Mutex<SessionInner>>);

impl PartialEq for Session {
    fn eq(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Session {
    /// Creates an immersive VR session for the given graphics device and
    /// window. The system must have been initialized.
    pub fn create_async(
        system: &XrSystem,
        graphics_device: GraphicsDeviceHandle,
        window: WindowHandle,
    ) -> XrFuture<Session> {
        let info = SessionCreateInfo {
            graphics_device,
            window,
            ..SessionCreateInfo::default()
        };
        Session::create_async_with(system, info)
    }

    pub fn create_async_with(system: &XrSystem, info: SessionCreateInfo) -> XrFuture<Session> {
        let capabilities = match system.capabilities() {
            Some(capabilities) => capabilities,
            None => return XrFuture::rejected(XrError::NotInitialized),
        };
        let service = system.service();
        let (mut promise, future) = XrFuture::blocked();
        let spawned = thread::Builder::new()
            .name("XrSessionCreate".into())
            .spawn(move || {
                let result = Session::create(service, capabilities, info);
                if let Err(ref err) = result {
                    error!("Error creating XR session: {}", err);
                }
                let _ = promise.complete(result);
            });
        match spawned {
            Ok(_) => future,
            Err(err) => XrFuture::rejected(XrError::rejected("create_session", err)),
        }
    }

    fn create(service: XrServicePtr, capabilities: Arc<XrCapabilities>, info: SessionCreateInfo) -> XrResult<Session> {
        let mut device = {
            let mut service = lock(&service);
            if !service.is_available() {
                return Err(XrError::RuntimeUnavailable("no XR device connected".into()));
            }
            if !service.is_session_supported(info.session_type)? {
                return Err(XrError::SessionTypeUnsupported(info.session_type));
            }
            service.create_session(&info)?
        };

        let scene_space_type = if capabilities.unbounded_reference_space_supported() {
            ReferenceSpaceType::Unbounded
        } else {
            ReferenceSpaceType::Local
        };
        let scene_space = match device.create_reference_space(scene_space_type, &Pose::IDENTITY) {
            Ok(space) => space,
            Err(err) => {
                device.destroy_session();
                return Err(err);
            }
        };

        let id = utils::new_id();
        let inner = Arc::new_cyclic(|weak_self: &Weak<Mutex<SessionInner>>| {
            let mut spaces = ReferenceSpaces::new();
            let scene_space = spaces.adopt(scene_space_type, scene_space, weak_self.clone());
            Mutex::new(SessionInner {
                id,
                session_type: info.session_type,
                device,
                capabilities,
                weak_self: weak_self.clone(),
                lifecycle: SessionLifecycle::Initializing,
                runtime_state: SessionState::Idle,
                spaces,
                scene_space,
                anchors: AnchorManager::new(),
                scene: None,
                generation: Arc::new(AtomicU64::new(0)),
                frame_live: false,
                live_views: Vec::new(),
                last_display_time: 0.0,
                input_ids: HashMap::new(),
                acquired_textures: HashSet::new(),
                depth_near_z: DEFAULT_DEPTH_NEAR_Z,
                depth_far_z: DEFAULT_DEPTH_FAR_Z,
                end_requested: false,
                should_end: false,
                should_restart: false,
            })
        });
        info!("Created {} session {} in {} space", info.session_type.as_str(), id, scene_space_type);
        Ok(Session(inner))
    }

    fn inner(&self) -> MutexGuard<SessionInner> {
        lock(&self.0)
    }

    pub fn id(&self) -> u32 {
        self.inner().id
    }

    /// Waits for the runtime's next frame. Ends the previous frame first.
    pub fn get_next_frame(&self) -> NextFrame {
        self.inner().next_frame(&mut |_: TextureHandle| {})
    }

    /// Like `get_next_frame`, calling `release` once for each texture the
    /// runtime no longer uses, in retirement order.
    pub fn get_next_frame_with_texture_release<F: FnMut(TextureHandle)>(&self, mut release: F) -> NextFrame {
        self.inner().next_frame(&mut release)
    }

    /// Asks the runtime to stop the session. The next `get_next_frame` call
    /// reports `should_end_session`.
    pub fn request_end_session(&self) {
        let mut inner = self.inner();
        if inner.end_requested {
            return;
        }
        inner.end_requested = true;
        if inner.lifecycle == SessionLifecycle::Running {
            if let Err(err) = inner.device.request_exit_session() {
                warn!("Failed to request exit of session {}: {}", inner.id, err);
            }
        }
    }

    pub fn get_width_and_height_for_view_index(&self, view_index: usize) -> Option<Size> {
        self.inner()
            .device
            .view_configurations()
            .get(view_index)
            .map(|config| config.recommended_size)
    }

    /// Depth range written into the views of the following frames.
    pub fn set_depths_near_far(&self, depth_near_z: f32, depth_far_z: f32) {
        let mut inner = self.inner();
        inner.depth_near_z = depth_near_z;
        inner.depth_far_z = depth_far_z;
    }

    pub fn try_get_reference_space(&self, space_type: ReferenceSpaceType) -> Option<Arc<ReferenceSpace>> {
        self.inner().spaces.try_get(space_type)
    }

    pub fn try_create_reference_space(&self, space_type: ReferenceSpaceType) -> Option<Arc<ReferenceSpace>> {
        let mut guard = self.inner();
        let inner = &mut *guard;
        inner.spaces.try_create(
            &mut *inner.device,
            &inner.capabilities,
            &inner.weak_self,
            space_type,
            inner.last_display_time,
        )
    }

    /// Starts, or restarts with new options, scene understanding. Returns
    /// false when the runtime does not support it.
    pub fn try_enable_scene_understanding(&self, options: SceneUnderstandingOptions) -> bool {
        let mut inner = self.inner();
        if !inner.capabilities.scene_understanding_supported() {
            info!("Scene understanding requested but not supported");
            return false;
        }
        inner.scene = Some(SceneManager::new(options));
        true
    }

    pub fn capabilities(&self) -> Arc<XrCapabilities> {
        self.inner().capabilities.clone()
    }

    pub fn state(&self) -> SessionLifecycle {
        self.inner().lifecycle
    }

    pub fn runtime_state(&self) -> SessionState {
        self.inner().runtime_state
    }

    pub fn session_type(&self) -> SessionType {
        self.inner().session_type
    }

    pub fn native_handle(&self) -> NativeSessionHandle {
        self.inner().device.native_handle()
    }
}
