use crate::lock;
use crate::xr_anchor::{Anchor, AnchorManager};
use crate::xr_reference_space::ReferenceSpace;
use crate::xr_scene_manager::{SceneTable, SceneUpdate};
use crate::xr_session::SessionInner;
use rust_xr_api::{
    HitResult, InputSource, Mesh, MeshId, NativeAnchorHandle, Plane, PlaneId, Pose, Ray,
    SceneObject, SceneObjectId, View, XrError, XrResult,
};
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::SeqCst;
use std::sync::{Arc, Mutex, Weak};

/// What `Session::get_next_frame` produced.
///
/// No frame is returned alongside `should_end_session`; once it has been
/// reported, every later call reports it again.
#[derive(Default)]
pub struct NextFrame {
    pub frame: Option<Frame>,
    pub should_end_session: bool,
    pub should_restart_session: bool,
}

/// One renderable frame. At most one frame of a session is live: asking the
/// session for the next frame ends this one and turns its views and input
/// sources into `XrError::StaleFrame`. Dropping the live frame ends it.
pub struct Frame {
    generation: u64,
    current_generation: Arc<AtomicU64>,
    session: Weak<Mutex<SessionInner>>,
    display_time: f64,
    timestamp: f64,
    should_render: bool,
    reference_space: Arc<ReferenceSpace>,
    views: Vec<View>,
    input_sources: Vec<InputSource>,
    scene: Arc<SceneTable>,
    scene_update: SceneUpdate,
}

impl Frame {
    pub(crate) fn new(
        generation: u64,
        current_generation: Arc<AtomicU64>,
        session: Weak<Mutex<SessionInner>>,
        display_time: f64,
        should_render: bool,
        reference_space: Arc<ReferenceSpace>,
        views: Vec<View>,
        input_sources: Vec<InputSource>,
        scene: Arc<SceneTable>,
        scene_update: SceneUpdate,
    ) -> Frame {
        Frame {
            generation,
            current_generation,
            session,
            display_time,
            timestamp: rust_xr_api::utils::timestamp(),
            should_render,
            reference_space,
            views,
            input_sources,
            scene,
            scene_update,
        }
    }

    fn check_current(&self) -> XrResult<()> {
        if self.session.strong_count() == 0 {
            return Err(XrError::SessionDestroyed);
        }
        let current = self.current_generation.load(SeqCst);
        if current != self.generation {
            return Err(XrError::StaleFrame {
                frame: self.generation,
                current,
            });
        }
        Ok(())
    }

    pub fn is_current(&self) -> bool {
        self.check_current().is_ok()
    }

    pub fn views(&self) -> XrResult<&[View]> {
        self.check_current()?;
        Ok(&self.views)
    }

    /// Controllers tracked this frame. A controller that loses tracking is
    /// left out from that frame on and its id is never handed out again.
    pub fn input_sources(&self) -> XrResult<&[InputSource]> {
        self.check_current()?;
        Ok(&self.input_sources)
    }

    /// The space views, input sources, anchors and hit results are
    /// expressed in.
    pub fn reference_space(&self) -> &Arc<ReferenceSpace> {
        &self.reference_space
    }

    // Predicted display time, in seconds of runtime time.
    pub fn display_time(&self) -> f64 {
        self.display_time
    }

    // Wall clock time the frame was produced at, in milliseconds.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn should_render(&self) -> bool {
        self.should_render
    }

    pub fn get_hit_test_results(&self, ray: &Ray) -> Vec<HitResult> {
        let session = match self.session.upgrade() {
            Some(session) => session,
            None => return Vec::new(),
        };
        let inner = lock(&session);
        inner.hit_test(ray, self.display_time)
    }

    /// Creates an anchor at `pose`, optionally adopting a runtime anchor the
    /// caller already owns. Always succeeds; the anchor starts out valid.
    pub fn create_anchor(&self, pose: Pose, native_anchor: Option<NativeAnchorHandle>) -> Anchor {
        match self.session.upgrade() {
            Some(session) => lock(&session).anchors_mut().create(pose, native_anchor),
            None => AnchorManager::detached(pose, native_anchor),
        }
    }

    pub fn update_anchor(&self, anchor: &mut Anchor) {
        if let Some(session) = self.session.upgrade() {
            lock(&session).update_anchor(anchor, self.display_time);
        }
    }

    pub fn delete_anchor(&self, anchor: &mut Anchor) {
        if let Some(session) = self.session.upgrade() {
            lock(&session).delete_anchor(anchor);
        }
    }

    /// The scene as of this frame. Empty unless scene understanding has
    /// been enabled on the session.
    pub fn scene(&self) -> &SceneTable {
        &self.scene
    }

    /// What changed in the scene since the previous query.
    pub fn scene_update(&self) -> &SceneUpdate {
        &self.scene_update
    }

    pub fn try_get_scene_object_by_id(&self, id: SceneObjectId) -> XrResult<&SceneObject> {
        self.scene.try_get_scene_object_by_id(id)
    }

    pub fn try_get_plane_by_id(&self, id: PlaneId) -> XrResult<&Plane> {
        self.scene.try_get_plane_by_id(id)
    }

    pub fn try_get_mesh_by_id(&self, id: MeshId) -> XrResult<&Mesh> {
        self.scene.try_get_mesh_by_id(id)
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        if let Some(session) = self.session.upgrade() {
            lock(&session).end_frame_if_current(self.generation);
        }
    }
}
