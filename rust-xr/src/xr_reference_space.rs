use crate::lock;
use crate::xr_capabilities::XrCapabilities;
use crate::xr_session::SessionInner;
use rust_xr_api::{NativeSpaceHandle, Pose, ReferenceSpaceType, SpaceLocation, XrDevice};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

/// A coordinate system owned by a session.
///
/// Spaces are shared handles relocated at the start of each frame. The
/// session keeps one space per type alive until it is torn down; an offset
/// space lives as long as its caller holds it. A space never keeps its
/// session alive.
pub struct ReferenceSpace {
    space_type: ReferenceSpaceType,
    native: NativeSpaceHandle,
    // Pose of this space relative to the origin of `space_type`.
    offset: Pose,
    location: Mutex<SpaceLocation>,
    session: Weak<Mutex<SessionInner>>,
}

impl ReferenceSpace {
    fn new(
        space_type: ReferenceSpaceType,
        native: NativeSpaceHandle,
        offset: Pose,
        session: Weak<Mutex<SessionInner>>,
    ) -> ReferenceSpace {
        ReferenceSpace {
            space_type,
            native,
            offset,
            location: Mutex::new(SpaceLocation::default()),
            session,
        }
    }

    pub fn space_type(&self) -> ReferenceSpaceType {
        self.space_type
    }

    pub fn native_handle(&self) -> NativeSpaceHandle {
        self.native
    }

    /// Pose relative to the origin of the space's type; identity for the
    /// spaces returned by `Session::try_create_reference_space`.
    pub fn offset(&self) -> Pose {
        self.offset
    }

    /// Where the space was at the last frame. When the runtime could not
    /// locate it, the pose is the last known one and `tracked` is false.
    pub fn transform(&self) -> SpaceLocation {
        *lock(&self.location)
    }

    /// Creates a new space, rigidly attached to this one at `offset`.
    /// Returns `None` when the runtime rejects the space or the session is gone.
    pub fn try_create_reference_space_at_offset(&self, offset: &Pose) -> Option<Arc<ReferenceSpace>> {
        let session = self.session.upgrade()?;
        let mut session = lock(&session);
        session.create_offset_space(self, offset)
    }

    pub(crate) fn update_location(&self, located: Option<Pose>) {
        let mut location = lock(&self.location);
        match located {
            Some(pose) => {
                *location = SpaceLocation { pose, tracked: true };
            }
            None => {
                if location.tracked {
                    debug!("Lost tracking of {} space {:?}", self.space_type, self.native);
                }
                location.tracked = false;
            }
        }
    }
}

/// The spaces of one session: at most one per type, plus any number of
/// independent offset spaces.
pub(crate) struct ReferenceSpaces {
    cached: HashMap<ReferenceSpaceType, Arc<ReferenceSpace>>,
    // Runtime spaces of dropped offset spaces are destroyed on the next frame.
    offsets: Vec<(NativeSpaceHandle, Weak<ReferenceSpace>)>,
}

impl ReferenceSpaces {
    pub(crate) fn new() -> ReferenceSpaces {
        ReferenceSpaces {
            cached: HashMap::new(),
            offsets: Vec::new(),
        }
    }

    /// Wraps a runtime space created while the session was being built.
    pub(crate) fn adopt(
        &mut self,
        space_type: ReferenceSpaceType,
        native: NativeSpaceHandle,
        session: Weak<Mutex<SessionInner>>,
    ) -> Arc<ReferenceSpace> {
        let space = Arc::new(ReferenceSpace::new(space_type, native, Pose::IDENTITY, session));
        self.cached.insert(space_type, space.clone());
        space
    }

    pub(crate) fn try_get(&self, space_type: ReferenceSpaceType) -> Option<Arc<ReferenceSpace>> {
        self.cached.get(&space_type).cloned()
    }

    pub(crate) fn try_create(
        &mut self,
        device: &mut dyn XrDevice,
        capabilities: &XrCapabilities,
        session: &Weak<Mutex<SessionInner>>,
        space_type: ReferenceSpaceType,
        display_time: f64,
    ) -> Option<Arc<ReferenceSpace>> {
        if let Some(space) = self.try_get(space_type) {
            return Some(space);
        }

        if space_type == ReferenceSpaceType::Unbounded && !capabilities.unbounded_reference_space_supported() {
            info!("Unbounded reference space requested but not supported");
            return None;
        }

        let native = match device.create_reference_space(space_type, &Pose::IDENTITY) {
            Ok(native) => native,
            Err(err) => {
                warn!("Failed to create {} reference space: {}", space_type, err);
                return None;
            }
        };

        let space = self.adopt(space_type, native, session.clone());
        space.update_location(device.locate_space(native, display_time));
        debug!("Created {} reference space {:?}", space_type, native);
        Some(space)
    }

    pub(crate) fn try_create_at_offset(
        &mut self,
        device: &mut dyn XrDevice,
        session: &Weak<Mutex<SessionInner>>,
        base: &ReferenceSpace,
        offset: &Pose,
        display_time: f64,
    ) -> Option<Arc<ReferenceSpace>> {
        let space_type = base.space_type();
        let offset = base.offset().compose(offset);
        let native = match device.create_reference_space(space_type, &offset) {
            Ok(native) => native,
            Err(err) => {
                warn!("Failed to create offset {} reference space: {}", space_type, err);
                return None;
            }
        };

        let space = Arc::new(ReferenceSpace::new(space_type, native, offset, session.clone()));
        space.update_location(device.locate_space(native, display_time));
        self.offsets.push((native, Arc::downgrade(&space)));
        Some(space)
    }

    /// Releases the offset spaces nobody holds anymore, then resolves every
    /// remaining space at `display_time`.
    pub(crate) fn locate_all(&mut self, device: &mut dyn XrDevice, display_time: f64) {
        let mut live = Vec::with_capacity(self.offsets.len());
        for (native, space) in self.offsets.drain(..) {
            match space.upgrade() {
                Some(space) => live.push((native, space)),
                None => {
                    debug!("Releasing dropped offset space {:?}", native);
                    device.destroy_space(native);
                }
            }
        }
        self.offsets = live.iter().map(|(native, space)| (*native, Arc::downgrade(space))).collect();

        let offsets = live.iter().map(|(_, space)| space);
        for space in self.cached.values().chain(offsets) {
            space.update_location(device.locate_space(space.native_handle(), display_time));
        }
    }

    /// Destroys every runtime space. The handles still held stay valid
    /// objects but report themselves as untracked from now on.
    pub(crate) fn release_all(&mut self, device: &mut dyn XrDevice) {
        for (native, space) in self.offsets.drain(..) {
            if let Some(space) = space.upgrade() {
                space.update_location(None);
            }
            device.destroy_space(native);
        }
        for (_, space) in self.cached.drain() {
            space.update_location(None);
            device.destroy_space(space.native_handle());
        }
    }
}
