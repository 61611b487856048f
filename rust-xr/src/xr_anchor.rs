use crate::xr_capabilities::XrCapabilities;
use rust_xr_api::{NativeAnchorHandle, NativeSpaceHandle, Pose, XrDevice};
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::SeqCst;

pub type AnchorId = u64;

static ANCHOR_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// A pose the caller wants kept fixed relative to the real world.
///
/// Validity only ever goes from true to false, and only through
/// `Frame::update_anchor` when the runtime reports the anchor lost.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    id: AnchorId,
    pose: Pose,
    native_anchor: Option<NativeAnchorHandle>,
    is_valid: bool,
    deleted: bool,
}

impl Anchor {
    pub fn id(&self) -> AnchorId {
        self.id
    }

    // Pose in the reference space of the frame that last updated the anchor.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn native_anchor(&self) -> Option<NativeAnchorHandle> {
        self.native_anchor
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

struct AnchorBinding {
    handle: NativeAnchorHandle,
    // Only anchors the session created are destroyed on delete.
    owned: bool,
}

struct AnchorRecord {
    binding: Option<AnchorBinding>,
}

pub(crate) struct AnchorManager {
    records: HashMap<AnchorId, AnchorRecord>,
}

impl AnchorManager {
    pub(crate) fn new() -> AnchorManager {
        AnchorManager {
            records: HashMap::new(),
        }
    }

    /// Builds an anchor that no session tracks. Updates on it are no-ops.
    pub(crate) fn detached(pose: Pose, native_anchor: Option<NativeAnchorHandle>) -> Anchor {
        Anchor {
            id: ANCHOR_ID_COUNTER.fetch_add(1, SeqCst),
            pose,
            native_anchor,
            is_valid: true,
            deleted: false,
        }
    }

    pub(crate) fn create(&mut self, pose: Pose, native_anchor: Option<NativeAnchorHandle>) -> Anchor {
        let anchor = AnchorManager::detached(pose, native_anchor);
        let binding = native_anchor.map(|handle| AnchorBinding { handle, owned: false });
        self.records.insert(anchor.id, AnchorRecord { binding });
        debug!("Created anchor {} (native {:?})", anchor.id, native_anchor);
        anchor
    }

    pub(crate) fn update(
        &mut self,
        anchor: &mut Anchor,
        device: &mut dyn XrDevice,
        capabilities: &XrCapabilities,
        space: NativeSpaceHandle,
        display_time: f64,
    ) {
        let record = match self.records.get_mut(&anchor.id) {
            Some(record) if !anchor.deleted => record,
            _ => {
                debug!("Ignoring update of untracked anchor {}", anchor.id);
                return;
            }
        };

        if !anchor.is_valid || !capabilities.spatial_anchor_supported() {
            return;
        }

        let handle = match record.binding {
            Some(ref binding) => binding.handle,
            None => match device.create_spatial_anchor(&anchor.pose, space, display_time) {
                Ok(handle) => {
                    record.binding = Some(AnchorBinding { handle, owned: true });
                    anchor.native_anchor = Some(handle);
                    handle
                }
                Err(err) => {
                    // Still a valid local anchor, binding is retried next update.
                    warn!("Failed to bind anchor {}: {}", anchor.id, err);
                    return;
                }
            },
        };

        match device.locate_anchor(handle, space, display_time) {
            Some(pose) => anchor.pose = pose,
            None => {
                info!("Anchor {} lost by the runtime", anchor.id);
                anchor.is_valid = false;
            }
        }
    }

    pub(crate) fn delete(&mut self, anchor: &mut Anchor, device: &mut dyn XrDevice) {
        anchor.deleted = true;
        let record = match self.records.remove(&anchor.id) {
            Some(record) => record,
            None => {
                debug!("Anchor {} already deleted", anchor.id);
                return;
            }
        };
        if let Some(AnchorBinding { handle, owned: true }) = record.binding {
            device.destroy_spatial_anchor(handle);
        }
        debug!("Deleted anchor {}", anchor.id);
    }

    pub(crate) fn release_all(&mut self, device: &mut dyn XrDevice) {
        for (_, record) in self.records.drain() {
            if let Some(AnchorBinding { handle, owned: true }) = record.binding {
                device.destroy_spatial_anchor(handle);
            }
        }
    }
}
