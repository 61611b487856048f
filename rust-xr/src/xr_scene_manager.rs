use rust_xr_api::{
    DetectionBoundary, Mesh, MeshId, NativeSpaceHandle, Plane, PlaneId, SceneObject,
    SceneObjectId, SceneSnapshot, XrDevice, XrError, XrResult,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// How scene understanding looks for objects. The detection volume is only
/// read when scene understanding is (re)initialized.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct SceneUnderstandingOptions {
    pub detection_boundary: DetectionBoundary,
    // Seconds of display time between two scene queries.
    pub update_interval: f64,
}

impl Default for SceneUnderstandingOptions {
    fn default() -> SceneUnderstandingOptions {
        SceneUnderstandingOptions {
            detection_boundary: DetectionBoundary::default(),
            update_interval: 1.0,
        }
    }
}

/// Identifiers that changed with the last scene query.
///
/// Within one update, `updated_*` and `removed_*` never share an id, and
/// every id of the previous snapshot missing from the new one is in `removed_*`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneUpdate {
    pub updated_objects: Vec<SceneObjectId>,
    pub removed_objects: Vec<SceneObjectId>,
    pub updated_planes: Vec<PlaneId>,
    pub removed_planes: Vec<PlaneId>,
    pub updated_meshes: Vec<MeshId>,
    pub removed_meshes: Vec<MeshId>,
}

impl SceneUpdate {
    pub fn is_empty(&self) -> bool {
        self.updated_objects.is_empty()
            && self.removed_objects.is_empty()
            && self.updated_planes.is_empty()
            && self.removed_planes.is_empty()
            && self.updated_meshes.is_empty()
            && self.removed_meshes.is_empty()
    }
}

/// The latest committed scene snapshot, keyed by runtime identifier.
#[derive(Debug, Clone, Default)]
pub struct SceneTable {
    objects: BTreeMap<SceneObjectId, SceneObject>,
    planes: BTreeMap<PlaneId, Plane>,
    meshes: BTreeMap<MeshId, Mesh>,
}

impl SceneTable {
    fn from_snapshot(snapshot: SceneSnapshot) -> SceneTable {
        SceneTable {
            objects: snapshot.objects.into_iter().map(|object| (object.id, object)).collect(),
            planes: snapshot.planes.into_iter().map(|plane| (plane.id, plane)).collect(),
            meshes: snapshot.meshes.into_iter().map(|mesh| (mesh.id, mesh)).collect(),
        }
    }

    pub fn scene_objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    pub fn planes(&self) -> impl Iterator<Item = &Plane> {
        self.planes.values()
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.values()
    }

    pub fn try_get_scene_object_by_id(&self, id: SceneObjectId) -> XrResult<&SceneObject> {
        self.objects.get(&id).ok_or(XrError::NotFound { kind: "scene object", id: id.0 })
    }

    pub fn try_get_plane_by_id(&self, id: PlaneId) -> XrResult<&Plane> {
        self.planes.get(&id).ok_or(XrError::NotFound { kind: "plane", id: id.0 })
    }

    pub fn try_get_mesh_by_id(&self, id: MeshId) -> XrResult<&Mesh> {
        self.meshes.get(&id).ok_or(XrError::NotFound { kind: "mesh", id: id.0 })
    }
}

// Returns (updated, removed) going from `previous` to `next`.
fn diff<K: Ord + Copy, V: PartialEq>(previous: &BTreeMap<K, V>, next: &BTreeMap<K, V>) -> (Vec<K>, Vec<K>) {
    let updated = next
        .iter()
        .filter(|(id, value)| previous.get(id) != Some(value))
        .map(|(id, _)| *id)
        .collect();
    let removed = previous
        .keys()
        .filter(|id| !next.contains_key(id))
        .copied()
        .collect();
    (updated, removed)
}

pub(crate) struct SceneManager {
    options: SceneUnderstandingOptions,
    last_update: Option<f64>,
    table: Arc<SceneTable>,
}

impl SceneManager {
    pub(crate) fn new(options: SceneUnderstandingOptions) -> SceneManager {
        info!("Scene understanding initialized with {:?}", options);
        SceneManager {
            options,
            last_update: None,
            table: Arc::new(SceneTable::default()),
        }
    }

    pub(crate) fn table(&self) -> Arc<SceneTable> {
        self.table.clone()
    }

    pub(crate) fn is_due(&self, display_time: f64) -> bool {
        match self.last_update {
            None => true,
            Some(last) => display_time - last >= self.options.update_interval,
        }
    }

    /// Queries the runtime if the update interval has elapsed.
    pub(crate) fn poll(&mut self, device: &mut dyn XrDevice, space: NativeSpaceHandle, display_time: f64) -> SceneUpdate {
        if !self.is_due(display_time) {
            return SceneUpdate::default();
        }
        self.last_update = Some(display_time);
        match device.compute_scene(&self.options.detection_boundary, space, display_time) {
            Ok(snapshot) => self.commit(snapshot),
            Err(err) => {
                warn!("Scene query failed, keeping the previous snapshot: {}", err);
                SceneUpdate::default()
            }
        }
    }

    /// Replaces the live table wholesale and reports what changed.
    pub(crate) fn commit(&mut self, snapshot: SceneSnapshot) -> SceneUpdate {
        let next = SceneTable::from_snapshot(snapshot);
        let (updated_objects, removed_objects) = diff(&self.table.objects, &next.objects);
        let (updated_planes, removed_planes) = diff(&self.table.planes, &next.planes);
        let (updated_meshes, removed_meshes) = diff(&self.table.meshes, &next.meshes);
        self.table = Arc::new(next);
        let update = SceneUpdate {
            updated_objects,
            removed_objects,
            updated_planes,
            removed_planes,
            updated_meshes,
            removed_meshes,
        };
        if !update.is_empty() {
            debug!("Scene update: {:?}", update);
        }
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xr_api::{Pose, SceneObjectKind};

    fn object(id: u64) -> SceneObject {
        SceneObject {
            id: SceneObjectId(id),
            kind: SceneObjectKind::Wall,
            pose: Pose::IDENTITY,
        }
    }

    fn plane(id: u64, parent: u64, width: f32) -> Plane {
        Plane {
            id: PlaneId(id),
            parent: SceneObjectId(parent),
            pose: Pose::IDENTITY,
            extent: [width, 2.0],
        }
    }

    fn mesh(id: u64, parent: u64) -> Mesh {
        Mesh {
            id: MeshId(id),
            parent: SceneObjectId(parent),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            indices: vec![0, 1, 2],
        }
    }

    fn manager() -> SceneManager {
        SceneManager::new(SceneUnderstandingOptions::default())
    }

    #[test]
    fn first_snapshot_reports_everything_as_updated() {
        let mut scene = manager();
        let update = scene.commit(SceneSnapshot {
            objects: vec![object(1), object(2)],
            planes: vec![plane(10, 1, 1.0)],
            meshes: vec![mesh(20, 2)],
        });
        assert_eq!(update.updated_objects, vec![SceneObjectId(1), SceneObjectId(2)]);
        assert_eq!(update.updated_planes, vec![PlaneId(10)]);
        assert_eq!(update.updated_meshes, vec![MeshId(20)]);
        assert!(update.removed_objects.is_empty() && update.removed_planes.is_empty() && update.removed_meshes.is_empty());
    }

    #[test]
    fn unchanged_geometry_is_not_reported() {
        let mut scene = manager();
        let snapshot = SceneSnapshot {
            objects: vec![object(1)],
            planes: vec![plane(10, 1, 1.0)],
            meshes: vec![],
        };
        scene.commit(snapshot.clone());
        assert!(scene.commit(snapshot).is_empty());
    }

    #[test]
    fn changed_and_missing_ids_are_disjoint_and_exhaustive() {
        let mut scene = manager();
        scene.commit(SceneSnapshot {
            objects: vec![object(1), object(2)],
            planes: vec![plane(10, 1, 1.0), plane(11, 1, 1.0), plane(12, 2, 1.0)],
            meshes: vec![mesh(20, 1), mesh(21, 2)],
        });

        let update = scene.commit(SceneSnapshot {
            objects: vec![object(1)],
            planes: vec![plane(10, 1, 3.0), plane(11, 1, 1.0), plane(13, 1, 1.0)],
            meshes: vec![mesh(20, 1)],
        });

        assert_eq!(update.updated_planes, vec![PlaneId(10), PlaneId(13)]);
        assert_eq!(update.removed_planes, vec![PlaneId(12)]);
        assert_eq!(update.removed_objects, vec![SceneObjectId(2)]);
        assert_eq!(update.removed_meshes, vec![MeshId(21)]);
        assert!(update.updated_meshes.is_empty());
        for id in &update.updated_planes {
            assert!(!update.removed_planes.contains(id));
        }
    }

    #[test]
    fn lookups_follow_the_latest_snapshot() {
        let mut scene = manager();
        scene.commit(SceneSnapshot {
            objects: vec![object(1)],
            planes: vec![plane(10, 1, 1.0)],
            meshes: vec![mesh(20, 1)],
        });
        let table = scene.table();
        assert_eq!(table.try_get_plane_by_id(PlaneId(10)).unwrap().extent, [1.0, 2.0]);
        assert!(table.try_get_mesh_by_id(MeshId(20)).is_ok());

        scene.commit(SceneSnapshot::default());
        let latest = scene.table();
        assert_eq!(
            latest.try_get_plane_by_id(PlaneId(10)),
            Err(XrError::NotFound { kind: "plane", id: 10 })
        );
        assert_eq!(
            latest.try_get_mesh_by_id(MeshId(20)),
            Err(XrError::NotFound { kind: "mesh", id: 20 })
        );
        // Older tables are snapshots and stay readable.
        assert!(table.try_get_plane_by_id(PlaneId(10)).is_ok());
    }

    #[test]
    fn polling_follows_the_update_interval() {
        let scene = SceneManager {
            options: SceneUnderstandingOptions {
                update_interval: 0.5,
                ..Default::default()
            },
            last_update: Some(1.0),
            table: Arc::new(SceneTable::default()),
        };
        assert!(!scene.is_due(1.25));
        assert!(scene.is_due(1.5));
        assert!(manager().is_due(0.0));
    }
}
