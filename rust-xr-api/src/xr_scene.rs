use crate::{FieldOfView, Pose};

macro_rules! scene_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
        pub struct $name(pub u64);
    };
}

// Identifiers are assigned by the runtime and only meaningful within a session.
scene_id!(SceneObjectId);
scene_id!(PlaneId);
scene_id!(MeshId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum SceneObjectKind {
    Unknown,
    Background,
    Wall,
    Floor,
    Ceiling,
    Platform,
    Inferred,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct SceneObject {
    pub id: SceneObjectId,
    pub kind: SceneObjectKind,
    pub pose: Pose,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct Plane {
    pub id: PlaneId,
    pub parent: SceneObjectId,
    // Center of the plane; the plane lies in its local xy plane.
    pub pose: Pose,
    // Width and height in meters.
    pub extent: [f32; 2],
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct Mesh {
    pub id: MeshId,
    pub parent: SceneObjectId,
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

/// Everything the runtime detected inside the detection volume at one time.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct SceneSnapshot {
    pub objects: Vec<SceneObject>,
    pub planes: Vec<Plane>,
    pub meshes: Vec<Mesh>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct Frustum {
    pub pose: Pose,
    pub field_of_view: FieldOfView,
    pub far_distance: f32,
}

/// The volume scene understanding looks for objects in.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum DetectionBoundary {
    Sphere { radius: f32 },
    Frustum(Frustum),
    Box { pose: Pose, extents: [f32; 3] },
}

impl Default for DetectionBoundary {
    fn default() -> DetectionBoundary {
        DetectionBoundary::Sphere { radius: 5.0 }
    }
}
