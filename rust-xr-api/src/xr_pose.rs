use euclid::{RigidTransform3D, Rotation3D, UnknownUnit, Vector3D};

pub type RigidTransform = RigidTransform3D<f32, UnknownUnit, UnknownUnit>;

// A rigid transform: position in meters plus orientation as a unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct Pose {
    // Position as a 3D vector.
    pub position: [f32; 3],

    // Orientation quaternion as [x, y, z, w].
    pub orientation: [f32; 4],
}

impl Default for Pose {
    fn default() -> Pose {
        Pose::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: [0.0, 0.0, 0.0],
        orientation: [0.0, 0.0, 0.0, 1.0],
    };

    pub fn new(position: [f32; 3], orientation: [f32; 4]) -> Pose {
        Pose { position, orientation }
    }

    pub fn from_translation(x: f32, y: f32, z: f32) -> Pose {
        Pose {
            position: [x, y, z],
            ..Pose::IDENTITY
        }
    }

    pub fn to_rigid(&self) -> RigidTransform {
        let [x, y, z, w] = self.orientation;
        let [px, py, pz] = self.position;
        RigidTransform3D::new(
            Rotation3D::quaternion(x, y, z, w).normalize(),
            Vector3D::new(px, py, pz),
        )
    }

    pub fn from_rigid(transform: &RigidTransform) -> Pose {
        let rotation = &transform.rotation;
        let translation = &transform.translation;
        Pose {
            position: [translation.x, translation.y, translation.z],
            orientation: [rotation.i, rotation.j, rotation.k, rotation.r],
        }
    }

    /// Returns the pose of `local` (expressed relative to `self`) in the space
    /// `self` is expressed in.
    pub fn compose(&self, local: &Pose) -> Pose {
        Pose::from_rigid(&local.to_rigid().then(&self.to_rigid()))
    }

    pub fn inverse(&self) -> Pose {
        Pose::from_rigid(&self.to_rigid().inverse())
    }

    pub fn approx_eq(&self, other: &Pose, epsilon: f32) -> bool {
        let close = |a: &[f32], b: &[f32]| a.iter().zip(b).all(|(a, b)| (a - b).abs() <= epsilon);
        // q and -q describe the same orientation.
        let negated = other.orientation.map(|c| -c);
        close(&self.position, &other.position)
            && (close(&self.orientation, &other.orientation) || close(&self.orientation, &negated))
    }
}

/// The result of resolving a space at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct SpaceLocation {
    pub pose: Pose,

    /// false when the runtime could not locate the space this frame, in which
    /// case `pose` is the last known one.
    pub tracked: bool,
}
