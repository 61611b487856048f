use crate::{Pose, Size, SwapchainImage, TextureFormat, TextureHandle};

pub const DEFAULT_DEPTH_NEAR_Z: f32 = 0.5;
pub const DEFAULT_DEPTH_FAR_Z: f32 = 1000.0;

// The field of view of a view, as four angles in radians measured from the
// view's forward axis. Left and down are usually negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct FieldOfView {
    pub angle_left: f32,
    pub angle_right: f32,
    pub angle_up: f32,
    pub angle_down: f32,
}

impl FieldOfView {
    pub fn from_degrees(left: f32, right: f32, up: f32, down: f32) -> FieldOfView {
        FieldOfView {
            angle_left: -left.to_radians(),
            angle_right: right.to_radians(),
            angle_up: up.to_radians(),
            angle_down: -down.to_radians(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum ViewKind {
    // One of the eyes of the primary stereo configuration.
    Primary,
    // A secondary view rendered for a spectator camera.
    FirstPersonObserver,
}

/// A view configuration as advertised by the runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct ViewConfiguration {
    pub kind: ViewKind,
    pub recommended_size: Size,
}

/// A view located by the runtime for a given display time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct LocatedView {
    pub kind: ViewKind,
    pub pose: Pose,
    pub field_of_view: FieldOfView,
}

/// Everything needed to render one view of a frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct View {
    pub kind: ViewKind,

    // Pose of the view in the frame's reference space.
    pub pose: Pose,

    pub field_of_view: FieldOfView,

    pub color_texture_format: TextureFormat,
    pub color_texture: TextureHandle,
    pub color_texture_size: Size,

    // Only populated when depth composition is enabled.
    pub depth_texture_format: TextureFormat,
    pub depth_texture: Option<TextureHandle>,
    pub depth_texture_size: Size,

    pub depth_near_z: f32,
    pub depth_far_z: f32,
}

impl Default for View {
    fn default() -> View {
        View {
            kind: ViewKind::Primary,
            pose: Pose::IDENTITY,
            field_of_view: FieldOfView::default(),
            color_texture_format: TextureFormat::Rgba8Srgb,
            color_texture: TextureHandle::NULL,
            color_texture_size: Size::default(),
            depth_texture_format: TextureFormat::D24S8,
            depth_texture: None,
            depth_texture_size: Size::default(),
            depth_near_z: DEFAULT_DEPTH_NEAR_Z,
            depth_far_z: DEFAULT_DEPTH_FAR_Z,
        }
    }
}

impl View {
    pub fn set_color(&mut self, image: SwapchainImage) {
        self.color_texture = image.texture;
        self.color_texture_format = image.format;
        self.color_texture_size = image.size;
    }

    pub fn set_depth(&mut self, image: SwapchainImage) {
        self.depth_texture = Some(image.texture);
        self.depth_texture_format = image.format;
        self.depth_texture_size = image.size;
    }
}
