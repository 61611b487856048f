use crate::TextureHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum TextureFormat {
    Rgba8Srgb,
    Bgra8Srgb,
    D24S8,
}

impl Default for TextureFormat {
    fn default() -> TextureFormat {
        TextureFormat::Rgba8Srgb
    }
}

// Pixel dimensions of a texture or view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Size {
        Size { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapchainKind {
    Color,
    Depth,
}

/// A swapchain image acquired from the runtime for one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct SwapchainImage {
    pub texture: TextureHandle,
    pub format: TextureFormat,
    pub size: Size,
}
