// Opaque tokens for objects owned by the device runtime or the graphics
// layer. The core only compares and forwards them, it never dereferences.

macro_rules! native_handle {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        #[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
        pub struct $name(pub u64);

        impl $name {
            pub const NULL: $name = $name(0);

            pub fn is_null(&self) -> bool {
                self.0 == 0
            }
        }
    };
}

native_handle!(
    /// A color or depth swapchain image handed to the renderer.
    TextureHandle
);
native_handle!(NativeSessionHandle);
native_handle!(NativeSpaceHandle);
native_handle!(
    /// A spatial anchor, either created by the session or supplied by the caller.
    NativeAnchorHandle
);
native_handle!(
    /// Something a hit test ray intersected, such as a detected plane.
    NativeTrackableHandle
);
native_handle!(GraphicsDeviceHandle);
native_handle!(WindowHandle);
