use rust_xr_api::{XrError, XrResult};
use std::collections::HashSet;

pub const KHR_D3D11_ENABLE: &str = "XR_KHR_D3D11_enable";
pub const KHR_OPENGL_ENABLE: &str = "XR_KHR_opengl_enable";
pub const KHR_OPENGL_ES_ENABLE: &str = "XR_KHR_opengl_es_enable";
pub const KHR_VULKAN_ENABLE2: &str = "XR_KHR_vulkan_enable2";
pub const KHR_COMPOSITION_LAYER_DEPTH: &str = "XR_KHR_composition_layer_depth";
pub const MSFT_UNBOUNDED_REFERENCE_SPACE: &str = "XR_MSFT_unbounded_reference_space";
pub const MSFT_SPATIAL_ANCHOR: &str = "XR_MSFT_spatial_anchor";
pub const MSFT_SECONDARY_VIEW_CONFIGURATION: &str = "XR_MSFT_secondary_view_configuration";
pub const MSFT_FIRST_PERSON_OBSERVER: &str = "XR_MSFT_first_person_observer";
pub const MSFT_SCENE_UNDERSTANDING: &str = "XR_MSFT_scene_understanding";

/// The graphics API the renderer will submit textures with. Decides which
/// binding extension is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum GraphicsApi {
    D3D11,
    OpenGl,
    OpenGlEs,
    Vulkan,
}

impl GraphicsApi {
    pub fn required_extensions(&self) -> &'static [&'static str] {
        match *self {
            GraphicsApi::D3D11 => &[KHR_D3D11_ENABLE],
            GraphicsApi::OpenGl => &[KHR_OPENGL_ENABLE],
            GraphicsApi::OpenGlEs => &[KHR_OPENGL_ES_ENABLE],
            GraphicsApi::Vulkan => &[KHR_VULKAN_ENABLE2],
        }
    }
}

impl Default for GraphicsApi {
    fn default() -> GraphicsApi {
        GraphicsApi::D3D11
    }
}

/// The extensions negotiated with the runtime. Immutable once built.
#[derive(Debug, Clone)]
pub struct XrCapabilities {
    advertised: HashSet<String>,
    enabled: Vec<String>,
    enabled_set: HashSet<String>,
    depth: bool,
    unbounded_reference_space: bool,
    spatial_anchor: bool,
    secondary_view_configuration: bool,
    first_person_observer: bool,
    scene_understanding: bool,
}

impl XrCapabilities {
    /// Enables every required extension, failing if one is not advertised,
    /// then each optional extension the runtime advertises.
    pub fn negotiate<S: AsRef<str>>(advertised: &[S], required: &[&str]) -> XrResult<XrCapabilities> {
        let mut caps = XrCapabilities {
            advertised: advertised.iter().map(|name| name.as_ref().to_owned()).collect(),
            enabled: Vec::new(),
            enabled_set: HashSet::new(),
            depth: false,
            unbounded_reference_space: false,
            spatial_anchor: false,
            secondary_view_configuration: false,
            first_person_observer: false,
            scene_understanding: false,
        };

        for name in required {
            if !caps.try_enable(name) {
                error!("Required extension {} not supported", name);
                return Err(XrError::RequiredExtensionMissing(name.to_string()));
            }
        }

        caps.depth = caps.try_enable(KHR_COMPOSITION_LAYER_DEPTH);
        caps.unbounded_reference_space = caps.try_enable(MSFT_UNBOUNDED_REFERENCE_SPACE);
        caps.spatial_anchor = caps.try_enable(MSFT_SPATIAL_ANCHOR);
        caps.secondary_view_configuration = caps.try_enable(MSFT_SECONDARY_VIEW_CONFIGURATION);
        caps.first_person_observer = caps.try_enable(MSFT_FIRST_PERSON_OBSERVER);
        caps.scene_understanding = caps.try_enable(MSFT_SCENE_UNDERSTANDING);

        debug!("Enabled XR extensions: {:?}", caps.enabled);
        Ok(caps)
    }

    fn try_enable(&mut self, name: &str) -> bool {
        if self.enabled_set.contains(name) {
            return true;
        }
        if !self.advertised.contains(name) {
            return false;
        }
        self.enabled.push(name.to_owned());
        self.enabled_set.insert(name.to_owned());
        true
    }

    pub fn is_extension_supported(&self, name: &str) -> bool {
        self.enabled_set.contains(name)
    }

    /// Enabled extension names, in the order they were enabled.
    pub fn enabled_extensions(&self) -> &[String] {
        &self.enabled
    }

    pub fn depth_supported(&self) -> bool {
        self.depth
    }

    pub fn unbounded_reference_space_supported(&self) -> bool {
        self.unbounded_reference_space
    }

    pub fn spatial_anchor_supported(&self) -> bool {
        self.spatial_anchor
    }

    pub fn secondary_view_configuration_supported(&self) -> bool {
        self.secondary_view_configuration
    }

    pub fn first_person_observer_supported(&self) -> bool {
        self.first_person_observer
    }

    /// Observer views need both the secondary view configuration and the
    /// first person observer extension.
    pub fn observer_views_supported(&self) -> bool {
        self.secondary_view_configuration && self.first_person_observer
    }

    pub fn scene_understanding_supported(&self) -> bool {
        self.scene_understanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_OPTIONAL: [&str; 6] = [
        KHR_COMPOSITION_LAYER_DEPTH,
        MSFT_UNBOUNDED_REFERENCE_SPACE,
        MSFT_SPATIAL_ANCHOR,
        MSFT_SECONDARY_VIEW_CONFIGURATION,
        MSFT_FIRST_PERSON_OBSERVER,
        MSFT_SCENE_UNDERSTANDING,
    ];

    fn flags(caps: &XrCapabilities) -> [bool; 6] {
        [
            caps.depth_supported(),
            caps.unbounded_reference_space_supported(),
            caps.spatial_anchor_supported(),
            caps.secondary_view_configuration_supported(),
            caps.first_person_observer_supported(),
            caps.scene_understanding_supported(),
        ]
    }

    #[test]
    fn missing_required_extension_fails() {
        let advertised = [KHR_OPENGL_ENABLE, KHR_COMPOSITION_LAYER_DEPTH];
        let result = XrCapabilities::negotiate(&advertised, GraphicsApi::D3D11.required_extensions());
        assert_eq!(result.unwrap_err(), XrError::RequiredExtensionMissing(KHR_D3D11_ENABLE.into()));
    }

    #[test]
    fn each_optional_flag_matches_advertised_support() {
        for (index, missing) in ALL_OPTIONAL.iter().enumerate() {
            let mut advertised = vec![KHR_D3D11_ENABLE];
            advertised.extend(ALL_OPTIONAL.iter().filter(|name| *name != missing));
            let caps = XrCapabilities::negotiate(&advertised, &[KHR_D3D11_ENABLE]).unwrap();
            let flags = flags(&caps);
            for (flag_index, flag) in flags.iter().enumerate() {
                assert_eq!(*flag, flag_index != index, "while {} is missing", missing);
            }
            assert!(!caps.is_extension_supported(missing));
        }
    }

    #[test]
    fn flags_do_not_depend_on_advertised_order() {
        let mut advertised = vec![MSFT_SPATIAL_ANCHOR, KHR_OPENGL_ENABLE, KHR_COMPOSITION_LAYER_DEPTH];
        let forward = XrCapabilities::negotiate(&advertised, &[KHR_OPENGL_ENABLE]).unwrap();
        advertised.reverse();
        let backward = XrCapabilities::negotiate(&advertised, &[KHR_OPENGL_ENABLE]).unwrap();
        assert_eq!(flags(&forward), flags(&backward));
    }

    #[test]
    fn enabling_twice_does_not_duplicate() {
        let advertised = [KHR_VULKAN_ENABLE2, KHR_COMPOSITION_LAYER_DEPTH];
        let required = [KHR_VULKAN_ENABLE2, KHR_COMPOSITION_LAYER_DEPTH];
        let caps = XrCapabilities::negotiate(&advertised, &required).unwrap();
        assert_eq!(caps.enabled_extensions(), &[KHR_VULKAN_ENABLE2.to_string(), KHR_COMPOSITION_LAYER_DEPTH.to_string()]);
        assert!(caps.depth_supported());
    }

    #[test]
    fn unknown_extensions_are_not_enabled() {
        let advertised = [KHR_D3D11_ENABLE, "XR_EXT_hand_tracking"];
        let caps = XrCapabilities::negotiate(&advertised, &[KHR_D3D11_ENABLE]).unwrap();
        assert!(!caps.is_extension_supported("XR_EXT_hand_tracking"));
        assert_eq!(flags(&caps), [false; 6]);
    }
}
