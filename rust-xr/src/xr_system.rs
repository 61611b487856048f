use crate::lock;
use crate::xr_capabilities::{GraphicsApi, XrCapabilities};
use rust_xr_api::{SessionType, XrError, XrFuture, XrResult, XrService};
use std::sync::{Arc, Mutex};
use std::thread;

#[cfg(feature = "mock")]
use crate::api::MockServiceCreator;
#[cfg(feature = "mock")]
use rust_xr_api::XrServiceCreator;

pub type XrServicePtr = Arc<Mutex<Box<dyn XrService>>>;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct XrSystemConfig {
    // Reported to the runtime when connecting.
    pub application_name: String,
    pub graphics_api: GraphicsApi,
}

impl Default for XrSystemConfig {
    fn default() -> XrSystemConfig {
        XrSystemConfig {
            application_name: "OpenXR Experience".into(),
            graphics_api: GraphicsApi::default(),
        }
    }
}

/// Single entry point to the device runtime: negotiates extensions once and
/// hands out sessions.
pub struct XrSystem {
    service: XrServicePtr,
    config: XrSystemConfig,
    initialized: Option<XrResult<Arc<XrCapabilities>>>,
}

impl XrSystem {
    pub fn new(service: Box<dyn XrService>) -> XrSystem {
        XrSystem::with_config(service, XrSystemConfig::default())
    }

    pub fn with_config(service: Box<dyn XrService>, config: XrSystemConfig) -> XrSystem {
        XrSystem {
            service: Arc::new(Mutex::new(service)),
            config,
            initialized: None,
        }
    }

    // System backed by the mock runtime
    // Useful for testing
    #[cfg(feature = "mock")]
    pub fn new_mock() -> XrSystem {
        XrSystem::new(MockServiceCreator::new().new_service())
    }

    /// Connects to the runtime with every required extension and each
    /// supported optional one enabled. Only the first call does any work;
    /// a failure is returned again by every later call.
    pub fn initialize(&mut self) -> XrResult<()> {
        if let Some(ref result) = self.initialized {
            return result.clone().map(|_| ());
        }

        let result = self.connect();
        if let Err(ref err) = result {
            error!("Error initializing XR system: {}", err);
        }
        self.initialized = Some(result.clone());
        result.map(|_| ())
    }

    pub fn try_initialize(&mut self) -> bool {
        self.initialize().is_ok()
    }

    fn connect(&self) -> XrResult<Arc<XrCapabilities>> {
        let mut service = lock(&self.service);
        if !service.is_available() {
            return Err(XrError::RuntimeUnavailable("no XR runtime installed".into()));
        }
        let advertised = service.enumerate_extensions()?;
        let capabilities = XrCapabilities::negotiate(&advertised, self.config.graphics_api.required_extensions())?;
        service.initialize(&self.config.application_name, capabilities.enabled_extensions())?;
        info!("XR system initialized for {}", self.config.application_name);
        Ok(Arc::new(capabilities))
    }

    pub fn is_initialized(&self) -> bool {
        match self.initialized {
            Some(Ok(_)) => true,
            _ => false,
        }
    }

    /// The negotiated capabilities, once initialization has succeeded.
    pub fn capabilities(&self) -> Option<Arc<XrCapabilities>> {
        match self.initialized {
            Some(Ok(ref capabilities)) => Some(capabilities.clone()),
            _ => None,
        }
    }

    pub fn config(&self) -> &XrSystemConfig {
        &self.config
    }

    /// Asks the runtime whether it can create sessions of `session_type`.
    /// Does not need an initialized system.
    pub fn is_session_supported_async(&self, session_type: SessionType) -> XrFuture<bool> {
        let service = self.service.clone();
        let (mut promise, future) = XrFuture::blocked();
        let spawned = thread::Builder::new()
            .name("XrSupportQuery".into())
            .spawn(move || {
                let result = lock(&service).is_session_supported(session_type);
                let _ = promise.complete(result);
            });
        match spawned {
            Ok(_) => future,
            Err(err) => XrFuture::rejected(XrError::rejected("is_session_supported", err)),
        }
    }

    pub(crate) fn service(&self) -> XrServicePtr {
        self.service.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::uninitialized_system;
    use crate::{MockServiceCreator, MockXrInit, KHR_D3D11_ENABLE, KHR_OPENGL_ENABLE, KHR_VULKAN_ENABLE2};

    fn system_with(init: MockXrInit, config: XrSystemConfig) -> XrSystem {
        let (service, _remote) = MockServiceCreator::new_service_with_remote(init);
        XrSystem::with_config(service, config)
    }

    #[test]
    fn default_config() {
        let config = XrSystemConfig::default();
        assert_eq!(config.application_name, "OpenXR Experience");
        assert_eq!(config.graphics_api, GraphicsApi::D3D11);
    }

    #[test]
    fn initialize_negotiates_capabilities() {
        let mut system = uninitialized_system();
        assert!(!system.is_initialized());
        assert!(system.capabilities().is_none());
        assert!(system.try_initialize());
        assert!(system.is_initialized());
        let capabilities = system.capabilities().unwrap();
        assert!(capabilities.is_extension_supported(KHR_D3D11_ENABLE));
        assert!(capabilities.depth_supported());
        // One-shot.
        assert!(system.try_initialize());
        assert!(Arc::ptr_eq(&capabilities, &system.capabilities().unwrap()));
    }

    #[test]
    fn missing_graphics_binding_fails_initialization() {
        let config = XrSystemConfig {
            graphics_api: GraphicsApi::Vulkan,
            ..XrSystemConfig::default()
        };
        let mut system = system_with(MockXrInit::default(), config);
        let expected = XrError::RequiredExtensionMissing(KHR_VULKAN_ENABLE2.into());
        assert_eq!(system.initialize(), Err(expected.clone()));
        assert!(!system.is_initialized());
        // The failure is sticky.
        assert_eq!(system.initialize(), Err(expected));
    }

    #[test]
    fn required_extension_is_taken_from_the_graphics_api() {
        let config = XrSystemConfig {
            graphics_api: GraphicsApi::OpenGl,
            ..XrSystemConfig::default()
        };
        let init = MockXrInit::default().without_extension(KHR_D3D11_ENABLE);
        let mut system = system_with(init, config);
        assert_eq!(system.initialize(), Ok(()));
        assert!(system.capabilities().unwrap().is_extension_supported(KHR_OPENGL_ENABLE));
    }

    #[test]
    fn unavailable_runtime_fails_initialization() {
        let init = MockXrInit {
            available: false,
            ..MockXrInit::default()
        };
        let mut system = system_with(init, XrSystemConfig::default());
        match system.initialize() {
            Err(XrError::RuntimeUnavailable(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn session_support_is_queried_without_initialization() {
        let system = uninitialized_system();
        assert_eq!(system.is_session_supported_async(SessionType::ImmersiveVr).block(), Ok(true));
        assert_eq!(system.is_session_supported_async(SessionType::ImmersiveAr).block(), Ok(false));
        let answer = system
            .is_session_supported_async(SessionType::Inline)
            .map(|supported| if supported { "yes" } else { "no" });
        assert_eq!(answer.block(), Ok("yes"));
    }

    #[test]
    fn session_support_fails_on_missing_runtime() {
        let init = MockXrInit {
            available: false,
            ..MockXrInit::default()
        };
        let system = system_with(init, XrSystemConfig::default());
        assert!(system.is_session_supported_async(SessionType::ImmersiveVr).block().is_err());
    }
}
