use crate::{SessionCreateInfo, SessionType, XrDevice, XrResult};

/// Instance level entry point of a device runtime.
pub trait XrService: Send {
    /// Names of every extension the runtime advertises.
    /// Must be deterministic for the lifetime of the service.
    fn enumerate_extensions(&self) -> XrResult<Vec<String>>;

    /// Connects to the runtime with the given extensions enabled.
    fn initialize(&mut self, application_name: &str, extensions: &[String]) -> XrResult<()>;

    fn is_available(&self) -> bool;

    /// Whether a session of the given type could be created. Valid before
    /// `initialize` has been called.
    fn is_session_supported(&self, session_type: SessionType) -> XrResult<bool>;

    /// Creates a runtime session. The returned device is exclusively owned by
    /// the caller and released through `XrDevice::destroy_session`.
    fn create_session(&mut self, info: &SessionCreateInfo) -> XrResult<Box<dyn XrDevice>>;
}

pub trait XrServiceCreator {
    fn new_service(&self) -> Box<dyn XrService>;
}
