use super::device::MockXrDevice;
use super::MockCallLog;
use rust_xr_api::mock::{MockXrControlMsg, MockXrInit};
use rust_xr_api::{SessionCreateInfo, SessionType, XrDevice, XrError, XrResult, XrService};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

pub(crate) type MockReceiver = Arc<Mutex<Receiver<MockXrControlMsg>>>;

pub struct MockXrService {
    init: MockXrInit,
    receiver: Option<MockReceiver>,
    enabled_extensions: Option<Vec<String>>,
    calls: Option<MockCallLog>,
}

impl XrService for MockXrService {
    fn enumerate_extensions(&self) -> XrResult<Vec<String>> {
        Ok(self.init.extensions.clone())
    }

    fn initialize(&mut self, application_name: &str, extensions: &[String]) -> XrResult<()> {
        if let Some(missing) = extensions.iter().find(|name| !self.init.extensions.contains(*name)) {
            return Err(XrError::rejected("initialize", format!("unknown extension {}", missing)));
        }
        debug!("Mock XR runtime initialized for {} with {:?}", application_name, extensions);
        self.enabled_extensions = Some(extensions.to_vec());
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.init.available
    }

    fn is_session_supported(&self, session_type: SessionType) -> XrResult<bool> {
        if !self.init.available {
            return Err(XrError::RuntimeUnavailable("mock runtime disabled".into()));
        }
        Ok(self.init.session_types.contains(&session_type))
    }

    fn create_session(&mut self, info: &SessionCreateInfo) -> XrResult<Box<dyn XrDevice>> {
        let extensions = match self.enabled_extensions {
            Some(ref extensions) => extensions.clone(),
            None => return Err(XrError::NotInitialized),
        };
        if !self.init.session_types.contains(&info.session_type) {
            return Err(XrError::SessionTypeUnsupported(info.session_type));
        }
        let device = MockXrDevice::new(self.init.clone(), extensions, self.receiver.clone(), self.calls.clone());
        Ok(Box::new(device))
    }
}

impl MockXrService {
    pub fn new(init: MockXrInit) -> MockXrService {
        MockXrService {
            init,
            receiver: None,
            enabled_extensions: None,
            calls: None,
        }
    }

    pub fn new_with_receiver(rcv: Receiver<MockXrControlMsg>, init: MockXrInit) -> MockXrService {
        MockXrService {
            receiver: Some(Arc::new(Mutex::new(rcv))),
            ..MockXrService::new(init)
        }
    }

    pub fn with_call_log(self, calls: MockCallLog) -> MockXrService {
        MockXrService {
            calls: Some(calls),
            ..self
        }
    }
}
