mod device;
mod service;

use rust_xr_api::mock::{MockXrControlMsg, MockXrInit};
use rust_xr_api::{NativeAnchorHandle, NativeSpaceHandle, XrService, XrServiceCreator};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex};

/// Runtime calls the mock records, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockCall {
    EndFrame,
    EndSession,
    DestroySpatialAnchor(NativeAnchorHandle),
    DestroySpace(NativeSpaceHandle),
    DestroySession,
}

pub type MockCallLog = Arc<Mutex<Vec<MockCall>>>;

pub struct MockServiceCreator {
    init: MockXrInit,
}

impl MockServiceCreator {
    pub fn new() -> Box<dyn XrServiceCreator> {
        MockServiceCreator::with_init(MockXrInit::default())
    }

    pub fn with_init(init: MockXrInit) -> Box<dyn XrServiceCreator> {
        Box::new(MockServiceCreator { init })
    }

    /// A mock runtime driven through the returned sender. Messages apply to
    /// every session the service creates.
    pub fn new_service_with_remote(init: MockXrInit) -> (Box<dyn XrService>, Sender<MockXrControlMsg>) {
        let (send, rcv) = channel();
        let service = service::MockXrService::new_with_receiver(rcv, init);
        (Box::new(service), send)
    }

    /// Like `new_service_with_remote`, also recording the frame, session
    /// and release calls every session makes into the returned log.
    pub fn new_service_with_call_log(init: MockXrInit) -> (Box<dyn XrService>, Sender<MockXrControlMsg>, MockCallLog) {
        let (send, rcv) = channel();
        let calls = MockCallLog::default();
        let service = service::MockXrService::new_with_receiver(rcv, init).with_call_log(calls.clone());
        (Box::new(service), send, calls)
    }
}

impl XrServiceCreator for MockServiceCreator {
    fn new_service(&self) -> Box<dyn XrService> {
        Box::new(service::MockXrService::new(self.init.clone()))
    }
}
