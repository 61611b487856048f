use crate::{
    GraphicsDeviceHandle, MockCallLog, MockServiceCreator, MockXrControlMsg, MockXrInit, Session,
    WindowHandle, XrServiceCreator, XrSystem,
};
use crate::{Frame, XrFuture};
use std::sync::mpsc::Sender;

pub(crate) fn uninitialized_system() -> XrSystem {
    XrSystem::new(MockServiceCreator::new().new_service())
}

pub(crate) fn mock_system(init: MockXrInit) -> (XrSystem, Sender<MockXrControlMsg>) {
    let (service, remote) = MockServiceCreator::new_service_with_remote(init);
    let mut system = XrSystem::new(service);
    system.initialize().unwrap();
    (system, remote)
}

fn create_session(system: &XrSystem) -> Session {
    let future: XrFuture<Session> = Session::create_async(system, GraphicsDeviceHandle(1), WindowHandle(1));
    future.block().unwrap()
}

pub(crate) fn mock_session(init: MockXrInit) -> (Session, Sender<MockXrControlMsg>) {
    let (system, remote) = mock_system(init);
    (create_session(&system), remote)
}

// A session whose runtime records frame, session and release calls.
pub(crate) fn mock_session_with_call_log(init: MockXrInit) -> (Session, Sender<MockXrControlMsg>, MockCallLog) {
    let (service, remote, calls) = MockServiceCreator::new_service_with_call_log(init);
    let mut system = XrSystem::new(service);
    system.initialize().unwrap();
    (create_session(&system), remote, calls)
}

pub(crate) fn next_frame(session: &Session) -> Frame {
    session.get_next_frame().frame.expect("the session should produce a frame")
}
