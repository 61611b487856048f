#[cfg(any(test, feature = "mock"))]
mod mock;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::{MockCall, MockCallLog, MockServiceCreator};
