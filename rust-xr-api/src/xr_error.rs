use crate::SessionType;

pub type XrResult<T> = Result<T, XrError>;

/// Failures surfaced by the XR core and by device runtimes.
///
/// Optional capability absence and tracking loss are not errors: they are
/// reported through capability flags and `SpaceLocation::tracked` /
/// `Anchor::is_valid` respectively.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum XrError {
    /// A required extension is not advertised by the runtime.
    #[error("Required extension not supported: {0}")]
    RequiredExtensionMissing(String),

    /// The device runtime could not be reached or loaded.
    #[error("XR runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("XR system is not initialized")]
    NotInitialized,

    #[error("Session type {0:?} is not supported by the runtime")]
    SessionTypeUnsupported(SessionType),

    /// The runtime refused an otherwise well formed request.
    #[error("{operation} rejected by the runtime: {reason}")]
    RuntimeRejected {
        operation: &'static str,
        reason: String,
    },

    #[error("XR session has been destroyed")]
    SessionDestroyed,

    /// Frame data was accessed after a newer frame was requested.
    #[error("Frame {frame} is stale, current frame is {current}")]
    StaleFrame { frame: u64, current: u64 },

    /// The identifier is absent from the latest committed snapshot.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    #[error("Invalid reference space type: {0:?}")]
    InvalidReferenceSpaceType(String),

    #[error("Invalid session type: {0:?}")]
    InvalidSessionType(String),

    /// The producing side of an `XrFuture` went away without resolving it.
    #[error("Asynchronous operation was abandoned before completing")]
    PromiseDropped,
}

impl XrError {
    pub fn rejected<E: ToString>(operation: &'static str, reason: E) -> XrError {
        XrError::RuntimeRejected {
            operation,
            reason: reason.to_string(),
        }
    }
}
