use crate::{XrError, XrResult};
use std::mem;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;

enum State<T, U> {
    Resolved(T),
    Blocked(U),
    Taken,
}

/// The result of an asynchronous XR operation (session creation, support
/// queries). Either already resolved, or waiting on the matching `XrPromise`.
pub struct XrFuture<T>(State<XrResult<T>, Receiver<XrResult<T>>>);

/// The completing side of an `XrFuture`.
pub struct XrPromise<T>(State<(), Sender<XrResult<T>>>);

impl<T> XrFuture<T> {
    pub fn resolved(value: T) -> XrFuture<T> {
        XrFuture(State::Resolved(Ok(value)))
    }

    pub fn rejected(error: XrError) -> XrFuture<T> {
        XrFuture(State::Resolved(Err(error)))
    }

    pub fn blocked() -> (XrPromise<T>, XrFuture<T>) {
        let (send, recv) = channel();
        (
            XrPromise(State::Blocked(send)),
            XrFuture(State::Blocked(recv)),
        )
    }

    /// Suspends the calling thread until the operation completes.
    pub fn block(self) -> XrResult<T> {
        match self {
            XrFuture(State::Resolved(result)) => result,
            XrFuture(State::Blocked(recv)) => recv.recv().unwrap_or(Err(XrError::PromiseDropped)),
            XrFuture(State::Taken) => Err(XrError::PromiseDropped),
        }
    }

    /// Takes the result if the operation has completed, without blocking.
    /// Returns `None` while the operation is pending and once the result
    /// has been taken.
    pub fn try_take(&mut self) -> Option<XrResult<T>> {
        if let State::Blocked(ref recv) = self.0 {
            match recv.try_recv() {
                Ok(result) => self.0 = State::Resolved(result),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => self.0 = State::Resolved(Err(XrError::PromiseDropped)),
            }
        }
        match mem::replace(&mut self.0, State::Taken) {
            State::Resolved(result) => Some(result),
            _ => None,
        }
    }
}

impl<T: Send + 'static> XrFuture<T> {
    /// Chains a continuation onto the result. A pending future is awaited on
    /// a helper thread so the caller never blocks.
    pub fn map<U, F>(self, f: F) -> XrFuture<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        match self {
            XrFuture(State::Resolved(result)) => XrFuture(State::Resolved(result.map(f))),
            pending => {
                let (mut promise, future) = XrFuture::blocked();
                thread::spawn(move || {
                    let _ = promise.complete(pending.block().map(f));
                });
                future
            }
        }
    }
}

impl<T> XrPromise<T> {
    pub fn resolve(&mut self, value: T) -> Result<(), ()> {
        self.complete(Ok(value))
    }

    pub fn reject(&mut self, error: XrError) -> Result<(), ()> {
        self.complete(Err(error))
    }

    /// Completes the future. A promise can be completed only once; a future
    /// that has already been dropped is not an error.
    pub fn complete(&mut self, result: XrResult<T>) -> Result<(), ()> {
        match self.0 {
            State::Blocked(ref send) => {
                let _ = send.send(result);
            }
            _ => return Err(()),
        };
        self.0 = State::Resolved(());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_future_blocks_without_waiting() {
        assert_eq!(XrFuture::resolved(7).block(), Ok(7));
    }

    #[test]
    fn promise_resolves_from_another_thread() {
        let (mut promise, future) = XrFuture::blocked();
        let worker = thread::spawn(move || promise.resolve(String::from("ready")));
        assert_eq!(future.block(), Ok(String::from("ready")));
        assert_eq!(worker.join().unwrap(), Ok(()));
    }

    #[test]
    fn promise_completes_only_once() {
        let (mut promise, _future) = XrFuture::<u32>::blocked();
        assert_eq!(promise.resolve(1), Ok(()));
        assert_eq!(promise.reject(XrError::SessionDestroyed), Err(()));
    }

    #[test]
    fn dropped_promise_rejects_future() {
        let (promise, future) = XrFuture::<u32>::blocked();
        drop(promise);
        assert_eq!(future.block(), Err(XrError::PromiseDropped));
    }

    #[test]
    fn try_take_reports_pending_then_result_once() {
        let (mut promise, mut future) = XrFuture::blocked();
        assert!(future.try_take().is_none());
        promise.resolve(3).unwrap();
        assert_eq!(future.try_take(), Some(Ok(3)));
        assert!(future.try_take().is_none());
    }

    #[test]
    fn map_chains_on_pending_future() {
        let (mut promise, future) = XrFuture::blocked();
        let doubled = future.map(|value: u32| value * 2);
        promise.resolve(21).unwrap();
        assert_eq!(doubled.block(), Ok(42));
    }

    #[test]
    fn map_keeps_failure() {
        let future = XrFuture::<u32>::rejected(XrError::NotInitialized).map(|v| v + 1);
        assert_eq!(future.block(), Err(XrError::NotInitialized));
    }
}
