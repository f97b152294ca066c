//! Completion handles returned by `Tracker::track`.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::error::{Result, TrackingError};

pub(crate) type Responder = oneshot::Sender<Result<()>>;

/// Resolves once the batch carrying a tracked action has been sent.
///
/// The outcome is success when the bulk request got a status below 400 and
/// the shared batch error otherwise. If the batch is dropped without being
/// sent (for example on shutdown) the handle fails with
/// [`TrackingError::Abandoned`].
///
/// Async callers `.await` the handle; synchronous callers use
/// [`TrackingHandle::wait`] or poll with [`TrackingHandle::is_done`].
#[derive(Debug)]
#[must_use = "a tracking handle reports whether delivery succeeded"]
pub struct TrackingHandle {
    state: State,
}

#[derive(Debug)]
enum State {
    Pending(oneshot::Receiver<Result<()>>),
    Done(Result<()>),
}

impl TrackingHandle {
    pub(crate) fn channel() -> (Responder, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { state: State::Pending(rx) })
    }

    /// A handle that has already succeeded.
    pub fn completed() -> Self {
        Self { state: State::Done(Ok(())) }
    }

    /// Returns `true` once an outcome is available.
    pub fn is_done(&mut self) -> bool {
        self.try_outcome().is_some()
    }

    /// Returns `true` once the handle has resolved to an error.
    pub fn is_failed(&mut self) -> bool {
        matches!(self.try_outcome(), Some(Err(_)))
    }

    /// The outcome, if already known. Never blocks.
    pub fn try_outcome(&mut self) -> Option<&Result<()>> {
        if let State::Pending(rx) = &mut self.state {
            match rx.try_recv() {
                Ok(outcome) => self.state = State::Done(outcome),
                Err(TryRecvError::Closed) => self.state = State::Done(Err(TrackingError::Abandoned)),
                Err(TryRecvError::Empty) => return None,
            }
        }
        match &self.state {
            State::Done(outcome) => Some(outcome),
            State::Pending(_) => None,
        }
    }

    /// Blocks the current thread until the outcome is known.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context;
    /// `.await` the handle there instead.
    pub fn wait(self) -> Result<()> {
        match self.state {
            State::Pending(rx) => rx.blocking_recv().unwrap_or(Err(TrackingError::Abandoned)),
            State::Done(outcome) => outcome,
        }
    }
}

impl Future for TrackingHandle {
    type Output = Result<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            State::Pending(rx) => {
                let outcome = match Pin::new(rx).poll(cx) {
                    Poll::Ready(received) => received.unwrap_or(Err(TrackingError::Abandoned)),
                    Poll::Pending => return Poll::Pending,
                };
                this.state = State::Done(outcome.clone());
                Poll::Ready(outcome)
            },
            State::Done(outcome) => Poll::Ready(outcome.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_handle_is_done() {
        let mut handle = TrackingHandle::completed();

        assert!(handle.is_done());
        assert!(!handle.is_failed());
        assert_eq!(handle.wait(), Ok(()));
    }

    #[test]
    fn pending_until_responded() {
        let (tx, mut handle) = TrackingHandle::channel();
        assert!(!handle.is_done());

        tx.send(Err(TrackingError::delivery_failed(500))).unwrap();

        assert!(handle.is_done());
        assert!(handle.is_failed());
        assert_eq!(handle.wait(), Err(TrackingError::delivery_failed(500)));
    }

    #[test]
    fn dropped_responder_abandons() {
        let (tx, mut handle) = TrackingHandle::channel();
        drop(tx);

        assert!(handle.is_failed());
        assert_eq!(handle.try_outcome(), Some(&Err(TrackingError::Abandoned)));
    }

    #[tokio::test]
    async fn awaits_outcome() {
        let (tx, handle) = TrackingHandle::channel();
        tokio::spawn(async move {
            let _ = tx.send(Ok(()));
        });

        assert_eq!(handle.await, Ok(()));
    }

    #[tokio::test]
    async fn awaiting_dropped_responder_abandons() {
        let (tx, handle) = TrackingHandle::channel();
        drop(tx);

        assert_eq!(handle.await, Err(TrackingError::Abandoned));
    }
}
