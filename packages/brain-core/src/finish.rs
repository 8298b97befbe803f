//! Single-fire completion channel
//!
//! An engine holds a [`FinishNotifier`] and the host holds the matching
//! [`FinishHandle`]. Sending consumes the underlying oneshot sender, so a
//! game can report its final score at most once. Stopping an engine drops
//! the sender and the handle reports [`FinishPoll::Aborted`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use serde::Serialize;

/// State of a game's completion as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "score", rename_all = "camelCase")]
pub enum FinishPoll {
    Pending,
    Finished(u32),
    Aborted,
}

/// Engine side of the channel
#[derive(Debug)]
pub struct FinishNotifier {
    sender: Option<oneshot::Sender<u32>>,
}

/// Host side of the channel
#[derive(Debug)]
pub struct FinishHandle {
    receiver: oneshot::Receiver<u32>,
    outcome: Option<FinishPoll>,
}

pub fn finish_channel() -> (FinishNotifier, FinishHandle) {
    let (sender, receiver) = oneshot::channel();
    (
        FinishNotifier {
            sender: Some(sender),
        },
        FinishHandle {
            receiver,
            outcome: None,
        },
    )
}

impl FinishNotifier {
    /// Deliver the final score. Returns `false` if a score was already sent
    /// or the channel was closed.
    pub fn notify(&mut self, score: u32) -> bool {
        match self.sender.take() {
            Some(sender) => sender.send(score).is_ok(),
            None => false,
        }
    }

    /// Close without a score
    pub fn abort(&mut self) {
        self.sender = None;
    }

    pub fn is_spent(&self) -> bool {
        self.sender.is_none()
    }
}

impl FinishHandle {
    /// Non-blocking check. Once terminal, the same answer is returned forever.
    pub fn poll_score(&mut self) -> FinishPoll {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        match self.receiver.try_recv() {
            Ok(Some(score)) => {
                self.outcome = Some(FinishPoll::Finished(score));
                FinishPoll::Finished(score)
            }
            Ok(None) => FinishPoll::Pending,
            Err(oneshot::Canceled) => {
                self.outcome = Some(FinishPoll::Aborted);
                FinishPoll::Aborted
            }
        }
    }

    pub fn score(&mut self) -> Option<u32> {
        match self.poll_score() {
            FinishPoll::Finished(score) => Some(score),
            _ => None,
        }
    }
}

/// Resolves to `Some(score)`, or `None` if the engine was stopped first
impl Future for FinishHandle {
    type Output = Option<u32>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.outcome {
            Some(FinishPoll::Finished(score)) => return Poll::Ready(Some(score)),
            Some(FinishPoll::Aborted) => return Poll::Ready(None),
            _ => {}
        }
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(score)) => {
                self.outcome = Some(FinishPoll::Finished(score));
                Poll::Ready(Some(score))
            }
            Poll::Ready(Err(oneshot::Canceled)) => {
                self.outcome = Some(FinishPoll::Aborted);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_delivered_once() {
        let (mut notifier, mut handle) = finish_channel();
        assert_eq!(handle.poll_score(), FinishPoll::Pending);

        assert!(notifier.notify(420));
        assert!(!notifier.notify(999), "second notify must be refused");
        assert!(notifier.is_spent());

        assert_eq!(handle.poll_score(), FinishPoll::Finished(420));
        assert_eq!(handle.poll_score(), FinishPoll::Finished(420));
        assert_eq!(handle.score(), Some(420));
    }

    #[test]
    fn test_abort_is_observed() {
        let (mut notifier, mut handle) = finish_channel();
        notifier.abort();
        assert!(!notifier.notify(10));
        assert_eq!(handle.poll_score(), FinishPoll::Aborted);
        assert_eq!(handle.score(), None);
    }

    #[test]
    fn test_dropped_engine_aborts() {
        let (notifier, mut handle) = finish_channel();
        drop(notifier);
        assert_eq!(handle.poll_score(), FinishPoll::Aborted);
    }

    #[test]
    fn test_handle_resolves_as_future() {
        let (mut notifier, handle) = finish_channel();
        notifier.notify(1200);
        assert_eq!(futures::executor::block_on(handle), Some(1200));
    }
}
