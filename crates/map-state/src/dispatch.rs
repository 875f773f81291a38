//! Marshalling of render-finished notifications onto the owning thread.
//!
//! The host lives on one thread. A renderer finishing elsewhere holds a
//! [`RenderSignal`] and calls [`RenderSignal::finished`]; the host applies
//! the notification the next time it pumps its dispatcher.

use std::thread::{self, ThreadId};

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMessage {
    RenderStarted,
    RenderFinished,
}

/// Cross-thread handle for reporting render progress to the host.
#[derive(Debug, Clone)]
pub struct RenderSignal {
    owner: ThreadId,
    tx: UnboundedSender<DispatchMessage>,
}

impl RenderSignal {
    /// True when called from the thread owning the host.
    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    pub fn started(&self) {
        self.send(DispatchMessage::RenderStarted);
    }

    pub fn finished(&self) {
        self.send(DispatchMessage::RenderFinished);
    }

    fn send(&self, message: DispatchMessage) {
        if !self.is_owner_thread() {
            trace!(?message, "Queueing notification from worker thread");
        }
        if self.tx.send(message).is_err() {
            debug!(?message, "Host dropped; render notification discarded");
        }
    }
}

/// Owning side of the queue, held by the host.
#[derive(Debug)]
pub struct Dispatcher {
    owner: ThreadId,
    tx: UnboundedSender<DispatchMessage>,
    rx: UnboundedReceiver<DispatchMessage>,
}

impl Dispatcher {
    /// A dispatcher owned by the calling thread.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            owner: thread::current().id(),
            tx,
            rx,
        }
    }

    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    pub fn check_access(&self) -> bool {
        thread::current().id() == self.owner
    }

    pub fn signal(&self) -> RenderSignal {
        RenderSignal {
            owner: self.owner,
            tx: self.tx.clone(),
        }
    }

    /// Take every queued message without blocking.
    pub fn drain(&mut self) -> Vec<DispatchMessage> {
        let mut messages = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(message) => messages.push(message),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        messages
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_from_worker_thread_is_queued() {
        let mut dispatcher = Dispatcher::new();
        let signal = dispatcher.signal();
        assert!(signal.is_owner_thread());

        let worker = thread::spawn(move || {
            assert!(!signal.is_owner_thread());
            signal.started();
            signal.finished();
        });
        worker.join().unwrap();

        assert_eq!(
            dispatcher.drain(),
            vec![DispatchMessage::RenderStarted, DispatchMessage::RenderFinished]
        );
        assert!(dispatcher.drain().is_empty());
    }

    #[test]
    fn test_check_access_only_on_owner_thread() {
        let dispatcher = Dispatcher::new();
        assert!(dispatcher.check_access());
        assert_eq!(dispatcher.owner(), thread::current().id());

        let dispatcher = thread::spawn(move || {
            assert!(!dispatcher.check_access());
            dispatcher
        })
        .join()
        .unwrap();

        assert!(dispatcher.check_access());
    }
}
