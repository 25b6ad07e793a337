//! Background worker threads.
//!
//! Both workers poll their input with a short timeout so a shutdown request
//! is noticed even when no messages arrive.

use std::sync::mpsc;
use std::thread;

use tracing::warn;

pub mod publish_worker;
pub mod subscription_worker;

pub use publish_worker::BackgroundPublisher;
pub use subscription_worker::SubscriptionWorker;

/// Owner of one named worker thread.
#[derive(Debug)]
pub struct WorkerHandle {
    name: &'static str,
    stop: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    pub(crate) fn new(name: &'static str, stop: mpsc::Sender<()>, thread: thread::JoinHandle<()>) -> Self {
        Self {
            name,
            stop,
            thread: Some(thread),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Signal the worker and block until its thread has exited.
    pub fn shutdown(mut self) {
        // A worker that already exited has dropped its receiver.
        let _ = self.stop.send(());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!(worker = self.name, "worker thread panicked");
            }
        }
    }
}
