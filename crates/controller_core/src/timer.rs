//! One-shot timer that can be re-armed or cancelled.
//!
//! Each `schedule` hands out a ticket. Aborting a tokio task does not pull back an event that
//! the task already queued, so the receiver asks [`CancelableTimer::fire`] whether a tick's
//! ticket is still the armed one before acting on it.

use std::time::Duration;

use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};

#[derive(Debug, Default)]
pub struct CancelableTimer {
    handle: Option<JoinHandle<()>>,
    generation: u64,
    armed: bool,
}

impl CancelableTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer, replacing any pending tick. `make_event` receives the new ticket.
    pub fn schedule<E, F>(&mut self, delay: Duration, tx: &UnboundedSender<E>, make_event: F) -> u64
    where
        E: Send + 'static,
        F: FnOnce(u64) -> E + Send + 'static,
    {
        self.abort_pending();
        self.generation += 1;
        self.armed = true;

        let ticket = self.generation;
        let tx = tx.clone();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(make_event(ticket));
        }));
        ticket
    }

    pub fn cancel(&mut self) {
        self.abort_pending();
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Consumes the armed tick when `ticket` is current. Stale tickets return `false`.
    pub fn fire(&mut self, ticket: u64) -> bool {
        if self.armed && ticket == self.generation {
            self.armed = false;
            self.handle = None;
            true
        } else {
            false
        }
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for CancelableTimer {
    fn drop(&mut self) {
        self.abort_pending();
    }
}
