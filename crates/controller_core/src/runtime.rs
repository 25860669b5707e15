//! Single-owner event loop around a [`Session`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    backend::BotBackend,
    config::ControllerSettings,
    events::{EventReceiver, EventSender, SessionEvent},
    session::Session,
    settings_store::CredentialStore,
    view::{render, SessionView},
};

/// Receives the rendered view after every handled event.
pub trait Presenter: Send {
    fn present(&mut self, view: &SessionView);
}

pub struct SessionRuntime<P> {
    session: Session,
    events: EventReceiver,
    presenter: P,
}

impl<P: Presenter> SessionRuntime<P> {
    /// Returns the runtime and the sender front-ends use to submit user intents.
    pub fn new(
        backend: Arc<dyn BotBackend>,
        store: Arc<dyn CredentialStore>,
        settings: &ControllerSettings,
        presenter: P,
    ) -> (Self, EventSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session::new(backend, store, settings, tx.clone());
        (
            Self {
                session,
                events: rx,
                presenter,
            },
            tx,
        )
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Hands the current state to the presenter without handling anything.
    pub fn present(&mut self) {
        let view = render(&self.session);
        self.presenter.present(&view);
    }

    pub fn dispatch(&mut self, event: SessionEvent) {
        self.session.handle(event);
        self.present();
    }

    /// Handles the next queued event. Returns `false` once the session should stop.
    pub async fn step(&mut self) -> bool {
        // The session holds a sender itself, so the queue never closes while it is alive.
        match self.events.recv().await {
            Some(event) => {
                self.dispatch(event);
                !self.session.should_quit()
            }
            None => {
                debug!("session event queue closed");
                false
            }
        }
    }

    pub async fn run(mut self) -> P {
        self.present();
        while self.step().await {}
        info!("session runtime stopped");
        self.presenter
    }
}
