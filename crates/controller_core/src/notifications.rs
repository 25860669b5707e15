//! Single-slot transient notification with auto-dismiss.

use std::time::Duration;

use crate::{
    events::{EventSender, SessionEvent},
    timer::CancelableTimer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Error => "Error",
            Self::Info => "Info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPhase {
    Visible,
    Exiting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub phase: NotificationPhase,
}

#[derive(Debug)]
pub struct Notifications {
    current: Option<Notification>,
    next_id: u64,
    display: Duration,
    exit: Duration,
    timer: CancelableTimer,
}

impl Notifications {
    pub fn new(display: Duration, exit: Duration) -> Self {
        Self {
            current: None,
            next_id: 0,
            display,
            exit,
            timer: CancelableTimer::new(),
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    /// Replaces whatever is showing; the replaced notification's timer dies with it.
    pub fn show(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        events: &EventSender,
    ) -> u64 {
        self.next_id += 1;
        self.current = Some(Notification {
            id: self.next_id,
            kind,
            message: message.into(),
            phase: NotificationPhase::Visible,
        });
        self.timer.schedule(self.display, events, |ticket| {
            SessionEvent::NotificationTimer { ticket }
        });
        self.next_id
    }

    /// Visible -> Exiting -> gone, one step per live tick.
    pub fn on_timer(&mut self, ticket: u64, events: &EventSender) {
        if !self.timer.fire(ticket) {
            return;
        }
        let visible = self
            .current
            .as_ref()
            .is_some_and(|notification| notification.phase == NotificationPhase::Visible);
        if !visible {
            self.current = None;
            return;
        }
        if let Some(notification) = self.current.as_mut() {
            notification.phase = NotificationPhase::Exiting;
        }
        self.timer.schedule(self.exit, events, |ticket| {
            SessionEvent::NotificationTimer { ticket }
        });
    }
}
