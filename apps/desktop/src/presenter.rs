//! Line-oriented presenter: prints the parts of the view that changed since the last frame.

use std::{
    io::Write,
    sync::{Arc, Mutex},
};

use controller_core::{
    composer::ComposerTab,
    view::{
        ChannelListView, ComposerView, ConnectionView, NotificationView, SearchPanel, ServerIcon,
        ServerRow, SessionView, TargetHeader, NO_CHANNELS, NO_USERS,
    },
    notifications::NotificationKind,
    Presenter,
};
use tracing::warn;

pub type SharedView = Arc<Mutex<Option<SessionView>>>;

pub struct TerminalPresenter<W> {
    out: W,
    last: SharedView,
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: Arc::new(Mutex::new(None)),
        }
    }

    /// The last presented view, shared with the input loop.
    pub fn last_view(&self) -> SharedView {
        Arc::clone(&self.last)
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn present(&mut self, view: &SessionView) {
        let Ok(mut last) = self.last.lock() else {
            warn!("presenter state poisoned; skipping frame");
            return;
        };
        let lines = changed_lines(last.as_ref(), view);
        *last = Some(view.clone());
        drop(last);

        for line in lines {
            if let Err(err) = writeln!(self.out, "{line}") {
                warn!("failed to write to terminal: {err}");
                return;
            }
        }
        let _ = self.out.flush();
    }
}

pub fn changed_lines(previous: Option<&SessionView>, view: &SessionView) -> Vec<String> {
    let mut lines = Vec::new();

    if previous.map_or(true, |previous| previous.connection != view.connection) {
        lines.push(connection_line(&view.connection));
    }
    if previous.map_or(!view.servers.is_empty(), |previous| previous.servers != view.servers) {
        lines.extend(server_lines(&view.servers));
    }
    if previous.map_or(false, |previous| previous.target != view.target) {
        lines.push(target_line(&view.target));
    }
    if previous.map_or(false, |previous| previous.search != view.search) {
        lines.extend(search_lines(&view.search));
    }
    if previous.map_or(false, |previous| previous.composer != view.composer) {
        lines.push(composer_line(&view.composer));
    }
    let notification_changed =
        previous.map_or(true, |previous| notification_key(previous) != notification_key(view));
    if notification_changed {
        if let Some(notification) = &view.notification {
            lines.push(notification_line(notification));
        }
    }
    lines
}

/// The exit phase alone is not worth a new line.
fn notification_key(view: &SessionView) -> Option<(NotificationKind, &str)> {
    view.notification
        .as_ref()
        .map(|notification| (notification.kind, notification.message.as_str()))
}

fn connection_line(connection: &ConnectionView) -> String {
    if connection.server_url.is_empty() {
        format!("[connection] {}", connection.status)
    } else {
        format!("[connection] {} ({})", connection.status, connection.server_url)
    }
}

pub fn server_lines(servers: &[ServerRow]) -> Vec<String> {
    if servers.is_empty() {
        return vec!["[servers] none".to_string()];
    }
    let mut lines = vec!["[servers]".to_string()];
    for row in servers {
        let marker = if row.expanded { '-' } else { '+' };
        let icon = match &row.icon {
            ServerIcon::Image(url) => format!("<{url}>"),
            ServerIcon::Initial(initial) => format!("({initial})"),
        };
        lines.push(format!("  [{marker}] {icon} {} ({})", row.name, row.id));
        match &row.channels {
            None => {}
            Some(ChannelListView::Loading) => lines.push("      loading channels...".to_string()),
            Some(ChannelListView::Empty) => lines.push(format!("      {NO_CHANNELS}")),
            Some(ChannelListView::Error(message)) => lines.push(format!("      ! {message}")),
            Some(ChannelListView::Channels(channels)) => lines.extend(
                channels
                    .iter()
                    .map(|channel| format!("      # {} ({})", channel.name, channel.id)),
            ),
        }
    }
    lines
}

fn target_line(target: &TargetHeader) -> String {
    format!("[target] {} | {}", target.title, target.subtitle)
}

fn search_lines(search: &SearchPanel) -> Vec<String> {
    match search {
        SearchPanel::Hidden => Vec::new(),
        SearchPanel::NotConnected => vec!["[search] Not connected".to_string()],
        SearchPanel::Loading => vec!["[search] searching...".to_string()],
        SearchPanel::NoUsers => vec![format!("[search] {NO_USERS}")],
        SearchPanel::Error(message) => vec![format!("[search] ! {message}")],
        SearchPanel::Users(rows) => std::iter::once("[search]".to_string())
            .chain(
                rows.iter()
                    .map(|row| format!("  {} @{} ({})", row.label, row.username, row.id)),
            )
            .collect(),
    }
}

fn composer_line(composer: &ComposerView) -> String {
    match composer.tab {
        ComposerTab::Simple => format!(
            "[composer] simple: \"{}\"{}",
            composer.simple_text,
            if composer.simple_send_enabled { "" } else { " (sending...)" }
        ),
        ComposerTab::Embed => format!(
            "[composer] embed {}: {} / {} / {} field(s){}",
            composer.preview.color,
            composer.preview.title,
            composer.preview.description,
            composer.draft.fields.len(),
            if composer.embed_send_enabled { "" } else { " (sending...)" }
        ),
    }
}

fn notification_line(notification: &NotificationView) -> String {
    format!("[{}] {}", notification.title, notification.message)
}
