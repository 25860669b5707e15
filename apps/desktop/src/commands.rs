//! Declarative table mapping terminal input lines to session events.

use controller_core::{
    composer::{ComposerTab, EmbedColor, EmbedInput},
    view::{ChannelListView, SearchPanel, SessionView},
    SessionEvent,
};
use shared::domain::{ChannelId, ServerId, UserId};

/// What a parsed line asks the front-end to do.
#[derive(Debug)]
pub enum Action {
    Events(Vec<SessionEvent>),
    Help,
    Servers,
}

/// Values a line may fall back on when it leaves arguments out.
#[derive(Debug, Default)]
pub struct ParseContext {
    pub server_url: String,
    pub api_secret: String,
    pub last_view: Option<SessionView>,
}

pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    parse: fn(&str, &ParseContext) -> Result<Action, String>,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "connect",
        usage: "connect [<server-url> <api-secret>]",
        summary: "connect to the bot server (defaults to the saved credentials)",
        parse: parse_connect,
    },
    CommandSpec {
        name: "servers",
        usage: "servers",
        summary: "list servers and the expanded server's channels",
        parse: |_, _| Ok(Action::Servers),
    },
    CommandSpec {
        name: "expand",
        usage: "expand <server-id>",
        summary: "expand or collapse a server",
        parse: |args, _| Ok(single(SessionEvent::ServerToggled(ServerId::new(required(args, "server id")?)))),
    },
    CommandSpec {
        name: "channel",
        usage: "channel <server-id> <channel-id> [name]",
        summary: "send to a channel",
        parse: parse_channel,
    },
    CommandSpec {
        name: "search",
        usage: "search <query>",
        summary: "search users (at least two characters)",
        parse: |args, _| Ok(single(SessionEvent::SearchQueryChanged(args.to_string()))),
    },
    CommandSpec {
        name: "user",
        usage: "user <user-id> [username] [display name]",
        summary: "send a direct message to a user from the search results",
        parse: parse_user,
    },
    CommandSpec {
        name: "tab",
        usage: "tab simple|embed",
        summary: "switch the composer tab",
        parse: parse_tab,
    },
    CommandSpec {
        name: "text",
        usage: "text <message>",
        summary: "set the simple message text",
        parse: |args, _| Ok(single(SessionEvent::SimpleTextChanged(args.to_string()))),
    },
    CommandSpec {
        name: "send",
        usage: "send [message]",
        summary: "send the simple message, optionally replacing its text first",
        parse: parse_send,
    },
    CommandSpec {
        name: "embed",
        usage: "embed <title|description|thumbnail|image|footer|author> <value> | embed field <name>|<value>[|inline] | embed clear-fields",
        summary: "edit the embed draft",
        parse: parse_embed,
    },
    CommandSpec {
        name: "color",
        usage: "color <blurple|green|yellow|fuchsia|red|white|black>",
        summary: "pick the embed colour",
        parse: |args, _| {
            let color = required(args, "colour")?.parse::<EmbedColor>()?;
            Ok(single(SessionEvent::EmbedColorSelected(color)))
        },
    },
    CommandSpec {
        name: "send-embed",
        usage: "send-embed",
        summary: "send the embed draft",
        parse: |_, _| Ok(single(SessionEvent::SendEmbedRequested)),
    },
    CommandSpec {
        name: "help",
        usage: "help",
        summary: "show this list",
        parse: |_, _| Ok(Action::Help),
    },
    CommandSpec {
        name: "quit",
        usage: "quit",
        summary: "exit",
        parse: |_, _| Ok(single(SessionEvent::Quit)),
    },
];

/// `Ok(None)` for blank lines.
pub fn parse_line(line: &str, context: &ParseContext) -> Result<Option<Action>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (name, args) = split_word(line);
    let spec = COMMANDS
        .iter()
        .find(|spec| spec.name == name)
        .ok_or_else(|| format!("unknown command '{name}', try 'help'"))?;
    (spec.parse)(args, context).map(Some)
}

pub fn help_text() -> String {
    COMMANDS
        .iter()
        .map(|spec| format!("  {:<44} {}", spec.usage, spec.summary))
        .collect::<Vec<_>>()
        .join("\n")
}

fn single(event: SessionEvent) -> Action {
    Action::Events(vec![event])
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn required<'a>(args: &'a str, what: &str) -> Result<&'a str, String> {
    let (word, _) = split_word(args);
    if word.is_empty() {
        Err(format!("missing {what}"))
    } else {
        Ok(word)
    }
}

fn parse_connect(args: &str, context: &ParseContext) -> Result<Action, String> {
    let (server_url, rest) = split_word(args);
    let (api_secret, _) = split_word(rest);
    let (server_url, api_secret) = if server_url.is_empty() {
        (context.server_url.clone(), context.api_secret.clone())
    } else {
        (server_url.to_string(), api_secret.to_string())
    };
    Ok(single(SessionEvent::ConnectRequested {
        server_url,
        api_secret,
    }))
}

fn parse_channel(args: &str, context: &ParseContext) -> Result<Action, String> {
    let (server_id, rest) = split_word(args);
    let (channel_id, name) = split_word(rest);
    if server_id.is_empty() || channel_id.is_empty() {
        return Err("usage: channel <server-id> <channel-id> [name]".to_string());
    }
    let channel_name = if name.is_empty() {
        known_channel_name(context, server_id, channel_id).unwrap_or_else(|| channel_id.to_string())
    } else {
        name.to_string()
    };
    Ok(single(SessionEvent::ChannelSelected {
        server_id: ServerId::new(server_id),
        channel_id: ChannelId::new(channel_id),
        channel_name,
    }))
}

fn known_channel_name(context: &ParseContext, server_id: &str, channel_id: &str) -> Option<String> {
    let view = context.last_view.as_ref()?;
    let row = view.servers.iter().find(|row| row.id.as_str() == server_id)?;
    match row.channels.as_ref()? {
        ChannelListView::Channels(channels) => channels
            .iter()
            .find(|channel| channel.id.as_str() == channel_id)
            .map(|channel| channel.name.clone()),
        _ => None,
    }
}

fn parse_user(args: &str, context: &ParseContext) -> Result<Action, String> {
    let (user_id, rest) = split_word(args);
    if user_id.is_empty() {
        return Err("missing user id".to_string());
    }
    let found = context.last_view.as_ref().and_then(|view| match &view.search {
        SearchPanel::Users(rows) => rows.iter().find(|row| row.id.as_str() == user_id).cloned(),
        _ => None,
    });
    let (username, display_name) = match found {
        Some(row) => (row.username, row.label),
        None => {
            let (username, display_name) = split_word(rest);
            if username.is_empty() {
                return Err(format!(
                    "user '{user_id}' is not in the search results; pass a username too"
                ));
            }
            (username.to_string(), display_name.to_string())
        }
    };
    Ok(single(SessionEvent::UserSelected {
        user_id: UserId::new(user_id),
        username,
        display_name,
    }))
}

fn parse_tab(args: &str, _: &ParseContext) -> Result<Action, String> {
    let tab = match required(args, "tab")?.to_ascii_lowercase().as_str() {
        "simple" => ComposerTab::Simple,
        "embed" => ComposerTab::Embed,
        other => return Err(format!("unknown tab '{other}'")),
    };
    Ok(single(SessionEvent::ComposerTabSelected(tab)))
}

fn parse_send(args: &str, _: &ParseContext) -> Result<Action, String> {
    let mut events = Vec::with_capacity(2);
    if !args.is_empty() {
        events.push(SessionEvent::SimpleTextChanged(args.to_string()));
    }
    events.push(SessionEvent::SendSimpleRequested);
    Ok(Action::Events(events))
}

fn parse_embed(args: &str, _: &ParseContext) -> Result<Action, String> {
    let (field, value) = split_word(args);
    match field {
        "" => Err("missing embed field".to_string()),
        "clear-fields" => Ok(single(SessionEvent::EmbedFieldsCleared)),
        "field" => {
            let mut parts = value.split('|').map(str::trim);
            let name = parts.next().unwrap_or_default();
            let field_value = parts.next().unwrap_or_default();
            if name.is_empty() || field_value.is_empty() {
                return Err("usage: embed field <name>|<value>[|inline]".to_string());
            }
            let inline = parts.next().is_some_and(|flag| flag.eq_ignore_ascii_case("inline"));
            Ok(single(SessionEvent::EmbedFieldAdded {
                name: name.to_string(),
                value: field_value.to_string(),
                inline,
            }))
        }
        other => {
            let input = other.parse::<EmbedInput>()?;
            Ok(single(SessionEvent::EmbedInputChanged {
                input,
                value: value.to_string(),
            }))
        }
    }
}
