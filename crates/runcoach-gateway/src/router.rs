//! Inbound routing: commands, group mentions, and what reaches the dispatcher

use runcoach_core::InboundMessage;

/// Slash commands the bot answers without consulting the oracle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Custom,
}

impl Command {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "custom" => Some(Command::Custom),
            _ => None,
        }
    }

    pub fn reply(&self, first_name: Option<&str>) -> String {
        match self {
            Command::Start => format!("Hello {}", first_name.unwrap_or("there")),
            Command::Help => "Type the distance of your run in kilometers".to_string(),
            Command::Custom => "This is a custom command".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// Not for us: no journal change, no reply.
    Ignore,
    Command(Command),
    /// Free text for the dispatcher, mention already removed.
    Dispatch(String),
}

pub struct Router {
    /// Bot mention including the leading `@`.
    mention: String,
}

impl Router {
    pub fn new(username: &str) -> Self {
        let name = username.trim().trim_start_matches('@');
        Self { mention: format!("@{}", name) }
    }

    pub fn mention(&self) -> &str {
        &self.mention
    }

    pub fn route(&self, message: &InboundMessage) -> Route {
        let text = message.text.trim();
        if let Some(rest) = text.strip_prefix('/') {
            return self.route_command(rest);
        }

        if message.chat_kind.is_multi_party() {
            if !text.contains(self.mention.as_str()) {
                return Route::Ignore;
            }
            let stripped = text.replace(self.mention.as_str(), "");
            let stripped = stripped.trim();
            if stripped.is_empty() {
                return Route::Ignore;
            }
            return Route::Dispatch(stripped.to_string());
        }

        if text.is_empty() {
            Route::Ignore
        } else {
            Route::Dispatch(message.text.clone())
        }
    }

    // "/help", "/help@bot args"; a command addressed to another bot is ignored.
    fn route_command(&self, rest: &str) -> Route {
        let word = rest.split_whitespace().next().unwrap_or("");
        let (name, target) = match word.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (word, None),
        };
        if let Some(target) = target {
            if !target.eq_ignore_ascii_case(&self.mention[1..]) {
                return Route::Ignore;
            }
        }
        match Command::parse(name) {
            Some(command) => Route::Command(command),
            None => Route::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runcoach_core::{ChatKind, UserId};

    fn message(kind: ChatKind, text: &str) -> InboundMessage {
        InboundMessage {
            chat_id: 1,
            user_id: UserId::from(1),
            chat_kind: kind,
            text: text.to_string(),
            first_name: Some("Sam".into()),
        }
    }

    fn router() -> Router {
        Router::new("@rrunning_coach_bot")
    }

    #[test]
    fn username_without_at_is_normalized() {
        assert_eq!(Router::new("rrunning_coach_bot").mention(), "@rrunning_coach_bot");
        assert_eq!(Router::new(" @rrunning_coach_bot ").mention(), "@rrunning_coach_bot");
    }

    #[test]
    fn private_text_dispatches_verbatim() {
        assert_eq!(
            router().route(&message(ChatKind::Private, "I ran 5km today")),
            Route::Dispatch("I ran 5km today".into())
        );
    }

    #[test]
    fn private_blank_text_is_ignored() {
        assert_eq!(router().route(&message(ChatKind::Private, "   ")), Route::Ignore);
    }

    #[test]
    fn group_without_mention_is_ignored() {
        for kind in [ChatKind::Group, ChatKind::Supergroup] {
            assert_eq!(router().route(&message(kind, "I ran 5km today")), Route::Ignore);
        }
    }

    #[test]
    fn group_mention_is_stripped() {
        assert_eq!(
            router().route(&message(ChatKind::Group, "@rrunning_coach_bot I ran 5km today")),
            Route::Dispatch("I ran 5km today".into())
        );
        assert_eq!(
            router().route(&message(ChatKind::Supergroup, "ran 10k @rrunning_coach_bot")),
            Route::Dispatch("ran 10k".into())
        );
    }

    #[test]
    fn bare_mention_is_ignored() {
        assert_eq!(router().route(&message(ChatKind::Group, "@rrunning_coach_bot")), Route::Ignore);
    }

    #[test]
    fn commands() {
        let r = router();
        assert_eq!(r.route(&message(ChatKind::Private, "/start")), Route::Command(Command::Start));
        assert_eq!(r.route(&message(ChatKind::Private, "/help now")), Route::Command(Command::Help));
        assert_eq!(
            r.route(&message(ChatKind::Group, "/custom@rrunning_coach_bot")),
            Route::Command(Command::Custom)
        );
    }

    #[test]
    fn commands_in_groups_need_no_mention() {
        assert_eq!(router().route(&message(ChatKind::Group, "/help")), Route::Command(Command::Help));
    }

    #[test]
    fn unknown_or_foreign_commands_are_ignored() {
        let r = router();
        assert_eq!(r.route(&message(ChatKind::Private, "/stats")), Route::Ignore);
        assert_eq!(r.route(&message(ChatKind::Group, "/help@other_bot")), Route::Ignore);
        assert_eq!(r.route(&message(ChatKind::Private, "/")), Route::Ignore);
    }

    #[test]
    fn command_replies() {
        assert_eq!(Command::Start.reply(Some("Sam")), "Hello Sam");
        assert_eq!(Command::Help.reply(None), "Type the distance of your run in kilometers");
        assert_eq!(Command::Custom.reply(Some("Sam")), "This is a custom command");
    }
}
