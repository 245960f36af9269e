//! Help command - displays available commands.

use crate::action::BotAction;
use crate::commands::{CommandHandler, Dependencies, HandlerSpec};
use crate::error::AppResult;
use async_trait::async_trait;
use message_store::Message;

pub struct HelpHandler;

impl HelpHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn spec() -> HandlerSpec {
        HandlerSpec {
            name: "help",
            requires: &[],
            build: Self::build,
        }
    }

    pub fn build(_deps: &Dependencies) -> AppResult<Box<dyn CommandHandler>> {
        Ok(Box::new(Self::new()))
    }
}

impl Default for HelpHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for HelpHandler {
    fn name(&self) -> &str {
        "help"
    }

    fn pattern(&self) -> &str {
        r"[!./][Hh][Ee][Ll][Pp]"
    }

    async fn get_reply(&self, _message: &Message) -> Option<Vec<BotAction>> {
        Some(vec![BotAction::text(
            r#"Commands:
!s (as a reply) - Re-post the replied message behind a spoiler and delete the original
!insult - Get told what the bot thinks of you
!help - Show this message

Commands also work with a "." or "/" prefix."#,
        )])
    }
}
