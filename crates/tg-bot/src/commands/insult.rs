//! Insult command - replies with a canned insult aimed at the sender.

use crate::action::BotAction;
use crate::commands::{CommandHandler, Dependencies, HandlerSpec};
use crate::error::AppResult;
use async_trait::async_trait;
use message_store::Message;

const INSULTS: &[&str] = &[
    "{} types like someone who learned to read from error messages.",
    "{} is the reason the mute button exists.",
    "Even the spam filter has better judgement than {}.",
    "{} brings everyone so much joy. Mostly by leaving.",
    "I'd explain it to {}, but I left my crayons at home.",
];

pub struct InsultHandler;

impl InsultHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn spec() -> HandlerSpec {
        HandlerSpec {
            name: "insult",
            requires: &[],
            build: Self::build,
        }
    }

    pub fn build(_deps: &Dependencies) -> AppResult<Box<dyn CommandHandler>> {
        Ok(Box::new(Self::new()))
    }

    /// Pick an insult for `message`. The choice depends only on the message id.
    fn insult_for(message: &Message) -> String {
        let index = message.id.rem_euclid(INSULTS.len() as i64) as usize;
        INSULTS[index].replace("{}", &message.sender_display())
    }
}

impl Default for InsultHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for InsultHandler {
    fn name(&self) -> &str {
        "insult"
    }

    fn pattern(&self) -> &str {
        r"[!.][Ii][Nn][Ss][Uu][Ll][Tt].*"
    }

    async fn get_reply(&self, message: &Message) -> Option<Vec<BotAction>> {
        Some(vec![BotAction::text(Self::insult_for(message))])
    }
}
