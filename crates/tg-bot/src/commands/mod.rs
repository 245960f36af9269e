//! Bot command handlers and the registry that wires them up.

mod help;
mod insult;
mod registry;
mod spoiler;

pub use help::HelpHandler;
pub use insult::InsultHandler;
pub use registry::{RegisteredHandler, Registry};
pub use spoiler::SpoilerHandler;

use crate::action::BotAction;
use crate::error::{AppError, AppResult};
use crate::transport::Transport;
use async_trait::async_trait;
use message_store::{Message, MessageStore};
use std::str::FromStr;
use std::sync::Arc;

/// Kind of event a handler reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// Plain text message.
    Message,
    /// Reserved: users joining a chat.
    NewChatMember,
    /// Reserved: media with a caption.
    Caption,
}

/// Command handler trait.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Command name (e.g., "help", "spoiler").
    fn name(&self) -> &str;

    /// Pattern the whole message text must match (e.g., `[!.]help`).
    fn pattern(&self) -> &str;

    /// Event kind this handler reacts to.
    fn kind(&self) -> HandlerKind {
        HandlerKind::Message
    }

    /// Produce the actions for a matching message.
    ///
    /// `None` means the handler declined (e.g. malformed arguments after the
    /// trigger).
    async fn get_reply(&self, message: &Message) -> Option<Vec<BotAction>>;
}

/// Shared singletons a handler can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    Store,
    Sender,
}

impl Dependency {
    pub fn name(&self) -> &'static str {
        match self {
            Dependency::Store => "store",
            Dependency::Sender => "sender",
        }
    }
}

impl FromStr for Dependency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "store" => Ok(Dependency::Store),
            "sender" => Ok(Dependency::Sender),
            other => Err(other.to_string()),
        }
    }
}

/// Injection table assembled once at startup.
#[derive(Clone, Default)]
pub struct Dependencies {
    store: Option<Arc<MessageStore>>,
    sender: Option<Arc<dyn Transport>>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, store: Arc<MessageStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_sender(mut self, sender: Arc<dyn Transport>) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Whether the table holds an instance for `dependency`.
    pub fn provides(&self, dependency: Dependency) -> bool {
        match dependency {
            Dependency::Store => self.store.is_some(),
            Dependency::Sender => self.sender.is_some(),
        }
    }

    pub fn store(&self, handler: &str) -> AppResult<Arc<MessageStore>> {
        self.store
            .clone()
            .ok_or_else(|| misconfigured(handler, Dependency::Store.name()))
    }

    pub fn sender(&self, handler: &str) -> AppResult<Arc<dyn Transport>> {
        self.sender
            .clone()
            .ok_or_else(|| misconfigured(handler, Dependency::Sender.name()))
    }
}

fn misconfigured(handler: &str, dependency: &str) -> AppError {
    AppError::MisconfiguredHandler {
        handler: handler.to_string(),
        dependency: dependency.to_string(),
    }
}

/// Compiled-in plugin descriptor: what a handler needs and how to build it.
#[derive(Clone, Copy)]
pub struct HandlerSpec {
    pub name: &'static str,
    /// Dependency names, resolved against [`Dependencies`].
    pub requires: &'static [&'static str],
    pub build: fn(&Dependencies) -> AppResult<Box<dyn CommandHandler>>,
}

impl HandlerSpec {
    /// Check every declared dependency against `deps`.
    pub fn resolve(&self, deps: &Dependencies) -> AppResult<()> {
        for name in self.requires {
            let dependency =
                Dependency::from_str(name).map_err(|unknown| misconfigured(self.name, &unknown))?;
            if !deps.provides(dependency) {
                return Err(misconfigured(self.name, name));
            }
        }
        Ok(())
    }
}

/// Every built-in handler, in dispatch order.
pub fn builtin_handlers() -> Vec<HandlerSpec> {
    vec![SpoilerHandler::spec(), InsultHandler::spec(), HelpHandler::spec()]
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_from_name() {
        assert_eq!(Dependency::from_str("store"), Ok(Dependency::Store));
        assert_eq!(Dependency::from_str("sender"), Ok(Dependency::Sender));
        assert_eq!(Dependency::from_str("database"), Err("database".to_string()));
    }

    #[test]
    fn test_resolve_unknown_dependency() {
        let spec = HandlerSpec {
            name: "broken",
            requires: &["database"],
            build: HelpHandler::build,
        };

        let err = spec.resolve(&Dependencies::new()).unwrap_err();
        match err {
            AppError::MisconfiguredHandler {
                handler,
                dependency,
            } => {
                assert_eq!(handler, "broken");
                assert_eq!(dependency, "database");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_resolve_missing_instance() {
        let deps = Dependencies::new().with_store(Arc::new(MessageStore::open_in_memory().unwrap()));

        assert!(SpoilerHandler::spec().resolve(&deps).is_err());
        assert!(HelpHandler::spec().resolve(&deps).is_ok());
    }

    #[test]
    fn test_builtin_order() {
        let names: Vec<_> = builtin_handlers().iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["spoiler", "insult", "help"]);
    }
}
