//! Pattern-matching dispatch of inbound events to command handlers.

use crate::action::BotAction;
use crate::commands::{HandlerKind, Registry};
use crate::event::InboundEvent;
use tracing::{debug, warn};

/// Runs every matching handler for an event, in registry order.
pub struct Dispatcher {
    registry: Registry,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Collect the actions of every handler whose kind matches the event and
    /// whose pattern matches the whole text.
    ///
    /// Actions keep handler order, then each handler's own order. A handler
    /// with a broken pattern is skipped without affecting the others.
    pub async fn dispatch(&self, event: &InboundEvent) -> Vec<BotAction> {
        let mut actions = Vec::new();
        if event.kind != HandlerKind::Message {
            return actions;
        }

        let text = event.text();
        if text.is_empty() {
            return actions;
        }

        for entry in self.registry.entries() {
            if entry.kind() != event.kind {
                continue;
            }

            let pattern = match entry.pattern() {
                Ok(pattern) => pattern,
                Err(e) => {
                    warn!("Skipping handler '{}': invalid pattern: {}", entry.name(), e);
                    continue;
                }
            };
            if !pattern.is_match(text) {
                continue;
            }

            match entry.handler().get_reply(&event.message).await {
                Some(reply) => {
                    debug!("Handler '{}' produced {} actions", entry.name(), reply.len());
                    actions.extend(reply);
                }
                None => debug!("Handler '{}' declined", entry.name()),
            }
        }

        actions
    }
}
