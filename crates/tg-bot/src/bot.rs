//! Long-polling update loop.

use crate::action::BotAction;
use crate::dispatcher::Dispatcher;
use crate::event::{normalize, Event, InboundEvent};
use crate::transport::Transport;
use message_store::{Message, MessageStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use telegram_client::{TelegramError, Update};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Timing of the poll cycle.
#[derive(Debug, Clone, Copy)]
pub struct PollTiming {
    /// Idle time after each processed batch.
    pub poll_interval: Duration,
    /// Wait before polling again after a failed poll.
    pub retry_delay: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Owns the transport, store and dispatcher and drives the
/// poll → process → sleep cycle.
pub struct Bot {
    transport: Arc<dyn Transport>,
    store: Arc<MessageStore>,
    dispatcher: Dispatcher,
    timing: PollTiming,
    last_update_id: Option<i64>,
}

impl Bot {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<MessageStore>,
        dispatcher: Dispatcher,
        timing: PollTiming,
    ) -> Self {
        Self {
            transport,
            store,
            dispatcher,
            timing,
            last_update_id: None,
        }
    }

    /// Offset for the next `getUpdates` call: one past the highest update seen.
    pub fn next_offset(&self) -> Option<i64> {
        self.last_update_id.map(|id| id + 1)
    }

    /// Run forever.
    pub async fn run(&mut self) {
        info!("Listening for updates...");
        loop {
            match self.poll_once().await {
                Ok(count) => {
                    if count > 0 {
                        debug!("Processed {} updates", count);
                    }
                    sleep(self.timing.poll_interval).await;
                }
                Err(e) => {
                    error!("Failed to fetch updates: {}", e);
                    sleep(self.timing.retry_delay).await;
                }
            }
        }
    }

    /// Fetch one batch and process it. Returns the batch size.
    pub async fn poll_once(&mut self) -> Result<usize, TelegramError> {
        let updates = self.transport.get_updates(self.next_offset()).await?;
        let count = updates.len();
        self.process_batch(updates).await;
        Ok(count)
    }

    /// Process updates in delivery order.
    ///
    /// The cursor moves past each update before it is handled, so an update
    /// that fails is never fetched again.
    pub async fn process_batch(&mut self, updates: Vec<Update>) {
        for update in updates {
            self.advance_cursor(update.update_id);
            self.process_update(&update).await;
        }
    }

    fn advance_cursor(&mut self, update_id: i64) {
        self.last_update_id = Some(match self.last_update_id {
            Some(last) => last.max(update_id),
            None => update_id,
        });
    }

    #[instrument(skip(self, update), fields(update_id = update.update_id))]
    async fn process_update(&self, update: &Update) {
        match Event::classify(update) {
            Event::Text(message) => self.handle_text(message).await,
            Event::Caption(message) => {
                debug!("Storing media message {} without dispatch", message.id);
                self.persist(&message).await;
            }
            Event::NewChatMembers { chat_id, user_ids } => {
                debug!("{} members joined {}", user_ids.len(), chat_id);
            }
            Event::Edited { chat_id, id, text } => match self.store.edit(chat_id, id, &text).await {
                Ok(true) => debug!("Updated text of message {} in {}", id, chat_id),
                Ok(false) => debug!("Edited message {} in {} is not tracked", id, chat_id),
                Err(e) => error!("Failed to apply edit to {}: {}", id, e),
            },
            Event::Ignored => debug!("Ignoring update"),
        }
    }

    async fn handle_text(&self, message: Message) {
        let actions = self
            .dispatcher
            .dispatch(&InboundEvent::message(message.clone()))
            .await;
        self.persist(&message).await;

        for action in actions {
            self.deliver(message.chat_id, action).await;
        }
    }

    /// Send one action; successfully sent text replies are stored so later
    /// edits and replies can reference them.
    async fn deliver(&self, chat_id: i64, action: BotAction) {
        let sent = match self.transport.send(chat_id, &action).await {
            Ok(sent) => sent,
            Err(e) => {
                error!("Failed to send {} action to {}: {}", action.kind(), chat_id, e);
                return;
            }
        };

        if let (Some(sent), BotAction::ReplyText { text, .. }) = (sent, &action) {
            let mut outbound = normalize(&sent);
            outbound.reply_id = None;
            if outbound.text.is_none() {
                outbound.text = Some(text.clone());
            }
            self.persist(&outbound).await;
        }
    }

    async fn persist(&self, message: &Message) {
        match self.store.insert(message).await {
            Ok(()) => {}
            Err(StoreError::Duplicate { chat_id, id }) => {
                warn!("Message {} in {} already stored, ignoring", id, chat_id);
            }
            Err(e) => error!("Failed to store message {}: {}", message.id, e),
        }
    }
}
