//! Order-preserving registry of command handlers.

use super::{CommandHandler, Dependencies, HandlerKind, HandlerSpec};
use crate::error::AppResult;
use regex::Regex;
use tracing::{info, warn};

/// A live handler with its compiled full-match pattern.
pub struct RegisteredHandler {
    handler: Box<dyn CommandHandler>,
    pattern: Result<Regex, regex::Error>,
}

impl RegisteredHandler {
    pub fn new(handler: Box<dyn CommandHandler>) -> Self {
        let pattern = compile_full_match(handler.pattern());
        if let Err(e) = &pattern {
            warn!("Handler '{}' has an invalid pattern: {}", handler.name(), e);
        }
        Self { handler, pattern }
    }

    pub fn name(&self) -> &str {
        self.handler.name()
    }

    pub fn kind(&self) -> HandlerKind {
        self.handler.kind()
    }

    pub fn handler(&self) -> &dyn CommandHandler {
        self.handler.as_ref()
    }

    /// Compiled pattern, or the compile error for a broken one.
    pub fn pattern(&self) -> Result<&Regex, &regex::Error> {
        self.pattern.as_ref()
    }
}

/// Anchor `pattern` so it only matches the whole text.
pub fn compile_full_match(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\A(?:{})\z", pattern))
}

/// Handlers in dispatch order. Immutable once built.
pub struct Registry {
    entries: Vec<RegisteredHandler>,
}

impl Registry {
    /// Instantiate every spec in order.
    ///
    /// Fails with `MisconfiguredHandler` on the first spec whose declared
    /// dependencies cannot be resolved.
    pub fn build(specs: &[HandlerSpec], deps: &Dependencies) -> AppResult<Self> {
        let mut handlers = Vec::with_capacity(specs.len());
        for spec in specs {
            spec.resolve(deps)?;
            handlers.push((spec.build)(deps)?);
        }

        let registry = Self::from_handlers(handlers);
        info!("Registered {} command handlers", registry.len());
        Ok(registry)
    }

    /// Wrap already constructed handlers, keeping their order.
    pub fn from_handlers(handlers: Vec<Box<dyn CommandHandler>>) -> Self {
        Self {
            entries: handlers.into_iter().map(RegisteredHandler::new).collect(),
        }
    }

    pub fn entries(&self) -> &[RegisteredHandler] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
