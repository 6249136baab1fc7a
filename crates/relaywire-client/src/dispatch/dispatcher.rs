use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use relaywire_core::error::{RelayError, Result};
use relaywire_core::protocol::ServerUpdateResponse;

/// Subscription update handler, one per update kind.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    fn kind(&self) -> &'static str;
    async fn handle(&self, update: ServerUpdateResponse) -> Result<()>;
}

/// Registry and dispatcher for subscription updates.
#[derive(Default)]
pub struct Dispatcher {
    handlers: DashMap<&'static str, Arc<dyn UpdateHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    pub fn register(&self, handler: Arc<dyn UpdateHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    pub fn registered_kinds(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|e| *e.key()).collect()
    }

    pub async fn dispatch(&self, update: ServerUpdateResponse) -> Result<()> {
        let kind = update.kind();
        let handler = self
            .handlers
            .get(kind)
            .ok_or_else(|| RelayError::BadRequest(format!("no handler for update: {kind}")))?
            .value()
            .clone();
        handler.handle(update).await
    }
}
