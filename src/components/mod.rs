use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use twilight_model::application::interaction::{
    Interaction, message_component::MessageComponentInteractionData,
};

use crate::state::State;

pub mod buttons;

pub type ComponentHandlerFn =
    fn(Arc<State>, Interaction) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Handlers for message components, keyed by custom id.
pub struct ComponentRegistry {
    handlers: HashMap<&'static str, ComponentHandlerFn>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, custom_id: &'static str, handler: ComponentHandlerFn) {
        if self.handlers.insert(custom_id, handler).is_some() {
            tracing::warn!(custom_id, "Component handler registered twice");
        }
    }

    pub fn get(&self, custom_id: &str) -> Option<ComponentHandlerFn> {
        self.handlers.get(custom_id).copied()
    }

    pub async fn handle(
        &self,
        state: Arc<State>,
        interaction: Interaction,
        data: MessageComponentInteractionData,
    ) -> anyhow::Result<()> {
        match self.get(&data.custom_id) {
            Some(handler) => handler(state, interaction).await,
            None => {
                tracing::warn!("No component handler for custom_id: {}", data.custom_id);
                Ok(())
            }
        }
    }
}

pub fn build_registry() -> ComponentRegistry {
    let mut reg = ComponentRegistry::new();
    buttons::register_buttons(&mut reg);
    reg
}
