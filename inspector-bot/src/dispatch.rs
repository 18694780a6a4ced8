use std::sync::Arc;

use parking_lot::Mutex;
use poise::serenity_prelude as serenity;
use tracing::{debug, warn};

use inspector_core::{Data, Error, RunningCommands};

/// Runs every event that can carry a command in its own task and records the
/// task's abort handle, so `cancel` can stop an invocation mid-flight.
pub struct TrackedFramework {
    inner: Arc<poise::Framework<Data, Error>>,
    running: Arc<Mutex<RunningCommands>>,
}

impl TrackedFramework {
    pub fn new(inner: poise::Framework<Data, Error>, running: Arc<Mutex<RunningCommands>>) -> Self {
        Self {
            inner: Arc::new(inner),
            running,
        }
    }
}

/// Message or interaction id; poise uses the same value as `Context::id`.
fn trigger_id(event: &serenity::FullEvent) -> Option<u64> {
    match event {
        serenity::FullEvent::Message { new_message } => Some(new_message.id.get()),
        serenity::FullEvent::InteractionCreate { interaction } => Some(interaction.id().get()),
        _ => None,
    }
}

#[serenity::async_trait]
impl serenity::Framework for TrackedFramework {
    async fn init(&mut self, client: &serenity::Client) {
        match Arc::get_mut(&mut self.inner) {
            Some(inner) => serenity::Framework::init(inner, client).await,
            None => warn!("framework was shared before init; owners and shard manager not set"),
        }
    }

    async fn dispatch(&self, ctx: serenity::Context, event: serenity::FullEvent) {
        let Some(trigger_id) = trigger_id(&event) else {
            serenity::Framework::dispatch(&*self.inner, ctx, event).await;
            return;
        };

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            serenity::Framework::dispatch(&*inner, ctx, event).await;
        });
        self.running.lock().attach(trigger_id, task.abort_handle());

        match task.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => debug!(trigger_id, "command task cancelled"),
            Err(e) => warn!(?e, trigger_id, "command task panicked"),
        }
        self.running.lock().release(trigger_id);
    }
}
