use std::collections::HashMap;

use tokio::task::AbortHandle;

/// A command invocation whose dispatch task has not ended yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunningCommand {
    pub index: u64,
    pub trigger_id: u64,
    pub qualified_name: String,
    pub author_id: u64,
    /// Unix seconds.
    pub invoked_at: i64,
}

#[derive(Debug, Default)]
struct Slot {
    abort: Option<AbortHandle>,
    command: Option<RunningCommand>,
}

/// Dispatch tasks keyed by the message or interaction id that triggered them.
///
/// The dispatcher attaches the abort handle and `pre_command` fills in the
/// command, in either order. Slots live until the dispatcher releases them.
#[derive(Debug, Default)]
pub struct RunningCommands {
    next_index: u64,
    slots: HashMap<u64, Slot>,
}

impl RunningCommands {
    pub fn attach(&mut self, trigger_id: u64, abort: AbortHandle) {
        self.slots.entry(trigger_id).or_default().abort = Some(abort);
    }

    /// Record the command `trigger_id` resolved to and return its index.
    /// A nested dispatch on the same trigger replaces the entry.
    pub fn start(
        &mut self,
        trigger_id: u64,
        qualified_name: impl Into<String>,
        author_id: u64,
        invoked_at: i64,
    ) -> u64 {
        let index = self.next_index;
        self.next_index += 1;

        self.slots.entry(trigger_id).or_default().command = Some(RunningCommand {
            index,
            trigger_id,
            qualified_name: qualified_name.into(),
            author_id,
            invoked_at,
        });
        index
    }

    pub fn release(&mut self, trigger_id: u64) {
        self.slots.remove(&trigger_id);
    }

    /// Started commands, oldest first.
    pub fn list(&self) -> Vec<RunningCommand> {
        let mut commands: Vec<_> = self
            .slots
            .values()
            .filter_map(|slot| slot.command.clone())
            .collect();
        commands.sort_by_key(|command| command.index);
        commands
    }

    /// Abort the task running command `index`, or the newest one when `index`
    /// is `None`. The caller's own trigger is never picked.
    pub fn cancel(&mut self, index: Option<u64>, caller_trigger: u64) -> Option<RunningCommand> {
        let trigger_id = self
            .slots
            .iter()
            .filter(|(trigger_id, slot)| **trigger_id != caller_trigger && slot.abort.is_some())
            .filter_map(|(trigger_id, slot)| Some((*trigger_id, slot.command.as_ref()?.index)))
            .filter(|(_, command_index)| index.is_none_or(|wanted| wanted == *command_index))
            .max_by_key(|(_, command_index)| *command_index)
            .map(|(trigger_id, _)| trigger_id)?;

        let slot = self.slots.remove(&trigger_id)?;
        if let Some(abort) = slot.abort {
            abort.abort();
        }
        slot.command
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::RunningCommands;

    fn sleeper() -> tokio::task::JoinHandle<()> {
        tokio::spawn(tokio::time::sleep(Duration::from_secs(60)))
    }

    #[tokio::test]
    async fn lists_started_commands_in_order() {
        let mut running = RunningCommands::default();

        let first = sleeper();
        running.attach(10, first.abort_handle());
        assert!(running.list().is_empty());

        assert_eq!(running.start(10, "tag create", 1, 100), 0);
        assert_eq!(running.start(20, "ping", 2, 101), 1);

        let names: Vec<_> = running
            .list()
            .into_iter()
            .map(|command| command.qualified_name)
            .collect();
        assert_eq!(names, vec!["tag create", "ping"]);

        running.release(10);
        assert_eq!(running.list().len(), 1);
        first.abort();
    }

    #[tokio::test]
    async fn cancel_aborts_the_selected_task() {
        let mut running = RunningCommands::default();

        let slow = sleeper();
        running.attach(10, slow.abort_handle());
        running.start(10, "pep", 1, 100);

        let caller = sleeper();
        running.attach(20, caller.abort_handle());
        running.start(20, "cancel", 1, 101);

        let cancelled = running.cancel(None, 20).unwrap();
        assert_eq!(cancelled.qualified_name, "pep");
        assert!(slow.await.unwrap_err().is_cancelled());

        assert!(running.cancel(None, 20).is_none());
        assert!(running.cancel(Some(7), 30).is_none());
        assert_eq!(running.cancel(Some(1), 30).unwrap().qualified_name, "cancel");
        assert!(caller.await.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn commands_without_a_task_cannot_be_cancelled() {
        let mut running = RunningCommands::default();
        running.start(10, "ping", 1, 100);

        assert!(running.cancel(Some(0), 20).is_none());
        assert_eq!(running.list().len(), 1);
    }
}
