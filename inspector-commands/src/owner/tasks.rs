use tracing::info;

use crate::replies::usage_message;
use inspector_core::{Context, Error, RunningCommand};
use inspector_utils::pagination::{paginate_embed_pages, paginate_lines};

const TASKS_PER_PAGE: usize = 10;

/// List command invocations that are still running.
#[poise::command(
    prefix_command,
    slash_command,
    owners_only,
    hide_in_help,
    category = "Owner"
)]
pub async fn tasks(ctx: Context<'_>) -> Result<(), Error> {
    let running = ctx.data().running.lock().list();
    let lines: Vec<String> = running
        .iter()
        .filter(|command| command.trigger_id != ctx.id())
        .map(task_line)
        .collect();

    if lines.is_empty() {
        ctx.say("No tasks are running.").await?;
        return Ok(());
    }

    let pages = paginate_lines(&lines, TASKS_PER_PAGE);
    paginate_embed_pages(ctx, "Running tasks", &pages, 1).await?;

    Ok(())
}

/// Abort a running invocation by its task index, `-1` for the newest.
#[poise::command(
    prefix_command,
    slash_command,
    owners_only,
    hide_in_help,
    category = "Owner"
)]
pub async fn cancel(
    ctx: Context<'_>,
    #[description = "Index from `tasks`, or -1"] index: Option<i64>,
) -> Result<(), Error> {
    let Some(raw) = index else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    let cancelled = task_selector(raw)
        .and_then(|selector| ctx.data().running.lock().cancel(selector, ctx.id()));

    match cancelled {
        Some(command) => {
            info!(
                index = command.index,
                command = %command.qualified_name,
                "task cancelled"
            );
            ctx.say(format!(
                "Cancelled task `{}` ({}).",
                command.index, command.qualified_name
            ))
            .await?;
        }
        None => {
            ctx.say("Unknown task.").await?;
        }
    }

    Ok(())
}

/// `Some(None)` for the newest task, `None` when nothing can match.
fn task_selector(raw: i64) -> Option<Option<u64>> {
    if raw == -1 {
        return Some(None);
    }
    u64::try_from(raw).ok().map(Some)
}

fn task_line(command: &RunningCommand) -> String {
    format!(
        "`{}` {} • <@{}> • <t:{}:R>",
        command.index, command.qualified_name, command.author_id, command.invoked_at
    )
}

#[cfg(test)]
mod tests {
    use inspector_core::RunningCommand;

    use super::{task_line, task_selector};

    #[test]
    fn selectors() {
        assert_eq!(task_selector(-1), Some(None));
        assert_eq!(task_selector(0), Some(Some(0)));
        assert_eq!(task_selector(12), Some(Some(12)));
        assert_eq!(task_selector(-2), None);
    }

    #[test]
    fn lines_show_index_and_invoker() {
        let command = RunningCommand {
            index: 3,
            trigger_id: 99,
            qualified_name: "tag list".to_owned(),
            author_id: 7,
            invoked_at: 1_700_000_000,
        };
        assert_eq!(task_line(&command), "`3` tag list • <@7> • <t:1700000000:R>");
    }
}
