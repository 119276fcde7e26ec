//! Client subcommands: list, add and done against a running server.
//!
//! Each command drives a [`SyncController`] the way a UI would: mutate,
//! then print the refreshed list.

use anyhow::{Result, bail};
use clap::Args;
use std::io::Write;

use crate::client::{SyncController, TaskApi, TaskDraft, ViewState};
use crate::types::{Task, TaskId};

/// Arguments for the add subcommand
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task title
    #[arg(short, long)]
    pub title: String,

    /// Task description
    #[arg(long)]
    pub description: String,
}

/// Arguments for the done subcommand
#[derive(Args, Debug)]
pub struct DoneArgs {
    /// Id of the task to complete
    pub id: TaskId,
}

/// Render tasks as plain text, one per line.
pub fn render_tasks<W: Write>(out: &mut W, tasks: &[Task]) -> std::io::Result<()> {
    if tasks.is_empty() {
        return writeln!(out, "No pending tasks");
    }
    for task in tasks {
        writeln!(out, "[{}] {}", task.id, task.title)?;
        if !task.description.is_empty() {
            writeln!(out, "      {}", task.description)?;
        }
    }
    Ok(())
}

fn print_view<W: Write>(out: &mut W, view: &ViewState) -> Result<()> {
    match view {
        ViewState::Ready(tasks) => render_tasks(out, tasks)?,
        ViewState::Loading => writeln!(out, "Loading...")?,
        ViewState::Failed(e) => bail!("could not load tasks: {e}"),
    }
    Ok(())
}

pub async fn run_list<A: TaskApi, W: Write>(controller: &SyncController<A>, out: &mut W) -> Result<()> {
    controller.mount().await;
    print_view(out, &controller.snapshot().view)
}

pub async fn run_add<A: TaskApi, W: Write>(
    controller: &SyncController<A>,
    args: AddArgs,
    out: &mut W,
) -> Result<()> {
    controller.set_draft(TaskDraft::new(args.title, args.description));
    let task = controller.create().await?;
    writeln!(out, "Created task {}", task.id)?;
    print_view(out, &controller.snapshot().view)
}

pub async fn run_done<A: TaskApi, W: Write>(
    controller: &SyncController<A>,
    args: DoneArgs,
    out: &mut W,
) -> Result<()> {
    controller.complete(args.id).await?;
    writeln!(out, "Completed task {}", args.id)?;
    print_view(out, &controller.snapshot().view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_empty_list() {
        let mut out = Vec::new();
        render_tasks(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No pending tasks\n");
    }

    #[test]
    fn render_includes_id_and_description() {
        let tasks = vec![Task {
            id: 3,
            title: "Proposal".into(),
            description: "First draft".into(),
            status: false,
            created_at: 0,
        }];
        let mut out = Vec::new();
        render_tasks(&mut out, &tasks).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[3] Proposal"));
        assert!(text.contains("First draft"));
    }
}
