//! Task form controller.
//!
//! One controller instance per open form. Unbound, it creates tasks;
//! bound to an existing task id, it submits partial updates.

use std::sync::Arc;

use taskdeck_core::error::Result;
use taskdeck_core::task::{NewTask, TaskPatch};
use taskdeck_core::validation::{TaskInput, ValidatedTask};

use crate::tasks::TaskCollection;

use super::{Submission, SubmitGuard};

/// Controller for the task create/edit form.
pub struct TaskForm {
    tasks: Arc<TaskCollection>,
    /// Id of the task being edited; `None` means the form creates.
    task_id: Option<String>,
    guard: SubmitGuard,
}

impl TaskForm {
    /// A form that creates a new task on submit.
    pub fn create(tasks: Arc<TaskCollection>) -> Self {
        Self {
            tasks,
            task_id: None,
            guard: SubmitGuard::default(),
        }
    }

    /// A form bound to an existing task; submit sends a partial update.
    pub fn edit(tasks: Arc<TaskCollection>, task_id: impl Into<String>) -> Self {
        Self {
            tasks,
            task_id: Some(task_id.into()),
            guard: SubmitGuard::default(),
        }
    }

    /// Validates and submits. Returns the new task's id when the form
    /// creates, `None` when it updates. The task list itself changes
    /// only when the next snapshot arrives.
    pub async fn submit(&self, input: TaskInput) -> Result<Submission<Option<String>>> {
        if !self.guard.claim() {
            return Ok(Submission::Ignored);
        }
        let result = self.run(input).await;
        self.guard.release();
        result.map(Submission::Completed)
    }

    async fn run(&self, input: TaskInput) -> Result<Option<String>> {
        let validated = input.validate()?;
        match &self.task_id {
            None => {
                let id = self.tasks.add_task(new_task_from(validated)).await?;
                Ok(Some(id))
            }
            Some(task_id) => {
                self.tasks
                    .update_task(task_id, patch_from(validated))
                    .await?;
                Ok(None)
            }
        }
    }
}

/// Create payload from validated input. New tasks always start as
/// `Todo`; the form's status field only matters when editing.
fn new_task_from(validated: ValidatedTask) -> NewTask {
    let mut new_task = NewTask::new(validated.title);
    if let Some(description) = validated.description {
        new_task = new_task.with_description(description);
    }
    if let Some(due_date) = validated.due_date {
        new_task = new_task.with_due_date(due_date);
    }
    new_task
}

/// Partial update carrying every editable field the form holds.
fn patch_from(validated: ValidatedTask) -> TaskPatch {
    let mut patch = TaskPatch::new()
        .title(validated.title)
        .status(validated.status);
    if let Some(description) = validated.description {
        patch = patch.description(description);
    }
    if let Some(due_date) = validated.due_date {
        patch = patch.due_date(due_date);
    }
    patch
}
