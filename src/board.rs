//! Board aggregate and the mutations the UI drives.
//!
//! Every mutation returns a new `BoardState` instead of editing in place;
//! the caller decides whether to keep and persist it. Each task mutation
//! also prepends the matching audit event, so log and tasks never drift
//! apart.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditRecorder;
use crate::import::ImportDelta;
use crate::models::{
    AuditAction, AuditEvent, CreateTaskInput, FieldDiff, FieldValue, GodModeEval, Task,
    TaskStatus, UpdateTaskInput,
};

/// The full persisted state: tasks, audit log (newest first), evaluations
/// and the evaluation-mode flag. This is also the export/import wire shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    pub tasks: Vec<Task>,
    #[serde(rename = "auditLog")]
    pub audit_log: Vec<AuditEvent>,
    #[serde(rename = "godModeEvals", default)]
    pub god_mode_evals: Vec<GodModeEval>,
    #[serde(rename = "godModeEnabled", default)]
    pub god_mode_enabled: bool,
}

impl BoardState {
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Tasks currently in one column, in board order.
    pub fn tasks_in(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    /// Adds a new task with a fresh id and creation timestamp.
    pub fn create_task(&self, recorder: &AuditRecorder, input: CreateTaskInput) -> BoardState {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            priority: input.priority,
            tags: input.tags,
            estimate_minutes: input.estimate_minutes,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            due_date: input.due_date,
            status: input.status,
        };
        let event = recorder.record_create(&task);

        let mut next = self.clone();
        next.tasks.push(task);
        next.audit_log.insert(0, event);
        next
    }

    /// Replaces the editable fields of an existing task. Id, creation
    /// timestamp and column are preserved; an unknown id is a no-op.
    pub fn update_task(
        &self,
        recorder: &AuditRecorder,
        task_id: &str,
        input: UpdateTaskInput,
    ) -> BoardState {
        let Some(before) = self.task(task_id) else {
            return self.clone();
        };
        let after = Task {
            id: before.id.clone(),
            title: input.title,
            description: input.description,
            priority: input.priority,
            tags: input.tags,
            estimate_minutes: input.estimate_minutes,
            created_at: before.created_at.clone(),
            due_date: input.due_date,
            status: before.status,
        };
        let event = recorder.record_update(before, &after);

        let mut next = self.clone();
        if let Some(slot) = next.tasks.iter_mut().find(|t| t.id == task_id) {
            *slot = after;
        }
        next.audit_log.insert(0, event);
        next
    }

    /// Moves a task to another column. Same column or unknown id is a
    /// no-op with no audit event.
    pub fn move_task(&self, recorder: &AuditRecorder, task_id: &str, to: TaskStatus) -> BoardState {
        let Some(task) = self.task(task_id) else {
            return self.clone();
        };
        if task.status == to {
            return self.clone();
        }

        let from = task.status;
        let mut moved = task.clone();
        moved.status = to;
        let event = recorder.record_move(&moved, from, to);

        let mut next = self.clone();
        if let Some(slot) = next.tasks.iter_mut().find(|t| t.id == task_id) {
            *slot = moved;
        }
        next.audit_log.insert(0, event);
        next
    }

    /// Removes a task along with its evaluation, if any. The audit trail
    /// keeps every event that referenced it.
    pub fn delete_task(&self, recorder: &AuditRecorder, task_id: &str) -> BoardState {
        let Some(task) = self.task(task_id) else {
            return self.clone();
        };
        let event = recorder.record_delete(task);

        let mut next = self.clone();
        next.tasks.retain(|t| t.id != task_id);
        next.god_mode_evals.retain(|e| e.task_id != task_id);
        next.audit_log.insert(0, event);
        next
    }

    pub fn toggle_god_mode(&self) -> BoardState {
        let mut next = self.clone();
        next.god_mode_enabled = !next.god_mode_enabled;
        next
    }

    /// Upserts an evaluation keyed by task id: replaces in place when one
    /// exists, appends otherwise.
    pub fn save_eval(&self, eval: GodModeEval) -> BoardState {
        let mut next = self.clone();
        match next
            .god_mode_evals
            .iter_mut()
            .find(|e| e.task_id == eval.task_id)
        {
            Some(slot) => *slot = eval,
            None => next.god_mode_evals.push(eval),
        }
        next
    }

    /// Concatenates a validated import delta onto the board: incoming
    /// tasks, events and evaluations go after the existing ones, and when
    /// any id was regenerated a summary event is prepended to the log.
    /// The board's own evaluation-mode flag wins over the imported one.
    pub fn apply_import(&self, recorder: &AuditRecorder, delta: ImportDelta) -> BoardState {
        let mut audit_log =
            Vec::with_capacity(self.audit_log.len() + delta.audit_log.len() + 1);
        if delta.ids_regenerated > 0 {
            audit_log.push(recorder.record(
                AuditAction::Create,
                "import",
                &format!("Importación ({} IDs regenerados)", delta.ids_regenerated),
                vec![FieldDiff::new(
                    "import",
                    FieldValue::Absent,
                    FieldValue::str(format!("{} tareas importadas", delta.tasks.len())),
                )],
            ));
        }
        audit_log.extend(self.audit_log.iter().cloned());
        audit_log.extend(delta.audit_log);

        let mut tasks = self.tasks.clone();
        tasks.extend(delta.tasks);
        let mut god_mode_evals = self.god_mode_evals.clone();
        god_mode_evals.extend(delta.god_mode_evals);

        BoardState {
            tasks,
            audit_log,
            god_mode_evals,
            god_mode_enabled: self.god_mode_enabled,
        }
    }
}
