//! Import validation and reconciliation for board backups.
//!
//! Takes untrusted JSON text and turns it into a typed delta the caller can
//! concatenate onto the existing board. Structural problems reject with a
//! single error; field-level problems are collected across ALL tasks and
//! audit events before rejecting, so the user sees the complete list at
//! once. Id collisions against the current board are not errors: the
//! incoming task gets a fresh id and the incoming audit events that
//! referenced the old id are rewritten to match.

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AuditAction, AuditEvent, FieldDiff, FieldValue, GodModeEval, Priority, Task, TaskStatus,
};
use crate::validate::{ValidationError, TITLE_MIN_CHARS};

/// Validated incoming data, ready to be merged onto an existing board.
///
/// This is the delta, not the merged board: the caller decides how to
/// concatenate it (see `BoardState::apply_import`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportDelta {
    pub tasks: Vec<Task>,
    pub audit_log: Vec<AuditEvent>,
    pub god_mode_evals: Vec<GodModeEval>,
    pub god_mode_enabled: bool,
    pub ids_regenerated: usize,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("El archivo no contiene JSON válido")]
    MalformedJson(#[from] serde_json::Error),

    #[error("El JSON no es un objeto válido")]
    NotAnObject,

    #[error("El campo tasks debe ser un array")]
    TasksNotArray,

    #[error("El campo auditLog debe ser un array")]
    AuditLogNotArray,

    #[error("la importación falló con {} error(es) de validación", .0.len())]
    Schema(Vec<ValidationError>),
}

impl ImportError {
    /// Flattens any variant into the field-addressed rows the UI renders.
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        match self {
            ImportError::MalformedJson(_) => {
                vec![ValidationError::new("JSON", "El archivo no contiene JSON válido")]
            }
            ImportError::NotAnObject => {
                vec![ValidationError::new("root", "El JSON no es un objeto válido")]
            }
            ImportError::TasksNotArray => {
                vec![ValidationError::new("tasks", "El campo tasks debe ser un array")]
            }
            ImportError::AuditLogNotArray => {
                vec![ValidationError::new(
                    "auditLog",
                    "El campo auditLog debe ser un array",
                )]
            }
            ImportError::Schema(errors) => errors.clone(),
        }
    }
}

/// Parses, validates and reconciles a board backup against the tasks
/// already on the board.
///
/// Validation is all-or-nothing: a single field error anywhere rejects the
/// whole file, and every error is reported. Collisions between incoming and
/// existing task ids regenerate the incoming id; `godModeEvals` and
/// `godModeEnabled` are optional and default to empty/false.
pub fn validate_and_import(
    json: &str,
    existing_tasks: &[Task],
) -> Result<ImportDelta, ImportError> {
    let parsed: Value = serde_json::from_str(json)?;

    let Some(root) = parsed.as_object() else {
        return Err(ImportError::NotAnObject);
    };
    let Some(raw_tasks) = root.get("tasks").and_then(Value::as_array) else {
        return Err(ImportError::TasksNotArray);
    };
    let Some(raw_events) = root.get("auditLog").and_then(Value::as_array) else {
        return Err(ImportError::AuditLogNotArray);
    };

    let mut errors = Vec::new();

    let mut tasks: Vec<Task> = Vec::with_capacity(raw_tasks.len());
    let mut batch_ids: HashSet<String> = HashSet::new();
    for (index, raw) in raw_tasks.iter().enumerate() {
        match task_from_value(raw, index) {
            Ok(task) => {
                if batch_ids.insert(task.id.clone()) {
                    tasks.push(task);
                } else {
                    errors.push(ValidationError::new(
                        format!("tasks[{index}].id"),
                        "id duplicado dentro del archivo importado",
                    ));
                }
            }
            Err(task_errors) => errors.extend(task_errors),
        }
    }

    let mut audit_log: Vec<AuditEvent> = Vec::with_capacity(raw_events.len());
    for (index, raw) in raw_events.iter().enumerate() {
        match event_from_value(raw, index) {
            Ok(event) => audit_log.push(event),
            Err(event_errors) => errors.extend(event_errors),
        }
    }

    if !errors.is_empty() {
        tracing::debug!("import rejected: {} validation error(s)", errors.len());
        return Err(ImportError::Schema(errors));
    }

    // Collisions are checked against the board present before the import,
    // never between incoming tasks (duplicates within the batch were
    // already rejected above).
    let existing_ids: HashSet<&str> = existing_tasks.iter().map(|t| t.id.as_str()).collect();
    let mut ids_regenerated = 0;
    for task in &mut tasks {
        if existing_ids.contains(task.id.as_str()) {
            let old_id = std::mem::replace(&mut task.id, Uuid::new_v4().to_string());
            for event in &mut audit_log {
                if event.task_id == old_id {
                    event.task_id = task.id.clone();
                }
            }
            ids_regenerated += 1;
        }
    }

    let god_mode_evals = match root.get("godModeEvals").and_then(Value::as_array) {
        Some(entries) => entries
            .iter()
            .filter_map(|entry| match serde_json::from_value::<GodModeEval>(entry.clone()) {
                Ok(eval) => Some(eval),
                Err(err) => {
                    tracing::warn!("dropping malformed godModeEvals entry: {}", err);
                    None
                }
            })
            .collect(),
        None => Vec::new(),
    };
    let god_mode_enabled = root
        .get("godModeEnabled")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    tracing::info!(
        "import validated: {} task(s), {} event(s), {} id(s) regenerated",
        tasks.len(),
        audit_log.len(),
        ids_regenerated
    );

    Ok(ImportDelta {
        tasks,
        audit_log,
        god_mode_evals,
        god_mode_enabled,
        ids_regenerated,
    })
}

fn non_empty_string(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn task_from_value(value: &Value, index: usize) -> Result<Task, Vec<ValidationError>> {
    let prefix = format!("tasks[{index}]");
    let mut errors = Vec::new();

    let id = non_empty_string(value, "id");
    if id.is_none() {
        errors.push(ValidationError::new(
            format!("{prefix}.id"),
            "Falta id o no es string",
        ));
    }

    let title = value
        .get("titulo")
        .and_then(Value::as_str)
        .filter(|t| t.chars().count() >= TITLE_MIN_CHARS)
        .map(str::to_string);
    if title.is_none() {
        errors.push(ValidationError::new(
            format!("{prefix}.titulo"),
            "Falta titulo o tiene menos de 3 caracteres",
        ));
    }

    let description = value
        .get("descripcion")
        .and_then(Value::as_str)
        .map(str::to_string);
    if description.is_none() {
        errors.push(ValidationError::new(
            format!("{prefix}.descripcion"),
            "descripcion debe ser string",
        ));
    }

    let priority = value
        .get("prioridad")
        .and_then(Value::as_str)
        .and_then(Priority::from_str);
    if priority.is_none() {
        errors.push(ValidationError::new(
            format!("{prefix}.prioridad"),
            "prioridad debe ser low, medium o high",
        ));
    }

    let tags = value
        .get("tags")
        .and_then(Value::as_array)
        .and_then(|entries| {
            entries
                .iter()
                .map(|t| t.as_str().map(str::to_string))
                .collect::<Option<Vec<String>>>()
        });
    if tags.is_none() {
        errors.push(ValidationError::new(
            format!("{prefix}.tags"),
            "tags debe ser un array",
        ));
    }

    let estimate_minutes = value
        .get("estimacionMin")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok());
    if estimate_minutes.is_none() {
        errors.push(ValidationError::new(
            format!("{prefix}.estimacionMin"),
            "estimacionMin debe ser un número >= 0",
        ));
    }

    let created_at = non_empty_string(value, "fechaCreacion");
    if created_at.is_none() {
        errors.push(ValidationError::new(
            format!("{prefix}.fechaCreacion"),
            "Falta fechaCreacion",
        ));
    }

    let due_date = value
        .get("fechaLimite")
        .and_then(Value::as_str)
        .map(str::to_string);
    if due_date.is_none() {
        errors.push(ValidationError::new(
            format!("{prefix}.fechaLimite"),
            "fechaLimite debe ser string",
        ));
    }

    let status = value
        .get("estado")
        .and_then(Value::as_str)
        .and_then(TaskStatus::from_str);
    if status.is_none() {
        errors.push(ValidationError::new(
            format!("{prefix}.estado"),
            "estado debe ser todo, doing o done",
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Every option is Some at this point; the fallbacks are never taken.
    Ok(Task {
        id: id.unwrap_or_default(),
        title: title.unwrap_or_default(),
        description: description.unwrap_or_default(),
        priority: priority.unwrap_or(Priority::Medium),
        tags: tags.unwrap_or_default(),
        estimate_minutes: estimate_minutes.unwrap_or_default(),
        created_at: created_at.unwrap_or_default(),
        due_date: due_date.unwrap_or_default(),
        status: status.unwrap_or(TaskStatus::Todo),
    })
}

fn event_from_value(value: &Value, index: usize) -> Result<AuditEvent, Vec<ValidationError>> {
    let prefix = format!("auditLog[{index}]");
    let mut errors = Vec::new();

    let id = non_empty_string(value, "id");
    if id.is_none() {
        errors.push(ValidationError::new(format!("{prefix}.id"), "Falta id"));
    }

    let timestamp = non_empty_string(value, "timestamp");
    if timestamp.is_none() {
        errors.push(ValidationError::new(
            format!("{prefix}.timestamp"),
            "Falta timestamp",
        ));
    }

    let action = value
        .get("accion")
        .and_then(Value::as_str)
        .and_then(AuditAction::from_str);
    if action.is_none() {
        errors.push(ValidationError::new(
            format!("{prefix}.accion"),
            "accion debe ser CREATE, UPDATE, DELETE o MOVE",
        ));
    }

    let task_id = non_empty_string(value, "taskId");
    if task_id.is_none() {
        errors.push(ValidationError::new(
            format!("{prefix}.taskId"),
            "Falta taskId",
        ));
    }

    let diff = diff_from_value(value.get("diff"), &prefix, &mut errors);

    // Denormalized display fields are not validated; anything unusable
    // falls back to empty.
    let task_title = value
        .get("taskTitulo")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let user_label = value
        .get("userLabel")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(AuditEvent {
        id: id.unwrap_or_default(),
        timestamp: timestamp.unwrap_or_default(),
        action: action.unwrap_or(AuditAction::Create),
        task_id: task_id.unwrap_or_default(),
        task_title,
        diff,
        user_label,
    })
}

fn diff_from_value(
    value: Option<&Value>,
    prefix: &str,
    errors: &mut Vec<ValidationError>,
) -> Vec<FieldDiff> {
    let Some(value) = value else {
        return Vec::new();
    };
    if value.is_null() {
        return Vec::new();
    }
    let Some(entries) = value.as_array() else {
        errors.push(ValidationError::new(
            format!("{prefix}.diff"),
            "diff debe ser un array",
        ));
        return Vec::new();
    };

    let mut diffs = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match field_diff_from_value(entry) {
            Some(diff) => diffs.push(diff),
            None => errors.push(ValidationError::new(
                format!("{prefix}.diff[{index}]"),
                "entrada de diff inválida",
            )),
        }
    }
    diffs
}

fn field_diff_from_value(value: &Value) -> Option<FieldDiff> {
    let field = value.get("campo")?.as_str()?;
    let before = field_value_from(value.get("antes"))?;
    let after = field_value_from(value.get("despues"))?;
    Some(FieldDiff::new(field, before, after))
}

fn field_value_from(value: Option<&Value>) -> Option<FieldValue> {
    match value {
        None => Some(FieldValue::Absent),
        Some(v) => serde_json::from_value(v.clone()).ok(),
    }
}
