//! Audit trail construction: field diffs, event records, and the
//! copy-pasteable text report.
//!
//! Everything here is pure computation over task snapshots. Events are
//! prepended to the board log by the caller; nothing is persisted here.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::models::{AuditAction, AuditEvent, FieldDiff, FieldValue, Task, TaskStatus};

pub const DEFAULT_USER_LABEL: &str = "Alumno/a";

/// Builds audit events with a configured attribution label.
#[derive(Debug, Clone)]
pub struct AuditRecorder {
    user_label: String,
}

impl Default for AuditRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_USER_LABEL)
    }
}

impl AuditRecorder {
    pub fn new(user_label: impl Into<String>) -> Self {
        Self {
            user_label: user_label.into(),
        }
    }

    pub fn user_label(&self) -> &str {
        &self.user_label
    }

    /// Builds an event with a fresh id and the current timestamp.
    pub fn record(
        &self,
        action: AuditAction,
        task_id: &str,
        task_title: &str,
        diff: Vec<FieldDiff>,
    ) -> AuditEvent {
        AuditEvent {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            action,
            task_id: task_id.to_string(),
            task_title: task_title.to_string(),
            diff,
            user_label: self.user_label.clone(),
        }
    }

    /// CREATE event. The diff is a curated subset, not a full diff against
    /// an empty task: always title, priority, status and estimate, plus
    /// tags and deadline only when they carry a value.
    pub fn record_create(&self, task: &Task) -> AuditEvent {
        let mut diff = vec![
            FieldDiff::new("titulo", FieldValue::Absent, FieldValue::str(&task.title)),
            FieldDiff::new(
                "prioridad",
                FieldValue::Absent,
                FieldValue::str(task.priority.as_str()),
            ),
            FieldDiff::new(
                "estado",
                FieldValue::Absent,
                FieldValue::str(task.status.as_str()),
            ),
            FieldDiff::new(
                "estimacionMin",
                FieldValue::Absent,
                FieldValue::num(task.estimate_minutes),
            ),
        ];
        if !task.tags.is_empty() {
            diff.push(FieldDiff::new(
                "tags",
                FieldValue::Absent,
                FieldValue::list(&task.tags),
            ));
        }
        if task.has_due_date() {
            diff.push(FieldDiff::new(
                "fechaLimite",
                FieldValue::Absent,
                FieldValue::str(&task.due_date),
            ));
        }
        self.record(AuditAction::Create, &task.id, &task.title, diff)
    }

    pub fn record_update(&self, before: &Task, after: &Task) -> AuditEvent {
        let diff = diff_fields(before, after);
        self.record(AuditAction::Update, &after.id, &after.title, diff)
    }

    pub fn record_move(&self, task: &Task, from: TaskStatus, to: TaskStatus) -> AuditEvent {
        let diff = vec![FieldDiff::new(
            "estado",
            FieldValue::str(from.as_str()),
            FieldValue::str(to.as_str()),
        )];
        self.record(AuditAction::Move, &task.id, &task.title, diff)
    }

    pub fn record_delete(&self, task: &Task) -> AuditEvent {
        let diff = vec![
            FieldDiff::new("titulo", FieldValue::str(&task.title), FieldValue::Absent),
            FieldDiff::new(
                "estado",
                FieldValue::str(task.status.as_str()),
                FieldValue::Absent,
            ),
            FieldDiff::new(
                "prioridad",
                FieldValue::str(task.priority.as_str()),
                FieldValue::Absent,
            ),
        ];
        self.record(AuditAction::Delete, &task.id, &task.title, diff)
    }
}

/// Field-by-field comparison of two task snapshots, in a fixed field
/// order. Emits one entry per changed field; tags compare order-sensitively.
pub fn diff_fields(before: &Task, after: &Task) -> Vec<FieldDiff> {
    let mut diffs = Vec::new();

    if before.title != after.title {
        diffs.push(FieldDiff::new(
            "titulo",
            FieldValue::str(&before.title),
            FieldValue::str(&after.title),
        ));
    }
    if before.description != after.description {
        diffs.push(FieldDiff::new(
            "descripcion",
            FieldValue::str(&before.description),
            FieldValue::str(&after.description),
        ));
    }
    if before.priority != after.priority {
        diffs.push(FieldDiff::new(
            "prioridad",
            FieldValue::str(before.priority.as_str()),
            FieldValue::str(after.priority.as_str()),
        ));
    }
    if before.tags != after.tags {
        diffs.push(FieldDiff::new(
            "tags",
            FieldValue::list(&before.tags),
            FieldValue::list(&after.tags),
        ));
    }
    if before.estimate_minutes != after.estimate_minutes {
        diffs.push(FieldDiff::new(
            "estimacionMin",
            FieldValue::num(before.estimate_minutes),
            FieldValue::num(after.estimate_minutes),
        ));
    }
    if before.due_date != after.due_date {
        diffs.push(FieldDiff::new(
            "fechaLimite",
            FieldValue::str(&before.due_date),
            FieldValue::str(&after.due_date),
        ));
    }
    if before.status != after.status {
        diffs.push(FieldDiff::new(
            "estado",
            FieldValue::str(before.status.as_str()),
            FieldValue::str(after.status.as_str()),
        ));
    }

    diffs
}

/// Renders one diff entry as `campo: antes → despues`, with `∅` for absent
/// values and `[a, b]` for lists.
pub fn format_diff(diff: &FieldDiff) -> String {
    format!(
        "{}: {} → {}",
        diff.field,
        format_value(&diff.before),
        format_value(&diff.after)
    )
}

fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Absent => "∅".to_string(),
        FieldValue::Str(s) => s.clone(),
        FieldValue::Num(n) => n.to_string(),
        FieldValue::List(items) => format!("[{}]", items.join(", ")),
    }
}

/// Renders the audit report: header, per-action tally, then one block per
/// event in input order (the log is newest-first and stays that way).
pub fn summarize(events: &[AuditEvent]) -> String {
    summarize_at(events, Utc::now())
}

// --- Internal functions that accept a clock (for testing) ---

fn summarize_at(events: &[AuditEvent], now: DateTime<Utc>) -> String {
    let heavy = "═".repeat(39);
    let light = "─".repeat(39);

    let mut lines = vec![
        heavy.clone(),
        "  REPORTE DE AUDITORÍA - Micro Trello".to_string(),
        format!("  Generado: {}", format_datetime(now)),
        format!("  Total de eventos: {}", events.len()),
        heavy,
        String::new(),
    ];

    let mut creates = 0;
    let mut updates = 0;
    let mut deletes = 0;
    let mut moves = 0;
    for event in events {
        match event.action {
            AuditAction::Create => creates += 1,
            AuditAction::Update => updates += 1,
            AuditAction::Delete => deletes += 1,
            AuditAction::Move => moves += 1,
        }
    }
    lines.push("Resumen:".to_string());
    lines.push(format!("  Creaciones: {creates}"));
    lines.push(format!("  Ediciones:  {updates}"));
    lines.push(format!("  Movimientos: {moves}"));
    lines.push(format!("  Eliminaciones: {deletes}"));
    lines.push(String::new());
    lines.push(light);
    lines.push(String::new());

    for event in events {
        lines.push(format!(
            "[{}] {} - \"{}\"",
            format_timestamp(&event.timestamp),
            event.action.as_str(),
            event.task_title
        ));
        lines.push(format!(
            "  Usuario: {} | Task ID: {}...",
            event.user_label,
            short_id(&event.task_id)
        ));
        for diff in &event.diff {
            lines.push(format!("  • {}", format_diff(diff)));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%d/%m/%Y, %H:%M:%S").to_string()
}

// Falls back to the raw string for timestamps that do not parse.
fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => format_datetime(dt.with_timezone(&Utc)),
        Err(_) => raw.to_string(),
    }
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn sample_task() -> Task {
        Task {
            id: "12345678-aaaa-bbbb-cccc-000000000000".to_string(),
            title: "Analizar mercado".to_string(),
            description: "Comparar brokers".to_string(),
            priority: Priority::High,
            tags: vec!["mercado".to_string(), "urgente".to_string()],
            estimate_minutes: 120,
            created_at: "2026-01-10T09:00:00.000Z".to_string(),
            due_date: "2026-02-01T00:00:00.000Z".to_string(),
            status: TaskStatus::Todo,
        }
    }

    #[test]
    fn diff_of_identical_tasks_is_empty() {
        let task = sample_task();
        assert!(diff_fields(&task, &task).is_empty());
    }

    #[test]
    fn diff_of_single_field_change_has_one_entry() {
        let before = sample_task();
        let mut after = before.clone();
        after.estimate_minutes = 60;
        let diffs = diff_fields(&before, &after);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].field, "estimacionMin");
        assert_eq!(diffs[0].before, FieldValue::num(120));
        assert_eq!(diffs[0].after, FieldValue::num(60));
    }

    #[test]
    fn diff_reorders_nothing_and_follows_the_fixed_field_order() {
        let before = sample_task();
        let mut after = before.clone();
        after.status = TaskStatus::Doing;
        after.title = "Analizar mercado local".to_string();
        after.due_date = String::new();
        let diffs = diff_fields(&before, &after);
        let fields: Vec<&str> = diffs.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["titulo", "fechaLimite", "estado"]);
    }

    #[test]
    fn tag_comparison_is_order_sensitive() {
        let before = sample_task();
        let mut after = before.clone();
        after.tags = vec!["urgente".to_string(), "mercado".to_string()];
        let diffs = diff_fields(&before, &after);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].field, "tags");
    }

    #[test]
    fn create_event_uses_the_curated_subset() {
        let recorder = AuditRecorder::default();
        let event = recorder.record_create(&sample_task());

        assert_eq!(event.action, AuditAction::Create);
        assert_eq!(event.task_title, "Analizar mercado");
        let fields: Vec<&str> = event.diff.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["titulo", "prioridad", "estado", "estimacionMin", "tags", "fechaLimite"]
        );
        assert!(event.diff.iter().all(|d| d.before == FieldValue::Absent));
    }

    #[test]
    fn create_event_omits_empty_tags_and_unset_deadline() {
        let mut task = sample_task();
        task.tags.clear();
        task.due_date = String::new();
        let event = AuditRecorder::default().record_create(&task);
        let fields: Vec<&str> = event.diff.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["titulo", "prioridad", "estado", "estimacionMin"]);
    }

    #[test]
    fn update_event_carries_the_field_diff() {
        let before = sample_task();
        let mut after = before.clone();
        after.priority = Priority::Low;
        let event = AuditRecorder::default().record_update(&before, &after);
        assert_eq!(event.action, AuditAction::Update);
        assert_eq!(event.task_id, after.id);
        assert_eq!(event.diff.len(), 1);
        assert_eq!(event.diff[0].field, "prioridad");
    }

    #[test]
    fn move_event_has_exactly_one_status_entry() {
        let task = sample_task();
        let event =
            AuditRecorder::default().record_move(&task, TaskStatus::Todo, TaskStatus::Doing);
        assert_eq!(event.action, AuditAction::Move);
        assert_eq!(event.diff.len(), 1);
        assert_eq!(event.diff[0].field, "estado");
        assert_eq!(event.diff[0].before, FieldValue::str("todo"));
        assert_eq!(event.diff[0].after, FieldValue::str("doing"));
    }

    #[test]
    fn delete_event_mirrors_create_with_roles_inverted() {
        let task = sample_task();
        let recorder = AuditRecorder::default();
        let created = recorder.record_create(&task);
        let deleted = recorder.record_delete(&task);

        assert_eq!(deleted.action, AuditAction::Delete);
        assert!(deleted.diff.iter().all(|d| d.after == FieldValue::Absent));
        // shared subset: titulo, estado, prioridad
        for field in ["titulo", "estado", "prioridad"] {
            let before_create = &created.diff.iter().find(|d| d.field == field).unwrap().after;
            let after_delete = &deleted.diff.iter().find(|d| d.field == field).unwrap().before;
            assert_eq!(before_create, after_delete);
        }
    }

    #[test]
    fn events_get_fresh_ids_and_parseable_timestamps() {
        let recorder = AuditRecorder::default();
        let task = sample_task();
        let a = recorder.record_create(&task);
        let b = recorder.record_create(&task);
        assert_ne!(a.id, b.id);
        assert!(a.timestamp.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&a.timestamp).is_ok());
        assert_eq!(a.user_label, DEFAULT_USER_LABEL);
    }

    #[test]
    fn recorder_label_is_injectable() {
        let recorder = AuditRecorder::new("Profesor/a");
        let event = recorder.record_delete(&sample_task());
        assert_eq!(event.user_label, "Profesor/a");
    }

    #[test]
    fn format_diff_renders_scalars_absent_and_lists() {
        assert_eq!(
            format_diff(&FieldDiff::new(
                "titulo",
                FieldValue::str("antigua"),
                FieldValue::str("nueva")
            )),
            "titulo: antigua → nueva"
        );
        assert_eq!(
            format_diff(&FieldDiff::new(
                "fechaLimite",
                FieldValue::Absent,
                FieldValue::str("2026-02-01")
            )),
            "fechaLimite: ∅ → 2026-02-01"
        );
        assert_eq!(
            format_diff(&FieldDiff::new(
                "tags",
                FieldValue::list(&["a".to_string(), "b".to_string()]),
                FieldValue::List(vec![])
            )),
            "tags: [a, b] → []"
        );
        assert_eq!(
            format_diff(&FieldDiff::new(
                "estimacionMin",
                FieldValue::num(30),
                FieldValue::num(45)
            )),
            "estimacionMin: 30 → 45"
        );
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn summarize_renders_header_tally_and_event_blocks_in_order() {
        let recorder = AuditRecorder::default();
        let task = sample_task();
        let mut newer = recorder.record_move(&task, TaskStatus::Todo, TaskStatus::Doing);
        newer.timestamp = "2026-03-14T08:00:00.000Z".to_string();
        let mut older = recorder.record_create(&task);
        older.timestamp = "2026-03-13T09:15:30.000Z".to_string();

        let report = summarize_at(&[newer, older], fixed_now());
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "═".repeat(39));
        assert_eq!(lines[1], "  REPORTE DE AUDITORÍA - Micro Trello");
        assert_eq!(lines[2], "  Generado: 15/03/2026, 10:30:00");
        assert_eq!(lines[3], "  Total de eventos: 2");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Resumen:");
        assert_eq!(lines[7], "  Creaciones: 1");
        assert_eq!(lines[8], "  Ediciones:  0");
        assert_eq!(lines[9], "  Movimientos: 1");
        assert_eq!(lines[10], "  Eliminaciones: 0");
        assert_eq!(lines[12], "─".repeat(39));

        // newest first, order preserved
        assert_eq!(lines[14], "[14/03/2026, 08:00:00] MOVE - \"Analizar mercado\"");
        assert_eq!(lines[15], "  Usuario: Alumno/a | Task ID: 12345678...");
        assert_eq!(lines[16], "  • estado: todo → doing");
        assert_eq!(lines[17], "");
        assert_eq!(lines[18], "[13/03/2026, 09:15:30] CREATE - \"Analizar mercado\"");
    }

    #[test]
    fn summarize_of_no_events_still_renders_the_header() {
        let report = summarize_at(&[], fixed_now());
        assert!(report.contains("Total de eventos: 0"));
        assert!(report.contains("  Creaciones: 0"));
        assert!(!report.contains('['));
    }

    #[test]
    fn short_ids_do_not_panic_on_short_input() {
        assert_eq!(short_id("import"), "import");
        assert_eq!(short_id("12345678-rest"), "12345678");
    }
}
