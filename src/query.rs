//! Search query parsing and task filtering.
//!
//! A query is whitespace-separated tokens. Operator tokens constrain one
//! dimension each; everything else accumulates into a free-text needle.
//! Parsing never fails: malformed operator values degrade to "no constraint".

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::models::{Priority, Task};

/// Structured form of a search query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFilter {
    pub free_text: String,
    pub tags: Vec<String>,
    pub priority: Option<Priority>,
    pub due: Option<DueFilter>,
    pub estimate: Option<EstimateFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueFilter {
    Overdue,
    Week,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimateFilter {
    pub op: EstimateOp,
    pub value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateOp {
    Lt,
    Gte,
}

/// Parses a raw search string into a [`ParsedFilter`].
///
/// Supported operators:
/// - `tag:nombre` filters by tag (accumulates, OR semantics)
/// - `p:low|medium|high` filters by priority
/// - `due:overdue` tasks whose deadline already passed
/// - `due:week` tasks due within the next 7 days
/// - `est:<60` estimate below 60 minutes
/// - `est:>=120` estimate of 120 minutes or more
pub fn parse_query(query: &str) -> ParsedFilter {
    let mut filter = ParsedFilter::default();
    let mut text_parts: Vec<&str> = Vec::new();

    for token in query.split_whitespace() {
        if let Some(value) = token.strip_prefix("tag:") {
            let value = value.to_lowercase();
            if !value.is_empty() {
                filter.tags.push(value);
            }
        } else if let Some(value) = token.strip_prefix("p:") {
            if let Some(priority) = Priority::from_str(&value.to_lowercase()) {
                filter.priority = Some(priority);
            }
        } else if let Some(value) = token.strip_prefix("due:") {
            match value.to_lowercase().as_str() {
                "overdue" => filter.due = Some(DueFilter::Overdue),
                "week" => filter.due = Some(DueFilter::Week),
                _ => {}
            }
        } else if let Some(value) = token.strip_prefix("est:") {
            // ">=" must be tried before "<"
            if let Some(num) = value.strip_prefix(">=") {
                if let Ok(value) = num.parse::<i64>() {
                    filter.estimate = Some(EstimateFilter {
                        op: EstimateOp::Gte,
                        value,
                    });
                }
            } else if let Some(num) = value.strip_prefix('<') {
                if let Ok(value) = num.parse::<i64>() {
                    filter.estimate = Some(EstimateFilter {
                        op: EstimateOp::Lt,
                        value,
                    });
                }
            }
        } else {
            text_parts.push(token);
        }
    }

    filter.free_text = text_parts.join(" ").to_lowercase();
    filter
}

/// Applies a raw query to a task collection, preserving input order.
///
/// An empty or whitespace-only query returns the tasks unchanged. Active
/// dimensions combine with AND; within the tag dimension the requested tags
/// combine with OR, matched as case-insensitive substrings of task tags.
pub fn filter_tasks(tasks: &[Task], query: &str) -> Vec<Task> {
    filter_tasks_at(tasks, query, Utc::now())
}

// --- Internal functions that accept a clock (for testing) ---

fn filter_tasks_at(tasks: &[Task], query: &str, now: DateTime<Utc>) -> Vec<Task> {
    if query.trim().is_empty() {
        return tasks.to_vec();
    }

    let filter = parse_query(query);
    tasks
        .iter()
        .filter(|task| task_matches(task, &filter, now))
        .cloned()
        .collect()
}

fn task_matches(task: &Task, filter: &ParsedFilter, now: DateTime<Utc>) -> bool {
    if !filter.free_text.is_empty() {
        let title = task.title.to_lowercase();
        let description = task.description.to_lowercase();
        if !title.contains(&filter.free_text) && !description.contains(&filter.free_text) {
            return false;
        }
    }

    if !filter.tags.is_empty() {
        let task_tags: Vec<String> = task.tags.iter().map(|t| t.to_lowercase()).collect();
        let has_tag = filter
            .tags
            .iter()
            .any(|wanted| task_tags.iter().any(|tag| tag.contains(wanted)));
        if !has_tag {
            return false;
        }
    }

    if let Some(priority) = filter.priority {
        if task.priority != priority {
            return false;
        }
    }

    if let Some(due) = filter.due {
        let Some(deadline) = parse_due_date(&task.due_date) else {
            return false;
        };
        match due {
            DueFilter::Overdue => {
                if deadline >= now {
                    return false;
                }
            }
            DueFilter::Week => {
                if deadline < now || deadline > now + Duration::days(7) {
                    return false;
                }
            }
        }
    }

    if let Some(EstimateFilter { op, value }) = filter.estimate {
        let estimate = i64::from(task.estimate_minutes);
        match op {
            EstimateOp::Lt => {
                if estimate >= value {
                    return false;
                }
            }
            EstimateOp::Gte => {
                if estimate < value {
                    return false;
                }
            }
        }
    }

    true
}

/// Accepts full ISO-8601, a bare datetime (read as UTC), or a bare date
/// (midnight UTC). Anything else is treated as no deadline.
fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Example queries surfaced in the search help panel.
pub struct SearchExample {
    pub query: &'static str,
    pub description: &'static str,
}

pub const SEARCH_EXAMPLES: [SearchExample; 8] = [
    SearchExample {
        query: "análisis",
        description: "Busca 'análisis' en título o descripción",
    },
    SearchExample {
        query: "tag:mercado",
        description: "Tareas con el tag 'mercado'",
    },
    SearchExample {
        query: "p:high",
        description: "Solo tareas de prioridad alta",
    },
    SearchExample {
        query: "due:overdue",
        description: "Tareas con fecha límite vencida",
    },
    SearchExample {
        query: "due:week",
        description: "Tareas con fecha límite esta semana",
    },
    SearchExample {
        query: "est:<60",
        description: "Estimación menor a 60 minutos",
    },
    SearchExample {
        query: "est:>=120",
        description: "Estimación de 120 minutos o más",
    },
    SearchExample {
        query: "p:high tag:urgente",
        description: "Combinación de filtros",
    },
];
