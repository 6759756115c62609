//! Input validation for task create/edit forms.
//!
//! Mirrors the bounds the UI enforces before a task reaches the board:
//! title 3..=100 chars, description up to 500, estimate 1..=9999 minutes.
//! Errors are data, not faults: callers collect the full list and render it.

use serde::Serialize;

use crate::models::{CreateTaskInput, UpdateTaskInput};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const ESTIMATE_MIN_MINUTES: u32 = 1;
pub const ESTIMATE_MAX_MINUTES: u32 = 9999;

/// One field-addressed validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    #[serde(rename = "campo")]
    pub field: String,
    #[serde(rename = "mensaje")]
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validates the fields of a new task. Empty result means valid.
pub fn validate_create_input(input: &CreateTaskInput) -> Vec<ValidationError> {
    validate_fields(&input.title, &input.description, input.estimate_minutes)
}

/// Validates the fields of a task edit. Empty result means valid.
pub fn validate_update_input(input: &UpdateTaskInput) -> Vec<ValidationError> {
    validate_fields(&input.title, &input.description, input.estimate_minutes)
}

fn validate_fields(title: &str, description: &str, estimate_minutes: u32) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let title_len = title.chars().count();
    if title_len < TITLE_MIN_CHARS {
        errors.push(ValidationError::new(
            "titulo",
            "El título debe tener al menos 3 caracteres",
        ));
    } else if title_len > TITLE_MAX_CHARS {
        errors.push(ValidationError::new(
            "titulo",
            "El título no puede superar 100 caracteres",
        ));
    }

    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        errors.push(ValidationError::new(
            "descripcion",
            "La descripción no puede superar 500 caracteres",
        ));
    }

    if estimate_minutes < ESTIMATE_MIN_MINUTES {
        errors.push(ValidationError::new(
            "estimacionMin",
            "La estimación debe ser al menos 1 minuto",
        ));
    } else if estimate_minutes > ESTIMATE_MAX_MINUTES {
        errors.push(ValidationError::new(
            "estimacionMin",
            "La estimación no puede superar 9999 minutos",
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TaskStatus};

    fn valid_input() -> CreateTaskInput {
        CreateTaskInput {
            title: "Analizar competencia".to_string(),
            description: "Revisar los tres competidores principales".to_string(),
            priority: Priority::Medium,
            tags: vec!["mercado".to_string()],
            estimate_minutes: 90,
            due_date: String::new(),
            status: TaskStatus::Todo,
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(validate_create_input(&valid_input()).is_empty());
    }

    #[test]
    fn short_title_rejected() {
        let mut input = valid_input();
        input.title = "ab".to_string();
        let errors = validate_create_input(&input);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "titulo");
        assert_eq!(errors[0].message, "El título debe tener al menos 3 caracteres");
    }

    #[test]
    fn overlong_title_rejected() {
        let mut input = valid_input();
        input.title = "x".repeat(101);
        let errors = validate_create_input(&input);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "El título no puede superar 100 caracteres");
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        let mut input = valid_input();
        input.title = "áéí".to_string();
        assert!(validate_create_input(&input).is_empty());
    }

    #[test]
    fn overlong_description_rejected() {
        let mut input = valid_input();
        input.description = "d".repeat(501);
        let errors = validate_create_input(&input);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "descripcion");
    }

    #[test]
    fn estimate_bounds_enforced() {
        let mut input = valid_input();
        input.estimate_minutes = 0;
        let errors = validate_create_input(&input);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "La estimación debe ser al menos 1 minuto");

        input.estimate_minutes = 10_000;
        let errors = validate_create_input(&input);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "La estimación no puede superar 9999 minutos");
    }

    #[test]
    fn all_failures_reported_together() {
        let input = CreateTaskInput {
            title: "ab".to_string(),
            description: "d".repeat(501),
            priority: Priority::Low,
            tags: vec![],
            estimate_minutes: 0,
            due_date: String::new(),
            status: TaskStatus::Todo,
        };
        let errors = validate_create_input(&input);
        assert_eq!(errors.len(), 3);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["titulo", "descripcion", "estimacionMin"]);
    }

    #[test]
    fn update_input_shares_the_same_rules() {
        let input = UpdateTaskInput {
            title: "ab".to_string(),
            description: String::new(),
            priority: Priority::High,
            tags: vec![],
            estimate_minutes: 60,
            due_date: String::new(),
        };
        let errors = validate_update_input(&input);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "titulo");
    }
}
