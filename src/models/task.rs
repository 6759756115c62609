use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "prioridad")]
    pub priority: Priority,
    pub tags: Vec<String>,
    #[serde(rename = "estimacionMin")]
    pub estimate_minutes: u32,
    #[serde(rename = "fechaCreacion")]
    pub created_at: String,
    #[serde(rename = "fechaLimite")]
    pub due_date: String,
    #[serde(rename = "estado")]
    pub status: TaskStatus,
}

impl Task {
    pub fn has_due_date(&self) -> bool {
        !self.due_date.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Todo, Self::Doing, Self::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(Self::Todo),
            "doing" => Some(Self::Doing),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Todo => "Por Hacer",
            Self::Doing => "En Progreso",
            Self::Done => "Completado",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskInput {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "prioridad")]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "estimacionMin")]
    pub estimate_minutes: u32,
    #[serde(rename = "fechaLimite", default)]
    pub due_date: String,
    #[serde(rename = "estado")]
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTaskInput {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "prioridad")]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "estimacionMin")]
    pub estimate_minutes: u32,
    #[serde(rename = "fechaLimite", default)]
    pub due_date: String,
}

/// Splits a comma-separated tag field into individual tags, dropping blanks.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
