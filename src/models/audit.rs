use serde::{Deserialize, Serialize};
use serde_json::Number;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Move,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Move => "MOVE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CREATE" => Some(Self::Create),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "MOVE" => Some(Self::Move),
            _ => None,
        }
    }
}

/// A diffed field value. Serializes untagged so the wire carries plain
/// JSON: null, string, number, or array of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Absent,
    Str(String),
    Num(Number),
    List(Vec<String>),
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Absent
    }
}

impl FieldValue {
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    pub fn num(n: u32) -> Self {
        Self::Num(Number::from(n))
    }

    pub fn list(items: &[String]) -> Self {
        Self::List(items.to_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDiff {
    #[serde(rename = "campo")]
    pub field: String,
    #[serde(rename = "antes", default)]
    pub before: FieldValue,
    #[serde(rename = "despues", default)]
    pub after: FieldValue,
}

impl FieldDiff {
    pub fn new(field: impl Into<String>, before: FieldValue, after: FieldValue) -> Self {
        Self {
            field: field.into(),
            before,
            after,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "accion")]
    pub action: AuditAction,
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(rename = "taskTitulo", default)]
    pub task_title: String,
    #[serde(default)]
    pub diff: Vec<FieldDiff>,
    #[serde(rename = "userLabel", default)]
    pub user_label: String,
}
