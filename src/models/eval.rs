use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GodModeEval {
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(rename = "nota")]
    pub score: f64,
    #[serde(rename = "observaciones", default)]
    pub notes: String,
}
