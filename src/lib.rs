//! Core library for Taskify.
//!
//! This crate provides the task board domain for Taskify: models, the
//! search query language, audit trail construction and import/export,
//! independent of any UI layer.
//!
//! # Usage
//!
//! ```
//! use taskify_core::audit::AuditRecorder;
//! use taskify_core::board::BoardState;
//! use taskify_core::models::*;
//! use taskify_core::query::filter_tasks;
//!
//! let recorder = AuditRecorder::default();
//! let board = BoardState::default().create_task(
//!     &recorder,
//!     CreateTaskInput {
//!         title: "Preparar la demo".to_string(),
//!         description: String::new(),
//!         priority: Priority::High,
//!         tags: vec!["demo".to_string()],
//!         estimate_minutes: 30,
//!         due_date: String::new(),
//!         status: TaskStatus::Todo,
//!     },
//! );
//!
//! assert_eq!(filter_tasks(&board.tasks, "p:high").len(), 1);
//! assert_eq!(board.audit_log.len(), 1);
//! ```

pub mod audit;
pub mod board;
pub mod import;
pub mod models;
pub mod query;
pub mod storage;
pub mod validate;

// Re-export commonly used types at crate root
pub use audit::AuditRecorder;
pub use board::BoardState;
pub use import::{ImportDelta, ImportError};
