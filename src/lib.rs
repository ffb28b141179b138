//! # Fileflow
//!
//! Fileflow is an embeddable engine for e-filing workflows: documents ("files")
//! move through a designer-defined graph of approval steps while their due
//! dates are tracked and overdue files are red-listed.
//!
//! ## Core Features
//!
//! - **Workflow definitions**: node/edge graphs imported from designer JSON, validated and published
//! - **Execution engine**: start, step, pause and resume executions bound to files
//! - **Timing**: remaining time, timer percentage and a business-day holiday calendar
//! - **Red-list sweep**: flags overdue files, deducts score and notifies assignees and admins
//! - **Extensions**: assignees request extra time, the previous sender or an admin decides
//! - **Pluggable storage**: in-memory storage (testing) and PostgreSQL (production)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fileflow::{EngineBuilder, WorkflowModel, runtime::StepOptions, store::data::File};
//!
//! let engine = EngineBuilder::new().build()?;
//! engine.launch();
//!
//! let def = engine.deploy(&WorkflowModel::from_json(json_str)?, "designer")?;
//! engine.publish_workflow(&def.workflow.id, "admin")?;
//!
//! let file = engine.register_file(File::new("F-1", "Leave request", "d1", "clerk"))?;
//! let execution = engine.start_workflow(&def.workflow.id, &file.id, None)?;
//! engine.execute_step(&execution.id, "clerk", "submit", StepOptions::default())?;
//! ```

mod builder;
pub mod collab;
mod common;
mod config;
mod engine;
mod error;
pub mod extension;
mod model;
pub mod redlist;
pub mod runtime;
pub mod store;
pub mod timing;
mod utils;
pub mod workflow;

use std::sync::{Arc, RwLock};

pub use builder::EngineBuilder;
pub use common::{Queue, Vars};
pub use config::{Config, ExecutionConfig, PostgresConfig, RedListConfig, SchedulerConfig, StoreConfig, StoreType};
pub use engine::Engine;
pub use error::FilingError;
pub use model::*;

/// Result type alias for Fileflow operations.
pub type Result<T> = std::result::Result<T, FilingError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
