#![forbid(unsafe_code)]

//! Program generation and progression engine for coached strength training.
//!
//! This crate provides:
//! - Domain types (exercises, periodization rows, programs, workout plans)
//! - Exercise catalog and region/injury filtering
//! - Periodization table and phase/focus calculation
//! - Program skeleton generation and session synthesis
//! - Completion tracking and the phase gate
//! - Host-side persistence (program store, session journal, CSV export)

pub mod types;
pub mod error;
pub mod catalog;
pub mod filter;
pub mod periodization;
pub mod config;
pub mod logging;
pub mod skeleton;
pub mod engine;
pub mod progression;
pub mod store;
pub mod journal;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, default_catalog, ExerciseCatalog};
pub use config::{Config, GateConfig, PlanConfig};
pub use filter::{exclude_by_injury, filter_by_region};
pub use periodization::{program_phase, session_focus, week_scheme, weekly_focus};
pub use skeleton::create_program;
pub use engine::{synthesize, SessionContext, Synthesis};
pub use progression::{apply_gate, evaluate_gate, mark_completed, GateAction, GateDecision};
pub use store::ProgramStore;
pub use journal::{read_records, JsonlJournal, RecordSink};
pub use export::export_schedule_csv;
