//! Core domain types for the program generation engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise definitions and body regions
//! - Periodization rows
//! - The program aggregate (weeks, sessions, generated workouts)
//! - Client profile and session records consumed by the gate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{Error, Result};

// ============================================================================
// Exercise Types
// ============================================================================

/// Body region an exercise belongs to. Every catalog entry maps to exactly one.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum BodyRegion {
    Upper,
    Lower,
    Core,
}

impl fmt::Display for BodyRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyRegion::Upper => write!(f, "upper"),
            BodyRegion::Lower => write!(f, "lower"),
            BodyRegion::Core => write!(f, "core"),
        }
    }
}

/// A catalog entry (e.g., "Goblet Squat")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Muscles and regions the exercise loads
    pub targets: Vec<String>,
    /// Conditions for which the exercise is a preferred pick
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tip: String,
    #[serde(default)]
    pub suggested_load: Option<String>,
}

// ============================================================================
// Periodization
// ============================================================================

/// One row of the periodization table
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct WeekScheme {
    pub week: u32,
    pub phase: &'static str,
    pub sets: u32,
    pub reps: u32,
    /// Target RPE, half-point granularity
    pub target_rpe: f32,
    pub rest_seconds: u32,
}

// ============================================================================
// Client Profile
// ============================================================================

/// Declared training experience
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Other(String),
}

impl ExperienceLevel {
    /// Parse a free-text level as entered by the coach
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "debutant" | "débutant" | "novice" => ExperienceLevel::Beginner,
            "intermediate" | "intermediaire" | "intermédiaire" => ExperienceLevel::Intermediate,
            "advanced" | "avance" | "avancé" | "confirmed" | "confirmé" => {
                ExperienceLevel::Advanced
            }
            other => ExperienceLevel::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperienceLevel::Beginner => write!(f, "beginner"),
            ExperienceLevel::Intermediate => write!(f, "intermediate"),
            ExperienceLevel::Advanced => write!(f, "advanced"),
            ExperienceLevel::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Read-only view of the client the engine generates for
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ClientProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub injuries: Vec<String>,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
}

/// A debrief the client left after training. Input to the phase gate.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    /// Program week the session belonged to, when the host tagged it
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default)]
    pub session: Option<u32>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub debrief: Option<String>,
    #[serde(default)]
    pub rpe: Option<f32>,
}

// ============================================================================
// Workout Plan
// ============================================================================

/// How the main block is performed
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStructure {
    /// Exercises chained back to back, rest after each round
    Circuit,
    /// Straight sets, all sets of one exercise before the next
    Series,
}

/// A timed warm-up, stretch or cool-down step
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanPhase {
    pub name: String,
    pub duration_seconds: u32,
    pub instructions: String,
}

/// A catalog entry stamped with the week's training parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PrescribedExercise {
    pub exercise_id: String,
    pub name: String,
    pub region: BodyRegion,
    pub sets: u32,
    pub reps: u32,
    pub rest_seconds: u32,
    pub target_rpe: f32,
    pub tip: String,
    pub suggested_load: Option<String>,
}

/// A region that could not supply every pick the split pattern asked for
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shortfall {
    pub region: BodyRegion,
    pub requested: usize,
    pub provided: usize,
}

/// A ready-to-perform session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlan {
    pub opening: String,
    pub structure: WorkoutStructure,
    pub warm_up: Vec<PlanPhase>,
    pub dynamic_stretch: Vec<PlanPhase>,
    pub exercises: Vec<PrescribedExercise>,
    pub cool_down: Vec<PlanPhase>,
    pub estimated_minutes: u32,
    #[serde(default)]
    pub shortfalls: Vec<Shortfall>,
}

impl WorkoutPlan {
    /// True when injury filtering left the session with fewer exercises than
    /// its split pattern calls for
    pub fn is_partial(&self) -> bool {
        !self.shortfalls.is_empty()
    }
}

// ============================================================================
// Program Aggregate
// ============================================================================

/// One session slot inside a week
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionProgram {
    pub session: u32,
    pub focus: String,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Generated on first request, then kept for the life of the program
    pub workout: Option<WorkoutPlan>,
}

/// One week of the program
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeekProgram {
    pub week: u32,
    pub focus: String,
    pub sessions: Vec<SessionProgram>,
}

impl WeekProgram {
    pub fn is_complete(&self) -> bool {
        self.sessions.iter().all(|s| s.completed)
    }
}

/// A client's full periodized program
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Program {
    pub id: Uuid,
    pub client_id: String,
    pub name: String,
    pub duration_weeks: u32,
    pub sessions_per_week: u32,
    pub created_at: DateTime<Utc>,
    pub current_week: u32,
    pub current_session: u32,
    pub weeks: Vec<WeekProgram>,
}

impl Program {
    /// Current (week, session) cursor
    pub fn position(&self) -> (u32, u32) {
        (self.current_week, self.current_session)
    }

    pub fn week(&self, week: u32) -> Option<&WeekProgram> {
        self.weeks.iter().find(|w| w.week == week)
    }

    /// Look up a session slot, failing on out-of-range references
    pub fn session(&self, week: u32, session: u32) -> Result<&SessionProgram> {
        let w = self.week(week).ok_or_else(|| {
            Error::InvalidReference(format!(
                "week {} is outside program '{}' (1..={})",
                week, self.name, self.duration_weeks
            ))
        })?;
        w.sessions
            .iter()
            .find(|s| s.session == session)
            .ok_or_else(|| {
                Error::InvalidReference(format!(
                    "session {} is outside week {} (1..={})",
                    session, week, self.sessions_per_week
                ))
            })
    }

    pub(crate) fn session_mut(&mut self, week: u32, session: u32) -> Result<&mut SessionProgram> {
        // Validate through the shared path so both lookups report the same errors
        self.session(week, session)?;
        self.weeks
            .iter_mut()
            .find(|w| w.week == week)
            .and_then(|w| w.sessions.iter_mut().find(|s| s.session == session))
            .ok_or_else(|| Error::InvalidReference(format!("week {} session {}", week, session)))
    }

    /// True once every session of every week has been completed
    pub fn is_finished(&self) -> bool {
        self.weeks.iter().all(WeekProgram::is_complete)
    }
}
