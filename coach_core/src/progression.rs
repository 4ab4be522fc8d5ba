//! Program progression: session completion and the phase gate.
//!
//! Completion moves the (week, session) cursor forward:
//! - Week fully done and not the last week: next week, session 1
//! - Week not done yet: next session in the week
//! - Otherwise the cursor stays put (program finished)
//!
//! At the gate week, recent session records are checked for pain mentions and
//! for exertion above the week's target before the client moves on.

use crate::config::GateConfig;
use crate::types::{Program, SessionRecord};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mark a session complete and advance the cursor
///
/// Returns the updated program; the input is left untouched.
pub fn mark_completed(
    program: &Program,
    week: u32,
    session: u32,
    at: DateTime<Utc>,
) -> Result<Program> {
    let mut updated = program.clone();

    let slot = updated.session_mut(week, session)?;
    slot.completed = true;
    slot.completed_at = Some(at);

    let week_done = updated.week(week).map(|w| w.is_complete()).unwrap_or(false);

    if week_done && week < updated.duration_weeks {
        updated.current_week = week + 1;
        updated.current_session = 1;
        tracing::info!(
            "Week {} complete for {}, moving to week {}",
            week,
            updated.client_id,
            updated.current_week
        );
    } else if !week_done && session < updated.sessions_per_week {
        updated.current_week = week;
        updated.current_session = session + 1;
        tracing::info!(
            "Session {}/{} complete for {}, next is session {}",
            session,
            week,
            updated.client_id,
            updated.current_session
        );
    } else if updated.is_finished() {
        tracing::info!("Program '{}' finished", updated.name);
    } else {
        tracing::debug!(
            "Session {}/{} complete; cursor stays at {:?}",
            session,
            week,
            updated.position()
        );
    }

    Ok(updated)
}

/// What to do after a gate evaluation
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GateAction {
    Proceed,
    RepeatWeek(u32),
}

/// Outcome of the phase gate
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GateDecision {
    pub can_proceed: bool,
    pub reason: String,
    pub action: GateAction,
}

impl GateDecision {
    fn proceed(reason: impl Into<String>) -> Self {
        Self {
            can_proceed: true,
            reason: reason.into(),
            action: GateAction::Proceed,
        }
    }

    fn repeat(week: u32, reason: impl Into<String>) -> Self {
        Self {
            can_proceed: false,
            reason: reason.into(),
            action: GateAction::RepeatWeek(week.max(1)),
        }
    }
}

const PAIN_KEYWORDS: &[&str] = &[
    "douleur", "pain", "blessure", "injur", "hurt", "mal au", "mal à", "mal a ",
];

/// True when the record's mood or debrief mentions pain
pub fn mentions_pain(record: &SessionRecord) -> bool {
    [record.mood.as_deref(), record.debrief.as_deref()]
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .any(|text| PAIN_KEYWORDS.iter().any(|k| text.contains(k)))
}

/// Records from the latest pass through the gate week
///
/// Walking back from the newest record, the pass is the trailing run of
/// records tagged with the gate week. It ends at a record tagged with
/// another week, at a session number seen twice, or after
/// `lookback_sessions` records, so an earlier failed attempt never counts
/// against a repeat. Records newer than the pass are skipped. When no record
/// carries a week tag, the last `lookback_sessions` records stand in for the
/// week.
fn gate_records<'a>(records: &'a [SessionRecord], gate: &GateConfig) -> Vec<&'a SessionRecord> {
    let mut latest: Vec<&SessionRecord> = Vec::new();
    let mut sessions_seen = Vec::new();

    for record in records.iter().rev() {
        match record.week {
            Some(w) if w == gate.week => {
                if let Some(s) = record.session {
                    if sessions_seen.contains(&s) {
                        break;
                    }
                    sessions_seen.push(s);
                }
                latest.push(record);
                if latest.len() >= gate.lookback_sessions {
                    break;
                }
            }
            _ if latest.is_empty() => continue,
            _ => break,
        }
    }

    if !latest.is_empty() {
        latest.reverse();
        return latest;
    }

    if records.iter().any(|r| r.week.is_some()) {
        return latest;
    }

    tracing::warn!(
        "No records tagged with week {}; using the last {} records",
        gate.week,
        gate.lookback_sessions
    );
    let start = records.len().saturating_sub(gate.lookback_sessions);
    records[start..].iter().collect()
}

/// Decide whether the client may move past `week`
///
/// `records` are in chronological order (oldest first). Every week other than
/// the configured gate week passes straight through.
pub fn evaluate_gate(
    week: u32,
    records: &[SessionRecord],
    target_rpe: f32,
    gate: &GateConfig,
) -> GateDecision {
    if week != gate.week {
        return GateDecision::proceed(format!("Week {} is not a gate week", week));
    }

    let considered = gate_records(records, gate);
    if considered.is_empty() {
        let decision = GateDecision::repeat(
            gate.week.saturating_sub(1),
            "No session records to evaluate the gate week",
        );
        tracing::info!("Gate at week {}: {:?}", week, decision.action);
        return decision;
    }

    let decision = if considered.iter().any(|r| mentions_pain(r)) {
        GateDecision::repeat(
            gate.week.saturating_sub(2),
            "Pain reported during the gate week; step back to the lighter week",
        )
    } else {
        match considered.iter().rev().find_map(|r| r.rpe) {
            Some(rpe) if rpe > target_rpe => GateDecision::repeat(
                gate.week.saturating_sub(1),
                format!(
                    "Last RPE {} is above the target of {}; repeat the previous week",
                    rpe, target_rpe
                ),
            ),
            Some(rpe) => GateDecision::proceed(format!(
                "No pain reported and last RPE {} is within the target of {}",
                rpe, target_rpe
            )),
            None => GateDecision::proceed("No pain reported and no RPE recorded"),
        }
    };

    tracing::info!(
        "Gate at week {}: can_proceed={} ({})",
        week,
        decision.can_proceed,
        decision.reason
    );
    decision
}

/// Act on a gate decision once `gate_week` has been completed
///
/// `Proceed` returns the program unchanged. `RepeatWeek(w)` clears the
/// completion of weeks `w..=gate_week` and moves the cursor to (w, 1) so those
/// weeks are trained again. Generated plans stay on their slots.
pub fn apply_gate(program: &Program, gate_week: u32, decision: &GateDecision) -> Result<Program> {
    let repeat = match decision.action {
        GateAction::Proceed => return Ok(program.clone()),
        GateAction::RepeatWeek(w) => w,
    };

    if repeat > gate_week || program.week(repeat).is_none() || program.week(gate_week).is_none() {
        return Err(Error::InvalidReference(format!(
            "cannot repeat week {} from gate week {} in program '{}' (1..={})",
            repeat, gate_week, program.name, program.duration_weeks
        )));
    }

    let mut updated = program.clone();
    for week in updated
        .weeks
        .iter_mut()
        .filter(|w| (repeat..=gate_week).contains(&w.week))
    {
        for slot in &mut week.sessions {
            slot.completed = false;
            slot.completed_at = None;
        }
    }
    updated.current_week = repeat;
    updated.current_session = 1;

    tracing::info!(
        "Gate week {} failed for {}, back to week {}",
        gate_week,
        updated.client_id,
        repeat
    );
    Ok(updated)
}
