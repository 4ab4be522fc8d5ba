//! Program skeleton generation.
//!
//! Builds every week/session slot up front with focus labels only. Exercise
//! selection happens later, per session, so it sees the client's injuries as
//! they stand on training day.

use crate::periodization::{program_phase, session_focus, TABLE_WEEKS};
use crate::types::{ClientProfile, Program, SessionProgram, WeekProgram};
use crate::{Error, Result};
use chrono::Utc;
use uuid::Uuid;

/// Create a fresh program for a client with the cursor at week 1, session 1
pub fn create_program(
    profile: &ClientProfile,
    duration_weeks: u32,
    sessions_per_week: u32,
    name: Option<&str>,
) -> Result<Program> {
    if duration_weeks == 0 {
        return Err(Error::InvalidConfiguration(
            "program duration must be at least one week".into(),
        ));
    }
    if sessions_per_week == 0 {
        return Err(Error::InvalidConfiguration(
            "a program needs at least one session per week".into(),
        ));
    }
    if duration_weeks > TABLE_WEEKS {
        tracing::warn!(
            "Program of {} weeks runs past the {}-week periodization table; later weeks cannot be generated",
            duration_weeks,
            TABLE_WEEKS
        );
    }

    let weeks = (1..=duration_weeks)
        .map(|week| WeekProgram {
            week,
            focus: program_phase(week).focus.to_string(),
            sessions: (1..=sessions_per_week)
                .map(|session| SessionProgram {
                    session,
                    focus: session_focus(week, session, &profile.injuries),
                    completed: false,
                    completed_at: None,
                    workout: None,
                })
                .collect(),
        })
        .collect();

    let name = match name {
        Some(n) if !n.trim().is_empty() => n.trim().to_string(),
        _ => format!("{} - {} weeks", profile.name, duration_weeks),
    };

    let program = Program {
        id: Uuid::new_v4(),
        client_id: profile.id.clone(),
        name,
        duration_weeks,
        sessions_per_week,
        created_at: Utc::now(),
        current_week: 1,
        current_session: 1,
        weeks,
    };

    tracing::info!(
        "Created program '{}' for client {}: {} weeks x {} sessions",
        program.name,
        program.client_id,
        duration_weeks,
        sessions_per_week
    );

    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ClientProfile {
        ClientProfile {
            id: "client-1".into(),
            name: "Alex".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_skeleton_shape() {
        let program = create_program(&profile(), 4, 3, Some("Spring block")).unwrap();

        assert_eq!(program.name, "Spring block");
        assert_eq!(program.weeks.len(), 4);
        for (i, week) in program.weeks.iter().enumerate() {
            assert_eq!(week.week, i as u32 + 1);
            assert_eq!(week.sessions.len(), 3);
            for (j, session) in week.sessions.iter().enumerate() {
                assert_eq!(session.session, j as u32 + 1);
                assert!(!session.completed);
                assert!(session.completed_at.is_none());
                assert!(session.workout.is_none());
                assert!(!session.focus.is_empty());
            }
        }
        assert_eq!(program.position(), (1, 1));
    }

    #[test]
    fn test_default_name() {
        let program = create_program(&profile(), 2, 1, None).unwrap();
        assert_eq!(program.name, "Alex - 2 weeks");
    }

    #[test]
    fn test_zero_duration_rejected() {
        let result = create_program(&profile(), 0, 3, None);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_zero_sessions_rejected() {
        let result = create_program(&profile(), 4, 0, None);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_week_focus_follows_macro_phase() {
        let program = create_program(&profile(), 12, 2, None).unwrap();
        assert_eq!(program.weeks[0].focus, program_phase(1).focus);
        assert_eq!(program.weeks[11].focus, program_phase(12).focus);
    }

    #[test]
    fn test_injured_client_gets_posture_sessions_early() {
        let mut p = profile();
        p.injuries = vec!["shoulder".into()];
        let program = create_program(&p, 10, 2, None).unwrap();

        assert_eq!(program.weeks[0].sessions[0].focus, "Posture correction");
        assert_ne!(program.weeks[9].sessions[0].focus, "Posture correction");
    }

    #[test]
    fn test_long_program_allowed() {
        let program = create_program(&profile(), TABLE_WEEKS + 3, 1, None).unwrap();
        assert_eq!(program.weeks.len(), (TABLE_WEEKS + 3) as usize);
    }
}
