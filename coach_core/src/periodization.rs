//! Periodization table and phase/focus calculation.
//!
//! The table is fixed at 21 weeks. Lookups outside it return `None`; the
//! engine turns that into an `InvalidReference` rather than extrapolating.

use crate::types::WeekScheme;

/// Number of weeks covered by the periodization table
pub const TABLE_WEEKS: u32 = 21;

/// Week at which the pain/exertion gate is evaluated
pub const GATE_WEEK: u32 = 12;

/// Posture work replaces the regular focus up to this week for injured clients
pub const POSTURE_CORRECTION_WEEKS: u32 = 8;

const fn row(
    week: u32,
    phase: &'static str,
    sets: u32,
    reps: u32,
    target_rpe: f32,
    rest_seconds: u32,
) -> WeekScheme {
    WeekScheme {
        week,
        phase,
        sets,
        reps,
        target_rpe,
        rest_seconds,
    }
}

#[rustfmt::skip]
static WEEK_SCHEMES: [WeekScheme; TABLE_WEEKS as usize] = [
    row(1,  "adaptation",      2, 15, 5.0,  60),
    row(2,  "adaptation",      2, 15, 5.5,  60),
    row(3,  "adaptation",      3, 12, 6.0,  60),
    row(4,  "adaptation",      3, 12, 6.5,  75),
    row(5,  "development",     3, 12, 7.0,  75),
    row(6,  "development",     3, 10, 7.0,  90),
    row(7,  "development",     3, 10, 7.5,  90),
    row(8,  "development",     4, 10, 7.5,  90),
    row(9,  "development",     4,  8, 8.0,  90),
    row(10, "deload",          2, 10, 6.0,  60),
    row(11, "intensification", 4,  8, 8.0, 120),
    row(12, "intensification", 4,  6, 8.0, 120),
    row(13, "intensification", 4,  6, 8.5, 120),
    row(14, "intensification", 4,  5, 8.5, 150),
    row(15, "intensification", 5,  5, 9.0, 150),
    row(16, "deload",          3,  8, 6.5,  90),
    row(17, "specialization",  4,  6, 8.0, 120),
    row(18, "specialization",  4,  5, 8.5, 150),
    row(19, "specialization",  5,  4, 9.0, 180),
    row(20, "specialization",  5,  3, 9.0, 180),
    row(21, "consolidation",   3,  8, 7.0,  90),
];

/// Look up the training parameters for a week
pub fn week_scheme(week: u32) -> Option<&'static WeekScheme> {
    if week == 0 {
        return None;
    }
    WEEK_SCHEMES.get((week - 1) as usize)
}

/// The whole table, in week order
pub fn week_schemes() -> &'static [WeekScheme] {
    &WEEK_SCHEMES
}

/// Coarse macro-phase of a week
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseInfo {
    pub name: &'static str,
    pub focus: &'static str,
    pub intensity_factor: f32,
}

/// Macro-phase as a step function of the week number
pub fn program_phase(week: u32) -> PhaseInfo {
    match week {
        0..=4 => PhaseInfo {
            name: "adaptation",
            focus: "Anatomical adaptation and technique",
            intensity_factor: 0.6,
        },
        5..=10 => PhaseInfo {
            name: "development",
            focus: "General strength development",
            intensity_factor: 0.7,
        },
        11..=16 => PhaseInfo {
            name: "intensification",
            focus: "Intensification and maximal strength",
            intensity_factor: 0.8,
        },
        17..=20 => PhaseInfo {
            name: "specialization",
            focus: "Goal-specific specialization",
            intensity_factor: 0.85,
        },
        _ => PhaseInfo {
            name: "consolidation",
            focus: "Consolidation and maintenance",
            intensity_factor: 0.75,
        },
    }
}

/// Micro-focus rotating every week on a 3-week cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeeklyFocus {
    Strength,
    Hypertrophy,
    Endurance,
}

impl WeeklyFocus {
    pub fn label(&self) -> &'static str {
        match self {
            WeeklyFocus::Strength => "Strength",
            WeeklyFocus::Hypertrophy => "Hypertrophy and volume",
            WeeklyFocus::Endurance => "Muscular endurance and mobility",
        }
    }

    pub fn intensity_factor(&self) -> f32 {
        match self {
            WeeklyFocus::Strength => 0.85,
            WeeklyFocus::Hypertrophy => 0.75,
            WeeklyFocus::Endurance => 0.6,
        }
    }
}

/// Weekly focus, independent of the macro-phase
pub fn weekly_focus(week: u32) -> WeeklyFocus {
    match week.saturating_sub(1) % 3 {
        0 => WeeklyFocus::Strength,
        1 => WeeklyFocus::Hypertrophy,
        _ => WeeklyFocus::Endurance,
    }
}

const UPPER_INJURY_KEYWORDS: &[&str] = &[
    "shoulder", "épaule", "epaule", "elbow", "coude", "wrist", "poignet", "neck", "nuque",
    "cervical", "back", "dos", "trapez",
];

const LOWER_INJURY_KEYWORDS: &[&str] = &[
    "knee", "genou", "hip", "hanche", "ankle", "cheville", "foot", "pied", "hamstring",
    "ischio", "lombaire", "lumbar", "tendon",
];

fn any_injury_matches(injuries: &[String], keywords: &[&str]) -> bool {
    injuries
        .iter()
        .map(|i| i.to_lowercase())
        .any(|i| keywords.iter().any(|k| i.contains(k)))
}

/// True when the injury list declares an upper- or lower-body problem
pub fn has_structural_injury(injuries: &[String]) -> bool {
    any_injury_matches(injuries, UPPER_INJURY_KEYWORDS)
        || any_injury_matches(injuries, LOWER_INJURY_KEYWORDS)
}

/// Focus label for a single session
pub fn session_focus(week: u32, session: u32, injuries: &[String]) -> String {
    if week <= POSTURE_CORRECTION_WEEKS && has_structural_injury(injuries) {
        return "Posture correction".to_string();
    }

    let focus = weekly_focus(week);
    let phase = program_phase(week);
    format!("{} - {} (session {})", focus.label(), phase.name, session)
}
