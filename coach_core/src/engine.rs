//! Session workout synthesis.
//!
//! Turns a (week, session) slot of a program into a concrete workout:
//! - Split pattern keyed on sessions per week
//! - Random picks without replacement from each injury-filtered region pool
//! - Sets/reps/rest/RPE stamped from the periodization table
//! - Fixed warm-up, dynamic stretch and cool-down blocks
//!
//! The first plan generated for a slot is stored on it and returned on every
//! later request.

use crate::catalog::ExerciseCatalog;
use crate::config::PlanConfig;
use crate::filter::admissible;
use crate::periodization::{program_phase, week_scheme, weekly_focus, WeeklyFocus};
use crate::types::{
    BodyRegion, ClientProfile, ExperienceLevel, PlanPhase, PrescribedExercise, Program,
    Shortfall, WeekScheme, WorkoutPlan, WorkoutStructure,
};
use crate::{Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// Everything a synthesis call reads besides the program itself
#[derive(Clone, Copy, Debug)]
pub struct SessionContext<'a> {
    pub catalog: &'a ExerciseCatalog,
    pub profile: &'a ClientProfile,
    pub plan: &'a PlanConfig,
}

/// Result of a synthesis call
#[derive(Clone, Debug)]
pub struct Synthesis {
    /// The program with the plan stored on its slot
    pub program: Program,
    pub plan: WorkoutPlan,
    /// True when the plan was already on the slot
    pub cached: bool,
}

/// Regions and pick counts for a session
///
/// 1/week is full body; 2/week alternates upper and lower days with a core
/// pick; 3/week rotates upper, lower, core days. Anything else is full body.
pub fn split_pattern(sessions_per_week: u32, session: u32) -> Vec<(BodyRegion, usize)> {
    let index = session.saturating_sub(1);
    match sessions_per_week {
        2 if index % 2 == 0 => vec![(BodyRegion::Upper, 2), (BodyRegion::Core, 1)],
        2 => vec![(BodyRegion::Lower, 2), (BodyRegion::Core, 1)],
        3 => match index % 3 {
            0 => vec![(BodyRegion::Upper, 3)],
            1 => vec![(BodyRegion::Lower, 3)],
            _ => vec![(BodyRegion::Core, 3)],
        },
        _ => vec![
            (BodyRegion::Upper, 1),
            (BodyRegion::Core, 1),
            (BodyRegion::Lower, 1),
        ],
    }
}

/// Generate (or re-fetch) the plan for one session of a program
///
/// The input program is left untouched; the returned `Synthesis` carries a
/// copy with the plan stored on the slot.
pub fn synthesize<R: Rng + ?Sized>(
    ctx: &SessionContext<'_>,
    program: &Program,
    week: u32,
    session: u32,
    rng: &mut R,
) -> Result<Synthesis> {
    let slot = program.session(week, session)?;

    if let Some(plan) = &slot.workout {
        tracing::debug!("Week {} session {} already generated", week, session);
        return Ok(Synthesis {
            program: program.clone(),
            plan: plan.clone(),
            cached: true,
        });
    }

    let scheme = week_scheme(week).ok_or_else(|| {
        Error::InvalidReference(format!(
            "week {} has no periodization scheme",
            week
        ))
    })?;

    let pattern = split_pattern(program.sessions_per_week, session);
    let (exercises, shortfalls) = select_exercises(ctx, &pattern, scheme, rng);

    if exercises.is_empty() {
        return Err(Error::CatalogExhausted {
            regions: pattern.iter().map(|(region, _)| *region).collect(),
            requested: pattern.iter().map(|(_, count)| count).sum(),
        });
    }

    let focus = weekly_focus(week);
    let warm_up = warm_up_block();
    let dynamic_stretch = dynamic_stretch_block();
    let cool_down = cool_down_block();
    let estimated_minutes = estimate_minutes(
        &exercises,
        &[
            warm_up.as_slice(),
            dynamic_stretch.as_slice(),
            cool_down.as_slice(),
        ],
        ctx.plan,
    );

    let plan = WorkoutPlan {
        opening: opening_phrase(
            week,
            session,
            &slot.focus,
            scheme,
            &ctx.profile.experience_level,
        ),
        structure: if focus == WeeklyFocus::Endurance {
            WorkoutStructure::Circuit
        } else {
            WorkoutStructure::Series
        },
        warm_up,
        dynamic_stretch,
        exercises,
        cool_down,
        estimated_minutes,
        shortfalls,
    };

    let mut updated = program.clone();
    updated.session_mut(week, session)?.workout = Some(plan.clone());

    tracing::info!(
        "Generated week {} session {} for {}: {} exercises, ~{} min",
        week,
        session,
        program.client_id,
        plan.exercises.len(),
        plan.estimated_minutes
    );

    Ok(Synthesis {
        program: updated,
        plan,
        cached: false,
    })
}

fn select_exercises<R: Rng + ?Sized>(
    ctx: &SessionContext<'_>,
    pattern: &[(BodyRegion, usize)],
    scheme: &WeekScheme,
    rng: &mut R,
) -> (Vec<PrescribedExercise>, Vec<Shortfall>) {
    let mut exercises = Vec::new();
    let mut shortfalls = Vec::new();

    for &(region, requested) in pattern {
        let pool = admissible(ctx.catalog, region, &ctx.profile.injuries);
        let picks: Vec<_> = pool.choose_multiple(&mut *rng, requested).collect();

        if picks.len() < requested {
            tracing::warn!(
                "Only {} of {} {} exercises available after injury filtering",
                picks.len(),
                requested,
                region
            );
            shortfalls.push(Shortfall {
                region,
                requested,
                provided: picks.len(),
            });
        }

        exercises.extend(picks.into_iter().map(|def| PrescribedExercise {
            exercise_id: def.id.clone(),
            name: def.name.clone(),
            region,
            sets: scheme.sets,
            reps: scheme.reps,
            rest_seconds: scheme.rest_seconds,
            target_rpe: scheme.target_rpe,
            tip: def.tip.clone(),
            suggested_load: def.suggested_load.clone(),
        }));
    }

    (exercises, shortfalls)
}

/// Estimated session length in whole minutes
///
/// Fixed blocks plus, per exercise, `sets` work periods and `sets - 1` rests.
pub fn estimate_minutes(
    exercises: &[PrescribedExercise],
    blocks: &[&[PlanPhase]],
    plan: &PlanConfig,
) -> u32 {
    let fixed: u32 = blocks
        .iter()
        .flat_map(|b| b.iter())
        .map(|p| p.duration_seconds)
        .sum();

    let work: u32 = exercises
        .iter()
        .map(|e| e.sets * plan.work_seconds_per_set + e.sets.saturating_sub(1) * e.rest_seconds)
        .sum();

    ((fixed + work) as f64 / 60.0).round() as u32
}

fn phase(name: &str, duration_seconds: u32, instructions: &str) -> PlanPhase {
    PlanPhase {
        name: name.into(),
        duration_seconds,
        instructions: instructions.into(),
    }
}

/// Five minutes of general warm-up
pub fn warm_up_block() -> Vec<PlanPhase> {
    vec![
        phase(
            "Cardio ramp-up",
            180,
            "Bike, rower or brisk walk; build to a light sweat.",
        ),
        phase(
            "Joint mobility",
            120,
            "Neck, shoulder, hip and ankle circles, 10 each direction.",
        ),
    ]
}

/// Five minutes of dynamic stretching
pub fn dynamic_stretch_block() -> Vec<PlanPhase> {
    vec![
        phase("Leg swings", 60, "Front-to-back then side-to-side, 10 per leg."),
        phase("Arm circles", 60, "Small to large circles, both directions."),
        phase(
            "World's greatest stretch",
            120,
            "Lunge, elbow to instep, rotate and reach up; 5 per side.",
        ),
        phase("Inchworms", 60, "Walk the hands out to a plank and back."),
    ]
}

/// Five minutes of cool-down
pub fn cool_down_block() -> Vec<PlanPhase> {
    vec![
        phase("Easy walk", 120, "Let the heart rate come down."),
        phase(
            "Static stretching",
            120,
            "Hold each stretch 30 seconds: hamstrings, hip flexors, chest, lats.",
        ),
        phase("Breathing", 60, "Slow nasal breathing, long exhales."),
    ]
}

fn opening_phrase(
    week: u32,
    session: u32,
    focus: &str,
    scheme: &WeekScheme,
    level: &ExperienceLevel,
) -> String {
    let cue = match level {
        ExperienceLevel::Beginner => {
            "Quality of movement first; stop any set that causes pain.".to_string()
        }
        ExperienceLevel::Intermediate => {
            format!("Own every rep and keep the effort around RPE {}.", scheme.target_rpe)
        }
        ExperienceLevel::Advanced => {
            format!("Last set of each exercise should land at RPE {}.", scheme.target_rpe)
        }
        ExperienceLevel::Other(_) => format!("Target effort: RPE {}.", scheme.target_rpe),
    };

    format!(
        "Week {}, session {} ({} phase): {}. {}",
        week,
        session,
        program_phase(week).name,
        focus,
        cue
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use crate::periodization::TABLE_WEEKS;
    use crate::skeleton::create_program;
    use crate::types::ExerciseDefinition;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn profile(injuries: &[&str]) -> ClientProfile {
        ClientProfile {
            id: "client-1".into(),
            name: "Alex".into(),
            injuries: injuries.iter().map(|i| i.to_string()).collect(),
            experience_level: ExperienceLevel::Intermediate,
        }
    }

    fn run(
        catalog: &ExerciseCatalog,
        profile: &ClientProfile,
        program: &Program,
        week: u32,
        session: u32,
        seed: u64,
    ) -> Result<Synthesis> {
        let plan_config = PlanConfig::default();
        let ctx = SessionContext {
            catalog,
            profile,
            plan: &plan_config,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        synthesize(&ctx, program, week, session, &mut rng)
    }

    fn regions(plan: &WorkoutPlan) -> Vec<BodyRegion> {
        plan.exercises.iter().map(|e| e.region).collect()
    }

    #[test]
    fn test_split_patterns() {
        assert_eq!(
            split_pattern(1, 1),
            vec![
                (BodyRegion::Upper, 1),
                (BodyRegion::Core, 1),
                (BodyRegion::Lower, 1)
            ]
        );
        assert_eq!(split_pattern(2, 1), vec![(BodyRegion::Upper, 2), (BodyRegion::Core, 1)]);
        assert_eq!(split_pattern(2, 2), vec![(BodyRegion::Lower, 2), (BodyRegion::Core, 1)]);
        assert_eq!(split_pattern(3, 1), vec![(BodyRegion::Upper, 3)]);
        assert_eq!(split_pattern(3, 2), vec![(BodyRegion::Lower, 3)]);
        assert_eq!(split_pattern(3, 3), vec![(BodyRegion::Core, 3)]);
        // Unsupported counts fall back to full body
        assert_eq!(split_pattern(5, 4), split_pattern(1, 1));
    }

    #[test]
    fn test_three_per_week_second_session_is_lower() {
        let catalog = build_default_catalog();
        let p = profile(&[]);
        let program = create_program(&p, 4, 3, None).unwrap();

        let result = run(&catalog, &p, &program, 1, 2, 7).unwrap();
        assert_eq!(regions(&result.plan), vec![BodyRegion::Lower; 3]);
        assert!(!result.cached);
    }

    #[test]
    fn test_two_per_week_alternates() {
        let catalog = build_default_catalog();
        let p = profile(&[]);
        let program = create_program(&p, 4, 2, None).unwrap();

        let first = run(&catalog, &p, &program, 2, 1, 1).unwrap();
        let mut r = regions(&first.plan);
        r.sort();
        assert_eq!(r, vec![BodyRegion::Upper, BodyRegion::Upper, BodyRegion::Core]);

        let second = run(&catalog, &p, &program, 2, 2, 1).unwrap();
        let mut r = regions(&second.plan);
        r.sort();
        assert_eq!(r, vec![BodyRegion::Lower, BodyRegion::Lower, BodyRegion::Core]);
    }

    #[test]
    fn test_one_per_week_is_full_body() {
        let catalog = build_default_catalog();
        let p = profile(&[]);
        let program = create_program(&p, 2, 1, None).unwrap();

        let result = run(&catalog, &p, &program, 1, 1, 3).unwrap();
        assert_eq!(
            regions(&result.plan),
            vec![BodyRegion::Upper, BodyRegion::Core, BodyRegion::Lower]
        );
    }

    #[test]
    fn test_parameters_come_from_week_scheme() {
        let catalog = build_default_catalog();
        let p = profile(&[]);
        let program = create_program(&p, 12, 3, None).unwrap();

        let result = run(&catalog, &p, &program, 12, 1, 11).unwrap();
        let scheme = week_scheme(12).unwrap();
        for e in &result.plan.exercises {
            assert_eq!(e.sets, scheme.sets);
            assert_eq!(e.reps, scheme.reps);
            assert_eq!(e.rest_seconds, scheme.rest_seconds);
            assert_eq!(e.target_rpe, scheme.target_rpe);
        }
    }

    #[test]
    fn test_second_call_returns_memoized_plan() {
        let catalog = build_default_catalog();
        let p = profile(&[]);
        let program = create_program(&p, 4, 3, None).unwrap();

        let first = run(&catalog, &p, &program, 1, 1, 1).unwrap();
        // A different seed would pick differently if the slot were regenerated
        let second = run(&catalog, &p, &first.program, 1, 1, 999).unwrap();

        assert!(second.cached);
        assert_eq!(
            serde_json::to_string(&first.plan).unwrap(),
            serde_json::to_string(&second.plan).unwrap()
        );
        assert_eq!(first.program, second.program);
    }

    #[test]
    fn test_input_program_not_mutated() {
        let catalog = build_default_catalog();
        let p = profile(&[]);
        let program = create_program(&p, 4, 3, None).unwrap();

        let result = run(&catalog, &p, &program, 1, 1, 1).unwrap();
        assert!(program.session(1, 1).unwrap().workout.is_none());
        assert_eq!(
            result.program.session(1, 1).unwrap().workout.as_ref(),
            Some(&result.plan)
        );
    }

    #[test]
    fn test_no_duplicate_exercises_in_a_session() {
        let catalog = build_default_catalog();
        let p = profile(&[]);
        for sessions in 1..=4 {
            let program = create_program(&p, 3, sessions, None).unwrap();
            for session in 1..=sessions {
                for seed in 0..25 {
                    let plan = run(&catalog, &p, &program, 1, session, seed).unwrap().plan;
                    let ids: HashSet<_> = plan.exercises.iter().map(|e| &e.exercise_id).collect();
                    assert_eq!(ids.len(), plan.exercises.len());
                }
            }
        }
    }

    #[test]
    fn test_unknown_slot_is_invalid_reference() {
        let catalog = build_default_catalog();
        let p = profile(&[]);
        let program = create_program(&p, 4, 3, None).unwrap();

        assert!(matches!(
            run(&catalog, &p, &program, 5, 1, 1),
            Err(Error::InvalidReference(_))
        ));
        assert!(matches!(
            run(&catalog, &p, &program, 1, 4, 1),
            Err(Error::InvalidReference(_))
        ));
        assert!(matches!(
            run(&catalog, &p, &program, 0, 1, 1),
            Err(Error::InvalidReference(_))
        ));
    }

    #[test]
    fn test_week_beyond_table_is_invalid_reference() {
        let catalog = build_default_catalog();
        let p = profile(&[]);
        let program = create_program(&p, TABLE_WEEKS + 2, 1, None).unwrap();

        assert!(run(&catalog, &p, &program, TABLE_WEEKS, 1, 1).is_ok());
        assert!(matches!(
            run(&catalog, &p, &program, TABLE_WEEKS + 1, 1, 1),
            Err(Error::InvalidReference(_))
        ));
    }

    #[test]
    fn test_duration_estimate() {
        let catalog = build_default_catalog();
        let p = profile(&[]);
        let program = create_program(&p, 4, 3, None).unwrap();

        // Week 1: 2 sets, 60 s rest. Per exercise 2*60 + 1*60 = 180 s.
        // 3 exercises = 540 s, fixed blocks 3 x 300 s = 900 s, total 24 min.
        let plan = run(&catalog, &p, &program, 1, 1, 5).unwrap().plan;
        assert_eq!(plan.estimated_minutes, 24);
    }

    #[test]
    fn test_fixed_blocks_are_five_minutes() {
        for block in [warm_up_block(), dynamic_stretch_block(), cool_down_block()] {
            let total: u32 = block.iter().map(|p| p.duration_seconds).sum();
            assert_eq!(total, 300);
        }
    }

    #[test]
    fn test_structure_follows_weekly_focus() {
        let catalog = build_default_catalog();
        let p = profile(&[]);
        let program = create_program(&p, 4, 1, None).unwrap();

        assert_eq!(
            run(&catalog, &p, &program, 1, 1, 1).unwrap().plan.structure,
            WorkoutStructure::Series
        );
        assert_eq!(
            run(&catalog, &p, &program, 3, 1, 1).unwrap().plan.structure,
            WorkoutStructure::Circuit
        );
    }

    #[test]
    fn test_injured_region_is_skipped_with_shortfall() {
        let catalog = build_default_catalog();
        let p = profile(&["core"]);
        let program = create_program(&p, 2, 1, None).unwrap();

        let plan = run(&catalog, &p, &program, 1, 1, 2).unwrap().plan;
        assert_eq!(regions(&plan), vec![BodyRegion::Upper, BodyRegion::Lower]);
        assert!(plan.is_partial());
        assert_eq!(
            plan.shortfalls,
            vec![Shortfall {
                region: BodyRegion::Core,
                requested: 1,
                provided: 0
            }]
        );
    }

    #[test]
    fn test_fully_exhausted_session_fails() {
        let catalog = build_default_catalog();
        let p = profile(&["core"]);
        let program = create_program(&p, 2, 3, None).unwrap();

        match run(&catalog, &p, &program, 1, 3, 1) {
            Err(Error::CatalogExhausted { regions, requested }) => {
                assert_eq!(regions, vec![BodyRegion::Core]);
                assert_eq!(requested, 3);
            }
            other => panic!("expected CatalogExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_exhausted_full_body_session_reports_every_region() {
        let chest = ExerciseDefinition {
            id: "press".into(),
            name: "Press".into(),
            category: "push".into(),
            targets: vec!["chest".into()],
            triggers: vec![],
            description: String::new(),
            tip: String::new(),
            suggested_load: None,
        };
        let catalog = ExerciseCatalog::from_definitions(vec![chest]).unwrap();
        let p = profile(&["chest"]);
        let program = create_program(&p, 1, 1, None).unwrap();

        match run(&catalog, &p, &program, 1, 1, 0) {
            Err(Error::CatalogExhausted { regions, requested }) => {
                assert_eq!(
                    regions,
                    vec![BodyRegion::Upper, BodyRegion::Core, BodyRegion::Lower]
                );
                assert_eq!(requested, 3);
            }
            other => panic!("expected CatalogExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_small_catalog_gives_partial_session() {
        let upper = |id: &str| ExerciseDefinition {
            id: id.into(),
            name: id.into(),
            category: "push".into(),
            targets: vec!["chest".into()],
            triggers: vec![],
            description: String::new(),
            tip: String::new(),
            suggested_load: None,
        };
        let catalog = ExerciseCatalog::from_definitions(vec![upper("a"), upper("b")]).unwrap();
        let p = profile(&[]);
        let program = create_program(&p, 1, 3, None).unwrap();

        let plan = run(&catalog, &p, &program, 1, 1, 4).unwrap().plan;
        assert_eq!(plan.exercises.len(), 2);
        assert_eq!(plan.shortfalls[0].provided, 2);
    }

    #[test]
    fn test_injured_exercises_never_selected() {
        let catalog = build_default_catalog();
        let p = profile(&["knee"]);
        let program = create_program(&p, 2, 3, None).unwrap();

        for seed in 0..20 {
            let plan = run(&catalog, &p, &program, 1, 2, seed).unwrap().plan;
            for e in &plan.exercises {
                let def = catalog.get(&e.exercise_id).unwrap();
                assert!(!def.targets.iter().any(|t| t == "knee"));
            }
        }
    }
}
