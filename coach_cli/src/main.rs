use coach_core::*;
use clap::{Parser, Subcommand};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "coach")]
#[command(about = "Periodized training program generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a custom exercise catalog (JSON array of exercises)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enroll a client and generate their program skeleton
    Init {
        #[arg(long)]
        client: String,

        /// Client display name
        #[arg(long)]
        name: Option<String>,

        /// Program name
        #[arg(long)]
        program_name: Option<String>,

        /// Program length in weeks
        #[arg(long)]
        weeks: Option<u32>,

        /// Training sessions per week
        #[arg(long)]
        sessions: Option<u32>,

        /// Declared injury (repeatable)
        #[arg(long = "injury")]
        injuries: Vec<String>,

        /// Experience level (beginner, intermediate, advanced)
        #[arg(long, default_value = "beginner")]
        level: String,

        /// Replace an existing program
        #[arg(long)]
        force: bool,
    },

    /// Show the program grid and current position
    Show {
        #[arg(long)]
        client: String,
    },

    /// Generate (or re-display) a session's workout
    Next {
        #[arg(long)]
        client: String,

        /// Week to generate (defaults to the current week)
        #[arg(long)]
        week: Option<u32>,

        /// Session to generate (defaults to the current session)
        #[arg(long)]
        session: Option<u32>,

        /// Seed the exercise selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Record a finished session and advance the program
    Complete {
        #[arg(long)]
        client: String,

        #[arg(long)]
        week: Option<u32>,

        #[arg(long)]
        session: Option<u32>,

        /// Perceived exertion, 0-10
        #[arg(long)]
        rpe: Option<f32>,

        /// How the client felt
        #[arg(long)]
        mood: Option<String>,

        /// Free-text debrief
        #[arg(long)]
        debrief: Option<String>,
    },

    /// Evaluate the phase gate from recorded sessions
    Gate {
        #[arg(long)]
        client: String,

        /// Week to evaluate (defaults to the configured gate week)
        #[arg(long)]
        week: Option<u32>,
    },

    /// Export the program schedule to CSV
    Export {
        #[arg(long)]
        client: String,

        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    coach_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let store = ProgramStore::new(data_dir);

    match cli.command {
        Commands::Init {
            client,
            name,
            program_name,
            weeks,
            sessions,
            injuries,
            level,
            force,
        } => {
            let profile = ClientProfile {
                name: name.unwrap_or_else(|| client.clone()),
                id: client,
                injuries,
                experience_level: ExperienceLevel::parse(&level),
            };
            cmd_init(
                &store,
                &config,
                profile,
                program_name,
                weeks,
                sessions,
                force,
            )
        }
        Commands::Show { client } => cmd_show(&store, &client),
        Commands::Next {
            client,
            week,
            session,
            seed,
        } => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            cmd_next(&store, &config, &catalog, &client, week, session, seed)
        }
        Commands::Complete {
            client,
            week,
            session,
            rpe,
            mood,
            debrief,
        } => cmd_complete(&store, &config, &client, week, session, rpe, mood, debrief),
        Commands::Gate { client, week } => cmd_gate(&store, &config, &client, week),
        Commands::Export { client, out } => cmd_export(&store, &client, &out),
    }
}

fn load_catalog(path: Option<&Path>) -> Result<ExerciseCatalog> {
    let catalog = match path {
        Some(p) => ExerciseCatalog::load_from(p)?,
        None => default_catalog().clone(),
    };

    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }
    Ok(catalog)
}

fn cmd_init(
    store: &ProgramStore,
    config: &Config,
    profile: ClientProfile,
    program_name: Option<String>,
    weeks: Option<u32>,
    sessions: Option<u32>,
    force: bool,
) -> Result<()> {
    if store.has_program(&profile.id)? && !force {
        return Err(Error::Store(format!(
            "client '{}' already has a program (use --force to replace it)",
            profile.id
        )));
    }

    let program = create_program(
        &profile,
        weeks.unwrap_or(config.program.duration_weeks),
        sessions.unwrap_or(config.program.sessions_per_week),
        program_name.as_deref(),
    )?;

    store.save_profile(&profile)?;
    store.save_program(&program)?;

    println!("✓ Program created: {}", program.name);
    println!(
        "  {} weeks x {} sessions, starting at week 1 session 1",
        program.duration_weeks, program.sessions_per_week
    );
    Ok(())
}

fn cmd_show(store: &ProgramStore, client: &str) -> Result<()> {
    let program = store.load_program(client)?;
    let (week, session) = program.position();

    println!("{}", program.name);
    println!("Current: week {} session {}", week, session);
    println!();

    for w in &program.weeks {
        let marks: Vec<&str> = w
            .sessions
            .iter()
            .map(|s| match (s.completed, s.workout.is_some()) {
                (true, _) => "x",
                (false, true) => "o",
                (false, false) => ".",
            })
            .collect();
        println!("  W{:02} [{}] {}", w.week, marks.join(" "), w.focus);
    }
    println!();
    println!("  x done   o generated   . pending");
    Ok(())
}

fn cmd_next(
    store: &ProgramStore,
    config: &Config,
    catalog: &ExerciseCatalog,
    client: &str,
    week: Option<u32>,
    session: Option<u32>,
    seed: Option<u64>,
) -> Result<()> {
    let profile = store.load_profile(client)?;
    let ctx = SessionContext {
        catalog,
        profile: &profile,
        plan: &config.plan,
    };

    let mut rng: Box<dyn RngCore> = match seed {
        Some(s) => Box::new(ChaCha8Rng::seed_from_u64(s)),
        None => Box::new(rand::thread_rng()),
    };

    let (_, (week, session, synthesis)) = store.update_program(client, |p| {
        let week = week.unwrap_or(p.current_week);
        let session = session.unwrap_or(p.current_session);
        let synthesis = synthesize(&ctx, p, week, session, &mut *rng)?;
        Ok((synthesis.program.clone(), (week, session, synthesis)))
    })?;

    display_plan(week, session, &synthesis);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_complete(
    store: &ProgramStore,
    config: &Config,
    client: &str,
    week: Option<u32>,
    session: Option<u32>,
    rpe: Option<f32>,
    mood: Option<String>,
    debrief: Option<String>,
) -> Result<()> {
    if let Some(r) = rpe {
        if !(0.0..=10.0).contains(&r) {
            return Err(Error::InvalidInput(format!("RPE {} is outside 0-10", r)));
        }
    }

    let journal_path = store.journal_path(client)?;
    let now = chrono::Utc::now();

    // The record is journaled under the program lock, before the completion
    // is saved: a failed append leaves the program untouched.
    let (program, (week, session, gate)) = store.update_program(client, |p| {
        let week = week.unwrap_or(p.current_week);
        let session = session.unwrap_or(p.current_session);
        let completed = mark_completed(p, week, session, now)?;

        let record = SessionRecord {
            id: uuid::Uuid::new_v4(),
            recorded_at: now,
            week: Some(week),
            session: Some(session),
            mood,
            debrief,
            rpe,
        };
        JsonlJournal::new(&journal_path).append(&record)?;

        let week_done = completed.week(week).map(|w| w.is_complete()).unwrap_or(false);
        if week == config.gate.week && week_done {
            let decision = gate_decision(&journal_path, config, week)?;
            let updated = apply_gate(&completed, week, &decision)?;
            Ok((updated, (week, session, Some(decision))))
        } else {
            Ok((completed, (week, session, None)))
        }
    })?;

    println!("✓ Week {} session {} completed", week, session);

    if let Some(decision) = gate {
        println!();
        print_gate(week, &decision);
        println!();
    }

    if program.is_finished() {
        println!("  Program finished!");
    } else {
        let (next_week, next_session) = program.position();
        println!("  Next: week {} session {}", next_week, next_session);
    }

    Ok(())
}

fn cmd_gate(store: &ProgramStore, config: &Config, client: &str, week: Option<u32>) -> Result<()> {
    store.load_program(client)?;
    let week = week.unwrap_or(config.gate.week);
    let decision = gate_decision(&store.journal_path(client)?, config, week)?;
    print_gate(week, &decision);
    Ok(())
}

fn gate_decision(journal_path: &Path, config: &Config, week: u32) -> Result<GateDecision> {
    let target = week_scheme(week).ok_or_else(|| {
        Error::InvalidReference(format!("week {} has no periodization scheme", week))
    })?;
    let records = read_records(journal_path)?;
    Ok(evaluate_gate(week, &records, target.target_rpe, &config.gate))
}

fn print_gate(week: u32, decision: &GateDecision) {
    match decision.action {
        GateAction::Proceed => println!("Gate week {}: PROCEED", week),
        GateAction::RepeatWeek(w) => println!("Gate week {}: REPEAT week {}", week, w),
    }
    println!("  {}", decision.reason);
}

fn cmd_export(store: &ProgramStore, client: &str, out: &Path) -> Result<()> {
    let program = store.load_program(client)?;
    let rows = export_schedule_csv(&program, out)?;
    println!("✓ Exported {} sessions to {}", rows, out.display());
    Ok(())
}

fn display_phases(title: &str, phases: &[PlanPhase]) {
    println!("  {}", title);
    for p in phases {
        println!(
            "    - {} ({} min): {}",
            p.name,
            p.duration_seconds / 60,
            p.instructions
        );
    }
}

fn display_plan(week: u32, session: u32, synthesis: &Synthesis) {
    let plan = &synthesis.plan;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  WEEK {} · SESSION {}", week, session);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", plan.opening);
    println!(
        "  Format: {:?} · ~{} min",
        plan.structure, plan.estimated_minutes
    );
    if synthesis.cached {
        println!("  (already generated)");
    }
    println!();

    display_phases("Warm-up", &plan.warm_up);
    display_phases("Dynamic stretch", &plan.dynamic_stretch);

    println!("  Main block");
    for e in &plan.exercises {
        println!(
            "    → {} [{}]: {} x {} @ RPE {}, rest {}s",
            e.name, e.region, e.sets, e.reps, e.target_rpe, e.rest_seconds
        );
        if let Some(ref load) = e.suggested_load {
            println!("      load: {}", load);
        }
        if !e.tip.is_empty() {
            println!("      tip: {}", e.tip);
        }
    }

    display_phases("Cool-down", &plan.cool_down);

    for s in &plan.shortfalls {
        println!();
        println!(
            "  ⚠ Only {} of {} {} exercises fit the declared injuries",
            s.provided, s.requested, s.region
        );
    }
    println!();
}
