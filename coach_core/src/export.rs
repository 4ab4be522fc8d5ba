//! CSV export of a program's schedule.

use crate::types::Program;
use crate::Result;
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct ScheduleRow {
    week: u32,
    week_focus: String,
    session: u32,
    session_focus: String,
    completed: bool,
    completed_at: Option<String>,
    generated: bool,
    exercises: String,
    estimated_minutes: Option<u32>,
}

/// Write one row per (week, session) slot, replacing `path`
///
/// Returns the number of rows written. The file is synced before returning.
pub fn export_schedule_csv(program: &Program, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_writer(File::create(path)?);
    let mut rows = 0;

    for week in &program.weeks {
        for session in &week.sessions {
            let workout = session.workout.as_ref();
            writer.serialize(ScheduleRow {
                week: week.week,
                week_focus: week.focus.clone(),
                session: session.session,
                session_focus: session.focus.clone(),
                completed: session.completed,
                completed_at: session.completed_at.map(|t| t.to_rfc3339()),
                generated: workout.is_some(),
                exercises: workout
                    .map(|w| {
                        w.exercises
                            .iter()
                            .map(|e| e.name.as_str())
                            .collect::<Vec<_>>()
                            .join("; ")
                    })
                    .unwrap_or_default(),
                estimated_minutes: workout.map(|w| w.estimated_minutes),
            })?;
            rows += 1;
        }
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} schedule rows to {:?}", rows, path);
    Ok(rows)
}
