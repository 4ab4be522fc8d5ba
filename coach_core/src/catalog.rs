//! Exercise catalog: the built-in exercises plus loading of custom catalogs.
//!
//! The catalog is immutable once built. Engine calls receive it explicitly,
//! so tests can pass in smaller catalogs.

use crate::filter::region_of;
use crate::types::{BodyRegion, ExerciseDefinition};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::path::Path;

/// The complete set of exercises the engine may pick from
#[derive(Clone, Debug, Default)]
pub struct ExerciseCatalog {
    pub exercises: BTreeMap<String, ExerciseDefinition>,
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<ExerciseCatalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn default_catalog() -> &'static ExerciseCatalog {
    &DEFAULT_CATALOG
}

impl ExerciseCatalog {
    /// Build a catalog from a list of definitions, rejecting duplicate ids
    pub fn from_definitions(definitions: Vec<ExerciseDefinition>) -> Result<Self> {
        let mut exercises = BTreeMap::new();
        for def in definitions {
            if exercises.contains_key(&def.id) {
                return Err(Error::CatalogValidation(format!(
                    "duplicate exercise id '{}'",
                    def.id
                )));
            }
            exercises.insert(def.id.clone(), def);
        }
        Ok(Self { exercises })
    }

    /// Load a catalog from a JSON array of exercise definitions
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let definitions: Vec<ExerciseDefinition> = serde_json::from_str(&contents)?;
        let catalog = Self::from_definitions(definitions)?;
        tracing::info!(
            "Loaded {} exercises from {:?}",
            catalog.exercises.len(),
            path
        );
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&ExerciseDefinition> {
        self.exercises.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExerciseDefinition> {
        self.exercises.values()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, def) in &self.exercises {
            if id.is_empty() || def.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if id != &def.id {
                errors.push(format!(
                    "Exercise key '{}' doesn't match exercise.id '{}'",
                    id, def.id
                ));
            }
            if def.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", id));
            }
            if def.targets.iter().all(|t| t.trim().is_empty()) {
                errors.push(format!("Exercise '{}' targets nothing", id));
            }
        }

        for region in [BodyRegion::Upper, BodyRegion::Lower, BodyRegion::Core] {
            if !self.iter().any(|d| region_of(d) == region) {
                errors.push(format!("Catalog has no {} exercises", region));
            }
        }

        errors
    }
}

#[allow(clippy::too_many_arguments)]
fn exercise(
    id: &str,
    name: &str,
    category: &str,
    targets: &[&str],
    triggers: &[&str],
    description: &str,
    tip: &str,
    suggested_load: Option<&str>,
) -> ExerciseDefinition {
    ExerciseDefinition {
        id: id.into(),
        name: name.into(),
        category: category.into(),
        targets: targets.iter().map(|t| t.to_string()).collect(),
        triggers: triggers.iter().map(|t| t.to_string()).collect(),
        description: description.into(),
        tip: tip.into(),
        suggested_load: suggested_load.map(Into::into),
    }
}

/// Builds the default catalog of built-in exercises
///
/// **Note**: For production use, prefer `default_catalog()` which returns a
/// cached reference.
pub fn build_default_catalog() -> ExerciseCatalog {
    let definitions = vec![
        // ====================================================================
        // Upper body
        // ====================================================================
        exercise(
            "push_up",
            "Push-up",
            "push",
            &["chest", "triceps", "shoulder"],
            &["beginner"],
            "Hands under shoulders, body in one line, lower the chest to the floor and press back up.",
            "Keep the elbows at 45 degrees from the torso.",
            None,
        ),
        exercise(
            "incline_db_press",
            "Incline Dumbbell Press",
            "push",
            &["chest", "shoulder", "triceps"],
            &[],
            "On a 30 degree bench, press the dumbbells above the upper chest.",
            "Lower under control for three seconds.",
            Some("2 x 8 kg"),
        ),
        exercise(
            "db_row",
            "One-arm Dumbbell Row",
            "pull",
            &["back", "lats", "biceps"],
            &["posture"],
            "One hand and knee on the bench, pull the dumbbell towards the hip.",
            "Lead with the elbow, not the hand.",
            Some("12 kg"),
        ),
        exercise(
            "lat_pulldown",
            "Lat Pulldown",
            "pull",
            &["lats", "biceps"],
            &[],
            "Pull the bar to the top of the chest, chest up.",
            "Squeeze the shoulder blades down before bending the arms.",
            Some("30 kg"),
        ),
        exercise(
            "overhead_press",
            "Standing Dumbbell Overhead Press",
            "push",
            &["shoulder", "triceps"],
            &[],
            "Press the dumbbells from the shoulders to lockout overhead.",
            "Ribs down, do not arch the lower back.",
            Some("2 x 6 kg"),
        ),
        exercise(
            "band_pull_apart",
            "Band Pull-apart",
            "pull",
            &["rear delts", "upper back", "rotator cuff"],
            &["posture", "kyphosis"],
            "Arms straight in front, pull the band apart to the chest.",
            "Keep the shoulders away from the ears.",
            Some("light band"),
        ),
        exercise(
            "face_pull",
            "Face Pull",
            "pull",
            &["rear delts", "rotator cuff", "traps"],
            &["posture", "kyphosis"],
            "Pull the rope towards the face, hands ending beside the ears.",
            "Finish with the thumbs pointing back.",
            Some("10 kg"),
        ),
        exercise(
            "db_curl",
            "Dumbbell Curl",
            "arms",
            &["biceps", "forearms"],
            &[],
            "Elbows pinned to the sides, curl the dumbbells to the shoulders.",
            "No swinging; lower slowly.",
            Some("2 x 8 kg"),
        ),
        // ====================================================================
        // Lower body
        // ====================================================================
        exercise(
            "goblet_squat",
            "Goblet Squat",
            "legs",
            &["quadriceps", "glutes", "knee"],
            &[],
            "Hold a dumbbell at the chest and squat between the heels.",
            "Knees track over the toes.",
            Some("12 kg"),
        ),
        exercise(
            "romanian_deadlift",
            "Romanian Deadlift",
            "legs",
            &["hamstrings", "glutes", "lower back"],
            &[],
            "Soft knees, push the hips back and slide the weights down the thighs.",
            "Keep a neutral spine the whole way.",
            Some("2 x 12 kg"),
        ),
        exercise(
            "reverse_lunge",
            "Reverse Lunge",
            "legs",
            &["quadriceps", "glutes", "knee"],
            &[],
            "Step back and lower the back knee towards the floor.",
            "Front shin stays close to vertical.",
            None,
        ),
        exercise(
            "hip_thrust",
            "Hip Thrust",
            "legs",
            &["glutes", "hip"],
            &["posture"],
            "Upper back on a bench, drive the hips up to full extension.",
            "Chin tucked, ribs down at the top.",
            Some("20 kg"),
        ),
        exercise(
            "step_up",
            "Step-up",
            "legs",
            &["quadriceps", "glutes", "knee"],
            &[],
            "Step onto a box and stand tall, then step down with control.",
            "Push through the whole foot on the box.",
            None,
        ),
        exercise(
            "calf_raise",
            "Standing Calf Raise",
            "legs",
            &["calves", "ankle"],
            &[],
            "Rise onto the toes, pause, lower below the step.",
            "Pause one second at the top.",
            None,
        ),
        exercise(
            "glute_bridge",
            "Glute Bridge",
            "legs",
            &["glutes", "hip"],
            &["lower back pain", "posture"],
            "Lying on the back, drive through the heels to lift the hips.",
            "Squeeze the glutes, not the lower back.",
            None,
        ),
        // ====================================================================
        // Core
        // ====================================================================
        exercise(
            "front_plank",
            "Front Plank",
            "core",
            &["abdominals", "core"],
            &["beginner"],
            "Forearms and toes on the floor, body in one straight line.",
            "Squeeze glutes and brace as if about to be punched.",
            None,
        ),
        exercise(
            "side_plank",
            "Side Plank",
            "core",
            &["obliques", "core"],
            &[],
            "On one forearm, lift the hips so the body forms a line.",
            "Stack the hips; do not let them roll back.",
            None,
        ),
        exercise(
            "dead_bug",
            "Dead Bug",
            "core",
            &["abdominals", "core"],
            &["lower back pain", "posture"],
            "On the back, extend opposite arm and leg while the lower back stays down.",
            "Exhale fully on each extension.",
            None,
        ),
        exercise(
            "bird_dog",
            "Bird Dog",
            "core",
            &["core", "lower back", "glutes"],
            &["lower back pain"],
            "On all fours, reach opposite arm and leg long.",
            "Keep the hips level.",
            None,
        ),
        exercise(
            "pallof_press",
            "Pallof Press",
            "core",
            &["obliques", "core"],
            &["anti-rotation"],
            "Side-on to a band anchor, press the band straight out and resist the pull.",
            "Hips and shoulders stay square.",
            Some("light band"),
        ),
        exercise(
            "hollow_hold",
            "Hollow Hold",
            "core",
            &["abdominals", "core"],
            &[],
            "On the back, lift shoulders and legs, lower back pressed down.",
            "Bend the knees to make it easier.",
            None,
        ),
        exercise(
            "mcgill_curl_up",
            "McGill Curl-up",
            "core",
            &["abdominals", "core"],
            &["lower back pain"],
            "One knee bent, hands under the lower back, lift the head and shoulders slightly.",
            "Move the chest, not the neck.",
            None,
        ),
    ];

    let mut exercises = BTreeMap::new();
    for def in definitions {
        exercises.insert(def.id.clone(), def);
    }
    ExerciseCatalog { exercises }
}
