//! Catalog filtering by body region and declared injuries.
//!
//! Both filters are pure and borrow from the catalog; nothing is cloned until
//! the engine stamps a selection with training parameters.

use crate::catalog::ExerciseCatalog;
use crate::types::{BodyRegion, ExerciseDefinition};

const CORE_KEYWORDS: &[&str] = &["core", "abs", "abdominal", "oblique", "trunk", "plank"];

const LOWER_KEYWORDS: &[&str] = &[
    "lower", "leg", "quad", "hamstring", "glute", "calf", "adductor", "hip",
];

fn mentions_any(def: &ExerciseDefinition, keywords: &[&str]) -> bool {
    std::iter::once(&def.category)
        .chain(def.targets.iter())
        .map(|s| s.to_lowercase())
        .any(|s| keywords.iter().any(|k| s.contains(k)))
}

/// Region of a catalog entry. Core is checked before lower; anything matching
/// neither keyword set is upper.
pub fn region_of(def: &ExerciseDefinition) -> BodyRegion {
    if mentions_any(def, CORE_KEYWORDS) {
        BodyRegion::Core
    } else if mentions_any(def, LOWER_KEYWORDS) {
        BodyRegion::Lower
    } else {
        BodyRegion::Upper
    }
}

/// All catalog entries belonging to `region`, in catalog order
pub fn filter_by_region(catalog: &ExerciseCatalog, region: BodyRegion) -> Vec<&ExerciseDefinition> {
    catalog.iter().filter(|d| region_of(d) == region).collect()
}

/// Case-insensitive containment in either direction
fn terms_overlap(term: &str, injury: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }
    term.contains(injury) || injury.contains(&term)
}

/// True when any target tag or trigger code of `def` matches an injury
pub fn conflicts_with_injuries(def: &ExerciseDefinition, injuries: &[String]) -> bool {
    injuries
        .iter()
        .map(|i| i.trim().to_lowercase())
        .filter(|i| !i.is_empty())
        .any(|injury| {
            def.targets
                .iter()
                .chain(def.triggers.iter())
                .any(|term| terms_overlap(term, &injury))
        })
}

/// Drop every entry that conflicts with a declared injury
///
/// An empty result is meaningful: the caller decides whether the region can
/// be skipped.
pub fn exclude_by_injury<'a>(
    pool: Vec<&'a ExerciseDefinition>,
    injuries: &[String],
) -> Vec<&'a ExerciseDefinition> {
    let before = pool.len();
    let kept: Vec<_> = pool
        .into_iter()
        .filter(|d| !conflicts_with_injuries(d, injuries))
        .collect();

    if kept.len() < before {
        tracing::debug!(
            "Injury filter removed {} of {} exercises ({:?})",
            before - kept.len(),
            before,
            injuries
        );
    }
    kept
}

/// Region pool after injury exclusion
pub fn admissible<'a>(
    catalog: &'a ExerciseCatalog,
    region: BodyRegion,
    injuries: &[String],
) -> Vec<&'a ExerciseDefinition> {
    exclude_by_injury(filter_by_region(catalog, region), injuries)
}
