//! Scene distribution - how many scenes each plot point becomes.
//!
//! Units are populated with plot points one at a time, on demand, so the real total
//! number of plot points is unknown until the whole story exists. The divisor is
//! therefore a projection (`units x plot points per unit`) that stays stable for the
//! lifetime of a project. The same calculation serves both the note shown while plot
//! points are generated and the scene count used when those plot points are later
//! expanded into scenes.

use serde::{Deserialize, Serialize};

/// Fewest scenes a plot point is developed into.
pub const MIN_SCENES_PER_PLOT_POINT: u32 = 1;

/// Most scenes a plot point is developed into.
pub const MAX_SCENES_PER_PLOT_POINT: u32 = 3;

/// Projected number of plot points per structural unit.
pub const DEFAULT_PLOT_POINTS_PER_UNIT: u32 = 3;

/// `clamp(round(total_scenes / (total_units x per_unit_estimate)), 1, 3)`.
///
/// A zero divisor yields the lower bound.
pub fn compute(total_scenes: u32, total_units: usize, per_unit_estimate: u32) -> u32 {
    let divisor = total_units as f64 * per_unit_estimate as f64;
    if divisor <= 0.0 {
        return MIN_SCENES_PER_PLOT_POINT;
    }

    let rounded = (total_scenes as f64 / divisor).round() as u32;
    rounded.clamp(MIN_SCENES_PER_PLOT_POINT, MAX_SCENES_PER_PLOT_POINT)
}

/// Scene distribution with a configured per-unit plot point projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionCalculator {
    per_unit_estimate: u32,
}

impl DistributionCalculator {
    /// Create a calculator with a per-unit plot point projection.
    pub fn new(per_unit_estimate: u32) -> Self {
        Self { per_unit_estimate }
    }

    /// The per-unit plot point projection.
    pub fn per_unit_estimate(&self) -> u32 {
        self.per_unit_estimate
    }

    /// Scenes each plot point is developed into.
    pub fn scenes_per_plot_point(&self, total_scenes: u32, total_units: usize) -> u32 {
        compute(total_scenes, total_units, self.per_unit_estimate)
    }

    /// Human-readable note describing the expected distribution.
    ///
    /// `plot_point_count` is the number of plot points known for the current unit;
    /// zero when they are about to be generated.
    pub fn describe(&self, total_scenes: u32, total_units: usize, plot_point_count: usize) -> String {
        let per_plot_point = self.scenes_per_plot_point(total_scenes, total_units);
        let mut note = format!(
            "The story targets about {} scenes across {} {}. Each plot point will be developed into {} {}.",
            total_scenes,
            total_units,
            if total_units == 1 { "act" } else { "acts" },
            per_plot_point,
            if per_plot_point == 1 { "scene" } else { "scenes" },
        );
        if plot_point_count > 0 {
            note.push_str(&format!(
                " These {} plot points will yield about {} scenes.",
                plot_point_count,
                plot_point_count * per_plot_point as usize
            ));
        }
        note
    }

    /// Plot point a 0-based scene index belongs to, clamped to the last plot point.
    ///
    /// Returns `None` when there are no plot points.
    pub fn plot_point_for_scene(
        scene_index: usize,
        scenes_per_plot_point: u32,
        plot_point_count: usize,
    ) -> Option<usize> {
        if plot_point_count == 0 {
            return None;
        }
        let per = scenes_per_plot_point.max(MIN_SCENES_PER_PLOT_POINT) as usize;
        Some((scene_index / per).min(plot_point_count - 1))
    }
}

impl Default for DistributionCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_PLOT_POINTS_PER_UNIT)
    }
}
