use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// How the engine picks a growth parent each iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrowthPolicy {
    /// Sample uniformly over every node committed so far; an exhausted
    /// pick wastes the iteration. Faithful to the original process.
    ResampleAll,
    /// Sample uniformly over the maintained set of non-exhausted nodes.
    /// Same output distribution, no wasted picks, and the engine can
    /// report a stall once the set empties.
    EligibleSet,
}

/// All growth tunables, fixed at engine construction.
///
/// Positions are in normalized coordinates: the domain is the unit
/// square and radii/lengths are fractions of its side. One "drawable
/// unit" is `1 / scale`, where `scale` is the output raster side in
/// pixels.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Center of the bounding disk.
    pub bounds_center: Vec2,
    /// Radius of the bounding disk; candidates outside are rejected.
    pub bounds_radius: f32,

    /// Source radius is drawn from `U(source_radius_min, source_radius_max)`.
    pub source_radius_min: f32,
    pub source_radius_max: f32,
    /// Initial growth direction of every source.
    pub source_direction: f32,
    /// Search cone of every source.
    pub source_cone: f32,

    /// Child radius is `parent.radius * U(min_radius_factor, max_radius_factor)`;
    /// both factors below 1, so radius strictly shrinks each generation.
    pub min_radius_factor: f32,
    pub max_radius_factor: f32,
    /// Below this radius a branch can no longer be drawn; the parent is
    /// marked exhausted instead.
    pub min_drawable_radius: f32,

    /// Child direction deviates from the parent's by
    /// `U(min_search_angle, parent.cone)`.
    pub min_search_angle: f32,
    /// Probability that a child redraws its own cone instead of
    /// inheriting the parent's.
    pub cone_redraw_chance: f32,
    /// Upper bound of a redrawn cone, `U(0, cone_redraw_max)`.
    pub cone_redraw_max: f32,

    /// Step length is `parent.radius * U(min_step_factor, max_step_factor)`.
    pub min_step_factor: f32,
    pub max_step_factor: f32,

    /// A node stops growing once its child count exceeds this.
    pub max_children: u32,
    /// Required clearance beyond the sum of two radii between any
    /// accepted node and its grid neighbors.
    pub collision_margin: f32,
    /// Side length of one spatial grid cell.
    pub cell_width: f32,

    /// Hard maximum number of nodes; reaching it ends the run.
    pub capacity: usize,
    pub policy: GrowthPolicy,
}

impl Config {
    /// Configuration matching a raster of `scale`×`scale` pixels, with
    /// all pixel-denominated tunables converted to normalized units.
    pub fn for_scale(scale: u32) -> Self {
        let unit = 1.0 / scale as f32;
        Self {
            bounds_center: Vec2::splat(0.5),
            bounds_radius: 0.45,
            source_radius_min: 38.0 * unit,
            source_radius_max: 62.0 * unit,
            source_direction: 0.0,
            source_cone: TAU,
            min_radius_factor: 0.91,
            max_radius_factor: 0.96,
            min_drawable_radius: unit,
            min_search_angle: 0.0,
            cone_redraw_chance: 0.03,
            cone_redraw_max: PI / 5.0,
            min_step_factor: 4.0,
            max_step_factor: 5.0,
            max_children: 2,
            collision_margin: 2.0,
            cell_width: 80.0 * unit,
            capacity: 2_000_000,
            policy: GrowthPolicy::ResampleAll,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::for_scale(15_000)
    }
}
