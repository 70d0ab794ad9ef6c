//! The random branching growth loop.
//!
//! Each iteration picks a random parent node, proposes a child at 4–5
//! parent radii away inside the parent's search cone, validates the
//! candidate against the bounding disk and the spatial grid, and on
//! acceptance commits it to the store, the grid and the renderer in one
//! atomic group. Rejections are the expected steady state of the
//! process, not errors; the only fatal condition is running out of
//! store capacity.

use crate::{
    config::{Config, GrowthPolicy},
    grid::SpatialGrid,
    node::{Node, NodeState, NodeStore, StoreError},
    render::Renderer,
    types::NodeIndex,
};
use glam::Vec2;
use rand::Rng;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Sentinel for "not in the eligible set" in the slot map.
const SLOT_NONE: usize = usize::MAX;

/// Log a progress line every this many accepted nodes.
const PROGRESS_INTERVAL: usize = 50_000;

/// Why a single iteration did not commit a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The sampled parent was already exhausted (resample-all policy).
    ExhaustedParent,
    /// The proposed radius fell below the drawable minimum; the parent
    /// was marked exhausted as a side effect.
    DegenerateRadius,
    /// The proposed position left the bounding disk.
    OutOfBounds,
    /// A grid neighbor sat closer than the required clearance.
    Collision,
}

/// Result of one growth iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// A child was committed under this index.
    Grown(NodeIndex),
    /// The iteration was abandoned; nothing (except possibly the
    /// sampled parent's eligibility) changed.
    Rejected(Rejection),
    /// No parent can ever be selected again: the store is empty, or
    /// (eligible-set policy) every node is exhausted.
    Stalled,
}

/// Why [`GrowthEngine::run`] returned without a store error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    IterationLimit,
    Stalled,
}

/// Tally of a finished [`GrowthEngine::run`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub accepted: u64,
    pub rejected: u64,
    pub stop: StopReason,
}

/// Cloneable cancellation flag checked between iterations.
///
/// The run loop never observes cancellation mid-commit, so an accepted
/// iteration is always committed in full before the loop returns.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Owns the node store and spatial grid and drives the accept/reject
/// decision procedure.
///
/// The RNG draw order inside [`GrowthEngine::step`] is part of the
/// contract: parent index, radius factor, direction offset, step
/// factor, cone redraw roll, then (only if the roll fires) the new
/// cone. Seeded runs replay identically as long as that order holds.
#[derive(Debug)]
pub struct GrowthEngine {
    cfg: Config,
    store: NodeStore,
    grid: SpatialGrid,
    /// Indices of non-exhausted nodes, swap-removed on exhaustion.
    eligible: Vec<NodeIndex>,
    /// Position of each node in `eligible`, or `SLOT_NONE`.
    slot: Vec<usize>,
    /// Reused neighbor query buffer.
    scratch: Vec<NodeIndex>,
}

impl GrowthEngine {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            store: NodeStore::with_capacity(cfg.capacity),
            grid: SpatialGrid::new(1.0, cfg.cell_width),
            eligible: Vec::new(),
            slot: Vec::new(),
            scratch: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Whether `pos` lies strictly inside the bounding disk.
    pub fn in_bounds(&self, pos: Vec2) -> bool {
        pos.distance(self.cfg.bounds_center) < self.cfg.bounds_radius
    }

    /// Seeds one source node at an explicit position.
    ///
    /// The source takes the configured initial direction and cone, is
    /// stamped once via [`Renderer::draw_circle`], and is immediately
    /// eligible as a growth parent.
    ///
    /// ### Panics
    /// Panics if `pos` lies outside the bounding disk; sources must
    /// satisfy the same bounds invariant as grown nodes.
    pub fn seed_source(
        &mut self,
        pos: Vec2,
        radius: f32,
        renderer: &mut impl Renderer,
    ) -> Result<NodeIndex, StoreError> {
        assert!(self.in_bounds(pos), "source position outside bounding disk");
        let node = Node::new_source(pos, radius, self.cfg.source_direction, self.cfg.source_cone);
        let index = self.commit(node, renderer, None)?;
        tracing::debug!(index, x = pos.x, y = pos.y, radius, "seeded source");
        Ok(index)
    }

    /// Seeds `count` sources at random positions inside the bounding
    /// disk (rejection sampling over the unit square), each with radius
    /// `U(source_radius_min, source_radius_max)`.
    pub fn seed_sources(
        &mut self,
        count: usize,
        rng: &mut impl Rng,
        renderer: &mut impl Renderer,
    ) -> Result<Vec<NodeIndex>, StoreError> {
        let mut indices = Vec::with_capacity(count);
        for _ in 0..count {
            let mut pos = Vec2::new(rng.random::<f32>(), rng.random::<f32>());
            while !self.in_bounds(pos) {
                pos = Vec2::new(rng.random::<f32>(), rng.random::<f32>());
            }
            let radius =
                rng.random_range(self.cfg.source_radius_min..self.cfg.source_radius_max);
            indices.push(self.seed_source(pos, radius, renderer)?);
        }
        Ok(indices)
    }

    /// Runs one iteration of the growth process.
    ///
    /// ### Parameters
    /// - `rng` - Randomness source; the draw order is fixed, see the
    ///   type-level docs.
    /// - `renderer` - Receives one `draw_stroke` call per accepted
    ///   candidate, before the store commit.
    ///
    /// ### Returns
    /// - `Ok(StepOutcome::Grown(index))` on acceptance.
    /// - `Ok(StepOutcome::Rejected(_))` when the candidate failed a
    ///   check; expected, frequent control flow.
    /// - `Ok(StepOutcome::Stalled)` under [`GrowthPolicy::EligibleSet`]
    ///   once every node is exhausted.
    /// - `Err(StoreError::CapacityExceeded)` when the store is full;
    ///   fatal, the caller should stop and persist output.
    pub fn step(
        &mut self,
        rng: &mut impl Rng,
        renderer: &mut impl Renderer,
    ) -> Result<StepOutcome, StoreError> {
        // Checking up front keeps the later commit infallible, so a
        // drawn stroke can never be left without its node.
        if self.store.is_full() {
            return Err(StoreError::CapacityExceeded {
                capacity: self.store.capacity(),
            });
        }

        if self.store.count() == 0 {
            return Ok(StepOutcome::Stalled);
        }

        let parent_index = match self.cfg.policy {
            GrowthPolicy::ResampleAll => {
                let index = rng.random_range(0..self.store.count());
                if self.store.get(index)?.state == NodeState::Exhausted {
                    return Ok(StepOutcome::Rejected(Rejection::ExhaustedParent));
                }
                index
            }
            GrowthPolicy::EligibleSet => {
                if self.eligible.is_empty() {
                    return Ok(StepOutcome::Stalled);
                }
                self.eligible[rng.random_range(0..self.eligible.len())]
            }
        };
        let parent = self.store.get(parent_index)?.clone();

        let radius = parent.radius
            * rng.random_range(self.cfg.min_radius_factor..self.cfg.max_radius_factor);
        if radius < self.cfg.min_drawable_radius {
            // This branch has shrunk below the drawable unit and can
            // never grow again.
            self.exhaust(parent_index)?;
            return Ok(StepOutcome::Rejected(Rejection::DegenerateRadius));
        }

        let direction = parent.growth_dir + self.sample_spread(rng, parent.cone);

        let step_len = parent.radius
            * rng.random_range(self.cfg.min_step_factor..self.cfg.max_step_factor);
        // sin for x and cos for y, as the pattern has always been drawn.
        let candidate = parent.pos + Vec2::new(direction.sin(), direction.cos()) * step_len;
        if !self.in_bounds(candidate) {
            return Ok(StepOutcome::Rejected(Rejection::OutOfBounds));
        }

        // The cone value is only drawn when the redraw fires, keeping
        // the RNG stream identical across accept and reject paths.
        let cone = if rng.random::<f32>() < self.cfg.cone_redraw_chance {
            rng.random_range(0.0..self.cfg.cone_redraw_max)
        } else {
            parent.cone
        };

        self.grid.neighbors_into(candidate, &mut self.scratch);
        for i in 0..self.scratch.len() {
            let neighbor_index = self.scratch[i];
            if neighbor_index == parent_index {
                continue;
            }
            let neighbor = self.store.get(neighbor_index)?;
            let clearance = self.cfg.collision_margin + neighbor.radius + radius;
            if neighbor.pos.distance(candidate) <= clearance {
                return Ok(StepOutcome::Rejected(Rejection::Collision));
            }
        }

        // Accepted: draw first, then commit the node at the stroke's
        // actual endpoint so the raster and the tree stay in register.
        let snapped = renderer.draw_stroke(parent.pos, candidate, radius);
        let child = Node::new_child(snapped, radius, parent_index, direction, cone);
        let index = self.commit(child, renderer, Some(parent_index))?;
        Ok(StepOutcome::Grown(index))
    }

    /// Loops [`GrowthEngine::step`] until cancellation, an optional
    /// iteration limit, a stall, or store capacity.
    ///
    /// The cancellation token is checked between iterations only, so an
    /// in-flight acceptance always commits in full. Capacity is the one
    /// error that escapes; the caller owns the orderly shutdown (final
    /// snapshot of the rendered surface).
    pub fn run(
        &mut self,
        rng: &mut impl Rng,
        renderer: &mut impl Renderer,
        cancel: &CancelToken,
        max_iterations: Option<u64>,
    ) -> Result<RunSummary, StoreError> {
        let mut accepted = 0u64;
        let mut rejected = 0u64;
        let mut iterations = 0u64;
        loop {
            if cancel.is_cancelled() {
                return Ok(RunSummary {
                    accepted,
                    rejected,
                    stop: StopReason::Cancelled,
                });
            }
            if let Some(limit) = max_iterations
                && iterations >= limit
            {
                return Ok(RunSummary {
                    accepted,
                    rejected,
                    stop: StopReason::IterationLimit,
                });
            }
            iterations += 1;

            match self.step(rng, renderer)? {
                StepOutcome::Grown(_) => {
                    accepted += 1;
                    let count = self.store.count();
                    if count % PROGRESS_INTERVAL == 0 {
                        tracing::info!(
                            nodes = count,
                            rejected,
                            eligible = self.eligible.len(),
                            "growth progress"
                        );
                    }
                }
                StepOutcome::Rejected(reason) => {
                    rejected += 1;
                    tracing::trace!(?reason, "candidate rejected");
                }
                StepOutcome::Stalled => {
                    return Ok(RunSummary {
                        accepted,
                        rejected,
                        stop: StopReason::Stalled,
                    });
                }
            }
        }
    }

    /// Direction offset within the parent's cone. Guards the degenerate
    /// zero-width cone, which a redraw can produce.
    fn sample_spread(&self, rng: &mut impl Rng, cone: f32) -> f32 {
        if cone > self.cfg.min_search_angle {
            rng.random_range(self.cfg.min_search_angle..cone)
        } else {
            self.cfg.min_search_angle
        }
    }

    /// Commits a validated node: store, grid, eligibility, parent
    /// bookkeeping. All-or-nothing given the capacity gate in `step`.
    fn commit(
        &mut self,
        node: Node,
        renderer: &mut impl Renderer,
        parent: Option<NodeIndex>,
    ) -> Result<NodeIndex, StoreError> {
        let pos = node.pos;
        let radius = node.radius;
        let index = self.store.allocate(node)?;
        self.grid.insert(index, pos);
        self.slot.push(self.eligible.len());
        self.eligible.push(index);

        match parent {
            None => renderer.draw_circle(pos, radius),
            Some(parent_index) => {
                let parent_node = self.store.get_mut(parent_index)?;
                parent_node.child_count += 1;
                if parent_node.child_count > self.cfg.max_children {
                    self.exhaust(parent_index)?;
                }
            }
        }
        Ok(index)
    }

    /// Marks a node exhausted and drops it from the eligible set.
    fn exhaust(&mut self, index: NodeIndex) -> Result<(), StoreError> {
        let node = self.store.get_mut(index)?;
        if node.state == NodeState::Exhausted {
            return Ok(());
        }
        node.state = NodeState::Exhausted;

        let slot = self.slot[index];
        debug_assert_ne!(slot, SLOT_NONE);
        self.eligible.swap_remove(slot);
        if let Some(&moved) = self.eligible.get(slot) {
            self.slot[moved] = slot;
        }
        self.slot[index] = SLOT_NONE;
        Ok(())
    }
}
