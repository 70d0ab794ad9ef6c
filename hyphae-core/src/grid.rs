use crate::types::NodeIndex;
use glam::Vec2;

/// Uniform bucket grid over the unit square, used to bound the set of
/// nodes considered during a collision query.
///
/// Each node is inserted into exactly one bucket — the cell containing
/// its position under `floor(coord / cell_width)` — and never moves,
/// since node positions are fixed after acceptance. Queries return the
/// union of the 3×3 block of buckets around a position, which
/// over-approximates the true neighborhood; callers filter by exact
/// distance afterwards.
#[derive(Debug)]
pub struct SpatialGrid {
    cell_width: f32,
    cells_per_side: usize,
    buckets: Vec<Vec<NodeIndex>>,
}

impl SpatialGrid {
    /// Creates a grid covering `[0, domain_size)²` with square cells of
    /// `cell_width` per side.
    pub fn new(domain_size: f32, cell_width: f32) -> Self {
        let cells_per_side = (domain_size / cell_width).ceil().max(1.0) as usize;
        Self {
            cell_width,
            cells_per_side,
            buckets: vec![Vec::new(); cells_per_side * cells_per_side],
        }
    }

    pub fn num_cells(&self) -> usize {
        self.buckets.len()
    }

    fn cell_coords(&self, pos: Vec2) -> (i64, i64) {
        (
            (pos.x / self.cell_width).floor() as i64,
            (pos.y / self.cell_width).floor() as i64,
        )
    }

    /// Flat index of the cell containing `pos`, clamped into the grid.
    ///
    /// Positions are bounds-checked upstream (every accepted node lies
    /// inside the bounding disk), so the clamp only absorbs float edge
    /// cases on the domain border.
    pub fn cell_of(&self, pos: Vec2) -> usize {
        let side = self.cells_per_side as i64;
        let (cx, cy) = self.cell_coords(pos);
        let cx = cx.clamp(0, side - 1) as usize;
        let cy = cy.clamp(0, side - 1) as usize;
        cy * self.cells_per_side + cx
    }

    /// Read access to one bucket, mainly for consistency checks.
    pub fn bucket(&self, cell: usize) -> &[NodeIndex] {
        &self.buckets[cell]
    }

    /// Appends `index` to the bucket for the cell containing `pos`.
    pub fn insert(&mut self, index: NodeIndex, pos: Vec2) {
        let cell = self.cell_of(pos);
        self.buckets[cell].push(index);
    }

    /// Collects the union of the 3×3 block of buckets centered on the
    /// cell containing `pos` into `out`.
    ///
    /// `out` is cleared first. Cells falling outside the grid are
    /// skipped; the grid does not wrap. The result may contain indices
    /// far from `pos` — this is an intentional over-approximation.
    ///
    /// ### Parameters
    /// - `pos` - Query position in normalized coordinates.
    /// - `out` - Reused scratch buffer receiving the neighbor indices.
    pub fn neighbors_into(&self, pos: Vec2, out: &mut Vec<NodeIndex>) {
        out.clear();
        let side = self.cells_per_side as i64;
        let (cx, cy) = self.cell_coords(pos);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let x = cx + dx;
                let y = cy + dy;
                if x < 0 || x >= side || y < 0 || y >= side {
                    continue;
                }
                let cell = y as usize * self.cells_per_side + x as usize;
                out.extend_from_slice(&self.buckets[cell]);
            }
        }
    }

    /// Allocating convenience wrapper around [`SpatialGrid::neighbors_into`].
    pub fn neighbors(&self, pos: Vec2) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        self.neighbors_into(pos, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn grid() -> SpatialGrid {
        // 10x10 cells of width 0.1 over the unit square.
        SpatialGrid::new(1.0, 0.1)
    }

    #[test]
    fn insert_places_node_in_the_containing_cell() {
        let mut g = grid();
        g.insert(7, Vec2::new(0.25, 0.35));

        let cell = g.cell_of(Vec2::new(0.25, 0.35));
        // floor(0.25/0.1) = 2, floor(0.35/0.1) = 3 -> 3 * 10 + 2.
        assert_eq!(cell, 32);
        assert_eq!(g.bucket(cell), &[7]);

        // Exactly one bucket holds the node.
        let occupied: usize = (0..g.num_cells()).filter(|&c| !g.bucket(c).is_empty()).count();
        assert_eq!(occupied, 1);
    }

    #[test]
    fn neighbors_covers_the_3x3_block() {
        let mut g = grid();
        let center = Vec2::new(0.55, 0.55);

        g.insert(0, center);
        g.insert(1, Vec2::new(0.45, 0.45)); // cell (4, 4), diagonal neighbor
        g.insert(2, Vec2::new(0.65, 0.55)); // cell (6, 5), edge neighbor
        g.insert(3, Vec2::new(0.95, 0.95)); // far corner, outside the block

        let mut out = Vec::new();
        g.neighbors_into(center, &mut out);
        out.sort_unstable();
        assert_eq!(out, vec![0, 1, 2]);
    }

    #[test]
    fn neighbors_skips_cells_outside_the_grid() {
        let mut g = grid();
        // Corner cell (0, 0): five of the nine block cells are invalid.
        g.insert(0, Vec2::new(0.05, 0.05));
        g.insert(1, Vec2::new(0.15, 0.05));

        let out = g.neighbors(Vec2::new(0.01, 0.01));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn neighbors_clears_the_scratch_buffer() {
        let g = grid();
        let mut out = vec![99, 98];
        g.neighbors_into(Vec2::new(0.5, 0.5), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn cell_of_clamps_the_domain_border() {
        let g = grid();
        // floor(1.0 / 0.1) would be cell 10, one past the last row.
        assert_eq!(g.cell_of(Vec2::new(1.0, 1.0)), g.num_cells() - 1);
        assert_eq!(g.cell_of(Vec2::new(-0.01, 0.0)), 0);
    }
}
