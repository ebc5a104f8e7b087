//! Refined node lattice shared by every family generator.
//!
//! A grid of `n` cells per direction and order `p` carries a fine lattice of
//! `n * p + 1` points per direction. Global node ids enumerate the lattice
//! lexicographically (k slowest, i fastest), 1-based. Serendipity families
//! (quad8, hex20) drop every point with two or more odd fine coordinates, which
//! turns the numbering into alternating full and reduced rows/layers:
//!
//! * 2D: an even row holds `2Nx + 1` nodes, an odd row `Nx + 1`;
//! * 3D: an even layer holds `L1 = (2Nx+1)(2Ny+1) - Nx*Ny` nodes, an odd layer
//!   `L2 = (Nx+1)(Ny+1)`.

use crate::config::GridSpec;
use crate::topology::cell_type::ElementFamily;

/// Fine-lattice coordinate `(ii, jj, kk)`.
pub type FinePoint = [usize; 3];

/// Node numbering and placement for one family on one grid.
#[derive(Clone, Debug)]
pub struct Lattice {
    dim: u8,
    order: usize,
    serendipity: bool,
    cells: [usize; 3],
    extents: [(f64, f64); 3],
}

impl Lattice {
    pub fn new(family: ElementFamily, grid: &GridSpec) -> Self {
        let dim = family.dimension();
        Self {
            dim,
            order: family.order(),
            serendipity: family.is_serendipity(),
            cells: grid.cells(dim),
            extents: [
                (grid.xmin, grid.xmax),
                (grid.ymin, grid.ymax),
                (grid.zmin, grid.zmax),
            ],
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn cells(&self) -> [usize; 3] {
        self.cells
    }

    /// Fine points per direction (1 along unused directions).
    pub fn fine_dims(&self) -> [usize; 3] {
        self.cells.map(|n| n * self.order + 1)
    }

    /// Closed-form node count.
    pub fn node_count(&self) -> usize {
        let [fx, fy, fz] = self.fine_dims();
        let [nx, ny, nz] = self.cells;
        if !self.serendipity {
            return fx * fy * fz;
        }
        let full_layer = fx * fy - nx * ny;
        match self.dim {
            2 => full_layer,
            _ => full_layer * (nz + 1) + (nx + 1) * (ny + 1) * nz,
        }
    }

    /// Whether a fine point carries a node.
    pub fn exists(&self, p: FinePoint) -> bool {
        let [fx, fy, fz] = self.fine_dims();
        if p[0] >= fx || p[1] >= fy || p[2] >= fz {
            return false;
        }
        !self.serendipity || p.iter().filter(|&&c| c % 2 == 1).count() < 2
    }

    /// 1-based global id of the node at fine point `p`, if present.
    pub fn node_id(&self, p: FinePoint) -> Option<usize> {
        if !self.exists(p) {
            return None;
        }
        let [ii, jj, kk] = p;
        let [fx, fy, _] = self.fine_dims();
        if !self.serendipity {
            return Some(kk * fx * fy + jj * fx + ii + 1);
        }
        let [nx, ny, _] = self.cells;
        let full_row = fx;
        let half_row = nx + 1;
        let full_layer = fx * fy - nx * ny;
        let half_layer = (nx + 1) * (ny + 1);

        let layer_offset = (kk + 1) / 2 * full_layer + kk / 2 * half_layer;
        let in_layer = if kk % 2 == 1 {
            jj / 2 * half_row + ii / 2
        } else {
            let row_offset = (jj + 1) / 2 * full_row + jj / 2 * half_row;
            row_offset + if jj % 2 == 1 { ii / 2 } else { ii }
        };
        Some(layer_offset + in_layer + 1)
    }

    /// Physical position of fine point `p`.
    ///
    /// 1D lattices interpolate all three coordinates along the line from the
    /// min corner to the max corner; 2D lattices sit at `z = 0`.
    pub fn coords(&self, p: FinePoint) -> [f64; 3] {
        let fine = self.fine_dims();
        let lerp = |(lo, hi): (f64, f64), t: f64| lo + (hi - lo) * t;
        let t = |axis: usize| p[axis] as f64 / (fine[axis] - 1).max(1) as f64;
        match self.dim {
            1 => {
                let s = t(0);
                [
                    lerp(self.extents[0], s),
                    lerp(self.extents[1], s),
                    lerp(self.extents[2], s),
                ]
            }
            2 => [lerp(self.extents[0], t(0)), lerp(self.extents[1], t(1)), 0.0],
            _ => [
                lerp(self.extents[0], t(0)),
                lerp(self.extents[1], t(1)),
                lerp(self.extents[2], t(2)),
            ],
        }
    }

    /// All present fine points in global id order.
    pub fn points(&self) -> impl Iterator<Item = FinePoint> + '_ {
        let [fx, fy, fz] = self.fine_dims();
        (0..fz)
            .flat_map(move |k| (0..fy).flat_map(move |j| (0..fx).map(move |i| [i, j, k])))
            .filter(move |&p| self.exists(p))
    }

    /// Coordinate table indexed by `id - 1`.
    pub fn node_coords(&self) -> Vec<[f64; 3]> {
        let mut coords = Vec::with_capacity(self.node_count());
        coords.extend(self.points().map(|p| self.coords(p)));
        coords
    }

    /// Number of nodes with fine coordinate `axis` fixed at `value`.
    pub fn count_on_plane(&self, axis: usize, value: usize) -> usize {
        self.points().filter(|p| p[axis] == value).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lattice(family: ElementFamily, n: [usize; 3]) -> Lattice {
        Lattice::new(family, &GridSpec::cuboid(n, [0.0; 3], [1.0; 3]))
    }

    #[test]
    fn quad8_rows_alternate() {
        let l = lattice(ElementFamily::Quad8, [2, 1, 0]);
        // row 0: 5 nodes, row 1: 3 nodes, row 2: 5 nodes
        assert_eq!(l.node_count(), 13);
        assert_eq!(l.node_id([4, 0, 0]), Some(5));
        assert_eq!(l.node_id([0, 1, 0]), Some(6));
        assert_eq!(l.node_id([1, 1, 0]), None);
        assert_eq!(l.node_id([4, 1, 0]), Some(8));
        assert_eq!(l.node_id([0, 2, 0]), Some(9));
    }

    #[test]
    fn hex20_layers_alternate() {
        let l = lattice(ElementFamily::Hex20, [1, 1, 1]);
        assert_eq!(l.node_count(), 20);
        assert_eq!(l.node_id([2, 2, 0]), Some(8));
        assert_eq!(l.node_id([0, 0, 1]), Some(9));
        assert_eq!(l.node_id([1, 0, 1]), None);
        assert_eq!(l.node_id([2, 2, 2]), Some(20));
    }

    #[test]
    fn line_interpolates_between_corners() {
        let grid = GridSpec {
            nx: 2,
            xmin: 0.0,
            xmax: 2.0,
            ymin: 1.0,
            ymax: 3.0,
            zmin: 0.0,
            zmax: 0.0,
            ..GridSpec::default()
        };
        let l = Lattice::new(ElementFamily::Edge2, &grid);
        assert_eq!(l.node_coords(), vec![[0.0, 1.0, 0.0], [1.0, 2.0, 0.0], [2.0, 3.0, 0.0]]);
    }

    proptest! {
        #[test]
        fn ids_enumerate_points_in_order(nx in 1usize..5, ny in 1usize..4, nz in 1usize..4, fam in 0usize..9) {
            let family = ElementFamily::GENERATED[fam];
            let l = lattice(family, [nx, ny, nz]);
            let ids: Vec<usize> = l.points().map(|p| l.node_id(p).unwrap()).collect();
            prop_assert_eq!(ids.len(), l.node_count());
            prop_assert!(ids.iter().enumerate().all(|(i, &id)| id == i + 1));
        }
    }
}
