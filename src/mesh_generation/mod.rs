//! Structured mesh generators with physical groups, and the collective entry point.
//!
//! Every family generator numbers nodes on a shared [`Lattice`], builds one bulk
//! cell per structured cell and files the faces lying on the box boundary into
//! one group per side. Group ids follow the side order left, right, bottom,
//! top, back, front; node sets `"<side>nodes"` are numbered the same way from
//! 10001.

pub mod edge;
pub mod hex;
pub mod lattice;
pub mod quad;

pub use lattice::Lattice;

use crate::algs::communicator::{Communicator, DistContext};
use crate::algs::distribute::distribute;
use crate::config::{GridSpec, MeshConfig};
use crate::data::cell::CellRecord;
use crate::data::mesh_data::{GlobalMesh, GroupCells, GroupedCells, MeshData};
use crate::mesh_error::MeshGenError;
use crate::topology::cell_type::ElementFamily;
use crate::topology::physical_groups::{ALL_DOMAIN, ALL_DOMAIN_ID, NODE_SET_ID_OFFSET};
use itertools::Itertools;
use lattice::FinePoint;
use std::collections::BTreeMap;

/// Boundary group name for the minimum-x side.
pub const BOUNDARY_LEFT: &str = "left";
/// Boundary group name for the maximum-x side.
pub const BOUNDARY_RIGHT: &str = "right";
/// Boundary group name for the minimum-y side.
pub const BOUNDARY_BOTTOM: &str = "bottom";
/// Boundary group name for the maximum-y side.
pub const BOUNDARY_TOP: &str = "top";
/// Boundary group name for the minimum-z side.
pub const BOUNDARY_BACK: &str = "back";
/// Boundary group name for the maximum-z side.
pub const BOUNDARY_FRONT: &str = "front";

/// One side of the structured box.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BoundarySide {
    Left,
    Right,
    Bottom,
    Top,
    Back,
    Front,
}

static SIDES: [BoundarySide; 6] = [
    BoundarySide::Left,
    BoundarySide::Right,
    BoundarySide::Bottom,
    BoundarySide::Top,
    BoundarySide::Back,
    BoundarySide::Front,
];

impl BoundarySide {
    /// Sides present on a `dim`-dimensional box, in group-id order.
    pub fn sides(dim: u8) -> &'static [BoundarySide] {
        &SIDES[..2 * dim.min(3) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            BoundarySide::Left => BOUNDARY_LEFT,
            BoundarySide::Right => BOUNDARY_RIGHT,
            BoundarySide::Bottom => BOUNDARY_BOTTOM,
            BoundarySide::Top => BOUNDARY_TOP,
            BoundarySide::Back => BOUNDARY_BACK,
            BoundarySide::Front => BOUNDARY_FRONT,
        }
    }

    pub fn node_set_name(self) -> String {
        format!("{}nodes", self.name())
    }

    /// Element group id, 1-based in side order.
    pub fn group_id(self) -> i32 {
        self.position() as i32 + 1
    }

    pub fn node_set_id(self) -> i32 {
        NODE_SET_ID_OFFSET + self.group_id()
    }

    /// Axis normal to the side.
    pub fn axis(self) -> usize {
        self.position() / 2
    }

    /// Whether the side sits at the maximum of its axis.
    pub fn is_max(self) -> bool {
        self.position() % 2 == 1
    }

    fn position(self) -> usize {
        match self {
            BoundarySide::Left => 0,
            BoundarySide::Right => 1,
            BoundarySide::Bottom => 2,
            BoundarySide::Top => 3,
            BoundarySide::Back => 4,
            BoundarySide::Front => 5,
        }
    }

    /// Whether structured cell `cell` of a grid with `cells` per axis touches this side.
    pub fn touches(self, cell: [usize; 3], cells: [usize; 3]) -> bool {
        let axis = self.axis();
        if self.is_max() {
            cell[axis] + 1 == cells[axis]
        } else {
            cell[axis] == 0
        }
    }

    /// Number of boundary records on this side.
    fn face_count(self, cells: [usize; 3], dim: u8) -> usize {
        (0..dim as usize)
            .filter(|&a| a != self.axis())
            .map(|a| cells[a])
            .product()
    }
}

/// Accumulates bulk cells and boundary records while a family generator walks the grid.
pub(crate) struct GlobalBuilder {
    lattice: Lattice,
    family: ElementFamily,
    face_family: ElementFamily,
    bulk: Vec<CellRecord>,
    faces: BTreeMap<i32, Vec<CellRecord>>,
}

impl GlobalBuilder {
    pub(crate) fn new(family: ElementFamily, grid: &GridSpec) -> Result<Self, MeshGenError> {
        let face_family = family
            .boundary_family()
            .ok_or_else(|| MeshGenError::UnsupportedElement(family.to_string()))?;
        let lattice = Lattice::new(family, grid);
        let [nx, ny, nz] = lattice.cells();
        let capacity = nx * ny.max(1) * nz.max(1);
        Ok(Self {
            lattice,
            family,
            face_family,
            bulk: Vec::with_capacity(capacity),
            faces: BTreeMap::new(),
        })
    }

    pub(crate) fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Appends the bulk cell whose lattice origin is `base`.
    pub(crate) fn push_element(&mut self, base: FinePoint, offsets: &[FinePoint]) -> Result<(), MeshGenError> {
        let mut connectivity = Vec::with_capacity(offsets.len());
        let mut coords = Vec::with_capacity(offsets.len());
        for off in offsets {
            let p = [base[0] + off[0], base[1] + off[1], base[2] + off[2]];
            let id = self.lattice.node_id(p).ok_or_else(|| {
                MeshGenError::InvalidCell(format!("no {} node at lattice point {p:?}", self.family))
            })?;
            connectivity.push(id);
            coords.push(self.lattice.coords(p));
        }
        let cell = CellRecord::new(self.family, connectivity, coords).with_group(ALL_DOMAIN_ID, ALL_DOMAIN);
        self.bulk.push(cell);
        Ok(())
    }

    /// Files a boundary record made of the last bulk cell's local nodes `local` (1-based).
    pub(crate) fn push_face(&mut self, side: BoundarySide, local: &[usize]) -> Result<(), MeshGenError> {
        let owner = self
            .bulk
            .last()
            .ok_or_else(|| MeshGenError::InvalidCell("boundary face without a bulk cell".into()))?;
        let mut connectivity = Vec::with_capacity(local.len());
        let mut coords = Vec::with_capacity(local.len());
        for &l in local {
            let slot = l
                .checked_sub(1)
                .filter(|&s| s < owner.connectivity.len())
                .ok_or_else(|| MeshGenError::InvalidCell(format!("local node {l} out of range")))?;
            connectivity.push(owner.connectivity[slot]);
            coords.push(owner.reference_coords[slot]);
        }
        let face = CellRecord::new(self.face_family, connectivity, coords)
            .with_group(side.group_id(), side.name());
        self.faces.entry(side.group_id()).or_default().push(face);
        Ok(())
    }

    /// Numbers the groups and derives each side's node set.
    pub(crate) fn finish(self) -> GlobalMesh {
        let numbered = |cells: Vec<CellRecord>| GroupCells {
            element_ids: (1..=cells.len()).collect(),
            cells,
        };
        let node_sets = self
            .faces
            .iter()
            .map(|(&id, faces)| {
                let nodes = faces
                    .iter()
                    .flat_map(|f| f.connectivity.iter().copied())
                    .sorted_unstable()
                    .dedup()
                    .collect();
                (NODE_SET_ID_OFFSET + id, nodes)
            })
            .collect();
        GlobalMesh {
            node_coords: self.lattice.node_coords(),
            cells: GroupedCells {
                bulk: numbered(self.bulk),
                boundary: self.faces.into_iter().map(|(id, f)| (id, numbered(f))).collect(),
                node_sets,
            },
        }
    }
}

/// Derives counts and the group registry without building any cells.
///
/// Every rank computes this identically from the configuration.
pub fn describe(config: &MeshConfig) -> Result<MeshData, MeshGenError> {
    config.validate()?;
    let family = config.family;
    let dim = family.dimension();
    let lattice = Lattice::new(family, &config.grid);
    let cells = lattice.cells();
    let fine = lattice.fine_dims();

    let mut mesh = MeshData::new(family, config.grid.clone());
    mesh.node_count = lattice.node_count();
    mesh.bulk_element_count = cells[..dim as usize].iter().product();
    mesh.groups
        .register_element_group(ALL_DOMAIN, ALL_DOMAIN_ID, dim, mesh.bulk_element_count)?;

    let sides = BoundarySide::sides(dim);
    for &side in sides {
        let count = side.face_count(cells, dim);
        mesh.groups
            .register_element_group(side.name(), side.group_id(), dim - 1, count)?;
        mesh.boundary_element_count += count;
    }
    for &side in sides {
        let plane = if side.is_max() { fine[side.axis()] - 1 } else { 0 };
        let nodes = lattice.count_on_plane(side.axis(), plane);
        mesh.groups
            .register_node_set(&side.node_set_name(), side.node_set_id(), nodes)?;
    }
    Ok(mesh)
}

/// Builds the full mesh of `family` on `grid` (coordinating rank only).
pub fn build_global(family: ElementFamily, grid: &GridSpec) -> Result<GlobalMesh, MeshGenError> {
    match family {
        ElementFamily::Edge2 | ElementFamily::Edge3 | ElementFamily::Edge4 => edge::generate(family, grid),
        ElementFamily::Quad4 | ElementFamily::Quad8 | ElementFamily::Quad9 => quad::generate(family, grid),
        ElementFamily::Hex8 | ElementFamily::Hex20 | ElementFamily::Hex27 => hex::generate(family, grid),
        ElementFamily::Point1 => Err(MeshGenError::UnsupportedElement(family.to_string())),
    }
}

/// Generates the mesh on rank 0 and hands every rank its share.
///
/// Collective: every rank of `ctx` must call this with the same configuration,
/// otherwise the call blocks or fails with [`MeshGenError::MetadataMismatch`].
pub fn generate_mesh<C: Communicator>(
    ctx: &DistContext<C>,
    config: &MeshConfig,
) -> Result<MeshData, MeshGenError> {
    let mut mesh = describe(config)?;
    if ctx.is_root() {
        let global = build_global(config.family, &config.grid)?;
        debug_assert_eq!(global.node_coords.len(), mesh.node_count);
        debug_assert_eq!(global.cells.bulk.len(), mesh.bulk_element_count);
        mesh.global = Some(global);
    }
    distribute(ctx, &mut mesh)?;
    if ctx.is_root() {
        log::info!("{}", mesh.summary());
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_follow_group_order() {
        let names: Vec<_> = BoundarySide::sides(2).iter().map(|s| s.name()).collect();
        assert_eq!(names, ["left", "right", "bottom", "top"]);
        assert_eq!(BoundarySide::Front.group_id(), 6);
        assert_eq!(BoundarySide::Bottom.node_set_id(), 10003);
        assert_eq!(BoundarySide::Top.node_set_name(), "topnodes");
        assert_eq!(BoundarySide::sides(1).len(), 2);
    }

    #[test]
    fn describe_counts_groups_without_cells() {
        let cfg = MeshConfig::new(ElementFamily::Hex8, GridSpec::cuboid([2, 3, 4], [0.0; 3], [1.0; 3]));
        let mesh = describe(&cfg).unwrap();
        assert_eq!(mesh.node_count, 3 * 4 * 5);
        assert_eq!(mesh.bulk_element_count, 24);
        assert_eq!(mesh.groups.element_group("left").unwrap().size, 12);
        assert_eq!(mesh.groups.element_group("bottom").unwrap().size, 8);
        assert_eq!(mesh.groups.element_group("front").unwrap().size, 6);
        assert_eq!(mesh.groups.node_set("backnodes").unwrap().size, 12);
        assert_eq!(mesh.boundary_element_count, 2 * (12 + 8 + 6));
        assert!(mesh.global.is_none());
    }

    #[test]
    fn describe_rejects_bad_grid() {
        let cfg = MeshConfig::new(ElementFamily::Quad4, GridSpec::rect(0, 2, [0.0; 2], [1.0; 2]));
        assert!(matches!(describe(&cfg), Err(MeshGenError::InvalidGrid(_))));
    }
}
