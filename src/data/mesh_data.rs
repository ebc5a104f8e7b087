//! Mesh data container: metadata, the global mesh (rank 0 only) and this
//! rank's local share.

use crate::config::GridSpec;
use crate::data::cell::CellRecord;
use crate::mesh_error::MeshGenError;
use crate::topology::cell_type::{ElementFamily, VtkCellType};
use crate::topology::physical_groups::{ALL_DOMAIN_ID, GroupKey, PhysicalGroupRegistry};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;

/// Cells of one element group together with their 1-based element ids.
///
/// Bulk ids are global element numbers; boundary ids number the group's
/// records from 1.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupCells {
    pub element_ids: Vec<usize>,
    pub cells: Vec<CellRecord>,
}

impl GroupCells {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The contiguous sub-range `range` of this group.
    pub fn slice(&self, range: std::ops::Range<usize>) -> GroupCells {
        GroupCells {
            element_ids: self.element_ids[range.clone()].to_vec(),
            cells: self.cells[range].to_vec(),
        }
    }
}

/// Bulk cells, boundary groups and node sets, keyed by group id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupedCells {
    pub bulk: GroupCells,
    pub boundary: BTreeMap<i32, GroupCells>,
    pub node_sets: BTreeMap<i32, Vec<usize>>,
}

impl GroupedCells {
    /// Cells of an element group; `alldomain` resolves to the bulk cells.
    pub fn group(&self, groups: &PhysicalGroupRegistry, key: impl Into<GroupKey>) -> Option<&GroupCells> {
        let id = groups.element_group(key)?.id;
        if id == ALL_DOMAIN_ID {
            Some(&self.bulk)
        } else {
            self.boundary.get(&id)
        }
    }

    /// Node ids of a node set.
    pub fn node_set(&self, groups: &PhysicalGroupRegistry, key: impl Into<GroupKey>) -> Option<&[usize]> {
        let id = groups.node_set(key)?.id;
        self.node_sets.get(&id).map(Vec::as_slice)
    }
}

/// The complete mesh as built on rank 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlobalMesh {
    /// Reference coordinates indexed by `node_id - 1`.
    pub node_coords: Vec<[f64; 3]>,
    pub cells: GroupedCells,
}

/// This rank's share of the mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalMesh {
    pub cells: GroupedCells,
    /// Contiguous slice of global node ids assigned to this rank.
    pub node_ids: Vec<usize>,
}

impl LocalMesh {
    /// Sorted unique node ids referenced by the local bulk cells.
    pub fn touched_node_ids(&self) -> Vec<usize> {
        self.cells
            .bulk
            .cells
            .iter()
            .flat_map(|c| c.connectivity.iter().copied())
            .sorted_unstable()
            .dedup()
            .collect()
    }
}

/// Result of mesh generation on one rank.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub family: ElementFamily,
    pub grid: GridSpec,
    pub node_count: usize,
    pub bulk_element_count: usize,
    /// Total records over all boundary groups.
    pub boundary_element_count: usize,
    pub groups: PhysicalGroupRegistry,
    /// Present on rank 0 only.
    pub global: Option<GlobalMesh>,
    pub local: LocalMesh,
    /// Owning rank of each bulk element, indexed by `element_id - 1`.
    pub partition_info: Vec<usize>,
    /// Bulk elements owned by each rank.
    pub rank_element_counts: Vec<usize>,
}

impl MeshData {
    /// Empty container for `family` on `grid`.
    pub fn new(family: ElementFamily, grid: GridSpec) -> Self {
        Self {
            family,
            grid,
            node_count: 0,
            bulk_element_count: 0,
            boundary_element_count: 0,
            groups: PhysicalGroupRegistry::new(),
            global: None,
            local: LocalMesh::default(),
            partition_info: Vec::new(),
            rank_element_counts: Vec::new(),
        }
    }

    pub fn max_dim(&self) -> u8 {
        self.family.dimension()
    }

    pub fn min_dim(&self) -> u8 {
        self.max_dim().saturating_sub(1)
    }

    pub fn mesh_order(&self) -> usize {
        self.family.order()
    }

    pub fn nodes_per_bulk_element(&self) -> usize {
        self.family.nodes_per_element()
    }

    pub fn boundary_family(&self) -> ElementFamily {
        self.family.boundary_family().unwrap_or(ElementFamily::Point1)
    }

    pub fn nodes_per_boundary_element(&self) -> usize {
        self.boundary_family().nodes_per_element()
    }

    pub fn bulk_vtk_cell_type(&self) -> VtkCellType {
        self.family.vtk_cell_type()
    }

    pub fn boundary_vtk_cell_type(&self) -> VtkCellType {
        self.boundary_family().vtk_cell_type()
    }

    pub fn bulk_type_name(&self) -> &'static str {
        self.family.name()
    }

    /// Global mesh, or an error off the coordinating rank.
    pub fn try_global(&self) -> Result<&GlobalMesh, MeshGenError> {
        self.global.as_ref().ok_or(MeshGenError::GlobalMeshUnavailable)
    }

    /// Local cells of an element group.
    pub fn local_group(&self, key: impl Into<GroupKey>) -> Option<&GroupCells> {
        self.local.cells.group(&self.groups, key)
    }

    /// Local node ids of a node set.
    pub fn local_node_set(&self, key: impl Into<GroupKey>) -> Option<&[usize]> {
        self.local.cells.node_set(&self.groups, key)
    }

    pub fn summary(&self) -> MeshSummary<'_> {
        MeshSummary { mesh: self }
    }
}

/// Human-readable mesh report, logged after generation.
pub struct MeshSummary<'a> {
    mesh: &'a MeshData,
}

impl fmt::Display for MeshSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.mesh;
        writeln!(f, "mesh summary:")?;
        writeln!(
            f,
            "  dims (max/min) = {}/{}, order = {}, bulk type = {}",
            m.max_dim(),
            m.min_dim(),
            m.mesh_order(),
            m.bulk_type_name()
        )?;
        writeln!(
            f,
            "  nodes = {}, bulk elements = {}, boundary elements = {}",
            m.node_count, m.bulk_element_count, m.boundary_element_count
        )?;
        writeln!(
            f,
            "  nodes per element (bulk/boundary) = {}/{}, vtk (bulk/boundary) = {}/{}",
            m.nodes_per_bulk_element(),
            m.nodes_per_boundary_element(),
            m.bulk_vtk_cell_type(),
            m.boundary_vtk_cell_type()
        )?;
        for g in m.groups.element_groups() {
            writeln!(f, "  element group {:>5}: {:<10} dim = {}, elements = {}", g.id, g.name, g.dim, g.size)?;
        }
        for g in m.groups.node_sets() {
            writeln!(f, "  node set      {:>5}: {:<10} nodes = {}", g.id, g.name, g.size)?;
        }
        write!(f, "  ranks = {}", m.rank_element_counts.len())
    }
}
