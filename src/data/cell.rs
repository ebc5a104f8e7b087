//! Cell records: one finite element with its connectivity and reference geometry.

use crate::mesh_error::MeshGenError;
use crate::topology::cell_type::{ElementFamily, VtkCellType};

/// A bulk element or a boundary face, edge or point.
///
/// Connectivity holds 1-based global node ids in the family's canonical local
/// order (corners, then edge midsides, then face and body centres).
#[derive(Clone, Debug, PartialEq)]
pub struct CellRecord {
    pub dimension: u8,
    pub family: ElementFamily,
    pub vtk_cell_type: VtkCellType,
    pub connectivity: Vec<usize>,
    pub reference_coords: Vec<[f64; 3]>,
    pub physical_group_ids: Vec<i32>,
    pub physical_group_names: Vec<String>,
}

impl CellRecord {
    /// Builds a record for `family` whose type fields are derived from the family.
    pub fn new(family: ElementFamily, connectivity: Vec<usize>, reference_coords: Vec<[f64; 3]>) -> Self {
        Self {
            dimension: family.dimension(),
            family,
            vtk_cell_type: family.vtk_cell_type(),
            connectivity,
            reference_coords,
            physical_group_ids: Vec::new(),
            physical_group_names: Vec::new(),
        }
    }

    /// Tags the record with a physical group.
    pub fn with_group(mut self, id: i32, name: &str) -> Self {
        self.physical_group_ids.push(id);
        self.physical_group_names.push(name.to_string());
        self
    }

    pub fn nodes_per_element(&self) -> usize {
        self.connectivity.len()
    }

    /// Checks lengths against the family and node ids against `[1, node_count]`.
    pub fn validate(&self, node_count: usize) -> Result<(), MeshGenError> {
        let expected = self.family.nodes_per_element();
        if self.connectivity.len() != expected {
            return Err(MeshGenError::InvalidCell(format!(
                "{} record has {} nodes, expected {expected}",
                self.family,
                self.connectivity.len()
            )));
        }
        if self.reference_coords.len() != expected {
            return Err(MeshGenError::InvalidCell(format!(
                "{} record has {} coordinate rows, expected {expected}",
                self.family,
                self.reference_coords.len()
            )));
        }
        if self.dimension != self.family.dimension() {
            return Err(MeshGenError::InvalidCell(format!(
                "dimension {} does not match family {}",
                self.dimension, self.family
            )));
        }
        if let Some(&bad) = self
            .connectivity
            .iter()
            .find(|&&id| id == 0 || id > node_count)
        {
            return Err(MeshGenError::InvalidCell(format!(
                "node id {bad} outside [1, {node_count}]"
            )));
        }
        if self.physical_group_ids.len() != self.physical_group_names.len() {
            return Err(MeshGenError::InvalidCell(
                "group ids and names differ in length".into(),
            ));
        }
        Ok(())
    }

    /// Current coordinates: reference coordinates plus the overlay's displacement.
    pub fn current_coords(&self, overlay: &DisplacementOverlay) -> Vec<[f64; 3]> {
        self.connectivity
            .iter()
            .zip(&self.reference_coords)
            .map(|(&id, x)| {
                let u = overlay.displacement(id);
                [x[0] + u[0], x[1] + u[1], x[2] + u[2]]
            })
            .collect()
    }
}

/// Nodal displacement field laid over the reference geometry.
///
/// Nodes that were never displaced read as zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplacementOverlay {
    values: Vec<[f64; 3]>,
}

impl DisplacementOverlay {
    /// Zero displacement for `node_count` nodes.
    pub fn zeros(node_count: usize) -> Self {
        Self {
            values: vec![[0.0; 3]; node_count],
        }
    }

    /// Displacement of 1-based node `id`.
    pub fn displacement(&self, id: usize) -> [f64; 3] {
        id.checked_sub(1)
            .and_then(|i| self.values.get(i))
            .copied()
            .unwrap_or([0.0; 3])
    }

    pub fn set(&mut self, id: usize, u: [f64; 3]) -> Result<(), MeshGenError> {
        let slot = id
            .checked_sub(1)
            .and_then(|i| self.values.get_mut(i))
            .ok_or_else(|| MeshGenError::InvalidCell(format!("no node {id} in displacement overlay")))?;
        *slot = u;
        Ok(())
    }
}
