//! Line meshes: edge2, edge3 and edge4.
//!
//! Nodes are numbered sequentially along the line and so is each element's
//! connectivity, `(i, i+1, ..., i+p)`. The two boundary groups hold one point
//! record each.

use super::lattice::FinePoint;
use super::{BoundarySide, GlobalBuilder};
use crate::config::GridSpec;
use crate::data::mesh_data::GlobalMesh;
use crate::mesh_error::MeshGenError;
use crate::topology::cell_type::ElementFamily;

static OFFSETS: [FinePoint; 4] = [[0, 0, 0], [1, 0, 0], [2, 0, 0], [3, 0, 0]];

/// Builds a line mesh of `grid.nx` elements.
pub fn generate(family: ElementFamily, grid: &GridSpec) -> Result<GlobalMesh, MeshGenError> {
    if family.dimension() != 1 {
        return Err(MeshGenError::UnsupportedElement(format!("{family} is not a line element")));
    }
    grid.validate(1)?;
    let npe = family.nodes_per_element();
    let mut builder = GlobalBuilder::new(family, grid)?;
    let p = builder.lattice().order();
    let nx = grid.nx;

    for i in 0..nx {
        builder.push_element([i * p, 0, 0], &OFFSETS[..npe])?;
        if i == 0 {
            builder.push_face(BoundarySide::Left, &[1])?;
        }
        if i + 1 == nx {
            builder.push_face(BoundarySide::Right, &[npe])?;
        }
    }
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge4_elements_share_end_nodes() {
        let mesh = generate(ElementFamily::Edge4, &GridSpec::line(2, 0.0, 3.0)).unwrap();
        assert_eq!(mesh.node_coords.len(), 7);
        let conn: Vec<_> = mesh.cells.bulk.cells.iter().map(|c| c.connectivity.clone()).collect();
        assert_eq!(conn, vec![vec![1, 2, 3, 4], vec![4, 5, 6, 7]]);
        assert_eq!(mesh.node_coords[3], [1.5, 0.0, 0.0]);
        assert_eq!(mesh.cells.bulk.cells[1].vtk_cell_type, 4);
    }

    #[test]
    fn boundary_points_are_dimension_zero() {
        let mesh = generate(ElementFamily::Edge2, &GridSpec::line(4, -1.0, 1.0)).unwrap();
        let right = &mesh.cells.boundary[&BoundarySide::Right.group_id()];
        assert_eq!(right.cells.len(), 1);
        assert_eq!(right.cells[0].connectivity, vec![5]);
        assert_eq!(right.cells[0].dimension, 0);
        assert_eq!(right.cells[0].vtk_cell_type, 1);
        assert_eq!(right.cells[0].reference_coords, vec![[1.0, 0.0, 0.0]]);
    }

    #[test]
    fn rejects_planar_family() {
        assert!(generate(ElementFamily::Quad4, &GridSpec::line(1, 0.0, 1.0)).is_err());
    }
}
