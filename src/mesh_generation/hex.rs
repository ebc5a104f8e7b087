//! Volume meshes: hex8, hex20 and hex27.
//!
//! Corners 1-4 lie on the z- face counter-clockwise, 5-8 above them. hex20
//! adds edge midsides in VTK order: 9-12 around the bottom, 13-16 around the
//! top, 17-20 on the vertical edges. hex27 adds the face centres (left, right,
//! bottom, top, back, front) as 21-26 and the body centre 27.

use super::lattice::FinePoint;
use super::{BoundarySide, GlobalBuilder};
use crate::config::GridSpec;
use crate::data::mesh_data::GlobalMesh;
use crate::mesh_error::MeshGenError;
use crate::topology::cell_type::ElementFamily;

static HEX8: [FinePoint; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

static HEX27: [FinePoint; 27] = [
    [0, 0, 0],
    [2, 0, 0],
    [2, 2, 0],
    [0, 2, 0],
    [0, 0, 2],
    [2, 0, 2],
    [2, 2, 2],
    [0, 2, 2],
    // bottom ring
    [1, 0, 0],
    [2, 1, 0],
    [1, 2, 0],
    [0, 1, 0],
    // top ring
    [1, 0, 2],
    [2, 1, 2],
    [1, 2, 2],
    [0, 1, 2],
    // vertical edges
    [0, 0, 1],
    [2, 0, 1],
    [2, 2, 1],
    [0, 2, 1],
    // face centres
    [0, 1, 1],
    [2, 1, 1],
    [1, 0, 1],
    [1, 2, 1],
    [1, 1, 0],
    [1, 1, 2],
    [1, 1, 1],
];

fn local_offsets(family: ElementFamily) -> &'static [FinePoint] {
    match family {
        ElementFamily::Hex8 => &HEX8,
        ElementFamily::Hex20 => &HEX27[..20],
        _ => &HEX27,
    }
}

/// Corners, edge midsides and centre of each boundary face, in face order.
fn face_nodes(side: BoundarySide) -> ([usize; 4], [usize; 4], usize) {
    match side {
        BoundarySide::Left => ([1, 5, 8, 4], [17, 16, 20, 12], 21),
        BoundarySide::Right => ([2, 3, 7, 6], [10, 19, 14, 18], 22),
        BoundarySide::Bottom => ([1, 2, 6, 5], [9, 18, 13, 17], 23),
        BoundarySide::Top => ([4, 8, 7, 3], [20, 15, 19, 11], 24),
        BoundarySide::Back => ([1, 4, 3, 2], [12, 11, 10, 9], 25),
        BoundarySide::Front => ([5, 6, 7, 8], [13, 14, 15, 16], 26),
    }
}

fn face_local(side: BoundarySide, family: ElementFamily) -> Vec<usize> {
    let (corners, mids, centre) = face_nodes(side);
    let mut local = corners.to_vec();
    if family.order() == 2 {
        local.extend_from_slice(&mids);
    }
    if family == ElementFamily::Hex27 {
        local.push(centre);
    }
    local
}

/// Builds an `nx` by `ny` by `nz` hexahedral mesh.
pub fn generate(family: ElementFamily, grid: &GridSpec) -> Result<GlobalMesh, MeshGenError> {
    if family.dimension() != 3 {
        return Err(MeshGenError::UnsupportedElement(format!("{family} is not a volume element")));
    }
    grid.validate(3)?;
    let offsets = local_offsets(family);
    let sides = BoundarySide::sides(3);
    let faces: Vec<Vec<usize>> = sides.iter().map(|&s| face_local(s, family)).collect();
    let mut builder = GlobalBuilder::new(family, grid)?;
    let p = builder.lattice().order();
    let cells = builder.lattice().cells();

    for k in 0..grid.nz {
        for j in 0..grid.ny {
            for i in 0..grid.nx {
                builder.push_element([i * p, j * p, k * p], offsets)?;
                for (&side, local) in sides.iter().zip(&faces) {
                    if side.touches([i, j, k], cells) {
                        builder.push_face(side, local)?;
                    }
                }
            }
        }
    }
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(family: ElementFamily, n: [usize; 3]) -> GlobalMesh {
        generate(family, &GridSpec::cuboid(n, [0.0; 3], [1.0; 3])).unwrap()
    }

    #[test]
    fn hex8_single_cell_numbering() {
        let mesh = unit(ElementFamily::Hex8, [1, 1, 1]);
        assert_eq!(mesh.cells.bulk.cells[0].connectivity, vec![1, 2, 4, 3, 5, 6, 8, 7]);
        let front = &mesh.cells.boundary[&BoundarySide::Front.group_id()].cells[0];
        assert_eq!(front.connectivity, vec![5, 6, 8, 7]);
        assert!(front.reference_coords.iter().all(|x| x[2] == 1.0));
    }

    #[test]
    fn hex20_faces_are_quad8() {
        let mesh = unit(ElementFamily::Hex20, [1, 1, 1]);
        let conn = &mesh.cells.bulk.cells[0].connectivity;
        assert_eq!(conn.len(), 20);
        // edge 17 joins corners 1 and 5
        assert_eq!(conn[16], 9);
        let back = &mesh.cells.boundary[&BoundarySide::Back.group_id()].cells[0];
        assert_eq!(back.family, ElementFamily::Quad8);
        assert_eq!(back.connectivity, vec![1, 6, 8, 3, 4, 7, 5, 2]);
        assert!(back.reference_coords.iter().all(|x| x[2] == 0.0));
    }

    #[test]
    fn hex27_face_centres_sit_on_their_faces() {
        let mesh = unit(ElementFamily::Hex27, [1, 1, 1]);
        let cell = &mesh.cells.bulk.cells[0];
        assert_eq!(cell.reference_coords[20], [0.0, 0.5, 0.5]);
        assert_eq!(cell.reference_coords[23], [0.5, 1.0, 0.5]);
        assert_eq!(cell.reference_coords[26], [0.5, 0.5, 0.5]);
        for &side in BoundarySide::sides(3) {
            let face = &mesh.cells.boundary[&side.group_id()].cells[0];
            assert_eq!(face.connectivity.len(), 9);
            let axis = side.axis();
            let want = if side.is_max() { 1.0 } else { 0.0 };
            assert!(face.reference_coords.iter().all(|x| x[axis] == want), "{side:?}");
        }
    }

    #[test]
    fn bottom_group_runs_k_outer_i_inner() {
        let mesh = unit(ElementFamily::Hex8, [2, 1, 2]);
        let bottom = &mesh.cells.boundary[&BoundarySide::Bottom.group_id()];
        let first: Vec<usize> = bottom.cells.iter().map(|c| c.connectivity[0]).collect();
        // corner 1 of cells (i, 0, k): id = k*6 + i + 1
        assert_eq!(first, vec![1, 2, 7, 8]);
    }
}
