//! Planar meshes: quad4, quad8 and quad9.
//!
//! Local numbering is counter-clockwise from the (x-, y-) corner; quadratic
//! families add the midsides 5 (1-2), 6 (2-3), 7 (3-4), 8 (4-1) and quad9 the
//! centre 9. Boundary edges are listed corner, midside, corner.

use super::lattice::FinePoint;
use super::{BoundarySide, GlobalBuilder};
use crate::config::GridSpec;
use crate::data::mesh_data::GlobalMesh;
use crate::mesh_error::MeshGenError;
use crate::topology::cell_type::ElementFamily;

static QUAD4: [FinePoint; 4] = [[0, 0, 0], [1, 0, 0], [1, 1, 0], [0, 1, 0]];

static QUAD9: [FinePoint; 9] = [
    [0, 0, 0],
    [2, 0, 0],
    [2, 2, 0],
    [0, 2, 0],
    [1, 0, 0],
    [2, 1, 0],
    [1, 2, 0],
    [0, 1, 0],
    [1, 1, 0],
];

fn local_offsets(family: ElementFamily) -> &'static [FinePoint] {
    match family {
        ElementFamily::Quad4 => &QUAD4,
        ElementFamily::Quad8 => &QUAD9[..8],
        _ => &QUAD9,
    }
}

/// Local nodes of the boundary edge on `side`.
fn edge_nodes(side: BoundarySide, quadratic: bool) -> &'static [usize] {
    match (side, quadratic) {
        (BoundarySide::Bottom, false) => &[1, 2],
        (BoundarySide::Right, false) => &[2, 3],
        (BoundarySide::Top, false) => &[3, 4],
        (BoundarySide::Left, false) => &[4, 1],
        (BoundarySide::Bottom, true) => &[1, 5, 2],
        (BoundarySide::Right, true) => &[2, 6, 3],
        (BoundarySide::Top, true) => &[3, 7, 4],
        (BoundarySide::Left, true) => &[4, 8, 1],
        (BoundarySide::Back | BoundarySide::Front, _) => &[],
    }
}

/// Builds an `nx` by `ny` quadrilateral mesh.
pub fn generate(family: ElementFamily, grid: &GridSpec) -> Result<GlobalMesh, MeshGenError> {
    if family.dimension() != 2 {
        return Err(MeshGenError::UnsupportedElement(format!("{family} is not a planar element")));
    }
    grid.validate(2)?;
    let offsets = local_offsets(family);
    let quadratic = family.order() == 2;
    let mut builder = GlobalBuilder::new(family, grid)?;
    let p = builder.lattice().order();
    let cells = builder.lattice().cells();

    for j in 0..grid.ny {
        for i in 0..grid.nx {
            builder.push_element([i * p, j * p, 0], offsets)?;
            for &side in BoundarySide::sides(2) {
                if side.touches([i, j, 0], cells) {
                    builder.push_face(side, edge_nodes(side, quadratic))?;
                }
            }
        }
    }
    Ok(builder.finish())
}
