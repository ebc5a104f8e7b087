//! Element family metadata: dimension, order, node counts and VTK codes.

use crate::mesh_error::MeshGenError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// VTK cell type code handed to the output writer.
pub type VtkCellType = i32;

/// Closed set of Lagrange/serendipity element families the generators support.
///
/// `Point1` only appears as the boundary record of 1D meshes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ElementFamily {
    Point1,
    Edge2,
    Edge3,
    Edge4,
    Quad4,
    Quad8,
    Quad9,
    Hex8,
    Hex20,
    Hex27,
}

impl ElementFamily {
    /// Families accepted by the structured generators.
    pub const GENERATED: [ElementFamily; 9] = [
        ElementFamily::Edge2,
        ElementFamily::Edge3,
        ElementFamily::Edge4,
        ElementFamily::Quad4,
        ElementFamily::Quad8,
        ElementFamily::Quad9,
        ElementFamily::Hex8,
        ElementFamily::Hex20,
        ElementFamily::Hex27,
    ];

    /// Topological dimension.
    pub fn dimension(self) -> u8 {
        match self {
            ElementFamily::Point1 => 0,
            ElementFamily::Edge2 | ElementFamily::Edge3 | ElementFamily::Edge4 => 1,
            ElementFamily::Quad4 | ElementFamily::Quad8 | ElementFamily::Quad9 => 2,
            ElementFamily::Hex8 | ElementFamily::Hex20 | ElementFamily::Hex27 => 3,
        }
    }

    /// Polynomial order; also the refinement factor of the node lattice.
    pub fn order(self) -> usize {
        match self {
            ElementFamily::Point1 | ElementFamily::Edge2 => 1,
            ElementFamily::Quad4 | ElementFamily::Hex8 => 1,
            ElementFamily::Edge3 | ElementFamily::Quad8 | ElementFamily::Quad9 => 2,
            ElementFamily::Hex20 | ElementFamily::Hex27 => 2,
            ElementFamily::Edge4 => 3,
        }
    }

    pub fn nodes_per_element(self) -> usize {
        match self {
            ElementFamily::Point1 => 1,
            ElementFamily::Edge2 => 2,
            ElementFamily::Edge3 => 3,
            ElementFamily::Edge4 | ElementFamily::Quad4 => 4,
            ElementFamily::Quad8 | ElementFamily::Hex8 => 8,
            ElementFamily::Quad9 => 9,
            ElementFamily::Hex20 => 20,
            ElementFamily::Hex27 => 27,
        }
    }

    /// Serendipity families drop interior lattice points.
    pub fn is_serendipity(self) -> bool {
        matches!(self, ElementFamily::Quad8 | ElementFamily::Hex20)
    }

    /// VTK cell type code. Cubic edges are written as quadratic edges.
    pub fn vtk_cell_type(self) -> VtkCellType {
        match self {
            ElementFamily::Point1 => 1,
            ElementFamily::Edge2 => 3,
            ElementFamily::Edge3 | ElementFamily::Edge4 => 4,
            ElementFamily::Quad4 => 9,
            ElementFamily::Quad8 => 23,
            ElementFamily::Quad9 => 28,
            ElementFamily::Hex8 => 12,
            ElementFamily::Hex20 => 25,
            ElementFamily::Hex27 => 29,
        }
    }

    /// Family of the records placed in boundary groups.
    pub fn boundary_family(self) -> Option<ElementFamily> {
        match self {
            ElementFamily::Point1 => None,
            ElementFamily::Edge2 | ElementFamily::Edge3 | ElementFamily::Edge4 => {
                Some(ElementFamily::Point1)
            }
            ElementFamily::Quad4 => Some(ElementFamily::Edge2),
            ElementFamily::Quad8 | ElementFamily::Quad9 => Some(ElementFamily::Edge3),
            ElementFamily::Hex8 => Some(ElementFamily::Quad4),
            ElementFamily::Hex20 => Some(ElementFamily::Quad8),
            ElementFamily::Hex27 => Some(ElementFamily::Quad9),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementFamily::Point1 => "point1",
            ElementFamily::Edge2 => "edge2",
            ElementFamily::Edge3 => "edge3",
            ElementFamily::Edge4 => "edge4",
            ElementFamily::Quad4 => "quad4",
            ElementFamily::Quad8 => "quad8",
            ElementFamily::Quad9 => "quad9",
            ElementFamily::Hex8 => "hex8",
            ElementFamily::Hex20 => "hex20",
            ElementFamily::Hex27 => "hex27",
        }
    }

    /// Stable one-byte code used by the wire format.
    pub fn code(self) -> u8 {
        match self {
            ElementFamily::Point1 => 0,
            ElementFamily::Edge2 => 1,
            ElementFamily::Edge3 => 2,
            ElementFamily::Edge4 => 3,
            ElementFamily::Quad4 => 4,
            ElementFamily::Quad8 => 5,
            ElementFamily::Quad9 => 6,
            ElementFamily::Hex8 => 7,
            ElementFamily::Hex20 => 8,
            ElementFamily::Hex27 => 9,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => ElementFamily::Point1,
            1 => ElementFamily::Edge2,
            2 => ElementFamily::Edge3,
            3 => ElementFamily::Edge4,
            4 => ElementFamily::Quad4,
            5 => ElementFamily::Quad8,
            6 => ElementFamily::Quad9,
            7 => ElementFamily::Hex8,
            8 => ElementFamily::Hex20,
            9 => ElementFamily::Hex27,
            _ => return None,
        })
    }
}

impl fmt::Display for ElementFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementFamily {
    type Err = MeshGenError;

    /// Parses a generator family name; `point1` is not a meshable family.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ElementFamily::GENERATED
            .into_iter()
            .find(|f| f.name() == lower)
            .ok_or_else(|| MeshGenError::UnsupportedElement(s.to_string()))
    }
}

impl TryFrom<String> for ElementFamily {
    type Error = MeshGenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElementFamily> for String {
    fn from(family: ElementFamily) -> Self {
        family.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_and_unknown_names() {
        assert_eq!("Quad8".parse::<ElementFamily>().unwrap(), ElementFamily::Quad8);
        assert_eq!(" hex27 ".parse::<ElementFamily>().unwrap(), ElementFamily::Hex27);
        assert!(matches!(
            "tri3".parse::<ElementFamily>(),
            Err(MeshGenError::UnsupportedElement(name)) if name == "tri3"
        ));
        assert!("point1".parse::<ElementFamily>().is_err());
    }

    #[test]
    fn code_round_trips_for_every_family() {
        for f in ElementFamily::GENERATED.into_iter().chain([ElementFamily::Point1]) {
            assert_eq!(ElementFamily::from_code(f.code()), Some(f));
        }
        assert_eq!(ElementFamily::from_code(42), None);
    }

    #[test]
    fn boundary_family_drops_one_dimension() {
        for f in ElementFamily::GENERATED {
            let b = f.boundary_family().unwrap();
            assert_eq!(b.dimension() + 1, f.dimension(), "{f}");
        }
        assert_eq!(ElementFamily::Hex20.boundary_family(), Some(ElementFamily::Quad8));
        assert_eq!(ElementFamily::Edge4.vtk_cell_type(), 4);
    }
}
