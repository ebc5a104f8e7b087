//! Mesh block configuration: element family, box extents and subdivisions.
//!
//! Deserializes from the input file's mesh block, e.g.
//! `{"type": "quad8", "nx": 10, "ny": 4, "xmax": 2.0}`. Missing fields take
//! the unit box with one subdivision per direction.

use crate::mesh_error::MeshGenError;
use crate::topology::cell_type::ElementFamily;
use serde::{Deserialize, Serialize};

/// Structured box: extents and number of cells per direction.
///
/// For 1D meshes the line runs from `(xmin, ymin, zmin)` to `(xmax, ymax, zmax)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            nx: 1,
            ny: 1,
            nz: 1,
            xmin: 0.0,
            xmax: 1.0,
            ymin: 0.0,
            ymax: 1.0,
            zmin: 0.0,
            zmax: 1.0,
        }
    }
}

impl GridSpec {
    /// 1D grid over `[xmin, xmax]` along x.
    pub fn line(nx: usize, xmin: f64, xmax: f64) -> Self {
        Self {
            nx,
            xmin,
            xmax,
            ymax: 0.0,
            zmax: 0.0,
            ..Self::default()
        }
    }

    /// 2D grid over `[min, max]`.
    pub fn rect(nx: usize, ny: usize, min: [f64; 2], max: [f64; 2]) -> Self {
        Self {
            nx,
            ny,
            xmin: min[0],
            xmax: max[0],
            ymin: min[1],
            ymax: max[1],
            zmax: 0.0,
            ..Self::default()
        }
    }

    /// 3D grid over `[min, max]`.
    pub fn cuboid(n: [usize; 3], min: [f64; 3], max: [f64; 3]) -> Self {
        Self {
            nx: n[0],
            ny: n[1],
            nz: n[2],
            xmin: min[0],
            xmax: max[0],
            ymin: min[1],
            ymax: max[1],
            zmin: min[2],
            zmax: max[2],
        }
    }

    /// Cell counts per direction, with unused directions reported as 0.
    pub fn cells(&self, dim: u8) -> [usize; 3] {
        match dim {
            1 => [self.nx, 0, 0],
            2 => [self.nx, self.ny, 0],
            _ => [self.nx, self.ny, self.nz],
        }
    }

    /// Checks the directions used by a `dim`-dimensional mesh.
    pub fn validate(&self, dim: u8) -> Result<(), MeshGenError> {
        let axes = [
            ("x", self.nx, self.xmin, self.xmax),
            ("y", self.ny, self.ymin, self.ymax),
            ("z", self.nz, self.zmin, self.zmax),
        ];
        for &(axis, n, lo, hi) in axes.iter().take(dim as usize) {
            if n == 0 {
                return Err(MeshGenError::invalid_grid(format!(
                    "n{axis} must be at least 1"
                )));
            }
            if !(lo < hi) {
                return Err(MeshGenError::invalid_grid(format!(
                    "{axis}min ({lo}) must be less than {axis}max ({hi})"
                )));
            }
        }
        Ok(())
    }
}

/// Mesh block of the input file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    #[serde(rename = "type")]
    pub family: ElementFamily,
    #[serde(flatten)]
    pub grid: GridSpec,
}

impl MeshConfig {
    pub fn new(family: ElementFamily, grid: GridSpec) -> Self {
        Self { family, grid }
    }

    /// Rejects families the generators cannot build and grids that do not fit them.
    pub fn validate(&self) -> Result<(), MeshGenError> {
        if self.family.boundary_family().is_none() {
            return Err(MeshGenError::UnsupportedElement(self.family.to_string()));
        }
        self.grid.validate(self.family.dimension())
    }
}
