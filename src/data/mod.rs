//! Data module: cell records and the mesh data container.

pub mod cell;
pub mod mesh_data;

pub use cell::{CellRecord, DisplacementOverlay};
pub use mesh_data::{GlobalMesh, GroupCells, GroupedCells, LocalMesh, MeshData, MeshSummary};
