#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-scatter
//!
//! Structured finite-element mesh generation and distribution for SPMD solvers.
//! Rank 0 builds the full mesh of a box (edge2/3/4, quad4/8/9 or hex8/20/27),
//! files it into physical groups (the bulk domain `alldomain`, one group per
//! boundary side and one node set per side), slices every group into
//! contiguous per-rank blocks and ships each rank its share.
//!
//! ## Features
//! - Closed-form node numbering for Lagrange and serendipity families
//! - Physical group registry with bijective name/id maps
//! - Pluggable communication backends (serial, in-process threads, MPI)
//! - Self-describing framed wire format: mismatched payloads fail instead of hanging
//!
//! ## Usage
//!
//! ```no_run
//! use mesh_scatter::prelude::*;
//!
//! let config: MeshConfig = MeshConfig::new(
//!     ElementFamily::Quad8,
//!     GridSpec::rect(10, 4, [0.0, 0.0], [2.0, 1.0]),
//! );
//! let mesh = generate_mesh(&DistContext::serial(), &config)?;
//! assert_eq!(mesh.bulk_element_count, 40);
//! # Ok::<(), mesh_scatter::mesh_error::MeshGenError>(())
//! ```
//!
//! Enable `mpi-support` for the [`MpiComm`](algs::communicator::MpiComm) backend.
//! The crate logs through the `log` facade and installs no logger.

pub mod algs;
pub mod config;
pub mod data;
pub mod mesh_error;
pub mod mesh_generation;
pub mod topology;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::bus::MeshDataBus;
    pub use crate::algs::communicator::{Communicator, DistContext, NoComm, RayonComm};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::partition::slice_range;
    pub use crate::config::{GridSpec, MeshConfig};
    pub use crate::data::cell::{CellRecord, DisplacementOverlay};
    pub use crate::data::mesh_data::{GroupCells, MeshData};
    pub use crate::mesh_error::MeshGenError;
    pub use crate::mesh_generation::{BoundarySide, generate_mesh};
    pub use crate::topology::cell_type::ElementFamily;
    pub use crate::topology::physical_groups::{GroupKey, PhysicalGroupRegistry};
}
