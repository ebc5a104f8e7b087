//! Element family metadata and physical group bookkeeping.
//!
//! - [`ElementFamily`] names the supported Lagrange and serendipity elements
//!   with their node counts and VTK codes.
//! - [`PhysicalGroupRegistry`] maps group names to ids for element groups and
//!   node sets.

pub mod cell_type;
pub mod physical_groups;

pub use cell_type::{ElementFamily, VtkCellType};
pub use physical_groups::{GroupInfo, GroupKey, PhysicalGroupRegistry};
