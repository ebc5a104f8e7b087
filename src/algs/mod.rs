//! Re-export public algorithms.

pub mod bus;
pub mod communicator;
pub mod distribute;
pub mod partition;
pub mod wire;

pub use bus::MeshDataBus;
pub use distribute::distribute;
pub use partition::slice_range;
