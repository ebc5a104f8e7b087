//! Run with `mpirun -n 2 cargo test --features mpi-support --test mpi_distribution`.
#![cfg(feature = "mpi-support")]

use mesh_scatter::algs::communicator::{Communicator, DistContext, MpiComm};
use mesh_scatter::config::{GridSpec, MeshConfig};
use mesh_scatter::mesh_generation::generate_mesh;
use mesh_scatter::topology::cell_type::ElementFamily;
use serial_test::serial;

#[test]
#[serial]
fn quad4_two_by_two_over_mpi() {
    let Some((comm, _universe)) = MpiComm::init() else {
        return;
    };
    if comm.size() != 2 {
        return;
    }
    let rank = comm.rank();
    let ctx = DistContext::new(comm);
    let cfg = MeshConfig::new(ElementFamily::Quad4, GridSpec::rect(2, 2, [0.0, 0.0], [1.0, 1.0]));
    let mesh = generate_mesh(&ctx, &cfg).expect("MPI generation");

    let expected: Vec<usize> = if rank == 0 { vec![1, 2] } else { vec![3, 4] };
    assert_eq!(mesh.local.cells.bulk.element_ids, expected);
    assert_eq!(mesh.partition_info, vec![0, 0, 1, 1]);
    assert_eq!(mesh.global.is_some(), rank == 0);
}
