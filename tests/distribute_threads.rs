//! Multi-rank generation with one thread per rank over the in-process communicator.

use mesh_scatter::algs::communicator::{DistContext, RayonComm};
use mesh_scatter::algs::partition::slice_range;
use mesh_scatter::config::{GridSpec, MeshConfig};
use mesh_scatter::data::mesh_data::MeshData;
use mesh_scatter::mesh_error::MeshGenError;
use mesh_scatter::mesh_generation::generate_mesh;
use mesh_scatter::topology::cell_type::ElementFamily;
use std::thread;

/// Runs `generate_mesh` on every rank of a fresh world; rank `r` uses `configs[r]`.
fn run_world(configs: Vec<MeshConfig>) -> Vec<Result<MeshData, MeshGenError>> {
    let world = RayonComm::world(configs.len());
    let handles: Vec<_> = world
        .into_iter()
        .zip(configs)
        .map(|(comm, cfg)| {
            thread::spawn(move || {
                let ctx = DistContext::new(comm);
                generate_mesh(&ctx, &cfg)
            })
        })
        .collect();
    handles
        .into_iter()
        .map(|h| h.join().expect("rank thread panicked"))
        .collect()
}

fn same_everywhere(cfg: MeshConfig, ranks: usize) -> Vec<MeshData> {
    run_world(vec![cfg; ranks])
        .into_iter()
        .map(|r| r.expect("generation"))
        .collect()
}

#[test]
fn quad4_two_by_two_on_two_ranks() {
    let cfg = MeshConfig::new(ElementFamily::Quad4, GridSpec::rect(2, 2, [0.0, 0.0], [1.0, 1.0]));
    let meshes = same_everywhere(cfg, 2);

    assert_eq!(meshes[0].local.cells.bulk.len(), 2);
    assert_eq!(meshes[1].local.cells.bulk.len(), 2);
    let mut ids: Vec<usize> = meshes
        .iter()
        .flat_map(|m| m.local.cells.bulk.element_ids.iter().copied())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    for m in &meshes {
        assert_eq!(m.partition_info, vec![0, 0, 1, 1]);
        assert_eq!(m.rank_element_counts, vec![2, 2]);
        assert_eq!(m.node_count, 9);
        assert_eq!(m.groups, meshes[0].groups);
        assert_eq!(m.local_group("left").unwrap().len(), 1);
    }
    assert!(meshes[0].global.is_some());
    assert!(meshes[1].global.is_none());
    assert_eq!(meshes[1].local.node_ids, vec![5, 6, 7, 8, 9]);
    assert_eq!(meshes[1].local_node_set("topnodes").unwrap(), &[8, 9]);
}

#[test]
fn shares_reproduce_root_slices() {
    let cfg = MeshConfig::new(
        ElementFamily::Hex20,
        GridSpec::cuboid([3, 2, 2], [0.0; 3], [1.0; 3]),
    );
    let ranks = 3;
    let meshes = same_everywhere(cfg, ranks);
    let global = meshes[0].try_global().unwrap();

    for (rank, m) in meshes.iter().enumerate() {
        let range = slice_range(global.cells.bulk.len(), ranks, rank);
        assert_eq!(m.local.cells.bulk.cells, global.cells.bulk.cells[range.clone()]);
        assert_eq!(m.local.cells.bulk.element_ids, global.cells.bulk.element_ids[range]);

        for (id, group) in &global.cells.boundary {
            let range = slice_range(group.len(), ranks, rank);
            assert_eq!(m.local.cells.boundary[id].cells, group.cells[range]);
        }
        for (id, nodes) in &global.cells.node_sets {
            let range = slice_range(nodes.len(), ranks, rank);
            assert_eq!(m.local.cells.node_sets[id], nodes[range]);
        }
        let nodes = slice_range(m.node_count, ranks, rank);
        assert_eq!(m.local.node_ids, (nodes.start + 1..=nodes.end).collect::<Vec<_>>());
    }
    assert_eq!(meshes[2].rank_element_counts, vec![4, 4, 4]);
}

#[test]
fn more_ranks_than_elements_leaves_early_ranks_empty() {
    let cfg = MeshConfig::new(ElementFamily::Edge2, GridSpec::line(2, 0.0, 1.0));
    let meshes = same_everywhere(cfg, 3);
    assert!(meshes[0].local.cells.bulk.is_empty());
    assert!(meshes[1].local.cells.bulk.is_empty());
    assert_eq!(meshes[2].local.cells.bulk.element_ids, vec![1, 2]);
    assert_eq!(meshes[2].rank_element_counts, vec![0, 0, 2]);
    assert_eq!(meshes[2].local_node_set("rightnodes").unwrap(), &[3]);
}

#[test]
fn diverging_configuration_is_detected() {
    let grid = GridSpec::rect(2, 2, [0.0, 0.0], [1.0, 1.0]);
    let root = MeshConfig::new(ElementFamily::Quad4, grid.clone());
    let other = MeshConfig::new(ElementFamily::Quad4, GridSpec { nx: 3, ..grid });
    let results = run_world(vec![root, other]);

    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(MeshGenError::MetadataMismatch(_))));
}
