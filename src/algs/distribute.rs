//! Distribution of a generated mesh from rank 0 to every rank.
//!
//! Rank 0 slices each element group, each node set and the node id range with
//! [`slice_range`] and ships every other rank its share over the
//! [`MeshDataBus`], one destination after another. Per destination the frames
//! go out in a fixed order: group metadata, boundary group cells (id keyed),
//! bulk cells, node-set metadata, node-set ids (name keyed), partition info,
//! per-rank element counts, local node ids.

use crate::algs::bus::MeshDataBus;
use crate::algs::communicator::{Communicator, DistContext};
use crate::algs::partition::{counts, owners, slice_range};
use crate::algs::wire::PayloadKind;
use crate::data::mesh_data::{GlobalMesh, GroupCells, LocalMesh, MeshData};
use crate::mesh_error::MeshGenError;
use crate::topology::physical_groups::{ALL_DOMAIN_ID, GroupInfo, GroupKey, PhysicalGroupRegistry};

/// Share of `global` owned by `rank` out of `parts`.
pub fn local_share(
    global: &GlobalMesh,
    node_count: usize,
    parts: usize,
    rank: usize,
) -> LocalMesh {
    let cells = &global.cells;
    let mut share = LocalMesh::default();
    share.cells.bulk = cells.bulk.slice(slice_range(cells.bulk.len(), parts, rank));
    for (&id, group) in &cells.boundary {
        share
            .cells
            .boundary
            .insert(id, group.slice(slice_range(group.len(), parts, rank)));
    }
    for (&id, nodes) in &cells.node_sets {
        let range = slice_range(nodes.len(), parts, rank);
        share.cells.node_sets.insert(id, nodes[range].to_vec());
    }
    share.node_ids = slice_range(node_count, parts, rank).map(|i| i + 1).collect();
    share
}

/// Collective: rank 0 sends, every other rank receives. Fills `mesh.local`,
/// `mesh.partition_info` and `mesh.rank_element_counts` on every rank.
pub fn distribute<C: Communicator>(ctx: &DistContext<C>, mesh: &mut MeshData) -> Result<(), MeshGenError> {
    if ctx.is_root() {
        scatter(ctx, mesh)?;
    } else {
        receive(ctx, mesh)?;
    }
    if mesh.local.cells.bulk.is_empty() {
        log::warn!(
            "rank {} of {} owns no bulk elements ({} in total)",
            ctx.rank(),
            ctx.size(),
            mesh.bulk_element_count
        );
    }
    Ok(())
}

fn element_groups(groups: &PhysicalGroupRegistry) -> Vec<GroupInfo> {
    groups.element_groups().cloned().collect()
}

fn node_sets(groups: &PhysicalGroupRegistry) -> Vec<GroupInfo> {
    groups.node_sets().cloned().collect()
}

fn scatter<C: Communicator>(ctx: &DistContext<C>, mesh: &mut MeshData) -> Result<(), MeshGenError> {
    let parts = ctx.size();
    let global = mesh.try_global()?;
    let partition_info = owners(global.cells.bulk.len(), parts);
    let rank_counts = counts(global.cells.bulk.len(), parts);
    let groups = element_groups(&mesh.groups);
    let sets = node_sets(&mesh.groups);
    let bus = MeshDataBus::new(ctx);

    for dest in 1..parts {
        let share = local_share(global, mesh.node_count, parts, dest);
        log::debug!(
            "rank 0 -> rank {dest}: {} bulk elements, {} nodes",
            share.cells.bulk.len(),
            share.node_ids.len()
        );
        bus.send(dest, PayloadKind::GroupMetadata, &groups)?;
        for g in groups.iter().filter(|g| g.id != ALL_DOMAIN_ID) {
            let cells = share.cells.boundary.get(&g.id).cloned().unwrap_or_default();
            bus.send_group_cells(dest, &GroupKey::Id(g.id), &cells)?;
        }
        bus.send(dest, PayloadKind::BulkCells, &share.cells.bulk)?;
        bus.send(dest, PayloadKind::NodeSetMetadata, &sets)?;
        for s in &sets {
            let ids = share.cells.node_sets.get(&s.id).map(Vec::as_slice).unwrap_or(&[]);
            bus.send_node_ids(dest, &s.name, ids)?;
        }
        bus.send(dest, PayloadKind::PartitionInfo, &partition_info)?;
        bus.send(dest, PayloadKind::RankCounts, &rank_counts)?;
        bus.send(dest, PayloadKind::LocalNodeIds, &share.node_ids)?;
    }

    let own = local_share(global, mesh.node_count, parts, 0);
    mesh.local = own;
    mesh.partition_info = partition_info;
    mesh.rank_element_counts = rank_counts;
    Ok(())
}

fn verify(what: &str, local: &[GroupInfo], root: &[GroupInfo]) -> Result<(), MeshGenError> {
    if local == root {
        return Ok(());
    }
    let detail = local
        .iter()
        .zip(root)
        .find(|(a, b)| a != b)
        .map(|(a, b)| format!("{what}: local {a:?}, rank 0 {b:?}"))
        .unwrap_or_else(|| format!("{what}: {} local groups, {} on rank 0", local.len(), root.len()));
    Err(MeshGenError::MetadataMismatch(detail))
}

fn receive<C: Communicator>(ctx: &DistContext<C>, mesh: &mut MeshData) -> Result<(), MeshGenError> {
    const ROOT: usize = 0;
    let bus = MeshDataBus::new(ctx);
    let groups = element_groups(&mesh.groups);
    let sets = node_sets(&mesh.groups);

    let root_groups: Vec<GroupInfo> = bus.recv(ROOT, PayloadKind::GroupMetadata)?;
    verify("element groups", &groups, &root_groups)?;

    let mut local = LocalMesh::default();
    for g in groups.iter().filter(|g| g.id != ALL_DOMAIN_ID) {
        let cells = bus.recv_group_cells(ROOT, &GroupKey::Id(g.id))?;
        local.cells.boundary.insert(g.id, cells);
    }
    let bulk: GroupCells = bus.recv(ROOT, PayloadKind::BulkCells)?;
    for cell in local.cells.boundary.values().flat_map(|g| &g.cells).chain(&bulk.cells) {
        cell.validate(mesh.node_count)?;
    }
    local.cells.bulk = bulk;

    let root_sets: Vec<GroupInfo> = bus.recv(ROOT, PayloadKind::NodeSetMetadata)?;
    verify("node sets", &sets, &root_sets)?;
    for s in &sets {
        let ids = bus.recv_node_ids(ROOT, &s.name)?;
        local.cells.node_sets.insert(s.id, ids);
    }

    let partition_info: Vec<usize> = bus.recv(ROOT, PayloadKind::PartitionInfo)?;
    let rank_counts: Vec<usize> = bus.recv(ROOT, PayloadKind::RankCounts)?;
    local.node_ids = bus.recv(ROOT, PayloadKind::LocalNodeIds)?;

    if partition_info.len() != mesh.bulk_element_count || rank_counts.len() != ctx.size() {
        return Err(MeshGenError::MetadataMismatch(format!(
            "partition info covers {} elements on {} ranks, expected {} on {}",
            partition_info.len(),
            rank_counts.len(),
            mesh.bulk_element_count,
            ctx.size()
        )));
    }
    log::debug!(
        "rank {} received {} bulk elements, {} nodes",
        ctx.rank(),
        local.cells.bulk.len(),
        local.node_ids.len()
    );
    mesh.local = local;
    mesh.partition_info = partition_info;
    mesh.rank_element_counts = rank_counts;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridSpec, MeshConfig};
    use crate::mesh_generation::{build_global, describe};
    use crate::topology::cell_type::ElementFamily;

    fn quad4(nx: usize, ny: usize) -> MeshData {
        let cfg = MeshConfig::new(ElementFamily::Quad4, GridSpec::rect(nx, ny, [0.0; 2], [1.0; 2]));
        let mut mesh = describe(&cfg).unwrap();
        mesh.global = Some(build_global(cfg.family, &cfg.grid).unwrap());
        mesh
    }

    #[test]
    fn shares_cover_every_element_once() {
        let mesh = quad4(3, 3);
        let global = mesh.global.as_ref().unwrap();
        let mut ids: Vec<usize> = (0..4)
            .flat_map(|r| local_share(global, mesh.node_count, 4, r).cells.bulk.element_ids)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=9).collect::<Vec<_>>());

        let last = local_share(global, mesh.node_count, 4, 3);
        assert_eq!(last.cells.bulk.element_ids, vec![7, 8, 9]);
        assert_eq!(last.node_ids, (13..=16).collect::<Vec<_>>());
        // 3 left records over 4 ranks: all of them land on the last rank
        assert_eq!(last.cells.boundary[&1].element_ids, vec![1, 2, 3]);
        assert!(local_share(global, mesh.node_count, 4, 0).cells.boundary[&1].is_empty());
    }

    #[test]
    fn diverging_metadata_is_reported() {
        let a = vec![GroupInfo { id: 0, name: "alldomain".into(), dim: 2, size: 4 }];
        let b = vec![GroupInfo { id: 0, name: "alldomain".into(), dim: 2, size: 6 }];
        assert!(verify("element groups", &a, &a).is_ok());
        assert!(matches!(
            verify("element groups", &a, &b),
            Err(MeshGenError::MetadataMismatch(msg)) if msg.contains("size: 6")
        ));
    }
}
