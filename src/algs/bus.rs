//! Mesh Data Bus: ships container fragments between ranks as framed payloads.
//!
//! A send is a header message on the payload category's tag followed by the
//! body on the next tag. Both are waited on before the call returns, so the
//! bus is synchronous even over immediate-mode communicators. Receivers check
//! the frame kind and, for keyed transfers, the group key before decoding.

use crate::algs::communicator::{Communicator, DistContext, Wait};
use crate::algs::wire::{
    PayloadKind, WireDecode, WireEncode, WireFrameHdr, expect_exact_len,
};
use crate::data::cell::CellRecord;
use crate::data::mesh_data::GroupCells;
use crate::mesh_error::MeshGenError;
use crate::topology::physical_groups::GroupKey;
use bytes::{Bytes, BytesMut};
use std::mem::size_of;

/// Point-to-point transfer of mesh payloads over a [`DistContext`].
pub struct MeshDataBus<'a, C> {
    ctx: &'a DistContext<C>,
}

impl<'a, C: Communicator> MeshDataBus<'a, C> {
    pub fn new(ctx: &'a DistContext<C>) -> Self {
        Self { ctx }
    }

    /// Sends one frame of `kind` carrying `body` to `dest`.
    pub fn send_frame(&self, dest: usize, kind: PayloadKind, body: &[u8]) -> Result<(), MeshGenError> {
        if dest >= self.ctx.size() {
            return Err(MeshGenError::comm(dest, format!("no such rank in a world of {}", self.ctx.size())));
        }
        let tag = kind.tag();
        let hdr = WireFrameHdr::new(kind, body.len());
        let comm = self.ctx.comm();
        let _ = comm.isend(dest, tag.as_u16(), bytemuck::bytes_of(&hdr)).wait();
        let _ = comm.isend(dest, tag.offset(1).as_u16(), body).wait();
        Ok(())
    }

    /// Receives one frame of `kind` from `src` and returns its body.
    pub fn recv_frame(&self, src: usize, kind: PayloadKind) -> Result<Bytes, MeshGenError> {
        let tag = kind.tag();
        let comm = self.ctx.comm();
        let mut hdr_buf = [0u8; size_of::<WireFrameHdr>()];
        let raw = comm
            .irecv(src, tag.as_u16(), &mut hdr_buf)
            .wait()
            .ok_or_else(|| MeshGenError::comm(src, format!("no {kind:?} header received")))?;
        let hdr = WireFrameHdr::parse(&raw, kind)?;

        let mut body = vec![0u8; hdr.len()];
        let raw = comm
            .irecv(src, tag.offset(1).as_u16(), &mut body)
            .wait()
            .ok_or_else(|| MeshGenError::comm(src, format!("no {kind:?} body received")))?;
        expect_exact_len(raw.len(), hdr.len())?;
        Ok(Bytes::from(raw))
    }

    /// Encodes `value` and sends it as one frame.
    pub fn send<T: WireEncode + ?Sized>(&self, dest: usize, kind: PayloadKind, value: &T) -> Result<(), MeshGenError> {
        self.send_frame(dest, kind, &value.to_bytes())
    }

    /// Receives one frame and decodes the whole body as `T`.
    pub fn recv<T: WireDecode>(&self, src: usize, kind: PayloadKind) -> Result<T, MeshGenError> {
        T::from_bytes(self.recv_frame(src, kind)?)
    }

    pub fn send_integer(&self, dest: usize, value: i64) -> Result<(), MeshGenError> {
        self.send(dest, PayloadKind::Integer, &value)
    }

    pub fn recv_integer(&self, src: usize) -> Result<i64, MeshGenError> {
        self.recv(src, PayloadKind::Integer)
    }

    pub fn send_text(&self, dest: usize, value: &str) -> Result<(), MeshGenError> {
        self.send(dest, PayloadKind::Text, value)
    }

    pub fn recv_text(&self, src: usize) -> Result<String, MeshGenError> {
        self.recv(src, PayloadKind::Text)
    }

    pub fn send_int_vector(&self, dest: usize, values: &[i64]) -> Result<(), MeshGenError> {
        self.send(dest, PayloadKind::IntVector, values)
    }

    pub fn recv_int_vector(&self, src: usize) -> Result<Vec<i64>, MeshGenError> {
        self.recv(src, PayloadKind::IntVector)
    }

    pub fn send_cell(&self, dest: usize, cell: &CellRecord) -> Result<(), MeshGenError> {
        self.send(dest, PayloadKind::Cell, cell)
    }

    pub fn recv_cell(&self, src: usize) -> Result<CellRecord, MeshGenError> {
        self.recv(src, PayloadKind::Cell)
    }

    /// Sends the cells of one element group, addressed by id or name.
    pub fn send_group_cells(&self, dest: usize, key: &GroupKey, cells: &GroupCells) -> Result<(), MeshGenError> {
        let mut body = BytesMut::new();
        key.encode(&mut body);
        cells.encode(&mut body);
        self.send_frame(dest, PayloadKind::GroupCells, &body)
    }

    /// Receives the cells of the group `key`; a frame for another group is an error.
    pub fn recv_group_cells(&self, src: usize, key: &GroupKey) -> Result<GroupCells, MeshGenError> {
        let mut body = self.recv_frame(src, PayloadKind::GroupCells)?;
        expect_key(key, GroupKey::decode(&mut body)?)?;
        GroupCells::from_bytes(body)
    }

    /// Sends the node ids of the node set `name`.
    pub fn send_node_ids(&self, dest: usize, name: &str, ids: &[usize]) -> Result<(), MeshGenError> {
        let mut body = BytesMut::new();
        GroupKey::from(name).encode(&mut body);
        ids.encode(&mut body);
        self.send_frame(dest, PayloadKind::NodeSet, &body)
    }

    pub fn recv_node_ids(&self, src: usize, name: &str) -> Result<Vec<usize>, MeshGenError> {
        let mut body = self.recv_frame(src, PayloadKind::NodeSet)?;
        expect_key(&GroupKey::from(name), GroupKey::decode(&mut body)?)?;
        Vec::from_bytes(body)
    }
}

fn expect_key(expected: &GroupKey, got: GroupKey) -> Result<(), MeshGenError> {
    if *expected == got {
        Ok(())
    } else {
        Err(MeshGenError::wire(format!("expected group {expected}, got {got}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::RayonComm;
    use crate::topology::cell_type::ElementFamily;

    fn pair() -> (DistContext<RayonComm>, DistContext<RayonComm>) {
        let mut world = RayonComm::world(2);
        let c1 = DistContext::new(world.pop().unwrap());
        let c0 = DistContext::new(world.pop().unwrap());
        (c0, c1)
    }

    fn sample_cell() -> CellRecord {
        CellRecord::new(
            ElementFamily::Edge3,
            vec![3, 4, 5],
            vec![[0.0, 1.0, 0.0], [0.5, 1.0, 0.0], [1.0, 1.0, 0.0]],
        )
        .with_group(4, "top")
    }

    #[test]
    fn scalars_and_cells_arrive_intact() {
        let (c0, c1) = pair();
        let tx = MeshDataBus::new(&c0);
        tx.send_integer(1, -42).unwrap();
        tx.send_text(1, "alldomain").unwrap();
        tx.send_int_vector(1, &[7, -1, 0]).unwrap();
        tx.send_cell(1, &sample_cell()).unwrap();

        let rx = MeshDataBus::new(&c1);
        assert_eq!(rx.recv_integer(0).unwrap(), -42);
        assert_eq!(rx.recv_text(0).unwrap(), "alldomain");
        assert_eq!(rx.recv_int_vector(0).unwrap(), vec![7, -1, 0]);
        assert_eq!(rx.recv_cell(0).unwrap(), sample_cell());
    }

    #[test]
    fn keyed_group_mismatch_is_reported() {
        let (c0, c1) = pair();
        let cells = GroupCells {
            element_ids: vec![1],
            cells: vec![sample_cell()],
        };
        MeshDataBus::new(&c0)
            .send_group_cells(1, &GroupKey::Id(4), &cells)
            .unwrap();
        MeshDataBus::new(&c0).send_node_ids(1, "topnodes", &[3, 4, 5]).unwrap();

        let rx = MeshDataBus::new(&c1);
        assert!(matches!(
            rx.recv_group_cells(0, &GroupKey::Id(3)),
            Err(MeshGenError::Wire(_))
        ));
        assert_eq!(rx.recv_node_ids(0, "topnodes").unwrap(), vec![3, 4, 5]);
    }

    #[test]
    fn frame_of_wrong_kind_is_rejected() {
        let (c0, c1) = pair();
        // a Text header posted on the Integer tag
        let hdr = WireFrameHdr::new(PayloadKind::Text, 0);
        c0.comm().isend(1, PayloadKind::Integer.tag().as_u16(), bytemuck::bytes_of(&hdr));
        let err = MeshDataBus::new(&c1).recv_integer(0).unwrap_err();
        assert!(err.to_string().contains("Text"), "{err}");
    }

    #[test]
    fn unknown_destination_fails_fast() {
        let (c0, _c1) = pair();
        assert!(matches!(
            MeshDataBus::new(&c0).send_integer(5, 1),
            Err(MeshGenError::CommError { neighbor: 5, .. })
        ));
    }
}
